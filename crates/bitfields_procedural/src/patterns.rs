//! # Pattern Composition
//!
//! A pattern maps grid coordinates to a state in `[0, total_states)`. It is
//! assembled from four independent draws:
//!
//! ```text
//! (x, y, z) ─► + offsets ─► permute axes ─► base(op = gate) ─► mod total
//! ```
//!
//! Base functions produce three integer operands from the (offset, permuted)
//! coordinate; the gate folds them lane-wise into one 32-bit word. A
//! truth-table word is reduced as unsigned. A named-gate word is read as a
//! signed 32-bit integer and reduced with a Euclidean modulo.

use bitfields_shared::{GateMode, GridDimensions};
use rand::Rng;

use crate::error::{PatternError, PatternResult};
use crate::gates::{Gate, NamedGate};

/// Largest band width drawn for [`BasePattern::ZBands`].
const MAX_BAND_WIDTH: u32 = 32;

/// Minkowski exponents are drawn from `(MIN, MAX]`.
const MINKOWSKI_MIN_P: f64 = 1.0;
const MINKOWSKI_MAX_P: f64 = 5.0;

/// Anything that assigns a state to every grid cell.
///
/// Implementations must be pure: the same coordinate always yields the same
/// state, and states are always below [`Self::total_states`].
pub trait PatternFunction: Send + Sync {
    /// Size of the state space.
    fn total_states(&self) -> u32;

    /// State of the cell at `(x, y, z)`.
    fn state(&self, x: u32, y: u32, z: u32) -> u32;
}

/// Wraps a closure as a pattern. The closure's result is reduced into
/// `[0, total_states)` with a Euclidean modulo.
pub struct FnPattern<F> {
    total_states: u32,
    f: F,
}

impl<F> FnPattern<F>
where
    F: Fn(u32, u32, u32) -> i64 + Send + Sync,
{
    /// Creates a closure-backed pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::ZeroStates`] when `total_states` is zero.
    pub fn new(total_states: u32, f: F) -> PatternResult<Self> {
        if total_states == 0 {
            return Err(PatternError::ZeroStates);
        }
        Ok(Self { total_states, f })
    }
}

impl<F> PatternFunction for FnPattern<F>
where
    F: Fn(u32, u32, u32) -> i64 + Send + Sync,
{
    fn total_states(&self) -> u32 {
        self.total_states
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn state(&self, x: u32, y: u32, z: u32) -> u32 {
        (self.f)(x, y, z).rem_euclid(i64::from(self.total_states)) as u32
    }
}

/// Base spatial functions. Each yields the three operands handed to the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BasePattern {
    /// `op(x+y+z, y+z-x, z+x-y)`
    SumDiff,
    /// `op(x+y-z, y+z-x, z+x-y)`
    SumMinus,
    /// `op(x-y+z, y-z+x, z-x+y)`
    InvSumMinus,
    /// `op(x+y, y+z, z+x)`
    Diagonal,
    /// `op(x^y^z, maj, x|y|z)`
    XorMajOr,
    /// `op(x^y^z, x|y|z, maj)`
    XorOrMaj,
    /// `op(maj, x^y^z, x|y|z)`
    MajXorOr,
    /// `op(maj, x|y|z, x^y^z)`
    MajOrXor,
    /// `op(x|y|z, x^y^z, maj)`
    OrXorMaj,
    /// `op(x|y|z, maj, x^y^z)`
    OrMajXor,
    /// Euclidean distance from the grid center, with coordinate deltas.
    EuclidOffset,
    /// Bands of `width` cells along z shift the other operands.
    ZBands {
        /// Band thickness in cells, at least 1.
        width: u32,
    },
    /// Distance from the origin added to every axis.
    Spiral,
    /// L1 distance from the grid center, with coordinate deltas.
    Manhattan,
    /// L∞ distance from the grid center, with coordinate deltas.
    Chebyshev,
    /// Lp distance from the grid center, with coordinate deltas.
    Minkowski {
        /// Exponent, finite and strictly positive.
        p: f64,
    },
}

impl BasePattern {
    /// Number of base functions the composer draws from.
    pub const CATALOG_LEN: usize = 16;

    /// Z-bands with a checked width.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::ZeroBandWidth`] for `width == 0`.
    pub fn z_bands(width: u32) -> PatternResult<Self> {
        Self::ZBands { width }.validated()
    }

    /// Minkowski distance with a checked exponent.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidExponent`] unless `p` is finite and positive.
    pub fn minkowski(p: f64) -> PatternResult<Self> {
        Self::Minkowski { p }.validated()
    }

    /// Rejects parameters that would divide by zero or produce NaN.
    ///
    /// # Errors
    ///
    /// See [`Self::z_bands`] and [`Self::minkowski`].
    pub fn validated(self) -> PatternResult<Self> {
        match self {
            Self::ZBands { width: 0 } => Err(PatternError::ZeroBandWidth),
            Self::Minkowski { p } if !(p.is_finite() && p > 0.0) => {
                Err(PatternError::InvalidExponent(p))
            }
            other => Ok(other),
        }
    }

    /// Draws one base function, including its random parameters.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..Self::CATALOG_LEN) {
            0 => Self::SumDiff,
            1 => Self::SumMinus,
            2 => Self::InvSumMinus,
            3 => Self::Diagonal,
            4 => Self::XorMajOr,
            5 => Self::XorOrMaj,
            6 => Self::MajXorOr,
            7 => Self::MajOrXor,
            8 => Self::OrXorMaj,
            9 => Self::OrMajXor,
            10 => Self::EuclidOffset,
            11 => Self::ZBands {
                width: rng.gen_range(1..=MAX_BAND_WIDTH),
            },
            12 => Self::Spiral,
            13 => Self::Manhattan,
            14 => Self::Chebyshev,
            // (1, 5]: subtracting from the top keeps p strictly above 1
            _ => Self::Minkowski {
                p: MINKOWSKI_MAX_P - rng.gen_range(0.0..(MINKOWSKI_MAX_P - MINKOWSKI_MIN_P)),
            },
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SumDiff => "sum_diff",
            Self::SumMinus => "sum_minus",
            Self::InvSumMinus => "inv_sum_minus",
            Self::Diagonal => "diagonal",
            Self::XorMajOr => "xor_maj_or",
            Self::XorOrMaj => "xor_or_maj",
            Self::MajXorOr => "maj_xor_or",
            Self::MajOrXor => "maj_or_xor",
            Self::OrXorMaj => "or_xor_maj",
            Self::OrMajXor => "or_maj_xor",
            Self::EuclidOffset => "euclid_offset",
            Self::ZBands { .. } => "z_bands",
            Self::Spiral => "spiral",
            Self::Manhattan => "manhattan",
            Self::Chebyshev => "chebyshev",
            Self::Minkowski { .. } => "minkowski",
        }
    }

    /// Pre-combination operands for one coordinate.
    ///
    /// `center` is the grid center in cell units. Distances are floored to
    /// integers before they reach the gate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn operands(&self, x: i64, y: i64, z: i64, center: [f64; 3]) -> [i64; 3] {
        let xor = x ^ y ^ z;
        let or = x | y | z;
        let maj = (x & y) | (y & z) | (x & z);
        let delta = || {
            [
                (x as f64 - center[0]).abs(),
                (y as f64 - center[1]).abs(),
                (z as f64 - center[2]).abs(),
            ]
        };

        match *self {
            Self::SumDiff => [x + y + z, y + z - x, z + x - y],
            Self::SumMinus => [x + y - z, y + z - x, z + x - y],
            Self::InvSumMinus => [x - y + z, y - z + x, z - x + y],
            Self::Diagonal => [x + y, y + z, z + x],
            Self::XorMajOr => [xor, maj, or],
            Self::XorOrMaj => [xor, or, maj],
            Self::MajXorOr => [maj, xor, or],
            Self::MajOrXor => [maj, or, xor],
            Self::OrXorMaj => [or, xor, maj],
            Self::OrMajXor => [or, maj, xor],
            Self::EuclidOffset => {
                let [dx, dy, dz] = delta();
                let d = (dx * dx + dy * dy + dz * dz).sqrt().floor() as i64;
                [d, x - y, y - z]
            }
            Self::ZBands { width } => {
                let band = z.div_euclid(i64::from(width.max(1)));
                [x + band, y + band, z - band]
            }
            Self::Spiral => {
                let (fx, fy, fz) = (x as f64, y as f64, z as f64);
                let t = (fx * fx + fy * fy + fz * fz).sqrt().floor() as i64;
                [x + t, y + t, z + t]
            }
            Self::Manhattan => {
                let [dx, dy, dz] = delta();
                [(dx + dy + dz).floor() as i64, x - y, y - z]
            }
            Self::Chebyshev => {
                let [dx, dy, dz] = delta();
                [dx.max(dy).max(dz).floor() as i64, x - y, y - z]
            }
            Self::Minkowski { p } => {
                let [dx, dy, dz] = delta();
                let sum = dx.powf(p) + dy.powf(p) + dz.powf(p);
                [sum.powf(p.recip()).floor() as i64, x - y, y - z]
            }
        }
    }

    /// Base function with `op` applied: the raw 32-bit word before reduction.
    ///
    /// Operands are truncated to their low 32 bits.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn raw(&self, gate: Gate, x: i64, y: i64, z: i64, center: [f64; 3]) -> u32 {
        let [a, b, c] = self.operands(x, y, z, center);
        gate.apply(a as u32, b as u32, c as u32)
    }
}

impl std::fmt::Display for BasePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZBands { width } => write!(f, "z_bands(w={width})"),
            Self::Minkowski { p } => write!(f, "minkowski(p={p:.3})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Ordering of the coordinate triple fed to the base function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisPermutation([usize; 3]);

impl AxisPermutation {
    /// `(x, y, z)` unchanged.
    pub const IDENTITY: Self = Self([0, 1, 2]);

    /// All six orderings.
    pub const ALL: [Self; 6] = [
        Self([0, 1, 2]),
        Self([0, 2, 1]),
        Self([1, 0, 2]),
        Self([1, 2, 0]),
        Self([2, 0, 1]),
        Self([2, 1, 0]),
    ];

    /// Output slot `i` takes input axis `order[i]`.
    #[must_use]
    pub const fn order(self) -> [usize; 3] {
        self.0
    }

    /// Reorders a coordinate triple.
    #[inline]
    #[must_use]
    pub fn apply<T: Copy>(self, v: [T; 3]) -> [T; 3] {
        [v[self.0[0]], v[self.0[1]], v[self.0[2]]]
    }
}

impl std::fmt::Display for AxisPermutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const AXES: [char; 3] = ['x', 'y', 'z'];
        let [a, b, c] = self.0;
        write!(f, "{}{}{}", AXES[a], AXES[b], AXES[c])
    }
}

/// A fully drawn composition. Pure and cheap to evaluate from many threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPattern {
    base: BasePattern,
    gate: Gate,
    permutation: AxisPermutation,
    offsets: [i64; 3],
    center: [f64; 3],
    total_states: u32,
}

impl ComposedPattern {
    /// Assembles a composition from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::ZeroStates`] or a base-parameter error.
    pub fn new(
        base: BasePattern,
        gate: Gate,
        permutation: AxisPermutation,
        offsets: [i64; 3],
        dims: GridDimensions,
        total_states: u32,
    ) -> PatternResult<Self> {
        if total_states == 0 {
            return Err(PatternError::ZeroStates);
        }
        Ok(Self {
            base: base.validated()?,
            gate,
            permutation,
            offsets,
            center: dims.center(),
            total_states,
        })
    }

    /// Base spatial function.
    #[must_use]
    pub fn base(&self) -> BasePattern {
        self.base
    }

    /// Gate used as the base function's op.
    #[must_use]
    pub fn gate(&self) -> Gate {
        self.gate
    }

    /// Axis permutation.
    #[must_use]
    pub fn permutation(&self) -> AxisPermutation {
        self.permutation
    }

    /// Per-axis offsets.
    #[must_use]
    pub fn offsets(&self) -> [i64; 3] {
        self.offsets
    }

    /// Unreduced gate output at a coordinate.
    #[inline]
    #[must_use]
    pub fn raw(&self, x: u32, y: u32, z: u32) -> u32 {
        let shifted = [
            i64::from(x) + self.offsets[0],
            i64::from(y) + self.offsets[1],
            i64::from(z) + self.offsets[2],
        ];
        let [a, b, c] = self.permutation.apply(shifted);
        self.base.raw(self.gate, a, b, c, self.center)
    }
}

impl PatternFunction for ComposedPattern {
    fn total_states(&self) -> u32 {
        self.total_states
    }

    #[inline]
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn state(&self, x: u32, y: u32, z: u32) -> u32 {
        let raw = self.raw(x, y, z);
        match self.gate {
            // Truth tables produce unsigned words; named gates produce signed ones.
            Gate::TruthTable(_) => raw % self.total_states,
            Gate::Named(_) => {
                let word = i64::from(raw as i32);
                word.rem_euclid(i64::from(self.total_states)) as u32
            }
        }
    }
}

impl std::fmt::Display for ComposedPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ∘ {} [{}] +({}, {}, {}) mod {}",
            self.base,
            self.gate,
            self.permutation,
            self.offsets[0],
            self.offsets[1],
            self.offsets[2],
            self.total_states
        )
    }
}

/// Draws random compositions for a fixed grid.
#[derive(Debug, Clone, Copy)]
pub struct PatternComposer {
    dims: GridDimensions,
    gate_mode: GateMode,
}

impl PatternComposer {
    /// Creates a composer for `dims`.
    #[must_use]
    pub const fn new(dims: GridDimensions, gate_mode: GateMode) -> Self {
        Self { dims, gate_mode }
    }

    /// Draws base, gate, permutation and offsets, in that order.
    ///
    /// Offsets are drawn from `[0, dims.x * dims.z)`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::ZeroStates`] when `total_states` is zero.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        total_states: u32,
    ) -> PatternResult<ComposedPattern> {
        let base = BasePattern::random(rng);
        let gate = self.draw_gate(rng);
        let permutation = AxisPermutation::ALL[rng.gen_range(0..AxisPermutation::ALL.len())];

        let span = (i64::from(self.dims.x) * i64::from(self.dims.z)).max(1);
        let offsets = [
            rng.gen_range(0..span),
            rng.gen_range(0..span),
            rng.gen_range(0..span),
        ];

        let pattern =
            ComposedPattern::new(base, gate, permutation, offsets, self.dims, total_states)?;
        tracing::debug!(pattern = %pattern, "composed pattern");
        Ok(pattern)
    }

    fn draw_gate<R: Rng + ?Sized>(&self, rng: &mut R) -> Gate {
        let named = match self.gate_mode {
            GateMode::TruthTable => false,
            GateMode::Named => true,
            GateMode::Mixed => rng.gen_bool(0.5),
        };
        if named {
            Gate::Named(NamedGate::ALL[rng.gen_range(0..NamedGate::ALL.len())])
        } else {
            Gate::TruthTable(rng.gen_range(1..=u8::MAX))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::WorldSeed;

    const DIMS: GridDimensions = GridDimensions::new(8, 6, 5);

    fn every_base() -> Vec<BasePattern> {
        vec![
            BasePattern::SumDiff,
            BasePattern::SumMinus,
            BasePattern::InvSumMinus,
            BasePattern::Diagonal,
            BasePattern::XorMajOr,
            BasePattern::XorOrMaj,
            BasePattern::MajXorOr,
            BasePattern::MajOrXor,
            BasePattern::OrXorMaj,
            BasePattern::OrMajXor,
            BasePattern::EuclidOffset,
            BasePattern::ZBands { width: 3 },
            BasePattern::Spiral,
            BasePattern::Manhattan,
            BasePattern::Chebyshev,
            BasePattern::Minkowski { p: 2.5 },
        ]
    }

    #[test]
    fn test_catalog_len_matches_variants() {
        assert_eq!(every_base().len(), BasePattern::CATALOG_LEN);
    }

    #[test]
    fn test_identity_permutation_is_transparent() {
        let center = DIMS.center();
        for base in every_base() {
            let gate = Gate::Named(NamedGate::Parity);
            let composed =
                ComposedPattern::new(base, gate, AxisPermutation::IDENTITY, [0; 3], DIMS, 7)
                    .unwrap();
            for x in 0..DIMS.x {
                for y in 0..DIMS.y {
                    for z in 0..DIMS.z {
                        let direct =
                            base.raw(gate, i64::from(x), i64::from(y), i64::from(z), center);
                        assert_eq!(composed.raw(x, y, z), direct, "{base} at ({x},{y},{z})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_permutation_reorders_axes() {
        let swap_yz = AxisPermutation::ALL[1];
        assert_eq!(swap_yz.apply([10, 20, 30]), [10, 30, 20]);
        assert_eq!(AxisPermutation::ALL[3].apply([10, 20, 30]), [20, 30, 10]);
        assert_eq!(AxisPermutation::ALL[3].to_string(), "yzx");
    }

    #[test]
    fn test_states_always_in_range() {
        let composer = PatternComposer::new(DIMS, GateMode::Mixed);
        let mut rng = WorldSeed::new(1234).rng();

        for total in [1, 2, 5, 37, 160] {
            for _ in 0..20 {
                let pattern = composer.compose(&mut rng, total).unwrap();
                for x in 0..DIMS.x {
                    for y in 0..DIMS.y {
                        for z in 0..DIMS.z {
                            let state = pattern.state(x, y, z);
                            assert!(state < total, "{pattern} gave {state} >= {total}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_negative_words_wrap_into_range() {
        // NOR of three zeros is all ones, i.e. -1 as i32
        let pattern = ComposedPattern::new(
            BasePattern::Diagonal,
            Gate::Named(NamedGate::Nor),
            AxisPermutation::IDENTITY,
            [0; 3],
            DIMS,
            4,
        )
        .unwrap();
        assert_eq!(pattern.raw(0, 0, 0), u32::MAX);
        assert_eq!(pattern.state(0, 0, 0), 3, "-1 mod 4 must normalize to 3");
    }

    #[test]
    fn test_truth_table_words_reduce_unsigned() {
        // Mask 255 is all ones; 0xFFFF_FFFF mod 5 is 0, while -1 mod 5 would be 4
        let pattern = ComposedPattern::new(
            BasePattern::SumDiff,
            Gate::TruthTable(255),
            AxisPermutation::IDENTITY,
            [0; 3],
            GridDimensions::new(2, 2, 2),
            5,
        )
        .unwrap();
        assert_eq!(pattern.raw(0, 0, 0), u32::MAX);
        assert_eq!(pattern.state(0, 0, 0), 0);
        assert_eq!(pattern.state(1, 1, 1), 0);
    }

    #[test]
    fn test_composition_is_seed_deterministic() {
        let composer = PatternComposer::new(DIMS, GateMode::Mixed);
        let a = composer.compose(&mut WorldSeed::new(77).rng(), 12).unwrap();
        let b = composer.compose(&mut WorldSeed::new(77).rng(), 12).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gate_mode_restricts_draws() {
        let mut rng = WorldSeed::new(5).rng();
        let tables = PatternComposer::new(DIMS, GateMode::TruthTable);
        let named = PatternComposer::new(DIMS, GateMode::Named);
        for _ in 0..50 {
            let gate = tables.compose(&mut rng, 4).unwrap().gate();
            assert!(matches!(gate, Gate::TruthTable(m) if m != 0), "mask 0 must never be drawn");
            assert!(matches!(named.compose(&mut rng, 4).unwrap().gate(), Gate::Named(_)));
        }
    }

    #[test]
    fn test_random_parameters_are_guarded() {
        let mut rng = WorldSeed::new(99).rng();
        for _ in 0..2000 {
            match BasePattern::random(&mut rng) {
                BasePattern::Minkowski { p } => {
                    assert!(p > 1.0 && p <= 5.0, "p = {p} outside (1, 5]");
                }
                BasePattern::ZBands { width } => assert!((1..=32).contains(&width)),
                _ => {}
            }
        }
    }

    #[test]
    fn test_degenerate_parameters_rejected() {
        assert_eq!(BasePattern::minkowski(0.0), Err(PatternError::InvalidExponent(0.0)));
        assert!(BasePattern::minkowski(-1.0).is_err());
        assert!(BasePattern::minkowski(f64::NAN).is_err());
        assert_eq!(BasePattern::z_bands(0), Err(PatternError::ZeroBandWidth));
        assert!(BasePattern::minkowski(2.0).is_ok());
    }

    #[test]
    fn test_fn_pattern_reduces_modulo() {
        let pattern = FnPattern::new(4, |x, y, z| i64::from(x + y + z) - 1).unwrap();
        assert_eq!(pattern.state(0, 0, 0), 3);
        assert_eq!(pattern.state(2, 0, 0), 1);
        assert!(FnPattern::new(0, |_, _, _| 0).is_err());
    }
}
