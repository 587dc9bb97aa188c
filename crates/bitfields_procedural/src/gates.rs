//! # Ternary Bitwise Gates
//!
//! Every gate here maps three `u32` words to one, independently in each of
//! the 32 bit lanes. A gate is therefore fully described by its 8-row truth
//! table, which is what [`evaluate_gate`] consumes as a `u8` mask.
//!
//! ## Minterm numbering
//!
//! Row `p` of the truth table is the input pattern `abc` read as a binary
//! number (a is the high bit):
//!
//! ```text
//! p = 0b011  →  ~a &  b &  c
//! p = 0b110  →   a &  b & ~c
//! ```
//!
//! Bit `p` of the mask selects whether that minterm is ORed into the result.

/// Canonical lane inputs: lane `p` of these words carries input pattern `p`.
const LANE_A: u32 = 0b1111_0000;
const LANE_B: u32 = 0b1100_1100;
const LANE_C: u32 = 0b1010_1010;

/// Evaluates truth table `mask` lane-wise over `a`, `b`, `c`.
///
/// `mask = 0` yields `0`, `mask = 255` yields `u32::MAX`.
#[inline]
#[must_use]
pub const fn evaluate_gate(mask: u8, a: u32, b: u32, c: u32) -> u32 {
    let mut out = 0u32;
    let mut pattern = 0u8;
    while pattern < 8 {
        if mask & (1 << pattern) != 0 {
            let ta = if pattern & 0b100 != 0 { a } else { !a };
            let tb = if pattern & 0b010 != 0 { b } else { !b };
            let tc = if pattern & 0b001 != 0 { c } else { !c };
            out |= ta & tb & tc;
        }
        pattern += 1;
    }
    out
}

/// Curated ternary gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum NamedGate {
    // Threshold
    AllTrue,
    AnyTrue,
    Majority,
    Minority,
    ExactlyOne,
    ExactlyTwo,
    // Parity
    Parity,
    Xnor,
    // Multiplexers
    MuxA,
    MuxB,
    MuxC,
    InverseMuxA,
    InverseMuxB,
    InverseMuxC,
    ConditionalInvertA,
    ConditionalInvertB,
    ConditionalInvertC,
    // Conditional XOR / OR
    ConditionalXorA,
    ConditionalXorB,
    ConditionalXorC,
    ConditionalOrA,
    ConditionalOrB,
    ConditionalOrC,
    // Universal
    Nand,
    Nor,
    // Pairwise XOR
    PairwiseXorA,
    PairwiseXorB,
    PairwiseXorC,
    // Set-like
    SomeButNotAll,
    Unanimous,
    ChainImplication,
    MonotoneDecreasing,
    // Equality
    EqualAB,
    EqualBC,
    EqualCA,
    // Mixed
    Alternation,
    WeightedParity,
    AndXorC,
    DiffToOr,
    ImpliesThenC,
}

impl NamedGate {
    /// Every named gate, in catalog order.
    pub const ALL: [Self; 40] = [
        Self::AllTrue,
        Self::AnyTrue,
        Self::Majority,
        Self::Minority,
        Self::ExactlyOne,
        Self::ExactlyTwo,
        Self::Parity,
        Self::Xnor,
        Self::MuxA,
        Self::MuxB,
        Self::MuxC,
        Self::InverseMuxA,
        Self::InverseMuxB,
        Self::InverseMuxC,
        Self::ConditionalInvertA,
        Self::ConditionalInvertB,
        Self::ConditionalInvertC,
        Self::ConditionalXorA,
        Self::ConditionalXorB,
        Self::ConditionalXorC,
        Self::ConditionalOrA,
        Self::ConditionalOrB,
        Self::ConditionalOrC,
        Self::Nand,
        Self::Nor,
        Self::PairwiseXorA,
        Self::PairwiseXorB,
        Self::PairwiseXorC,
        Self::SomeButNotAll,
        Self::Unanimous,
        Self::ChainImplication,
        Self::MonotoneDecreasing,
        Self::EqualAB,
        Self::EqualBC,
        Self::EqualCA,
        Self::Alternation,
        Self::WeightedParity,
        Self::AndXorC,
        Self::DiffToOr,
        Self::ImpliesThenC,
    ];

    /// Applies the gate lane-wise.
    #[inline]
    #[must_use]
    pub const fn apply(self, a: u32, b: u32, c: u32) -> u32 {
        let maj = (a & b) | (b & c) | (a & c);
        match self {
            Self::AllTrue => a & b & c,
            Self::AnyTrue => a | b | c,
            Self::Majority => maj,
            Self::Minority => !maj,
            Self::ExactlyOne => (a ^ b ^ c) & !(a & b & c),
            Self::ExactlyTwo => maj & !(a ^ b ^ c),
            Self::Parity => a ^ b ^ c,
            Self::Xnor => !(a ^ b ^ c),
            Self::MuxA => (a & b) | (!a & c),
            Self::MuxB => (b & a) | (!b & c),
            Self::MuxC => (c & a) | (!c & b),
            Self::InverseMuxA => (a & c) | (!a & b),
            Self::InverseMuxB => (b & c) | (!b & a),
            Self::InverseMuxC => (c & b) | (!c & a),
            Self::ConditionalInvertA => (a & !b) | (!a & c),
            Self::ConditionalInvertB => (b & !a) | (!b & c),
            Self::ConditionalInvertC => (c & !a) | (!c & b),
            Self::ConditionalXorA => a & (b ^ c),
            Self::ConditionalXorB => b & (a ^ c),
            Self::ConditionalXorC => c & (a ^ b),
            Self::ConditionalOrA => a & (b | c),
            Self::ConditionalOrB => b & (a | c),
            Self::ConditionalOrC => c & (a | b),
            Self::Nand => !(a & b & c),
            Self::Nor => !(a | b | c),
            Self::PairwiseXorA => (a ^ b) | (!a & !b & c),
            Self::PairwiseXorB => (b ^ c) | (!b & !c & a),
            Self::PairwiseXorC => (c ^ a) | (!c & !a & b),
            Self::SomeButNotAll => (a | b | c) & !(a & b & c),
            Self::Unanimous => (a & b & c) | (!a & !b & !c),
            Self::ChainImplication => (!a | b) & (!b | c),
            Self::MonotoneDecreasing => !((!a & b) | (!b & c)),
            Self::EqualAB => !(a ^ b),
            Self::EqualBC => !(b ^ c),
            Self::EqualCA => !(c ^ a),
            Self::Alternation => (a ^ b) & (b ^ c),
            Self::WeightedParity => a ^ (b & c),
            Self::AndXorC => (a & b) ^ c,
            Self::DiffToOr => a ^ (b | c),
            Self::ImpliesThenC => (!a | b) & c,
        }
    }

    /// The gate's 8-row truth table, usable with [`evaluate_gate`].
    #[inline]
    #[must_use]
    pub const fn truth_table(self) -> u8 {
        (self.apply(LANE_A, LANE_B, LANE_C) & 0xFF) as u8
    }

    /// Stable snake_case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AllTrue => "all_true",
            Self::AnyTrue => "any_true",
            Self::Majority => "majority",
            Self::Minority => "minority",
            Self::ExactlyOne => "exactly_one",
            Self::ExactlyTwo => "exactly_two",
            Self::Parity => "parity",
            Self::Xnor => "xnor",
            Self::MuxA => "mux_a",
            Self::MuxB => "mux_b",
            Self::MuxC => "mux_c",
            Self::InverseMuxA => "inverse_mux_a",
            Self::InverseMuxB => "inverse_mux_b",
            Self::InverseMuxC => "inverse_mux_c",
            Self::ConditionalInvertA => "conditional_invert_a",
            Self::ConditionalInvertB => "conditional_invert_b",
            Self::ConditionalInvertC => "conditional_invert_c",
            Self::ConditionalXorA => "conditional_xor_a",
            Self::ConditionalXorB => "conditional_xor_b",
            Self::ConditionalXorC => "conditional_xor_c",
            Self::ConditionalOrA => "conditional_or_a",
            Self::ConditionalOrB => "conditional_or_b",
            Self::ConditionalOrC => "conditional_or_c",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::PairwiseXorA => "pairwise_xor_a",
            Self::PairwiseXorB => "pairwise_xor_b",
            Self::PairwiseXorC => "pairwise_xor_c",
            Self::SomeButNotAll => "some_but_not_all",
            Self::Unanimous => "unanimous",
            Self::ChainImplication => "chain_implication",
            Self::MonotoneDecreasing => "monotone_decreasing",
            Self::EqualAB => "equal_ab",
            Self::EqualBC => "equal_bc",
            Self::EqualCA => "equal_ca",
            Self::Alternation => "alternation",
            Self::WeightedParity => "weighted_parity",
            Self::AndXorC => "and_xor_c",
            Self::DiffToOr => "diff_to_or",
            Self::ImpliesThenC => "implies_then_c",
        }
    }
}

/// The combinator fed to a base spatial function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Generic truth table. Composition never draws mask `0`.
    TruthTable(u8),
    /// A curated gate.
    Named(NamedGate),
}

impl Gate {
    /// Applies the gate lane-wise.
    #[inline]
    #[must_use]
    pub const fn apply(self, a: u32, b: u32, c: u32) -> u32 {
        match self {
            Self::TruthTable(mask) => evaluate_gate(mask, a, b, c),
            Self::Named(gate) => gate.apply(a, b, c),
        }
    }

    /// Truth table of either variant.
    #[inline]
    #[must_use]
    pub const fn truth_table(self) -> u8 {
        match self {
            Self::TruthTable(mask) => mask,
            Self::Named(gate) => gate.truth_table(),
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TruthTable(mask) => write!(f, "table_{mask:08b}"),
            Self::Named(gate) => f.write_str(gate.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [(u32, u32, u32); 6] = [
        (0, 0, 0),
        (u32::MAX, u32::MAX, u32::MAX),
        (0xDEAD_BEEF, 0x1234_5678, 0x0F0F_F0F0),
        (0xAAAA_AAAA, 0x5555_5555, 0xFFFF_0000),
        (1, 2, 3),
        (0x8000_0001, 0x7FFF_FFFE, 0x0000_FFFF),
    ];

    #[test]
    fn test_constant_tables() {
        for (a, b, c) in SAMPLES {
            assert_eq!(evaluate_gate(0, a, b, c), 0, "mask 0 must be all-zero");
            assert_eq!(evaluate_gate(255, a, b, c), u32::MAX, "mask 255 must be all-one");
        }
    }

    #[test]
    fn test_single_minterm_lanes() {
        // mask 0b0000_0110 selects minterms 001 (~a&~b&c) and 010 (~a&b&~c)
        assert_eq!(evaluate_gate(0b0000_0110, 0, u32::MAX, 0), u32::MAX);
        assert_eq!(evaluate_gate(0b0000_0110, 0, 0, u32::MAX), u32::MAX);
        assert_eq!(evaluate_gate(0b0000_0110, u32::MAX, u32::MAX, 0), 0);
        // pattern 011 → ~a & b & c
        assert_eq!(evaluate_gate(1 << 0b011, 0, 0xF0, 0xFF), 0xF0);
    }

    #[test]
    fn test_projection_tables() {
        let (a, b, c) = (0xDEAD_BEEF, 0x1234_5678, 0x0F0F_F0F0);
        assert_eq!(evaluate_gate(0xF0, a, b, c), a);
        assert_eq!(evaluate_gate(0xCC, a, b, c), b);
        assert_eq!(evaluate_gate(0xAA, a, b, c), c);
    }

    #[test]
    fn test_named_gates_match_their_truth_tables() {
        for gate in NamedGate::ALL {
            let mask = gate.truth_table();
            for (a, b, c) in SAMPLES {
                assert_eq!(
                    gate.apply(a, b, c),
                    evaluate_gate(mask, a, b, c),
                    "{} disagrees with table {mask:08b}",
                    gate.name()
                );
            }
        }
    }

    #[test]
    fn test_known_named_tables() {
        assert_eq!(NamedGate::Majority.truth_table(), 0b1110_1000);
        assert_eq!(NamedGate::Parity.truth_table(), 0b1001_0110);
        assert_eq!(NamedGate::AllTrue.truth_table(), 0b1000_0000);
        assert_eq!(NamedGate::Nor.truth_table(), 0b0000_0001);
        assert_eq!(
            NamedGate::Minority.truth_table(),
            !NamedGate::Majority.truth_table()
        );
    }

    #[test]
    fn test_catalog_names_unique() {
        let mut names: Vec<_> = NamedGate::ALL.iter().map(|g| g.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NamedGate::ALL.len());
    }

    #[test]
    fn test_gate_display() {
        assert_eq!(Gate::TruthTable(6).to_string(), "table_00000110");
        assert_eq!(Gate::Named(NamedGate::MuxB).to_string(), "mux_b");
    }
}
