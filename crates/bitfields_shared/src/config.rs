//! # World Configuration
//!
//! One immutable value per build. Nothing downstream reads global state:
//! a rebuild with different dimensions is simply a build with a new config.
//!
//! ```toml
//! cell_size = 1.0
//! states_range = [2, 32]
//! renderer = "ray_march"
//!
//! [grid]
//! x = 128
//! y = 256
//! z = 128
//!
//! [ray_march]
//! step_size = 0.125
//! max_steps = 4096
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CELL_SIZE, DEFAULT_GRID, DEFAULT_STATES_RANGE, DEFAULT_TRANSPARENT_FACTOR,
    MAX_FILLED_STATES,
};
use crate::error::{ConfigError, ConfigResult};
use crate::grid::GridDimensions;

/// Which renderer the host would like. The GPU ray marcher still falls back
/// to instancing when the backend cannot sample integer 3D textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererPreference {
    /// Full-screen volumetric ray march over 3D textures.
    #[default]
    RayMarch,
    /// One instanced cube per visible voxel.
    Instanced,
}

/// Which family of gates the pattern composer may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// Random 8-bit truth tables only.
    TruthTable,
    /// The curated named-gate catalog only.
    Named,
    /// Either, with equal probability.
    #[default]
    Mixed,
}

/// Shading and stepping constants for the ray marcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RayMarchSettings {
    /// Distance between samples, in world units.
    pub step_size: f32,
    /// Hard bound on samples per ray.
    pub max_steps: u32,
    /// Direction the light travels (normalized on upload).
    pub light_dir: [f32; 3],
    /// Ambient term.
    pub ambient: f32,
    /// Diffuse weight.
    pub diffuse: f32,
    /// Depth bias for the shadow-map comparison.
    pub shadow_bias: f32,
    /// Visibility applied to shadowed hits.
    pub shadow_visibility: f32,
}

impl Default for RayMarchSettings {
    fn default() -> Self {
        Self {
            step_size: 0.125,
            max_steps: 4096,
            light_dir: [0.35, -1.0, 0.45],
            ambient: 0.2,
            diffuse: 0.8,
            shadow_bias: 0.005,
            shadow_visibility: 0.2,
        }
    }
}

impl RayMarchSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRayMarch`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        let bad = |field, reason| Err(ConfigError::InvalidRayMarch { field, reason });

        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return bad("step_size", "must be finite and positive");
        }
        if self.max_steps == 0 {
            return bad("max_steps", "must be at least 1");
        }
        let [lx, ly, lz] = self.light_dir;
        if !(lx.is_finite() && ly.is_finite() && lz.is_finite()) || lx * lx + ly * ly + lz * lz == 0.0 {
            return bad("light_dir", "must be a finite non-zero vector");
        }
        if !(0.0..=1.0).contains(&self.shadow_visibility) {
            return bad("shadow_visibility", "must be in [0, 1]");
        }
        if !(self.ambient.is_finite() && self.diffuse.is_finite() && self.shadow_bias.is_finite()) {
            return bad("shading", "ambient, diffuse and shadow_bias must be finite");
        }
        Ok(())
    }
}

/// Everything a build needs besides the palette catalog and the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Grid extent.
    pub grid: GridDimensions,
    /// Edge length of one voxel in world units.
    pub cell_size: f32,
    /// Inclusive range `filled` is drawn from.
    pub states_range: [u32; 2],
    /// `transparent` is drawn from `[floor(filled * f0), floor(filled * f1)]`.
    pub transparent_factor: [f32; 2],
    /// Preferred renderer.
    pub renderer: RendererPreference,
    /// Gate families the composer may use.
    pub gate_mode: GateMode,
    /// Drop fully enclosed voxels from the instanced path.
    pub cull_buried: bool,
    /// Ray-march constants.
    pub ray_march: RayMarchSettings,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid: DEFAULT_GRID,
            cell_size: DEFAULT_CELL_SIZE,
            states_range: DEFAULT_STATES_RANGE,
            transparent_factor: DEFAULT_TRANSPARENT_FACTOR,
            renderer: RendererPreference::default(),
            gate_mode: GateMode::default(),
            cull_buried: true,
            ray_march: RayMarchSettings::default(),
        }
    }
}

impl WorldConfig {
    /// Returns a copy with different grid dimensions.
    #[must_use]
    pub fn with_grid(mut self, grid: GridDimensions) -> Self {
        self.grid = grid;
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and any validation
    /// error from [`Self::validate`].
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks every invariant the builders rely on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> ConfigResult<()> {
        self.grid.validate()?;

        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }

        let [min, max] = self.states_range;
        if min < 1 || min > max || max > MAX_FILLED_STATES {
            return Err(ConfigError::InvalidStatesRange { min, max });
        }

        let [f0, f1] = self.transparent_factor;
        if !(f0.is_finite() && f1.is_finite()) || f0 < 0.0 || f0 > f1 {
            return Err(ConfigError::InvalidTransparentFactor { min: f0, max: f1 });
        }

        self.ray_march.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid, GridDimensions::new(128, 256, 128));
        assert_eq!(config.states_range, [2, 32]);
        assert_eq!(config.renderer, RendererPreference::RayMarch);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorldConfig::from_toml_str(
            r#"
            renderer = "instanced"

            [grid]
            x = 16
            y = 8
            z = 4

            [ray_march]
            max_steps = 512
            "#,
        )
        .unwrap();

        assert_eq!(config.grid, GridDimensions::new(16, 8, 4));
        assert_eq!(config.renderer, RendererPreference::Instanced);
        assert_eq!(config.ray_march.max_steps, 512);
        assert!((config.ray_march.step_size - 0.125).abs() < f32::EPSILON);
        assert!((config.cell_size - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_cell = WorldConfig {
            cell_size: 0.0,
            ..WorldConfig::default()
        };
        assert!(matches!(zero_cell.validate(), Err(ConfigError::InvalidCellSize(_))));

        let inverted = WorldConfig {
            states_range: [8, 2],
            ..WorldConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvalidStatesRange { min: 8, max: 2 })
        ));

        let huge = WorldConfig {
            states_range: [2, u32::MAX],
            ..WorldConfig::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::InvalidStatesRange { max: u32::MAX, .. })
        ));
        let at_cap = WorldConfig {
            states_range: [2, MAX_FILLED_STATES],
            ..WorldConfig::default()
        };
        assert!(at_cap.validate().is_ok());

        let mut no_steps = WorldConfig::default();
        no_steps.ray_march.max_steps = 0;
        assert!(matches!(
            no_steps.validate(),
            Err(ConfigError::InvalidRayMarch { field: "max_steps", .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = WorldConfig::from_toml_str("grid = 12");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
