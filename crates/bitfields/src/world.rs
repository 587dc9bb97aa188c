//! # World
//!
//! One complete CPU-side build: selection, composition, field, volumes and
//! placement. Immutable once built; a rebuild produces a new `World`.

use std::time::Instant;

use bitfields_procedural::{
    export_file_name, export_table, ComposedPattern, PatternComposer, VolumeTexturePacker,
    VolumeTextures, VoxelField, VoxelFieldBuilder, WorldSeed,
};
use bitfields_rendering::{CameraState, CpuRayMarcher, RayMarchUniforms, VolumeBounds};
use bitfields_shared::{Color, GridDimensions, WorldConfig};
use rand::Rng;
use serde::Serialize;

use crate::catalog::PaletteCatalog;
use crate::error::EngineResult;
use crate::selection::{pick_palette, pick_two_distinct, PaletteSelection};

/// Clear color and ground plane for the host scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    /// Clear color.
    pub background: Color,
    /// Ground plane color.
    pub ground: Color,
    /// Ground plane edge length: three times the wider horizontal extent.
    pub ground_size: f32,
    /// Ground plane height: the bottom of the volume.
    pub ground_height: f32,
}

impl Backdrop {
    fn pick<R: Rng + ?Sized>(rng: &mut R, selection: &PaletteSelection, bounds: &VolumeBounds) -> Self {
        let (background, ground) =
            pick_two_distinct(rng, &selection.palette).unwrap_or((Color::BLACK, Color::BLACK));
        let extent = bounds.max - bounds.min;
        Self {
            background,
            ground,
            ground_size: extent.x.max(extent.z) * 3.0,
            ground_height: bounds.min.y,
        }
    }
}

/// Host-facing summary of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldStats {
    /// Palette name.
    pub palette_name: String,
    /// Colored states.
    pub filled: u32,
    /// Void states.
    pub transparent: u32,
    /// `filled + transparent`.
    pub total_states: u32,
    /// Non-void cells.
    pub voxel_count: usize,
    /// Grid extent.
    pub grid: GridDimensions,
    /// Composition summary.
    pub pattern: String,
}

/// A finished build.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    seed: WorldSeed,
    selection: PaletteSelection,
    pattern: ComposedPattern,
    field: VoxelField,
    volume: VolumeTextures,
    bounds: VolumeBounds,
    backdrop: Backdrop,
}

impl World {
    /// Draws a palette and a composition from `seed` and builds everything.
    ///
    /// # Errors
    ///
    /// Returns a config error for an invalid `config`,
    /// [`EngineError::NoPaletteAvailable`](crate::EngineError::NoPaletteAvailable)
    /// when the catalog cannot serve the drawn count, or a pattern error.
    pub fn build(config: &WorldConfig, catalog: &dyn PaletteCatalog, seed: WorldSeed) -> EngineResult<Self> {
        config.validate()?;
        let mut rng = seed.rng();
        let selection = pick_palette(&mut rng, config, catalog)?;
        Self::assemble(config, selection, seed, &mut rng)
    }

    /// Builds with a fixed palette selection; only the composition is drawn.
    ///
    /// # Errors
    ///
    /// As [`Self::build`], minus catalog errors, plus any error from
    /// [`PaletteSelection::validate`].
    pub fn with_selection(
        config: &WorldConfig,
        selection: PaletteSelection,
        seed: WorldSeed,
    ) -> EngineResult<Self> {
        config.validate()?;
        selection.validate()?;
        Self::assemble(config, selection, seed, &mut seed.rng())
    }

    fn assemble<R: Rng + ?Sized>(
        config: &WorldConfig,
        selection: PaletteSelection,
        seed: WorldSeed,
        rng: &mut R,
    ) -> EngineResult<Self> {
        let start = Instant::now();
        let grid = config.grid;

        let pattern =
            PatternComposer::new(grid, config.gate_mode).compose(rng, selection.total_states())?;
        let field = VoxelFieldBuilder::new(grid, selection.transparent).build(&pattern, &selection.palette)?;
        let volume = VolumeTexturePacker::pack(&field);
        let bounds = VolumeBounds::centered(grid, config.cell_size);
        let backdrop = Backdrop::pick(rng, &selection, &bounds);

        tracing::info!(
            grid = %grid,
            palette = %selection.palette.name,
            filled = selection.filled,
            transparent = selection.transparent,
            voxels = field.len(),
            pattern = %pattern,
            elapsed_ms = start.elapsed().as_millis(),
            "world built"
        );

        Ok(Self {
            config: config.clone(),
            seed,
            selection,
            pattern,
            field,
            volume,
            bounds,
            backdrop,
        })
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Seed the draws came from.
    #[must_use]
    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// State counts and palette.
    #[must_use]
    pub fn selection(&self) -> &PaletteSelection {
        &self.selection
    }

    /// The composed pattern function.
    #[must_use]
    pub fn pattern(&self) -> &ComposedPattern {
        &self.pattern
    }

    /// Sparse voxels.
    #[must_use]
    pub fn field(&self) -> &VoxelField {
        &self.field
    }

    /// Packed volumes.
    #[must_use]
    pub fn volume(&self) -> &VolumeTextures {
        &self.volume
    }

    /// World placement of the grid.
    #[must_use]
    pub fn bounds(&self) -> &VolumeBounds {
        &self.bounds
    }

    /// Clear color and ground plane.
    #[must_use]
    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    /// Summary for the host.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            palette_name: self.selection.palette.name.clone(),
            filled: self.selection.filled,
            transparent: self.selection.transparent,
            total_states: self.selection.total_states(),
            voxel_count: self.field.len(),
            grid: self.config.grid,
            pattern: self.pattern.to_string(),
        }
    }

    /// Row-per-voxel export of the field.
    #[must_use]
    pub fn export_table(&self) -> String {
        export_table(&self.field)
    }

    /// `<palette>_<X>x<Y>x<Z>.csv`.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.field)
    }

    /// Ray-marched RGBA8 frame on the CPU.
    #[must_use]
    pub fn render_cpu(&self, camera: &CameraState, width: u32, height: u32) -> Vec<[u8; 4]> {
        let mut uniforms = RayMarchUniforms::new(&self.bounds, self.config.grid, &self.config.ray_march);
        uniforms.set_camera(camera);
        CpuRayMarcher::new(&self.volume, &self.selection.palette, uniforms).render(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, PaletteEntry};
    use crate::error::EngineError;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with(PaletteEntry::new("pair", &["#204060", "#e0c080"]))
            .with(PaletteEntry::new("trio", &["#ff0000", "#00ff00", "#0000ff"]))
    }

    fn small() -> WorldConfig {
        WorldConfig {
            grid: GridDimensions::new(12, 10, 8),
            states_range: [2, 3],
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = World::build(&small(), &catalog(), WorldSeed::new(77)).unwrap();
        let b = World::build(&small(), &catalog(), WorldSeed::new(77)).unwrap();
        assert_eq!(a.stats(), b.stats());
        assert_eq!(a.export_table(), b.export_table());
        assert_eq!(a.backdrop(), b.backdrop());
    }

    #[test]
    fn test_stats_match_field() {
        let world = World::build(&small(), &catalog(), WorldSeed::new(5)).unwrap();
        let stats = world.stats();
        assert_eq!(stats.voxel_count, world.field().len());
        assert_eq!(stats.total_states, stats.filled + stats.transparent);
        assert_eq!(stats.total_states, world.field().total_states());
        assert_eq!(world.volume().occupied_count(), world.field().len());
    }

    #[test]
    fn test_export_header_agrees_with_stats() {
        let world = World::build(&small(), &catalog(), WorldSeed::new(5)).unwrap();
        let stats = world.stats();
        let table = world.export_table();
        assert!(table.contains(&format!("\nfilled,{}\n", stats.filled)));
        assert!(table.contains(&format!("\ntransparent,{}\n", stats.transparent)));
    }

    #[test]
    fn test_with_selection_rejects_short_palette() {
        let world = World::build(&small(), &catalog(), WorldSeed::new(5)).unwrap();
        let mut selection = world.selection().clone();
        selection.filled += 1;
        assert!(matches!(
            World::with_selection(&small(), selection, WorldSeed::new(6)),
            Err(EngineError::PaletteSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_backdrop_sits_under_volume() {
        let world = World::build(&small(), &catalog(), WorldSeed::new(5)).unwrap();
        let backdrop = world.backdrop();
        assert_eq!(backdrop.ground_height, -5.0);
        assert_eq!(backdrop.ground_size, 36.0);
        assert_ne!(backdrop.background, backdrop.ground);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WorldConfig {
            cell_size: 0.0,
            ..small()
        };
        assert!(matches!(
            World::build(&config, &catalog(), WorldSeed::new(1)),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_with_selection_keeps_palette() {
        let world = World::build(&small(), &catalog(), WorldSeed::new(11)).unwrap();
        let resized = World::with_selection(
            &small().with_grid(GridDimensions::new(6, 6, 6)),
            world.selection().clone(),
            WorldSeed::new(12),
        )
        .unwrap();
        assert_eq!(resized.selection(), world.selection());
        assert_eq!(resized.field().dims(), GridDimensions::new(6, 6, 6));
    }
}
