//! # Engine
//!
//! Host API over a swapped [`Scene`]:
//!
//! | operation        | effect                                              |
//! |------------------|-----------------------------------------------------|
//! | `build`          | new palette + composition, swap in                  |
//! | `rebuild`        | same, for a new config                              |
//! | `regenerate`     | same, for the current config                        |
//! | `set_grid`       | keep palette, new composition on new dims           |
//! | `resize`         | target size only, field untouched                   |
//! | `get_stats`      | palette, state counts, voxel count                  |
//! | `export_table`   | row-per-voxel text of the current field             |
//!
//! Builds are serialized. A failed build leaves the current scene in place.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bitfields_procedural::WorldSeed;
use bitfields_rendering::{
    create_renderer, CameraState, GpuContext, RenderStats, RendererInputs, ShadowResources,
    VoxelRenderer,
};
use bitfields_shared::{GridDimensions, WorldConfig};
use parking_lot::Mutex;

use crate::catalog::PaletteCatalog;
use crate::error::{EngineError, EngineResult};
use crate::swap::SwapSlot;
use crate::world::{World, WorldStats};

/// A world and its renderer, published together.
pub struct Scene {
    world: World,
    renderer: Option<Box<dyn VoxelRenderer>>,
    generation: u64,
}

impl Scene {
    /// The CPU-side build.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// GPU renderer; `None` for a headless engine.
    #[must_use]
    pub fn renderer(&self) -> Option<&dyn VoxelRenderer> {
        self.renderer.as_deref()
    }

    /// Publication number, starting at 1.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records this scene's draw into an open pass.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if let Some(renderer) = &self.renderer {
            renderer.draw(pass);
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("generation", &self.generation)
            .field("stats", &self.world.stats())
            .field("renderer", &self.renderer.as_ref().map(|r| r.kind()))
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct ViewState {
    camera: Option<CameraState>,
    width: u32,
    height: u32,
}

impl ViewState {
    #[allow(clippy::cast_precision_loss)]
    fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    fn camera_for(&self, world: &World) -> CameraState {
        self.camera
            .unwrap_or_else(|| CameraState::framing(world.bounds(), self.aspect()))
    }
}

/// Procedural voxel engine.
pub struct Engine {
    catalog: Arc<dyn PaletteCatalog>,
    seed: WorldSeed,
    gpu: Option<GpuContext>,
    shadow: Mutex<Option<Arc<ShadowResources>>>,
    scene: SwapSlot<Scene>,
    builds: AtomicU64,
    build_lock: Mutex<()>,
    view: Mutex<ViewState>,
}

impl Engine {
    /// Engine without a GPU: builds, stats, export and CPU frames.
    #[must_use]
    pub fn headless(catalog: impl PaletteCatalog + 'static, seed: WorldSeed) -> Self {
        Self::create(Arc::new(catalog), seed, None)
    }

    /// Engine that also creates a renderer for every build.
    #[must_use]
    pub fn with_gpu(catalog: impl PaletteCatalog + 'static, seed: WorldSeed, gpu: GpuContext) -> Self {
        Self::create(Arc::new(catalog), seed, Some(gpu))
    }

    fn create(catalog: Arc<dyn PaletteCatalog>, seed: WorldSeed, gpu: Option<GpuContext>) -> Self {
        Self {
            catalog,
            seed,
            gpu,
            shadow: Mutex::new(None),
            scene: SwapSlot::new(),
            builds: AtomicU64::new(0),
            build_lock: Mutex::new(()),
            view: Mutex::new(ViewState {
                camera: None,
                width: 1,
                height: 1,
            }),
        }
    }

    /// Root seed; build `n` draws from `seed.derive(n)`.
    #[must_use]
    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Builds a world from scratch and makes it current.
    ///
    /// # Errors
    ///
    /// Returns config, catalog, pattern or render errors. The current scene
    /// is kept on failure.
    pub fn build(&self, config: &WorldConfig) -> EngineResult<Arc<Scene>> {
        let _guard = self.build_lock.lock();
        let seed = self.next_seed();
        let world = World::build(config, self.catalog.as_ref(), seed)?;
        self.install(world)
    }

    /// Replaces the current scene with a build of `config`.
    ///
    /// # Errors
    ///
    /// As [`Self::build`].
    pub fn rebuild(&self, config: &WorldConfig) -> EngineResult<Arc<Scene>> {
        if let Some(previous) = self.scene.load() {
            tracing::debug!(replacing = previous.generation, "rebuild requested");
        }
        self.build(config)
    }

    /// New palette and composition with the current configuration.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotBuilt`] before the first build, otherwise as
    /// [`Self::build`].
    pub fn regenerate(&self) -> EngineResult<Arc<Scene>> {
        let config = self.current()?.world.config().clone();
        self.rebuild(&config)
    }

    /// New composition on `grid`, keeping the current palette selection.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotBuilt`] before the first build, otherwise as
    /// [`Self::build`].
    pub fn set_grid(&self, grid: GridDimensions) -> EngineResult<Arc<Scene>> {
        let _guard = self.build_lock.lock();
        let current = self.current()?;
        let config = current.world.config().clone().with_grid(grid);
        let seed = self.next_seed();
        let world = World::with_selection(&config, current.world.selection().clone(), seed)?;
        self.install(world)
    }

    /// Records the target size and forwards it to the current renderer.
    /// The voxel field is not touched.
    pub fn resize(&self, width: u32, height: u32) {
        let view = {
            let mut view = self.view.lock();
            view.width = width.max(1);
            view.height = height.max(1);
            *view
        };
        if let (Some(gpu), Some(scene)) = (&self.gpu, self.scene.load()) {
            if let Some(renderer) = scene.renderer() {
                renderer.resize(&gpu.queue, view.width, view.height);
                if view.camera.is_none() {
                    renderer.update_camera(&gpu.queue, &view.camera_for(&scene.world));
                }
            }
        }
        tracing::debug!(width = view.width, height = view.height, "resized");
    }

    /// Sets the camera used from now on.
    pub fn update_camera(&self, camera: CameraState) {
        self.view.lock().camera = Some(camera);
        if let (Some(gpu), Some(scene)) = (&self.gpu, self.scene.load()) {
            if let Some(renderer) = scene.renderer() {
                renderer.update_camera(&gpu.queue, &camera);
            }
        }
    }

    /// Shadow map bound by subsequent builds; `None` disables shadows.
    pub fn set_shadow(&self, shadow: Option<ShadowResources>) {
        *self.shadow.lock() = shadow.map(Arc::new);
    }

    /// Snapshot for one frame. Hold it for the whole frame.
    #[must_use]
    pub fn current_scene(&self) -> Option<Arc<Scene>> {
        self.scene.load()
    }

    /// Number of scenes published so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.scene.generation()
    }

    /// Palette name, state counts and voxel count of the current build.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotBuilt`] before the first build.
    pub fn get_stats(&self) -> EngineResult<WorldStats> {
        Ok(self.current()?.world.stats())
    }

    /// Counters of the current renderer, if any.
    #[must_use]
    pub fn render_stats(&self) -> Option<RenderStats> {
        self.scene.load()?.renderer().map(|r| r.stats())
    }

    /// Export table of the current build. Byte-identical across calls until
    /// the next build.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotBuilt`] before the first build.
    pub fn export_table(&self) -> EngineResult<String> {
        Ok(self.current()?.world.export_table())
    }

    /// Suggested file name for [`Self::export_table`].
    ///
    /// # Errors
    ///
    /// [`EngineError::NotBuilt`] before the first build.
    pub fn export_file_name(&self) -> EngineResult<String> {
        Ok(self.current()?.world.export_file_name())
    }

    /// Writes the export table into `dir` and returns the file path.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotBuilt`] before the first build, or
    /// [`EngineError::Io`].
    pub fn write_export(&self, dir: impl AsRef<Path>) -> EngineResult<PathBuf> {
        let scene = self.current()?;
        let path = dir.as_ref().join(scene.world.export_file_name());
        std::fs::write(&path, scene.world.export_table())?;
        tracing::info!(path = %path.display(), voxels = scene.world.field().len(), "export written");
        Ok(path)
    }

    /// CPU ray-marched frame of the current build at the current camera.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotBuilt`] before the first build.
    pub fn render_cpu(&self, width: u32, height: u32) -> EngineResult<Vec<[u8; 4]>> {
        let scene = self.current()?;
        let mut view = *self.view.lock();
        view.width = width.max(1);
        view.height = height.max(1);
        Ok(scene
            .world
            .render_cpu(&view.camera_for(&scene.world), view.width, view.height))
    }

    fn current(&self) -> EngineResult<Arc<Scene>> {
        self.scene.load().ok_or(EngineError::NotBuilt)
    }

    fn next_seed(&self) -> WorldSeed {
        self.seed.derive(self.builds.fetch_add(1, Ordering::Relaxed))
    }

    fn install(&self, world: World) -> EngineResult<Arc<Scene>> {
        let renderer = match &self.gpu {
            Some(gpu) => {
                let shadow = self.shadow.lock().clone();
                let config = world.config();
                let renderer = create_renderer(
                    gpu,
                    &RendererInputs {
                        field: world.field(),
                        volume: world.volume(),
                        bounds: *world.bounds(),
                        settings: &config.ray_march,
                        shadow: shadow.as_deref(),
                        preference: config.renderer,
                        cull_buried: config.cull_buried,
                    },
                )?;
                let view = *self.view.lock();
                renderer.resize(&gpu.queue, view.width, view.height);
                renderer.update_camera(&gpu.queue, &view.camera_for(&world));
                Some(renderer)
            }
            None => None,
        };

        let generation = self.scene.generation() + 1;
        let kind = renderer.as_ref().map(|r| r.kind());
        let (scene, previous) = self.scene.store(Scene {
            world,
            renderer,
            generation,
        });
        tracing::info!(
            generation,
            renderer = ?kind,
            replaced = previous.is_some(),
            "scene published"
        );
        Ok(scene)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("seed", &self.seed)
            .field("gpu", &self.gpu.is_some())
            .field("scene", &self.scene)
            .finish_non_exhaustive()
    }
}
