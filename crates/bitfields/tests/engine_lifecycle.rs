//! # Engine Lifecycle
//!
//! Host-visible behaviour of a headless engine across builds: swap
//! semantics, export stability, failure recovery and stats.

use std::sync::Arc;

use bitfields::procedural::WorldSeed;
use bitfields::shared::{GridDimensions, WorldConfig};
use bitfields::{Engine, EngineError, MemoryCatalog, PaletteEntry};

const CATALOG_JSON: &str = r##"{
    "2": [ { "name": "dusk", "colors": ["#1b1f3b", "f2a65a"] } ],
    "3": [
        { "name": "moss", "colors": ["#2d3b2a", "#6b8f47", "#c8d96f"] },
        { "name": "brick/red", "colors": ["#7a1e12", "#b8432b", "#e8b39a"] }
    ]
}"##;

fn engine(seed: u64) -> Engine {
    let catalog = MemoryCatalog::from_json_str(CATALOG_JSON).unwrap();
    Engine::headless(catalog, WorldSeed::new(seed))
}

fn config() -> WorldConfig {
    WorldConfig {
        grid: GridDimensions::new(12, 16, 12),
        states_range: [2, 3],
        ..WorldConfig::default()
    }
}

/// Test: stats before the first build report NotBuilt rather than panicking.
#[test]
fn test_stats_before_build() {
    let engine = engine(1);
    assert!(matches!(engine.get_stats(), Err(EngineError::NotBuilt)));
    assert!(engine.render_stats().is_none());
}

/// Test: a frame holding the old scene is unaffected by a rebuild.
#[test]
fn test_rebuild_swaps_without_touching_held_scene() {
    let engine = engine(7);
    let held = engine.build(&config()).unwrap();
    let held_table = held.world().export_table();

    let next = engine.rebuild(&config()).unwrap();
    assert!(!Arc::ptr_eq(&held, &next));
    assert_eq!(held.world().export_table(), held_table);
    assert_eq!(engine.current_scene().unwrap().generation(), next.generation());
}

/// Test: the same seed replays the same sequence of builds.
#[test]
fn test_builds_replay_from_seed() {
    let a = engine(99);
    let b = engine(99);
    for _ in 0..3 {
        a.build(&config()).unwrap();
        b.build(&config()).unwrap();
        assert_eq!(a.export_table().unwrap(), b.export_table().unwrap());
        assert_eq!(a.get_stats().unwrap(), b.get_stats().unwrap());
    }
}

/// Test: exporting twice without a rebuild yields identical bytes.
#[test]
fn test_export_idempotent() {
    let engine = engine(3);
    engine.build(&config()).unwrap();
    let first = engine.export_table().unwrap();
    let second = engine.export_table().unwrap();
    assert_eq!(first, second);

    let stats = engine.get_stats().unwrap();
    let rows = first.lines().skip(7).count();
    assert_eq!(rows, stats.voxel_count);
    assert!(first.starts_with(&format!("palette_name,{}\n", stats.palette_name)));
}

/// Test: export file lands in the directory with a sanitized name.
#[test]
fn test_write_export() {
    let dir = std::env::temp_dir().join(format!("bitfields-export-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let engine = engine(11);
    engine.build(&config()).unwrap();
    let path = engine.write_export(&dir).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();

    assert!(name.ends_with("_12x16x12.csv"), "{name}");
    assert!(!name.contains('/'));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), engine.export_table().unwrap());

    std::fs::remove_dir_all(&dir).unwrap();
}

/// Test: a build with no palette for the drawn count keeps the old scene.
#[test]
fn test_failed_rebuild_keeps_previous() {
    let engine = engine(5);
    engine.build(&config()).unwrap();
    let before = engine.export_table().unwrap();

    let unreachable = WorldConfig {
        states_range: [4, 4],
        ..config()
    };
    let err = engine.rebuild(&unreachable).unwrap_err();
    assert!(matches!(err, EngineError::NoPaletteAvailable { filled: 4 }));
    assert_eq!(engine.export_table().unwrap(), before);
    assert_eq!(engine.generation(), 1);
}

/// Test: an invalid config is rejected before anything is drawn.
#[test]
fn test_invalid_config_rejected() {
    let engine = engine(5);
    let bad = WorldConfig {
        cell_size: 0.0,
        ..config()
    };
    assert!(matches!(engine.build(&bad), Err(EngineError::Config(_))));
    assert!(engine.current_scene().is_none());
}

/// Test: resize changes the frame size only.
#[test]
fn test_resize_keeps_field() {
    let engine = engine(21);
    engine.build(&config()).unwrap();
    let before = engine.get_stats().unwrap();

    engine.resize(320, 200);
    assert_eq!(engine.get_stats().unwrap(), before);
    assert_eq!(engine.render_cpu(32, 20).unwrap().len(), 32 * 20);
}

/// Test: regenerate reuses the config, set_grid reuses the palette.
#[test]
fn test_regenerate_and_set_grid() {
    let engine = engine(8);
    engine.build(&config()).unwrap();

    let regenerated = engine.regenerate().unwrap();
    assert_eq!(regenerated.world().config(), &config());

    let palette = regenerated.world().selection().palette.clone();
    let resized = engine.set_grid(GridDimensions::new(6, 6, 6)).unwrap();
    assert_eq!(resized.world().selection().palette, palette);
    assert_eq!(engine.get_stats().unwrap().grid, GridDimensions::new(6, 6, 6));
    assert_eq!(engine.generation(), 3);
}

/// Test: a catalog built in code behaves like one parsed from JSON.
#[test]
fn test_in_memory_catalog() {
    let catalog = MemoryCatalog::new().with(PaletteEntry::new("mono", &["#808080"]));
    let engine = Engine::headless(catalog, WorldSeed::new(0));
    let cfg = WorldConfig {
        states_range: [1, 1],
        grid: GridDimensions::new(4, 4, 4),
        ..WorldConfig::default()
    };
    let scene = engine.build(&cfg).unwrap();
    let backdrop = scene.world().backdrop();
    assert_eq!(backdrop.background, backdrop.ground);
}
