//! # Field Scenarios
//!
//! End-to-end checks from pattern to packed volume.

use bitfields_procedural::{
    evaluate_gate, export_table, FnPattern, PatternComposer, PatternFunction,
    VolumeTexturePacker, VoxelFieldBuilder, WorldSeed,
};
use bitfields_shared::{Color, GateMode, GridDimensions, Palette};

fn duo() -> Palette {
    Palette::from_hex("duo", &["#ff0000", "#00ff00"]).unwrap()
}

/// Test: the 4x4x4 diagonal-sum scenario classifies the first row correctly.
#[test]
fn test_diagonal_sum_scenario() {
    let dims = GridDimensions::new(4, 4, 4);
    let pattern = FnPattern::new(4, |x, y, z| i64::from(x + y + z)).unwrap();
    let field = VoxelFieldBuilder::new(dims, 2).build(&pattern, &duo()).unwrap();
    let volume = VolumeTexturePacker::pack(&field);

    assert!(!volume.is_occupied(0, 0, 0), "state 0 must be void");
    assert!(!volume.is_occupied(1, 0, 0), "state 1 must be void");
    assert!(volume.is_occupied(2, 0, 0));
    assert!(volume.is_occupied(3, 0, 0));
    assert_eq!(volume.color_id_at(2, 0, 0), 0);
    assert_eq!(volume.color_id_at(3, 0, 0), 1);

    let red = field.voxels().iter().find(|v| (v.x, v.y, v.z) == (2, 0, 0)).unwrap();
    assert_eq!(red.color, Color::rgb(255, 0, 0));
}

/// Test: the two-minterm mask is active in every lane for b = all ones.
#[test]
fn test_two_minterm_mask_scenario() {
    assert_eq!(evaluate_gate(0b0000_0110, 0, 0xFFFF_FFFF, 0), 0xFFFF_FFFF);
}

/// Test: sparse list and dense volumes agree cell by cell for random builds.
#[test]
fn test_volume_matches_field_for_random_compositions() {
    let dims = GridDimensions::new(12, 9, 7);
    let palette = Palette::from_hex("tri", &["#111111", "#222222", "#333333"]).unwrap();
    let composer = PatternComposer::new(dims, GateMode::Mixed);

    for seed in 0..16u64 {
        let mut rng = WorldSeed::new(seed).rng();
        let pattern = composer.compose(&mut rng, 7).unwrap();
        let transparent = 4;
        let field = VoxelFieldBuilder::new(dims, transparent)
            .build(&pattern, &palette)
            .unwrap();
        let volume = VolumeTexturePacker::pack(&field);

        assert_eq!(volume.occupied_count(), field.len(), "seed {seed}: {pattern}");

        for x in 0..dims.x {
            for y in 0..dims.y {
                for z in 0..dims.z {
                    let state = pattern.state(x, y, z);
                    let (sx, sy, sz) = (i64::from(x), i64::from(y), i64::from(z));
                    assert!(state < pattern.total_states());
                    assert_eq!(
                        volume.is_occupied(sx, sy, sz),
                        state >= transparent,
                        "seed {seed} ({x},{y},{z}) state {state}"
                    );
                    if state >= transparent {
                        let expected = palette.clamp_index(i64::from(state - transparent));
                        assert_eq!(volume.color_id_at(sx, sy, sz), expected);
                    }
                }
            }
        }
    }
}

/// Test: the same seed reproduces the same export byte for byte.
#[test]
fn test_seeded_builds_export_identically() {
    let dims = GridDimensions::new(10, 10, 10);
    let composer = PatternComposer::new(dims, GateMode::Mixed);

    let build = || {
        let pattern = composer.compose(&mut WorldSeed::new(2024).rng(), 9).unwrap();
        let field = VoxelFieldBuilder::new(dims, 5).build(&pattern, &duo()).unwrap();
        export_table(&field)
    };

    assert_eq!(build(), build());
}

/// Test: a default-size grid builds in reasonable time.
#[test]
fn test_large_grid_build_time() {
    let dims = GridDimensions::new(128, 64, 128);
    let pattern = PatternComposer::new(dims, GateMode::Mixed)
        .compose(&mut WorldSeed::new(3).rng(), 10)
        .unwrap();

    let start = std::time::Instant::now();
    let field = VoxelFieldBuilder::new(dims, 5).build(&pattern, &duo()).unwrap();
    let volume = VolumeTexturePacker::pack(&field);
    let elapsed = start.elapsed();

    println!(
        "Built {} cells -> {} voxels in {:?}",
        dims.cell_count(),
        field.len(),
        elapsed
    );
    assert_eq!(volume.occupied_count(), field.len());
    assert!(elapsed.as_secs() < 30, "1M-cell build took {elapsed:?}");
}
