//! Property tests for the pathfinder.

use proptest::prelude::*;
use tileworld_common::TileId;
use tileworld_kernel::{PlacementSpec, World};
use tileworld_nav::{CARDINAL_COST, DIAGONAL_COST, SearchOptions, find_path, path_cost};

/// Optimal 8-way cost on an empty grid.
fn octile(a: TileId, b: TileId) -> f64 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let diagonal = dx.min(dy);
    let straight = dx.max(dy) - diagonal;
    f64::from(diagonal) * DIAGONAL_COST + f64::from(straight) * CARDINAL_COST
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn open_grid_paths_are_optimal(
        sx in -20i32..20, sy in -20i32..20,
        ex in -20i32..20, ey in -20i32..20,
    ) {
        let world = World::new();
        let start = TileId::new(sx, sy);
        let end = TileId::new(ex, ey);
        let options = SearchOptions::default().with_max_iterations(20_000);
        let path = find_path(world.chunks(), start, end, &options).expect("open grid is connected");

        prop_assert_eq!(path.first(), Some(&start));
        prop_assert_eq!(path.last(), Some(&end));
        prop_assert_eq!(path.len() as u32, start.chebyshev(end) + 1);
        prop_assert!((path_cost(&path) - octile(start, end)).abs() < 1e-6);
    }

    #[test]
    fn paths_avoid_obstacles_and_corners(
        blocks in prop::collection::vec((-8i32..8, -8i32..8, 1u32..3, 1u32..3), 0..12),
        ex in -10i32..10, ey in -10i32..10,
    ) {
        let mut world = World::new();
        for (x, y, w, h) in blocks {
            let _ = world.try_place(PlacementSpec::new(x, y, w, h));
        }
        let start = TileId::new(-12, -12);
        let end = TileId::new(ex, ey);
        prop_assume!(!world.chunks().is_occupied(start));

        if let Some(path) = find_path(world.chunks(), start, end, &SearchOptions::default()) {
            for pair in path.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(a.is_adjacent(b));
                if a.x != b.x && a.y != b.y {
                    prop_assert!(!world.chunks().is_occupied(TileId::new(b.x, a.y)));
                    prop_assert!(!world.chunks().is_occupied(TileId::new(a.x, b.y)));
                }
            }
            for tile in &path[..path.len() - 1] {
                prop_assert!(*tile == start || !world.chunks().is_occupied(*tile));
            }
        }
    }
}
