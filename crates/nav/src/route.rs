use crate::astar::{SearchOptions, find_path};
use tileworld_common::TileId;
use tileworld_kernel::{World, WorldError};

/// Search for a path between two tiles and, if one exists, connect it.
///
/// `Ok(None)` means no path was found within the budget; the world is left
/// untouched and the caller should treat the connection as impossible.
pub fn route_and_connect(
    world: &mut World,
    start: TileId,
    end: TileId,
    options: &SearchOptions,
) -> Result<Option<Vec<TileId>>, WorldError> {
    let Some(path) = find_path(world.chunks(), start, end, options) else {
        return Ok(None);
    };
    world.connect_path(&path)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileworld_kernel::PlacementSpec;

    #[test]
    fn connects_two_entities() {
        let mut w = World::new();
        w.place(PlacementSpec::new(0, 0, 2, 2));
        w.place(PlacementSpec::new(5, 3, 2, 2));
        let start = TileId::new(1, 1);
        let end = TileId::new(5, 3);
        let path = route_and_connect(&mut w, start, end, &SearchOptions::default())
            .unwrap()
            .unwrap();
        for pair in path.windows(2) {
            assert!(w.are_connected(pair[0], pair[1]));
            assert!(w.are_connected(pair[1], pair[0]));
        }
        assert_eq!(w.connection_count(), path.len() - 1);
    }

    #[test]
    fn no_path_leaves_world_untouched() {
        let mut w = World::new();
        let before = w.clone();
        let tight = SearchOptions::default().with_max_iterations(1);
        let result = route_and_connect(&mut w, TileId::new(0, 0), TileId::new(9, 9), &tight);
        assert_eq!(result, Ok(None));
        assert_eq!(w, before);
    }

    #[test]
    fn routed_diagonals_then_block_placement() {
        let mut w = World::new();
        let path = route_and_connect(
            &mut w,
            TileId::new(0, 0),
            TileId::new(1, 1),
            &SearchOptions::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(path, vec![TileId::new(0, 0), TileId::new(1, 1)]);
        assert!(w.try_place(PlacementSpec::new(1, 0, 1, 1)).is_err());
    }
}
