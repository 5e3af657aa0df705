use std::collections::{BTreeSet, HashMap, HashSet};
use tileworld_common::TileId;
use tileworld_kernel::ChunkStore;

/// Cost of a diagonal step.
pub const DIAGONAL_COST: f64 = 1.414;
/// Cost of a cardinal step.
pub const CARDINAL_COST: f64 = 1.0;
/// Default cap on expanded nodes.
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

/// Neighbour order: up, up-right, right, down-right, down, down-left, left, up-left.
const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Search tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of nodes popped from the open list before giving up.
    pub max_iterations: usize,
    /// Tiles that stay walkable even when occupied. Start and end always are.
    pub exempt: BTreeSet<TileId>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            exempt: BTreeSet::new(),
        }
    }
}

impl SearchOptions {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn exempting(mut self, tiles: impl IntoIterator<Item = TileId>) -> Self {
        self.exempt.extend(tiles);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    tile: TileId,
    g: f64,
    f: f64,
    parent: Option<usize>,
}

/// Chebyshev distance: admissible and consistent for 8-way movement where a
/// diagonal costs at least as much as a cardinal step.
fn heuristic(a: TileId, b: TileId) -> f64 {
    f64::from(a.chebyshev(b))
}

/// Find a path from `start` to `end` with A* over the 8-connected grid.
///
/// Occupied tiles block movement unless they are `start`, `end`, or listed in
/// `options.exempt`. A diagonal step is refused when either orthogonal
/// shoulder tile is occupied. Returns the tiles from `start` to `end`
/// inclusive, or `None` when the open list empties or the iteration budget
/// runs out; the two are not distinguished.
pub fn find_path(
    chunks: &ChunkStore,
    start: TileId,
    end: TileId,
    options: &SearchOptions,
) -> Option<Vec<TileId>> {
    let _span = tracing::debug_span!("find_path", %start, %end).entered();

    let walkable = |tile: TileId| {
        tile == start
            || tile == end
            || options.exempt.contains(&tile)
            || !chunks.is_occupied(tile)
    };

    // Every node ever opened lives in `nodes`; `open` holds indices into it.
    let mut nodes: Vec<Node> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut open_index: HashMap<TileId, usize> = HashMap::new();
    let mut closed: HashSet<TileId> = HashSet::new();

    let h = heuristic(start, end);
    nodes.push(Node {
        tile: start,
        g: 0.0,
        f: h,
        parent: None,
    });
    open.push(0);
    open_index.insert(start, 0);

    let mut iterations = 0;
    while !open.is_empty() && iterations < options.max_iterations {
        iterations += 1;

        // First minimum in open-list order.
        let mut best = 0;
        for (i, &node) in open.iter().enumerate() {
            if nodes[node].f < nodes[open[best]].f {
                best = i;
            }
        }
        let current_index = open.remove(best);
        let current = nodes[current_index];
        open_index.remove(&current.tile);

        if current.tile == end {
            tracing::debug!(iterations, cost = current.g, "path found");
            return Some(reconstruct(&nodes, current_index));
        }
        closed.insert(current.tile);

        for (dx, dy) in DIRECTIONS {
            let Some(neighbor) = current.tile.checked_offset(dx, dy) else {
                continue;
            };
            if closed.contains(&neighbor) || !walkable(neighbor) {
                continue;
            }

            let diagonal = dx != 0 && dy != 0;
            if diagonal
                && (chunks.is_occupied(current.tile.offset(dx, 0))
                    || chunks.is_occupied(current.tile.offset(0, dy)))
            {
                continue;
            }

            let g = current.g + if diagonal { DIAGONAL_COST } else { CARDINAL_COST };
            let f = g + heuristic(neighbor, end);

            match open_index.get(&neighbor) {
                Some(&existing) if nodes[existing].f <= f => {}
                Some(&existing) => {
                    let node = &mut nodes[existing];
                    node.g = g;
                    node.f = f;
                    node.parent = Some(current_index);
                }
                None => {
                    nodes.push(Node {
                        tile: neighbor,
                        g,
                        f,
                        parent: Some(current_index),
                    });
                    let index = nodes.len() - 1;
                    open.push(index);
                    open_index.insert(neighbor, index);
                }
            }
        }
    }

    tracing::debug!(iterations, exhausted = open.is_empty(), "no path");
    None
}

fn reconstruct(nodes: &[Node], mut index: usize) -> Vec<TileId> {
    let mut path = vec![nodes[index].tile];
    while let Some(parent) = nodes[index].parent {
        path.push(nodes[parent].tile);
        index = parent;
    }
    path.reverse();
    path
}

/// Sum of step costs along `path`.
pub fn path_cost(path: &[TileId]) -> f64 {
    path.windows(2)
        .map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if a.x != b.x && a.y != b.y {
                DIAGONAL_COST
            } else {
                CARDINAL_COST
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileworld_kernel::{PlacementSpec, World};

    fn t(x: i32, y: i32) -> TileId {
        TileId::new(x, y)
    }

    fn assert_contiguous(path: &[TileId]) {
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "gap in {path:?}");
        }
    }

    #[test]
    fn open_grid_diagonal() {
        let w = World::new();
        let path = find_path(w.chunks(), t(0, 0), t(5, 5), &SearchOptions::default()).unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.first(), Some(&t(0, 0)));
        assert_eq!(path.last(), Some(&t(5, 5)));
        assert_contiguous(&path);
        assert!((path_cost(&path) - 5.0 * DIAGONAL_COST).abs() < 1e-9);
    }

    #[test]
    fn start_equals_end() {
        let w = World::new();
        let path = find_path(w.chunks(), t(3, -3), t(3, -3), &SearchOptions::default());
        assert_eq!(path, Some(vec![t(3, -3)]));
    }

    #[test]
    fn occupied_endpoints_are_walkable() {
        let mut w = World::new();
        w.place(PlacementSpec::new(0, 0, 2, 2));
        w.place(PlacementSpec::new(6, 0, 2, 2));
        let path = find_path(w.chunks(), t(1, 0), t(6, 0), &SearchOptions::default()).unwrap();
        assert_eq!(path.first(), Some(&t(1, 0)));
        assert_eq!(path.last(), Some(&t(6, 0)));
        assert_contiguous(&path);
        for tile in &path[1..path.len() - 1] {
            assert!(!w.chunks().is_occupied(*tile));
        }
    }

    #[test]
    fn routes_around_wall() {
        let mut w = World::new();
        w.place(PlacementSpec::new(2, -3, 1, 7));
        let path = find_path(w.chunks(), t(0, 0), t(4, 0), &SearchOptions::default()).unwrap();
        assert_contiguous(&path);
        assert!(path.iter().all(|p| !w.chunks().is_occupied(*p)));
        assert!(path.iter().any(|p| p.y.abs() >= 4));
    }

    #[test]
    fn corner_cutting_is_refused() {
        let mut w = World::new();
        // (1, 0) and (0, 1) flank the diagonal (0, 0) -> (1, 1).
        w.place(PlacementSpec::new(1, 0, 1, 1));
        w.place(PlacementSpec::new(0, 1, 1, 1));
        let path = find_path(w.chunks(), t(0, 0), t(1, 1), &SearchOptions::default());
        if let Some(path) = path {
            assert_ne!(path, vec![t(0, 0), t(1, 1)]);
            for pair in path.windows(2) {
                assert!(!(pair[0] == t(0, 0) && pair[1] == t(1, 1)));
            }
        }
    }

    #[test]
    fn single_shoulder_also_blocks_diagonal() {
        let mut w = World::new();
        w.place(PlacementSpec::new(1, 0, 1, 1));
        let path = find_path(w.chunks(), t(0, 0), t(1, 1), &SearchOptions::default()).unwrap();
        assert_eq!(path, vec![t(0, 0), t(0, 1), t(1, 1)]);
    }

    #[test]
    fn enclosed_target_yields_none() {
        let mut w = World::new();
        // Ring around (10, 10).
        w.place(PlacementSpec::new(9, 9, 3, 1));
        w.place(PlacementSpec::new(9, 11, 3, 1));
        w.place(PlacementSpec::new(9, 10, 1, 1));
        w.place(PlacementSpec::new(11, 10, 1, 1));
        assert_eq!(
            find_path(w.chunks(), t(0, 0), t(10, 10), &SearchOptions::default()),
            None
        );
    }

    #[test]
    fn budget_exhaustion_yields_none() {
        let w = World::new();
        let tight = SearchOptions::default().with_max_iterations(3);
        assert_eq!(find_path(w.chunks(), t(0, 0), t(50, 0), &tight), None);
        assert!(find_path(w.chunks(), t(0, 0), t(50, 0), &SearchOptions::default()).is_some());
    }

    #[test]
    fn grid_edges_are_not_crossed() {
        let w = World::new();
        let path = find_path(
            w.chunks(),
            t(i32::MAX, 0),
            t(i32::MAX, 3),
            &SearchOptions::default(),
        )
        .unwrap();
        assert_eq!(path.len(), 4);
        assert!(path.iter().all(|tile| tile.x == i32::MAX));

        let corner = find_path(
            w.chunks(),
            t(i32::MIN, i32::MIN),
            t(i32::MIN + 2, i32::MIN + 2),
            &SearchOptions::default(),
        );
        assert_eq!(corner.map(|p| p.len()), Some(3));
    }

    #[test]
    fn far_apart_endpoints_exhaust_budget() {
        let w = World::new();
        let path = find_path(
            w.chunks(),
            t(i32::MIN, 0),
            t(i32::MAX, 0),
            &SearchOptions::default(),
        );
        assert_eq!(path, None);
    }

    #[test]
    fn exempt_tiles_are_walkable() {
        let mut w = World::new();
        w.place(PlacementSpec::new(1, -5, 1, 11));
        let blocked = SearchOptions::default().with_max_iterations(40);
        assert_eq!(find_path(w.chunks(), t(0, 0), t(2, 0), &blocked), None);

        let open = blocked.exempting([t(1, 0)]);
        let path = find_path(w.chunks(), t(0, 0), t(2, 0), &open).unwrap();
        assert_eq!(path, vec![t(0, 0), t(1, 0), t(2, 0)]);
    }

    #[test]
    fn path_cost_mixes_steps() {
        let path = [t(0, 0), t(1, 0), t(2, 1), t(2, 2)];
        assert!((path_cost(&path) - (2.0 + DIAGONAL_COST)).abs() < 1e-9);
        assert_eq!(path_cost(&[t(0, 0)]), 0.0);
    }
}
