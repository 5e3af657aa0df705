//! Navigation: A* search over the tile grid and path-to-connection routing.
//!
//! # Invariants
//! - Search is bounded by an iteration budget, never by grid size.
//! - Returned paths are contiguous 8-neighbour walks from start to end.
//! - Diagonal steps never pass between two tiles when either is occupied.

mod astar;
mod route;

pub use astar::{
    CARDINAL_COST, DEFAULT_MAX_ITERATIONS, DIAGONAL_COST, SearchOptions, find_path, path_cost,
};
pub use route::route_and_connect;
