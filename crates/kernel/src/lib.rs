//! World kernel: chunked tile storage, entity placement, the connection
//! graph, and the fixed-step production tick.
//!
//! # Invariants
//! - Every tile in an entity's footprint references that entity.
//! - Connections are symmetric and never loop back to the same tile.
//! - Entity ids come from a counter and are never reused.
//! - All state mutations flow through explicit operations on `World`.

pub mod chunk;
pub mod connection;
pub mod defaults;
pub mod production;
pub mod registry;
pub mod ticker;
pub mod world;

pub use chunk::{CHUNK_SIZE, Chunk, ChunkKey, ChunkStore, TILES_PER_CHUNK, Tile};
pub use defaults::generate_default_world;
pub use production::{MAX_INVENTORY_PER_TYPE, MINE_TICKS, ProductionState};
pub use registry::{
    Entity, PlacementSpec, find_at, find_at_point, is_area_free, would_block_diagonal_connection,
};
pub use ticker::{FixedTicker, TICK_RATE};
pub use world::{AppState, Selection, World, WorldError};
