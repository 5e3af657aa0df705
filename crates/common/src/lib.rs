//! Shared types for the tile world.
//!
//! # Invariants
//! - `TileId` keys round-trip exactly: `TileId::decode(&TileId::encode(x, y)) == (x, y)`.
//! - Entity ids are allocated from a counter and never reused.

pub mod tile_id;
pub mod types;

pub use tile_id::{ParseTileIdError, TileId};
pub use types::{Camera, Color, EntityId, ParseEntityIdError, Position, Rect, ResourceType};
