//! Relational checks over a structurally valid world.

use tileworld_common::{EntityId, TileId};
use tileworld_kernel::{ChunkStore, World};

/// A cross-reference inside the world does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tile {tile} is connected to itself")]
    SelfConnection { tile: TileId },
    #[error("tile {tile} is connected to missing tile {other}")]
    MissingCounterpart { tile: TileId, other: TileId },
    #[error("tile {tile} lists {other} but {other} does not list it back")]
    OneSided { tile: TileId, other: TileId },
    #[error("entity {id} covers tile {tile}, which is not stamped with it")]
    UnstampedFootprint { id: EntityId, tile: TileId },
    #[error("tile {tile} is stamped with unknown entity {id}")]
    UnknownOccupant { tile: TileId, id: EntityId },
    #[error("tile {tile} is stamped with entity {id} but lies outside its footprint")]
    StrayOccupant { tile: TileId, id: EntityId },
}

/// Check every relational invariant of `world`. The first failure wins.
pub fn validate_world(world: &World) -> Result<(), ValidationError> {
    validate_connections(world.chunks())?;
    validate_occupancy(world)
}

/// Every connection must point at an existing, different tile that lists
/// the original back.
pub fn validate_connections(chunks: &ChunkStore) -> Result<(), ValidationError> {
    for (tile, slot) in chunks.tiles() {
        for &other in &slot.connections {
            if other == tile {
                return Err(ValidationError::SelfConnection { tile });
            }
            let Some(counterpart) = chunks.tile(other) else {
                return Err(ValidationError::MissingCounterpart { tile, other });
            };
            if !counterpart.connections.contains(&tile) {
                return Err(ValidationError::OneSided { tile, other });
            }
        }
    }
    Ok(())
}

/// Footprints and tile occupants must agree in both directions.
pub fn validate_occupancy(world: &World) -> Result<(), ValidationError> {
    let chunks = world.chunks();
    for (id, entity) in world.entities() {
        for tile in entity.footprint().tiles() {
            if chunks.entity_at(tile.x, tile.y) != Some(*id) {
                return Err(ValidationError::UnstampedFootprint { id: *id, tile });
            }
        }
    }
    for (tile, slot) in chunks.tiles() {
        let Some(id) = slot.entity_id else {
            continue;
        };
        let Some(entity) = world.entity(id) else {
            return Err(ValidationError::UnknownOccupant { tile, id });
        };
        if !entity.footprint().contains(tile) {
            return Err(ValidationError::StrayOccupant { tile, id });
        }
    }
    Ok(())
}
