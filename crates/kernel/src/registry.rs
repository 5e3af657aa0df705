use crate::chunk::ChunkStore;
use crate::production::ProductionState;
use crate::world::{World, WorldError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tileworld_common::{Color, EntityId, Position, Rect, ResourceType, TileId};

/// A placement request from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementSpec {
    pub position: Position,
    pub width: u32,
    pub height: u32,
    pub color: Color,
}

impl PlacementSpec {
    /// Footprint at `(x, y)` with the default color.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            position: Position::new(x, y),
            width,
            height,
            color: Color::default(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn footprint(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }
}

/// A placed multi-tile entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Entity {
    pub id: EntityId,
    pub position: Position,
    pub width: u32,
    pub height: u32,
    pub color: Color,
    #[serde(default)]
    pub inventory: BTreeMap<ResourceType, u32>,
    pub state: ProductionState,
}

impl Entity {
    /// Tiles covered by the entity.
    pub fn footprint(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }

    pub fn inventory_count(&self, resource: ResourceType) -> u32 {
        self.inventory.get(&resource).copied().unwrap_or(0)
    }
}

/// True iff no tile in `rect` has an occupant.
pub fn is_area_free(chunks: &ChunkStore, rect: Rect) -> bool {
    rect.tiles().all(|tile| !chunks.is_occupied(tile))
}

/// True if occupying `rect` would put a tile on one of the two flanking
/// corners of an existing diagonal connection.
///
/// Only tiles in the 8-neighbourhood of the footprint can hold such a
/// connection, so those are the only ones inspected.
pub fn would_block_diagonal_connection(chunks: &ChunkStore, rect: Rect) -> bool {
    for candidate in rect.tiles() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(neighbor) = candidate.checked_offset(dx, dy) else {
                    continue;
                };
                let Some(tile) = chunks.tile(neighbor) else {
                    continue;
                };
                for connected in &tile.connections {
                    if connected.x == neighbor.x || connected.y == neighbor.y {
                        continue;
                    }
                    let corner_a = TileId::new(connected.x, neighbor.y);
                    let corner_b = TileId::new(neighbor.x, connected.y);
                    if candidate == corner_a || candidate == corner_b {
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// Occupant of tile `(x, y)`.
pub fn find_at(chunks: &ChunkStore, x: i32, y: i32) -> Option<EntityId> {
    chunks.entity_at(x, y)
}

/// Occupant of the tile containing a world-space point.
pub fn find_at_point(chunks: &ChunkStore, point: glam::Vec2) -> Option<EntityId> {
    let tile = TileId::containing(point);
    find_at(chunks, tile.x, tile.y)
}

impl World {
    /// Register a new entity and stamp its footprint into the chunk store.
    ///
    /// The caller must have checked `is_area_free` for the footprint. A
    /// footprint smaller than 1×1 or reaching past the grid edge is a caller
    /// bug and panics.
    pub fn place(&mut self, spec: PlacementSpec) -> EntityId {
        assert!(
            spec.width >= 1 && spec.height >= 1,
            "entity footprint must be at least 1x1, got {}x{}",
            spec.width,
            spec.height
        );
        let footprint = spec.footprint();
        assert!(
            footprint.fits_grid(),
            "entity footprint {footprint:?} extends past the grid"
        );
        debug_assert!(
            is_area_free(&self.chunks, footprint),
            "placement over occupied tiles at {footprint:?}"
        );

        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                position: spec.position,
                width: spec.width,
                height: spec.height,
                color: spec.color,
                inventory: BTreeMap::new(),
                state: ProductionState::Idle,
            },
        );
        for tile in footprint.tiles() {
            let slot = self.chunks.tile_mut_or_insert(tile.x, tile.y);
            slot.entity_id = Some(id);
        }
        tracing::debug!(%id, ?footprint, "placed entity");
        id
    }

    /// Check the placement preconditions, then place.
    pub fn try_place(&mut self, spec: PlacementSpec) -> Result<EntityId, WorldError> {
        if spec.width == 0 || spec.height == 0 {
            return Err(WorldError::InvalidFootprint {
                width: spec.width,
                height: spec.height,
            });
        }
        let footprint = spec.footprint();
        if !footprint.fits_grid() {
            return Err(WorldError::OutOfBounds(footprint));
        }
        if !is_area_free(&self.chunks, footprint) {
            return Err(WorldError::AreaOccupied(footprint));
        }
        if would_block_diagonal_connection(&self.chunks, footprint) {
            return Err(WorldError::WouldBlockConnection(footprint));
        }
        Ok(self.place(spec))
    }

    #[cfg(test)]
    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_assigns_sequential_ids() {
        let mut w = World::new();
        let a = w.place(PlacementSpec::new(0, 0, 2, 2));
        let b = w.place(PlacementSpec::new(5, 5, 1, 1));
        assert_eq!(a, EntityId(0));
        assert_eq!(b, EntityId(1));
        assert_eq!(w.next_entity_id(), 2);
    }

    #[test]
    fn place_stamps_every_footprint_tile() {
        let mut w = World::new();
        let id = w.place(PlacementSpec::new(-1, 30, 3, 4));
        let rect = Rect::new(-1, 30, 3, 4);
        for tile in rect.tiles() {
            assert_eq!(find_at(w.chunks(), tile.x, tile.y), Some(id));
        }
        assert!(!is_area_free(w.chunks(), rect));
        // Footprint straddles four chunks.
        assert_eq!(w.chunks().chunk_count(), 4);
    }

    #[test]
    fn second_overlapping_place_is_rejected_up_front() {
        let mut w = World::new();
        let first = PlacementSpec::new(0, 0, 2, 2);
        assert!(is_area_free(w.chunks(), first.footprint()));
        assert_eq!(w.place(first), EntityId(0));
        assert!(!is_area_free(w.chunks(), first.footprint()));
        assert_eq!(
            w.try_place(first),
            Err(WorldError::AreaOccupied(first.footprint()))
        );
        assert_eq!(w.entity_count(), 1);
        assert_eq!(w.next_entity_id(), 1);
    }

    #[test]
    fn try_place_rejects_empty_footprint() {
        let mut w = World::new();
        assert_eq!(
            w.try_place(PlacementSpec::new(0, 0, 0, 2)),
            Err(WorldError::InvalidFootprint {
                width: 0,
                height: 2
            })
        );
    }

    #[test]
    fn try_place_rejects_footprint_past_grid_edge() {
        let mut w = World::new();
        assert_eq!(
            w.try_place(PlacementSpec::new(i32::MAX, 0, 2, 1)),
            Err(WorldError::OutOfBounds(Rect::new(i32::MAX, 0, 2, 1)))
        );
        assert_eq!(
            w.try_place(PlacementSpec::new(0, i32::MAX - 1, 1, 3)),
            Err(WorldError::OutOfBounds(Rect::new(0, i32::MAX - 1, 1, 3)))
        );
        assert_eq!(w.entity_count(), 0);
        assert_eq!(w.chunks().chunk_count(), 0);

        let id = w.try_place(PlacementSpec::new(i32::MAX, i32::MAX, 1, 1)).unwrap();
        assert_eq!(w.chunks().entity_at(i32::MAX, i32::MAX), Some(id));
        assert!(w.try_place(PlacementSpec::new(i32::MIN, i32::MIN, 2, 2)).is_ok());
    }

    #[test]
    #[should_panic(expected = "at least 1x1")]
    fn place_panics_on_empty_footprint() {
        World::new().place(PlacementSpec::new(0, 0, 2, 0));
    }

    #[test]
    fn find_at_point_floors() {
        let mut w = World::new();
        let id = w.place(PlacementSpec::new(-2, -2, 1, 1));
        assert_eq!(find_at_point(w.chunks(), glam::Vec2::new(-1.5, -1.01)), Some(id));
        assert_eq!(find_at_point(w.chunks(), glam::Vec2::new(-0.5, -1.5)), None);
    }

    #[test]
    fn diagonal_connection_blocks_corner_placement() {
        let mut w = World::new();
        w.connect_path(&[TileId::new(0, 0), TileId::new(1, 1)]).unwrap();

        // (1, 0) and (0, 1) flank the diagonal.
        assert!(would_block_diagonal_connection(w.chunks(), Rect::new(1, 0, 1, 1)));
        assert!(would_block_diagonal_connection(w.chunks(), Rect::new(-1, 1, 2, 2)));
        assert!(!would_block_diagonal_connection(w.chunks(), Rect::new(2, 2, 2, 2)));
        assert_eq!(
            w.try_place(PlacementSpec::new(1, 0, 1, 1)),
            Err(WorldError::WouldBlockConnection(Rect::new(1, 0, 1, 1)))
        );
    }

    #[test]
    fn cardinal_connection_never_blocks() {
        let mut w = World::new();
        w.connect_path(&[TileId::new(0, 0), TileId::new(1, 0)]).unwrap();
        assert!(!would_block_diagonal_connection(w.chunks(), Rect::new(0, 1, 2, 1)));
        assert!(!would_block_diagonal_connection(w.chunks(), Rect::new(0, -1, 2, 1)));
    }

    #[test]
    fn placement_keeps_existing_resources() {
        let mut w = World::new();
        w.set_resource(TileId::new(1, 1), Some(ResourceType::Iron));
        let id = w.place(PlacementSpec::new(0, 0, 2, 2));
        let tile = w.chunks().tile(TileId::new(1, 1)).unwrap();
        assert_eq!(tile.entity_id, Some(id));
        assert_eq!(tile.resource, Some(ResourceType::Iron));
    }
}
