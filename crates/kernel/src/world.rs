use crate::chunk::ChunkStore;
use crate::production::ProductionState;
use crate::registry::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tileworld_common::{Camera, EntityId, Rect, ResourceType, TileId};

/// Errors from world mutations that reject caller input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("tile {0} cannot connect to itself")]
    SelfConnection(TileId),
    #[error("tiles {from} and {to} are not adjacent")]
    NotAdjacent { from: TileId, to: TileId },
    #[error("footprint {width}x{height} must be at least 1x1")]
    InvalidFootprint { width: u32, height: u32 },
    #[error("footprint {0:?} extends past the edge of the grid")]
    OutOfBounds(Rect),
    #[error("footprint {0:?} overlaps an existing entity")]
    AreaOccupied(Rect),
    #[error("footprint {0:?} would sever a diagonal connection")]
    WouldBlockConnection(Rect),
}

/// The authoritative world state.
///
/// All mutations go through explicit operations on this value; nothing else
/// holds a mutable copy of the chunks, entities or connections. `BTreeMap`
/// keeps entity iteration in id order, which the production tick relies on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct World {
    pub(crate) tick: u64,
    pub(crate) camera: Camera,
    pub(crate) entities: BTreeMap<EntityId, Entity>,
    pub(crate) chunks: ChunkStore,
    pub(crate) next_entity_id: u64,
}

impl World {
    /// Create an empty world at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Id the next placement will receive.
    pub fn next_entity_id(&self) -> u64 {
        self.next_entity_id
    }

    /// Number of entities in the world.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Read-only access to all entities, in id order.
    pub fn entities(&self) -> &BTreeMap<EntityId, Entity> {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn chunks(&self) -> &ChunkStore {
        &self.chunks
    }

    /// Tag (or untag) a tile with a resource deposit.
    pub fn set_resource(&mut self, tile: TileId, resource: Option<ResourceType>) {
        match resource {
            Some(r) => self.chunks.tile_mut_or_insert(tile.x, tile.y).resource = Some(r),
            None => {
                if let Some(t) = self.chunks.tile_at_mut(tile.x, tile.y) {
                    t.resource = None;
                }
            }
        }
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        self.tick += 1;
        self.run_production(1);
    }

    /// Advance the simulation by `ticks` single steps.
    pub fn advance(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Deterministic FNV-1a hash of the whole world for comparison and logging.
    ///
    /// Maps are ordered, so equal worlds hash equally on every platform.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.next_entity_id.to_le_bytes());
        mix(&mut h, &self.camera.x.to_bits().to_le_bytes());
        mix(&mut h, &self.camera.y.to_bits().to_le_bytes());
        for (id, entity) in &self.entities {
            mix(&mut h, &id.0.to_le_bytes());
            mix(&mut h, &entity.position.x.to_le_bytes());
            mix(&mut h, &entity.position.y.to_le_bytes());
            mix(&mut h, &entity.width.to_le_bytes());
            mix(&mut h, &entity.height.to_le_bytes());
            mix(&mut h, &entity.color.h.to_le_bytes());
            mix(&mut h, &[entity.color.s, entity.color.l]);
            mix(&mut h, &(entity.inventory.len() as u64).to_le_bytes());
            for (&resource, count) in &entity.inventory {
                mix(&mut h, &[resource as u8]);
                mix(&mut h, &count.to_le_bytes());
            }
            match entity.state {
                ProductionState::Idle => mix(&mut h, &[0]),
                ProductionState::Mining { progress, item } => {
                    mix(&mut h, &[1, item as u8]);
                    mix(&mut h, &progress.to_le_bytes());
                }
            }
        }
        for (tile, slot) in self.chunks.tiles() {
            mix(&mut h, &tile.x.to_le_bytes());
            mix(&mut h, &tile.y.to_le_bytes());
            match slot.entity_id {
                Some(id) => {
                    mix(&mut h, &[1]);
                    mix(&mut h, &id.0.to_le_bytes());
                }
                None => mix(&mut h, &[0]),
            }
            mix(&mut h, &[slot.resource.map_or(0, |r| r as u8 + 1)]);
            mix(&mut h, &(slot.connections.len() as u64).to_le_bytes());
            for other in &slot.connections {
                mix(&mut h, &other.x.to_le_bytes());
                mix(&mut h, &other.y.to_le_bytes());
            }
        }
        h
    }
}

/// What the presentation layer currently has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Tile(TileId),
    Entity(EntityId),
}

/// World plus transient UI selection. Only the world is ever persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub world: World,
    pub selection: Option<Selection>,
}

impl AppState {
    pub fn new(world: World) -> Self {
        Self {
            world,
            selection: None,
        }
    }

    /// Select something; selecting an unknown entity clears the selection.
    pub fn select(&mut self, selection: Selection) {
        self.selection = match selection {
            Selection::Entity(id) if self.world.entity(id).is_none() => None,
            other => Some(other),
        };
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selected_entity(&self) -> Option<&Entity> {
        match self.selection {
            Some(Selection::Entity(id)) => self.world.entity(id),
            _ => None,
        }
    }
}
