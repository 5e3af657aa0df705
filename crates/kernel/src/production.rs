//! Per-entity mining state machine, advanced once per tick.

use crate::chunk::ChunkStore;
use crate::registry::Entity;
use crate::world::World;
use serde::{Deserialize, Serialize};
use tileworld_common::ResourceType;

/// Ticks a mining run takes to yield one unit.
pub const MINE_TICKS: u32 = 60;
/// An entity stops starting new runs for a resource once it holds this many.
pub const MAX_INVENTORY_PER_TYPE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProductionState {
    #[default]
    Idle,
    Mining {
        progress: u32,
        #[serde(rename = "itemType")]
        item: ResourceType,
    },
}

impl World {
    /// Run the production state machine for every entity, in id order.
    pub(crate) fn run_production(&mut self, elapsed: u32) {
        let chunks = &self.chunks;
        for entity in self.entities.values_mut() {
            advance_entity(entity, chunks, elapsed);
        }
    }
}

fn advance_entity(entity: &mut Entity, chunks: &ChunkStore, elapsed: u32) {
    if let ProductionState::Mining { progress, item } = &mut entity.state {
        *progress = progress.saturating_add(elapsed);
        if *progress >= MINE_TICKS {
            let item = *item;
            *entity.inventory.entry(item).or_insert(0) += 1;
            entity.state = ProductionState::Idle;
            tracing::trace!(id = %entity.id, %item, "mined");
        }
    }

    // A run that just finished may start the next one on the same tick.
    if entity.state == ProductionState::Idle {
        if let Some(item) = next_minable(entity, chunks) {
            entity.state = ProductionState::Mining { progress: 0, item };
        }
    }
}

/// First resource under the footprint (row-major) the entity still has room for.
fn next_minable(entity: &Entity, chunks: &ChunkStore) -> Option<ResourceType> {
    entity
        .footprint()
        .tiles()
        .filter_map(|tile| chunks.tile(tile).and_then(|t| t.resource))
        .find(|&resource| entity.inventory_count(resource) < MAX_INVENTORY_PER_TYPE)
}
