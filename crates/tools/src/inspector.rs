use std::collections::BTreeMap;
use std::fmt;

use tileworld_common::{EntityId, Rect, ResourceType};
use tileworld_kernel::{ProductionState, World};

/// Read-only queries against the world for the CLI and logs.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        let mut inventory = BTreeMap::new();
        let mut mining = 0;
        for entity in world.entities().values() {
            for (&resource, &count) in &entity.inventory {
                *inventory.entry(resource).or_insert(0u64) += u64::from(count);
            }
            if matches!(entity.state, ProductionState::Mining { .. }) {
                mining += 1;
            }
        }
        let deposits = world
            .chunks()
            .tiles()
            .filter(|(_, tile)| tile.resource.is_some())
            .count();

        WorldSummary {
            tick: world.tick(),
            entity_count: world.entity_count(),
            mining,
            chunk_count: world.chunks().chunk_count(),
            connection_count: world.connection_count(),
            deposits,
            inventory,
            state_hash: world.state_hash(),
        }
    }

    pub fn inspect_entity(world: &World, id: EntityId) -> Option<EntityInfo> {
        world.entity(id).map(|entity| EntityInfo {
            id,
            footprint: entity.footprint(),
            hsl: (entity.color.h, entity.color.s, entity.color.l),
            inventory: entity.inventory.clone(),
            state: entity.state,
        })
    }

    /// All entity ids, in id order.
    pub fn list_entities(world: &World) -> Vec<EntityId> {
        world.entities().keys().copied().collect()
    }
}

#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub tick: u64,
    pub entity_count: usize,
    /// Entities currently mid-way through a mining run.
    pub mining: usize,
    pub chunk_count: usize,
    pub connection_count: usize,
    pub deposits: usize,
    /// Inventory totals across all entities.
    pub inventory: BTreeMap<ResourceType, u64>,
    pub state_hash: u64,
}

impl fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "World: tick={} entities={} mining={} chunks={} connections={} deposits={} hash={:016x}",
            self.tick,
            self.entity_count,
            self.mining,
            self.chunk_count,
            self.connection_count,
            self.deposits,
            self.state_hash
        )?;
        for (resource, count) in &self.inventory {
            write!(f, " {resource}={count}")?;
        }
        Ok(())
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub footprint: Rect,
    pub hsl: (u16, u8, u8),
    pub inventory: BTreeMap<ResourceType, u32>,
    pub state: ProductionState,
}

impl fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.footprint;
        write!(
            f,
            "Entity [{}] at ({}, {}) size {}x{} hsl({}, {}%, {}%)",
            self.id, r.x, r.y, r.width, r.height, self.hsl.0, self.hsl.1, self.hsl.2
        )?;
        match self.state {
            ProductionState::Idle => write!(f, " idle")?,
            ProductionState::Mining { progress, item } => {
                write!(f, " mining {item} {progress}")?
            }
        }
        for (resource, count) in &self.inventory {
            write!(f, " {resource}={count}")?;
        }
        Ok(())
    }
}
