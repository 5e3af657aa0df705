use crate::registry::PlacementSpec;
use crate::world::World;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tileworld_common::{Color, ResourceType, TileId};

/// Deposits are scattered within this many tiles of the origin on each axis.
pub const RESOURCE_RADIUS: i32 = 12;
/// Random positions tried per deposit before giving up on it.
pub const DEPOSIT_ATTEMPTS: u32 = 20;

/// Build the world a fresh session starts with: a 2×2 seed entity at the
/// origin and 3–5 deposits of each resource type on free tiles nearby.
///
/// The same seed always yields the same world.
pub fn generate_default_world(seed: u64) -> World {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut world = World::new();
    world.place(PlacementSpec::new(0, 0, 2, 2).with_color(Color::hsl(220, 100, 50)));

    for resource in ResourceType::ALL {
        let deposits = rng.gen_range(3..=5);
        let mut placed = 0;
        for _ in 0..deposits {
            for _ in 0..DEPOSIT_ATTEMPTS {
                let tile = TileId::new(
                    rng.gen_range(-RESOURCE_RADIUS..=RESOURCE_RADIUS),
                    rng.gen_range(-RESOURCE_RADIUS..=RESOURCE_RADIUS),
                );
                let free = world
                    .chunks()
                    .tile(tile)
                    .is_none_or(|t| t.entity_id.is_none() && t.resource.is_none());
                if free {
                    world.set_resource(tile, Some(resource));
                    placed += 1;
                    break;
                }
            }
        }
        tracing::debug!(%resource, placed, "scattered deposits");
    }
    world
}
