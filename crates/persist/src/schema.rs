//! Structural checks: is this JSON shaped like a world at all?
//!
//! Typed deserialization covers field presence, value types, unknown fields,
//! key formats and chunk slot counts; `check_shape` then covers the few
//! constraints serde cannot express. Relational consistency is a separate
//! pass in `validate`.

use tileworld_common::EntityId;
use tileworld_kernel::World;

/// The value is not a structurally valid world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("parse world json at {path}: {message}")]
    Structure { path: String, message: String },
    #[error("validation failed at {path}: {message}")]
    Shape { path: String, message: String },
}

impl SchemaError {
    fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Parse raw JSON into a world and check its shape.
pub fn parse_world(raw: &str) -> Result<World, SchemaError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let world: World = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        SchemaError::Structure {
            path,
            message: error.into_inner().to_string(),
        }
    })?;
    deserializer.end().map_err(|error| SchemaError::Structure {
        path: ".".to_string(),
        message: error.to_string(),
    })?;
    check_shape(&world)?;
    Ok(world)
}

/// Constraints on an already-typed world that the wire types do not enforce.
pub fn check_shape(world: &World) -> Result<(), SchemaError> {
    for (key, entity) in world.entities() {
        if *key != entity.id {
            return Err(SchemaError::shape(
                format!("entities.{key}.id"),
                format!("expected {key}, got {}", entity.id),
            ));
        }
        if entity.width == 0 || entity.height == 0 {
            return Err(SchemaError::shape(
                format!("entities.{key}"),
                format!(
                    "footprint must be at least 1x1, got {}x{}",
                    entity.width, entity.height
                ),
            ));
        }
        if !entity.footprint().fits_grid() {
            return Err(SchemaError::shape(
                format!("entities.{key}"),
                "footprint extends past the grid",
            ));
        }
    }
    if let Some(EntityId(last)) = world.entities().keys().next_back() {
        if world.next_entity_id() <= *last {
            return Err(SchemaError::shape(
                "nextEntityId",
                format!(
                    "expected a value above {last}, got {}",
                    world.next_entity_id()
                ),
            ));
        }
    }
    Ok(())
}
