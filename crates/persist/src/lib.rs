//! Persistence: world schema checks, relational validation, key-value
//! storage and the save/load gateway.
//!
//! # Invariants
//! - A loaded world has passed both the structural and the relational pass.
//! - A stored entry that fails either pass is removed, never half-applied.
//! - Save failures are reported to the caller and never touch the in-memory world.

pub mod autosave;
pub mod gateway;
pub mod schema;
pub mod store;
pub mod validate;

pub use autosave::{AutosaveConfig, Autosaver};
pub use gateway::{LoadError, PersistenceGateway, STORAGE_KEY};
pub use schema::{SchemaError, check_shape, parse_world};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use validate::{ValidationError, validate_connections, validate_occupancy, validate_world};
