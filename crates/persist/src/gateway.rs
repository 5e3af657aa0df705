//! Save and restore the world under a single storage key.

use tileworld_kernel::{World, generate_default_world};

use crate::schema::{SchemaError, parse_world};
use crate::store::{KeyValueStore, StoreError};
use crate::validate::{ValidationError, validate_world};

/// Storage key for the serialized world. Bump the version on format changes.
pub const STORAGE_KEY: &str = "tileworld-v1-world";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("storage read failed: {0}")]
    Store(#[from] StoreError),
    #[error("stored world is malformed: {0}")]
    Schema(#[from] SchemaError),
    #[error("stored world is inconsistent: {0}")]
    Validation(#[from] ValidationError),
}

impl LoadError {
    /// Whether the stored entry itself is bad and should be discarded.
    pub fn is_corrupt(&self) -> bool {
        match self {
            LoadError::Store(StoreError::NotUtf8 { .. }) => true,
            LoadError::Store(_) => false,
            LoadError::Schema(_) | LoadError::Validation(_) => true,
        }
    }
}

/// Bridges a `World` and a key-value store.
#[derive(Debug)]
pub struct PersistenceGateway<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Serialize and write the world, surfacing any failure.
    pub fn try_save(&mut self, world: &World) -> Result<usize, StoreError> {
        let json = serde_json::to_string(world)?;
        self.store.set(&self.key, &json)?;
        Ok(json.len())
    }

    /// Write the world. Failures are logged and reported as `false`; the
    /// in-memory world is never affected.
    pub fn save(&mut self, world: &World) -> bool {
        match self.try_save(world) {
            Ok(bytes) => {
                tracing::debug!(key = %self.key, tick = world.tick(), bytes, "world saved");
                true
            }
            Err(error) => {
                tracing::error!(key = %self.key, %error, "failed to save world");
                false
            }
        }
    }

    /// Read, parse and validate the stored world. `Ok(None)` when nothing is stored.
    pub fn try_load(&self) -> Result<Option<World>, LoadError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let world = parse_world(&raw)?;
        validate_world(&world)?;
        Ok(Some(world))
    }

    /// Restore the stored world. A corrupt entry is removed so the next
    /// start begins clean.
    pub fn load(&mut self) -> Option<World> {
        match self.try_load() {
            Ok(Some(world)) => {
                tracing::info!(
                    key = %self.key,
                    tick = world.tick(),
                    entities = world.entity_count(),
                    "world loaded"
                );
                Some(world)
            }
            Ok(None) => {
                tracing::info!(key = %self.key, "no saved world");
                None
            }
            Err(error) if error.is_corrupt() => {
                tracing::warn!(key = %self.key, %error, "discarding saved world");
                if let Err(error) = self.store.remove(&self.key) {
                    tracing::error!(key = %self.key, %error, "failed to remove saved world");
                }
                None
            }
            Err(error) => {
                tracing::error!(key = %self.key, %error, "failed to read saved world");
                None
            }
        }
    }

    /// The stored world, or a freshly generated default one (saved immediately).
    pub fn load_or_default(&mut self, seed: u64) -> World {
        if let Some(world) = self.load() {
            return world;
        }
        let world = generate_default_world(seed);
        self.save(&world);
        world
    }

    /// Discard whatever is stored and start over from a default world.
    pub fn reset(&mut self, seed: u64) -> World {
        if let Err(error) = self.store.remove(&self.key) {
            tracing::error!(key = %self.key, %error, "failed to remove saved world");
        }
        let world = generate_default_world(seed);
        self.save(&world);
        tracing::info!(key = %self.key, seed, "world reset");
        world
    }
}
