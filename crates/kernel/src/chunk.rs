use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tileworld_common::{EntityId, ResourceType, TileId};

/// Side length of a chunk in tiles.
pub const CHUNK_SIZE: i32 = 32;
/// Number of tile slots held by every chunk.
pub const TILES_PER_CHUNK: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Chunk coordinate: `(⌊x / 32⌋, ⌊y / 32⌋)`. Serialized as `"cx,cy"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ChunkKey {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkKey {
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Chunk holding tile `(x, y)`. Floor division, so `-1` maps to chunk `-1`.
    pub fn containing(x: i32, y: i32) -> Self {
        Self::new(x.div_euclid(CHUNK_SIZE), y.div_euclid(CHUNK_SIZE))
    }

    /// Tile id of the slot at `index` inside this chunk.
    pub fn tile_at_index(&self, index: usize) -> TileId {
        let local_x = (index % TILES_PER_CHUNK % CHUNK_SIZE as usize) as i32;
        let local_y = (index % TILES_PER_CHUNK / CHUNK_SIZE as usize) as i32;
        TileId::new(
            self.cx * CHUNK_SIZE + local_x,
            self.cy * CHUNK_SIZE + local_y,
        )
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.cx, self.cy)
    }
}

impl FromStr for ChunkKey {
    type Err = tileworld_common::ParseTileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: TileId = s.parse()?;
        Ok(Self::new(id.x, id.y))
    }
}

impl From<ChunkKey> for String {
    fn from(key: ChunkKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for ChunkKey {
    type Error = tileworld_common::ParseTileIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Slot index of tile `(x, y)` within its chunk, always in `0..TILES_PER_CHUNK`.
pub fn local_index(x: i32, y: i32) -> usize {
    let local_x = x.rem_euclid(CHUNK_SIZE);
    let local_y = y.rem_euclid(CHUNK_SIZE);
    (local_y * CHUNK_SIZE + local_x) as usize
}

/// One grid cell.
///
/// A tile with no occupant, no connections and no resource means the same as
/// an absent slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Tile {
    pub entity_id: Option<EntityId>,
    pub connections: BTreeSet<TileId>,
    pub resource: Option<ResourceType>,
}

impl Tile {
    pub fn occupied_by(id: EntityId) -> Self {
        Self {
            entity_id: Some(id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entity_id.is_none() && self.connections.is_empty() && self.resource.is_none()
    }
}

/// Dense 32×32 block of optional tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChunkRepr")]
pub struct Chunk {
    tiles: Vec<Option<Tile>>,
}

/// Wire shape of a chunk; the slot count is checked on the way in.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ChunkRepr {
    tiles: Vec<Option<Tile>>,
}

impl TryFrom<ChunkRepr> for Chunk {
    type Error = String;

    fn try_from(repr: ChunkRepr) -> Result<Self, Self::Error> {
        if repr.tiles.len() != TILES_PER_CHUNK {
            return Err(format!(
                "chunk must hold {TILES_PER_CHUNK} tile slots, found {}",
                repr.tiles.len()
            ));
        }
        Ok(Self { tiles: repr.tiles })
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self {
            tiles: vec![None; TILES_PER_CHUNK],
        }
    }
}

impl Chunk {
    pub fn slot(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index).and_then(Option::as_ref)
    }

    /// All slots in index order.
    pub fn slots(&self) -> &[Option<Tile>] {
        &self.tiles
    }

    /// Number of materialized (non-`None`) slots.
    pub fn populated(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }
}

/// Sparse tile storage: lazily created chunks keyed by chunk coordinate.
///
/// Chunks are never evicted. `BTreeMap` keeps iteration (and therefore
/// serialization and validation order) deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkStore {
    chunks: BTreeMap<ChunkKey, Chunk>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the chunk for `key`, creating an empty one if needed.
    pub fn get_or_create_chunk(&mut self, key: ChunkKey) -> &mut Chunk {
        self.chunks.entry(key).or_default()
    }

    pub fn chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Read-only tile lookup. Never creates a chunk.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.chunks
            .get(&ChunkKey::containing(x, y))
            .and_then(|chunk| chunk.slot(local_index(x, y)))
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tile_at(id.x, id.y)
    }

    pub fn tile_at_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.chunks
            .get_mut(&ChunkKey::containing(x, y))
            .and_then(|chunk| chunk.tiles[local_index(x, y)].as_mut())
    }

    /// Mutable tile lookup that materializes the chunk and an empty tile.
    pub fn tile_mut_or_insert(&mut self, x: i32, y: i32) -> &mut Tile {
        let chunk = self.get_or_create_chunk(ChunkKey::containing(x, y));
        chunk.tiles[local_index(x, y)].get_or_insert_with(Tile::default)
    }

    /// Overwrite the slot at `(x, y)`, creating its chunk if needed.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) {
        let chunk = self.get_or_create_chunk(ChunkKey::containing(x, y));
        chunk.tiles[local_index(x, y)] = Some(tile);
    }

    /// Empty the slot at `(x, y)`. Returns the previous tile.
    pub fn clear_tile(&mut self, x: i32, y: i32) -> Option<Tile> {
        self.chunks
            .get_mut(&ChunkKey::containing(x, y))
            .and_then(|chunk| chunk.tiles[local_index(x, y)].take())
    }

    /// Occupant of `(x, y)`, if any.
    pub fn entity_at(&self, x: i32, y: i32) -> Option<EntityId> {
        self.tile_at(x, y).and_then(|tile| tile.entity_id)
    }

    pub fn is_occupied(&self, id: TileId) -> bool {
        self.entity_at(id.x, id.y).is_some()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> impl Iterator<Item = (&ChunkKey, &Chunk)> {
        self.chunks.iter()
    }

    /// Every materialized tile with its id, chunk by chunk in key order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.chunks.iter().flat_map(|(key, chunk)| {
            chunk
                .tiles
                .iter()
                .enumerate()
                .filter_map(move |(index, slot)| {
                    slot.as_ref().map(|tile| (key.tile_at_index(index), tile))
                })
        })
    }
}
