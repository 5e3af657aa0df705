//! Tile-to-tile connection graph.
//!
//! Connections live on the tiles themselves and are always written to both
//! endpoints, so `a` lists `b` iff `b` lists `a`.

use crate::world::{World, WorldError};
use tileworld_common::TileId;

impl World {
    /// Connect every consecutive pair of tiles in `path`.
    ///
    /// The whole path is checked before anything is written: a repeated tile
    /// or a step longer than one tile rejects it and leaves the world as it
    /// was. Missing tiles are created empty.
    pub fn connect_path(&mut self, path: &[TileId]) -> Result<(), WorldError> {
        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from == to {
                return Err(WorldError::SelfConnection(from));
            }
            if !from.is_adjacent(to) {
                return Err(WorldError::NotAdjacent { from, to });
            }
        }

        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            self.chunks.tile_mut_or_insert(a.x, a.y).connections.insert(b);
            self.chunks.tile_mut_or_insert(b.x, b.y).connections.insert(a);
        }
        if path.len() > 1 {
            tracing::debug!(steps = path.len() - 1, from = %path[0], to = %path[path.len() - 1], "connected path");
        }
        Ok(())
    }

    /// Remove the connection between `a` and `b` from both sides.
    ///
    /// Absent or one-sided relations are a no-op. Returns whether anything
    /// was removed.
    pub fn disconnect(&mut self, a: TileId, b: TileId) -> bool {
        let mut removed = false;
        if let Some(tile) = self.chunks.tile_at_mut(a.x, a.y) {
            removed |= tile.connections.remove(&b);
        }
        if let Some(tile) = self.chunks.tile_at_mut(b.x, b.y) {
            removed |= tile.connections.remove(&a);
        }
        if removed {
            tracing::debug!(%a, %b, "disconnected");
        }
        removed
    }

    pub fn are_connected(&self, a: TileId, b: TileId) -> bool {
        self.chunks
            .tile(a)
            .is_some_and(|tile| tile.connections.contains(&b))
    }

    /// Neighbours `tile` is connected to, in tile order.
    pub fn connections_of(&self, tile: TileId) -> Vec<TileId> {
        self.chunks
            .tile(tile)
            .map(|t| t.connections.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of undirected connections in the world.
    pub fn connection_count(&self) -> usize {
        let ends: usize = self.chunks.tiles().map(|(_, t)| t.connections.len()).sum();
        ends / 2
    }
}
