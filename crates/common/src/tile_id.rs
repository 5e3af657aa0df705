use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one integer cell of the grid.
///
/// The canonical key is `"x,y"` in decimal. Keys are used as JSON map keys in
/// the persisted world and as node identifiers in the connection graph, so the
/// type serializes as its key string rather than as a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TileId {
    pub x: i32,
    pub y: i32,
}

/// Error returned when a string is not a canonical tile key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed tile id {0:?}: expected \"x,y\"")]
pub struct ParseTileIdError(pub String);

impl TileId {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Encode a coordinate pair into its canonical key.
    pub fn encode(x: i32, y: i32) -> String {
        Self::new(x, y).key()
    }

    /// Decode a canonical key back into its coordinates.
    ///
    /// Keys only ever come from `encode` or from schema-checked storage, so a
    /// malformed key here is a caller bug and panics.
    pub fn decode(key: &str) -> (i32, i32) {
        match key.parse::<TileId>() {
            Ok(id) => (id.x, id.y),
            Err(e) => panic!("{e}"),
        }
    }

    /// Canonical string key.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Offset by `(dx, dy)`. The result must lie on the grid.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Offset by `(dx, dy)`, or `None` past the edge of the grid.
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Chebyshev distance between two tiles. Exact across the whole grid.
    pub fn chebyshev(self, other: Self) -> u32 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).unsigned_abs();
        dx.max(dy) as u32
    }

    /// True when the tiles are distinct 8-neighbours.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.chebyshev(other) == 1
    }

    /// Tile containing a world-space point (floors both axes).
    pub fn containing(point: glam::Vec2) -> Self {
        Self::new(point.x.floor() as i32, point.y.floor() as i32)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for TileId {
    type Err = ParseTileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTileIdError(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(err)?;
        let x = x.parse::<i32>().map_err(|_| err())?;
        let y = y.parse::<i32>().map_err(|_| err())?;
        let id = Self::new(x, y);
        // Reject "+1", "01" and "-0": only the canonical spelling is a key.
        if id.key() != s {
            return Err(err());
        }
        Ok(id)
    }
}

impl From<TileId> for String {
    fn from(id: TileId) -> Self {
        id.key()
    }
}

impl TryFrom<String> for TileId {
    type Error = ParseTileIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<(i32, i32)> for TileId {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
