use crate::TileId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an entity in the world.
///
/// Allocated from the world's `next_entity_id` counter. Serialized as a decimal
/// string because entity ids are JSON map keys in the persisted world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed entity id {0:?}")]
pub struct ParseEntityIdError(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = ParseEntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .parse::<u64>()
            .map(EntityId)
            .map_err(|_| ParseEntityIdError(s.to_string()))?;
        if id.to_string() != s {
            return Err(ParseEntityIdError(s.to_string()));
        }
        Ok(id)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for EntityId {
    type Error = ParseEntityIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Integer top-left corner of an entity footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Position> for glam::IVec2 {
    fn from(p: Position) -> Self {
        glam::IVec2::new(p.x, p.y)
    }
}

impl From<glam::IVec2> for Position {
    fn from(v: glam::IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// One past the largest tile coordinate.
const GRID_END: i64 = i32::MAX as i64 + 1;

/// Axis-aligned rectangle of tiles: `[x, x + width) × [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn at(position: Position, width: u32, height: u32) -> Self {
        Self::new(position.x, position.y, width, height)
    }

    /// True when the rectangle covers no tiles.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, tile: TileId) -> bool {
        let dx = i64::from(tile.x) - i64::from(self.x);
        let dy = i64::from(tile.y) - i64::from(self.y);
        (0..i64::from(self.width)).contains(&dx) && (0..i64::from(self.height)).contains(&dy)
    }

    /// True when every covered tile has an `i32` coordinate.
    pub fn fits_grid(&self) -> bool {
        i64::from(self.x) + i64::from(self.width) <= GRID_END
            && i64::from(self.y) + i64::from(self.height) <= GRID_END
    }

    /// Tiles covered by the rectangle in row-major order (top row first).
    /// Tiles past the edge of the grid are skipped.
    pub fn tiles(self) -> impl Iterator<Item = TileId> {
        let (x0, y0) = (i64::from(self.x), i64::from(self.y));
        let x1 = (x0 + i64::from(self.width)).min(GRID_END);
        let y1 = (y0 + i64::from(self.height)).min(GRID_END);
        (y0..y1).flat_map(move |y| (x0..x1).map(move |x| TileId::new(x as i32, y as i32)))
    }
}

/// Display color in HSL, as handed over by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Color {
    /// Hue in degrees, `0..360`.
    pub h: u16,
    /// Saturation percent.
    pub s: u8,
    /// Lightness percent.
    pub l: u8,
}

impl Color {
    pub const fn hsl(h: u16, s: u8, l: u8) -> Self {
        Self { h, s, l }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::hsl(220, 100, 50)
    }
}

/// Camera position in world units. Only stored; the core never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
}

impl Camera {
    pub fn as_vec2(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Resource deposits that can sit on a tile and be mined into inventories.
///
/// Declaration order is the iteration order of inventories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Iron,
    Copper,
    Coal,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [ResourceType::Iron, ResourceType::Copper, ResourceType::Coal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iron => "iron",
            Self::Copper => "copper",
            Self::Coal => "coal",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_serializes_as_string() {
        assert_eq!(serde_json::to_string(&EntityId(7)).unwrap(), "\"7\"");
        let back: EntityId = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(back, EntityId(12));
        assert!(serde_json::from_str::<EntityId>("\"007\"").is_err());
        assert!(serde_json::from_str::<EntityId>("\"x\"").is_err());
    }

    #[test]
    fn rect_tiles_row_major() {
        let tiles: Vec<TileId> = Rect::new(-1, 0, 2, 2).tiles().collect();
        assert_eq!(
            tiles,
            vec![
                TileId::new(-1, 0),
                TileId::new(0, 0),
                TileId::new(-1, 1),
                TileId::new(0, 1),
            ]
        );
    }

    #[test]
    fn rect_contains_half_open() {
        let r = Rect::new(0, 0, 2, 3);
        assert!(r.contains(TileId::new(1, 2)));
        assert!(!r.contains(TileId::new(2, 0)));
        assert!(!r.contains(TileId::new(0, 3)));
        assert!(!r.contains(TileId::new(-1, 0)));
    }

    #[test]
    fn empty_rect_has_no_tiles() {
        assert!(Rect::new(0, 0, 0, 4).is_empty());
        assert_eq!(Rect::new(0, 0, 0, 4).tiles().count(), 0);
    }

    #[test]
    fn wide_rect_starts_at_grid_minimum() {
        let r = Rect::new(i32::MIN, 0, 1 << 31, 1);
        assert!(r.fits_grid());
        let first: Vec<TileId> = r.tiles().take(2).collect();
        assert_eq!(first, vec![TileId::new(i32::MIN, 0), TileId::new(i32::MIN + 1, 0)]);
    }

    #[test]
    fn rect_past_grid_edge() {
        let r = Rect::new(i32::MAX, 0, 2, 1);
        assert!(!r.fits_grid());
        assert_eq!(r.tiles().collect::<Vec<_>>(), vec![TileId::new(i32::MAX, 0)]);
        assert!(Rect::new(i32::MAX, i32::MAX, 1, 1).fits_grid());
    }

    #[test]
    fn resource_tags_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&ResourceType::Copper).unwrap(),
            "\"copper\""
        );
        assert_eq!(ResourceType::Coal.to_string(), "coal");
    }

    #[test]
    fn default_color_is_seed_blue() {
        assert_eq!(Color::default(), Color::hsl(220, 100, 50));
    }
}
