//! Tileset catalog with per-quadrant collision and tile animations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of sub-tile columns in every tileset image
pub const TILESET_COLUMNS: usize = 16;
/// Number of sub-tile rows in every tileset image
pub const TILESET_ROWS: usize = 16;
/// Total sub-tiles in a tileset, addressable by a `u8`
pub const TILESET_TILE_COUNT: usize = TILESET_COLUMNS * TILESET_ROWS;

/// Bits of a tile's 4-bit collision value
///
/// Each tile is split into four quadrants. A set bit means that quadrant blocks movement.
pub mod quadrant {
    pub const TOP_LEFT: u8 = 0b0001;
    pub const TOP_RIGHT: u8 = 0b0010;
    pub const BOTTOM_LEFT: u8 = 0b0100;
    pub const BOTTOM_RIGHT: u8 = 0b1000;
    pub const ALL: u8 = 0b1111;

    /// Bit for the quadrant at column `dx`, row `dy` inside a tile (each 0 or 1)
    pub const fn bit(dx: u32, dy: u32) -> u8 {
        1 << (dy * 2 + dx)
    }
}

/// One frame of a tile animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFrame {
    /// Sub-tile index displayed during this frame
    pub tile: u8,
    /// How long the frame is shown
    pub duration_ms: u32,
}

impl AnimationFrame {
    pub fn new(tile: u8, duration_ms: u32) -> Self {
        Self { tile, duration_ms }
    }
}

/// An ordered, looping sequence of frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TileAnimation {
    pub frames: Vec<AnimationFrame>,
}

impl TileAnimation {
    pub fn new(frames: Vec<AnimationFrame>) -> Self {
        Self { frames }
    }

    /// The tile shown first, which is also the tile placed on the map
    pub fn first_tile(&self) -> Option<u8> {
        self.frames.first().map(|f| f.tile)
    }

    /// Duration of one full loop in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.duration_ms)).sum()
    }

    /// Get the tile shown at `time_ms` into the (looping) animation
    pub fn frame_at_time(&self, time_ms: u64) -> Option<u8> {
        let total = self.total_duration_ms();
        if total == 0 {
            return self.first_tile();
        }

        let mut remaining = time_ms % total;
        for frame in &self.frames {
            let duration = u64::from(frame.duration_ms);
            if remaining < duration {
                return Some(frame.tile);
            }
            remaining -= duration;
        }
        self.frames.last().map(|f| f.tile)
    }
}

/// A tileset definition: one 16x16 image of sub-tiles plus their collision and animation data
///
/// Tilesets are built once when their definition is loaded and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    pub id: Uuid,
    pub name: String,
    /// Path of the tileset definition file, unique among the tilesets of a map
    pub definition_path: String,
    /// Path to the image file
    pub image_path: String,
    /// Collision nibble for each sub-tile, indexed `[row][column]`
    #[serde(default)]
    collision: [[u8; TILESET_COLUMNS]; TILESET_ROWS],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    animations: Vec<TileAnimation>,
}

impl Tileset {
    /// Create a tileset for a loaded definition, with no collision and no animations
    pub fn new(
        name: impl Into<String>,
        definition_path: impl Into<String>,
        image_path: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            definition_path: definition_path.into(),
            image_path: image_path.into(),
            collision: [[0; TILESET_COLUMNS]; TILESET_ROWS],
            animations: Vec::new(),
        }
    }

    /// Create a tileset that has not been loaded from any definition yet
    pub fn new_empty(name: impl Into<String>) -> Self {
        Self::new(name, String::new(), String::new())
    }

    /// Whether a definition and an image have been loaded
    pub fn is_initialized(&self) -> bool {
        !self.definition_path.is_empty() && !self.image_path.is_empty()
    }

    /// Set the collision quadrants of a sub-tile (only the low 4 bits are kept)
    pub fn with_collision(mut self, tile: u8, quadrants: u8) -> Self {
        let (row, col) = Self::grid_position(tile);
        self.collision[row][col] = quadrants & quadrant::ALL;
        self
    }

    /// Replace the whole collision table
    pub fn with_collision_table(mut self, table: [[u8; TILESET_COLUMNS]; TILESET_ROWS]) -> Self {
        for (row, values) in table.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                self.collision[row][col] = value & quadrant::ALL;
            }
        }
        self
    }

    /// Add an animation sequence
    pub fn with_animation(mut self, animation: TileAnimation) -> Self {
        self.animations.push(animation);
        self
    }

    /// Get the collision quadrants of a sub-tile
    pub fn collision(&self, tile: u8) -> u8 {
        let (row, col) = Self::grid_position(tile);
        self.collision[row][col] & quadrant::ALL
    }

    /// Check if any quadrant of a sub-tile blocks movement
    pub fn tile_has_collision(&self, tile: u8) -> bool {
        self.collision(tile) != 0
    }

    /// The raw collision table, indexed `[row][column]`
    pub fn collision_table(&self) -> &[[u8; TILESET_COLUMNS]; TILESET_ROWS] {
        &self.collision
    }

    pub fn animations(&self) -> &[TileAnimation] {
        &self.animations
    }

    /// Get the animation that starts on `tile`, if any
    pub fn animation_for(&self, tile: u8) -> Option<&TileAnimation> {
        self.animations
            .iter()
            .find(|a| a.first_tile() == Some(tile))
    }

    /// Check that every collision value fits in a nibble
    pub(crate) fn validate(&self) -> Result<(), String> {
        for (row, values) in self.collision.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                if *value > quadrant::ALL {
                    return Err(format!(
                        "Tileset '{}' has collision value {} at row {}, column {}",
                        self.name, value, row, col
                    ));
                }
            }
        }
        Ok(())
    }

    fn grid_position(tile: u8) -> (usize, usize) {
        let tile = tile as usize;
        (tile / TILESET_COLUMNS, tile % TILESET_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tileset_is_initialized() {
        let tileset = Tileset::new("Desert", "tilesets/desert.lua", "img/desert.png");
        assert!(tileset.is_initialized());
        assert!(!Tileset::new_empty("Unloaded").is_initialized());
    }

    #[test]
    fn test_collision_lookup() {
        let tileset = Tileset::new("Desert", "desert.lua", "desert.png")
            .with_collision(0, quadrant::ALL)
            .with_collision(17, quadrant::TOP_LEFT | quadrant::BOTTOM_RIGHT)
            .with_collision(255, 0xF2);

        assert_eq!(tileset.collision(0), 15);
        assert_eq!(tileset.collision(17), 0b1001);
        assert_eq!(tileset.collision_table()[1][1], 0b1001);
        // High bits are dropped
        assert_eq!(tileset.collision(255), 0b0010);
        assert!(!tileset.tile_has_collision(1));
        assert!(tileset.validate().is_ok());
    }

    #[test]
    fn test_quadrant_bits() {
        assert_eq!(quadrant::bit(0, 0), quadrant::TOP_LEFT);
        assert_eq!(quadrant::bit(1, 0), quadrant::TOP_RIGHT);
        assert_eq!(quadrant::bit(0, 1), quadrant::BOTTOM_LEFT);
        assert_eq!(quadrant::bit(1, 1), quadrant::BOTTOM_RIGHT);
    }

    #[test]
    fn test_animation_frames() {
        let animation = TileAnimation::new(vec![
            AnimationFrame::new(4, 100),
            AnimationFrame::new(5, 50),
            AnimationFrame::new(6, 150),
        ]);

        assert_eq!(animation.total_duration_ms(), 300);
        assert_eq!(animation.frame_at_time(0), Some(4));
        assert_eq!(animation.frame_at_time(99), Some(4));
        assert_eq!(animation.frame_at_time(100), Some(5));
        assert_eq!(animation.frame_at_time(160), Some(6));
        // Loops
        assert_eq!(animation.frame_at_time(310), Some(4));

        assert_eq!(TileAnimation::default().frame_at_time(10), None);
    }

    #[test]
    fn test_long_animation_does_not_overflow() {
        let animation = TileAnimation::new(vec![
            AnimationFrame::new(1, u32::MAX),
            AnimationFrame::new(2, 1),
        ]);

        assert_eq!(animation.total_duration_ms(), u64::from(u32::MAX) + 1);
        assert_eq!(animation.frame_at_time(u64::from(u32::MAX) - 1), Some(1));
        assert_eq!(animation.frame_at_time(u64::from(u32::MAX)), Some(2));
        assert_eq!(animation.frame_at_time(u64::from(u32::MAX) + 1), Some(1));
        assert_eq!(animation.frame_at_time(u64::MAX), Some(2));
    }

    #[test]
    fn test_animation_for_tile() {
        let tileset = Tileset::new("Water", "water.lua", "water.png").with_animation(
            TileAnimation::new(vec![AnimationFrame::new(8, 200), AnimationFrame::new(9, 200)]),
        );

        assert!(tileset.animation_for(8).is_some());
        assert!(tileset.animation_for(9).is_none());
        assert_eq!(tileset.animations().len(), 1);
    }
}
