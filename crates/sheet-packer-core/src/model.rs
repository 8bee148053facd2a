use crate::geometry::Size;
use serde::{Deserialize, Serialize};

/// Rectangle handed to the packers: a trimmed sprite, possibly standing in for
/// several identical or mirrored sprites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementUnit {
    /// Position of the unit in the unit list.
    pub id: usize,
    /// Trimmed content size (padding and extrusion are added by the packers).
    pub size: Size,
    /// Indices of the sprites sharing this unit; the canonical sprite comes first.
    pub members: Vec<usize>,
}

impl PlacementUnit {
    pub fn new(id: usize, size: Size) -> Self {
        Self {
            id,
            size,
            members: vec![id],
        }
    }

    pub fn canonical(&self) -> usize {
        self.members[0]
    }
}

/// Per-sprite record sufficient to rebuild the original sprite from the atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasEntry {
    /// Sprite key (e.g., file name or asset path).
    pub name: String,
    /// Top-left of the stored pixels within the atlas.
    pub x: u32,
    pub y: u32,
    /// Stored (post-rotation) size within the atlas.
    pub width: u32,
    pub height: u32,
    /// Position of the trimmed pixels within the original sprite.
    pub trim_offset_x: u32,
    pub trim_offset_y: u32,
    /// Untrimmed sprite size.
    pub original_width: u32,
    pub original_height: u32,
    /// Stored rotated 90° clockwise.
    pub rotated: bool,
    /// Sprite is the horizontal mirror of the stored pixels.
    pub flipped_x: bool,
    /// Sprite is the vertical mirror of the stored pixels.
    pub flipped_y: bool,
    /// True if transparent borders were removed.
    pub trimmed: bool,
    /// Name of the sprite whose pixels are stored, when this one is a duplicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

impl AtlasEntry {
    /// Trimmed size in the sprite's own orientation.
    pub fn source_size(&self) -> Size {
        if self.rotated {
            Size::new(self.height, self.width)
        } else {
            Size::new(self.width, self.height)
        }
    }
}

/// Atlas-level metadata echoed for consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub app: String,
    pub version: String,
    pub format: String,
    /// Label of the strategy that produced the placement (e.g. `maxrects-bssf`).
    pub method: String,
    pub power_of_two: bool,
    pub square: bool,
    pub padding: u32,
    pub border_padding: u32,
    pub extrude: u32,
    pub allow_rotation: bool,
    pub allow_flip: bool,
    pub trim: bool,
    pub background_color: Option<[u8; 4]>,
}

/// Packed atlas: canvas size plus one entry per input sprite, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atlas {
    pub width: u32,
    pub height: u32,
    pub entries: Vec<AtlasEntry>,
    pub meta: Meta,
}

impl Atlas {
    pub fn entry(&self, name: &str) -> Option<&AtlasEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Computes packing statistics for this atlas.
    pub fn stats(&self) -> PackStats {
        let canvas_area = self.width as u64 * self.height as u64;
        let mut num_units = 0;
        let mut used_area = 0u64;
        let mut num_rotated = 0;
        let mut num_trimmed = 0;
        let mut num_flipped = 0;
        let mut num_aliases = 0;

        for e in &self.entries {
            if e.rotated {
                num_rotated += 1;
            }
            if e.trimmed {
                num_trimmed += 1;
            }
            if e.flipped_x || e.flipped_y {
                num_flipped += 1;
            }
            // Shared storage is counted once.
            if e.alias_of.is_some() {
                num_aliases += 1;
            } else {
                num_units += 1;
                used_area += e.width as u64 * e.height as u64;
            }
        }

        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };

        PackStats {
            num_entries: self.entries.len(),
            num_units,
            canvas_area,
            used_area,
            occupancy,
            width: self.width,
            height: self.height,
            num_rotated,
            num_trimmed,
            num_flipped,
            num_aliases,
        }
    }
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of input sprites.
    pub num_entries: usize,
    /// Number of distinct stored sprites (after deduplication).
    pub num_units: usize,
    /// Canvas area in pixels.
    pub canvas_area: u64,
    /// Pixels covered by stored sprites.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0). Higher is better.
    pub occupancy: f64,
    pub width: u32,
    pub height: u32,
    pub num_rotated: usize,
    pub num_trimmed: usize,
    pub num_flipped: usize,
    /// Entries that reuse another sprite's pixels.
    pub num_aliases: usize,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Canvas: {}x{}, Sprites: {} ({} stored), Occupancy: {:.2}%, Used Area: {} px², Rotated: {}, Trimmed: {}, Flipped: {}",
            self.width,
            self.height,
            self.num_entries,
            self.num_units,
            self.occupancy * 100.0,
            self.used_area,
            self.num_rotated,
            self.num_trimmed,
            self.num_flipped,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.canvas_area > 0 {
            (self.wasted_area() as f64 / self.canvas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
