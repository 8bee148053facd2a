//! Core library for packing sprites into a single atlas.
//!
//! - Preprocessing: transparent-border trimming, exact and mirror-aware deduplication
//! - Algorithms: MaxRects (BSSF/BLSF/BAF/BL/CP), Guillotine (choice + split), Shelf,
//!   Shelf-FFDH, Skyline (BL/MW), Simple Row, and an Auto portfolio over all of them
//! - Sizing: Automatic growth, MinMax bounds or a Manual fixed canvas
//! - Pipeline: `pack_sprites` takes in-memory images and returns the RGBA atlas plus
//!   serde-serializable entries; `extract_sprite` reverses the transform
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use sheet_packer_core::{PackerConfig, Sprite, pack_sprites};
//! # fn main() -> anyhow::Result<()> {
//! let a = ImageReader::open("a.png")?.decode()?;
//! let b = ImageReader::open("b.png")?.decode()?;
//! let sprites = vec![Sprite::from_dynamic("a", a), Sprite::from_dynamic("b", b)];
//! let cfg = PackerConfig { max_width: 1024, max_height: 1024, ..Default::default() };
//! let out = pack_sprites(sprites, cfg)?;
//! println!("{}", out.stats().summary());
//! # Ok(()) }
//! ```

pub mod cancel;
pub mod compositing;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod preprocess;
pub mod sizing;

pub use cancel::CancelToken;
pub use compositing::{assemble, extract_sprite};
pub use config::*;
pub use error::*;
pub use geometry::*;
pub use model::*;
pub use packer::{PackFailure, PackOptions, Packer, Placement, PlacementResult, Strategy, pack_units};
pub use pipeline::*;
pub use preprocess::{Sprite, deduplicate_by_content, prepare_sprites, trim};
pub use sizing::SizedPlacement;

/// Convenience prelude for common types and functions.
/// Importing `sheet_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::cancel::CancelToken;
    pub use crate::config::{
        GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, PackerConfig,
        PackerConfigBuilder, PackerMethod, SizingMode, SkylineHeuristic,
    };
    pub use crate::model::{Atlas, AtlasEntry, Meta, PackStats};
    pub use crate::{
        PackOutput, SheetPackerError, Sprite, extract_sprite, pack_layout, pack_sprites,
        pack_sprites_with_cancel,
    };
}
