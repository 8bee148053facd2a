//! Sprite preprocessing: transparent-border trimming, content/flip deduplication and
//! construction of the placement units fed to the packers.

use crate::config::{PackerConfig, alpha_cutoff};
use crate::error::{Result, SheetPackerError};
use crate::geometry::{Flip, Rect, Size};
use crate::model::PlacementUnit;
use image::{DynamicImage, RgbaImage, imageops};
use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::debug;
use twox_hash::XxHash64;

/// In-memory sprite to pack (key + decoded pixels).
#[derive(Debug, Clone)]
pub struct Sprite {
    pub key: String,
    pub image: RgbaImage,
}

impl Sprite {
    pub fn new(key: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            key: key.into(),
            image,
        }
    }

    pub fn from_dynamic(key: impl Into<String>, image: DynamicImage) -> Self {
        Self::new(key, image.to_rgba8())
    }

    pub fn size(&self) -> Size {
        let (w, h) = self.image.dimensions();
        Size::new(w, h)
    }
}

/// Result of trimming one sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trim {
    /// Bounding box of visible pixels within the original sprite.
    pub rect: Rect,
    /// No pixel was above the threshold; `rect` is the 1x1 placeholder at the origin
    /// (0x0 for a zero-sized image).
    pub empty: bool,
}

impl Trim {
    /// `(dx, dy)` from the original origin to the trimmed rectangle.
    pub fn offset(&self) -> (u32, u32) {
        (self.rect.x, self.rect.y)
    }
}

/// Finds the minimal bounding box of pixels whose alpha is above `alpha_threshold`
/// percent of 255.
///
/// A zero-sized image yields an empty rectangle at the origin.
pub fn trim(image: &RgbaImage, alpha_threshold: u8) -> Trim {
    let cutoff = alpha_cutoff(alpha_threshold);
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Trim {
            rect: Rect::new(0, 0, 0, 0),
            empty: true,
        };
    }
    let visible = |x: u32, y: u32| image.get_pixel(x, y)[3] > cutoff;
    let column_clear = |x: u32, y1: u32, y2: u32| (y1..y2).all(|y| !visible(x, y));
    let row_clear = |y: u32, x1: u32, x2: u32| (x1..x2).all(|x| !visible(x, y));

    let mut left = 0;
    while left < w && column_clear(left, 0, h) {
        left += 1;
    }
    if left >= w {
        return Trim {
            rect: Rect::new(0, 0, 1, 1),
            empty: true,
        };
    }
    // Column `left` holds a visible pixel, so the remaining scans always stop.
    let mut right = w;
    while right - 1 > left && column_clear(right - 1, 0, h) {
        right -= 1;
    }
    let mut top = 0;
    while row_clear(top, left, right) {
        top += 1;
    }
    let mut bottom = h;
    while bottom - 1 > top && row_clear(bottom - 1, left, right) {
        bottom -= 1;
    }
    Trim {
        rect: Rect::new(left, top, right - left, bottom - top),
        empty: false,
    }
}

/// Canonical representative of a sprite after deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canonical {
    /// Index of the sprite whose pixels are stored.
    pub index: usize,
    /// The sprite equals the canonical pixels mirrored by `flip`.
    pub flip: Flip,
}

/// Returns `image` mirrored according to `flip`.
pub fn flipped(image: &RgbaImage, flip: Flip) -> Cow<'_, RgbaImage> {
    match (flip.x, flip.y) {
        (false, false) => Cow::Borrowed(image),
        (true, false) => Cow::Owned(imageops::flip_horizontal(image)),
        (false, true) => Cow::Owned(imageops::flip_vertical(image)),
        (true, true) => Cow::Owned(imageops::rotate180(image)),
    }
}

/// 64-bit content hash over size and raw RGBA bytes.
pub fn content_hash(image: &RgbaImage) -> u64 {
    let mut hasher = XxHash64::default();
    image.dimensions().hash(&mut hasher);
    image.as_raw().hash(&mut hasher);
    hasher.finish()
}

/// Confirms a hash match byte for byte.
fn same_pixels(a: &RgbaImage, b: &RgbaImage) -> bool {
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}

/// Groups bit-identical images, optionally also matching horizontal, vertical and
/// combined mirrors. The first image of each group (input order) is its canonical.
///
/// Returns one `Canonical` per input image; canonicals point at themselves.
pub fn deduplicate_by_content(images: &[RgbaImage], allow_flip: bool) -> Vec<Canonical> {
    let hashes: Vec<u64> = images.iter().map(content_hash).collect();
    dedup_with_hashes(images, &hashes, allow_flip)
}

fn dedup_with_hashes(images: &[RgbaImage], hashes: &[u64], allow_flip: bool) -> Vec<Canonical> {
    let flips: &[Flip] = if allow_flip {
        &[Flip::NONE, Flip::HORIZONTAL, Flip::VERTICAL, Flip::BOTH]
    } else {
        &[Flip::NONE]
    };
    // hash -> canonical indices (several on collisions)
    let mut seen: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut out = Vec::with_capacity(images.len());

    for (i, img) in images.iter().enumerate() {
        let found = flips.iter().find_map(|&flip| {
            let variant = flipped(img, flip);
            let hash = if flip.is_none() {
                hashes[i]
            } else {
                content_hash(&variant)
            };
            seen.get(&hash)?
                .iter()
                .copied()
                .find(|&c| same_pixels(&variant, &images[c]))
                .map(|index| Canonical { index, flip })
        });
        match found {
            Some(c) => out.push(c),
            None => {
                seen.entry(hashes[i]).or_default().push(i);
                out.push(Canonical {
                    index: i,
                    flip: Flip::NONE,
                });
            }
        }
    }
    out
}

/// Per-sprite preprocessing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSprite {
    pub key: String,
    /// Trimmed rectangle within the original sprite.
    pub source: Rect,
    pub original_size: Size,
    pub trimmed: bool,
    /// Hash of the trimmed pixels.
    pub content_hash: u64,
    /// Sprite whose pixels represent this one.
    pub canonical: usize,
    pub flip: Flip,
    /// Unit this sprite is stored in.
    pub unit: usize,
}

/// Output of `prepare_sprites`: one record per sprite, one unit per distinct image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub sprites: Vec<PreparedSprite>,
    pub units: Vec<PlacementUnit>,
}

/// Validates, trims and deduplicates `sprites` according to `cfg`.
///
/// `allow_flip` implies deduplication even when `dedupe` is off.
pub fn prepare_sprites(sprites: &[Sprite], cfg: &PackerConfig) -> Result<Prepared> {
    let mut sources = Vec::with_capacity(sprites.len());
    let mut crops = Vec::with_capacity(sprites.len());
    for s in sprites {
        let size = s.size();
        if size.w == 0 || size.h == 0 {
            return Err(SheetPackerError::InvalidDimension {
                key: s.key.clone(),
                width: size.w,
                height: size.h,
            });
        }
        let (rect, trimmed) = if cfg.trim {
            let t = trim(&s.image, cfg.alpha_threshold);
            (t.rect, t.rect.size() != size)
        } else {
            (Rect::from_size(0, 0, size), false)
        };
        crops.push(imageops::crop_imm(&s.image, rect.x, rect.y, rect.w, rect.h).to_image());
        sources.push((rect, trimmed, size));
    }

    let hashes: Vec<u64> = crops.iter().map(content_hash).collect();
    let canon = if cfg.dedupe || cfg.allow_flip {
        dedup_with_hashes(&crops, &hashes, cfg.allow_flip)
    } else {
        (0..crops.len())
            .map(|index| Canonical {
                index,
                flip: Flip::NONE,
            })
            .collect()
    };

    let mut units: Vec<PlacementUnit> = Vec::new();
    let mut unit_of: Vec<usize> = Vec::with_capacity(sprites.len());
    for (i, c) in canon.iter().enumerate() {
        if c.index == i {
            let id = units.len();
            units.push(PlacementUnit {
                id,
                size: Size::from(crops[i].dimensions()),
                members: vec![i],
            });
            unit_of.push(id);
        } else {
            let id = unit_of[c.index];
            units[id].members.push(i);
            unit_of.push(id);
        }
    }

    let prepared: Vec<PreparedSprite> = sprites
        .iter()
        .zip(sources)
        .enumerate()
        .map(|(i, (s, (source, trimmed, original_size)))| PreparedSprite {
            key: s.key.clone(),
            source,
            original_size,
            trimmed,
            content_hash: hashes[i],
            canonical: canon[i].index,
            flip: canon[i].flip,
            unit: unit_of[i],
        })
        .collect();

    debug!(
        sprites = prepared.len(),
        units = units.len(),
        "prepared sprites"
    );
    Ok(Prepared {
        sprites: prepared,
        units,
    })
}
