use crate::cancel::CancelToken;
use crate::compositing::{assemble, layout_entries};
use crate::config::PackerConfig;
use crate::error::{Result, SheetPackerError};
use crate::geometry::{Flip, Rect, Size};
use crate::model::{Atlas, Meta, PackStats, PlacementUnit};
use crate::preprocess::{Prepared, PreparedSprite, Sprite, prepare_sprites};
use crate::sizing::{SizedPlacement, oversized_unit, search};
use image::RgbaImage;
use tracing::{info, instrument};

/// Output of a packing run: atlas metadata and the RGBA canvas.
pub struct PackOutput {
    pub atlas: Atlas,
    pub rgba: RgbaImage,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    /// This is a convenience method that delegates to `atlas.stats()`.
    pub fn stats(&self) -> PackStats {
        self.atlas.stats()
    }
}

/// Packs `sprites` into a single atlas using configuration `cfg`.
///
/// Notes:
/// - Entries come back in input order, one per sprite, duplicates included.
/// - Placement is deterministic for a given input and configuration.
/// - With `method: Auto` several strategies are tried per canvas; `parallel` runs them
///   on the rayon pool when the `parallel` feature is enabled.
#[instrument(skip_all)]
pub fn pack_sprites(sprites: Vec<Sprite>, cfg: PackerConfig) -> Result<PackOutput> {
    pack_sprites_with_cancel(sprites, cfg, &CancelToken::new())
}

/// Same as [`pack_sprites`], aborting with `Cancelled` once `cancel` is triggered.
#[instrument(skip_all, fields(sprites = sprites.len()))]
pub fn pack_sprites_with_cancel(
    sprites: Vec<Sprite>,
    cfg: PackerConfig,
    cancel: &CancelToken,
) -> Result<PackOutput> {
    cfg.validate()?;
    if sprites.is_empty() {
        return Err(SheetPackerError::Empty);
    }

    let prepared = prepare_sprites(&sprites, &cfg)?;
    let sized =
        search(&prepared.units, &cfg, cancel).map_err(|e| name_oversized(e, &prepared, &cfg))?;
    let (rgba, entries) = assemble(&prepared, &sprites, &sized, &cfg);

    let atlas = Atlas {
        width: sized.canvas.w,
        height: sized.canvas.h,
        entries,
        meta: build_meta(&cfg, &sized),
    };
    info!(
        width = atlas.width,
        height = atlas.height,
        units = prepared.units.len(),
        strategy = %atlas.meta.method,
        "atlas packed"
    );
    Ok(PackOutput { atlas, rgba })
}

/// Packs sizes without pixel data.
/// Inputs are (key, width, height). No trimming or deduplication is applied; every input
/// becomes its own unit.
#[instrument(skip_all)]
pub fn pack_layout<K: Into<String>>(inputs: Vec<(K, u32, u32)>, cfg: PackerConfig) -> Result<Atlas> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(SheetPackerError::Empty);
    }

    let mut sprites = Vec::with_capacity(inputs.len());
    let mut units = Vec::with_capacity(inputs.len());
    for (i, (k, w, h)) in inputs.into_iter().enumerate() {
        let key: String = k.into();
        if w == 0 || h == 0 {
            return Err(SheetPackerError::InvalidDimension {
                key,
                width: w,
                height: h,
            });
        }
        let size = Size::new(w, h);
        units.push(PlacementUnit::new(i, size));
        sprites.push(PreparedSprite {
            key,
            source: Rect::from_size(0, 0, size),
            original_size: size,
            trimmed: false,
            content_hash: 0,
            canonical: i,
            flip: Flip::NONE,
            unit: i,
        });
    }
    let prepared = Prepared { sprites, units };

    let sized = search(&prepared.units, &cfg, &CancelToken::new())
        .map_err(|e| name_oversized(e, &prepared, &cfg))?;
    let mut meta = build_meta(&cfg, &sized);
    meta.trim = false;
    meta.allow_flip = false;
    info!(
        width = sized.canvas.w,
        height = sized.canvas.h,
        strategy = %meta.method,
        "layout packed"
    );
    Ok(Atlas {
        width: sized.canvas.w,
        height: sized.canvas.h,
        entries: layout_entries(&prepared, &sized),
        meta,
    })
}

/// Fills in the sprite responsible for an `AtlasTooLarge`, when a single one is.
fn name_oversized(err: SheetPackerError, prepared: &Prepared, cfg: &PackerConfig) -> SheetPackerError {
    match err {
        SheetPackerError::AtlasTooLarge {
            key: None,
            width,
            height,
            max_width,
            max_height,
            required_area,
        } => {
            let key = oversized_unit(&prepared.units, cfg)
                .map(|u| prepared.sprites[prepared.units[u].canonical()].key.clone());
            SheetPackerError::AtlasTooLarge {
                key,
                width,
                height,
                max_width,
                max_height,
                required_area,
            }
        }
        other => other,
    }
}

fn build_meta(cfg: &PackerConfig, sized: &SizedPlacement) -> Meta {
    Meta {
        app: "sheet-packer".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        format: "RGBA8888".into(),
        method: sized.trial.label(),
        power_of_two: cfg.power_of_two,
        square: cfg.square,
        padding: cfg.padding,
        border_padding: cfg.border_padding,
        extrude: cfg.extrude,
        allow_rotation: cfg.allow_rotation,
        allow_flip: cfg.allow_flip,
        trim: cfg.trim,
        background_color: cfg.background_color,
    }
}
