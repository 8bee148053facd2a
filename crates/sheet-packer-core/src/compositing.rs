//! Atlas assembly and the inverse transform that recovers a sprite from the atlas.

use crate::config::PackerConfig;
use crate::geometry::{Flip, Rect};
use crate::model::AtlasEntry;
use crate::preprocess::{Prepared, Sprite, flipped};
use crate::sizing::SizedPlacement;
use image::{Rgba, RgbaImage, imageops};

const OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Copies `src_rect` of `src` into `canvas` with its top-left at `(dx, dy)`, rotating
/// 90° clockwise when `rotated` is set. Pixels falling outside the canvas are dropped.
pub fn blit_rgba(
    src: &RgbaImage,
    canvas: &mut RgbaImage,
    dx: u32,
    dy: u32,
    src_rect: Rect,
    rotated: bool,
) {
    let (cw, ch) = canvas.dimensions();
    let Rect {
        x: sx,
        y: sy,
        w: sw,
        h: sh,
    } = src_rect;
    // rendered size differs when rotated
    let (rw, rh) = if rotated { (sh, sw) } else { (sw, sh) };

    for yy in 0..rh {
        for xx in 0..rw {
            let (ix, iy) = if rotated {
                (sx + yy, sy + (sh - 1 - xx))
            } else {
                (sx + xx, sy + yy)
            };
            if dx + xx < cw && dy + yy < ch {
                let px = *src.get_pixel(ix, iy);
                canvas.put_pixel(dx + xx, dy + yy, px);
            }
        }
    }
}

/// Replicates the outermost pixels of `frame` outward by `extrude` pixels, corners
/// included.
pub fn extrude_edges(canvas: &mut RgbaImage, frame: Rect, extrude: u32) {
    if extrude == 0 || frame.is_empty() {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    let x0 = frame.x.saturating_sub(extrude);
    let y0 = frame.y.saturating_sub(extrude);
    let x1 = frame.right().saturating_add(extrude).min(cw);
    let y1 = frame.bottom().saturating_add(extrude).min(ch);
    for y in y0..y1 {
        let sy = y.clamp(frame.y, frame.bottom() - 1);
        for x in x0..x1 {
            let sx = x.clamp(frame.x, frame.right() - 1);
            if sx == x && sy == y {
                continue;
            }
            let p = *canvas.get_pixel(sx, sy);
            canvas.put_pixel(x, y, p);
        }
    }
}

/// Draws a 1 px red rectangle on the border of `frame`.
pub fn draw_outline(canvas: &mut RgbaImage, frame: Rect) {
    if frame.is_empty() {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    let mut put = |x: u32, y: u32| {
        if x < cw && y < ch {
            canvas.put_pixel(x, y, OUTLINE);
        }
    };
    for x in frame.x..frame.right() {
        put(x, frame.y);
        put(x, frame.bottom() - 1);
    }
    for y in frame.y..frame.bottom() {
        put(frame.x, y);
        put(frame.right() - 1, y);
    }
}

/// One entry per prepared sprite, in input order, positioned by `sized`.
pub fn layout_entries(prepared: &Prepared, sized: &SizedPlacement) -> Vec<AtlasEntry> {
    prepared
        .sprites
        .iter()
        .enumerate()
        .filter_map(|(i, s)| {
            let p = sized.result.placement(s.unit)?;
            Some(AtlasEntry {
                name: s.key.clone(),
                x: p.frame.x,
                y: p.frame.y,
                width: p.frame.w,
                height: p.frame.h,
                trim_offset_x: s.source.x,
                trim_offset_y: s.source.y,
                original_width: s.original_size.w,
                original_height: s.original_size.h,
                rotated: p.rotated,
                flipped_x: s.flip.x,
                flipped_y: s.flip.y,
                trimmed: s.trimmed,
                alias_of: (s.canonical != i).then(|| prepared.sprites[s.canonical].key.clone()),
            })
        })
        .collect()
}

/// Renders the atlas image and its entries.
///
/// The canvas is filled with `background_color` (transparent when unset); each unit's
/// canonical trimmed pixels are blitted once, then extruded and optionally outlined.
pub fn assemble(
    prepared: &Prepared,
    sprites: &[Sprite],
    sized: &SizedPlacement,
    cfg: &PackerConfig,
) -> (RgbaImage, Vec<AtlasEntry>) {
    let fill = Rgba(cfg.background_color.unwrap_or([0, 0, 0, 0]));
    let mut canvas = RgbaImage::from_pixel(sized.canvas.w, sized.canvas.h, fill);

    for unit in &prepared.units {
        let Some(p) = sized.result.placement(unit.id) else {
            continue;
        };
        let canonical = unit.canonical();
        let src = &sprites[canonical].image;
        let src_rect = prepared.sprites[canonical].source;
        blit_rgba(src, &mut canvas, p.frame.x, p.frame.y, src_rect, p.rotated);
        extrude_edges(&mut canvas, p.frame, cfg.extrude);
        if cfg.outlines {
            draw_outline(&mut canvas, p.frame);
        }
    }

    (canvas, layout_entries(prepared, sized))
}

/// Rebuilds the original sprite described by `entry` from the atlas pixels: un-rotates,
/// applies the entry's flips and places the result at the trim offset on a transparent
/// canvas of the original size.
pub fn extract_sprite(atlas: &RgbaImage, entry: &AtlasEntry) -> RgbaImage {
    let stored = imageops::crop_imm(atlas, entry.x, entry.y, entry.width, entry.height).to_image();
    let upright = if entry.rotated {
        imageops::rotate270(&stored)
    } else {
        stored
    };
    let flip = Flip {
        x: entry.flipped_x,
        y: entry.flipped_y,
    };
    let content = flipped(&upright, flip);

    let mut out = RgbaImage::new(entry.original_width, entry.original_height);
    imageops::replace(
        &mut out,
        content.as_ref(),
        entry.trim_offset_x as i64,
        entry.trim_offset_y as i64,
    );
    out
}
