// this_file: src/render.rs
//! Composite output rendering: base image, tinted overlay, red frames.

use crate::align::Offset;
use crate::color::blend;
use crate::config::DiffConfig;
use crate::logging::Timer;
use crate::rect::Rect;
use image::{imageops, Rgba, RgbaImage};
use log::info;

/// Frame thickness around each diff region, in pixels.
const BORDER_THICKNESS: i32 = 3;
/// Frame color.
const BORDER_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Render the comparison result.
///
/// The canvas is sized to the larger of the two images on each axis and
/// starts as a copy of image B. Each diff region gets the first image
/// blended over its interior (when the overlay is enabled) and a red frame
/// around its perimeter.
pub fn render_diff_image(
    img_a: &RgbaImage,
    img_b: &RgbaImage,
    offset: Offset,
    regions: &[Rect],
    cfg: &DiffConfig,
) -> RgbaImage {
    let timer = Timer::new("diff image rendering");

    let width = img_a.width().max(img_b.width());
    let height = img_a.height().max(img_b.height());
    info!("Creating result image ({}x{}) from {} regions", width, height, regions.len());

    let mut canvas = RgbaImage::new(width, height);
    imageops::replace(&mut canvas, img_b, 0, 0);

    if cfg.overlay_enabled {
        if cfg.tint_enabled {
            info!(
                "Applying tinted overlay (R:{} G:{} B:{}) transparency={:.0}%, strength={:.0}%, tint transparency={:.0}%",
                cfg.tint.r,
                cfg.tint.g,
                cfg.tint.b,
                cfg.overlay_transparency * 100.0,
                cfg.tint_strength * 100.0,
                cfg.tint_transparency * 100.0
            );
        } else {
            info!(
                "Applying transparent overlay with transparency {:.0}%",
                cfg.overlay_transparency * 100.0
            );
        }
    }

    for region in regions {
        if cfg.overlay_enabled {
            draw_overlay(&mut canvas, img_a, offset, region, cfg);
        }
        draw_border(&mut canvas, region);
    }

    timer.log_elapsed(log::Level::Info);
    canvas
}

/// Blend the mapped image-A pixels over the region interior (inside the
/// border). Pixels whose mapped coordinate falls outside image A keep the
/// base canvas content.
fn draw_overlay(
    canvas: &mut RgbaImage,
    img_a: &RgbaImage,
    offset: Offset,
    region: &Rect,
    cfg: &DiffConfig,
) {
    let (canvas_w, canvas_h) = (canvas.width() as i32, canvas.height() as i32);
    let (width_a, height_a) = (img_a.width() as i32, img_a.height() as i32);

    for y in (region.min_y + BORDER_THICKNESS)..(region.max_y - BORDER_THICKNESS) {
        for x in (region.min_x + BORDER_THICKNESS)..(region.max_x - BORDER_THICKNESS) {
            if x < 0 || x >= canvas_w || y < 0 || y >= canvas_h {
                continue;
            }

            let src_x = x - offset.dx;
            let src_y = y - offset.dy;
            if src_x < 0 || src_x >= width_a || src_y < 0 || src_y >= height_a {
                continue;
            }

            let dst = *canvas.get_pixel(x as u32, y as u32);
            let src = *img_a.get_pixel(src_x as u32, src_y as u32);
            let blended = blend(
                dst,
                src,
                cfg.overlay_transparency,
                cfg.tint,
                cfg.tint_enabled,
                cfg.tint_strength,
                cfg.tint_transparency,
            );
            canvas.put_pixel(x as u32, y as u32, blended);
        }
    }
}

/// Draw a solid red frame along the region perimeter.
fn draw_border(canvas: &mut RgbaImage, region: &Rect) {
    let (canvas_w, canvas_h) = (canvas.width() as i32, canvas.height() as i32);

    let mut set = |x: i32, y: i32| {
        if x >= 0 && x < canvas_w && y >= 0 && y < canvas_h {
            canvas.put_pixel(x as u32, y as u32, BORDER_COLOR);
        }
    };

    for x in region.min_x..region.max_x {
        for i in 0..BORDER_THICKNESS {
            let top = region.min_y + i;
            if top < region.max_y {
                set(x, top);
            }
            let bottom = region.max_y - 1 - i;
            if bottom >= region.min_y {
                set(x, bottom);
            }
        }
    }

    for y in region.min_y..region.max_y {
        for i in 0..BORDER_THICKNESS {
            let left = region.min_x + i;
            if left < region.max_x {
                set(left, y);
            }
            let right = region.max_x - 1 - i;
            if right >= region.min_x {
                set(right, y);
            }
        }
    }
}
