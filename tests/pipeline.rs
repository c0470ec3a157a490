// this_file: tests/pipeline.rs
//! End-to-end library tests: alignment, detection and rendering together.

use imgdiff::image::{Rgba, RgbaImage};
use imgdiff::{DiffConfig, Offset};

fn black_canvas(size: u32) -> RgbaImage {
    RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 255]))
}

fn paint_square(img: &mut RgbaImage, x0: u32, y0: u32, side: u32, color: [u8; 4]) {
    for y in y0..(y0 + side) {
        for x in x0..(x0 + side) {
            img.put_pixel(x, y, Rgba(color));
        }
    }
}

#[test]
fn test_alignment_recovers_known_shift() {
    // 200x200 black canvases; a 50x50 white square at the center of A
    // appears shifted by (25, 25) in B.
    let mut img_a = black_canvas(200);
    let mut img_b = black_canvas(200);
    paint_square(&mut img_a, 75, 75, 50, [255, 255, 255, 255]);
    paint_square(&mut img_b, 100, 100, 50, [255, 255, 255, 255]);

    let cfg = DiffConfig {
        max_offset: 40,
        sampling_rate: 1,
        fast_mode: false,
        workers: std::thread::available_parallelism().map_or(4, |n| n.get()),
        ..DiffConfig::default()
    }
    .clamped();

    let offset = imgdiff::find_best_alignment(&img_a, &img_b, &cfg).unwrap();
    assert!(
        (offset.dx - 25).abs() <= 1 && (offset.dy - 25).abs() <= 1,
        "expected offset near (25, 25), got ({}, {})",
        offset.dx,
        offset.dy
    );

    let at_best = imgdiff::similarity_score(&img_a, &img_b, offset.dx, offset.dy, 1, cfg.threshold);
    let at_origin = imgdiff::similarity_score(&img_a, &img_b, 0, 0, 1, cfg.threshold);
    assert!(
        at_best > at_origin,
        "aligned score {} must beat origin score {}",
        at_best,
        at_origin
    );
}

#[test]
fn test_identical_images_full_pipeline() {
    let img = black_canvas(80);
    let cfg = DiffConfig { max_offset: 5, sampling_rate: 1, ..DiffConfig::default() }.clamped();

    let offset = imgdiff::find_best_alignment(&img, &img, &cfg).unwrap();
    assert_eq!(offset, Offset::new(0, 0));
    assert!(!imgdiff::has_differences(&img, &img, offset, &cfg));

    let regions = imgdiff::detect_diff_regions(&img, &img, offset, &cfg);
    assert!(regions.is_empty());

    // The rendered output with no regions is just the base image.
    let out = imgdiff::render_diff_image(&img, &img, offset, &regions, &cfg);
    assert_eq!(out, img);
}

#[test]
fn test_changed_content_is_framed_in_output() {
    let base = black_canvas(120);
    let mut changed = black_canvas(120);
    paint_square(&mut changed, 40, 40, 30, [0, 200, 0, 255]);

    let cfg = DiffConfig { max_offset: 4, sampling_rate: 1, ..DiffConfig::default() }.clamped();

    let offset = imgdiff::find_best_alignment(&base, &changed, &cfg).unwrap();
    assert!(imgdiff::has_differences(&base, &changed, offset, &cfg));

    let regions = imgdiff::detect_diff_regions(&base, &changed, offset, &cfg);
    assert!(!regions.is_empty());

    let region = regions
        .iter()
        .find(|r| r.min_x <= 40 && r.min_y <= 40 && r.max_x >= 70 && r.max_y >= 70)
        .expect("a region must cover the changed square");

    let out = imgdiff::render_diff_image(&base, &changed, offset, &regions, &cfg);
    // The frame around that region is pure red.
    let frame_x = (region.min_x + region.max_x) / 2;
    assert_eq!(
        *out.get_pixel(frame_x as u32, region.min_y as u32),
        Rgba([255, 0, 0, 255])
    );
}

#[test]
fn test_different_sized_images() {
    // B is wider than A; the pipeline must still run and produce a canvas
    // with the maximum dimensions.
    let img_a = black_canvas(60);
    let img_b = RgbaImage::from_pixel(90, 60, Rgba([0, 0, 0, 255]));

    let cfg = DiffConfig { max_offset: 3, sampling_rate: 1, ..DiffConfig::default() }.clamped();

    let offset = imgdiff::find_best_alignment(&img_a, &img_b, &cfg).unwrap();
    let regions = imgdiff::detect_diff_regions(&img_a, &img_b, offset, &cfg);
    let out = imgdiff::render_diff_image(&img_a, &img_b, offset, &regions, &cfg);
    assert_eq!((out.width(), out.height()), (90, 60));
}

#[test]
fn test_progressive_and_exhaustive_agree_on_clear_shift() {
    let mut img_a = black_canvas(100);
    let mut img_b = black_canvas(100);
    paint_square(&mut img_a, 30, 30, 24, [255, 255, 255, 255]);
    paint_square(&mut img_b, 37, 33, 24, [255, 255, 255, 255]);

    let exhaustive_cfg = DiffConfig {
        max_offset: 10,
        sampling_rate: 1,
        fast_mode: false,
        ..DiffConfig::default()
    }
    .clamped();
    let progressive_cfg = DiffConfig { fast_mode: true, ..exhaustive_cfg.clone() };

    let exhaustive = imgdiff::find_best_alignment(&img_a, &img_b, &exhaustive_cfg).unwrap();
    let progressive = imgdiff::find_best_alignment(&img_a, &img_b, &progressive_cfg).unwrap();

    assert_eq!(exhaustive, Offset::new(7, 3));
    assert_eq!(progressive, exhaustive);
}
