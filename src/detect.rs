// this_file: src/detect.rs
//! Difference detection at a fixed alignment.
//!
//! Builds a boolean diff mask over image B, groups marked cells into
//! bounding rectangles, and hands the result to the rectangle merger. The
//! grouping pass deliberately absorbs only a fixed +/-10-cell neighborhood
//! around each seed instead of flood-filling the whole component; clusters
//! farther apart than that are joined later by the merger when close
//! enough. This mirrors the legacy region shapes exactly.

use crate::align::Offset;
use crate::color::channel_delta_max;
use crate::config::DiffConfig;
use crate::logging::Timer;
use crate::rect::{merge_overlapping, Rect};
use image::RgbaImage;
use log::{debug, info};

/// Neighborhood radius absorbed around each diff seed cell.
const GROUP_RADIUS: i32 = 10;
/// Padding added around each grouped bounding box.
const REGION_PADDING: i32 = 5;
/// Minimum width/height of a reported region.
const MIN_REGION_SIZE: i32 = 20;

/// Boolean grid with image-B dimensions; true marks differing pixels.
struct DiffMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl DiffMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
            cells: vec![false; width as usize * height as usize],
        }
    }

    fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    /// Mark the whole sampling block whose origin is `(x, y)`, clipped to
    /// the mask bounds.
    fn mark_block(&mut self, x: usize, y: usize, block: usize) {
        for sy in y..(y + block).min(self.height) {
            for sx in x..(x + block).min(self.width) {
                self.cells[sy * self.width + sx] = true;
            }
        }
    }
}

/// Detect the regions where the two images still differ at the given
/// alignment. Returns merged rectangles in image-B coordinates.
pub fn detect_diff_regions(
    img_a: &RgbaImage,
    img_b: &RgbaImage,
    offset: Offset,
    cfg: &DiffConfig,
) -> Vec<Rect> {
    let _timer = Timer::new("diff region detection");
    let (width_a, height_a) = (img_a.width() as i32, img_a.height() as i32);
    let (width_b, height_b) = (img_b.width(), img_b.height());

    info!("Creating diff mask for dimensions {}x{}", width_b, height_b);

    let mut mask = DiffMask::new(width_b, height_b);
    let stride = cfg.sampling_rate.max(1) as usize;

    let mut y = 0usize;
    while y < mask.height {
        let mut x = 0usize;
        while x < mask.width {
            let x_a = x as i32 - offset.dx;
            let y_a = y as i32 - offset.dy;

            if x_a < 0 || x_a >= width_a || y_a < 0 || y_a >= height_a {
                // Area of B with no counterpart in A always counts as
                // different.
                mask.mark_block(x, y, stride);
            } else {
                let pixel_a = *img_a.get_pixel(x_a as u32, y_a as u32);
                let pixel_b = *img_b.get_pixel(x as u32, y as u32);
                if channel_delta_max(pixel_a, pixel_b) > cfg.threshold {
                    mask.mark_block(x, y, stride);
                }
            }

            x += stride;
        }
        y += stride;
    }

    let raw = group_regions(&mask);
    debug!("Grouped diff mask into {} raw regions", raw.len());

    let sized = enforce_min_size(raw, width_b as i32, height_b as i32);
    let merged = merge_overlapping(sized);
    info!("Found {} diff regions", merged.len());
    merged
}

/// Group marked cells into bounding rectangles by scanning in raster order
/// and absorbing the fixed neighborhood around each unvisited seed.
fn group_regions(mask: &DiffMask) -> Vec<Rect> {
    let mut regions = Vec::new();
    let mut visited = vec![false; mask.cells.len()];

    for y in 0..mask.height {
        for x in 0..mask.width {
            if !mask.get(x, y) || visited[y * mask.width + x] {
                continue;
            }

            let (mut min_x, mut min_y) = (x as i32, y as i32);
            let (mut max_x, mut max_y) = (x as i32, y as i32);

            for dy in -GROUP_RADIUS..=GROUP_RADIUS {
                for dx in -GROUP_RADIUS..=GROUP_RADIUS {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || nx >= mask.width as i32 || ny < 0 || ny >= mask.height as i32 {
                        continue;
                    }
                    if mask.get(nx as usize, ny as usize) {
                        visited[ny as usize * mask.width + nx as usize] = true;
                        min_x = min_x.min(nx);
                        min_y = min_y.min(ny);
                        max_x = max_x.max(nx);
                        max_y = max_y.max(ny);
                    }
                }
            }

            min_x = (min_x - REGION_PADDING).max(0);
            min_y = (min_y - REGION_PADDING).max(0);
            max_x = (max_x + REGION_PADDING).min(mask.width as i32 - 1);
            max_y = (max_y + REGION_PADDING).min(mask.height as i32 - 1);

            regions.push(Rect::new(min_x, min_y, max_x + 1, max_y + 1));
        }
    }

    regions
}

/// Grow undersized rectangles around their center to the minimum reported
/// size, clipped to the image bounds.
fn enforce_min_size(regions: Vec<Rect>, width: i32, height: i32) -> Vec<Rect> {
    regions
        .into_iter()
        .map(|rect| {
            if rect.width() >= MIN_REGION_SIZE && rect.height() >= MIN_REGION_SIZE {
                return rect;
            }

            let center_x = (rect.min_x + rect.max_x) / 2;
            let center_y = (rect.min_y + rect.max_y) / 2;
            let new_width = rect.width().max(MIN_REGION_SIZE);
            let new_height = rect.height().max(MIN_REGION_SIZE);

            Rect::new(
                (center_x - new_width / 2).max(0),
                (center_y - new_height / 2).max(0),
                (center_x + new_width / 2).min(width),
                (center_y + new_height / 2).min(height),
            )
        })
        .collect()
}

/// Quick boolean check: do the images differ anywhere at this alignment?
///
/// Re-scans the overlap with the max-channel threshold metric and stops at
/// the first difference. Pixels of B with no counterpart in A are skipped;
/// this answers "do the compared pixels differ", not "is B larger".
pub fn has_differences(
    img_a: &RgbaImage,
    img_b: &RgbaImage,
    offset: Offset,
    cfg: &DiffConfig,
) -> bool {
    let (width_a, height_a) = (img_a.width() as i32, img_a.height() as i32);
    let (width_b, height_b) = (img_b.width() as i32, img_b.height() as i32);

    // Overlap in A coordinates; B's pixel for A's (x, y) is (x + dx, y + dy).
    let min_x = 0.max(-offset.dx);
    let min_y = 0.max(-offset.dy);
    let max_x = width_a.min(width_b - offset.dx);
    let max_y = height_a.min(height_b - offset.dy);

    let stride = cfg.sampling_rate.max(1) as i32;

    let mut y = min_y;
    while y < max_y {
        let mut x = min_x;
        while x < max_x {
            let x_b = x + offset.dx;
            let y_b = y + offset.dy;

            if x_b >= 0 && x_b < width_b && y_b >= 0 && y_b < height_b {
                let pixel_a = *img_a.get_pixel(x as u32, y as u32);
                let pixel_b = *img_b.get_pixel(x_b as u32, y_b as u32);
                if channel_delta_max(pixel_a, pixel_b) > cfg.threshold {
                    return true;
                }
            }

            x += stride;
        }
        y += stride;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    fn cfg() -> DiffConfig {
        DiffConfig { sampling_rate: 1, threshold: 30, ..DiffConfig::default() }.clamped()
    }

    #[test]
    fn test_identical_images_produce_no_regions() {
        let img = solid(50, 50, [128, 128, 128, 255]);
        let regions = detect_diff_regions(&img, &img, Offset::default(), &cfg());
        assert!(regions.is_empty());
    }

    #[test]
    fn test_inserted_square_is_detected() {
        let base = solid(50, 50, [128, 128, 128, 255]);
        let mut changed = base.clone();
        for y in 15..35 {
            for x in 15..35 {
                changed.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }

        let regions = detect_diff_regions(&base, &changed, Offset::default(), &cfg());
        assert!(!regions.is_empty());

        // Some region must cover the inserted square (padding allowed).
        let covering = regions
            .iter()
            .find(|r| r.min_x <= 15 && r.min_y <= 15 && r.max_x >= 35 && r.max_y >= 35);
        assert!(covering.is_some(), "no region covers the square: {:?}", regions);
    }

    #[test]
    fn test_aligned_shift_produces_only_edge_regions() {
        // B is A shifted by (6, 0); at the correct offset the interior
        // matches and only the unmapped left strip of B can differ.
        let mut img_a = solid(60, 60, [0, 0, 0, 255]);
        let mut img_b = solid(60, 60, [0, 0, 0, 255]);
        for y in 20..40 {
            for x in 20..40 {
                img_a.put_pixel(x, y, Rgba([255, 255, 255, 255]));
                img_b.put_pixel(x + 6, y, Rgba([255, 255, 255, 255]));
            }
        }

        let regions = detect_diff_regions(&img_a, &img_b, Offset::new(6, 0), &cfg());
        // The unmapped strip is x < 6 in B; every region must hug that edge.
        for region in &regions {
            assert!(region.min_x <= 6, "unexpected region away from the seam: {:?}", region);
        }
    }

    #[test]
    fn test_min_region_size_enforced() {
        let base = solid(100, 100, [0, 0, 0, 255]);
        let mut changed = base.clone();
        // Single differing pixel in the middle
        changed.put_pixel(50, 50, Rgba([255, 255, 255, 255]));

        let regions = detect_diff_regions(&base, &changed, Offset::default(), &cfg());
        assert_eq!(regions.len(), 1);
        assert!(regions[0].width() >= 20);
        assert!(regions[0].height() >= 20);
    }

    #[test]
    fn test_unmapped_area_marked_different() {
        // Identical content but a positive offset leaves a strip of B with
        // no counterpart in A.
        let img = solid(40, 40, [10, 10, 10, 255]);
        let regions = detect_diff_regions(&img, &img, Offset::new(12, 0), &cfg());
        assert!(!regions.is_empty());
        assert!(regions.iter().any(|r| r.min_x == 0));
    }

    #[test]
    fn test_has_differences() {
        let base = solid(30, 30, [100, 100, 100, 255]);
        assert!(!has_differences(&base, &base, Offset::default(), &cfg()));

        let mut changed = base.clone();
        changed.put_pixel(10, 10, Rgba([200, 100, 100, 255]));
        assert!(has_differences(&base, &changed, Offset::default(), &cfg()));

        // Below-threshold drift is not a difference
        let near = solid(30, 30, [110, 100, 100, 255]);
        assert!(!has_differences(&base, &near, Offset::default(), &cfg()));
    }

    #[test]
    fn test_has_differences_respects_offset() {
        let mut img_a = solid(40, 40, [0, 0, 0, 255]);
        let mut img_b = solid(40, 40, [0, 0, 0, 255]);
        for y in 10..30 {
            for x in 10..30 {
                img_a.put_pixel(x, y, Rgba([255, 255, 255, 255]));
                img_b.put_pixel(x + 4, y + 4, Rgba([255, 255, 255, 255]));
            }
        }
        assert!(has_differences(&img_a, &img_b, Offset::default(), &cfg()));
        assert!(!has_differences(&img_a, &img_b, Offset::new(4, 4), &cfg()));
    }
}
