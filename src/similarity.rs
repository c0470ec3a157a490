// this_file: src/similarity.rs
//! Similarity scoring for a single alignment candidate.

use crate::color::weighted_distance;
use image::RgbaImage;

/// Score how well image B matches image A for the translation hypothesis
/// `(dx, dy)`.
///
/// Pixel `(x, y)` of B is compared against pixel `(x - dx, y - dy)` of A,
/// the same mapping the region detector and renderer use.
/// The overlapping area is walked with the given sampling stride; a sampled
/// point matches when its [`weighted_distance`] stays strictly below
/// `threshold`. The result is the match ratio in [0.0, 1.0], scaled down
/// when the overlap covers less than half of the larger image. Degenerate
/// geometry (no overlap, nothing sampled) scores 0.0.
///
/// Pure function: the sampling rate is an explicit argument so progressive
/// search stages can vary it without touching shared configuration.
pub fn similarity_score(
    img_a: &RgbaImage,
    img_b: &RgbaImage,
    dx: i32,
    dy: i32,
    sampling_rate: u32,
    threshold: u32,
) -> f64 {
    let (width_a, height_a) = (img_a.width() as i32, img_a.height() as i32);
    let (width_b, height_b) = (img_b.width() as i32, img_b.height() as i32);

    // Overlap of A and B once B is shifted into A's coordinate space; B's
    // pixel (x, y) lands at (x - dx, y - dy) in A.
    let overlap_min_x = 0.max(-dx);
    let overlap_min_y = 0.max(-dy);
    let overlap_width = width_a.min(width_b - dx) - overlap_min_x;
    let overlap_height = height_a.min(height_b - dy) - overlap_min_y;

    if overlap_width <= 0 || overlap_height <= 0 {
        return 0.0;
    }

    let stride = sampling_rate.max(1) as i32;
    let mut sampled_points = 0u64;
    let mut matching_points = 0u64;

    let mut y = 0;
    while y < overlap_height {
        let mut x = 0;
        while x < overlap_width {
            let x_a = x + overlap_min_x;
            let y_a = y + overlap_min_y;
            let x_b = x_a + dx;
            let y_b = y_a + dy;

            if x_a < 0 || x_a >= width_a || y_a < 0 || y_a >= height_a
                || x_b < 0 || x_b >= width_b || y_b < 0 || y_b >= height_b
            {
                x += stride;
                continue;
            }

            let pixel_a = *img_a.get_pixel(x_a as u32, y_a as u32);
            let pixel_b = *img_b.get_pixel(x_b as u32, y_b as u32);

            sampled_points += 1;
            if weighted_distance(pixel_a, pixel_b) < threshold as f64 {
                matching_points += 1;
            }

            x += stride;
        }
        y += stride;
    }

    if sampled_points == 0 {
        return 0.0;
    }

    let base_score = matching_points as f64 / sampled_points as f64;

    // Penalize tiny overlaps so a sliver of accidental agreement cannot
    // outrank a broad alignment. The penalty fades out at 50% coverage.
    let overlap_area = (overlap_width as i64) * (overlap_height as i64);
    let total_area = (width_a as i64 * height_a as i64).max(width_b as i64 * height_b as i64);
    let coverage_ratio = overlap_area as f64 / total_area as f64;

    if coverage_ratio < 0.5 {
        base_score * coverage_ratio * 2.0
    } else {
        base_score
    }
}
