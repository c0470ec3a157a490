// this_file: src/rect.rs
//! Rectangle type and the diff-region merging pass.
//!
//! Regions coming out of the detector overlap, nest and duplicate freely;
//! [`merge_overlapping`] consolidates them so the rendered output shows a
//! small set of clean frames instead of a pile of nested boxes.

use serde::Serialize;

/// Half-open axis-aligned rectangle: `[min_x, max_x) x [min_y, max_y)`.
///
/// The default (all-zero) rectangle is invalid and doubles as the
/// "invalidated" sentinel while merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn is_valid(&self) -> bool {
        self.min_x < self.max_x && self.min_y < self.max_y
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    fn center(&self) -> (i32, i32) {
        ((self.min_x + self.max_x) / 2, (self.min_y + self.max_y) / 2)
    }

    fn diagonal(&self) -> f64 {
        let w = self.width() as f64;
        let h = self.height() as f64;
        (w * w + h * h).sqrt()
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    fn intersection(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Containment with a tolerance margin, so a box that pokes out by a few
    /// pixels still counts as nested.
    fn contains_with_margin(&self, other: &Rect, margin: i32) -> bool {
        self.min_x - margin <= other.min_x
            && self.min_y - margin <= other.min_y
            && self.max_x + margin >= other.max_x
            && self.max_y + margin >= other.max_y
    }
}

fn center_distance(a: &Rect, b: &Rect) -> f64 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let dx = (ax - bx) as f64;
    let dy = (ay - by) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Containment tolerance for nested-frame elimination.
const CONTAINMENT_MARGIN: i32 = 5;
/// Rectangles whose bounds come within this distance on both axes are merge
/// candidates.
const PROXIMITY_THRESHOLD: i32 = 10;
/// A merged rectangle may cover at most this multiple of the inputs' summed
/// area.
const MAX_AREA_INCREASE: f64 = 1.8;
/// Merging dissimilar-sized rectangles (area ratio beyond this) needs a
/// strong overlap to go through.
const MAX_AREA_RATIO: f64 = 10.0;
/// Hard cap on the number of regions kept after merging.
const MAX_REGIONS: usize = 50;

/// True if the rectangles overlap or sit close enough to be treated as one
/// cluster.
fn overlap_or_touch(r1: &Rect, r2: &Rect) -> bool {
    let near_x = !(r1.max_x + PROXIMITY_THRESHOLD <= r2.min_x
        || r2.max_x + PROXIMITY_THRESHOLD <= r1.min_x);
    let near_y = !(r1.max_y + PROXIMITY_THRESHOLD <= r2.min_y
        || r2.max_y + PROXIMITY_THRESHOLD <= r1.min_y);

    if !near_x || !near_y {
        return false;
    }

    let intersection = r1.intersection(r2);
    let intersection_area = intersection.width() as i64 * intersection.height() as i64;

    if intersection_area <= 0 {
        // No true overlap: connect only if the centers are closer than half
        // the mean diagonal.
        let avg_diagonal = (r1.diagonal() + r2.diagonal()) / 2.0;
        return center_distance(r1, r2) < avg_diagonal / 2.0;
    }

    // At least 20% of the smaller rectangle must be covered.
    let smaller_area = r1.area().min(r2.area());
    intersection_area >= smaller_area / 5
}

/// Fraction of the smaller rectangle covered by the intersection (0.0-1.0).
fn overlap_ratio(r1: &Rect, r2: &Rect) -> f64 {
    let intersection = r1.intersection(r2);
    let intersection_area = intersection.width() as i64 * intersection.height() as i64;
    if intersection_area <= 0 {
        return 0.0;
    }

    let smaller_area = r1.area().min(r2.area());
    if smaller_area <= 0 {
        return 0.0;
    }

    intersection_area as f64 / smaller_area as f64
}

fn should_merge(r1: &Rect, r2: &Rect) -> bool {
    if !overlap_or_touch(r1, r2) {
        return false;
    }

    // Very dissimilar sizes merge only when they overlap heavily.
    let area1 = r1.area() as f64;
    let area2 = r2.area() as f64;
    if area1 > area2 * MAX_AREA_RATIO || area2 > area1 * MAX_AREA_RATIO {
        return overlap_ratio(r1, r2) > 0.5;
    }

    true
}

fn is_reasonable_merge(r1: &Rect, r2: &Rect, merged: &Rect) -> bool {
    let before = (r1.area() + r2.area()) as f64;
    merged.area() as f64 <= before * MAX_AREA_INCREASE
}

/// Two rectangles with nearly coincident centers (relative to their size)
/// are duplicates of the same region.
fn are_similar(r1: &Rect, r2: &Rect) -> bool {
    let avg_width = (r1.width() + r2.width()) / 2;
    let avg_height = (r1.height() + r2.height()) / 2;
    center_distance(r1, r2) < (avg_width + avg_height) as f64 * 0.15
}

fn retain_valid(rects: &mut Vec<Rect>) {
    rects.retain(Rect::is_valid);
}

/// Consolidate overlapping, nearby and nested rectangles.
///
/// Runs up to 20 merge passes (sorted small-to-large so small fragments get
/// absorbed first), caps the result at 50 regions by area, then collapses
/// near-duplicate frames in a short finalize pass. Idempotent on its own
/// output.
pub fn merge_overlapping(rects: Vec<Rect>) -> Vec<Rect> {
    if rects.len() <= 1 {
        return rects;
    }

    let mut result = rects;
    let max_iterations = 20;

    for _ in 0..max_iterations {
        result.sort_by_key(Rect::area);
        retain_valid(&mut result);

        let mut changed = false;
        for i in 0..result.len() {
            for j in (i + 1)..result.len() {
                if !result[i].is_valid() || !result[j].is_valid() {
                    continue;
                }

                // Nested frames collapse to the containing one.
                if result[i].contains_with_margin(&result[j], CONTAINMENT_MARGIN) {
                    result[j] = Rect::default();
                    changed = true;
                    continue;
                }
                if result[j].contains_with_margin(&result[i], CONTAINMENT_MARGIN) {
                    result[i] = result[j];
                    result[j] = Rect::default();
                    changed = true;
                    continue;
                }

                if should_merge(&result[i], &result[j]) {
                    let merged = result[i].union(&result[j]);
                    if is_reasonable_merge(&result[i], &result[j], &merged) {
                        result[i] = merged;
                        result[j] = Rect::default();
                        changed = true;
                    }
                }
            }
        }

        retain_valid(&mut result);
        if !changed {
            break;
        }
    }

    // Too many regions clutter the output; keep the largest ones.
    if result.len() > MAX_REGIONS {
        result.sort_by_key(|r| std::cmp::Reverse(r.area()));
        result.truncate(MAX_REGIONS);
    }

    finalize(result)
}

/// Collapse near-duplicate rectangles that survived the merge passes.
fn finalize(mut result: Vec<Rect>) -> Vec<Rect> {
    let max_passes = 3;

    for _ in 0..max_passes {
        let mut changed = false;

        for i in 0..result.len() {
            if !result[i].is_valid() {
                continue;
            }
            for j in 0..result.len() {
                if i == j || !result[i].is_valid() || !result[j].is_valid() {
                    continue;
                }

                if are_similar(&result[i], &result[j]) {
                    if result[i].area() >= result[j].area() {
                        result[j] = Rect::default();
                    } else {
                        result[i] = result[j];
                        result[j] = Rect::default();
                    }
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
        retain_valid(&mut result);
    }

    retain_valid(&mut result);
    result
}
