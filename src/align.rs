// this_file: src/align.rs
//! Offset search: find the translation that best aligns two images.
//!
//! Candidate offsets are scored in parallel on a bounded rayon pool whose
//! thread count is a constructor parameter of this call, so concurrent
//! comparisons in one process never interfere with each other. The
//! reduction is a deterministic maximum: best score, ties broken by the
//! smallest Manhattan distance from (0, 0), then lexicographic (dx, dy).

use crate::config::DiffConfig;
use crate::error::{Error, Result};
use crate::logging::Timer;
use crate::similarity::similarity_score;
use image::RgbaImage;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

/// Integer translation hypothesis: pixel `(x, y)` of the second image
/// corresponds to pixel `(x - dx, y - dy)` of the first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    fn manhattan(&self) -> i32 {
        self.dx.abs() + self.dy.abs()
    }
}

#[derive(Debug, Clone, Copy)]
struct Scored {
    offset: Offset,
    score: f64,
}

/// Total order over scored candidates; `reduce` with this is associative
/// and commutative, so the search result does not depend on worker timing.
fn better(a: Scored, b: Scored) -> Scored {
    if a.score != b.score {
        return if a.score > b.score { a } else { b };
    }
    if a.offset.manhattan() != b.offset.manhattan() {
        return if a.offset.manhattan() < b.offset.manhattan() { a } else { b };
    }
    if (a.offset.dx, a.offset.dy) <= (b.offset.dx, b.offset.dy) {
        a
    } else {
        b
    }
}

/// Exhaustively score every offset in the window and return the winner.
fn search_window(
    img_a: &RgbaImage,
    img_b: &RgbaImage,
    center: Offset,
    radius: i32,
    sampling_rate: u32,
    cfg: &DiffConfig,
) -> Result<Scored> {
    let mut candidates = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
    for dy in (center.dy - radius)..=(center.dy + radius) {
        for dx in (center.dx - radius)..=(center.dx + radius) {
            candidates.push(Offset::new(dx, dy));
        }
    }

    debug!(
        "Searching {} offsets in X:[{},{}], Y:[{},{}] at sampling rate 1/{}",
        candidates.len(),
        center.dx - radius,
        center.dx + radius,
        center.dy - radius,
        center.dy + radius,
        sampling_rate
    );

    let workers = cfg.workers.min(candidates.len()).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| Error::InvalidParameter(format!("failed to build worker pool: {}", e)))?;

    let threshold = cfg.threshold;
    let best = pool.install(|| {
        candidates
            .par_iter()
            .map(|&offset| Scored {
                offset,
                score: similarity_score(img_a, img_b, offset.dx, offset.dy, sampling_rate, threshold),
            })
            .reduce(
                || Scored { offset: Offset::default(), score: f64::NEG_INFINITY },
                better,
            )
    });

    Ok(best)
}

/// Find the offset that maximizes the similarity between the two images.
///
/// With `fast_mode` off this is a single exhaustive scan of the full
/// `(2*max_offset+1)^2` window at the configured sampling rate. With
/// `fast_mode` on, a coarse-to-fine sequence of sampling stages narrows the
/// window around each stage's winner; each stage's sampling rate is passed
/// down explicitly rather than written into the shared configuration.
///
/// Zero-area input images are a caller contract violation and are reported
/// as [`Error::InvalidParameter`].
pub fn find_best_alignment(
    img_a: &RgbaImage,
    img_b: &RgbaImage,
    cfg: &DiffConfig,
) -> Result<Offset> {
    if img_a.width() == 0 || img_a.height() == 0 || img_b.width() == 0 || img_b.height() == 0 {
        return Err(Error::InvalidParameter(
            "alignment search requires non-empty images".to_string(),
        ));
    }

    let timer = Timer::new("alignment search");
    info!(
        "Searching for best alignment (max offset: {}, {} worker threads)",
        cfg.max_offset, cfg.workers
    );

    let best = if cfg.fast_mode {
        info!("Fast mode enabled: using progressive sampling");
        progressive_search(img_a, img_b, cfg)?
    } else {
        let total = (2 * cfg.max_offset + 1) * (2 * cfg.max_offset + 1);
        info!("Scoring all {} candidate offsets", total);
        search_window(img_a, img_b, Offset::default(), cfg.max_offset, cfg.sampling_rate, cfg)?
    };

    info!(
        "Best alignment found: offset=({}, {}) with score={:.4} ({:.2}s elapsed)",
        best.offset.dx,
        best.offset.dy,
        best.score,
        timer.elapsed_secs()
    );

    Ok(best.offset)
}

/// Coarse-to-fine search: sampling stages 1/8, 1/4, 1/2, then the
/// configured final rate, with the window shrinking around each stage's
/// winner.
fn progressive_search(img_a: &RgbaImage, img_b: &RgbaImage, cfg: &DiffConfig) -> Result<Scored> {
    let final_rate = cfg.sampling_rate.max(1);
    let stages: [u32; 4] = [8, 4, 2, final_rate];

    let mut best = Scored { offset: Offset::default(), score: 0.0 };

    for (stage, &stage_rate) in stages.iter().enumerate() {
        let radius = if stage == 0 {
            cfg.max_offset
        } else {
            2.max(cfg.max_offset / (2 * stage as i32))
        };

        info!(
            "Progressive stage {}/{}: sampling rate=1/{}, search radius={}",
            stage + 1,
            stages.len(),
            stage_rate,
            radius
        );

        best = search_window(img_a, img_b, best.offset, radius, stage_rate, cfg)?;

        debug!(
            "Stage {} winner: offset=({}, {}), score={:.4}",
            stage + 1,
            best.offset.dx,
            best.offset.dy,
            best.score
        );
    }

    Ok(best)
}
