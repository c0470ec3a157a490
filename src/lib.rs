// this_file: src/lib.rs
//! imgdiff - image difference detection and visualization
//!
//! This library provides functionality for:
//! - Finding the integer pixel offset that best aligns two images
//! - Scoring alignment candidates with an alpha-weighted color metric
//! - Detecting and merging the regions that still differ after alignment
//! - Rendering a composite image with red frames and a tinted overlay

pub mod align;
pub mod color;
pub mod config;
pub mod detect;
pub mod error;
pub mod imageio;
pub mod logging;
pub mod rect;
pub mod render;
pub mod similarity;

// Re-export the image crate; the public API speaks its pixel types
pub use image;

// Re-export commonly used types
pub use align::{find_best_alignment, Offset};
pub use config::{parse_tint_color, DiffConfig, TintColor};
pub use detect::{detect_diff_regions, has_differences};
pub use error::{Error, Result};
pub use rect::Rect;
pub use render::render_diff_image;
pub use similarity::similarity_score;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
