// this_file: src/color.rs
//! Per-pixel color metrics and the overlay compositor.
//!
//! Two distinct difference metrics exist on purpose. [`channel_delta_max`]
//! gates boolean "is this pixel different" decisions in the region detector
//! and the has-differences check. [`weighted_distance`] is the continuous
//! alpha-weighted Euclidean distance used by the similarity scorer. Their
//! scales differ (0-255 vs roughly 0-460); both are compared against the
//! same configured threshold, which is inherited behavior.

use crate::config::TintColor;
use image::Rgba;

/// Maximum absolute channel difference over R, G, B. Alpha is ignored.
///
/// A pixel pair is "different" iff this exceeds the configured threshold.
pub fn channel_delta_max(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    let dr = a[0].abs_diff(b[0]);
    let dg = a[1].abs_diff(b[1]);
    let db = a[2].abs_diff(b[2]);
    dr.max(dg).max(db) as u32
}

/// Euclidean RGB distance weighted by alpha.
///
/// The RGB distance is scaled by the mean alpha fraction `(a1+a2)/510`, and
/// `0.3 * |a1-a2|` is added so pure transparency changes still register.
/// Two fully transparent pixels compare equal regardless of color. The
/// result ranges over roughly [0, 460].
pub fn weighted_distance(a: Rgba<u8>, b: Rgba<u8>) -> f64 {
    let (a1, a2) = (a[3] as f64, b[3] as f64);

    if a[3] == 0 && b[3] == 0 {
        return 0.0;
    }

    let alpha_factor = (a1 + a2) / (2.0 * 255.0);

    let dr = a[0] as f64 - b[0] as f64;
    let dg = a[1] as f64 - b[1] as f64;
    let db = a[2] as f64 - b[2] as f64;
    let distance = (dr * dr + dg * dg + db * db).sqrt();

    distance * alpha_factor + (a1 - a2).abs() * 0.3
}

/// Blend a source pixel over a destination pixel for the diff overlay.
///
/// With the tint disabled this is plain alpha-style mixing controlled by
/// `transparency` (0.0 = source only, 1.0 = destination only). With the tint
/// enabled the source is first pulled toward the tint color by
/// `tint_strength`, then mixed using the average of `transparency` and
/// `tint_transparency`. All float-to-channel conversions truncate, and the
/// output alpha is the larger of the two input alphas.
pub fn blend(
    dst: Rgba<u8>,
    src: Rgba<u8>,
    transparency: f64,
    tint: TintColor,
    tint_enabled: bool,
    tint_strength: f64,
    tint_transparency: f64,
) -> Rgba<u8> {
    let (r, g, b);

    if tint_enabled {
        // Pull the source toward the tint color first. The intermediate is
        // truncated to 8 bits before the second mix.
        let src_weight = 1.0 - tint_strength;
        let tr = (src[0] as f64 * src_weight + tint.r as f64 * tint_strength) as u8;
        let tg = (src[1] as f64 * src_weight + tint.g as f64 * tint_strength) as u8;
        let tb = (src[2] as f64 * src_weight + tint.b as f64 * tint_strength) as u8;

        let effective = (transparency + tint_transparency) / 2.0;
        r = (tr as f64 * (1.0 - effective) + dst[0] as f64 * effective) as u8;
        g = (tg as f64 * (1.0 - effective) + dst[1] as f64 * effective) as u8;
        b = (tb as f64 * (1.0 - effective) + dst[2] as f64 * effective) as u8;
    } else {
        r = (src[0] as f64 * (1.0 - transparency) + dst[0] as f64 * transparency) as u8;
        g = (src[1] as f64 * (1.0 - transparency) + dst[1] as f64 * transparency) as u8;
        b = (src[2] as f64 * (1.0 - transparency) + dst[2] as f64 * transparency) as u8;
    }

    Rgba([r, g, b, src[3].max(dst[3])])
}
