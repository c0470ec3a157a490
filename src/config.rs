// this_file: src/config.rs
//! Comparison configuration.
//!
//! `DiffConfig` is built once by the caller (normally the CLI), normalized
//! through [`DiffConfig::clamped`], and then passed by shared reference
//! through the whole pipeline. Nothing in the core mutates it; the
//! progressive search threads its per-stage sampling rate as an explicit
//! argument instead.

use serde::Serialize;

/// RGB tint applied to the transparent overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TintColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TintColor {
    pub const RED: TintColor = TintColor { r: 255, g: 0, b: 0 };
}

/// Settings for one image comparison.
#[derive(Debug, Clone, Serialize)]
pub struct DiffConfig {
    /// Maximum pixel offset searched on each axis during alignment.
    pub max_offset: i32,
    /// Color difference threshold (0-255).
    pub threshold: u32,
    /// Number of worker threads for the offset search.
    pub workers: usize,
    /// Pixel sampling stride (1 = every pixel, 2 = every other pixel, ...).
    pub sampling_rate: u32,
    /// Progressive coarse-to-fine search instead of a single full pass.
    pub fast_mode: bool,

    /// Blend the first image into detected diff regions.
    pub overlay_enabled: bool,
    /// Overlay transparency (0.0 = opaque, 1.0 = fully transparent).
    pub overlay_transparency: f64,
    /// Tint color mixed into the overlay.
    pub tint: TintColor,
    /// Whether the tint is applied at all.
    pub tint_enabled: bool,
    /// Tint strength (0.0 = none, 1.0 = tint only).
    pub tint_strength: f64,
    /// Tint transparency (0.0 = opaque, 1.0 = fully transparent).
    pub tint_transparency: f64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_offset: 10,
            threshold: 30,
            workers: 4,
            sampling_rate: 1,
            fast_mode: false,
            overlay_enabled: true,
            overlay_transparency: 0.3,
            tint: TintColor::RED,
            tint_enabled: true,
            tint_strength: 0.7,
            tint_transparency: 0.2,
        }
    }
}

impl DiffConfig {
    /// Return a copy with every numeric field forced into its documented
    /// range. Callers must normalize before handing the config to the core.
    pub fn clamped(mut self) -> Self {
        self.max_offset = self.max_offset.max(0);
        self.threshold = self.threshold.min(255);
        self.workers = self.workers.max(1);
        self.sampling_rate = self.sampling_rate.max(1);
        self.overlay_transparency = self.overlay_transparency.clamp(0.0, 1.0);
        self.tint_strength = self.tint_strength.clamp(0.0, 1.0);
        self.tint_transparency = self.tint_transparency.clamp(0.0, 1.0);
        self
    }
}

/// Parse a `"R,G,B"` tint color string. Malformed components fall back to
/// pure red with a warning, matching the CLI's lenient behavior.
pub fn parse_tint_color(value: &str) -> TintColor {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 3 {
        log::warn!("Invalid tint color format '{}'. Using default (255,0,0).", value);
        return TintColor::RED;
    }

    let channel = |part: &str, name: &str, default: i64| -> u8 {
        match part.trim().parse::<i64>() {
            Ok(v) => v.clamp(0, 255) as u8,
            Err(_) => {
                log::warn!("Invalid {} value in tint color. Using default ({}).", name, default);
                default as u8
            }
        }
    };

    TintColor {
        r: channel(parts[0], "red", 255),
        g: channel(parts[1], "green", 0),
        b: channel(parts[2], "blue", 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = DiffConfig::default();
        assert_eq!(cfg.max_offset, 10);
        assert_eq!(cfg.threshold, 30);
        assert_eq!(cfg.sampling_rate, 1);
        assert!(!cfg.fast_mode);
        assert!(cfg.overlay_enabled);
        assert_eq!(cfg.tint, TintColor::RED);
    }

    #[test]
    fn test_clamped_forces_documented_ranges() {
        let cfg = DiffConfig {
            max_offset: -3,
            threshold: 999,
            workers: 0,
            sampling_rate: 0,
            overlay_transparency: 1.7,
            tint_strength: -0.2,
            tint_transparency: 2.0,
            ..DiffConfig::default()
        }
        .clamped();

        assert_eq!(cfg.max_offset, 0);
        assert_eq!(cfg.threshold, 255);
        assert_eq!(cfg.workers, 1);
        assert_eq!(cfg.sampling_rate, 1);
        assert_eq!(cfg.overlay_transparency, 1.0);
        assert_eq!(cfg.tint_strength, 0.0);
        assert_eq!(cfg.tint_transparency, 1.0);
    }

    #[test]
    fn test_clamped_keeps_valid_values() {
        let cfg = DiffConfig::default().clamped();
        assert_eq!(cfg.threshold, 30);
        assert_eq!(cfg.overlay_transparency, 0.3);
    }

    #[test]
    fn test_parse_tint_color() {
        assert_eq!(parse_tint_color("0,128,255"), TintColor { r: 0, g: 128, b: 255 });
        // Out-of-range components clamp
        assert_eq!(parse_tint_color("300,-5,10"), TintColor { r: 255, g: 0, b: 10 });
    }

    #[test]
    fn test_parse_tint_color_malformed() {
        assert_eq!(parse_tint_color("red"), TintColor::RED);
        assert_eq!(parse_tint_color("1,2"), TintColor::RED);
        assert_eq!(parse_tint_color("a,b,c"), TintColor::RED);
    }
}
