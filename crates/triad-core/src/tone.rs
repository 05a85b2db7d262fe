//! Tonal-range weights derived from pixel intensity.
//!
//! Each weight expresses how strongly a pixel belongs to one of the three
//! luminance bands. Cubing sharpens the falloff so a band's influence
//! concentrates near its nominal intensity region while still overlapping
//! smoothly with its neighbors; there are no hard thresholds to band against.
//!
//! The weights are coverages, not a partition — they do not sum to 1.

use glam::Vec3;

/// Scalar intensity of a pixel, `(r + g + b) / 3`. Inputs in `[0, 1]`.
pub fn intensity(rgb: Vec3) -> f32 {
    (rgb.x + rgb.y + rgb.z) / 3.0
}

/// Shadow band coverage.
///
/// ```text
/// w = (1 − I)³
/// ```
///
/// 1.0 at pure black, 0.0 at pure white.
pub fn shadows_weight(i: f32) -> f32 {
    let w = 1.0 - i;
    w * w * w
}

/// Midtone band coverage.
///
/// ```text
/// w = (1 − |2I − 1|)³
/// ```
///
/// 1.0 at I = 0.5, 0.0 at both extremes.
pub fn midtones_weight(i: f32) -> f32 {
    let w = 1.0 - (2.0 * i - 1.0).abs();
    w * w * w
}

/// Highlight band coverage.
///
/// ```text
/// w = I³
/// ```
///
/// 0.0 at pure black, 1.0 at pure white.
pub fn highlights_weight(i: f32) -> f32 {
    i * i * i
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_shadows_weight_boundaries() {
        assert!((shadows_weight(0.0) - 1.0).abs() < EPSILON);
        assert!(shadows_weight(1.0).abs() < EPSILON);
    }

    #[test]
    fn test_highlights_weight_boundaries() {
        assert!(highlights_weight(0.0).abs() < EPSILON);
        assert!((highlights_weight(1.0) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_midtones_weight_peaks_at_half() {
        assert!((midtones_weight(0.5) - 1.0).abs() < EPSILON);
        assert!(midtones_weight(0.0).abs() < EPSILON);
        assert!(midtones_weight(1.0).abs() < EPSILON);
    }

    #[test]
    fn test_weights_are_nonnegative_and_bounded() {
        for step in 0..=100 {
            let i = step as f32 / 100.0;
            for w in [shadows_weight(i), midtones_weight(i), highlights_weight(i)] {
                assert!((0.0..=1.0).contains(&w), "weight {w} out of range at I={i}");
            }
            assert!(
                shadows_weight(i) + highlights_weight(i) <= 2.0,
                "shadow+highlight coverage exceeds 2 at I={i}"
            );
        }
    }

    #[test]
    fn test_intensity_is_channel_mean() {
        assert!((intensity(Vec3::new(1.0, 1.0, 1.0)) - 1.0).abs() < EPSILON);
        assert!(intensity(Vec3::ZERO).abs() < EPSILON);
        assert!((intensity(Vec3::new(0.3, 0.6, 0.9)) - 0.6).abs() < EPSILON);
    }
}
