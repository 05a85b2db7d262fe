//! The per-pixel color balance kernel.

use glam::Vec3;

use crate::offsets::OffsetState;
use crate::tone;

/// Blend factor between the original and colorized pixel. Fixed at full
/// effect; a named constant so an intensity control can be added later
/// without changing the kernel signature.
pub const BLEND_AMOUNT: f32 = 1.0;

/// Apply the three weighted offsets to one pixel color.
///
/// ```text
/// I         = (r + g + b) / 3
/// colorized = rgb + shadows·wₛ(I) + midtones·wₘ(I) + highlights·wₕ(I)
/// out       = clamp(mix(rgb, colorized, amount), 0, 1)
/// ```
///
/// All-zero offsets pass the pixel through unchanged. The clamp defines
/// the value stored to the 8-bit target instead of leaving saturation to
/// the hardware. Alpha is handled by callers and never modified here.
///
/// This is the CPU reference for the fragment stage in `balance.wgsl`;
/// keep the two in sync.
pub fn balance_pixel(rgb: Vec3, state: &OffsetState) -> Vec3 {
    let i = tone::intensity(rgb);

    let colorized = rgb
        + Vec3::from(state.shadows.to_array()) * tone::shadows_weight(i)
        + Vec3::from(state.midtones.to_array()) * tone::midtones_weight(i)
        + Vec3::from(state.highlights.to_array()) * tone::highlights_weight(i);

    rgb.lerp(colorized, BLEND_AMOUNT).clamp(Vec3::ZERO, Vec3::ONE)
}
