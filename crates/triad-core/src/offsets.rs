//! Offset control state: tonal ranges, per-range RGB offsets, and the
//! raw-control remap.
//!
//! [`OffsetState`] is the single source of truth for the grade. The
//! control surface writes here; the render pipeline reads the full
//! struct. It is owned by the session and passed by reference into every
//! render call — never a process-wide global.

use serde::{Deserialize, Serialize};

/// Upper bound of the raw control domain.
pub const CONTROL_MAX: i32 = 255;

/// One of the three luminance bands a color adjustment is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TonalRange {
    Shadows,
    Midtones,
    Highlights,
}

impl TonalRange {
    /// Human-readable label for status text.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Shadows => "shadows",
            Self::Midtones => "midtones",
            Self::Highlights => "highlights",
        }
    }

    /// The three ranges in display order.
    pub fn all() -> &'static [Self] {
        const ALL: [TonalRange; 3] = [
            TonalRange::Shadows,
            TonalRange::Midtones,
            TonalRange::Highlights,
        ];
        &ALL
    }
}

/// One slider of the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
}

impl Channel {
    /// The three channels in slider order.
    pub fn all() -> &'static [Self] {
        const ALL: [Channel; 3] = [Channel::R, Channel::G, Channel::B];
        &ALL
    }
}

/// Additive per-channel color push for one tonal range.
///
/// Components are in the remapped `[-1, 1]` domain, never raw control
/// values. Default is all-zero (no adjustment).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RgbOffset {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbOffset {
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    fn component_mut(&mut self, channel: Channel) -> &mut f32 {
        match channel {
            Channel::R => &mut self.r,
            Channel::G => &mut self.g,
            Channel::B => &mut self.b,
        }
    }
}

/// Errors from the offset control surface.
#[derive(Debug, thiserror::Error)]
pub enum OffsetError {
    #[error("control value {value} outside [0, {CONTROL_MAX}]")]
    InvalidOffsetInput { value: i32 },
}

/// Remap a raw control value in `[0, 255]` to the signed kernel domain.
///
/// ```text
/// v = 0   → 0.0   (no change)
/// v = 255 → 1.0   (full positive push)
/// ```
///
/// Values outside `[0, 255]` are a caller error. The `v <= 0` arm only
/// ever sees v = 0 given the validated domain; it is kept because the
/// control mapping defines it for the whole signed line.
pub fn offset_from_control(raw: i32) -> Result<f32, OffsetError> {
    if !(0..=CONTROL_MAX).contains(&raw) {
        return Err(OffsetError::InvalidOffsetInput { value: raw });
    }
    let v = raw as f32;
    let f = if v <= 0.0 {
        (255.0 + v) / 255.0 - 1.0
    } else {
        1.0 + (v - 255.0) / 255.0
    };
    Ok(f)
}

/// Display form of a raw control value as a percentage of full scale.
pub fn control_to_percent(raw: i32) -> f32 {
    raw as f32 / 255.0 * 100.0
}

/// The full grade: one offset per tonal range plus the range currently
/// being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetState {
    pub shadows: RgbOffset,
    pub midtones: RgbOffset,
    pub highlights: RgbOffset,
    /// The range the control surface is currently editing.
    pub active: TonalRange,
}

impl Default for OffsetState {
    /// All-zero offsets (identity grade) with midtones selected, matching
    /// a freshly opened session.
    fn default() -> Self {
        Self {
            shadows: RgbOffset::default(),
            midtones: RgbOffset::default(),
            highlights: RgbOffset::default(),
            active: TonalRange::Midtones,
        }
    }
}

impl OffsetState {
    /// The offset stored for `range`.
    pub fn offset(&self, range: TonalRange) -> RgbOffset {
        match range {
            TonalRange::Shadows => self.shadows,
            TonalRange::Midtones => self.midtones,
            TonalRange::Highlights => self.highlights,
        }
    }

    pub fn offset_mut(&mut self, range: TonalRange) -> &mut RgbOffset {
        match range {
            TonalRange::Shadows => &mut self.shadows,
            TonalRange::Midtones => &mut self.midtones,
            TonalRange::Highlights => &mut self.highlights,
        }
    }

    /// Validate, remap, and write one channel of the given range.
    pub fn set_channel(
        &mut self,
        range: TonalRange,
        channel: Channel,
        raw: i32,
    ) -> Result<(), OffsetError> {
        let value = offset_from_control(raw)?;
        *self.offset_mut(range).component_mut(channel) = value;
        Ok(())
    }

    /// Validate, remap, and write one channel of the active range.
    pub fn set_active_channel(&mut self, channel: Channel, raw: i32) -> Result<(), OffsetError> {
        self.set_channel(self.active, channel, raw)
    }

    /// Restore the identity grade, keeping the active selection.
    pub fn reset(&mut self) {
        self.shadows = RgbOffset::default();
        self.midtones = RgbOffset::default();
        self.highlights = RgbOffset::default();
    }

    /// True when no adjustment is stored for any range.
    pub fn is_identity(&self) -> bool {
        self.shadows == RgbOffset::default()
            && self.midtones == RgbOffset::default()
            && self.highlights == RgbOffset::default()
    }
}
