//! Triad Core — domain layer for tonal color balance.
//!
//! This crate contains the tonal-weight math, the per-pixel balance
//! kernel, and the offset control state. No GPU or framework dependencies.

pub mod balance;
pub mod image;
pub mod offsets;
pub mod tone;

// Re-exports for convenience.
pub use balance::{BLEND_AMOUNT, balance_pixel};
pub use image::BalanceImage;
pub use offsets::{
    Channel, OffsetError, OffsetState, RgbOffset, TonalRange, control_to_percent,
    offset_from_control,
};
