//! Triad GPU — wgpu render pipeline for the color balance pass.
//!
//! This crate owns all GPU resources. No framework dependency — it
//! exposes a plain wgpu API that the session layer drives directly.

pub mod context;
pub mod pipeline;
pub mod readback;

pub use context::{GpuContext, PipelineError};
pub use pipeline::BalancePipeline;
