//! The grading session: the single place state changes.
//!
//! The control surface (CLI today, any widget layer tomorrow) calls one
//! method per user event. Every mutation triggers exactly one blocking
//! render on the calling thread before control returns, so `rendered`
//! always reflects the current grade — no queues, no locks, no stale
//! preview.

use std::path::{Path, PathBuf};
use std::time::Instant;

use triad_core::image::BalanceImage;
use triad_core::offsets::{Channel, OffsetError, OffsetState, TonalRange};
use triad_gpu::BalancePipeline;

use crate::export::{self, ExportError};
use crate::image_loader::{self, ImageLoadError};

/// Errors surfaced by the session control surface.
///
/// Everything here is recoverable: the session keeps its previous image,
/// grade, and rendered frame.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Offset(#[from] OffsetError),
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("no image loaded")]
    NoImage,
}

/// Owns the grade state, the balance pipeline, and the current image.
pub struct GradingSession {
    pipeline: BalancePipeline,
    state: OffsetState,
    source: Option<BalanceImage>,
    rendered: Option<BalanceImage>,
}

impl GradingSession {
    pub fn new(pipeline: BalancePipeline) -> Self {
        Self {
            pipeline,
            state: OffsetState::default(),
            source: None,
            rendered: None,
        }
    }

    /// The current grade (for presenting sliders or saving a preset).
    pub fn grade(&self) -> &OffsetState {
        &self.state
    }

    /// Select the tonal range subsequent channel edits apply to.
    pub fn set_active_range(&mut self, range: TonalRange) {
        self.state.active = range;
    }

    /// Edit one channel of the active range, then re-render.
    pub fn set_channel(&mut self, channel: Channel, raw: i32) -> Result<(), SessionError> {
        self.state.set_active_channel(channel, raw)?;
        self.rerender();
        Ok(())
    }

    /// Replace the whole grade (preset load), then re-render.
    pub fn set_grade(&mut self, state: OffsetState) {
        self.state = state;
        self.rerender();
    }

    /// Load a new source image, replacing the old buffer wholesale.
    ///
    /// On decode failure the previous image, grade, and rendered frame
    /// remain valid.
    pub fn load_image(&mut self, path: &Path) -> Result<(), SessionError> {
        let image = image_loader::load_image(path)?;
        tracing::info!(
            "loaded {} ({}x{})",
            path.display(),
            image.width,
            image.height
        );
        self.source = Some(image);
        self.rerender();
        Ok(())
    }

    /// The last completed frame, if an image has been rendered.
    pub fn rendered(&self) -> Option<&BalanceImage> {
        self.rendered.as_ref()
    }

    /// Render the current grade and encode the frame as PNG bytes.
    ///
    /// Always renders first, so the export reflects the current grade
    /// even if a presentation layer were showing something stale.
    pub fn export_bytes(&mut self) -> Result<Vec<u8>, SessionError> {
        let source = self.source.as_ref().ok_or(SessionError::NoImage)?;
        let frame = self.pipeline.render(source, &self.state);
        let bytes = export::encode_png(&frame)?;
        self.rendered = Some(frame);
        Ok(bytes)
    }

    /// Export into `dir` as `{width}x{height}.png`; returns the path.
    pub fn export_png(&mut self, dir: &Path) -> Result<PathBuf, SessionError> {
        let bytes = self.export_bytes()?;
        let frame = self.rendered.as_ref().ok_or(SessionError::NoImage)?;
        let path = dir.join(export::export_filename(frame.width, frame.height));
        std::fs::write(&path, bytes).map_err(ExportError::Io)?;
        tracing::info!("exported {}", path.display());
        Ok(path)
    }

    fn rerender(&mut self) {
        let Some(ref source) = self.source else {
            return;
        };
        let start = Instant::now();
        let frame = self.pipeline.render(source, &self.state);
        tracing::debug!(
            "session render: {:.2}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        self.rendered = Some(frame);
    }
}
