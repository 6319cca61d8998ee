//! Renderer configuration.

use crate::buffer::DiffStrategy;

/// Incremental rendering switch.
///
/// Accepts either form the reconciliation layer hands over: a plain
/// on/off flag or a strategy (which implies on).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncrementalConfig {
    /// Diff against the previous frame instead of redrawing every pass.
    pub enabled: bool,
    /// Row rewrite strategy when enabled.
    pub strategy: DiffStrategy,
}

impl From<bool> for IncrementalConfig {
    fn from(enabled: bool) -> Self {
        Self { enabled, strategy: DiffStrategy::Line }
    }
}

impl From<DiffStrategy> for IncrementalConfig {
    fn from(strategy: DiffStrategy) -> Self {
        Self { enabled: true, strategy }
    }
}

/// Configuration for a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Incremental diffing.
    pub incremental: IncrementalConfig,
    /// Terminal height. When the rows a pass has to reach no longer fit,
    /// the screen is cleared and the whole frame redrawn.
    pub viewport_rows: Option<u16>,
    /// Keep the cursor hidden from mount to unmount instead of hiding it
    /// around each pass.
    pub hide_cursor: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            incremental: IncrementalConfig::default(),
            viewport_rows: None,
            hide_cursor: true,
        }
    }
}

impl RendererConfig {
    /// Set the incremental mode (builder pattern).
    #[must_use]
    pub fn with_incremental(mut self, incremental: impl Into<IncrementalConfig>) -> Self {
        self.incremental = incremental.into();
        self
    }

    /// Set the viewport height (builder pattern).
    #[must_use]
    pub const fn with_viewport_rows(mut self, rows: u16) -> Self {
        self.viewport_rows = Some(rows);
        self
    }

    /// Set the cursor policy (builder pattern).
    #[must_use]
    pub const fn with_hide_cursor(mut self, hide: bool) -> Self {
        self.hide_cursor = hide;
        self
    }
}
