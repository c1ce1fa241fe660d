use crate::text_metrics::MeasureError;

/// Failures that abort a whole placement pass. Per-word exhaustion is not
/// an error; it shows up in [`super::LayoutStats::dropped`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("text measurement failed: {0}")]
    Measurement(#[from] MeasureError),
    #[error("layout pass cancelled after placing {placed} words")]
    Cancelled { placed: usize },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
