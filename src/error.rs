use thiserror::Error;

/// Run-level failures. A failed run never yields a partial catalog.
///
/// Per-record problems (unusable names, degenerate geometry, features outside every
/// region) are not errors; they are tallied in [`crate::Diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Locale selector outside the supported set; rejected before any run starts.
    #[error("unsupported locale '{0}' (expected one of: fr, de)")]
    UnsupportedLocale(String),

    /// The feature batch contained no features at all.
    #[error("feature batch is empty")]
    EmptyBatch,

    /// Another run is already active on this session.
    #[error("a pipeline run is already in progress")]
    RunInProgress,

    /// The run was cancelled between stages.
    #[error("pipeline run cancelled before stage '{0}'")]
    Cancelled(&'static str),

    /// The background worker terminated abnormally.
    #[error("pipeline worker terminated abnormally")]
    WorkerPanicked,
}
