use thiserror::Error;

/// Errors surfaced across the engine boundary.
///
/// Malformed *input* (unrecognizable syllabus text, extreme thresholds) never
/// reaches this enum; it normalizes to valid degenerate outputs instead. Only
/// configuration and provider failures are raised to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Program outcome catalogue missing or malformed; fatal at startup.
    #[error("catalogue configuration error: {0}")]
    Configuration(String),
    /// Similarity provider unavailable or returned an invalid score; fatal
    /// for the invocation, no partial matrix is produced.
    #[error("similarity provider error: {0}")]
    Provider(String),
}
