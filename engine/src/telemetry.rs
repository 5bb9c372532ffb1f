use std::{path::Path, sync::Arc};

use anyhow::Result;
use shared_logging::{JsonLogger, LogLevel, LogRecord};

/// Best-effort JSONL telemetry for engine pipelines.
///
/// Engines hold an `Option<EngineTelemetry>` and ignore logging failures;
/// observability must never fail a mapping run.
#[derive(Debug, Clone)]
pub struct EngineTelemetry {
    logger: Arc<JsonLogger>,
}

impl EngineTelemetry {
    /// Opens (or creates) the telemetry log at the given path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            logger: Arc::new(JsonLogger::new(path)?),
        })
    }

    /// Writes one structured event.
    pub fn log(&self, level: LogLevel, message: &str, payload: serde_json::Value) -> Result<()> {
        self.logger
            .log(&LogRecord::new("engine", level, message).with_fields(payload))
    }
}
