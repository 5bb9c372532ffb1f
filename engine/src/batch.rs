use anyhow::Result;
use serde_json::json;
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::engine::{MappingEngine, MappingRun};
use crate::matrix::ThresholdConfig;

/// One named syllabus submitted for mapping.
#[derive(Debug, Clone)]
pub struct SyllabusJob {
    /// Caller-supplied name (typically the file stem).
    pub name: String,
    /// Raw syllabus text.
    pub text: String,
}

/// Completed mapping for one syllabus.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Name the job was submitted under.
    pub name: String,
    /// Correlation id for tracing.
    pub run_id: String,
    /// The full mapping run (possibly 0-row when no COs were recognized).
    pub run: MappingRun,
}

/// Processes several syllabi concurrently over one shared engine.
///
/// Scoring is the dominant cost, so each syllabus runs on a blocking worker;
/// results are reassembled in submission order to keep the batch
/// deterministic.
pub struct BatchController {
    engine: MappingEngine,
}

impl BatchController {
    /// Creates a controller around an engine.
    #[must_use]
    pub fn new(engine: MappingEngine) -> Self {
        Self { engine }
    }

    /// Maps every job, preserving submission order in the output.
    ///
    /// The first configuration or provider failure aborts the whole batch;
    /// a job with zero recognizable COs still yields an (empty) run.
    pub async fn process_batch(
        &self,
        jobs: Vec<SyllabusJob>,
        config: ThresholdConfig,
    ) -> Result<Vec<BatchOutput>> {
        self.trace("engine.batch_start", jobs.len());
        let tasks: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let engine = self.engine.clone();
                tokio::task::spawn_blocking(move || {
                    let outcomes = engine.extract(&job.text);
                    let run = engine.build_matrix(&outcomes, &config)?;
                    Ok::<_, crate::error::EngineError>(BatchOutput {
                        name: job.name,
                        run_id: format!("run-{}", Uuid::new_v4()),
                        run,
                    })
                })
            })
            .collect();

        let mut outputs = Vec::with_capacity(tasks.len());
        for task in tasks {
            outputs.push(task.await??);
        }
        self.trace("engine.batch_complete", outputs.len());
        Ok(outputs)
    }

    fn trace(&self, message: &str, count: usize) {
        if let Some(telemetry) = self.engine.telemetry() {
            let _ = telemetry.log(LogLevel::Info, message, json!({ "count": count }));
        }
    }
}
