//! Similarity mapping engine: turns free-text course syllabi into CO-PO
//! correlation matrices.
//!
//! Pipeline: raw text -> outcome extraction -> pairwise similarity scoring
//! against the program outcome catalogue -> threshold quantization ->
//! labeled table. Each invocation owns its own outcomes, score grid, and
//! threshold config; only the catalogue is shared, read-only, across runs.

/// Concurrent multi-syllabus processing.
pub mod batch;
/// Fixed program outcome catalogue, loaded once at startup.
pub mod catalogue;
/// Pipeline facade tying extraction, scoring, and quantization together.
pub mod engine;
/// Engine error kinds.
pub mod error;
/// Course outcome extraction from raw syllabus text.
pub mod extract;
/// Score grids, threshold config, and level quantization.
pub mod matrix;
/// Labeled table assembly and CSV export.
pub mod report;
/// Similarity provider seam and the default lexical scorer.
pub mod score;
/// Best-effort structured telemetry.
pub mod telemetry;

pub use batch::{BatchController, BatchOutput, SyllabusJob};
pub use catalogue::{OutcomeCatalogue, ProgramOutcome};
pub use engine::{MappingEngine, MappingRun, RunDebug};
pub use error::EngineError;
pub use extract::{extract_outcomes, CourseOutcome};
pub use matrix::{quantize, BandSplit, CorrelationMatrix, Level, ScoreGrid, ThresholdConfig};
pub use report::MappingTable;
pub use score::{LexicalScorer, SimilarityScorer};
pub use telemetry::EngineTelemetry;
