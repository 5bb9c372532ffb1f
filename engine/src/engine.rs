use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_logging::LogLevel;

use crate::catalogue::OutcomeCatalogue;
use crate::error::EngineError;
use crate::extract::{extract_outcomes, CourseOutcome};
use crate::matrix::{CorrelationMatrix, ScoreGrid, ThresholdConfig};
use crate::report::MappingTable;
use crate::score::{LexicalScorer, SimilarityScorer};
use crate::telemetry::EngineTelemetry;

/// Diagnostic payload collected alongside a run: the raw pairwise scores and
/// the terms the provider actually compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDebug {
    /// Effective (clamped) threshold applied during quantization.
    pub threshold: f32,
    /// Raw similarity per CO label, keyed by PO label, in grid order.
    pub pair_scores: IndexMap<String, IndexMap<String, f32>>,
    /// Preprocessed terms per CO label.
    pub preprocessed_terms: IndexMap<String, Vec<String>>,
}

/// Everything one invocation produces: outcomes, raw scores, quantized
/// matrix, and debug info. No reference back to the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRun {
    /// Course outcomes the matrix rows correspond to, in extraction order.
    pub outcomes: Vec<CourseOutcome>,
    /// Raw similarity grid before quantization.
    pub scores: ScoreGrid,
    /// Quantized correlation matrix.
    pub matrix: CorrelationMatrix,
    /// Diagnostics mirroring the scores and preprocessing.
    pub debug: RunDebug,
}

/// The similarity mapping engine: extraction, pairwise scoring against the
/// catalogue, threshold quantization, and table assembly, as one strict
/// pipeline with no shared mutable state between invocations.
#[derive(Clone)]
pub struct MappingEngine {
    catalogue: Arc<OutcomeCatalogue>,
    scorer: Arc<dyn SimilarityScorer>,
    telemetry: Option<EngineTelemetry>,
}

impl MappingEngine {
    /// Creates an engine over the given catalogue with the default lexical
    /// similarity provider.
    #[must_use]
    pub fn new(catalogue: OutcomeCatalogue) -> Self {
        Self {
            catalogue: Arc::new(catalogue),
            scorer: Arc::new(LexicalScorer::new()),
            telemetry: None,
        }
    }

    /// Swaps in a different similarity provider.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Attaches best-effort telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: EngineTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Read-only view of the catalogue backing this engine.
    #[must_use]
    pub fn catalogue(&self) -> &OutcomeCatalogue {
        &self.catalogue
    }

    /// Attached telemetry, if any.
    #[must_use]
    pub fn telemetry(&self) -> Option<&EngineTelemetry> {
        self.telemetry.as_ref()
    }

    /// Extracts course outcomes from raw syllabus text. Zero recognizable
    /// outcomes is a valid empty result, not an error.
    #[must_use]
    pub fn extract(&self, raw_text: &str) -> Vec<CourseOutcome> {
        let outcomes = extract_outcomes(raw_text);
        self.trace(
            "engine.outcomes_extracted",
            json!({ "count": outcomes.len() }),
        );
        outcomes
    }

    /// Scores every (CO, PO) pair in fixed ordinal order, quantizes under the
    /// config, and returns the full run.
    ///
    /// A provider failure or out-of-range score aborts the invocation with
    /// [`EngineError::Provider`]; no partial matrix is returned.
    pub fn build_matrix(
        &self,
        outcomes: &[CourseOutcome],
        config: &ThresholdConfig,
    ) -> Result<MappingRun, EngineError> {
        let rows = outcomes.len();
        let cols = self.catalogue.len();

        let mut scores = Vec::with_capacity(rows * cols);
        let mut pair_scores = IndexMap::with_capacity(rows);
        let mut preprocessed_terms = IndexMap::with_capacity(rows);
        for outcome in outcomes {
            let mut per_po = IndexMap::with_capacity(cols);
            for po in self.catalogue.outcomes() {
                let score = self.scorer.score(&outcome.normalized, &po.statement)?;
                if !score.is_finite() || !(0.0..=1.0).contains(&score) {
                    return Err(EngineError::Provider(format!(
                        "score {score} for {}/{} is outside [0,1]",
                        outcome.label(),
                        po.label()
                    )));
                }
                scores.push(score);
                per_po.insert(po.label(), score);
            }
            pair_scores.insert(outcome.label(), per_po);
            preprocessed_terms.insert(outcome.label(), self.scorer.preprocess(&outcome.raw));
        }

        let grid = ScoreGrid::new(rows, cols, scores);
        let matrix = CorrelationMatrix::from_grid(&grid, config);
        self.trace(
            "engine.matrix_built",
            json!({
                "rows": matrix.rows(),
                "cols": matrix.cols(),
                "threshold": config.effective_threshold(),
            }),
        );

        Ok(MappingRun {
            outcomes: outcomes.to_vec(),
            scores: grid,
            matrix,
            debug: RunDebug {
                threshold: config.effective_threshold(),
                pair_scores,
                preprocessed_terms,
            },
        })
    }

    /// Packages a run as a labeled table (rows `CO<i>`, columns `PO<j>`).
    #[must_use]
    pub fn to_table(&self, run: &MappingRun) -> MappingTable {
        let co_labels: Vec<String> = run.outcomes.iter().map(CourseOutcome::label).collect();
        MappingTable::new(&run.matrix, &co_labels, &self.catalogue.labels())
    }

    fn trace(&self, message: &str, payload: serde_json::Value) {
        if let Some(telemetry) = &self.telemetry {
            let _ = telemetry.log(LogLevel::Info, message, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_po_catalogue() -> OutcomeCatalogue {
        OutcomeCatalogue::new(
            "test",
            vec![
                ("Apply engineering knowledge".into(), None),
                ("Design solutions".into(), None),
            ],
        )
        .unwrap()
    }

    const SCENARIO_TEXT: &str =
        "CO1: Understand basic algorithms\nCO2: Design efficient data structures";

    #[test]
    fn scenario_two_outcomes_two_pos() {
        let engine = MappingEngine::new(two_po_catalogue());
        let outcomes = engine.extract(SCENARIO_TEXT);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].raw, "Understand basic algorithms");

        let run = engine
            .build_matrix(&outcomes, &ThresholdConfig::new(0.3))
            .unwrap();
        assert_eq!(run.matrix.rows(), 2);
        assert_eq!(run.matrix.cols(), 2);
        for row in 0..2 {
            for col in 0..2 {
                assert!(run.matrix.get(row, col) <= 3);
            }
        }
        // Quantization preserves score ordering within a row.
        let design_score = run.scores.get(1, 1);
        let apply_score = run.scores.get(1, 0);
        if design_score > apply_score {
            assert!(run.matrix.get(1, 1) >= run.matrix.get(1, 0));
        }
    }

    #[test]
    fn threshold_one_yields_all_zero_matrix() {
        let engine = MappingEngine::new(two_po_catalogue());
        let outcomes = engine.extract(SCENARIO_TEXT);
        let run = engine
            .build_matrix(&outcomes, &ThresholdConfig::new(1.0))
            .unwrap();
        for row in 0..run.matrix.rows() {
            for col in 0..run.matrix.cols() {
                assert_eq!(run.matrix.get(row, col), 0);
            }
        }
    }

    #[test]
    fn empty_outcome_list_builds_empty_matrix() {
        let engine = MappingEngine::new(two_po_catalogue());
        let run = engine
            .build_matrix(&[], &ThresholdConfig::default())
            .unwrap();
        assert_eq!(run.matrix.rows(), 0);
        assert_eq!(run.matrix.cols(), 2);
        assert!(run.debug.pair_scores.is_empty());
    }

    #[test]
    fn repeated_builds_are_bit_identical() {
        let engine = MappingEngine::new(two_po_catalogue());
        let outcomes = engine.extract(SCENARIO_TEXT);
        let config = ThresholdConfig::new(0.3);
        let first = engine.build_matrix(&outcomes, &config).unwrap();
        let second = engine.build_matrix(&outcomes, &config).unwrap();
        assert_eq!(first.matrix, second.matrix);
        assert_eq!(first.scores, second.scores);
    }

    #[test]
    fn out_of_range_provider_score_is_fatal() {
        struct BrokenScorer;
        impl SimilarityScorer for BrokenScorer {
            fn score(&self, _co: &str, _po: &str) -> Result<f32, EngineError> {
                Ok(2.0)
            }
        }
        let engine =
            MappingEngine::new(two_po_catalogue()).with_scorer(Arc::new(BrokenScorer));
        let outcomes = engine.extract(SCENARIO_TEXT);
        let err = engine
            .build_matrix(&outcomes, &ThresholdConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Provider(_)));
    }

    #[test]
    fn table_carries_ordinal_labels() {
        let engine = MappingEngine::new(two_po_catalogue());
        let outcomes = engine.extract(SCENARIO_TEXT);
        let run = engine
            .build_matrix(&outcomes, &ThresholdConfig::new(0.3))
            .unwrap();
        let table = engine.to_table(&run);
        assert_eq!(table.header, vec!["", "PO1", "PO2"]);
        assert_eq!(table.rows[0][0], "CO1");
        assert_eq!(table.rows[1][0], "CO2");
    }

    #[test]
    fn debug_info_tracks_grid_order() {
        let engine = MappingEngine::new(two_po_catalogue());
        let outcomes = engine.extract(SCENARIO_TEXT);
        let run = engine
            .build_matrix(&outcomes, &ThresholdConfig::new(0.3))
            .unwrap();
        let co_keys: Vec<_> = run.debug.pair_scores.keys().cloned().collect();
        assert_eq!(co_keys, vec!["CO1", "CO2"]);
        assert_eq!(run.debug.pair_scores["CO1"]["PO1"], run.scores.get(0, 0));
        assert!(run.debug.preprocessed_terms["CO2"].contains(&"design".to_string()));
    }
}
