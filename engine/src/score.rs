use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::extract::normalize;

/// English tokens carrying no outcome-specific meaning, dropped before
/// similarity comparison.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it",
    "of", "on", "or", "that", "the", "their", "to", "with", "will", "able", "various",
];

/// Swappable semantic-similarity provider.
///
/// Any implementation satisfying the `(text, text) -> [0,1]` contract can be
/// substituted without touching extraction or quantization. The engine always
/// calls with `(CO, PO)` in that order; for fixed inputs and a fixed provider
/// version the score must be stable across calls.
pub trait SimilarityScorer: Send + Sync {
    /// Scores the similarity of one CO statement against one PO statement.
    ///
    /// Returns a value in `[0,1]`; empty or whitespace-only input on either
    /// side must yield `0.0` rather than an error, so the score grid is
    /// always fully populated. Backend failures surface as
    /// [`EngineError::Provider`].
    fn score(&self, co: &str, po: &str) -> Result<f32, EngineError>;

    /// Terms the provider actually compares, for debug reporting.
    fn preprocess(&self, text: &str) -> Vec<String> {
        normalize(text)
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// Default provider: cosine similarity over stopword-filtered term
/// frequencies. Deterministic and dependency-free.
#[derive(Debug, Clone, Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    /// Creates the default lexical provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    // Ordered map so the dot-product accumulates in a stable order; the
    // score must be bit-identical across repeated calls.
    fn term_frequencies(terms: &[String]) -> BTreeMap<&str, f32> {
        let mut frequencies = BTreeMap::new();
        for term in terms {
            *frequencies.entry(term.as_str()).or_insert(0.0) += 1.0;
        }
        frequencies
    }
}

impl SimilarityScorer for LexicalScorer {
    fn score(&self, co: &str, po: &str) -> Result<f32, EngineError> {
        let co_terms = self.preprocess(co);
        let po_terms = self.preprocess(po);
        if co_terms.is_empty() || po_terms.is_empty() {
            return Ok(0.0);
        }

        let co_freq = Self::term_frequencies(&co_terms);
        let po_freq = Self::term_frequencies(&po_terms);

        let mut dot = 0.0f32;
        for (term, weight) in &co_freq {
            if let Some(other) = po_freq.get(term) {
                dot += weight * other;
            }
        }
        let co_norm: f32 = co_freq.values().map(|w| w * w).sum::<f32>().sqrt();
        let po_norm: f32 = po_freq.values().map(|w| w * w).sum::<f32>().sqrt();
        if co_norm == 0.0 || po_norm == 0.0 {
            return Ok(0.0);
        }
        Ok((dot / (co_norm * po_norm)).clamp(0.0, 1.0))
    }

    fn preprocess(&self, text: &str) -> Vec<String> {
        normalize(text)
            .split(' ')
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty() && !STOPWORDS.contains(token))
            .map(ToString::to_string)
            .collect()
    }
}
