use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single course outcome statement extracted from syllabus text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutcome {
    /// 1-based position in order of appearance; this order is preserved all
    /// the way into the final matrix rows.
    pub ordinal: usize,
    /// Statement text with the CO marker and K-level tag stripped.
    pub raw: String,
    /// Lowercased, whitespace-collapsed statement used for scoring.
    pub normalized: String,
    /// Bloom K-level parsed from a trailing `(K#)` or `[K#]` tag.
    pub k_level: Option<u8>,
}

impl CourseOutcome {
    /// Returns the display label, e.g. `CO3`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("CO{}", self.ordinal)
    }
}

/// Normalizes whitespace and lowercases content.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut normalized = text.trim().to_lowercase();
    normalized = normalized.replace('\n', " ");
    Regex::new(r"\s+")
        .unwrap()
        .replace_all(&normalized, " ")
        .into_owned()
}

/// Splits paragraph-form text into sentences using punctuation heuristics.
/// Trailing text without a terminal `.!?` is emitted as a final segment, so
/// an unterminated statement is never lost.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    let sentence_re = Regex::new(r"(?m)([^.!?]+[.!?])").unwrap();
    let mut sentences = Vec::new();
    let mut tail_start = 0;
    for cap in sentence_re.captures_iter(text) {
        let matched = cap.get(1).unwrap();
        tail_start = matched.end();
        let sentence = matched.as_str().trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
    }
    let tail = text[tail_start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

fn trim_terminal_punctuation(statement: &str) -> String {
    statement
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim_end()
        .to_string()
}

/// Extracts course outcome statements from raw syllabus text.
///
/// Segments line by line, falling back to sentence segmentation when the text
/// is a single paragraph. Only segments carrying a recognizable CO marker
/// (`CO3`, `3.`, `3)`, `(3)`) are kept; everything else is dropped silently.
/// Missed outcomes are preferred over misclassified prose, since downstream
/// correlation levels only ever add noise.
#[must_use]
pub fn extract_outcomes(raw_text: &str) -> Vec<CourseOutcome> {
    let marker_re =
        Regex::new(r"(?i)^\s*(?:co\s*\d+\s*[:.\-]?|\(\d+\)|\d+\s*[.)])\s*(.+?)\s*$").unwrap();
    let k_level_re = Regex::new(r"(?i)[(\[]\s*k\s*(\d)\s*[)\]]\s*$").unwrap();

    let segments: Vec<String> = {
        let lines: Vec<String> = raw_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();
        if lines.len() > 1 {
            lines
        } else {
            split_sentences(raw_text)
        }
    };

    let mut outcomes = Vec::new();
    for segment in segments {
        let Some(cap) = marker_re.captures(&segment) else {
            continue;
        };
        let mut statement = trim_terminal_punctuation(&cap[1]);
        let mut k_level = None;
        if let Some(k_cap) = k_level_re.captures(&statement) {
            k_level = k_cap[1].parse::<u8>().ok();
            let tag_start = k_cap.get(0).unwrap().start();
            statement.truncate(tag_start);
            statement = statement.trim_end().to_string();
        }
        if statement.is_empty() {
            continue;
        }
        outcomes.push(CourseOutcome {
            ordinal: outcomes.len() + 1,
            normalized: normalize(&statement),
            raw: statement,
            k_level,
        });
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_reduces_whitespace() {
        let result = normalize("Understand   BASIC\nAlgorithms");
        assert_eq!(result, "understand basic algorithms");
    }

    #[test]
    fn split_sentences_detects_boundaries() {
        let sentences = split_sentences("One. Two! Three?");
        assert_eq!(sentences.len(), 3);
    }

    #[test]
    fn split_sentences_keeps_unterminated_tail() {
        let sentences = split_sentences("One. Two");
        assert_eq!(sentences, vec!["One.", "Two"]);
    }

    #[test]
    fn single_marked_line_without_punctuation_is_extracted() {
        let outcomes = extract_outcomes("CO1: Understand basic algorithms");
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].ordinal, 1);
        assert_eq!(outcomes[0].raw, "Understand basic algorithms");
    }

    #[test]
    fn extracts_marked_lines_in_source_order() {
        let text = "Course Outcomes\nCO1: Understand basic algorithms\nCO2: Design efficient data structures\nTextbook: CLRS";
        let outcomes = extract_outcomes(text);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].ordinal, 1);
        assert_eq!(outcomes[0].raw, "Understand basic algorithms");
        assert_eq!(outcomes[1].normalized, "design efficient data structures");
    }

    #[test]
    fn accepts_numbered_list_markers() {
        let text = "1. Apply calculus to engineering problems\n2) Analyze circuits\n(3) Use simulation tools";
        let outcomes = extract_outcomes(text);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[2].raw, "Use simulation tools");
    }

    #[test]
    fn falls_back_to_sentences_for_paragraph_form() {
        let text = "CO1: Understand compilers. CO2: Build parsers. The course meets twice a week.";
        let outcomes = extract_outcomes(text);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].raw, "Build parsers");
    }

    #[test]
    fn unmarked_text_yields_empty_sequence() {
        let outcomes = extract_outcomes("This syllabus lists no outcomes at all.\nJust prose.");
        assert!(outcomes.is_empty());
    }

    #[test]
    fn duplicate_statements_stay_distinct() {
        let text = "CO1: Apply statistics\nCO2: Apply statistics";
        let outcomes = extract_outcomes(text);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].raw, outcomes[1].raw);
        assert_ne!(outcomes[0].ordinal, outcomes[1].ordinal);
    }

    #[test]
    fn parses_trailing_k_level_tag() {
        let text = "CO1: Evaluate machine learning models (K5)\nCO2: Recall definitions [K1]";
        let outcomes = extract_outcomes(text);
        assert_eq!(outcomes[0].k_level, Some(5));
        assert_eq!(outcomes[0].raw, "Evaluate machine learning models");
        assert_eq!(outcomes[1].k_level, Some(1));
    }

    #[test]
    fn ordinals_follow_appearance_not_marker_digits() {
        let text = "CO4: First listed\nCO2: Second listed";
        let outcomes = extract_outcomes(text);
        assert_eq!(outcomes[0].ordinal, 1);
        assert_eq!(outcomes[0].raw, "First listed");
        assert_eq!(outcomes[1].ordinal, 2);
    }
}
