use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A single program outcome from the fixed program-wide catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramOutcome {
    /// Fixed 1-based ordinal; column position in every matrix.
    pub ordinal: usize,
    /// Outcome statement text.
    pub statement: String,
    /// Bloom K-level the program assigns to this outcome.
    pub k_level: Option<u8>,
}

impl ProgramOutcome {
    /// Returns the display label, e.g. `PO7`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("PO{}", self.ordinal)
    }
}

/// On-disk shape of a catalogue entry; ordinals come from list position.
#[derive(Debug, Deserialize)]
struct CatalogueEntry {
    statement: String,
    #[serde(default)]
    k_level: Option<u8>,
}

/// On-disk shape of the catalogue artifact.
#[derive(Debug, Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    name: Option<String>,
    outcomes: Vec<CatalogueEntry>,
}

/// The ordered, immutable set of program outcomes.
///
/// Loaded once at startup and shared read-only by every scoring pass; no
/// mutation is exposed after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeCatalogue {
    name: String,
    outcomes: Vec<ProgramOutcome>,
}

impl OutcomeCatalogue {
    /// Builds a catalogue from pre-validated statements.
    ///
    /// Fails with [`EngineError::Configuration`] on an empty list or a blank
    /// statement; a partial catalogue would silently under-map every
    /// syllabus, so loading is all-or-nothing.
    pub fn new(
        name: impl Into<String>,
        statements: Vec<(String, Option<u8>)>,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        if statements.is_empty() {
            return Err(EngineError::Configuration(format!(
                "catalogue {name} contains no program outcomes"
            )));
        }
        let mut outcomes = Vec::with_capacity(statements.len());
        for (position, (statement, k_level)) in statements.into_iter().enumerate() {
            let ordinal = position + 1;
            if statement.trim().is_empty() {
                return Err(EngineError::Configuration(format!(
                    "catalogue {name} has a blank statement at PO{ordinal}"
                )));
            }
            outcomes.push(ProgramOutcome {
                ordinal,
                statement,
                k_level,
            });
        }
        Ok(Self { name, outcomes })
    }

    /// Loads the catalogue from a JSON artifact.
    ///
    /// ```json
    /// { "name": "BE-CSE", "outcomes": [ { "statement": "...", "k_level": 3 } ] }
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let data = fs::read_to_string(path).map_err(|err| {
            EngineError::Configuration(format!("reading catalogue {path:?}: {err}"))
        })?;
        let parsed: CatalogueFile = serde_json::from_str(&data).map_err(|err| {
            EngineError::Configuration(format!("parsing catalogue {path:?}: {err}"))
        })?;
        let name = parsed
            .name
            .unwrap_or_else(|| "program-outcomes".to_string());
        Self::new(
            name,
            parsed
                .outcomes
                .into_iter()
                .map(|entry| (entry.statement, entry.k_level))
                .collect(),
        )
    }

    /// Built-in engineering program outcome set, usable without a config file.
    #[must_use]
    pub fn engineering_default() -> Self {
        let statements = [
            ("Apply knowledge of mathematics, science and engineering fundamentals to the solution of complex engineering problems", 3),
            ("Identify, formulate and analyse complex engineering problems reaching substantiated conclusions", 4),
            ("Design solutions for complex engineering problems and design system components that meet specified needs", 5),
            ("Use research-based knowledge and research methods to conduct investigations of complex problems", 5),
            ("Create, select and apply appropriate techniques, resources and modern engineering tools to engineering activities", 3),
            ("Apply reasoning informed by contextual knowledge to assess societal, health, safety and legal issues", 3),
            ("Understand the impact of professional engineering solutions in societal and environmental contexts", 3),
            ("Apply ethical principles and commit to professional ethics and responsibilities of engineering practice", 3),
            ("Function effectively as an individual, and as a member or leader in diverse teams", 3),
            ("Communicate effectively on complex engineering activities with the engineering community and society", 3),
            ("Demonstrate knowledge and understanding of engineering and management principles in project settings", 3),
            ("Recognise the need for, and have the ability to engage in, independent and life-long learning", 3),
        ];
        let outcomes = statements
            .into_iter()
            .map(|(statement, k_level)| (statement.to_string(), Some(k_level)))
            .collect();
        // The built-in statements are never blank, so this cannot fail.
        Self::new("engineering-default", outcomes)
            .unwrap_or_else(|_| unreachable!("built-in catalogue is valid"))
    }

    /// Catalogue name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only view of the ordered program outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[ProgramOutcome] {
        &self.outcomes
    }

    /// Number of program outcomes (matrix column count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when the catalogue holds no outcomes. Construction forbids this;
    /// kept for the conventional `len`/`is_empty` pair.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Column labels `PO1..POn` in catalogue order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.outcomes.iter().map(ProgramOutcome::label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_catalogue_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.json");
        let artifact = json!({
            "name": "BE-CSE",
            "outcomes": [
                { "statement": "Apply engineering knowledge", "k_level": 3 },
                { "statement": "Design solutions" }
            ]
        });
        fs::write(&path, artifact.to_string()).unwrap();

        let catalogue = OutcomeCatalogue::from_file(&path).unwrap();
        assert_eq!(catalogue.len(), 2);
        assert_eq!(catalogue.outcomes()[0].ordinal, 1);
        assert_eq!(catalogue.outcomes()[0].k_level, Some(3));
        assert_eq!(catalogue.outcomes()[1].k_level, None);
        assert_eq!(catalogue.labels(), vec!["PO1", "PO2"]);
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = OutcomeCatalogue::from_file(Path::new("/nonexistent/pos.json")).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.json");
        fs::write(&path, "{ not json").unwrap();
        let err = OutcomeCatalogue::from_file(&path).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn empty_outcome_list_is_rejected() {
        let err = OutcomeCatalogue::new("empty", Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn blank_statement_is_rejected() {
        let err = OutcomeCatalogue::new(
            "bad",
            vec![("Design solutions".into(), None), ("   ".into(), None)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("PO2"));
    }

    #[test]
    fn default_catalogue_has_twelve_outcomes() {
        let catalogue = OutcomeCatalogue::engineering_default();
        assert_eq!(catalogue.len(), 12);
        assert!(!catalogue.is_empty());
        assert_eq!(catalogue.outcomes()[2].label(), "PO3");
    }
}
