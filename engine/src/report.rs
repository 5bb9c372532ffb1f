use serde::{Deserialize, Serialize};

use crate::matrix::CorrelationMatrix;

/// Labeled tabular view of a correlation matrix, ready for rendering or CSV
/// export. Assembly is pure formatting; no levels are recomputed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTable {
    /// Header row: blank corner cell followed by PO labels.
    pub header: Vec<String>,
    /// One row per CO (label first, then levels), plus a trailing `Average`
    /// row with per-PO mean levels when any CO rows exist.
    pub rows: Vec<Vec<String>>,
}

impl MappingTable {
    /// Assembles the table from a matrix and its row/column labels.
    ///
    /// # Panics
    /// When label counts do not match the matrix shape. That mismatch is an
    /// internal contract violation, never a user-reachable state.
    #[must_use]
    pub fn new(matrix: &CorrelationMatrix, co_labels: &[String], po_labels: &[String]) -> Self {
        assert_eq!(
            co_labels.len(),
            matrix.rows(),
            "CO label count must match matrix rows"
        );
        assert_eq!(
            po_labels.len(),
            matrix.cols(),
            "PO label count must match matrix columns"
        );

        let mut header = Vec::with_capacity(po_labels.len() + 1);
        header.push(String::new());
        header.extend(po_labels.iter().cloned());

        let mut rows = Vec::with_capacity(matrix.rows() + 1);
        for (row, label) in co_labels.iter().enumerate() {
            let mut cells = Vec::with_capacity(matrix.cols() + 1);
            cells.push(label.clone());
            for col in 0..matrix.cols() {
                cells.push(matrix.get(row, col).to_string());
            }
            rows.push(cells);
        }

        if matrix.rows() > 0 {
            let mut cells = Vec::with_capacity(matrix.cols() + 1);
            cells.push("Average".to_string());
            for col in 0..matrix.cols() {
                let average = matrix.column_average(col).unwrap_or(0.0);
                cells.push(format!("{average:.2}"));
            }
            rows.push(cells);
        }

        Self { header, rows }
    }

    /// Serializes the table as a comma-separated grid, top-left cell blank.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&csv_line(&self.header));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&csv_line(row));
        }
        out.push('\n');
        out
    }
}

fn csv_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| csv_escape(cell))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{ScoreGrid, ThresholdConfig};

    fn matrix_2x2() -> CorrelationMatrix {
        let grid = ScoreGrid::new(2, 2, vec![0.0, 0.9, 0.55, 1.0]);
        CorrelationMatrix::from_grid(&grid, &ThresholdConfig::new(0.5))
    }

    fn labels(prefix: &str, count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn table_layout_matches_matrix() {
        let table = MappingTable::new(&matrix_2x2(), &labels("CO", 2), &labels("PO", 2));
        assert_eq!(table.header, vec!["", "PO1", "PO2"]);
        assert_eq!(table.rows.len(), 3); // two COs plus Average
        assert_eq!(table.rows[0][0], "CO1");
        assert_eq!(table.rows[2][0], "Average");
    }

    #[test]
    fn csv_starts_with_blank_corner() {
        let csv = MappingTable::new(&matrix_2x2(), &labels("CO", 2), &labels("PO", 2)).to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(",PO1,PO2"));
        let first_row = lines.next().unwrap();
        assert!(first_row.starts_with("CO1,"));
        assert!(csv.lines().last().unwrap().starts_with("Average,"));
    }

    #[test]
    fn empty_matrix_renders_header_only() {
        let grid = ScoreGrid::new(0, 2, Vec::new());
        let matrix = CorrelationMatrix::from_grid(&grid, &ThresholdConfig::default());
        let table = MappingTable::new(&matrix, &[], &labels("PO", 2));
        assert!(table.rows.is_empty());
        assert_eq!(table.to_csv(), ",PO1,PO2\n");
    }

    #[test]
    fn cells_with_commas_are_quoted() {
        let escaped = csv_escape("Design, build and test");
        assert_eq!(escaped, "\"Design, build and test\"");
    }

    #[test]
    #[should_panic(expected = "CO label count")]
    fn label_mismatch_is_a_contract_violation() {
        let _ = MappingTable::new(&matrix_2x2(), &labels("CO", 3), &labels("PO", 2));
    }
}
