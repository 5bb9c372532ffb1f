use serde::{Deserialize, Serialize};

/// Correlation level of one CO-PO cell: 0 (none) through 3 (strong).
pub type Level = u8;

/// Policy for splitting `[threshold, 1]` into the three correlated bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BandSplit {
    /// Three equal-width bands, the common CO-PO rubric convention.
    EqualWidth,
    /// Custom cumulative cut points within the `[threshold, 1]` range;
    /// expected `0 < weak < moderate < 1`. A score landing below `weak` maps
    /// to level 1, below `moderate` to level 2, otherwise level 3.
    /// Out-of-range or out-of-order cut points are clamped into order, the
    /// same normalization policy applied to the threshold itself.
    Fractions {
        /// Upper bound of the level-1 band, as a fraction of the range.
        weak: f32,
        /// Upper bound of the level-2 band, as a fraction of the range.
        moderate: f32,
    },
}

impl BandSplit {
    fn cut_points(self) -> (f32, f32) {
        match self {
            Self::EqualWidth => (1.0 / 3.0, 2.0 / 3.0),
            Self::Fractions { weak, moderate } => {
                let weak = weak.clamp(0.0, 1.0);
                let moderate = moderate.clamp(weak, 1.0);
                (weak, moderate)
            }
        }
    }
}

/// Per-invocation quantization knobs.
///
/// The threshold is the single knob end users adjust at runtime: scores below
/// it map to level 0 unconditionally, however the remaining range is split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Lowest score still considered a correlation; clamped to `[0,1]`.
    pub threshold: f32,
    /// How `[threshold, 1]` divides into levels 1..3.
    pub split: BandSplit,
}

impl ThresholdConfig {
    /// Creates a config with the default equal-width band split.
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            split: BandSplit::EqualWidth,
        }
    }

    /// Threshold clamped to `[0,1]`; out-of-range input normalizes to a
    /// valid degenerate config rather than erroring.
    #[must_use]
    pub fn effective_threshold(&self) -> f32 {
        self.threshold.clamp(0.0, 1.0)
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new(0.8)
    }
}

/// Quantizes one raw similarity score into a correlation level.
///
/// Pure function of `(score, config)`. A score exactly on a band boundary
/// rounds up to the higher level, favouring over- rather than under-reported
/// correlation. A threshold of 1 forces level 0 everywhere; at threshold 0
/// only exact-zero scores stay at level 0.
#[must_use]
pub fn quantize(score: f32, config: &ThresholdConfig) -> Level {
    let threshold = config.effective_threshold();
    if threshold >= 1.0 || score < threshold || score <= 0.0 {
        return 0;
    }
    let ratio = (score - threshold) / (1.0 - threshold);
    let (weak, moderate) = config.split.cut_points();
    if ratio >= moderate {
        3
    } else if ratio >= weak {
        2
    } else {
        1
    }
}

/// Row-major grid of raw similarity scores, |COs| rows by |POs| columns,
/// filled in fixed (CO-ordinal, PO-ordinal) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreGrid {
    rows: usize,
    cols: usize,
    scores: Vec<f32>,
}

impl ScoreGrid {
    /// Wraps a row-major score buffer.
    ///
    /// # Panics
    /// When the buffer length does not equal `rows * cols`; shapes are an
    /// internal contract, not a runtime input.
    #[must_use]
    pub fn new(rows: usize, cols: usize, scores: Vec<f32>) -> Self {
        assert_eq!(
            scores.len(),
            rows * cols,
            "score buffer must hold rows * cols entries"
        );
        Self { rows, cols, scores }
    }

    /// Number of CO rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of PO columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Raw score at (row, col).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.scores[row * self.cols + col]
    }
}

/// Quantized CO-PO correlation matrix; the sole artifact crossing the engine
/// boundary. Owns no reference back to the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    rows: usize,
    cols: usize,
    levels: Vec<Level>,
}

impl CorrelationMatrix {
    /// Quantizes a full score grid under the given config.
    ///
    /// The output shape always equals the grid shape, including 0-row or
    /// 0-column grids, which yield an empty matrix rather than an error.
    #[must_use]
    pub fn from_grid(grid: &ScoreGrid, config: &ThresholdConfig) -> Self {
        let levels = (0..grid.rows())
            .flat_map(|row| (0..grid.cols()).map(move |col| (row, col)))
            .map(|(row, col)| quantize(grid.get(row, col), config))
            .collect();
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            levels,
        }
    }

    /// Number of CO rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of PO columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Correlation level at (row, col).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Level {
        self.levels[row * self.cols + col]
    }

    /// Mean level of one PO column, `None` when the matrix has no rows.
    #[must_use]
    pub fn column_average(&self, col: usize) -> Option<f32> {
        if self.rows == 0 {
            return None;
        }
        let sum: u32 = (0..self.rows).map(|row| u32::from(self.get(row, col))).sum();
        Some(sum as f32 / self.rows as f32)
    }
}
