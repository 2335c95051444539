//! Row-major embedding matrix and the brute-force cosine ranker.
//!
//! The matrix holds one fixed-width vector per corpus movie, in corpus
//! order. Ranking scores every row against the probe (no pruning, no
//! approximate index) which is fine up to tens of thousands of rows.

use rayon::prelude::*;
use serde::Serialize;

/// Fixed-dimension embedding vectors, one row per corpus movie.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    dimensions: usize,
    /// Row-major values, `rows * dimensions` long.
    data: Vec<f32>,
}

/// Errors that can occur during matrix operations.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// A single ranked entry, pointing back into the corpus by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    /// Corpus index of the movie.
    pub index: usize,
    /// Cosine similarity, rounded to two decimals. The unrounded value is
    /// never exposed.
    pub score: f32,
    /// 1-based position in the result list.
    pub rank: usize,
}

impl EmbeddingMatrix {
    /// Create an empty matrix with the given vector width.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            data: Vec::new(),
        }
    }

    /// Build a matrix from row vectors, validating each row's width.
    pub fn from_rows(dimensions: usize, rows: Vec<Vec<f32>>) -> Result<Self, MatrixError> {
        let mut data = Vec::with_capacity(rows.len() * dimensions);
        for row in rows {
            if row.len() != dimensions {
                return Err(MatrixError::DimensionMismatch {
                    expected: dimensions,
                    got: row.len(),
                });
            }
            data.extend_from_slice(&row);
        }
        Ok(Self { dimensions, data })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn rows(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.data.len() / self.dimensions
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow row `i`. Panics on out-of-range, which callers prevent by
    /// iterating within `rows()`.
    pub fn row(&self, i: usize) -> &[f32] {
        let start = i * self.dimensions;
        &self.data[start..start + self.dimensions]
    }

    /// Append a row, validating its width.
    pub fn push_row(&mut self, row: &[f32]) -> Result<(), MatrixError> {
        if row.len() != self.dimensions {
            return Err(MatrixError::DimensionMismatch {
                expected: self.dimensions,
                got: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Iterate over rows in corpus order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.rows()).map(move |i| self.row(i))
    }
}

/// Score every row of `matrix` against `probe` and return the top `k`
/// entries, highest similarity first.
///
/// - zero-norm probe or row scores 0 for that pair (policy, not an error)
/// - equal scores are broken by ascending corpus index, so output is
///   deterministic for identical inputs
/// - scores are clamped to [-1, 1] and rounded to two decimals on emit
pub fn rank(
    probe: &[f32],
    matrix: &EmbeddingMatrix,
    k: usize,
) -> Result<Vec<RankedResult>, MatrixError> {
    if matrix.is_empty() || k == 0 {
        return Ok(vec![]);
    }

    if probe.len() != matrix.dimensions() {
        return Err(MatrixError::DimensionMismatch {
            expected: matrix.dimensions(),
            got: probe.len(),
        });
    }

    let probe_norm = l2_norm(probe);

    let mut scored: Vec<(usize, f32)> = (0..matrix.rows())
        .into_par_iter()
        .map(|i| (i, cosine_similarity(probe, matrix.row(i), probe_norm)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(k);

    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(position, (index, score))| RankedResult {
            index,
            score: round2(score),
            rank: position + 1,
        })
        .collect())
}

/// Compute L2 norm of a vector.
fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity with a precomputed probe norm. Zero-norm on either
/// side yields 0 rather than dividing by zero.
fn cosine_similarity(probe: &[f32], row: &[f32], probe_norm: f32) -> f32 {
    if probe_norm < f32::EPSILON {
        return 0.0;
    }
    let row_norm = l2_norm(row);
    if row_norm < f32::EPSILON {
        return 0.0;
    }

    let dot: f32 = probe.iter().zip(row.iter()).map(|(a, b)| a * b).sum();
    (dot / (probe_norm * row_norm)).clamp(-1.0, 1.0)
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f32>>) -> EmbeddingMatrix {
        EmbeddingMatrix::from_rows(3, rows).unwrap()
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let result = EmbeddingMatrix::from_rows(3, vec![vec![1.0, 0.0]]);
        assert!(matches!(
            result,
            Err(MatrixError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_row_access() {
        let m = matrix(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.row(1), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let m = matrix(vec![
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0],
        ]);

        let results = rank(&[1.0, 0.0, 0.0], &m, 10).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].index, 1);
        assert_eq!(results[1].index, 2);
        assert_eq!(results[2].index, 0);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[2].rank, 3);
    }

    #[test]
    fn test_rank_scores_are_non_increasing_and_bounded() {
        let m = matrix(vec![
            vec![1.0, 0.0, 0.0],
            vec![-1.0, 0.0, 0.0],
            vec![0.5, 0.5, 0.0],
            vec![0.0, 0.0, 2.0],
        ]);

        let results = rank(&[1.0, 0.0, 0.0], &m, 10).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for r in &results {
            assert!((-1.0..=1.0).contains(&r.score));
        }
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let m = matrix((0..10).map(|i| vec![1.0, i as f32 * 0.1, 0.0]).collect());
        let results = rank(&[1.0, 0.0, 0.0], &m, 3).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_rank_k_larger_than_corpus() {
        let m = matrix(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
        let results = rank(&[1.0, 0.0, 0.0], &m, 5).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_rank_empty_matrix() {
        let m = EmbeddingMatrix::new(3);
        let results = rank(&[1.0, 0.0, 0.0], &m, 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_rank_ties_break_by_corpus_index() {
        // Two identical rows must come back in corpus order.
        let m = matrix(vec![
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![1.0, 0.0, 0.0],
        ]);

        let results = rank(&[1.0, 0.0, 0.0], &m, 10).unwrap();
        assert_eq!(results[0].index, 1);
        assert_eq!(results[1].index, 2);
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn test_zero_norm_probe_scores_zero() {
        let m = matrix(vec![vec![1.0, 0.0, 0.0]]);
        let results = rank(&[0.0, 0.0, 0.0], &m, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.0);
    }

    #[test]
    fn test_zero_norm_row_scores_zero() {
        let m = matrix(vec![vec![0.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]]);
        let results = rank(&[1.0, 0.0, 0.0], &m, 10).unwrap();
        assert_eq!(results[0].index, 1);
        assert_eq!(results[1].index, 0);
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn test_rank_dimension_mismatch() {
        let m = matrix(vec![vec![1.0, 0.0, 0.0]]);
        let result = rank(&[1.0, 0.0], &m, 5);
        assert!(matches!(
            result,
            Err(MatrixError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_scores_rounded_to_two_decimals() {
        let m = matrix(vec![vec![1.0, 1.0, 0.0]]);
        let results = rank(&[1.0, 0.0, 0.0], &m, 1).unwrap();
        // cos = 1/sqrt(2) = 0.7071.. -> 0.71
        assert_eq!(results[0].score, 0.71);
    }

    #[test]
    fn test_rank_deterministic_across_runs() {
        let m = matrix(vec![
            vec![0.3, 0.7, 0.1],
            vec![0.3, 0.7, 0.1],
            vec![0.9, 0.0, 0.4],
        ]);
        let probe = [0.5, 0.5, 0.5];

        let first = rank(&probe, &m, 3).unwrap();
        let second = rank(&probe, &m, 3).unwrap();
        assert_eq!(first, second);
    }
}
