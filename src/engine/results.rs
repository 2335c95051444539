//! Projection of ranked corpus indices into user-facing records.

use serde::Serialize;

use crate::engine::matrix::RankedResult;
use crate::movies::Movie;

/// A recommendation as callers see it. Pure projection of a corpus record
/// plus the ranked score; nothing here affects ranking.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: u64,
    pub title: String,
    pub overview: String,
    /// Cosine similarity rounded to two decimals.
    pub score: f32,
    pub genres: Vec<String>,
    /// Release year, or `"unknown"` when the date is absent or malformed.
    pub year: String,
    pub rating: f32,
    pub runtime: u32,
}

/// Map ranked indices back to full display records.
pub fn enrich(corpus: &[Movie], ranked: &[RankedResult]) -> Vec<Recommendation> {
    ranked
        .iter()
        .filter_map(|result| {
            corpus.get(result.index).map(|movie| Recommendation {
                id: movie.id,
                title: movie.title.clone(),
                overview: movie.overview.clone(),
                score: result.score,
                genres: movie.genres.clone(),
                year: movie.year_label(),
                rating: movie.vote_average,
                runtime: movie.runtime,
            })
        })
        .collect()
}
