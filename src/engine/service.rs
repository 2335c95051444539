//! Recommendation service: the owner of the loaded engine state.
//!
//! Holds the encoder, corpus, and embedding matrix for the lifetime of the
//! process. Everything is loaded eagerly at construction and immutable
//! afterwards, so a service behind an `Arc` serves any number of threads
//! without locking (the encoder serializes its own model access).

use serde::Serialize;

use crate::config::Config;
use crate::engine::artifact::{ArtifactError, ArtifactStore};
use crate::engine::embeddings::TextEncoder;
use crate::engine::matrix::{self, EmbeddingMatrix, MatrixError};
use crate::engine::query::{self, UserQuery};
use crate::engine::results::{enrich, Recommendation};
use crate::movies::Movie;

/// Errors surfaced by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// The artifact pair is absent; the engine cannot serve.
    #[error("Recommendation artifact not found: {0}. Run `reel build` first.")]
    NotReady(String),

    /// The probe could not be encoded. Deliberately generic: the cause is
    /// logged, not handed to untrusted callers.
    #[error("Failed to encode query")]
    Encoding,

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Ranking error: {0}")]
    Ranking(#[from] MatrixError),
}

/// The option lists callers may present for query building.
#[derive(Debug, Clone, Serialize)]
pub struct Options {
    pub genres: Vec<String>,
    pub moods: Vec<String>,
}

/// Loaded, immutable recommendation engine.
pub struct RecommendService {
    encoder: Box<dyn TextEncoder>,
    corpus: Vec<Movie>,
    matrix: EmbeddingMatrix,
    top_k: usize,
    score_floor: Option<f32>,
    genres: Vec<String>,
}

impl RecommendService {
    /// Load the artifact pair and assemble a ready service.
    ///
    /// Fails with `NotReady` when no artifact has been built yet, and with
    /// the underlying `ArtifactError` when the pair exists but is invalid
    /// (corrupted, wrong model, misaligned). A misaligned pair is never
    /// served from.
    pub fn open(config: &Config, encoder: Box<dyn TextEncoder>) -> Result<Self, RecommendError> {
        let store = ArtifactStore::new(config.data_dir());
        if !store.exists() {
            return Err(RecommendError::NotReady(
                store.movies_path().display().to_string(),
            ));
        }

        let (corpus, matrix) = store.load(&encoder.model_id(), encoder.dimensions())?;
        log::info!(
            "loaded {} movies with {}-dim embeddings",
            corpus.len(),
            matrix.dimensions()
        );

        Ok(Self {
            encoder,
            corpus,
            matrix,
            top_k: config.top_k,
            score_floor: config.score_floor,
            genres: config.genres.clone(),
        })
    }

    /// Assemble a service from already-loaded parts. Used by tests and by
    /// the build path to sanity-check a fresh artifact.
    pub fn from_parts(
        encoder: Box<dyn TextEncoder>,
        corpus: Vec<Movie>,
        matrix: EmbeddingMatrix,
        config: &Config,
    ) -> Result<Self, RecommendError> {
        if corpus.len() != matrix.rows() {
            return Err(RecommendError::Artifact(ArtifactError::Misaligned {
                movies: corpus.len(),
                vectors: matrix.rows(),
            }));
        }

        Ok(Self {
            encoder,
            corpus,
            matrix,
            top_k: config.top_k,
            score_floor: config.score_floor,
            genres: config.genres.clone(),
        })
    }

    pub fn corpus_len(&self) -> usize {
        self.corpus.len()
    }

    /// Option lists for query building: curated genres from config, mood
    /// keys from the lexicon.
    pub fn options(&self) -> Options {
        Options {
            genres: self.genres.clone(),
            moods: query::mood_keys().iter().map(|key| key.to_string()).collect(),
        }
    }

    /// Run one query through the full pipeline: probe -> encode -> rank ->
    /// enrich.
    ///
    /// An all-empty query short-circuits to an empty list without touching
    /// the encoder. Results are ordered by descending score, at most
    /// `top_k` of them, fewer when the optional score floor drops some.
    pub fn recommend(&self, user_query: &UserQuery) -> Result<Vec<Recommendation>, RecommendError> {
        let probe = query::build_probe(user_query);
        if probe.is_empty() {
            log::debug!("empty query, returning no results");
            return Ok(vec![]);
        }

        log::debug!("probe: {probe}");

        let probe_vector = self.encoder.encode(&probe).map_err(|err| {
            log::error!("probe encoding failed: {err}");
            RecommendError::Encoding
        })?;

        let mut ranked = matrix::rank(&probe_vector, &self.matrix, self.top_k)?;

        if let Some(floor) = self.score_floor {
            ranked.retain(|result| result.score >= floor);
            for (position, result) in ranked.iter_mut().enumerate() {
                result.rank = position + 1;
            }
        }

        Ok(enrich(&self.corpus, &ranked))
    }
}
