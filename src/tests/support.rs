//! Deterministic stand-ins for the embedding model.
//!
//! Both encoders are pure functions of their input text, so tests that use
//! them are reproducible byte-for-byte across runs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::engine::embeddings::{EmbeddingError, TextEncoder};
use crate::engine::matrix::EmbeddingMatrix;
use crate::movies::Movie;

/// Hash-based encoder: each alphanumeric token bumps one dimension picked
/// by its hash. Unrelated texts land on mostly disjoint dimensions.
pub struct HashEncoder {
    dimensions: usize,
}

impl HashEncoder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl TextEncoder for HashEncoder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> [u8; 32] {
        let mut id = [0u8; 32];
        id[0] = 0x7E;
        id[1] = self.dimensions as u8;
        id
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0f32; self.dimensions];
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            vector[(hasher.finish() % self.dimensions as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn encode_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

/// Known genre names, one orthogonal axis each.
const GENRE_AXES: &[&str] = &["Comedy", "Horror", "Drama", "Western"];

/// Encoder mapping genre mentions to orthogonal unit axes: any text
/// mentioning exactly one known genre encodes to that genre's unit vector,
/// texts mentioning none encode to zero.
pub struct GenreEncoder;

impl GenreEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a corpus the way the offline build would.
    pub fn encode_movies(&self, movies: &[Movie]) -> EmbeddingMatrix {
        let rows = movies
            .iter()
            .map(|movie| self.encode(&movie.semantic_text()).expect("stub encode"))
            .collect();
        EmbeddingMatrix::from_rows(self.dimensions(), rows).expect("stub matrix")
    }
}

impl TextEncoder for GenreEncoder {
    fn dimensions(&self) -> usize {
        GENRE_AXES.len()
    }

    fn model_id(&self) -> [u8; 32] {
        let mut id = [0u8; 32];
        id[0] = 0x6E;
        id
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0f32; GENRE_AXES.len()];
        for (axis, genre) in GENRE_AXES.iter().enumerate() {
            if text.contains(genre) {
                vector[axis] = 1.0;
            }
        }
        Ok(vector)
    }

    fn encode_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

/// A minimal movie with a single genre, for ranking fixtures.
pub fn genre_movie(id: u64, title: &str, genre: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        overview: format!("A {} story.", title.to_lowercase()),
        genres: vec![genre.to_string()],
        keywords: vec![],
        release_date: "2000-01-01".to_string(),
        vote_average: 6.0,
        runtime: 100,
    }
}
