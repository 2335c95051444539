//! The semantic matching engine.
//!
//! Offline, `corpus` turns the raw dataset into cleaned movie records plus
//! an embedding matrix, persisted as an aligned pair by `artifact`. Online,
//! `query` folds the user's structured preferences into a probe sentence,
//! `embeddings` encodes it, `matrix` scores it against every corpus row,
//! and `results` projects the winners back into display records. `service`
//! wires the pieces together behind one immutable facade.
//!
//! # Architecture
//!
//! - `embeddings`: TextEncoder trait + fastembed implementation
//! - `corpus`: offline dataset cleaning and batch encoding
//! - `artifact`: paired corpus/matrix persistence with atomic publish
//! - `query`: mood lexicon and probe construction
//! - `matrix`: embedding matrix and brute-force cosine ranking
//! - `results`: corpus-index to display-record projection
//! - `service`: the loaded, immutable engine facade

pub mod artifact;
pub mod corpus;
pub mod embeddings;
pub mod matrix;
pub mod query;
pub mod results;
pub mod service;

pub use artifact::{ArtifactError, ArtifactStore};
pub use corpus::{build_artifact, BuildError, BuildSummary};
pub use embeddings::{EmbeddingError, FastembedEncoder, TextEncoder};
pub use matrix::{EmbeddingMatrix, RankedResult};
pub use query::{build_probe, mood_keys, UserQuery};
pub use results::Recommendation;
pub use service::{Options, RecommendError, RecommendService};

/// Default embedding model name, the one the shipped artifact was built
/// with.
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Default number of recommendations returned per query.
pub const DEFAULT_TOP_K: usize = 5;
