//! Offline corpus build: raw dataset CSV -> cleaned movies + embedding matrix.
//!
//! The input is a TMDB-style export where `genres` and `keywords` cells are
//! JSON arrays of `{"id": .., "name": ..}` objects. Cleaning policy:
//! missing overview becomes the empty string, unparsable list cells become
//! empty lists, missing numeric fields become 0, and rows without an id or
//! title are skipped with a warning.
//!
//! Embeddings are generated over `semantic_text()` in corpus order, so row
//! correspondence with the matrix holds by construction.

use std::path::Path;

use indicatif::ProgressBar;
use serde::Deserialize;

use crate::engine::artifact::{ArtifactError, ArtifactStore};
use crate::engine::embeddings::{EmbeddingError, TextEncoder};
use crate::engine::matrix::{EmbeddingMatrix, MatrixError};
use crate::movies::Movie;

/// Rows per encode_many call; keeps the progress bar moving on large
/// datasets without changing output order.
const ENCODE_BATCH_SIZE: usize = 256;

/// Errors that can occur during the corpus build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read dataset: {0}")]
    Dataset(#[from] csv::Error),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Outcome of a completed build.
#[derive(Debug)]
pub struct BuildSummary {
    pub movies: usize,
    pub skipped: usize,
    pub dimensions: usize,
}

/// One row of the raw dataset. Only the columns we keep; the rest of the
/// export is ignored by name.
#[derive(Debug, Deserialize)]
struct RawRecord {
    id: Option<u64>,
    title: Option<String>,
    genres: Option<String>,
    overview: Option<String>,
    keywords: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f32>,
    runtime: Option<f64>,
}

/// One entry of a JSON list cell.
#[derive(Debug, Deserialize)]
struct NamedEntity {
    name: String,
}

/// Read and clean the raw dataset. Fails fast if the file cannot be read;
/// individual malformed rows are skipped, not patched.
pub fn read_dataset(path: &Path) -> Result<(Vec<Movie>, usize), BuildError> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut movies = vec![];
    let mut skipped = 0usize;

    for (row, result) in reader.deserialize::<RawRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                log::warn!("skipping unreadable dataset row {}: {}", row + 1, err);
                skipped += 1;
                continue;
            }
        };

        let (id, title) = match (record.id, record.title) {
            (Some(id), Some(title)) if !title.trim().is_empty() => (id, title),
            _ => {
                log::warn!("skipping dataset row {} without id or title", row + 1);
                skipped += 1;
                continue;
            }
        };

        movies.push(Movie {
            id,
            title,
            overview: record.overview.unwrap_or_default(),
            genres: parse_name_list(record.genres.as_deref()),
            keywords: parse_name_list(record.keywords.as_deref()),
            release_date: record.release_date.unwrap_or_default(),
            vote_average: record.vote_average.unwrap_or(0.0),
            runtime: record.runtime.unwrap_or(0.0).max(0.0) as u32,
        });
    }

    Ok((movies, skipped))
}

/// Parse a JSON list cell of named entities into its name strings.
/// Unparsable or absent cells become the empty list.
fn parse_name_list(cell: Option<&str>) -> Vec<String> {
    let Some(cell) = cell else {
        return vec![];
    };

    match serde_json::from_str::<Vec<NamedEntity>>(cell) {
        Ok(entities) => entities.into_iter().map(|entity| entity.name).collect(),
        Err(_) => vec![],
    }
}

/// Embed every movie's semantic text, in corpus order.
pub fn encode_corpus(
    movies: &[Movie],
    encoder: &dyn TextEncoder,
) -> Result<EmbeddingMatrix, BuildError> {
    let texts: Vec<String> = movies.iter().map(|movie| movie.semantic_text()).collect();

    let bar = ProgressBar::new(texts.len() as u64);
    let mut rows = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(ENCODE_BATCH_SIZE) {
        rows.extend(encoder.encode_many(chunk)?);
        bar.inc(chunk.len() as u64);
    }
    bar.finish_and_clear();

    Ok(EmbeddingMatrix::from_rows(encoder.dimensions(), rows)?)
}

/// Full offline build: read, clean, encode, publish.
///
/// The artifact is staged and renamed by the store, so a failed or
/// interrupted build never replaces a good artifact with a partial one.
pub fn build_artifact(
    dataset: &Path,
    encoder: &dyn TextEncoder,
    store: &ArtifactStore,
) -> Result<BuildSummary, BuildError> {
    log::info!("reading dataset from {}", dataset.display());
    let (movies, skipped) = read_dataset(dataset)?;
    if skipped > 0 {
        log::warn!("skipped {} dataset rows", skipped);
    }

    log::info!("encoding {} movies", movies.len());
    let matrix = encode_corpus(&movies, encoder)?;

    store.save(&movies, &matrix, &encoder.model_id())?;

    Ok(BuildSummary {
        movies: movies.len(),
        skipped,
        dimensions: matrix.dimensions(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::HashEncoder;
    use std::io::Write;

    fn write_dataset(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const HEADER: &str = "id,title,genres,overview,keywords,release_date,vote_average,runtime\n";

    #[test]
    fn test_read_dataset_parses_json_list_cells() {
        let file = write_dataset(&format!(
            "{HEADER}19995,Avatar,\"[{{\"\"id\"\": 28, \"\"name\"\": \"\"Action\"\"}}, {{\"\"id\"\": 12, \"\"name\"\": \"\"Adventure\"\"}}]\",In the 22nd century...,\"[{{\"\"id\"\": 1463, \"\"name\"\": \"\"culture clash\"\"}}]\",2009-12-10,7.2,162.0\n"
        ));

        let (movies, skipped) = read_dataset(file.path()).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(movies.len(), 1);

        let movie = &movies[0];
        assert_eq!(movie.id, 19995);
        assert_eq!(movie.title, "Avatar");
        assert_eq!(movie.genres, vec!["Action", "Adventure"]);
        assert_eq!(movie.keywords, vec!["culture clash"]);
        assert_eq!(movie.release_date, "2009-12-10");
        assert_eq!(movie.runtime, 162);
    }

    #[test]
    fn test_read_dataset_defaults_missing_fields() {
        let file = write_dataset(&format!("{HEADER}7,Sparse,,,,,,\n"));

        let (movies, _) = read_dataset(file.path()).unwrap();
        let movie = &movies[0];
        assert_eq!(movie.overview, "");
        assert!(movie.genres.is_empty());
        assert!(movie.keywords.is_empty());
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.runtime, 0);
    }

    #[test]
    fn test_read_dataset_skips_rows_without_id_or_title() {
        let file = write_dataset(&format!(
            "{HEADER},Missing Id,[],x,[],2001-01-01,5.0,90.0\n8,,[],x,[],2001-01-01,5.0,90.0\n9,Kept,[],x,[],2001-01-01,5.0,90.0\n"
        ));

        let (movies, skipped) = read_dataset(file.path()).unwrap();
        assert_eq!(skipped, 2);
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Kept");
    }

    #[test]
    fn test_read_dataset_unparsable_genre_cell_becomes_empty() {
        let file = write_dataset(&format!("{HEADER}5,Odd,not json,plot,[],2000-01-01,5.0,100.0\n"));

        let (movies, _) = read_dataset(file.path()).unwrap();
        assert!(movies[0].genres.is_empty());
    }

    #[test]
    fn test_read_dataset_missing_file_fails_fast() {
        let result = read_dataset(Path::new("/nonexistent/tmdb.csv"));
        assert!(matches!(result, Err(BuildError::Dataset(_))));
    }

    #[test]
    fn test_encode_corpus_row_correspondence() {
        let encoder = HashEncoder::new(16);
        let movies = vec![
            Movie {
                id: 1,
                title: "Alpha".to_string(),
                ..Default::default()
            },
            Movie {
                id: 2,
                title: "Beta".to_string(),
                ..Default::default()
            },
        ];

        let matrix = encode_corpus(&movies, &encoder).unwrap();
        assert_eq!(matrix.rows(), movies.len());
        assert_eq!(
            matrix.row(0),
            encoder.encode(&movies[0].semantic_text()).unwrap().as_slice()
        );
        assert_eq!(
            matrix.row(1),
            encoder.encode(&movies[1].semantic_text()).unwrap().as_slice()
        );
    }

    #[test]
    fn test_build_artifact_publishes_aligned_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf());
        let encoder = HashEncoder::new(8);

        let file = write_dataset(&format!(
            "{HEADER}1,First,\"[{{\"\"id\"\": 35, \"\"name\"\": \"\"Comedy\"\"}}]\",Plot one,[],1990-06-01,6.1,101.0\n2,Second,\"[{{\"\"id\"\": 27, \"\"name\"\": \"\"Horror\"\"}}]\",Plot two,[],1991-07-01,6.2,102.0\n"
        ));

        let summary = build_artifact(file.path(), &encoder, &store).unwrap();
        assert_eq!(summary.movies, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.dimensions, 8);

        let (movies, matrix) = store.load(&encoder.model_id(), 8).unwrap();
        assert_eq!(movies.len(), matrix.rows());
        assert_eq!(movies[1].title, "Second");
    }

    #[test]
    fn test_rebuild_preserves_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf());
        let encoder = HashEncoder::new(8);

        let file = write_dataset(&format!(
            "{HEADER}1,Only,\"[{{\"\"id\"\": 18, \"\"name\"\": \"\"Drama\"\"}}]\",A plot,[],1980-01-01,7.0,100.0\n"
        ));

        let first = build_artifact(file.path(), &encoder, &store).unwrap();
        let second = build_artifact(file.path(), &encoder, &store).unwrap();
        assert_eq!(first.movies, second.movies);

        let (movies, matrix) = store.load(&encoder.model_id(), 8).unwrap();
        assert_eq!(movies.len(), matrix.rows());
        assert_eq!(
            matrix.row(0),
            encoder.encode(&movies[0].semantic_text()).unwrap().as_slice()
        );
    }
}
