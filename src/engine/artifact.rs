//! Persistence for the (corpus, embedding matrix) artifact pair.
//!
//! Two files in the data directory, always written and read together:
//!
//! `movies.csv`: the cleaned corpus, one row per movie, list cells joined
//! with `|`.
//!
//! `vectors.bin`: header (47 bytes):
//! - version: u8 (1)
//! - model_id: [u8; 32] (SHA256 hash of model name)
//! - dimensions: u16 (little-endian)
//! - row_count: u64 (little-endian)
//! - checksum: u32 (CRC32 of header fields before checksum)
//!
//! followed by `row_count * dimensions` little-endian f32 values in corpus
//! order. Row *i* is the embedding of `movies[i].semantic_text()`; the
//! loader refuses any pair where the counts disagree.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::engine::matrix::EmbeddingMatrix;
use crate::movies::Movie;

/// Current file format version
const FORMAT_VERSION: u8 = 1;

/// Header size in bytes: version(1) + model_id(32) + dimensions(2) + row_count(8) + checksum(4)
const HEADER_SIZE: usize = 47;

/// Separator for list-valued CSV cells (genres, keywords).
const LIST_SEPARATOR: &str = "|";

const CSV_HEADERS: [&str; 8] = [
    "id",
    "title",
    "genres",
    "keywords",
    "overview",
    "release_date",
    "vote_average",
    "runtime",
];

/// Errors that can occur during artifact storage operations.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus file error: {0}")]
    Corpus(#[from] csv::Error),

    #[error("Invalid corpus record: {0}")]
    InvalidCorpus(String),

    #[error("Version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u8, u8),

    #[error("Model mismatch: vectors were built with a different model")]
    ModelMismatch,

    #[error("Checksum mismatch: vector file may be corrupted")]
    ChecksumMismatch,

    #[error("Dimension mismatch: expected {expected}, file has {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Misaligned artifact: {movies} movies but {vectors} vector rows")]
    Misaligned { movies: usize, vectors: usize },
}

/// Storage manager for the artifact pair.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn movies_path(&self) -> PathBuf {
        self.dir.join("movies.csv")
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.dir.join("vectors.bin")
    }

    /// Whether a complete artifact pair is present.
    pub fn exists(&self) -> bool {
        self.movies_path().exists() && self.vectors_path().exists()
    }

    /// Persist the pair atomically: both files are staged as `.tmp`
    /// siblings and published by rename, so a crash mid-save never leaves
    /// a loadable partial artifact.
    pub fn save(
        &self,
        movies: &[Movie],
        matrix: &EmbeddingMatrix,
        model_id: &[u8; 32],
    ) -> Result<(), ArtifactError> {
        if movies.len() != matrix.rows() {
            return Err(ArtifactError::Misaligned {
                movies: movies.len(),
                vectors: matrix.rows(),
            });
        }

        std::fs::create_dir_all(&self.dir)?;

        let movies_tmp = self.movies_path().with_extension("csv.tmp");
        let vectors_tmp = self.vectors_path().with_extension("bin.tmp");

        let staged = self
            .write_corpus(&movies_tmp, movies)
            .and_then(|_| self.write_vectors(&vectors_tmp, matrix, model_id));

        if let Err(err) = staged {
            let _ = std::fs::remove_file(&movies_tmp);
            let _ = std::fs::remove_file(&vectors_tmp);
            return Err(err);
        }

        std::fs::rename(&movies_tmp, self.movies_path())?;
        std::fs::rename(&vectors_tmp, self.vectors_path())?;

        log::info!(
            "published artifact: {} movies, {}-dim vectors",
            movies.len(),
            matrix.dimensions()
        );

        Ok(())
    }

    /// Load the pair, validating vector header integrity, model identity,
    /// dimensions, and corpus/matrix alignment.
    pub fn load(
        &self,
        expected_model_id: &[u8; 32],
        expected_dimensions: usize,
    ) -> Result<(Vec<Movie>, EmbeddingMatrix), ArtifactError> {
        let movies = self.read_corpus(&self.movies_path())?;
        let matrix = self.read_vectors(&self.vectors_path(), expected_model_id, expected_dimensions)?;

        if movies.len() != matrix.rows() {
            return Err(ArtifactError::Misaligned {
                movies: movies.len(),
                vectors: matrix.rows(),
            });
        }

        Ok((movies, matrix))
    }

    fn write_corpus(&self, path: &Path, movies: &[Movie]) -> Result<(), ArtifactError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(CSV_HEADERS)?;

        for movie in movies {
            writer.write_record([
                &movie.id.to_string(),
                &movie.title,
                &movie.genres.join(LIST_SEPARATOR),
                &movie.keywords.join(LIST_SEPARATOR),
                &movie.overview,
                &movie.release_date,
                &movie.vote_average.to_string(),
                &movie.runtime.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    fn read_corpus(&self, path: &Path) -> Result<Vec<Movie>, ArtifactError> {
        let mut reader = csv::Reader::from_path(path)?;

        let mut movies = vec![];
        for record in reader.records() {
            let record = record?;

            let field = |idx: usize, name: &str| -> Result<String, ArtifactError> {
                record
                    .get(idx)
                    .map(|value| value.to_string())
                    .ok_or_else(|| ArtifactError::InvalidCorpus(format!("missing {name} column")))
            };

            let id = field(0, "id")?
                .parse::<u64>()
                .map_err(|e| ArtifactError::InvalidCorpus(format!("bad id: {e}")))?;
            let title = field(1, "title")?;
            let genres = split_list(&field(2, "genres")?);
            let keywords = split_list(&field(3, "keywords")?);
            let overview = field(4, "overview")?;
            let release_date = field(5, "release_date")?;
            let vote_average = field(6, "vote_average")?
                .parse::<f32>()
                .map_err(|e| ArtifactError::InvalidCorpus(format!("bad vote_average: {e}")))?;
            let runtime = field(7, "runtime")?
                .parse::<u32>()
                .map_err(|e| ArtifactError::InvalidCorpus(format!("bad runtime: {e}")))?;

            movies.push(Movie {
                id,
                title,
                overview,
                genres,
                keywords,
                release_date,
                vote_average,
                runtime,
            });
        }

        Ok(movies)
    }

    fn write_vectors(
        &self,
        path: &Path,
        matrix: &EmbeddingMatrix,
        model_id: &[u8; 32],
    ) -> Result<(), ArtifactError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = Header {
            version: FORMAT_VERSION,
            model_id: *model_id,
            dimensions: matrix.dimensions() as u16,
            row_count: matrix.rows() as u64,
            checksum: 0, // Will be computed
        };
        write_header(&mut writer, &header)?;

        for row in matrix.iter_rows() {
            for &value in row {
                writer.write_all(&value.to_le_bytes())?;
            }
        }

        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        file.sync_all()?;

        Ok(())
    }

    fn read_vectors(
        &self,
        path: &Path,
        expected_model_id: &[u8; 32],
        expected_dimensions: usize,
    ) -> Result<EmbeddingMatrix, ArtifactError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let header = read_header(&mut reader)?;
        log::debug!(
            "vector file v{} with {} rows",
            header.version,
            header.row_count
        );

        if header.model_id != *expected_model_id {
            return Err(ArtifactError::ModelMismatch);
        }
        if header.dimensions as usize != expected_dimensions {
            return Err(ArtifactError::DimensionMismatch {
                expected: expected_dimensions,
                got: header.dimensions as usize,
            });
        }

        let dimensions = header.dimensions as usize;
        let mut matrix = EmbeddingMatrix::new(dimensions);
        let mut row_bytes = vec![0u8; dimensions * 4];
        let mut row = vec![0f32; dimensions];

        for _ in 0..header.row_count {
            reader.read_exact(&mut row_bytes)?;
            for (i, chunk) in row_bytes.chunks_exact(4).enumerate() {
                row[i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            }
            matrix
                .push_row(&row)
                .map_err(|_| ArtifactError::DimensionMismatch {
                    expected: expected_dimensions,
                    got: row.len(),
                })?;
        }

        Ok(matrix)
    }
}

fn split_list(cell: &str) -> Vec<String> {
    cell.split(LIST_SEPARATOR)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
        .collect()
}

/// File header structure.
#[derive(Debug)]
struct Header {
    version: u8,
    model_id: [u8; 32],
    dimensions: u16,
    row_count: u64,
    checksum: u32,
}

fn write_header(writer: &mut BufWriter<File>, header: &Header) -> Result<(), ArtifactError> {
    let mut header_bytes = [0u8; HEADER_SIZE];

    header_bytes[0] = header.version;
    header_bytes[1..33].copy_from_slice(&header.model_id);
    header_bytes[33..35].copy_from_slice(&header.dimensions.to_le_bytes());
    header_bytes[35..43].copy_from_slice(&header.row_count.to_le_bytes());

    let checksum = crc32fast::hash(&header_bytes[0..43]);
    header_bytes[43..47].copy_from_slice(&checksum.to_le_bytes());

    writer.write_all(&header_bytes)?;
    Ok(())
}

fn read_header(reader: &mut BufReader<File>) -> Result<Header, ArtifactError> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;

    let version = header_bytes[0];

    // Version check first
    if version > FORMAT_VERSION {
        return Err(ArtifactError::VersionMismatch(version, FORMAT_VERSION));
    }

    let mut model_id = [0u8; 32];
    model_id.copy_from_slice(&header_bytes[1..33]);

    let dimensions = u16::from_le_bytes([header_bytes[33], header_bytes[34]]);

    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&header_bytes[35..43]);
    let row_count = u64::from_le_bytes(count_bytes);

    let mut checksum_bytes = [0u8; 4];
    checksum_bytes.copy_from_slice(&header_bytes[43..47]);
    let stored_checksum = u32::from_le_bytes(checksum_bytes);

    // Verify checksum (computed over header without checksum field)
    let computed_checksum = crc32fast::hash(&header_bytes[0..43]);
    if stored_checksum != computed_checksum {
        return Err(ArtifactError::ChecksumMismatch);
    }

    Ok(Header {
        version,
        model_id,
        dimensions,
        row_count,
        checksum: stored_checksum,
    })
}
