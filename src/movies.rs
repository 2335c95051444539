use serde::{Deserialize, Serialize};

/// A cleaned catalog record.
///
/// Built once by the offline corpus build and loaded read-only afterwards.
/// The position of a movie inside the corpus is significant: row *i* of the
/// embedding matrix is the vector for `corpus[i].semantic_text()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,

    pub title: String,
    pub overview: String,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,

    /// Raw release date as shipped by the dataset, e.g. "2009-12-10".
    pub release_date: String,
    pub vote_average: f32,
    /// Runtime in minutes, 0 when the dataset has none.
    pub runtime: u32,
}

impl Movie {
    /// Render the text the embedding model sees for this movie.
    ///
    /// The template is part of the artifact contract: probes are only
    /// comparable with vectors built from this exact rendering, so changing
    /// it requires a full rebuild.
    pub fn semantic_text(&self) -> String {
        format!(
            "Title: {}. Genre: {}. Plot: {}",
            self.title,
            self.genres.join(" "),
            self.overview
        )
    }

    /// Parse the release year from the first hyphen-delimited segment of
    /// the release date. Returns `None` for absent or malformed dates.
    pub fn release_year(&self) -> Option<u16> {
        self.release_date.split('-').next()?.trim().parse().ok()
    }

    /// Display form of the release year, `"unknown"` when unparsable.
    pub fn year_label(&self) -> String {
        self.release_year()
            .map(|year| year.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
