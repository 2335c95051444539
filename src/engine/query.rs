//! Query construction: mood lexicon and probe assembly.
//!
//! A user query is four optional strings (genre, mood, content, element).
//! `build_probe` folds them into a single natural-language sentence, the
//! only text the embedding model sees on the serving path. The exact
//! wording is the system's one ranking knob; changing it shifts every
//! score, so it stays fixed and documented here.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Closed set of mood keys and their descriptor phrases, in display order.
pub const MOOD_LEXICON: &[(&str, &str)] = &[
    ("Funny", "comedy spoof parody fun"),
    ("Dark", "crime murder noir thriller horror"),
    ("Exciting", "action adventure chase explosion war"),
    ("Emotional", "romance drama love crying wedding"),
    ("Brainy", "mystery puzzle psychology philosophy"),
];

/// Curated genre list offered to callers. Free-form genres are still
/// accepted in queries; this is presentation data, not validation.
pub const GENRE_OPTIONS: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "History",
    "Horror",
    "Music",
    "Mystery",
    "Romance",
    "Science Fiction",
    "Thriller",
    "War",
    "Western",
];

static MOOD_BY_KEY: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| MOOD_LEXICON.iter().copied().collect());

/// Resolve a mood key to its descriptor phrase.
///
/// Unknown keys resolve to the empty string: an unmatched mood degrades
/// the probe instead of failing the request.
pub fn mood_descriptor(key: &str) -> &'static str {
    MOOD_BY_KEY.get(key).copied().unwrap_or("")
}

/// Mood keys in display order.
pub fn mood_keys() -> Vec<&'static str> {
    MOOD_LEXICON.iter().map(|(key, _)| *key).collect()
}

/// Structured user preferences. All fields default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub element: String,
}

/// Assemble the probe sentence for a query.
///
/// Segments are emitted only for non-empty fields and joined with single
/// spaces:
///
/// - `A {genre} movie, {genre}, {genre}.`: the genre appears three times,
///   a fixed weighting heuristic: the model has no term-weighting API, so
///   repetition raises the genre's share of the sentence's meaning.
/// - `Mood: {descriptor}.`: the mood key resolved through the lexicon.
/// - `About: {content}.` and `Featuring: {element}.`: verbatim user text.
///
/// An unknown mood contributes nothing, so its probe is byte-identical to
/// an empty mood. An all-empty query yields the empty string.
pub fn build_probe(query: &UserQuery) -> String {
    let mut parts: Vec<String> = Vec::new();

    let genre = query.genre.trim();
    if !genre.is_empty() {
        parts.push(format!("A {genre} movie, {genre}, {genre}."));
    }

    let descriptor = mood_descriptor(query.mood.trim());
    if !descriptor.is_empty() {
        parts.push(format!("Mood: {descriptor}."));
    }

    let content = query.content.trim();
    if !content.is_empty() {
        parts.push(format!("About: {content}."));
    }

    let element = query.element.trim();
    if !element.is_empty() {
        parts.push(format!("Featuring: {element}."));
    }

    parts.join(" ")
}
