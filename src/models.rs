use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Track {
    pub id: i64,           // Store ID (0 when the store has none)
    pub file_path: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>, // Comma-separated genre labels, as stored
    pub format: String,
}

impl Track {
    /// "Artist - Title" for log lines, falling back to the file path.
    pub fn describe(&self) -> String {
        match (&self.artist, &self.title) {
            (Some(artist), Some(title)) => format!("{} - {}", artist, title),
            (None, Some(title)) => title.clone(),
            _ => self.file_path.clone(),
        }
    }
}

/// The genre tags of `tracks`, in library order, ready for tallying.
pub fn genre_records(tracks: &[Track]) -> Vec<Option<&str>> {
    tracks.iter().map(|t| t.genre.as_deref()).collect()
}
