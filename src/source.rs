use crate::config::{Settings, SourceKind};
use crate::db::Database;
use crate::error::Result;
use crate::library_parser::parse_library;
use crate::logging::LogState;
use crate::metadata::scan_directory;
use crate::models::Track;
use std::path::PathBuf;

/// A library store that can hand over its tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    Beets(PathBuf),
    AppleXml(PathBuf),
    Directory(PathBuf),
}

impl LibrarySource {
    pub fn from_settings(settings: &Settings) -> Self {
        let path = settings.library.clone();
        match settings.source {
            SourceKind::Beets => LibrarySource::Beets(path),
            SourceKind::AppleXml => LibrarySource::AppleXml(path),
            SourceKind::Directory => LibrarySource::Directory(path),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            LibrarySource::Beets(p) => format!("beets library {}", p.display()),
            LibrarySource::AppleXml(p) => format!("Apple Music library {}", p.display()),
            LibrarySource::Directory(p) => format!("audio files under {}", p.display()),
        }
    }

    pub fn load_tracks(&self, log: &LogState) -> Result<Vec<Track>> {
        log.info(&format!("Loading tracks from {}", self.describe()));
        let tracks = match self {
            LibrarySource::Beets(path) => Database::open(path)?.get_all_tracks()?,
            LibrarySource::AppleXml(path) => parse_library(path, log)?,
            LibrarySource::Directory(path) => scan_directory(path, log)?,
        };

        let untagged = tracks
            .iter()
            .filter(|t| t.genre.as_deref().map_or(true, str::is_empty))
            .inspect(|t| log.debug(&format!("No genre: {}", t.describe())))
            .count();
        log.info(&format!(
            "Loaded {} tracks ({} without a genre)",
            tracks.len(),
            untagged
        ));
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::create_beets_library;
    use tempfile::TempDir;

    #[test]
    fn loads_beets_tracks_and_counts_untagged() {
        let dir = TempDir::new().unwrap();
        let path = create_beets_library(&dir, &[Some("Rock"), Some(""), None]);
        let log = LogState::new();

        let tracks = LibrarySource::Beets(path).load_tracks(&log).unwrap();

        assert_eq!(tracks.len(), 3);
        assert!(log
            .entries()
            .iter()
            .any(|e| e.message == "Loaded 3 tracks (2 without a genre)"));
    }

    #[test]
    fn missing_library_propagates_error() {
        let dir = TempDir::new().unwrap();
        let source = LibrarySource::AppleXml(dir.path().join("Library.xml"));
        assert!(source.load_tracks(&LogState::new()).is_err());
    }
}
