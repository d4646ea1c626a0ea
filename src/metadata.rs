use crate::error::{Error, Result};
use crate::logging::LogState;
use crate::models::Track;
use lofty::prelude::*;
use lofty::read_from_path;
use lofty::tag::ItemKey;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "wav", "aiff", "ogg", "opus", "m4a"];

/// Reads the genre tag of one audio file.
///
/// Several genre frames are joined with `,`, the same shape beets and
/// Apple Music use for multi-genre tags. Returns `None` when the file has no
/// tag or no genre.
pub fn read_genre<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    let path = path.as_ref();
    let tagged_file = read_from_path(path).map_err(|e| {
        Error::Library(format!("Failed to read tags from {}: {}", path.display(), e))
    })?;
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let genres: Vec<&str> = tag
        .map(|t| t.get_strings(&ItemKey::Genre).collect())
        .unwrap_or_default();

    if genres.is_empty() {
        Ok(None)
    } else {
        Ok(Some(genres.join(",")))
    }
}

/// Recursively collect all audio file paths under `dir`, sorted by name.
pub fn scan_audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Library(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Library(format!("Failed to walk {}: {}", dir.display(), e)))?;
        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_audio_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    AUDIO_EXTENSIONS.contains(&ext.as_str())
}

/// Builds a track list from the audio files under `dir`. Files lofty cannot
/// read are logged and left out.
pub fn scan_directory(dir: &Path, log: &LogState) -> Result<Vec<Track>> {
    let files = scan_audio_files(dir)?;
    log.info(&format!("Found {} audio files in {}", files.len(), dir.display()));

    let mut tracks = Vec::with_capacity(files.len());
    for path in files {
        let genre = match read_genre(&path) {
            Ok(genre) => genre,
            Err(e) => {
                log.warn(&format!("Skipping {}", e));
                continue;
            }
        };
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_lowercase();
        tracks.push(Track {
            id: 0,
            file_path: path.to_string_lossy().to_string(),
            title: path.file_stem().map(|s| s.to_string_lossy().to_string()),
            genre,
            format,
            ..Default::default()
        });
    }
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_fake_library(dir: &TempDir) {
        let album = dir.path().join("Portishead").join("Dummy");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("01 - Mysterons.flac"), b"FAKE").unwrap();
        fs::write(album.join("02 - Sour Times.MP3"), b"FAKE").unwrap();
        fs::write(album.join("cover.jpg"), b"FAKE").unwrap();
        fs::write(dir.path().join("notes.txt"), b"FAKE").unwrap();
    }

    #[test]
    fn scan_finds_only_audio_files() {
        let tmp = TempDir::new().unwrap();
        create_fake_library(&tmp);
        let files = scan_audio_files(tmp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("01 - Mysterons.flac"));
    }

    #[test]
    fn scan_rejects_a_plain_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.flac");
        fs::write(&file, b"FAKE").unwrap();
        assert!(matches!(scan_audio_files(&file), Err(Error::Library(_))));
    }

    #[test]
    fn unreadable_file_is_a_library_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("broken.flac");
        fs::write(&file, b"FAKE").unwrap();

        let err = read_genre(&file).unwrap_err();

        assert!(matches!(err, Error::Library(_)));
        assert!(err.to_string().contains("broken.flac"));
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        create_fake_library(&tmp);
        let log = LogState::new();

        let tracks = scan_directory(tmp.path(), &log).unwrap();

        let warnings = log
            .entries()
            .into_iter()
            .filter(|e| e.level == "WARN")
            .count();
        assert_eq!(tracks.len() + warnings, 2);
        assert!(tracks.iter().all(|t| t.genre.is_none()));
    }
}
