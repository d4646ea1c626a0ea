use crate::error::{Error, Result};
use crate::models::Track;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

const ITEMS_QUERY: &str = "SELECT id, path, artist, title, album, genre, format FROM items ORDER BY id";

/// Read-only handle on a beets `library.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Library(format!(
                "beets library not found at {}",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let has_items: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'items')",
            [],
            |row| row.get(0),
        )?;
        if !has_items {
            return Err(Error::Library(format!(
                "{} has no items table; is it a beets library?",
                path.display()
            )));
        }

        Ok(Self { conn })
    }

    pub fn get_all_tracks(&self) -> Result<Vec<Track>> {
        let mut stmt = self.conn.prepare(ITEMS_QUERY)?;

        let track_iter = stmt.query_map([], |row| {
            Ok(Track {
                id: row.get(0)?,
                file_path: path_text(row.get_ref(1)?),
                artist: row.get(2)?,
                title: row.get(3)?,
                album: row.get(4)?,
                genre: row.get(5)?,
                format: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            })
        })?;

        let mut tracks = Vec::new();
        for track in track_iter {
            tracks.push(track?);
        }
        Ok(tracks)
    }
}

/// beets writes paths as raw bytes, but older libraries hold some as TEXT.
fn path_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        _ => String::new(),
    }
}

/// Where beets keeps its library: `$BEETSDIR/library.db`, else
/// `~/.config/beets/library.db`.
pub fn default_beets_library() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("BEETSDIR") {
        return Some(PathBuf::from(dir).join("library.db"));
    }
    dirs::home_dir().map(|home| home.join(".config").join("beets").join("library.db"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rusqlite::params;
    use tempfile::TempDir;

    /// A cut-down beets schema with just the columns we read.
    pub(crate) fn create_beets_library(dir: &TempDir, genres: &[Option<&str>]) -> PathBuf {
        let path = dir.path().join("library.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE items (
                id INTEGER PRIMARY KEY,
                path BLOB,
                artist TEXT,
                title TEXT,
                album TEXT,
                genre TEXT,
                format TEXT
            );",
        )
        .unwrap();
        for (i, genre) in genres.iter().enumerate() {
            let file = format!("/music/track{:02}.flac", i + 1);
            conn.execute(
                "INSERT INTO items (path, artist, title, album, genre, format)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    file.as_bytes(),
                    "Artist",
                    format!("Track {}", i + 1),
                    "Album",
                    genre,
                    "FLAC"
                ],
            )
            .unwrap();
        }
        path
    }

    #[test]
    fn reads_items_in_id_order() {
        let dir = TempDir::new().unwrap();
        let path = create_beets_library(&dir, &[Some("Rock"), None, Some("Jazz,Blues")]);

        let db = Database::open(&path).unwrap();
        let tracks = db.get_all_tracks().unwrap();

        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].file_path, "/music/track01.flac");
        assert_eq!(tracks[0].genre.as_deref(), Some("Rock"));
        assert_eq!(tracks[1].genre, None);
        assert_eq!(tracks[2].genre.as_deref(), Some("Jazz,Blues"));
        assert_eq!(tracks[2].format, "FLAC");
    }

    #[test]
    fn text_paths_from_older_libraries_are_read() {
        let dir = TempDir::new().unwrap();
        let path = create_beets_library(&dir, &[Some("Rock")]);
        Connection::open(&path)
            .unwrap()
            .execute(
                "INSERT INTO items (path, genre) VALUES ('/music/old.mp3', 'Jazz')",
                [],
            )
            .unwrap();

        let tracks = Database::open(&path).unwrap().get_all_tracks().unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].file_path, "/music/old.mp3");
        assert_eq!(tracks[1].genre.as_deref(), Some("Jazz"));
        assert_eq!(tracks[1].format, "");
    }

    #[test]
    fn null_path_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = create_beets_library(&dir, &[]);
        Connection::open(&path)
            .unwrap()
            .execute("INSERT INTO items (genre) VALUES ('Pop')", [])
            .unwrap();

        let tracks = Database::open(&path).unwrap().get_all_tracks().unwrap();
        assert_eq!(tracks[0].file_path, "");
    }

    #[test]
    fn missing_file_is_a_library_error() {
        let dir = TempDir::new().unwrap();
        let err = Database::open(dir.path().join("nope.db")).err().unwrap();
        assert!(matches!(err, Error::Library(_)));
    }

    #[test]
    fn database_without_items_table_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE tracks (id INTEGER PRIMARY KEY);")
            .unwrap();

        let err = Database::open(&path).err().unwrap();
        assert!(err.to_string().contains("no items table"));
    }
}
