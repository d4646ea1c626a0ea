use crate::error::{Error, Result};
use crate::logging::LogState;
use crate::models::Track;
use plist::{Dictionary, Value};
use std::path::Path;
use urlencoding::decode;

/// Reads the tracks of an iTunes / Apple Music `Library.xml`.
pub fn parse_library<P: AsRef<Path>>(path: P, log: &LogState) -> Result<Vec<Track>> {
    let value = Value::from_file(path)?;

    let root_dict = value
        .as_dictionary()
        .ok_or_else(|| Error::Library("Root is not a dictionary".to_string()))?;
    let tracks_dict = root_dict
        .get("Tracks")
        .ok_or_else(|| Error::Library("No Tracks key".to_string()))?
        .as_dictionary()
        .ok_or_else(|| Error::Library("Tracks is not a dictionary".to_string()))?;

    let mut tracks = Vec::new();

    for (key, track_value) in tracks_dict {
        let Some(track_info) = track_value.as_dictionary() else {
            log.warn(&format!("Skipping library entry {}: not a dictionary", key));
            continue;
        };

        // Skip remote/streamed tracks
        if let Some(type_str) = string_field(track_info, "Track Type") {
            if type_str == "Remote" || type_str == "Stream" {
                log.debug(&format!("Skipping {} track {}", type_str.to_lowercase(), key));
                continue;
            }
        }

        let file_path = track_info
            .get("Location")
            .and_then(|v| v.as_string())
            .map(decode_location)
            .unwrap_or_default();

        // Simple format detection from extension
        let format = file_path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());

        tracks.push(Track {
            id: track_info
                .get("Track ID")
                .and_then(|v| v.as_signed_integer())
                .unwrap_or(0),
            file_path,
            artist: string_field(track_info, "Artist"),
            title: string_field(track_info, "Name"),
            album: string_field(track_info, "Album"),
            genre: string_field(track_info, "Genre"),
            format,
        });
    }

    Ok(tracks)
}

fn string_field(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key).and_then(|v| v.as_string()).map(|s| s.to_string())
}

fn decode_location(location: &str) -> String {
    // iTunes Location is file://localhost/Users/...
    let decoded = decode(location)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| location.to_string());
    decoded
        .replace("file://localhost", "")
        .replace("file://", "")
}
