//! Configuration loading.
//!
//! Every setting is resolved in the same order:
//! 1. Command-line flag
//! 2. TOML config file
//! 3. Built-in default
//!
//! The config file itself is `--config`, else `$GENRE_DIVERSITY_CONFIG`,
//! else `<config_dir>/genre-diversity/config.toml` when that file exists.

use crate::error::{Error, Result};
use crate::logging::LogState;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "GENRE_DIVERSITY_CONFIG";
pub const DEFAULT_TOP_GENRES: usize = 10;

/// Kind of library store to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// beets `library.db`
    Beets,
    /// iTunes / Apple Music `Library.xml`
    AppleXml,
    /// Folder of tagged audio files
    Directory,
}

/// Contents of the TOML config file. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<SourceKind>,
    pub library: Option<PathBuf>,
    pub top_genres: Option<usize>,
    pub debug: Option<bool>,
    pub file_logging: Option<bool>,
    pub log_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub source: Option<SourceKind>,
    pub library: Option<PathBuf>,
    pub top_genres: Option<usize>,
    pub verbose: bool,
    pub log_dir: Option<PathBuf>,
    pub json: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: SourceKind,
    pub library: PathBuf,
    pub top_genres: usize,
    pub debug: bool,
    pub file_logging: bool,
    pub log_dir: PathBuf,
    pub json: bool,
}

impl Settings {
    /// Load the config file (if any) and merge it with `overrides`.
    pub fn load(overrides: &Overrides, log: &LogState) -> Result<Self> {
        let file_config = match locate_config_file(overrides.config.as_deref())? {
            Some(path) => {
                log.debug(&format!("Reading config from {}", path.display()));
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                FileConfig::from_toml(&content)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(overrides, file_config)
    }

    pub fn resolve(overrides: &Overrides, file: FileConfig) -> Result<Self> {
        let source = overrides.source.or(file.source).unwrap_or(SourceKind::Beets);

        let library = match overrides.library.clone().or(file.library) {
            Some(path) => path,
            None => default_library(source).ok_or_else(|| {
                Error::Config(format!(
                    "No library path given and no default location for {:?}",
                    source
                ))
            })?,
        };

        let top_genres = overrides
            .top_genres
            .or(file.top_genres)
            .unwrap_or(DEFAULT_TOP_GENRES);
        if top_genres == 0 {
            return Err(Error::Config("top_genres must be at least 1".to_string()));
        }

        Ok(Settings {
            source,
            library,
            top_genres,
            debug: overrides.verbose || file.debug.unwrap_or(false),
            file_logging: file.file_logging.unwrap_or(true),
            log_dir: overrides
                .log_dir
                .clone()
                .or(file.log_dir)
                .unwrap_or_else(LogState::default_log_dir),
            json: overrides.json,
        })
    }
}

/// Find the config file to read. A file named explicitly (flag or
/// environment) must exist; the per-user default is optional.
fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    if let Some(path) = named {
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(Error::Config(format!("Config file not found: {}", path.display())));
    }

    Ok(dirs::config_dir()
        .map(|d| d.join("genre-diversity").join("config.toml"))
        .filter(|p| p.is_file()))
}

/// Where each kind of library usually lives.
pub fn default_library(source: SourceKind) -> Option<PathBuf> {
    match source {
        SourceKind::Beets => crate::db::default_beets_library(),
        SourceKind::AppleXml => {
            let home = dirs::home_dir()?;
            let modern = home.join("Music/Music/Library.xml");
            let legacy = home.join("Music/iTunes/iTunes Library.xml");
            if !modern.exists() && legacy.exists() {
                Some(legacy)
            } else {
                Some(modern)
            }
        }
        SourceKind::Directory => dirs::audio_dir().or_else(|| dirs::home_dir().map(|h| h.join("Music"))),
    }
}
