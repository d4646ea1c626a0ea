use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading configuration or a music library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Library XML error: {0}")]
    Plist(#[from] plist::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The library exists but its contents are not what we expect.
    #[error("Library error: {0}")]
    Library(String),
}
