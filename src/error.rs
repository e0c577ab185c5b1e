use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot open {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },

    #[error("not a valid tile store: {0}")]
    Schema(String),

    #[error("missing {0}")]
    NotFound(String),

    #[error("tile {zoom}/{column}/{row} already exists")]
    Conflict { zoom: u8, column: u32, row: u32 },

    #[error("image {0} already exists")]
    ImageConflict(i64),

    #[error("store has {stored} as finest level, not {requested}")]
    LevelMismatch { stored: u8, requested: u8 },

    #[error("no raster source supplied, base level tiles remain unbuilt")]
    MissingSource,

    #[error("unsupported raster: {0}")]
    UnsupportedFormat(String),

    #[error("projection error: {0}")]
    Projection(String),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Whether a SQLite failure is a UNIQUE/PRIMARY KEY violation.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
