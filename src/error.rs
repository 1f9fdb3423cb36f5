use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors: any of these aborts the run before the database is written.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("database marker {0:?} not found")]
    MarkerNotFound(String),
    #[error("no closing brace after the database marker")]
    UnterminatedLiteral,
    #[error("database literal is not valid JSON: {0}")]
    InvalidDatabase(#[source] serde_json::Error),
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single offence line produced no record. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("header or blank line")]
    NotData,
    #[error("expected at least 7 tokens, found {0}")]
    TooFewTokens(usize),
    #[error("class flag {0:?} is not one of B, C, D")]
    ClassFlag(String),
    #[error("points column {0:?} is not an integer")]
    Points(String),
    #[error("points value {0} is outside 0-5")]
    PointsOutOfRange(String),
    #[error("{column} column {token:?} is not {width} digits")]
    ColumnShape {
        column: &'static str,
        token: String,
        width: usize,
    },
    #[error("no tokens left for the offence code")]
    EmptyHead,
    #[error("{0:?} is not an act prefix")]
    ActPrefix(String),
}
