use std::fmt;

use thiserror::Error;

/// Why a persisted value or an import file could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeReason {
    InvalidJson(String),
    NotAnObject,
    GamesNotArray,
    MalformedEntry(usize),
    FieldNotString(&'static str),
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeReason::InvalidJson(msg) => write!(f, "not valid JSON ({})", msg),
            DecodeReason::NotAnObject => write!(f, "root value is not an object"),
            DecodeReason::GamesNotArray => write!(f, "'games' is not an array"),
            DecodeReason::MalformedEntry(index) => {
                write!(f, "game #{} is not an object with text fields", index)
            }
            DecodeReason::FieldNotString(field) => write!(f, "'{}' is not a string", field),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Index {index} out of bounds for list of length {len}")]
    Index { index: usize, len: usize },

    #[error("Invalid settings data: {0}")]
    Decode(DecodeReason),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to open browser: {0}")]
    Browser(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
