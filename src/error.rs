//! Error type shared by every module of the crate.

use thiserror::Error;

/// Errors surfaced by the itinerary search.
///
/// Infeasible moves, exhausted ants and empty genomes are ordinary search
/// outcomes and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid travel table: {0}")]
    InvalidTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
