//! Error types surfaced by dataset loading and source queries.
//!
//! Errors are cloneable: a provider caches its load failure and hands the
//! same error to every later caller.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a product dataset could not be made available.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UnavailableCause {
    /// Nothing exists at the resolved location.
    Missing,
    /// The location exists but could not be read.
    Unreadable(String),
    /// The bytes are not a JSON mapping of source records.
    Malformed(String),
    /// The JSON parsed but violates the sources schema.
    SchemaViolation(String),
}

impl fmt::Display for UnavailableCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableCause::Missing => write!(f, "dataset file not found"),
            UnavailableCause::Unreadable(detail) => write!(f, "unreadable: {detail}"),
            UnavailableCause::Malformed(detail) => write!(f, "malformed: {detail}"),
            UnavailableCause::SchemaViolation(detail) => {
                write!(f, "schema violation: {detail}")
            }
        }
    }
}

#[derive(Clone, Debug, Error)]
pub enum SourceError {
    /// The product's dataset could not be located, read or decoded. Returned
    /// by the first query and cached for every later one.
    #[error("sources for `{product}` unavailable at {}: {cause}", .location.display())]
    DatasetUnavailable {
        product: String,
        location: PathBuf,
        cause: UnavailableCause,
    },
}

impl SourceError {
    /// What went wrong with the dataset.
    pub fn reason(&self) -> &UnavailableCause {
        match self {
            SourceError::DatasetUnavailable { cause, .. } => cause,
        }
    }

    /// Product whose dataset failed.
    pub fn product(&self) -> &str {
        match self {
            SourceError::DatasetUnavailable { product, .. } => product,
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
