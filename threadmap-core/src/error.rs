//! Error types for the mapper

use thiserror::Error;

/// Errors that can occur while constructing or running a mapper.
///
/// A read that does not map is not an error; it comes back as an
/// unmapped [`Alignment`](crate::Alignment).
#[derive(Debug, Error)]
pub enum MapError {
    #[error("the index ({index}) does not include kmers")]
    NoKmerSizes { index: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure reported by the index or the graph aligner.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl MapError {
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig(message.into())
    }
}

pub type MapResult<T> = Result<T, MapError>;
