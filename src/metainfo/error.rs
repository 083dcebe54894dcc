use std::path::PathBuf;

use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when building or reading a torrent descriptor.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The piece length is zero or does not fit the on-disk integer type.
    #[error("invalid piece length: {0}")]
    InvalidPieceLength(u64),

    /// Nothing is left to describe once inputs are resolved and filtered.
    #[error("no files to include in the torrent")]
    NoFiles,

    /// A supplied input path does not exist.
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    /// A path cannot be expressed relative to the torrent root.
    #[error("path cannot be placed in the torrent: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Reading an input file failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file's size changed between enumeration and hashing.
    #[error("{} changed while hashing: expected {expected} bytes, read {actual}", .path.display())]
    LengthMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// The descriptor contains invalid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing from the descriptor.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has an invalid value or type.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
}

/// Coarse classification of [`MetainfoError`] for callers that report by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Path,
    Io,
    Format,
}

impl MetainfoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MetainfoError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MetainfoError::InvalidPieceLength(_) | MetainfoError::NoFiles => {
                ErrorKind::Configuration
            }
            MetainfoError::PathNotFound(_) | MetainfoError::InvalidPath(_) => ErrorKind::Path,
            MetainfoError::Io { .. } | MetainfoError::LengthMismatch { .. } => ErrorKind::Io,
            MetainfoError::Bencode(_)
            | MetainfoError::MissingField(_)
            | MetainfoError::InvalidField(_) => ErrorKind::Format,
        }
    }
}
