use thiserror::Error;

/// Errors produced while decoding bencode. Offsets are byte positions in the
/// input slice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BencodeError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),

    #[error("invalid integer at offset {offset}: {reason}")]
    InvalidInteger { offset: usize, reason: &'static str },

    #[error("invalid string length at offset {0}")]
    InvalidStringLength(usize),

    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { offset: usize, ch: char },

    #[error("dictionary key at offset {0} is not a byte string")]
    NonStringKey(usize),

    #[error("duplicate dictionary key at offset {0}")]
    DuplicateKey(usize),

    #[error("dictionary key at offset {0} is out of order")]
    UnsortedKey(usize),

    #[error("trailing data after value at offset {0}")]
    TrailingData(usize),

    #[error("nesting too deep at offset {0}")]
    NestingTooDeep(usize),
}

impl BencodeError {
    /// Byte offset in the input where decoding failed.
    pub fn offset(&self) -> usize {
        match *self {
            BencodeError::UnexpectedEof(offset)
            | BencodeError::InvalidStringLength(offset)
            | BencodeError::NonStringKey(offset)
            | BencodeError::DuplicateKey(offset)
            | BencodeError::UnsortedKey(offset)
            | BencodeError::TrailingData(offset)
            | BencodeError::NestingTooDeep(offset) => offset,
            BencodeError::InvalidInteger { offset, .. }
            | BencodeError::UnexpectedChar { offset, .. } => offset,
        }
    }
}
