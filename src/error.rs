use crate::symbol::Symbol;
use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The persisted frequency table or payload cannot be decoded.
    #[error("malformed stream: {reason}")]
    MalformedStream { reason: String },

    /// The bitstream ended before the end-of-stream marker was decoded.
    #[error("bitstream ended at bit {bit_position} before the end-of-stream marker")]
    Truncated { bit_position: u64 },

    /// A byte reached the encoder without a code assigned to it.
    #[error("no code assigned to symbol {symbol}")]
    InternalConsistency { symbol: Symbol },

    #[error("cannot build an encoding tree from an empty frequency table")]
    EmptyTree,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedStream {
            reason: reason.into(),
        }
    }

    /// True for every error caused by bad compressed input.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedStream { .. } | Error::Truncated { .. })
    }
}
