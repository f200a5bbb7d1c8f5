// Error types for Ogg Opus parsing, CAF encoding/decoding and conversion

use std::path::PathBuf;
use thiserror::Error;

/// Result type for opuscaf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Identification header validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// First page does not start with "OggS"
    #[error("bad capture pattern: expected \"OggS\", got {0:?}")]
    BadCapturePattern([u8; 4]),

    /// Ogg stream structure version other than 0
    #[error("unsupported Ogg version: {0}")]
    BadVersion(u8),

    /// First page is missing the beginning-of-stream flag
    #[error("first page is not a beginning-of-stream page (header type {0:#04x})")]
    NotBeginningOfStream(u8),

    /// Identification page must hold exactly one segment
    #[error("identification page has {0} segments, expected 1")]
    BadSegmentCount(usize),

    /// Identification payload must be 19 bytes
    #[error("identification payload is {0} bytes, expected 19")]
    BadPayloadLength(usize),

    /// Identification payload does not start with "OpusHead"
    #[error("identification payload signature is not \"OpusHead\"")]
    BadPayloadSignature,
}

/// opuscaf error types
#[derive(Error, Debug)]
pub enum Error {
    /// Input could not be opened
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error while reading the input stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Identification header is malformed
    #[error("invalid identification header: {0}")]
    InvalidHeader(#[from] HeaderError),

    /// Any failure while reading the identification header during conversion
    #[error("failed to read Ogg Opus header: {0}")]
    HeaderRead(#[source] Box<Error>),

    /// Stream ended inside a page header or payload
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// Output could not be created or written
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Segments need more lacing values than one page can carry
    #[error("page needs {0} lacing values, at most 255 fit")]
    PageOverflow(usize),

    /// CAF buffer ended before a complete structure could be read
    #[error("insufficient data: need {needed} bytes, {available} available")]
    InsufficientData { needed: usize, available: usize },

    /// CAF file header magic is not "caff"
    #[error("invalid CAF file type: {0:?}")]
    InvalidFileType([u8; 4]),

    /// Info string is not NUL-terminated UTF-8
    #[error("invalid info string: {0}")]
    InvalidString(String),

    /// Chunk body does not match its declared layout
    #[error("malformed '{}' chunk: {reason}", String::from_utf8_lossy(.chunk_type))]
    MalformedChunk { chunk_type: [u8; 4], reason: String },

    /// Conversion options could not be parsed
    #[error("invalid conversion options: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is the short-read condition, looking through header wrapping
    pub fn is_short_read(&self) -> bool {
        match self {
            Error::ShortRead { .. } => true,
            Error::HeaderRead(inner) => inner.is_short_read(),
            _ => false,
        }
    }
}
