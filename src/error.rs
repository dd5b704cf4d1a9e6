//! Error type shared by every stage of the converter.

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conversion errors.
///
/// Recoverable conditions (missing canvas size, unknown colors, degenerate
/// shapes, empty output) never show up here: they are logged and substituted
/// where they happen so one bad shape cannot abort a whole document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed document at line {line}, column {column}: {message}")]
    MalformedDocument {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("DXF error: {0}")]
    Dxf(#[from] dxf::DxfError),
}
