use thiserror::Error;

/// Alias for `Result<T, tagscan::Error>`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while opening or reading a tag
///
/// Malformed tag content never produces an error. Bad frames and packets are
/// skipped and the tag is returned with whatever could be read.
#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be opened, sized or read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// No decoder recognizes the file
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
