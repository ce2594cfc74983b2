#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// General codec error.
    /// Returned when code violates the normal workflow of the codec, e.g.
    /// constructing an encoder over a buffer with no room for a single run.
    General(String),
    /// When the byte stream is known to be out of spec.
    OutOfSpec(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::General(message) => {
                write!(fmt, "{}", message)
            }
            Error::OutOfSpec(message) => {
                write!(fmt, "{}", message)
            }
        }
    }
}

/// A specialized `Result` for codec errors.
pub type Result<T> = std::result::Result<T, Error>;
