//! Error types.

use core::fmt;

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type returned by every fallible operation in this crate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    context: Option<&'static str>,
}

impl Error {
    /// Create a new [`Error`] with no additional context.
    pub const fn new(kind: ErrorKind) -> Self {
        Error {
            kind,
            context: None,
        }
    }

    /// Create a new [`Error`], annotated with a short static description of
    /// where it occurred (e.g. `"encryption failed"`).
    pub const fn with_context(kind: ErrorKind, context: &'static str) -> Self {
        Error {
            kind,
            context: Some(context),
        }
    }

    /// Get the [`ErrorKind`] which occurred.
    pub fn kind(self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(context) = self.context {
            write!(f, ": {context}")?;
        }

        Ok(())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::new(kind)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The five kinds of failure this crate's components can report.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A null/undersized key, IV or salt, a non-positive count, or an input
    /// that fails some other documented length constraint.
    InvalidParameter,

    /// The AES engine was used before `init`, or was asked to process a
    /// block with an inconsistent internal state.
    EngineState,

    /// The input is not a well-formed instance of this crate's DER profile:
    /// wrong tag, truncated length, length overrunning the input, trailing
    /// bytes after the outer `SEQUENCE`, an `INTEGER` payload longer than 4
    /// bytes, or a container version other than `0`.
    MalformedDer,

    /// The CFB encryption or decryption step itself failed (wraps an
    /// underlying [`EngineState`](ErrorKind::EngineState) error).
    CryptoFailure,

    /// The HMAC tag stored in a container did not match the tag computed
    /// over the recovered plaintext.
    IntegrityFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidParameter => write!(f, "invalid parameter"),
            ErrorKind::EngineState => write!(f, "engine used in an invalid state"),
            ErrorKind::MalformedDer => write!(f, "malformed DER"),
            ErrorKind::CryptoFailure => write!(f, "cryptographic operation failed"),
            ErrorKind::IntegrityFailure => write!(f, "HMAC verification failed"),
        }
    }
}
