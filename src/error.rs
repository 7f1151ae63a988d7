//! error module provides the error type shared by every fallible entry
//! point of the crate.

use std::fmt;
use std::fmt::{Display, Formatter};

/// Result returned by all fallible quiver functions.
pub type Result<T> = std::result::Result<T, Error>;

/// The failure categories the engine can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The decoded input is not usable as a record.
    ///
    /// This error is returned when the top-level value handed to a
    /// unify call is not a struct, cannot be decoded, or nests deeper
    /// than the walker's recursion bound.
    InvalidInput,
    /// The input value was null where a record was required.
    UndefinedInput,
    /// The mount path given to a path-scoped unify call does not exist
    /// in the cumulative tree, or exists but is not a concrete struct.
    PathNotFound,
    /// The configured cap on accepted unifications has been reached.
    ///
    /// Further unify calls fail with this kind until the cap is reset.
    MaxCountExceeded,
    /// A per-record schema was requested before any record had been
    /// accepted.
    NoLatestSchema,
    /// A type promotion was requested for a source type outside the
    /// upgradable set.
    ///
    /// Produced and swallowed inside the merge; public APIs never
    /// return it.
    NotUpgradable,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::UndefinedInput => "UndefinedInput",
            ErrorKind::PathNotFound => "PathNotFound",
            ErrorKind::MaxCountExceeded => "MaxCountExceeded",
            ErrorKind::NoLatestSchema => "NoLatestSchema",
            ErrorKind::NotUpgradable => "NotUpgradable",
        };
        f.write_str(name)
    }
}

/// The error returned by quiver operations.
///
/// An error is a kind plus a short message. When the failure concerns a
/// node of the schema tree it also names the dotted path, and when a
/// lower-level error triggered it (a JSON decode failure, say) that
/// error rides along as the source.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    path: Option<String>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Name the dotted path the failure concerns.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach the lower-level error that triggered this one.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "error source already attached");

        self.source = Some(source.into());
        self
    }

    /// The kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The dotted path the failure concerns, if it names one.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (at {path})")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref())
    }
}

impl From<serde_json::Error> for Error {
    fn from(v: serde_json::Error) -> Self {
        Self::new(ErrorKind::InvalidInput, "decoding json record failed").with_source(v)
    }
}
