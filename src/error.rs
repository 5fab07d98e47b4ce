//! Error types for letterhead.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for letterhead operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which input file an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Template,
    Source,
    Config,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputRole::Template => "template",
            InputRole::Source => "source",
            InputRole::Config => "config",
        };
        f.write_str(name)
    }
}

/// Errors that abort a conversion. Nothing is written to the output path
/// when any of these is returned.
#[derive(Error, Debug)]
pub enum Error {
    /// An input path does not exist.
    #[error("{role} file not found: {}", path.display())]
    InputNotFound { role: InputRole, path: PathBuf },

    /// An input path exists but could not be read (permissions, not UTF-8, ...).
    #[error("could not read {role} file {}: {source}", path.display())]
    InputRead {
        role: InputRole,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The letterhead template is not a usable Word document.
    #[error("invalid template {}: {reason}", path.display())]
    InvalidTemplate { path: PathBuf, reason: String },

    /// The destination could not be written.
    #[error("could not write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A required letter field is empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Style configuration failed to parse or validate.
    #[error("configuration error: {0}")]
    Config(String),

    /// XML could not be generated.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error outside of reading inputs or writing the output file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid_template(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidTemplate {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Map an I/O failure on an input file to the matching error kind.
    pub(crate) fn input(role: InputRole, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::InputNotFound { role, path }
        } else {
            Error::InputRead { role, path, source }
        }
    }
}
