//! Error types for docfill library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, rendering or saving templates.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The template identifier did not resolve to a readable template.
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// A free-text document type has no template mapping.
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    /// The container is not a valid OOXML package.
    #[error("Invalid document package: {0}")]
    InvalidPackage(String),

    /// A required package part is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Malformed XML inside a package part.
    #[error("XML error: {0}")]
    Xml(String),

    /// The structured record could not be parsed.
    #[error("Record error: {0}")]
    Record(String),

    /// Error during rendering or serialization.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::MissingPart("archive entry not found".to_string())
            }
            _ => Error::InvalidPackage(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Record(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Record(err.to_string())
    }
}
