//! Error types for settings persistence.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for file operations.
#[derive(Debug)]
pub struct FileError {
    kind: FileErrorKind,
    path: Option<PathBuf>,
    source: Option<io::Error>,
}

/// The kind of file error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileErrorKind {
    /// File or directory not found.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// No path to read from or write to.
    InvalidPath,
    /// The content could not be parsed.
    InvalidData,
    /// Any other I/O failure.
    Other,
}

impl FileError {
    /// Creates a new file error.
    pub fn new(kind: FileErrorKind, path: Option<PathBuf>, source: Option<io::Error>) -> Self {
        Self { kind, path, source }
    }

    /// Creates a file error from an I/O error and path.
    pub fn from_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => FileErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => FileErrorKind::PermissionDenied,
            io::ErrorKind::InvalidData => FileErrorKind::InvalidData,
            _ => FileErrorKind::Other,
        };
        Self::new(kind, Some(path.into()), Some(err))
    }

    /// Creates an "invalid data" error for content read from `path`.
    pub fn invalid_data(path: Option<&Path>, message: impl Into<String>) -> Self {
        Self::new(
            FileErrorKind::InvalidData,
            path.map(Path::to_path_buf),
            Some(io::Error::new(io::ErrorKind::InvalidData, message.into())),
        )
    }

    /// Creates an "invalid path" error for a store without a backing file.
    pub fn no_path() -> Self {
        Self::new(FileErrorKind::InvalidPath, None, None)
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> FileErrorKind {
        self.kind
    }

    /// Returns the path involved in the error, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns true if this error indicates the file was not found.
    pub fn is_not_found(&self) -> bool {
        self.kind == FileErrorKind::NotFound
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", self.kind, path.display())?,
            None => write!(f, "{}", self.kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileErrorKind::NotFound => "file not found",
            FileErrorKind::PermissionDenied => "permission denied",
            FileErrorKind::InvalidPath => "no backing file",
            FileErrorKind::InvalidData => "invalid data",
            FileErrorKind::Other => "file error",
        })
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A specialized Result type for file operations.
pub type FileResult<T> = std::result::Result<T, FileError>;
