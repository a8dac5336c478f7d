//! Resource lookup over an ordered list of directories.
//!
//! Grammar manifests, component manifests and other data files are found
//! by name: the first directory that contains the name wins.

use std::fs;
use std::path::{Path, PathBuf};

use umbra_core::logging::targets;

use super::error::FileError;
use crate::error::ResourceError;

/// Resolves resource names against directories, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ResourceResolver {
    directories: Vec<PathBuf>,
}

impl ResourceResolver {
    /// Creates a resolver without directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver over `directories`.
    pub fn with_directories<I, P>(directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a directory, returning whether it was not registered yet.
    pub fn add_directory(&mut self, directory: impl Into<PathBuf>) -> bool {
        let directory = directory.into();
        if self.directories.contains(&directory) {
            return false;
        }
        self.directories.push(directory);
        true
    }

    /// Removes a directory, returning whether it was registered.
    pub fn remove_directory(&mut self, directory: &Path) -> bool {
        let before = self.directories.len();
        self.directories.retain(|d| d != directory);
        self.directories.len() != before
    }

    /// Registered directories, in lookup order.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// The first existing file named `name`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ResourceError> {
        let found = self
            .directories
            .iter()
            .map(|directory| directory.join(name))
            .find(|candidate| candidate.is_file());
        match found {
            Some(path) => {
                tracing::trace!(target: targets::SETTINGS, name, path = %path.display(), "resolved resource");
                Ok(path)
            }
            None => Err(ResourceError::NotFound(name.to_string())),
        }
    }

    /// Every file whose extension is `extension`, across all directories.
    pub fn list(&self, extension: &str) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .directories
            .iter()
            .filter_map(|directory| fs::read_dir(directory).ok())
            .flat_map(|entries| entries.filter_map(Result::ok))
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == extension))
            .collect();
        files.sort();
        files
    }

    /// Reads the resource `name` as text.
    pub fn load_text(&self, name: &str) -> Result<String, ResourceError> {
        let path = self.resolve(name)?;
        fs::read_to_string(&path).map_err(|e| ResourceError::Read(FileError::from_io(e, path)))
    }
}
