//! Locating and reading data files.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Resolves data file names relative to a base directory.
///
/// Every loader takes a `DataDirectory` so that files referenced from inside
/// other files (e.g. a track's centerline) resolve against the same root.
#[derive(Clone, Debug)]
pub struct DataDirectory {
    root: PathBuf,
}

impl DataDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The base directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a file name. Absolute paths are returned unchanged.
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.root.join(name)
        }
    }

    /// Reads a file into a string.
    pub fn read_to_string(&self, name: impl AsRef<Path>) -> Result<String> {
        let path = self.resolve(name);
        std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })
    }

    /// Reads and deserializes a JSON file.
    pub fn read_json<T: DeserializeOwned>(&self, name: impl AsRef<Path>) -> Result<T> {
        let text = self.read_to_string(&name)?;
        serde_json::from_str(&text).map_err(|source| Error::Json {
            path: self.resolve(name),
            source,
        })
    }

    /// Opens a CSV file with the given header expectation.
    pub fn csv_reader(
        &self,
        name: impl AsRef<Path>,
        has_headers: bool,
    ) -> Result<(PathBuf, csv::Reader<std::fs::File>)> {
        let path = self.resolve(name);
        let reader = csv::ReaderBuilder::new()
            .has_headers(has_headers)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&path)
            .map_err(|source| Error::Csv {
                path: path.clone(),
                source,
            })?;
        Ok((path, reader))
    }
}

impl Default for DataDirectory {
    fn default() -> Self {
        Self::new("data")
    }
}
