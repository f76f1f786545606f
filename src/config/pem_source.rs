// ABOUTME: PEM material referenced from the config file.
// ABOUTME: Either a path to a PEM file or the PEM text inline.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PemSource {
    File(PathBuf),
    Inline { data: String },
}

impl std::fmt::Debug for PemSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PemSource::File(path) => f.debug_tuple("File").field(path).finish(),
            // Inline data may be a private key.
            PemSource::Inline { .. } => f.write_str("Inline(<redacted>)"),
        }
    }
}

impl PemSource {
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            PemSource::File(path) => std::fs::read(path).map_err(|source| Error::ReadFile {
                path: path.clone(),
                source,
            }),
            PemSource::Inline { data } => Ok(data.as_bytes().to_vec()),
        }
    }

    /// Resolve a relative file path against `dir`.
    pub(crate) fn rebase(&mut self, dir: &Path) {
        if let PemSource::File(path) = self {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}
