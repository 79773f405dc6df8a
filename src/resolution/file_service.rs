//! `FileService` (spec §4.3): the filesystem seam every resolver shares.
//! Kept behind a trait so resolution can be tested against in-memory
//! fixtures without touching disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{IndexError, IndexResult};

pub trait FileService: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// Reads and caches file contents; repeated resolution of the same
    /// `package.json`/`composer.json` should not re-hit disk.
    fn load_file(&self, path: &Path) -> IndexResult<String>;
    /// Direct children of a directory (empty if `path` isn't a directory).
    /// Go/C# package-directory resolution needs "first matching file" over
    /// an arbitrary file listing, not a fixed candidate path.
    fn list_dir(&self, path: &Path) -> Vec<PathBuf>;
}

/// Default [`FileService`] backed by `std::fs`, content-cached per path.
#[derive(Default)]
pub struct StdFileService {
    cache: Mutex<HashMap<PathBuf, String>>,
}

impl StdFileService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileService for StdFileService {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn load_file(&self, path: &Path) -> IndexResult<String> {
        if let Some(cached) = self.cache.lock().get(path) {
            return Ok(cached.clone());
        }
        let content = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.cache.lock().insert(path.to_path_buf(), content.clone());
        Ok(content)
    }

    fn list_dir(&self, path: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(path)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect()
    }
}

/// In-memory [`FileService`] for tests: no disk access, fixed file set.
#[cfg(test)]
pub struct MemoryFileService {
    files: HashMap<PathBuf, String>,
}

#[cfg(test)]
impl MemoryFileService {
    pub fn new(files: impl IntoIterator<Item = (PathBuf, String)>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl FileService for MemoryFileService {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.files.keys().any(|p| p.starts_with(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files.keys().any(|p| p != path && p.starts_with(path))
    }

    fn load_file(&self, path: &Path) -> IndexResult<String> {
        self.files.get(path).cloned().ok_or_else(|| IndexError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not in memory fixture"),
        })
    }

    fn list_dir(&self, path: &Path) -> Vec<PathBuf> {
        self.files
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_service_round_trips() {
        let service = MemoryFileService::new([(PathBuf::from("/p/a.go"), "package p".to_string())]);
        assert!(service.exists(Path::new("/p/a.go")));
        assert_eq!(service.load_file(Path::new("/p/a.go")).unwrap(), "package p");
        assert!(service.load_file(Path::new("/p/missing.go")).is_err());
    }
}
