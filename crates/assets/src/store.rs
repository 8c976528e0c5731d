use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::encode_swatch;

/// Source of raw resource bytes, addressed by identifier.
///
/// Implementations must be shareable across threads; the atlas may be hit
/// from a renderer and a prefetcher at once.
pub trait ResourceStore: Send + Sync {
    fn load(&self, identifier: &str) -> io::Result<Vec<u8>>;
}

impl<T: ResourceStore + ?Sized> ResourceStore for Arc<T> {
    fn load(&self, identifier: &str) -> io::Result<Vec<u8>> {
        (**self).load(identifier)
    }
}

impl<T: ResourceStore + ?Sized> ResourceStore for Box<T> {
    fn load(&self, identifier: &str) -> io::Result<Vec<u8>> {
        (**self).load(identifier)
    }
}

/// Reads resources relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceStore for FsStore {
    fn load(&self, identifier: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(identifier))
    }
}

/// In-memory resources.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding one solid-colour PNG per identifier.
    pub fn swatches<'a>(
        colors: impl IntoIterator<Item = (&'a str, [u8; 4])>,
        size: u32,
    ) -> Result<Self, image::ImageError> {
        let mut store = Self::new();
        for (identifier, color) in colors {
            store.insert(identifier, encode_swatch(color, size)?);
        }
        Ok(store)
    }

    pub fn insert(&mut self, identifier: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(identifier.into(), bytes);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceStore for MemoryStore {
    fn load(&self, identifier: &str) -> io::Result<Vec<u8>> {
        self.entries.get(identifier).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no resource named `{identifier}`"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_store_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sprites")).unwrap();
        std::fs::write(dir.path().join("sprites/a.bin"), [1u8, 2, 3]).unwrap();

        let store = FsStore::new(dir.path());
        assert_eq!(store.load("sprites/a.bin").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn fs_store_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let err = store.load("nope.png").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_store_lookup() {
        let mut store = MemoryStore::new();
        store.insert("x", vec![9]);
        assert_eq!(store.load("x").unwrap(), vec![9]);
        assert_eq!(store.load("y").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn swatch_store_holds_one_png_per_identifier() {
        let store =
            MemoryStore::swatches([("a", [1, 2, 3, 255]), ("b", [4, 5, 6, 255])], 2).unwrap();
        assert_eq!(store.len(), 2);
        let bytes = store.load("a").unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
