use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Converted image/glyph, as seen by tag-resolution consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Namespaced target key, `"<file>:<id>"`.
    pub key: String,
    pub rows: u32,
    pub columns: u32,
}

/// Original glyph id → converted image.
///
/// Written by the image pass, read afterwards by anything rewriting
/// `:glyph:` style tags. Last write for a key wins.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    images: RwLock<HashMap<String, ImageEntry>>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, original: impl Into<String>, entry: ImageEntry) {
        let original = original.into();
        if let Some(previous) = self.write().insert(original.clone(), entry) {
            tracing::debug!(image = %original, previous = %previous.key, "image registry entry replaced");
        }
    }

    pub fn get(&self, original: &str) -> Option<ImageEntry> {
        self.read().get(original).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of all entries, sorted by original id.
    pub fn snapshot(&self) -> Vec<(String, ImageEntry)> {
        let mut all: Vec<(String, ImageEntry)> =
            self.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ImageEntry>> {
        match self.images.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("image registry read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ImageEntry>> {
        match self.images.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("image registry write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
