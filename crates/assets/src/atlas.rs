use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Asset, LoadCause, ResourceLoadError, ResourceStore};

struct Slot {
    identifier: String,
    asset: Mutex<Option<Arc<Asset>>>,
}

/// Lazily loaded assets, one per category.
///
/// The category set is fixed at construction. Each category's asset is
/// decoded at most once for the life of the atlas: the first caller loads it
/// while holding that category's slot lock, concurrent callers wait on the
/// same lock and receive the same `Arc`. A failed load leaves the slot empty
/// so a later call retries.
pub struct TileAtlas<C> {
    store: Box<dyn ResourceStore>,
    slots: HashMap<C, Slot>,
}

impl<C> TileAtlas<C>
where
    C: Copy + Eq + Hash + Debug,
{
    pub fn new<I, S>(store: impl ResourceStore + 'static, sources: I) -> Self
    where
        I: IntoIterator<Item = (C, S)>,
        S: Into<String>,
    {
        let slots = sources
            .into_iter()
            .map(|(category, identifier)| {
                (
                    category,
                    Slot {
                        identifier: identifier.into(),
                        asset: Mutex::new(None),
                    },
                )
            })
            .collect();
        Self {
            store: Box::new(store),
            slots,
        }
    }

    /// Asset for `category`, loading it on first use.
    pub fn get_asset(&self, category: C) -> Result<Arc<Asset>, ResourceLoadError<C>> {
        let Some(slot) = self.slots.get(&category) else {
            return Err(ResourceLoadError {
                category,
                identifier: String::new(),
                cause: LoadCause::Unregistered,
            });
        };

        let mut guard = slot.asset.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(asset) = guard.as_ref() {
            return Ok(Arc::clone(asset));
        }

        let _span = tracing::debug_span!("asset_load", identifier = %slot.identifier).entered();
        let fail = |cause| ResourceLoadError {
            category,
            identifier: slot.identifier.clone(),
            cause,
        };
        let bytes = self
            .store
            .load(&slot.identifier)
            .map_err(|e| fail(LoadCause::Io(e)))?;
        let asset =
            Asset::decode(&slot.identifier, &bytes).map_err(|e| fail(LoadCause::Decode(e)))?;
        tracing::debug!(
            ?category,
            width = asset.width(),
            height = asset.height(),
            "asset loaded"
        );

        let asset = Arc::new(asset);
        *guard = Some(Arc::clone(&asset));
        Ok(asset)
    }

    /// Load every registered category, returning the failures.
    pub fn preload(&self) -> Vec<ResourceLoadError<C>> {
        let categories: Vec<C> = self.slots.keys().copied().collect();
        categories
            .into_iter()
            .filter_map(|c| self.get_asset(c).err())
            .collect()
    }

    pub fn is_loaded(&self, category: C) -> bool {
        self.slots.get(&category).is_some_and(|slot| {
            slot.asset
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        })
    }

    pub fn loaded_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| {
                slot.asset
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    /// Resource identifier registered for `category`.
    pub fn identifier(&self, category: C) -> Option<&str> {
        self.slots.get(&category).map(|slot| slot.identifier.as_str())
    }

    pub fn categories(&self) -> impl Iterator<Item = C> + '_ {
        self.slots.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, encode_swatch};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tilescape_common::Terrain;

    /// Store that counts loads and can be slowed down to widen race windows.
    struct CountingStore {
        inner: MemoryStore,
        loads: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl ResourceStore for CountingStore {
        fn load(&self, identifier: &str) -> io::Result<Vec<u8>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.inner.load(identifier)
        }
    }

    fn counting_atlas(delay: Duration) -> (TileAtlas<Terrain>, Arc<AtomicUsize>) {
        let inner = MemoryStore::swatches(
            Terrain::ALL.iter().map(|t| (t.sprite(), t.swatch())),
            2,
        )
        .unwrap();
        let loads = Arc::new(AtomicUsize::new(0));
        let store = CountingStore {
            inner,
            loads: Arc::clone(&loads),
            delay,
        };
        let atlas = TileAtlas::new(store, Terrain::ALL.iter().map(|t| (*t, t.sprite())));
        (atlas, loads)
    }

    #[test]
    fn repeated_access_loads_once() {
        let (atlas, loads) = counting_atlas(Duration::ZERO);
        let first = atlas.get_asset(Terrain::Forest).unwrap();
        for _ in 0..10 {
            let again = atlas.get_asset(Terrain::Forest).unwrap();
            assert!(Arc::ptr_eq(&first, &again));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(atlas.is_loaded(Terrain::Forest));
        assert!(!atlas.is_loaded(Terrain::Water));
        assert_eq!(atlas.loaded_count(), 1);
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let (atlas, loads) = counting_atlas(Duration::from_millis(20));
        let assets: Vec<Arc<Asset>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| atlas.get_asset(Terrain::Water).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(assets.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn missing_resource_reports_category_and_cause() {
        let atlas = TileAtlas::new(MemoryStore::new(), [(Terrain::Pines, "sprites/bush.png")]);
        let err = atlas.get_asset(Terrain::Pines).unwrap_err();
        assert_eq!(err.category, Terrain::Pines);
        assert_eq!(err.identifier, "sprites/bush.png");
        assert!(matches!(err.cause, LoadCause::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
        assert!(err.to_string().contains("Pines"));
    }

    #[test]
    fn corrupt_resource_is_decode_error() {
        let mut store = MemoryStore::new();
        store.insert("bad.png", b"not an image".to_vec());
        let atlas = TileAtlas::new(store, [(Terrain::Water, "bad.png")]);
        let err = atlas.get_asset(Terrain::Water).unwrap_err();
        assert!(matches!(err.cause, LoadCause::Decode(_)));
        assert!(!atlas.is_loaded(Terrain::Water));
    }

    #[test]
    fn unregistered_category_is_rejected() {
        let atlas = TileAtlas::new(MemoryStore::new(), [(Terrain::Water, "w.png")]);
        let err = atlas.get_asset(Terrain::Mountain).unwrap_err();
        assert!(matches!(err.cause, LoadCause::Unregistered));
    }

    #[test]
    fn failed_load_is_retried_later() {
        let loads = Arc::new(AtomicUsize::new(0));
        let store = CountingStore {
            inner: MemoryStore::new(),
            loads: Arc::clone(&loads),
            delay: Duration::ZERO,
        };
        let atlas = TileAtlas::new(store, [(Terrain::Plains, "g.png")]);
        assert!(atlas.get_asset(Terrain::Plains).is_err());
        assert!(atlas.get_asset(Terrain::Plains).is_err());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn preload_collects_failures() {
        let mut store = MemoryStore::new();
        store.insert("w.png", encode_swatch([0, 0, 255, 255], 1).unwrap());
        let atlas = TileAtlas::new(store, [(Terrain::Water, "w.png"), (Terrain::Plains, "g.png")]);
        let failures = atlas.preload();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].category, Terrain::Plains);
        assert_eq!(atlas.loaded_count(), 1);
        assert_eq!(atlas.identifier(Terrain::Water), Some("w.png"));
    }
}
