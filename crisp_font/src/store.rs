//! Owned store objects keyed by `FontIdentity`. Replaces the source's global
//! mutable `atlasDataStoreFAB` / `fontMetricsStoreFAB` singletons with plain
//! structs the host constructs, passes by reference to the loader and
//! engine, and clears explicitly — there are no statics here.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::atlas::AtlasData;
use crate::identity::FontIdentity;
use crate::metrics::FontMetrics;

/// `FontIdentity -> FontMetrics`. Entries are inserted once by the loader
/// and never mutated in place.
#[derive(Default)]
pub struct FontMetricsStore {
    entries: RwLock<HashMap<FontIdentity, FontMetrics>>,
}

impl FontMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: FontIdentity, metrics: FontMetrics) {
        self.entries.write().expect("metrics store lock poisoned").insert(id, metrics);
    }

    pub fn get(&self, id: &FontIdentity) -> Option<FontMetrics> {
        self.entries.read().expect("metrics store lock poisoned").get(id).cloned()
    }

    pub fn contains(&self, id: &FontIdentity) -> bool {
        self.entries.read().expect("metrics store lock poisoned").contains_key(id)
    }

    pub fn clear(&self) {
        self.entries.write().expect("metrics store lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("metrics store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `FontIdentity -> AtlasData`. The loader only ever inserts into this store
/// after the corresponding metrics entry exists.
#[derive(Default)]
pub struct AtlasDataStore {
    entries: RwLock<HashMap<FontIdentity, AtlasData>>,
}

impl AtlasDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: FontIdentity, data: AtlasData) {
        self.entries.write().expect("atlas store lock poisoned").insert(id, data);
    }

    pub fn get(&self, id: &FontIdentity) -> Option<AtlasData> {
        self.entries.read().expect("atlas store lock poisoned").get(id).cloned()
    }

    pub fn contains(&self, id: &FontIdentity) -> bool {
        self.entries.read().expect("atlas store lock poisoned").contains_key(id)
    }

    pub fn clear(&self) {
        self.entries.write().expect("atlas store lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("atlas store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
