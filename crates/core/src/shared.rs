//! Thread-safe store handle
//!
//! UI event handlers that may fire from several threads share one
//! [`AnnotationStore`] through this handle. Each call holds the lock for the
//! whole operation, so every mutation is a critical section and no caller can
//! observe a half-applied change.

use crate::action::{ActionOutcome, ActionScript, StoreAction};
use crate::annotation::{AnnotationId, Color, PathId, PointId, RegionId};
use crate::config::StoreConfig;
use crate::error::AnnotationResult;
use crate::geo::GeoCoordinate;
use crate::store::AnnotationStore;
use crate::view::{PairDistance, PathView, PointView, RegionView, StoreSnapshot};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to a mutex-guarded store
#[derive(Debug, Clone, Default)]
pub struct SharedAnnotationStore {
    inner: Arc<Mutex<AnnotationStore>>,
}

impl SharedAnnotationStore {
    /// Create a handle to a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle to a new empty store with the given defaults
    pub fn with_config(config: StoreConfig) -> Self {
        Self::from_store(AnnotationStore::with_config(config))
    }

    /// Wrap an existing store
    pub fn from_store(store: AnnotationStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    // Mutations validate before writing, so a panic in another holder never
    // leaves the store half-mutated and the poisoned guard is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, AnnotationStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read-only closure under the lock
    pub fn read<R>(&self, f: impl FnOnce(&AnnotationStore) -> R) -> R {
        f(&self.lock())
    }

    /// Run several mutations as one critical section
    pub fn update<R>(&self, f: impl FnOnce(&mut AnnotationStore) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn add_point(
        &self,
        coordinate: GeoCoordinate,
        name: Option<String>,
        color: Option<Color>,
    ) -> AnnotationResult<PointId> {
        self.lock().add_point(coordinate, name, color)
    }

    pub fn connect_points(
        &self,
        from: PointId,
        to: PointId,
        name: Option<String>,
        color: Option<Color>,
    ) -> AnnotationResult<PathId> {
        self.lock().connect_points(from, to, name, color)
    }

    pub fn add_drawn_path(
        &self,
        vertices: Vec<GeoCoordinate>,
        name: Option<String>,
        color: Option<Color>,
    ) -> AnnotationResult<PathId> {
        self.lock().add_drawn_path(vertices, name, color)
    }

    pub fn add_region(
        &self,
        sw: GeoCoordinate,
        ne: GeoCoordinate,
        name: Option<String>,
        color: Option<Color>,
    ) -> AnnotationResult<RegionId> {
        self.lock().add_region(sw, ne, name, color)
    }

    pub fn remove_point(&self, id: PointId) -> AnnotationResult<()> {
        self.lock().remove_point(id)
    }

    pub fn remove_path(&self, id: PathId) -> AnnotationResult<()> {
        self.lock().remove_path(id)
    }

    pub fn remove_region(&self, id: RegionId) -> AnnotationResult<()> {
        self.lock().remove_region(id)
    }

    pub fn rename(&self, id: AnnotationId, name: impl Into<String>) -> AnnotationResult<()> {
        self.lock().rename(id, name)
    }

    pub fn recolor(&self, id: AnnotationId, color: Color) -> AnnotationResult<()> {
        self.lock().recolor(id, color)
    }

    pub fn clear_all(&self) {
        self.lock().clear_all();
    }

    /// Apply an action within a script, holding the lock for the whole action
    pub fn apply(
        &self,
        script: &mut ActionScript,
        action: StoreAction,
    ) -> AnnotationResult<ActionOutcome> {
        script.apply(&mut self.lock(), action)
    }

    pub fn list_points(&self) -> Vec<PointView> {
        self.lock().list_points()
    }

    pub fn list_paths(&self) -> Vec<PathView> {
        self.lock().list_paths()
    }

    pub fn list_regions(&self) -> Vec<RegionView> {
        self.lock().list_regions()
    }

    pub fn all_pairs_distances(&self) -> Vec<PairDistance> {
        self.lock().all_pairs_distances()
    }

    /// Consistent view of all three collections taken under one lock
    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().snapshot()
    }
}
