//! Canonical in-memory marker collection.
//!
//! The store is rebuilt from the remote collection on [`MarkerStore::load`]
//! and merged with markers that only exist in this client's memory. All
//! mutations are synchronous and bump [`MarkerStore::revision`], which the
//! viewport uses to decide when to redraw the marker layer.

mod samples;

use std::collections::HashSet;

pub use samples::fallback_markers;

use crate::error::RemoteError;
use crate::models::{Marker, MarkerId};
use crate::normalize::normalize;
use crate::remote::RemoteStore;
use crate::util::now_millis;

/// Where the collection came from on the last load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadSource {
    #[default]
    Empty,
    Remote,
    Fallback,
}

/// Result of [`MarkerStore::load`]. Loading never fails; a remote error is
/// reported here and the store falls back to sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub source: LoadSource,
    pub count: usize,
    pub error: Option<RemoteError>,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
    pending: HashSet<MarkerId>,
    filter: Option<String>,
    source: LoadSource,
    revision: u64,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection with the remote one, newest first.
    ///
    /// Optimistic and local-only markers survive the reload. When the remote
    /// call fails the fallback samples are shown alongside them instead.
    pub async fn load<R: RemoteStore>(&mut self, remote: &R) -> LoadOutcome {
        match remote.list().await {
            Ok(payload) => {
                let fetched = normalize(&payload);
                tracing::info!("Loaded {} markers from remote store", fetched.len());
                self.rebuild(fetched, LoadSource::Remote);
                LoadOutcome {
                    source: LoadSource::Remote,
                    count: self.markers.len(),
                    error: None,
                }
            }
            Err(error) => {
                tracing::warn!("Failed to load markers, showing sample data: {error}");
                self.rebuild(fallback_markers(now_millis()), LoadSource::Fallback);
                LoadOutcome {
                    source: LoadSource::Fallback,
                    count: self.markers.len(),
                    error: Some(error),
                }
            }
        }
    }

    fn rebuild(&mut self, base: Vec<Marker>, source: LoadSource) {
        let known = base
            .iter()
            .map(|marker| marker.id.clone())
            .collect::<HashSet<_>>();
        let retained = self
            .markers
            .drain(..)
            .filter(|marker| marker.is_local || self.pending.contains(&marker.id))
            .filter(|marker| !known.contains(&marker.id))
            .collect::<Vec<_>>();

        let mut markers = base;
        markers.extend(retained);
        markers.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.markers = markers;
        self.source = source;
        self.touch();
    }

    /// Markers in `category`, or all markers for `None`. Order is preserved.
    pub fn apply_filter(&self, category: Option<&str>) -> Vec<&Marker> {
        match category.map(str::trim).filter(|category| !category.is_empty()) {
            Some(category) => self
                .markers
                .iter()
                .filter(|marker| marker.category.eq_ignore_ascii_case(category))
                .collect(),
            None => self.markers.iter().collect(),
        }
    }

    /// Set the category filter used by [`Self::visible`].
    pub fn set_filter(&mut self, category: Option<&str>) {
        let category = category
            .map(|category| category.trim().to_lowercase())
            .filter(|category| !category.is_empty());
        if category != self.filter {
            self.filter = category;
            self.touch();
        }
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Markers passing the current filter.
    pub fn visible(&self) -> Vec<&Marker> {
        self.apply_filter(self.filter.as_deref())
    }

    /// Show a marker before the remote store has confirmed it.
    pub fn insert_optimistic(&mut self, marker: Marker) {
        self.markers.retain(|existing| existing.id != marker.id);
        self.pending.insert(marker.id.clone());
        self.markers.insert(0, marker);
        self.touch();
    }

    /// Swap a temporary marker for the server's record.
    ///
    /// Returns `false` when the temporary marker is gone (deleted while the
    /// write was in flight). If a reload already brought in the confirmed
    /// record, the temporary copy is simply dropped.
    pub fn confirm(&mut self, temp_id: &MarkerId, mut confirmed: Marker) -> bool {
        let Some(index) = self.position(temp_id) else {
            return false;
        };
        self.pending.remove(temp_id);
        confirmed.is_local = false;

        if self.position(&confirmed.id).is_some() {
            self.markers.remove(index);
        } else {
            self.markers[index] = confirmed;
        }
        self.touch();
        true
    }

    /// Keep a temporary marker as local-only after its write failed.
    pub fn mark_local(&mut self, temp_id: &MarkerId) -> bool {
        let Some(index) = self.position(temp_id) else {
            return false;
        };
        self.pending.remove(temp_id);
        self.markers[index].is_local = true;
        self.touch();
        true
    }

    pub fn remove(&mut self, id: &MarkerId) -> Option<Marker> {
        let index = self.position(id)?;
        self.pending.remove(id);
        let removed = self.markers.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn get(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|marker| &marker.id == id)
    }

    pub fn is_pending(&self, id: &MarkerId) -> bool {
        self.pending.contains(id)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub const fn source(&self) -> LoadSource {
        self.source
    }

    /// Incremented on every change to the collection or the filter.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn position(&self, id: &MarkerId) -> Option<usize> {
        self.markers.iter().position(|marker| &marker.id == id)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Urgency};
    use crate::remote::MemoryRemoteStore;
    use pretty_assertions::assert_eq;

    fn marker(id: &str, category: &str, created_at: i64) -> Marker {
        Marker {
            id: MarkerId::new(id),
            title: id.to_string(),
            category: category.to_string(),
            description: format!("{id} description"),
            coordinate: Coordinate::new(18.0, -76.8),
            urgency: Urgency::Normal,
            tags: Default::default(),
            images: Vec::new(),
            author_id: Some("u1".to_string()),
            author_email: None,
            created_at,
            updated_at: created_at,
            is_local: false,
        }
    }

    fn ids(markers: &[&Marker]) -> Vec<String> {
        markers.iter().map(|marker| marker.id.to_string()).collect()
    }

    #[tokio::test]
    async fn load_orders_newest_first() {
        let remote = MemoryRemoteStore::with_markers(vec![
            marker("a", "event", 1),
            marker("b", "traffic", 3),
            marker("c", "event", 2),
        ]);
        let mut store = MarkerStore::new();
        let outcome = store.load(&remote).await;

        assert_eq!(outcome.source, LoadSource::Remote);
        assert_eq!(outcome.count, 3);
        assert_eq!(ids(&store.visible()), vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn failed_load_falls_back_to_samples() {
        let remote = MemoryRemoteStore::new();
        remote.fail_next(RemoteError::Network).await;
        let mut store = MarkerStore::new();
        let outcome = store.load(&remote).await;

        assert_eq!(outcome.source, LoadSource::Fallback);
        assert_eq!(outcome.error, Some(RemoteError::Network));
        assert!(!store.is_empty());
        assert!(store
            .markers()
            .iter()
            .all(|marker| marker.id.as_str().starts_with("sample-")));
        assert!(store
            .markers()
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn reload_keeps_local_markers() {
        let remote = MemoryRemoteStore::with_markers(vec![marker("remote", "event", 10)]);
        let mut store = MarkerStore::new();
        store.insert_optimistic(marker("local-1-abc", "hazard", 20));
        store.mark_local(&MarkerId::new("local-1-abc"));
        store.insert_optimistic(marker("local-2-def", "hazard", 5));

        store.load(&remote).await;
        assert_eq!(
            ids(&store.visible()),
            vec!["local-1-abc", "remote", "local-2-def"]
        );
        assert!(store.is_pending(&MarkerId::new("local-2-def")));
    }

    #[test]
    fn filter_round_trip_preserves_order() {
        let mut store = MarkerStore::new();
        for (id, category, at) in [("a", "event", 1), ("b", "hazard", 2), ("c", "event", 3)] {
            store.insert_optimistic(marker(id, category, at));
        }
        let original = ids(&store.apply_filter(None));

        assert_eq!(ids(&store.apply_filter(Some("event"))), vec!["c", "a"]);
        assert_eq!(ids(&store.apply_filter(Some("EVENT "))), vec!["c", "a"]);
        assert_eq!(ids(&store.apply_filter(None)), original);
        assert_eq!(ids(&store.apply_filter(Some(""))), original);
    }

    #[test]
    fn set_filter_bumps_revision_only_on_change() {
        let mut store = MarkerStore::new();
        let start = store.revision();
        store.set_filter(Some("Event"));
        assert_eq!(store.filter(), Some("event"));
        let after = store.revision();
        assert!(after > start);
        store.set_filter(Some("event"));
        assert_eq!(store.revision(), after);
        store.set_filter(None);
        assert!(store.revision() > after);
    }

    #[test]
    fn confirm_replaces_the_temporary_marker_in_place() {
        let mut store = MarkerStore::new();
        store.insert_optimistic(marker("x", "event", 1));
        let temp = MarkerId::new("local-9-abc");
        store.insert_optimistic(marker(temp.as_str(), "event", 2));
        assert!(store.is_pending(&temp));

        assert!(store.confirm(&temp, marker("server-1", "event", 2)));
        assert!(!store.is_pending(&temp));
        assert_eq!(ids(&store.visible()), vec!["server-1", "x"]);
        assert!(!store.confirm(&temp, marker("server-1", "event", 2)));
    }

    #[test]
    fn confirm_drops_temp_when_record_already_present() {
        let mut store = MarkerStore::new();
        store.insert_optimistic(marker("server-1", "event", 1));
        store.insert_optimistic(marker("local-1-abc", "event", 1));

        assert!(store.confirm(&MarkerId::new("local-1-abc"), marker("server-1", "event", 1)));
        assert_eq!(ids(&store.visible()), vec!["server-1"]);
    }

    #[test]
    fn mark_local_flags_marker() {
        let mut store = MarkerStore::new();
        let temp = MarkerId::new("local-1-abc");
        store.insert_optimistic(marker(temp.as_str(), "event", 1));
        assert!(store.mark_local(&temp));
        assert!(store.get(&temp).unwrap().is_local);
        assert!(!store.is_pending(&temp));
        assert!(!store.mark_local(&MarkerId::new("missing")));
    }

    #[test]
    fn remove_takes_exactly_one_id() {
        let mut store = MarkerStore::new();
        store.insert_optimistic(marker("a", "event", 1));
        store.insert_optimistic(marker("b", "event", 2));

        assert_eq!(store.remove(&MarkerId::new("a")).unwrap().id.as_str(), "a");
        assert!(store.remove(&MarkerId::new("a")).is_none());
        assert_eq!(ids(&store.visible()), vec!["b"]);
    }
}
