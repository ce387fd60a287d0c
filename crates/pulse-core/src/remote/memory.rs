//! In-process remote store with fault injection.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{RemoteResult, RemoteStore};
use crate::error::RemoteError;
use crate::models::{Marker, MarkerId, NewMarker};

/// Remote collection kept in memory.
///
/// Clones share state, so a test can hold one handle while the pipeline
/// drives another.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemoteStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Marker>,
    failures: VecDeque<RemoteError>,
    stall: Option<Duration>,
    keyed: bool,
    next_id: u64,
    create_calls: usize,
    delete_calls: usize,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(markers: Vec<Marker>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                records: markers,
                ..MemoryState::default()
            })),
        }
    }

    /// Fail the next call with `error`. Queued failures are consumed in order.
    pub async fn fail_next(&self, error: RemoteError) {
        self.fail_next_n(1, error).await;
    }

    pub async fn fail_next_n(&self, count: usize, error: RemoteError) {
        let mut state = self.state.lock().await;
        state
            .failures
            .extend(std::iter::repeat(error).take(count));
    }

    /// Delay every call by `duration` before it settles.
    pub async fn stall_for(&self, duration: Duration) {
        self.state.lock().await.stall = Some(duration);
    }

    pub async fn clear_stall(&self) {
        self.state.lock().await.stall = None;
    }

    /// Answer `list` with a document map keyed by id instead of an array.
    pub async fn respond_keyed(&self, keyed: bool) {
        self.state.lock().await.keyed = keyed;
    }

    pub async fn markers(&self) -> Vec<Marker> {
        self.state.lock().await.records.clone()
    }

    pub async fn create_calls(&self) -> usize {
        self.state.lock().await.create_calls
    }

    pub async fn delete_calls(&self) -> usize {
        self.state.lock().await.delete_calls
    }

    /// Wait out any stall, then report an injected failure if one is queued.
    async fn settle(&self) -> RemoteResult<()> {
        let (stall, failure) = {
            let mut state = self.state.lock().await;
            (state.stall, state.failures.pop_front())
        };
        if let Some(stall) = stall {
            tokio::time::sleep(stall).await;
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl RemoteStore for MemoryRemoteStore {
    async fn list(&self) -> RemoteResult<Value> {
        self.settle().await?;
        let state = self.state.lock().await;
        let mut records = state.records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if state.keyed {
            let mut map = Map::new();
            for marker in records {
                let key = marker.id.to_string();
                map.insert(key, to_value(&marker)?);
            }
            Ok(Value::Object(map))
        } else {
            records
                .iter()
                .map(to_value)
                .collect::<RemoteResult<Vec<_>>>()
                .map(Value::Array)
        }
    }

    async fn create(&self, marker: NewMarker) -> RemoteResult<Value> {
        self.state.lock().await.create_calls += 1;
        self.settle().await?;

        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = MarkerId::new(format!("mem-{}", state.next_id));
        let stored = marker.into_marker(id);
        state.records.push(stored.clone());
        to_value(&stored)
    }

    async fn delete(&self, id: &MarkerId) -> RemoteResult<()> {
        self.state.lock().await.delete_calls += 1;
        self.settle().await?;
        self.state
            .lock()
            .await
            .records
            .retain(|marker| &marker.id != id);
        Ok(())
    }
}

fn to_value(marker: &Marker) -> RemoteResult<Value> {
    serde_json::to_value(marker).map_err(|error| RemoteError::InvalidResponse(error.to_string()))
}
