//! Remote marker store seam.
//!
//! The remote collection hands back raw JSON; every payload goes through the
//! normalizer before it reaches the marker store.

mod http;
mod memory;

use std::future::Future;

use serde_json::Value;

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

use crate::error::RemoteError;
use crate::models::{MarkerId, NewMarker};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Create/list/delete operations on the remote `markers` collection.
pub trait RemoteStore: Clone + Send + Sync + 'static {
    /// All markers, newest first. The payload shape is not trusted.
    fn list(&self) -> impl Future<Output = RemoteResult<Value>> + Send;

    /// Persist a new marker; the answer carries the server-assigned id and timestamps.
    fn create(&self, marker: NewMarker) -> impl Future<Output = RemoteResult<Value>> + Send;

    fn delete(&self, id: &MarkerId) -> impl Future<Output = RemoteResult<()>> + Send;
}

/// Remote store used when no endpoint is configured. Every call fails with
/// [`RemoteError::Network`], which puts the client in offline mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemoteStore;

impl RemoteStore for OfflineRemoteStore {
    async fn list(&self) -> RemoteResult<Value> {
        Err(RemoteError::Network)
    }

    async fn create(&self, _marker: NewMarker) -> RemoteResult<Value> {
        Err(RemoteError::Network)
    }

    async fn delete(&self, _id: &MarkerId) -> RemoteResult<()> {
        Err(RemoteError::Network)
    }
}
