//! One signed-in (or signed-out) client session.
//!
//! `PulseSession` wires the marker store, submission pipeline and viewport to
//! a remote store and turns every outcome into a single [`Notice`] for the
//! UI. Deletes requested from the map and late-write reconciliations arrive
//! on the session's command channel.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::command::{command_channel, CommandReceiver, CommandSender, MarkerCommand};
use crate::config::PulseConfig;
use crate::error::{ConfigError, DeleteError, RemoteError};
use crate::models::{Identity, Marker, MarkerDraft, MarkerId};
use crate::remote::RemoteStore;
use crate::store::{LoadOutcome, MarkerStore};
use crate::submission::{SubmissionOutcome, SubmissionPipeline};
use crate::viewport::{
    ComposeRequest, LocationProvider, MapEvent, MapSurface, RenderReport, ViewportController,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

pub struct PulseSession<R: RemoteStore> {
    config: Arc<PulseConfig>,
    remote: R,
    identity: Option<Identity>,
    store: MarkerStore,
    pipeline: SubmissionPipeline,
    viewport: ViewportController,
    commands: CommandSender,
    inbox: CommandReceiver,
    /// Local-only markers deleted while their create may still land.
    discarded: HashSet<MarkerId>,
}

impl<R: RemoteStore> PulseSession<R> {
    pub fn new(config: PulseConfig, remote: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let config = Arc::new(config);
        let (commands, inbox) = command_channel();
        let pipeline = SubmissionPipeline::new(Arc::clone(&config))?.with_commands(commands.clone());
        let viewport = ViewportController::new(&config)?;

        Ok(Self {
            config,
            remote,
            identity: None,
            store: MarkerStore::new(),
            pipeline,
            viewport,
            commands,
            inbox,
            discarded: HashSet::new(),
        })
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn sign_in(&mut self, identity: Identity) {
        tracing::info!("Signed in as {}", identity.id);
        self.identity = Some(identity);
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
    }

    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub const fn store(&self) -> &MarkerStore {
        &self.store
    }

    pub const fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    pub const fn pipeline(&self) -> &SubmissionPipeline {
        &self.pipeline
    }

    /// Handle for the rendering layer to send delete intents.
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    /// Load markers. A notice is returned only when the remote was unreachable.
    pub async fn load(&mut self) -> (LoadOutcome, Option<Notice>) {
        let outcome = self.store.load(&self.remote).await;
        let notice = outcome.error.as_ref().map(|error| {
            Notice::warning(format!(
                "{} Showing sample markers for now.",
                error.user_message()
            ))
        });
        (outcome, notice)
    }

    pub fn set_filter(&mut self, category: Option<&str>) {
        self.store.set_filter(category);
    }

    pub async fn submit(&mut self, draft: MarkerDraft) -> (SubmissionOutcome, Notice) {
        let outcome = self
            .pipeline
            .submit(
                &mut self.store,
                &self.remote,
                self.identity.as_ref(),
                draft,
            )
            .await;
        let notice = match &outcome {
            SubmissionOutcome::Confirmed(_) => Notice::success("Marker added successfully!"),
            SubmissionOutcome::LocalFallback { reason, .. } => Notice::warning(format!(
                "{} Your marker is saved on this device and will sync later.",
                reason.user_message()
            )),
            SubmissionOutcome::Rejected { error, .. } => Notice::error(error.user_message()),
        };
        (outcome, notice)
    }

    /// Delete a marker the signed-in user owns.
    ///
    /// Local-only markers never reached the server and are removed directly.
    /// A marker missing from the collection is still deleted remotely, so a
    /// repeated delete is a no-op online and a network error offline.
    pub async fn delete_marker(&mut self, id: &MarkerId) -> Result<Option<Marker>, DeleteError> {
        let Some(identity) = &self.identity else {
            return Err(DeleteError::AuthRequired);
        };

        if let Some(marker) = self.store.get(id) {
            if !marker.is_owned_by(identity) {
                return Err(DeleteError::NotOwner(id.to_string()));
            }
            if marker.is_local || id.is_local() {
                self.discarded.insert(id.clone());
                return Ok(self.store.remove(id));
            }
        }

        match self.remote.delete(id).await {
            Ok(()) => Ok(self.store.remove(id)),
            Err(error) => {
                tracing::warn!("Failed to delete marker {id}: {error}");
                Err(DeleteError::Remote(error))
            }
        }
    }

    pub async fn delete(&mut self, id: &MarkerId) -> Notice {
        match self.delete_marker(id).await {
            Ok(Some(_)) => Notice::success("Marker deleted."),
            Ok(None) => Notice::info("Marker was already removed."),
            Err(error) => Notice::error(error.user_message()),
        }
    }

    /// Center on the device position. A failure is reported, never fatal.
    pub async fn locate<L: LocationProvider>(
        &mut self,
        locator: &L,
    ) -> Result<ComposeRequest, Notice> {
        self.viewport.locate(locator).await.map_err(|error| {
            tracing::warn!("Location request failed: {error}");
            Notice::warning(error.user_message())
        })
    }

    pub fn handle_event(&mut self, event: MapEvent) -> Option<ComposeRequest> {
        self.viewport.handle_event(event)
    }

    pub fn render<S: MapSurface>(&mut self, surface: &mut S) -> RenderReport {
        self.viewport.render(surface, &self.store)
    }

    /// Apply every command already queued.
    pub async fn process_commands(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(command) = self.inbox.try_recv() {
            if let Some(notice) = self.apply(command).await {
                notices.push(notice);
            }
        }
        notices
    }

    /// Wait for the next command and apply it.
    pub async fn next_command(&mut self) -> Option<Notice> {
        let command = self.inbox.recv().await?;
        self.apply(command).await
    }

    async fn apply(&mut self, command: MarkerCommand) -> Option<Notice> {
        match command {
            MarkerCommand::Delete { id } => Some(self.delete(&id).await),
            MarkerCommand::Reconcile { local_id, marker } => {
                let confirmed_id = marker.id.clone();
                if self.discarded.remove(&local_id) {
                    return Some(self.discard_late_write(&local_id, &confirmed_id).await);
                }
                if self.store.confirm(&local_id, marker) {
                    tracing::info!("Reconciled {local_id} with {confirmed_id}");
                    Some(Notice::info("A marker saved offline has now synced."))
                } else {
                    tracing::warn!(
                        "Late write {confirmed_id} arrived after {local_id} left the collection"
                    );
                    Some(Notice::warning(
                        "A marker saved offline synced after it was removed from the map.",
                    ))
                }
            }
        }
    }

    /// The local copy was deleted before the create landed; remove the
    /// server record as well.
    async fn discard_late_write(&mut self, local_id: &MarkerId, confirmed_id: &MarkerId) -> Notice {
        self.store.remove(confirmed_id);
        match self.remote.delete(confirmed_id).await {
            Ok(()) => {
                tracing::info!("Deleted late write {confirmed_id} for discarded {local_id}");
                Notice::info("A marker you deleted offline was also removed from the server.")
            }
            Err(error) => {
                tracing::warn!("Failed to delete late write {confirmed_id}: {error}");
                let notice = remote_notice(&error);
                Notice::new(
                    notice.level,
                    format!(
                        "A marker you deleted offline reached the server and could not be removed. {}",
                        notice.message
                    ),
                )
            }
        }
    }
}

/// Turn a remote failure into the notice shown for it.
pub fn remote_notice(error: &RemoteError) -> Notice {
    if error.is_recoverable() {
        Notice::warning(error.user_message())
    } else {
        Notice::error(error.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::error::LocationError;
    use crate::models::Coordinate;
    use crate::remote::MemoryRemoteStore;
    use crate::store::LoadSource;
    use crate::viewport::{FixedLocation, Layer, RecordedSurface};

    fn session(remote: &MemoryRemoteStore) -> PulseSession<MemoryRemoteStore> {
        let mut session = PulseSession::new(PulseConfig::default(), remote.clone()).unwrap();
        session.sign_in(Identity::new("user-1", Some("user@example.com".to_string())));
        session
    }

    fn draft(description: &str) -> MarkerDraft {
        MarkerDraft::new("hazard", description, Coordinate::new(18.0, -76.8))
    }

    #[tokio::test(start_paused = true)]
    async fn offline_load_warns_once_and_shows_samples() {
        let remote = MemoryRemoteStore::new();
        remote.fail_next(RemoteError::Network).await;
        let mut session = session(&remote);

        let (outcome, notice) = session.load().await;
        assert_eq!(outcome.source, LoadSource::Fallback);
        let notice = notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("sample markers"));
        assert!(!session.store().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_outcomes_map_to_one_notice() {
        let remote = MemoryRemoteStore::new();
        let mut session = session(&remote);

        let (_, notice) = session.submit(draft("Fallen tree")).await;
        assert_eq!(notice.level, NoticeLevel::Success);

        remote.fail_next(RemoteError::Unavailable).await;
        let (_, notice) = session.submit(draft("Broken light")).await;
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("temporarily unavailable"));

        session.sign_out();
        let (_, notice) = session.submit(draft("Signed out")).await;
        assert_eq!(notice, Notice::error("Please sign in to add markers."));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_twice_is_noop_online_and_network_error_offline() {
        let remote = MemoryRemoteStore::new();
        let mut session = session(&remote);
        let (outcome, _) = session.submit(draft("Fallen tree")).await;
        let id = outcome.marker().unwrap().id.clone();
        let other = session.submit(draft("Keep me")).await.0;

        let removed = session.delete_marker(&id).await.unwrap();
        assert_eq!(removed.unwrap().id, id);
        assert_eq!(session.store().len(), 1);

        assert_eq!(session.delete_marker(&id).await, Ok(None));

        remote.fail_next(RemoteError::Network).await;
        assert_eq!(
            session.delete_marker(&id).await,
            Err(DeleteError::Remote(RemoteError::Network))
        );
        assert_eq!(session.store().len(), 1);
        assert_eq!(
            session.store().markers()[0].id,
            other.marker().unwrap().id
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_remote_delete_keeps_marker() {
        let remote = MemoryRemoteStore::new();
        let mut session = session(&remote);
        let (outcome, _) = session.submit(draft("Fallen tree")).await;
        let id = outcome.marker().unwrap().id.clone();

        remote.fail_next(RemoteError::PermissionDenied).await;
        let notice = session.delete(&id).await;
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(session.store().get(&id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn only_owner_may_delete() {
        let remote = MemoryRemoteStore::new();
        let mut session = session(&remote);
        let (outcome, _) = session.submit(draft("Fallen tree")).await;
        let id = outcome.marker().unwrap().id.clone();

        session.sign_in(Identity::new("someone-else", None));
        assert_eq!(
            session.delete_marker(&id).await,
            Err(DeleteError::NotOwner(id.to_string()))
        );
        session.sign_out();
        assert_eq!(
            session.delete_marker(&id).await,
            Err(DeleteError::AuthRequired)
        );
        assert_eq!(remote.delete_calls().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn local_markers_delete_without_network() {
        let remote = MemoryRemoteStore::new();
        remote.fail_next(RemoteError::Network).await;
        let mut session = session(&remote);
        let (outcome, _) = session.submit(draft("Offline report")).await;
        let marker = outcome.marker().unwrap().clone();
        assert!(marker.is_local);

        assert!(session.delete_marker(&marker.id).await.unwrap().is_some());
        assert_eq!(remote.delete_calls().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_requests_arrive_through_command_channel() {
        let remote = MemoryRemoteStore::new();
        let mut session = session(&remote);
        let (outcome, _) = session.submit(draft("Fallen tree")).await;
        let id = outcome.marker().unwrap().id.clone();

        session
            .commands()
            .send(MarkerCommand::Delete { id: id.clone() })
            .unwrap();
        let notices = session.process_commands().await;
        assert_eq!(notices, vec![Notice::success("Marker deleted.")]);
        assert!(session.store().get(&id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn late_write_replaces_local_copy() {
        let remote = MemoryRemoteStore::new();
        remote.stall_for(Duration::from_secs(8)).await;
        let mut session = session(&remote);
        let (outcome, _) = session.submit(draft("Slow network")).await;
        let local = outcome.marker().unwrap().clone();
        assert!(local.is_local);

        let notice = session.next_command().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(session.store().len(), 1);
        let synced = &session.store().markers()[0];
        assert!(!synced.is_local);
        assert_eq!(synced.id.as_str(), "mem-1");
        assert_eq!(synced.description, local.description);
    }

    #[tokio::test(start_paused = true)]
    async fn late_write_of_deleted_local_marker_is_removed_remotely() {
        let remote = MemoryRemoteStore::new();
        remote.stall_for(Duration::from_secs(8)).await;
        let mut session = session(&remote);
        let (outcome, _) = session.submit(draft("Deleted before sync")).await;
        let local_id = outcome.marker().unwrap().id.clone();

        let removed = session.delete_marker(&local_id).await.unwrap();
        assert_eq!(removed.map(|marker| marker.id), Some(local_id));
        assert_eq!(remote.delete_calls().await, 0);

        let notice = session.next_command().await.unwrap();
        assert_eq!(
            notice,
            Notice::info("A marker you deleted offline was also removed from the server.")
        );
        assert_eq!(remote.delete_calls().await, 1);
        assert!(remote.markers().await.is_empty());

        remote.clear_stall().await;
        session.load().await;
        assert!(session.store().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_removal_of_late_write_is_reported() {
        let remote = MemoryRemoteStore::new();
        remote.stall_for(Duration::from_secs(8)).await;
        let mut session = session(&remote);
        let (outcome, _) = session.submit(draft("Deleted before sync")).await;
        let local_id = outcome.marker().unwrap().id.clone();
        session.delete_marker(&local_id).await.unwrap();

        remote.clear_stall().await;
        remote.fail_next(RemoteError::Unavailable).await;
        let notice = session.next_command().await.unwrap();

        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("could not be removed"));
        assert_eq!(remote.markers().await.len(), 1);
    }

    #[tokio::test]
    async fn location_failure_is_reported_not_fatal() {
        let remote = MemoryRemoteStore::new();
        let mut session = session(&remote);
        let notice = session
            .locate(&FixedLocation(Err(LocationError::Timeout)))
            .await
            .unwrap_err();
        assert_eq!(notice, Notice::warning("Finding your location took too long."));

        let request = session
            .locate(&FixedLocation(Ok(Coordinate::new(18.45, -77.9))))
            .await
            .unwrap();
        assert_eq!(request.region, "St. James");
    }

    #[tokio::test(start_paused = true)]
    async fn render_reflects_store_after_submission() {
        let remote = MemoryRemoteStore::new();
        let mut session = session(&remote);
        let mut surface = RecordedSurface::new();
        session.render(&mut surface);
        assert!(surface.points(Layer::Markers).is_empty());

        session.submit(draft("Fallen tree")).await;
        let report = session.render(&mut surface);
        assert!(report.markers_redrawn);
        assert_eq!(surface.points(Layer::Markers).len(), 1);
    }

    #[test]
    fn remote_notices_follow_recoverability() {
        assert_eq!(remote_notice(&RemoteError::Network).level, NoticeLevel::Warning);
        assert_eq!(
            remote_notice(&RemoteError::Validation("bad".to_string())).level,
            NoticeLevel::Error
        );
    }
}
