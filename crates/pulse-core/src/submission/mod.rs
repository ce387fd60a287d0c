//! Optimistic marker submission.
//!
//! A submission is validated and moderated, shown immediately under a local
//! id, then raced against the configured timeout. The remote create is
//! spawned and never cancelled: when it loses the race the marker stays as a
//! local-only copy, and a late success is reported on the command channel so
//! the session can swap in the confirmed record.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::command::{CommandSender, MarkerCommand};
use crate::config::PulseConfig;
use crate::error::{ConfigError, RemoteError, SubmitError, ValidationError};
use crate::moderation::ContentModerator;
use crate::models::{derive_title, Identity, Marker, MarkerDraft, MarkerId, NewMarker};
use crate::normalize::normalize_acknowledgement;
use crate::remote::RemoteStore;
use crate::store::MarkerStore;
use crate::util::{is_http_url, now_millis};

const DATA_IMAGE_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// How a submission settled. Exactly one is produced per call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The remote store accepted the marker in time.
    Confirmed(Marker),
    /// The write failed or timed out; the marker is kept in memory only.
    LocalFallback { marker: Marker, reason: RemoteError },
    /// Nothing was created. The draft is handed back for correction.
    Rejected {
        draft: MarkerDraft,
        error: SubmitError,
    },
}

impl SubmissionOutcome {
    pub fn marker(&self) -> Option<&Marker> {
        match self {
            Self::Confirmed(marker) | Self::LocalFallback { marker, .. } => Some(marker),
            Self::Rejected { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionPipeline {
    config: Arc<PulseConfig>,
    moderator: ContentModerator,
    timeout: Duration,
    commands: Option<CommandSender>,
}

impl SubmissionPipeline {
    pub fn new(config: Arc<PulseConfig>) -> Result<Self, ConfigError> {
        let moderator = ContentModerator::from_config(&config)?;
        let timeout = config.submit_timeout();
        Ok(Self {
            config,
            moderator,
            timeout,
            commands: None,
        })
    }

    /// Report late successes on `commands`.
    #[must_use]
    pub fn with_commands(mut self, commands: CommandSender) -> Self {
        self.commands = Some(commands);
        self
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn moderator(&self) -> &ContentModerator {
        &self.moderator
    }

    /// Client-side checks that run before anything is shown or sent.
    pub fn validate(&self, draft: &MarkerDraft) -> Result<(), ValidationError> {
        if draft.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let category = normalize_category(&draft.category);
        if !self.config.is_known_category(&category) {
            return Err(ValidationError::UnknownCategory(category));
        }
        if !draft.coordinate.is_valid() {
            return Err(ValidationError::InvalidCoordinate);
        }
        if draft.images.len() > self.config.max_images {
            return Err(ValidationError::TooManyImages {
                max: self.config.max_images,
            });
        }
        for (index, image) in draft.images.iter().enumerate() {
            validate_image(index, image, self.config.max_image_bytes)?;
        }
        Ok(())
    }

    pub async fn submit<R: RemoteStore>(
        &self,
        store: &mut MarkerStore,
        remote: &R,
        identity: Option<&Identity>,
        draft: MarkerDraft,
    ) -> SubmissionOutcome {
        let Some(identity) = identity else {
            return rejected(draft, SubmitError::AuthRequired);
        };
        if let Err(error) = self.validate(&draft) {
            return rejected(draft, error.into());
        }

        let new_marker = self.prepare(&draft, identity).await;
        let temp_id = MarkerId::local(new_marker.created_at);
        let optimistic = new_marker.clone().into_marker(temp_id.clone());
        store.insert_optimistic(optimistic.clone());

        let task_remote = remote.clone();
        let mut handle = tokio::spawn(async move { task_remote.create(new_marker).await });

        match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(Ok(payload))) => match confirmed_marker(&payload, &optimistic) {
                Some(confirmed) => {
                    tracing::info!("Marker {} confirmed as {}", temp_id, confirmed.id);
                    store.confirm(&temp_id, confirmed.clone());
                    SubmissionOutcome::Confirmed(confirmed)
                }
                None => keep_local(
                    store,
                    optimistic,
                    RemoteError::InvalidResponse("create response carried no marker id".to_string()),
                ),
            },
            Ok(Ok(Err(error))) if error.is_recoverable() => keep_local(store, optimistic, error),
            Ok(Ok(Err(error))) => {
                tracing::warn!("Remote store rejected marker: {error}");
                store.remove(&temp_id);
                rejected(draft, SubmitError::Remote(error))
            }
            Ok(Err(join_error)) => {
                keep_local(store, optimistic, RemoteError::Other(join_error.to_string()))
            }
            Err(_elapsed) => {
                self.reconcile_later(handle, optimistic.clone());
                keep_local(store, optimistic, RemoteError::Timeout)
            }
        }
    }

    /// Moderate the text and build the record sent to the remote store.
    async fn prepare(&self, draft: &MarkerDraft, identity: &Identity) -> NewMarker {
        let title = draft.title.as_deref().unwrap_or_default();
        let (title, description) = tokio::join!(
            self.moderator.moderate(title),
            self.moderator.moderate(draft.description.trim()),
        );

        let category = normalize_category(&draft.category);
        let anonymous = draft.anonymous && self.config.allows_anonymous(&category);
        let now = now_millis();

        NewMarker {
            title: derive_title(Some(&title.clean), &description.clean),
            category,
            description: description.clean,
            latitude: draft.coordinate.latitude,
            longitude: draft.coordinate.longitude,
            urgency: draft.urgency,
            tags: draft
                .tags
                .iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            images: draft.images.clone(),
            author_id: Some(identity.id.clone()),
            author_email: if anonymous {
                None
            } else {
                identity.email.clone()
            },
            created_at: now,
            updated_at: now,
        }
    }

    fn reconcile_later(
        &self,
        handle: tokio::task::JoinHandle<Result<Value, RemoteError>>,
        optimistic: Marker,
    ) {
        let Some(commands) = self.commands.clone() else {
            return;
        };
        tokio::spawn(async move {
            let local_id = optimistic.id.clone();
            match handle.await {
                Ok(Ok(payload)) => match confirmed_marker(&payload, &optimistic) {
                    Some(marker) => {
                        tracing::info!("Late write for {local_id} succeeded as {}", marker.id);
                        if commands
                            .send(MarkerCommand::Reconcile { local_id, marker })
                            .is_err()
                        {
                            tracing::debug!("Session closed before late write could be reconciled");
                        }
                    }
                    None => tracing::warn!("Late write for {local_id} returned no marker id"),
                },
                Ok(Err(error)) => tracing::debug!("Late write for {local_id} failed: {error}"),
                Err(error) => tracing::warn!("Late write task for {local_id} aborted: {error}"),
            }
        });
    }
}

fn rejected(draft: MarkerDraft, error: SubmitError) -> SubmissionOutcome {
    SubmissionOutcome::Rejected { draft, error }
}

fn keep_local(store: &mut MarkerStore, mut marker: Marker, reason: RemoteError) -> SubmissionOutcome {
    tracing::warn!("Keeping marker {} local only: {reason}", marker.id);
    store.mark_local(&marker.id);
    marker.is_local = true;
    SubmissionOutcome::LocalFallback { marker, reason }
}

/// The composed marker under the server's id and timestamps.
fn confirmed_marker(payload: &Value, optimistic: &Marker) -> Option<Marker> {
    let acknowledgement = normalize_acknowledgement(payload)?;
    let created_at = acknowledgement.created_at.unwrap_or(optimistic.created_at);
    let updated_at = acknowledgement
        .updated_at
        .or(acknowledgement.created_at)
        .unwrap_or(optimistic.updated_at);
    Some(Marker {
        id: acknowledgement.id,
        created_at,
        updated_at,
        is_local: false,
        ..optimistic.clone()
    })
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

fn validate_image(index: usize, image: &str, max_bytes: usize) -> Result<(), ValidationError> {
    if is_http_url(image) {
        return Ok(());
    }
    let payload = image
        .strip_prefix(DATA_IMAGE_PREFIX)
        .and_then(|rest| rest.split_once(BASE64_MARKER))
        .map(|(_, payload)| payload)
        .ok_or(ValidationError::UnsupportedImage { index })?;

    let padding = payload.bytes().rev().take_while(|byte| *byte == b'=').count();
    let decoded = (payload.len() / 4 * 3).saturating_sub(padding);
    if decoded > max_bytes {
        return Err(ValidationError::ImageTooLarge {
            index,
            max_bytes,
        });
    }
    Ok(())
}
