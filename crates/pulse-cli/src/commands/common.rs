use std::path::Path;

use pulse_core::models::{Marker, NewMarker};
use pulse_core::remote::{HttpRemoteStore, OfflineRemoteStore, RemoteResult, RemoteStore};
use pulse_core::resolver::RegionResolver;
use pulse_core::util::{format_relative_time, truncate_with_ellipsis};
use pulse_core::{MarkerId, Notice, NoticeLevel, PulseConfig, PulseSession, RuntimeConfig};
use serde_json::Value;

use crate::error::CliError;

/// Remote store picked from the environment.
#[derive(Debug, Clone)]
pub enum CliRemote {
    Http(HttpRemoteStore),
    Offline(OfflineRemoteStore),
}

impl RemoteStore for CliRemote {
    async fn list(&self) -> RemoteResult<Value> {
        match self {
            Self::Http(remote) => remote.list().await,
            Self::Offline(remote) => remote.list().await,
        }
    }

    async fn create(&self, marker: NewMarker) -> RemoteResult<Value> {
        match self {
            Self::Http(remote) => remote.create(marker).await,
            Self::Offline(remote) => remote.create(marker).await,
        }
    }

    async fn delete(&self, id: &MarkerId) -> RemoteResult<()> {
        match self {
            Self::Http(remote) => remote.delete(id).await,
            Self::Offline(remote) => remote.delete(id).await,
        }
    }
}

pub fn load_catalog(path: Option<&Path>) -> Result<PulseConfig, CliError> {
    match path {
        Some(path) => {
            let payload = std::fs::read_to_string(path)?;
            Ok(PulseConfig::from_json(&payload)?)
        }
        None => Ok(PulseConfig::default()),
    }
}

pub fn build_remote(runtime: &RuntimeConfig, offline: bool) -> Result<CliRemote, CliError> {
    if offline {
        return Ok(CliRemote::Offline(OfflineRemoteStore));
    }
    match &runtime.api_base_url {
        Some(url) => Ok(CliRemote::Http(HttpRemoteStore::new(
            url.clone(),
            runtime.access_token.clone(),
        )?)),
        None => {
            tracing::debug!("PULSE_API_URL is not set; working offline");
            Ok(CliRemote::Offline(OfflineRemoteStore))
        }
    }
}

pub fn open_session<R: RemoteStore>(
    config: PulseConfig,
    remote: R,
    runtime: &RuntimeConfig,
) -> Result<PulseSession<R>, CliError> {
    let mut session = PulseSession::new(config, remote)?;
    if let Some(identity) = runtime.identity() {
        session.sign_in(identity);
    }
    Ok(session)
}

/// Load markers, reporting a degraded load on stderr.
pub async fn load_markers<R: RemoteStore>(session: &mut PulseSession<R>) {
    let (_, notice) = session.load().await;
    if let Some(notice) = notice {
        print_notice(&notice);
    }
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success | NoticeLevel::Info => eprintln!("{}", notice.message),
        NoticeLevel::Warning => eprintln!("Warning: {}", notice.message),
        NoticeLevel::Error => eprintln!("Error: {}", notice.message),
    }
}

/// Join CLI words into one trimmed text, `None` when blank.
pub fn join_text(parts: &[String]) -> Option<String> {
    let joined = parts.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn resolve_region_name(resolver: &RegionResolver, name: &str) -> Result<String, CliError> {
    resolver
        .find(name)
        .map(|region| region.name.clone())
        .ok_or_else(|| CliError::UnknownRegion(name.trim().to_string()))
}

pub fn format_marker_lines(markers: &[&Marker], resolver: &RegionResolver, now_ms: i64) -> Vec<String> {
    markers
        .iter()
        .map(|marker| {
            let id = marker.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let title = truncate_with_ellipsis(&marker.title, 37);
            let region = &resolver.resolve(&marker.coordinate).name;
            let relative_time = format_relative_time(marker.created_at, now_ms);
            let line = format!(
                "{short_id:<13}  {title:<40}  {:<8}  {:<8}  {region:<14}  {relative_time}",
                marker.category,
                marker.urgency.as_str()
            );
            if marker.is_local {
                format!("{line}  [local]")
            } else {
                line
            }
        })
        .collect()
}
