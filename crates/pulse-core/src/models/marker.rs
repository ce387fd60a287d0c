//! Marker model

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::Coordinate;
use crate::util::truncate_with_ellipsis;

/// Prefix of ids synthesized on the client for markers that never reached the server.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Maximum title length before an ellipsis is appended.
pub const TITLE_MAX_CHARS: usize = 50;

/// Opaque marker identifier. Server-assigned, or `local-<millis>-<token>` when
/// synthesized on the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Synthesize a client-side id that cannot collide with server ids.
    pub fn local(now_ms: i64) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self(format!("{LOCAL_ID_PREFIX}{now_ms}-{}", &token[..9]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarkerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How pressing a report is. Drives marker size and draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Urgency {
    pub const ALL: [Self; 4] = [Self::Low, Self::Normal, Self::High, Self::Critical];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Icon edge length in pixels.
    pub const fn marker_size_px(self) -> u32 {
        match self {
            Self::Low => 28,
            Self::Normal => 32,
            Self::High => 38,
            Self::Critical => 44,
        }
    }

    /// Higher values draw above lower ones.
    pub const fn z_index(self) -> i32 {
        match self {
            Self::Low => 100,
            Self::Normal => 200,
            Self::High => 300,
            Self::Critical => 400,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" | "medium" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "critical" | "urgent" => Ok(Self::Critical),
            other => Err(format!("unknown urgency '{other}'")),
        }
    }
}

/// Signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }
}

/// A geotagged report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub title: String,
    pub category: String,
    pub description: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub author_id: Option<String>,
    pub author_email: Option<String>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Exists only in this client's memory
    #[serde(default)]
    pub is_local: bool,
}

impl Marker {
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        self.author_id.as_deref() == Some(identity.id.as_str())
    }
}

/// Title shown for a report: the supplied title, or the opening of the description.
pub fn derive_title(title: Option<&str>, description: &str) -> String {
    match title.map(str::trim).filter(|title| !title.is_empty()) {
        Some(title) => title.to_string(),
        None => truncate_with_ellipsis(description.trim(), TITLE_MAX_CHARS),
    }
}

/// Fields the user composes before submitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDraft {
    pub title: Option<String>,
    pub category: String,
    pub description: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Hide the author's email (honoured for configured categories only)
    #[serde(default)]
    pub anonymous: bool,
}

impl MarkerDraft {
    pub fn new(
        category: impl Into<String>,
        description: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            title: None,
            category: category.into(),
            description: description.into(),
            coordinate,
            urgency: Urgency::Normal,
            tags: BTreeSet::new(),
            images: Vec::new(),
            anonymous: false,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn title(&self) -> String {
        derive_title(self.title.as_deref(), &self.description)
    }
}

/// Record sent to the remote store; the server assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMarker {
    pub title: String,
    pub category: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub urgency: Urgency,
    pub tags: BTreeSet<String>,
    pub images: Vec<String>,
    pub author_id: Option<String>,
    pub author_email: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl NewMarker {
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// The marker as it appears before the server answers.
    pub fn into_marker(self, id: MarkerId) -> Marker {
        let coordinate = self.coordinate();
        Marker {
            id,
            title: self.title,
            category: self.category,
            description: self.description,
            coordinate,
            urgency: self.urgency,
            tags: self.tags,
            images: self.images,
            author_id: self.author_id,
            author_email: self.author_email,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_local: false,
        }
    }
}
