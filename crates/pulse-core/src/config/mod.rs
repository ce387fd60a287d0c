//! Static catalog and runtime configuration.
//!
//! `PulseConfig` holds the fixed lists the engine works against: categories,
//! regions, settlements, moderation terms, and the thresholds that drive the
//! viewport. The default value embeds the island catalog; a replacement can
//! be loaded from JSON. `RuntimeConfig` carries endpoint and identity values
//! discovered from the environment.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{BoundingBox, Coordinate, Identity, Region, RegionShape, Settlement};
use crate::util::is_http_url;

pub use crate::util::normalize_text_option;

const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MODERATION_LATENCY_MS: u64 = 500;
const DEFAULT_MAX_IMAGES: usize = 5;
const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Zoom levels and distances that drive label tiers and navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewportSettings {
    pub default_center: Coordinate,
    pub default_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Below this zoom only region labels are shown
    pub settlement_zoom_threshold: f64,
    /// Below this zoom an active region is dropped
    pub region_detail_zoom: f64,
    /// Panning further than this from an active region's center drops it
    pub region_pan_clear_km: f64,
    /// Zoom used after centering on the device position
    pub locate_zoom: f64,
    /// Zoom used when focusing a single settlement
    pub focus_zoom: f64,
    pub viewport_width_px: u32,
    pub viewport_height_px: u32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            default_center: Coordinate::new(18.1096, -77.2975),
            default_zoom: 9.0,
            min_zoom: 7.0,
            max_zoom: 19.0,
            settlement_zoom_threshold: 11.0,
            region_detail_zoom: 10.0,
            region_pan_clear_km: 30.0,
            locate_zoom: 12.0,
            focus_zoom: 13.0,
            viewport_width_px: 1024,
            viewport_height_px: 768,
        }
    }
}

/// Fixed catalog shared by every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    pub categories: Vec<String>,
    /// Categories whose posts may hide the author's email
    #[serde(default)]
    pub anonymous_categories: Vec<String>,
    /// Checked in order, first match wins
    pub regions: Vec<Region>,
    pub default_region: String,
    pub settlements: Vec<Settlement>,
    pub moderation_terms: Vec<String>,
    #[serde(default = "default_moderation_latency_ms")]
    pub moderation_latency_ms: u64,
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    #[serde(default)]
    pub viewport: ViewportSettings,
}

const fn default_moderation_latency_ms() -> u64 {
    DEFAULT_MODERATION_LATENCY_MS
}

const fn default_submit_timeout_ms() -> u64 {
    DEFAULT_SUBMIT_TIMEOUT_MS
}

const fn default_max_images() -> usize {
    DEFAULT_MAX_IMAGES
}

const fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}

impl PulseConfig {
    /// Parse and validate a catalog from JSON.
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub const fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub const fn moderation_latency(&self) -> Duration {
        Duration::from_millis(self.moderation_latency_ms)
    }

    pub fn is_known_category(&self, category: &str) -> bool {
        self.categories.iter().any(|known| known == category)
    }

    pub fn allows_anonymous(&self, category: &str) -> bool {
        self.anonymous_categories.iter().any(|known| known == category)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(invalid("at least one category is required"));
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.trim().is_empty() || category != &category.to_lowercase() {
                return Err(invalid(format!(
                    "category '{category}' must be a non-empty lowercase name"
                )));
            }
            if !seen.insert(category.as_str()) {
                return Err(invalid(format!("duplicate category '{category}'")));
            }
        }
        for category in &self.anonymous_categories {
            if !self.is_known_category(category) {
                return Err(invalid(format!(
                    "anonymous category '{category}' is not a known category"
                )));
            }
        }

        if self.regions.is_empty() {
            return Err(invalid("at least one region is required"));
        }
        for region in &self.regions {
            if region.name.trim().is_empty() {
                return Err(invalid("region names must not be empty"));
            }
            let well_formed = match &region.shape {
                RegionShape::Box { bounds } => bounds.is_well_formed(),
                RegionShape::Circle { center, radius_km } => {
                    center.is_valid() && radius_km.is_finite() && *radius_km > 0.0
                }
            };
            if !well_formed {
                return Err(invalid(format!("region '{}' has invalid bounds", region.name)));
            }
        }
        if !self.regions.iter().any(|region| region.name == self.default_region) {
            return Err(invalid(format!(
                "default region '{}' is not in the region list",
                self.default_region
            )));
        }

        for settlement in &self.settlements {
            if settlement.name.trim().is_empty() || !settlement.coordinate.is_valid() {
                return Err(invalid(format!(
                    "settlement '{}' has an invalid name or coordinate",
                    settlement.name
                )));
            }
        }

        if self.submit_timeout_ms == 0 {
            return Err(invalid("submit_timeout_ms must be positive"));
        }
        if self.max_images == 0 || self.max_image_bytes == 0 {
            return Err(invalid("image limits must be positive"));
        }

        let viewport = &self.viewport;
        if viewport.min_zoom > viewport.max_zoom {
            return Err(invalid("viewport min_zoom must not exceed max_zoom"));
        }
        if !viewport.default_center.is_valid() {
            return Err(invalid("viewport default_center is not a valid coordinate"));
        }
        if viewport.viewport_width_px == 0 || viewport.viewport_height_px == 0 {
            return Err(invalid("viewport pixel size must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            categories: [
                "event", "traffic", "hazard", "weather", "crime", "food", "service", "object",
            ]
            .map(String::from)
            .to_vec(),
            anonymous_categories: vec!["crime".to_string()],
            regions: default_regions(),
            default_region: "Kingston".to_string(),
            settlements: default_settlements(),
            moderation_terms: [
                "fuck",
                "fucking",
                "shit",
                "shitty",
                "bitch",
                "asshole",
                "bastard",
                "crap",
                "piss",
                "kill",
                "murder",
                "free money",
                "click here",
                "win now",
                "act now",
                "limited time",
            ]
            .map(String::from)
            .to_vec(),
            moderation_latency_ms: DEFAULT_MODERATION_LATENCY_MS,
            submit_timeout_ms: DEFAULT_SUBMIT_TIMEOUT_MS,
            max_images: DEFAULT_MAX_IMAGES,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            viewport: ViewportSettings::default(),
        }
    }
}

fn default_regions() -> Vec<Region> {
    [
        ("Kingston", 18.0, -76.9, 18.1, -76.7),
        ("St. James", 18.4, -78.0, 18.5, -77.8),
        ("St. Andrew", 18.1, -77.0, 18.3, -76.8),
        ("St. Catherine", 18.0, -77.2, 18.2, -77.0),
        ("St. Ann", 18.3, -77.2, 18.5, -77.0),
        ("Manchester", 18.1, -77.4, 18.3, -77.2),
        ("Clarendon", 17.9, -77.3, 18.1, -77.1),
        ("Trelawny", 18.2, -77.6, 18.4, -77.4),
        ("St. Elizabeth", 18.0, -77.8, 18.2, -77.6),
        ("Hanover", 18.3, -78.2, 18.5, -78.0),
        ("Westmoreland", 18.1, -78.2, 18.3, -78.0),
        ("Portland", 18.3, -76.5, 18.5, -76.3),
        ("St. Mary", 18.2, -76.7, 18.4, -76.5),
        ("St. Thomas", 17.8, -76.5, 18.0, -76.3),
    ]
    .into_iter()
    .map(|(name, south, west, north, east)| {
        Region::with_bounds(name, BoundingBox::new(south, west, north, east))
    })
    .collect()
}

fn default_settlements() -> Vec<Settlement> {
    vec![
        Settlement::new("Kingston", 17.9970, -76.7936, 10.0),
        Settlement::new("Montego Bay", 18.4762, -77.8939, 10.0),
        Settlement::new("Spanish Town", 17.9911, -76.9567, 11.0),
        Settlement::new("Portmore", 17.9500, -76.8800, 11.0),
        Settlement::new("Mandeville", 18.0418, -77.5071, 11.0),
        Settlement::new("May Pen", 17.9645, -77.2452, 11.0),
        Settlement::new("Ocho Rios", 18.4074, -77.1031, 11.0),
        Settlement::new("Negril", 18.2683, -78.3476, 11.0),
        Settlement::new("Port Antonio", 18.1762, -76.4503, 11.0),
        Settlement::new("Savanna-la-Mar", 18.2190, -78.1328, 12.0),
        Settlement::new("Falmouth", 18.4936, -77.6559, 12.0),
        Settlement::new("Morant Bay", 17.8815, -76.4093, 12.0),
        Settlement::new("Port Maria", 18.3691, -76.8903, 12.0),
        Settlement::new("Black River", 18.0264, -77.8487, 12.0),
        Settlement::new("Lucea", 18.4509, -78.1736, 12.0),
        Settlement::new("St. Ann's Bay", 18.4358, -77.2014, 12.0),
        Settlement::new("Linstead", 18.1368, -77.0317, 13.0),
        Settlement::new("Old Harbour", 17.9414, -77.1089, 13.0),
        Settlement::new("Half Way Tree", 18.0126, -76.7990, 13.0),
        Settlement::new("Christiana", 18.1746, -77.4888, 13.0),
    ]
}

/// Endpoint and identity values supplied by the host environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub api_base_url: Option<String>,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
}

impl RuntimeConfig {
    /// Build from raw values, trimming and dropping empties.
    pub fn from_values(
        api_base_url: Option<String>,
        access_token: Option<String>,
        user_id: Option<String>,
        user_email: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_base_url = match normalize_text_option(api_base_url) {
            Some(url) if is_http_url(&url) => Some(url.trim_end_matches('/').to_string()),
            Some(_) => {
                return Err(invalid("API base URL must include http:// or https://"));
            }
            None => None,
        };

        Ok(Self {
            api_base_url,
            access_token: normalize_text_option(access_token),
            user_id: normalize_text_option(user_id),
            user_email: normalize_text_option(user_email),
        })
    }

    /// Read `PULSE_API_URL`, `PULSE_ACCESS_TOKEN`, `PULSE_USER_ID`, `PULSE_USER_EMAIL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            std::env::var("PULSE_API_URL").ok(),
            std::env::var("PULSE_ACCESS_TOKEN").ok(),
            std::env::var("PULSE_USER_ID").ok(),
            std::env::var("PULSE_USER_EMAIL").ok(),
        )
    }

    pub fn identity(&self) -> Option<Identity> {
        self.user_id
            .as_ref()
            .map(|id| Identity::new(id.clone(), self.user_email.clone()))
    }
}
