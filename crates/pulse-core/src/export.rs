//! Marker feed export for sharing outside the app.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Marker, Urgency};
use crate::resolver::RegionResolver;
use crate::util::format_relative_time;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Flattened marker as it appears in an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMarker {
    pub id: String,
    pub title: String,
    pub category: String,
    pub urgency: Urgency,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub tags: Vec<String>,
    pub author_email: Option<String>,
    pub created_at: String,
    pub age: String,
    pub is_local: bool,
}

#[must_use]
pub fn marker_to_export_item(marker: &Marker, resolver: &RegionResolver, now_ms: i64) -> ExportMarker {
    ExportMarker {
        id: marker.id.to_string(),
        title: marker.title.clone(),
        category: marker.category.clone(),
        urgency: marker.urgency,
        region: resolver.resolve(&marker.coordinate).name.clone(),
        latitude: marker.coordinate.latitude,
        longitude: marker.coordinate.longitude,
        description: marker.description.clone(),
        tags: marker.tags.iter().cloned().collect(),
        author_email: marker.author_email.clone(),
        created_at: rfc3339(marker.created_at),
        age: format_relative_time(marker.created_at, now_ms),
        is_local: marker.is_local,
    }
}

/// Render markers as pretty-printed JSON.
pub fn render_json_export(
    markers: &[&Marker],
    resolver: &RegionResolver,
    now_ms: i64,
) -> serde_json::Result<String> {
    let items = markers
        .iter()
        .map(|marker| marker_to_export_item(marker, resolver, now_ms))
        .collect::<Vec<ExportMarker>>();
    serde_json::to_string_pretty(&items)
}

/// Render markers as Markdown sections, in the order given.
#[must_use]
pub fn render_markdown_export(markers: &[&Marker], resolver: &RegionResolver, now_ms: i64) -> String {
    let mut output = String::new();

    for (index, marker) in markers.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let item = marker_to_export_item(marker, resolver, now_ms);
        let _ = writeln!(output, "## {}", item.title);
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "- {} · {} · {} ({})",
            item.category, item.urgency, item.region, item.age
        );
        let _ = writeln!(output, "- {:.4}, {:.4}", item.latitude, item.longitude);
        if item.is_local {
            let _ = writeln!(output, "- saved on this device only");
        }
        if !item.tags.is_empty() {
            let _ = writeln!(output, "- tags: {}", item.tags.join(", "));
        }
        let _ = writeln!(output);
        output.push_str(&item.description);
        output.push('\n');
    }

    output
}

pub fn render_markers_export(
    markers: &[&Marker],
    resolver: &RegionResolver,
    now_ms: i64,
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(markers, resolver, now_ms),
        ExportFormat::Markdown => Ok(render_markdown_export(markers, resolver, now_ms)),
    }
}

#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("pulse-feed-{timestamp_ms}.{}", format.extension())
}

fn rfc3339(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|time| time.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulseConfig;
    use crate::models::{Coordinate, MarkerId};

    fn resolver() -> RegionResolver {
        RegionResolver::from_config(&PulseConfig::default()).unwrap()
    }

    fn marker() -> Marker {
        Marker {
            id: MarkerId::new("m1"),
            title: "Pothole".to_string(),
            category: "hazard".to_string(),
            description: "Deep pothole".to_string(),
            coordinate: Coordinate::new(18.45, -77.9),
            urgency: Urgency::High,
            tags: ["road".to_string(), "car".to_string()].into_iter().collect(),
            images: Vec::new(),
            author_id: Some("u1".to_string()),
            author_email: None,
            created_at: 0,
            updated_at: 0,
            is_local: true,
        }
    }

    #[test]
    fn export_item_carries_region_and_age() {
        let item = marker_to_export_item(&marker(), &resolver(), 5 * 60_000);
        assert_eq!(item.region, "St. James");
        assert_eq!(item.age, "5m ago");
        assert_eq!(item.created_at, "1970-01-01T00:00:00+00:00");
        assert_eq!(item.tags, vec!["car", "road"]);
    }

    #[test]
    fn json_export_round_trips_through_serde() {
        let marker = marker();
        let rendered = render_json_export(&[&marker], &resolver(), 0).unwrap();
        let parsed: Vec<ExportMarker> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].urgency, Urgency::High);
    }

    #[test]
    fn markdown_export_flags_local_markers() {
        let marker = marker();
        let rendered = render_markdown_export(&[&marker], &resolver(), 0);
        assert!(rendered.starts_with("## Pothole\n"));
        assert!(rendered.contains("hazard · high · St. James (just now)"));
        assert!(rendered.contains("saved on this device only"));
        assert!(rendered.contains("tags: car, road"));
    }

    #[test]
    fn suggested_file_name_uses_format_extension() {
        assert_eq!(
            suggested_export_file_name(ExportFormat::Json, 123),
            "pulse-feed-123.json"
        );
        assert_eq!(
            suggested_export_file_name(ExportFormat::Markdown, 456),
            "pulse-feed-456.md"
        );
    }
}
