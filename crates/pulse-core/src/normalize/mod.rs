//! Coerces marker payloads of any shape into a clean marker list.
//!
//! Upstream sources hand back a proper list, a keyed map of documents, a
//! JSON-encoded string, or nothing at all. Every ingestion path goes through
//! [`normalize`], which dispatches on the payload shape once and validates
//! each candidate record. Records without a usable id or coordinate are
//! dropped; nothing here returns an error.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use crate::models::{derive_title, Coordinate, Marker, MarkerId, Urgency};

/// Category assigned to records that do not carry one.
pub const DEFAULT_CATEGORY: &str = "object";

/// Nested JSON strings are unwrapped at most this many times.
const MAX_DECODE_DEPTH: usize = 2;

/// Shape of an incoming marker payload.
#[derive(Debug, Clone, Copy)]
pub enum RawMarkers<'a> {
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
    Encoded(&'a str),
    Absent,
}

impl<'a> RawMarkers<'a> {
    pub fn classify(input: &'a Value) -> Self {
        match input {
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => Self::Mapping(map),
            Value::String(text) => Self::Encoded(text),
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::Absent,
        }
    }
}

/// Normalize any payload into markers, preserving sequence order.
pub fn normalize(input: &Value) -> Vec<Marker> {
    normalize_at_depth(input, 0)
}

/// Normalize a raw text payload (a JSON document, or garbage).
pub fn normalize_text(input: &str) -> Vec<Marker> {
    decode(input, 0)
}

fn normalize_at_depth(input: &Value, depth: usize) -> Vec<Marker> {
    match RawMarkers::classify(input) {
        RawMarkers::Sequence(items) => items
            .iter()
            .filter_map(|item| normalize_record(item, None))
            .collect(),
        RawMarkers::Mapping(map) => map
            .iter()
            .filter_map(|(key, item)| normalize_record(item, Some(key)))
            .collect(),
        RawMarkers::Encoded(text) => decode(text, depth),
        RawMarkers::Absent => Vec::new(),
    }
}

fn decode(text: &str, depth: usize) -> Vec<Marker> {
    if depth >= MAX_DECODE_DEPTH {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => normalize_at_depth(&value, depth + 1),
        Err(error) => {
            tracing::debug!("Ignoring undecodable marker payload: {error}");
            Vec::new()
        }
    }
}

/// Validate and convert a single record.
///
/// `fallback_id` is used when the record itself carries no id (document
/// stores keyed by id).
pub fn normalize_record(value: &Value, fallback_id: Option<&str>) -> Option<Marker> {
    let record = value.as_object()?;

    let id = field(record, &["id", "_id"])
        .and_then(id_text)
        .or_else(|| fallback_id.map(str::trim).filter(|id| !id.is_empty()).map(String::from))?;

    let coordinate = extract_coordinate(record)?;

    let description = text_field(record, &["description", "content", "body"]).unwrap_or_default();
    let title = derive_title(text_field(record, &["title"]).as_deref(), &description);
    let category = text_field(record, &["category"])
        .map(|category| category.to_lowercase())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let urgency = text_field(record, &["urgency", "priority"])
        .and_then(|value| value.parse::<Urgency>().ok())
        .unwrap_or_default();

    let created_at = field(record, &["createdAt", "created_at"])
        .and_then(timestamp_millis)
        .unwrap_or(0);
    let updated_at = field(record, &["updatedAt", "updated_at"])
        .and_then(timestamp_millis)
        .unwrap_or(created_at);

    Some(Marker {
        id: MarkerId::new(id),
        title,
        category,
        description,
        coordinate,
        urgency,
        tags: extract_tags(record),
        images: extract_images(record),
        author_id: text_field(record, &["userId", "user_id", "authorId", "author_id"]),
        author_email: text_field(
            record,
            &["userEmail", "user_email", "authorEmail", "author_email"],
        ),
        created_at,
        updated_at,
        is_local: field(record, &["isLocal", "is_local"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// Server-assigned fields of a write acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub id: MarkerId,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

/// Read the id and timestamps the server attached to a created record.
/// Every other field of the answer is ignored.
pub fn normalize_acknowledgement(value: &Value) -> Option<Acknowledgement> {
    let record = value.as_object()?;
    let id = field(record, &["id", "_id"]).and_then(id_text)?;
    Some(Acknowledgement {
        id: MarkerId::new(id),
        created_at: field(record, &["createdAt", "created_at"]).and_then(timestamp_millis),
        updated_at: field(record, &["updatedAt", "updated_at"]).and_then(timestamp_millis),
    })
}

/// First present, non-null field among `names`.
fn field<'a>(record: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|value| !value.is_null())
}

fn text_field(record: &Map<String, Value>, names: &[&str]) -> Option<String> {
    field(record, names)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(String::from)
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn extract_coordinate(record: &Map<String, Value>) -> Option<Coordinate> {
    let coordinate = coordinate_pair(record).or_else(|| {
        field(record, &["coordinate", "coordinates", "location", "position"])
            .and_then(Value::as_object)
            .and_then(coordinate_pair)
    })?;
    coordinate.is_valid().then_some(coordinate)
}

fn coordinate_pair(record: &Map<String, Value>) -> Option<Coordinate> {
    let latitude = field(record, &["latitude", "lat"]).and_then(Value::as_f64)?;
    let longitude = field(record, &["longitude", "lng", "lon"]).and_then(Value::as_f64)?;
    Some(Coordinate::new(latitude, longitude))
}

fn extract_tags(record: &Map<String, Value>) -> BTreeSet<String> {
    field(record, &["tags"])
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn extract_images(record: &Map<String, Value>) -> Vec<String> {
    let mut images = field(record, &["images"])
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(Value::as_str)
                .filter(|image| !image.trim().is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if let Some(image) = text_field(record, &["image"]) {
        if !images.contains(&image) {
            images.push(image);
        }
    }
    images
}

/// Accepts epoch millis, RFC 3339 / naive ISO strings, and `{seconds, nanoseconds}` objects.
fn timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|value| value.is_finite()).map(f64_to_millis)),
        Value::String(text) => parse_timestamp_text(text.trim()),
        Value::Object(object) => {
            let seconds = object
                .get("seconds")
                .or_else(|| object.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = object
                .get("nanoseconds")
                .or_else(|| object.get("_nanoseconds"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            Some(seconds.saturating_mul(1000).saturating_add(nanos / 1_000_000))
        }
        _ => None,
    }
}

fn parse_timestamp_text(text: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[allow(clippy::cast_possible_truncation)]
fn f64_to_millis(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ids(markers: &[Marker]) -> Vec<&str> {
        markers.iter().map(|marker| marker.id.as_str()).collect()
    }

    #[test]
    fn sequence_keeps_order_and_drops_invalid_records() {
        let input = json!([
            {"id": "a", "latitude": 18.0, "longitude": -76.8, "description": "first"},
            {"id": "b", "latitude": "18.0", "longitude": -76.8},
            {"id": "c"},
            null,
            42,
            {"id": "d", "lat": 18.4, "lng": -77.9},
            {"id": "", "latitude": 18.0, "longitude": -76.8},
            {"id": "e", "latitude": 123.0, "longitude": -76.8},
            {"id": "f", "coordinate": {"latitude": 17.99, "longitude": -76.95}}
        ]);

        let markers = normalize(&input);
        assert_eq!(ids(&markers), vec!["a", "d", "f"]);
        assert!(markers.iter().all(|marker| marker.coordinate.is_valid()));
    }

    #[test]
    fn keyed_map_uses_keys_as_fallback_ids() {
        let input = json!({
            "doc-1": {"latitude": 18.0, "longitude": -76.8, "title": "Keyed"},
            "doc-2": {"id": "explicit", "latitude": 18.1, "longitude": -76.9},
            "doc-3": {"title": "no coordinate"}
        });

        let normalized = normalize(&input);
        let mut found = ids(&normalized);
        found.sort_unstable();
        assert_eq!(found, vec!["doc-1", "explicit"]);
    }

    #[test]
    fn absent_and_scalar_inputs_yield_nothing() {
        assert!(normalize(&Value::Null).is_empty());
        assert!(normalize(&json!(true)).is_empty());
        assert!(normalize(&json!(3.5)).is_empty());
    }

    #[test]
    fn encoded_strings_are_decoded_then_normalized() {
        let encoded = json!(r#"[{"id":"x","latitude":18.0,"longitude":-76.8}]"#);
        assert_eq!(ids(&normalize(&encoded)), vec!["x"]);

        assert!(normalize_text("{not json").is_empty());
        assert!(normalize_text("").is_empty());
        assert_eq!(
            ids(&normalize_text(r#"[{"id":"y","lat":18.0,"lng":-76.8}]"#)),
            vec!["y"]
        );
    }

    #[test]
    fn doubly_encoded_strings_stop_at_depth_limit() {
        let inner = r#"[{"id":"x","latitude":18.0,"longitude":-76.8}]"#;
        let twice = serde_json::to_string(&serde_json::to_string(inner).unwrap()).unwrap();
        assert!(normalize_text(&twice).is_empty());
    }

    #[test]
    fn record_fields_are_mapped_from_aliases() {
        let record = json!({
            "id": "m1",
            "latitude": 18.0179,
            "longitude": -76.8099,
            "category": "Traffic",
            "description": "Heavy traffic due to road construction. Expect delays on the way.",
            "urgency": "HIGH",
            "tags": ["road", " ", "delay"],
            "images": ["data:image/png;base64,AAA"],
            "image": "data:image/png;base64,BBB",
            "userId": "u1",
            "user_email": "a@example.com",
            "createdAt": {"seconds": 1_700_000_000, "nanoseconds": 5_000_000},
            "updated_at": "2023-11-14T22:13:20Z",
            "isLocal": true
        });

        let marker = normalize_record(&record, None).unwrap();
        assert_eq!(marker.category, "traffic");
        assert_eq!(marker.urgency, Urgency::High);
        assert!(marker.title.ends_with("..."));
        assert_eq!(marker.tags.len(), 2);
        assert_eq!(marker.images.len(), 2);
        assert_eq!(marker.author_id.as_deref(), Some("u1"));
        assert_eq!(marker.author_email.as_deref(), Some("a@example.com"));
        assert_eq!(marker.created_at, 1_700_000_000_005);
        assert_eq!(marker.updated_at, 1_700_000_000_000);
        assert!(marker.is_local);
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let marker =
            normalize_record(&json!({"id": 7, "latitude": 18.0, "longitude": -76.8}), None)
                .unwrap();
        assert_eq!(marker.id.as_str(), "7");
        assert_eq!(marker.category, DEFAULT_CATEGORY);
        assert_eq!(marker.urgency, Urgency::Normal);
        assert_eq!(marker.created_at, 0);
        assert!(!marker.is_local);
        assert!(marker.author_id.is_none());
    }

    #[test]
    fn naive_iso_timestamps_are_read_as_utc() {
        let marker = normalize_record(
            &json!({
                "id": "n",
                "latitude": 18.0,
                "longitude": -76.8,
                "created_at": "2023-11-14T22:13:20.500"
            }),
            None,
        )
        .unwrap();
        assert_eq!(marker.created_at, 1_700_000_000_500);
    }
}
