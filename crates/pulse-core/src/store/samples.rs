//! Demonstration markers shown when the remote collection cannot be reached.

use crate::models::{Coordinate, Marker, MarkerId, Urgency};

const HOUR_MS: i64 = 60 * 60 * 1000;

struct Sample {
    title: &'static str,
    category: &'static str,
    description: &'static str,
    latitude: f64,
    longitude: f64,
    urgency: Urgency,
    email: &'static str,
    hours_ago: i64,
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "Traffic Jam on Hope Road",
        category: "traffic",
        description: "Heavy traffic due to road construction. Expect delays.",
        latitude: 18.0179,
        longitude: -76.8099,
        urgency: Urgency::High,
        email: "traffic@jamaica.com",
        hours_ago: 2,
    },
    Sample {
        title: "Street Food Festival",
        category: "event",
        description: "Annual street food festival in downtown Kingston. Live music and local vendors.",
        latitude: 18.0333,
        longitude: -76.7833,
        urgency: Urgency::Normal,
        email: "events@jamaica.com",
        hours_ago: 4,
    },
    Sample {
        title: "Pothole on Spanish Town Road",
        category: "hazard",
        description: "Large pothole causing vehicle damage. Drive carefully.",
        latitude: 17.9911,
        longitude: -76.9567,
        urgency: Urgency::High,
        email: "reporter@jamaica.com",
        hours_ago: 6,
    },
    Sample {
        title: "Best Jerk Chicken Spot",
        category: "food",
        description: "Authentic jerk chicken with secret family recipe. Highly recommended!",
        latitude: 18.4052,
        longitude: -77.1034,
        urgency: Urgency::Low,
        email: "foodie@jamaica.com",
        hours_ago: 8,
    },
    Sample {
        title: "Weather Alert - Heavy Rain",
        category: "weather",
        description: "Heavy rainfall expected. Flash flood warning in effect.",
        latitude: 18.1773,
        longitude: -76.4528,
        urgency: Urgency::Critical,
        email: "weather@jamaica.com",
        hours_ago: 1,
    },
    Sample {
        title: "Road Closure - Bridge Maintenance",
        category: "traffic",
        description: "Bridge closed for maintenance. Use alternative route via Marcus Garvey Drive.",
        latitude: 18.2687,
        longitude: -78.3481,
        urgency: Urgency::High,
        email: "roads@jamaica.com",
        hours_ago: 3,
    },
    Sample {
        title: "Community Cleanup Event",
        category: "event",
        description: "Join us for a beach cleanup this weekend. Gloves and bags provided.",
        latitude: 18.0412,
        longitude: -77.5055,
        urgency: Urgency::Normal,
        email: "community@jamaica.com",
        hours_ago: 12,
    },
    Sample {
        title: "ATM Out of Service",
        category: "service",
        description: "ATM at the plaza is out of service. Nearest working machine is across the street.",
        latitude: 17.9645,
        longitude: -77.2419,
        urgency: Urgency::Normal,
        email: "service@jamaica.com",
        hours_ago: 5,
    },
];

/// Sample markers timestamped relative to `now_ms`, newest first.
///
/// Samples carry no author id, so nobody can delete them.
pub fn fallback_markers(now_ms: i64) -> Vec<Marker> {
    let mut markers = SAMPLES
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            let created_at = now_ms - sample.hours_ago * HOUR_MS;
            Marker {
                id: MarkerId::new(format!("sample-{}", index + 1)),
                title: sample.title.to_string(),
                category: sample.category.to_string(),
                description: sample.description.to_string(),
                coordinate: Coordinate::new(sample.latitude, sample.longitude),
                urgency: sample.urgency,
                tags: Default::default(),
                images: Vec::new(),
                author_id: None,
                author_email: Some(sample.email.to_string()),
                created_at,
                updated_at: created_at,
                is_local: false,
            }
        })
        .collect::<Vec<_>>();
    markers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    markers
}
