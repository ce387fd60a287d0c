//! Region feed: the list view beside the map.

use std::cmp::Reverse;
use std::str::FromStr;

use serde::Serialize;

use crate::models::Marker;
use crate::resolver::RegionResolver;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const EVENT_CATEGORY: &str = "event";

/// Feed ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedSort {
    #[default]
    Recent,
    Urgency,
}

impl FromStr for FeedSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" | "newest" => Ok(Self::Recent),
            "urgency" | "urgent" => Ok(Self::Urgency),
            other => Err(format!("unknown sort '{other}'")),
        }
    }
}

/// Counters shown above the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FeedStats {
    pub total: usize,
    pub last_24h: usize,
    pub events: usize,
}

/// Markers whose coordinate resolves to `region`, in input order.
pub fn region_feed<'a>(
    markers: impl IntoIterator<Item = &'a Marker>,
    resolver: &RegionResolver,
    region: &str,
) -> Vec<&'a Marker> {
    markers
        .into_iter()
        .filter(|marker| {
            resolver
                .resolve(&marker.coordinate)
                .name
                .eq_ignore_ascii_case(region.trim())
        })
        .collect()
}

/// Sort in place. Ties keep their relative order.
pub fn sort_feed(markers: &mut [&Marker], sort: FeedSort) {
    match sort {
        FeedSort::Recent => markers.sort_by_key(|marker| Reverse(marker.created_at)),
        FeedSort::Urgency => {
            markers.sort_by_key(|marker| (Reverse(marker.urgency), Reverse(marker.created_at)));
        }
    }
}

pub fn feed_stats<'a>(markers: impl IntoIterator<Item = &'a Marker>, now_ms: i64) -> FeedStats {
    markers
        .into_iter()
        .fold(FeedStats::default(), |mut stats, marker| {
            stats.total += 1;
            if now_ms.saturating_sub(marker.created_at) < DAY_MS {
                stats.last_24h += 1;
            }
            if marker.category == EVENT_CATEGORY {
                stats.events += 1;
            }
            stats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulseConfig;
    use crate::models::{Coordinate, MarkerId, Urgency};

    fn marker(id: &str, category: &str, urgency: Urgency, coordinate: Coordinate, created_at: i64) -> Marker {
        Marker {
            id: MarkerId::new(id),
            title: id.to_string(),
            category: category.to_string(),
            description: String::new(),
            coordinate,
            urgency,
            tags: Default::default(),
            images: Vec::new(),
            author_id: None,
            author_email: None,
            created_at,
            updated_at: created_at,
            is_local: false,
        }
    }

    fn ids(markers: &[&Marker]) -> Vec<String> {
        markers.iter().map(|marker| marker.id.to_string()).collect()
    }

    #[test]
    fn region_feed_uses_resolver_with_default_fallback() {
        let resolver = RegionResolver::from_config(&PulseConfig::default()).unwrap();
        let markers = vec![
            marker("kingston", "event", Urgency::Normal, Coordinate::new(18.05, -76.8), 1),
            marker("mobay", "event", Urgency::Normal, Coordinate::new(18.45, -77.9), 2),
            marker("nowhere", "event", Urgency::Normal, Coordinate::new(17.0, -75.0), 3),
        ];
        assert_eq!(
            ids(&region_feed(&markers, &resolver, "kingston")),
            vec!["kingston", "nowhere"]
        );
        assert_eq!(ids(&region_feed(&markers, &resolver, "St. James")), vec!["mobay"]);
    }

    #[test]
    fn urgency_sort_breaks_ties_by_recency() {
        let here = Coordinate::new(18.0, -76.8);
        let markers = [
            marker("old-high", "hazard", Urgency::High, here, 1),
            marker("low", "food", Urgency::Low, here, 5),
            marker("new-high", "hazard", Urgency::High, here, 3),
            marker("critical", "weather", Urgency::Critical, here, 0),
        ];
        let mut feed = markers.iter().collect::<Vec<_>>();
        sort_feed(&mut feed, FeedSort::Urgency);
        assert_eq!(ids(&feed), vec!["critical", "new-high", "old-high", "low"]);

        sort_feed(&mut feed, FeedSort::Recent);
        assert_eq!(ids(&feed), vec!["low", "new-high", "old-high", "critical"]);
    }

    #[test]
    fn stats_count_recent_and_events() {
        let here = Coordinate::new(18.0, -76.8);
        let now = 10 * DAY_MS;
        let markers = [
            marker("a", "event", Urgency::Normal, here, now - 1000),
            marker("b", "traffic", Urgency::Normal, here, now - 2 * DAY_MS),
            marker("c", "event", Urgency::Normal, here, now - DAY_MS + 1),
        ];
        assert_eq!(
            feed_stats(&markers, now),
            FeedStats {
                total: 3,
                last_24h: 2,
                events: 2
            }
        );
    }

    #[test]
    fn sort_parses_from_text() {
        assert_eq!("Urgency".parse::<FeedSort>(), Ok(FeedSort::Urgency));
        assert_eq!("recent".parse::<FeedSort>(), Ok(FeedSort::Recent));
        assert!("alphabetical".parse::<FeedSort>().is_err());
    }
}
