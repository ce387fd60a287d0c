use pulse_core::export::render_json_export;
use pulse_core::feed::{region_feed, sort_feed, FeedSort};
use pulse_core::remote::RemoteStore;
use pulse_core::resolver::RegionResolver;
use pulse_core::store::MarkerStore;
use pulse_core::util::now_millis;
use pulse_core::{Marker, PulseSession};

use crate::commands::common::{format_marker_lines, load_markers, resolve_region_name};
use crate::error::CliError;

/// Markers matching the category and region, ordered and capped at `limit`.
pub fn select_markers<'a>(
    store: &'a MarkerStore,
    resolver: &RegionResolver,
    category: Option<&str>,
    region: Option<&str>,
    sort: FeedSort,
    limit: usize,
) -> Result<Vec<&'a Marker>, CliError> {
    let mut markers = store.apply_filter(category);
    if let Some(region) = region {
        let name = resolve_region_name(resolver, region)?;
        markers = region_feed(markers, resolver, &name);
    }
    sort_feed(&mut markers, sort);
    markers.truncate(limit);
    Ok(markers)
}

pub async fn run_list<R: RemoteStore>(
    session: &mut PulseSession<R>,
    category: Option<&str>,
    region: Option<&str>,
    sort: FeedSort,
    limit: usize,
    as_json: bool,
) -> Result<(), CliError> {
    load_markers(session).await;

    let resolver = session.viewport().resolver();
    let markers = select_markers(session.store(), resolver, category, region, sort, limit)?;
    let now_ms = now_millis();

    if as_json {
        println!("{}", render_json_export(&markers, resolver, now_ms)?);
    } else {
        for line in format_marker_lines(&markers, resolver, now_ms) {
            println!("{line}");
        }
    }

    Ok(())
}
