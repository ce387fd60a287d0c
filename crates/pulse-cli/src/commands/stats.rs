use pulse_core::feed::{feed_stats, region_feed};
use pulse_core::remote::RemoteStore;
use pulse_core::util::now_millis;
use pulse_core::PulseSession;

use crate::commands::common::{load_markers, resolve_region_name};
use crate::error::CliError;

pub async fn run_stats<R: RemoteStore>(
    session: &mut PulseSession<R>,
    region: Option<&str>,
) -> Result<(), CliError> {
    load_markers(session).await;

    let resolver = session.viewport().resolver();
    let mut markers = session.store().visible();
    if let Some(region) = region {
        let name = resolve_region_name(resolver, region)?;
        markers = region_feed(markers, resolver, &name);
    }

    let stats = feed_stats(markers, now_millis());
    println!("total    {}", stats.total);
    println!("last 24h {}", stats.last_24h);
    println!("events   {}", stats.events);
    Ok(())
}
