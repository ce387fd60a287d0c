use pulse_core::viewport::{CandidateKind, LabelTier, ViewportController};
use pulse_core::Coordinate;

use crate::commands::common::join_text;
use crate::error::CliError;

pub fn run_regions(viewport: &ViewportController) {
    let resolver = viewport.resolver();
    let default_name = &resolver.default_region().name;
    for region in resolver.regions() {
        let center = region.center();
        let suffix = if &region.name == default_name {
            "  (default)"
        } else {
            ""
        };
        println!(
            "{:<16}  {:>8.4}, {:>8.4}{suffix}",
            region.name, center.latitude, center.longitude
        );
    }
}

pub fn run_resolve(viewport: &ViewportController, latitude: f64, longitude: f64) {
    let coordinate = Coordinate::new(latitude, longitude);
    let resolver = viewport.resolver();
    match resolver.resolve_strict(&coordinate) {
        Some(region) => println!("{}", region.name),
        None => {
            println!("{}", resolver.default_region().name);
            eprintln!("Coordinate is outside every region; using the default.");
        }
    }
}

pub fn run_search(
    viewport: &ViewportController,
    query_parts: &[String],
    as_json: bool,
) -> Result<(), CliError> {
    let query = join_text(query_parts).ok_or(CliError::EmptySearchQuery)?;
    let candidates = viewport.search(&query);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    } else {
        for candidate in &candidates {
            let kind = match candidate.kind {
                CandidateKind::Region => "region",
                CandidateKind::Settlement => "settlement",
            };
            println!(
                "{:<20}  {:<10}  {:.4}, {:.4}",
                candidate.name,
                kind,
                candidate.coordinate.latitude,
                candidate.coordinate.longitude
            );
        }
    }

    Ok(())
}

pub fn run_labels(viewport: &mut ViewportController, zoom: f64) {
    viewport.set_zoom(zoom);
    let tier = match viewport.label_tier() {
        LabelTier::Regions => "regions",
        LabelTier::Settlements => "settlements",
    };
    println!("zoom {:.1}: {tier}", viewport.state().zoom);
    for label in viewport.labels() {
        println!("  {}", label.name);
    }
}
