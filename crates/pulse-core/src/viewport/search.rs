//! Place-name search over the static catalog.

use serde::Serialize;

use crate::models::{Coordinate, Region, Settlement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Region,
    Settlement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCandidate {
    pub name: String,
    pub kind: CandidateKind,
    pub coordinate: Coordinate,
}

/// Case-insensitive substring match. Regions come before settlements, each in
/// catalog order. A blank query matches nothing.
pub fn search_places(
    query: &str,
    regions: &[Region],
    settlements: &[Settlement],
) -> Vec<SearchCandidate> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let regions = regions
        .iter()
        .filter(|region| region.name.to_lowercase().contains(&query))
        .map(|region| SearchCandidate {
            name: region.name.clone(),
            kind: CandidateKind::Region,
            coordinate: region.center(),
        });
    let settlements = settlements
        .iter()
        .filter(|settlement| settlement.name.to_lowercase().contains(&query))
        .map(|settlement| SearchCandidate {
            name: settlement.name.clone(),
            kind: CandidateKind::Settlement,
            coordinate: settlement.coordinate,
        });
    regions.chain(settlements).collect()
}
