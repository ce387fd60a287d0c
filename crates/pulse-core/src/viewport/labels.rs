//! Zoom-dependent place labels.

use crate::models::{Coordinate, Region, Settlement};

/// Which kind of place label the current zoom calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTier {
    Regions,
    Settlements,
}

impl LabelTier {
    pub fn for_zoom(zoom: f64, settlement_threshold: f64) -> Self {
        if zoom < settlement_threshold {
            Self::Regions
        } else {
            Self::Settlements
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub coordinate: Coordinate,
    pub tier: LabelTier,
}

/// Labels to draw at `zoom`. Region labels below the threshold; at or above
/// it, only settlements whose minimum zoom has been reached.
pub fn labels_for_zoom(
    zoom: f64,
    settlement_threshold: f64,
    regions: &[Region],
    settlements: &[Settlement],
) -> Vec<Label> {
    match LabelTier::for_zoom(zoom, settlement_threshold) {
        LabelTier::Regions => regions
            .iter()
            .map(|region| Label {
                name: region.name.clone(),
                coordinate: region.center(),
                tier: LabelTier::Regions,
            })
            .collect(),
        LabelTier::Settlements => settlements
            .iter()
            .filter(|settlement| settlement.min_zoom <= zoom)
            .map(|settlement| Label {
                name: settlement.name.clone(),
                coordinate: settlement.coordinate,
                tier: LabelTier::Settlements,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulseConfig;

    fn labels(zoom: f64) -> Vec<Label> {
        let config = PulseConfig::default();
        labels_for_zoom(
            zoom,
            config.viewport.settlement_zoom_threshold,
            &config.regions,
            &config.settlements,
        )
    }

    #[test]
    fn low_zoom_shows_only_regions() {
        let config = PulseConfig::default();
        let below = labels(10.9);
        assert_eq!(below.len(), config.regions.len());
        assert!(below.iter().all(|label| label.tier == LabelTier::Regions));
    }

    #[test]
    fn settlements_appear_by_minimum_zoom() {
        let at_threshold = labels(11.0);
        assert!(!at_threshold.is_empty());
        assert!(at_threshold
            .iter()
            .all(|label| label.tier == LabelTier::Settlements));
        assert!(at_threshold.iter().any(|label| label.name == "Spanish Town"));
        assert!(!at_threshold.iter().any(|label| label.name == "Linstead"));

        let closer = labels(13.0);
        assert!(closer.iter().any(|label| label.name == "Linstead"));
        assert!(closer.len() > at_threshold.len());
    }
}
