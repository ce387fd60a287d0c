//! Coordinate → region classification.
//!
//! Regions are checked in catalog order and the first containing region wins.
//! A coordinate outside every region resolves to the configured default, so
//! callers always get a region back.

use crate::config::PulseConfig;
use crate::error::ConfigError;
use crate::models::{Coordinate, Region, RegionShape};

#[derive(Debug, Clone)]
pub struct RegionResolver {
    regions: Vec<Region>,
    default_index: usize,
}

impl RegionResolver {
    pub fn new(regions: Vec<Region>, default_region: &str) -> Result<Self, ConfigError> {
        let default_index = regions
            .iter()
            .position(|region| region.name == default_region)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "default region '{default_region}' is not in the region list"
                ))
            })?;

        for (name, other) in overlapping_pairs(&regions) {
            tracing::warn!(
                "Regions '{name}' and '{other}' overlap; '{name}' wins for shared coordinates"
            );
        }

        Ok(Self {
            regions,
            default_index,
        })
    }

    pub fn from_config(config: &PulseConfig) -> Result<Self, ConfigError> {
        Self::new(config.regions.clone(), &config.default_region)
    }

    /// Region containing `coordinate`, or the default region.
    pub fn resolve(&self, coordinate: &Coordinate) -> &Region {
        self.resolve_strict(coordinate)
            .unwrap_or_else(|| self.default_region())
    }

    /// Region containing `coordinate`, without the default fallback.
    pub fn resolve_strict(&self, coordinate: &Coordinate) -> Option<&Region> {
        if !coordinate.is_valid() {
            return None;
        }
        self.regions
            .iter()
            .find(|region| region.contains(coordinate))
    }

    pub fn default_region(&self) -> &Region {
        &self.regions[self.default_index]
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&Region> {
        let name = name.trim();
        self.regions
            .iter()
            .find(|region| region.name.eq_ignore_ascii_case(name))
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

/// Pairs of box regions that share interior area, earlier region first.
fn overlapping_pairs(regions: &[Region]) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    for (index, region) in regions.iter().enumerate() {
        let RegionShape::Box { bounds } = &region.shape else {
            continue;
        };
        for other in &regions[index + 1..] {
            if let RegionShape::Box { bounds: other_bounds } = &other.shape {
                if bounds.overlaps(other_bounds) {
                    pairs.push((region.name.as_str(), other.name.as_str()));
                }
            }
        }
    }
    pairs
}
