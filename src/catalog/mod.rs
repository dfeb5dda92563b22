mod battle;
mod ranking;

use ahash::AHashMap;
use serde::Serialize;

use crate::merge::{AggregatedStreet, StreetKey};

pub use battle::BattleEntry;
pub use ranking::{OccurrenceEntry, RankedStreet};

/// The queryable table of aggregated streets produced by one pipeline run.
/// Records are kept sorted by key, so each region occupies a contiguous slice.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StreetCatalog {
    streets: Vec<AggregatedStreet>,
}

impl StreetCatalog {
    /// Build a catalog; records sharing a key are folded into one.
    pub fn new(streets: Vec<AggregatedStreet>) -> Self {
        let mut index: AHashMap<StreetKey, usize> = AHashMap::with_capacity(streets.len());
        let mut unique: Vec<AggregatedStreet> = Vec::with_capacity(streets.len());

        for street in streets {
            match index.get(street.key()) {
                Some(&i) => unique[i].absorb(street),
                None => {
                    index.insert(street.key().clone(), unique.len());
                    unique.push(street);
                }
            }
        }

        unique.sort_by(|a, b| a.key().cmp(b.key()));
        Self { streets: unique }
    }

    /// Get the number of aggregated streets across all regions.
    #[inline] pub fn len(&self) -> usize { self.streets.len() }

    /// Check if the catalog has no records.
    #[inline] pub fn is_empty(&self) -> bool { self.streets.is_empty() }

    /// All records, sorted by (region, canonical name, street type).
    #[inline] pub fn streets(&self) -> &[AggregatedStreet] { &self.streets }

    /// Look up a record by its exact key.
    pub fn get(&self, key: &StreetKey) -> Option<&AggregatedStreet> {
        self.streets.binary_search_by(|street| street.key().cmp(key))
            .ok()
            .map(|i| &self.streets[i])
    }

    /// Distinct region names, ascending.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions = self.streets.iter()
            .map(|street| street.region())
            .collect::<Vec<_>>();
        regions.dedup();
        regions
    }

    /// Query view over a single region. Unknown regions yield an empty view.
    pub fn region<'a>(&'a self, name: &'a str) -> RegionCatalog<'a> {
        let start = self.streets.partition_point(|street| street.region() < name);
        let end = start + self.streets[start..].partition_point(|street| street.region() == name);
        RegionCatalog { region: name, streets: &self.streets[start..end] }
    }
}

/// The records of one region, with the ranking and comparison queries.
#[derive(Debug, Clone, Copy)]
pub struct RegionCatalog<'a> {
    region: &'a str,
    streets: &'a [AggregatedStreet],
}

impl<'a> RegionCatalog<'a> {
    #[inline] pub fn region(&self) -> &'a str { self.region }

    #[inline] pub fn streets(&self) -> &'a [AggregatedStreet] { self.streets }

    #[inline] pub fn len(&self) -> usize { self.streets.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.streets.is_empty() }
}
