use std::cmp::Ordering;

use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::normalize::StreetType;

/// Grouping key of an aggregated street. Unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreetKey {
    pub region: String,
    pub canonical_name: String,
    pub street_type: StreetType,
}

impl StreetKey {
    pub fn new(region: &str, canonical_name: &str, street_type: StreetType) -> Self {
        Self {
            region: region.to_string(),
            canonical_name: canonical_name.to_string(),
            street_type,
        }
    }
}

impl Ord for StreetKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.region.cmp(&other.region)
            .then_with(|| self.canonical_name.cmp(&other.canonical_name))
            .then_with(|| self.street_type.to_str().cmp(other.street_type.to_str()))
    }
}

impl PartialOrd for StreetKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// All raw segments sharing a key, concatenated into one polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStreet {
    key: StreetKey,
    geometry: LineString<f64>,
    segment_count: usize, // Number of raw features merged, always >= 1
    length_m: f64,
}

impl AggregatedStreet {
    pub(crate) fn new(key: StreetKey, geometry: LineString<f64>, segment_count: usize, length_m: f64) -> Self {
        debug_assert!(segment_count >= 1, "aggregated street without segments");
        debug_assert!(length_m >= 0.0, "negative street length");
        Self { key, geometry, segment_count, length_m }
    }

    #[inline] pub fn key(&self) -> &StreetKey { &self.key }

    #[inline] pub fn region(&self) -> &str { &self.key.region }

    #[inline] pub fn canonical_name(&self) -> &str { &self.key.canonical_name }

    #[inline] pub fn street_type(&self) -> StreetType { self.key.street_type }

    /// Merged polyline: member coordinate sequences appended in input order.
    #[inline] pub fn geometry(&self) -> &LineString<f64> { &self.geometry }

    #[inline] pub fn segment_count(&self) -> usize { self.segment_count }

    #[inline] pub fn length_m(&self) -> f64 { self.length_m }

    #[inline] pub fn length_km(&self) -> f64 { self.length_m / 1000.0 }

    /// Append another record with the same key, as if its segments had been merged here.
    pub(crate) fn absorb(&mut self, other: AggregatedStreet) {
        debug_assert_eq!(self.key, other.key, "absorbing a street with a different key");
        self.geometry.0.extend(other.geometry.0);
        self.segment_count += other.segment_count;
        self.length_m = super::planar_length_m(&self.geometry);
    }
}
