mod street;

use ahash::AHashMap;
use geo::{Coord, LineString};
use tracing::debug;

use crate::{normalize::{Locale, NormalizedName}, region::RegionAssignment};

pub use street::{AggregatedStreet, StreetKey};

/// Fixed planar degree-to-meter scale factor.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Planar length of a polyline in meters: Euclidean distance in degrees between
/// consecutive coordinates, scaled by [`METERS_PER_DEGREE`].
pub(crate) fn planar_length_m(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|segment| segment.dx().hypot(segment.dy()))
        .sum::<f64>() * METERS_PER_DEGREE
}

/// Result of a merge: aggregated streets in first-seen key order, plus the number
/// of assignments discarded for lacking a usable name.
#[derive(Debug, Clone, Default)]
pub struct MergeOutput {
    pub streets: Vec<AggregatedStreet>,
    pub discarded: usize,
}

/// Groups region assignments by (region, canonical name, street type) and
/// concatenates each group's geometries.
#[derive(Debug, Clone, Copy)]
pub struct SegmentMerger {
    locale: Locale,
}

impl SegmentMerger {
    pub fn new(locale: Locale) -> Self { Self { locale } }

    #[inline] pub fn locale(&self) -> Locale { self.locale }

    /// Normalize each assignment's name, drop unusable names, then merge.
    pub fn merge(&self, assignments: &[RegionAssignment<'_>]) -> MergeOutput {
        self.merge_named(assignments.iter()
            .map(|assignment| (assignment, self.locale.normalize(assignment.feature.name()))))
    }

    /// Merge assignments whose names were already normalized with this merger's locale.
    pub(crate) fn merge_named<'a, 'b: 'a, I>(&self, named: I) -> MergeOutput
    where I: IntoIterator<Item = (&'a RegionAssignment<'b>, NormalizedName)> {
        // Pass 1: key -> member geometries, groups kept in first-seen order.
        let mut index: AHashMap<StreetKey, usize> = AHashMap::new();
        let mut groups: Vec<(StreetKey, Vec<&LineString<f64>>)> = Vec::new();
        let mut discarded = 0;

        for (assignment, name) in named {
            let Some(canonical) = name.canonical_name().map(str::trim).filter(|name| !name.is_empty()) else {
                discarded += 1;
                continue
            };

            let key = StreetKey::new(&assignment.region, canonical, name.street_type);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(assignment.feature.geometry());
        }

        // Pass 2: concatenate member coordinates verbatim and measure.
        let streets = groups.into_iter()
            .map(|(key, members)| {
                let geometry: LineString<f64> = members.iter()
                    .flat_map(|line| line.0.iter().copied())
                    .collect::<Vec<Coord<f64>>>()
                    .into();
                let length_m = planar_length_m(&geometry);
                AggregatedStreet::new(key, geometry, members.len(), length_m)
            })
            .collect::<Vec<_>>();

        debug!(streets = streets.len(), discarded, locale = %self.locale, "merged street segments");
        MergeOutput { streets, discarded }
    }
}
