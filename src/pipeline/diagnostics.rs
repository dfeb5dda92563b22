use std::fmt;

use serde::Serialize;

/// Why a raw feature was excluded from a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DropReason {
    /// Missing name, or nothing left after removing the street type.
    InvalidName,
    /// Fewer than two coordinates.
    EmptyGeometry,
    /// Highway class outside the configured whitelist.
    ExcludedHighway,
    /// Outside every known region (or unlabeled when regions are pre-assigned).
    NoIntersectingRegion,
}

impl DropReason {
    pub fn to_str(&self) -> &'static str {
        match self {
            DropReason::InvalidName => "invalid_name",
            DropReason::EmptyGeometry => "empty_geometry",
            DropReason::ExcludedHighway => "excluded_highway",
            DropReason::NoIntersectingRegion => "no_intersecting_region",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Run-level tallies. Each raw feature is counted in at most one drop bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub input_features: usize,
    pub invalid_name: usize,
    pub empty_geometry: usize,
    pub excluded_highway: usize,
    pub no_intersecting_region: usize,
    pub assignments: usize, // (feature, region) pairs handed to the merger
    pub aggregated_streets: usize,
}

impl Diagnostics {
    pub(crate) fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::InvalidName => self.invalid_name += 1,
            DropReason::EmptyGeometry => self.empty_geometry += 1,
            DropReason::ExcludedHighway => self.excluded_highway += 1,
            DropReason::NoIntersectingRegion => self.no_intersecting_region += 1,
        }
    }

    /// Count for a single drop reason.
    pub fn count(&self, reason: DropReason) -> usize {
        match reason {
            DropReason::InvalidName => self.invalid_name,
            DropReason::EmptyGeometry => self.empty_geometry,
            DropReason::ExcludedHighway => self.excluded_highway,
            DropReason::NoIntersectingRegion => self.no_intersecting_region,
        }
    }

    /// Total number of raw features excluded from the run.
    pub fn dropped(&self) -> usize {
        self.invalid_name + self.empty_geometry + self.excluded_highway + self.no_intersecting_region
    }

    /// Raw features that reached the merge stage.
    #[inline] pub fn kept(&self) -> usize { self.input_features - self.dropped() }

    /// The run finished but produced no catalog records.
    #[inline] pub fn is_empty_aggregation(&self) -> bool { self.aggregated_streets == 0 }
}
