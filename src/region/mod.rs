mod bbox;

use std::borrow::Cow;

use bbox::BoundingBox;
use geo::{BoundingRect, Intersects};
use rstar::RTree;
use smallvec::SmallVec;

use crate::{feature::{RawFeature, Region}, normalize::fold_accents};

/// One (feature, region) pair produced by the spatial join.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAssignment<'a> {
    pub feature: &'a RawFeature,
    pub region: Cow<'a, str>,
}

impl<'a> RegionAssignment<'a> {
    pub fn new(feature: &'a RawFeature, region: impl Into<Cow<'a, str>>) -> Self {
        Self { feature, region: region.into() }
    }

    /// Replace the region label with its accent-folded form.
    pub(crate) fn fold_region(self) -> Self {
        let folded = fold_accents(&self.region);
        Self { feature: self.feature, region: Cow::Owned(folded) }
    }
}

/// RegionIndex holds a set of named boundaries with an R-tree over their bounding boxes.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    regions: Vec<Region>,
    rtree: RTree<BoundingBox>,
}

impl RegionIndex {
    /// Build the index; regions with empty boundaries are kept but can never match.
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                regions.iter().enumerate()
                    .filter_map(|(i, region)| region.boundary().bounding_rect()
                        .map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            regions,
        }
    }

    /// Get the number of regions.
    #[inline] pub fn len(&self) -> usize { self.regions.len() }

    /// Check if there are no regions.
    #[inline] pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    /// Get a reference to the list of regions.
    #[inline] pub fn regions(&self) -> &[Region] { &self.regions }

    /// Indices of all regions whose boundary intersects the feature, in ascending order.
    /// Touching a boundary counts as intersecting.
    pub fn regions_for(&self, feature: &RawFeature) -> SmallVec<[usize; 4]> {
        let Some(rect) = feature.geometry().bounding_rect() else { return SmallVec::new() };

        let mut hits = self.rtree
            .locate_in_envelope_intersecting(&BoundingBox::envelope_of(&rect))
            .map(|bbox| bbox.idx())
            .filter(|&i| self.regions[i].boundary().intersects(feature.geometry()))
            .collect::<SmallVec<[usize; 4]>>();

        // R-tree traversal order is not the input order.
        hits.sort_unstable();
        hits
    }

    /// Spatial join: one assignment per (feature, intersecting region), in feature order
    /// then region order. Features outside every region produce nothing.
    pub fn assign<'a>(&'a self, features: impl IntoIterator<Item = &'a RawFeature>) -> Vec<RegionAssignment<'a>> {
        features.into_iter()
            .flat_map(|feature| self.regions_for(feature).into_iter()
                .map(move |i| RegionAssignment::new(feature, self.regions[i].name())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str, x0: f64, y0: f64, size: f64) -> Region {
        Region::from_ring(name, [(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size)])
    }

    fn line(coords: &[(f64, f64)]) -> RawFeature {
        RawFeature::new(Some("Rue des Lilas"), "residential", coords.iter().copied())
    }

    #[test]
    fn feature_inside_one_region() {
        let index = RegionIndex::new(vec![square("West", 0.0, 0.0, 1.0), square("East", 1.0, 0.0, 1.0)]);
        let features = [line(&[(0.2, 0.2), (0.4, 0.6)])];

        let assignments = index.assign(&features);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].region, "West");
    }

    #[test]
    fn feature_straddling_two_regions_is_assigned_to_both() {
        let index = RegionIndex::new(vec![square("West", 0.0, 0.0, 1.0), square("East", 1.0, 0.0, 1.0)]);
        let features = [line(&[(0.5, 0.5), (1.5, 0.5)])];

        let regions = index.assign(&features).into_iter()
            .map(|a| a.region.into_owned())
            .collect::<Vec<_>>();
        assert_eq!(regions, vec!["West", "East"]);
    }

    #[test]
    fn touching_shared_boundary_counts() {
        let index = RegionIndex::new(vec![square("West", 0.0, 0.0, 1.0), square("East", 1.0, 0.0, 1.0)]);
        let feature = line(&[(1.0, 0.2), (1.0, 0.8)]);

        assert_eq!(index.regions_for(&feature).as_slice(), &[0, 1]);
    }

    #[test]
    fn feature_outside_all_regions_is_dropped() {
        let index = RegionIndex::new(vec![square("West", 0.0, 0.0, 1.0)]);
        let features = [line(&[(5.0, 5.0), (6.0, 6.0)])];

        assert!(index.assign(&features).is_empty());
    }

    #[test]
    fn bbox_overlap_without_intersection_is_rejected() {
        // Diagonal line whose bounding box overlaps the square but whose path misses it.
        let index = RegionIndex::new(vec![square("Corner", 0.0, 0.0, 1.0)]);
        let feature = line(&[(0.9, 3.0), (3.0, 0.9)]);

        assert!(index.regions_for(&feature).is_empty());
    }

    #[test]
    fn folding_region_label() {
        let feature = line(&[(0.0, 0.0), (1.0, 1.0)]);
        let assignment = RegionAssignment::new(&feature, "Île-de-France").fold_region();
        assert_eq!(assignment.region, "Ile-de-France");
    }
}
