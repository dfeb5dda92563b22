mod config;
mod diagnostics;
mod session;

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    catalog::StreetCatalog,
    error::PipelineError,
    feature::{RawFeature, Region},
    merge::SegmentMerger,
    normalize::NormalizedName,
    region::{RegionAssignment, RegionIndex},
};

pub use config::{PipelineConfig, DEFAULT_HIGHWAY_CLASSES};
pub use diagnostics::{Diagnostics, DropReason};
pub use session::{RunEvent, RunHandle, RunScope, RunStatus, Session};

/// How features are mapped to regions.
#[derive(Debug, Clone, PartialEq)]
pub enum Regions {
    /// Features carry their own region label (`RawFeature::with_region`).
    Labeled,
    /// Spatial join against these boundaries.
    Boundaries(Vec<Region>),
}

/// A complete, materialized input for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBatch {
    pub features: Vec<RawFeature>,
    pub regions: Regions,
}

impl FeatureBatch {
    /// Features to be joined against region boundaries.
    pub fn with_boundaries(features: Vec<RawFeature>, boundaries: Vec<Region>) -> Self {
        Self { features, regions: Regions::Boundaries(boundaries) }
    }

    /// Features already labeled with their region.
    pub fn labeled(features: Vec<RawFeature>) -> Self {
        Self { features, regions: Regions::Labeled }
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Normalize,
    Assign,
    Merge,
    Catalog,
}

impl Stage {
    pub fn to_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Assign => "assign",
            Stage::Merge => "merge",
            Stage::Catalog => "catalog",
        }
    }

    /// Fraction of the run completed when this stage starts.
    pub fn progress(&self) -> f32 {
        match self {
            Stage::Normalize => 0.1,
            Stage::Assign => 0.3,
            Stage::Merge => 0.5,
            Stage::Catalog => 0.7,
        }
    }
}

/// A finished run: the catalog and the drop accounting that produced it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutput {
    pub catalog: StreetCatalog,
    pub diagnostics: Diagnostics,
}

/// Sequences normalize -> assign region -> filter -> merge -> catalog over one batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self { Self { config } }

    #[inline] pub fn config(&self) -> &PipelineConfig { &self.config }

    /// Run the whole pipeline synchronously.
    pub fn run(&self, batch: &FeatureBatch) -> Result<RunOutput, PipelineError> {
        self.run_with(batch, &AtomicBool::new(false), |_| {})
    }

    /// Run with a cooperative cancellation flag, checked between stages, and a stage callback.
    pub(crate) fn run_with(
        &self,
        batch: &FeatureBatch,
        cancel: &AtomicBool,
        mut on_stage: impl FnMut(Stage),
    ) -> Result<RunOutput, PipelineError> {
        if batch.is_empty() { return Err(PipelineError::EmptyBatch) }

        let mut enter = |stage: Stage| {
            if cancel.load(Ordering::Acquire) { return Err(PipelineError::Cancelled(stage.to_str())) }
            debug!(stage = stage.to_str(), "entering stage");
            on_stage(stage);
            Ok(())
        };

        let locale = self.config.locale;
        let mut diagnostics = Diagnostics { input_features: batch.len(), ..Default::default() };
        info!(features = batch.len(), %locale, "starting pipeline run");

        // Normalize names and reject per-record problems; each feature is dropped at most once.
        enter(Stage::Normalize)?;
        let named = batch.features.iter()
            .filter_map(|feature| {
                let name = locale.normalize(feature.name());
                let reason = if !name.is_valid() {
                    Some(DropReason::InvalidName)
                } else if !feature.has_line_geometry() {
                    Some(DropReason::EmptyGeometry)
                } else if !self.config.accepts_highway(feature.highway_class()) {
                    Some(DropReason::ExcludedHighway)
                } else {
                    None
                };

                match reason {
                    Some(reason) => { diagnostics.record(reason); None }
                    None => Some((feature, name)),
                }
            })
            .collect::<Vec<_>>();
        info!(stage = "normalize", kept = named.len(), dropped = diagnostics.dropped(), "names normalized");

        enter(Stage::Assign)?;
        let index = match &batch.regions {
            Regions::Boundaries(boundaries) => Some(RegionIndex::new(boundaries.clone())),
            Regions::Labeled => None,
        };
        let mut assigned: Vec<(RegionAssignment<'_>, NormalizedName)> = Vec::with_capacity(named.len());
        for (feature, name) in named {
            let before = assigned.len();
            match &index {
                Some(index) => assigned.extend(index.regions_for(feature).into_iter()
                    .map(|i| (RegionAssignment::new(feature, index.regions()[i].name()), name.clone()))),
                None => assigned.extend(feature.region()
                    .map(|label| (RegionAssignment::new(feature, label), name.clone()))),
            }
            if assigned.len() == before { diagnostics.record(DropReason::NoIntersectingRegion) }
        }
        if self.config.fold_region_names {
            assigned = assigned.into_iter()
                .map(|(assignment, name)| (assignment.fold_region(), name))
                .collect();
        }
        diagnostics.assignments = assigned.len();
        info!(stage = "assign", assignments = assigned.len(), unassigned = diagnostics.no_intersecting_region, "regions assigned");

        enter(Stage::Merge)?;
        let (assignments, names): (Vec<_>, Vec<_>) = assigned.into_iter().unzip();
        let merged = SegmentMerger::new(locale).merge_named(assignments.iter().zip(names));
        debug_assert_eq!(merged.discarded, 0, "names were validated before merging");

        enter(Stage::Catalog)?;
        let catalog = StreetCatalog::new(merged.streets);
        diagnostics.aggregated_streets = catalog.len();

        if catalog.is_empty() {
            warn!(dropped = diagnostics.dropped(), "pipeline run produced an empty aggregation");
        }
        info!(
            streets = catalog.len(),
            regions = catalog.regions().len(),
            dropped = diagnostics.dropped(),
            "pipeline run finished"
        );

        Ok(RunOutput { catalog, diagnostics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{normalize::{Locale, StreetType}, StreetKey};

    fn square(name: &str, x0: f64, size: f64) -> Region {
        Region::from_ring(name, [(x0, 0.0), (x0 + size, 0.0), (x0 + size, size), (x0, size)])
    }

    fn road(name: Option<&str>, coords: &[(f64, f64)]) -> RawFeature {
        RawFeature::new(name, "residential", coords.iter().copied())
    }

    #[test]
    fn empty_batch_fails_the_run() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let result = pipeline.run(&FeatureBatch::labeled(vec![]));
        assert_eq!(result.unwrap_err(), PipelineError::EmptyBatch);
    }

    #[test]
    fn drop_accounting_per_feature() {
        let mut features = vec![
            road(None, &[(0.1, 0.1), (0.2, 0.2)]),
            road(None, &[(0.1, 0.1), (0.2, 0.2)]),
            road(None, &[(0.1, 0.1), (0.2, 0.2)]),
            road(Some("Rue Courte"), &[(0.1, 0.1)]),
            road(Some("Rue Vide"), &[]),
        ];
        for name in ["Rue A", "Rue B", "Rue C", "Rue A", "Avenue D"] {
            features.push(road(Some(name), &[(0.1, 0.1), (0.2, 0.2)]));
        }
        let batch = FeatureBatch::with_boundaries(features, vec![square("Zone", 0.0, 1.0)]);

        let output = Pipeline::new(PipelineConfig::default()).run(&batch).unwrap();
        assert_eq!(output.diagnostics.invalid_name, 3);
        assert_eq!(output.diagnostics.empty_geometry, 2);
        assert_eq!(output.diagnostics.dropped(), 5);
        assert_eq!(output.diagnostics.kept(), 5);

        let region = output.catalog.region("Zone");
        assert_eq!(region.streets().iter().map(|s| s.segment_count()).sum::<usize>(), 5);
        assert_eq!(region.occurrence_count("A"), 2);
    }

    #[test]
    fn highway_filter_and_unassigned_features() {
        let features = vec![
            RawFeature::new(Some("Rue du Stade"), "track", [(0.1, 0.1), (0.2, 0.2)]),
            road(Some("Rue Lointaine"), &[(10.0, 10.0), (11.0, 11.0)]),
            road(Some("Rue du Stade"), &[(0.1, 0.1), (0.2, 0.2)]),
        ];
        let batch = FeatureBatch::with_boundaries(features, vec![square("Zone", 0.0, 1.0)]);
        let config = PipelineConfig::new(Locale::Fr).with_default_highway_classes();

        let output = Pipeline::new(config).run(&batch).unwrap();
        assert_eq!(output.diagnostics.excluded_highway, 1);
        assert_eq!(output.diagnostics.no_intersecting_region, 1);
        assert_eq!(output.catalog.len(), 1);
    }

    #[test]
    fn straddling_feature_counts_in_both_regions() {
        let features = vec![road(Some("Route de Lyon"), &[(0.5, 0.5), (1.5, 0.5)])];
        let batch = FeatureBatch::with_boundaries(features, vec![square("West", 0.0, 1.0), square("East", 1.0, 1.0)]);

        let output = Pipeline::new(PipelineConfig::default()).run(&batch).unwrap();
        assert_eq!(output.diagnostics.assignments, 2);
        assert_eq!(output.catalog.regions(), vec!["East", "West"]);
        assert!(output.catalog.get(&StreetKey::new("East", "LYON", StreetType::Route)).is_some());
    }

    #[test]
    fn labeled_batch_skips_spatial_join() {
        let features = vec![
            road(Some("Goethestraße"), &[(8.0, 49.0), (8.0, 49.01)]).with_region("Baden"),
            road(Some("Goethestrasse"), &[(8.0, 49.01), (8.0, 49.02)]).with_region("Baden"),
            road(Some("Marktplatz"), &[(9.0, 48.0), (9.0, 48.01)]),
        ];
        let config = PipelineConfig::new(Locale::De);

        let output = Pipeline::new(config).run(&FeatureBatch::labeled(features)).unwrap();
        assert_eq!(output.diagnostics.no_intersecting_region, 1);

        let goethe = output.catalog.get(&StreetKey::new("Baden", "GOETHE", StreetType::Strasse)).unwrap();
        assert_eq!(goethe.segment_count(), 2);
        assert!((goethe.length_m() - 0.02 * crate::METERS_PER_DEGREE).abs() < 1e-6);
    }

    #[test]
    fn folds_region_labels_when_configured() {
        let features = vec![road(Some("Rue Haute"), &[(0.0, 0.0), (0.0, 1.0)]).with_region("Île-de-France")];
        let config = PipelineConfig { fold_region_names: true, ..PipelineConfig::default() };

        let output = Pipeline::new(config).run(&FeatureBatch::labeled(features)).unwrap();
        assert_eq!(output.catalog.regions(), vec!["Ile-de-France"]);
    }

    #[test]
    fn all_features_dropped_is_an_empty_aggregation_not_an_error() {
        let features = vec![road(None, &[(0.0, 0.0), (0.0, 1.0)])];
        let output = Pipeline::new(PipelineConfig::default()).run(&FeatureBatch::labeled(features)).unwrap();

        assert!(output.catalog.is_empty());
        assert!(output.diagnostics.is_empty_aggregation());
    }

    #[test]
    fn cancellation_is_checked_before_each_stage() {
        let features = vec![road(Some("Rue A"), &[(0.0, 0.0), (0.0, 1.0)]).with_region("R")];
        let batch = FeatureBatch::labeled(features);
        let cancel = AtomicBool::new(false);
        let mut seen = Vec::new();

        let result = Pipeline::new(PipelineConfig::default()).run_with(&batch, &cancel, |stage| {
            seen.push(stage);
            if stage == Stage::Assign { cancel.store(true, Ordering::Release) }
        });

        assert_eq!(result.unwrap_err(), PipelineError::Cancelled("merge"));
        assert_eq!(seen, vec![Stage::Normalize, Stage::Assign]);
    }
}
