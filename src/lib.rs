#![doc = "streetrank public API"]
mod catalog;
mod error;
mod feature;
mod merge;
mod normalize;
mod pipeline;
mod region;

#[doc(inline)]
pub use error::PipelineError;

#[doc(inline)]
pub use feature::{RawFeature, Region};

#[doc(inline)]
pub use normalize::{fold_accents, Locale, NormalizedName, StreetType};

#[doc(inline)]
pub use region::{RegionAssignment, RegionIndex};

#[doc(inline)]
pub use merge::{AggregatedStreet, MergeOutput, SegmentMerger, StreetKey, METERS_PER_DEGREE};

#[doc(inline)]
pub use catalog::{BattleEntry, OccurrenceEntry, RankedStreet, RegionCatalog, StreetCatalog};

#[doc(inline)]
pub use pipeline::{
    Diagnostics, DropReason, FeatureBatch, Pipeline, PipelineConfig, Regions, RunEvent, RunHandle,
    RunOutput, RunScope, RunStatus, Session, Stage, DEFAULT_HIGHWAY_CLASSES,
};
