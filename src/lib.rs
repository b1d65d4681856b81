//! Time-series linking of segmented instance masks.
//!
//! Instances detected independently in each frame of an image sequence are
//! linked into persistent track identities: pairwise mask overlap scoring,
//! optimal bipartite assignment between adjacent frames, incremental
//! identity allocation, a dense time x track table, and a gap-closing pass
//! that re-links tracks across short detection dropouts.
//!
//! ```ignore
//! use masktrack_rs::{LinkerConfig, TimeSeriesLinker};
//!
//! let mut linker = TimeSeriesLinker::new(LinkerConfig::default());
//! linker.link(frames)?;       // frames: Vec<Vec<Mask>>, one Vec per timepoint
//! linker.close_gaps()?;       // re-link tracks across short dropouts
//! let table = linker.table().unwrap();
//! let areas = linker.report().unwrap();
//! ```

pub mod integration;
pub mod linking;

pub use integration::{IntoMasks, LinkingPipeline, SegmentationSource};
pub use linking::{
    ABSENT, FrameMasks, LinkArray, LinkerConfig, LinkingError, Mask, OverlapMetric,
    TimeSeriesLinker, TrackTable, allocate_uids, area_report, close_gaps, link_instances,
    masks_from_labels, overlap_matrix, uid_count,
};
