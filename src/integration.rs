//! Integration module for connecting segmentation backends with the linker.
//!
//! This module provides traits and utilities for feeding per-frame
//! segmentation output (from any backend) into the time-series linker.

mod pipeline;
mod source;

pub use pipeline::LinkingPipeline;
pub use source::{IntoMasks, SegmentationSource};
