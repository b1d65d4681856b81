//! Linking session: configuration plus the state of one tracked sequence.

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::linking::assignment::{LinkArray, link_instances};
use crate::linking::error::LinkingError;
use crate::linking::gap_closing::close_gaps;
use crate::linking::identity::allocate_uids;
use crate::linking::mask::FrameMasks;
use crate::linking::overlap::{OverlapMetric, overlap_matrix};
use crate::linking::report::area_report;
use crate::linking::table::TrackTable;

/// Configuration for a linking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Overlap metric used for both adjacent-frame linking and gap closing.
    pub metric: OverlapMetric,
    /// Minimum similarity for two instances to be linked, in [0, 1].
    pub threshold: f64,
    /// Maximum temporal gap (frames) bridged by gap closing, >= 1.
    pub max_gap: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            metric: OverlapMetric::IoS,
            threshold: 0.2,
            max_gap: 5,
        }
    }
}

/// One tracking session over a time-ordered mask sequence.
///
/// Owns the configuration and, after [`link`](Self::link), all derived
/// state: per-pair similarity matrices and link arrays, the per-frame uid
/// assignment, the track table, and the area report. The table is the
/// authoritative representation; [`close_gaps`](Self::close_gaps) mutates
/// it and regenerates the link arrays from it so the two stay isomorphic.
#[derive(Debug, Default)]
pub struct TimeSeriesLinker {
    config: LinkerConfig,
    frames: Vec<FrameMasks>,
    weights: Vec<Array2<f64>>,
    links: Vec<LinkArray>,
    uids: Vec<Vec<usize>>,
    table: Option<TrackTable>,
    report: Option<Array2<f64>>,
}

impl TimeSeriesLinker {
    pub fn new(config: LinkerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Link a whole sequence, replacing any previous session state.
    ///
    /// Adjacent frame pairs are scored and linked in parallel (each pair
    /// only reads its two frames), then identity allocation, table
    /// building, and reporting run sequentially in frame order.
    pub fn link(&mut self, frames: Vec<FrameMasks>) -> Result<&TrackTable, LinkingError> {
        validate_extents(&frames)?;

        let n_insts: Vec<usize> = frames.iter().map(Vec::len).collect();
        let (weights, links): (Vec<_>, Vec<_>) = (0..frames.len() - 1)
            .into_par_iter()
            .map(|t| {
                let w = overlap_matrix(&frames[t], &frames[t + 1], self.config.metric);
                let l = link_instances(&w, self.config.threshold);
                debug!(frame = t, matched = l.matched_count(), "linked frame pair");
                (w, l)
            })
            .unzip();

        let uids = allocate_uids(&links, &n_insts);
        let table = TrackTable::from_uids(&uids);
        let report = area_report(&table, &frames)?;

        self.frames = frames;
        self.weights = weights;
        self.links = links;
        self.uids = uids;
        self.report = Some(report);
        Ok(self.table.insert(table))
    }

    /// Run the gap-closing pass on the session's table.
    ///
    /// Afterwards the link arrays are regenerated from the revised table
    /// and the area report is refreshed.
    pub fn close_gaps(&mut self) -> Result<&TrackTable, LinkingError> {
        let table = self.table.take().ok_or(LinkingError::EmptySequence)?;
        let closed = close_gaps(
            table,
            &self.frames,
            self.config.metric,
            self.config.threshold,
            self.config.max_gap,
        )?;
        self.links = closed.to_links();
        self.report = Some(area_report(&closed, &self.frames)?);
        Ok(self.table.insert(closed))
    }

    /// The track table, once a sequence has been linked.
    pub fn table(&self) -> Option<&TrackTable> {
        self.table.as_ref()
    }

    /// The area report, once a sequence has been linked.
    pub fn report(&self) -> Option<&Array2<f64>> {
        self.report.as_ref()
    }

    /// Per-pair link arrays for the current table.
    pub fn links(&self) -> &[LinkArray] {
        &self.links
    }

    /// Per-pair similarity matrices from the initial linking pass.
    pub fn weights(&self) -> &[Array2<f64>] {
        &self.weights
    }

    /// Per-frame uid assignment from the initial linking pass.
    pub fn uids(&self) -> &[Vec<usize>] {
        &self.uids
    }

    /// The mask sequence being tracked.
    pub fn frames(&self) -> &[FrameMasks] {
        &self.frames
    }
}

/// Reject empty sequences and masks whose image extents disagree.
fn validate_extents(frames: &[FrameMasks]) -> Result<(), LinkingError> {
    if frames.is_empty() {
        return Err(LinkingError::EmptySequence);
    }
    let mut expected: Option<(usize, usize)> = None;
    for (t, frame) in frames.iter().enumerate() {
        for (i, mask) in frame.iter().enumerate() {
            let dim = mask.dim();
            match expected {
                None => expected = Some(dim),
                Some(exp) if exp != dim => {
                    return Err(LinkingError::MaskExtentMismatch {
                        frame: t,
                        instance: i,
                        expected: exp,
                        actual: dim,
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}
