//! Dense time x track-id table, the canonical tracking result.

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::linking::assignment::LinkArray;
use crate::linking::error::LinkingError;
use crate::linking::identity::{allocate_uids, uid_count};

/// Cell value marking a track as absent at a timepoint.
pub const ABSENT: i64 = -1;

/// Dense `T x N` table mapping (frame, uid) to the track's local mask index
/// in that frame, or [`ABSENT`].
///
/// Invariant: for every frame `t`, the non-absent cells across all uids are
/// exactly `{0, .., n_t - 1}` with no repeats — every instance belongs to
/// exactly one track. The gap-closing pass is the only mutator; everything
/// else treats a built table as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackTable {
    cells: Array2<i64>,
    n_insts: Vec<usize>,
}

impl TrackTable {
    /// Build the table from per-pair link arrays (forward direction).
    ///
    /// Uids are allocated as in [`allocate_uids`]; simultaneous emergences
    /// bind to the frame's unclaimed local indices in allocation order.
    pub fn from_links(links: &[LinkArray], n_insts: &[usize]) -> Self {
        Self::from_uids(&allocate_uids(links, n_insts))
    }

    /// Build the table from a per-frame uid assignment (uid of each local
    /// index, as produced by the identity allocator).
    pub fn from_uids(uids: &[Vec<usize>]) -> Self {
        let t_len = uids.len();
        let n_tracks = uid_count(uids);
        let mut cells = Array2::from_elem((t_len, n_tracks), ABSENT);
        for (t, frame_uids) in uids.iter().enumerate() {
            for (cid, &uid) in frame_uids.iter().enumerate() {
                cells[[t, uid]] = cid as i64;
            }
        }
        Self {
            cells,
            n_insts: uids.iter().map(Vec::len).collect(),
        }
    }

    /// Number of frames.
    #[inline]
    pub fn frames(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of uids ever allocated.
    #[inline]
    pub fn tracks(&self) -> usize {
        self.cells.ncols()
    }

    /// Instance count per frame.
    #[inline]
    pub fn instance_counts(&self) -> &[usize] {
        &self.n_insts
    }

    /// Local mask index of `uid` at frame `t`, if present.
    #[inline]
    pub fn get(&self, t: usize, uid: usize) -> Option<usize> {
        let cid = self.cells[[t, uid]];
        (cid >= 0).then_some(cid as usize)
    }

    /// Raw cell grid (local indices, [`ABSENT`] when absent).
    pub fn cells(&self) -> &Array2<i64> {
        &self.cells
    }

    /// Uid of each local index at frame `t`.
    ///
    /// Fails when the frame's cells are not a bijection onto
    /// `{0, .., n_t - 1}` — a malformed table is a collaborator contract
    /// violation, not something to silently repair.
    pub fn uids_by_local_index(&self, t: usize) -> Result<Vec<usize>, LinkingError> {
        let n_t = self.n_insts[t];
        let mut by_cid: Vec<Option<usize>> = vec![None; n_t];
        for uid in 0..self.tracks() {
            let Some(cid) = self.get(t, uid) else {
                continue;
            };
            if cid >= n_t {
                return Err(LinkingError::MalformedTable {
                    frame: t,
                    reason: format!("local index {cid} out of range for {n_t} instances"),
                });
            }
            if by_cid[cid].is_some() {
                return Err(LinkingError::MalformedTable {
                    frame: t,
                    reason: format!("local index {cid} claimed by more than one track"),
                });
            }
            by_cid[cid] = Some(uid);
        }
        by_cid
            .into_iter()
            .enumerate()
            .map(|(cid, uid)| {
                uid.ok_or_else(|| LinkingError::MalformedTable {
                    frame: t,
                    reason: format!("local index {cid} belongs to no track"),
                })
            })
            .collect()
    }

    /// Verify the bijection invariant for every frame.
    pub fn check_bijection(&self) -> Result<(), LinkingError> {
        for t in 0..self.frames() {
            self.uids_by_local_index(t)?;
        }
        Ok(())
    }

    /// Regenerate per-pair link arrays from the table (inverse direction).
    ///
    /// Needed after gap closing mutates the table directly, so that any
    /// link-array consumer stays consistent. For a table that has not been
    /// gap-closed, `from_links(to_links(table)) == table`.
    pub fn to_links(&self) -> Vec<LinkArray> {
        let mut links = Vec::with_capacity(self.frames().saturating_sub(1));
        for t in 0..self.frames().saturating_sub(1) {
            let mut targets = vec![None; self.n_insts[t]];
            for uid in 0..self.tracks() {
                if let Some(cid) = self.get(t, uid) {
                    targets[cid] = self.get(t + 1, uid);
                }
            }
            links.push(LinkArray::from_targets(targets));
        }
        links
    }

    /// Uids emerging at each frame: present at `t` with no presence at
    /// `t - 1`. Frame 0's entire population emerges at 0. Uids are listed
    /// in local-index order.
    pub fn emergence_events(&self) -> Result<BTreeMap<usize, Vec<usize>>, LinkingError> {
        let mut events = BTreeMap::new();
        for t in 0..self.frames() {
            let uids: Vec<usize> = self
                .uids_by_local_index(t)?
                .into_iter()
                .filter(|&uid| t == 0 || self.get(t - 1, uid).is_none())
                .collect();
            if !uids.is_empty() {
                events.insert(t, uids);
            }
        }
        Ok(events)
    }

    /// Uids disappearing at each frame: present at `t` with no presence at
    /// `t + 1`. The final frame never hosts a disappearance. Uids are
    /// listed in local-index order.
    pub fn disappearance_events(&self) -> Result<BTreeMap<usize, Vec<usize>>, LinkingError> {
        let mut events = BTreeMap::new();
        for t in 0..self.frames().saturating_sub(1) {
            let uids: Vec<usize> = self
                .uids_by_local_index(t)?
                .into_iter()
                .filter(|&uid| self.get(t + 1, uid).is_none())
                .collect();
            if !uids.is_empty() {
                events.insert(t, uids);
            }
        }
        Ok(events)
    }

    /// Overwrite the cell for (`t`, `uid`). Gap closing only.
    pub(crate) fn set_raw(&mut self, t: usize, uid: usize, value: i64) {
        self.cells[[t, uid]] = value;
    }

    /// Drop uid columns that are absent at every frame, compacting the uid
    /// dimension. Remaining columns keep their relative order.
    pub fn drop_empty_tracks(self) -> Self {
        let kept: Vec<usize> = (0..self.tracks())
            .filter(|&uid| (0..self.frames()).any(|t| self.get(t, uid).is_some()))
            .collect();
        let mut cells = Array2::from_elem((self.frames(), kept.len()), ABSENT);
        for (new_uid, &old_uid) in kept.iter().enumerate() {
            for t in 0..self.frames() {
                cells[[t, new_uid]] = self.cells[[t, old_uid]];
            }
        }
        Self {
            cells,
            n_insts: self.n_insts,
        }
    }
}
