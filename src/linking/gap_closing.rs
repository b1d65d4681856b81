//! Re-linking of tracks across short detection gaps.

use tracing::info;

use crate::linking::assignment::link_instances;
use crate::linking::error::LinkingError;
use crate::linking::mask::{FrameMasks, Mask};
use crate::linking::overlap::{OverlapMetric, overlap_matrix};
use crate::linking::table::{ABSENT, TrackTable};

/// Merge disappearance/emergence pairs that are the same physical object.
///
/// For each timepoint with disappearing tracks, taken latest first, every
/// emergence time strictly inside the `(t, t + max_gap)` window is a
/// candidate: the vanished tracks' masks at `t` are scored and linked
/// against the emergent tracks' masks at `t'` exactly as adjacent frames
/// are. A match reassigns the emergent uid's timeline from `t'` onward to
/// the vanished uid and clears the emergent row; a timepoint's pending set
/// shrinks as its tracks are re-linked and the window scan stops once it
/// empties. Fully absorbed uids are dropped at the end, compacting the uid
/// dimension.
///
/// Descending disappearance order keeps later merges from invalidating the
/// candidate windows already gathered for earlier timepoints, so a single
/// pass is deterministic.
pub fn close_gaps(
    mut table: TrackTable,
    frames: &[FrameMasks],
    metric: OverlapMetric,
    threshold: f64,
    max_gap: usize,
) -> Result<TrackTable, LinkingError> {
    check_frames(&table, frames)?;

    let t_len = table.frames();
    // Snapshot of uid placement and events before any mutation; merges only
    // rewrite track timelines, the per-frame mask layout never changes.
    let locs: Vec<Vec<usize>> = (0..t_len)
        .map(|t| table.uids_by_local_index(t))
        .collect::<Result<_, _>>()?;
    let emergence = table.emergence_events()?;
    let disappearance = table.disappearance_events()?;

    for (&t, uids_disap) in disappearance.iter().rev() {
        let mut pending = uids_disap.clone();

        let window = emergence
            .range(t + 1..)
            .take_while(|&(&te, _)| te < t + max_gap);
        for (&t2, uids_emerg) in window {
            if pending.is_empty() {
                break;
            }

            let masks_disap = masks_for(&pending, &locs[t], &frames[t]);
            let masks_emerg = masks_for(uids_emerg, &locs[t2], &frames[t2]);
            let weights = overlap_matrix(&masks_disap, &masks_emerg, metric);
            let links = link_instances(&weights, threshold);

            let mut still_pending = Vec::new();
            for (row, &uid_disap) in pending.iter().enumerate() {
                let Some(col) = links.get(row) else {
                    still_pending.push(uid_disap);
                    continue;
                };
                let uid_emerg = uids_emerg[col];
                if uid_emerg == uid_disap {
                    // A previously closed gap: the track re-emerges as
                    // itself and is already continuous past t2.
                    continue;
                }
                info!(
                    uid = uid_disap,
                    absorbed = uid_emerg,
                    last_seen = t,
                    reappeared = t2,
                    "gap-closed track"
                );
                for tt in t2..t_len {
                    let cell = table.cells()[[tt, uid_emerg]];
                    table.set_raw(tt, uid_disap, cell);
                    table.set_raw(tt, uid_emerg, ABSENT);
                }
            }
            pending = still_pending;
        }
    }

    Ok(table.drop_empty_tracks())
}

fn check_frames(table: &TrackTable, frames: &[FrameMasks]) -> Result<(), LinkingError> {
    if frames.len() != table.frames() {
        return Err(LinkingError::FrameCountMismatch {
            expected: table.frames(),
            actual: frames.len(),
        });
    }
    for (t, (frame, &n_t)) in frames.iter().zip(table.instance_counts()).enumerate() {
        if frame.len() != n_t {
            return Err(LinkingError::InstanceCountMismatch {
                frame: t,
                expected: n_t,
                actual: frame.len(),
            });
        }
    }
    Ok(())
}

/// Pull the listed uids' masks out of one frame, in uid-list order.
fn masks_for(uids: &[usize], locs: &[usize], frame: &FrameMasks) -> Vec<Mask> {
    uids.iter()
        .map(|&uid| {
            let cid = locs
                .iter()
                .position(|&u| u == uid)
                .expect("uid taken from this frame's own placement");
            frame[cid].clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linking::mask::Mask;
    use ndarray::Array2;

    fn square(origin: (usize, usize), side: usize) -> Mask {
        let mut grid = Array2::from_elem((12, 12), false);
        for r in origin.0..origin.0 + side {
            for c in origin.1..origin.1 + side {
                grid[[r, c]] = true;
            }
        }
        Mask::new(grid)
    }

    /// One object present at t=0,1, missing at t=2, back at t=3.
    fn gapped_sequence() -> (Vec<FrameMasks>, TrackTable) {
        let obj = || square((2, 2), 4);
        let frames = vec![vec![obj()], vec![obj()], vec![], vec![obj()]];
        let uids = vec![vec![0], vec![0], vec![], vec![1]];
        (frames, TrackTable::from_uids(&uids))
    }

    #[test]
    fn test_reappearance_is_absorbed() {
        let (frames, table) = gapped_sequence();
        assert_eq!(table.tracks(), 2);

        let closed = close_gaps(table, &frames, OverlapMetric::IoU, 0.3, 5).unwrap();
        assert_eq!(closed.tracks(), 1);
        assert_eq!(closed.get(3, 0), Some(0));
        assert_eq!(closed.get(2, 0), None);
        closed.check_bijection().unwrap();
    }

    #[test]
    fn test_gap_longer_than_window_is_kept_split() {
        let (frames, table) = gapped_sequence();
        // Reappearance at t=3 sits outside (1, 1 + 2).
        let closed = close_gaps(table.clone(), &frames, OverlapMetric::IoU, 0.3, 2).unwrap();
        assert_eq!(closed, table);
    }

    #[test]
    fn test_unrelated_object_is_not_absorbed() {
        let frames = vec![
            vec![square((0, 0), 3)],
            vec![square((0, 0), 3)],
            vec![],
            vec![square((8, 8), 3)],
        ];
        let uids = vec![vec![0], vec![0], vec![], vec![1]];
        let table = TrackTable::from_uids(&uids);
        let closed = close_gaps(table.clone(), &frames, OverlapMetric::IoU, 0.3, 5).unwrap();
        assert_eq!(closed, table);
    }

    #[test]
    fn test_idempotence() {
        let (frames, table) = gapped_sequence();
        let once = close_gaps(table, &frames, OverlapMetric::IoU, 0.3, 5).unwrap();
        let twice = close_gaps(once.clone(), &frames, OverlapMetric::IoU, 0.3, 5).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_frame_count_mismatch_is_fatal() {
        let (frames, table) = gapped_sequence();
        let err = close_gaps(table, &frames[..3], OverlapMetric::IoU, 0.3, 5).unwrap_err();
        assert!(matches!(err, LinkingError::FrameCountMismatch { .. }));
    }
}
