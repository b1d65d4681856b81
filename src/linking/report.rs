//! Per-track, per-frame area summary.

use ndarray::Array2;

use crate::linking::error::LinkingError;
use crate::linking::mask::FrameMasks;
use crate::linking::table::TrackTable;

/// Pixel area of every track at every frame.
///
/// Cell `(t, uid)` is the area of the track's mask at that frame, or 0.0
/// while the track is absent. Pure derivation from the table and the
/// original masks; inconsistent inputs are a collaborator contract
/// violation and surface as errors.
pub fn area_report(table: &TrackTable, frames: &[FrameMasks]) -> Result<Array2<f64>, LinkingError> {
    if frames.len() != table.frames() {
        return Err(LinkingError::FrameCountMismatch {
            expected: table.frames(),
            actual: frames.len(),
        });
    }

    let mut report = Array2::zeros((table.frames(), table.tracks()));
    for (t, frame) in frames.iter().enumerate() {
        if frame.len() != table.instance_counts()[t] {
            return Err(LinkingError::InstanceCountMismatch {
                frame: t,
                expected: table.instance_counts()[t],
                actual: frame.len(),
            });
        }
        for (cid, &uid) in table.uids_by_local_index(t)?.iter().enumerate() {
            report[[t, uid]] = frame[cid].area() as f64;
        }
    }
    Ok(report)
}
