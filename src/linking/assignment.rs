//! Frame-pair linking: similarity matrix to one-to-one instance assignment.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Links from one frame's instances to the next frame's.
///
/// Entry `i` is the local index in the second frame matched to instance `i`
/// of the first frame, or `None` when unmatched. The mapping is injective:
/// it is drawn from a bipartite matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkArray {
    targets: Vec<Option<usize>>,
}

impl LinkArray {
    /// A link array of length `n` with every instance unmatched.
    pub fn unmatched(n: usize) -> Self {
        Self {
            targets: vec![None; n],
        }
    }

    pub fn from_targets(targets: Vec<Option<usize>>) -> Self {
        Self { targets }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Match target for the first frame's instance `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<usize> {
        self.targets[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.targets.iter().copied()
    }

    /// Number of matched instances.
    pub fn matched_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_some()).count()
    }
}

/// Cost assigned to padding cells and to NaN-scored pairs, large enough
/// that the solver only uses them when no real pairing remains.
const UNMATCHABLE_COST: f64 = 1e6;

/// Link two frames' instances from their similarity matrix.
///
/// Columns whose best score over all rows is below `threshold` cannot take
/// part in any valid link, so they are removed before solving; this shrinks
/// the assignment problem without changing its outcome. The remaining
/// matrix is solved as a maximum-weight bipartite matching (Jonker-Volgenant
/// on `1 - score`, padded to square), and each matched pair is kept only if
/// its score clears the threshold. NaN scores (zero-area masks) never clear
/// it.
pub fn link_instances(weights: &Array2<f64>, threshold: f64) -> LinkArray {
    let (n1, n2) = weights.dim();
    let mut links = LinkArray::unmatched(n1);

    if n1 == 0 || n2 == 0 {
        return links;
    }

    // Columns that can still satisfy the threshold for at least one row.
    let avail_cols: Vec<usize> = (0..n2)
        .filter(|&j| (0..n1).any(|i| weights[[i, j]] >= threshold))
        .collect();
    if avail_cols.is_empty() {
        return links;
    }

    let size = n1.max(avail_cols.len());
    let mut padded = Array2::<f64>::from_elem((size, size), UNMATCHABLE_COST);
    for i in 0..n1 {
        for (c, &j) in avail_cols.iter().enumerate() {
            let w = weights[[i, j]];
            if w.is_finite() {
                padded[[i, c]] = 1.0 - w;
            }
        }
    }

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row, &col) in row_to_col.iter().enumerate() {
                if row >= n1 || col >= avail_cols.len() {
                    continue;
                }
                let target = avail_cols[col];
                // NaN fails this comparison, leaving the row unmatched.
                if weights[[row, target]] >= threshold {
                    links.targets[row] = Some(target);
                }
            }
        }
        Err(err) => {
            warn!(?err, "assignment solver failed; leaving frame pair unlinked");
        }
    }

    links
}
