//! Global track identity allocation from per-pair link arrays.

use crate::linking::assignment::LinkArray;

/// Assign a globally unique track id to every (frame, local index) pair.
///
/// Frame 0's instances get uids `0..n_0`. In each later frame, a link
/// target inherits its predecessor's uid; every instance with no inbound
/// link starts a new track with the next unused uid. The counter is
/// strictly increasing and never reused, and an empty frame leaves it
/// untouched.
///
/// Returns, per frame, the uid of each local index.
pub fn allocate_uids(links: &[LinkArray], n_insts: &[usize]) -> Vec<Vec<usize>> {
    debug_assert_eq!(links.len() + 1, n_insts.len());

    let mut uids: Vec<Vec<usize>> = Vec::with_capacity(n_insts.len());
    uids.push((0..n_insts[0]).collect());
    let mut next_uid = n_insts[0];

    for (t, link) in links.iter().enumerate() {
        let mut frame_uids = vec![usize::MAX; n_insts[t + 1]];

        for (prev_idx, target) in link.iter().enumerate() {
            if let Some(cur_idx) = target {
                frame_uids[cur_idx] = uids[t][prev_idx];
            }
        }
        for uid in frame_uids.iter_mut().filter(|u| **u == usize::MAX) {
            *uid = next_uid;
            next_uid += 1;
        }
        uids.push(frame_uids);
    }

    uids
}

/// Total number of uids ever allocated for a uid assignment.
pub fn uid_count(uids: &[Vec<usize>]) -> usize {
    uids.iter()
        .flat_map(|frame| frame.iter().copied())
        .max()
        .map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(targets: Vec<Option<usize>>) -> LinkArray {
        LinkArray::from_targets(targets)
    }

    #[test]
    fn test_stable_linking_keeps_uids() {
        let li = vec![links(vec![Some(1), Some(0)])];
        let uids = allocate_uids(&li, &[2, 2]);
        assert_eq!(uids[0], vec![0, 1]);
        // Instance 0 went to local index 1 and vice versa.
        assert_eq!(uids[1], vec![1, 0]);
        assert_eq!(uid_count(&uids), 2);
    }

    #[test]
    fn test_unlinked_instance_starts_new_track() {
        let li = vec![links(vec![Some(0), None])];
        let uids = allocate_uids(&li, &[2, 2]);
        assert_eq!(uids[1], vec![0, 2]);
        assert_eq!(uid_count(&uids), 3);
    }

    #[test]
    fn test_empty_frame_leaves_counter_unchanged() {
        let li = vec![links(vec![None, None]), links(vec![])];
        let uids = allocate_uids(&li, &[2, 0, 1]);
        assert!(uids[1].is_empty());
        // The instance at t=2 gets the next uid after frame 0's two.
        assert_eq!(uids[2], vec![2]);
    }

    #[test]
    fn test_shrinking_frame_is_not_emergence() {
        // Three instances drop to one; the unmatched two simply disappear.
        let li = vec![links(vec![None, Some(0), None])];
        let uids = allocate_uids(&li, &[3, 1]);
        assert_eq!(uids[1], vec![1]);
        assert_eq!(uid_count(&uids), 3);
    }
}
