//! Pairwise overlap scoring between two frames' mask collections.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::linking::mask::Mask;

/// Overlap similarity metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapMetric {
    /// Intersection over union: symmetric in the two masks.
    IoU,
    /// Intersection over the first mask's own area. Asymmetric, useful when
    /// one side's instances are expected to be subsets of the other's.
    #[default]
    IoS,
}

impl std::str::FromStr for OverlapMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IOU" => Ok(Self::IoU),
            "IOS" => Ok(Self::IoS),
            other => Err(format!("unknown overlap metric: {other}")),
        }
    }
}

/// Compute the n1 x n2 similarity matrix between two mask collections.
///
/// Scores are in [0, 1]. A pair whose denominator is zero (a degenerate
/// zero-area detection) scores NaN; downstream linking treats NaN as
/// "never selected" rather than an error. Single-mask collections go
/// through the same path as any other size.
pub fn overlap_matrix(masks1: &[Mask], masks2: &[Mask], metric: OverlapMetric) -> Array2<f64> {
    let (n1, n2) = (masks1.len(), masks2.len());
    let mut scores = Array2::zeros((n1, n2));

    for (i, a) in masks1.iter().enumerate() {
        let area_a = a.area() as f64;
        for (j, b) in masks2.iter().enumerate() {
            let inter = a.intersection(b) as f64;
            scores[[i, j]] = match metric {
                OverlapMetric::IoU => {
                    let union = area_a + b.area() as f64 - inter;
                    inter / union
                }
                OverlapMetric::IoS => inter / area_a,
            };
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn mask(rows: [[bool; 3]; 2]) -> Mask {
        Mask::new(array![
            [rows[0][0], rows[0][1], rows[0][2]],
            [rows[1][0], rows[1][1], rows[1][2]],
        ])
    }

    #[test]
    fn test_iou_identical_and_disjoint() {
        let a = mask([[true, true, false], [false, false, false]]);
        let b = mask([[false, false, false], [false, true, true]]);
        let scores = overlap_matrix(&[a.clone(), b.clone()], &[a, b], OverlapMetric::IoU);
        assert_relative_eq!(scores[[0, 0]], 1.0);
        assert_relative_eq!(scores[[1, 1]], 1.0);
        assert_relative_eq!(scores[[0, 1]], 0.0);
        assert_relative_eq!(scores[[1, 0]], 0.0);
    }

    #[test]
    fn test_ios_is_asymmetric() {
        // a is a strict subset of b: IoS(a, b) = 1, IoS(b, a) = 1/2.
        let a = mask([[true, false, false], [false, false, false]]);
        let b = mask([[true, true, false], [false, false, false]]);
        let fwd = overlap_matrix(std::slice::from_ref(&a), std::slice::from_ref(&b), OverlapMetric::IoS);
        let rev = overlap_matrix(std::slice::from_ref(&b), std::slice::from_ref(&a), OverlapMetric::IoS);
        assert_relative_eq!(fwd[[0, 0]], 1.0);
        assert_relative_eq!(rev[[0, 0]], 0.5);
    }

    #[test]
    fn test_partial_iou() {
        let a = mask([[true, true, false], [false, false, false]]);
        let b = mask([[false, true, true], [false, false, false]]);
        let scores = overlap_matrix(&[a], &[b], OverlapMetric::IoU);
        // intersection 1, union 3
        assert_relative_eq!(scores[[0, 0]], 1.0 / 3.0);
    }

    #[test]
    fn test_zero_area_yields_nan() {
        let empty = mask([[false, false, false], [false, false, false]]);
        let full = mask([[true, true, true], [true, true, true]]);
        let ios = overlap_matrix(std::slice::from_ref(&empty), std::slice::from_ref(&full), OverlapMetric::IoS);
        assert!(ios[[0, 0]].is_nan());
        let iou = overlap_matrix(&[empty.clone()], &[empty], OverlapMetric::IoU);
        assert!(iou[[0, 0]].is_nan());
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("iou".parse::<OverlapMetric>().unwrap(), OverlapMetric::IoU);
        assert_eq!("IoS".parse::<OverlapMetric>().unwrap(), OverlapMetric::IoS);
        assert!("dice".parse::<OverlapMetric>().is_err());
    }
}
