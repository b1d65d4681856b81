use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Binary occupancy grid for one segmented instance in one frame.
///
/// Masks are produced by an external segmenter and are read-only from the
/// linker's point of view. All masks within a sequence must share the same
/// image extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    pixels: Array2<bool>,
}

impl Mask {
    /// Wrap a boolean occupancy grid as a mask.
    pub fn new(pixels: Array2<bool>) -> Self {
        Self { pixels }
    }

    /// Image extent as (height, width).
    #[inline]
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    /// Number of occupied pixels.
    pub fn area(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// Number of pixels occupied by both masks.
    ///
    /// Extents are assumed equal; the session validates this once per
    /// sequence rather than per pair.
    pub fn intersection(&self, other: &Mask) -> usize {
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .filter(|&(&a, &b)| a && b)
            .count()
    }

    /// Access the underlying grid.
    pub fn pixels(&self) -> &Array2<bool> {
        &self.pixels
    }
}

/// A frame's instances, local index = position in the vector.
pub type FrameMasks = Vec<Mask>;

/// Split an integer label image into one mask per distinct non-zero label.
///
/// Labels are emitted in ascending order, so local indices are stable for a
/// given label image. Label 0 is background.
pub fn masks_from_labels(labels: &Array2<u32>) -> FrameMasks {
    let mut ids: Vec<u32> = labels.iter().copied().filter(|&l| l != 0).collect();
    ids.sort_unstable();
    ids.dedup();

    ids.into_iter()
        .map(|id| Mask::new(labels.mapv(|l| l == id)))
        .collect()
}
