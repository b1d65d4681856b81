//! Trait for instance segmentation backends.

use ndarray::Array2;

use crate::linking::{FrameMasks, masks_from_labels};

/// Trait for per-frame instance segmentation backends.
///
/// Implement this to connect any segmenter to the time-series linker.
///
/// # Example
///
/// ```ignore
/// use masktrack_rs::{SegmentationSource, FrameMasks};
///
/// struct MySegmenter {
///     // Your model here
/// }
///
/// impl SegmentationSource for MySegmenter {
///     type Error = std::io::Error;
///
///     fn segment(&mut self, input: &[u8], width: u32, height: u32) -> Result<FrameMasks, Self::Error> {
///         // Run segmentation and return one mask per instance
///         Ok(vec![])
///     }
/// }
/// ```
pub trait SegmentationSource {
    /// Error type for segmentation failures.
    type Error;

    /// Segment one frame of raw image data into instance masks.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn segment(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<FrameMasks, Self::Error>;
}

/// Helper trait for converting segmenter-specific outputs into masks.
pub trait IntoMasks {
    /// Convert the output into one mask per instance.
    fn into_masks(self) -> FrameMasks;
}

impl IntoMasks for FrameMasks {
    fn into_masks(self) -> FrameMasks {
        self
    }
}

/// Label images split into one mask per non-zero label.
impl IntoMasks for Array2<u32> {
    fn into_masks(self) -> FrameMasks {
        masks_from_labels(&self)
    }
}
