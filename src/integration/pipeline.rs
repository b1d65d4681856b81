//! LinkingPipeline for combining segmentation with time-series linking.

use crate::linking::{FrameMasks, LinkerConfig, LinkingError, TimeSeriesLinker, TrackTable};

use super::SegmentationSource;

/// A combined pipeline that bundles per-frame segmentation with the linker.
///
/// Linking is a whole-sequence operation, so the pipeline accumulates one
/// frame of masks per [`ingest_frame`](Self::ingest_frame) call and runs
/// the linker over the collected sequence on
/// [`link_collected`](Self::link_collected).
pub struct LinkingPipeline<S: SegmentationSource> {
    segmenter: S,
    linker: TimeSeriesLinker,
    collected: Vec<FrameMasks>,
}

impl<S: SegmentationSource> LinkingPipeline<S> {
    /// Create a new pipeline with the given segmenter and linker config.
    pub fn new(segmenter: S, config: LinkerConfig) -> Self {
        Self {
            segmenter,
            linker: TimeSeriesLinker::new(config),
            collected: Vec::new(),
        }
    }

    /// Create a new pipeline with default linker configuration.
    pub fn with_default_config(segmenter: S) -> Self {
        Self::new(segmenter, LinkerConfig::default())
    }

    /// Segment one frame and append its masks to the sequence.
    ///
    /// Returns the number of instances found in this frame.
    pub fn ingest_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<usize, S::Error> {
        let masks = self.segmenter.segment(input, width, height)?;
        let n = masks.len();
        self.collected.push(masks);
        Ok(n)
    }

    /// Number of frames ingested so far.
    pub fn frame_count(&self) -> usize {
        self.collected.len()
    }

    /// Link everything ingested so far, consuming the collected frames.
    pub fn link_collected(&mut self) -> Result<&TrackTable, LinkingError> {
        let frames = std::mem::take(&mut self.collected);
        self.linker.link(frames)
    }

    /// Get a reference to the underlying segmenter.
    pub fn segmenter(&self) -> &S {
        &self.segmenter
    }

    /// Get a mutable reference to the underlying segmenter.
    pub fn segmenter_mut(&mut self) -> &mut S {
        &mut self.segmenter
    }

    /// Get a reference to the underlying linker.
    pub fn linker(&self) -> &TimeSeriesLinker {
        &self.linker
    }

    /// Get a mutable reference to the underlying linker.
    pub fn linker_mut(&mut self) -> &mut TimeSeriesLinker {
        &mut self.linker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linking::Mask;
    use ndarray::Array2;

    struct MockSegmenter {
        masks: FrameMasks,
    }

    impl SegmentationSource for MockSegmenter {
        type Error = std::convert::Infallible;

        fn segment(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<FrameMasks, Self::Error> {
            Ok(self.masks.clone())
        }
    }

    #[test]
    fn test_pipeline_links_ingested_frames() {
        let segmenter = MockSegmenter {
            masks: vec![Mask::new(Array2::from_elem((4, 4), true))],
        };
        let mut pipeline = LinkingPipeline::with_default_config(segmenter);

        pipeline.ingest_frame(&[], 4, 4).unwrap();
        pipeline.ingest_frame(&[], 4, 4).unwrap();
        assert_eq!(pipeline.frame_count(), 2);

        let table = pipeline.link_collected().unwrap();
        assert_eq!(table.frames(), 2);
        assert_eq!(table.tracks(), 1);
        assert_eq!(table.get(1, 0), Some(0));
    }
}
