use thiserror::Error;

/// Fatal contract violations between the linker and its collaborators.
///
/// These indicate malformed input rather than recoverable conditions, so
/// they are surfaced to the caller instead of being patched over.
#[derive(Debug, Error)]
pub enum LinkingError {
    /// Number of frames disagrees between two inputs that must align.
    #[error("frame count mismatch: expected {expected}, got {actual}")]
    FrameCountMismatch { expected: usize, actual: usize },

    /// A mask's image extent differs from the sequence's extent.
    #[error(
        "mask extent mismatch at frame {frame}, instance {instance}: \
         expected {expected:?}, got {actual:?}"
    )]
    MaskExtentMismatch {
        frame: usize,
        instance: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A frame's mask count disagrees with the table's instance count.
    #[error("instance count mismatch at frame {frame}: table says {expected}, got {actual} masks")]
    InstanceCountMismatch {
        frame: usize,
        expected: usize,
        actual: usize,
    },

    /// The sequence contains no frames at all.
    #[error("empty sequence: at least one frame is required")]
    EmptySequence,

    /// A track table cell does not map onto its frame's instances.
    #[error("malformed track table at frame {frame}: {reason}")]
    MalformedTable { frame: usize, reason: String },
}
