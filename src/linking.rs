mod assignment;
mod error;
mod gap_closing;
mod identity;
mod mask;
mod overlap;
mod report;
mod session;
mod table;

pub use assignment::{LinkArray, link_instances};
pub use error::LinkingError;
pub use gap_closing::close_gaps;
pub use identity::{allocate_uids, uid_count};
pub use mask::{FrameMasks, Mask, masks_from_labels};
pub use overlap::{OverlapMetric, overlap_matrix};
pub use report::area_report;
pub use session::{LinkerConfig, TimeSeriesLinker};
pub use table::{ABSENT, TrackTable};
