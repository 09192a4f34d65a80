pub mod artifact;
pub mod model;
pub mod slicer;
pub mod store;

pub use artifact::{read_slice_artifact, write_slice_artifact, SliceArtifact};
pub use model::{MapPosition, ParticipantId, ParticipantSnapshot, RawEvent, TimelineFrame};
pub use slicer::{slice_window, SlicedFrame, WindowSlice};
pub use store::MatchTimelineStore;
