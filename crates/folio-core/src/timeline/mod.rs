//! Animated targets and the builder that lays them out on the progress axis

pub mod builder;
pub mod segment;

pub use builder::{BuildInput, PageTimeline, PageTimelineBuilder};
pub use segment::{ContentRole, Handle, Property, TimelineSegment};
