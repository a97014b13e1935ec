//! LED indicator implementations

pub mod segments;

pub use segments::{flow_frame, SegmentStrip};
