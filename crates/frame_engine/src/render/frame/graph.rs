//! Command-producing graphs and the paging helper they may consult

use std::fmt;
use std::sync::Arc;

use crate::render::backends::vulkan::{RecordedCommandBuffers, VulkanResult};
use crate::render::frame::FrameStamp;

/// Background helper that loads and unloads paged scene content
pub trait DatabasePager: Send + Sync + fmt::Debug {
    /// Start the helper's worker
    fn start(&self);
}

/// Shared paging helper handle
pub type PagerRef = Arc<dyn DatabasePager>;

/// Produces command buffers for a frame
///
/// Graphs attached to one frame task are recorded in insertion order. Each
/// graph appends only to `recorded`, so independent graphs may be recorded
/// on separate threads by the caller.
pub trait CommandGraph: Send {
    /// Record this frame's commands into `recorded`
    fn record(
        &mut self,
        recorded: &RecordedCommandBuffers,
        frame_stamp: &FrameStamp,
        pager: Option<&PagerRef>,
    ) -> VulkanResult<()>;

    /// Highest state slot the graph's record traversal must track
    fn max_slot(&self) -> u32;

    /// Raise or set the state slot count
    fn set_max_slot(&mut self, max_slot: u32);
}
