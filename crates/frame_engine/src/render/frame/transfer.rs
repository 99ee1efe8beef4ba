//! Data transfer sub-tasks
//!
//! A transfer task copies host-side dynamic data to the device at a fixed
//! point of the frame. The frame task owns two: the early one runs before
//! recording, the late one after.

use ash::vk;

use crate::render::backends::vulkan::{SemaphoreRef, VulkanResult};

/// Region of a buffer whose contents change from frame to frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRegion {
    /// Destination buffer
    pub buffer: vk::Buffer,
    /// Byte offset into `buffer`
    pub offset: vk::DeviceSize,
    /// Byte length of the region
    pub range: vk::DeviceSize,
}

/// Newly compiled dynamic data to be kept up to date by a transfer task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicData {
    /// Buffer regions refreshed on every transfer
    pub buffer_regions: Vec<BufferRegion>,
}

impl DynamicData {
    /// Whether there is nothing to track
    pub fn is_empty(&self) -> bool {
        self.buffer_regions.is_empty()
    }
}

/// Uploads dynamic data and signals when the upload is complete
pub trait TransferTask: Send {
    /// Move to the next buffered frame
    fn advance(&mut self);

    /// Copy this frame's dynamic data to the device
    ///
    /// When anything was copied, [`TransferTask::current_transfer_completed`]
    /// returns the semaphore the copy signals.
    fn transfer_dynamic_data(&mut self) -> VulkanResult<()>;

    /// Semaphore signaled by this frame's transfer, if one was issued
    fn current_transfer_completed(&self) -> Option<SemaphoreRef>;

    /// Forget the previous frame's completion semaphore
    fn clear_current_transfer_completed(&mut self);

    /// Semaphore the next transfer must wait on before reusing its staging memory
    fn add_wait_semaphore(&mut self, semaphore: SemaphoreRef);

    /// Start tracking newly compiled dynamic data
    fn assign(&mut self, data: &DynamicData);
}
