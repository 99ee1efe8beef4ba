//! Presentation targets the submission must wait on

use crate::render::backends::vulkan::SemaphoreRef;

/// Window whose acquired swapchain image is rendered into this frame
pub trait FrameWindow: Send + Sync {
    /// Semaphore signaled when the acquired image is available, or `None`
    /// when no image is currently acquired
    fn image_available_semaphore(&self) -> Option<SemaphoreRef>;
}
