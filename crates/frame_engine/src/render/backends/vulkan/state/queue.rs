//! Queue submission
//!
//! A [`Submission`] is the flattened form of one frame's work: the raw handles
//! and stage masks that go into a single `vk::SubmitInfo`.

use std::fmt;

use ash::{vk, Device};

use crate::render::backends::vulkan::{Fence, VulkanError, VulkanResult};

/// One atomic batch of work for an execution queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// Semaphores waited on before the batch executes
    pub wait_semaphores: Vec<vk::Semaphore>,
    /// Stage at which each wait semaphore is waited on, parallel to `wait_semaphores`
    pub wait_stages: Vec<vk::PipelineStageFlags>,
    /// Primary command buffers executed in order
    pub command_buffers: Vec<vk::CommandBuffer>,
    /// Semaphores signaled when the batch completes
    pub signal_semaphores: Vec<vk::Semaphore>,
}

impl Submission {
    /// Append a wait semaphore with its stage mask
    pub fn add_wait(&mut self, semaphore: vk::Semaphore, stage: vk::PipelineStageFlags) {
        self.wait_semaphores.push(semaphore);
        self.wait_stages.push(stage);
    }
}

/// Execution queue accepting submissions guarded by a fence
pub trait Queue: Send + Sync {
    /// Submit `submission`; `fence` is signaled when the device finishes it
    fn submit(&self, submission: &Submission, fence: &Fence) -> VulkanResult<()>;
}

/// ash-backed queue
#[derive(Clone)]
pub struct VulkanQueue {
    device: Device,
    queue: vk::Queue,
}

impl VulkanQueue {
    /// Wrap a queue retrieved from `device`
    pub fn new(device: Device, queue: vk::Queue) -> Self {
        Self { device, queue }
    }

    /// Get the queue handle
    pub fn handle(&self) -> vk::Queue {
        self.queue
    }
}

impl Queue for VulkanQueue {
    fn submit(&self, submission: &Submission, fence: &Fence) -> VulkanResult<()> {
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&submission.wait_semaphores)
            .wait_dst_stage_mask(&submission.wait_stages)
            .command_buffers(&submission.command_buffers)
            .signal_semaphores(&submission.signal_semaphores);

        unsafe {
            self.device.queue_submit(
                self.queue,
                &[submit_info.build()],
                fence.handle(),
            ).map_err(VulkanError::Api)
        }
    }
}

impl fmt::Debug for VulkanQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VulkanQueue").field("queue", &self.queue).finish()
    }
}
