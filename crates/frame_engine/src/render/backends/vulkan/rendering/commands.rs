//! Command buffer handles and recording targets
//!
//! Command graphs append their finished command buffers to a shared
//! [`RecordedCommandBuffers`]; the frame task drains it once recording is done.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use ash::{vk, Device};

use crate::render::backends::vulkan::VulkanResult;

/// Recorded command buffer as seen by the submission pipeline
pub trait CommandBuffer: Send + Sync + fmt::Debug {
    /// Raw handle
    fn handle(&self) -> vk::CommandBuffer;

    /// Primary buffers are submitted directly; secondary buffers run through primaries
    fn level(&self) -> vk::CommandBufferLevel;
}

/// Shared command buffer handle
pub type CommandBufferRef = Arc<dyn CommandBuffer>;

/// Command buffer allocated from a pool owned elsewhere
///
/// Dropping this wrapper does not free the buffer; the owning pool does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VulkanCommandBuffer {
    command_buffer: vk::CommandBuffer,
    level: vk::CommandBufferLevel,
}

impl VulkanCommandBuffer {
    /// Wrap a raw handle
    pub fn new(command_buffer: vk::CommandBuffer, level: vk::CommandBufferLevel) -> Self {
        Self { command_buffer, level }
    }
}

impl CommandBuffer for VulkanCommandBuffer {
    fn handle(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    fn level(&self) -> vk::CommandBufferLevel {
        self.level
    }
}

/// Append-only collection of the command buffers recorded for one frame
///
/// Safe to share between threads recording independent graphs.
#[derive(Debug, Default)]
pub struct RecordedCommandBuffers {
    buffers: Mutex<Vec<CommandBufferRef>>,
}

impl RecordedCommandBuffers {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recorded buffer
    pub fn add(&self, buffer: CommandBufferRef) {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(buffer);
    }

    /// Snapshot of the buffers in append order
    pub fn buffers(&self) -> Vec<CommandBufferRef> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded buffers
    pub fn len(&self) -> usize {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Target of descriptor set binding commands during recording
pub trait DescriptorBinder {
    /// Bind `sets` starting at `first_set` for `bind_point` using `layout`
    fn bind_descriptor_sets(
        &mut self,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    ) -> VulkanResult<()>;
}

/// Records device commands into a command buffer in the recording state
pub struct VulkanCommandEncoder {
    device: Device,
    command_buffer: vk::CommandBuffer,
}

impl VulkanCommandEncoder {
    /// Encode into `command_buffer`, which must already have begun recording
    pub fn new(device: Device, command_buffer: vk::CommandBuffer) -> Self {
        Self { device, command_buffer }
    }

    /// Get the command buffer handle
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }
}

impl DescriptorBinder for VulkanCommandEncoder {
    fn bind_descriptor_sets(
        &mut self,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    ) -> VulkanResult<()> {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                bind_point,
                layout,
                first_set,
                sets,
                &[],
            );
        }
        Ok(())
    }
}

impl fmt::Debug for VulkanCommandEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VulkanCommandEncoder")
            .field("command_buffer", &self.command_buffer)
            .finish()
    }
}
