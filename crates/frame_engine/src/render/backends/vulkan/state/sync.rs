//! Vulkan synchronization primitives for GPU/CPU coordination
//!
//! This module separates what the frame pipeline needs from a synchronization
//! object (wait, reset, signal, a raw handle for submission) from how the object
//! is created. The frame task only ever sees the traits below, so the protocol
//! can be driven against real ash objects or recording fakes.
//!
//! ## GPU-GPU Synchronization (Semaphores)
//! Semaphores order work on the device without host involvement:
//! ```text
//! Early transfer: [Copy] -> Signal A
//! Submission:               Wait A (vertex stage) -> [Draw] -> Signal B
//! Next transfer:                                              Wait B -> [Copy]
//! ```
//! Each semaphore carries the pipeline stage a submission waits at when it
//! appears in a wait list.
//!
//! ## CPU-GPU Synchronization (Fences)
//! A `Fence` pairs the raw primitive with the objects a submission referenced.
//! Command buffers and semaphores attached to a fence stay alive until the
//! host has observed the fence signal and called
//! [`Fence::reset_fence_and_dependencies`]:
//! ```text
//! Frame N:   submit(fence[i]) -- buffers held by fence[i]
//! Frame N+k: wait(fence[i]) -> reset -> buffers released -> reuse slot i
//! ```

use std::fmt;
use std::sync::Arc;

use ash::{vk, Device};

use crate::render::backends::vulkan::{CommandBufferRef, VulkanError, VulkanResult};

/// Device-side signal primitive
///
/// Semaphores are shared between the object that signals them and every
/// submission that waits on them, so they are handed around as [`SemaphoreRef`].
pub trait Semaphore: Send + Sync + fmt::Debug {
    /// Raw handle used when building a submission
    fn handle(&self) -> vk::Semaphore;

    /// Pipeline stage a submission waits at when this semaphore is in its wait list
    fn pipeline_stage_flags(&self) -> vk::PipelineStageFlags;
}

/// Shared semaphore handle
pub type SemaphoreRef = Arc<dyn Semaphore>;

/// Host-waitable primitive underlying a [`Fence`]
pub trait FencePrimitive: Send + Sync + fmt::Debug {
    /// Raw handle used when building a submission
    fn handle(&self) -> vk::Fence;

    /// Block until the fence is signaled or `timeout` nanoseconds elapse
    fn wait(&self, timeout: u64) -> VulkanResult<()>;

    /// Return the fence to the unsignaled state
    fn reset(&self) -> VulkanResult<()>;
}

/// Fence with the command buffers and semaphores its submission depends on
pub struct Fence {
    primitive: Box<dyn FencePrimitive>,
    dependent_command_buffers: Vec<CommandBufferRef>,
    dependent_semaphores: Vec<SemaphoreRef>,
}

impl Fence {
    /// Wrap a raw primitive with empty dependency lists
    pub fn new(primitive: Box<dyn FencePrimitive>) -> Self {
        Self {
            primitive,
            dependent_command_buffers: Vec::new(),
            dependent_semaphores: Vec::new(),
        }
    }

    /// Get the fence handle
    pub fn handle(&self) -> vk::Fence {
        self.primitive.handle()
    }

    /// Whether a prior submission left objects that may still be in use
    pub fn has_dependencies(&self) -> bool {
        !self.dependent_command_buffers.is_empty() || !self.dependent_semaphores.is_empty()
    }

    /// Wait for fence
    pub fn wait(&self, timeout: u64) -> VulkanResult<()> {
        self.primitive.wait(timeout)
    }

    /// Reset the fence and release everything the last submission held
    ///
    /// The dependency lists are kept if the reset itself fails.
    pub fn reset_fence_and_dependencies(&mut self) -> VulkanResult<()> {
        self.primitive.reset()?;
        self.dependent_command_buffers.clear();
        self.dependent_semaphores.clear();
        Ok(())
    }

    /// Command buffers held until the fence signals
    pub fn dependent_command_buffers(&self) -> &[CommandBufferRef] {
        &self.dependent_command_buffers
    }

    /// Mutable access to the held command buffers
    pub fn dependent_command_buffers_mut(&mut self) -> &mut Vec<CommandBufferRef> {
        &mut self.dependent_command_buffers
    }

    /// Semaphores held until the fence signals
    pub fn dependent_semaphores(&self) -> &[SemaphoreRef] {
        &self.dependent_semaphores
    }

    /// Mutable access to the held semaphores
    pub fn dependent_semaphores_mut(&mut self) -> &mut Vec<SemaphoreRef> {
        &mut self.dependent_semaphores
    }
}

impl fmt::Debug for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fence")
            .field("handle", &self.handle())
            .field("dependent_command_buffers", &self.dependent_command_buffers.len())
            .field("dependent_semaphores", &self.dependent_semaphores.len())
            .finish()
    }
}

/// Creates the synchronization objects a frame task owns
pub trait SyncFactory {
    /// Create an unsignaled fence primitive
    fn create_fence(&self) -> VulkanResult<Box<dyn FencePrimitive>>;

    /// Create a semaphore waited on at `stage_flags`
    fn create_semaphore(&self, stage_flags: vk::PipelineStageFlags) -> VulkanResult<SemaphoreRef>;
}

/// GPU-GPU synchronization primitive with automatic resource management
///
/// # Usage Pattern
/// Semaphores are signaled by one operation and waited on by another:
/// - Transfer completion signals → Rendering waits
/// - Rendering signals → Next transfer waits
pub struct VulkanSemaphore {
    device: Device,
    semaphore: vk::Semaphore,
    stage_flags: vk::PipelineStageFlags,
}

impl VulkanSemaphore {
    /// Create a new semaphore
    pub fn new(device: Device, stage_flags: vk::PipelineStageFlags) -> VulkanResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::builder();

        let semaphore = unsafe {
            device.create_semaphore(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, semaphore, stage_flags })
    }
}

impl Semaphore for VulkanSemaphore {
    fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }

    fn pipeline_stage_flags(&self) -> vk::PipelineStageFlags {
        self.stage_flags
    }
}

impl fmt::Debug for VulkanSemaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VulkanSemaphore")
            .field("semaphore", &self.semaphore)
            .field("stage_flags", &self.stage_flags)
            .finish()
    }
}

impl Drop for VulkanSemaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Fence wrapper with RAII cleanup
pub struct VulkanFence {
    device: Device,
    fence: vk::Fence,
}

impl VulkanFence {
    /// Create a new fence
    pub fn new(device: Device, signaled: bool) -> VulkanResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let create_info = vk::FenceCreateInfo::builder().flags(flags);

        let fence = unsafe {
            device.create_fence(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, fence })
    }
}

impl FencePrimitive for VulkanFence {
    fn handle(&self) -> vk::Fence {
        self.fence
    }

    fn wait(&self, timeout: u64) -> VulkanResult<()> {
        unsafe {
            self.device.wait_for_fences(&[self.fence], true, timeout)
                .map_err(VulkanError::Api)
        }
    }

    fn reset(&self) -> VulkanResult<()> {
        unsafe {
            self.device.reset_fences(&[self.fence])
                .map_err(VulkanError::Api)
        }
    }
}

impl fmt::Debug for VulkanFence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VulkanFence").field("fence", &self.fence).finish()
    }
}

impl Drop for VulkanFence {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_fence(self.fence, None);
        }
    }
}

/// Creates ash-backed fences and semaphores on one logical device
#[derive(Clone)]
pub struct VulkanSyncFactory {
    device: Device,
}

impl VulkanSyncFactory {
    /// Create a factory for `device`
    pub fn new(device: Device) -> Self {
        Self { device }
    }
}

impl SyncFactory for VulkanSyncFactory {
    fn create_fence(&self) -> VulkanResult<Box<dyn FencePrimitive>> {
        // Unsignaled: a fence with no dependencies is never waited on.
        Ok(Box::new(VulkanFence::new(self.device.clone(), false)?))
    }

    fn create_semaphore(&self, stage_flags: vk::PipelineStageFlags) -> VulkanResult<SemaphoreRef> {
        Ok(Arc::new(VulkanSemaphore::new(self.device.clone(), stage_flags)?))
    }
}
