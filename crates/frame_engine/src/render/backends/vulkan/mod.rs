//! Vulkan backend implementation
//! 
//! Organized into resources, rendering and state modules.

/// Vulkan error types
pub mod error;

/// Vulkan resource management (descriptors)
pub mod resources;

/// Vulkan rendering operations (command buffers, binding commands)
pub mod rendering;

/// Vulkan state management (synchronization, queues)
pub mod state;

pub use error::{VulkanError, VulkanResult};

// Re-export resource types
pub use resources::descriptor_set::{
    BufferBinding, DescriptorPool, DescriptorSetLayout, DescriptorSetLayoutBuilder, DescriptorSetWriter,
};

// Re-export rendering types
pub use rendering::commands::{
    CommandBuffer, CommandBufferRef, DescriptorBinder, RecordedCommandBuffers, VulkanCommandBuffer,
    VulkanCommandEncoder,
};

// Re-export state types
pub use state::queue::{Queue, Submission, VulkanQueue};
pub use state::sync::{
    Fence, FencePrimitive, Semaphore, SemaphoreRef, SyncFactory, VulkanFence, VulkanSemaphore,
    VulkanSyncFactory,
};
