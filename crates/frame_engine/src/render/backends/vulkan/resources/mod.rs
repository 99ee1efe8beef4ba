//! Vulkan resource management
//! 
//! Contains descriptor layouts, pools and writers for uniform-buffer bindings.

/// Descriptor set management
pub mod descriptor_set;

pub use descriptor_set::{
    BufferBinding, DescriptorPool, DescriptorSetLayout, DescriptorSetLayoutBuilder, DescriptorSetWriter,
};
