//! Vulkan descriptor set and resource binding management
//!
//! Layout, pool and writer types for uniform-buffer descriptor sets. The
//! view-dependent light state is the main client: one set holding the light
//! and viewport buffers, bound once per view during recording.

use ash::{vk, Device};
use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Descriptor set layout builder for creating reusable layouts
#[derive(Debug, Clone, Default)]
pub struct DescriptorSetLayoutBuilder {
    bindings: Vec<vk::DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayoutBuilder {
    /// Create a new descriptor set layout builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a uniform buffer binding
    pub fn add_uniform_buffer(mut self, binding: u32, stage_flags: vk::ShaderStageFlags) -> Self {
        self.bindings.push(
            vk::DescriptorSetLayoutBinding::builder()
                .binding(binding)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .descriptor_count(1)
                .stage_flags(stage_flags)
                .build()
        );
        self
    }

    /// Bindings added so far
    pub fn bindings(&self) -> &[vk::DescriptorSetLayoutBinding] {
        &self.bindings
    }

    /// Build the descriptor set layout
    pub fn build(self, device: &Device) -> VulkanResult<DescriptorSetLayout> {
        let layout_info = vk::DescriptorSetLayoutCreateInfo::builder()
            .bindings(&self.bindings);

        let layout = unsafe { device.create_descriptor_set_layout(&layout_info, None) }
            .map_err(VulkanError::Api)?;

        Ok(DescriptorSetLayout {
            layout,
            device: device.clone(),
        })
    }
}

/// Descriptor set layout wrapper with automatic cleanup
pub struct DescriptorSetLayout {
    layout: vk::DescriptorSetLayout,
    device: Device,
}

impl DescriptorSetLayout {
    /// Get the Vulkan descriptor set layout handle
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

/// Descriptor pool for allocating uniform-buffer descriptor sets
pub struct DescriptorPool {
    pool: vk::DescriptorPool,
    device: Device,
}

impl DescriptorPool {
    /// Create a pool for `max_sets` sets of up to `buffers_per_set` uniform buffers each
    pub fn new(device: Device, max_sets: u32, buffers_per_set: u32) -> VulkanResult<Self> {
        let pool_sizes = [
            vk::DescriptorPoolSize::builder()
                .ty(vk::DescriptorType::UNIFORM_BUFFER)
                .descriptor_count(max_sets * buffers_per_set)
                .build(),
        ];

        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .max_sets(max_sets)
            .pool_sizes(&pool_sizes);

        let pool = unsafe { device.create_descriptor_pool(&pool_info, None) }
            .map_err(VulkanError::Api)?;

        Ok(Self { pool, device })
    }

    /// Allocate descriptor sets from this pool
    pub fn allocate_descriptor_sets(
        &self,
        layouts: &[vk::DescriptorSetLayout],
    ) -> VulkanResult<Vec<vk::DescriptorSet>> {
        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.pool)
            .set_layouts(layouts);

        unsafe { self.device.allocate_descriptor_sets(&alloc_info) }
            .map_err(VulkanError::Api)
    }

    /// Get the pool handle
    pub fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

/// Uniform buffer range written into a descriptor binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBinding {
    /// Destination binding in the set
    pub binding: u32,
    /// Source buffer
    pub buffer: vk::Buffer,
    /// Byte offset into `buffer`
    pub offset: vk::DeviceSize,
    /// Byte range, or `vk::WHOLE_SIZE`
    pub range: vk::DeviceSize,
}

/// Descriptor set writer for updating descriptor sets
#[derive(Debug, Clone, Default)]
pub struct DescriptorSetWriter {
    descriptor_set: vk::DescriptorSet,
    buffers: Vec<BufferBinding>,
}

impl DescriptorSetWriter {
    /// Create a writer targeting `descriptor_set`
    pub fn new(descriptor_set: vk::DescriptorSet) -> Self {
        Self {
            descriptor_set,
            buffers: Vec::new(),
        }
    }

    /// Write a uniform buffer to the descriptor set
    pub fn write_buffer(
        mut self,
        binding: u32,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        range: vk::DeviceSize,
    ) -> Self {
        self.buffers.push(BufferBinding { binding, buffer, offset, range });
        self
    }

    /// Pending buffer writes
    pub fn buffer_bindings(&self) -> &[BufferBinding] {
        &self.buffers
    }

    /// Execute all write operations
    pub fn update(self, device: &Device) {
        // Buffer infos must outlive the write structs that point at them.
        let buffer_infos: Vec<vk::DescriptorBufferInfo> = self.buffers
            .iter()
            .map(|b| {
                vk::DescriptorBufferInfo::builder()
                    .buffer(b.buffer)
                    .offset(b.offset)
                    .range(b.range)
                    .build()
            })
            .collect();

        let writes: Vec<vk::WriteDescriptorSet> = self.buffers
            .iter()
            .zip(&buffer_infos)
            .map(|(b, info)| {
                vk::WriteDescriptorSet::builder()
                    .dst_set(self.descriptor_set)
                    .dst_binding(b.binding)
                    .dst_array_element(0)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(std::slice::from_ref(info))
                    .build()
            })
            .collect();

        unsafe {
            device.update_descriptor_sets(&writes, &[]);
        }
    }
}
