//! View-dependent light state
//!
//! Collects the lights found while traversing a view, each paired with the
//! model-view matrix active where it was found, and packs them into a flat
//! array of four-component records for a uniform buffer:
//!
//! ```text
//! [0]            (ambient count, directional count, point count, spot count)
//! ambient        (r, g, b, intensity)
//! directional    (r, g, b, intensity) (eye direction, 0)
//! point          (r, g, b, intensity) (eye position, 0)
//! spot           (r, g, b, intensity) (eye position, cos inner) (eye direction, cos outer)
//! ```
//!
//! The state is cleared and repopulated every frame, packed once after
//! recording, and uploaded by the late transfer.

use ash::{vk, Device};

use crate::config::LightingConfig;
use crate::foundation::math::{self, DMat4, DVec3, Vec3};
use crate::render::backends::vulkan::{
    DescriptorBinder, DescriptorPool, DescriptorSetLayout, DescriptorSetLayoutBuilder,
    DescriptorSetWriter, VulkanError, VulkanResult,
};
use crate::render::systems::lighting::{
    AmbientLight, DirectionalLight, Light, LightKind, PointLight, SpotLight,
};

/// Binding of the light data buffer in the view descriptor set
pub const LIGHT_DATA_BINDING: u32 = 0;
/// Binding of the viewport data buffer in the view descriptor set
pub const VIEWPORT_DATA_BINDING: u32 = 1;

const RECORD_SIZE: vk::DeviceSize = std::mem::size_of::<[f32; 4]>() as vk::DeviceSize;

fn shader_stages() -> vk::ShaderStageFlags {
    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT
}

struct CompiledDescriptors {
    // Keeps the layout alive as long as the set allocated from it.
    layout: DescriptorSetLayout,
    set: vk::DescriptorSet,
}

/// Per-view light and viewport uniform data
pub struct ViewDependentState {
    light_data: Vec<[f32; 4]>,
    viewport_data: Vec<[f32; 4]>,
    packed_records: usize,
    packed_counts: [usize; 4],
    dirty: bool,

    ambient_lights: Vec<AmbientLight>,
    directional_lights: Vec<(DMat4, DirectionalLight)>,
    point_lights: Vec<(DMat4, PointLight)>,
    spot_lights: Vec<(DMat4, SpotLight)>,

    compiled: Option<CompiledDescriptors>,
}

impl ViewDependentState {
    /// Create a state holding up to `max_number_lights` light records and `max_viewports` viewports
    ///
    /// The light array always has room for at least the counts record, and
    /// the viewport array for at least one viewport.
    pub fn new(max_number_lights: usize, max_viewports: usize) -> Self {
        log::info!(
            "Creating view dependent state: {} light records, {} viewports",
            max_number_lights,
            max_viewports
        );

        Self {
            light_data: vec![[0.0; 4]; max_number_lights.max(1)],
            viewport_data: vec![[0.0; 4]; max_viewports.max(1)],
            packed_records: 0,
            packed_counts: [0; 4],
            dirty: false,
            ambient_lights: Vec::new(),
            directional_lights: Vec::new(),
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
            compiled: None,
        }
    }

    /// Create a state sized by `config`
    pub fn from_config(config: &LightingConfig) -> Self {
        Self::new(config.max_number_lights, config.max_viewports)
    }

    /// Forget all collected lights; buffer contents are left as they are
    pub fn clear(&mut self) {
        self.ambient_lights.clear();
        self.directional_lights.clear();
        self.point_lights.clear();
        self.spot_lights.clear();
    }

    /// Collect an ambient light
    pub fn add_ambient_light(&mut self, light: AmbientLight) {
        self.ambient_lights.push(light);
    }

    /// Collect a directional light found under `model_view`
    pub fn add_directional_light(&mut self, model_view: &DMat4, light: DirectionalLight) {
        self.directional_lights.push((*model_view, light));
    }

    /// Collect a point light found under `model_view`
    pub fn add_point_light(&mut self, model_view: &DMat4, light: PointLight) {
        self.point_lights.push((*model_view, light));
    }

    /// Collect a spot light found under `model_view`
    pub fn add_spot_light(&mut self, model_view: &DMat4, light: SpotLight) {
        self.spot_lights.push((*model_view, light));
    }

    /// Collect any light; `model_view` is ignored for ambient lights
    pub fn add_light(&mut self, light: Light, model_view: &DMat4) {
        match light {
            Light::Ambient(l) => self.add_ambient_light(l),
            Light::Directional(l) => self.add_directional_light(model_view, l),
            Light::Point(l) => self.add_point_light(model_view, l),
            Light::Spot(l) => self.add_spot_light(model_view, l),
        }
    }

    /// Number of collected lights of `kind`
    pub fn light_count(&self, kind: LightKind) -> usize {
        match kind {
            LightKind::Ambient => self.ambient_lights.len(),
            LightKind::Directional => self.directional_lights.len(),
            LightKind::Point => self.point_lights.len(),
            LightKind::Spot => self.spot_lights.len(),
        }
    }

    /// Number of lights of `kind` written by the last pack
    pub fn packed_light_count(&self, kind: LightKind) -> usize {
        self.packed_counts[kind_index(kind)]
    }

    /// Records written by the last pack, counts record included
    pub fn packed_record_count(&self) -> usize {
        self.packed_records
    }

    /// Pack the collected lights into the light data array
    ///
    /// Only the records in use are written. If the lights do not all fit,
    /// packing stops at the last light that does and the counts record
    /// reflects the lights actually packed.
    pub fn pack(&mut self) {
        let counts = self.fitting_counts();
        let [ambient, directional, point, spot] = counts;

        let mut records: Vec<[f32; 4]> = Vec::with_capacity(self.light_data.len());
        records.push([ambient as f32, directional as f32, point as f32, spot as f32]);

        for light in &self.ambient_lights[..ambient] {
            records.push(color_record(&light.color, light.intensity));
        }

        for (model_view, light) in &self.directional_lights[..directional] {
            let eye_direction = eye_direction(model_view, &light.direction);
            records.push(color_record(&light.color, light.intensity));
            records.push(math::to_record(&eye_direction, 0.0));
        }

        for (model_view, light) in &self.point_lights[..point] {
            let eye_position = math::transform_position(model_view, &light.position);
            records.push(color_record(&light.color, light.intensity));
            records.push(math::to_record(&eye_position, 0.0));
        }

        for (model_view, light) in &self.spot_lights[..spot] {
            let eye_position = math::transform_position(model_view, &light.position);
            let eye_direction = eye_direction(model_view, &light.direction);
            let cos_inner = light.inner_angle.cos() as f32;
            let cos_outer = light.outer_angle.cos() as f32;
            records.push(color_record(&light.color, light.intensity));
            records.push(math::to_record(&eye_position, cos_inner));
            records.push(math::to_record(&eye_direction, cos_outer));
        }

        self.light_data[..records.len()].copy_from_slice(&records);
        self.packed_records = records.len();
        self.packed_counts = counts;
        self.dirty = true;
    }

    /// How many lights of each kind fit, in packing order
    fn fitting_counts(&self) -> [usize; 4] {
        let available = [
            self.ambient_lights.len(),
            self.directional_lights.len(),
            self.point_lights.len(),
            self.spot_lights.len(),
        ];
        let kinds = [LightKind::Ambient, LightKind::Directional, LightKind::Point, LightKind::Spot];

        let mut remaining = self.light_data.len() - 1;
        let mut counts = [0; 4];
        for (i, kind) in kinds.iter().enumerate() {
            let size = kind.record_count();
            let fit = available[i].min(remaining / size);
            counts[i] = fit;
            remaining -= fit * size;

            if fit < available[i] {
                let dropped: usize = available[i] - fit + available[i + 1..].iter().sum::<usize>();
                log::warn!(
                    "Light data capacity of {} records exceeded, {} lights from the first {} light on are not packed",
                    self.light_data.len(),
                    dropped,
                    kind
                );
                break;
            }
        }
        counts
    }

    /// Store viewports as `(x, y, width, height)` records
    pub fn set_viewports(&mut self, viewports: &[vk::Viewport]) {
        if viewports.len() > self.viewport_data.len() {
            log::warn!(
                "{} viewports supplied, only {} fit in the viewport data",
                viewports.len(),
                self.viewport_data.len()
            );
        }

        for (record, viewport) in self.viewport_data.iter_mut().zip(viewports) {
            *record = [viewport.x, viewport.y, viewport.width, viewport.height];
        }
        self.dirty = true;
    }

    /// Light data array, full capacity
    pub fn light_data(&self) -> &[[f32; 4]] {
        &self.light_data
    }

    /// Viewport data array, full capacity
    pub fn viewport_data(&self) -> &[[f32; 4]] {
        &self.viewport_data
    }

    /// Light data as bytes for upload
    pub fn light_data_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.light_data)
    }

    /// Viewport data as bytes for upload
    pub fn viewport_data_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.viewport_data)
    }

    /// Whether data changed since the last call, resetting the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Layout bindings of the view descriptor set
    pub fn descriptor_set_layout_bindings() -> Vec<vk::DescriptorSetLayoutBinding> {
        Self::layout_builder().bindings().to_vec()
    }

    fn layout_builder() -> DescriptorSetLayoutBuilder {
        DescriptorSetLayoutBuilder::new()
            .add_uniform_buffer(LIGHT_DATA_BINDING, shader_stages())
            .add_uniform_buffer(VIEWPORT_DATA_BINDING, shader_stages())
    }

    /// Create the descriptor set layout and a set pointing at the two buffers
    ///
    /// The buffers must be at least as large as the corresponding data arrays.
    /// Compiling an already compiled state does nothing.
    pub fn compile(
        &mut self,
        device: &Device,
        pool: &DescriptorPool,
        light_buffer: vk::Buffer,
        viewport_buffer: vk::Buffer,
    ) -> VulkanResult<()> {
        if self.compiled.is_some() {
            return Ok(());
        }

        log::info!("Compiling view dependent state");

        let layout = Self::layout_builder().build(device)?;
        let set = pool
            .allocate_descriptor_sets(&[layout.handle()])?
            .into_iter()
            .next()
            .ok_or_else(|| VulkanError::InitializationFailed("no view descriptor set allocated".to_string()))?;

        DescriptorSetWriter::new(set)
            .write_buffer(LIGHT_DATA_BINDING, light_buffer, 0, self.light_data_range())
            .write_buffer(VIEWPORT_DATA_BINDING, viewport_buffer, 0, self.viewport_data_range())
            .update(device);

        self.compiled = Some(CompiledDescriptors { layout, set });
        Ok(())
    }

    /// Whether `compile` has succeeded
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Descriptor set layout, once compiled
    pub fn descriptor_set_layout(&self) -> Option<vk::DescriptorSetLayout> {
        self.compiled.as_ref().map(|c| c.layout.handle())
    }

    /// Byte size of the light data
    pub fn light_data_range(&self) -> vk::DeviceSize {
        self.light_data.len() as vk::DeviceSize * RECORD_SIZE
    }

    /// Byte size of the viewport data
    pub fn viewport_data_range(&self) -> vk::DeviceSize {
        self.viewport_data.len() as vk::DeviceSize * RECORD_SIZE
    }

    /// Bind the view descriptor set
    pub fn bind_descriptor_sets(
        &self,
        binder: &mut dyn DescriptorBinder,
        pipeline_bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
    ) -> VulkanResult<()> {
        let compiled = self
            .compiled
            .as_ref()
            .ok_or(VulkanError::NotCompiled("ViewDependentState"))?;
        binder.bind_descriptor_sets(pipeline_bind_point, layout, first_set, &[compiled.set])
    }

    /// Log the eye-space geometry of every collected light
    pub fn log_lights(&self) {
        log::debug!(
            "View dependent lights: {} ambient, {} directional, {} point, {} spot",
            self.ambient_lights.len(),
            self.directional_lights.len(),
            self.point_lights.len(),
            self.spot_lights.len()
        );

        for (model_view, light) in &self.directional_lights {
            let direction = eye_direction(model_view, &light.direction);
            log::debug!("   directional light: direction = {:?}", direction.as_slice());
        }

        for (model_view, light) in &self.point_lights {
            let position = math::transform_position(model_view, &light.position);
            log::debug!("   point light: position = {:?}", position.as_slice());
        }

        for (model_view, light) in &self.spot_lights {
            let position = math::transform_position(model_view, &light.position);
            let direction = eye_direction(model_view, &light.direction);
            log::debug!(
                "   spot light: position = {:?}, direction = {:?}",
                position.as_slice(),
                direction.as_slice()
            );
        }
    }
}

impl std::fmt::Debug for ViewDependentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewDependentState")
            .field("light_capacity", &self.light_data.len())
            .field("viewport_capacity", &self.viewport_data.len())
            .field("packed_records", &self.packed_records)
            .field("compiled", &self.compiled.is_some())
            .finish()
    }
}

fn color_record(color: &Vec3, intensity: f32) -> [f32; 4] {
    [color.x, color.y, color.z, intensity]
}

fn kind_index(kind: LightKind) -> usize {
    match kind {
        LightKind::Ambient => 0,
        LightKind::Directional => 1,
        LightKind::Point => 2,
        LightKind::Spot => 3,
    }
}

fn eye_direction(model_view: &DMat4, direction: &DVec3) -> DVec3 {
    math::transform_direction(model_view, direction).unwrap_or_else(|| {
        log::warn!("Singular model-view matrix, light direction left untransformed");
        direction.normalize()
    })
}

/// State command binding the view descriptor set while recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindViewDescriptorSets {
    /// Bind point, graphics by default
    pub pipeline_bind_point: vk::PipelineBindPoint,
    /// Pipeline layout the set is bound against
    pub layout: vk::PipelineLayout,
    /// Set index, 0 by default
    pub first_set: u32,
}

impl BindViewDescriptorSets {
    /// State slot the command occupies
    pub const SLOT: u32 = 2;

    /// Bind at set 0 of the graphics bind point
    pub fn new(layout: vk::PipelineLayout) -> Self {
        Self {
            pipeline_bind_point: vk::PipelineBindPoint::GRAPHICS,
            layout,
            first_set: 0,
        }
    }

    /// Bind at `first_set` instead
    pub fn with_first_set(mut self, first_set: u32) -> Self {
        self.first_set = first_set;
        self
    }

    /// Record the bind for `state`
    pub fn record(&self, binder: &mut dyn DescriptorBinder, state: &ViewDependentState) -> VulkanResult<()> {
        state.bind_descriptor_sets(binder, self.pipeline_bind_point, self.layout, self.first_set)
    }
}
