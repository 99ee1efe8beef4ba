//! Recording fakes for the opaque device seams, shared by unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ash::vk::{self, Handle};

use crate::render::backends::vulkan::{
    CommandBuffer, CommandBufferRef, DescriptorBinder, Fence, FencePrimitive, Queue,
    RecordedCommandBuffers, Semaphore, SemaphoreRef, Submission, SyncFactory, VulkanError,
    VulkanResult,
};
use crate::render::frame::{
    CommandGraph, DatabasePager, DynamicData, FrameStamp, FrameWindow, PagerRef, TransferTask,
};

/// Ordered log of calls made across several fakes
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn push(log: &Option<EventLog>, event: String) {
    if let Some(log) = log {
        log.lock().unwrap().push(event);
    }
}

#[derive(Debug)]
pub struct MockSemaphore {
    id: u64,
    stage: vk::PipelineStageFlags,
}

impl MockSemaphore {
    pub fn new(id: u64) -> SemaphoreRef {
        Self::with_stage(id, vk::PipelineStageFlags::ALL_COMMANDS)
    }

    pub fn with_stage(id: u64, stage: vk::PipelineStageFlags) -> SemaphoreRef {
        Arc::new(Self { id, stage })
    }

    pub fn raw(id: u64) -> vk::Semaphore {
        vk::Semaphore::from_raw(id)
    }
}

impl Semaphore for MockSemaphore {
    fn handle(&self) -> vk::Semaphore {
        Self::raw(self.id)
    }

    fn pipeline_stage_flags(&self) -> vk::PipelineStageFlags {
        self.stage
    }
}

#[derive(Debug)]
pub struct MockCommandBuffer {
    id: u64,
    level: vk::CommandBufferLevel,
}

impl MockCommandBuffer {
    pub fn primary(id: u64) -> CommandBufferRef {
        Arc::new(Self { id, level: vk::CommandBufferLevel::PRIMARY })
    }

    pub fn secondary(id: u64) -> CommandBufferRef {
        Arc::new(Self { id, level: vk::CommandBufferLevel::SECONDARY })
    }

    pub fn raw(id: u64) -> vk::CommandBuffer {
        vk::CommandBuffer::from_raw(id)
    }
}

impl CommandBuffer for MockCommandBuffer {
    fn handle(&self) -> vk::CommandBuffer {
        Self::raw(self.id)
    }

    fn level(&self) -> vk::CommandBufferLevel {
        self.level
    }
}

/// Observable state of a [`MockFence`]
#[derive(Debug, Default)]
pub struct FenceState {
    waits: AtomicUsize,
    resets: AtomicUsize,
    last_timeout: Mutex<Option<u64>>,
    fail_wait: Mutex<Option<vk::Result>>,
    fail_reset: Mutex<Option<vk::Result>>,
}

pub type FenceLog = Arc<FenceState>;

impl FenceState {
    pub fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn last_timeout(&self) -> Option<u64> {
        *self.last_timeout.lock().unwrap()
    }

    pub fn fail_wait_with(&self, result: vk::Result) {
        *self.fail_wait.lock().unwrap() = Some(result);
    }

    pub fn fail_reset_with(&self, result: vk::Result) {
        *self.fail_reset.lock().unwrap() = Some(result);
    }
}

#[derive(Debug)]
pub struct MockFence {
    id: u64,
    state: FenceLog,
}

impl MockFence {
    pub fn new(id: u64) -> (Self, FenceLog) {
        let state = FenceLog::default();
        (Self { id, state: state.clone() }, state)
    }

    pub fn raw(id: u64) -> vk::Fence {
        vk::Fence::from_raw(id)
    }
}

impl FencePrimitive for MockFence {
    fn handle(&self) -> vk::Fence {
        Self::raw(self.id)
    }

    fn wait(&self, timeout: u64) -> VulkanResult<()> {
        self.state.waits.fetch_add(1, Ordering::SeqCst);
        *self.state.last_timeout.lock().unwrap() = Some(timeout);
        match *self.state.fail_wait.lock().unwrap() {
            Some(result) => Err(VulkanError::Api(result)),
            None => Ok(()),
        }
    }

    fn reset(&self) -> VulkanResult<()> {
        if let Some(result) = *self.state.fail_reset.lock().unwrap() {
            return Err(VulkanError::Api(result));
        }
        self.state.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out mock fences with ids 1.. and semaphores with ids 1000..
#[derive(Debug, Default)]
pub struct MockSyncFactory {
    fences: Mutex<Vec<FenceLog>>,
    semaphores: AtomicUsize,
}

impl MockSyncFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fence_log(&self, slot: usize) -> FenceLog {
        self.fences.lock().unwrap()[slot].clone()
    }

    pub fn fence_count(&self) -> usize {
        self.fences.lock().unwrap().len()
    }

    pub fn semaphore_count(&self) -> usize {
        self.semaphores.load(Ordering::SeqCst)
    }
}

impl SyncFactory for MockSyncFactory {
    fn create_fence(&self) -> VulkanResult<Box<dyn FencePrimitive>> {
        let mut fences = self.fences.lock().unwrap();
        let (fence, log) = MockFence::new(fences.len() as u64 + 1);
        fences.push(log);
        Ok(Box::new(fence))
    }

    fn create_semaphore(&self, stage_flags: vk::PipelineStageFlags) -> VulkanResult<SemaphoreRef> {
        let id = 1000 + self.semaphores.fetch_add(1, Ordering::SeqCst) as u64;
        Ok(MockSemaphore::with_stage(id, stage_flags))
    }
}

#[derive(Default)]
pub struct MockQueue {
    submissions: Mutex<Vec<(Submission, vk::Fence)>>,
    fail_with: Mutex<Option<vk::Result>>,
    events: Option<EventLog>,
}

impl MockQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_events(events: &EventLog) -> Arc<Self> {
        Arc::new(Self { events: Some(events.clone()), ..Self::default() })
    }

    pub fn submissions(&self) -> Vec<(Submission, vk::Fence)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn fail_with(&self, result: vk::Result) {
        *self.fail_with.lock().unwrap() = Some(result);
    }
}

impl Queue for MockQueue {
    fn submit(&self, submission: &Submission, fence: &Fence) -> VulkanResult<()> {
        push(&self.events, "queue.submit".to_string());
        if let Some(result) = *self.fail_with.lock().unwrap() {
            return Err(VulkanError::Api(result));
        }
        self.submissions.lock().unwrap().push((submission.clone(), fence.handle()));
        Ok(())
    }
}

/// Observable state of a [`MockTransferTask`]
#[derive(Default)]
pub struct TransferState {
    pub advances: usize,
    pub transfers: usize,
    pub clears: usize,
    pub assigned: Vec<DynamicData>,
    pub wait_semaphores: Vec<SemaphoreRef>,
    pub completed: Option<SemaphoreRef>,
    /// Semaphore published as `completed` by each transfer, `None` for a no-op transfer
    pub produces: Option<SemaphoreRef>,
    pub fail_with: Option<vk::Result>,
}

pub type TransferLog = Arc<Mutex<TransferState>>;

pub struct MockTransferTask {
    name: &'static str,
    state: TransferLog,
    events: Option<EventLog>,
}

impl MockTransferTask {
    pub fn new(name: &'static str, produces: Option<SemaphoreRef>) -> (Box<dyn TransferTask>, TransferLog) {
        Self::build(name, produces, None)
    }

    pub fn with_events(
        name: &'static str,
        produces: Option<SemaphoreRef>,
        events: &EventLog,
    ) -> (Box<dyn TransferTask>, TransferLog) {
        Self::build(name, produces, Some(events.clone()))
    }

    fn build(
        name: &'static str,
        produces: Option<SemaphoreRef>,
        events: Option<EventLog>,
    ) -> (Box<dyn TransferTask>, TransferLog) {
        let state = Arc::new(Mutex::new(TransferState { produces, ..TransferState::default() }));
        (Box::new(Self { name, state: state.clone(), events }), state)
    }
}

impl TransferTask for MockTransferTask {
    fn advance(&mut self) {
        self.state.lock().unwrap().advances += 1;
    }

    fn transfer_dynamic_data(&mut self) -> VulkanResult<()> {
        push(&self.events, format!("{}.transfer", self.name));
        let mut state = self.state.lock().unwrap();
        if let Some(result) = state.fail_with {
            return Err(VulkanError::Api(result));
        }
        state.transfers += 1;
        state.completed = state.produces.clone();
        Ok(())
    }

    fn current_transfer_completed(&self) -> Option<SemaphoreRef> {
        self.state.lock().unwrap().completed.clone()
    }

    fn clear_current_transfer_completed(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.clears += 1;
        state.completed = None;
    }

    fn add_wait_semaphore(&mut self, semaphore: SemaphoreRef) {
        self.state.lock().unwrap().wait_semaphores.push(semaphore);
    }

    fn assign(&mut self, data: &DynamicData) {
        self.state.lock().unwrap().assigned.push(data.clone());
    }
}

/// Observable state of a [`MockCommandGraph`]
#[derive(Default)]
pub struct GraphState {
    pub records: usize,
    pub last_frame_count: Option<u64>,
    pub saw_pager: bool,
    pub max_slot: u32,
    pub fail_with: Option<vk::Result>,
}

pub type GraphLog = Arc<Mutex<GraphState>>;

pub struct MockCommandGraph {
    name: &'static str,
    buffers: Vec<CommandBufferRef>,
    state: GraphLog,
    events: Option<EventLog>,
}

impl MockCommandGraph {
    pub fn new(name: &'static str, buffers: Vec<CommandBufferRef>) -> (Box<dyn CommandGraph>, GraphLog) {
        Self::build(name, buffers, None)
    }

    pub fn with_events(
        name: &'static str,
        buffers: Vec<CommandBufferRef>,
        events: &EventLog,
    ) -> (Box<dyn CommandGraph>, GraphLog) {
        Self::build(name, buffers, Some(events.clone()))
    }

    fn build(
        name: &'static str,
        buffers: Vec<CommandBufferRef>,
        events: Option<EventLog>,
    ) -> (Box<dyn CommandGraph>, GraphLog) {
        let state = GraphLog::default();
        (Box::new(Self { name, buffers, state: state.clone(), events }), state)
    }
}

impl CommandGraph for MockCommandGraph {
    fn record(
        &mut self,
        recorded: &RecordedCommandBuffers,
        frame_stamp: &FrameStamp,
        pager: Option<&PagerRef>,
    ) -> VulkanResult<()> {
        push(&self.events, format!("{}.record", self.name));
        let mut state = self.state.lock().unwrap();
        if let Some(result) = state.fail_with {
            return Err(VulkanError::Api(result));
        }
        state.records += 1;
        state.last_frame_count = Some(frame_stamp.frame_count);
        state.saw_pager = pager.is_some();
        for buffer in &self.buffers {
            recorded.add(buffer.clone());
        }
        Ok(())
    }

    fn max_slot(&self) -> u32 {
        self.state.lock().unwrap().max_slot
    }

    fn set_max_slot(&mut self, max_slot: u32) {
        self.state.lock().unwrap().max_slot = max_slot;
    }
}

pub struct MockWindow {
    pub image_available: Option<SemaphoreRef>,
}

impl FrameWindow for MockWindow {
    fn image_available_semaphore(&self) -> Option<SemaphoreRef> {
        self.image_available.clone()
    }
}

#[derive(Debug, Default)]
pub struct MockPager {
    starts: AtomicUsize,
}

impl MockPager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl DatabasePager for MockPager {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }
}

/// One recorded `bind_descriptor_sets` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindCall {
    pub bind_point: vk::PipelineBindPoint,
    pub layout: vk::PipelineLayout,
    pub first_set: u32,
    pub sets: Vec<vk::DescriptorSet>,
}

#[derive(Debug, Default)]
pub struct MockBinder {
    pub calls: Vec<BindCall>,
}

impl DescriptorBinder for MockBinder {
    fn bind_descriptor_sets(
        &mut self,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    ) -> VulkanResult<()> {
        self.calls.push(BindCall { bind_point, layout, first_set, sets: sets.to_vec() });
        Ok(())
    }
}
