//! Per-frame record and submit orchestration
//!
//! A [`FrameTask`] owns one fence per buffered frame and drives each frame
//! through a fixed protocol:
//!
//! ```text
//! start          wait for this slot's previous submission, release what it held
//! early transfer upload data the recorded draws will read
//! record         every command graph, in insertion order
//! late transfer  upload data produced while recording (packed lights)
//! finish         one queue submission guarded by the slot's fence
//! ```
//!
//! The start-of-frame fence wait is the only blocking point. It throttles the
//! host so it never runs more than `num_buffers` frames ahead of the device.
//!
//! ## Semaphore chaining
//! A transfer task that issued work this frame publishes a completion
//! semaphore; the submission waits on it and signals a per-task "consumer
//! completed" semaphore that the transfer task waits on before it reuses
//! its staging memory. A transfer task that issued nothing publishes no
//! semaphore and adds nothing to either list.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ash::vk;

use crate::config::FrameTaskConfig;
use crate::render::backends::vulkan::{
    Fence, Queue, RecordedCommandBuffers, SemaphoreRef, Submission, SyncFactory, VulkanError,
    VulkanResult,
};
use crate::render::frame::{CommandGraph, FrameStamp, FrameWindow, PagerRef, TransferTask};

/// What [`FrameTask::finish`] did with the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Work was handed to the queue
    Submitted,
    /// Nothing was recorded; the task slept briefly instead of submitting
    Idle,
}

/// Records and submits one queue's work each frame
pub struct FrameTask {
    current_frame_index: Option<usize>,
    indices: Vec<Option<usize>>,
    fences: Vec<Fence>,
    queue: Arc<dyn Queue>,

    early_transfer_task: Option<Box<dyn TransferTask>>,
    early_consumer_completed: SemaphoreRef,
    late_transfer_task: Option<Box<dyn TransferTask>>,
    late_consumer_completed: SemaphoreRef,

    command_graphs: Vec<Box<dyn CommandGraph>>,
    windows: Vec<Arc<dyn FrameWindow>>,
    wait_semaphores: Vec<SemaphoreRef>,
    signal_semaphores: Vec<SemaphoreRef>,
    database_pager: Option<PagerRef>,

    fence_timeout_ns: u64,
    idle_sleep: Duration,
}

impl FrameTask {
    /// Create a task with `config.num_buffers` fences, submitting to `queue`
    pub fn new(
        config: &FrameTaskConfig,
        factory: &dyn SyncFactory,
        queue: Arc<dyn Queue>,
    ) -> VulkanResult<Self> {
        config
            .validate()
            .map_err(|e| VulkanError::InvalidConfiguration(e.to_string()))?;

        let num_buffers = config.num_buffers;
        let fences = (0..num_buffers)
            .map(|_| factory.create_fence().map(Fence::new))
            .collect::<VulkanResult<Vec<_>>>()?;

        // The next transfer waits on these before overwriting staging memory.
        let early_consumer_completed = factory.create_semaphore(vk::PipelineStageFlags::TRANSFER)?;
        let late_consumer_completed = factory.create_semaphore(vk::PipelineStageFlags::TRANSFER)?;

        log::debug!("Created FrameTask with {} buffered frames", num_buffers);

        Ok(Self {
            current_frame_index: None,
            indices: vec![None; num_buffers],
            fences,
            queue,
            early_transfer_task: None,
            early_consumer_completed,
            late_transfer_task: None,
            late_consumer_completed,
            command_graphs: Vec::new(),
            windows: Vec::new(),
            wait_semaphores: Vec::new(),
            signal_semaphores: Vec::new(),
            database_pager: None,
            fence_timeout_ns: config.fence_timeout_ns,
            idle_sleep: Duration::from_millis(config.idle_sleep_ms),
        })
    }

    /// Attach the transfer task run before recording
    pub fn with_early_transfer_task(mut self, task: Box<dyn TransferTask>) -> Self {
        self.early_transfer_task = Some(task);
        self
    }

    /// Attach the transfer task run after recording
    pub fn with_late_transfer_task(mut self, task: Box<dyn TransferTask>) -> Self {
        self.late_transfer_task = Some(task);
        self
    }

    /// Number of buffered frames
    pub fn num_buffers(&self) -> usize {
        self.indices.len()
    }

    /// Move to the next frame slot
    ///
    /// The first call selects slot 0. Later calls step the slot forward
    /// (wrapping) and shift the history so `index(k)` is the slot used `k`
    /// frames ago.
    pub fn advance(&mut self) {
        let current = match self.current_frame_index {
            None => 0,
            Some(previous) => {
                self.indices.rotate_right(1);
                (previous + 1) % self.indices.len()
            }
        };
        self.current_frame_index = Some(current);
        self.indices[0] = Some(current);

        log::trace!("FrameTask advanced to slot {}", current);

        if let Some(task) = self.early_transfer_task.as_mut() {
            task.advance();
        }
        if let Some(task) = self.late_transfer_task.as_mut() {
            task.advance();
        }
    }

    /// Slot used `relative_frame_index` frames ago, or `None` if out of range or never assigned
    pub fn index(&self, relative_frame_index: usize) -> Option<usize> {
        self.indices.get(relative_frame_index).copied().flatten()
    }

    /// Fence of the frame `relative_frame_index` frames ago
    pub fn fence(&self, relative_frame_index: usize) -> Option<&Fence> {
        self.index(relative_frame_index).map(|slot| &self.fences[slot])
    }

    /// Fence of the current frame
    pub fn current_fence(&self) -> Option<&Fence> {
        self.fence(0)
    }

    fn current_slot(&self) -> VulkanResult<usize> {
        self.index(0).ok_or(VulkanError::NoCurrentFrame)
    }

    /// Run the whole frame protocol
    pub fn submit(&mut self, frame_stamp: &FrameStamp) -> VulkanResult<FrameOutcome> {
        self.start()?;

        if let Some(task) = self.early_transfer_task.as_mut() {
            task.transfer_dynamic_data()?;
        }

        let recorded = RecordedCommandBuffers::new();
        self.record(&recorded, frame_stamp)?;

        self.finish(&recorded)
    }

    /// Wait until the current slot's previous submission has completed
    ///
    /// A fence that holds no dependencies was never submitted (or has already
    /// been reclaimed) and is not waited on.
    pub fn start(&mut self) -> VulkanResult<()> {
        if let Some(task) = self.early_transfer_task.as_mut() {
            task.clear_current_transfer_completed();
        }
        if let Some(task) = self.late_transfer_task.as_mut() {
            task.clear_current_transfer_completed();
        }

        let slot = self.current_slot()?;
        let timeout = self.fence_timeout_ns;
        let fence = &mut self.fences[slot];
        if fence.has_dependencies() {
            log::debug!("Waiting on fence {:?} for frame slot {}", fence.handle(), slot);
            fence.wait(timeout)?;
            fence.reset_fence_and_dependencies()?;
        }
        Ok(())
    }

    /// Record every attached command graph into `recorded`
    pub fn record(&mut self, recorded: &RecordedCommandBuffers, frame_stamp: &FrameStamp) -> VulkanResult<()> {
        let pager = self.database_pager.as_ref();
        for graph in &mut self.command_graphs {
            graph.record(recorded, frame_stamp, pager)?;
        }
        Ok(())
    }

    /// Run the late transfer and submit everything recorded this frame
    pub fn finish(&mut self, recorded: &RecordedCommandBuffers) -> VulkanResult<FrameOutcome> {
        if let Some(task) = self.late_transfer_task.as_mut() {
            task.transfer_dynamic_data()?;
        }

        let buffers = recorded.buffers();
        if buffers.is_empty() {
            log::trace!("Nothing recorded, skipping submission");
            if !self.idle_sleep.is_zero() {
                thread::sleep(self.idle_sleep);
            }
            return Ok(FrameOutcome::Idle);
        }

        let slot = self.current_slot()?;

        let mut submission = Submission::default();
        submission.command_buffers = buffers
            .iter()
            .filter(|buffer| buffer.level() == vk::CommandBufferLevel::PRIMARY)
            .map(|buffer| buffer.handle())
            .collect();

        let early_consumer = transfer_completed(
            self.early_transfer_task.as_deref(),
            &self.early_consumer_completed,
            &mut submission,
        );
        let late_consumer = transfer_completed(
            self.late_transfer_task.as_deref(),
            &self.late_consumer_completed,
            &mut submission,
        );

        for window in &self.windows {
            if let Some(semaphore) = window.image_available_semaphore() {
                submission.add_wait(semaphore.handle(), semaphore.pipeline_stage_flags());
            }
        }

        for semaphore in &self.wait_semaphores {
            submission.add_wait(semaphore.handle(), semaphore.pipeline_stage_flags());
        }

        for semaphore in &self.signal_semaphores {
            submission.signal_semaphores.push(semaphore.handle());
        }

        log::trace!(
            "Submitting slot {}: {} command buffers ({} recorded), {} waits, {} signals",
            slot,
            submission.command_buffers.len(),
            buffers.len(),
            submission.wait_semaphores.len(),
            submission.signal_semaphores.len(),
        );

        self.queue.submit(&submission, &self.fences[slot])?;

        // Only a submission the queue accepted may hold objects or be waited on.
        let fence = &mut self.fences[slot];
        fence.dependent_command_buffers_mut().extend(buffers);
        *fence.dependent_semaphores_mut() = self.signal_semaphores.clone();

        if early_consumer {
            if let Some(task) = self.early_transfer_task.as_mut() {
                task.add_wait_semaphore(Arc::clone(&self.early_consumer_completed));
            }
        }
        if late_consumer {
            if let Some(task) = self.late_transfer_task.as_mut() {
                task.add_wait_semaphore(Arc::clone(&self.late_consumer_completed));
            }
        }

        Ok(FrameOutcome::Submitted)
    }

    /// Append a command graph; graphs record in the order they were added
    pub fn add_command_graph(&mut self, graph: Box<dyn CommandGraph>) {
        self.command_graphs.push(graph);
    }

    /// Attached command graphs
    pub fn command_graphs(&self) -> &[Box<dyn CommandGraph>] {
        &self.command_graphs
    }

    /// Mutable access to the attached command graphs
    pub fn command_graphs_mut(&mut self) -> &mut [Box<dyn CommandGraph>] {
        &mut self.command_graphs
    }

    /// Wait on `window`'s image-available semaphore in every submission
    pub fn add_window(&mut self, window: Arc<dyn FrameWindow>) {
        self.windows.push(window);
    }

    /// Wait on an application-supplied semaphore in every submission
    pub fn add_wait_semaphore(&mut self, semaphore: SemaphoreRef) {
        self.wait_semaphores.push(semaphore);
    }

    /// Signal an application-supplied semaphore from every submission
    pub fn add_signal_semaphore(&mut self, semaphore: SemaphoreRef) {
        self.signal_semaphores.push(semaphore);
    }

    /// Paging helper passed to command graphs while recording
    pub fn database_pager(&self) -> Option<&PagerRef> {
        self.database_pager.as_ref()
    }

    /// Set the paging helper
    pub fn set_database_pager(&mut self, pager: PagerRef) {
        self.database_pager = Some(pager);
    }

    /// Transfer task run before recording
    pub fn early_transfer_task_mut(&mut self) -> Option<&mut (dyn TransferTask + 'static)> {
        self.early_transfer_task.as_deref_mut()
    }

    /// Transfer task run after recording
    pub fn late_transfer_task_mut(&mut self) -> Option<&mut (dyn TransferTask + 'static)> {
        self.late_transfer_task.as_deref_mut()
    }
}

/// Add a transfer task's completion semaphore to the wait list and its
/// consumer semaphore to the signal list; returns whether it did
fn transfer_completed(
    task: Option<&dyn TransferTask>,
    consumer_completed: &SemaphoreRef,
    submission: &mut Submission,
) -> bool {
    match task.and_then(|task| task.current_transfer_completed()) {
        Some(completed) => {
            submission.add_wait(completed.handle(), completed.pipeline_stage_flags());
            submission.signal_semaphores.push(consumer_completed.handle());
            true
        }
        None => false,
    }
}
