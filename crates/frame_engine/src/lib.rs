//! # Frame Engine
//!
//! The per-frame record and submit pipeline of a Vulkan scene renderer.
//!
//! ## Features
//!
//! - **Buffered frames**: a ring of fences throttles the host to at most
//!   `num_buffers` frames ahead of the device
//! - **Ordered submission**: early and late data uploads are chained into
//!   each frame's queue submission with semaphores
//! - **Idle frames**: frames that recorded nothing are skipped, not submitted
//! - **Light packing**: ambient, directional, point and spot lights are packed
//!   into eye-space uniform records once per frame
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use frame_engine::prelude::*;
//!
//! let config = RendererConfig::load_from_file("renderer.toml")?;
//! let mut task = FrameTask::new(&config.frame_task, &sync_factory, queue)?;
//! task.add_command_graph(graph);
//!
//! let mut stamp = FrameStamp::new(Instant::now());
//! loop {
//!     task.advance();
//!     task.submit(&stamp)?;
//!     stamp = stamp.next(Instant::now());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, FrameTaskConfig, LightingConfig, RendererConfig},
        foundation::math::{DMat4, DVec3, Mat4, Vec3},
        render::backends::vulkan::{
            Fence, RecordedCommandBuffers, Queue, SemaphoreRef, SyncFactory, VulkanError, VulkanResult,
        },
        render::frame::{
            update_tasks, CommandGraph, CompileResult, DatabasePager, DynamicData, FrameOutcome,
            FrameStamp, FrameTask, FrameWindow, PagerRegistry, TransferTask,
        },
        render::systems::lighting::{
            BindViewDescriptorSets, Light, LightKind, ViewDependentState,
        },
    };
}
