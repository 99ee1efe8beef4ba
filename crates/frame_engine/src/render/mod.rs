//! # Rendering System
//!
//! Per-frame synchronization and command submission for a retained-mode
//! scene renderer, plus the view-dependent light state recorded into it.
//!
//! ## Architecture
//!
//! - **Frame**: [`FrameTask`] drives one queue through the
//!   start, early transfer, record, late transfer and finish phases
//! - **Vulkan Backend**: fences, semaphores, queues, command buffers and
//!   descriptor sets behind small traits so the frame protocol can be driven
//!   by real devices or test fakes
//! - **Systems**: [`ViewDependentState`] packs lights for shading
//!
//! A typical frame:
//!
//! ```rust,ignore
//! task.advance();
//! lights.lock().unwrap().clear();
//! // Each graph's `record` adds the lights its traversal finds and the last
//! // one calls `pack()`; the late transfer then uploads the packed records.
//! task.submit(&stamp)?;
//! ```

/// Graphics backend implementations
pub mod backends;

pub mod frame;
pub mod systems;

#[cfg(test)]
pub(crate) mod mocks;

pub use frame::{FrameOutcome, FrameStamp, FrameTask};
pub use systems::lighting::{BindViewDescriptorSets, Light, LightKind, ViewDependentState};
