//! Per-frame submission
//!
//! A [`FrameTask`] owns the buffered per-frame synchronization state and
//! turns one frame's recorded command graphs and data uploads into a single
//! correctly ordered queue submission.

pub mod frame_task;
pub mod graph;
pub mod stamp;
pub mod transfer;
pub mod update;
pub mod window;

pub use frame_task::{FrameOutcome, FrameTask};
pub use graph::{CommandGraph, DatabasePager, PagerRef};
pub use stamp::FrameStamp;
pub use transfer::{BufferRegion, DynamicData, TransferTask};
pub use update::{update_tasks, Bin, BinDetails, CompileResult, PagerRegistry, SortOrder, View, ViewRef};
pub use window::FrameWindow;
