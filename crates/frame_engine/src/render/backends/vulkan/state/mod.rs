// Vulkan state management

pub mod queue;
pub mod sync;

pub use queue::*;
pub use sync::*;
