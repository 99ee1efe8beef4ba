// Vulkan rendering components

pub mod commands;

pub use commands::*;
