//! Vulkan error types
//!
//! Device-reported status codes are carried unchanged in `VulkanError::Api`;
//! callers decide whether a frame is retried or the device is torn down.

use ash::vk;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Vulkan object creation failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// A device object was used before it was compiled
    #[error("{0} has not been compiled")]
    NotCompiled(&'static str),

    /// Construction parameters that cannot produce a working object
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A frame phase ran before the frame task was first advanced
    #[error("no current frame: advance() has not been called")]
    NoCurrentFrame,
}

impl VulkanError {
    /// Whether the error reports a lost device, which no frame retry can recover from
    pub fn is_device_lost(&self) -> bool {
        matches!(self, Self::Api(vk::Result::ERROR_DEVICE_LOST))
    }

    /// Whether the error is a fence wait that ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Api(vk::Result::TIMEOUT))
    }
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;
