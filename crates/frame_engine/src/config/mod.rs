//! Configuration system
//!
//! Renderer settings for the frame task and the view-dependent light state,
//! loadable from TOML or RON files.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;
        
        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, choosing the format from the path extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }
    
    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot drive a renderer
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Frame task settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTaskConfig {
    /// Number of buffered frames, one fence per frame
    pub num_buffers: usize,
    /// Timeout for the start-of-frame fence wait, in nanoseconds
    pub fence_timeout_ns: u64,
    /// How long an idle frame (nothing recorded) yields the CPU, in milliseconds
    pub idle_sleep_ms: u64,
}

impl FrameTaskConfig {
    /// Create a config with the given number of buffered frames
    pub fn new(num_buffers: usize) -> Self {
        Self {
            num_buffers,
            ..Self::default()
        }
    }

    /// Set the fence wait timeout
    pub fn with_fence_timeout_ns(mut self, timeout: u64) -> Self {
        self.fence_timeout_ns = timeout;
        self
    }

    /// Set the idle frame sleep
    pub fn with_idle_sleep_ms(mut self, millis: u64) -> Self {
        self.idle_sleep_ms = millis;
        self
    }

    /// Reject settings the frame task cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_buffers == 0 {
            return Err(ConfigError::Invalid("num_buffers must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for FrameTaskConfig {
    fn default() -> Self {
        Self {
            num_buffers: 3,
            fence_timeout_ns: u64::MAX,
            idle_sleep_ms: 16,
        }
    }
}

/// View-dependent light state capacities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Capacity of the light data array, in four-component records
    pub max_number_lights: usize,
    /// Capacity of the viewport data array, in four-component records
    pub max_viewports: usize,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            max_number_lights: 64,
            max_viewports: 1,
        }
    }
}

/// Top-level renderer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Frame task settings
    pub frame_task: FrameTaskConfig,
    /// Light state settings
    pub lighting: LightingConfig,
}

impl Config for RendererConfig {}
