//! Frame timestamps handed to command graphs during recording

use std::time::Instant;

/// Identifies the frame being recorded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStamp {
    /// Monotonic frame counter, starting at 0
    pub frame_count: u64,
    /// Wall-clock time the frame started
    pub time: Instant,
    /// Application simulation time in seconds
    pub simulation_time: f64,
}

impl FrameStamp {
    /// First frame stamp
    pub fn new(time: Instant) -> Self {
        Self {
            frame_count: 0,
            time,
            simulation_time: 0.0,
        }
    }

    /// Stamp for the following frame, advancing simulation time by the elapsed wall time
    pub fn next(&self, time: Instant) -> Self {
        let elapsed = time.saturating_duration_since(self.time).as_secs_f64();
        Self {
            frame_count: self.frame_count + 1,
            time,
            simulation_time: self.simulation_time + elapsed,
        }
    }
}
