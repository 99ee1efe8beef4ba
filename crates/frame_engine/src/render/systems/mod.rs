//! Active rendering systems
//!
//! Stateful runtime systems that feed per-frame data to recording.

pub mod lighting;
