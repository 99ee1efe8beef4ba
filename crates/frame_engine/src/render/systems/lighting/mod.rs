//! Lighting system
//!
//! Light kinds reported by scene traversal and the per-view state packing
//! them into uniform buffer records.

pub mod lighting;
pub mod view_dependent;

pub use lighting::*;
pub use view_dependent::{
    BindViewDescriptorSets, ViewDependentState, LIGHT_DATA_BINDING, VIEWPORT_DATA_BINDING,
};
