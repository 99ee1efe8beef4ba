//! Light source definitions
//!
//! The four light kinds a scene traversal can report to the view-dependent
//! light state. Colors and intensities are single precision since they are
//! copied to the GPU unchanged; positions, directions and cone angles are
//! double precision because they are transformed into eye space first.

use std::fmt;

use crate::foundation::math::{DVec3, Vec3};

/// Light kinds, in the order they are packed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// View-invariant light
    Ambient,
    /// Directional light (like sunlight)
    Directional,
    /// Point light (like a lightbulb)
    Point,
    /// Spot light (like a flashlight)
    Spot,
}

impl LightKind {
    /// Number of four-component records one light of this kind occupies
    pub fn record_count(self) -> usize {
        match self {
            Self::Ambient => 1,
            Self::Directional | Self::Point => 2,
            Self::Spot => 3,
        }
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ambient => "ambient",
            Self::Directional => "directional",
            Self::Point => "point",
            Self::Spot => "spot",
        };
        f.write_str(name)
    }
}

/// Ambient light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
}

/// Directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Direction the light travels, in the local frame
    pub direction: DVec3,
}

/// Point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Light position, in the local frame
    pub position: DVec3,
}

/// Spot light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Light position, in the local frame
    pub position: DVec3,
    /// Cone axis, in the local frame
    pub direction: DVec3,
    /// Inner cone angle (in radians)
    pub inner_angle: f64,
    /// Outer cone angle (in radians)
    pub outer_angle: f64,
}

/// Light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Ambient light
    Ambient(AmbientLight),
    /// Directional light
    Directional(DirectionalLight),
    /// Point light
    Point(PointLight),
    /// Spot light
    Spot(SpotLight),
}

impl Light {
    /// Create an ambient light
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Self::Ambient(AmbientLight { color, intensity })
    }

    /// Create a directional light
    pub fn directional(direction: DVec3, color: Vec3, intensity: f32) -> Self {
        Self::Directional(DirectionalLight { color, intensity, direction })
    }

    /// Create a point light
    pub fn point(position: DVec3, color: Vec3, intensity: f32) -> Self {
        Self::Point(PointLight { color, intensity, position })
    }

    /// Create a spot light
    pub fn spot(
        position: DVec3,
        direction: DVec3,
        color: Vec3,
        intensity: f32,
        inner_angle: f64,
        outer_angle: f64,
    ) -> Self {
        Self::Spot(SpotLight {
            color,
            intensity,
            position,
            direction,
            inner_angle,
            outer_angle,
        })
    }

    /// Kind of this light
    pub fn kind(&self) -> LightKind {
        match self {
            Self::Ambient(_) => LightKind::Ambient,
            Self::Directional(_) => LightKind::Directional,
            Self::Point(_) => LightKind::Point,
            Self::Spot(_) => LightKind::Spot,
        }
    }
}

impl From<AmbientLight> for Light {
    fn from(light: AmbientLight) -> Self {
        Self::Ambient(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Self::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Self::Point(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Self {
        Self::Spot(light)
    }
}
