//! Math utilities and types
//!
//! Single precision types for GPU-facing data and double precision types for
//! light geometry and the view transforms it is combined with.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Point3,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Double precision 3D vector
pub type DVec3 = Vector3<f64>;

/// Double precision 3x3 matrix
pub type DMat3 = Matrix3<f64>;

/// Double precision 4x4 matrix
pub type DMat4 = Matrix4<f64>;

/// Transform a position by the full 4x4 matrix, including the projective divide.
pub fn transform_position(matrix: &DMat4, position: &DVec3) -> DVec3 {
    matrix.transform_point(&Point3::from(*position)).coords
}

/// Transform a direction by the inverse-transpose of the upper 3x3 of `matrix`
/// and normalize the result.
///
/// Returns `None` when the rotation part is singular.
pub fn transform_direction(matrix: &DMat4, direction: &DVec3) -> Option<DVec3> {
    let rotation: DMat3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let inverse = rotation.try_inverse()?;
    Some((inverse.transpose() * direction).normalize())
}

/// Narrow a double precision vector into a GPU record, with `w` as the fourth component.
pub fn to_record(v: &DVec3, w: f32) -> [f32; 4] {
    [v.x as f32, v.y as f32, v.z as f32, w]
}
