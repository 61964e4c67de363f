//! Spatial algebra for the linkage dynamics workspace.
//!
//! 6D motion and force vectors, Plücker coordinate transforms, and spatial
//! inertia in Featherstone's [angular; linear] convention.

pub mod spatial;

pub use spatial::{SpatialInertia, SpatialTransform, SpatialVec};

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;
/// 6D vector alias.
pub type Vec6 = na::Vector6<f64>;
/// 6x6 matrix alias.
pub type Mat6 = na::Matrix6<f64>;
/// Dynamically sized vector.
pub type DVec = na::DVector<f64>;
/// Dynamically sized matrix.
pub type DMat = na::DMatrix<f64>;

/// Cross-product matrix: `skew(v) * w == v × w`.
#[inline]
pub fn skew(v: &Vec3) -> Mat3 {
    Mat3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.81;
