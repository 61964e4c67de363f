//! Single-DOF joint types.

use linkage_math::{SpatialTransform, SpatialVec, Vec3};

/// Joint type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointType {
    /// One rotational DOF about `axis`.
    Revolute,
    /// One translational DOF along `axis`.
    Prismatic,
}

/// A single-DOF joint connecting a body to its parent.
#[derive(Debug, Clone)]
pub struct Joint {
    pub joint_type: JointType,
    /// Joint axis in the successor body frame (unit length).
    pub axis: Vec3,
}

impl Joint {
    pub fn revolute(axis: Vec3) -> Self {
        Self {
            joint_type: JointType::Revolute,
            axis,
        }
    }

    pub fn prismatic(axis: Vec3) -> Self {
        Self {
            joint_type: JointType::Prismatic,
            axis,
        }
    }

    /// Plücker transform across the joint (predecessor frame to successor
    /// frame) at joint position `q`.
    ///
    /// For revolute joints the successor frame has rotated by +q about the
    /// axis, so the coordinate transform rotates by −q.
    pub fn joint_transform(&self, q: f64) -> SpatialTransform {
        match self.joint_type {
            JointType::Revolute => SpatialTransform::rotation(&self.axis, -q),
            JointType::Prismatic => SpatialTransform::translation(self.axis * q),
        }
    }

    /// Motion subspace S: the spatial velocity produced by unit joint rate.
    pub fn motion_subspace(&self) -> SpatialVec {
        match self.joint_type {
            JointType::Revolute => SpatialVec::new(self.axis, Vec3::zeros()),
            JointType::Prismatic => SpatialVec::new(Vec3::zeros(), self.axis),
        }
    }
}
