//! 6D spatial vectors, Plücker transforms, and spatial inertia.
//!
//! Conventions follow Featherstone's "Rigid Body Dynamics Algorithms":
//! spatial vectors are ordered [angular; linear], a motion vector is a twist
//! [ω; v], a force vector is a wrench [τ; f]. A `SpatialTransform` (E, r)
//! maps quantities expressed in frame A to frame B, where E rotates A-frame
//! vectors into B-frame vectors and r is B's origin written in A coordinates.

use crate::{skew, Mat3, Mat6, Vec3, Vec6};

/// 6D spatial vector, stored as its angular and linear halves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialVec {
    /// Angular component (ω for motion, τ for force).
    pub ang: Vec3,
    /// Linear component (v for motion, f for force).
    pub lin: Vec3,
}

impl SpatialVec {
    #[inline]
    pub fn new(ang: Vec3, lin: Vec3) -> Self {
        Self { ang, lin }
    }

    #[inline]
    pub fn zero() -> Self {
        Self {
            ang: Vec3::zeros(),
            lin: Vec3::zeros(),
        }
    }

    /// Build from a packed 6-vector [angular; linear].
    #[inline]
    pub fn from_vec6(v: &Vec6) -> Self {
        Self {
            ang: Vec3::new(v[0], v[1], v[2]),
            lin: Vec3::new(v[3], v[4], v[5]),
        }
    }

    /// Pack into a 6-vector [angular; linear].
    #[inline]
    pub fn to_vec6(&self) -> Vec6 {
        Vec6::new(
            self.ang.x, self.ang.y, self.ang.z, self.lin.x, self.lin.y, self.lin.z,
        )
    }

    /// Scalar product of two spatial vectors (motion · force).
    #[inline]
    pub fn dot(&self, other: &SpatialVec) -> f64 {
        self.ang.dot(&other.ang) + self.lin.dot(&other.lin)
    }

    /// Motion cross product v ×ₘ w, the rate of change of a motion vector w
    /// carried along by the motion v.
    pub fn cross_motion(&self, other: &SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.ang.cross(&other.ang),
            lin: self.ang.cross(&other.lin) + self.lin.cross(&other.ang),
        }
    }

    /// Force cross product v ×f f, the rate of change of a force vector f
    /// carried along by the motion v.
    pub fn cross_force(&self, other: &SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.ang.cross(&other.ang) + self.lin.cross(&other.lin),
            lin: self.ang.cross(&other.lin),
        }
    }
}

impl std::ops::Add for SpatialVec {
    type Output = SpatialVec;
    #[inline]
    fn add(self, rhs: SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.ang + rhs.ang,
            lin: self.lin + rhs.lin,
        }
    }
}

impl std::ops::Sub for SpatialVec {
    type Output = SpatialVec;
    #[inline]
    fn sub(self, rhs: SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.ang - rhs.ang,
            lin: self.lin - rhs.lin,
        }
    }
}

impl std::ops::Mul<f64> for SpatialVec {
    type Output = SpatialVec;
    #[inline]
    fn mul(self, rhs: f64) -> SpatialVec {
        SpatialVec {
            ang: self.ang * rhs,
            lin: self.lin * rhs,
        }
    }
}

impl std::ops::Neg for SpatialVec {
    type Output = SpatialVec;
    #[inline]
    fn neg(self) -> SpatialVec {
        SpatialVec {
            ang: -self.ang,
            lin: -self.lin,
        }
    }
}

/// Plücker coordinate transform between two frames.
///
/// `rot` maps A-frame vectors into B-frame vectors; `pos` is the origin of
/// frame B expressed in A coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SpatialTransform {
    pub rot: Mat3,
    pub pos: Vec3,
}

impl SpatialTransform {
    pub fn new(rot: Mat3, pos: Vec3) -> Self {
        Self { rot, pos }
    }

    pub fn identity() -> Self {
        Self {
            rot: Mat3::identity(),
            pos: Vec3::zeros(),
        }
    }

    /// Pure translation by `pos`.
    pub fn translation(pos: Vec3) -> Self {
        Self {
            rot: Mat3::identity(),
            pos,
        }
    }

    /// Pure rotation about an arbitrary unit axis (Rodrigues form).
    pub fn rotation(axis: &Vec3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let ax = skew(axis);
        Self {
            rot: Mat3::identity() + ax * s + ax * ax * (1.0 - c),
            pos: Vec3::zeros(),
        }
    }

    /// Pure rotation about the X axis.
    pub fn rot_x(angle: f64) -> Self {
        Self::rotation(&Vec3::x(), angle)
    }

    /// Pure rotation about the Y axis.
    pub fn rot_y(angle: f64) -> Self {
        Self::rotation(&Vec3::y(), angle)
    }

    /// Pure rotation about the Z axis.
    pub fn rot_z(angle: f64) -> Self {
        Self::rotation(&Vec3::z(), angle)
    }

    /// Transform a motion vector from frame A to frame B.
    pub fn apply_motion(&self, m: &SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.rot * m.ang,
            lin: self.rot * (m.lin - self.pos.cross(&m.ang)),
        }
    }

    /// Transform a motion vector from frame B back to frame A.
    pub fn inv_apply_motion(&self, m: &SpatialVec) -> SpatialVec {
        let ang = self.rot.transpose() * m.ang;
        SpatialVec {
            ang,
            lin: self.rot.transpose() * m.lin + self.pos.cross(&ang),
        }
    }

    /// Transform a force vector from frame A to frame B.
    pub fn apply_force(&self, f: &SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.rot * (f.ang - self.pos.cross(&f.lin)),
            lin: self.rot * f.lin,
        }
    }

    /// Transform a force vector from frame B back to frame A.
    pub fn inv_apply_force(&self, f: &SpatialVec) -> SpatialVec {
        let lin = self.rot.transpose() * f.lin;
        SpatialVec {
            ang: self.rot.transpose() * f.ang + self.pos.cross(&lin),
            lin,
        }
    }

    /// Composition: the transform that applies `other` first, then `self`.
    pub fn compose(&self, other: &SpatialTransform) -> SpatialTransform {
        SpatialTransform {
            rot: self.rot * other.rot,
            pos: other.pos + other.rot.transpose() * self.pos,
        }
    }

    /// Inverse transform (B back to A).
    pub fn inverse(&self) -> SpatialTransform {
        SpatialTransform {
            rot: self.rot.transpose(),
            pos: -(self.rot * self.pos),
        }
    }

    /// Dense 6x6 Plücker matrix acting on motion vectors:
    ///
    /// ```text
    /// X = |  E      0 |
    ///     | -E[r]×  E |
    /// ```
    pub fn to_motion_matrix(&self) -> Mat6 {
        let e = self.rot;
        let bl = -e * skew(&self.pos);
        let mut x = Mat6::zeros();
        x.fixed_view_mut::<3, 3>(0, 0).copy_from(&e);
        x.fixed_view_mut::<3, 3>(3, 0).copy_from(&bl);
        x.fixed_view_mut::<3, 3>(3, 3).copy_from(&e);
        x
    }
}

/// Rigid-body spatial inertia: mass, center of mass in the body frame, and
/// rotational inertia about the center of mass.
#[derive(Debug, Clone, Copy)]
pub struct SpatialInertia {
    pub mass: f64,
    pub com: Vec3,
    pub inertia: Mat3,
}

impl SpatialInertia {
    pub fn new(mass: f64, com: Vec3, inertia: Mat3) -> Self {
        Self { mass, com, inertia }
    }

    /// Zero inertia (massless connector body).
    pub fn zero() -> Self {
        Self {
            mass: 0.0,
            com: Vec3::zeros(),
            inertia: Mat3::zeros(),
        }
    }

    /// Point mass at `pos` in the body frame.
    pub fn point_mass(mass: f64, pos: Vec3) -> Self {
        Self {
            mass,
            com: pos,
            inertia: Mat3::zeros(),
        }
    }

    /// Uniform thin rod of the given mass and length along the Y axis,
    /// centered on `com`.
    pub fn rod_y(mass: f64, length: f64, com: Vec3) -> Self {
        let i = mass * length * length / 12.0;
        Self {
            mass,
            com,
            inertia: Mat3::from_diagonal(&Vec3::new(i, 0.0, i)),
        }
    }

    /// Uniform solid sphere.
    pub fn sphere(mass: f64, radius: f64) -> Self {
        let i = 0.4 * mass * radius * radius;
        Self {
            mass,
            com: Vec3::zeros(),
            inertia: Mat3::from_diagonal(&Vec3::new(i, i, i)),
        }
    }

    /// 6x6 spatial inertia about the body-frame origin:
    ///
    /// ```text
    /// I = | Ic + m[c]×[c]×ᵀ  m[c]× |
    ///     | m[c]×ᵀ           m·1   |
    /// ```
    pub fn to_matrix(&self) -> Mat6 {
        let cx = skew(&self.com);
        let tl = self.inertia + cx * cx.transpose() * self.mass;
        let tr = cx * self.mass;
        let mut i = Mat6::zeros();
        i.fixed_view_mut::<3, 3>(0, 0).copy_from(&tl);
        i.fixed_view_mut::<3, 3>(0, 3).copy_from(&tr);
        i.fixed_view_mut::<3, 3>(3, 0).copy_from(&tr.transpose());
        i.fixed_view_mut::<3, 3>(3, 3)
            .copy_from(&(Mat3::identity() * self.mass));
        i
    }
}
