//! Forward kinematics cache and point/frame kinematics.
//!
//! The cache holds, per body, the tree and base transforms plus spatial
//! velocity and acceleration in body coordinates. Cached accelerations never
//! include gravity; gravity enters the equations of motion only through the
//! bias force.

use linkage_math::{DMat, SpatialTransform, SpatialVec, Vec3};
use linkage_model::Model;

/// Per-body kinematic state, updated in place between solves.
#[derive(Debug, Clone)]
pub struct Kinematics {
    /// Parent body frame (or base) to body frame.
    pub x_lambda: Vec<SpatialTransform>,
    /// Base frame to body frame.
    pub x_base: Vec<SpatialTransform>,
    /// Spatial velocity in body coordinates.
    pub vel: Vec<SpatialVec>,
    /// Spatial acceleration in body coordinates (gravity-free).
    pub acc: Vec<SpatialVec>,
}

impl Kinematics {
    pub fn new(model: &Model) -> Self {
        let n = model.dof_count();
        Self {
            x_lambda: vec![SpatialTransform::identity(); n],
            x_base: vec![SpatialTransform::identity(); n],
            vel: vec![SpatialVec::zero(); n],
            acc: vec![SpatialVec::zero(); n],
        }
    }

    /// Recompute the tree and base transforms from `q`.
    pub fn update_position(&mut self, model: &Model, q: &linkage_math::DVec) {
        for i in 0..model.dof_count() {
            let x_joint = model.joints[i].joint_transform(q[i]);
            self.x_lambda[i] = x_joint.compose(&model.x_tree[i]);
            self.x_base[i] = match model.lambda[i] {
                p if p >= 0 => self.x_lambda[i].compose(&self.x_base[p as usize]),
                _ => self.x_lambda[i],
            };
        }
    }

    /// Recompute transforms and spatial velocities from `(q, qdot)`.
    pub fn update_velocity(
        &mut self,
        model: &Model,
        q: &linkage_math::DVec,
        qdot: &linkage_math::DVec,
    ) {
        self.update_position(model, q);
        for i in 0..model.dof_count() {
            let v_joint = model.joints[i].motion_subspace() * qdot[i];
            self.vel[i] = match model.lambda[i] {
                p if p >= 0 => self.x_lambda[i].apply_motion(&self.vel[p as usize]) + v_joint,
                _ => v_joint,
            };
        }
    }

    /// Recompute spatial accelerations from `(qdot, qddot)`; transforms and
    /// velocities must be current. Gravity is not included.
    pub fn update_acceleration(
        &mut self,
        model: &Model,
        qdot: &linkage_math::DVec,
        qddot: &linkage_math::DVec,
    ) {
        for i in 0..model.dof_count() {
            let s = model.joints[i].motion_subspace();
            let a_joint = s * qddot[i] + self.vel[i].cross_motion(&(s * qdot[i]));
            self.acc[i] = match model.lambda[i] {
                p if p >= 0 => self.x_lambda[i].apply_motion(&self.acc[p as usize]) + a_joint,
                _ => a_joint,
            };
        }
    }

    /// Body spatial velocity re-referenced to the base origin, base coords.
    #[inline]
    pub fn base_velocity(&self, body: usize) -> SpatialVec {
        self.x_base[body].inv_apply_motion(&self.vel[body])
    }

    /// Body spatial acceleration re-referenced to the base origin, base coords.
    #[inline]
    pub fn base_acceleration(&self, body: usize) -> SpatialVec {
        self.x_base[body].inv_apply_motion(&self.acc[body])
    }
}

/// Base coordinates of a point given in body coordinates.
pub fn point_to_base(kin: &Kinematics, body: usize, point: &Vec3) -> Vec3 {
    let x = &kin.x_base[body];
    x.pos + x.rot.transpose() * point
}

/// Velocity of a body-fixed point, in base coordinates.
pub fn point_velocity(kin: &Kinematics, body: usize, point: &Vec3) -> Vec3 {
    let v = kin.base_velocity(body);
    let p = point_to_base(kin, body, point);
    v.lin + v.ang.cross(&p)
}

/// Classical acceleration of a body-fixed point, in base coordinates.
///
/// Requires `update_acceleration` to have run with the `qddot` of interest.
pub fn point_acceleration(kin: &Kinematics, body: usize, point: &Vec3) -> Vec3 {
    let v = kin.base_velocity(body);
    let a = kin.base_acceleration(body);
    let p = point_to_base(kin, body, point);
    let v_pt = v.lin + v.ang.cross(&p);
    a.lin + a.ang.cross(&p) + v.ang.cross(&v_pt)
}

/// Spatial velocity referenced at a body-fixed point with base orientation.
pub fn point_velocity_6d(kin: &Kinematics, body: usize, point: &Vec3) -> SpatialVec {
    let v = kin.base_velocity(body);
    let p = point_to_base(kin, body, point);
    SpatialVec::new(v.ang, v.lin + v.ang.cross(&p))
}

/// Spatial acceleration referenced at a body-fixed point with base
/// orientation, including the velocity-product term of the moving reference
/// point.
pub fn point_acceleration_6d(kin: &Kinematics, body: usize, point: &Vec3) -> SpatialVec {
    let v = kin.base_velocity(body);
    let a = kin.base_acceleration(body);
    let p = point_to_base(kin, body, point);
    let v_pt = v.lin + v.ang.cross(&p);
    SpatialVec::new(a.ang, a.lin + a.ang.cross(&p) + v.ang.cross(&v_pt))
}

/// Fill `out` (3 x dof_count, zeroed here) with the point Jacobian: the map
/// from generalized velocity to the base-frame velocity of a body-fixed
/// point.
pub fn point_jacobian(model: &Model, kin: &Kinematics, body: usize, point: &Vec3, out: &mut DMat) {
    out.fill(0.0);
    let p = point_to_base(kin, body, point);
    let mut j = body as i32;
    while j >= 0 {
        let ju = j as usize;
        let s = kin.x_base[ju].inv_apply_motion(&model.joints[ju].motion_subspace());
        let col = s.lin + s.ang.cross(&p);
        out[(0, ju)] = col.x;
        out[(1, ju)] = col.y;
        out[(2, ju)] = col.z;
        j = model.lambda[ju];
    }
}

/// Fill `out` (6 x dof_count, zeroed here) with the 6D point Jacobian: the
/// map from generalized velocity to the spatial velocity referenced at the
/// point with base orientation.
pub fn point_jacobian_6d(
    model: &Model,
    kin: &Kinematics,
    body: usize,
    point: &Vec3,
    out: &mut DMat,
) {
    out.fill(0.0);
    let p = point_to_base(kin, body, point);
    let mut j = body as i32;
    while j >= 0 {
        let ju = j as usize;
        let s = kin.x_base[ju].inv_apply_motion(&model.joints[ju].motion_subspace());
        let lin = s.lin + s.ang.cross(&p);
        for k in 0..3 {
            out[(k, ju)] = s.ang[k];
            out[(k + 3, ju)] = lin[k];
        }
        j = model.lambda[ju];
    }
}
