//! Recursive Newton-Euler Algorithm — inverse dynamics and bias force.

use crate::Kinematics;
use linkage_math::{DVec, SpatialVec, Vec3};
use linkage_model::Model;

/// Compute the generalized forces required to produce `qddot` at the state
/// captured in `kin` (transforms and velocities must be current for the
/// `(q, qdot)` of interest).
///
/// `f_ext`, when given, supplies one spatial force per body in base
/// coordinates. Gravity is applied through the base-acceleration trick.
pub fn inverse_dynamics(
    model: &Model,
    kin: &Kinematics,
    qdot: &DVec,
    qddot: &DVec,
    f_ext: Option<&[SpatialVec]>,
) -> DVec {
    let n = model.dof_count();
    let mut tau = DVec::zeros(n);

    let a0 = SpatialVec::new(Vec3::zeros(), -model.gravity);

    // Forward pass: spatial accelerations, gravity included.
    let mut acc = vec![SpatialVec::zero(); n];
    for i in 0..n {
        let s = model.joints[i].motion_subspace();
        let a_joint = s * qddot[i] + kin.vel[i].cross_motion(&(s * qdot[i]));
        let a_parent = match model.lambda[i] {
            p if p >= 0 => kin.x_lambda[i].apply_motion(&acc[p as usize]),
            _ => kin.x_lambda[i].apply_motion(&a0),
        };
        acc[i] = a_parent + a_joint;
    }

    // Net body forces: f = I a + v ×f (I v), minus applied external forces.
    let mut forces = vec![SpatialVec::zero(); n];
    for i in 0..n {
        let ib = model.bodies[i].inertia.to_matrix();
        let iv = SpatialVec::from_vec6(&(ib * kin.vel[i].to_vec6()));
        let ia = SpatialVec::from_vec6(&(ib * acc[i].to_vec6()));
        forces[i] = ia + kin.vel[i].cross_force(&iv);
        if let Some(ext) = f_ext {
            forces[i] = forces[i] - kin.x_base[i].apply_force(&ext[i]);
        }
    }

    // Backward pass: project onto joint axes and propagate to parents.
    for i in (0..n).rev() {
        tau[i] = model.joints[i].motion_subspace().dot(&forces[i]);
        if model.lambda[i] >= 0 {
            let p = model.lambda[i] as usize;
            forces[p] = forces[p] + kin.x_lambda[i].inv_apply_force(&forces[i]);
        }
    }

    tau
}

/// Bias force C(q, qdot): generalized force at zero acceleration
/// (gravity, Coriolis and centrifugal terms, minus external forces).
pub fn nonlinear_effects(
    model: &Model,
    kin: &Kinematics,
    qdot: &DVec,
    f_ext: Option<&[SpatialVec]>,
) -> DVec {
    inverse_dynamics(model, kin, qdot, &DVec::zeros(model.dof_count()), f_ext)
}
