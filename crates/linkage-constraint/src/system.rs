//! Constraint kinematics: position/velocity errors, the stacked Jacobian,
//! and assembly of the constrained-system variables (H, C, G, gamma).

use crate::set::ConstraintSet;
use linkage_dynamics::{
    joint_space_inertia, nonlinear_effects, point_acceleration, point_acceleration_6d,
    point_jacobian, point_jacobian_6d, point_to_base, point_velocity_6d, Kinematics,
};
use linkage_math::{DMat, DVec, Mat3, SpatialTransform, SpatialVec, Vec3};
use linkage_model::{Model, GROUND};

/// Origin and orientation of a constraint frame attached to a body (or to
/// the fixed base for `GROUND`): `rot` maps base-frame vectors into
/// constraint-frame vectors, `pos` is the frame origin in base coordinates.
fn constraint_frame(kin: &Kinematics, body: usize, x_local: &SpatialTransform) -> (Mat3, Vec3) {
    if body == GROUND {
        (x_local.rot, x_local.pos)
    } else {
        let rot = x_local.rot * kin.x_base[body].rot;
        let pos = point_to_base(kin, body, &x_local.pos);
        (rot, pos)
    }
}

fn frame_velocity_6d(kin: &Kinematics, body: usize, point: &Vec3) -> SpatialVec {
    if body == GROUND {
        SpatialVec::zero()
    } else {
        point_velocity_6d(kin, body, point)
    }
}

fn frame_acceleration_6d(kin: &Kinematics, body: usize, point: &Vec3) -> SpatialVec {
    if body == GROUND {
        SpatialVec::zero()
    } else {
        point_acceleration_6d(kin, body, point)
    }
}

fn frame_jacobian_6d(model: &Model, kin: &Kinematics, body: usize, point: &Vec3, out: &mut DMat) {
    if body == GROUND {
        out.fill(0.0);
    } else {
        point_jacobian_6d(model, kin, body, point, out);
    }
}

/// Rotate a spatial axis from a constraint frame into base orientation
/// (same reference point).
fn axis_to_base(rot: &Mat3, axis: &SpatialVec) -> SpatialVec {
    SpatialVec::new(rot.transpose() * axis.ang, rot.transpose() * axis.lin)
}

/// Compute the position-level constraint errors into the set's error
/// vector. Contact rows report zero by convention; loop rows report the
/// axis-projected pose discrepancy between their two constraint frames;
/// custom rows delegate to the object.
pub fn calc_constraints_position_error(
    model: &Model,
    q: &DVec,
    set: &mut ConstraintSet,
    update_kinematics: bool,
) {
    if update_kinematics {
        set.kin.update_position(model, q);
    }
    set.err.fill(0.0);

    for lc in &set.loops {
        let (rot_p, pos_p) = constraint_frame(&set.kin, lc.body_pred, &lc.x_pred);
        let (rot_s, pos_s) = constraint_frame(&set.kin, lc.body_succ, &lc.x_succ);

        // Rotation of the successor constraint frame relative to the
        // predecessor constraint frame.
        let rel = rot_p * rot_s.transpose();

        // The rotation error is u·sin(θ) of `rel` (its skew-symmetric
        // part); the position error is the frame-origin offset rotated
        // into the predecessor constraint frame.
        let d = SpatialVec::new(
            Vec3::new(
                -0.5 * (rel[(1, 2)] - rel[(2, 1)]),
                -0.5 * (rel[(2, 0)] - rel[(0, 2)]),
                -0.5 * (rel[(0, 1)] - rel[(1, 0)]),
            ),
            rot_p * (pos_s - pos_p),
        );
        set.err[lc.row] = lc.axis.dot(&d);
    }

    for cc in &set.customs {
        cc.constraint
            .position_error(model, &set.kin, &cc.anchor, q, &mut set.err, cc.row);
    }
}

/// Build the stacked constraint Jacobian G (rows × DOF) into the set's
/// workspace. Contact rows project the point Jacobian onto the contact
/// normal; loop rows project the relative frame Jacobian onto the
/// constraint axis; custom rows delegate (the object also reports its
/// per-row axes).
pub fn calc_constraints_jacobian(
    model: &Model,
    q: &DVec,
    set: &mut ConstraintSet,
    update_kinematics: bool,
) {
    if update_kinematics {
        set.kin.update_position(model, q);
    }
    set.g.fill(0.0);
    let n = set.dof;

    for cc in &set.contacts {
        point_jacobian(model, &set.kin, cc.body, &cc.point, &mut set.gi);
        for j in 0..n {
            set.g[(cc.row, j)] = cc.normal.x * set.gi[(0, j)]
                + cc.normal.y * set.gi[(1, j)]
                + cc.normal.z * set.gi[(2, j)];
        }
    }

    for lc in &set.loops {
        frame_jacobian_6d(model, &set.kin, lc.body_pred, &lc.x_pred.pos, &mut set.gs_pred);
        frame_jacobian_6d(model, &set.kin, lc.body_succ, &lc.x_succ.pos, &mut set.gs_succ);
        let (rot_p, _) = constraint_frame(&set.kin, lc.body_pred, &lc.x_pred);
        let axis0 = axis_to_base(&rot_p, &lc.axis);
        let a6 = axis0.to_vec6();
        for j in 0..n {
            let mut v = 0.0;
            for k in 0..6 {
                v += a6[k] * (set.gs_succ[(k, j)] - set.gs_pred[(k, j)]);
            }
            set.g[(lc.row, j)] = v;
        }
    }

    for cc in &set.customs {
        let rows = cc.constraint.row_count();
        cc.constraint.jacobian_and_axis(
            model,
            &set.kin,
            &cc.anchor,
            q,
            &mut set.g,
            cc.row,
            &mut set.axis[cc.row..cc.row + rows],
        );
    }
}

/// Compute the velocity-level constraint errors `G·qdot` into the set's
/// error-rate vector; custom rows overwrite theirs with the independently
/// computed value from the object.
pub fn calc_constraints_velocity_error(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    set: &mut ConstraintSet,
    update_kinematics: bool,
) {
    calc_constraints_jacobian(model, q, set, update_kinematics);
    set.errd = &set.g * qdot;
    for cc in &set.customs {
        cc.constraint.velocity_error(
            model,
            &set.kin,
            &cc.anchor,
            q,
            qdot,
            &set.g,
            &mut set.errd,
            cc.row,
        );
    }
}

/// Populate every term of the constrained dynamic problem in the set's
/// workspace: the joint-space inertia H, the bias force C, the stacked
/// Jacobian G, both error vectors, and the right-hand side gamma including
/// Baumgarte stabilization.
///
/// Called automatically by the forward-dynamics and inverse-dynamics
/// drivers.
pub fn calc_constrained_system_variables(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    set: &mut ConstraintSet,
    f_ext: Option<&[SpatialVec]>,
) {
    set.kin.update_velocity(model, q, qdot);
    // Velocity-product accelerations: the zero-qddot response.
    set.qddot_0.fill(0.0);
    set.kin.update_acceleration(model, qdot, &set.qddot_0);

    joint_space_inertia(model, &set.kin, &mut set.h);
    set.c = nonlinear_effects(model, &set.kin, qdot, f_ext);

    calc_constraints_jacobian(model, q, set, false);
    calc_constraints_position_error(model, q, set, false);
    set.errd = &set.g * qdot;
    for cc in &set.customs {
        cc.constraint.velocity_error(
            model,
            &set.kin,
            &cc.anchor,
            q,
            qdot,
            &set.g,
            &mut set.errd,
            cc.row,
        );
    }

    // gamma: the acceleration-independent part of the constraint equation,
    // negated.
    set.gamma.fill(0.0);

    for cc in &set.contacts {
        let accel0 = point_acceleration(&set.kin, cc.body, &cc.point);
        set.gamma[cc.row] = set.acceleration[cc.row] - cc.normal.dot(&accel0);
    }

    for lc in &set.loops {
        let (rot_p, _) = constraint_frame(&set.kin, lc.body_pred, &lc.x_pred);
        let axis0 = axis_to_base(&rot_p, &lc.axis);

        let vel_p = frame_velocity_6d(&set.kin, lc.body_pred, &lc.x_pred.pos);
        let vel_s = frame_velocity_6d(&set.kin, lc.body_succ, &lc.x_succ.pos);
        let acc_p = frame_acceleration_6d(&set.kin, lc.body_pred, &lc.x_pred.pos);
        let acc_s = frame_acceleration_6d(&set.kin, lc.body_succ, &lc.x_succ.pos);

        // Velocity-product relative acceleration, including the rate of
        // change of the constraint axis carried by the predecessor frame.
        let rel = acc_s - acc_p - vel_p.cross_motion(&(vel_s - vel_p));
        set.gamma[lc.row] = -axis0.dot(&rel);
    }

    for cc in &set.customs {
        cc.constraint.gamma(
            model,
            &set.kin,
            &cc.anchor,
            q,
            qdot,
            &set.g,
            &mut set.gamma,
            cc.row,
        );
    }

    // Baumgarte stabilization, applied uniformly: gains are zero for
    // contact rows and for rows registered without stabilization.
    for row in 0..set.size() {
        let (alpha, beta) = set.baumgarte[row];
        set.gamma[row] -= 2.0 * alpha * set.errd[row] + beta * beta * set.err[row];
    }
}
