//! Recursive contact driver (Kokkevis & Metaxas, "Practical Physics for
//! Articulated Characters", GDC 2004).
//!
//! Avoids building the joint-space inertia matrix: the inverse
//! articulated-body inertia is probed by applying one spatial test force
//! per contact and propagating its acceleration response through the
//! retained articulated-body state, yielding a dense m×m operator from
//! contact forces to contact-point accelerations plus a bias vector from
//! the zero-force response. Supports contact rows only, and no external
//! forces — callers needing loop/custom rows or external forces must use
//! one of the Lagrangian drivers.

use crate::error::{ConstraintError, Result};
use crate::set::ConstraintSet;
use crate::solvers::solve_linear;
use linkage_dynamics::{
    articulated_body_dynamics, point_acceleration, point_to_base, ArticulatedBodyCache,
};
use linkage_math::{DVec, SpatialVec};
use linkage_model::Model;

/// Acceleration response to a single spatial test force `f_t` (base
/// coordinates, referenced at the base origin) applied to `body`, computed
/// from the retained state of the last articulated-body pass. The bias-force
/// delta is swept up the support chain, then the acceleration deltas are
/// swept back down the whole tree into `qddot_t`.
fn acceleration_deltas(
    model: &Model,
    cache: &ArticulatedBodyCache,
    body: usize,
    f_t: &SpatialVec,
    d_pa: &mut [SpatialVec],
    d_u: &mut [f64],
    qddot_t: &mut DVec,
) {
    let n = model.dof_count();
    for i in 0..n {
        d_pa[i] = SpatialVec::zero();
        d_u[i] = 0.0;
    }

    d_pa[body] = -cache.x_base[body].apply_force(f_t);
    let mut i = body as i32;
    while i >= 0 {
        let iu = i as usize;
        d_u[iu] = -model.joints[iu].motion_subspace().dot(&d_pa[iu]);
        let p = model.lambda[iu];
        if p >= 0 && cache.d[iu].abs() > 1e-14 {
            let carried = d_pa[iu] + cache.u_vec[iu] * (d_u[iu] / cache.d[iu]);
            d_pa[p as usize] =
                d_pa[p as usize] + cache.x_lambda[iu].inv_apply_force(&carried);
        }
        i = p;
    }

    let mut d_a = vec![SpatialVec::zero(); n];
    for i in 0..n {
        let xa = match model.lambda[i] {
            p if p >= 0 => cache.x_lambda[i].apply_motion(&d_a[p as usize]),
            _ => SpatialVec::zero(),
        };
        qddot_t[i] = if cache.d[i].abs() > 1e-14 {
            (d_u[i] - cache.u_vec[i].dot(&xa)) / cache.d[i]
        } else {
            0.0
        };
        d_a[i] = xa + model.joints[i].motion_subspace() * qddot_t[i];
    }
}

/// Forward dynamics for a contact-only constraint set via recursive
/// inverse-articulated-body-inertia propagation.
pub fn forward_dynamics_contacts_kokkevis(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    tau: &DVec,
    set: &mut ConstraintSet,
) -> Result<DVec> {
    assert!(
        set.loops.is_empty() && set.customs.is_empty(),
        "the recursive contact driver supports contact constraints only"
    );
    let m = set.size();

    for f in &mut set.f_ext_constraints {
        *f = SpatialVec::zero();
    }

    // Zero-force response and the resulting contact-point accelerations.
    let qddot_0 =
        articulated_body_dynamics(model, q, qdot, tau, Some(&set.f_ext_constraints), &mut set.aba);
    set.qddot_0.copy_from(&qddot_0);

    set.kin.update_velocity(model, q, qdot);
    set.kin.update_acceleration(model, qdot, &set.qddot_0);
    for ci in 0..m {
        let con = &set.contacts[ci];
        set.point_accel_0[ci] = point_acceleration(&set.kin, con.body, &con.point);
        set.ka[ci] = set.acceleration[ci] - con.normal.dot(&set.point_accel_0[ci]);
        let p_w = point_to_base(&set.kin, con.body, &con.point);
        set.f_t[ci] = SpatialVec::new(p_w.cross(&con.normal), con.normal);
    }

    // One column of the contact-space operator per unit test force.
    for ci in 0..m {
        acceleration_deltas(
            model,
            &set.aba,
            set.contacts[ci].body,
            &set.f_t[ci],
            &mut set.d_pa,
            &mut set.d_u,
            &mut set.qddot_t,
        );
        set.qddot_t += &set.qddot_0;
        set.kin.update_acceleration(model, qdot, &set.qddot_t);
        for cj in 0..m {
            let con = &set.contacts[cj];
            let accel_t = point_acceleration(&set.kin, con.body, &con.point);
            set.k_ws[(cj, ci)] = con.normal.dot(&(accel_t - set.point_accel_0[cj]));
        }
    }

    let f = solve_linear(set.solver, &set.k_ws, &set.ka).ok_or(
        ConstraintError::SingularSystem("solving the contact-force system"),
    )?;
    set.force.copy_from(&f);

    // Final pass under the resolved contact forces.
    for ci in 0..m {
        let body = set.contacts[ci].body;
        set.f_ext_constraints[body] = set.f_ext_constraints[body] + set.f_t[ci] * f[ci];
    }
    let qddot =
        articulated_body_dynamics(model, q, qdot, tau, Some(&set.f_ext_constraints), &mut set.aba);
    Ok(qddot)
}
