//! Forward dynamics under kinematic constraints.
//!
//! Each driver assembles the constrained-system variables and hands them to
//! one of the saddle-point strategies; the Lagrange multipliers land in the
//! set's force vector (the force enforcing gamma, along each row's axis).
//! Valid for any mix of contact/loop/custom rows; redundant rows are a
//! caller error and surface as a singular factorization.

use crate::error::Result;
use crate::set::ConstraintSet;
use crate::solvers::{
    range_null_basis, solve_constrained_system_direct, solve_constrained_system_null_space,
    solve_constrained_system_range_space_sparse,
};
use crate::system::calc_constrained_system_variables;
use linkage_math::{DVec, SpatialVec};
use linkage_model::Model;

/// Forward dynamics via the full (n+m)² saddle-point system.
pub fn forward_dynamics_constraints_direct(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    tau: &DVec,
    set: &mut ConstraintSet,
    f_ext: Option<&[SpatialVec]>,
) -> Result<DVec> {
    calc_constrained_system_variables(model, q, qdot, set, f_ext);

    let n = model.dof_count();
    let m = set.size();
    let c = tau - &set.c;
    solve_constrained_system_direct(
        &set.h, &set.g, &c, &set.gamma, &mut set.a, &mut set.b, &mut set.x, set.solver,
    )?;

    let qddot = set.x.rows(0, n).into_owned();
    for i in 0..m {
        set.force[i] = -set.x[n + i];
    }
    Ok(qddot)
}

/// Forward dynamics via the sparse range-space method.
pub fn forward_dynamics_constraints_range_space_sparse(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    tau: &DVec,
    set: &mut ConstraintSet,
    f_ext: Option<&[SpatialVec]>,
) -> Result<DVec> {
    calc_constrained_system_variables(model, q, qdot, set, f_ext);

    let mut qddot = DVec::zeros(model.dof_count());
    let c = tau - &set.c;
    let (h, g, gamma, force, k_ws, ka) = (
        &mut set.h,
        &set.g,
        &set.gamma,
        &mut set.force,
        &mut set.k_ws,
        &mut set.ka,
    );
    solve_constrained_system_range_space_sparse(
        model, h, g, &c, gamma, &mut qddot, force, k_ws, ka, set.solver,
    )?;
    Ok(qddot)
}

/// Forward dynamics via the null-space method.
pub fn forward_dynamics_constraints_null_space(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    tau: &DVec,
    set: &mut ConstraintSet,
    f_ext: Option<&[SpatialVec]>,
) -> Result<DVec> {
    calc_constrained_system_variables(model, q, qdot, set, f_ext);

    let mut qddot = DVec::zeros(model.dof_count());
    let c = tau - &set.c;
    let (y, z) = range_null_basis(&set.g.transpose());
    solve_constrained_system_null_space(
        &set.h,
        &set.g,
        &c,
        &set.gamma,
        &mut qddot,
        &mut set.force,
        &y,
        &z,
        set.solver,
    )?;
    Ok(qddot)
}
