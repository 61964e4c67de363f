//! Impulse resolution: the same three strategies applied at the velocity
//! level to resolve instantaneous collisions,
//!
//! ```text
//! | H  Gᵀ | | qdot⁺ |   | H·qdot⁻ |
//! | G  0  | | -Λ    | = | v⁺      |
//! ```
//!
//! where v⁺ is the target post-impact constraint velocity (the set's
//! `v_plus`, default zero). Impulses are reported in the set's impulse
//! vector with the same sign convention as forces. Only constraints whose
//! axes are cartesian directions are supported by this path, and redundant
//! rows are disallowed, as in the forward-dynamics drivers.

use crate::error::Result;
use crate::set::ConstraintSet;
use crate::solvers::{
    range_null_basis, solve_constrained_system_direct, solve_constrained_system_null_space,
    solve_constrained_system_range_space_sparse,
};
use crate::system::calc_constraints_jacobian;
use linkage_dynamics::joint_space_inertia;
use linkage_math::DVec;
use linkage_model::Model;

fn prepare_impulse_system(model: &Model, q: &DVec, set: &mut ConstraintSet) {
    set.kin.update_position(model, q);
    joint_space_inertia(model, &set.kin, &mut set.h);
    calc_constraints_jacobian(model, q, set, false);
}

/// Resolve a collision via the full saddle-point system.
pub fn compute_constraint_impulses_direct(
    model: &Model,
    q: &DVec,
    qdot_minus: &DVec,
    set: &mut ConstraintSet,
) -> Result<DVec> {
    prepare_impulse_system(model, q, set);

    let n = model.dof_count();
    let m = set.size();
    let momentum = &set.h * qdot_minus;
    solve_constrained_system_direct(
        &set.h,
        &set.g,
        &momentum,
        &set.v_plus,
        &mut set.a,
        &mut set.b,
        &mut set.x,
        set.solver,
    )?;

    let qdot_plus = set.x.rows(0, n).into_owned();
    for i in 0..m {
        set.impulse[i] = -set.x[n + i];
    }
    Ok(qdot_plus)
}

/// Resolve a collision via the sparse range-space method.
pub fn compute_constraint_impulses_range_space_sparse(
    model: &Model,
    q: &DVec,
    qdot_minus: &DVec,
    set: &mut ConstraintSet,
) -> Result<DVec> {
    prepare_impulse_system(model, q, set);

    let mut qdot_plus = DVec::zeros(model.dof_count());
    let momentum = &set.h * qdot_minus;
    let (h, g, v_plus, impulse, k_ws, ka) = (
        &mut set.h,
        &set.g,
        &set.v_plus,
        &mut set.impulse,
        &mut set.k_ws,
        &mut set.ka,
    );
    solve_constrained_system_range_space_sparse(
        model,
        h,
        g,
        &momentum,
        v_plus,
        &mut qdot_plus,
        impulse,
        k_ws,
        ka,
        set.solver,
    )?;
    Ok(qdot_plus)
}

/// Resolve a collision via the null-space method.
pub fn compute_constraint_impulses_null_space(
    model: &Model,
    q: &DVec,
    qdot_minus: &DVec,
    set: &mut ConstraintSet,
) -> Result<DVec> {
    prepare_impulse_system(model, q, set);

    let mut qdot_plus = DVec::zeros(model.dof_count());
    let momentum = &set.h * qdot_minus;
    let (y, z) = range_null_basis(&set.g.transpose());
    solve_constrained_system_null_space(
        &set.h,
        &set.g,
        &momentum,
        &set.v_plus,
        &mut qdot_plus,
        &mut set.impulse,
        &y,
        &z,
        set.solver,
    )?;
    Ok(qdot_plus)
}
