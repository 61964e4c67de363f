//! Constraint-consistent assembly of generalized positions and velocities.
//!
//! Both solvers minimize a weighted distance from an initial guess subject
//! to the linearized constraints, via Lagrange multipliers. The weight
//! vector lets the caller hold coordinates in place (nonzero weight) or
//! leave them free (zero weight); zero weights make the top-left block
//! singular, so these systems are always solved with a full-pivot
//! decomposition regardless of the configured solver.

use crate::error::{ConstraintError, Result};
use crate::set::ConstraintSet;
use crate::solvers::{solve_linear, LinearSolver};
use crate::system::calc_constraints_jacobian;
use linkage_math::{DMat, DVec};
use linkage_model::Model;

/// Position error with custom rows delegating to their assembly variant.
fn calc_assembly_position_error(model: &Model, q: &DVec, set: &mut ConstraintSet) {
    crate::system::calc_constraints_position_error(model, q, set, false);
    for cc in &set.customs {
        cc.constraint
            .assembly_position_error(model, &set.kin, &cc.anchor, q, &mut set.err, cc.row);
    }
}

/// Iteratively compute generalized positions satisfying the position-level
/// constraints, starting from `q_init` and minimizing `(q − q_init)ᵀ W
/// (q − q_init)`. Returns the final iterate and whether the constraint
/// error norm fell below `tolerance` within `max_iter` Gauss-Newton steps;
/// on `false` the partial iterate is returned for diagnostics only.
pub fn calc_assembly_q(
    model: &Model,
    q_init: &DVec,
    set: &mut ConstraintSet,
    weights: &DVec,
    tolerance: f64,
    max_iter: usize,
) -> Result<(DVec, bool)> {
    let n = model.dof_count();
    let m = set.size();
    let mut q = q_init.clone();

    let mut a = DMat::zeros(n + m, n + m);
    let mut b = DVec::zeros(n + m);
    for i in 0..n {
        a[(i, i)] = weights[i];
    }

    for _ in 0..max_iter {
        set.kin.update_position(model, &q);
        calc_assembly_position_error(model, &q, set);
        if set.err.norm() < tolerance {
            return Ok((q, true));
        }
        calc_constraints_jacobian(model, &q, set, false);

        a.view_mut((n, 0), (m, n)).copy_from(&set.g);
        a.view_mut((0, n), (n, m)).copy_from(&set.g.transpose());
        b.rows_mut(0, n).fill(0.0);
        b.rows_mut(n, m).copy_from(&(-&set.err));

        let x = solve_linear(LinearSolver::FullPivLu, &a, &b).ok_or(
            ConstraintError::SingularSystem("solving the assembly update"),
        )?;
        q += x.rows(0, n);
    }

    Ok((q, false))
}

/// Compute generalized velocities satisfying the velocity-level constraints
/// at `q`, minimizing `(qdot − qdot_init)ᵀ W (qdot − qdot_init)`. The
/// velocity constraint is linear, so a single exact solve suffices.
pub fn calc_assembly_qdot(
    model: &Model,
    q: &DVec,
    qdot_init: &DVec,
    set: &mut ConstraintSet,
    weights: &DVec,
) -> Result<DVec> {
    let n = model.dof_count();
    let m = set.size();

    set.kin.update_position(model, q);
    calc_constraints_jacobian(model, q, set, false);

    // Rheonomic offset of the velocity constraint: custom rows may supply a
    // nonzero value through their assembly variant, evaluated at zero rate.
    let mut offset = DVec::zeros(m);
    let zero_rate = DVec::zeros(n);
    for cc in &set.customs {
        cc.constraint.assembly_velocity_error(
            model,
            &set.kin,
            &cc.anchor,
            q,
            &zero_rate,
            &set.g,
            &mut offset,
            cc.row,
        );
    }

    let mut a = DMat::zeros(n + m, n + m);
    let mut b = DVec::zeros(n + m);
    for i in 0..n {
        a[(i, i)] = weights[i];
        b[i] = weights[i] * qdot_init[i];
    }
    a.view_mut((n, 0), (m, n)).copy_from(&set.g);
    a.view_mut((0, n), (n, m)).copy_from(&set.g.transpose());
    b.rows_mut(n, m).copy_from(&(-offset));

    let x = solve_linear(LinearSolver::FullPivLu, &a, &b).ok_or(
        ConstraintError::SingularSystem("solving the velocity assembly system"),
    )?;
    Ok(x.rows(0, n).into_owned())
}
