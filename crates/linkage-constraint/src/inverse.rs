//! Inverse-dynamics operators for constrained systems, partitioned by
//! actuation (Koch 2015; Kudruss 2019).
//!
//! Both operators require [`ConstraintSet::set_actuation_map`] to have been
//! called. The exact operator is valid only when rank(G·Pᵀ) equals the
//! number of unactuated DOFs — gate it with
//! [`is_constrained_system_fully_actuated`]; the relaxed operator also
//! handles under-actuated systems but tracks the acceleration controls only
//! approximately.

use crate::error::{ConstraintError, Result};
use crate::set::ConstraintSet;
use crate::solvers::{range_null_basis, solve_linear};
use crate::system::calc_constrained_system_variables;
use linkage_math::{DMat, DVec, SpatialVec};
use linkage_model::Model;
use nalgebra::linalg::Cholesky;

/// Whether the constrained system can realize arbitrary actuated
/// accelerations: checks rank(G·Pᵀ) == n − n_actuated via singular values,
/// with cutoff `max(rows, cols) · ε · σ_max`. A relatively slow but robust
/// test — not meant to run every step.
pub fn is_constrained_system_fully_actuated(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    set: &mut ConstraintSet,
    f_ext: Option<&[SpatialVec]>,
) -> Result<bool> {
    if !set.actuation_map_set {
        return Err(ConstraintError::ActuationMapNotSet);
    }
    calc_constrained_system_variables(model, q, qdot, set, f_ext);

    let nu = model.dof_count() - set.na;
    if nu == 0 {
        return Ok(true);
    }
    let gpt = &set.g * set.p.transpose();
    let svd = gpt.clone().svd(false, false);
    let sigma_max = svd.singular_values.max();
    let eps = gpt.nrows().max(gpt.ncols()) as f64 * f64::EPSILON * sigma_max;
    Ok(svd.rank(eps) == nu)
}

/// Exact inverse dynamics: solve the augmented KKT system
///
/// ```text
/// | H  Gᵀ  Sᵀ | | qddot |   | -C        |
/// | G  0   0  | | -λ    | = | gamma     |
/// | S  0   0  | | -τ_a  |   | S·qddot*  |
/// ```
///
/// enforcing `S·qddot = S·qddot*` exactly; returns `(qddot, tau)` with
/// `tau = Sᵀ τ_a`, multipliers in the set's force vector. Undefined
/// (singular) when rank(G·Pᵀ) < n − n_actuated.
pub fn inverse_dynamics_constraints(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    qddot_desired: &DVec,
    set: &mut ConstraintSet,
    f_ext: Option<&[SpatialVec]>,
) -> Result<(DVec, DVec)> {
    if !set.actuation_map_set {
        return Err(ConstraintError::ActuationMapNotSet);
    }
    calc_constrained_system_variables(model, q, qdot, set, f_ext);

    let n = model.dof_count();
    let m = set.size();
    let na = set.na;

    set.a_idc.fill(0.0);
    set.a_idc.view_mut((0, 0), (n, n)).copy_from(&set.h);
    set.a_idc
        .view_mut((0, n), (n, m))
        .copy_from(&set.g.transpose());
    set.a_idc.view_mut((n, 0), (m, n)).copy_from(&set.g);
    set.a_idc
        .view_mut((0, n + m), (n, na))
        .copy_from(&set.s.transpose());
    set.a_idc.view_mut((n + m, 0), (na, n)).copy_from(&set.s);

    set.b_idc.rows_mut(0, n).copy_from(&(-&set.c));
    set.b_idc.rows_mut(n, m).copy_from(&set.gamma);
    set.b_idc
        .rows_mut(n + m, na)
        .copy_from(&(&set.s * qddot_desired));

    let x = solve_linear(set.solver, &set.a_idc, &set.b_idc).ok_or(
        ConstraintError::SingularSystem("solving the exact inverse-dynamics system"),
    )?;

    let qddot = x.rows(0, n).into_owned();
    for i in 0..m {
        set.force[i] = -x[n + i];
    }
    let tau = -(set.s.transpose() * x.rows(n + m, na));
    Ok((qddot, tau))
}

/// Relaxed inverse dynamics: minimize
/// `½ qddotᵀ H qddot + Cᵀ qddot + ½ (S·x − S·qddot)ᵀ W (S·x − S·qddot)`
/// subject to `G·qddot = gamma`, solved through the null-space basis of the
/// actuation-partitioned system rather than the full KKT matrix.
///
/// Works for under-actuated systems; `S·qddot` generally does not track the
/// controls `x` exactly — iterate the controls when exact tracking matters.
/// W's diagonal is scaled to 100× the largest magnitude in H to bias the
/// solution toward tracking without wrecking the conditioning, and the
/// controls are offset by `W⁻¹·S·C` to compensate the bias force on the
/// actuated subspace.
pub fn inverse_dynamics_constraints_relaxed(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    qddot_controls: &DVec,
    set: &mut ConstraintSet,
    f_ext: Option<&[SpatialVec]>,
) -> Result<(DVec, DVec)> {
    if !set.actuation_map_set {
        return Err(ConstraintError::ActuationMapNotSet);
    }
    calc_constrained_system_variables(model, q, qdot, set, f_ext);

    let n = model.dof_count();
    let m = set.size();
    let na = set.na;
    let nu = n - na;

    let scale = 100.0 * set.h.amax();
    set.w.fill(0.0);
    set.winv.fill(0.0);
    for i in 0..na {
        set.w[(i, i)] = scale;
        set.winv[(i, i)] = 1.0 / scale;
    }

    let sc = &set.s * &set.c;
    let u_star = &set.s * qddot_controls + &set.winv * &sc;

    // F = [S;P] H [S;P]ᵀ with the tracking weight on the actuated block.
    let mut f = DMat::zeros(n, n);
    f.view_mut((0, 0), (na, na))
        .copy_from(&(&set.s * &set.h * set.s.transpose() + &set.w));
    f.view_mut((0, na), (na, nu))
        .copy_from(&(&set.s * &set.h * set.p.transpose()));
    f.view_mut((na, 0), (nu, na))
        .copy_from(&(&set.p * &set.h * set.s.transpose()));
    f.view_mut((na, na), (nu, nu))
        .copy_from(&(&set.p * &set.h * set.p.transpose()));

    let mut g_vec = DVec::zeros(n);
    g_vec.rows_mut(0, na).copy_from(&(&sc - &set.w * &u_star));
    g_vec.rows_mut(na, nu).copy_from(&(&set.p * &set.c));

    // Jᵀ = [S;P] Gᵀ and its range/null basis.
    let mut jt = DMat::zeros(n, m);
    jt.view_mut((0, 0), (na, m))
        .copy_from(&(&set.s * set.g.transpose()));
    jt.view_mut((na, 0), (nu, m))
        .copy_from(&(&set.p * set.g.transpose()));
    let (y, z) = range_null_basis(&jt);
    let r = jt.clone().qr().r();

    // Rᵀ p_y = gamma.
    let p_y = r
        .transpose()
        .solve_lower_triangular(&set.gamma)
        .ok_or(ConstraintError::SingularSystem(
            "solving the relaxed range-space block",
        ))?;

    // (Zᵀ F Z) p_z = −Zᵀ F Y p_y − Zᵀ g.
    let zfz = z.transpose() * &f * &z;
    let rhs_z = -(z.transpose() * &f * &y * &p_y) - z.transpose() * &g_vec;
    let chol = Cholesky::new(zfz).ok_or(ConstraintError::SingularSystem(
        "factorizing the relaxed null-space block",
    ))?;
    let p_z = chol.solve(&rhs_z);

    let p_full = &y * &p_y + &z * &p_z;
    let qddot = set.s.transpose() * p_full.rows(0, na) + set.p.transpose() * p_full.rows(na, nu);

    // R λ = Yᵀ F p + Yᵀ g.
    let rhs_l = y.transpose() * &f * &p_full + y.transpose() * &g_vec;
    let lambda = r
        .solve_upper_triangular(&rhs_l)
        .ok_or(ConstraintError::SingularSystem(
            "recovering the relaxed multipliers",
        ))?;
    set.force.copy_from(&lambda);

    let tau = set.s.transpose() * (&set.w * (&u_star - &set.s * &qddot));
    Ok((qddot, tau))
}
