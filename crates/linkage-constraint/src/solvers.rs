//! Solution strategies for the constrained-dynamics saddle-point system
//!
//! ```text
//! | H  Gᵀ | | qddot |   | c     |
//! | G  0  | | -λ    | = | gamma |
//! ```
//!
//! Three interchangeable strategies with different trade-offs: `direct`
//! assembles and solves the full (n+m)² system; `range_space_sparse` solves
//! for the multipliers first through a branch-sparse factorization of H;
//! `null_space` solves for the accelerations first in the null-space basis
//! of G. None dominates — the choice is the caller's, via
//! [`LinearSolver`] selection and the per-purpose driver entry points. All
//! of them require non-redundant constraint rows; a redundant set surfaces
//! as a singular factorization.

use crate::error::{ConstraintError, Result};
use linkage_dynamics::{sparse_factorize_ltl, sparse_solve_ltx, sparse_solve_lx};
use linkage_math::{DMat, DVec};
use linkage_model::Model;
use nalgebra::linalg::Cholesky;

/// Dense solver used for the general linear systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinearSolver {
    /// LU with partial pivoting — fastest, assumes a well-conditioned system.
    PartialPivLu,
    /// Householder QR.
    HouseholderQr,
    /// Column-pivoted QR — robust against near-rank-deficiency. The default.
    #[default]
    ColPivQr,
    /// LU with full pivoting — slowest, tolerates singular blocks.
    FullPivLu,
}

/// Solve `a x = b` with the selected decomposition.
pub(crate) fn solve_linear(solver: LinearSolver, a: &DMat, b: &DVec) -> Option<DVec> {
    match solver {
        LinearSolver::PartialPivLu => a.clone().lu().solve(b),
        LinearSolver::HouseholderQr => a.clone().qr().solve(b),
        LinearSolver::ColPivQr => a.clone().col_piv_qr().solve(b),
        LinearSolver::FullPivLu => a.clone().full_piv_lu().solve(b),
    }
}

/// Assemble and solve the full saddle-point system; on return `x` holds
/// `[qddot; -λ]`. `a` and `b` are caller-owned workspace of size
/// (n+m)² and n+m.
pub fn solve_constrained_system_direct(
    h: &DMat,
    g: &DMat,
    c: &DVec,
    gamma: &DVec,
    a: &mut DMat,
    b: &mut DVec,
    x: &mut DVec,
    solver: LinearSolver,
) -> Result<()> {
    let n = h.nrows();
    let m = g.nrows();

    a.fill(0.0);
    a.view_mut((0, 0), (n, n)).copy_from(h);
    a.view_mut((0, n), (n, m)).copy_from(&g.transpose());
    a.view_mut((n, 0), (m, n)).copy_from(g);
    b.rows_mut(0, n).copy_from(c);
    b.rows_mut(n, m).copy_from(gamma);

    let sol = solve_linear(solver, a, b)
        .ok_or(ConstraintError::SingularSystem("solving the direct system"))?;
    x.copy_from(&sol);
    Ok(())
}

/// Solve for the multipliers first: `(G H⁻¹ Gᵀ) λ = gamma − G H⁻¹ c`, then
/// recover `qddot = H⁻¹(c + Gᵀ λ)`.
///
/// `H⁻¹` is never formed: `h` is factorized in place as H = LᵀL by the
/// branch-sparsity-preserving factorization, and every application of H⁻¹
/// is a pair of sparse triangular solves. Preferred when the DOF count is
/// large relative to the constraint count and the tree is sparse.
#[allow(clippy::too_many_arguments)]
pub fn solve_constrained_system_range_space_sparse(
    model: &Model,
    h: &mut DMat,
    g: &DMat,
    c: &DVec,
    gamma: &DVec,
    qddot: &mut DVec,
    lambda: &mut DVec,
    k: &mut DMat,
    a: &mut DVec,
    solver: LinearSolver,
) -> Result<()> {
    let m = g.nrows();

    sparse_factorize_ltl(model, h);

    // Y = L⁻ᵀ Gᵀ, column by column.
    let mut y = DMat::zeros(g.ncols(), m);
    for j in 0..m {
        let mut col = g.row(j).transpose().into_owned();
        sparse_solve_ltx(model, h, &mut col);
        y.set_column(j, &col);
    }

    let mut z = c.clone();
    sparse_solve_ltx(model, h, &mut z);

    // K = Yᵀ Y = G H⁻¹ Gᵀ,  a = gamma − G H⁻¹ c.
    *k = y.transpose() * &y;
    *a = gamma - y.transpose() * z;

    let lam = solve_linear(solver, k, a).ok_or(ConstraintError::SingularSystem(
        "solving for the range-space multipliers",
    ))?;
    lambda.copy_from(&lam);

    let mut rhs = c + g.transpose() * &lam;
    sparse_solve_ltx(model, h, &mut rhs);
    sparse_solve_lx(model, h, &mut rhs);
    qddot.copy_from(&rhs);
    Ok(())
}

/// Solve for the accelerations first in the basis `Gᵀ = [Y Z]·[R; 0]`
/// (G·Z = 0): `Rᵀ qddot_y = gamma`, then `(Zᵀ H Z) qddot_z = Zᵀ(c − H Y
/// qddot_y)`, then `qddot = Y qddot_y + Z qddot_z`, and finally the
/// multipliers from the range-space residual `(Yᵀ Gᵀ) λ = Yᵀ(H qddot − c)`.
///
/// Cost is dominated by the (n−m)² factorization, cheaper than `direct`
/// when m is a sizeable fraction of n.
#[allow(clippy::too_many_arguments)]
pub fn solve_constrained_system_null_space(
    h: &DMat,
    g: &DMat,
    c: &DVec,
    gamma: &DVec,
    qddot: &mut DVec,
    lambda: &mut DVec,
    y: &DMat,
    z: &DMat,
    solver: LinearSolver,
) -> Result<()> {
    let gy = g * y;
    let qddot_y = solve_linear(solver, &gy, gamma).ok_or(ConstraintError::SingularSystem(
        "solving the range-space block",
    ))?;

    let zthz = z.transpose() * h * z;
    let rhs_z = z.transpose() * (c - h * y * &qddot_y);
    let chol = Cholesky::new(zthz).ok_or(ConstraintError::SingularSystem(
        "factorizing the null-space reduced inertia",
    ))?;
    let qddot_z = chol.solve(&rhs_z);

    *qddot = y * &qddot_y + z * qddot_z;

    let ygt = y.transpose() * g.transpose();
    let rhs_l = y.transpose() * (h * &*qddot - c);
    let lam = solve_linear(solver, &ygt, &rhs_l).ok_or(ConstraintError::SingularSystem(
        "recovering the null-space multipliers",
    ))?;
    lambda.copy_from(&lam);
    Ok(())
}

/// Full orthogonal basis of a QR decomposition of `gt` (n×m, n ≥ m): the
/// first m columns span the range of `gt`, the rest its orthogonal
/// complement (the null space of G).
pub(crate) fn range_null_basis(gt: &DMat) -> (DMat, DMat) {
    let n = gt.nrows();
    let m = gt.ncols();
    let qr = gt.clone().qr();
    let mut q_t = DMat::identity(n, n);
    qr.q_tr_mul(&mut q_t);
    let q = q_t.transpose();
    (q.columns(0, m).into_owned(), q.columns(m, n - m).into_owned())
}
