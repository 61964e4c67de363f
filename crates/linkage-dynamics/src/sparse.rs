//! Branch-sparse LᵀL factorization of the joint-space inertia matrix.
//!
//! H(q) has nonzeros only where two DOFs lie on a common path to the root,
//! and the factorization H = LᵀL can be computed walking the parent array
//! without any fill-in outside that pattern (Featherstone, "Rigid Body
//! Dynamics Algorithms", ch. 8.5). With one DOF per body, the model's
//! `lambda` array is the DOF parent array.

use linkage_math::{DMat, DVec};
use linkage_model::Model;

/// Factorize H = LᵀL in place; L is stored in the lower triangle of `h`
/// (the strict upper triangle is left untouched and must be ignored).
pub fn sparse_factorize_ltl(model: &Model, h: &mut DMat) {
    let n = model.dof_count();
    for k in (0..n).rev() {
        h[(k, k)] = h[(k, k)].sqrt();
        let mut i = model.lambda[k];
        while i >= 0 {
            h[(k, i as usize)] /= h[(k, k)];
            i = model.lambda[i as usize];
        }
        let mut i = model.lambda[k];
        while i >= 0 {
            let iu = i as usize;
            let mut j = i;
            while j >= 0 {
                let ju = j as usize;
                h[(iu, ju)] -= h[(k, iu)] * h[(k, ju)];
                j = model.lambda[ju];
            }
            i = model.lambda[iu];
        }
    }
}

/// Solve L x = b in place (`x` holds b on entry, x on exit).
pub fn sparse_solve_lx(model: &Model, l: &DMat, x: &mut DVec) {
    for i in 0..model.dof_count() {
        let mut j = model.lambda[i];
        while j >= 0 {
            let ju = j as usize;
            x[i] -= l[(i, ju)] * x[ju];
            j = model.lambda[ju];
        }
        x[i] /= l[(i, i)];
    }
}

/// Solve Lᵀ x = b in place (`x` holds b on entry, x on exit).
pub fn sparse_solve_ltx(model: &Model, l: &DMat, x: &mut DVec) {
    for i in (0..model.dof_count()).rev() {
        x[i] /= l[(i, i)];
        let mut j = model.lambda[i];
        while j >= 0 {
            let ju = j as usize;
            x[ju] -= l[(i, ju)] * x[i];
            j = model.lambda[ju];
        }
    }
}
