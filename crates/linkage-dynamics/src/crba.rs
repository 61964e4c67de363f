//! Composite Rigid Body Algorithm — joint-space inertia matrix.

use crate::Kinematics;
use linkage_math::{DMat, Mat6, SpatialVec};
use linkage_model::Model;

/// Fill `h` (dof_count x dof_count) with the joint-space inertia matrix
/// H(q). Transforms in `kin` must be current; only the position-level part
/// of the cache is read.
pub fn joint_space_inertia(model: &Model, kin: &Kinematics, h: &mut DMat) {
    let n = model.dof_count();
    h.fill(0.0);

    // Backward pass: accumulate composite inertias toward the root.
    let mut ic: Vec<Mat6> = model.bodies.iter().map(|b| b.inertia.to_matrix()).collect();
    for i in (0..n).rev() {
        if model.lambda[i] >= 0 {
            let p = model.lambda[i] as usize;
            let x = kin.x_lambda[i].to_motion_matrix();
            let ic_parent = x.transpose() * ic[i] * x;
            ic[p] += ic_parent;
        }
    }

    // H entries: diagonal from the composite inertia, off-diagonals by
    // propagating the composite force up the support chain.
    for i in 0..n {
        let s_i = model.joints[i].motion_subspace();
        let f_i = SpatialVec::from_vec6(&(ic[i] * s_i.to_vec6()));
        h[(i, i)] = s_i.dot(&f_i);

        let mut f = kin.x_lambda[i].inv_apply_force(&f_i);
        let mut j = model.lambda[i];
        while j >= 0 {
            let ju = j as usize;
            let s_j = model.joints[ju].motion_subspace();
            h[(i, ju)] = s_j.dot(&f);
            h[(ju, i)] = h[(i, ju)];
            f = kin.x_lambda[ju].inv_apply_force(&f);
            j = model.lambda[ju];
        }
    }
}
