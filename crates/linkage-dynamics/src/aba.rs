//! Articulated Body Algorithm — O(n) forward dynamics.
//!
//! Three passes over the tree: velocities and bias terms, articulated
//! inertias, accelerations. All per-body intermediates are retained in an
//! [`ArticulatedBodyCache`] so callers can afterwards propagate the
//! acceleration response to a test force without re-running the algorithm.

use linkage_math::{DVec, Mat6, SpatialTransform, SpatialVec, Vec3};
use linkage_model::Model;

/// Per-body state of the most recent articulated-body pass.
#[derive(Debug, Clone)]
pub struct ArticulatedBodyCache {
    /// Parent (or base) to body transforms.
    pub x_lambda: Vec<SpatialTransform>,
    /// Base to body transforms.
    pub x_base: Vec<SpatialTransform>,
    /// Spatial velocities, body coordinates.
    pub vel: Vec<SpatialVec>,
    /// Velocity-product bias accelerations.
    pub c_bias: Vec<SpatialVec>,
    /// Articulated-body inertias (fully accumulated).
    pub ia: Vec<Mat6>,
    /// Articulated bias forces (fully accumulated).
    pub pa: Vec<SpatialVec>,
    /// U = Iᴬ S per body.
    pub u_vec: Vec<SpatialVec>,
    /// D = S·U per body.
    pub d: Vec<f64>,
    /// u = τ − S·pᴬ per body.
    pub u: Vec<f64>,
    /// Spatial accelerations of the solution, body coordinates.
    pub acc: Vec<SpatialVec>,
}

impl ArticulatedBodyCache {
    pub fn new(model: &Model) -> Self {
        let n = model.dof_count();
        Self {
            x_lambda: vec![SpatialTransform::identity(); n],
            x_base: vec![SpatialTransform::identity(); n],
            vel: vec![SpatialVec::zero(); n],
            c_bias: vec![SpatialVec::zero(); n],
            ia: vec![Mat6::zeros(); n],
            pa: vec![SpatialVec::zero(); n],
            u_vec: vec![SpatialVec::zero(); n],
            d: vec![0.0; n],
            u: vec![0.0; n],
            acc: vec![SpatialVec::zero(); n],
        }
    }
}

/// Run the articulated-body algorithm and return the joint accelerations.
///
/// `f_ext`, when given, supplies one spatial force per body in base
/// coordinates.
pub fn articulated_body_dynamics(
    model: &Model,
    q: &DVec,
    qdot: &DVec,
    tau: &DVec,
    f_ext: Option<&[SpatialVec]>,
    cache: &mut ArticulatedBodyCache,
) -> DVec {
    let n = model.dof_count();
    let mut qddot = DVec::zeros(n);

    // ── Pass 1: transforms, velocities, bias terms ──
    for i in 0..n {
        let x_joint = model.joints[i].joint_transform(q[i]);
        cache.x_lambda[i] = x_joint.compose(&model.x_tree[i]);
        let s = model.joints[i].motion_subspace();
        let v_joint = s * qdot[i];

        match model.lambda[i] {
            p if p >= 0 => {
                let pu = p as usize;
                cache.x_base[i] = cache.x_lambda[i].compose(&cache.x_base[pu]);
                cache.vel[i] = cache.x_lambda[i].apply_motion(&cache.vel[pu]) + v_joint;
            }
            _ => {
                cache.x_base[i] = cache.x_lambda[i];
                cache.vel[i] = v_joint;
            }
        }
        cache.c_bias[i] = cache.vel[i].cross_motion(&v_joint);

        cache.ia[i] = model.bodies[i].inertia.to_matrix();
        let iv = SpatialVec::from_vec6(&(cache.ia[i] * cache.vel[i].to_vec6()));
        cache.pa[i] = cache.vel[i].cross_force(&iv);
        if let Some(ext) = f_ext {
            cache.pa[i] = cache.pa[i] - cache.x_base[i].apply_force(&ext[i]);
        }
    }

    // ── Pass 2: articulated inertias and bias forces ──
    for i in (0..n).rev() {
        let s = model.joints[i].motion_subspace();
        cache.u_vec[i] = SpatialVec::from_vec6(&(cache.ia[i] * s.to_vec6()));
        cache.d[i] = s.dot(&cache.u_vec[i]);
        cache.u[i] = tau[i] - s.dot(&cache.pa[i]);

        if model.lambda[i] >= 0 && cache.d[i].abs() > 1e-14 {
            let p = model.lambda[i] as usize;
            let u6 = cache.u_vec[i].to_vec6();
            let ia_art = cache.ia[i] - (u6 * u6.transpose()) / cache.d[i];
            let pa_art = cache.pa[i]
                + SpatialVec::from_vec6(&(ia_art * cache.c_bias[i].to_vec6()))
                + cache.u_vec[i] * (cache.u[i] / cache.d[i]);

            let x = cache.x_lambda[i].to_motion_matrix();
            cache.ia[p] += x.transpose() * ia_art * x;
            cache.pa[p] = cache.pa[p] + cache.x_lambda[i].inv_apply_force(&pa_art);
        }
    }

    // ── Pass 3: accelerations ──
    let a0 = SpatialVec::new(Vec3::zeros(), -model.gravity);
    for i in 0..n {
        let a_parent = match model.lambda[i] {
            p if p >= 0 => cache.x_lambda[i].apply_motion(&cache.acc[p as usize]),
            _ => cache.x_lambda[i].apply_motion(&a0),
        };
        let a_prime = a_parent + cache.c_bias[i];
        if cache.d[i].abs() > 1e-14 {
            qddot[i] = (cache.u[i] - cache.u_vec[i].dot(&a_prime)) / cache.d[i];
        }
        cache.acc[i] = a_prime + model.joints[i].motion_subspace() * qddot[i];
    }

    qddot
}
