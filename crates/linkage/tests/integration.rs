//! Integration tests for the constrained-dynamics workspace.

use approx::assert_relative_eq;
use linkage::{
    calc_assembly_q, calc_assembly_qdot, calc_constraints_position_error,
    compute_constraint_impulses_direct, compute_constraint_impulses_null_space,
    compute_constraint_impulses_range_space_sparse, forward_dynamics_constraints_direct,
    forward_dynamics_constraints_null_space, forward_dynamics_constraints_range_space_sparse,
    forward_dynamics_contacts_kokkevis, inverse_dynamics_constraints,
    inverse_dynamics_constraints_relaxed, is_constrained_system_fully_actuated,
    linkage_dynamics::{
        point_acceleration, point_acceleration_6d, point_jacobian_6d, point_to_base,
        point_velocity, Kinematics,
    },
    linkage_math::{DMat, DVec},
    linkage_model::GROUND,
    ConstraintError, ConstraintSetBuilder, CustomAnchor, CustomConstraint, Model, ModelBuilder,
    SpatialInertia, SpatialTransform, SpatialVec, Vec3,
};

/// Two identical 1 m rods hanging along -Y, both revolute about Z.
fn make_double_pendulum() -> Model {
    let inertia = SpatialInertia::rod_y(1.0, 1.0, Vec3::new(0.0, -0.5, 0.0));
    ModelBuilder::new()
        .add_revolute_body("link1", -1, SpatialTransform::identity(), Vec3::z(), inertia)
        .add_revolute_body(
            "link2",
            0,
            SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0)),
            Vec3::z(),
            inertia,
        )
        .build()
}

/// Three-link chain of the same rods.
fn make_triple_pendulum() -> Model {
    let inertia = SpatialInertia::rod_y(1.0, 1.0, Vec3::new(0.0, -0.5, 0.0));
    let step = SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0));
    ModelBuilder::new()
        .add_revolute_body("link1", -1, SpatialTransform::identity(), Vec3::z(), inertia)
        .add_revolute_body("link2", 0, step, Vec3::z(), inertia)
        .add_revolute_body("link3", 1, step, Vec3::z(), inertia)
        .build()
}

/// Cart on a prismatic X joint carrying a rod pendulum, for the
/// actuation-partitioned operators.
fn make_cart_pole() -> Model {
    ModelBuilder::new()
        .add_prismatic_body(
            "cart",
            -1,
            SpatialTransform::identity(),
            Vec3::x(),
            SpatialInertia::point_mass(2.0, Vec3::zeros()),
        )
        .add_revolute_body(
            "pole",
            0,
            SpatialTransform::identity(),
            Vec3::z(),
            SpatialInertia::rod_y(1.0, 1.0, Vec3::new(0.0, -0.5, 0.0)),
        )
        .build()
}

/// Constraint residual ‖G·qddot − gamma‖ of the most recent evaluation.
fn constraint_residual(set: &linkage::ConstraintSet, qddot: &DVec) -> f64 {
    (set.jacobian() * qddot - set.rhs_gamma()).norm()
}

#[test]
fn forward_strategies_satisfy_constraint_equation() {
    let model = make_double_pendulum();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(1, Vec3::new(0.0, -1.0, 0.0), Vec3::x(), Some("tip"), 0.0);
    let mut set = builder.bind(&model).expect("bind");

    let q = DVec::from_vec(vec![0.3, -0.2]);
    let qdot = DVec::from_vec(vec![0.1, 0.4]);
    let tau = DVec::from_vec(vec![0.5, -0.1]);

    let qddot_d =
        forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set, None).unwrap();
    assert!(
        constraint_residual(&set, &qddot_d) < 1e-9,
        "direct residual {:.2e}",
        constraint_residual(&set, &qddot_d),
    );

    let qddot_r =
        forward_dynamics_constraints_range_space_sparse(&model, &q, &qdot, &tau, &mut set, None)
            .unwrap();
    assert!(
        constraint_residual(&set, &qddot_r) < 1e-9,
        "range-space residual {:.2e}",
        constraint_residual(&set, &qddot_r),
    );

    let qddot_n =
        forward_dynamics_constraints_null_space(&model, &q, &qdot, &tau, &mut set, None).unwrap();
    assert!(
        constraint_residual(&set, &qddot_n) < 1e-9,
        "null-space residual {:.2e}",
        constraint_residual(&set, &qddot_n),
    );
}

#[test]
fn forward_strategies_agree() {
    let model = make_double_pendulum();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(1, Vec3::new(0.0, -1.0, 0.0), Vec3::x(), None, 0.0);
    let mut set = builder.bind(&model).expect("bind");

    let q = DVec::from_vec(vec![0.3, -0.2]);
    let qdot = DVec::from_vec(vec![0.1, 0.4]);
    let tau = DVec::from_vec(vec![0.5, -0.1]);

    let qddot_d =
        forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set, None).unwrap();
    let force_d = set.force().clone();
    let qddot_r =
        forward_dynamics_constraints_range_space_sparse(&model, &q, &qdot, &tau, &mut set, None)
            .unwrap();
    let force_r = set.force().clone();
    let qddot_n =
        forward_dynamics_constraints_null_space(&model, &q, &qdot, &tau, &mut set, None).unwrap();
    let force_n = set.force().clone();

    for i in 0..model.dof_count() {
        assert_relative_eq!(qddot_d[i], qddot_r[i], max_relative = 1e-6, epsilon = 1e-9);
        assert_relative_eq!(qddot_d[i], qddot_n[i], max_relative = 1e-6, epsilon = 1e-9);
    }
    assert_relative_eq!(force_d[0], force_r[0], max_relative = 1e-6, epsilon = 1e-9);
    assert_relative_eq!(force_d[0], force_n[0], max_relative = 1e-6, epsilon = 1e-9);
}

#[test]
fn mixed_loop_and_contact_strategies_agree() {
    let model = make_triple_pendulum();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(1, Vec3::new(0.0, -1.0, 0.0), Vec3::x(), None, 0.0);
    builder.add_loop_constraint(
        GROUND,
        2,
        SpatialTransform::translation(Vec3::new(0.0, -3.0, 0.0)),
        SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0)),
        SpatialVec::new(Vec3::zeros(), Vec3::x()),
        false,
        0.1,
        Some("tip-on-rail"),
    );
    let mut set = builder.bind(&model).expect("bind");

    let q = DVec::from_vec(vec![0.3, -0.2, 0.1]);
    let qdot = DVec::from_vec(vec![0.1, -0.3, 0.2]);
    let tau = DVec::from_vec(vec![0.2, 0.0, -0.1]);

    let qddot_d =
        forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set, None).unwrap();
    let force_d = set.force().clone();
    assert!(constraint_residual(&set, &qddot_d) < 1e-9);

    let qddot_r =
        forward_dynamics_constraints_range_space_sparse(&model, &q, &qdot, &tau, &mut set, None)
            .unwrap();
    let force_r = set.force().clone();
    let qddot_n =
        forward_dynamics_constraints_null_space(&model, &q, &qdot, &tau, &mut set, None).unwrap();
    let force_n = set.force().clone();

    for i in 0..model.dof_count() {
        assert_relative_eq!(qddot_d[i], qddot_r[i], max_relative = 1e-6, epsilon = 1e-9);
        assert_relative_eq!(qddot_d[i], qddot_n[i], max_relative = 1e-6, epsilon = 1e-9);
    }
    for i in 0..set.size() {
        assert_relative_eq!(force_d[i], force_r[i], max_relative = 1e-6, epsilon = 1e-9);
        assert_relative_eq!(force_d[i], force_n[i], max_relative = 1e-6, epsilon = 1e-9);
    }
}

#[test]
fn contact_desired_acceleration_is_enforced() {
    let model = make_double_pendulum();
    let tip = Vec3::new(0.0, -1.0, 0.0);
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(1, tip, Vec3::x(), None, 1.5);
    let mut set = builder.bind(&model).expect("bind");

    let q = DVec::from_vec(vec![0.2, 0.1]);
    let qdot = DVec::from_vec(vec![-0.3, 0.2]);
    let tau = DVec::zeros(2);
    let qddot =
        forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set, None).unwrap();

    // Recompute the tip acceleration kinematically from the solution; its
    // normal component must equal the enforced value.
    let mut kin = Kinematics::new(&model);
    kin.update_velocity(&model, &q, &qdot);
    kin.update_acceleration(&model, &qdot, &qddot);
    let accel = point_acceleration(&kin, 1, &tip);
    assert_relative_eq!(accel.x, 1.5, epsilon = 1e-9);
}

#[test]
fn impulse_strategies_stop_resting_contact() {
    let model = make_double_pendulum();
    let tip = Vec3::new(0.0, -1.0, 0.0);
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(1, tip, Vec3::x(), None, 0.0);
    let mut set = builder.bind(&model).expect("bind");

    let q = DVec::zeros(2);
    // Both joints swinging the tip into the surface along +X.
    let qdot_minus = DVec::from_vec(vec![1.0, 0.5]);

    let qdot_d = compute_constraint_impulses_direct(&model, &q, &qdot_minus, &mut set).unwrap();
    let imp_d = set.impulse().clone();
    let qdot_r =
        compute_constraint_impulses_range_space_sparse(&model, &q, &qdot_minus, &mut set).unwrap();
    let imp_r = set.impulse().clone();
    let qdot_n =
        compute_constraint_impulses_null_space(&model, &q, &qdot_minus, &mut set).unwrap();
    let imp_n = set.impulse().clone();

    let mut kin = Kinematics::new(&model);
    for qdot_plus in [&qdot_d, &qdot_r, &qdot_n] {
        kin.update_velocity(&model, &q, qdot_plus);
        let v = point_velocity(&kin, 1, &tip);
        assert!(
            v.x.abs() < 1e-9,
            "post-impact normal velocity {:.2e} should vanish",
            v.x,
        );
    }
    assert_relative_eq!(imp_d[0], imp_r[0], max_relative = 1e-6, epsilon = 1e-9);
    assert_relative_eq!(imp_d[0], imp_n[0], max_relative = 1e-6, epsilon = 1e-9);
}

#[test]
fn velocity_assembly_residual_is_exactly_zero() {
    let model = make_double_pendulum();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_loop_constraint(
        GROUND,
        1,
        SpatialTransform::translation(Vec3::new(0.0, -2.0, 0.0)),
        SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0)),
        SpatialVec::new(Vec3::zeros(), Vec3::x()),
        false,
        0.1,
        None,
    );
    let mut set = builder.bind(&model).expect("bind");

    let q = DVec::from_vec(vec![0.4, -0.3]);
    let qdot_init = DVec::from_vec(vec![1.0, 0.5]);
    let weights = DVec::from_vec(vec![1.0, 1.0]);
    let qdot = calc_assembly_qdot(&model, &q, &qdot_init, &mut set, &weights).unwrap();

    // One exact linear solve, so the Jacobian residual sits at floating-point
    // noise rather than at an iteration tolerance.
    let residual = (set.jacobian() * &qdot).norm();
    assert!(residual < 1e-12, "velocity residual {:.2e}", residual);
}

#[test]
fn position_assembly_converges_and_respects_weights() {
    let model = make_double_pendulum();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_loop_constraint(
        GROUND,
        1,
        SpatialTransform::translation(Vec3::new(0.0, -2.0, 0.0)),
        SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0)),
        SpatialVec::new(Vec3::zeros(), Vec3::x()),
        false,
        0.1,
        None,
    );
    let mut set = builder.bind(&model).expect("bind");

    // Weight 0 leaves the first coordinate free; weight 1 holds the second at
    // its initial value, so the solver must close the loop with q[0] alone.
    let q_init = DVec::from_vec(vec![0.3, -0.2]);
    let weights = DVec::from_vec(vec![0.0, 1.0]);
    let (q, converged) = calc_assembly_q(&model, &q_init, &mut set, &weights, 1e-12, 100).unwrap();
    assert!(converged, "assembly did not converge, q = {:?}", q);
    assert_relative_eq!(q[1], q_init[1], epsilon = 1e-9);

    calc_constraints_position_error(&model, &q, &mut set, true);
    assert!(
        set.position_error()[0].abs() < 1e-10,
        "assembled position error {:.2e}",
        set.position_error()[0],
    );
}

#[test]
fn baumgarte_stabilization_decays_loop_error() {
    // A single rod pinned to a vertical rail through its tip: at q = 0.3 the
    // loop constraint is violated by sin(0.3) along X. The stabilized set
    // must pull the error to zero at the configured time constant; the
    // unstabilized set, starting at rest, must leave it untouched.
    let model = ModelBuilder::new()
        .add_revolute_body(
            "rod",
            -1,
            SpatialTransform::identity(),
            Vec3::z(),
            SpatialInertia::rod_y(1.0, 1.0, Vec3::new(0.0, -0.5, 0.0)),
        )
        .build();
    let x_rail = SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0));
    let x_tip = SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0));
    let axis = SpatialVec::new(Vec3::zeros(), Vec3::x());

    let run = |stabilize: bool| -> (f64, f64) {
        let mut builder = ConstraintSetBuilder::new();
        builder.add_loop_constraint(GROUND, 0, x_rail, x_tip, axis, stabilize, 0.1, None);
        let mut set = builder.bind(&model).expect("bind");

        let mut q = DVec::from_element(1, 0.3);
        let mut qdot = DVec::zeros(1);
        let tau = DVec::zeros(1);
        let dt = 1e-3;
        let mut err0 = 0.0;
        for step in 0..1000 {
            let qddot =
                forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set, None)
                    .unwrap();
            if step == 0 {
                err0 = set.position_error()[0];
            }
            qdot += qddot * dt;
            q += &qdot * dt;
        }
        calc_constraints_position_error(&model, &q, &mut set, true);
        (err0, set.position_error()[0])
    };

    let (err0, err_end) = run(true);
    assert_relative_eq!(err0, 0.3_f64.sin(), epsilon = 1e-12);
    // Ten time constants of critically damped decay leave well under 2%.
    assert!(
        err_end.abs() < 0.02 * err0.abs(),
        "stabilized error {:.2e} did not decay from {:.2e}",
        err_end,
        err0,
    );

    let (err0, err_end) = run(false);
    assert!(
        (err_end - err0).abs() < 1e-9,
        "unstabilized error moved from {:.2e} to {:.2e}",
        err0,
        err_end,
    );
}

#[test]
fn kokkevis_matches_lagrangian_contact_dynamics() {
    let model = make_double_pendulum();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(0, Vec3::new(0.0, -1.0, 0.0), Vec3::x(), None, 0.0);
    builder.add_contact_constraint(1, Vec3::new(0.0, -1.0, 0.0), Vec3::x(), None, 0.0);
    let mut set = builder.bind(&model).expect("bind");

    let q = DVec::from_vec(vec![0.2, -0.1]);
    let qdot = DVec::from_vec(vec![0.3, 0.1]);
    let tau = DVec::from_vec(vec![0.4, -0.2]);

    let qddot_k = forward_dynamics_contacts_kokkevis(&model, &q, &qdot, &tau, &mut set).unwrap();
    let force_k = set.force().clone();
    let qddot_d =
        forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set, None).unwrap();
    let force_d = set.force().clone();

    for i in 0..model.dof_count() {
        assert_relative_eq!(qddot_k[i], qddot_d[i], max_relative = 1e-6, epsilon = 1e-8);
    }
    for i in 0..set.size() {
        assert_relative_eq!(force_k[i], force_d[i], max_relative = 1e-6, epsilon = 1e-8);
    }
}

/// A world-anchored reimplementation of one loop-constraint row, exercising
/// the custom-constraint contract against the built-in implementation.
struct WorldAxisConstraint {
    axis: SpatialVec,
}

impl WorldAxisConstraint {
    fn axis_in_base(&self, anchor: &CustomAnchor) -> SpatialVec {
        SpatialVec::new(
            anchor.x_pred.rot.transpose() * self.axis.ang,
            anchor.x_pred.rot.transpose() * self.axis.lin,
        )
    }
}

impl CustomConstraint for WorldAxisConstraint {
    fn row_count(&self) -> usize {
        1
    }

    fn jacobian_and_axis(
        &self,
        model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        _q: &DVec,
        g: &mut DMat,
        row: usize,
        axes: &mut [SpatialVec],
    ) {
        let n = model.dof_count();
        let mut js = DMat::zeros(6, n);
        point_jacobian_6d(model, kin, anchor.body_succ, &anchor.x_succ.pos, &mut js);
        let a6 = self.axis_in_base(anchor).to_vec6();
        for j in 0..n {
            let mut v = 0.0;
            for k in 0..6 {
                v += a6[k] * js[(k, j)];
            }
            g[(row, j)] = v;
        }
        axes[0] = self.axis;
    }

    fn gamma(
        &self,
        _model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        _q: &DVec,
        _qdot: &DVec,
        _g: &DMat,
        gamma: &mut DVec,
        row: usize,
    ) {
        let acc = point_acceleration_6d(kin, anchor.body_succ, &anchor.x_succ.pos);
        gamma[row] = -self.axis_in_base(anchor).dot(&acc);
    }

    fn position_error(
        &self,
        _model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        _q: &DVec,
        err: &mut DVec,
        row: usize,
    ) {
        let pos = point_to_base(kin, anchor.body_succ, &anchor.x_succ.pos);
        err[row] = self.axis.lin.dot(&(anchor.x_pred.rot * (pos - anchor.x_pred.pos)));
    }

    fn velocity_error(
        &self,
        model: &Model,
        _kin: &Kinematics,
        _anchor: &CustomAnchor,
        _q: &DVec,
        qdot: &DVec,
        g: &DMat,
        errd: &mut DVec,
        row: usize,
    ) {
        let mut v = 0.0;
        for j in 0..model.dof_count() {
            v += g[(row, j)] * qdot[j];
        }
        errd[row] = v;
    }
}

#[test]
fn custom_constraint_reproduces_builtin_loop() {
    let model = make_double_pendulum();
    let x_pred = SpatialTransform::translation(Vec3::new(0.0, -2.0, 0.0));
    let x_succ = SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0));
    let axis = SpatialVec::new(Vec3::zeros(), Vec3::x());

    let custom = WorldAxisConstraint { axis };
    let mut builder_loop = ConstraintSetBuilder::new();
    builder_loop.add_loop_constraint(GROUND, 1, x_pred, x_succ, axis, false, 0.1, None);
    let mut set_loop = builder_loop.bind(&model).expect("bind");

    let mut builder_custom = ConstraintSetBuilder::new();
    builder_custom.add_custom_constraint(&custom, GROUND, 1, x_pred, x_succ, false, 0.1, None);
    let mut set_custom = builder_custom.bind(&model).expect("bind");

    let q = DVec::from_vec(vec![0.25, -0.15]);
    let qdot = DVec::from_vec(vec![0.5, -0.2]);
    let tau = DVec::from_vec(vec![0.3, 0.1]);

    let qddot_loop =
        forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set_loop, None).unwrap();
    let qddot_custom =
        forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set_custom, None)
            .unwrap();

    for i in 0..model.dof_count() {
        assert_relative_eq!(qddot_loop[i], qddot_custom[i], epsilon = 1e-10);
    }
    assert_relative_eq!(set_loop.force()[0], set_custom.force()[0], epsilon = 1e-10);
    assert_relative_eq!(
        set_loop.position_error()[0],
        set_custom.position_error()[0],
        epsilon = 1e-12
    );
    assert_relative_eq!(
        set_loop.velocity_error()[0],
        set_custom.velocity_error()[0],
        epsilon = 1e-12
    );
}

#[test]
fn actuation_rank_gating_and_relaxed_fallback() {
    // Constraining the cart itself leaves the pole's DOF untouched by the
    // constraint forces: G·Pᵀ = 0, so the exact operator has no leverage
    // over the unactuated coordinate.
    let model = make_cart_pole();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(0, Vec3::zeros(), Vec3::x(), None, 0.0);
    let mut set = builder.bind(&model).expect("bind");
    set.set_actuation_map(&model, &[true, false]);

    let q = DVec::from_vec(vec![0.0, 0.1]);
    let qdot = DVec::from_vec(vec![0.0, 0.2]);

    let actuated = is_constrained_system_fully_actuated(&model, &q, &qdot, &mut set, None).unwrap();
    assert!(!actuated, "rank-deficient G·Pᵀ must gate the exact operator");

    // The relaxed operator still produces a finite, constraint-satisfying
    // solution for the same pair.
    let controls = DVec::from_vec(vec![1.0, 0.0]);
    let (qddot, tau) =
        inverse_dynamics_constraints_relaxed(&model, &q, &qdot, &controls, &mut set, None).unwrap();
    assert!(qddot.iter().all(|v| v.is_finite()));
    assert!(tau.iter().all(|v| v.is_finite()));
    assert!(
        constraint_residual(&set, &qddot) < 1e-8,
        "relaxed residual {:.2e}",
        constraint_residual(&set, &qddot),
    );
    // Torque lives in the actuated subspace only.
    assert_relative_eq!(tau[1], 0.0, epsilon = 1e-12);
}

#[test]
fn exact_inverse_dynamics_round_trip() {
    // Pin the pole tip to a rail instead: the constraint now couples into
    // the unactuated DOF and the exact operator applies.
    let model = make_cart_pole();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(1, Vec3::new(0.0, -1.0, 0.0), Vec3::x(), None, 0.0);
    let mut set = builder.bind(&model).expect("bind");
    set.set_actuation_map(&model, &[true, false]);

    let q = DVec::from_vec(vec![0.1, 0.2]);
    let qdot = DVec::from_vec(vec![0.3, -0.1]);

    let actuated = is_constrained_system_fully_actuated(&model, &q, &qdot, &mut set, None).unwrap();
    assert!(actuated);

    let qddot_desired = DVec::from_vec(vec![1.0, 0.0]);
    let (qddot_id, tau_id) =
        inverse_dynamics_constraints(&model, &q, &qdot, &qddot_desired, &mut set, None).unwrap();

    // Actuated accelerations are tracked exactly; torque is purely actuated.
    assert_relative_eq!(qddot_id[0], qddot_desired[0], epsilon = 1e-9);
    assert_relative_eq!(tau_id[1], 0.0, epsilon = 1e-12);
    assert!(constraint_residual(&set, &qddot_id) < 1e-9);

    // Feeding the torques back through constrained forward dynamics must
    // reproduce the same accelerations.
    let qddot_fd =
        forward_dynamics_constraints_direct(&model, &q, &qdot, &tau_id, &mut set, None).unwrap();
    for i in 0..model.dof_count() {
        assert_relative_eq!(qddot_fd[i], qddot_id[i], max_relative = 1e-6, epsilon = 1e-8);
    }
}

#[test]
fn bind_rejects_out_of_range_bodies() {
    let model = make_double_pendulum();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(5, Vec3::zeros(), Vec3::x(), None, 0.0);
    match builder.bind(&model) {
        Err(ConstraintError::BodyOutOfRange { body, body_count }) => {
            assert_eq!(body, 5);
            assert_eq!(body_count, 2);
        }
        other => panic!("expected BodyOutOfRange, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn clear_zeroes_solution_fields() {
    let model = make_double_pendulum();
    let mut builder = ConstraintSetBuilder::new();
    builder.add_contact_constraint(1, Vec3::new(0.0, -1.0, 0.0), Vec3::x(), None, 0.0);
    let mut set = builder.bind(&model).expect("bind");

    let q = DVec::from_vec(vec![0.3, -0.2]);
    let qdot = DVec::from_vec(vec![0.1, 0.4]);
    let tau = DVec::from_vec(vec![0.5, -0.1]);
    forward_dynamics_constraints_direct(&model, &q, &qdot, &tau, &mut set, None).unwrap();
    assert!(set.force()[0].abs() > 0.0);

    set.clear();
    assert_eq!(set.force()[0], 0.0);
    assert_eq!(set.position_error()[0], 0.0);
    assert_eq!(set.size(), 1, "clear keeps the row structure");
}
