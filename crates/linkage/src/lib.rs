//! linkage — articulated rigid-body dynamics with kinematic constraints.
//!
//! Umbrella crate re-exporting the workspace family:
//!
//! - [`linkage_math`]: spatial algebra (6D vectors, Plücker transforms)
//! - [`linkage_model`]: the joint-tree model and its builder
//! - [`linkage_dynamics`]: recursive dynamics passes (kinematics, CRBA,
//!   RNEA, ABA, branch-sparse factorization)
//! - [`linkage_constraint`]: the constrained-dynamics core (constraint
//!   sets, saddle-point solvers, forward/impulse/inverse-dynamics drivers,
//!   assembly solvers)

pub use linkage_constraint::{
    self, calc_assembly_q, calc_assembly_qdot, calc_constrained_system_variables,
    calc_constraints_jacobian, calc_constraints_position_error, calc_constraints_velocity_error,
    compute_constraint_impulses_direct, compute_constraint_impulses_null_space,
    compute_constraint_impulses_range_space_sparse, forward_dynamics_constraints_direct,
    forward_dynamics_constraints_null_space, forward_dynamics_constraints_range_space_sparse,
    forward_dynamics_contacts_kokkevis, inverse_dynamics_constraints,
    inverse_dynamics_constraints_relaxed, is_constrained_system_fully_actuated, ConstraintError,
    ConstraintKind, ConstraintSet, ConstraintSetBuilder, CustomAnchor, CustomConstraint,
    LinearSolver,
};
pub use linkage_dynamics::{
    self, articulated_body_dynamics, inverse_dynamics, joint_space_inertia, nonlinear_effects,
    ArticulatedBodyCache, Kinematics,
};
pub use linkage_math::{self, SpatialInertia, SpatialTransform, SpatialVec, Vec3, GRAVITY};
pub use linkage_model::{self, Joint, JointType, Model, ModelBuilder};
