//! Constrained dynamics for articulated rigid-body mechanisms.
//!
//! Kinematic constraints — point contacts, loop closures, and user-defined
//! restrictions — are registered into a [`ConstraintSetBuilder`] and bound
//! to a model, yielding a [`ConstraintSet`] that owns every solver
//! workspace buffer. On top of it:
//!
//! - three interchangeable saddle-point strategies ([`solvers`])
//! - forward-dynamics drivers, including a recursive contact-only variant
//!   ([`forward`], [`kokkevis`])
//! - impulse resolution at the velocity level ([`impulse`])
//! - exact and relaxed inverse-dynamics operators ([`inverse`])
//! - position/velocity assembly solvers ([`assembly`])
//!
//! All of it is synchronous and single-threaded; a set must not be shared
//! between concurrent solves.

pub mod assembly;
pub mod custom;
pub mod error;
pub mod forward;
pub mod impulse;
pub mod inverse;
pub mod kokkevis;
pub mod set;
pub mod solvers;
pub mod system;

pub use assembly::{calc_assembly_q, calc_assembly_qdot};
pub use custom::{CustomAnchor, CustomConstraint};
pub use error::{ConstraintError, Result};
pub use forward::{
    forward_dynamics_constraints_direct, forward_dynamics_constraints_null_space,
    forward_dynamics_constraints_range_space_sparse,
};
pub use impulse::{
    compute_constraint_impulses_direct, compute_constraint_impulses_null_space,
    compute_constraint_impulses_range_space_sparse,
};
pub use inverse::{
    inverse_dynamics_constraints, inverse_dynamics_constraints_relaxed,
    is_constrained_system_fully_actuated,
};
pub use kokkevis::forward_dynamics_contacts_kokkevis;
pub use set::{ConstraintKind, ConstraintSet, ConstraintSetBuilder};
pub use solvers::{
    solve_constrained_system_direct, solve_constrained_system_null_space,
    solve_constrained_system_range_space_sparse, LinearSolver,
};
pub use system::{
    calc_constrained_system_variables, calc_constraints_jacobian,
    calc_constraints_position_error, calc_constraints_velocity_error,
};
