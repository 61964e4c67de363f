//! User-defined constraints.
//!
//! A `CustomConstraint` contributes `row_count()` consecutive rows to a
//! constraint set. Each operation writes into the caller-provided row range
//! of the shared workspace (stacked Jacobian, gamma vector, error vectors)
//! so the set's contiguous row layout is preserved; implementations must not
//! touch rows outside `row..row + row_count()`.
//!
//! Writing one of these requires a working knowledge of multibody dynamics:
//! the Jacobian is the partial derivative of the constrained quantity with
//! respect to generalized velocity, and gamma is the negative of the
//! acceleration-independent part of the constraint equation. Validate a new
//! implementation by forward-simulating a simple system and checking that
//! energy is conserved and the constraint residual stays small.

use linkage_dynamics::Kinematics;
use linkage_math::{DMat, DVec, SpatialTransform, SpatialVec};
use linkage_model::Model;

/// The bodies and body-local frames a custom constraint was registered
/// with, handed back to the object on every evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CustomAnchor {
    pub body_pred: usize,
    pub body_succ: usize,
    /// Predecessor body frame to the predecessor constraint frame.
    pub x_pred: SpatialTransform,
    /// Successor body frame to the successor constraint frame.
    pub x_succ: SpatialTransform,
}

pub trait CustomConstraint {
    /// Number of consecutive rows this constraint occupies.
    fn row_count(&self) -> usize;

    /// Write the Jacobian block into rows `row..row + row_count()` of `g`
    /// and the per-row constraint axes into `axes` (one entry per row).
    #[allow(clippy::too_many_arguments)]
    fn jacobian_and_axis(
        &self,
        model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        q: &DVec,
        g: &mut DMat,
        row: usize,
        axes: &mut [SpatialVec],
    );

    /// Write the acceleration-independent right-hand side into
    /// `gamma[row..]`. `g` holds the full stacked Jacobian (already
    /// computed); Baumgarte stabilization is applied by the caller on top of
    /// these values.
    #[allow(clippy::too_many_arguments)]
    fn gamma(
        &self,
        model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        q: &DVec,
        qdot: &DVec,
        g: &DMat,
        gamma: &mut DVec,
        row: usize,
    );

    /// Write the position-level constraint error into `err[row..]`. A
    /// velocity-level (or higher) constraint writes zeros.
    fn position_error(
        &self,
        model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        q: &DVec,
        err: &mut DVec,
        row: usize,
    );

    /// Write the velocity-level constraint error into `errd[row..]`. This is
    /// an independently computed value: for a correct implementation it
    /// equals the Jacobian block times `qdot`.
    #[allow(clippy::too_many_arguments)]
    fn velocity_error(
        &self,
        model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        q: &DVec,
        qdot: &DVec,
        g: &DMat,
        errd: &mut DVec,
        row: usize,
    );

    /// Position error used by the assembly solvers. A velocity-level
    /// constraint may override this with a distinct position-level target
    /// (e.g. bringing two rolling surfaces into contact) without changing
    /// its runtime behavior.
    fn assembly_position_error(
        &self,
        model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        q: &DVec,
        err: &mut DVec,
        row: usize,
    ) {
        self.position_error(model, kin, anchor, q, err, row);
    }

    /// Velocity error used by the velocity assembly solver, evaluated at the
    /// supplied `qdot` (the solver calls it with zeros to obtain the
    /// rheonomic offset of the velocity constraint).
    #[allow(clippy::too_many_arguments)]
    fn assembly_velocity_error(
        &self,
        model: &Model,
        kin: &Kinematics,
        anchor: &CustomAnchor,
        q: &DVec,
        qdot: &DVec,
        g: &DMat,
        errd: &mut DVec,
        row: usize,
    ) {
        self.velocity_error(model, kin, anchor, q, qdot, g, errd, row);
    }
}
