//! Constraint registration and the bound solver workspace.
//!
//! Two-phase lifecycle: a `ConstraintSetBuilder` accepts constraint
//! registrations, then `bind` validates them against a model, allocates
//! every workspace buffer sized by (DOF count, row count), and yields a
//! `ConstraintSet`. The row structure of a bound set cannot change; only
//! the per-row scalar targets (desired acceleration, post-impact velocity)
//! may be mutated between solves. The builder stays usable (and cloneable)
//! after binding, so a fresh set can always be bound for another model.

use crate::custom::{CustomAnchor, CustomConstraint};
use crate::error::{ConstraintError, Result};
use crate::solvers::LinearSolver;
use linkage_dynamics::{ArticulatedBodyCache, Kinematics};
use linkage_math::{DMat, DVec, SpatialTransform, SpatialVec, Vec3};
use linkage_model::{Model, GROUND};

/// Kind of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Contact,
    Loop,
    Custom,
}

#[derive(Clone)]
pub(crate) struct ContactRow {
    pub row: usize,
    pub body: usize,
    pub point: Vec3,
    pub normal: Vec3,
}

#[derive(Clone)]
pub(crate) struct LoopRow {
    pub row: usize,
    pub body_pred: usize,
    pub body_succ: usize,
    pub x_pred: SpatialTransform,
    pub x_succ: SpatialTransform,
    pub axis: SpatialVec,
}

#[derive(Clone)]
pub(crate) struct CustomRow<'a> {
    pub row: usize,
    pub constraint: &'a dyn CustomConstraint,
    pub anchor: CustomAnchor,
}

/// Accumulates constraint registrations prior to binding.
///
/// Custom constraint objects are held by shared reference: the builder and
/// any bound set dispatch through them but never own them.
#[derive(Clone, Default)]
pub struct ConstraintSetBuilder<'a> {
    kinds: Vec<ConstraintKind>,
    names: Vec<Option<String>>,
    baumgarte: Vec<(f64, f64)>,
    desired_acceleration: Vec<f64>,
    contacts: Vec<ContactRow>,
    loops: Vec<LoopRow>,
    customs: Vec<CustomRow<'a>>,
    solver: LinearSolver,
}

impl<'a> ConstraintSetBuilder<'a> {
    pub fn new() -> Self {
        Self {
            kinds: Vec::new(),
            names: Vec::new(),
            baumgarte: Vec::new(),
            desired_acceleration: Vec::new(),
            contacts: Vec::new(),
            loops: Vec::new(),
            customs: Vec::new(),
            solver: LinearSolver::default(),
        }
    }

    /// Number of rows registered so far.
    pub fn row_count(&self) -> usize {
        self.kinds.len()
    }

    /// Select the dense solver used for the linear systems.
    pub fn set_solver(&mut self, solver: LinearSolver) {
        self.solver = solver;
    }

    /// Add a contact constraint: the acceleration of `point` (body
    /// coordinates) on `body` along the world-frame unit `normal` is driven
    /// to `desired_acceleration` (usually zero). Contacts act at the
    /// velocity/acceleration level only and carry no stabilization.
    ///
    /// Returns the row index.
    pub fn add_contact_constraint(
        &mut self,
        body: usize,
        point: Vec3,
        normal: Vec3,
        name: Option<&str>,
        desired_acceleration: f64,
    ) -> usize {
        let row = self.kinds.len();
        self.kinds.push(ConstraintKind::Contact);
        self.names.push(name.map(str::to_string));
        self.baumgarte.push((0.0, 0.0));
        self.desired_acceleration.push(desired_acceleration);
        self.contacts.push(ContactRow {
            row,
            body,
            point,
            normal,
        });
        row
    }

    /// Add a loop-closure constraint: the relative spatial motion of two
    /// frames (given by `x_pred` on the predecessor body and `x_succ` on the
    /// successor body) is constrained along the spatial `axis`, expressed in
    /// the predecessor constraint frame. Either body may be
    /// [`linkage_model::GROUND`] to anchor the frame to the fixed base.
    /// Baumgarte stabilization with time constant `t_stab` is applied when
    /// `stabilize` is set.
    ///
    /// Returns the row index.
    #[allow(clippy::too_many_arguments)]
    pub fn add_loop_constraint(
        &mut self,
        body_pred: usize,
        body_succ: usize,
        x_pred: SpatialTransform,
        x_succ: SpatialTransform,
        axis: SpatialVec,
        stabilize: bool,
        t_stab: f64,
        name: Option<&str>,
    ) -> usize {
        let row = self.kinds.len();
        self.kinds.push(ConstraintKind::Loop);
        self.names.push(name.map(str::to_string));
        self.baumgarte.push(Self::gains(stabilize, t_stab));
        self.desired_acceleration.push(0.0);
        self.loops.push(LoopRow {
            row,
            body_pred,
            body_succ,
            x_pred,
            x_succ,
            axis,
        });
        row
    }

    /// Add a user-defined constraint contributing `constraint.row_count()`
    /// consecutive rows; the predecessor/successor and frame fields play the
    /// same role as for loop constraints.
    ///
    /// Returns the index of the first row.
    #[allow(clippy::too_many_arguments)]
    pub fn add_custom_constraint(
        &mut self,
        constraint: &'a dyn CustomConstraint,
        body_pred: usize,
        body_succ: usize,
        x_pred: SpatialTransform,
        x_succ: SpatialTransform,
        stabilize: bool,
        t_stab: f64,
        name: Option<&str>,
    ) -> usize {
        let row = self.kinds.len();
        for _ in 0..constraint.row_count() {
            self.kinds.push(ConstraintKind::Custom);
            self.names.push(name.map(str::to_string));
            self.baumgarte.push(Self::gains(stabilize, t_stab));
            self.desired_acceleration.push(0.0);
        }
        self.customs.push(CustomRow {
            row,
            constraint,
            anchor: CustomAnchor {
                body_pred,
                body_succ,
                x_pred,
                x_succ,
            },
        });
        row
    }

    fn gains(stabilize: bool, t_stab: f64) -> (f64, f64) {
        if stabilize {
            (1.0 / t_stab, 1.0 / t_stab)
        } else {
            (0.0, 0.0)
        }
    }

    /// Validate the registered rows against `model` and allocate the solver
    /// workspace. Fails if any referenced body is out of range.
    pub fn bind(&self, model: &Model) -> Result<ConstraintSet<'a>> {
        let nb = model.bodies.len();
        // Loop and custom anchors may reference GROUND; contacts must not.
        let check = |body: usize| -> Result<()> {
            if body != GROUND && body >= nb {
                Err(ConstraintError::BodyOutOfRange {
                    body,
                    body_count: nb,
                })
            } else {
                Ok(())
            }
        };
        for c in &self.contacts {
            if c.body >= nb {
                return Err(ConstraintError::BodyOutOfRange {
                    body: c.body,
                    body_count: nb,
                });
            }
        }
        for l in &self.loops {
            check(l.body_pred)?;
            check(l.body_succ)?;
        }
        for c in &self.customs {
            check(c.anchor.body_pred)?;
            check(c.anchor.body_succ)?;
        }

        let n = model.dof_count();
        let m = self.kinds.len();

        // Per-row constraint axes; loop rows know theirs up front, contact
        // rows get the normal as a pure force direction, custom rows fill
        // theirs during Jacobian evaluation.
        let mut axis = vec![SpatialVec::zero(); m];
        for c in &self.contacts {
            axis[c.row] = SpatialVec::new(Vec3::zeros(), c.normal);
        }
        for l in &self.loops {
            axis[l.row] = l.axis;
        }

        Ok(ConstraintSet {
            kinds: self.kinds.clone(),
            names: self.names.clone(),
            baumgarte: self.baumgarte.clone(),
            contacts: self.contacts.clone(),
            loops: self.loops.clone(),
            customs: self.customs.clone(),
            solver: self.solver,
            acceleration: DVec::from_vec(self.desired_acceleration.clone()),
            v_plus: DVec::zeros(m),
            err: DVec::zeros(m),
            errd: DVec::zeros(m),
            force: DVec::zeros(m),
            impulse: DVec::zeros(m),
            axis,
            h: DMat::zeros(n, n),
            c: DVec::zeros(n),
            g: DMat::zeros(m, n),
            gamma: DVec::zeros(m),
            a: DMat::zeros(n + m, n + m),
            b: DVec::zeros(n + m),
            x: DVec::zeros(n + m),
            k_ws: DMat::zeros(m, m),
            ka: DVec::zeros(m),
            gi: DMat::zeros(3, n),
            gs_pred: DMat::zeros(6, n),
            gs_succ: DMat::zeros(6, n),
            na: 0,
            s: DMat::zeros(0, n),
            p: DMat::zeros(n, n),
            w: DMat::zeros(0, 0),
            winv: DMat::zeros(0, 0),
            a_idc: DMat::zeros(0, 0),
            b_idc: DVec::zeros(0),
            actuation_map_set: false,
            qddot_0: DVec::zeros(n),
            qddot_t: DVec::zeros(n),
            f_t: vec![SpatialVec::zero(); m],
            f_ext_constraints: vec![SpatialVec::zero(); nb],
            point_accel_0: vec![Vec3::zeros(); m],
            d_pa: vec![SpatialVec::zero(); nb],
            d_u: vec![0.0; nb],
            kin: Kinematics::new(model),
            aba: ArticulatedBodyCache::new(model),
            dof: n,
        })
    }
}

/// A bound constraint set: fixed row structure plus the mutable workspace
/// every solve overwrites in place. One logical simulation step owns the set
/// exclusively for the duration of each call.
pub struct ConstraintSet<'a> {
    pub(crate) kinds: Vec<ConstraintKind>,
    pub(crate) names: Vec<Option<String>>,
    /// Baumgarte gains (α, β) per row; (0, 0) when stabilization is off.
    pub(crate) baumgarte: Vec<(f64, f64)>,
    pub(crate) contacts: Vec<ContactRow>,
    pub(crate) loops: Vec<LoopRow>,
    pub(crate) customs: Vec<CustomRow<'a>>,
    pub(crate) solver: LinearSolver,

    /// Enforced acceleration per row (contact rows; along the normal).
    pub acceleration: DVec,
    /// Target post-impact constraint velocity per row.
    pub v_plus: DVec,

    pub(crate) err: DVec,
    pub(crate) errd: DVec,
    pub(crate) force: DVec,
    pub(crate) impulse: DVec,
    pub(crate) axis: Vec<SpatialVec>,

    // Lagrangian workspace.
    pub(crate) h: DMat,
    pub(crate) c: DVec,
    pub(crate) g: DMat,
    pub(crate) gamma: DVec,
    pub(crate) a: DMat,
    pub(crate) b: DVec,
    pub(crate) x: DVec,
    pub(crate) k_ws: DMat,
    pub(crate) ka: DVec,
    pub(crate) gi: DMat,
    pub(crate) gs_pred: DMat,
    pub(crate) gs_succ: DMat,

    // Actuation partitioning (inverse-dynamics operators).
    pub(crate) na: usize,
    pub(crate) s: DMat,
    pub(crate) p: DMat,
    pub(crate) w: DMat,
    pub(crate) winv: DMat,
    pub(crate) a_idc: DMat,
    pub(crate) b_idc: DVec,
    pub(crate) actuation_map_set: bool,

    // Recursive contact-driver workspace.
    pub(crate) qddot_0: DVec,
    pub(crate) qddot_t: DVec,
    pub(crate) f_t: Vec<SpatialVec>,
    pub(crate) f_ext_constraints: Vec<SpatialVec>,
    pub(crate) point_accel_0: Vec<Vec3>,
    pub(crate) d_pa: Vec<SpatialVec>,
    pub(crate) d_u: Vec<f64>,

    // Kinematic caches.
    pub(crate) kin: Kinematics,
    pub(crate) aba: ArticulatedBodyCache,
    pub(crate) dof: usize,
}

impl<'a> ConstraintSet<'a> {
    /// Total number of constraint rows.
    pub fn size(&self) -> usize {
        self.kinds.len()
    }

    /// Kind of row `row`.
    pub fn kind(&self, row: usize) -> ConstraintKind {
        self.kinds[row]
    }

    /// Optional name given at registration.
    pub fn name(&self, row: usize) -> Option<&str> {
        self.names[row].as_deref()
    }

    /// Select the dense solver used for the linear systems.
    pub fn set_solver(&mut self, solver: LinearSolver) {
        self.solver = solver;
    }

    /// Constraint forces from the most recent forward-dynamics solve, one
    /// per row along the row's constraint axis.
    pub fn force(&self) -> &DVec {
        &self.force
    }

    /// Constraint impulses from the most recent impulse solve.
    pub fn impulse(&self) -> &DVec {
        &self.impulse
    }

    /// Position-level constraint errors from the most recent evaluation.
    pub fn position_error(&self) -> &DVec {
        &self.err
    }

    /// Velocity-level constraint errors from the most recent evaluation.
    pub fn velocity_error(&self) -> &DVec {
        &self.errd
    }

    /// Stacked constraint Jacobian from the most recent evaluation.
    pub fn jacobian(&self) -> &DMat {
        &self.g
    }

    /// Right-hand side gamma from the most recent evaluation.
    pub fn rhs_gamma(&self) -> &DVec {
        &self.gamma
    }

    /// Zero every numeric field (errors, targets, forces, workspace) while
    /// keeping the row structure and allocations intact.
    pub fn clear(&mut self) {
        self.acceleration.fill(0.0);
        self.v_plus.fill(0.0);
        self.err.fill(0.0);
        self.errd.fill(0.0);
        self.force.fill(0.0);
        self.impulse.fill(0.0);
        self.h.fill(0.0);
        self.c.fill(0.0);
        self.g.fill(0.0);
        self.gamma.fill(0.0);
        self.a.fill(0.0);
        self.b.fill(0.0);
        self.x.fill(0.0);
        self.k_ws.fill(0.0);
        self.ka.fill(0.0);
        self.qddot_0.fill(0.0);
        self.qddot_t.fill(0.0);
        for f in &mut self.f_t {
            *f = SpatialVec::zero();
        }
        for f in &mut self.f_ext_constraints {
            *f = SpatialVec::zero();
        }
    }

    /// Partition the generalized coordinates into actuated and unactuated
    /// subspaces. Builds the selection matrices S (actuated rows) and P
    /// (unactuated rows) — stacked they form a permutation, hence an
    /// orthonormal basis — plus the workspace of the inverse-dynamics
    /// operators. Must be called before either operator; independent of the
    /// constraint rows.
    pub fn set_actuation_map(&mut self, model: &Model, actuated: &[bool]) {
        let n = model.dof_count();
        assert_eq!(
            actuated.len(),
            n,
            "actuation map must have one entry per DOF"
        );
        let na = actuated.iter().filter(|&&a| a).count();
        let nu = n - na;
        let m = self.size();

        self.na = na;
        self.s = DMat::zeros(na, n);
        self.p = DMat::zeros(nu, n);
        let (mut j, mut k) = (0, 0);
        for (i, &act) in actuated.iter().enumerate() {
            if act {
                self.s[(j, i)] = 1.0;
                j += 1;
            } else {
                self.p[(k, i)] = 1.0;
                k += 1;
            }
        }

        self.w = DMat::zeros(na, na);
        self.winv = DMat::zeros(na, na);
        self.a_idc = DMat::zeros(n + m + na, n + m + na);
        self.b_idc = DVec::zeros(n + m + na);
        self.actuation_map_set = true;
    }
}
