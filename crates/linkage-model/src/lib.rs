//! Joint-tree model for the linkage dynamics workspace.
//!
//! A `Model` is an immutable tree of rigid bodies. Every body owns exactly
//! one degree of freedom (revolute or prismatic); richer joints are built by
//! chaining single-DOF bodies, massless except for the last link, exactly as
//! a floating base is.

pub mod joint;
pub mod model;

pub use joint::{Joint, JointType};
pub use model::{Model, ModelBuilder};

/// Sentinel body id naming the fixed base, for constraints anchored to the
/// world rather than to a body.
pub const GROUND: usize = usize::MAX;
