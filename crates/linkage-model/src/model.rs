//! Model definition — immutable description of the joint tree.

use crate::Joint;
use linkage_math::{SpatialInertia, SpatialTransform, Vec3, GRAVITY};

/// A rigid body in the tree.
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    /// Spatial inertia in the body's own frame.
    pub inertia: SpatialInertia,
}

/// Immutable joint-tree model.
///
/// Bodies are indexed 0..n in topological order (a parent always precedes
/// its children). Body i is connected to its parent by joint i and owns
/// generalized coordinate i, so `dof_count() == bodies.len()`.
#[derive(Debug, Clone)]
pub struct Model {
    pub bodies: Vec<Body>,
    pub joints: Vec<Joint>,
    /// Parent body index per body; -1 for bodies attached to the base.
    pub lambda: Vec<i32>,
    /// Children body indices per body.
    pub mu: Vec<Vec<usize>>,
    /// Fixed tree transform per body: parent body frame to joint frame.
    pub x_tree: Vec<SpatialTransform>,
    /// Gravity in base coordinates.
    pub gravity: Vec3,
}

impl Model {
    /// Number of generalized coordinates (= number of bodies).
    #[inline]
    pub fn dof_count(&self) -> usize {
        self.bodies.len()
    }

    /// Look up a body index by name.
    pub fn body_id(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name == name)
    }
}

/// Builder for joint-tree models. Bodies must be added parents-first.
pub struct ModelBuilder {
    bodies: Vec<Body>,
    joints: Vec<Joint>,
    lambda: Vec<i32>,
    x_tree: Vec<SpatialTransform>,
    gravity: Vec3,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            joints: Vec::new(),
            lambda: Vec::new(),
            x_tree: Vec::new(),
            gravity: Vec3::new(0.0, -GRAVITY, 0.0),
        }
    }

    /// Set the gravity vector (base coordinates).
    pub fn gravity(mut self, g: Vec3) -> Self {
        self.gravity = g;
        self
    }

    /// Add a body connected by an arbitrary single-DOF joint.
    ///
    /// `parent` is the index of the parent body, or -1 for the base.
    /// `x_tree` is the fixed transform from the parent body frame to the
    /// joint frame. The new body's index is the current body count.
    pub fn add_body(
        mut self,
        name: &str,
        parent: i32,
        x_tree: SpatialTransform,
        joint: Joint,
        inertia: SpatialInertia,
    ) -> Self {
        assert!(
            parent < self.bodies.len() as i32,
            "parent {} added after child",
            parent
        );
        self.bodies.push(Body {
            name: name.to_string(),
            inertia,
        });
        self.joints.push(joint);
        self.lambda.push(parent);
        self.x_tree.push(x_tree);
        self
    }

    /// Add a body with a revolute joint about `axis`.
    pub fn add_revolute_body(
        self,
        name: &str,
        parent: i32,
        x_tree: SpatialTransform,
        axis: Vec3,
        inertia: SpatialInertia,
    ) -> Self {
        self.add_body(name, parent, x_tree, Joint::revolute(axis), inertia)
    }

    /// Add a body with a prismatic joint along `axis`.
    pub fn add_prismatic_body(
        self,
        name: &str,
        parent: i32,
        x_tree: SpatialTransform,
        axis: Vec3,
        inertia: SpatialInertia,
    ) -> Self {
        self.add_body(name, parent, x_tree, Joint::prismatic(axis), inertia)
    }

    /// Add a six-DOF floating base as a chain of three prismatic and three
    /// revolute joints (tx ty tz, rz ry rx); only the last link carries the
    /// body's inertia. Returns the builder; the floating body's index is the
    /// current body count plus five.
    pub fn add_floating_base(mut self, name: &str, inertia: SpatialInertia) -> Self {
        let base = self.bodies.len() as i32;
        let id = SpatialTransform::identity();
        let chain: [(&str, Joint); 5] = [
            ("_tx", Joint::prismatic(Vec3::x())),
            ("_ty", Joint::prismatic(Vec3::y())),
            ("_tz", Joint::prismatic(Vec3::z())),
            ("_rz", Joint::revolute(Vec3::z())),
            ("_ry", Joint::revolute(Vec3::y())),
        ];
        for (k, (suffix, joint)) in chain.into_iter().enumerate() {
            let parent = if k == 0 { -1 } else { base + k as i32 - 1 };
            self = self.add_body(
                &format!("{}{}", name, suffix),
                parent,
                id,
                joint,
                SpatialInertia::zero(),
            );
        }
        self.add_body(name, base + 4, id, Joint::revolute(Vec3::x()), inertia)
    }

    /// Build the model, deriving the children lists.
    pub fn build(self) -> Model {
        let n = self.bodies.len();
        let mut mu = vec![Vec::new(); n];
        for (i, &p) in self.lambda.iter().enumerate() {
            if p >= 0 {
                mu[p as usize].push(i);
            }
        }
        Model {
            bodies: self.bodies,
            joints: self.joints,
            lambda: self.lambda,
            mu,
            x_tree: self.x_tree,
            gravity: self.gravity,
        }
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
