use crate::{
    math::{MatMN, MatN},
    types::*,
    PhysicsConfig,
};
use bevy::prelude::*;

use super::{Constrainable, Constraint, ConstraintBodies, ConstraintError};

/// Pins an anchor on the child body to an anchor on the parent body.
///
/// The constraint function is `C = |anchor_b - anchor_a|^2`, so it drives the
/// two anchors together rather than holding them at a fixed distance apart.
/// No positional drift correction is applied.
#[derive(Component, Debug, Clone)]
pub struct DistanceConstraint {
    bodies: ConstraintBodies,
    parent: Entity,
    jacobian: MatMN,
}

impl DistanceConstraint {
    pub fn builder() -> DistanceConstraintBuilder {
        DistanceConstraintBuilder::default()
    }

    /// Joins both bodies at a shared world space point.
    pub fn from_world_anchor(
        parent: Entity,
        parent_transform: &Transform,
        child: Entity,
        child_transform: &Transform,
        world_anchor: Vec3,
    ) -> Result<Self, ConstraintError> {
        DistanceConstraint::builder()
            .parent(parent, RBHelper::world_to_local(parent_transform, world_anchor))
            .child(child, RBHelper::world_to_local(child_transform, world_anchor))?
            .build()
    }

    pub fn parent(&self) -> Entity {
        self.parent
    }

    /// The 1x12 row computed by the last `pre_solve`.
    pub fn jacobian(&self) -> &MatMN {
        &self.jacobian
    }
}

#[derive(Debug, Default, Clone)]
pub struct DistanceConstraintBuilder {
    parent: Option<(Entity, Vec3)>,
    child: Option<(Entity, Vec3)>,
}

impl DistanceConstraintBuilder {
    /// `anchor` is in the parent's model space.
    pub fn parent(mut self, body: Entity, anchor: Vec3) -> Self {
        self.parent = Some((body, anchor));
        self
    }

    /// `anchor` is in the child's model space. The parent must already be set.
    pub fn child(mut self, body: Entity, anchor: Vec3) -> Result<Self, ConstraintError> {
        if self.parent.is_none() {
            return Err(ConstraintError::ChildBeforeParent);
        }
        self.child = Some((body, anchor));
        Ok(self)
    }

    pub fn build(self) -> Result<DistanceConstraint, ConstraintError> {
        let (parent, anchor_a) = self.parent.ok_or(ConstraintError::MissingParent)?;
        let (child, anchor_b) = self.child.ok_or(ConstraintError::MissingChild)?;
        if parent == child {
            return Err(ConstraintError::SameBody(parent));
        }

        Ok(DistanceConstraint {
            bodies: ConstraintBodies::new(parent, anchor_a, child, anchor_b),
            parent,
            jacobian: MatMN::new(1, 12),
        })
    }
}

impl Constrainable for DistanceConstraint {
    fn bodies(&self) -> &ConstraintBodies {
        &self.bodies
    }

    fn pre_solve(&mut self, a: &mut RBQueryItem, b: &mut RBQueryItem, _dt: f32) {
        let world_anchor_a = RBHelper::local_to_world(a.transform, self.bodies.anchor_a);
        let world_anchor_b = RBHelper::local_to_world(b.transform, self.bodies.anchor_b);

        let r = world_anchor_b - world_anchor_a;
        let ra = world_anchor_a - RBHelper::centre_of_mass_world(a.transform, a.center_of_mass);
        let rb = world_anchor_b - RBHelper::centre_of_mass_world(b.transform, b.center_of_mass);
        trace!("distance constraint error {}", r.length_squared());

        {
            let j1 = (world_anchor_a - world_anchor_b) * 2.0;
            self.jacobian.set_vec3_at(0, 0, j1);
        }

        {
            let j2 = ra.cross((world_anchor_a - world_anchor_b) * 2.0);
            self.jacobian.set_vec3_at(0, 3, j2);
        }

        {
            let j3 = (world_anchor_b - world_anchor_a) * 2.0;
            self.jacobian.set_vec3_at(0, 6, j3);
        }

        {
            let j4 = rb.cross((world_anchor_b - world_anchor_a) * 2.0);
            self.jacobian.set_vec3_at(0, 9, j4);
        }
    }

    fn solve(&mut self, a: &mut RBQueryItem, b: &mut RBQueryItem, config: &PhysicsConfig) {
        let jacobian_transpose = self.jacobian.transpose();

        // build the system of equations
        let q_dt = Constraint::get_velocities(&a.velocity, &b.velocity);
        let inv_mass_matrix = Constraint::get_inverse_mass_matrix(a, b, config.inertia_convention);
        let j_w_jt = &(&self.jacobian * &inv_mass_matrix) * &jacobian_transpose;
        let rhs = -(&self.jacobian * &q_dt);

        // solve for the Lagrange multipliers
        let lambda_n = match MatN::try_from(j_w_jt) {
            Ok(k) => config.lcp.solve(&k, &rhs),
            Err(err) => {
                warn!("distance constraint has a malformed jacobian: {}", err);
                return;
            }
        };

        // apply the impulses
        let impulses = &jacobian_transpose * &lambda_n;
        Constraint::apply_impulses(a, b, &impulses);
    }
}
