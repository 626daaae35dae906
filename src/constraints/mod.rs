mod distance_constraint;

pub use distance_constraint::*;

use crate::{
    math::{MatMN, VecN},
    types::*,
    PhysicsConfig, PhysicsStep, PhysicsState,
};
use bevy::prelude::*;
use bevy_inspector_egui::Inspectable;
use iyes_loopless::prelude::*;

pub struct PhysicsConstraintsPlugin;

#[derive(Debug, Clone, PartialEq, Eq, Hash, SystemLabel)]
pub enum ConstraintSystem {
    PreSolve,
    Solve,
    PostSolve,
}

impl Plugin for PhysicsConstraintsPlugin {
    fn build(&self, app: &mut App) {
        app.add_constraint::<DistanceConstraint>();
    }
}

pub trait ConstraintAppExt {
    /// Runs `pre_solve`, `solve` and `post_solve` for every `T` each physics step.
    fn add_constraint<T: Constrainable + Component>(&mut self) -> &mut Self;
}

impl ConstraintAppExt for App {
    fn add_constraint<T: Constrainable + Component>(&mut self) -> &mut Self {
        self.add_system_set_to_stage(
            PhysicsStep,
            ConditionSet::new()
                .run_in_state(PhysicsState::Running)
                .label(ConstraintSystem::PreSolve)
                .with_system(pre_solve::<T>)
                .into(),
        )
        .add_system_set_to_stage(
            PhysicsStep,
            ConditionSet::new()
                .run_in_state(PhysicsState::Running)
                .label(ConstraintSystem::Solve)
                .after(ConstraintSystem::PreSolve)
                .with_system(solve::<T>)
                .into(),
        )
        .add_system_set_to_stage(
            PhysicsStep,
            ConditionSet::new()
                .run_in_state(PhysicsState::Running)
                .label(ConstraintSystem::PostSolve)
                .after(ConstraintSystem::Solve)
                .with_system(post_solve::<T>)
                .into(),
        )
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("the child body was set before the parent body")]
    ChildBeforeParent,
    #[error("no parent body was set")]
    MissingParent,
    #[error("no child body was set")]
    MissingChild,
    #[error("constraint connects {0:?} to itself")]
    SameBody(Entity),
}

/// Bodies and anchors shared by every two body constraint.
///
/// Anchors and axes are in each body's model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintBodies {
    pub body_a: Entity,
    pub body_b: Entity,
    pub anchor_a: Vec3,
    pub anchor_b: Vec3,
    pub axis_a: Vec3,
    pub axis_b: Vec3,
}

impl ConstraintBodies {
    pub fn new(body_a: Entity, anchor_a: Vec3, body_b: Entity, anchor_b: Vec3) -> Self {
        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            axis_a: Vec3::ZERO,
            axis_b: Vec3::ZERO,
        }
    }
}

pub trait Constrainable: Send + Sync + 'static {
    fn bodies(&self) -> &ConstraintBodies;

    fn get_a(&self) -> Entity {
        self.bodies().body_a
    }
    fn get_b(&self) -> Entity {
        self.bodies().body_b
    }
    fn get_anchor_a(&self) -> Vec3 {
        self.bodies().anchor_a
    }
    fn get_anchor_b(&self) -> Vec3 {
        self.bodies().anchor_b
    }

    /// Called once per step before any `solve`.
    fn pre_solve(&mut self, a: &mut RBQueryItem, b: &mut RBQueryItem, dt: f32);
    /// May be called several times per step.
    fn solve(&mut self, a: &mut RBQueryItem, b: &mut RBQueryItem, config: &PhysicsConfig);
    fn post_solve(&mut self) {}
}

fn pre_solve<T: Constrainable + Component>(
    mut constraints: Query<(Entity, &mut T)>,
    mut rb_query: Query<RBQuery>,
    config: Res<PhysicsConfig>,
) {
    for (entity, mut c) in constraints.iter_mut() {
        match rb_query.get_many_mut([c.get_a(), c.get_b()]) {
            Ok([mut a, mut b]) => c.pre_solve(&mut a, &mut b, config.time),
            Err(err) => warn!("skipping constraint {:?}: {:?}", entity, err),
        }
    }
}

fn solve<T: Constrainable + Component>(
    mut constraints: Query<(Entity, &mut T)>,
    mut rb_query: Query<RBQuery>,
    config: Res<PhysicsConfig>,
) {
    for _ in 0..config.solver_iterations {
        for (entity, mut c) in constraints.iter_mut() {
            match rb_query.get_many_mut([c.get_a(), c.get_b()]) {
                Ok([mut a, mut b]) => c.solve(&mut a, &mut b, &config),
                // already reported by pre_solve
                Err(err) => trace!("skipping constraint {:?}: {:?}", entity, err),
            }
        }
    }
}

fn post_solve<T: Constrainable + Component>(mut constraints: Query<&mut T>) {
    for mut c in constraints.iter_mut() {
        c.post_solve();
    }
}

/// How the angular blocks of the inverse mass matrix are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Inspectable)]
pub enum InertiaConvention {
    /// The world space inverse inertia tensor goes in as is.
    Inverse,
    /// The world space inverse inertia tensor is inverted back to the forward
    /// tensor first.
    Forward,
}

impl Default for InertiaConvention {
    fn default() -> Self {
        InertiaConvention::Inverse
    }
}

pub struct Constraint;

impl Constraint {
    /// Block diagonal 12x12 matrix laid out as
    /// `[lin_a, ang_a, lin_b, ang_b]`, three rows each.
    pub fn get_inverse_mass_matrix(
        a: &RBQueryItem,
        b: &RBQueryItem,
        convention: InertiaConvention,
    ) -> MatMN {
        let mut inv_mass_matrix = MatMN::new(12, 12);
        Constraint::fill_body_block(&mut inv_mass_matrix, 0, a, convention);
        Constraint::fill_body_block(&mut inv_mass_matrix, 6, b, convention);
        inv_mass_matrix
    }

    fn fill_body_block(
        inv_mass_matrix: &mut MatMN,
        offset: usize,
        body: &RBQueryItem,
        convention: InertiaConvention,
    ) {
        for i in 0..3 {
            inv_mass_matrix[offset + i][offset + i] = body.inv_mass.0;
        }

        let inertia = Constraint::angular_block(body, convention);
        for i in 0..3 {
            for j in 0..3 {
                inv_mass_matrix[offset + 3 + i][offset + 3 + j] = inertia.col(j)[i];
            }
        }
    }

    fn angular_block(body: &RBQueryItem, convention: InertiaConvention) -> Mat3 {
        let inv_inertia = RBHelper::inv_inertia_tensor_world(body.transform, body.inv_inertia_tensor);
        match convention {
            InertiaConvention::Inverse => inv_inertia,
            InertiaConvention::Forward => {
                // fixed bodies have a zero tensor, keep their block empty
                if inv_inertia.determinant() == 0.0 {
                    trace!("singular inverse inertia on {:?}", body.entity);
                    Mat3::ZERO
                } else {
                    inv_inertia.inverse()
                }
            }
        }
    }

    pub fn get_velocities(vel_a: &Velocity, vel_b: &Velocity) -> VecN {
        let mut q_dt = VecN::new(12);

        q_dt.set_vec3_at(0, vel_a.linear);
        q_dt.set_vec3_at(3, vel_a.angular);
        q_dt.set_vec3_at(6, vel_b.linear);
        q_dt.set_vec3_at(9, vel_b.angular);

        q_dt
    }

    pub fn apply_impulses(a: &mut RBQueryItem, b: &mut RBQueryItem, impulses: &VecN) {
        debug_assert_eq!(impulses.len(), 12);

        {
            let force_internal_a = impulses.vec3_at(0);
            let torque_internal_a = impulses.vec3_at(3);

            RBHelper::apply_impulse_linear(&mut a.velocity, a.inv_mass, force_internal_a);
            RBHelper::apply_impulse_angular(
                a.transform,
                &mut a.velocity,
                a.inv_mass,
                a.inv_inertia_tensor,
                torque_internal_a,
            );
        }

        {
            let force_internal_b = impulses.vec3_at(6);
            let torque_internal_b = impulses.vec3_at(9);

            RBHelper::apply_impulse_linear(&mut b.velocity, b.inv_mass, force_internal_b);
            RBHelper::apply_impulse_angular(
                b.transform,
                &mut b.velocity,
                b.inv_mass,
                b.inv_inertia_tensor,
                torque_internal_b,
            );
        }
    }
}
