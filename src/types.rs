use bevy::{ecs::query::WorldQuery, prelude::*};
use bevy_inspector_egui::Inspectable;

use crate::{MAX_ANGULAR_SPEED, MAX_ANGULAR_SPEED_SQ};

#[derive(Component, Inspectable, Debug, Default, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }

    pub fn from_linear(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }
}

/// Zero means the body can't be moved by impulses.
#[derive(Component, Deref, DerefMut, Inspectable, Debug, Default, Clone, Copy)]
pub struct InverseMass(pub f32);

/// Center of mass in model space.
#[derive(Component, Deref, DerefMut, Inspectable, Debug, Default, Clone, Copy)]
pub struct CenterOfMass(pub Vec3);

/// Inverse inertia tensor in model space, rotated into world space on use.
#[derive(Component, Deref, DerefMut, Inspectable, Debug, Default, Clone, Copy)]
pub struct InverseInertiaTensor(pub Mat3);

/// The components the constraint solver reads from and writes to.
///
/// Pose comes from the entity's `Transform`, which is not part of the bundle.
#[derive(Bundle, Default)]
pub struct RigidBodyBundle {
    pub velocity: Velocity,
    pub inv_mass: InverseMass,
    pub center_of_mass: CenterOfMass,
    pub inv_inertia_tensor: InverseInertiaTensor,
}

impl RigidBodyBundle {
    /// `inertia_tensor` is the model space tensor of the whole body, not per unit mass.
    pub fn dynamic(mass: f32, inertia_tensor: Mat3) -> Self {
        debug_assert!(mass > 0.0);
        Self {
            inv_mass: InverseMass(mass.recip()),
            inv_inertia_tensor: InverseInertiaTensor(inertia_tensor.inverse()),
            ..default()
        }
    }

    /// Solid sphere with its center of mass at the origin.
    pub fn sphere(mass: f32, radius: f32) -> Self {
        let i = 2.0 * mass * radius * radius / 5.0;
        Self::dynamic(mass, Mat3::from_diagonal(Vec3::splat(i)))
    }

    /// Infinite mass, never affected by impulses.
    pub fn fixed() -> Self {
        Self {
            inv_mass: InverseMass(0.0),
            inv_inertia_tensor: InverseInertiaTensor(Mat3::ZERO),
            ..default()
        }
    }

    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_center_of_mass(mut self, center_of_mass: Vec3) -> Self {
        self.center_of_mass = CenterOfMass(center_of_mass);
        self
    }
}

#[derive(WorldQuery)]
#[world_query(mutable)]
pub struct RBQuery<'w> {
    pub entity: Entity,
    pub transform: &'w Transform,
    pub velocity: &'w mut Velocity,
    pub inv_mass: &'w InverseMass,
    pub center_of_mass: &'w CenterOfMass,
    pub inv_inertia_tensor: &'w InverseInertiaTensor,
}

pub struct RBHelper;

impl RBHelper {
    /// Model space is the body frame, rotation then translation, scale ignored.
    #[inline]
    pub fn local_to_world(trans: &Transform, local_point: Vec3) -> Vec3 {
        trans.translation + trans.rotation * local_point
    }

    #[inline]
    pub fn world_to_local(trans: &Transform, world_point: Vec3) -> Vec3 {
        trans.rotation.conjugate() * (world_point - trans.translation)
    }

    #[inline]
    pub fn centre_of_mass_world(trans: &Transform, com: &CenterOfMass) -> Vec3 {
        RBHelper::local_to_world(trans, com.0)
    }

    #[inline]
    pub fn inv_inertia_tensor_world(
        trans: &Transform,
        inv_inertia_tensor: &InverseInertiaTensor,
    ) -> Mat3 {
        let orientation = Mat3::from_quat(trans.rotation);
        orientation * inv_inertia_tensor.0 * orientation.transpose()
    }

    #[inline]
    pub fn apply_impulse_linear(velocity: &mut Velocity, inv_mass: &InverseMass, impulse: Vec3) {
        if inv_mass.0 == 0.0 {
            return;
        }
        // p = mv
        // dp = m dv = J
        // => dv = J / m
        velocity.linear += impulse * inv_mass.0;
    }

    pub fn apply_impulse_angular(
        trans: &Transform,
        velocity: &mut Velocity,
        inv_mass: &InverseMass,
        inv_inertia_tensor: &InverseInertiaTensor,
        impulse: Vec3,
    ) {
        if inv_mass.0 == 0.0 {
            return;
        }

        // L = I w = r x p
        // dL = I dw = r x J
        // => dw = I^-1 * (r x J)
        velocity.angular += RBHelper::inv_inertia_tensor_world(trans, inv_inertia_tensor) * impulse;

        // clamp angular_velocity
        if velocity.angular.length_squared() > MAX_ANGULAR_SPEED_SQ {
            velocity.angular = velocity.angular.normalize() * MAX_ANGULAR_SPEED;
        }
    }
}
