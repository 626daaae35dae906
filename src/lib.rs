mod constraints;
pub mod math;
mod types;

use bevy::prelude::*;
use bevy_inspector_egui::{Inspectable, RegisterInspectable};
use iyes_loopless::prelude::*;
use math::GaussSeidel;

pub use constraints::*;
pub use types::*;

pub mod prelude {
    pub use crate::{
        constraints::*,
        math::{lcp_gauss_seidel, GaussSeidel, MatMN, MatN, VecN},
        types::*,
        ConstraintSolverPlugin, PhysicsConfig, PhysicsStep, PhysicsState,
    };
}

pub const PHYSICS_TIMESTEP: f64 = 1.0 / 60.0;

// 30 rad/s is fast enough for us
const MAX_ANGULAR_SPEED: f32 = 30.0;
const MAX_ANGULAR_SPEED_SQ: f32 = MAX_ANGULAR_SPEED * MAX_ANGULAR_SPEED;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum PhysicsState {
    Running,
    Paused,
}

#[derive(Inspectable)]
pub struct PhysicsConfig {
    /// Step length handed to `pre_solve`.
    pub time: f32,
    /// `solve` passes over every constraint per step.
    pub solver_iterations: u32,
    pub inertia_convention: InertiaConvention,
    #[inspectable(ignore)]
    pub lcp: GaussSeidel,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            time: PHYSICS_TIMESTEP as f32,
            solver_iterations: 1,
            inertia_convention: InertiaConvention::default(),
            lcp: GaussSeidel::default(),
        }
    }
}

/// Stage the constraint systems run in. Every run is one step of
/// [`PhysicsConfig::time`]; add run criteria to it for a fixed wall clock rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, StageLabel)]
pub struct PhysicsStep;

pub struct ConstraintSolverPlugin;

impl Plugin for ConstraintSolverPlugin {
    fn build(&self, app: &mut App) {
        app.add_loopless_state(PhysicsState::Running)
            .init_resource::<PhysicsConfig>()
            .add_stage_after(
                CoreStage::Update,
                PhysicsStep,
                SystemStage::parallel(),
            )
            .register_inspectable::<Velocity>()
            .register_inspectable::<InverseMass>()
            .register_inspectable::<CenterOfMass>()
            .register_inspectable::<InverseInertiaTensor>()
            .add_plugin(PhysicsConstraintsPlugin)
            .add_enter_system(PhysicsState::Paused, log_state_change)
            .add_exit_system(PhysicsState::Paused, log_state_change);
    }
}

fn log_state_change(state: Res<CurrentState<PhysicsState>>) {
    debug!("Physics state: {:?}", state.0);
}
