use bevy::{math::vec3, prelude::*};
use iyes_loopless::prelude::*;
use sly_constraints::prelude::*;

fn setup() -> App {
    let mut app = App::new();
    app.add_plugin(ConstraintSolverPlugin);
    app
}

fn spawn_body(app: &mut App, position: Vec3, bundle: RigidBodyBundle) -> Entity {
    app.world
        .spawn()
        .insert_bundle(SpatialBundle {
            transform: Transform::from_translation(position),
            ..default()
        })
        .insert_bundle(bundle)
        .id()
}

/// A fixed anchor at the origin and a unit mass sphere moving away from it.
fn spawn_pendulum(app: &mut App) -> (Entity, Entity) {
    let anchor = spawn_body(app, Vec3::ZERO, RigidBodyBundle::fixed());
    let bob = spawn_body(
        app,
        vec3(1.0, 0.0, 0.0),
        RigidBodyBundle::sphere(1.0, 0.5).with_velocity(Velocity::from_linear(Vec3::X)),
    );

    let constraint = DistanceConstraint::builder()
        .parent(anchor, Vec3::ZERO)
        .child(bob, vec3(-0.9, 0.0, 0.0))
        .unwrap()
        .build()
        .unwrap();
    app.world.spawn().insert(constraint);

    (anchor, bob)
}

#[test]
fn constraint_removes_separating_velocity() {
    let mut app = setup();
    let (anchor, bob) = spawn_pendulum(&mut app);

    app.update();

    let velocity = app.world.get::<Velocity>(bob).unwrap();
    info!("bob velocity {:?}", velocity);
    assert!(velocity.linear.x.abs() < 1e-4);
    assert_eq!(
        *app.world.get::<Velocity>(anchor).unwrap(),
        Velocity::default()
    );
}

#[test]
fn jacobian_is_stored_on_the_component() {
    let mut app = setup();
    spawn_pendulum(&mut app);

    app.update();

    let mut query = app.world.query::<&DistanceConstraint>();
    let constraint = query.single(&app.world);
    let row = constraint.jacobian().row(0);
    assert!(row.vec3_at(0).x < 0.0);
    assert!(row.vec3_at(6).x > 0.0);
    assert_eq!(row.vec3_at(0), -row.vec3_at(6));
}

#[test]
fn paused_state_skips_solver() {
    let mut app = setup();
    let (_, bob) = spawn_pendulum(&mut app);

    app.world.insert_resource(NextState(PhysicsState::Paused));
    app.update();
    assert_eq!(app.world.get::<Velocity>(bob).unwrap().linear, Vec3::X);

    app.world.insert_resource(NextState(PhysicsState::Running));
    app.update();
    assert!(app.world.get::<Velocity>(bob).unwrap().linear.x.abs() < 1e-4);
}

#[test]
fn every_update_is_one_step_after_user_systems() {
    let mut app = setup();
    let (_, bob) = spawn_pendulum(&mut app);
    // pushes the bob away again during CoreStage::Update
    app.add_system(move |mut query: Query<&mut Velocity>| {
        if let Ok(mut velocity) = query.get_mut(bob) {
            velocity.linear = Vec3::X;
        }
    });

    for _ in 0..3 {
        app.update();
        let velocity = app.world.get::<Velocity>(bob).unwrap();
        assert!(velocity.linear.x.abs() < 1e-4, "{:?}", velocity);
    }
}

#[test]
fn missing_body_is_skipped() {
    let mut app = setup();
    let anchor = spawn_body(&mut app, Vec3::ZERO, RigidBodyBundle::fixed());
    let ghost = app.world.spawn().id();

    let constraint = DistanceConstraint::builder()
        .parent(anchor, Vec3::ZERO)
        .child(ghost, Vec3::X)
        .unwrap()
        .build()
        .unwrap();
    app.world.spawn().insert(constraint);

    app.update();

    assert_eq!(
        *app.world.get::<Velocity>(anchor).unwrap(),
        Velocity::default()
    );
}

#[test]
fn chain_shares_a_body() {
    let mut app = setup();
    app.insert_resource(PhysicsConfig {
        solver_iterations: 10,
        ..default()
    });

    let top = spawn_body(&mut app, Vec3::ZERO, RigidBodyBundle::fixed());
    let middle = spawn_body(
        &mut app,
        vec3(0.0, -1.0, 0.0),
        RigidBodyBundle::sphere(1.0, 0.25).with_velocity(Velocity::from_linear(vec3(0.0, -1.0, 0.0))),
    );
    let bottom = spawn_body(
        &mut app,
        vec3(0.0, -2.0, 0.0),
        RigidBodyBundle::sphere(1.0, 0.25).with_velocity(Velocity::from_linear(vec3(0.0, -2.0, 0.0))),
    );

    for (parent, child) in [(top, middle), (middle, bottom)] {
        let constraint = DistanceConstraint::builder()
            .parent(parent, vec3(0.0, -0.45, 0.0))
            .child(child, vec3(0.0, 0.45, 0.0))
            .unwrap()
            .build()
            .unwrap();
        app.world.spawn().insert(constraint);
    }

    let before = app.world.get::<Velocity>(bottom).unwrap().linear.y;
    app.update();

    let middle_velocity = app.world.get::<Velocity>(middle).unwrap().linear;
    let bottom_velocity = app.world.get::<Velocity>(bottom).unwrap().linear;
    assert!(middle_velocity.is_finite());
    assert!(bottom_velocity.is_finite());
    // the chain pulls both bodies back up towards the fixed top
    assert!(middle_velocity.y > -1.0);
    assert!(bottom_velocity.y > before);
}
