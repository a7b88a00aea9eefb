use approx::assert_relative_eq;
use kinetica::*;

const DT: f32 = 1.0 / 60.0;

fn single_body_scene() -> (BodyHandle, Vec<BodyHandle>) {
    let body = RigidBody::builder()
        .name("probe")
        .position(Vec3::new(0.0, 10.0, 0.0))
        .build_handle();
    (body.clone(), vec![body])
}

#[test]
fn accumulator_consumes_whole_steps_only() {
    let (_, scene) = single_body_scene();
    let mut world = PhysicsWorld::new();
    world.set_paused(false);

    world.update(DT * 0.6, &scene);
    assert_eq!(world.metrics().steps_executed, 0);
    assert!(world.accumulator() >= 0.0);

    world.update(DT * 0.6, &scene);
    assert_eq!(world.metrics().steps_executed, 1);
    assert!(world.accumulator() < DT);
}

#[test]
fn accumulator_stays_bounded_in_steady_state() {
    let (_, scene) = single_body_scene();
    let mut world = PhysicsWorld::new();
    world.set_paused(false);

    for _ in 0..500 {
        world.update(DT, &scene);
        assert!(world.accumulator() >= 0.0, "accumulator went negative");
        assert!(
            world.accumulator() < DT,
            "accumulator exceeded one step in steady state: {}",
            world.accumulator()
        );
    }
    assert_eq!(world.metrics().steps_executed, 500);
}

#[test]
fn overload_drops_excess_time_and_continues() {
    let (body, scene) = single_body_scene();
    let mut world = PhysicsWorld::new();
    world.set_paused(false);

    // Ten steps worth of elapsed time in one tick: capped at five, the rest
    // is dropped and the world keeps going from a clean accumulator.
    world.update(DT * 10.0, &scene);
    assert_eq!(world.metrics().steps_executed, 5);
    assert_eq!(world.accumulator(), 0.0);
    assert!(world.metrics().dropped_time > 0.0);

    let after_overload = body.read().position().y;
    world.update(DT, &scene);
    assert_eq!(world.metrics().steps_executed, 6);
    assert!(body.read().position().y < after_overload);
}

#[test]
fn pause_and_resume_are_idempotent() {
    let (body, scene) = single_body_scene();
    let mut world = PhysicsWorld::new();

    // Fresh worlds boot paused; pausing again changes nothing.
    assert!(world.is_paused());
    world.set_paused(true);
    world.update(DT * 3.0, &scene);
    assert_eq!(world.metrics().steps_executed, 0);
    assert_eq!(world.accumulator(), 0.0);
    assert_relative_eq!(body.read().position().y, 10.0);

    world.set_paused(false);
    world.set_paused(false);
    world.update(DT, &scene);
    assert_eq!(world.metrics().steps_executed, 1);
}

#[test]
fn single_step_mode_uses_elapsed_time_as_step_size() {
    let (body, scene) = single_body_scene();
    let mut world = PhysicsWorld::new();
    world.set_paused(false);
    world.set_step_mode(StepMode::SingleStep);

    let elapsed = 0.02;
    world.update(elapsed, &scene);

    assert_eq!(world.metrics().steps_executed, 1);
    // The configured fixed step is untouched afterwards.
    assert_relative_eq!(world.time_step(), DT);

    let expected = -9.81 * elapsed * world.damping();
    assert_relative_eq!(body.read().linear_velocity.y, expected, epsilon = 1e-5);
}

#[test]
fn named_lookup_finds_first_match() {
    let (_, mut scene) = single_body_scene();
    scene.push(
        RigidBody::builder()
            .name("target")
            .position(Vec3::new(5.0, 0.0, 0.0))
            .build_handle(),
    );

    let mut world = PhysicsWorld::new();
    world.set_paused(false);
    world.update(DT, &scene);

    let found = world.find_body_by_name("target").expect("body should be found");
    assert_eq!(found.read().position().x, 5.0);
    assert!(world.find_body_by_name("missing").is_none());
}

#[test]
fn diagnostics_surface_round_trips() {
    let mut world = PhysicsWorld::new();

    world.set_gravity(Vec3::new(0.0, -3.7, 0.0));
    assert_eq!(world.gravity(), Vec3::new(0.0, -3.7, 0.0));

    world.set_damping(0.95);
    assert_relative_eq!(world.damping(), 0.95);

    world.set_scheme(IntegrationScheme::RungeKutta4);
    assert_eq!(world.scheme(), IntegrationScheme::RungeKutta4);

    assert_eq!(world.constraint_count(), 0);
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.pair_count(), 0);
}

#[test]
fn structural_changes_take_effect_at_next_snapshot() {
    let (body, mut scene) = single_body_scene();
    let mut world = PhysicsWorld::new();
    world.set_paused(false);

    world.update(DT, &scene);
    assert_eq!(world.body_count(), 1);

    scene.push(
        RigidBody::builder()
            .position(Vec3::new(2.0, 0.0, 0.0))
            .build_handle(),
    );
    world.update(DT, &scene);
    assert_eq!(world.body_count(), 2);

    scene.retain(|handle| !std::sync::Arc::ptr_eq(handle, &body));
    world.update(DT, &scene);
    assert_eq!(world.body_count(), 1);
}

#[test]
fn resting_bodies_fall_asleep_and_wake_on_impact() {
    let floor = RigidBody::builder()
        .position(Vec3::new(0.0, -1.0, 0.0))
        .shape(CollisionShape::cuboid(Vec3::new(10.0, 1.0, 10.0)))
        .static_body()
        .restitution(0.0)
        .build_handle();
    let sleeper = RigidBody::builder()
        .position(Vec3::new(0.0, 0.5, 0.0))
        .shape(CollisionShape::sphere(0.5))
        .restitution(0.0)
        .build_handle();
    let scene = vec![floor, sleeper.clone()];

    let mut world = PhysicsWorld::new();
    world.set_paused(false);
    for _ in 0..600 {
        world.update(DT, &scene);
    }
    assert!(!sleeper.read().is_awake(), "settled body should be asleep");
    let rest_y = sleeper.read().position().y;

    // A moving body slamming into the sleeper wakes it.
    let bullet = RigidBody::builder()
        .position(Vec3::new(-3.0, 0.5, 0.0))
        .linear_velocity(Vec3::new(20.0, 0.0, 0.0))
        .shape(CollisionShape::sphere(0.4))
        .build_handle();
    let scene = vec![scene[0].clone(), sleeper.clone(), bullet];
    for _ in 0..60 {
        world.update(DT, &scene);
    }

    let body = sleeper.read();
    assert!(
        body.position().distance(Vec3::new(0.0, rest_y, 0.0)) > 0.05,
        "impact should move the sleeper"
    );
}
