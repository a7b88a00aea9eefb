use approx::assert_relative_eq;
use kinetica::*;

const DT: f32 = 1.0 / 60.0;

fn free_fall_world() -> (PhysicsWorld, BodyHandle, Vec<BodyHandle>) {
    let body = RigidBody::builder()
        .name("ball")
        .position(Vec3::new(0.0, 10.0, 0.0))
        .mass(1.0)
        .build_handle();
    let scene = vec![body.clone()];

    let mut world = PhysicsWorld::new();
    world.set_paused(false);
    (world, body, scene)
}

#[test]
fn free_fall_velocity_matches_damped_recurrence() {
    let (mut world, body, scene) = free_fall_world();

    let mut at_30 = 0.0;
    for step in 0..60 {
        world.update(DT, &scene);
        if step == 29 {
            at_30 = body.read().linear_velocity.y;
        }
    }

    // v_{n+1} = (v_n + g·dt) · damping, sixty times over.
    let damping = world.damping();
    let mut expected = 0.0f32;
    for _ in 0..60 {
        expected = (expected + -9.81 * DT) * damping;
    }

    let velocity = body.read().linear_velocity.y;
    assert_relative_eq!(velocity, expected, epsilon = 1e-4);

    // The closed-form estimate -9.81 · damping^60 lands in the same
    // neighborhood, and 60 steps fall strictly faster than 30.
    let estimate = -9.81 * damping.powi(60);
    assert!((velocity - estimate).abs() < 0.5, "velocity {velocity} vs estimate {estimate}");
    assert!(velocity < at_30, "fall must keep accelerating: {velocity} vs {at_30}");
}

#[test]
fn all_schemes_fall_downward() {
    for scheme in [
        IntegrationScheme::ExplicitEuler,
        IntegrationScheme::SemiImplicitEuler,
        IntegrationScheme::RungeKutta2,
        IntegrationScheme::RungeKutta4,
    ] {
        let (mut world, body, scene) = free_fall_world();
        world.set_scheme(scheme);
        for _ in 0..60 {
            world.update(DT, &scene);
        }
        let body = body.read();
        assert!(
            body.position().y < 10.0 && body.linear_velocity.y < 0.0,
            "{} should fall",
            scheme.name()
        );
    }
}

#[test]
fn runge_kutta_schemes_stay_close_to_semi_implicit() {
    let mut positions = Vec::new();
    for scheme in [
        IntegrationScheme::SemiImplicitEuler,
        IntegrationScheme::RungeKutta2,
        IntegrationScheme::RungeKutta4,
    ] {
        let (mut world, body, scene) = free_fall_world();
        world.set_scheme(scheme);
        for _ in 0..60 {
            world.update(DT, &scene);
        }
        positions.push(body.read().position().y);
    }

    for pair in positions.windows(2) {
        assert!(
            (pair[0] - pair[1]).abs() < 0.2,
            "schemes diverged: {positions:?}"
        );
    }
}

#[test]
fn static_bodies_are_invariant_under_forces_and_steps() {
    let anchor = RigidBody::builder()
        .position(Vec3::new(1.0, 2.0, 3.0))
        .orientation(Quat::from_rotation_y(0.7))
        .shape(CollisionShape::cuboid(Vec3::ONE))
        .static_body()
        .build_handle();
    let ball = RigidBody::builder()
        .position(Vec3::new(1.0, 4.5, 3.0))
        .shape(CollisionShape::sphere(0.5))
        .build_handle();
    let scene = vec![anchor.clone(), ball];

    let initial_position = anchor.read().position();
    let initial_orientation = anchor.read().orientation();

    let mut world = PhysicsWorld::new();
    world.set_paused(false);
    for _ in 0..120 {
        anchor.write().apply_force(Vec3::new(100.0, 100.0, 100.0));
        world.update(DT, &scene);
    }

    let body = anchor.read();
    assert_eq!(body.position(), initial_position);
    assert_eq!(body.orientation(), initial_orientation);
}

#[test]
fn kinetic_energy_never_grows_without_external_force() {
    let body = RigidBody::builder()
        .linear_velocity(Vec3::new(3.0, 1.0, -2.0))
        .angular_velocity(Vec3::new(0.5, 0.0, 0.5))
        .mass(2.0)
        .build_handle();
    let scene = vec![body.clone()];

    let mut world = PhysicsWorld::new();
    world.set_paused(false);
    world.set_gravity(Vec3::ZERO);

    let mut previous = f32::MAX;
    for _ in 0..300 {
        world.update(DT, &scene);
        let body = body.read();
        let energy = 0.5 * (1.0 / body.inverse_mass) * body.linear_velocity.length_squared();
        assert!(
            energy <= previous + 1e-6,
            "kinetic energy grew: {energy} > {previous}"
        );
        previous = energy;
    }
}

#[test]
fn identical_runs_are_bit_for_bit_identical() {
    let build = || {
        let floor = RigidBody::builder()
            .position(Vec3::new(0.0, -1.0, 0.0))
            .shape(CollisionShape::cuboid(Vec3::new(20.0, 1.0, 20.0)))
            .static_body()
            .build_handle();
        let mut scene = vec![floor];
        for i in 0..8 {
            scene.push(
                RigidBody::builder()
                    .position(Vec3::new(i as f32 * 1.1, 2.0 + i as f32 * 0.5, 0.0))
                    .shape(CollisionShape::sphere(0.5))
                    .build_handle(),
            );
        }
        let mut world = PhysicsWorld::new();
        world.set_paused(false);
        (world, scene)
    };

    let (mut world_a, scene_a) = build();
    let (mut world_b, scene_b) = build();

    for _ in 0..120 {
        world_a.update(DT, &scene_a);
        world_b.update(DT, &scene_b);
    }

    for (a, b) in scene_a.iter().zip(&scene_b) {
        let a = a.read();
        let b = b.read();
        assert_eq!(a.position(), b.position());
        assert_eq!(a.linear_velocity, b.linear_velocity);
        assert_eq!(a.orientation(), b.orientation());
    }
}
