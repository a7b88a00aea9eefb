//! Drops a handful of spheres onto a static floor and prints where they
//! settle. Run with `cargo run --example falling_bodies`.

use kinetica::*;

fn main() {
    let floor = RigidBody::builder()
        .name("floor")
        .position(Vec3::new(0.0, -1.0, 0.0))
        .shape(CollisionShape::cuboid(Vec3::new(20.0, 1.0, 20.0)))
        .static_body()
        .restitution(0.2)
        .build_handle();

    let mut scene = vec![floor];
    for i in 0..5 {
        scene.push(
            RigidBody::builder()
                .name(format!("ball-{i}"))
                .position(Vec3::new(i as f32 * 1.5 - 3.0, 4.0 + i as f32, 0.0))
                .shape(CollisionShape::sphere(0.5))
                .restitution(0.4)
                .build_handle(),
        );
    }

    let mut world = PhysicsWorld::new();
    world.set_paused(false);

    let dt = 1.0 / 60.0;
    for frame in 0..360 {
        world.update(dt, &scene);

        if frame % 60 == 0 {
            let metrics = world.metrics();
            println!(
                "t={:>4.1}s  bodies={} pairs={} contacts={}",
                frame as f32 * dt,
                metrics.body_count,
                metrics.pair_count,
                metrics.contact_count
            );
        }
    }

    for handle in &scene {
        let body = handle.read();
        let name = body.name.clone().unwrap_or_default();
        println!(
            "{name:>8}: position {:?} awake={}",
            body.position(),
            body.is_awake()
        );
    }
}
