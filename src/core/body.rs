use std::fmt;
use std::sync::Arc;

use glam::{Mat3, Mat4, Quat, Vec3};
use parking_lot::RwLock;

use crate::{
    collision::shapes::CollisionShape,
    config::{REST_FRAME_COUNT, REST_VELOCITY_THRESHOLD},
    utils::math::{inertia_cuboid, inertia_sphere},
};

/// Shared handle through which the host scene owns a body. The core only
/// ever clones handles into its per-step working set.
pub type BodyHandle = Arc<RwLock<RigidBody>>;

/// Pair-level collision veto. Called once per confirmed overlap with the
/// receiving body first; returning `false` discards the pair for response
/// purposes.
pub type CollisionEventHandler = Arc<dyn Fn(&RigidBody, &RigidBody) -> bool + Send + Sync>;

/// Dynamic (or static) rigid body advanced by the simulation core.
///
/// Position and orientation are only mutable through the setters so the
/// cached world transform and bounding volume are always invalidated
/// together with the state they derive from.
pub struct RigidBody {
    pub name: Option<String>,
    position: Vec3,
    orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub force: Vec3,
    pub torque: Vec3,
    pub inverse_mass: f32,
    pub inverse_inertia: Mat3,
    pub restitution: f32,
    pub friction: f32,
    pub shape: Option<Arc<CollisionShape>>,
    pub is_static: bool,
    is_awake: bool,
    on_collision: Option<CollisionEventHandler>,
    ws_transform: Mat4,
    ws_transform_stale: bool,
    ws_bound_radius: f32,
    ws_bound_stale: bool,
    rest_metric: f32,
    idle_frames: u32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            name: None,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            inverse_mass: 1.0,
            inverse_inertia: Mat3::IDENTITY,
            restitution: 0.9,
            friction: 0.8,
            shape: None,
            is_static: false,
            is_awake: true,
            on_collision: None,
            ws_transform: Mat4::IDENTITY,
            ws_transform_stale: true,
            ws_bound_radius: 0.0,
            ws_bound_stale: true,
            rest_metric: REST_VELOCITY_THRESHOLD * 2.0,
            idle_frames: 0,
        }
    }
}

impl RigidBody {
    pub fn builder() -> RigidBodyBuilder {
        RigidBodyBuilder::new()
    }

    /// Wraps the body in the shared handle form the host owns it through.
    pub fn into_handle(self) -> BodyHandle {
        Arc::new(RwLock::new(self))
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate_caches();
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
        self.invalidate_caches();
    }

    fn invalidate_caches(&mut self) {
        self.ws_transform_stale = true;
        self.ws_bound_stale = true;
    }

    /// Cached world transform, recomputed lazily after invalidation.
    pub fn world_transform(&mut self) -> Mat4 {
        if self.ws_transform_stale {
            self.ws_transform = Mat4::from_rotation_translation(self.orientation, self.position);
            self.ws_transform_stale = false;
        }
        self.ws_transform
    }

    /// Whether the host needs to re-read the transform after a step.
    pub fn transform_stale(&self) -> bool {
        self.ws_transform_stale
    }

    /// Cached bounding sphere (center, radius) enclosing the body's shape.
    pub fn bounds(&mut self) -> (Vec3, f32) {
        if self.ws_bound_stale {
            self.ws_bound_radius = self
                .shape
                .as_ref()
                .map(|shape| shape.bounding_radius())
                .unwrap_or(0.0);
            self.ws_bound_stale = false;
        }
        (self.position, self.ws_bound_radius)
    }

    #[inline]
    pub fn is_awake(&self) -> bool {
        self.is_awake
    }

    pub fn wake(&mut self) {
        self.is_awake = true;
        self.rest_metric = REST_VELOCITY_THRESHOLD * 2.0;
        self.idle_frames = 0;
    }

    /// Puts the body to sleep. Velocities are zeroed so a sleeping body
    /// carries no residual motion into the step that wakes it.
    pub fn sleep(&mut self) {
        self.is_awake = false;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Accumulates a force through the center of mass. Static and sleeping
    /// bodies are structurally excluded.
    pub fn apply_force(&mut self, force: Vec3) {
        if self.is_static || !self.is_awake {
            return;
        }
        self.force += force;
    }

    /// Accumulates a torque. Static and sleeping bodies are excluded.
    pub fn apply_torque(&mut self, torque: Vec3) {
        if self.is_static || !self.is_awake {
            return;
        }
        self.torque += torque;
    }

    /// Applies an instantaneous impulse at a world-space point. Wakes the
    /// body; a static body is never displaced.
    pub fn apply_impulse(&mut self, impulse: Vec3, point: Vec3) {
        if self.is_static {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
        let torque = (point - self.position).cross(impulse);
        self.angular_velocity += self.inverse_inertia * torque;
        self.is_awake = true;
    }

    pub fn set_collision_handler(&mut self, handler: CollisionEventHandler) {
        self.on_collision = Some(handler);
    }

    /// Runs this body's veto callback against `other`. Absent callback means
    /// consent.
    pub fn fire_collision_event(&self, other: &RigidBody) -> bool {
        match &self.on_collision {
            Some(handler) => handler(self, other),
            None => true,
        }
    }

    /// Smooths the velocity magnitude and sends the body to sleep once it
    /// stays below the rest threshold long enough.
    pub fn rest_test(&mut self) {
        let speed_sq =
            self.linear_velocity.length_squared() + self.angular_velocity.length_squared();
        self.rest_metric = self.rest_metric * 0.8 + speed_sq.sqrt() * 0.2;

        if self.rest_metric < REST_VELOCITY_THRESHOLD {
            self.idle_frames += 1;
            if self.idle_frames >= REST_FRAME_COUNT {
                self.sleep();
            }
        } else {
            self.idle_frames = 0;
        }
    }

    /// Recomputes inverse mass and inverse inertia from a mass value and the
    /// current shape. Zero (or static) means immovable: both inverses are
    /// zeroed so neither integration nor impulses can displace the body.
    pub fn set_mass(&mut self, mass: f32) {
        if self.is_static || mass.abs() < f32::EPSILON {
            self.inverse_mass = 0.0;
            self.inverse_inertia = Mat3::ZERO;
            return;
        }

        self.inverse_mass = 1.0 / mass;
        let inertia = match self.shape.as_deref() {
            Some(CollisionShape::Sphere { radius }) => inertia_sphere(*radius, mass),
            Some(CollisionShape::Cuboid { half_extents }) => inertia_cuboid(*half_extents, mass),
            None => Mat3::from_diagonal(Vec3::splat(mass)),
        };
        self.inverse_inertia = inertia.inverse();
    }
}

impl fmt::Debug for RigidBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RigidBody")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("orientation", &self.orientation)
            .field("linear_velocity", &self.linear_velocity)
            .field("angular_velocity", &self.angular_velocity)
            .field("inverse_mass", &self.inverse_mass)
            .field("is_static", &self.is_static)
            .field("is_awake", &self.is_awake)
            .finish_non_exhaustive()
    }
}

/// Builder mirroring the construction surface the host uses.
pub struct RigidBodyBuilder {
    body: RigidBody,
    mass: f32,
}

impl Default for RigidBodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBodyBuilder {
    pub fn new() -> Self {
        Self {
            body: RigidBody::default(),
            mass: 1.0,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.body.name = Some(name.into());
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.body.position = position;
        self
    }

    pub fn orientation(mut self, orientation: Quat) -> Self {
        self.body.orientation = orientation.normalize();
        self
    }

    pub fn linear_velocity(mut self, velocity: Vec3) -> Self {
        self.body.linear_velocity = velocity;
        self
    }

    pub fn angular_velocity(mut self, velocity: Vec3) -> Self {
        self.body.angular_velocity = velocity;
        self
    }

    pub fn shape(mut self, shape: CollisionShape) -> Self {
        self.body.shape = Some(Arc::new(shape));
        self
    }

    pub fn shared_shape(mut self, shape: Arc<CollisionShape>) -> Self {
        self.body.shape = Some(shape);
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Marks the body immovable: inverse mass and inverse inertia become
    /// zero regardless of the configured mass.
    pub fn static_body(mut self) -> Self {
        self.body.is_static = true;
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.body.restitution = restitution;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.body.friction = friction;
        self
    }

    pub fn collision_handler(mut self, handler: CollisionEventHandler) -> Self {
        self.body.on_collision = Some(handler);
        self
    }

    pub fn build(mut self) -> RigidBody {
        self.body.set_mass(self.mass);
        self.body
    }

    pub fn build_handle(self) -> BodyHandle {
        Arc::new(RwLock::new(self.build()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_body_ignores_impulses() {
        let mut body = RigidBody::builder()
            .shape(CollisionShape::Sphere { radius: 1.0 })
            .static_body()
            .build();
        body.apply_impulse(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(body.linear_velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn sleeping_body_accumulates_no_force() {
        let mut body = RigidBody::builder().build();
        body.sleep();
        body.apply_force(Vec3::Y * 100.0);
        assert_eq!(body.force, Vec3::ZERO);

        body.wake();
        body.apply_force(Vec3::Y * 100.0);
        assert_eq!(body.force, Vec3::Y * 100.0);
    }

    #[test]
    fn setters_invalidate_cached_transform() {
        let mut body = RigidBody::builder().build();
        let _ = body.world_transform();
        assert!(!body.transform_stale());
        body.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(body.transform_stale());
        let transform = body.world_transform();
        assert_eq!(transform.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rest_test_sleeps_idle_bodies() {
        let mut body = RigidBody::builder().build();
        for _ in 0..200 {
            body.rest_test();
        }
        assert!(!body.is_awake());
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }
}
