use glam::Vec3;

use crate::{
    config::BAUMGARTE_SCALAR,
    core::body::BodyHandle,
};

/// Generic two-body joint solved alongside contact manifolds.
///
/// Same two-phase contract as a manifold: `pre_solve` once per step with
/// the fixed delta, then `apply_impulse` once per solver iteration.
/// Unlike manifolds, constraints are created and destroyed by the host and
/// persist across steps.
pub trait Constraint: Send + Sync {
    fn pre_solve(&mut self, dt: f32);
    fn apply_impulse(&mut self);
}

/// Keeps two attachment points at a fixed separation along the line
/// between them.
pub struct DistanceConstraint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    local_a: Vec3,
    local_b: Vec3,
    target_distance: f32,
    axis: Vec3,
    rel_a: Vec3,
    rel_b: Vec3,
    effective_mass: f32,
    bias: f32,
    pub accumulated_impulse: f32,
}

impl DistanceConstraint {
    /// Anchors are given in world space at rig time; the current separation
    /// of the anchors becomes the held distance.
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, anchor_a: Vec3, anchor_b: Vec3) -> Self {
        let (local_a, local_b) = {
            let a = body_a.read();
            let b = body_b.read();
            (
                a.orientation().conjugate() * (anchor_a - a.position()),
                b.orientation().conjugate() * (anchor_b - b.position()),
            )
        };
        let target_distance = (anchor_b - anchor_a).length();

        Self {
            body_a,
            body_b,
            local_a,
            local_b,
            target_distance,
            axis: Vec3::X,
            rel_a: Vec3::ZERO,
            rel_b: Vec3::ZERO,
            effective_mass: 0.0,
            bias: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.target_distance = distance;
        self
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }
}

impl Constraint for DistanceConstraint {
    fn pre_solve(&mut self, dt: f32) {
        let a = self.body_a.read();
        let b = self.body_b.read();

        self.rel_a = a.orientation() * self.local_a;
        self.rel_b = b.orientation() * self.local_b;

        let world_a = a.position() + self.rel_a;
        let world_b = b.position() + self.rel_b;
        let delta = world_b - world_a;
        let distance = delta.length();

        self.axis = delta.normalize_or_zero();
        if self.axis == Vec3::ZERO {
            self.axis = Vec3::X;
        }

        let ra_cross = self.rel_a.cross(self.axis);
        let rb_cross = self.rel_b.cross(self.axis);
        self.effective_mass = a.inverse_mass
            + b.inverse_mass
            + self.axis.dot(
                (a.inverse_inertia * ra_cross).cross(self.rel_a)
                    + (b.inverse_inertia * rb_cross).cross(self.rel_b),
            );

        self.bias = (BAUMGARTE_SCALAR / dt) * (distance - self.target_distance);
        self.accumulated_impulse = 0.0;
    }

    fn apply_impulse(&mut self) {
        if self.effective_mass <= f32::EPSILON {
            return;
        }

        let mut a = self.body_a.write();
        let mut b = self.body_b.write();
        if a.inverse_mass + b.inverse_mass <= f32::EPSILON {
            return;
        }

        let va = a.linear_velocity + a.angular_velocity.cross(self.rel_a);
        let vb = b.linear_velocity + b.angular_velocity.cross(self.rel_b);
        let vn = (vb - va).dot(self.axis);

        let lambda = -(vn + self.bias) / self.effective_mass;
        self.accumulated_impulse += lambda;

        let impulse = self.axis * lambda;
        let a_inv_mass = a.inverse_mass;
        a.linear_velocity -= impulse * a_inv_mass;
        let a_inv_inertia = a.inverse_inertia;
        let rel_a = self.rel_a;
        a.angular_velocity -= a_inv_inertia * rel_a.cross(impulse);
        let b_inv_mass = b.inverse_mass;
        b.linear_velocity += impulse * b_inv_mass;
        let b_inv_inertia = b.inverse_inertia;
        let rel_b = self.rel_b;
        b.angular_velocity += b_inv_inertia * rel_b.cross(impulse);
    }
}

/// Hooke spring plus damper between two attachment points, applied in
/// impulse form. Stiffness is expressed as a rate (1/s²) so the bias term
/// carries velocity units.
pub struct SpringConstraint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    local_a: Vec3,
    local_b: Vec3,
    rest_length: f32,
    stiffness: f32,
    damping: f32,
    axis: Vec3,
    rel_a: Vec3,
    rel_b: Vec3,
    effective_mass: f32,
    bias: f32,
    pub accumulated_impulse: f32,
}

impl SpringConstraint {
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Vec3,
        anchor_b: Vec3,
        stiffness: f32,
        damping: f32,
    ) -> Self {
        let (local_a, local_b) = {
            let a = body_a.read();
            let b = body_b.read();
            (
                a.orientation().conjugate() * (anchor_a - a.position()),
                b.orientation().conjugate() * (anchor_b - b.position()),
            )
        };
        let rest_length = (anchor_b - anchor_a).length();

        Self {
            body_a,
            body_b,
            local_a,
            local_b,
            rest_length,
            stiffness,
            damping,
            axis: Vec3::X,
            rel_a: Vec3::ZERO,
            rel_b: Vec3::ZERO,
            effective_mass: 0.0,
            bias: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    pub fn with_rest_length(mut self, rest_length: f32) -> Self {
        self.rest_length = rest_length;
        self
    }
}

impl Constraint for SpringConstraint {
    fn pre_solve(&mut self, dt: f32) {
        let a = self.body_a.read();
        let b = self.body_b.read();

        self.rel_a = a.orientation() * self.local_a;
        self.rel_b = b.orientation() * self.local_b;

        let world_a = a.position() + self.rel_a;
        let world_b = b.position() + self.rel_b;
        let delta = world_b - world_a;
        let length = delta.length();

        self.axis = delta.normalize_or_zero();
        if self.axis == Vec3::ZERO {
            self.axis = Vec3::X;
        }

        let ra_cross = self.rel_a.cross(self.axis);
        let rb_cross = self.rel_b.cross(self.axis);
        self.effective_mass = a.inverse_mass
            + b.inverse_mass
            + self.axis.dot(
                (a.inverse_inertia * ra_cross).cross(self.rel_a)
                    + (b.inverse_inertia * rb_cross).cross(self.rel_b),
            );

        self.bias = self.stiffness * (length - self.rest_length) * dt;
        self.accumulated_impulse = 0.0;
    }

    fn apply_impulse(&mut self) {
        if self.effective_mass <= f32::EPSILON {
            return;
        }

        let mut a = self.body_a.write();
        let mut b = self.body_b.write();
        if a.inverse_mass + b.inverse_mass <= f32::EPSILON {
            return;
        }

        let va = a.linear_velocity + a.angular_velocity.cross(self.rel_a);
        let vb = b.linear_velocity + b.angular_velocity.cross(self.rel_b);
        let vn = (vb - va).dot(self.axis);

        // Velocity-target form: repeated passes converge instead of piling
        // the spring force on once per iteration.
        let lambda = -(vn * (1.0 + self.damping) + self.bias) / (self.effective_mass * (1.0 + self.damping));
        self.accumulated_impulse += lambda;

        let impulse = self.axis * lambda;
        let a_inv_mass = a.inverse_mass;
        a.linear_velocity -= impulse * a_inv_mass;
        let a_inv_inertia = a.inverse_inertia;
        let rel_a = self.rel_a;
        a.angular_velocity -= a_inv_inertia * rel_a.cross(impulse);
        let b_inv_mass = b.inverse_mass;
        b.linear_velocity += impulse * b_inv_mass;
        let b_inv_inertia = b.inverse_inertia;
        let rel_b = self.rel_b;
        b.angular_velocity += b_inv_inertia * rel_b.cross(impulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::body::RigidBody;

    #[test]
    fn distance_constraint_pulls_separating_bodies_back() {
        let a = RigidBody::builder().position(Vec3::ZERO).build_handle();
        let b = RigidBody::builder()
            .position(Vec3::new(2.0, 0.0, 0.0))
            .linear_velocity(Vec3::new(1.0, 0.0, 0.0))
            .build_handle();

        let mut constraint =
            DistanceConstraint::new(a.clone(), b.clone(), Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));

        constraint.pre_solve(1.0 / 60.0);
        for _ in 0..10 {
            constraint.apply_impulse();
        }

        let va = a.read().linear_velocity;
        let vb = b.read().linear_velocity;
        let relative = (vb - va).x;
        assert!(
            relative.abs() < 1e-3,
            "separation rate should be cancelled, got {relative}"
        );
    }

    #[test]
    fn spring_constraint_accelerates_toward_rest_length() {
        let a = RigidBody::builder().position(Vec3::ZERO).build_handle();
        let b = RigidBody::builder()
            .position(Vec3::new(3.0, 0.0, 0.0))
            .build_handle();

        // Rest length 2, currently stretched to 3: bodies must be pulled
        // toward each other.
        let mut constraint = SpringConstraint::new(
            a.clone(),
            b.clone(),
            Vec3::ZERO,
            Vec3::new(3.0, 0.0, 0.0),
            40.0,
            0.5,
        )
        .with_rest_length(2.0);

        constraint.pre_solve(1.0 / 60.0);
        constraint.apply_impulse();

        assert!(a.read().linear_velocity.x > 0.0);
        assert!(b.read().linear_velocity.x < 0.0);
    }
}
