use glam::Vec3;

use crate::{
    config::{BAUMGARTE_SCALAR, BAUMGARTE_SLOP},
    core::body::{BodyHandle, RigidBody},
    utils::math::orthogonal_to_normal,
};

/// One contact between two bodies: geometry captured at detection time plus
/// the quantities the solver precomputes and accumulates.
#[derive(Debug, Clone)]
pub struct ContactPoint {
    pub point: Vec3,
    pub normal: Vec3,
    pub penetration: f32,
    rel_pos_a: Vec3,
    rel_pos_b: Vec3,
    normal_mass: f32,
    bias: f32,
    elasticity_term: f32,
    pub normal_impulse: f32,
    pub tangent_impulse: Vec3,
}

impl ContactPoint {
    /// `normal` points from body A toward body B; `penetration` is positive
    /// for overlapping geometry.
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
            rel_pos_a: Vec3::ZERO,
            rel_pos_b: Vec3::ZERO,
            normal_mass: 0.0,
            bias: 0.0,
            elasticity_term: 0.0,
            normal_impulse: 0.0,
            tangent_impulse: Vec3::ZERO,
        }
    }
}

/// Contact set for one colliding pair, rebuilt from scratch every step.
/// Shares the manifold/constraint two-phase solving contract: `pre_solve`
/// once per step, `apply_impulse` once per solver iteration.
pub struct Manifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub restitution: f32,
    pub friction: f32,
    pub contacts: Vec<ContactPoint>,
}

impl Manifold {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, restitution: f32, friction: f32) -> Self {
        Self {
            body_a,
            body_b,
            restitution,
            friction,
            contacts: Vec::new(),
        }
    }

    pub fn add_contact(&mut self, contact: ContactPoint) {
        self.contacts.push(contact);
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Precomputes step-invariant terms: contact arms, effective mass along
    /// the normal, Baumgarte bias from penetration depth, and the
    /// restitution term taken from the pre-iteration approach velocity.
    pub fn pre_solve(&mut self, dt: f32) {
        let a = self.body_a.read();
        let b = self.body_b.read();

        for contact in &mut self.contacts {
            contact.rel_pos_a = contact.point - a.position();
            contact.rel_pos_b = contact.point - b.position();

            let ra_cross_n = contact.rel_pos_a.cross(contact.normal);
            let rb_cross_n = contact.rel_pos_b.cross(contact.normal);
            let angular = contact.normal.dot(
                (a.inverse_inertia * ra_cross_n).cross(contact.rel_pos_a)
                    + (b.inverse_inertia * rb_cross_n).cross(contact.rel_pos_b),
            );
            contact.normal_mass = a.inverse_mass + b.inverse_mass + angular;

            contact.bias =
                (BAUMGARTE_SCALAR / dt) * (contact.penetration - BAUMGARTE_SLOP).max(0.0);

            let approach = relative_velocity(&a, &b, contact).dot(contact.normal);
            contact.elasticity_term = if approach < 0.0 {
                self.restitution * approach
            } else {
                0.0
            };

            contact.normal_impulse = 0.0;
            contact.tangent_impulse = Vec3::ZERO;
        }
    }

    /// One sequential-impulse pass over every contact point: clamped
    /// accumulated normal impulse, then disc-clamped accumulated friction.
    pub fn apply_impulse(&mut self) {
        let mut a = self.body_a.write();
        let mut b = self.body_b.write();

        if a.inverse_mass + b.inverse_mass <= f32::EPSILON {
            return;
        }

        for contact in &mut self.contacts {
            solve_normal(&mut a, &mut b, contact);
            solve_friction(&mut a, &mut b, contact, self.friction);
        }
    }
}

fn relative_velocity(a: &RigidBody, b: &RigidBody, contact: &ContactPoint) -> Vec3 {
    let va = a.linear_velocity + a.angular_velocity.cross(contact.rel_pos_a);
    let vb = b.linear_velocity + b.angular_velocity.cross(contact.rel_pos_b);
    vb - va
}

fn apply_pair_impulse(a: &mut RigidBody, b: &mut RigidBody, contact: &ContactPoint, impulse: Vec3) {
    a.linear_velocity -= impulse * a.inverse_mass;
    a.angular_velocity -= a.inverse_inertia * contact.rel_pos_a.cross(impulse);
    b.linear_velocity += impulse * b.inverse_mass;
    b.angular_velocity += b.inverse_inertia * contact.rel_pos_b.cross(impulse);
}

fn solve_normal(a: &mut RigidBody, b: &mut RigidBody, contact: &mut ContactPoint) {
    if contact.normal_mass <= f32::EPSILON {
        return;
    }

    let vn = relative_velocity(a, b, contact).dot(contact.normal);
    let lambda = -(vn + contact.elasticity_term - contact.bias) / contact.normal_mass;

    let new_total = (contact.normal_impulse + lambda).max(0.0);
    let delta = new_total - contact.normal_impulse;
    contact.normal_impulse = new_total;

    apply_pair_impulse(a, b, contact, contact.normal * delta);
}

fn solve_friction(a: &mut RigidBody, b: &mut RigidBody, contact: &mut ContactPoint, friction: f32) {
    let max_friction = friction * contact.normal_impulse;
    if max_friction <= f32::EPSILON {
        contact.tangent_impulse = Vec3::ZERO;
        return;
    }

    let dv = relative_velocity(a, b, contact);
    let tangent_vel = dv - contact.normal * dv.dot(contact.normal);

    let tangent = if tangent_vel.length_squared() > 1e-12 {
        tangent_vel.normalize()
    } else if contact.tangent_impulse.length_squared() > 1e-12 {
        contact.tangent_impulse.normalize()
    } else {
        orthogonal_to_normal(contact.normal)
    };

    let ra_cross_t = contact.rel_pos_a.cross(tangent);
    let rb_cross_t = contact.rel_pos_b.cross(tangent);
    let tangent_mass = a.inverse_mass
        + b.inverse_mass
        + tangent.dot(
            (a.inverse_inertia * ra_cross_t).cross(contact.rel_pos_a)
                + (b.inverse_inertia * rb_cross_t).cross(contact.rel_pos_b),
        );
    if tangent_mass <= f32::EPSILON {
        return;
    }

    let lambda = -dv.dot(tangent) / tangent_mass;

    let mut desired = contact.tangent_impulse + tangent * lambda;
    // Coulomb cone, accumulated form: total friction stays within the disc.
    if desired.length() > max_friction {
        desired = desired.normalize() * max_friction;
    }

    let delta = desired - contact.tangent_impulse;
    contact.tangent_impulse = desired;
    if delta.length_squared() <= 1e-14 {
        return;
    }

    apply_pair_impulse(a, b, contact, delta);
}
