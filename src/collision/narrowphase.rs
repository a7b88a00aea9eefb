use glam::{Quat, Vec3};

use crate::{
    collision::{
        clipping::ReferenceFace,
        manifold::{ContactPoint, Manifold},
        shapes::CollisionShape,
    },
    core::body::{BodyHandle, RigidBody},
};

/// Result of a confirmed separating-axis test. The normal points from body
/// A toward body B; depth is the smallest interval overlap found.
#[derive(Debug, Clone, Copy)]
pub struct CollisionData {
    pub depth: f32,
    pub normal: Vec3,
    pub point: Vec3,
}

/// Exact narrow-phase tester and manifold builder. An ordinary owned value;
/// the orchestrator constructs one and reuses its scratch buffers across
/// pairs.
pub struct CollisionDetector {
    axes: Vec<Vec3>,
    edges_a: Vec<Vec3>,
    edges_b: Vec<Vec3>,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self {
            axes: Vec::with_capacity(16),
            edges_a: Vec::with_capacity(3),
            edges_b: Vec::with_capacity(3),
        }
    }

    /// Separating-axis test over both shapes' candidate axes (plus
    /// edge-cross axes for faceted pairs). Returns `None` as soon as any
    /// axis separates the shapes.
    pub fn test_pair(&mut self, body_a: &RigidBody, body_b: &RigidBody) -> Option<CollisionData> {
        let shape_a = body_a.shape.as_deref()?;
        let shape_b = body_b.shape.as_deref()?;

        let pos_a = body_a.position();
        let pos_b = body_b.position();
        let rot_a = body_a.orientation();
        let rot_b = body_b.orientation();
        let delta = pos_b - pos_a;

        self.axes.clear();
        shape_a.collision_axes(rot_a, delta, &mut self.axes);
        shape_b.collision_axes(rot_b, -delta, &mut self.axes);

        self.edges_a.clear();
        self.edges_b.clear();
        shape_a.edge_axes(rot_a, &mut self.edges_a);
        shape_b.edge_axes(rot_b, &mut self.edges_b);
        for ea in &self.edges_a {
            for eb in &self.edges_b {
                let cross = ea.cross(*eb);
                if cross.length_squared() > 1e-6 {
                    self.axes.push(cross.normalize());
                }
            }
        }

        // Sphere against a faceted shape: the face axes alone admit false
        // positives near corners, so also test the axis through the closest
        // surface point.
        match (shape_a, shape_b) {
            (CollisionShape::Sphere { .. }, CollisionShape::Cuboid { .. }) => {
                push_closest_point_axis(&mut self.axes, pos_a, shape_b, pos_b, rot_b);
            }
            (CollisionShape::Cuboid { .. }, CollisionShape::Sphere { .. }) => {
                push_closest_point_axis(&mut self.axes, pos_b, shape_a, pos_a, rot_a);
            }
            _ => {}
        }

        let mut best_overlap = f32::MAX;
        let mut best_axis = Vec3::ZERO;
        for &axis in &self.axes {
            let (min_a, max_a) = shape_a.project(pos_a, rot_a, axis);
            let (min_b, max_b) = shape_b.project(pos_b, rot_b, axis);

            let overlap = max_a.min(max_b) - min_a.max(min_b);
            if overlap <= 0.0 {
                return None;
            }
            if overlap < best_overlap {
                best_overlap = overlap;
                best_axis = axis;
            }
        }

        let mut normal = best_axis;
        if normal.dot(delta) < 0.0 {
            normal = -normal;
        }

        // Deepest point of B inside A, pushed halfway out of the overlap.
        let deepest = shape_b.support(pos_b, rot_b, -normal);
        let point = deepest + normal * (best_overlap * 0.5);

        Some(CollisionData {
            depth: best_overlap,
            normal,
            point,
        })
    }

    /// Builds the contact manifold for a confirmed overlap. Sphere contacts
    /// produce a single point; cuboid/cuboid pairs clip the incident face
    /// against the reference face. Degenerate clips produce `None` and the
    /// candidate is discarded without error.
    pub fn build_manifold(
        &self,
        handle_a: &BodyHandle,
        handle_b: &BodyHandle,
        body_a: &RigidBody,
        body_b: &RigidBody,
        data: CollisionData,
    ) -> Option<Manifold> {
        let shape_a = body_a.shape.as_deref()?;
        let shape_b = body_b.shape.as_deref()?;

        let restitution = (body_a.restitution * body_b.restitution).sqrt();
        let friction = 0.5 * (body_a.friction + body_b.friction);
        let mut manifold = Manifold::new(handle_a.clone(), handle_b.clone(), restitution, friction);

        let faceted = matches!(shape_a, CollisionShape::Cuboid { .. })
            && matches!(shape_b, CollisionShape::Cuboid { .. });

        if !faceted {
            manifold.add_contact(ContactPoint::new(data.point, data.normal, data.depth));
            return Some(manifold);
        }

        let (ref_normal, ref_corners) =
            shape_a.face_polygon(body_a.position(), body_a.orientation(), data.normal)?;
        let (_, incident_corners) =
            shape_b.face_polygon(body_b.position(), body_b.orientation(), -data.normal)?;

        let reference = ReferenceFace::new(&ref_corners, ref_normal);
        for vertex in reference.clip_incident(&incident_corners) {
            // Keep only incident points at or below the reference face.
            if vertex.separation <= 1e-3 {
                manifold.add_contact(ContactPoint::new(
                    vertex.point,
                    data.normal,
                    (-vertex.separation).max(0.0),
                ));
            }
        }

        if manifold.is_empty() {
            return None;
        }
        Some(manifold)
    }
}

fn push_closest_point_axis(
    axes: &mut Vec<Vec3>,
    sphere_center: Vec3,
    cuboid: &CollisionShape,
    cuboid_pos: Vec3,
    cuboid_rot: Quat,
) {
    let CollisionShape::Cuboid { half_extents } = cuboid else {
        return;
    };
    let local = cuboid_rot.conjugate() * (sphere_center - cuboid_pos);
    let clamped = local.clamp(-*half_extents, *half_extents);
    let closest = cuboid_pos + cuboid_rot * clamped;
    let axis = (closest - sphere_center).normalize_or_zero();
    if axis != Vec3::ZERO {
        axes.push(axis);
    }
}
