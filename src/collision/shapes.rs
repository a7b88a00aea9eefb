use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Convex geometries the narrow phase can test exactly.
///
/// Every variant answers the same small capability set — bounding radius
/// for the broad phase, candidate separating axes, interval projection and
/// support points for the axis test, and (for faceted shapes) the face
/// polygon the manifold builder clips against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CollisionShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl CollisionShape {
    pub fn sphere(radius: f32) -> Self {
        CollisionShape::Sphere { radius }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        CollisionShape::Cuboid { half_extents }
    }

    /// Radius of the tightest origin-centered sphere enclosing the shape.
    pub fn bounding_radius(&self) -> f32 {
        match self {
            CollisionShape::Sphere { radius } => *radius,
            CollisionShape::Cuboid { half_extents } => half_extents.length(),
        }
    }

    /// Separating-axis candidates this shape contributes. `toward` is the
    /// direction to the other body's center; spheres have no fixed axes of
    /// their own and contribute the center-to-center direction instead.
    pub fn collision_axes(&self, orientation: Quat, toward: Vec3, axes: &mut Vec<Vec3>) {
        match self {
            CollisionShape::Sphere { .. } => {
                let axis = toward.normalize_or_zero();
                axes.push(if axis == Vec3::ZERO { Vec3::X } else { axis });
            }
            CollisionShape::Cuboid { .. } => {
                axes.push(orientation * Vec3::X);
                axes.push(orientation * Vec3::Y);
                axes.push(orientation * Vec3::Z);
            }
        }
    }

    /// Oriented edge directions, used to build cross-product axes for
    /// cuboid/cuboid pairs.
    pub fn edge_axes(&self, orientation: Quat, axes: &mut Vec<Vec3>) {
        if let CollisionShape::Cuboid { .. } = self {
            axes.push(orientation * Vec3::X);
            axes.push(orientation * Vec3::Y);
            axes.push(orientation * Vec3::Z);
        }
    }

    /// Projects the shape onto `axis`, returning the covered interval.
    pub fn project(&self, position: Vec3, orientation: Quat, axis: Vec3) -> (f32, f32) {
        let center = position.dot(axis);
        match self {
            CollisionShape::Sphere { radius } => (center - radius, center + radius),
            CollisionShape::Cuboid { half_extents } => {
                let extent = (orientation * Vec3::X).dot(axis).abs() * half_extents.x
                    + (orientation * Vec3::Y).dot(axis).abs() * half_extents.y
                    + (orientation * Vec3::Z).dot(axis).abs() * half_extents.z;
                (center - extent, center + extent)
            }
        }
    }

    /// Furthest point of the shape along `direction` in world space.
    pub fn support(&self, position: Vec3, orientation: Quat, direction: Vec3) -> Vec3 {
        match self {
            CollisionShape::Sphere { radius } => {
                position + direction.normalize_or_zero() * *radius
            }
            CollisionShape::Cuboid { half_extents } => {
                let local = orientation.conjugate() * direction;
                let corner = Vec3::new(
                    half_extents.x.copysign(local.x),
                    half_extents.y.copysign(local.y),
                    half_extents.z.copysign(local.z),
                );
                position + orientation * corner
            }
        }
    }

    /// World-space polygon of the face whose outward normal best aligns
    /// with `direction`, as (normal, counter-clockwise corners). Spheres
    /// have no faces.
    pub fn face_polygon(
        &self,
        position: Vec3,
        orientation: Quat,
        direction: Vec3,
    ) -> Option<(Vec3, Vec<Vec3>)> {
        let CollisionShape::Cuboid { half_extents } = self else {
            return None;
        };

        let world_axes = [
            orientation * Vec3::X,
            orientation * Vec3::Y,
            orientation * Vec3::Z,
        ];
        let extents = [half_extents.x, half_extents.y, half_extents.z];

        let mut best = 0;
        let mut best_dot = f32::MIN;
        for (index, axis) in world_axes.iter().enumerate() {
            let dot = axis.dot(direction).abs();
            if dot > best_dot {
                best_dot = dot;
                best = index;
            }
        }

        let sign = world_axes[best].dot(direction).signum();
        let normal = world_axes[best] * sign;
        let face_center = position + normal * extents[best];
        let u = world_axes[(best + 1) % 3] * extents[(best + 1) % 3];
        let v = world_axes[(best + 2) % 3] * extents[(best + 2) % 3];

        let corners = vec![
            face_center + u + v,
            face_center - u + v,
            face_center - u - v,
            face_center + u - v,
        ];
        Some((normal, corners))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cuboid_projection_accounts_for_rotation() {
        let shape = CollisionShape::cuboid(Vec3::ONE);
        let rotation = Quat::from_rotation_z(45.0_f32.to_radians());
        let (min, max) = shape.project(Vec3::ZERO, rotation, Vec3::X);
        assert_relative_eq!(max, 2.0_f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(min, -(2.0_f32.sqrt()), epsilon = 1e-5);
    }

    #[test]
    fn sphere_projection_is_radius_interval() {
        let shape = CollisionShape::sphere(0.5);
        let (min, max) = shape.project(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, Vec3::X);
        assert_relative_eq!(min, 1.5);
        assert_relative_eq!(max, 2.5);
    }

    #[test]
    fn face_polygon_picks_aligned_face() {
        let shape = CollisionShape::cuboid(Vec3::new(1.0, 2.0, 3.0));
        let (normal, corners) = shape
            .face_polygon(Vec3::ZERO, Quat::IDENTITY, Vec3::Y)
            .expect("cuboids have faces");
        assert_relative_eq!(normal.y, 1.0);
        assert_eq!(corners.len(), 4);
        for corner in corners {
            assert_relative_eq!(corner.y, 2.0);
        }
    }

    #[test]
    fn support_point_reaches_corner() {
        let shape = CollisionShape::cuboid(Vec3::ONE);
        let support = shape.support(Vec3::ZERO, Quat::IDENTITY, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(support, Vec3::ONE);
    }
}
