//! Math helpers layered on top of `glam`.

use glam::{Mat3, Quat, Vec3};

/// Converts an angular velocity (radians/sec) into the quaternion delta it
/// produces over `dt`.
pub fn angular_velocity_to_quat(angular: Vec3, dt: f32) -> Quat {
    let angle = angular.length() * dt;
    if angle.abs() < 1e-6 {
        return Quat::IDENTITY;
    }
    let axis = angular.normalize();
    Quat::from_axis_angle(axis, angle)
}

/// Inertia tensor of a solid cuboid with the given half extents.
pub fn inertia_cuboid(half_extents: Vec3, mass: f32) -> Mat3 {
    let lx = half_extents.x * 2.0;
    let ly = half_extents.y * 2.0;
    let lz = half_extents.z * 2.0;
    let factor = mass / 12.0;
    Mat3::from_diagonal(Vec3::new(
        factor * (ly * ly + lz * lz),
        factor * (lx * lx + lz * lz),
        factor * (lx * lx + ly * ly),
    ))
}

/// Inertia tensor of a solid sphere.
pub fn inertia_sphere(radius: f32, mass: f32) -> Mat3 {
    Mat3::from_diagonal(Vec3::splat(0.4 * mass * radius * radius))
}

/// Any unit vector perpendicular to `normal`; used as a friction tangent
/// when the relative velocity has no tangential component.
pub fn orthogonal_to_normal(normal: Vec3) -> Vec3 {
    let mut tangent = normal.cross(Vec3::X);
    if tangent.length_squared() <= 1e-6 {
        tangent = normal.cross(Vec3::Y);
    }
    tangent.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angular_delta_rotates_about_axis() {
        let delta = angular_velocity_to_quat(Vec3::new(0.0, std::f32::consts::PI, 0.0), 1.0);
        let rotated = delta * Vec3::X;
        assert!((rotated + Vec3::X).length() < 1e-5, "expected half turn, got {rotated:?}");
    }

    #[test]
    fn zero_angular_velocity_is_identity() {
        assert_eq!(angular_velocity_to_quat(Vec3::ZERO, 1.0 / 60.0), Quat::IDENTITY);
    }
}
