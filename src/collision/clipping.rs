use glam::Vec3;

const EPSILON: f32 = 1e-4;

/// Reference face of a faceted contact: the polygon the incident face is
/// cut down against, carrying one outward side plane per edge.
///
/// Separations are measured against the face plane itself — negative for a
/// point below the face (penetrating), positive above it.
pub struct ReferenceFace {
    normal: Vec3,
    offset: f32,
    side_planes: Vec<(Vec3, f32)>,
}

/// Incident-face vertex surviving the clip, together with its separation
/// from the reference plane.
#[derive(Debug, Clone, Copy)]
pub struct ClippedVertex {
    pub point: Vec3,
    pub separation: f32,
}

impl ReferenceFace {
    pub fn new(corners: &[Vec3], normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        let offset = corners.first().map(|&c| normal.dot(c)).unwrap_or(0.0);
        let centroid = corners.iter().copied().sum::<Vec3>() / corners.len().max(1) as f32;

        // One plane per edge, oriented away from the centroid so the face
        // interior is the negative side regardless of winding.
        let mut side_planes = Vec::with_capacity(corners.len());
        for i in 0..corners.len() {
            let start = corners[i];
            let end = corners[(i + 1) % corners.len()];
            let mut side = (end - start).cross(normal).normalize_or_zero();
            if side == Vec3::ZERO {
                continue;
            }
            if side.dot(centroid - start) > 0.0 {
                side = -side;
            }
            side_planes.push((side, side.dot(start)));
        }

        Self {
            normal,
            offset,
            side_planes,
        }
    }

    /// Cuts the incident polygon down to this face's footprint
    /// (Sutherland-Hodgman against every side plane) and reports each
    /// surviving vertex with its depth against the reference plane. An
    /// empty result means the faces share no footprint.
    pub fn clip_incident(&self, incident: &[Vec3]) -> Vec<ClippedVertex> {
        let mut polygon = incident.to_vec();
        let mut scratch = Vec::with_capacity(polygon.len() + 2);

        for &(side, offset) in &self.side_planes {
            clip_step(&polygon, side, offset, &mut scratch);
            std::mem::swap(&mut polygon, &mut scratch);
            if polygon.is_empty() {
                break;
            }
        }

        polygon
            .into_iter()
            .map(|point| ClippedVertex {
                point,
                separation: self.normal.dot(point) - self.offset,
            })
            .collect()
    }
}

/// One clip pass: keeps vertices on the inner side of the plane and
/// splices an intersection point in wherever an edge crosses it.
fn clip_step(input: &[Vec3], side: Vec3, offset: f32, output: &mut Vec<Vec3>) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let mut prev = last;
    let mut prev_dist = side.dot(prev) - offset;
    for &current in input {
        let dist = side.dot(current) - offset;
        let prev_inside = prev_dist <= EPSILON;
        let inside = dist <= EPSILON;

        if prev_inside != inside {
            let denom = prev_dist - dist;
            if denom.abs() > EPSILON {
                let t = prev_dist / denom;
                output.push(prev + (current - prev) * t);
            }
        }
        if inside {
            output.push(current);
        }

        prev = current;
        prev_dist = dist;
    }
}
