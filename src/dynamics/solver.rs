use crate::{collision::manifold::Manifold, config::SOLVER_ITERATIONS, dynamics::constraint::Constraint};

/// Sequential-impulse (Gauss-Seidel style) resolver for contact manifolds
/// and joints.
///
/// Per step it runs one pre-solve pass over every manifold and constraint,
/// then a fixed number of impulse iterations. Within an iteration every
/// manifold is visited before any constraint; each pass reads the
/// velocities left by the previous one. The ordering is part of the
/// contract so repeated runs converge the same way.
#[derive(Debug, Clone)]
pub struct SequentialImpulseSolver {
    pub iterations: u32,
}

impl Default for SequentialImpulseSolver {
    fn default() -> Self {
        Self::new(SOLVER_ITERATIONS)
    }
}

impl SequentialImpulseSolver {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn solve(
        &self,
        manifolds: &mut [Manifold],
        constraints: &mut [Box<dyn Constraint>],
        dt: f32,
    ) {
        for manifold in manifolds.iter_mut() {
            manifold.pre_solve(dt);
        }
        for constraint in constraints.iter_mut() {
            constraint.pre_solve(dt);
        }

        for _ in 0..self.iterations {
            for manifold in manifolds.iter_mut() {
                manifold.apply_impulse();
            }
            for constraint in constraints.iter_mut() {
                constraint.apply_impulse();
            }
        }
    }
}
