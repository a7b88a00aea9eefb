//! Simulation dynamics: integration schemes, joints, and the impulse solver.

pub mod constraint;
pub mod integrator;
pub mod solver;

pub use constraint::{Constraint, DistanceConstraint, SpringConstraint};
pub use integrator::{integrate, IntegrationScheme, StepContext};
pub use solver::SequentialImpulseSolver;
