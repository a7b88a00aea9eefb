//! Kinetica – a deterministic fixed-timestep rigid-body physics core.
//!
//! The crate advances dynamic bodies under gravity and applied forces,
//! detects collisions with a broad-phase/narrow-phase split, and resolves
//! contacts and joints with a sequential-impulse solver, once per fixed
//! simulation step. The host scene owns the bodies; [`PhysicsWorld`]
//! snapshots them each step through the [`BodySource`] boundary and hands
//! transforms back through the bodies' cached-state invalidation flags.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod utils;
pub mod world;

pub use glam::{Mat3, Mat4, Quat, Vec3};

pub use crate::core::{BodyHandle, CollisionEventHandler, RigidBody, RigidBodyBuilder};
pub use collision::{
    Broadphase, BruteForceBroadphase, CollisionDetector, CollisionPair, CollisionShape,
    ContactPoint, Manifold, SpatialGridBroadphase,
};
pub use dynamics::{
    integrate, Constraint, DistanceConstraint, IntegrationScheme, SequentialImpulseSolver,
    SpringConstraint, StepContext,
};
pub use world::{BodySource, PhysicsWorld, StepMetrics, StepMode};
