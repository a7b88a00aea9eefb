//! Collision pipeline: broad-phase pruning, exact narrow-phase testing, and
//! contact manifold construction.

pub mod broadphase;
pub mod clipping;
pub mod manifold;
pub mod narrowphase;
pub mod shapes;

pub use broadphase::{Broadphase, BruteForceBroadphase, CollisionPair, SpatialGridBroadphase};
pub use manifold::{ContactPoint, Manifold};
pub use narrowphase::{CollisionData, CollisionDetector};
pub use shapes::CollisionShape;
