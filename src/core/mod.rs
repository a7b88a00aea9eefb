//! Core data model: rigid bodies and the handles the host owns them through.

pub mod body;

pub use body::{BodyHandle, CollisionEventHandler, RigidBody, RigidBodyBuilder};
