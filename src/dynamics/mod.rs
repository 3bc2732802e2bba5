pub mod body;
pub mod material;
pub mod participant;
pub mod world;

pub use body::{Body, BodyDef, VELOCITY_THRESHOLD};
pub use material::Material;
pub use participant::{Participant, PhysicsObject};
pub use world::{BodyHandle, StepStats, World, WorldConfig, pair_mut};
