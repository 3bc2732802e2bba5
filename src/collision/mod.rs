pub mod collide;
pub mod manifold;
pub mod pair;
pub mod rules;

pub use collide::collide;
pub use manifold::Manifold;
pub use pair::{CORRECTION_PERCENT, CORRECTION_SLOP, Collision};
pub use rules::{CollisionFlags, CollisionGroup, CollisionRule, CollisionRules, GroupSet};
