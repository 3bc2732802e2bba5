pub mod aabb;
pub mod mat22;
pub mod projection;
pub mod transform;
pub mod utils;
pub mod vec2;

pub use aabb::Aabb;
pub use mat22::Mat22;
pub use projection::Projection;
pub use transform::Transform;
pub use utils::{clamp_unit, random_range, random_unit};
pub use vec2::Vec2;
