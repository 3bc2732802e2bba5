//! A small 2D rigid-body engine: circles, convex and concave polygons, SAT
//! narrow phase, group-filtered collision pairs and impulse resolution with
//! positional correction.

pub mod collision;
pub mod dynamics;
pub mod error;
pub mod math;
pub mod shapes;

pub use error::ShapeError;
