use crate::math::Vec2;
use crate::shapes::Edge;

/// Contact description of one detected collision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from shape A toward shape B.
    pub normal: Vec2,
    pub penetration: f32,
    pub contacts: Vec<Vec2>,
    /// Position of the winning axis in the combined axis list (A's edges first).
    pub axis_index: usize,
    /// The side (or bare axis) that produced the minimum overlap.
    pub edge: Edge,
}
