pub mod circle;
pub mod concave;
pub mod edge;
pub mod polygon;

pub use circle::Circle;
pub use concave::ConcavePolygon;
pub use edge::Edge;
pub use polygon::Polygon;

use crate::math::{Aabb, Projection, Transform, Vec2};

/// The geometry a body owns. The narrow phase matches on this exhaustively,
/// so the set of variants is closed.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
    Concave(ConcavePolygon),
}

impl Shape {
    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.area(),
            Shape::Polygon(p) => p.area(),
            Shape::Concave(c) => c.area(),
        }
    }

    pub fn inertia(&self, density: f32) -> f32 {
        match self {
            Shape::Circle(c) => c.inertia(density),
            Shape::Polygon(p) => p.inertia(density),
            Shape::Concave(c) => c.inertia(density),
        }
    }

    /// Refresh the cached world-space data. Nothing else updates it.
    pub fn recalc(&mut self, t: &Transform) {
        match self {
            Shape::Circle(c) => c.recalc(t),
            Shape::Polygon(p) => p.recalc(t),
            Shape::Concave(c) => c.recalc(t),
        }
    }

    pub fn aabb(&self) -> &Aabb {
        match self {
            Shape::Circle(c) => c.aabb(),
            Shape::Polygon(p) => p.aabb(),
            Shape::Concave(c) => c.aabb(),
        }
    }

    pub fn project_onto(&self, axis: Vec2) -> Projection {
        match self {
            Shape::Circle(c) => c.project_onto(axis),
            Shape::Polygon(p) => p.project_onto(axis),
            Shape::Concave(c) => c.project_onto(axis),
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Circle(c) => c.center(),
            Shape::Polygon(p) => p.center(),
            Shape::Concave(c) => c.center(),
        }
    }

    /// Convex parts of a concave shape, empty for the other variants.
    pub fn sub_shapes(&self) -> &[Polygon] {
        match self {
            Shape::Concave(c) => c.parts(),
            _ => &[],
        }
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(self, Shape::Concave(_))
    }

    /// The convex piece a collision tests on this side, if the slot names one.
    pub fn convex(&self, slot: ShapeSlot) -> Option<Convex<'_>> {
        match (self, slot) {
            (Shape::Circle(c), ShapeSlot::Whole) => Some(Convex::Circle(c)),
            (Shape::Polygon(p), ShapeSlot::Whole) => Some(Convex::Polygon(p)),
            (Shape::Concave(c), ShapeSlot::Part(i)) => c.parts().get(i).map(Convex::Polygon),
            _ => None,
        }
    }

    /// Shift the geometry by `-offset` in the body frame, so the body origin
    /// can move by `offset` without the shape moving in the world.
    pub(crate) fn offset_center(&mut self, offset: Vec2) {
        match self {
            Shape::Circle(c) => c.offset_center(offset),
            Shape::Polygon(p) => p.offset_center(offset),
            Shape::Concave(c) => c.offset_center(offset),
        }
    }

    /// Undo every `offset_center` applied since construction.
    pub(crate) fn reset(&mut self) {
        match self {
            Shape::Circle(c) => c.reset(),
            Shape::Polygon(p) => p.reset(),
            Shape::Concave(c) => c.reset(),
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Shape::Polygon(p)
    }
}

impl From<ConcavePolygon> for Shape {
    fn from(c: ConcavePolygon) -> Self {
        Shape::Concave(c)
    }
}

/// Which piece of a body's shape a collision refers to.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ShapeSlot {
    #[default]
    Whole,
    Part(usize),
}

/// Borrowed view of a convex piece, as the separating-axis test sees it.
#[derive(Copy, Clone, Debug)]
pub enum Convex<'a> {
    Circle(&'a Circle),
    Polygon(&'a Polygon),
}

impl Convex<'_> {
    #[inline]
    pub fn project_onto(&self, axis: Vec2) -> Projection {
        match self {
            Convex::Circle(c) => c.project_onto(axis),
            Convex::Polygon(p) => p.project_onto(axis),
        }
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        match self {
            Convex::Circle(c) => c.aabb(),
            Convex::Polygon(p) => p.aabb(),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        match self {
            Convex::Circle(c) => c.center(),
            Convex::Polygon(p) => p.center(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slots_resolve_to_convex_pieces() {
        let circle: Shape = Circle::new(1.0).into();
        assert!(matches!(circle.convex(ShapeSlot::Whole), Some(Convex::Circle(_))));
        assert!(circle.convex(ShapeSlot::Part(0)).is_none());
        assert!(circle.sub_shapes().is_empty());

        let concave: Shape = ConcavePolygon::new(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(1.5, 1.0),
            Vec2::new(0.0, 3.0),
        ])
        .unwrap()
        .into();
        assert!(concave.is_composite());
        assert!(concave.convex(ShapeSlot::Whole).is_none());
        let n = concave.sub_shapes().len();
        assert!(n >= 2);
        assert!(matches!(concave.convex(ShapeSlot::Part(n - 1)), Some(Convex::Polygon(_))));
        assert!(concave.convex(ShapeSlot::Part(n)).is_none());
    }

    #[test]
    fn offset_center_keeps_world_geometry_when_origin_moves() {
        let mut s: Shape = Polygon::rectangle(2.0, 2.0).into();
        s.offset_center(Vec2::new(1.0, 0.0));
        s.recalc(&Transform::new(Vec2::new(1.0, 0.0), 0.0));
        assert_relative_eq!(s.center(), Vec2::ZERO, epsilon = 1e-6);

        s.reset();
        s.recalc(&Transform::new(Vec2::new(1.0, 0.0), 0.0));
        assert_relative_eq!(s.center(), Vec2::new(1.0, 0.0), epsilon = 1e-6);
    }
}
