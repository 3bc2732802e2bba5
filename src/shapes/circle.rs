use core::f32::consts::PI;

use crate::math::{Aabb, Projection, Transform, Vec2};

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    radius: f32,
    local_center: Vec2,
    offset: Vec2,
    center: Vec2,
    aabb: Aabb,
}

impl Circle {
    /// Circle centered on the body origin. A negative radius is taken by magnitude.
    pub fn new(radius: f32) -> Self {
        let radius = radius.abs();
        Self {
            radius,
            local_center: Vec2::ZERO,
            offset: Vec2::ZERO,
            center: Vec2::ZERO,
            aabb: Aabb::from_center(Vec2::ZERO, Vec2::new(radius, radius)),
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// World-space center as of the last `recalc`.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub fn area(&self) -> f32 {
        PI * self.radius * self.radius
    }

    /// Moment about the body origin.
    pub fn inertia(&self, density: f32) -> f32 {
        let mass = self.area() * density;
        0.5 * mass * self.radius * self.radius + mass * self.local_center.length_squared()
    }

    pub fn recalc(&mut self, t: &Transform) {
        self.center = t.apply(self.local_center);
        self.aabb = Aabb::from_center(self.center, Vec2::new(self.radius, self.radius));
    }

    /// `axis` is expected to be unit length.
    pub fn project_onto(&self, axis: Vec2) -> Projection {
        let c = self.center.dot(axis);
        Projection::new(c - self.radius, c + self.radius)
    }

    pub(crate) fn offset_center(&mut self, offset: Vec2) {
        self.local_center -= offset;
        self.offset += offset;
    }

    pub(crate) fn reset(&mut self) {
        let o = self.offset;
        self.offset_center(-o);
    }
}
