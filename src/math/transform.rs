use crate::math::{Mat22, Vec2};

/// Placement of a body: translation plus orientation, with the rotation
/// matrix cached so shapes can map many local points cheaply.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub angle: f32,
    pub rotation: Mat22,
}

impl Transform {
    #[inline]
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self {
            position,
            angle,
            rotation: Mat22::from_angle(angle),
        }
    }

    /// Local point to world space.
    #[inline]
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.position + self.rotation * local
    }

    /// Local direction to world space (no translation).
    #[inline]
    pub fn apply_vector(&self, local: Vec2) -> Vec2 {
        self.rotation * local
    }

    #[inline]
    pub fn inverse_apply(&self, world: Vec2) -> Vec2 {
        self.rotation.transpose() * (world - self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn apply_then_inverse_is_identity() {
        let t = Transform::new(Vec2::new(3.0, -2.0), 1.1);
        let p = Vec2::new(0.5, 4.0);
        assert_relative_eq!(t.inverse_apply(t.apply(p)), p, epsilon = 1e-5);
    }

    #[test]
    fn apply_rotates_about_position() {
        let t = Transform::new(Vec2::new(1.0, 1.0), core::f32::consts::PI);
        assert_relative_eq!(t.apply(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(t.apply_vector(Vec2::new(1.0, 0.0)), Vec2::new(-1.0, 0.0), epsilon = 1e-5);
    }
}
