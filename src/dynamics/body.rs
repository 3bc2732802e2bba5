use crate::dynamics::Material;
use crate::math::{Aabb, Projection, Transform, Vec2, clamp_unit};
use crate::shapes::Shape;

/// Per-axis speed below which a velocity component is snapped to zero.
pub const VELOCITY_THRESHOLD: Vec2 = Vec2::new(2.0, 2.0);

#[derive(Clone, Debug)]
pub struct BodyDef {
    pub shape: Shape,
    pub position: Vec2,
    pub material: Material,
    pub can_move: bool,
    pub can_rotate: bool,
    pub detect_aabb: bool,
    pub velocity: Vec2,
    pub force: Vec2,
    pub center_of_mass: Vec2,
}

impl BodyDef {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            position: Vec2::ZERO,
            material: Material::default(),
            can_move: true,
            can_rotate: false,
            detect_aabb: false,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            center_of_mass: Vec2::ZERO,
        }
    }

    /// Neither moves nor rotates.
    pub fn fixed(shape: impl Into<Shape>, position: Vec2) -> Self {
        Self {
            position,
            can_move: false,
            ..Self::new(shape)
        }
    }
}

/// Construction parameters kept for `Body::reset`.
#[derive(Copy, Clone, Debug)]
struct Initial {
    position: Vec2,
    material: Material,
    can_move: bool,
    can_rotate: bool,
    detect_aabb: bool,
    velocity: Vec2,
    force: Vec2,
    center_of_mass: Vec2,
}

/// A rigid body owning exactly one shape.
///
/// An inverse mass or inverse inertia of 0 stands for infinite mass or inertia.
#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub orientation: f32,

    pub velocity: Vec2,
    pub angular_velocity: f32,

    pub force: Vec2,
    pub torque: f32,

    impulse: Vec2,
    angular_impulse: f32,

    pub center_of_mass: Vec2,
    pub inv_mass: f32,
    pub inv_inertia: f32,
    pub material: Material,

    can_move: bool,
    can_rotate: bool,
    pub detect_aabb: bool,

    shape: Shape,
    initial: Initial,
}

impl Body {
    pub fn new(shape: impl Into<Shape>, position: Vec2, material: Material) -> Self {
        Self::from_def(BodyDef {
            position,
            material,
            ..BodyDef::new(shape)
        })
    }

    pub fn from_def(def: BodyDef) -> Self {
        let BodyDef {
            shape,
            position,
            material,
            can_move,
            can_rotate,
            detect_aabb,
            velocity,
            force,
            center_of_mass,
        } = def;

        let initial = Initial {
            position,
            material,
            can_move,
            can_rotate,
            detect_aabb,
            velocity,
            force,
            center_of_mass,
        };

        let mut body = Self {
            position,
            orientation: 0.0,
            velocity,
            angular_velocity: 0.0,
            force,
            torque: 0.0,
            impulse: Vec2::ZERO,
            angular_impulse: 0.0,
            center_of_mass,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            material,
            can_move,
            can_rotate,
            detect_aabb,
            shape,
            initial,
        };
        body.init();
        body
    }

    fn init(&mut self) {
        let Initial {
            position,
            material,
            can_move,
            can_rotate,
            detect_aabb,
            velocity,
            force,
            center_of_mass,
        } = self.initial;

        self.position = position;
        self.orientation = 0.0;
        self.velocity = velocity;
        self.angular_velocity = 0.0;
        self.force = force;
        self.torque = 0.0;
        self.impulse = Vec2::ZERO;
        self.angular_impulse = 0.0;
        self.center_of_mass = center_of_mass;
        self.material = material;
        self.can_move = can_move;
        self.can_rotate = can_rotate;
        self.detect_aabb = detect_aabb;

        self.compute_mass();
        self.compute_inertia();
        if !can_move && !can_rotate {
            self.freeze_motion();
        }
        if !can_rotate {
            self.freeze_rotation();
        }
        self.refresh_shape();
    }

    fn compute_mass(&mut self) {
        let mass = self.shape.area() * self.material.density;
        if mass < 0.0 {
            log::warn!("negative mass {mass} clamped to zero");
        }
        self.inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
    }

    fn compute_inertia(&mut self) {
        let inertia = self.shape.inertia(self.material.density);
        self.inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
    }

    /// Restore the construction parameters, keeping the same shape.
    pub fn reset(&mut self) {
        log::debug!("resetting body at {:?}", self.position);
        self.shape.reset();
        self.init();
    }

    /// Integrate one tick, then queue gravity and damp spin for the next.
    pub fn step(&mut self, dt: f32, gravity: Vec2, air_friction: f32) {
        if self.can_move {
            self.velocity += self.force * (self.inv_mass * dt);
        }
        self.flush_impulse();

        if self.velocity.x.abs() < VELOCITY_THRESHOLD.x {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < VELOCITY_THRESHOLD.y {
            self.velocity.y = 0.0;
        }

        if self.can_move {
            self.position += self.velocity * dt;
        }

        if self.can_rotate {
            self.angular_velocity += self.torque * self.inv_inertia * dt;
            self.orientation += self.angular_velocity * dt;
        } else {
            self.angular_velocity = 0.0;
        }

        self.force = Vec2::ZERO;
        self.torque = 0.0;
        self.refresh_shape();

        self.apply_gravity(gravity, (-self.center_of_mass).rotate(self.orientation));
        self.apply_air_friction(air_friction);
    }

    fn apply_gravity(&mut self, gravity: Vec2, point: Vec2) {
        let force = gravity * (self.mass() * self.material.gravity_scale);
        self.apply_force(force, point);
    }

    /// Spin decays by a fixed amount and stops instead of reversing.
    fn apply_air_friction(&mut self, friction: f32) {
        if self.angular_velocity > friction / 2.0 {
            self.angular_velocity -= friction;
        } else if self.angular_velocity < -friction / 2.0 {
            self.angular_velocity += friction;
        } else {
            self.angular_velocity = 0.0;
        }
    }

    pub fn apply_force(&mut self, force: Vec2, contact: Vec2) {
        if self.can_move {
            self.force += force;
        }
        if self.can_rotate {
            self.torque += contact.cross(force);
        }
    }

    /// Queue an impulse. Velocities only change on `flush_impulse`.
    pub fn apply_impulse(&mut self, impulse: Vec2, contact: Vec2) {
        if self.can_move {
            self.impulse += impulse;
        }
        if self.can_rotate {
            self.angular_impulse += contact.cross(impulse);
        }
    }

    pub fn flush_impulse(&mut self) {
        self.velocity += self.impulse * self.inv_mass;
        self.angular_velocity += self.angular_impulse * self.inv_inertia;
        self.impulse = Vec2::ZERO;
        self.angular_impulse = 0.0;
    }

    #[inline]
    pub fn pending_impulse(&self) -> (Vec2, f32) {
        (self.impulse, self.angular_impulse)
    }

    /// Move without touching velocity. A pinned body that can rotate turns
    /// about its pin instead, by the angle that carries its center of mass
    /// along `shift` as closely as a rotation can; this is approximate for
    /// large shifts.
    pub fn displace(&mut self, shift: Vec2) {
        if self.can_move {
            self.position += shift;
            self.refresh_shape();
        } else if self.can_rotate {
            let com = self.center_of_mass.rotate(self.orientation);
            let from = -com + shift;
            let to = -com;
            let lengths = from.length() * to.length();
            if lengths == 0.0 {
                return;
            }
            let sin_theta = from.cross(to) / lengths;
            self.orientation -= clamp_unit(sin_theta).asin();
            self.refresh_shape();
        }
    }

    /// Force of magnitude `strength / distance` toward `point`.
    pub fn attract_to(&mut self, point: Vec2, strength: f32) {
        let dir = point - self.position;
        let distance = dir.length();
        if distance == 0.0 {
            return;
        }
        self.force += dir.unit() * (strength / distance);
    }

    pub fn freeze_motion(&mut self) {
        self.inv_mass = 0.0;
        self.can_move = false;
    }

    pub fn enable_motion(&mut self) {
        self.compute_mass();
        self.can_move = true;
    }

    pub fn freeze_rotation(&mut self) {
        self.inv_inertia = 0.0;
        self.can_rotate = false;
    }

    pub fn enable_rotation(&mut self) {
        self.compute_inertia();
        self.can_rotate = true;
    }

    /// Move the body origin by `offset` (body frame) without moving the shape
    /// in the world.
    pub fn offset_center(&mut self, offset: Vec2) {
        self.shape.offset_center(offset);
        self.position += offset.rotate(self.orientation);
        self.center_of_mass += offset;
        self.refresh_shape();
    }

    /// Velocity of the material point at arm `r` from the origin.
    #[inline]
    pub fn combined_velocity(&self, r: Vec2) -> Vec2 {
        self.velocity + r.ortho() * self.angular_velocity
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.orientation)
    }

    /// Bring the shape's cached world data in line with the current transform.
    pub fn refresh_shape(&mut self) {
        let t = self.transform();
        self.shape.recalc(&t);
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        self.shape.aabb()
    }

    #[inline]
    pub fn project_onto(&self, axis: Vec2) -> Projection {
        self.shape.project_onto(axis)
    }

    #[inline]
    pub fn can_move(&self) -> bool {
        self.can_move
    }

    #[inline]
    pub fn can_rotate(&self) -> bool {
        self.can_rotate
    }

    /// Neither translates nor turns under any impulse.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.inv_mass == 0.0 && self.inv_inertia == 0.0
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        if self.inv_mass == 0.0 { 0.0 } else { 1.0 / self.inv_mass }
    }

    #[inline]
    pub fn restitution(&self) -> f32 {
        self.material.restitution
    }

    #[inline]
    pub fn static_friction(&self) -> f32 {
        self.material.static_friction
    }

    #[inline]
    pub fn dynamic_friction(&self) -> f32 {
        self.material.dynamic_friction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Polygon};
    use approx::assert_relative_eq;
    use core::f32::consts::PI;

    const DT: f32 = 1.0 / 60.0;

    fn square(def: impl FnOnce(BodyDef) -> BodyDef) -> Body {
        Body::from_def(def(BodyDef::new(Polygon::rectangle(2.0, 2.0))))
    }

    #[test]
    fn mass_comes_from_area_and_density() {
        let b = Body::new(
            Polygon::rectangle(2.0, 4.0),
            Vec2::ZERO,
            Material {
                density: 0.5,
                ..Material::default()
            },
        );
        assert_relative_eq!(b.mass(), 4.0, epsilon = 1e-5);
        assert_relative_eq!(b.inv_mass, 0.25, epsilon = 1e-6);
        // Rotation is off by default.
        assert_relative_eq!(b.inv_inertia, 0.0);
    }

    #[test]
    fn rotatable_body_gets_inverse_inertia() {
        let b = square(|d| BodyDef { can_rotate: true, ..d });
        let inertia = 4.0 * (4.0 + 4.0) / 12.0;
        assert_relative_eq!(b.inv_inertia, 1.0 / inertia, epsilon = 1e-5);
    }

    #[test]
    fn zero_density_is_immovable() {
        let b = Body::new(Circle::new(1.0), Vec2::ZERO, Material::STATIC);
        assert_relative_eq!(b.inv_mass, 0.0);
        assert_relative_eq!(b.mass(), 0.0);
    }

    #[test]
    fn pinned_rotating_body_keeps_inverse_mass() {
        let b = square(|d| BodyDef {
            can_move: false,
            can_rotate: true,
            ..d
        });
        assert!(b.inv_mass > 0.0);
        assert!(b.inv_inertia > 0.0);

        let fixed = square(|d| BodyDef { can_move: false, ..d });
        assert!(fixed.is_fixed());
    }

    #[test]
    fn forces_and_impulses_are_gated_by_flags() {
        let mut pinned = square(|d| BodyDef {
            can_move: false,
            can_rotate: true,
            ..d
        });
        pinned.apply_force(Vec2::new(0.0, 10.0), Vec2::new(1.0, 0.0));
        assert_relative_eq!(pinned.force, Vec2::ZERO);
        assert_relative_eq!(pinned.torque, 10.0);

        let mut slider = square(|d| d);
        slider.apply_impulse(Vec2::new(0.0, 10.0), Vec2::new(1.0, 0.0));
        assert_eq!(slider.pending_impulse(), (Vec2::new(0.0, 10.0), 0.0));
    }

    #[test]
    fn impulses_wait_for_flush() {
        let mut b = square(|d| d);
        b.apply_impulse(Vec2::new(8.0, 0.0), Vec2::ZERO);
        assert_relative_eq!(b.velocity, Vec2::ZERO);
        b.flush_impulse();
        assert_relative_eq!(b.velocity, Vec2::new(2.0, 0.0), epsilon = 1e-6);
        assert_eq!(b.pending_impulse(), (Vec2::ZERO, 0.0));
    }

    #[test]
    fn slow_components_snap_to_zero() {
        let mut b = square(|d| BodyDef {
            velocity: Vec2::new(1.99, -3.0),
            ..d
        });
        b.step(DT, Vec2::ZERO, 0.0);
        assert_eq!(b.velocity.x, 0.0);
        assert_relative_eq!(b.velocity.y, -3.0);
        assert_relative_eq!(b.position, Vec2::new(0.0, -3.0 * DT), epsilon = 1e-6);
    }

    #[test]
    fn gravity_is_queued_for_the_next_step() {
        let mut b = square(|d| d);
        let g = Vec2::new(0.0, -600.0);
        b.step(DT, g, 0.0);
        assert_relative_eq!(b.velocity, Vec2::ZERO);
        assert_relative_eq!(b.force, g * b.mass(), epsilon = 1e-3);

        b.step(DT, g, 0.0);
        assert_relative_eq!(b.velocity.y, -10.0, epsilon = 1e-4);
    }

    #[test]
    fn gravity_scale_scales_the_pull() {
        let mut b = Body::new(Circle::new(1.0), Vec2::ZERO, Material::default().with_gravity_scale(0.5));
        b.step(DT, Vec2::new(0.0, -10.0), 0.0);
        assert_relative_eq!(b.force.y, -5.0 * b.mass(), epsilon = 1e-4);
    }

    #[test]
    fn fixed_body_ignores_forces() {
        let mut b = square(|d| BodyDef {
            can_move: false,
            position: Vec2::new(3.0, 4.0),
            ..d
        });
        b.apply_force(Vec2::new(1e4, 1e4), Vec2::new(1.0, 1.0));
        for _ in 0..10 {
            b.step(DT, Vec2::new(0.0, -600.0), 0.01);
        }
        assert_relative_eq!(b.position, Vec2::new(3.0, 4.0));
        assert_relative_eq!(b.orientation, 0.0);
    }

    #[test]
    fn air_friction_stops_without_reversing() {
        let mut b = square(|d| BodyDef { can_rotate: true, ..d });
        b.angular_velocity = 0.75;
        b.step(DT, Vec2::ZERO, 0.5);
        assert_relative_eq!(b.angular_velocity, 0.25);
        b.step(DT, Vec2::ZERO, 0.5);
        assert_eq!(b.angular_velocity, 0.0);
    }

    #[test]
    fn rotation_is_dropped_when_disabled() {
        let mut b = square(|d| d);
        b.angular_velocity = 5.0;
        b.step(DT, Vec2::ZERO, 0.0);
        assert_eq!(b.angular_velocity, 0.0);
        assert_eq!(b.orientation, 0.0);
    }

    #[test]
    fn displace_moves_a_movable_body_and_its_shape() {
        let mut b = square(|d| d);
        b.velocity = Vec2::new(5.0, 0.0);
        b.displace(Vec2::new(0.5, 1.0));
        assert_relative_eq!(b.position, Vec2::new(0.5, 1.0));
        assert_relative_eq!(b.velocity, Vec2::new(5.0, 0.0));
        assert_relative_eq!(b.aabb().center(), Vec2::new(0.5, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn displace_turns_a_pinned_rotating_body() {
        let mut b = square(|d| BodyDef {
            can_move: false,
            can_rotate: true,
            center_of_mass: Vec2::new(-1.0, 0.0),
            ..d
        });
        // Center of mass sits one unit right of the pin; pushing it up turns
        // the body counter-clockwise.
        b.displace(Vec2::new(0.0, 1.0));
        assert_relative_eq!(b.orientation, PI / 4.0, epsilon = 1e-5);
        assert_relative_eq!(b.position, Vec2::ZERO);

        // Degenerate arm leaves the body untouched.
        let mut centered = square(|d| BodyDef {
            can_move: false,
            can_rotate: true,
            ..d
        });
        centered.displace(Vec2::new(0.0, 1.0));
        assert_eq!(centered.orientation, 0.0);
    }

    #[test]
    fn attraction_falls_off_with_distance() {
        let mut b = square(|d| d);
        b.attract_to(Vec2::new(4.0, 0.0), 8.0);
        assert_relative_eq!(b.force, Vec2::new(2.0, 0.0), epsilon = 1e-6);
        b.force = Vec2::ZERO;
        b.attract_to(b.position, 8.0);
        assert_relative_eq!(b.force, Vec2::ZERO);
    }

    #[test]
    fn freeze_and_enable_toggle_sentinels() {
        let mut b = square(|d| BodyDef { can_rotate: true, ..d });
        let (m, i) = (b.inv_mass, b.inv_inertia);

        b.freeze_motion();
        b.freeze_rotation();
        assert!(b.is_fixed());
        assert!(!b.can_move() && !b.can_rotate());

        b.enable_motion();
        b.enable_rotation();
        assert_relative_eq!(b.inv_mass, m);
        assert_relative_eq!(b.inv_inertia, i);
    }

    #[test]
    fn offset_center_keeps_the_shape_in_place() {
        let mut b = square(|d| BodyDef {
            position: Vec2::new(1.0, 1.0),
            ..d
        });
        let before = *b.aabb();
        b.offset_center(Vec2::new(1.0, 0.0));
        assert_relative_eq!(b.position, Vec2::new(2.0, 1.0));
        assert_relative_eq!(b.center_of_mass, Vec2::new(1.0, 0.0));
        assert_relative_eq!(b.aabb().min, before.min, epsilon = 1e-6);
        assert_relative_eq!(b.aabb().max, before.max, epsilon = 1e-6);
    }

    #[test]
    fn reset_restores_construction_state() {
        let mut b = square(|d| BodyDef {
            position: Vec2::new(0.0, 5.0),
            velocity: Vec2::new(3.0, 0.0),
            ..d
        });
        b.offset_center(Vec2::new(0.5, 0.0));
        for _ in 0..5 {
            b.step(DT, Vec2::new(0.0, -600.0), 0.0);
        }
        b.freeze_motion();

        b.reset();
        assert_relative_eq!(b.position, Vec2::new(0.0, 5.0));
        assert_relative_eq!(b.velocity, Vec2::new(3.0, 0.0));
        assert_relative_eq!(b.center_of_mass, Vec2::ZERO);
        assert!(b.can_move() && b.inv_mass > 0.0);
        assert_relative_eq!(b.aabb().center(), Vec2::new(0.0, 5.0), epsilon = 1e-6);
    }
}
