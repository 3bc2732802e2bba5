/// Surface and mass parameters of a body.
///
/// When two bodies touch, each coefficient of the pair is the smaller of the two.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub density: f32,
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub gravity_scale: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            restitution: 0.2,
            static_friction: 0.5,
            dynamic_friction: 0.3,
            gravity_scale: 1.0,
        }
    }
}

impl Material {
    pub const ROCK: Self = Self::new(0.6, 0.1, 0.6, 0.3);
    pub const WOOD: Self = Self::new(0.3, 0.2, 0.5, 0.3);
    pub const METAL: Self = Self::new(1.2, 0.05, 0.3, 0.2);
    pub const BOUNCY_BALL: Self = Self::new(0.3, 0.8, 0.4, 0.2);
    pub const PILLOW: Self = Self::new(0.1, 0.2, 0.6, 0.4);
    pub const STATIC: Self = Self::new(0.0, 0.4, 0.5, 0.3);

    pub const fn new(density: f32, restitution: f32, static_friction: f32, dynamic_friction: f32) -> Self {
        Self {
            density,
            restitution,
            static_friction,
            dynamic_friction,
            gravity_scale: 1.0,
        }
    }

    #[inline]
    pub const fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }
}
