use crate::collision::{Collision, CollisionGroup, CollisionRules};
use crate::dynamics::{Body, BodyDef, Participant, PhysicsObject};
use crate::math::Vec2;

pub const DEFAULT_AIR_FRICTION: f32 = 0.01;

#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub usize);

#[derive(Copy, Clone, Debug)]
pub struct WorldConfig {
    pub minimize_penetration: bool,
    pub position_correction: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            minimize_penetration: true,
            position_correction: true,
        }
    }
}

/// What one `World::step` did.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StepStats {
    /// Pairs the rule table let through.
    pub pairs: usize,
    pub collisions: usize,
}

pub struct World<P: Participant = PhysicsObject> {
    pub gravity: Vec2,
    pub air_friction: f32,
    pub config: WorldConfig,
    pub rules: CollisionRules,
    objects: Vec<P>,
    collisions: Vec<Collision>,
}

impl<P: Participant> World<P> {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            air_friction: DEFAULT_AIR_FRICTION,
            config: WorldConfig::default(),
            rules: CollisionRules::standard(),
            objects: Vec::new(),
            collisions: Vec::new(),
        }
    }

    pub fn with_config(gravity: Vec2, config: WorldConfig) -> Self {
        Self {
            config,
            ..Self::new(gravity)
        }
    }

    pub fn with_rules(mut self, rules: CollisionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn add(&mut self, participant: P) -> BodyHandle {
        let id = self.objects.len();
        self.objects.push(participant);
        BodyHandle(id)
    }

    #[inline]
    pub fn get(&self, h: BodyHandle) -> &P {
        &self.objects[h.0]
    }

    #[inline]
    pub fn get_mut(&mut self, h: BodyHandle) -> &mut P {
        &mut self.objects[h.0]
    }

    #[inline]
    pub fn body(&self, h: BodyHandle) -> &Body {
        self.objects[h.0].body()
    }

    #[inline]
    pub fn body_mut(&mut self, h: BodyHandle) -> &mut Body {
        self.objects[h.0].body_mut()
    }

    pub fn participants(&self) -> &[P] {
        &self.objects
    }

    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + use<P> {
        (0..self.objects.len()).map(BodyHandle)
    }

    /// Collisions detected by the last `step`.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.collisions.clear();
    }

    /// Put every body back in its construction state.
    pub fn reset(&mut self) {
        for obj in &mut self.objects {
            obj.body_mut().reset();
        }
        self.collisions.clear();
    }

    /// One tick: integrate every live body, then detect and resolve every
    /// pair, then correct positions once all velocities are settled.
    ///
    /// A pair of two fixed bodies is still detected and notified, but never
    /// resolved or kept in `collisions`.
    pub fn step(&mut self, dt: f32) -> StepStats {
        let World {
            gravity,
            air_friction,
            config,
            rules,
            objects,
            collisions,
        } = self;

        for obj in objects.iter_mut().filter(|o| o.is_alive()) {
            obj.body_mut().step(dt, *gravity, *air_friction);
        }

        collisions.clear();
        let mut stats = StepStats::default();
        let n = objects.len();
        for i in 0..n {
            for j in i + 1..n {
                let (a, b) = (BodyHandle(i), BodyHandle(j));
                let Some(mut collision) = Collision::make_if_needed(a, b, objects, rules) else {
                    continue;
                };
                let both_fixed = objects[i].body().is_fixed() && objects[j].body().is_fixed();
                stats.pairs += 1;

                if !collision.possible(objects) || !collision.detect(objects) {
                    continue;
                }
                stats.collisions += 1;

                let flags = collision.flags();
                let (group_a, group_b) = (objects[i].group(), objects[j].group());
                if flags.detect_a {
                    objects[i].collided(b, group_b);
                }
                if flags.detect_b {
                    objects[j].collided(a, group_a);
                }

                if both_fixed {
                    continue;
                }
                if config.minimize_penetration {
                    collision.minimize_penetration(dt, objects);
                }
                collision.resolve(objects);
                collisions.push(collision);
            }
        }

        if config.position_correction {
            for collision in collisions.iter() {
                collision.positional_correction(objects);
            }
        }

        log::debug!(
            "step dt={dt:.4}: {} bodies, {} pairs, {} collisions",
            n,
            stats.pairs,
            stats.collisions
        );
        stats
    }
}

impl World<PhysicsObject> {
    pub fn create_body(&mut self, def: BodyDef, group: CollisionGroup) -> BodyHandle {
        self.add(PhysicsObject::new(Body::from_def(def), group))
    }
}

/// Two distinct elements of a slice, mutably.
pub fn pair_mut<T>(items: &mut [T], a: BodyHandle, b: BodyHandle) -> (&mut T, &mut T) {
    assert!(a != b, "pair_mut called with identical handles");

    let (i, j) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
    let (left, right) = items.split_at_mut(j);
    let first = &mut left[i];
    let second = &mut right[0];

    if a.0 < b.0 { (first, second) } else { (second, first) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Polygon};
    use approx::assert_relative_eq;

    #[test]
    fn create_body_returns_sequential_handles() {
        let mut world: World = World::new(Vec2::new(0.0, -10.0));
        let a = world.create_body(BodyDef::new(Circle::new(1.0)), CollisionGroup::Default);
        let b = world.create_body(BodyDef::new(Circle::new(2.0)), CollisionGroup::Wall);
        assert_eq!((a, b), (BodyHandle(0), BodyHandle(1)));
        assert_eq!(world.len(), 2);
        assert_eq!(world.get(b).group, CollisionGroup::Wall);
    }

    #[test]
    fn pair_mut_returns_in_argument_order() {
        let mut v = vec![1, 2, 3, 4];
        let (x, y) = pair_mut(&mut v, BodyHandle(3), BodyHandle(1));
        assert_eq!((*x, *y), (4, 2));
        *x = 40;
        *y = 20;
        assert_eq!(v, vec![1, 20, 3, 40]);
    }

    #[test]
    #[should_panic]
    fn pair_mut_rejects_aliasing() {
        let mut v = vec![1, 2];
        let _ = pair_mut(&mut v, BodyHandle(1), BodyHandle(1));
    }

    #[test]
    fn static_body_stays_put() {
        let mut world: World = World::new(Vec2::new(0.0, -600.0));
        let h = world.create_body(
            BodyDef::fixed(Polygon::rectangle(1.0, 1.0), Vec2::new(0.0, 5.0)),
            CollisionGroup::Default,
        );
        for _ in 0..10 {
            world.step(0.1);
        }
        assert_relative_eq!(world.body(h).position, Vec2::new(0.0, 5.0));
        assert_relative_eq!(world.body(h).velocity, Vec2::ZERO);
    }

    #[test]
    fn both_fixed_pairs_without_detection_are_skipped() {
        let mut world: World = World::new(Vec2::ZERO);
        world.create_body(BodyDef::fixed(Circle::new(1.0), Vec2::ZERO), CollisionGroup::Wall);
        world.create_body(BodyDef::fixed(Circle::new(1.0), Vec2::new(0.5, 0.0)), CollisionGroup::Platforms);
        let stats = world.step(1.0 / 60.0);
        assert_eq!(stats, StepStats::default());
        assert!(world.collisions().is_empty());
    }

    #[test]
    fn fixed_sensor_over_fixed_platform_is_notified() {
        let mut world: World = World::new(Vec2::new(0.0, -600.0));
        let platform = world.create_body(
            BodyDef::fixed(Polygon::rectangle(10.0, 2.0), Vec2::new(0.0, -1.0)),
            CollisionGroup::Platforms,
        );
        let sensor = world.create_body(
            BodyDef::fixed(Polygon::rectangle(2.0, 2.0), Vec2::new(0.0, 0.5)),
            CollisionGroup::Sensors,
        );

        let stats = world.step(1.0 / 60.0);
        assert_eq!(stats.pairs, 1);
        assert_eq!(stats.collisions, 1);
        assert_eq!(world.get(sensor).hits(), &[(platform, CollisionGroup::Platforms)]);
        assert!(world.get(platform).hits().is_empty());
        assert!(world.collisions().is_empty());
        assert_relative_eq!(world.body(sensor).position, Vec2::new(0.0, 0.5));
        assert_relative_eq!(world.body(platform).position, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn dead_bodies_do_not_integrate_or_collide() {
        let mut world: World = World::new(Vec2::ZERO);
        let a = world.create_body(
            BodyDef {
                velocity: Vec2::new(30.0, 0.0),
                ..BodyDef::new(Circle::new(1.0))
            },
            CollisionGroup::Default,
        );
        world.create_body(BodyDef::new(Circle::new(1.0)), CollisionGroup::Default);
        world.get_mut(a).kill();

        let stats = world.step(1.0 / 60.0);
        assert_relative_eq!(world.body(a).position, Vec2::ZERO);
        assert_eq!(stats.pairs, 1);
        assert_eq!(stats.collisions, 0);
    }

    #[test]
    fn detecting_sides_are_notified() {
        let mut world: World = World::new(Vec2::ZERO);
        let player = world.create_body(BodyDef::new(Circle::new(1.0)), CollisionGroup::Player);
        let wall = world.create_body(
            BodyDef::fixed(Polygon::rectangle(2.0, 10.0), Vec2::new(1.5, 0.0)),
            CollisionGroup::Wall,
        );
        let stats = world.step(1.0 / 60.0);
        assert_eq!(stats.collisions, 1);
        assert_eq!(world.get(player).hits(), &[(wall, CollisionGroup::Wall)]);
        // Walls detect nothing.
        assert!(world.get(wall).hits().is_empty());
        assert_eq!(world.collisions().len(), 1);
    }

    #[test]
    fn reset_restores_every_body() {
        let mut world: World = World::new(Vec2::new(0.0, -600.0));
        let h = world.create_body(
            BodyDef {
                position: Vec2::new(0.0, 50.0),
                ..BodyDef::new(Circle::new(1.0))
            },
            CollisionGroup::Default,
        );
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        assert!(world.body(h).position.y < 50.0);
        world.reset();
        assert_relative_eq!(world.body(h).position, Vec2::new(0.0, 50.0));
        assert_relative_eq!(world.body(h).velocity, Vec2::ZERO);
        assert!(world.collisions().is_empty());
    }
}
