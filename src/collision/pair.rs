use crate::collision::collide::collide;
use crate::collision::{CollisionFlags, CollisionRules, Manifold};
use crate::dynamics::{Body, BodyHandle, Participant, pair_mut};
use crate::math::{Aabb, Vec2};
use crate::shapes::{Shape, ShapeSlot};

/// Share of the penetration removed by one positional correction pass.
pub const CORRECTION_PERCENT: f32 = 0.8;
/// Penetration left alone so resting contacts do not jitter.
pub const CORRECTION_SLOP: f32 = 0.03;

const TOI_MAX_STEPS: u32 = 10;
const TOI_PENETRATION_THRESHOLD: f32 = 0.1;
/// Closing speed along the normal above which the bisection runs.
const TOI_VELOCITY_THRESHOLD: f32 = 50.0;

#[derive(Clone, Debug)]
struct SubCollision {
    collision: Collision,
    detected: bool,
}

/// One candidate pair, rebuilt every tick.
///
/// When either side is a concave shape the pair owns one child per pair of
/// convex pieces and forwards every operation to the children that detected.
/// Children are always convex against convex, so the tree is one level deep.
#[derive(Clone, Debug)]
pub struct Collision {
    pub a: BodyHandle,
    pub b: BodyHandle,
    slot_a: ShapeSlot,
    slot_b: ShapeSlot,
    flags: CollisionFlags,
    aabb_only: bool,
    manifold: Option<Manifold>,
    children: Vec<SubCollision>,
}

impl Collision {
    pub fn new<P: Participant>(a: BodyHandle, b: BodyHandle, participants: &[P], rules: &CollisionRules) -> Self {
        let (pa, pb) = (&participants[a.0], &participants[b.0]);
        let flags = rules.flags(pa.group(), pb.group());
        let mut collision = Self::with_slots(a, b, ShapeSlot::Whole, ShapeSlot::Whole, flags);

        let parts_a = pa.body().shape().sub_shapes().len();
        let parts_b = pb.body().shape().sub_shapes().len();
        let slots = |n: usize| -> Vec<ShapeSlot> {
            if n == 0 {
                vec![ShapeSlot::Whole]
            } else {
                (0..n).map(ShapeSlot::Part).collect()
            }
        };

        if parts_a > 0 || parts_b > 0 {
            for sa in slots(parts_a) {
                for sb in slots(parts_b) {
                    collision.children.push(SubCollision {
                        collision: Self::with_slots(a, b, sa, sb, flags),
                        detected: false,
                    });
                }
            }
        }
        collision
    }

    fn with_slots(a: BodyHandle, b: BodyHandle, slot_a: ShapeSlot, slot_b: ShapeSlot, flags: CollisionFlags) -> Self {
        Self {
            a,
            b,
            slot_a,
            slot_b,
            flags,
            aabb_only: false,
            manifold: None,
            children: Vec::new(),
        }
    }

    /// A collision for the pair if the rule table lets their groups meet.
    pub fn make_if_needed<P: Participant>(
        a: BodyHandle,
        b: BodyHandle,
        participants: &[P],
        rules: &CollisionRules,
    ) -> Option<Self> {
        if a == b {
            return None;
        }
        let (ga, gb) = (participants[a.0].group(), participants[b.0].group());
        rules.should_collide(ga, gb).then(|| Self::new(a, b, participants, rules))
    }

    #[inline]
    pub fn flags(&self) -> CollisionFlags {
        self.flags
    }

    /// Manifold from the last successful `detect`. Composite pairs keep theirs
    /// in the children; AABB-only detections have none.
    #[inline]
    pub fn manifold(&self) -> Option<&Manifold> {
        self.manifold.as_ref()
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }

    /// Child pairs with the detection result of the last `detect`.
    pub fn children(&self) -> impl Iterator<Item = (&Collision, bool)> {
        self.children.iter().map(|c| (&c.collision, c.detected))
    }

    /// Every manifold this collision produced, its own or its detected children's.
    pub fn manifolds(&self) -> Vec<&Manifold> {
        if self.is_composite() {
            self.children
                .iter()
                .filter(|c| c.detected)
                .flat_map(|c| c.collision.manifolds())
                .collect()
        } else {
            self.manifold.iter().collect()
        }
    }

    fn side_aabb<'s>(shape: &'s Shape, slot: ShapeSlot) -> &'s Aabb {
        match slot {
            ShapeSlot::Part(i) => shape.sub_shapes().get(i).map_or(shape.aabb(), |p| p.aabb()),
            ShapeSlot::Whole => shape.aabb(),
        }
    }

    /// Cheap pre-filter: both alive and bounding boxes touching. When either
    /// side wants box-only detection the real test is deferred to `detect`.
    pub fn possible<P: Participant>(&self, participants: &[P]) -> bool {
        let (pa, pb) = (&participants[self.a.0], &participants[self.b.0]);
        if !pa.is_alive() || !pb.is_alive() {
            return false;
        }
        if pa.body().detect_aabb || pb.body().detect_aabb {
            return true;
        }
        let box_a = Self::side_aabb(pa.body().shape(), self.slot_a);
        let box_b = Self::side_aabb(pb.body().shape(), self.slot_b);
        box_a.overlaps(box_b)
    }

    /// Run the narrow phase against the shapes' cached world data.
    pub fn detect<P: Participant>(&mut self, participants: &[P]) -> bool {
        let (ba, bb) = (participants[self.a.0].body(), participants[self.b.0].body());

        if ba.detect_aabb || bb.detect_aabb {
            self.aabb_only = true;
            self.manifold = None;
            let box_a = Self::side_aabb(ba.shape(), self.slot_a);
            let box_b = Self::side_aabb(bb.shape(), self.slot_b);
            return box_a.overlaps(box_b);
        }
        self.aabb_only = false;

        if self.is_composite() {
            let mut detected = false;
            for child in &mut self.children {
                child.detected = child.collision.possible(participants) && child.collision.detect(participants);
                detected |= child.detected;
            }
            return detected;
        }

        self.manifold = match (ba.shape().convex(self.slot_a), bb.shape().convex(self.slot_b)) {
            (Some(ca), Some(cb)) => collide(ca, cb),
            _ => None,
        };
        self.manifold.is_some()
    }

    /// Velocity of B relative to A at the given arms.
    pub fn relative_velocity<P: Participant>(&self, rad_a: Vec2, rad_b: Vec2, participants: &[P]) -> Vec2 {
        let (ba, bb) = (participants[self.a.0].body(), participants[self.b.0].body());
        bb.combined_velocity(rad_b) - ba.combined_velocity(rad_a)
    }

    /// Orient the contact arms against the normal: A's arm along it, B's against it.
    pub fn fix_radii(rad_a: Vec2, rad_b: Vec2, n: Vec2) -> (Vec2, Vec2) {
        let rad_a = if n.dot(rad_a) < 0.0 { -rad_a } else { rad_a };
        let rad_b = if n.dot(rad_b) > 0.0 { -rad_b } else { rad_b };
        (rad_a, rad_b)
    }

    /// Rewind the resolvable, movable bodies along their velocities to approach the
    /// time of impact, for pairs closing faster than the threshold. Bisects
    /// over the last `dt`; orientation is not rewound. The bodies are left at
    /// the best time found and the manifold is recomputed there.
    pub fn minimize_penetration<P: Participant>(&mut self, dt: f32, participants: &mut [P]) {
        if self.is_composite() {
            for child in self.children.iter_mut().filter(|c| c.detected) {
                child.collision.minimize_penetration(dt, participants);
            }
            return;
        }
        let Some(m) = &self.manifold else {
            return;
        };

        let closing = -self.relative_velocity(Vec2::ZERO, Vec2::ZERO, participants).dot(m.normal);
        if closing < TOI_VELOCITY_THRESHOLD {
            return;
        }

        let origin_a = participants[self.a.0].body().position;
        let origin_b = participants[self.b.0].body().position;
        let mut best_time = 0.0;
        let mut best_penetration = m.penetration;
        let mut penetration = m.penetration;

        for step in 0..TOI_MAX_STEPS {
            if penetration <= TOI_PENETRATION_THRESHOLD {
                break;
            }
            let time = best_time - dt / (2u32 << step) as f32;
            self.rewind(participants, origin_a, origin_b, time);

            if self.detect(participants) {
                penetration = self.manifold.as_ref().map_or(0.0, |m| m.penetration);
                if penetration < best_penetration {
                    best_penetration = penetration;
                    best_time = time;
                }
            }
        }

        log::trace!(
            "toi bisection {:?}/{:?}: rewound {best_time:.5}s, penetration {best_penetration:.4}",
            self.a,
            self.b
        );
        self.rewind(participants, origin_a, origin_b, best_time);
        self.detect(participants);
    }

    fn rewind<P: Participant>(&self, participants: &mut [P], origin_a: Vec2, origin_b: Vec2, time: f32) {
        let place = |body: &mut Body, origin: Vec2| {
            if !body.can_move() {
                return;
            }
            body.position = origin + body.velocity * time;
            body.refresh_shape();
        };
        if self.flags.resolve_a {
            place(participants[self.a.0].body_mut(), origin_a);
        }
        if self.flags.resolve_b {
            place(participants[self.b.0].body_mut(), origin_b);
        }
    }

    /// Impulse response at every contact, then flush both bodies so the next
    /// pair sees the new velocities.
    pub fn resolve<P: Participant>(&self, participants: &mut [P]) {
        if self.is_composite() {
            for child in self.children.iter().filter(|c| c.detected) {
                child.collision.resolve(participants);
            }
            return;
        }
        let Some(m) = &self.manifold else {
            return;
        };
        if m.contacts.is_empty() {
            return;
        }

        let (pa, pb) = pair_mut(participants, self.a, self.b);
        let (a, b) = (pa.body_mut(), pb.body_mut());
        let CollisionFlags { resolve_a, resolve_b, .. } = self.flags;

        let e = a.restitution().min(b.restitution());
        let sf = a.static_friction().min(b.static_friction());
        let df = a.dynamic_friction().min(b.dynamic_friction());
        let n = m.normal;
        let count = m.contacts.len() as f32;

        for contact in &m.contacts {
            let (rad_a, rad_b) = Self::fix_radii(*contact - a.position, *contact - b.position, n);

            let rv = b.combined_velocity(rad_b) - a.combined_velocity(rad_a);
            let normal_velocity = rv.dot(n);
            if normal_velocity > 0.0 {
                continue;
            }

            let (inv_mass_a, inv_inertia_a) = if resolve_a { (a.inv_mass, a.inv_inertia) } else { (0.0, 0.0) };
            let (inv_mass_b, inv_inertia_b) = if resolve_b { (b.inv_mass, b.inv_inertia) } else { (0.0, 0.0) };
            let ca = rad_a.cross(n);
            let cb = rad_b.cross(n);
            let inv_mass_sum = inv_mass_a + inv_mass_b + inv_inertia_a * ca * ca + inv_inertia_b * cb * cb;
            if inv_mass_sum <= 0.0 {
                continue;
            }

            let j = -(1.0 + e) * normal_velocity / inv_mass_sum / count;
            let impulse = n * j;

            // Coulomb friction: stick below the static cone, slide otherwise.
            let tangent = (rv - n * normal_velocity).unit();
            let jt = -tangent.dot(rv) / inv_mass_sum / count;
            let tangent_impulse = if jt.abs() < j * sf {
                tangent * jt
            } else {
                tangent * (-j * df)
            };

            let total = impulse + tangent_impulse;
            if resolve_a {
                a.apply_impulse(-total, rad_a);
            }
            if resolve_b {
                b.apply_impulse(total, rad_b);
            }
        }

        a.flush_impulse();
        b.flush_impulse();
    }

    /// Push the bodies apart along the normal, sharing the move by inverse mass.
    pub fn positional_correction<P: Participant>(&self, participants: &mut [P]) {
        if self.is_composite() {
            for child in self.children.iter().filter(|c| c.detected) {
                child.collision.positional_correction(participants);
            }
            return;
        }
        let Some(m) = &self.manifold else {
            return;
        };

        let (pa, pb) = pair_mut(participants, self.a, self.b);
        let (a, b) = (pa.body_mut(), pb.body_mut());
        let inv_mass_sum = a.inv_mass + b.inv_mass;
        if inv_mass_sum <= 0.0 {
            return;
        }

        let depth = (m.penetration - CORRECTION_SLOP).max(0.0);
        let correction = m.normal * (depth / inv_mass_sum * CORRECTION_PERCENT);
        if self.flags.resolve_a {
            a.displace(correction * -a.inv_mass);
        }
        if self.flags.resolve_b {
            b.displace(correction * b.inv_mass);
        }
    }
}
