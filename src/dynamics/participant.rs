use crate::collision::CollisionGroup;
use crate::dynamics::{Body, BodyHandle};

/// Anything the world can simulate: a body tagged with a collision group.
///
/// Gameplay code implements this on its own entities to receive collision
/// notifications and to retire entities without removing them mid-tick.
pub trait Participant {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn group(&self) -> CollisionGroup;

    /// Dead participants are skipped by every pair.
    fn is_alive(&self) -> bool {
        true
    }

    /// Called when this participant detects a collision with `other`.
    fn collided(&mut self, _other: BodyHandle, _group: CollisionGroup) {}
}

/// Stock participant that records the collisions it was notified of.
#[derive(Clone, Debug)]
pub struct PhysicsObject {
    pub body: Body,
    pub group: CollisionGroup,
    pub alive: bool,
    hits: Vec<(BodyHandle, CollisionGroup)>,
}

impl PhysicsObject {
    pub fn new(body: Body, group: CollisionGroup) -> Self {
        Self {
            body,
            group,
            alive: true,
            hits: Vec::new(),
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Notifications received since the last call.
    pub fn take_hits(&mut self) -> Vec<(BodyHandle, CollisionGroup)> {
        std::mem::take(&mut self.hits)
    }

    pub fn hits(&self) -> &[(BodyHandle, CollisionGroup)] {
        &self.hits
    }
}

impl Participant for PhysicsObject {
    #[inline]
    fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    #[inline]
    fn group(&self) -> CollisionGroup {
        self.group
    }

    #[inline]
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn collided(&mut self, other: BodyHandle, group: CollisionGroup) {
        self.hits.push((other, group));
    }
}
