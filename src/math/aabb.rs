use crate::math::Vec2;

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` reaching `half` in each direction.
    #[inline]
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self::new(center - half, center + half)
    }

    /// Smallest box containing every point; an empty slice gives a zero box.
    pub fn from_points(points: &[Vec2]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::default();
        };
        rest.iter().fold(Self::new(*first, *first), |acc, p| {
            Self::new(
                Vec2::new(acc.min.x.min(p.x), acc.min.y.min(p.y)),
                Vec2::new(acc.max.x.max(p.x), acc.max.y.max(p.y)),
            )
        })
    }

    /// Touching boxes count as overlapping.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[inline]
    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(
            Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        0.5 * (self.min + self.max)
    }

    #[inline]
    pub fn extents(&self) -> Vec2 {
        self.max - self.min
    }
}
