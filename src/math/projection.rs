/// Interval covered by a shape projected onto an axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub min: f32,
    pub max: f32,
}

impl Projection {
    #[inline]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Projection of a set of scalar values, seeded with the first one.
    pub fn from_values(mut values: impl Iterator<Item = f32>) -> Self {
        let first = values.next().unwrap_or(0.0);
        values.fold(Self::new(first, first), |p, v| Self::new(p.min.min(v), p.max.max(v)))
    }

    /// Length of the shared part of both intervals, negative when they are apart.
    #[inline]
    pub fn overlap(&self, other: &Projection) -> f32 {
        self.max.min(other.max) - self.min.max(other.min)
    }
}
