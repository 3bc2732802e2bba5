use crate::math::Vec2;

/// Vertices closer to the edge than the nearest one plus this are treated as
/// a second contact point.
const CONTACT_TOLERANCE: f32 = 0.01;

/// A polygon side in world space with its outward unit normal.
///
/// Synthetic SAT axes (the circle axis) are edges with `start == end`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Edge {
    pub start: Vec2,
    pub end: Vec2,
    pub normal: Vec2,
}

impl Edge {
    /// Side from `start` to `end` of a counter-clockwise outline.
    #[inline]
    pub fn new(start: Vec2, end: Vec2) -> Self {
        let e = end - start;
        Self {
            start,
            end,
            normal: Vec2::new(e.y, -e.x).unit(),
        }
    }

    /// A bare axis with no extent.
    #[inline]
    pub fn axis(normal: Vec2) -> Self {
        Self {
            start: Vec2::ZERO,
            end: Vec2::ZERO,
            normal,
        }
    }

    /// Distance from `p` to the closest point of the segment.
    pub fn distance_to(&self, p: Vec2) -> f32 {
        let seg = self.end - self.start;
        let len_sq = seg.length_squared();
        if len_sq <= f32::EPSILON {
            return p.distance(self.start);
        }
        let t = ((p - self.start).dot(seg) / len_sq).clamp(0.0, 1.0);
        p.distance(self.start + seg * t)
    }

    /// The vertex nearest to this edge, plus a second one when it is just as near.
    pub fn closest_points(&self, vertices: &[Vec2]) -> Vec<Vec2> {
        let mut ranked: Vec<(f32, Vec2)> = vertices.iter().map(|v| (self.distance_to(*v), *v)).collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut out = Vec::with_capacity(2);
        if let Some(&(best, v)) = ranked.first() {
            out.push(v);
            if let Some(&(second, w)) = ranked.get(1) {
                if second - best <= CONTACT_TOLERANCE {
                    out.push(w);
                }
            }
        }
        out
    }
}
