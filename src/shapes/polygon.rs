use crate::error::ShapeError;
use crate::math::{Aabb, Projection, Transform, Vec2};
use crate::shapes::Edge;

/// Turns this close to zero count as straight when checking convexity.
pub(crate) const TURN_EPSILON: f32 = 1e-6;

/// Twice the signed area of a closed outline; positive for counter-clockwise.
pub(crate) fn signed_area2(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n).map(|i| points[i].cross(points[(i + 1) % n])).sum()
}

/// Index of the first vertex where a counter-clockwise outline turns clockwise.
pub(crate) fn first_reflex(points: &[Vec2]) -> Option<usize> {
    let n = points.len();
    (0..n).find(|&i| {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        (cur - prev).cross(next - cur) < -TURN_EPSILON
    })
}

/// Squared distance under which neighbouring vertices count as the same point.
const DUPLICATE_EPSILON: f32 = 1e-10;

/// Checks caller geometry and drops repeated neighbouring vertices, including
/// a last vertex that closes back onto the first. A repeated vertex would give
/// a side with no normal.
pub(crate) fn distinct_outline(points: &[Vec2]) -> Result<Vec<Vec2>, ShapeError> {
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(ShapeError::NonFinite { index });
    }

    let mut outline: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if outline.last().is_none_or(|q| (p - *q).length_squared() > DUPLICATE_EPSILON) {
            outline.push(p);
        }
    }
    while outline.len() > 1 && (outline[outline.len() - 1] - outline[0]).length_squared() <= DUPLICATE_EPSILON {
        outline.pop();
    }

    if outline.len() < 3 {
        return Err(ShapeError::TooFewVertices(outline.len()));
    }
    Ok(outline)
}

/// Convex polygon. Local vertices are relative to the owning body's origin
/// and stored counter-clockwise; the world-space data is refreshed by `recalc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    local: Vec<Vec2>,
    offset: Vec2,
    vertices: Vec<Vec2>,
    edges: Vec<Edge>,
    centroid: Vec2,
    aabb: Aabb,
}

impl Polygon {
    /// Builds a convex polygon from vertices in either winding.
    pub fn new(points: &[Vec2]) -> Result<Self, ShapeError> {
        let mut local = distinct_outline(points)?;
        if signed_area2(&local) < 0.0 {
            local.reverse();
        }
        if let Some(index) = first_reflex(&local) {
            return Err(ShapeError::NotConvex { index });
        }
        Ok(Self::from_ccw(local))
    }

    /// Axis-aligned box of the given full width and height, centered on the origin.
    pub fn rectangle(width: f32, height: f32) -> Self {
        let (hw, hh) = (0.5 * width.abs(), 0.5 * height.abs());
        Self::from_ccw(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    /// Regular polygon with `sides` corners on a circle of `radius`.
    pub fn regular(sides: usize, radius: f32) -> Result<Self, ShapeError> {
        if sides < 3 {
            return Err(ShapeError::TooFewVertices(sides));
        }
        let step = core::f32::consts::TAU / sides as f32;
        let local = (0..sides)
            .map(|i| Vec2::new(radius.abs(), 0.0).rotate(step * i as f32))
            .collect();
        Ok(Self::from_ccw(local))
    }

    /// Caller guarantees a convex counter-clockwise outline.
    pub(crate) fn from_ccw(local: Vec<Vec2>) -> Self {
        let mut poly = Self {
            vertices: local.clone(),
            local,
            offset: Vec2::ZERO,
            edges: Vec::new(),
            centroid: Vec2::ZERO,
            aabb: Aabb::default(),
        };
        poly.recalc(&Transform::default());
        poly
    }

    /// World-space vertices, counter-clockwise.
    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Vertices in the body frame.
    #[inline]
    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local
    }

    /// World-space sides; `edges()[i]` runs from vertex `i` to vertex `i + 1`.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.centroid
    }

    pub fn area(&self) -> f32 {
        0.5 * signed_area2(&self.local).abs()
    }

    /// Moment about the body origin.
    pub fn inertia(&self, density: f32) -> f32 {
        let n = self.local.len();
        let sum: f32 = (0..n)
            .map(|i| {
                let a = self.local[i];
                let b = self.local[(i + 1) % n];
                a.cross(b) * (a.dot(a) + a.dot(b) + b.dot(b))
            })
            .sum();
        (density * sum / 12.0).abs()
    }

    pub fn recalc(&mut self, t: &Transform) {
        self.vertices.clear();
        self.vertices.extend(self.local.iter().map(|v| t.apply(*v)));

        let n = self.vertices.len();
        self.edges.clear();
        self.edges
            .extend((0..n).map(|i| Edge::new(self.vertices[i], self.vertices[(i + 1) % n])));

        self.centroid = t.apply(local_centroid(&self.local));
        self.aabb = Aabb::from_points(&self.vertices);
    }

    /// `axis` is expected to be unit length.
    pub fn project_onto(&self, axis: Vec2) -> Projection {
        Projection::from_values(self.vertices.iter().map(|v| v.dot(axis)))
    }

    pub fn closest_vertex(&self, point: Vec2) -> Vec2 {
        self.vertices
            .iter()
            .copied()
            .min_by(|a, b| a.distance(point).total_cmp(&b.distance(point)))
            .unwrap_or(point)
    }

    pub(crate) fn offset_center(&mut self, offset: Vec2) {
        for v in &mut self.local {
            *v -= offset;
        }
        self.offset += offset;
    }

    pub(crate) fn reset(&mut self) {
        let o = self.offset;
        self.offset_center(-o);
    }
}

fn local_centroid(points: &[Vec2]) -> Vec2 {
    let a2 = signed_area2(points);
    if a2.abs() <= f32::EPSILON {
        // Degenerate outline: fall back to the vertex average.
        let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
        return sum * (1.0 / points.len().max(1) as f32);
    }
    let n = points.len();
    let sum = (0..n).fold(Vec2::ZERO, |acc, i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc + (a + b) * a.cross(b)
    });
    sum * (1.0 / (3.0 * a2))
}
