use crate::error::ShapeError;
use crate::math::{Aabb, Projection, Transform, Vec2};
use crate::shapes::Polygon;
use crate::shapes::polygon::{TURN_EPSILON, distinct_outline, first_reflex, signed_area2};

/// A simple (possibly concave) polygon, split once at construction into
/// convex parts. The parts share the body frame with the outline, so a
/// transform applied to the parent applies to each part unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct ConcavePolygon {
    outline: Vec<Vec2>,
    parts: Vec<Polygon>,
    offset: Vec2,
    aabb: Aabb,
}

impl ConcavePolygon {
    pub fn new(points: &[Vec2]) -> Result<Self, ShapeError> {
        let mut outline = distinct_outline(points)?;
        let area2 = signed_area2(&outline);
        if area2.abs() <= f32::EPSILON {
            return Err(ShapeError::Decomposition("outline has no area"));
        }
        if area2 < 0.0 {
            outline.reverse();
        }

        let triangles = triangulate(&outline)?;
        let parts: Vec<Polygon> = merge_convex(&outline, triangles)
            .into_iter()
            .map(|indices| Polygon::from_ccw(indices.into_iter().map(|i| outline[i]).collect()))
            .collect();
        log::trace!(
            "decomposed {}-vertex outline into {} convex parts",
            outline.len(),
            parts.len()
        );

        let aabb = union_aabb(&parts);
        Ok(Self {
            outline,
            parts,
            offset: Vec2::ZERO,
            aabb,
        })
    }

    /// The convex decomposition. Never recomputed, only moved along with the body.
    #[inline]
    pub fn parts(&self) -> &[Polygon] {
        &self.parts
    }

    /// Outline in the body frame, counter-clockwise.
    #[inline]
    pub fn outline(&self) -> &[Vec2] {
        &self.outline
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub fn area(&self) -> f32 {
        self.parts.iter().map(Polygon::area).sum()
    }

    pub fn inertia(&self, density: f32) -> f32 {
        self.parts.iter().map(|p| p.inertia(density)).sum()
    }

    /// Area-weighted centroid of the parts in world space.
    pub fn center(&self) -> Vec2 {
        let area = self.area();
        if area <= f32::EPSILON {
            return self.aabb.center();
        }
        self.parts
            .iter()
            .fold(Vec2::ZERO, |acc, p| acc + p.center() * p.area())
            * (1.0 / area)
    }

    pub fn recalc(&mut self, t: &Transform) {
        for part in &mut self.parts {
            part.recalc(t);
        }
        self.aabb = union_aabb(&self.parts);
    }

    pub fn project_onto(&self, axis: Vec2) -> Projection {
        let mut iter = self.parts.iter().map(|p| p.project_onto(axis));
        let first = iter.next().unwrap_or(Projection::new(0.0, 0.0));
        iter.fold(first, |acc, p| Projection::new(acc.min.min(p.min), acc.max.max(p.max)))
    }

    pub(crate) fn offset_center(&mut self, offset: Vec2) {
        for v in &mut self.outline {
            *v -= offset;
        }
        for part in &mut self.parts {
            part.offset_center(offset);
        }
        self.offset += offset;
    }

    pub(crate) fn reset(&mut self) {
        let o = self.offset;
        self.offset_center(-o);
    }
}

fn union_aabb(parts: &[Polygon]) -> Aabb {
    let mut iter = parts.iter().map(|p| *p.aabb());
    let first = iter.next().unwrap_or_default();
    iter.fold(first, |acc, b| acc.union(&b))
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).cross(p - a);
    let d2 = (c - b).cross(p - b);
    let d3 = (a - c).cross(p - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

/// Ear clipping over a counter-clockwise outline. Collinear vertices are
/// dropped rather than emitted as zero-area triangles.
fn triangulate(points: &[Vec2]) -> Result<Vec<[usize; 3]>, ShapeError> {
    let mut ring: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));
    let mut i = 0;
    let mut misses = 0;

    while ring.len() > 3 {
        let m = ring.len();
        if misses > m {
            return Err(ShapeError::Decomposition("no ear found; outline self-intersects"));
        }
        i %= m;
        let (ip, ic, inx) = (ring[(i + m - 1) % m], ring[i], ring[(i + 1) % m]);
        let (a, b, c) = (points[ip], points[ic], points[inx]);
        let turn = (b - a).cross(c - b);

        if turn.abs() <= TURN_EPSILON {
            ring.remove(i);
            misses = 0;
            continue;
        }

        let is_ear = turn > 0.0
            && !ring.iter().any(|&k| {
                let p = points[k];
                k != ip && k != ic && k != inx && p != a && p != b && p != c && point_in_triangle(p, a, b, c)
            });
        if is_ear {
            triangles.push([ip, ic, inx]);
            ring.remove(i);
            misses = 0;
        } else {
            i += 1;
            misses += 1;
        }
    }

    if let [a, b, c] = ring[..] {
        let turn = (points[b] - points[a]).cross(points[c] - points[b]);
        if turn > TURN_EPSILON {
            triangles.push([a, b, c]);
        }
    }
    if triangles.is_empty() {
        return Err(ShapeError::Decomposition("outline collapsed to nothing"));
    }
    Ok(triangles)
}

/// Hertel-Mehlhorn: join neighbouring pieces across shared diagonals while
/// the union stays convex.
fn merge_convex(points: &[Vec2], triangles: Vec<[usize; 3]>) -> Vec<Vec<usize>> {
    let mut pieces: Vec<Vec<usize>> = triangles.into_iter().map(|t| t.to_vec()).collect();

    'restart: loop {
        for i in 0..pieces.len() {
            for j in (i + 1)..pieces.len() {
                if let Some(merged) = try_merge(points, &pieces[i], &pieces[j]) {
                    pieces[i] = merged;
                    pieces.swap_remove(j);
                    continue 'restart;
                }
            }
        }
        return pieces;
    }
}

fn try_merge(points: &[Vec2], p: &[usize], q: &[usize]) -> Option<Vec<usize>> {
    let (np, nq) = (p.len(), q.len());
    for k in 0..np {
        let (u, v) = (p[k], p[(k + 1) % np]);
        let Some(l) = (0..nq).find(|&l| q[l] == v && q[(l + 1) % nq] == u) else {
            continue;
        };

        // p from v round to u, then q's vertices strictly between u and v.
        let mut merged: Vec<usize> = (0..np).map(|s| p[(k + 1 + s) % np]).collect();
        merged.extend((1..nq - 1).map(|s| q[(l + 1 + s) % nq]));

        let outline: Vec<Vec2> = merged.iter().map(|&i| points[i]).collect();
        return first_reflex(&outline).is_none().then_some(merged);
    }
    None
}
