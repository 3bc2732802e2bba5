//! Narrow phase: separating-axis tests between convex pieces.
//!
//! Every function returns a manifold whose normal points from the first
//! shape toward the second, or `None` when the shapes are apart.

use crate::collision::Manifold;
use crate::math::Vec2;
use crate::shapes::{Circle, Convex, Edge, Polygon};

/// Winning axis of a separating-axis sweep.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisHit {
    /// Index into `axes_a` followed by `axes_b`.
    pub index: usize,
    pub edge: Edge,
    pub overlap: f32,
}

/// Axes with a squared length at or below this are skipped.
const DEGENERATE_AXIS: f32 = 1e-12;

/// Project both shapes onto every axis of `axes_a` then `axes_b`. Any gap
/// ends the test; otherwise the axis with the smallest overlap wins.
/// Zero-length axes (a collapsed side, or a circle centered on a vertex)
/// separate nothing and are skipped.
pub fn separating_axis(a: Convex<'_>, b: Convex<'_>, axes_a: &[Edge], axes_b: &[Edge]) -> Option<AxisHit> {
    let mut best: Option<AxisHit> = None;

    for (index, edge) in axes_a.iter().chain(axes_b).enumerate() {
        if edge.normal.length_squared() <= DEGENERATE_AXIS {
            continue;
        }
        let overlap = a.project_onto(edge.normal).overlap(&b.project_onto(edge.normal));
        if overlap < 0.0 {
            return None;
        }
        if best.is_none_or(|hit| overlap < hit.overlap) {
            best = Some(AxisHit {
                index,
                edge: *edge,
                overlap,
            });
        }
    }

    best
}

/// Flip `n` if it points from `to` back toward `from`.
#[inline]
pub fn correct_direction(n: Vec2, from: Vec2, to: Vec2) -> Vec2 {
    if (to - from).dot(n) < 0.0 { -n } else { n }
}

pub fn circle_vs_circle(a: &Circle, b: &Circle) -> Option<Manifold> {
    let delta = b.center() - a.center();
    let overlap = a.radius() + b.radius() - delta.length();
    if overlap < 0.0 {
        return None;
    }

    // Concentric circles have no meaningful normal; a zero one yields no impulse.
    let normal = delta.unit();
    Some(Manifold {
        normal,
        penetration: overlap,
        contacts: vec![a.center() + normal * a.radius()],
        axis_index: 0,
        edge: Edge::axis(normal),
    })
}

pub fn poly_vs_poly(a: &Polygon, b: &Polygon) -> Option<Manifold> {
    let hit = separating_axis(Convex::Polygon(a), Convex::Polygon(b), a.edges(), b.edges())?;
    let normal = correct_direction(hit.edge.normal, a.center(), b.center());

    // The winning axis belongs to one polygon; the contacts are the other's
    // vertices nearest to that polygon's side facing along the axis.
    let (owner, incident, toward) = if hit.index < a.edges().len() {
        (a, b, normal)
    } else {
        (b, a, -normal)
    };
    let edge = reference_edge(owner, toward).unwrap_or(hit.edge);

    Some(Manifold {
        normal,
        penetration: hit.overlap,
        contacts: edge.closest_points(incident.vertices()),
        axis_index: hit.index,
        edge,
    })
}

/// The side of `poly` whose outward normal is closest to `dir`. A parallel
/// side on the far face can tie with the facing one during the axis sweep.
fn reference_edge(poly: &Polygon, dir: Vec2) -> Option<Edge> {
    poly.edges()
        .iter()
        .copied()
        .max_by(|e, f| e.normal.dot(dir).total_cmp(&f.normal.dot(dir)))
}

/// `circle_is_a` selects which side the circle plays; the polygon's sides
/// always come first in the axis list, followed by one axis from the
/// polygon's nearest vertex to the circle center.
pub fn poly_vs_circle(poly: &Polygon, circle: &Circle, circle_is_a: bool) -> Option<Manifold> {
    let center = circle.center();
    let closest = poly.closest_vertex(center);
    let extra = [Edge::axis((closest - center).unit())];

    let (a, b) = if circle_is_a {
        (Convex::Circle(circle), Convex::Polygon(poly))
    } else {
        (Convex::Polygon(poly), Convex::Circle(circle))
    };
    let hit = separating_axis(a, b, poly.edges(), &extra)?;
    let normal = correct_direction(hit.edge.normal, a.center(), b.center());

    let contact = if hit.index < poly.edges().len() {
        // Normal from the polygon toward the circle.
        let outward = if circle_is_a { -normal } else { normal };
        center - outward * circle.radius()
    } else {
        closest
    };

    Some(Manifold {
        normal,
        penetration: hit.overlap,
        contacts: vec![contact],
        axis_index: hit.index,
        edge: hit.edge,
    })
}

/// Dispatch on the pair of convex pieces.
pub fn collide(a: Convex<'_>, b: Convex<'_>) -> Option<Manifold> {
    match (a, b) {
        (Convex::Circle(ca), Convex::Circle(cb)) => circle_vs_circle(ca, cb),
        (Convex::Polygon(pa), Convex::Polygon(pb)) => poly_vs_poly(pa, pb),
        (Convex::Polygon(p), Convex::Circle(c)) => poly_vs_circle(p, c, false),
        (Convex::Circle(c), Convex::Polygon(p)) => poly_vs_circle(p, c, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Transform;
    use approx::assert_relative_eq;

    fn circle_at(r: f32, x: f32, y: f32) -> Circle {
        let mut c = Circle::new(r);
        c.recalc(&Transform::new(Vec2::new(x, y), 0.0));
        c
    }

    fn box_at(w: f32, h: f32, x: f32, y: f32, angle: f32) -> Polygon {
        let mut p = Polygon::rectangle(w, h);
        p.recalc(&Transform::new(Vec2::new(x, y), angle));
        p
    }

    #[test]
    fn circles_overlap_by_radius_sum_minus_distance() {
        let a = circle_at(1.0, 0.0, 0.0);
        let b = circle_at(0.5, 1.2, 0.0);
        let m = circle_vs_circle(&a, &b).unwrap();
        assert_relative_eq!(m.penetration, 0.3, epsilon = 1e-5);
        assert_relative_eq!(m.normal, Vec2::new(1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(m.contacts[0], Vec2::new(1.0, 0.0), epsilon = 1e-6);

        assert!(circle_vs_circle(&a, &circle_at(0.5, 1.6, 0.0)).is_none());
    }

    #[test]
    fn concentric_circles_get_a_zero_normal() {
        let m = circle_vs_circle(&circle_at(1.0, 2.0, 2.0), &circle_at(1.0, 2.0, 2.0)).unwrap();
        assert_relative_eq!(m.normal, Vec2::ZERO);
        assert_relative_eq!(m.penetration, 2.0);
    }

    #[test]
    fn boxes_stacked_give_two_contacts() {
        let ground = box_at(10.0, 2.0, 0.0, -1.0, 0.0);
        let crate_ = box_at(1.0, 1.0, 0.0, 0.4, 0.0);
        let m = poly_vs_poly(&ground, &crate_).unwrap();

        assert_relative_eq!(m.normal, Vec2::new(0.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(m.penetration, 0.1, epsilon = 1e-5);
        assert_eq!(m.contacts.len(), 2);
        for c in &m.contacts {
            assert_relative_eq!(c.y, -0.1, epsilon = 1e-5);
        }
        // The reference side is the ground's top face.
        assert_relative_eq!(m.edge.normal, Vec2::new(0.0, 1.0), epsilon = 1e-6);
        assert_relative_eq!(m.edge.start.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn swapping_polygons_negates_the_normal() {
        let a = box_at(2.0, 1.0, 0.0, 0.0, 0.2);
        let b = box_at(1.0, 1.5, 1.1, 0.6, -0.4);
        let ab = poly_vs_poly(&a, &b).unwrap();
        let ba = poly_vs_poly(&b, &a).unwrap();
        assert_relative_eq!(ab.penetration, ba.penetration, epsilon = 1e-5);
        assert_relative_eq!(ab.normal, -ba.normal, epsilon = 1e-5);
    }

    #[test]
    fn separated_boxes_report_nothing() {
        let a = box_at(1.0, 1.0, 0.0, 0.0, 0.0);
        let b = box_at(1.0, 1.0, 1.5, 0.0, 0.3);
        assert!(poly_vs_poly(&a, &b).is_none());
        assert!(separating_axis(Convex::Polygon(&a), Convex::Polygon(&b), a.edges(), b.edges()).is_none());
    }

    #[test]
    fn tilted_box_corner_is_the_contact() {
        let ground = box_at(10.0, 2.0, 0.0, -1.0, 0.0);
        let half_diag = 0.5 * 2.0_f32.sqrt();
        let diamond = box_at(1.0, 1.0, 0.0, half_diag - 0.05, core::f32::consts::FRAC_PI_4);
        let m = poly_vs_poly(&ground, &diamond).unwrap();
        assert_eq!(m.contacts.len(), 1);
        assert_relative_eq!(m.contacts[0], Vec2::new(0.0, -0.05), epsilon = 1e-4);
        assert_relative_eq!(m.penetration, 0.05, epsilon = 1e-4);
    }

    #[test]
    fn circle_resting_on_box_face() {
        let ground = box_at(10.0, 2.0, 0.0, -1.0, 0.0);
        let ball = circle_at(1.0, 0.5, 0.9);

        let m = poly_vs_circle(&ground, &ball, false).unwrap();
        assert_relative_eq!(m.normal, Vec2::new(0.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(m.penetration, 0.1, epsilon = 1e-5);
        assert_relative_eq!(m.contacts[0], Vec2::new(0.5, -0.1), epsilon = 1e-5);

        // Same pair with the circle first: the normal flips, the contact does not move.
        let m2 = collide(Convex::Circle(&ball), Convex::Polygon(&ground)).unwrap();
        assert_relative_eq!(m2.normal, Vec2::new(0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(m2.penetration, m.penetration, epsilon = 1e-6);
        assert_relative_eq!(m2.contacts[0], m.contacts[0], epsilon = 1e-5);
    }

    #[test]
    fn circle_against_box_corner_uses_vertex_axis() {
        let b = box_at(2.0, 2.0, 0.0, 0.0, 0.0);
        // Diagonally off the (1, 1) corner, 0.1 inside along the diagonal.
        let d = 1.0 / 2.0_f32.sqrt();
        let ball = circle_at(0.5, 1.0 + 0.4 * d, 1.0 + 0.4 * d);

        let m = poly_vs_circle(&b, &ball, false).unwrap();
        assert_eq!(m.axis_index, b.edges().len());
        assert_relative_eq!(m.normal, Vec2::new(d, d), epsilon = 1e-4);
        assert_relative_eq!(m.penetration, 0.1, epsilon = 1e-4);
        assert_relative_eq!(m.contacts[0], Vec2::new(1.0, 1.0), epsilon = 1e-5);

        let far = circle_at(0.5, 1.0 + 0.6 * d, 1.0 + 0.6 * d);
        assert!(poly_vs_circle(&b, &far, false).is_none());
    }

    #[test]
    fn collapsed_axis_never_wins() {
        let a = box_at(1.0, 1.0, 0.0, 0.0, 0.0);
        let b = box_at(1.0, 1.0, 0.6, 0.0, 0.0);
        let corner = a.vertices()[1];
        let axes_a = [Edge::new(corner, corner)];

        let hit = separating_axis(Convex::Polygon(&a), Convex::Polygon(&b), &axes_a, b.edges()).unwrap();
        assert!(hit.index >= 1);
        assert_relative_eq!(hit.overlap, 0.4, epsilon = 1e-5);
        assert_relative_eq!(hit.edge.normal.length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn circle_centered_on_corner_is_pushed_out_along_a_side() {
        let b = box_at(2.0, 2.0, 0.0, 0.0, 0.0);
        let ball = circle_at(0.5, 1.0, 1.0);

        let m = poly_vs_circle(&b, &ball, false).unwrap();
        assert!(m.axis_index < b.edges().len());
        assert_relative_eq!(m.normal.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(m.penetration, 0.5, epsilon = 1e-5);
        // The normal still points from the box toward the circle.
        assert!(m.normal.dot(Vec2::new(1.0, 1.0)) > 0.0);
    }

    #[test]
    fn correct_direction_points_a_to_b() {
        let n = Vec2::new(1.0, 0.0);
        assert_relative_eq!(correct_direction(n, Vec2::ZERO, Vec2::new(2.0, 0.0)), n);
        assert_relative_eq!(correct_direction(n, Vec2::new(2.0, 0.0), Vec2::ZERO), -n);
    }
}
