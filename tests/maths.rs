use approx::assert_relative_eq;

use rigid2d::math::{Aabb, Mat22, Projection, Transform, Vec2, clamp_unit};

#[test]
fn vec2_and_mat22_work_together() {
    let r = Mat22::from_angle(core::f32::consts::FRAC_PI_2);
    let out = r * Vec2::new(1.0, 0.0);
    assert_relative_eq!(out, Vec2::new(0.0, 1.0), epsilon = 1e-6);
    assert_relative_eq!(r.transpose() * out, Vec2::new(1.0, 0.0), epsilon = 1e-6);
}

#[test]
fn transform_round_trips_a_point() {
    let t = Transform::new(Vec2::new(3.0, -1.0), 0.7);
    let local = Vec2::new(0.25, 2.0);
    assert_relative_eq!(t.inverse_apply(t.apply(local)), local, epsilon = 1e-5);
}

#[test]
fn boxes_and_intervals_agree_on_touching() {
    let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
    let b = Aabb::new(Vec2::new(1.0, 0.5), Vec2::new(2.0, 2.0));
    assert!(a.overlaps(&b));

    let pa = Projection::new(0.0, 1.0);
    let pb = Projection::new(1.0, 2.0);
    assert_relative_eq!(pa.overlap(&pb), 0.0);
    assert!(Projection::new(3.0, 4.0).overlap(&pa) < 0.0);
}

#[test]
fn numeric_guards_are_public() {
    assert_relative_eq!(clamp_unit(1.5), 1.0);
    assert_relative_eq!(Vec2::ZERO.unit(), Vec2::ZERO);
}
