use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn transform_centers_scales_and_positions() {
    let v = ViewState::new(
        Size::new(200.0, 100.0),
        Point::new(400.0, 300.0),
        2.0,
        Size::new(800.0, 600.0),
    );
    // Image center lands on image_pos.
    let center = v.mat * Point::new(100.0, 50.0);
    assert!(approx(center.x, 400.0) && approx(center.y, 300.0));
    // Top-left corner is 2x farther away.
    let tl = v.mat * Point::new(0.0, 0.0);
    assert!(approx(tl.x, 200.0) && approx(tl.y, 200.0));

    let id = v.mat * v.mat_inv;
    for (got, want) in id.as_coeffs().iter().zip(Affine::IDENTITY.as_coeffs()) {
        assert!(approx(*got, want));
    }
    assert!(approx(v.brush_scale(), 0.5));
}

#[test]
fn rotation_by_90_swaps_axes() {
    let mut v = ViewState::new(Size::new(10.0, 10.0), Point::ZERO, 1.0, Size::ZERO);
    v.rotation = 90;
    v.update_transform();
    // (10,5) is +5 on x from the center; after 90 degrees it points down +y.
    let p = v.mat * Point::new(10.0, 5.0);
    assert!(approx(p.x, 0.0));
    assert!(approx(p.y, 5.0));
}

#[test]
fn translations_are_rounded_to_whole_pixels() {
    let v = ViewState::new(
        Size::new(11.0, 11.0),
        Point::new(10.4, 10.6),
        1.0,
        Size::ZERO,
    );
    let c = v.mat.as_coeffs();
    assert_eq!(c[4].fract(), 0.0);
    assert_eq!(c[5].fract(), 0.0);
}

#[test]
fn degenerate_scale_falls_back_to_identity_inverse() {
    let v = ViewState::new(Size::new(10.0, 10.0), Point::ZERO, 0.0, Size::ZERO);
    assert_eq!(v.mat_inv, Affine::IDENTITY);
}

#[test]
fn scaled_pixel_size_truncates() {
    let v = ViewState::new(Size::new(101.0, 51.0), Point::ZERO, 1.5, Size::ZERO);
    assert_eq!(v.scaled_pixel_size(), (151, 76));
    let zero = ViewState::default();
    assert_eq!(zero.scaled_pixel_size(), (0, 0));
}

#[test]
fn hit_testing_uses_inverse_transform() {
    let v = ViewState::new(
        Size::new(100.0, 100.0),
        Point::new(50.0, 50.0),
        1.0,
        Size::new(100.0, 100.0),
    );
    assert!(v.contains_canvas_point(Point::new(10.0, 10.0)));
    assert!(!v.contains_canvas_point(Point::new(150.0, 10.0)));
}

#[test]
fn apply_copies_view_properties_only() {
    let src = ViewState::new(Size::new(5.0, 5.0), Point::new(1.0, 2.0), 3.0, Size::ZERO);
    let mut dst = ViewState::new(Size::new(50.0, 50.0), Point::ZERO, 1.0, Size::ZERO);
    dst.apply(&src);
    assert_eq!(dst.scale, 3.0);
    assert_eq!(dst.image_pos, Point::new(1.0, 2.0));
    assert_eq!(dst.image_rect.width(), 50.0);
}

#[test]
fn shared_view_state_publishes_snapshots() {
    let shared = SharedViewState::default();
    let before = shared.snapshot();
    assert_eq!(before.scale, 1.0);

    let next = ViewState::new(Size::new(1.0, 1.0), Point::ZERO, 4.0, Size::ZERO);
    shared.clone().publish(next);
    assert_eq!(shared.snapshot().scale, 4.0);
    assert_eq!(before.scale, 1.0);
}
