use super::*;
use crate::foundation::core::{Point, Size};

fn view(image: (f64, f64), scale: f64, canvas_w: f64) -> ViewState {
    ViewState::new(
        Size::new(image.0, image.1),
        Point::new(canvas_w / 2.0, 300.0),
        scale,
        Size::new(canvas_w, 600.0),
    )
}

#[test]
fn builds_scaled_size_below_width_limit() {
    let v = view((400.0, 300.0), 0.5, 800.0);
    assert_eq!(
        plan_offscreen(&v, 1.5),
        OffscreenPlan::Build {
            width: 200,
            height: 150
        }
    );
}

#[test]
fn target_size_is_truncated() {
    let v = view((101.0, 51.0), 0.5, 800.0);
    assert_eq!(
        plan_offscreen(&v, 1.5),
        OffscreenPlan::Build {
            width: 50,
            height: 25
        }
    );
}

#[test]
fn wide_targets_are_never_built() {
    // 1200 == 1.5 * 800 is already too wide.
    let at_limit = view((600.0, 100.0), 2.0, 800.0);
    assert_eq!(plan_offscreen(&at_limit, 1.5), OffscreenPlan::Discard);

    let just_below = view((599.0, 100.0), 2.0, 800.0);
    assert!(matches!(
        plan_offscreen(&just_below, 1.5),
        OffscreenPlan::Build { width: 1198, .. }
    ));

    // A looser factor admits it.
    assert!(matches!(
        plan_offscreen(&at_limit, 2.0),
        OffscreenPlan::Build { width: 1200, .. }
    ));
}

#[test]
fn zero_sized_target_is_not_built() {
    let v = view((400.0, 300.0), 0.001, 800.0);
    assert_eq!(plan_offscreen(&v, 1.5), OffscreenPlan::Discard);
}

#[test]
fn composed_buffer_has_requested_size_and_content() {
    let src = Bitmap::solid(40, 20, [0, 255, 0, 255]).unwrap();
    let out = compose_offscreen(&src, 10, 5, Interpolation::HighQualityCubic).unwrap();
    assert_eq!((out.width(), out.height()), (10, 5));
    let center = &out.premul_rgba8()[((2 * 10 + 5) * 4)..((2 * 10 + 5) * 4 + 4)];
    assert!(center[1] > 250 && center[3] > 250, "{center:?}");
}

#[test]
fn compose_rejects_zero_size() {
    let src = Bitmap::solid(4, 4, [0, 0, 0, 255]).unwrap();
    assert!(compose_offscreen(&src, 0, 4, Interpolation::Linear).is_err());
}
