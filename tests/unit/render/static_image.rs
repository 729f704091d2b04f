use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::foundation::config::RendererOpts;
use crate::foundation::core::Point;
use crate::model::view_state::SharedViewState;
use crate::test_support::{InvalidateCounter, Op, RecordingSession, test_env};

fn settled_view(scale: f64) -> ViewState {
    ViewState::new(
        Size::new(400.0, 300.0),
        Point::new(400.0, 300.0),
        scale,
        Size::new(800.0, 600.0),
    )
}

fn renderer(repaints: &InvalidateCounter, view: &ViewState) -> (StaticImageRenderer, Bitmap) {
    let source = Bitmap::solid(400, 300, [10, 20, 30, 255]).unwrap();
    let shared = SharedViewState::new(*view);
    let env = test_env(repaints).with_view(shared);
    let r = StaticImageRenderer::new(source.clone(), true, &RenderConfig::default(), env);
    (r, source)
}

#[tokio::test(start_paused = true)]
async fn buffer_is_built_once_geometry_settles() {
    let repaints = InvalidateCounter::default();
    let view = settled_view(0.5);
    let (r, source) = renderer(&repaints, &view);

    r.restart_offscreen_draw_timer();
    assert_eq!(r.offscreen_size(), None);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(r.offscreen_size(), None);
    assert_eq!(repaints.count(), 0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    repaints.wait_for(1).await;
    assert_eq!(r.offscreen_size(), Some((200, 150)));
    assert_eq!(repaints.count(), 1);

    let mut s = RecordingSession::default();
    r.draw(&mut s, &view, Interpolation::Linear, &RenderConfig::default());
    let drawn = s.drawn();
    assert_eq!(drawn.len(), 1);
    assert!(!drawn[0].ptr_eq(&source));
    assert_eq!((drawn[0].width(), drawn[0].height()), (200, 150));
}

#[tokio::test(start_paused = true)]
async fn restart_drops_buffer_immediately() {
    let repaints = InvalidateCounter::default();
    let view = settled_view(0.5);
    let (r, source) = renderer(&repaints, &view);

    r.restart_offscreen_draw_timer();
    tokio::time::sleep(Duration::from_millis(500)).await;
    repaints.wait_for(1).await;
    assert!(r.offscreen_size().is_some());

    r.restart_offscreen_draw_timer();
    assert_eq!(r.offscreen_size(), None);
    let mut s = RecordingSession::default();
    r.draw(&mut s, &view, Interpolation::Linear, &RenderConfig::default());
    assert!(s.drawn()[0].ptr_eq(&source));
}

#[tokio::test(start_paused = true)]
async fn unchanged_geometry_still_gets_a_fresh_buffer() {
    let repaints = InvalidateCounter::default();
    let view = settled_view(0.5);
    let (r, _) = renderer(&repaints, &view);

    r.restart_offscreen_draw_timer();
    tokio::time::sleep(Duration::from_millis(500)).await;
    repaints.wait_for(1).await;
    let first = r.compositor.current().unwrap();

    r.restart_offscreen_draw_timer();
    tokio::time::sleep(Duration::from_millis(500)).await;
    repaints.wait_for(2).await;
    let second = r.compositor.current().unwrap();
    assert_eq!((second.width(), second.height()), (200, 150));
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test(start_paused = true)]
async fn bursts_of_restarts_build_once() {
    let repaints = InvalidateCounter::default();
    let view = settled_view(0.5);
    let (r, _) = renderer(&repaints, &view);

    for _ in 0..5 {
        r.restart_offscreen_draw_timer();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(r.offscreen_size(), None);

    tokio::time::sleep(Duration::from_millis(400)).await;
    repaints.wait_for(1).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(repaints.count(), 1);
    assert_eq!(r.offscreen_size(), Some((200, 150)));
}

#[tokio::test(start_paused = true)]
async fn never_built_when_wider_than_limit() {
    let repaints = InvalidateCounter::default();
    // 400 * 3 = 1200 = 1.5 * 800.
    let view = settled_view(3.0);
    let (r, source) = renderer(&repaints, &view);

    r.restart_offscreen_draw_timer();
    tokio::time::sleep(Duration::from_millis(500)).await;
    repaints.wait_for(1).await;
    assert_eq!(r.offscreen_size(), None);

    let mut s = RecordingSession::default();
    r.draw(&mut s, &view, Interpolation::Linear, &RenderConfig::default());
    assert!(s.drawn()[0].ptr_eq(&source));
}

#[tokio::test(start_paused = true)]
async fn debounce_follows_opts() {
    let repaints = InvalidateCounter::default();
    let view = settled_view(0.5);
    let opts = RendererOpts {
        offscreen_debounce_ms: 50,
        ..RendererOpts::default()
    };
    let env = crate::test_support::test_env_with(&repaints, opts)
        .with_view(SharedViewState::new(view));
    let r = StaticImageRenderer::new(
        Bitmap::solid(400, 300, [0, 0, 0, 255]).unwrap(),
        false,
        &RenderConfig::default(),
        env,
    );
    r.restart_offscreen_draw_timer();
    tokio::time::sleep(Duration::from_millis(60)).await;
    repaints.wait_for(1).await;
    assert_eq!(r.offscreen_size(), Some((200, 150)));
}

#[tokio::test(start_paused = true)]
async fn dispose_cancels_pending_build() {
    let repaints = InvalidateCounter::default();
    let view = settled_view(0.5);
    let (r, source) = renderer(&repaints, &view);

    r.restart_offscreen_draw_timer();
    r.dispose();
    r.dispose();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(repaints.count(), 0);
    assert_eq!(r.offscreen_size(), None);

    let mut s = RecordingSession::default();
    r.draw(&mut s, &view, Interpolation::Linear, &RenderConfig::default());
    assert!(s.ops.is_empty());
    r.try_redraw_offscreen();
    assert_eq!(repaints.count(), 0);
    assert_eq!(source.holders(), 2);
}

#[tokio::test]
async fn checkerboard_precedes_image_only_when_enabled() {
    let repaints = InvalidateCounter::default();
    let view = settled_view(1.0);
    let (r, _) = renderer(&repaints, &view);
    let checkered = RenderConfig {
        checkered_background: true,
        ..RenderConfig::default()
    };

    let mut s = RecordingSession::default();
    r.draw(&mut s, &view, Interpolation::Linear, &checkered);
    assert_eq!(s.kinds(), ["checkerboard", "bitmap"]);

    let mut s = RecordingSession::default();
    r.draw(&mut s, &view, Interpolation::Linear, &RenderConfig::default());
    assert_eq!(s.kinds(), ["bitmap"]);

    match &s.ops[0] {
        Op::DrawBitmap { dest, quality, .. } => {
            assert_eq!(*dest, view.image_rect);
            assert_eq!(*quality, Interpolation::Linear);
        }
        other => panic!("unexpected op {other:?}"),
    }
}

#[tokio::test]
async fn try_redraw_invalidates_and_bounds_report_source() {
    let repaints = InvalidateCounter::default();
    let (r, _) = renderer(&repaints, &settled_view(1.0));
    r.try_redraw_offscreen();
    assert_eq!(repaints.count(), 1);
    assert_eq!(r.source_bounds(), Size::new(400.0, 300.0));
}
