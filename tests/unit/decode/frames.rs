use super::*;
use crate::test_support::{gif_bytes, png_bytes};

fn solid(v: u8) -> Bitmap {
    Bitmap::solid(2, 2, [v, v, v, 255]).unwrap()
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn three_frames() -> FrameAnimator {
    FrameAnimator::from_frames(vec![
        (solid(10), ms(100)),
        (solid(20), ms(50)),
        (solid(30), ms(250)),
    ])
    .unwrap()
}

#[test]
fn frame_is_picked_by_cumulative_delay() {
    let a = three_frames();
    assert_eq!(a.total_duration(), ms(400));
    assert_eq!(a.frame_at(ms(0)), 0);
    assert_eq!(a.frame_at(ms(99)), 0);
    assert_eq!(a.frame_at(ms(100)), 1);
    assert_eq!(a.frame_at(ms(149)), 1);
    assert_eq!(a.frame_at(ms(150)), 2);
    assert_eq!(a.frame_at(ms(399)), 2);
}

#[test]
fn timeline_loops() {
    let a = three_frames();
    assert_eq!(a.frame_at(ms(400)), 0);
    assert_eq!(a.frame_at(ms(525)), 1);
    assert_eq!(a.frame_at(ms(4_000 + 160)), 2);
}

#[test]
fn update_swaps_the_surface() {
    let a = three_frames();
    let first = a.surface().unwrap();
    assert_eq!(first.premul_rgba8()[0], 10);

    a.update(ms(120)).unwrap();
    assert_eq!(a.current_frame(), 1);
    assert_eq!(a.surface().unwrap().premul_rgba8()[0], 20);

    a.update(ms(410)).unwrap();
    assert_eq!(a.surface().unwrap().premul_rgba8()[0], 10);
    assert_eq!(a.pixel_size(), (2, 2));
}

#[test]
fn zero_duration_animation_stays_on_first_frame() {
    let a = FrameAnimator::from_frames(vec![
        (solid(1), Duration::ZERO),
        (solid(2), Duration::ZERO),
    ])
    .unwrap();
    a.update(ms(1_000)).unwrap();
    assert_eq!(a.current_frame(), 0);
}

#[test]
fn empty_or_still_input_is_rejected() {
    assert!(FrameAnimator::from_frames(Vec::new()).is_err());
    assert!(matches!(
        FrameAnimator::from_bytes(&png_bytes(2, 2, [0, 0, 0, 255])),
        Err(ViewerError::Decode(_))
    ));
}

#[test]
fn gif_bytes_drive_the_animator() {
    let a = FrameAnimator::from_bytes(&gif_bytes(
        4,
        4,
        &[[255, 0, 0, 255], [0, 0, 255, 255]],
        100,
    ))
    .unwrap();
    assert_eq!(a.frame_count(), 2);
    assert_eq!(a.total_duration(), ms(200));
    a.update(ms(150)).unwrap();
    assert_eq!(&a.surface().unwrap().premul_rgba8()[..4], &[0, 0, 255, 255]);
}
