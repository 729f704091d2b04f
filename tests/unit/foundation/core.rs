use super::*;

#[test]
fn offscreen_quality_follows_flag() {
    assert_eq!(
        Interpolation::for_offscreen(true),
        Interpolation::HighQualityCubic
    );
    assert_eq!(
        Interpolation::for_offscreen(false),
        Interpolation::NearestNeighbor
    );
}

#[test]
fn interpolation_serde_uses_snake_case() {
    let s = serde_json::to_string(&Interpolation::HighQualityCubic).unwrap();
    assert_eq!(s, "\"high_quality_cubic\"");
    let back: Interpolation = serde_json::from_str("\"nearest_neighbor\"").unwrap();
    assert_eq!(back, Interpolation::NearestNeighbor);
}

#[test]
fn pixel_extents_beyond_u16_are_rejected() {
    assert_eq!(to_px_u16(640, "width").unwrap(), 640);
    assert!(to_px_u16(70_000, "width").is_err());
}

#[test]
fn affine_conversion_keeps_coefficients() {
    let a = Affine::new([2.0, 0.5, -0.5, 3.0, 10.0, 20.0]);
    assert_eq!(affine_to_cpu(a).as_coeffs(), a.as_coeffs());
}
