use super::*;

#[test]
fn straight_rgba_is_premultiplied() {
    let bmp = Bitmap::from_rgba8(1, 1, vec![100, 50, 200, 128]).unwrap();
    assert_eq!(bmp.width(), 1);
    assert_eq!(bmp.height(), 1);
    assert_eq!(
        bmp.premul_rgba8(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn byte_len_mismatch_is_a_decode_error() {
    let err = Bitmap::from_premul_rgba8(2, 2, &[0u8; 12]).unwrap_err();
    assert!(matches!(err, ViewerError::Decode(_)));
}

#[test]
fn oversized_bitmaps_are_rejected() {
    assert!(Bitmap::from_premul_rgba8(70_000, 1, &[]).is_err());
}

#[test]
fn clones_share_pixels_and_count_holders() {
    let a = Bitmap::solid(4, 3, [255, 0, 0, 255]).unwrap();
    assert_eq!(a.holders(), 1);
    let b = a.clone();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.holders(), 2);
    drop(b);
    assert_eq!(a.holders(), 1);
    assert_eq!(a.bounds(), Rect::new(0.0, 0.0, 4.0, 3.0));
}

#[test]
fn rgba_image_roundtrip_keeps_opaque_pixels() {
    let bmp = Bitmap::solid(2, 2, [10, 20, 30, 255]).unwrap();
    let img = bmp.to_rgba_image();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 1).0, [10, 20, 30, 255]);
}

#[test]
fn from_image_uses_image_dimensions() {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        5,
        7,
        image::Rgba([1, 2, 3, 255]),
    ));
    let bmp = Bitmap::from_image(&img).unwrap();
    assert_eq!((bmp.width(), bmp.height()), (5, 7));
}
