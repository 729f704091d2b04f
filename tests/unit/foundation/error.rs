use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ViewerError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        ViewerError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(
        ViewerError::surface("x")
            .to_string()
            .contains("surface error:")
    );
    assert!(
        ViewerError::config("x")
            .to_string()
            .contains("configuration error:")
    );
}

#[test]
fn page_out_of_range_names_index_and_count() {
    let msg = ViewerError::PageOutOfRange { index: -1, count: 3 }.to_string();
    assert!(msg.contains("-1"));
    assert!(msg.contains("3 pages"));
}

#[test]
fn image_errors_become_decode_errors() {
    let err = image::load_from_memory(b"definitely not an image").unwrap_err();
    assert!(matches!(ViewerError::from(err), ViewerError::Decode(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ViewerError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
