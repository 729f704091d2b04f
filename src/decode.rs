//! Turning file bytes into bitmaps and display items.

pub(crate) mod container;
pub(crate) mod frames;
pub(crate) mod pages;

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, Frames, ImageFormat};

use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::bitmap::Bitmap;
use crate::model::display_item::{HqDisplayItem, Origin};

/// Browsers show frames without a delay for 100 ms; so do we.
pub(crate) const ZERO_DELAY_FALLBACK: Duration = Duration::from_millis(100);

/// Decode the first (or only) image in `bytes`.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_image(bytes: &[u8]) -> ViewerResult<Bitmap> {
    let img = image::load_from_memory(bytes)?;
    Bitmap::from_image(&img)
}

/// One composited animation frame.
#[derive(Clone, Debug)]
pub(crate) struct DecodedFrame {
    pub(crate) bitmap: Bitmap,
    pub(crate) delay: Duration,
}

/// Frame iterator for GIF, APNG and animated WebP; `None` for everything else.
pub(crate) fn frame_iter(bytes: &[u8]) -> ViewerResult<Option<Frames<'_>>> {
    let frames = match image::guess_format(bytes)? {
        ImageFormat::Gif => GifDecoder::new(Cursor::new(bytes))?.into_frames(),
        ImageFormat::Png => {
            let png = PngDecoder::new(Cursor::new(bytes))?;
            if !png.is_apng()? {
                return Ok(None);
            }
            png.apng()?.into_frames()
        }
        ImageFormat::WebP => {
            let webp = WebPDecoder::new(Cursor::new(bytes))?;
            if !webp.has_animation() {
                return Ok(None);
            }
            webp.into_frames()
        }
        _ => return Ok(None),
    };
    Ok(Some(frames))
}

pub(crate) fn frame_to_decoded(frame: image::Frame) -> ViewerResult<DecodedFrame> {
    let (numer, denom) = frame.delay().numer_denom_ms();
    let delay = match u64::from(numer).checked_div(u64::from(denom)) {
        Some(0) | None => ZERO_DELAY_FALLBACK,
        Some(ms) => Duration::from_millis(ms),
    };
    let buffer = frame.into_buffer();
    let (width, height) = buffer.dimensions();
    Ok(DecodedFrame {
        bitmap: Bitmap::from_rgba8(width, height, buffer.into_raw())?,
        delay,
    })
}

/// All frames of an animated image; `None` if the format carries a single frame.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub(crate) fn decode_frames(bytes: &[u8]) -> ViewerResult<Option<Vec<DecodedFrame>>> {
    let Some(frames) = frame_iter(bytes)? else {
        return Ok(None);
    };
    frames
        .map(|f| frame_to_decoded(f.map_err(ViewerError::from)?))
        .collect::<ViewerResult<Vec<_>>>()
        .map(Some)
}

/// Build the high-quality item for a file.
///
/// TIFF files with more than one page become multi-page items. Other images with more than one
/// frame become animated items, or multi-page items when `frames_as_pages` is set; everything
/// else is static.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn load_hq_item(
    bytes: Arc<[u8]>,
    origin: Origin,
    frames_as_pages: bool,
) -> ViewerResult<HqDisplayItem> {
    if image::guess_format(&bytes)? == ImageFormat::Tiff {
        let first = decode_image(&bytes)?;
        return if container::tiff_page_count(&bytes)? > 1 {
            Ok(HqDisplayItem::new_multi_page(first, origin, bytes))
        } else {
            Ok(HqDisplayItem::new_static(first, origin, 0))
        };
    }

    let multi_frame = match frame_iter(&bytes)? {
        Some(mut frames) => {
            let first = frames
                .next()
                .ok_or_else(|| ViewerError::decode("animation has no frames"))??;
            let more = frames.next().is_some();
            Some((frame_to_decoded(first)?.bitmap, more))
        }
        None => None,
    };

    match multi_frame {
        Some((first, true)) if frames_as_pages => {
            Ok(HqDisplayItem::new_multi_page(first, origin, bytes))
        }
        Some((first, true)) => Ok(HqDisplayItem::new_animated(first, origin, bytes)),
        Some((first, false)) => Ok(HqDisplayItem::new_static(first, origin, 0)),
        None => Ok(HqDisplayItem::new_static(decode_image(&bytes)?, origin, 0)),
    }
}

#[cfg(test)]
#[path = "../tests/unit/decode.rs"]
mod tests;
