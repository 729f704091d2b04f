use image::ImageFormat;

use crate::decode::container::{decode_tiff_page, tiff_page_count};
use crate::decode::{decode_image, frame_iter, frame_to_decoded};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::bitmap::Bitmap;

/// Decodes individual pages out of a container file.
pub trait PageDecoder: Send + Sync {
    fn frame_count(&self, bytes: &[u8]) -> ViewerResult<u32>;

    fn decode_page(&self, bytes: &[u8], index: u32) -> ViewerResult<Bitmap>;
}

/// Page decoder built on the `image` and `tiff` crates. Directories of a TIFF file and frames
/// of GIF, APNG and animated WebP files are pages; every other format `image` reads is one page.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImagePageDecoder;

impl PageDecoder for ImagePageDecoder {
    fn frame_count(&self, bytes: &[u8]) -> ViewerResult<u32> {
        if image::guess_format(bytes)? == ImageFormat::Tiff {
            return tiff_page_count(bytes);
        }
        match frame_iter(bytes)? {
            Some(mut frames) => frames.try_fold(0u32, |n, f| {
                f.map(|_| n.saturating_add(1)).map_err(ViewerError::from)
            }),
            None => Ok(1),
        }
    }

    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    fn decode_page(&self, bytes: &[u8], index: u32) -> ViewerResult<Bitmap> {
        // The first TIFF page goes through `image`, which reads more pixel layouts.
        if index > 0 && image::guess_format(bytes)? == ImageFormat::Tiff {
            return decode_tiff_page(bytes, index);
        }
        match frame_iter(bytes)? {
            Some(mut frames) => {
                let frame = frames.nth(index as usize).ok_or_else(|| {
                    ViewerError::decode(format!("page {index} missing from container"))
                })??;
                Ok(frame_to_decoded(frame)?.bitmap)
            }
            None if index == 0 => decode_image(bytes),
            None => Err(ViewerError::PageOutOfRange {
                index: i64::from(index),
                count: 1,
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/pages.rs"]
mod tests;
