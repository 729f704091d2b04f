//! Multi-page TIFF documents.

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::{ColorType, TiffError, TiffFormatError};

use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::bitmap::Bitmap;

/// Number of image directories (pages) in a TIFF file.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub(crate) fn tiff_page_count(bytes: &[u8]) -> ViewerResult<u32> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let mut count = 1u32;
    while decoder.more_images() {
        decoder.next_image()?;
        count = count.saturating_add(1);
    }
    Ok(count)
}

/// Decode page `index` of a TIFF file.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub(crate) fn decode_tiff_page(bytes: &[u8], index: u32) -> ViewerResult<Bitmap> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    if index > 0 {
        decoder.seek_to_image(index as usize).map_err(|err| match err {
            TiffError::FormatError(TiffFormatError::ImageFileDirectoryNotFound) => {
                ViewerError::PageOutOfRange {
                    index: i64::from(index),
                    count: tiff_page_count(bytes).unwrap_or(index),
                }
            }
            other => ViewerError::from(other),
        })?;
    }
    let (width, height) = decoder.dimensions()?;
    let color = decoder.colortype()?;
    let samples = match decoder.read_image()? {
        DecodingResult::U8(samples) => samples,
        // Keep the high byte of 16-bit samples.
        DecodingResult::U16(samples) => samples.into_iter().map(|s| (s >> 8) as u8).collect(),
        _ => return Err(unsupported(color)),
    };
    let rgba = match color {
        ColorType::RGBA(8 | 16) => samples,
        ColorType::RGB(8 | 16) => samples
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        ColorType::GrayA(8 | 16) => samples
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        ColorType::Gray(8 | 16) => samples.into_iter().flat_map(|g| [g, g, g, 255]).collect(),
        other => return Err(unsupported(other)),
    };
    Bitmap::from_rgba8(width, height, rgba)
}

fn unsupported(color: ColorType) -> ViewerError {
    ViewerError::decode(format!("unsupported TIFF pixel layout {color:?}"))
}

#[cfg(test)]
#[path = "../../tests/unit/decode/container.rs"]
mod tests;
