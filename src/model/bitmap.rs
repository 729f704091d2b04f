use std::fmt;
use std::sync::Arc;

use crate::foundation::core::{Interpolation, Rect, Size, to_px_u16};
use crate::foundation::error::{ViewerError, ViewerResult};

/// Decoded raster shared between display items, renderers and off-screen composites.
///
/// Pixels are premultiplied RGBA8. Cloning shares the pixel storage; it is freed when the last
/// clone is dropped, so a holder can never release pixels another holder still presents.
#[derive(Clone)]
pub struct Bitmap {
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl Bitmap {
    /// Wrap premultiplied RGBA8 bytes, tightly packed, row-major.
    pub fn from_premul_rgba8(width: u32, height: u32, bytes: &[u8]) -> ViewerResult<Self> {
        let w = to_px_u16(width, "bitmap width")?;
        let h = to_px_u16(height, "bitmap height")?;
        if bytes.len()
            != (width as usize)
                .saturating_mul(height as usize)
                .saturating_mul(4)
        {
            return Err(ViewerError::decode(format!(
                "bitmap byte len {} does not match {width}x{height}",
                bytes.len()
            )));
        }
        let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
            (width as usize) * (height as usize),
        );
        let mut opaque = true;
        for px in bytes.chunks_exact(4) {
            opaque &= px[3] == 255;
            pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
                px[0], px[1], px[2], px[3],
            ]));
        }
        Ok(Self::from_pixmap(vello_cpu::Pixmap::from_parts_with_opacity(
            pixels, w, h, !opaque,
        )))
    }

    /// Wrap straight (non-premultiplied) RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, mut bytes: Vec<u8>) -> ViewerResult<Self> {
        premultiply_rgba8_in_place(&mut bytes);
        Self::from_premul_rgba8(width, height, &bytes)
    }

    pub fn from_image(img: &image::DynamicImage) -> ViewerResult<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    /// Single-color bitmap; mostly useful for placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ViewerResult<Self> {
        let n = (width as usize).saturating_mul(height as usize);
        let mut bytes = Vec::with_capacity(n.saturating_mul(4));
        for _ in 0..n {
            bytes.extend_from_slice(&rgba);
        }
        Self::from_rgba8(width, height, bytes)
    }

    pub(crate) fn from_pixmap(pixmap: vello_cpu::Pixmap) -> Self {
        Self {
            pixmap: Arc::new(pixmap),
        }
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    /// `(0, 0, width, height)`.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size((0.0, 0.0), self.size())
    }

    /// Premultiplied RGBA8 bytes.
    pub fn premul_rgba8(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Copy out as straight-alpha RGBA, e.g. for PNG encoding.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut bytes = self.premul_rgba8().to_vec();
        unpremultiply_rgba8_in_place(&mut bytes);
        image::RgbaImage::from_raw(self.width(), self.height(), bytes)
            .unwrap_or_else(|| image::RgbaImage::new(self.width(), self.height()))
    }

    /// Number of live handles sharing these pixels.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.pixmap)
    }

    pub fn ptr_eq(&self, other: &Bitmap) -> bool {
        Arc::ptr_eq(&self.pixmap, &other.pixmap)
    }

    pub(crate) fn paint(&self, quality: Interpolation) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler {
                quality: quality.to_cpu(),
                ..vello_cpu::peniko::ImageSampler::default()
            },
        }
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("holders", &self.holders())
            .finish()
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/bitmap.rs"]
mod tests;
