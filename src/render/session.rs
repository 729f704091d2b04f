use crate::foundation::core::{Affine, Interpolation, Rect, Size, affine_to_cpu, rect_to_cpu, to_px_u16};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::bitmap::Bitmap;
use crate::render::checkerboard::CheckerboardBrush;

/// Drawing primitives renderers paint with.
///
/// Coordinates passed to the fill/draw calls are in the space set by [`set_transform`]; hosts
/// set the view transform once per frame before handing the session to a renderer.
///
/// [`set_transform`]: DrawingSession::set_transform
pub trait DrawingSession {
    fn set_transform(&mut self, transform: Affine);

    /// Fill `dest` with the tiled checkerboard; `brush_transform` maps pattern space into
    /// `dest`'s space.
    fn fill_checkerboard(&mut self, dest: Rect, brush: &CheckerboardBrush, brush_transform: Affine);

    /// Draw all of `bitmap` stretched into `dest`.
    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect, quality: Interpolation);
}

/// CPU raster target powered by `vello_cpu`.
pub struct CpuCanvas {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
    transform: Affine,
}

impl CpuCanvas {
    pub fn new(width: u32, height: u32) -> ViewerResult<Self> {
        if width == 0 || height == 0 {
            return Err(ViewerError::surface(format!(
                "canvas size must be non-zero, got {width}x{height}"
            )));
        }
        let w = to_px_u16(width, "canvas width")?;
        let h = to_px_u16(height, "canvas height")?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            width: w,
            height: h,
            transform: Affine::IDENTITY,
        })
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Drop everything recorded so far; the next [`finish`](Self::finish) starts from
    /// transparent.
    pub fn reset(&mut self) {
        self.ctx.reset();
        self.transform = Affine::IDENTITY;
    }

    /// Rasterize the recorded commands into a fresh bitmap and reset the canvas.
    pub fn finish(&mut self) -> Bitmap {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        self.reset();
        Bitmap::from_pixmap(pixmap)
    }
}

impl DrawingSession for CpuCanvas {
    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn fill_checkerboard(&mut self, dest: Rect, brush: &CheckerboardBrush, brush_transform: Affine) {
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx.set_paint_transform(affine_to_cpu(brush_transform));
        self.ctx.set_paint(brush.paint());
        self.ctx.fill_rect(&rect_to_cpu(dest));
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect, quality: Interpolation) {
        let (bw, bh) = (f64::from(bitmap.width()), f64::from(bitmap.height()));
        if bw == 0.0 || bh == 0.0 || dest.area() <= 0.0 {
            return;
        }
        let place = Affine::translate(dest.origin().to_vec2())
            * Affine::scale_non_uniform(dest.width() / bw, dest.height() / bh);
        self.ctx.set_transform(affine_to_cpu(self.transform * place));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(bitmap.paint(quality));
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
