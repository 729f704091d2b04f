use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::foundation::core::{Affine, Point, Rect, Size};

/// Per-frame geometry produced by the viewport controller.
///
/// `image_rect` is expressed in image space; the host applies `mat` to the drawing session, so
/// a renderer drawing into `image_rect` lands at `image_pos`, scaled by `scale` and rotated by
/// `rotation` degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewState {
    pub image_rect: Rect,
    pub image_pos: Point,
    pub scale: f64,
    pub last_scale_to: f64,
    pub rotation: i32,
    pub mat: Affine,
    pub mat_inv: Affine,
    /// Live size of the canvas the frame is presented on.
    pub canvas_size: Size,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            image_rect: Rect::ZERO,
            image_pos: Point::ZERO,
            scale: 1.0,
            last_scale_to: 1.0,
            rotation: 0,
            mat: Affine::IDENTITY,
            mat_inv: Affine::IDENTITY,
            canvas_size: Size::ZERO,
        }
    }
}

impl ViewState {
    /// View of an `image_size` image centered on `image_pos` at `scale`.
    pub fn new(image_size: Size, image_pos: Point, scale: f64, canvas_size: Size) -> Self {
        let mut v = Self {
            image_rect: Rect::from_origin_size(Point::ZERO, image_size),
            image_pos,
            scale,
            last_scale_to: scale,
            canvas_size,
            ..Self::default()
        };
        v.update_transform();
        v
    }

    /// Copy the controller-owned view properties (not the geometry) from `source`.
    pub fn apply(&mut self, source: &ViewState) {
        self.scale = source.scale;
        self.last_scale_to = source.last_scale_to;
        self.image_pos = source.image_pos;
        self.rotation = source.rotation;
    }

    /// Rebuild `mat`/`mat_inv`: center the image on the origin, scale, rotate, then move it to
    /// `image_pos`. Both translations are rounded to whole pixels to avoid subpixel blurring.
    pub fn update_transform(&mut self) {
        let to_origin = (
            (-self.image_rect.width() * 0.5).round(),
            (-self.image_rect.height() * 0.5).round(),
        );
        let to_pos = (self.image_pos.x.round(), self.image_pos.y.round());
        self.mat = Affine::translate(to_origin)
            .then_scale(self.scale)
            .then_rotate(f64::from(self.rotation).to_radians())
            .then_translate(to_pos.into());
        self.mat_inv = if self.mat.determinant().abs() > f64::EPSILON {
            self.mat.inverse()
        } else {
            Affine::IDENTITY
        };
    }

    /// Horizontal component of the inverse transform; scales brush patterns so their on-screen
    /// density does not change with zoom.
    pub fn brush_scale(&self) -> f64 {
        self.mat_inv.as_coeffs()[0]
    }

    /// Pixel size of a 1:1 composite of `image_rect` at the current scale (truncated).
    pub fn scaled_pixel_size(&self) -> (u32, u32) {
        let w = self.image_rect.width() * self.scale;
        let h = self.image_rect.height() * self.scale;
        (trunc_px(w), trunc_px(h))
    }

    /// Whether a canvas point falls on the image.
    pub fn contains_canvas_point(&self, p: Point) -> bool {
        self.image_rect.contains(self.mat_inv * p)
    }
}

fn trunc_px(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Publication slot for the latest [`ViewState`].
///
/// The controller publishes whole snapshots; readers (draw, off-screen builds on background
/// tasks) never block and never see a half-updated state.
#[derive(Clone, Debug)]
pub struct SharedViewState {
    slot: Arc<ArcSwap<ViewState>>,
}

impl SharedViewState {
    pub fn new(initial: ViewState) -> Self {
        Self {
            slot: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    pub fn publish(&self, view: ViewState) {
        self.slot.store(Arc::new(view));
    }

    pub fn snapshot(&self) -> Arc<ViewState> {
        self.slot.load_full()
    }
}

impl Default for SharedViewState {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/view_state.rs"]
mod tests;
