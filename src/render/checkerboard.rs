use std::sync::Arc;

use crate::foundation::config::RenderConfig;
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::view_state::ViewState;
use crate::render::session::DrawingSession;

const CHECKER_LIGHT: [u8; 4] = [255, 255, 255, 255];
const CHECKER_DARK: [u8; 4] = [204, 204, 204, 255];

/// Tiled two-tone pattern painted behind images that may be transparent.
///
/// One tile is `2 * cell` pixels square: grey, with white cells on the main diagonal.
#[derive(Clone)]
pub struct CheckerboardBrush {
    cell_px: u32,
    tile: Arc<vello_cpu::Pixmap>,
}

impl CheckerboardBrush {
    pub fn new(cell_px: u32) -> ViewerResult<Self> {
        let side = cell_px
            .checked_mul(2)
            .filter(|&s| s > 0 && s <= u32::from(u16::MAX))
            .ok_or_else(|| ViewerError::config(format!("invalid checker cell size {cell_px}")))?;
        let n = side as usize;
        let mut pixels = Vec::with_capacity(n * n);
        for y in 0..side {
            for x in 0..side {
                let light = (x < cell_px) == (y < cell_px);
                let c = if light { CHECKER_LIGHT } else { CHECKER_DARK };
                pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array(c));
            }
        }
        let tile = vello_cpu::Pixmap::from_parts_with_opacity(pixels, side as u16, side as u16, false);
        Ok(Self {
            cell_px,
            tile: Arc::new(tile),
        })
    }

    pub fn cell_px(&self) -> u32 {
        self.cell_px
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        use vello_cpu::peniko::{Extend, ImageQuality, ImageSampler};
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.tile)),
            sampler: ImageSampler {
                x_extend: Extend::Repeat,
                y_extend: Extend::Repeat,
                quality: ImageQuality::Low,
                ..ImageSampler::default()
            },
        }
    }
}

impl std::fmt::Debug for CheckerboardBrush {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerboardBrush")
            .field("cell_px", &self.cell_px)
            .finish()
    }
}

/// Paint the checkerboard under `view.image_rect` when the flag is on and the image can be
/// transparent. Returns whether anything was painted.
pub(crate) fn fill_checkerboard_if_enabled(
    session: &mut dyn DrawingSession,
    view: &ViewState,
    brush: &CheckerboardBrush,
    config: &RenderConfig,
    supports_transparency: bool,
) -> bool {
    if !(config.checkered_background && supports_transparency) {
        return false;
    }
    let dest: Rect = view.image_rect;
    session.fill_checkerboard(dest, brush, Affine::scale(view.brush_scale()));
    true
}

#[cfg(test)]
#[path = "../../tests/unit/render/checkerboard.rs"]
mod tests;
