use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::config::RenderConfig;
use crate::foundation::core::{Interpolation, Size};
use crate::model::bitmap::Bitmap;
use crate::model::view_state::ViewState;
use crate::render::checkerboard::fill_checkerboard_if_enabled;
use crate::render::offscreen::OffscreenCompositor;
use crate::render::renderer::RendererEnv;
use crate::render::session::DrawingSession;

/// Renderer for a single decoded frame.
///
/// While the view is moving the source is scaled on every draw; once it settles the
/// off-screen compositor supplies a buffer at screen resolution.
pub struct StaticImageRenderer {
    compositor: OffscreenCompositor,
    env: RendererEnv,
    supports_transparency: bool,
    disposed: AtomicBool,
}

impl StaticImageRenderer {
    pub fn new(
        bitmap: Bitmap,
        supports_transparency: bool,
        config: &RenderConfig,
        env: RendererEnv,
    ) -> Self {
        Self {
            compositor: OffscreenCompositor::new(
                bitmap,
                env.clone(),
                config.high_quality_interpolation,
            ),
            env,
            supports_transparency,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn draw(
        &self,
        session: &mut dyn DrawingSession,
        view: &ViewState,
        quality: Interpolation,
        config: &RenderConfig,
    ) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        self.compositor
            .set_high_quality(config.high_quality_interpolation);
        fill_checkerboard_if_enabled(
            session,
            view,
            &self.env.checkerboard,
            config,
            self.supports_transparency,
        );
        match self.compositor.current() {
            Some(buffer) => session.draw_bitmap(&buffer, view.image_rect, quality),
            None => session.draw_bitmap(self.compositor.source(), view.image_rect, quality),
        }
    }

    pub fn restart_offscreen_draw_timer(&self) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        self.compositor.restart();
    }

    pub fn try_redraw_offscreen(&self) {
        if !self.disposed.load(Ordering::Acquire) {
            (self.env.invalidate)();
        }
    }

    /// Pixel size of the current off-screen buffer, if one is built.
    pub fn offscreen_size(&self) -> Option<(u32, u32)> {
        self.compositor.current().map(|b| (b.width(), b.height()))
    }

    pub fn source_bounds(&self) -> Size {
        self.compositor.source().size()
    }

    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.compositor.dispose();
    }
}

impl Drop for StaticImageRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/static_image.rs"]
mod tests;
