use std::sync::Arc;

use crate::decode::frames::FrameAnimator;
use crate::decode::pages::ImagePageDecoder;
use crate::foundation::config::{RenderConfig, RendererOpts};
use crate::foundation::core::{Interpolation, Size};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::display_item::HqDisplayItem;
use crate::model::view_state::{SharedViewState, ViewState};
use crate::render::animated::AnimatedImageRenderer;
use crate::render::checkerboard::CheckerboardBrush;
use crate::render::multi_page::MultiPageRenderer;
use crate::render::session::DrawingSession;
use crate::render::static_image::StaticImageRenderer;

/// Callback asking the host to present another frame.
pub type InvalidateFn = Arc<dyn Fn() + Send + Sync>;

/// Collaborators every renderer is built with.
#[derive(Clone)]
pub struct RendererEnv {
    /// Runtime that decode, off-screen builds and animation advances are spawned on.
    pub runtime: tokio::runtime::Handle,
    pub invalidate: InvalidateFn,
    pub checkerboard: Arc<CheckerboardBrush>,
    /// Latest geometry published by the viewport controller.
    pub view: SharedViewState,
    pub opts: RendererOpts,
}

impl RendererEnv {
    pub fn new(
        runtime: tokio::runtime::Handle,
        invalidate: impl Fn() + Send + Sync + 'static,
        opts: RendererOpts,
    ) -> ViewerResult<Self> {
        opts.validate()?;
        Ok(Self {
            runtime,
            invalidate: Arc::new(invalidate),
            checkerboard: Arc::new(CheckerboardBrush::new(opts.checker_cell_px)?),
            view: SharedViewState::default(),
            opts,
        })
    }

    pub fn with_view(mut self, view: SharedViewState) -> Self {
        self.view = view;
        self
    }
}

impl std::fmt::Debug for RendererEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererEnv")
            .field("checkerboard", &self.checkerboard)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RendererKind {
    Static,
    Animated,
    MultiPage,
}

/// The renderer for whatever item is on screen.
pub enum Renderer {
    Static(StaticImageRenderer),
    Animated(AnimatedImageRenderer),
    MultiPage(MultiPageRenderer),
}

impl Renderer {
    pub fn kind(&self) -> RendererKind {
        match self {
            Self::Static(_) => RendererKind::Static,
            Self::Animated(_) => RendererKind::Animated,
            Self::MultiPage(_) => RendererKind::MultiPage,
        }
    }

    /// Paint one frame into `session`, whose transform the host has set to `view.mat`.
    pub fn draw(
        &self,
        session: &mut dyn DrawingSession,
        view: &ViewState,
        quality: Interpolation,
        config: &RenderConfig,
    ) {
        match self {
            Self::Static(r) => r.draw(session, view, quality, config),
            Self::Animated(r) => r.draw(session, view, quality, config),
            Self::MultiPage(r) => r.draw(session, view, quality, config),
        }
    }

    /// Geometry changed (pan, zoom, resize, navigation).
    pub fn restart_offscreen_draw_timer(&self) {
        match self {
            Self::Static(r) => r.restart_offscreen_draw_timer(),
            Self::Animated(_) | Self::MultiPage(_) => {}
        }
    }

    pub fn try_redraw_offscreen(&self) {
        match self {
            Self::Static(r) => r.try_redraw_offscreen(),
            Self::Animated(r) => r.try_redraw_offscreen(),
            Self::MultiPage(r) => r.try_redraw_offscreen(),
        }
    }

    pub fn source_bounds(&self) -> Size {
        match self {
            Self::Static(r) => r.source_bounds(),
            Self::Animated(r) => r.source_bounds(),
            Self::MultiPage(r) => r.source_bounds(),
        }
    }

    pub fn dispose(&self) {
        match self {
            Self::Static(r) => r.dispose(),
            Self::Animated(r) => r.dispose(),
            Self::MultiPage(r) => r.dispose(),
        }
    }
}

/// Build the renderer variant matching `item`.
///
/// Animated items whose frames cannot be decoded fall back to a static renderer showing the
/// first frame.
pub async fn create_renderer(
    item: &HqDisplayItem,
    supports_transparency: bool,
    config: &RenderConfig,
    env: RendererEnv,
) -> ViewerResult<Renderer> {
    match item {
        HqDisplayItem::Empty => Err(ViewerError::decode("no high-quality item to render")),
        HqDisplayItem::Static(_) => {
            let bitmap = item
                .bitmap()
                .ok_or_else(|| ViewerError::decode("static item has no bitmap"))?;
            Ok(Renderer::Static(StaticImageRenderer::new(
                bitmap.clone(),
                supports_transparency,
                config,
                env,
            )))
        }
        HqDisplayItem::Animated(_) => {
            let bytes = item
                .file_bytes()
                .cloned()
                .ok_or_else(|| ViewerError::decode("animated item has no file bytes"))?;
            let animator = env
                .runtime
                .spawn_blocking(move || FrameAnimator::from_bytes(&bytes))
                .await
                .map_err(|e| ViewerError::animation(format!("animator task failed: {e}")))
                .and_then(|r| r);
            match animator {
                Ok(animator) => Ok(Renderer::Animated(AnimatedImageRenderer::new(
                    Box::new(animator),
                    supports_transparency,
                    env,
                ))),
                Err(err) => {
                    tracing::warn!(%err, "animation unavailable; showing first frame");
                    let bitmap = item.bitmap().ok_or(err)?;
                    Ok(Renderer::Static(StaticImageRenderer::new(
                        bitmap.clone(),
                        supports_transparency,
                        config,
                        env,
                    )))
                }
            }
        }
        HqDisplayItem::MultiPage(_) => {
            let bytes = item
                .file_bytes()
                .cloned()
                .ok_or_else(|| ViewerError::decode("multi-page item has no file bytes"))?;
            Ok(Renderer::MultiPage(MultiPageRenderer::new(
                bytes,
                0,
                Arc::new(ImagePageDecoder),
                supports_transparency,
                env,
            )))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
