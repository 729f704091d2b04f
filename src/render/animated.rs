use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::time::Instant;

use crate::foundation::config::RenderConfig;
use crate::foundation::core::{Interpolation, Size};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::bitmap::Bitmap;
use crate::model::view_state::ViewState;
use crate::render::checkerboard::fill_checkerboard_if_enabled;
use crate::render::renderer::RendererEnv;
use crate::render::session::DrawingSession;
use crate::render::single_flight::SingleFlight;

/// Source of animation frames driven by elapsed wall time.
///
/// `update` may be slow (it decodes and composites) and runs off the draw path; `surface` is
/// called on every draw and must not block on `update`.
pub trait Animator: Send + Sync {
    fn pixel_size(&self) -> (u32, u32);

    /// The frame for the last completed `update`, if any.
    fn surface(&self) -> Option<Bitmap>;

    fn update(&self, elapsed: Duration) -> ViewerResult<()>;
}

type SharedAnimator = Box<dyn Animator>;

struct AnimatedShared {
    animator: ArcSwapOption<SharedAnimator>,
    started: Instant,
    // Set when an advance fails or on dispose; no further advances are attempted.
    halted: AtomicBool,
    disposed: AtomicBool,
    // Owned per renderer; only this animator's updates are serialized.
    guard: Arc<SingleFlight>,
    env: RendererEnv,
}

impl AnimatedShared {
    fn request_advance(self: &Arc<Self>) {
        if self.halted.load(Ordering::Acquire) {
            return;
        }
        let Some(permit) = self.guard.try_acquire() else {
            tracing::trace!("advance already in flight; tick dropped");
            return;
        };
        let shared = Arc::clone(self);
        self.env.runtime.spawn(async move {
            shared.advance().await;
            drop(permit);
        });
    }

    async fn advance(&self) {
        let Some(animator) = self.animator.load_full() else {
            return;
        };
        let elapsed = self.started.elapsed();
        let result = tokio::task::spawn_blocking(move || animator.update(elapsed))
            .await
            .map_err(|e| ViewerError::animation(format!("advance task failed: {e}")))
            .and_then(|r| r);

        match result {
            Ok(()) => {
                if !self.disposed.load(Ordering::Acquire) {
                    (self.env.invalidate)();
                }
            }
            Err(err) => {
                self.halted.store(true, Ordering::Release);
                tracing::warn!(%err, ?elapsed, "animation advance failed; clock stopped");
            }
        }
    }
}

/// Renderer for GIF-like animations.
///
/// Every draw shows the animator's latest surface and then asks for the next frame. Advances
/// run one at a time; draws arriving while one is in flight skip the request.
pub struct AnimatedImageRenderer {
    shared: Arc<AnimatedShared>,
    pixel_size: (u32, u32),
    supports_transparency: bool,
}

impl AnimatedImageRenderer {
    pub fn new(animator: Box<dyn Animator>, supports_transparency: bool, env: RendererEnv) -> Self {
        let pixel_size = animator.pixel_size();
        Self {
            shared: Arc::new(AnimatedShared {
                animator: ArcSwapOption::from_pointee(animator),
                started: Instant::now(),
                halted: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
                guard: Arc::new(SingleFlight::new()),
                env,
            }),
            pixel_size,
            supports_transparency,
        }
    }

    pub fn draw(
        &self,
        session: &mut dyn DrawingSession,
        view: &ViewState,
        quality: Interpolation,
        config: &RenderConfig,
    ) {
        if self.shared.disposed.load(Ordering::Acquire) {
            return;
        }
        let Some(surface) = self
            .shared
            .animator
            .load()
            .as_ref()
            .and_then(|a| a.surface())
        else {
            return;
        };
        fill_checkerboard_if_enabled(
            session,
            view,
            &self.shared.env.checkerboard,
            config,
            self.supports_transparency,
        );
        session.draw_bitmap(&surface, view.image_rect, quality);
        self.shared.request_advance();
    }

    pub fn try_redraw_offscreen(&self) {
        if !self.shared.disposed.load(Ordering::Acquire) {
            (self.shared.env.invalidate)();
        }
    }

    pub fn source_bounds(&self) -> Size {
        Size::new(f64::from(self.pixel_size.0), f64::from(self.pixel_size.1))
    }

    /// True once an advance has failed or the renderer was disposed.
    pub fn is_halted(&self) -> bool {
        self.shared.halted.load(Ordering::Acquire)
    }

    /// True while an advance for this renderer is in flight.
    pub fn is_advancing(&self) -> bool {
        self.shared.guard.is_busy()
    }

    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.halted.store(true, Ordering::Release);
        // An in-flight advance keeps its own handle; the animator is freed when it finishes.
        self.shared.animator.store(None);
    }
}

impl Drop for AnimatedImageRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/animated.rs"]
mod tests;
