//! Debounced, pre-scaled composite of a static image.
//!
//! Drawing a large source bitmap scaled every frame is expensive, so once geometry settles the
//! compositor renders the source at exactly the on-screen pixel size and the renderer blits
//! that buffer 1:1 instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use tokio::task::JoinHandle;

use crate::foundation::core::{Interpolation, Rect};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::bitmap::Bitmap;
use crate::model::view_state::ViewState;
use crate::render::renderer::RendererEnv;
use crate::render::session::{CpuCanvas, DrawingSession};

/// What a rebuild should do for the current geometry.
///
/// Every rebuild follows a restart, which has already dropped the previous buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OffscreenPlan {
    /// No buffer for this geometry; draw the source directly.
    Discard,
    Build { width: u32, height: u32 },
}

/// Decide the buffer for `view`: build one only while the target is narrower than
/// `max_width_factor` canvas widths.
pub(crate) fn plan_offscreen(view: &ViewState, max_width_factor: f64) -> OffscreenPlan {
    let (width, height) = view.scaled_pixel_size();
    if width == 0 || height == 0 {
        return OffscreenPlan::Discard;
    }
    let limit = view.canvas_size.width * max_width_factor;
    if f64::from(width) < limit {
        OffscreenPlan::Build { width, height }
    } else {
        OffscreenPlan::Discard
    }
}

/// Render all of `source` into a new `width x height` bitmap.
#[tracing::instrument(skip(source), fields(src_w = source.width(), src_h = source.height()))]
pub(crate) fn compose_offscreen(
    source: &Bitmap,
    width: u32,
    height: u32,
    quality: Interpolation,
) -> ViewerResult<Bitmap> {
    let mut canvas = CpuCanvas::new(width, height)?;
    canvas.draw_bitmap(
        source,
        Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
        quality,
    );
    Ok(canvas.finish())
}

struct CompositorShared {
    source: Bitmap,
    slot: ArcSwapOption<Bitmap>,
    // Bumped by every restart; a rebuild only publishes under the generation it started with.
    generation: Mutex<u64>,
    disposed: AtomicBool,
    high_quality: AtomicBool,
    env: RendererEnv,
}

impl CompositorShared {
    fn is_current(&self, generation: u64) -> bool {
        !self.disposed.load(Ordering::Acquire)
            && *self.generation.lock().unwrap_or_else(PoisonError::into_inner) == generation
    }

    async fn rebuild(self: Arc<Self>, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        let view = self.env.view.snapshot();
        let plan = plan_offscreen(&view, self.env.opts.offscreen_max_width_factor);
        tracing::debug!(?plan, generation, "off-screen rebuild");

        match plan {
            OffscreenPlan::Discard => self.publish(generation, None),
            OffscreenPlan::Build { width, height } => {
                let quality =
                    Interpolation::for_offscreen(self.high_quality.load(Ordering::Relaxed));
                let source = self.source.clone();
                let built = tokio::task::spawn_blocking(move || {
                    compose_offscreen(&source, width, height, quality)
                })
                .await
                .map_err(|e| ViewerError::surface(format!("off-screen build task failed: {e}")))
                .and_then(|r| r);
                match built {
                    Ok(bmp) => self.publish(generation, Some(Arc::new(bmp))),
                    Err(err) => {
                        tracing::warn!(%err, width, height, "off-screen build failed; drawing source directly");
                        self.publish(generation, None);
                    }
                }
            }
        }

        if self.is_current(generation) {
            (self.env.invalidate)();
        }
    }

    fn publish(&self, generation: u64, buffer: Option<Arc<Bitmap>>) {
        let guard = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *guard == generation && !self.disposed.load(Ordering::Acquire) {
            self.slot.store(buffer);
        }
    }
}

/// Off-screen buffer plus the debounce timer that rebuilds it.
pub(crate) struct OffscreenCompositor {
    shared: Arc<CompositorShared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl OffscreenCompositor {
    pub(crate) fn new(source: Bitmap, env: RendererEnv, high_quality: bool) -> Self {
        Self {
            shared: Arc::new(CompositorShared {
                source,
                slot: ArcSwapOption::empty(),
                generation: Mutex::new(0),
                disposed: AtomicBool::new(false),
                high_quality: AtomicBool::new(high_quality),
                env,
            }),
            timer: Mutex::new(None),
        }
    }

    pub(crate) fn source(&self) -> &Bitmap {
        &self.shared.source
    }

    /// The buffer to blit, if one matches the last settled geometry.
    pub(crate) fn current(&self) -> Option<Arc<Bitmap>> {
        self.shared.slot.load_full()
    }

    pub(crate) fn set_high_quality(&self, on: bool) {
        self.shared.high_quality.store(on, Ordering::Relaxed);
    }

    /// Drop the buffer now and schedule a rebuild once geometry has been quiet for the
    /// debounce interval. Each call pushes the rebuild back.
    pub(crate) fn restart(&self) {
        let generation = {
            let mut g = self
                .shared
                .generation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *g += 1;
            self.shared.slot.store(None);
            *g
        };

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = timer.take() {
            prev.abort();
        }
        if self.shared.disposed.load(Ordering::Acquire) {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let delay = shared.env.opts.offscreen_debounce();
        *timer = Some(self.shared.env.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.rebuild(generation).await;
        }));
    }

    pub(crate) fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(timer) = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            timer.abort();
        }
        let _g = self
            .shared
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.shared.slot.store(None);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/offscreen.rs"]
mod tests;
