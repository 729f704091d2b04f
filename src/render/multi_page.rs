use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use tokio::task::JoinHandle;

use crate::decode::pages::PageDecoder;
use crate::foundation::config::RenderConfig;
use crate::foundation::core::{Interpolation, Size};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::bitmap::Bitmap;
use crate::model::view_state::ViewState;
use crate::render::checkerboard::fill_checkerboard_if_enabled;
use crate::render::renderer::RendererEnv;
use crate::render::session::DrawingSession;

/// Where the renderer is in loading its current page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageState {
    Idle,
    Loading(u32),
    Ready(u32),
    /// The last request failed; the previously shown page (if any) stays visible.
    Failed(u32),
}

#[derive(Debug)]
struct PageProgress {
    state: PageState,
    index: u32,
    page_count: Option<u32>,
    // Ticket of the newest request; older completions are dropped.
    latest: u64,
}

struct PageShared {
    bytes: Arc<[u8]>,
    decoder: Arc<dyn PageDecoder>,
    current: ArcSwapOption<Bitmap>,
    progress: Mutex<PageProgress>,
    disposed: AtomicBool,
    env: RendererEnv,
}

impl PageShared {
    fn progress(&self) -> std::sync::MutexGuard<'_, PageProgress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_live(&self) -> ViewerResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            Err(ViewerError::Disposed)
        } else {
            Ok(())
        }
    }

    async fn page_count(self: &Arc<Self>) -> ViewerResult<u32> {
        let cached = self.progress().page_count;
        if let Some(n) = cached {
            return Ok(n);
        }
        let shared = Arc::clone(self);
        let count = tokio::task::spawn_blocking(move || shared.decoder.frame_count(&shared.bytes))
            .await
            .map_err(|e| ViewerError::decode(format!("page count task failed: {e}")))??;
        self.progress().page_count = Some(count);
        Ok(count)
    }

    async fn load(self: Arc<Self>, index: i64) -> ViewerResult<()> {
        self.ensure_live()?;
        let count = self.page_count().await?;
        let page = u32::try_from(index)
            .ok()
            .filter(|&p| p < count)
            .ok_or(ViewerError::PageOutOfRange { index, count })?;

        let ticket = {
            let mut p = self.progress();
            p.latest += 1;
            p.state = PageState::Loading(page);
            p.latest
        };

        let shared = Arc::clone(&self);
        let decoded =
            tokio::task::spawn_blocking(move || shared.decoder.decode_page(&shared.bytes, page))
                .await
                .map_err(|e| ViewerError::decode(format!("page decode task failed: {e}")))
                .and_then(|r| r);

        let mut p = self.progress();
        self.ensure_live()?;
        if p.latest != ticket {
            tracing::debug!(page, "page load superseded; result dropped");
            return Ok(());
        }
        match decoded {
            Ok(bitmap) => {
                let previous = self.current.swap(Some(Arc::new(bitmap)));
                p.index = page;
                p.state = PageState::Ready(page);
                drop(p);
                drop(previous);
                (self.env.invalidate)();
                Ok(())
            }
            Err(err) => {
                p.state = PageState::Failed(page);
                tracing::warn!(%err, page, "page decode failed; keeping previous page");
                Err(err)
            }
        }
    }
}

/// Renderer for multi-page containers. Shows one decoded page at a time; other pages are
/// decoded from the shared file bytes on request.
pub struct MultiPageRenderer {
    shared: Arc<PageShared>,
    initial_load: Mutex<Option<JoinHandle<ViewerResult<()>>>>,
    supports_transparency: bool,
}

impl MultiPageRenderer {
    /// Starts decoding `initial_page_index` in the background.
    pub fn new(
        bytes: Arc<[u8]>,
        initial_page_index: u32,
        decoder: Arc<dyn PageDecoder>,
        supports_transparency: bool,
        env: RendererEnv,
    ) -> Self {
        let shared = Arc::new(PageShared {
            bytes,
            decoder,
            current: ArcSwapOption::empty(),
            progress: Mutex::new(PageProgress {
                state: PageState::Idle,
                index: initial_page_index,
                page_count: None,
                latest: 0,
            }),
            disposed: AtomicBool::new(false),
            env,
        });
        let task = {
            let shared = Arc::clone(&shared);
            shared.env.runtime.clone().spawn(async move {
                let res = shared.load(i64::from(initial_page_index)).await;
                if let Err(err) = &res {
                    tracing::warn!(%err, page = initial_page_index, "initial page load failed");
                }
                res
            })
        };
        Self {
            shared,
            initial_load: Mutex::new(Some(task)),
            supports_transparency,
        }
    }

    /// Decode and present page `index`.
    pub async fn load_page(&self, index: i64) -> ViewerResult<()> {
        Arc::clone(&self.shared).load(index).await
    }

    /// Wait for the load started by [`new`](Self::new). Later calls return `Ok` at once.
    pub async fn initial_load(&self) -> ViewerResult<()> {
        let task = self
            .initial_load
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match task {
            Some(task) => task
                .await
                .map_err(|e| ViewerError::decode(format!("initial page load task failed: {e}")))?,
            None => Ok(()),
        }
    }

    /// Index of the page on screen (or the requested initial page before the first decode).
    pub fn current_page_index(&self) -> u32 {
        self.shared.progress().index
    }

    pub fn page_state(&self) -> PageState {
        self.shared.progress().state
    }

    pub async fn page_count(&self) -> ViewerResult<u32> {
        self.shared.ensure_live()?;
        self.shared.page_count().await
    }

    pub fn current_bitmap(&self) -> Option<Arc<Bitmap>> {
        self.shared.current.load_full()
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
        let Some(page) = self.shared.current.load_full() else {
            return;
        };
        fill_checkerboard_if_enabled(
            session,
            view,
            &self.shared.env.checkerboard,
            config,
            self.supports_transparency,
        );
        session.draw_bitmap(&page, view.image_rect, quality);
    }

    pub fn try_redraw_offscreen(&self) {
        if !self.shared.disposed.load(Ordering::Acquire) {
            (self.shared.env.invalidate)();
        }
    }

    /// Size of the page on screen; zero until the first page is decoded.
    pub fn source_bounds(&self) -> Size {
        self.shared
            .current
            .load()
            .as_ref()
            .map_or(Size::ZERO, |b| b.size())
    }

    /// Release the current page. The file bytes are shared with the display item and stay.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _p = self.shared.progress();
        self.shared.current.store(None);
    }
}

impl Drop for MultiPageRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/multi_page.rs"]
mod tests;
