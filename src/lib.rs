//! pixview is the on-canvas rendering core of a desktop image viewer.
//!
//! A host window owns a canvas and a viewport controller; pixview turns decoded images into
//! pixels on that canvas every frame.
//!
//! # Pieces
//!
//! - **Display items** ([`DisplayItem`], [`PreviewDisplayItem`], [`HqDisplayItem`]): decoded
//!   bitmaps plus provenance. Error placeholders and the `empty()` singletons share their
//!   pixels and are never freed by a holder.
//! - **Renderers** ([`Renderer`]): one per item on screen.
//!   - `Static` scales the source while the view moves and switches to a debounced, pre-scaled
//!     off-screen composite once it settles.
//!   - `Animated` shows an [`Animator`]'s surface and advances it one step at a time.
//!   - `MultiPage` decodes pages of a container through a [`PageDecoder`] on request.
//! - **Drawing sessions** ([`DrawingSession`]): the canvas seam. [`CpuCanvas`] rasterizes with
//!   `vello_cpu`.
//!
//! Background work (decoding, off-screen builds, animation steps) runs on a tokio runtime
//! supplied through [`RendererEnv`]; renderers ask for repaints through its invalidate callback
//! and never block the draw call.
#![forbid(unsafe_code)]

mod decode;
mod foundation;
mod model;
mod render;

pub use decode::frames::FrameAnimator;
pub use decode::pages::{ImagePageDecoder, PageDecoder};
pub use decode::{decode_image, load_hq_item};
pub use foundation::config::{RenderConfig, RendererOpts};
pub use foundation::core::{Affine, Interpolation, Point, Rect, Size, Vec2};
pub use foundation::error::{ViewerError, ViewerResult};
pub use model::bitmap::Bitmap;
pub use model::display_item::{
    AnimatedHqDisplayItem, DisplayItem, HqDisplayItem, ImageMetadata, MultiPageHqDisplayItem,
    Origin, PreviewDisplayItem, StaticHqDisplayItem, error_screen_bitmap, supports_transparency,
};
pub use model::view_state::{SharedViewState, ViewState};
pub use render::animated::{AnimatedImageRenderer, Animator};
pub use render::checkerboard::CheckerboardBrush;
pub use render::multi_page::{MultiPageRenderer, PageState};
pub use render::renderer::{InvalidateFn, Renderer, RendererEnv, RendererKind, create_renderer};
pub use render::session::{CpuCanvas, DrawingSession};
pub use render::single_flight::{FlightPermit, SingleFlight};
pub use render::static_image::StaticImageRenderer;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
