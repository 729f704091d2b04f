//! Decoded-image values handed from the loading pipeline to renderers.
//!
//! Ownership of pixels is decided once, when an item is built: bitmaps from disk or the disk
//! cache belong to the item and go away on [`DisplayItem::dispose`]; the error-screen
//! placeholder and the two `empty()` singletons only ever hold shared pixels (or none), so no
//! holder can free them.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::model::bitmap::Bitmap;

/// Where a decoded bitmap came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Origin {
    Disk,
    DiskCache,
    ErrorScreen,
    Undefined,
}

impl Origin {
    pub fn is_error_or_undefined(self) -> bool {
        matches!(self, Self::ErrorScreen | Self::Undefined)
    }
}

/// Full-resolution size known before the high-quality item is decoded.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageMetadata {
    pub full_width: f64,
    pub full_height: f64,
}

#[derive(Clone, Debug)]
enum ItemPixels {
    Owned(Bitmap),
    Shared(Bitmap),
    Released,
    None,
}

/// A decoded bitmap plus its provenance and rotation in degrees.
#[derive(Clone, Debug)]
pub struct DisplayItem {
    pixels: ItemPixels,
    origin: Origin,
    rotation: i32,
}

impl DisplayItem {
    const EMPTY: DisplayItem = DisplayItem {
        pixels: ItemPixels::None,
        origin: Origin::Undefined,
        rotation: 0,
    };

    /// Error-screen and undefined origins only ever share `bitmap`; all others own it.
    pub fn new(bitmap: Bitmap, origin: Origin, rotation: i32) -> Self {
        let pixels = if origin.is_error_or_undefined() {
            ItemPixels::Shared(bitmap)
        } else {
            ItemPixels::Owned(bitmap)
        };
        Self {
            pixels,
            origin,
            rotation,
        }
    }

    /// Item presenting the process-wide error placeholder.
    pub fn error_screen() -> Self {
        Self::new(error_screen_bitmap(), Origin::ErrorScreen, 0)
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        match &self.pixels {
            ItemPixels::Owned(b) | ItemPixels::Shared(b) => Some(b),
            ItemPixels::Released | ItemPixels::None => None,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn is_error_or_undefined(&self) -> bool {
        self.origin.is_error_or_undefined()
    }

    pub fn is_released(&self) -> bool {
        matches!(self.pixels, ItemPixels::Released)
    }

    /// Release owned pixels. Shared pixels stay untouched; calling twice is a no-op.
    pub fn dispose(&mut self) {
        if let ItemPixels::Owned(_) = self.pixels {
            self.pixels = ItemPixels::Released;
        }
    }
}

/// Low-fidelity item shown while the high-quality decode is in flight.
#[derive(Clone, Debug)]
pub struct PreviewDisplayItem {
    item: DisplayItem,
    metadata: Option<ImageMetadata>,
}

static EMPTY_PREVIEW: PreviewDisplayItem = PreviewDisplayItem {
    item: DisplayItem::EMPTY,
    metadata: None,
};

impl PreviewDisplayItem {
    pub fn new(bitmap: Bitmap, origin: Origin, metadata: Option<ImageMetadata>) -> Self {
        Self {
            item: DisplayItem::new(bitmap, origin, 0),
            metadata,
        }
    }

    /// "Nothing loaded yet". Lives for the whole process.
    pub fn empty() -> &'static PreviewDisplayItem {
        &EMPTY_PREVIEW
    }

    pub fn item(&self) -> &DisplayItem {
        &self.item
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.item.bitmap()
    }

    pub fn metadata(&self) -> Option<ImageMetadata> {
        self.metadata
    }

    pub fn dispose(&mut self) {
        self.item.dispose();
    }
}

#[derive(Clone, Debug)]
pub struct StaticHqDisplayItem {
    item: DisplayItem,
}

/// First decoded frame for the immediate paint, plus the file bytes driving the animation.
#[derive(Clone, Debug)]
pub struct AnimatedHqDisplayItem {
    item: DisplayItem,
    file_bytes: Arc<[u8]>,
}

/// First decoded page, plus the file bytes other pages are decoded from.
#[derive(Clone, Debug)]
pub struct MultiPageHqDisplayItem {
    item: DisplayItem,
    file_bytes: Arc<[u8]>,
}

/// Full-fidelity representation of an image.
#[derive(Clone, Debug)]
pub enum HqDisplayItem {
    Static(StaticHqDisplayItem),
    Animated(AnimatedHqDisplayItem),
    MultiPage(MultiPageHqDisplayItem),
    Empty,
}

static EMPTY_HQ: HqDisplayItem = HqDisplayItem::Empty;

impl HqDisplayItem {
    pub fn new_static(bitmap: Bitmap, origin: Origin, rotation: i32) -> Self {
        Self::Static(StaticHqDisplayItem {
            item: DisplayItem::new(bitmap, origin, rotation),
        })
    }

    pub fn new_animated(first_frame: Bitmap, origin: Origin, file_bytes: Arc<[u8]>) -> Self {
        Self::Animated(AnimatedHqDisplayItem {
            item: DisplayItem::new(first_frame, origin, 0),
            file_bytes,
        })
    }

    pub fn new_multi_page(first_page: Bitmap, origin: Origin, file_bytes: Arc<[u8]>) -> Self {
        Self::MultiPage(MultiPageHqDisplayItem {
            item: DisplayItem::new(first_page, origin, 0),
            file_bytes,
        })
    }

    /// "No high-quality item". Lives for the whole process.
    pub fn empty() -> &'static HqDisplayItem {
        &EMPTY_HQ
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn item(&self) -> Option<&DisplayItem> {
        match self {
            Self::Static(s) => Some(&s.item),
            Self::Animated(a) => Some(&a.item),
            Self::MultiPage(m) => Some(&m.item),
            Self::Empty => None,
        }
    }

    fn item_mut(&mut self) -> Option<&mut DisplayItem> {
        match self {
            Self::Static(s) => Some(&mut s.item),
            Self::Animated(a) => Some(&mut a.item),
            Self::MultiPage(m) => Some(&mut m.item),
            Self::Empty => None,
        }
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.item().and_then(DisplayItem::bitmap)
    }

    pub fn origin(&self) -> Origin {
        self.item().map_or(Origin::Undefined, DisplayItem::origin)
    }

    pub fn rotation(&self) -> i32 {
        self.item().map_or(0, DisplayItem::rotation)
    }

    /// Raw file bytes for animated and multi-page items.
    pub fn file_bytes(&self) -> Option<&Arc<[u8]>> {
        match self {
            Self::Animated(a) => Some(&a.file_bytes),
            Self::MultiPage(m) => Some(&m.file_bytes),
            Self::Static(_) | Self::Empty => None,
        }
    }

    pub fn dispose(&mut self) {
        if let Some(item) = self.item_mut() {
            item.dispose();
        }
    }
}

const ERROR_SCREEN_PX: u16 = 64;

static ERROR_SCREEN_BITMAP: LazyLock<Bitmap> = LazyLock::new(|| {
    // Dark tile with a light diagonal cross.
    let n = ERROR_SCREEN_PX as usize;
    let mut pixels = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let on_cross = x.abs_diff(y) <= 1 || (x + y).abs_diff(n - 1) <= 1;
            let v = if on_cross { 200 } else { 48 };
            pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
                v, v, v, 255,
            ]));
        }
    }
    Bitmap::from_pixmap(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        ERROR_SCREEN_PX,
        ERROR_SCREEN_PX,
        false,
    ))
});

/// Placeholder shown for files that failed to decode. Shared by every error item.
pub fn error_screen_bitmap() -> Bitmap {
    ERROR_SCREEN_BITMAP.clone()
}

const TRANSPARENCY_EXTENSIONS: &[&str] = &[
    "png", "gif", "webp", "tiff", "tif", "svg", "apng", "ico", "heic", "heif", "avif", "jxl",
    "psd",
];

/// Whether files of this type can carry an alpha channel (decides the checkerboard).
pub fn supports_transparency(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            TRANSPARENCY_EXTENSIONS
                .iter()
                .any(|t| t.eq_ignore_ascii_case(e))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/model/display_item.rs"]
mod tests;
