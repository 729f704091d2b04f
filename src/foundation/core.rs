pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Sampling quality used when a bitmap is drawn at a size other than 1:1.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Pixel replication. Cheapest; used while a pan/zoom animation is running.
    NearestNeighbor,
    /// Bilinear filtering.
    #[default]
    Linear,
    /// Bicubic filtering.
    HighQualityCubic,
}

impl Interpolation {
    /// Quality used for off-screen composites, selected by the high-quality flag.
    pub fn for_offscreen(high_quality: bool) -> Self {
        if high_quality {
            Self::HighQualityCubic
        } else {
            Self::NearestNeighbor
        }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::ImageQuality {
        use vello_cpu::peniko::ImageQuality;
        match self {
            Self::NearestNeighbor => ImageQuality::Low,
            Self::Linear => ImageQuality::Medium,
            Self::HighQualityCubic => ImageQuality::High,
        }
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

/// Convert a pixel extent to the `u16` range supported by the CPU rasterizer.
pub(crate) fn to_px_u16(v: u32, what: &str) -> crate::ViewerResult<u16> {
    v.try_into()
        .map_err(|_| crate::ViewerError::surface(format!("{what} {v} exceeds u16")))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
