use std::time::Duration;

use crate::foundation::error::{ViewerError, ViewerResult};

/// Display flags the host passes with every draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Paint a checkerboard behind images that can carry transparency.
    pub checkered_background: bool,
    /// Build off-screen composites with cubic filtering instead of nearest-neighbor.
    pub high_quality_interpolation: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            checkered_background: false,
            high_quality_interpolation: true,
        }
    }
}

/// Tuning values fixed for the lifetime of a renderer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererOpts {
    /// Quiet period after the last geometry change before the off-screen buffer is rebuilt.
    pub offscreen_debounce_ms: u64,
    /// Off-screen buffers are only built while `target_width < factor * canvas_width`.
    pub offscreen_max_width_factor: f64,
    /// Side of one checkerboard cell in pixels.
    pub checker_cell_px: u32,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            offscreen_debounce_ms: 410,
            offscreen_max_width_factor: 1.5,
            checker_cell_px: 10,
        }
    }
}

impl RendererOpts {
    pub fn offscreen_debounce(&self) -> Duration {
        Duration::from_millis(self.offscreen_debounce_ms)
    }

    /// Defaults overridden by `PIXVIEW_*` environment variables. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(ms) = env_parse::<u64>("PIXVIEW_OFFSCREEN_DEBOUNCE_MS") {
            opts.offscreen_debounce_ms = ms;
        }
        if let Some(f) = env_parse::<f64>("PIXVIEW_OFFSCREEN_MAX_WIDTH_FACTOR")
            .filter(|f| f.is_finite() && *f > 0.0)
        {
            opts.offscreen_max_width_factor = f;
        }
        if let Some(px) = env_parse::<u32>("PIXVIEW_CHECKER_CELL_PX").filter(|&n| n > 0) {
            opts.checker_cell_px = px;
        }
        opts
    }

    pub fn validate(&self) -> ViewerResult<()> {
        if !self.offscreen_max_width_factor.is_finite() || self.offscreen_max_width_factor <= 0.0 {
            return Err(ViewerError::config(
                "offscreen_max_width_factor must be finite and > 0",
            ));
        }
        if self.checker_cell_px == 0 {
            return Err(ViewerError::config("checker_cell_px must be > 0"));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
