use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::decode::{DecodedFrame, decode_frames};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::model::bitmap::Bitmap;
use crate::render::animated::Animator;

/// Animator over pre-decoded, pre-composited frames.
///
/// The timeline loops: `elapsed` is taken modulo the total duration and the frame whose
/// cumulative delay window contains it becomes the surface.
#[derive(Debug)]
pub struct FrameAnimator {
    frames: Vec<DecodedFrame>,
    // `ends[i]` is the time frame `i` stops showing, measured from the start of a loop.
    ends: Vec<Duration>,
    total: Duration,
    current: AtomicUsize,
}

impl FrameAnimator {
    /// Decode every frame of a GIF, APNG or animated WebP.
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> ViewerResult<Self> {
        let frames =
            decode_frames(bytes)?.ok_or_else(|| ViewerError::decode("not an animated image"))?;
        Self::from_decoded(frames)
    }

    /// Build from explicit `(frame, delay)` pairs.
    pub fn from_frames(frames: Vec<(Bitmap, Duration)>) -> ViewerResult<Self> {
        Self::from_decoded(
            frames
                .into_iter()
                .map(|(bitmap, delay)| DecodedFrame { bitmap, delay })
                .collect(),
        )
    }

    fn from_decoded(frames: Vec<DecodedFrame>) -> ViewerResult<Self> {
        if frames.is_empty() {
            return Err(ViewerError::decode("animation has no frames"));
        }
        let mut total = Duration::ZERO;
        let ends = frames
            .iter()
            .map(|f| {
                total = total.saturating_add(f.delay);
                total
            })
            .collect();
        tracing::debug!(frames = frames.len(), ?total, "animation timeline built");
        Ok(Self {
            frames,
            ends,
            total,
            current: AtomicUsize::new(0),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn total_duration(&self) -> Duration {
        self.total
    }

    pub fn current_frame(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    /// Frame shown `elapsed` after the animation started.
    pub fn frame_at(&self, elapsed: Duration) -> usize {
        if self.total.is_zero() {
            return 0;
        }
        let t = elapsed.as_nanos() % self.total.as_nanos();
        self.ends
            .partition_point(|end| end.as_nanos() <= t)
            .min(self.frames.len() - 1)
    }
}

impl Animator for FrameAnimator {
    fn pixel_size(&self) -> (u32, u32) {
        let first = &self.frames[0].bitmap;
        (first.width(), first.height())
    }

    fn surface(&self) -> Option<Bitmap> {
        self.frames
            .get(self.current.load(Ordering::Acquire))
            .map(|f| f.bitmap.clone())
    }

    fn update(&self, elapsed: Duration) -> ViewerResult<()> {
        let next = self.frame_at(elapsed);
        let prev = self.current.swap(next, Ordering::AcqRel);
        if prev != next {
            tracing::trace!(prev, next, ?elapsed, "animation frame advanced");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/frames.rs"]
mod tests;
