//! Layers: fully materialized, time-anchored frame sequences, one per effect instance.

pub(crate) mod builder;
pub(crate) mod store;

use crate::effects::model::EffectKind;
use crate::foundation::core::{Fps, FrameIndex, Position};
use crate::foundation::error::CutawayResult;
use crate::layer::store::FrameStore;
use crate::lifecycle::scratch::ReleaseReport;
use crate::render::backend::Placement;
use crate::timing::window::Span;

/// A pre-rendered effect anchored on the master timeline.
///
/// Only ever constructed complete; read-only once built.
#[derive(Debug)]
pub struct Layer {
    label: String,
    kind: EffectKind,
    span: Span,
    fps: Fps,
    placement: Placement,
    frames: FrameStore,
}

impl Layer {
    pub(crate) fn new(
        label: String,
        kind: EffectKind,
        span: Span,
        fps: Fps,
        placement: Placement,
        frames: FrameStore,
    ) -> Self {
        Self {
            label,
            kind,
            span,
            fps,
            placement,
            frames,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Top-left corner of this layer's frames in output pixel space.
    pub fn origin(&self) -> Position {
        self.placement.origin
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.len()
    }

    /// Index of the layer frame shown at base frame `base` (nearest sample at or below the base
    /// frame's timestamp), or `None` when the layer is inactive there.
    ///
    /// Evaluated in exact integer arithmetic: the base time is `base * 1000 * den / num` ms and
    /// the layer frame is `floor((t - start) / 1000 * layer_fps)`.
    pub fn frame_for(&self, base: FrameIndex, base_fps: Fps) -> Option<u64> {
        let t_scaled = u128::from(base.0) * 1000 * u128::from(base_fps.den);
        let start_scaled = u128::from(self.span.start_ms) * u128::from(base_fps.num);
        let end_scaled = u128::from(self.span.end_ms()) * u128::from(base_fps.num);
        if t_scaled < start_scaled || t_scaled >= end_scaled {
            return None;
        }
        let numer = (t_scaled - start_scaled) * u128::from(self.fps.num);
        let denom = u128::from(base_fps.num) * 1000 * u128::from(self.fps.den);
        let local = u64::try_from(numer / denom).ok()?;
        (local < self.frames.len()).then_some(local)
    }

    pub fn read_frame_into(&self, index: u64, buf: &mut Vec<u8>) -> CutawayResult<bool> {
        self.frames.read_into(index, buf)
    }

    pub fn get_frame(&self, index: u64) -> CutawayResult<Option<crate::render::backend::FrameRGBA>> {
        self.frames.get(index)
    }

    /// Delete the backing storage. Failures are returned for the caller to log and count.
    pub fn release(self) -> std::io::Result<()> {
        self.frames.into_area().release()
    }
}

/// Release every layer's storage independently.
pub fn release_layers(layers: impl IntoIterator<Item = Layer>) -> ReleaseReport {
    let mut report = ReleaseReport::default();
    for layer in layers {
        let label = layer.label.clone();
        report.record(&label, layer.release());
    }
    report
}

#[cfg(test)]
#[path = "../../tests/unit/layer/layer.rs"]
mod tests;
