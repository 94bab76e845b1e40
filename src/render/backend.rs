use crate::effects::model::ResolvedEffect;
use crate::foundation::core::{Canvas, FrameIndex, Position};
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::timing::grid::SampleInstant;

/// A raster as RGBA8 pixels.
///
/// Pixels are always **premultiplied alpha**, from renderer output through compositing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; byte_len(width, height)],
        }
    }

    /// Wrap premultiplied bytes, checking that the length matches the dimensions.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> CutawayResult<Self> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(CutawayError::validation(format!(
                "rgba8 buffer is {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiplied pixel at `(x, y)`; panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

/// An immutable frame tagged with the grid index that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub index: FrameIndex,
    pub pixels: FrameRGBA,
}

/// Where and how large the frames of one effect are, in output pixel space.
///
/// The DOM backend captures the whole canvas, so its placement is the canvas at `(0, 0)`; the
/// raster backend draws into a tight box around the effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub origin: Position,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub fn full_canvas(canvas: Canvas) -> Self {
        Self {
            origin: Position::new(0, 0),
            width: canvas.width,
            height: canvas.height,
        }
    }
}

/// Which rendering backend produced a job's layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Templates driven by an external document-rendering engine.
    Dom,
    /// Procedural drawing with `vello_cpu`.
    Raster,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BackendKind::Dom => "dom",
            BackendKind::Raster => "raster",
        })
    }
}

/// Turns an effect plus a sample instant into a transparent raster frame.
///
/// Output is a pure function of `(effect, instant)`. Implementations hold an expensive
/// rendering context that is created lazily and reused across effects; callers release it
/// with [`FrameRenderer::close`]. One instance is never shared between threads.
///
/// Call protocol per effect: `begin_effect`, any number of `render` calls (in any order),
/// then `end_effect`, which callers must reach even when a `render` call failed.
pub trait FrameRenderer: Send {
    fn backend(&self) -> BackendKind;

    /// Prepare per-effect state and report the frame placement for this effect.
    fn begin_effect(&mut self, effect: &ResolvedEffect) -> CutawayResult<Placement>;

    /// Render the effect at `at`. Frames must match the placement size.
    fn render(&mut self, effect: &ResolvedEffect, at: SampleInstant) -> CutawayResult<FrameRGBA>;

    /// Drop per-effect state.
    fn end_effect(&mut self) -> CutawayResult<()>;

    /// Release the rendering context. Further calls may re-create it.
    fn close(&mut self) -> CutawayResult<()>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
