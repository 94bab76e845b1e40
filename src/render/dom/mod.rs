//! DOM-driven backend: per-kind templates rendered by an external document engine.
//!
//! The engine is reached through [`SurfaceEngine`]; each effect instance gets a fresh
//! [`Surface`] that is configured once and then seeked to every sample instant.

pub(crate) mod driver;

use crate::effects::model::{EffectKind, ResolvedEffect};
use crate::foundation::core::Canvas;
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::render::backend::{BackendKind, FrameRGBA, FrameRenderer, Placement};
use crate::timing::grid::SampleInstant;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded template document with its own animation clock.
pub trait Surface: Send {
    /// Push the effect configuration to the template (`initAnimation`).
    fn apply(&mut self, config: &serde_json::Value) -> CutawayResult<()>;

    /// Seek the template clock to `time_ms` and capture a transparent snapshot.
    ///
    /// Seeking is idempotent, so instants may be requested in any order.
    fn seek(&mut self, time_ms: f64) -> CutawayResult<FrameRGBA>;

    fn close(&mut self) -> CutawayResult<()>;
}

/// Capability interface over a scriptable document-rendering engine.
pub trait SurfaceEngine: Send + Sync {
    /// Check that the engine can be started at all.
    fn probe(&self) -> CutawayResult<()>;

    /// Load `template` into a fresh surface sized to `canvas`.
    fn open(&self, template: &Path, canvas: Canvas) -> CutawayResult<Box<dyn Surface>>;
}

/// Path of the template for `kind` under `templates_dir`.
pub fn template_path(templates_dir: &Path, kind: EffectKind) -> PathBuf {
    templates_dir.join(format!("{}.html", kind.template_name()))
}

/// Renderer that captures full-canvas snapshots from template surfaces.
pub struct DomRenderer {
    engine: Arc<dyn SurfaceEngine>,
    templates_dir: PathBuf,
    canvas: Canvas,
    surface: Option<Box<dyn Surface>>,
}

impl DomRenderer {
    pub fn new(engine: Arc<dyn SurfaceEngine>, templates_dir: PathBuf, canvas: Canvas) -> Self {
        Self {
            engine,
            templates_dir,
            canvas,
            surface: None,
        }
    }

    fn close_surface(&mut self) -> CutawayResult<()> {
        match self.surface.take() {
            Some(mut s) => s.close(),
            None => Ok(()),
        }
    }
}

impl FrameRenderer for DomRenderer {
    fn backend(&self) -> BackendKind {
        BackendKind::Dom
    }

    fn begin_effect(&mut self, effect: &ResolvedEffect) -> CutawayResult<Placement> {
        self.close_surface()?;
        let template = template_path(&self.templates_dir, effect.kind());
        if !template.is_file() {
            return Err(CutawayError::renderer_unavailable(format!(
                "template '{}' is missing",
                template.display()
            )));
        }
        let mut surface = self.engine.open(&template, self.canvas)?;
        if let Err(e) = surface.apply(&effect.template_config()) {
            let _ = surface.close();
            return Err(e);
        }
        self.surface = Some(surface);
        Ok(Placement::full_canvas(self.canvas))
    }

    fn render(&mut self, effect: &ResolvedEffect, at: SampleInstant) -> CutawayResult<FrameRGBA> {
        let surface = self.surface.as_mut().ok_or_else(|| {
            CutawayError::validation(format!("{}: render called before begin_effect", effect.label))
        })?;
        let frame = surface.seek(at.time_ms())?;
        if frame.width != self.canvas.width || frame.height != self.canvas.height {
            return Err(CutawayError::frame_render(
                &effect.label,
                at.frame.0,
                format!(
                    "surface produced {}x{}, expected {}x{}",
                    frame.width, frame.height, self.canvas.width, self.canvas.height
                ),
            ));
        }
        Ok(frame)
    }

    fn end_effect(&mut self) -> CutawayResult<()> {
        self.close_surface()
    }

    fn close(&mut self) -> CutawayResult<()> {
        self.close_surface()
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/render/dom/mod.rs"]
mod tests;
