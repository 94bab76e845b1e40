use crate::effects::model::EffectKind;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::render::backend::{BackendKind, FrameRenderer};
use crate::render::dom::{DomRenderer, SurfaceEngine, template_path};
use crate::render::raster::RasterRenderer;
use crate::render::raster::text::FontSource;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Requested rendering backend.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RendererChoice {
    /// Prefer the DOM backend, fall back to raster when it is unusable.
    #[default]
    Auto,
    /// Require the DOM backend; fail if it is unusable.
    Dom,
    /// Always use the raster backend.
    Raster,
}

/// Inputs to backend selection.
#[derive(Clone)]
pub struct NegotiateOpts {
    pub engine: Option<Arc<dyn SurfaceEngine>>,
    pub templates_dir: PathBuf,
    pub font: Option<FontSource>,
    pub canvas: Canvas,
}

/// Backend chosen for a job. Also the factory for per-worker renderers.
#[derive(Clone)]
pub enum ResolvedBackend {
    Dom {
        engine: Arc<dyn SurfaceEngine>,
        templates_dir: PathBuf,
        canvas: Canvas,
    },
    Raster {
        font: Option<FontSource>,
    },
}

impl std::fmt::Debug for ResolvedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedBackend::Dom {
                templates_dir,
                canvas,
                ..
            } => f
                .debug_struct("Dom")
                .field("templates_dir", templates_dir)
                .field("canvas", canvas)
                .finish(),
            ResolvedBackend::Raster { font } => {
                f.debug_struct("Raster").field("font", font).finish()
            }
        }
    }
}

impl ResolvedBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            ResolvedBackend::Dom { .. } => BackendKind::Dom,
            ResolvedBackend::Raster { .. } => BackendKind::Raster,
        }
    }

    pub fn make_renderer(&self) -> CutawayResult<Box<dyn FrameRenderer>> {
        Ok(match self {
            ResolvedBackend::Dom {
                engine,
                templates_dir,
                canvas,
            } => Box::new(DomRenderer::new(
                Arc::clone(engine),
                templates_dir.clone(),
                *canvas,
            )),
            ResolvedBackend::Raster { font } => Box::new(RasterRenderer::new(font.clone())),
        })
    }
}

/// Check that the DOM backend can render every kind in `kinds`.
///
/// Missing templates are reported together, before the engine is started.
pub fn check_dom(
    engine: Option<&dyn SurfaceEngine>,
    templates_dir: &Path,
    kinds: &[EffectKind],
) -> CutawayResult<()> {
    let engine =
        engine.ok_or_else(|| CutawayError::renderer_unavailable("no DOM driver configured"))?;
    let missing: Vec<String> = kinds
        .iter()
        .map(|k| template_path(templates_dir, *k))
        .filter(|p| !p.is_file())
        .map(|p| p.display().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CutawayError::renderer_unavailable(format!(
            "missing templates: {}",
            missing.join(", ")
        )));
    }
    engine.probe()
}

/// Select the backend before any layer is rendered.
#[tracing::instrument(skip(opts, kinds))]
pub fn negotiate(
    choice: RendererChoice,
    opts: NegotiateOpts,
    kinds: &[EffectKind],
) -> CutawayResult<ResolvedBackend> {
    let NegotiateOpts {
        engine,
        templates_dir,
        font,
        canvas,
    } = opts;

    let dom = |engine: Option<Arc<dyn SurfaceEngine>>| -> CutawayResult<ResolvedBackend> {
        check_dom(engine.as_deref(), &templates_dir, kinds)?;
        let engine = engine
            .ok_or_else(|| CutawayError::renderer_unavailable("no DOM driver configured"))?;
        Ok(ResolvedBackend::Dom {
            engine,
            templates_dir: templates_dir.clone(),
            canvas,
        })
    };

    let resolved = match choice {
        RendererChoice::Dom => dom(engine)?,
        RendererChoice::Auto => match dom(engine) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(reason = %e, "DOM renderer unavailable, falling back to raster");
                ResolvedBackend::Raster { font }
            }
        },
        RendererChoice::Raster => ResolvedBackend::Raster { font },
    };

    if let ResolvedBackend::Raster { font: None } = &resolved {
        tracing::warn!("no font configured; raster effects are drawn without text");
    }
    tracing::info!(backend = %resolved.kind(), "renderer selected");
    Ok(resolved)
}

#[cfg(test)]
#[path = "../../tests/unit/render/negotiate.rs"]
mod tests;
