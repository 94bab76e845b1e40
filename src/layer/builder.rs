use crate::effects::model::ResolvedEffect;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Fps;
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::layer::store::FrameStore;
use crate::layer::{Layer, release_layers};
use crate::lifecycle::scratch::ScratchArea;
use crate::render::backend::{Frame, FrameRenderer};
use crate::timing::grid::TimingGrid;
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Materialize every frame of `effect` into a new [`Layer`].
///
/// All-or-nothing: on any error the partially written scratch area is removed and no layer
/// is returned. `end_effect` is always called once `begin_effect` succeeded.
#[tracing::instrument(skip_all, fields(effect = %effect.label))]
pub fn build_layer(
    renderer: &mut dyn FrameRenderer,
    effect: &ResolvedEffect,
    fps: Fps,
    scratch_root: Option<&Path>,
) -> CutawayResult<Layer> {
    let grid = TimingGrid::new(effect.span.duration_ms, fps);
    let area = ScratchArea::acquire(scratch_root, &effect.label)?;
    let placement = renderer
        .begin_effect(effect)
        .map_err(|e| attach_effect(&effect.label, 0, e))?;
    let mut store = FrameStore::new(area, placement.width, placement.height);

    let rendered = (|| -> CutawayResult<()> {
        for at in &grid {
            let pixels = renderer
                .render(effect, at)
                .map_err(|e| attach_effect(&effect.label, at.frame.0, e))?;
            store
                .push(&Frame {
                    index: at.frame,
                    pixels,
                })
                .map_err(|e| attach_effect(&effect.label, at.frame.0, e))?;
        }
        Ok(())
    })();
    let ended = renderer.end_effect();

    rendered?;
    ended.map_err(|e| attach_effect(&effect.label, grid.len(), e))?;

    tracing::debug!(frames = store.len(), "layer materialized");
    Ok(Layer::new(
        effect.label.clone(),
        effect.kind(),
        effect.span,
        fps,
        placement,
        store,
    ))
}

fn attach_effect(label: &str, frame: u64, err: CutawayError) -> CutawayError {
    match err {
        CutawayError::FrameRender { .. } | CutawayError::Cancelled => err,
        CutawayError::RendererUnavailable(msg) if msg.starts_with(label) => {
            CutawayError::RendererUnavailable(msg)
        }
        CutawayError::RendererUnavailable(msg) => {
            CutawayError::renderer_unavailable(format!("{label}: {msg}"))
        }
        other => CutawayError::frame_render(label, frame, other.to_string()),
    }
}

/// Creates one renderer per worker thread.
pub type RendererFactory<'a> = dyn Fn() -> CutawayResult<Box<dyn FrameRenderer>> + Sync + 'a;

/// Renderer owned by one worker; closed when the worker's state is dropped.
struct WorkerRenderer(Box<dyn FrameRenderer>);

impl Drop for WorkerRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.0.close() {
            tracing::warn!(error = %e, "failed to close renderer");
        }
    }
}

/// Build all layers on `pool`, returning them in the order of `effects`.
///
/// Layers are independent, so they are built in parallel with one renderer per worker. If
/// any layer fails, every layer already built is released and the first failure in
/// configuration order is returned.
pub fn build_layers(
    effects: &[ResolvedEffect],
    fps: Fps,
    scratch_root: Option<&Path>,
    make_renderer: &RendererFactory<'_>,
    pool: &rayon::ThreadPool,
    cancel: &CancelToken,
) -> CutawayResult<Vec<Layer>> {
    let total = effects.len();
    let done = AtomicUsize::new(0);

    let results: Vec<CutawayResult<Layer>> = pool.install(|| {
        effects
            .par_iter()
            .map_init(
                || make_renderer().map(WorkerRenderer),
                |worker, effect| -> CutawayResult<Layer> {
                    cancel.check()?;
                    let renderer = match worker {
                        Ok(r) => r,
                        Err(e) => {
                            return Err(CutawayError::renderer_unavailable(format!(
                                "failed to create renderer: {e}"
                            )));
                        }
                    };
                    let layer = build_layer(renderer.0.as_mut(), effect, fps, scratch_root)?;
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::info!(
                        effect = %effect.label,
                        frames = layer.frame_count(),
                        "layer built ({n}/{total})"
                    );
                    Ok(layer)
                },
            )
            .collect()
    });

    let mut layers = Vec::with_capacity(results.len());
    let mut first_err = None;
    for r in results {
        match r {
            Ok(layer) => layers.push(layer),
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }

    if let Some(err) = first_err {
        let report = release_layers(layers);
        tracing::warn!(
            released = report.released,
            failed = report.failed,
            "layer building failed; released built layers"
        );
        return Err(err);
    }
    Ok(layers)
}

#[cfg(test)]
#[path = "../../tests/unit/layer/builder.rs"]
mod tests;
