use crate::composite::compositor::composite_video;
use crate::effects::document::EffectsDocument;
use crate::effects::model::EffectKind;
use crate::effects::resolve::resolve_effects;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::layer::builder::build_layers;
use crate::layer::{Layer, release_layers};
use crate::media::probe::probe_video;
use crate::media::source::{BaseFrameSource, FfmpegFrameReader};
use crate::pipeline::opts::JobOpts;
use crate::render::backend::BackendKind;
use crate::render::dom::SurfaceEngine;
use crate::render::negotiate::{NegotiateOpts, negotiate};
use std::path::Path;
use std::sync::Arc;

/// Phase of a job, reported with every job-level failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    Negotiate,
    Build,
    Composite,
    Finalize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Validate => "validate",
            Stage::Negotiate => "negotiate",
            Stage::Build => "build",
            Stage::Composite => "composite",
            Stage::Finalize => "finalize",
        })
    }
}

/// A failed job: the stage it failed in and the underlying error.
#[derive(thiserror::Error, Debug)]
#[error("{stage}: {source}")]
pub struct JobError {
    pub stage: Stage,
    #[source]
    pub source: CutawayError,
}

impl JobError {
    fn at(stage: Stage) -> impl FnOnce(CutawayError) -> JobError {
        move |source| JobError { stage, source }
    }
}

/// Counters for a completed job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobStats {
    pub layers_built: usize,
    pub layer_frames_rendered: u64,
    pub frames_composited: u64,
    pub scratch_released: usize,
    pub scratch_release_failures: usize,
    pub backend: BackendKind,
}

/// Run a full job with the DOM driver configured in `opts`, if any.
pub fn run_job(
    doc: &EffectsDocument,
    source: &mut dyn BaseFrameSource,
    sink: &mut dyn FrameSink,
    opts: &JobOpts,
    cancel: &CancelToken,
) -> Result<JobStats, JobError> {
    let engine = opts.dom_engine().map_err(JobError::at(Stage::Validate))?;
    run_job_with_engine(doc, source, sink, opts, engine, cancel)
}

/// Validate, negotiate a backend, build every layer, then composite them over `source`.
///
/// Layer storage is released on every path once composition is over; release failures are
/// logged and counted but never fail the job.
#[tracing::instrument(skip_all)]
pub fn run_job_with_engine(
    doc: &EffectsDocument,
    source: &mut dyn BaseFrameSource,
    sink: &mut dyn FrameSink,
    opts: &JobOpts,
    engine: Option<Arc<dyn SurfaceEngine>>,
    cancel: &CancelToken,
) -> Result<JobStats, JobError> {
    let info = source.info().clone();
    let canvas = info.canvas();

    let (effects, pool, font) = (|| -> CutawayResult<_> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(CutawayError::validation(format!(
                "base video has invalid dimensions {}x{}",
                canvas.width, canvas.height
            )));
        }
        let effects = resolve_effects(doc, canvas, &opts.defaults)?;
        let pool = build_thread_pool(opts.threads)?;
        let font = opts.load_font()?;
        Ok((effects, pool, font))
    })()
    .map_err(JobError::at(Stage::Validate))?;
    tracing::info!(
        effects = effects.len(),
        width = canvas.width,
        height = canvas.height,
        fps = info.fps.as_f64(),
        "configuration validated"
    );

    let mut kinds: Vec<EffectKind> = effects.iter().map(|e| e.kind()).collect();
    kinds.dedup();
    let backend = negotiate(
        opts.renderer,
        NegotiateOpts {
            engine,
            templates_dir: opts.templates_dir.clone(),
            font,
            canvas,
        },
        &kinds,
    )
    .map_err(JobError::at(Stage::Negotiate))?;

    let make_renderer = || backend.make_renderer();
    let layers = build_layers(
        &effects,
        info.fps,
        opts.scratch_root.as_deref(),
        &make_renderer,
        &pool,
        cancel,
    )
    .map_err(JobError::at(Stage::Build))?;
    let layer_frames_rendered: u64 = layers.iter().map(Layer::frame_count).sum();
    let layers_built = layers.len();

    let sink_cfg = SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: info.fps,
        audio_source: if info.has_audio {
            info.source_path.clone()
        } else {
            None
        },
    };
    let composited = composite_video(
        source,
        &layers,
        sink,
        sink_cfg,
        &pool,
        normalized_chunk_size(opts.chunk_size),
        cancel,
    )
    .map_err(JobError::at(Stage::Composite))
    .and_then(|stats| {
        sink.end().map_err(JobError::at(Stage::Finalize))?;
        Ok(stats)
    });

    let report = release_layers(layers);
    if report.failed > 0 {
        tracing::warn!(failed = report.failed, "some scratch storage could not be released");
    }
    tracing::info!(released = report.released, "scratch storage released");

    let composited = composited?;
    Ok(JobStats {
        layers_built,
        layer_frames_rendered,
        frames_composited: composited.frames,
        scratch_released: report.released,
        scratch_release_failures: report.failed,
        backend: backend.kind(),
    })
}

/// Overlay the effects in `config` onto `video` and encode the result to `output`.
///
/// `subtitles` is only checked for existence. The effects are validated against the probed
/// video before the decoder starts. The output file appears only after a successful encode.
pub fn process_video(
    video: &Path,
    subtitles: &Path,
    config: &Path,
    output: &Path,
    opts: &JobOpts,
    cancel: &CancelToken,
) -> Result<JobStats, JobError> {
    let (doc, mut source) = (|| -> CutawayResult<_> {
        if !subtitles.is_file() {
            return Err(CutawayError::validation(format!(
                "subtitles file '{}' not found",
                subtitles.display()
            )));
        }
        let doc = EffectsDocument::from_path(config)?;
        let info = probe_video(video)?;
        resolve_effects(&doc, info.canvas(), &opts.defaults)?;
        tracing::info!(
            video = %video.display(),
            frames = info.frame_count,
            has_audio = info.has_audio,
            "base video probed"
        );
        let source = FfmpegFrameReader::open(info)?;
        Ok((doc, source))
    })()
    .map_err(JobError::at(Stage::Validate))?;

    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        overwrite: opts.overwrite,
        ..FfmpegSinkOpts::new(output)
    });
    run_job(&doc, &mut source, &mut sink, opts, cancel)
}

fn build_thread_pool(threads: Option<usize>) -> CutawayResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CutawayError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CutawayError::validation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/job.rs"]
mod tests;
