//! Cutaway overlays time-bounded animated effects onto a base video.
//!
//! A job reads an effects document (lower-thirds, fancy text, term cards, quotes, stat
//! counters, bullet lists, social bars), renders every effect instance into a fully
//! materialized layer of transparent frames, then composites the layers over the base video
//! frame by frame:
//!
//! - Resolve and validate effects with [`resolve_effects`]
//! - Pick a backend with [`negotiate`] (DOM templates, or the [`RasterRenderer`] fallback)
//! - Build layers with [`build_layers`] and blend them with [`composite_video`]
//!
//! [`run_job`] and [`process_video`] tie the stages together.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod composite;
pub(crate) mod effects;
pub(crate) mod encode;
pub(crate) mod layer;
pub(crate) mod lifecycle;
pub(crate) mod media;
pub(crate) mod pipeline;
pub(crate) mod render;
pub(crate) mod timing;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Position, Rgba8, Vec2};
pub use crate::foundation::error::{CutawayError, CutawayResult};

pub use crate::animation::ease::{Ease, ease_in_out};
pub use crate::animation::interpolate::{Extrapolate, interpolate};
pub use crate::animation::spring::{Spring, spring};

pub use crate::timing::grid::{SampleInstant, SampleInstants, TimingGrid, frame_count};
pub use crate::timing::window::{Span, TimeWindow, WindowEnd};

pub use crate::effects::defaults::{Anchor, DefaultsTable, KindDefaults, PositionRule};
pub use crate::effects::document::{EffectsDocument, FancyStyle, Platform, StatValue};
pub use crate::effects::model::{EffectContent, EffectKind, ResolvedEffect};
pub use crate::effects::resolve::resolve_effects;
pub use crate::effects::theme::{Palette, Theme};

pub use crate::render::backend::{
    BackendKind, Frame, FrameRGBA, FrameRenderer, Placement,
};
pub use crate::render::dom::driver::{DriverCommand, DriverEngine};
pub use crate::render::dom::{DomRenderer, Surface, SurfaceEngine, template_path};
pub use crate::render::negotiate::{
    NegotiateOpts, RendererChoice, ResolvedBackend, check_dom, negotiate,
};
pub use crate::render::raster::RasterRenderer;
pub use crate::render::raster::text::FontSource;

pub use crate::layer::builder::{RendererFactory, build_layer, build_layers};
pub use crate::layer::{Layer, release_layers};
pub use crate::lifecycle::scratch::{ReleaseReport, ScratchArea, release_all};

pub use crate::composite::compositor::{CompositeStats, Compositor, composite_video};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::media::probe::{VideoInfo, is_ffprobe_on_path, parse_probe_json, probe_video};
pub use crate::media::source::{BaseFrameSource, FfmpegFrameReader, InMemorySource};

pub use crate::pipeline::job::{JobError, JobStats, Stage, process_video, run_job, run_job_with_engine};
pub use crate::pipeline::opts::{
    ENV_DOM_DRIVER, ENV_FONT, ENV_SCRATCH_DIR, ENV_TEMPLATES_DIR, ENV_THREADS, JobOpts,
};
