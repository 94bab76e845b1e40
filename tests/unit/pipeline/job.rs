use super::*;
use crate::foundation::core::{Canvas, Fps};
use crate::media::probe::VideoInfo;
use crate::media::source::InMemorySource;
use crate::encode::sink::InMemorySink;
use crate::render::backend::FrameRGBA;
use crate::render::dom::{Surface, template_path};
use crate::render::negotiate::RendererChoice;
use std::path::PathBuf;

fn info(width: u32, height: u32) -> VideoInfo {
    VideoInfo {
        source_path: None,
        width,
        height,
        fps: Fps::new(10, 1).unwrap(),
        frame_count: 0,
        has_audio: false,
    }
}

fn gray_frames(width: u32, height: u32, n: usize) -> Vec<FrameRGBA> {
    (0..n)
        .map(|_| {
            FrameRGBA::from_premul(width, height, [40, 40, 40, 255].repeat((width * height) as usize))
                .unwrap()
        })
        .collect()
}

fn doc(json: &str) -> EffectsDocument {
    EffectsDocument::from_json_str(json).unwrap()
}

fn opts(scratch: &Path) -> JobOpts {
    JobOpts {
        threads: Some(2),
        chunk_size: 4,
        scratch_root: Some(scratch.to_path_buf()),
        system_fonts: false,
        ..JobOpts::default()
    }
}

fn is_empty_dir(p: &Path) -> bool {
    std::fs::read_dir(p).unwrap().next().is_none()
}

#[test]
fn empty_document_passes_the_base_video_through() {
    let scratch = tempfile::tempdir().unwrap();
    let mut src = InMemorySource::new(info(8, 4), gray_frames(8, 4, 5)).unwrap();
    let mut sink = InMemorySink::new();
    let stats = run_job(&doc("{}"), &mut src, &mut sink, &opts(scratch.path()), &CancelToken::new())
        .unwrap();
    assert_eq!(stats.layers_built, 0);
    assert_eq!(stats.frames_composited, 5);
    assert_eq!(stats.backend, BackendKind::Raster);
    assert!(sink.is_finished());
    let out: Vec<_> = sink.frames().iter().map(|(_, f)| f.clone()).collect();
    assert_eq!(out, gray_frames(8, 4, 5));
}

#[test]
fn raster_job_overlays_only_inside_the_window() {
    let scratch = tempfile::tempdir().unwrap();
    let base = gray_frames(64, 36, 40);
    let mut src = InMemorySource::new(info(64, 36), base.clone()).unwrap();
    let mut sink = InMemorySink::new();
    let d = doc(r#"{"keyPhrases": [
        {"text": "wow", "startMs": 1000, "endMs": 3000, "position": {"x": 32, "y": 18}}
    ]}"#);
    let o = JobOpts {
        renderer: RendererChoice::Raster,
        ..opts(scratch.path())
    };
    let stats = run_job(&d, &mut src, &mut sink, &o, &CancelToken::new()).unwrap();

    assert_eq!(stats.layers_built, 1);
    assert_eq!(stats.layer_frames_rendered, 20);
    assert_eq!(stats.frames_composited, 40);
    assert_eq!(stats.scratch_released, 1);
    assert_eq!(stats.scratch_release_failures, 0);
    assert!(is_empty_dir(scratch.path()));

    let frames = sink.frames();
    assert_eq!(frames[9].1, base[9]);
    assert_ne!(frames[20].1, base[20]);
    assert_eq!(frames[30].1, base[30]);
    assert_eq!(frames[39].1, base[39]);
}

#[test]
fn invalid_document_fails_before_any_work() {
    let scratch = tempfile::tempdir().unwrap();
    let mut src = InMemorySource::new(info(8, 4), gray_frames(8, 4, 2)).unwrap();
    let mut sink = InMemorySink::new();
    let d = doc(r#"{"keyPhrases": [{"startMs": 0, "endMs": 100}]}"#);
    let err = run_job(&d, &mut src, &mut sink, &opts(scratch.path()), &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.stage, Stage::Validate);
    assert!(matches!(err.source, CutawayError::Validation(_)));
    assert!(err.to_string().starts_with("validate: "), "{err}");
    assert!(sink.config().is_none());
}

#[test]
fn zero_threads_is_a_validation_error() {
    let scratch = tempfile::tempdir().unwrap();
    let mut src = InMemorySource::new(info(8, 4), vec![]).unwrap();
    let mut sink = InMemorySink::new();
    let o = JobOpts {
        threads: Some(0),
        ..opts(scratch.path())
    };
    let err = run_job(&doc("{}"), &mut src, &mut sink, &o, &CancelToken::new()).unwrap_err();
    assert_eq!(err.stage, Stage::Validate);
}

#[test]
fn pinned_dom_without_driver_fails_negotiation() {
    let scratch = tempfile::tempdir().unwrap();
    let mut src = InMemorySource::new(info(8, 4), gray_frames(8, 4, 2)).unwrap();
    let mut sink = InMemorySink::new();
    let d = doc(r#"{"keyPhrases": [{"text": "x", "startMs": 0, "endMs": 100}]}"#);
    let o = JobOpts {
        renderer: RendererChoice::Dom,
        ..opts(scratch.path())
    };
    let err = run_job(&d, &mut src, &mut sink, &o, &CancelToken::new()).unwrap_err();
    assert_eq!(err.stage, Stage::Negotiate);
    assert!(matches!(err.source, CutawayError::RendererUnavailable(_)));
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn cancelled_job_releases_everything() {
    let scratch = tempfile::tempdir().unwrap();
    let mut src = InMemorySource::new(info(8, 4), gray_frames(8, 4, 2)).unwrap();
    let mut sink = InMemorySink::new();
    let d = doc(r#"{"keyPhrases": [{"text": "x", "startMs": 0, "endMs": 100}]}"#);
    let token = CancelToken::new();
    token.cancel();
    let err = run_job(&d, &mut src, &mut sink, &opts(scratch.path()), &token).unwrap_err();
    assert_eq!(err.stage, Stage::Build);
    assert!(matches!(err.source, CutawayError::Cancelled));
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn base_audio_is_routed_to_the_sink() {
    let scratch = tempfile::tempdir().unwrap();
    let with_audio = VideoInfo {
        source_path: Some(PathBuf::from("in.mp4")),
        has_audio: true,
        ..info(8, 4)
    };
    let mut src = InMemorySource::new(with_audio, gray_frames(8, 4, 1)).unwrap();
    let mut sink = InMemorySink::new();
    run_job(&doc("{}"), &mut src, &mut sink, &opts(scratch.path()), &CancelToken::new()).unwrap();
    let cfg = sink.config().unwrap();
    assert_eq!(cfg.audio_source, Some(PathBuf::from("in.mp4")));
    assert_eq!((cfg.width, cfg.height), (8, 4));
}

struct RedDotEngine {
    fail_seek: bool,
}

struct RedDotSurface {
    canvas: Canvas,
    fail_seek: bool,
}

impl SurfaceEngine for RedDotEngine {
    fn probe(&self) -> CutawayResult<()> {
        Ok(())
    }

    fn open(&self, _template: &Path, canvas: Canvas) -> CutawayResult<Box<dyn Surface>> {
        Ok(Box::new(RedDotSurface {
            canvas,
            fail_seek: self.fail_seek,
        }))
    }
}

impl Surface for RedDotSurface {
    fn apply(&mut self, _config: &serde_json::Value) -> CutawayResult<()> {
        Ok(())
    }

    fn seek(&mut self, time_ms: f64) -> CutawayResult<FrameRGBA> {
        if self.fail_seek && time_ms >= 200.0 {
            return Err(CutawayError::Other(anyhow::anyhow!("snapshot timed out")));
        }
        let mut f = FrameRGBA::transparent(self.canvas.width, self.canvas.height);
        f.data[..4].copy_from_slice(&[255, 0, 0, 255]);
        Ok(f)
    }

    fn close(&mut self) -> CutawayResult<()> {
        Ok(())
    }
}

fn dom_setup(fail_seek: bool) -> (tempfile::TempDir, JobOpts, Option<Arc<dyn SurfaceEngine>>) {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir(&templates).unwrap();
    std::fs::write(template_path(&templates, EffectKind::FancyText), "<html></html>").unwrap();
    let scratch = dir.path().join("scratch");
    let o = JobOpts {
        renderer: RendererChoice::Dom,
        templates_dir: templates,
        ..opts(&scratch)
    };
    let engine: Arc<dyn SurfaceEngine> = Arc::new(RedDotEngine { fail_seek });
    (dir, o, Some(engine))
}

#[test]
fn dom_job_composites_full_canvas_snapshots() {
    let (_dir, o, engine) = dom_setup(false);
    let mut src = InMemorySource::new(info(8, 4), gray_frames(8, 4, 6)).unwrap();
    let mut sink = InMemorySink::new();
    let d = doc(r#"{"keyPhrases": [{"text": "x", "startMs": 200, "endMs": 400}]}"#);
    let stats =
        run_job_with_engine(&d, &mut src, &mut sink, &o, engine, &CancelToken::new()).unwrap();
    assert_eq!(stats.backend, BackendKind::Dom);
    assert_eq!(stats.layer_frames_rendered, 2);

    let frames = sink.frames();
    assert_eq!(frames[1].1.pixel(0, 0), [40, 40, 40, 255]);
    assert_eq!(frames[2].1.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(frames[3].1.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(frames[3].1.pixel(1, 0), [40, 40, 40, 255]);
    assert_eq!(frames[4].1.pixel(0, 0), [40, 40, 40, 255]);
}

#[test]
fn frame_failure_aborts_the_build_and_cleans_up() {
    let (dir, o, engine) = dom_setup(true);
    let mut src = InMemorySource::new(info(8, 4), gray_frames(8, 4, 6)).unwrap();
    let mut sink = InMemorySink::new();
    let d = doc(r#"{"keyPhrases": [{"text": "x", "startMs": 0, "endMs": 500}]}"#);
    let err =
        run_job_with_engine(&d, &mut src, &mut sink, &o, engine, &CancelToken::new()).unwrap_err();
    assert_eq!(err.stage, Stage::Build);
    match &err.source {
        CutawayError::FrameRender { effect, frame, .. } => {
            assert_eq!(effect, "keyPhrases[0]");
            assert_eq!(*frame, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.config().is_none());
    assert!(is_empty_dir(&dir.path().join("scratch")));
}

#[test]
fn missing_subtitles_are_reported_as_validation() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_video(
        &dir.path().join("in.mp4"),
        &dir.path().join("subs.srt"),
        &dir.path().join("effects.json"),
        &dir.path().join("out.mp4"),
        &JobOpts::default(),
        &CancelToken::new(),
    )
    .unwrap_err();
    assert_eq!(err.stage, Stage::Validate);
    assert!(err.to_string().contains("subs.srt"), "{err}");
    assert!(!dir.path().join("out.mp4").exists());
}
