use super::*;
use crate::effects::document::FancyStyle;
use crate::effects::model::EffectContent;
use crate::effects::theme::Theme;
use crate::foundation::core::{Fps, FrameIndex, Position};
use crate::timing::window::Span;
use std::sync::Mutex;

#[derive(Default)]
struct Log {
    opened: Vec<PathBuf>,
    applied: Vec<serde_json::Value>,
    seeks: Vec<f64>,
    closed: usize,
}

struct MockEngine {
    log: Arc<Mutex<Log>>,
    frame_size: (u32, u32),
    fail_apply: bool,
}

struct MockSurface {
    log: Arc<Mutex<Log>>,
    frame_size: (u32, u32),
    fail_apply: bool,
}

impl SurfaceEngine for MockEngine {
    fn probe(&self) -> CutawayResult<()> {
        Ok(())
    }

    fn open(&self, template: &Path, _canvas: Canvas) -> CutawayResult<Box<dyn Surface>> {
        self.log.lock().unwrap().opened.push(template.to_path_buf());
        Ok(Box::new(MockSurface {
            log: Arc::clone(&self.log),
            frame_size: self.frame_size,
            fail_apply: self.fail_apply,
        }))
    }
}

impl Surface for MockSurface {
    fn apply(&mut self, config: &serde_json::Value) -> CutawayResult<()> {
        if self.fail_apply {
            return Err(CutawayError::Other(anyhow::anyhow!("initAnimation threw")));
        }
        self.log.lock().unwrap().applied.push(config.clone());
        Ok(())
    }

    fn seek(&mut self, time_ms: f64) -> CutawayResult<FrameRGBA> {
        self.log.lock().unwrap().seeks.push(time_ms);
        let mut f = FrameRGBA::transparent(self.frame_size.0, self.frame_size.1);
        f.data[3] = (time_ms as u64 % 256) as u8;
        Ok(f)
    }

    fn close(&mut self) -> CutawayResult<()> {
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

const CANVAS: Canvas = Canvas {
    width: 8,
    height: 4,
};

fn setup(frame_size: (u32, u32), fail_apply: bool) -> (tempfile::TempDir, Arc<Mutex<Log>>, DomRenderer) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fancy-text.html"), "<html></html>").unwrap();
    let log = Arc::new(Mutex::new(Log::default()));
    let engine = Arc::new(MockEngine {
        log: Arc::clone(&log),
        frame_size,
        fail_apply,
    });
    let r = DomRenderer::new(engine, dir.path().to_path_buf(), CANVAS);
    (dir, log, r)
}

fn fancy(kind_text: &str) -> ResolvedEffect {
    ResolvedEffect {
        label: "keyPhrases[0]".to_owned(),
        content: EffectContent::FancyText {
            text: kind_text.to_owned(),
            style: FancyStyle::Emphasis,
        },
        theme: Theme::Cyberpunk,
        position: Position::new(1, 2),
        span: Span {
            start_ms: 1000,
            duration_ms: 2000,
        },
    }
}

fn at(frame: u64) -> SampleInstant {
    SampleInstant {
        frame: FrameIndex(frame),
        fps: Fps::new(10, 1).unwrap(),
    }
}

#[test]
fn template_paths_use_kind_stems() {
    let p = template_path(Path::new("/t"), EffectKind::AnimatedStat);
    assert_eq!(p, Path::new("/t/animated-stats.html"));
}

#[test]
fn each_effect_gets_a_fresh_configured_surface() {
    let (dir, log, mut r) = setup((8, 4), false);
    let e = fancy("hello");

    let p = r.begin_effect(&e).unwrap();
    assert_eq!(p, Placement::full_canvas(CANVAS));
    r.render(&e, at(3)).unwrap();
    r.render(&e, at(1)).unwrap();
    r.end_effect().unwrap();

    r.begin_effect(&fancy("again")).unwrap();
    r.end_effect().unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.opened, vec![dir.path().join("fancy-text.html"); 2]);
    assert_eq!(log.applied.len(), 2);
    assert_eq!(log.applied[0]["text"], "hello");
    assert_eq!(log.applied[0]["theme"], "cyberpunk");
    assert_eq!(log.seeks, vec![300.0, 100.0]);
    assert_eq!(log.closed, 2);
}

#[test]
fn missing_template_is_renderer_unavailable() {
    let (_dir, log, mut r) = setup((8, 4), false);
    let e = ResolvedEffect {
        content: EffectContent::QuoteCallout {
            text: "q".into(),
            author: String::new(),
        },
        ..fancy("x")
    };
    let err = r.begin_effect(&e).unwrap_err();
    assert!(matches!(err, CutawayError::RendererUnavailable(_)), "{err}");
    assert!(log.lock().unwrap().opened.is_empty());
}

#[test]
fn failed_configuration_closes_the_surface() {
    let (_dir, log, mut r) = setup((8, 4), true);
    assert!(r.begin_effect(&fancy("x")).is_err());
    assert_eq!(log.lock().unwrap().closed, 1);
    assert!(r.render(&fancy("x"), at(0)).is_err());
}

#[test]
fn wrong_snapshot_size_is_a_frame_error() {
    let (_dir, _log, mut r) = setup((2, 2), false);
    let e = fancy("x");
    r.begin_effect(&e).unwrap();
    let err = r.render(&e, at(5)).unwrap_err();
    assert!(
        matches!(err, CutawayError::FrameRender { frame: 5, .. }),
        "{err}"
    );
}

#[test]
fn close_without_effect_is_a_no_op() {
    let (_dir, log, mut r) = setup((8, 4), false);
    r.close().unwrap();
    assert_eq!(log.lock().unwrap().closed, 0);
    assert_eq!(r.backend(), BackendKind::Dom);
}
