use super::*;
use crate::effects::document::FancyStyle;
use crate::effects::model::EffectContent;
use crate::effects::theme::Theme;
use crate::foundation::core::Position;
use crate::render::backend::{BackendKind, FrameRGBA, Placement};
use crate::timing::grid::SampleInstant;
use crate::timing::window::Span;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Calls {
    begins: usize,
    ends: usize,
    closes: usize,
    created: usize,
    times_ms: Vec<f64>,
}

struct MockRenderer {
    calls: Arc<Mutex<Calls>>,
    fail_at: Option<u64>,
}

impl FrameRenderer for MockRenderer {
    fn backend(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn begin_effect(&mut self, _effect: &ResolvedEffect) -> CutawayResult<Placement> {
        self.calls.lock().unwrap().begins += 1;
        Ok(Placement {
            origin: Position::new(1, 1),
            width: 2,
            height: 2,
        })
    }

    fn render(&mut self, _effect: &ResolvedEffect, at: SampleInstant) -> CutawayResult<FrameRGBA> {
        if self.fail_at == Some(at.frame.0) {
            return Err(CutawayError::composition("capture timed out"));
        }
        self.calls.lock().unwrap().times_ms.push(at.time_ms());
        let a = (at.frame.0 % 256) as u8;
        FrameRGBA::from_premul(2, 2, vec![a; 16])
    }

    fn end_effect(&mut self) -> CutawayResult<()> {
        self.calls.lock().unwrap().ends += 1;
        Ok(())
    }

    fn close(&mut self) -> CutawayResult<()> {
        self.calls.lock().unwrap().closes += 1;
        Ok(())
    }
}

fn effect(label: &str, start_ms: u64, duration_ms: u64) -> ResolvedEffect {
    ResolvedEffect {
        label: label.to_owned(),
        content: EffectContent::FancyText {
            text: "x".to_owned(),
            style: FancyStyle::Emphasis,
        },
        theme: Theme::Notion,
        position: Position::new(0, 0),
        span: Span {
            start_ms,
            duration_ms,
        },
    }
}

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

fn mock(calls: &Arc<Mutex<Calls>>, fail_at: Option<u64>) -> MockRenderer {
    MockRenderer {
        calls: Arc::clone(calls),
        fail_at,
    }
}

fn pool(n: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new().num_threads(n).build().unwrap()
}

fn dir_is_empty(p: &Path) -> bool {
    std::fs::read_dir(p).unwrap().next().is_none()
}

#[test]
fn two_second_window_at_30fps_builds_60_frames() {
    let calls = Arc::new(Mutex::new(Calls::default()));
    let mut r = mock(&calls, None);
    let layer = build_layer(&mut r, &effect("keyPhrases[0]", 1000, 2000), fps30(), None).unwrap();

    assert_eq!(layer.frame_count(), 60);
    assert_eq!(layer.span().start_ms, 1000);
    assert_eq!(layer.origin(), Position::new(1, 1));

    let calls = calls.lock().unwrap();
    assert_eq!((calls.begins, calls.ends), (1, 1));
    assert_eq!(calls.times_ms.len(), 60);
    for pair in calls.times_ms.windows(2) {
        assert!(pair[1] > pair[0]);
        assert!((pair[1] - pair[0] - 1000.0 / 30.0).abs() < 1e-9);
    }
    drop(calls);
    assert_eq!(layer.get_frame(59).unwrap().unwrap().data, vec![59u8; 16]);
}

#[test]
fn empty_window_builds_an_empty_layer() {
    let calls = Arc::new(Mutex::new(Calls::default()));
    let mut r = mock(&calls, None);
    let layer = build_layer(&mut r, &effect("quotes[0]", 500, 0), fps30(), None).unwrap();
    assert_eq!(layer.frame_count(), 0);
    assert_eq!(calls.lock().unwrap().ends, 1);
}

#[test]
fn frame_failure_discards_the_whole_layer() {
    let root = tempfile::tempdir().unwrap();
    let calls = Arc::new(Mutex::new(Calls::default()));
    let mut r = mock(&calls, Some(5));
    let err = build_layer(&mut r, &effect("stats[1]", 0, 1000), fps30(), Some(root.path()))
        .unwrap_err();

    match err {
        CutawayError::FrameRender { effect, frame, .. } => {
            assert_eq!(effect, "stats[1]");
            assert_eq!(frame, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(calls.lock().unwrap().ends, 1);
    assert!(dir_is_empty(root.path()));
}

struct UnopenableRenderer;

impl FrameRenderer for UnopenableRenderer {
    fn backend(&self) -> BackendKind {
        BackendKind::Dom
    }

    fn begin_effect(&mut self, _effect: &ResolvedEffect) -> CutawayResult<Placement> {
        Err(CutawayError::renderer_unavailable(
            "failed to spawn DOM driver 'node capture.js'",
        ))
    }

    fn render(&mut self, _effect: &ResolvedEffect, _at: SampleInstant) -> CutawayResult<FrameRGBA> {
        unreachable!("render after failed begin_effect")
    }

    fn end_effect(&mut self) -> CutawayResult<()> {
        Ok(())
    }

    fn close(&mut self) -> CutawayResult<()> {
        Ok(())
    }
}

#[test]
fn surface_open_failure_names_the_effect() {
    let root = tempfile::tempdir().unwrap();
    let err = build_layer(
        &mut UnopenableRenderer,
        &effect("quotes[2]", 0, 500),
        fps30(),
        Some(root.path()),
    )
    .unwrap_err();
    assert!(matches!(err, CutawayError::RendererUnavailable(_)));
    assert_eq!(
        err.to_string(),
        "renderer unavailable: quotes[2]: failed to spawn DOM driver 'node capture.js'"
    );
    assert!(dir_is_empty(root.path()));
}

#[test]
fn parallel_build_preserves_order_and_closes_renderers() {
    let calls = Arc::new(Mutex::new(Calls::default()));
    let effects: Vec<_> = (0..8)
        .map(|i| effect(&format!("keyPhrases[{i}]"), i * 100, 200 + i * 100))
        .collect();
    let factory = || -> CutawayResult<Box<dyn FrameRenderer>> {
        calls.lock().unwrap().created += 1;
        Ok(Box::new(mock(&calls, None)))
    };

    let layers = build_layers(&effects, fps30(), None, &factory, &pool(4), &CancelToken::new())
        .unwrap();

    let labels: Vec<_> = layers.iter().map(|l| l.label().to_owned()).collect();
    let expected: Vec<_> = effects.iter().map(|e| e.label.clone()).collect();
    assert_eq!(labels, expected);
    for (layer, e) in layers.iter().zip(&effects) {
        assert_eq!(layer.frame_count(), fps30().frames_in_ms_floor(e.span.duration_ms));
    }

    let c = calls.lock().unwrap();
    assert!(c.created >= 1);
    assert_eq!(c.created, c.closes);
    assert_eq!(c.begins, 8);
    assert_eq!(c.ends, 8);
}

#[test]
fn parallel_failure_releases_every_built_layer() {
    let root = tempfile::tempdir().unwrap();
    let calls = Arc::new(Mutex::new(Calls::default()));
    let effects = vec![
        effect("quotes[0]", 0, 500),
        effect("quotes[1]", 0, 500),
        effect("quotes[2]", 0, 500),
    ];
    // Frame 14 exists only in windows of at least 500ms, so every layer fails there; the first
    // one in configuration order is reported.
    let factory = || -> CutawayResult<Box<dyn FrameRenderer>> { Ok(Box::new(mock(&calls, Some(14)))) };

    let err = build_layers(&effects, fps30(), Some(root.path()), &factory, &pool(2), &CancelToken::new())
        .unwrap_err();
    assert!(err.to_string().contains("quotes[0]"));
    assert!(dir_is_empty(root.path()));
}

#[test]
fn renderer_creation_failure_is_renderer_unavailable() {
    let effects = vec![effect("quotes[0]", 0, 100)];
    let factory = || -> CutawayResult<Box<dyn FrameRenderer>> {
        Err(CutawayError::renderer_unavailable("no engine"))
    };
    let err = build_layers(&effects, fps30(), None, &factory, &pool(1), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, CutawayError::RendererUnavailable(_)));
}

#[test]
fn cancelled_job_builds_nothing() {
    let root = tempfile::tempdir().unwrap();
    let calls = Arc::new(Mutex::new(Calls::default()));
    let token = CancelToken::new();
    token.cancel();
    let factory = || -> CutawayResult<Box<dyn FrameRenderer>> { Ok(Box::new(mock(&calls, None))) };
    let err = build_layers(
        &[effect("quotes[0]", 0, 100)],
        fps30(),
        Some(root.path()),
        &factory,
        &pool(1),
        &token,
    )
    .unwrap_err();
    assert!(matches!(err, CutawayError::Cancelled));
    assert_eq!(calls.lock().unwrap().begins, 0);
    assert!(dir_is_empty(root.path()));
}
