use super::*;

#[test]
fn brush_converts_from_palette_color() {
    let b = TextBrushRgba8::from(Rgba8::new(1, 2, 3, 4));
    assert_eq!(b, TextBrushRgba8 { r: 1, g: 2, b: 3, a: 4 });
}

#[test]
fn missing_font_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(FontSource::load(&dir.path().join("nope.ttf")).is_err());
}

#[test]
fn empty_font_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("empty.ttf");
    std::fs::write(&p, b"").unwrap();
    let err = FontSource::load(&p).unwrap_err();
    assert!(matches!(err, CutawayError::Validation(_)));
}

#[test]
fn garbage_font_bytes_register_no_family() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("garbage.ttf");
    std::fs::write(&p, b"definitely not a font").unwrap();
    let src = FontSource::load(&p).unwrap();
    assert!(TextLayoutEngine::new(&src).is_err());
}

#[test]
fn fixture_font_lays_out_and_caches_text() {
    let src = FontSource::load(Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/DejaVuSans.ttf"
    )))
    .unwrap();
    let mut engine = TextLayoutEngine::new(&src).unwrap();
    let brush = TextBrushRgba8::from(Rgba8::new(255, 255, 255, 255));
    let a = engine.layout_plain("Hello", 24.0, brush, Some(400.0)).unwrap();
    assert!(a.width() > 0.0);
    let b = engine.layout_plain("Hello", 24.0, brush, Some(400.0)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(engine.cached_layouts(), 1);

    engine.clear_cache();
    assert_eq!(engine.cached_layouts(), 0);
}
