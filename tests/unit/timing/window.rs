use super::*;

#[test]
fn end_form_normalizes_to_duration() {
    let span = TimeWindow::until(1000, 3000).normalize().unwrap();
    assert_eq!(span.start_ms, 1000);
    assert_eq!(span.duration_ms, 2000);
    assert_eq!(span.end_ms(), 3000);
}

#[test]
fn duration_form_is_kept() {
    let span = TimeWindow::lasting(500, 8000).normalize().unwrap();
    assert_eq!(span.start_ms, 500);
    assert_eq!(span.duration_ms, 8000);
}

#[test]
fn end_equal_to_start_is_an_empty_window() {
    let span = TimeWindow::until(700, 700).normalize().unwrap();
    assert!(span.is_empty());
}

#[test]
fn end_before_start_is_rejected() {
    let err = TimeWindow::until(3000, 1000).normalize().unwrap_err();
    assert!(matches!(err, CutawayError::Validation(_)));
}

#[test]
fn zero_duration_is_rejected() {
    let err = TimeWindow::lasting(0, 0).normalize().unwrap_err();
    assert!(err.to_string().contains("durationMs must be > 0"));
}

#[test]
fn overflowing_window_is_rejected() {
    assert!(TimeWindow::lasting(u64::MAX, 10).normalize().is_err());
}
