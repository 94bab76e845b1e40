use super::*;

#[test]
fn frames_in_ms_floor_matches_integer_rates() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.frames_in_ms_floor(0), 0);
    assert_eq!(fps.frames_in_ms_floor(2000), 60);
    assert_eq!(fps.frames_in_ms_floor(33), 0);
    assert_eq!(fps.frames_in_ms_floor(34), 1);
}

#[test]
fn frames_in_ms_floor_handles_ntsc_rates() {
    let fps = Fps::new(30000, 1001).unwrap();
    // 1001ms at 29.97fps is exactly 30 frames.
    assert_eq!(fps.frames_in_ms_floor(1001), 30);
    assert_eq!(fps.frames_in_ms_floor(1000), 29);
}

#[test]
fn frame_time_ms_is_derived_from_index() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.frame_time_ms(FrameIndex(0)), 0.0);
    assert!((fps.frame_time_ms(FrameIndex(1)) - 33.333_333).abs() < 1e-3);
    assert_eq!(fps.frame_time_ms(FrameIndex(30)), 1000.0);
}

#[test]
fn parse_ratio_accepts_rational_and_integer_forms() {
    assert_eq!(Fps::parse_ratio("30000/1001").unwrap(), Fps::new(30000, 1001).unwrap());
    assert_eq!(Fps::parse_ratio("25").unwrap(), Fps::new(25, 1).unwrap());
    assert!(Fps::parse_ratio("0/0").is_err());
    assert!(Fps::parse_ratio("abc").is_err());
}

#[test]
fn rgba_with_opacity_scales_alpha_only() {
    let c = Rgba8::opaque(10, 20, 30).with_opacity(0.5);
    assert_eq!((c.r, c.g, c.b), (10, 20, 30));
    assert_eq!(c.a, 128);
    assert_eq!(Rgba8::opaque(1, 2, 3).with_opacity(-1.0).a, 0);
}
