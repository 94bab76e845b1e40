use super::*;

#[test]
fn documented_examples() {
    assert_eq!(
        interpolate(0.5, [0.0, 1.0], [0.0, 100.0], Extrapolate::Clamp).unwrap(),
        50.0
    );
    assert_eq!(
        interpolate(-1.0, [0.0, 1.0], [0.0, 100.0], Extrapolate::Clamp).unwrap(),
        0.0
    );
    assert_eq!(
        interpolate(-1.0, [0.0, 1.0], [0.0, 100.0], Extrapolate::Extend).unwrap(),
        -100.0
    );
}

#[test]
fn zero_width_input_is_degenerate() {
    let err = interpolate(1.0, [2.0, 2.0], [0.0, 1.0], Extrapolate::Clamp).unwrap_err();
    assert!(matches!(
        err,
        CutawayError::DegenerateRange {
            in_min: 2.0,
            in_max: 2.0
        }
    ));
}

#[test]
fn clamp_is_bounded_and_non_decreasing() {
    let mut prev = f64::NEG_INFINITY;
    for i in -200..=200 {
        let x = f64::from(i) * 0.05;
        let v = interpolate(x, [-2.0, 3.0], [10.0, 20.0], Extrapolate::Clamp).unwrap();
        assert!((10.0..=20.0).contains(&v));
        assert!(v >= prev);
        prev = v;
    }
}

#[test]
fn clamp_bounds_hold_for_inverted_output() {
    for i in -50..=50 {
        let x = f64::from(i) * 0.1;
        let v = interpolate(x, [0.0, 1.0], [1.0, 0.0], Extrapolate::Clamp).unwrap();
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn extend_is_exactly_linear() {
    for x in [-1000.0, -3.5, 0.0, 0.25, 7.0, 1e6] {
        let v = interpolate(x, [0.0, 2.0], [0.0, 4.0], Extrapolate::Extend).unwrap();
        assert_eq!(v, 2.0 * x);
    }
}
