use super::*;

#[test]
fn starts_at_from_value() {
    assert_eq!(spring(0.0, 30.0, 0.0, 1.0, 12.0, 200.0), 0.0);
    assert_eq!(spring(0.0, 30.0, 5.0, -3.0, 40.0, 100.0), 5.0);
}

#[test]
fn converges_to_target() {
    let v = spring(1000.0, 30.0, 0.0, 1.0, 12.0, 200.0);
    assert!((v - 1.0).abs() < 1e-9, "got {v}");

    let v = spring(1000.0, 30.0, 10.0, 20.0, 40.0, 100.0);
    assert!((v - 20.0).abs() < 1e-6, "got {v}");
}

#[test]
fn overdamped_is_monotone_without_overshoot() {
    for (damping, stiffness) in [(20.0, 100.0), (40.0, 100.0), (100.0, 50.0)] {
        let s = Spring { damping, stiffness };
        assert!(s.damping_ratio() >= 1.0);
        let mut prev = s.sample(0.0, 30.0, 0.0, 1.0);
        for frame in 1..600 {
            let v = s.sample(f64::from(frame), 30.0, 0.0, 1.0);
            assert!(v >= prev, "frame {frame}: {v} < {prev}");
            assert!(v <= 1.0, "frame {frame}: overshoot {v}");
            prev = v;
        }
    }
}

#[test]
fn underdamped_overshoots_with_decaying_amplitude() {
    let s = Spring::default();
    assert!(s.damping_ratio() < 1.0);

    let samples: Vec<f64> = (0..300)
        .map(|f| s.sample(f64::from(f), 120.0, 0.0, 1.0))
        .collect();
    assert!(samples.iter().any(|&v| v > 1.0), "expected overshoot");

    let first_half = samples[..150]
        .iter()
        .map(|v| (v - 1.0).abs())
        .fold(0.0f64, f64::max);
    let second_half = samples[150..]
        .iter()
        .map(|v| (v - 1.0).abs())
        .fold(0.0f64, f64::max);
    assert!(second_half < first_half);
}

#[test]
fn sampling_is_seek_independent() {
    let s = Spring::default();
    let direct = s.sample(47.0, 30.0, 0.0, 1.0);
    for f in 0..47 {
        let _ = s.sample(f64::from(f), 30.0, 0.0, 1.0);
    }
    assert_eq!(direct, s.sample(47.0, 30.0, 0.0, 1.0));
}
