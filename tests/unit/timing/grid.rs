use super::*;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn zero_duration_yields_empty_grid() {
    assert_eq!(frame_count(0, fps30()), 0);
    let grid = TimingGrid::new(0, fps30());
    assert!(grid.is_empty());
    assert_eq!(grid.iter().count(), 0);
}

#[test]
fn two_seconds_at_30fps_is_60_evenly_spaced_frames() {
    let grid = TimingGrid::new(2000, fps30());
    let instants: Vec<_> = grid.iter().collect();
    assert_eq!(instants.len(), 60);
    for pair in instants.windows(2) {
        let step = pair[1].time_ms() - pair[0].time_ms();
        assert!((step - 1000.0 / 30.0).abs() < 1e-9);
    }
    assert_eq!(instants[0].time_ms(), 0.0);
}

#[test]
fn times_are_unique_and_strictly_increasing() {
    let grid = TimingGrid::new(4321, Fps::new(30000, 1001).unwrap());
    let mut prev = -1.0;
    for inst in &grid {
        assert!(inst.time_ms() > prev);
        prev = inst.time_ms();
    }
}

#[test]
fn grid_is_restartable() {
    let grid = TimingGrid::new(500, fps30());
    let a: Vec<_> = grid.iter().map(|i| i.frame).collect();
    let b: Vec<_> = grid.iter().map(|i| i.frame).collect();
    assert_eq!(a, b);
    assert_eq!(grid.iter().len(), 15);
}

#[test]
fn instant_is_bounded_by_len() {
    let grid = TimingGrid::new(100, fps30());
    assert_eq!(grid.len(), 3);
    assert!(grid.instant(2).is_some());
    assert!(grid.instant(3).is_none());
}
