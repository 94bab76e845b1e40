use super::*;

#[test]
fn acquire_creates_private_directories_under_root() {
    let root = tempfile::tempdir().unwrap();
    let a = ScratchArea::acquire(Some(root.path()), "quotes[0]").unwrap();
    let b = ScratchArea::acquire(Some(root.path()), "quotes[1]").unwrap();
    assert!(a.path().is_dir());
    assert!(b.path().is_dir());
    assert_ne!(a.path(), b.path());
    assert!(a.path().starts_with(root.path()));
    assert_eq!(a.label(), "quotes[0]");
}

#[test]
fn release_removes_directory_and_contents() {
    let area = ScratchArea::acquire(None, "x").unwrap();
    let path = area.path().to_path_buf();
    std::fs::write(path.join("frame_00000.rgba"), [0u8; 4]).unwrap();
    area.release().unwrap();
    assert!(!path.exists());
}

#[test]
fn drop_removes_directory() {
    let path = {
        let area = ScratchArea::acquire(None, "dropped").unwrap();
        area.path().to_path_buf()
    };
    assert!(!path.exists());
}

#[test]
fn release_all_is_independent_per_area() {
    let root = tempfile::tempdir().unwrap();
    let areas: Vec<_> = (0..3)
        .map(|i| ScratchArea::acquire(Some(root.path()), &format!("a[{i}]")).unwrap())
        .collect();
    let paths: Vec<_> = areas.iter().map(|a| a.path().to_path_buf()).collect();

    // Removing one directory behind the area's back makes its release fail.
    std::fs::remove_dir_all(&paths[1]).unwrap();

    let report = release_all(areas);
    assert_eq!(report, ReleaseReport { released: 2, failed: 1 });
    for p in &paths {
        assert!(!p.exists());
    }
}

#[test]
fn reports_merge() {
    let mut a = ReleaseReport { released: 1, failed: 0 };
    a.merge(ReleaseReport { released: 2, failed: 1 });
    assert_eq!(a, ReleaseReport { released: 3, failed: 1 });
}
