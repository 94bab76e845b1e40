use super::*;

#[test]
fn clones_share_state() {
    let a = CancelToken::new();
    let b = a.clone();
    assert!(a.check().is_ok());
    b.cancel();
    assert!(a.is_cancelled());
    assert!(matches!(a.check(), Err(CutawayError::Cancelled)));
}
