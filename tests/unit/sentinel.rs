use super::*;

#[test]
fn filter_strips_markers_in_order() {
    let marked: Vec<Marked<u64>> = (0..12).map(|i| Sentinel::check(i, i % 3 != 0)).collect();
    let kept: Vec<u64> = Sentinel::filter(marked).collect();
    assert_eq!(kept, vec![1, 2, 4, 5, 7, 8, 10, 11]);
}

#[test]
fn identity_not_name_decides_equality() {
    let a = Sentinel::named("scene");
    let b = Sentinel::named("scene");
    assert_ne!(a, b);
    assert_eq!(a, a);
    assert_eq!(a.name(), "scene");
    assert_ne!(a, Sentinel::NONE);
}

#[test]
fn filter_only_keeps_other_markers() {
    let skip = Sentinel::named("skip");
    let items = vec![
        Marked::Value(1),
        skip.mark_unless(2, false),
        Sentinel::check(3, false),
        Marked::Value(4),
    ];
    let left: Vec<Marked<i32>> = skip.filter_only(items).collect();
    assert_eq!(left.len(), 3);
    assert!(left[1].is(Sentinel::NONE));
    assert!(!left[1].is(skip));
}

#[test]
fn marked_helpers() {
    let m: Marked<u8> = 5.into();
    assert!(!m.is_sentinel());
    assert_eq!(m.clone().map(|v| v * 2), Marked::Value(10));
    assert_eq!(m.into_value(), Some(5));
    let s: Marked<u8> = Marked::Sentinel(Sentinel::NONE);
    assert!(s.is_sentinel());
    assert_eq!(s.into_value(), None);
}
