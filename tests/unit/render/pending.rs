use super::*;
use crate::sentinel::Sentinel;

#[test]
fn out_of_order_records_reassemble_ascending() {
    let p = PendingResults::<u64>::new(5).unwrap();
    for i in [3u64, 0, 4, 1, 2] {
        p.record(i, Marked::Value(i * 10)).unwrap();
    }
    let out: Vec<u64> = Sentinel::filter(p.finish().unwrap()).collect();
    assert_eq!(out, vec![0, 10, 20, 30, 40]);
}

#[test]
fn markers_count_as_covered() {
    let p = PendingResults::<u64>::new(3).unwrap();
    p.record(0, Marked::Value(0)).unwrap();
    p.record(1, Marked::Sentinel(Sentinel::NONE)).unwrap();
    p.record(2, Marked::Value(2)).unwrap();
    let out = p.finish().unwrap();
    assert_eq!(out.len(), 3);
    assert!(out[1].is_sentinel());
}

#[test]
fn gap_is_fatal_never_defaulted() {
    let p = PendingResults::<u64>::new(6).unwrap();
    for i in [0u64, 1, 3, 5] {
        p.record(i, Marked::Value(i)).unwrap();
    }
    match p.finish().unwrap_err() {
        FramelaneError::Reassembly {
            expected,
            missing,
            first_missing,
        } => {
            assert_eq!(expected, 6);
            assert_eq!(missing, 2);
            assert_eq!(first_missing, 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn duplicate_and_out_of_range_records_fail() {
    let p = PendingResults::<u8>::new(2).unwrap();
    p.record(1, Marked::Value(1)).unwrap();
    assert!(matches!(
        p.record(1, Marked::Value(1)),
        Err(FramelaneError::DuplicateResult { index: 1 })
    ));
    assert!(matches!(
        p.record(2, Marked::Value(2)),
        Err(FramelaneError::Engine(_))
    ));
}

#[test]
fn empty_range_finishes_empty() {
    let p = PendingResults::<u8>::new(0).unwrap();
    assert!(p.finish().unwrap().is_empty());
}
