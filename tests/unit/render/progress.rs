use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[test]
fn counter_sees_every_completion_with_total() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let t = ProgressTracker::new(
        Some(Progress::counter(move |c, t| sink.lock().unwrap().push((c, t)))),
        3,
    );
    for _ in 0..3 {
        t.advance();
    }
    t.finish();
    assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn tick_fires_once_per_frame() {
    let ticks = Arc::new(AtomicU64::new(0));
    let t2 = ticks.clone();
    let t = ProgressTracker::new(
        Some(Progress::tick(move || {
            t2.fetch_add(1, Ordering::Relaxed);
        })),
        10,
    );
    for _ in 0..10 {
        t.advance();
    }
    assert_eq!(ticks.load(Ordering::Relaxed), 10);
}

#[test]
fn label_steps_by_tenths() {
    let t = ProgressTracker::new(Some(Progress::label("render")), 25);
    for _ in 0..25 {
        t.advance();
    }
    t.finish();
    let Some(state) = &t.state else {
        panic!("label progress must be tracked");
    };
    let st = state.lock().unwrap();
    assert_eq!(st.completed, 25);
    // The 90% step was logged at 23/25; completion is logged by `finish`.
    assert_eq!(st.next_decile, 10);
}

#[test]
fn absent_progress_tracks_nothing() {
    let none = ProgressTracker::new(None, 5);
    none.advance();
    none.finish();
    assert!(none.state.is_none());
}
