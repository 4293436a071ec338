use super::*;
use crate::cache::dynamic::Stream;
use crate::foundation::core::Fps;
use crate::source::{FnSource, FrameFormat};
use std::sync::atomic::{AtomicUsize, Ordering};

fn info(len: u64) -> SourceInfo {
    SourceInfo::fixed(len, 2, 2, FrameFormat::GRAY8, Fps::default())
}

fn scene_tagging(len: u64, calls: Arc<AtomicUsize>) -> DynamicResultCache<usize> {
    DynamicResultCache::new(move |scene: &usize| {
        calls.fetch_add(1, Ordering::SeqCst);
        let scene = *scene as i64;
        let stream: Stream = Arc::new(FnSource::new(info(len), move |_| {
            Ok(Frame::blank(2, 2, FrameFormat::GRAY8).with_prop("Scene", scene))
        }));
        Ok(stream)
    })
    .unwrap()
}

#[test]
fn indices_map_to_scenes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let src = SceneSource::new(info(30), vec![0, 10, 25], scene_tagging(30, calls.clone())).unwrap();
    for n in 0..30u64 {
        let want = match n {
            0..=9 => 0,
            10..=24 => 1,
            _ => 2,
        };
        assert_eq!(src.scene_id(n), want, "n={n}");
        assert_eq!(src.fetch(n).unwrap().prop_int("Scene").unwrap(), want as i64);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn leading_zero_is_implied() {
    let calls = Arc::new(AtomicUsize::new(0));
    let src = SceneSource::new(info(30), vec![10, 25], scene_tagging(30, calls)).unwrap();
    assert_eq!(src.bounds(), &[0, 10, 25]);
    assert_eq!(src.scenes(), 3);
}

#[test]
fn bad_bounds_are_rejected() {
    assert!(scene_bounds(vec![0, 10, 10], 30).is_err());
    assert!(scene_bounds(vec![0, 20, 10], 30).is_err());
    assert!(scene_bounds(vec![0, 30], 30).is_err());
    assert_eq!(scene_bounds(vec![], 30).unwrap(), vec![0]);
}

#[test]
fn out_of_range_fetch_fails() {
    let calls = Arc::new(AtomicUsize::new(0));
    let src = SceneSource::new(info(30), vec![0], scene_tagging(30, calls.clone())).unwrap();
    assert!(matches!(src.fetch(30), Err(FramelaneError::Validation(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn short_scene_stream_is_an_engine_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let src = SceneSource::new(info(30), vec![0, 10], scene_tagging(5, calls)).unwrap();
    assert!(matches!(src.fetch(12), Err(FramelaneError::Engine(_))));
}

#[test]
fn compute_runs_without_the_cache_lock() {
    let slot: Arc<std::sync::OnceLock<Arc<Mutex<DynamicResultCache<usize>>>>> = Arc::default();
    let locked = Arc::new(AtomicUsize::new(0));
    let (slot_c, locked_c) = (Arc::clone(&slot), Arc::clone(&locked));
    let streams = DynamicResultCache::new(move |_: &usize| {
        if let Some(cache) = slot_c.get()
            && cache.try_lock().is_err()
        {
            locked_c.fetch_add(1, Ordering::SeqCst);
        }
        let stream: Stream = Arc::new(FnSource::new(info(20), |_| {
            Ok(Frame::blank(2, 2, FrameFormat::GRAY8))
        }));
        Ok(stream)
    })
    .unwrap();
    let src = SceneSource::new(info(20), vec![0, 10], streams).unwrap();
    assert!(slot.set(src.teardown_hook()).is_ok());

    for n in [0, 5, 12, 19] {
        src.fetch(n).unwrap();
    }
    assert_eq!(locked.load(Ordering::SeqCst), 0);
    let cache = src.teardown_hook();
    let stats = cache.lock().unwrap().stats();
    assert_eq!((stats.misses, stats.hits), (2, 2));
}
