use super::*;
use std::cell::Cell;

#[test]
fn overflow_evicts_oldest_insertion() {
    let n = 4;
    let mut cache = BoundedCache::new(n).unwrap();
    for k in 0..=n {
        cache.get_or_insert_with(k, |k| k * 10);
    }
    assert!(!cache.contains_key(&0));
    for k in 1..=n {
        assert_eq!(cache.get(&k), Some(&(k * 10)));
    }
    assert_eq!(cache.len(), n);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn evicted_key_is_recomputed() {
    let calls = Cell::new(0);
    let mut cache = BoundedCache::new(2).unwrap();
    let fetch = |cache: &mut BoundedCache<u32, u32>, k: u32| {
        *cache.get_or_insert_with(k, |k| {
            calls.set(calls.get() + 1);
            k + 1
        })
    };
    fetch(&mut cache, 0);
    fetch(&mut cache, 1);
    fetch(&mut cache, 0);
    assert_eq!(calls.get(), 2);
    fetch(&mut cache, 2);
    fetch(&mut cache, 0);
    assert_eq!(calls.get(), 4);
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 4,
            evictions: 2
        }
    );
}

#[test]
fn access_does_not_refresh_position() {
    let mut cache = BoundedCache::new(2).unwrap();
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.get_or_insert_with("a", |_| 0);
    cache.insert("c", 3);
    assert!(!cache.contains_key(&"a"));
    assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["b", "c"]);
}

#[test]
fn replacing_keeps_insertion_position() {
    let mut cache = BoundedCache::new(2).unwrap();
    cache.insert(1, "x");
    cache.insert(2, "y");
    cache.insert(1, "z");
    cache.insert(3, "w");
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.get(&2), Some(&"y"));
}

#[test]
fn remove_absent_key_is_a_no_op() {
    let mut cache = BoundedCache::<u8, u8>::new(3).unwrap();
    assert_eq!(cache.remove(&9), None);
    cache.insert(1, 1);
    assert_eq!(cache.remove(&1), Some(1));
    assert!(cache.is_empty());
    assert_eq!(cache.keys().count(), 0);
}

#[test]
fn failed_compute_stores_nothing() {
    let mut cache = BoundedCache::<u8, u8>::new(3).unwrap();
    let err = cache
        .try_get_or_insert_with(1, |_| Err(FramelaneError::engine("decode failed")))
        .unwrap_err();
    assert!(matches!(err, FramelaneError::Engine(_)));
    assert!(cache.is_empty());
    assert_eq!(*cache.try_get_or_insert_with(1, |_| Ok(7)).unwrap(), 7);
}

#[test]
fn clear_leaves_cache_usable() {
    let mut cache = BoundedCache::new(2).unwrap();
    cache.insert(1, 1);
    cache.insert(2, 2);
    cache.clear();
    assert!(cache.is_empty());
    cache.insert(3, 3);
    assert_eq!(cache.len(), 1);
}

#[test]
fn zero_capacity_is_rejected() {
    assert!(BoundedCache::<u8, u8>::new(0).is_err());
}
