use super::*;

#[derive(Default)]
struct Counter {
    entries: Vec<u32>,
    clears: u32,
}

impl Clear for Counter {
    fn clear(&mut self) {
        self.entries.clear();
        self.clears += 1;
    }
}

#[test]
fn fire_clears_live_hooks_once() {
    let td = Teardown::new();
    let a = Arc::new(Mutex::new(Counter {
        entries: vec![1, 2],
        clears: 0,
    }));
    td.register(&a);
    assert_eq!(td.live_hooks(), 1);

    assert_eq!(td.fire(), 1);
    {
        let a = a.lock().unwrap();
        assert!(a.entries.is_empty());
        assert_eq!(a.clears, 1);
    }

    // Unregistered after firing.
    assert_eq!(td.fire(), 0);
    assert_eq!(a.lock().unwrap().clears, 1);
}

#[test]
fn dropped_targets_are_skipped() {
    let td = Teardown::new();
    let a = Arc::new(Mutex::new(Counter::default()));
    let b = Arc::new(Mutex::new(Counter::default()));
    td.register(&a);
    td.register(&b);
    drop(a);
    assert_eq!(td.live_hooks(), 1);
    assert_eq!(td.fire(), 1);
    assert_eq!(b.lock().unwrap().clears, 1);
}

#[test]
fn cache_stays_usable_after_teardown() {
    let td = Teardown::new();
    let a = Arc::new(Mutex::new(Counter::default()));
    td.register(&a);
    td.fire();
    a.lock().unwrap().entries.push(9);
    td.register(&a);
    assert_eq!(td.fire(), 1);
    assert!(a.lock().unwrap().entries.is_empty());
}
