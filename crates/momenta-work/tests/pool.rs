//! Tests for mapping over caller-supplied pools.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use momenta_work::{build_pool, execute_with_progress, starmap_with_progress};

#[test]
fn test_pool_map_visits_every_input() {
    let pool = build_pool(4).unwrap();
    let calls = AtomicUsize::new(0);
    let results = execute_with_progress(
        |x: u64| {
            calls.fetch_add(1, Ordering::Relaxed);
            x * x
        },
        (0..100).collect(),
        Some(&pool),
    );

    assert_eq!(calls.load(Ordering::Relaxed), 100);
    let expected: BTreeSet<u64> = (0..100).map(|x| x * x).collect();
    assert_eq!(results.into_iter().collect::<BTreeSet<_>>(), expected);
}

#[test]
fn test_pool_outlives_map() {
    let pool = build_pool(2).unwrap();
    let first = starmap_with_progress(|a: i32, b: i32| a * b, vec![(2, 3)], Some(&pool));
    let second = starmap_with_progress(|a: i32, b: i32| a - b, vec![(2, 3)], Some(&pool));
    assert_eq!(first, vec![6]);
    assert_eq!(second, vec![-1]);
    assert_eq!(pool.current_num_threads(), 2);
}

#[test]
fn test_serial_map_stays_on_calling_thread() {
    let caller = thread::current().id();
    let ids = execute_with_progress(|_: u8| thread::current().id(), vec![0; 8], None);
    assert!(ids.iter().all(|id| *id == caller));
}
