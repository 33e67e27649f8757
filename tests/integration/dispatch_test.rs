use mtrun::dispatch::{DispatchConfig, Dispatcher, Mode, run};
use mtrun::{Checks, TestRegistry};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Registry of `n` tests that each push their own index into `log`.
fn index_logging_registry(n: usize, log: &Arc<Mutex<Vec<usize>>>) -> TestRegistry {
    let mut registry = TestRegistry::new();
    for index in 0..n {
        let log = Arc::clone(log);
        registry.register(move || log.lock().unwrap().push(index));
    }
    registry
}

fn counting_registry(n: usize, counter: &Arc<AtomicUsize>) -> TestRegistry {
    let mut registry = TestRegistry::new();
    for _ in 0..n {
        let counter = Arc::clone(counter);
        registry.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    registry
}

fn parallel_with(workers: usize) -> Dispatcher {
    Dispatcher::new(
        DispatchConfig::default()
            .with_mode(Mode::Parallel)
            .with_workers(workers),
    )
}

#[test]
fn test_every_index_claimed_exactly_once() {
    for workers in [1, 2, 8] {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = index_logging_registry(500, &log);

        let report = parallel_with(workers).run(&registry).unwrap();

        let mut seen = log.lock().unwrap().clone();
        assert_eq!(seen.len(), 500, "workers = {workers}");
        seen.sort_unstable();
        assert_eq!(seen, (0..500).collect::<Vec<_>>(), "workers = {workers}");
        assert_eq!(report.indices(), (0..500).collect::<Vec<_>>());
    }
}

#[test]
fn test_completeness_across_sizes_and_workers() {
    for n in [0, 1, 17, 1000] {
        for workers in [1, 2, 8] {
            let counter = Arc::new(AtomicUsize::new(0));
            let registry = counting_registry(n, &counter);

            let report = parallel_with(workers).run(&registry).unwrap();

            assert_eq!(
                counter.load(Ordering::SeqCst),
                n,
                "n = {n}, workers = {workers}"
            );
            assert_eq!(report.executed(), n);
            let per_worker: usize = report.worker_statistics.iter().map(|s| s.executed).sum();
            assert_eq!(per_worker, n);
        }
    }
}

#[test]
fn test_sequential_order_matches_registration() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = index_logging_registry(100, &log);

    let report = run(&registry, false).unwrap();

    assert_eq!(*log.lock().unwrap(), (0..100).collect::<Vec<_>>());
    assert_eq!(report.mode, Mode::Sequential);
}

#[test]
fn test_growth_does_not_change_execution_count() {
    let counter = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(100, &counter);

    // 16 -> 32 -> 64 -> 128
    assert!(registry.capacity() >= 100);
    assert_eq!(registry.len(), 100);

    for parallel in [false, true] {
        counter.store(0, Ordering::SeqCst);
        let report = run(&registry, parallel).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert_eq!(report.executed(), 100);
    }
}

#[test]
fn test_empty_registry_returns_immediately() {
    let registry = TestRegistry::new();

    let report = run(&registry, true).unwrap();
    assert_eq!(report.executed(), 0);
    assert_eq!(report.workers, 0);

    let report = run(&registry, false).unwrap();
    assert_eq!(report.executed(), 0);
}

#[test]
fn test_single_worker_matches_sequential_set() {
    let parallel_log = Arc::new(Mutex::new(Vec::new()));
    let registry = index_logging_registry(40, &parallel_log);
    parallel_with(1).run(&registry).unwrap();

    let sequential_log = Arc::new(Mutex::new(Vec::new()));
    let registry = index_logging_registry(40, &sequential_log);
    run(&registry, false).unwrap();

    let mut parallel = parallel_log.lock().unwrap().clone();
    parallel.sort_unstable();
    assert_eq!(parallel, *sequential_log.lock().unwrap());
}

#[test]
fn test_fifty_tests_push_their_index() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = index_logging_registry(50, &log);

    run(&registry, true).unwrap();

    let mut seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 50);
    seen.sort_unstable();
    assert_eq!(seen, (0..50).collect::<Vec<_>>());
}

#[test]
fn test_soft_failures_do_not_stop_the_run() {
    let checks = Arc::new(Checks::new());
    let mut registry = TestRegistry::new();
    for index in 0..30usize {
        let checks = Arc::clone(&checks);
        registry.register_named(format!("check_{index}"), move || {
            checks.ok(index % 10 != 0, format!("index {index} divisible by ten"));
            if index == 29 {
                checks.skip("last test skips its second half");
            }
        });
    }

    let report = parallel_with(4).run(&registry).unwrap();
    assert!(report.is_success());

    let summary = checks.summary();
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.passed, 27);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_every_worker_is_reported() {
    let counter = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(64, &counter);

    let report = parallel_with(4).run(&registry).unwrap();

    assert_eq!(report.workers, 4);
    let ids: Vec<_> = report.worker_statistics.iter().map(|s| s.worker_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    for outcome in &report.outcomes {
        let worker = outcome.worker.expect("parallel outcome has a worker");
        assert!(worker < 4);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_parallel_runs_a_permutation(n in 0usize..300, workers in 1usize..9) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = index_logging_registry(n, &log);

        let report = parallel_with(workers).run(&registry).unwrap();

        let mut seen = log.lock().unwrap().clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
        prop_assert_eq!(report.executed(), n);
        prop_assert!(report.workers <= workers);
    }
}
