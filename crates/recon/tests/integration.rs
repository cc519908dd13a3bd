use std::path::PathBuf;

use combimatch_recon::{
    quick_check_possible, spawn_search, Cents, Item, Ledger, Position, SearchEvent, SearchParams,
    Solver,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn pool(values: &[&str]) -> Vec<Item> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Item::new(Cents::parse(v).unwrap(), Position::line(i)))
        .collect()
}

fn params(target: &str, tolerance: &str) -> SearchParams {
    SearchParams::new(Cents::parse(target).unwrap())
        .with_tolerance(Cents::parse(tolerance).unwrap())
}

fn sums(items: &[Item]) -> Vec<String> {
    items.iter().map(|i| i.value.to_string()).collect()
}

// -------------------------------------------------------------------------
// Matching
// -------------------------------------------------------------------------

#[test]
fn exact_target_finds_both_pairs() {
    let items = pool(&["100.00", "200.00", "300.00", "400.00"]);
    let params = params("500.00", "0").with_sizes(1, 4).with_max_results(10);
    let result = Solver::new(&items, &params).find_combinations();

    assert_eq!(result.total_found, 2);
    assert_eq!(result.combinations.len(), 2);
    assert_eq!(sums(result.combinations[0].items()), vec!["100.00", "400.00"]);
    assert_eq!(sums(result.combinations[1].items()), vec!["200.00", "300.00"]);
    for c in &result.combinations {
        assert_eq!(c.size(), 2);
        assert_eq!(c.difference_display(), "+0.00");
    }
}

#[test]
fn tolerance_window_adds_nothing_spurious() {
    let items = pool(&["100.00", "200.00", "300.00", "400.00"]);
    let params = params("500.00", "50").with_sizes(1, 4).with_max_results(10);
    let solver = Solver::new(&items, &params);

    let window = solver.window();
    assert_eq!(window.lower, Cents(45000));
    assert_eq!(window.upper, Cents(55000));

    let result = solver.find_combinations();
    assert_eq!(result.combinations.len(), 2);
    // 100 + 200 + 300 = 600 is outside the window.
    assert!(result.combinations.iter().all(|c| c.size() == 2));
}

#[test]
fn unreachable_target_checks_nothing() {
    let items = pool(&["1.00"; 10]);
    let params = params("100.00", "0").with_sizes(1, 10);
    let solver = Solver::new(&items, &params);

    assert!(solver.bounds().infeasible);
    assert!(!quick_check_possible(&items, params.window()));

    let result = solver.find_combinations();
    assert!(result.is_empty());
    assert_eq!(result.total_checked, 0);
    assert_eq!(result.total_found, 0);
}

#[test]
fn cap_stores_one_but_counts_all() {
    let toml = std::fs::read_to_string(fixtures_dir().join("pairs.search.toml")).unwrap();
    let params = SearchParams::from_toml(&toml).unwrap();
    let items = pool(&["11.00", "19.00", "12.00", "18.00", "13.00", "17.00"]);

    let result = Solver::new(&items, &params).find_combinations();
    assert_eq!(result.total_found, 3);
    assert_eq!(result.combinations.len(), 1);
    assert!(result.truncated());
    assert_eq!(sums(result.combinations[0].items()), vec!["11.00", "19.00"]);
}

// -------------------------------------------------------------------------
// Stream vs batch stopping
// -------------------------------------------------------------------------

fn two_singletons() -> (Vec<Item>, SearchParams) {
    let items = pool(&["10.00", "10.00", "3.00", "7.00"]);
    let params = params("10.00", "0").with_sizes(1, 4).with_max_results(1);
    (items, params)
}

#[test]
fn stream_stops_right_after_cap() {
    let (items, params) = two_singletons();
    let solver = Solver::new(&items, &params);
    let mut stream = solver.stream();

    let emitted: Vec<_> = stream.by_ref().collect();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].items()[0].position, Position::line(0));
    // Only the first size-1 candidate was evaluated.
    assert_eq!(stream.total_checked(), 1);
}

#[test]
fn batch_finishes_size_in_progress() {
    let (items, params) = two_singletons();
    let result = Solver::new(&items, &params).find_combinations();

    assert_eq!(result.combinations.len(), 1);
    assert_eq!(result.total_found, 2);
    // Every size-1 candidate, none of size 2.
    assert_eq!(result.total_checked, 4);
}

#[test]
fn background_search_matches_batch() {
    let items = pool(&["100.00", "200.00", "300.00", "400.00", "250.00", "250.00"]);
    let params = params("500.00", "0").with_sizes(1, 6).with_max_results(100);
    let batch = Solver::new(&items, &params).find_combinations();

    let handle = spawn_search(items.clone(), params).unwrap();
    let mut streamed = Vec::new();
    let mut finished = None;
    for event in handle.iter() {
        match event {
            SearchEvent::Match(c) => streamed.push(c),
            SearchEvent::Progress(_) => {}
            SearchEvent::Finished(summary) => finished = Some(summary),
        }
    }
    handle.join().unwrap();

    let summary = finished.unwrap();
    assert_eq!(summary.total_found, batch.total_found);
    assert_eq!(summary.total_checked, batch.total_checked);
    assert_eq!(streamed.len(), batch.combinations.len());
    for c in &streamed {
        assert!(batch.combinations.contains(c));
    }
}

// -------------------------------------------------------------------------
// Determinism + ledger
// -------------------------------------------------------------------------

#[test]
fn repeated_runs_are_identical() {
    let items = pool(&["1.25", "2.50", "3.75", "5.00", "6.25", "1.25", "2.50"]);
    let params = params("7.50", "0.25").with_sizes(1, 5).with_max_results(20);

    let first = Solver::new(&items, &params).find_combinations();
    let second = Solver::new(&items, &params).find_combinations();
    assert_eq!(first.combinations, second.combinations);
    assert_eq!(first.total_found, second.total_found);
}

#[test]
fn finalized_items_leave_the_pool() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("ledger.json");

    let mut items = pool(&["11.00", "19.00", "12.00", "18.00", "13.00", "17.00"]);
    let params = params("30.00", "0").with_sizes(1, 6).with_max_results(10);

    let first = Solver::new(&items, &params).find_combinations();
    assert_eq!(first.combinations.len(), 3);

    let mut ledger = Ledger::load(&ledger_path).unwrap();
    ledger.finalize(first.combinations[0].clone()).unwrap();
    ledger.save(&ledger_path).unwrap();

    let ledger = Ledger::load(&ledger_path).unwrap();
    ledger.apply(&mut items);
    assert_eq!(items.iter().filter(|i| i.consumed).count(), 2);

    let second = Solver::new(&items, &params).find_combinations();
    assert_eq!(second.combinations.len(), 2);
    assert_eq!(sums(second.combinations[0].items()), vec!["12.00", "18.00"]);
    assert!(second
        .combinations
        .iter()
        .all(|c| c.positions().all(|p| !ledger.is_consumed(p))));
}
