//! `combimatch find` / `combimatch check` — search an amount list for a target.

use std::io::{self, Read};
use std::path::PathBuf;

use combimatch_config::{InputMode, Settings};
use combimatch_recon::feasibility::{available_total, estimate_combinations};
use combimatch_recon::{
    quick_check_possible, spawn_search, Cents, Combination, Item, Ledger, SearchEvent,
    SearchParams, SearchResult, Solver,
};

use crate::exit_codes::{EXIT_INFEASIBLE, EXIT_LEDGER_CONFLICT, EXIT_NO_MATCH};
use crate::parse::{parse_comma_separated, parse_csv_column, parse_line_separated};
use crate::{CliError, InputArgs, SearchArgs};

pub fn cmd_find(
    settings: &Settings,
    input: InputArgs,
    search: SearchArgs,
    stream: bool,
    json: bool,
    ledger_path: Option<PathBuf>,
    finalize: Option<usize>,
) -> Result<(), CliError> {
    if stream && finalize.is_some() {
        return Err(CliError::args("--finalize cannot be combined with --stream")
            .with_hint("run without --stream to get a stable, sorted result list"));
    }

    let params = build_params(settings, &search)?;
    let ledger_file = ledger_path.unwrap_or_else(|| settings.ledger_file());
    let mut ledger = Ledger::load(&ledger_file)?;

    let mut items = load_items(settings, &input)?;
    ledger.apply(&mut items);

    if !quick_check_possible(&items, params.window()) {
        return Err(unreachable_error(&items, &params));
    }

    let solver = Solver::new(&items, &params);
    if solver.bounds().infeasible {
        return Err(unreachable_error(&items, &params));
    }

    if stream {
        return run_stream(items, params, json);
    }

    let result = solver.find_combinations_with_progress(|p| {
        log::trace!("size {}: {} candidates checked", p.size, p.checked);
    });

    if json {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        print_result(&result);
    }

    if result.is_empty() {
        return Err(CliError::new(EXIT_NO_MATCH, "no combination found"));
    }

    if let Some(n) = finalize {
        let Some(chosen) = n.checked_sub(1).and_then(|i| result.combinations.get(i)) else {
            return Err(CliError::new(
                EXIT_LEDGER_CONFLICT,
                format!("result {n} does not exist ({} listed)", result.combinations.len()),
            ));
        };
        let entry = ledger.finalize(chosen.clone())?;
        eprintln!(
            "finalized #{}: {} -> {}",
            entry.finalized_at + 1,
            entry.combination,
            ledger_file.display()
        );
        ledger.save(&ledger_file)?;
    }

    Ok(())
}

pub fn cmd_check(
    settings: &Settings,
    input: InputArgs,
    search: SearchArgs,
    ledger_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let params = build_params(settings, &search)?;
    let ledger_file = ledger_path.unwrap_or_else(|| settings.ledger_file());
    let ledger = Ledger::load(&ledger_file)?;

    let mut items = load_items(settings, &input)?;
    ledger.apply(&mut items);
    let consumed = items.iter().filter(|i| i.consumed).count();

    let possible = quick_check_possible(&items, params.window());
    let solver = Solver::new(&items, &params);
    let bounds = solver.bounds();
    let window = solver.window();
    let candidates = if bounds.infeasible {
        0
    } else {
        estimate_combinations(solver.pool_len(), bounds.effective_min, bounds.effective_max)
    };

    if json {
        let report = serde_json::json!({
            "available": solver.pool_len(),
            "consumed": consumed,
            "available_total": available_total(&items),
            "window": { "lower": window.lower, "upper": window.upper },
            "possible": possible,
            "bounds": bounds,
            // u128 does not fit every JSON reader
            "estimated_candidates": candidates.to_string(),
        });
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        println!(
            "items:       {} available ({} consumed), total {}",
            solver.pool_len(),
            consumed,
            available_total(&items)
        );
        println!("window:      [{}, {}]", window.lower, window.upper);
        println!("pre-check:   {}", if possible { "possible" } else { "impossible" });
        println!(
            "sizes:       requested {}..={}, effective {}..={}",
            bounds.requested_min, bounds.requested_max, bounds.effective_min, bounds.effective_max
        );
        if !bounds.skipped_sizes.is_empty() {
            println!("skipped:     {}", join_sizes(bounds.skipped_sizes.iter().copied()));
        }
        println!("candidates:  {candidates}");
    }

    if !possible || bounds.infeasible {
        return Err(CliError::new(EXIT_INFEASIBLE, ""));
    }
    Ok(())
}

// ============================================================================
// Streaming
// ============================================================================

fn run_stream(items: Vec<Item>, params: SearchParams, json: bool) -> Result<(), CliError> {
    let handle = spawn_search(items, params)?;
    let mut shown = 0usize;
    let mut summary = None;

    for event in handle.iter() {
        match event {
            SearchEvent::Match(combination) => {
                shown += 1;
                if json {
                    let line = serde_json::to_string(&combination)
                        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
                    println!("{line}");
                } else {
                    println!("{:>3}. {}", shown, describe(&combination));
                }
            }
            SearchEvent::Progress(p) => {
                log::trace!("size {}: {} candidates checked", p.size, p.checked);
            }
            SearchEvent::Finished(s) => summary = Some(s),
        }
    }
    handle.join()?;

    if let Some(s) = summary {
        eprintln!(
            "{} found, {} candidates checked{}",
            s.total_found,
            s.total_checked,
            if s.cancelled { " (stopped)" } else { "" }
        );
        if s.total_found == 0 {
            return Err(CliError::new(EXIT_NO_MATCH, "no combination found"));
        }
    }
    Ok(())
}

// ============================================================================
// Input + parameters
// ============================================================================

fn build_params(settings: &Settings, search: &SearchArgs) -> Result<SearchParams, CliError> {
    let target = Cents::parse(&search.target)
        .map_err(|_| CliError::args(format!("target must be a number, got '{}'", search.target)))?;

    let mut params = settings.search_params(target);
    if let Some(tolerance) = &search.tolerance {
        params.tolerance = Cents::parse(tolerance)
            .map_err(|_| CliError::args(format!("tolerance must be a number, got '{tolerance}'")))?;
    }
    if let Some(min_size) = search.min_size {
        params.min_size = min_size;
    }
    if let Some(max_size) = search.max_size {
        params.max_size = max_size;
    }
    if let Some(max_results) = search.max_results {
        params.max_results = max_results;
    }

    params.validate()?;
    Ok(params)
}

fn load_items(settings: &Settings, input: &InputArgs) -> Result<Vec<Item>, CliError> {
    let text = match &input.input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::io(format!("cannot read stdin: {e}")))?;
            buf
        }
    };

    let mode = input.mode.map(InputMode::from).unwrap_or(settings.input_mode);
    let parsed = match mode {
        InputMode::Line => parse_line_separated(&text),
        InputMode::Comma => parse_comma_separated(&text),
        InputMode::Csv => {
            let column = input.column.as_deref().or(settings.csv_column.as_deref());
            parse_csv_column(&text, column, settings.has_headers && !input.no_headers)?
        }
    };

    for error in &parsed.errors {
        eprintln!("warning: {error}");
    }
    if parsed.items.is_empty() {
        return Err(CliError::parse("no amounts found in input")
            .with_hint(format!("input was read as {} mode; try --mode", mode.as_str())));
    }

    log::info!("loaded {} amounts ({} rejected)", parsed.items.len(), parsed.errors.len());
    Ok(parsed.items)
}

fn unreachable_error(items: &[Item], params: &SearchParams) -> CliError {
    let window = params.window();
    CliError::new(
        EXIT_INFEASIBLE,
        format!("no combination can reach [{}, {}]", window.lower, window.upper),
    )
    .with_hint(format!(
        "{} available amounts total {}",
        items.iter().filter(|i| !i.consumed).count(),
        available_total(items)
    ))
}

// ============================================================================
// Output
// ============================================================================

/// `#1 100.00, #4 400.00` in input order.
fn item_list(combination: &Combination) -> String {
    combination
        .items_in_original_order()
        .iter()
        .map(|i| format!("{} {}", i.position, i.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(combination: &Combination) -> String {
    format!(
        "{} = {} ({})",
        item_list(combination),
        combination.sum(),
        combination.difference_display()
    )
}

fn join_sizes(sizes: impl Iterator<Item = usize>) -> String {
    sizes.map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
}

fn print_result(result: &SearchResult) {
    let target = result.target;
    let tolerance = result.tolerance;
    if tolerance == Cents::ZERO {
        println!("target {target}");
    } else {
        println!("target {target} ± {tolerance}");
    }

    if result.is_empty() {
        println!("no combination found ({} candidates checked)", result.total_checked);
    } else {
        println!("{:>4}  {:>4}  {:>12}  {:>10}  items", "#", "size", "sum", "diff");
        for (i, c) in result.combinations.iter().enumerate() {
            println!(
                "{:>4}  {:>4}  {:>12}  {:>10}  {}",
                i + 1,
                c.size(),
                c.sum().to_string(),
                c.difference_display(),
                item_list(c)
            );
        }
    }

    if result.truncated() {
        eprintln!(
            "note: showing {} of {} matches (raise --max-results to keep more)",
            result.combinations.len(),
            result.total_found
        );
    }
    if !result.bounds.skipped_sizes.is_empty() {
        eprintln!(
            "note: sizes {} cannot reach the target and were skipped",
            join_sizes(result.bounds.skipped_sizes.iter().copied())
        );
    }
    if result.cancelled {
        eprintln!("note: search stopped early");
    }
    eprintln!(
        "{} found, {} candidates checked",
        result.total_found, result.total_checked
    );
}
