//! Banker's Algorithm Simulator CLI
//!
//! Run the safety simulation on a problem file, the built-in scenarios, or
//! seeded random problems, and replay the resulting trace step by step.

use banker_core::PlaybackController;
use banker_sim::player::{autoplay, DEFAULT_STEP_DELAY};
use banker_sim::report::{render_step, render_transition};
use banker_sim::scenarios::ScenarioId;
use banker_sim::{Problem, ScenarioResult, ScenarioRunner, SimError, TraceExport};
use clap::Parser;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Banker's Algorithm safety simulator
#[derive(Parser, Debug)]
#[command(name = "banker-sim")]
#[command(about = "Check Banker's Algorithm safety and replay the resource flow", long_about = None)]
struct Args {
    /// JSON problem file with `allocation`, `max` and `available`
    #[arg(long)]
    problem: Option<String>,

    /// Scenario to run (textbook, no_fit, trivial, all_eligible, partial_stall, multi_pass, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Run seeded random problems instead of scenarios
    #[arg(long)]
    random: bool,

    /// Master seed for random problems (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of consecutive seeds to run (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Processes per random problem
    #[arg(short, long, default_value = "5")]
    processes: usize,

    /// Resource types per random problem
    #[arg(short, long, default_value = "3")]
    resources: usize,

    /// Print every step of every run
    #[arg(long)]
    trace: bool,

    /// Auto-advance through the steps of a single run
    #[arg(long)]
    play: bool,

    /// Delay between steps during --play, in milliseconds
    #[arg(long, default_value_t = DEFAULT_STEP_DELAY.as_millis() as u64)]
    speed_ms: u64,

    /// Export the trace of a single run to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Banker's Algorithm Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    match run(&args).await {
        Ok(0) => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Runs everything the flags ask for and returns the number of failed runs.
async fn run(args: &Args) -> Result<usize, SimError> {
    let results = collect_results(args)?;
    let failed_count = results.iter().filter(|r| !r.passed).count();

    if (args.export.is_some() || args.play) && results.len() != 1 {
        return Err(SimError::usage(
            "--export and --play need a single run (use --problem, one --scenario, or --seeds 1)",
        ));
    }

    if let Some(path) = &args.export {
        let result = &results[0];
        if let Some(report) = &result.report {
            TraceExport::from_report(&result.label, result.seed, report).write_to_file(path)?;
            info!("Exported {} steps to {}", report.steps.len(), path);
        }
    }

    if args.trace {
        for result in &results {
            print_trace(result);
        }
    }

    if args.play {
        if let Some(report) = &results[0].report {
            let mut playback = PlaybackController::new();
            playback.load(report.steps.clone());
            let delay = Duration::from_millis(args.speed_ms);
            autoplay(&mut playback, delay, |p, transition| {
                if let Some(t) = transition {
                    println!("{}", render_transition(t));
                }
                if let Some(step) = p.current() {
                    println!("{}", render_step(step, p.previous(), p.current_index(), p.total()));
                }
            })
            .await;
        }
    }

    if args.json {
        print_json_summary(&results, failed_count)?;
    } else {
        print_summary(&results, failed_count);
    }

    Ok(failed_count)
}

fn collect_results(args: &Args) -> Result<Vec<ScenarioResult>, SimError> {
    let runner = ScenarioRunner::new()
        .with_processes(args.processes)
        .with_resources(args.resources);

    if let Some(path) = &args.problem {
        let problem = Problem::load(path)?;
        return Ok(vec![runner.run_problem(path, &problem)]);
    }

    if args.random {
        if args.seeds == 0 {
            return Err(SimError::usage("--seeds must be at least 1"));
        }

        // Determine base seed
        let base_seed = if args.seed == 0 {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(1)
        } else {
            args.seed
        };

        return Ok((0..args.seeds)
            .map(|offset| runner.run_random(base_seed.wrapping_add(offset as u64)))
            .collect());
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse::<ScenarioId>().map_err(|e| {
            SimError::usage(format!(
                "{} (available: textbook, no_fit, trivial, all_eligible, partial_stall, multi_pass, all)",
                e
            ))
        })?]
    };

    Ok(scenarios.into_iter().map(|s| runner.run(s)).collect())
}

fn print_trace(result: &ScenarioResult) {
    let Some(report) = &result.report else {
        return;
    };
    println!("━━ {} ━━ {} | {}", result.label, report.verdict(), report.sequence_label());
    for (index, step) in report.steps.iter().enumerate() {
        let prev = index.checked_sub(1).map(|i| &report.steps[i]);
        println!("{}", render_step(step, prev, index, report.steps.len()));
    }
}

fn print_json_summary(results: &[ScenarioResult], failed_count: usize) -> Result<(), SimError> {
    let total = results.len();
    let summary = serde_json::json!({
        "total": total,
        "passed": total - failed_count,
        "failed": failed_count,
        "results": results.iter().map(|r| {
            serde_json::json!({
                "scenario": r.label,
                "seed": r.seed,
                "passed": r.passed,
                "safe": r.safe,
                "sequence": r.sequence,
                "steps": r.metrics.steps,
                "passes": r.metrics.passes,
                "failure_reason": r.failure_reason,
            })
        }).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_summary(results: &[ScenarioResult], failed_count: usize) {
    for result in results {
        let seed = result.seed.map(|s| format!(" (seed={})", s)).unwrap_or_default();
        let verdict = match &result.report {
            Some(report) => format!("{}: {}", report.verdict(), report.sequence_label()),
            None => "rejected".to_string(),
        };
        if result.passed {
            info!("✓ {}{} PASSED | {}", result.label, seed, verdict);
        } else {
            error!(
                "✗ {}{} FAILED: {}",
                result.label,
                seed,
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    let total = results.len();
    info!("");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if failed_count == 0 {
        info!("✅ All {} run(s) passed!", total);
    } else {
        error!("❌ {}/{} run(s) failed!", failed_count, total);
    }
}
