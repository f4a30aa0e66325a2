use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use bodycomp::error::ScenarioError;
use bodycomp::scenario::{Partitioning, ScenarioOutcome, evaluate_scenarios, load_scenarios};

/// Body composition projection for cuts and bulks.
#[derive(Parser, Debug)]
#[command(name = "bodycomp")]
#[command(about = "Projects FFMI and body fat % for a target weight from training and diet inputs")]
#[command(version)]
struct Args {
    /// Path to the JSON scenario file.
    /// Can also be set via BODYCOMP_FILE environment variable.
    #[arg(value_name = "FILE", env = "BODYCOMP_FILE")]
    file: PathBuf,

    /// Print results as JSON instead of a text summary.
    #[arg(long)]
    json: bool,

    /// Only evaluate the scenario with this name.
    #[arg(long, value_name = "NAME")]
    scenario: Option<String>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut file = load_scenarios(&args.file)
        .with_context(|| format!("Failed to load scenarios from {}", args.file.display()))?;

    if let Some(name) = &args.scenario {
        file.scenarios.retain(|s| &s.name == name);
        if file.scenarios.is_empty() {
            anyhow::bail!("No scenario named '{}' in {}", name, args.file.display());
        }
    }

    log::info!(
        "Evaluating {} scenario(s) from {}",
        file.scenarios.len(),
        args.file.display()
    );

    let results = evaluate_scenarios(&file);

    if args.json {
        print_json(&results)?;
    } else {
        for result in &results {
            match result {
                Ok(outcome) => print_outcome(outcome),
                Err(e) => {
                    log::error!("{}", e);
                    println!();
                    println!("!!! {}", e);
                }
            }
        }
    }

    ensure_all_succeeded(&results)
}

/// Fails when any scenario failed, so the exit status reflects it.
fn ensure_all_succeeded(results: &[Result<ScenarioOutcome, ScenarioError>]) -> Result<()> {
    let failures = results.iter().filter(|r| r.is_err()).count();
    if failures > 0 {
        anyhow::bail!("{} of {} scenarios failed", failures, results.len());
    }

    Ok(())
}

/// Prints all results as one JSON array; failed scenarios become `{"error": ...}`.
fn print_json(results: &[Result<ScenarioOutcome, ScenarioError>]) -> Result<()> {
    let values = results
        .iter()
        .map(|r| match r {
            Ok(outcome) => serde_json::to_value(outcome),
            Err(e) => Ok(serde_json::json!({ "error": e.to_string() })),
        })
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to serialize results")?;

    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

/// Prints a text summary for one scenario.
fn print_outcome(outcome: &ScenarioOutcome) {
    let projection = &outcome.projection;

    println!();
    println!("=== {} ===", outcome.name);
    println!();

    match &outcome.partitioning {
        Partitioning::Loss(loss) => {
            println!(
                "P-ratio: {:.2} (range {:.2} to {:.2})",
                loss.final_p_ratio, loss.confidence_range.low, loss.confidence_range.high
            );
        }
        Partitioning::Gain(gain) => {
            println!(
                "Muscle gain ratio: {:.2} (range {:.2} to {:.2})",
                gain.muscle_gain_ratio, gain.confidence_range.low, gain.confidence_range.high
            );
        }
    }

    if !projection.factors.is_empty() {
        println!();
        for factor in &projection.factors {
            println!("  - {}", factor);
        }
    }

    println!();
    println!("{:15} {:>8} {:>8}", "Scenario", "FFMI", "BF%");
    let rows = [
        ("Pessimistic", projection.ffmi.pessimistic, projection.body_fat_percent.pessimistic),
        ("Expected", projection.ffmi.expected, projection.body_fat_percent.expected),
        ("Optimistic", projection.ffmi.optimistic, projection.body_fat_percent.optimistic),
    ];
    for (label, ffmi, bf) in rows {
        println!("{:15} {:>8.1} {:>8.1}", label, ffmi, bf);
    }

    println!();
    println!("Confidence: {}", projection.confidence_level);
}
