use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "immutable-mash workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmarks with and without the parallel feature
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

const BENCH: &str = "mash_benchmark";

/// Baseline name and the feature set it is measured with.
const CONFIGS: &[(&str, &[&str])] = &[("serial", &[]), ("parallel", &["parallel"])];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running benchmarks...");

    // Build first to avoid measuring build time
    println!("Compiling benchmarks...");
    let status = Command::new("cargo")
        .args(["build", "--bench", BENCH, "--release"])
        .status()?;
    if !status.success() {
        anyhow::bail!("Failed to compile benchmarks");
    }

    for (baseline, features) in CONFIGS {
        println!("\n>>> Benchmarking baseline: {baseline}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0");
        cmd.arg("bench").arg("--bench").arg(BENCH);
        if !features.is_empty() {
            cmd.arg("--features").arg(features.join(","));
        }

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        cmd.arg("--save-baseline").arg(baseline);

        if quick {
            cmd.arg("--measurement-time").arg("0.1");
            cmd.arg("--noplot");
            cmd.arg("--sample-size").arg("10");
        }

        let status = cmd.status().with_context(|| format!("Failed to run bench for {baseline}"))?;

        if status.success() {
            println!("Finished {baseline} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: Benchmark failed for {baseline}");
        }
    }

    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let mut results: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    collect_results(criterion_dir, criterion_dir, &mut results);

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }

    use std::io::Write;
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# Benchmark Report")?;
    writeln!(file)?;

    write!(file, "| Workload |")?;
    for (baseline, _) in CONFIGS {
        write!(file, " {baseline} (Ops/s) |")?;
    }
    writeln!(file, " parallel vs serial |")?;

    write!(file, "|---|")?;
    for _ in CONFIGS {
        write!(file, "---|")?;
    }
    writeln!(file, "---|")?;

    for (workload, by_baseline) in &results {
        write!(file, "| {workload} |")?;
        for (baseline, _) in CONFIGS {
            match by_baseline.get(*baseline) {
                Some(ops) => write!(file, " {} |", format_ops(*ops))?,
                None => write!(file, " N/A |")?,
            }
        }
        match (by_baseline.get("serial"), by_baseline.get("parallel")) {
            (Some(serial), Some(parallel)) if *serial > 0.0 => {
                writeln!(file, " **{:.2}x** |", parallel / serial)?;
            }
            _ => writeln!(file, " - |")?,
        }
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|s| s.to_str()).map(str::to_owned)
}

/// Walks criterion output. Layout: `<root>/<group>/<bench>[/<param>]/<baseline>/estimates.json`.
fn collect_results(root: &Path, dir: &Path, results: &mut BTreeMap<String, BTreeMap<String, f64>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(root, &path, results);
            continue;
        }
        if file_name(&path).as_deref() != Some("estimates.json") {
            continue;
        }

        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let Some(baseline) = file_name(baseline_dir) else { continue };
        if !CONFIGS.iter().any(|(name, _)| *name == baseline) {
            continue;
        }
        let Ok(workload) = workload_dir.strip_prefix(root) else { continue };
        let workload = workload.to_string_lossy().replace('\\', "/");

        if let Some(metric) = read_metric(workload_dir, &path) {
            results.entry(workload).or_default().insert(baseline, metric);
        }
    }
}

/// Ops per second, scaled by declared element throughput when present.
fn read_metric(workload_dir: &Path, estimates: &Path) -> Option<f64> {
    let elements = fs::read_to_string(workload_dir.join("benchmark.json"))
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .and_then(|json| json.get("throughput")?.get("Elements")?.as_f64());

    let content = fs::read_to_string(estimates).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    let time_ns = json.get("mean")?.get("point_estimate")?.as_f64()?;
    if time_ns <= 0.0 {
        return None;
    }
    Some(elements.unwrap_or(1.0) * 1e9 / time_ns)
}
