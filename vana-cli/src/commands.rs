use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use vana_config::VanaConfig;
use vana_core::{HabitIndex, IndexOptions};
use vana_telemetry::metrics::MetricsRecorder;

use crate::error::CliError;

const DEMO_HABITS: [&str; 3] = ["Träning", "Läsning", "Meditation"];

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed demo habits and append entries from concurrent workers
    Demo(DemoArgs),
    /// Time insert/append/lookup loops and dump the metrics registry
    Bench(BenchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Entries each worker appends
    #[arg(long, default_value_t = 5)]
    pub entries: usize,
    /// Worker thread count (default: one per CPU)
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Habits to insert
    #[arg(long, default_value_t = 100)]
    pub habits: usize,
    /// Entries to append, round-robin over the habits
    #[arg(long, default_value_t = 1000)]
    pub entries: usize,
    /// Lookups to time
    #[arg(long, default_value_t = 10000)]
    pub lookups: usize,
}

pub fn run_command(cli: Cli, config: VanaConfig) -> Result<(), CliError> {
    let options = IndexOptions {
        arena_capacity: config.core.arena.capacity,
        buckets: config.core.index.buckets,
    };

    match cli.command {
        Commands::Demo(args) => run_demo(options, args),
        Commands::Bench(args) => run_bench(options, args, config.telemetry.metrics_enabled),
    }
}

fn run_demo(options: IndexOptions, args: DemoArgs) -> Result<(), CliError> {
    let index = HabitIndex::new(options)?;
    for name in DEMO_HABITS {
        index.insert(name)?;
    }

    let workers = args.workers.unwrap_or_else(num_cpus::get).max(1);
    let entries = args.entries;
    info!(workers, entries, "starting demo workers");

    crossbeam::thread::scope(|s| {
        for worker in 0..workers {
            let index = &index;
            s.spawn(move |_| {
                let name = DEMO_HABITS[worker % DEMO_HABITS.len()];
                let habit = match index.lookup(name) {
                    Ok(habit) => habit,
                    Err(e) => {
                        warn!(worker, error = %e, "demo worker found no habit");
                        return;
                    }
                };
                for _ in 0..entries {
                    if let Err(e) = index.append_entry(&habit) {
                        warn!(worker, error = %e, "append failed");
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
            });
        }
    })
    .map_err(|_| CliError::WorkerPanic)?;

    for name in DEMO_HABITS {
        let habit = index.lookup(name)?;
        let stats = index.stats(&habit);
        info!(
            habit = %stats.name,
            entries = stats.entry_count,
            streak = stats.streak,
            completion_rate = format!("{:.2}%", stats.completion_rate),
            last_entry = stats.last_entry.as_deref().unwrap_or("-"),
            "habit stats"
        );
    }
    Ok(())
}

fn run_bench(options: IndexOptions, args: BenchArgs, emit_metrics: bool) -> Result<(), CliError> {
    let metrics = MetricsRecorder::new();
    let index = HabitIndex::new(options)?;
    let habits = args.habits.max(1);

    let start = Instant::now();
    for i in 0..habits {
        index.insert(&format!("habit_{}", i))?;
        metrics.habits_inserted.inc();
    }
    let after_insert = Instant::now();
    info!(
        habits,
        elapsed_ms = (after_insert - start).as_millis() as u64,
        "insert phase"
    );

    for i in 0..args.entries {
        let habit = index.lookup(&format!("habit_{}", i % habits))?;
        match index.append_entry(&habit) {
            Ok(()) => metrics.entries_appended.inc(),
            Err(e) => warn!(error = %e, "append failed"),
        }
    }
    let after_entries = Instant::now();
    info!(
        entries = args.entries,
        elapsed_ms = (after_entries - after_insert).as_millis() as u64,
        "append phase"
    );

    for i in 0..args.lookups {
        let t = Instant::now();
        let _ = index.lookup(&format!("habit_{}", i % habits));
        metrics.lookup_latency.observe(t.elapsed().as_nanos() as f64);
        metrics.lookups.inc();
    }
    let after_lookups = Instant::now();
    info!(
        lookups = args.lookups,
        elapsed_ms = (after_lookups - after_entries).as_millis() as u64,
        "lookup phase"
    );

    info!(
        total_ms = (after_lookups - start).as_millis() as u64,
        bytes_in_use = index.arena_stats().bytes_in_use(),
        failed_allocations = index.arena_stats().failed_allocations(),
        "benchmark complete"
    );

    if emit_metrics {
        println!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}
