//! Cache statistics analyzer for triangle generation.
//!
//! Generates the same triangle twice with a disk cache, once cold and once
//! warm, and reports the cache counters and per-method timings of each run.
//!
//! Run with:
//! ```bash
//! cargo run --release --example cache_stats -- [n_max] --alpha 1 --beta 1
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use stirling_rs::config::EngineConfig;
use stirling_rs::engine::Engine;
use stirling_rs::triangle::generate_triangle_parallel;
use stirling_rs::types::Params;

#[derive(Debug, Parser)]
#[command(author, version, about = "Cache statistics analyzer for generalized Stirling numbers")]
struct Cli {
    /// Largest row of the triangle
    #[arg(default_value = "60")]
    n_max: u64,

    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    alpha: f64,

    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    beta: f64,

    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    r: f64,

    /// Disk cache directory (defaults to a fresh directory under the system temp dir)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Number of parallel workers for the final run
    #[arg(long, default_value = "4")]
    workers: usize,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let params = Params::with_shift(cli.alpha, cli.beta, cli.r)?;
    let dir = cli.cache_dir.unwrap_or_else(|| {
        std::env::temp_dir().join(format!("stirling-cache-stats-{}", std::process::id()))
    });
    let config = EngineConfig::default().with_disk_cache(&dir);

    println!("=== Stirling Cache Statistics Analyzer ===\n");
    println!("Parameters: {}", params);
    println!("Triangle:   n <= {}", cli.n_max);
    println!("Cache dir:  {}\n", dir.display());

    println!(
        "{:>8} {:>12} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Run", "Time (ms)", "Mem hits", "Mem miss", "Disk hits", "Writes", "Hit rate"
    );
    println!("{}", "-".repeat(76));

    let mut last = None;
    for run in ["cold", "warm"] {
        let engine = Engine::new(params, config.clone());
        let start = Instant::now();
        let table = engine.generate_triangle(cli.n_max, false)?;
        let elapsed = start.elapsed();
        let stats = engine.stats();
        println!(
            "{:>8} {:>12.2} {:>10} {:>10} {:>10} {:>10} {:>9.1}%",
            run,
            elapsed.as_secs_f64() * 1000.0,
            stats.cache.memory_hits,
            stats.cache.memory_misses,
            stats.cache.disk_hits,
            stats.cache.disk_writes,
            100.0 * stats.cache.hit_rate()
        );
        if run == "cold" {
            println!("\n{}", stats);
        }
        last = Some(table);
    }

    let start = Instant::now();
    let parallel = generate_triangle_parallel(params, &config, cli.n_max, cli.workers, false)?;
    println!(
        "\nParallel run with {} workers: {:.2} ms, identical = {}",
        cli.workers,
        start.elapsed().as_secs_f64() * 1000.0,
        last.as_ref() == Some(&parallel)
    );

    let engine = Engine::new(params, config);
    let removed = engine.clear_disk_cache()?;
    println!("Removed {} cache entries", removed);

    Ok(())
}
