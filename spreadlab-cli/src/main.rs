//! SpreadLab CLI — run, batch, and synthetic data commands.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config file
//! - `batch` — sweep lookback, cadence and strategy over the config's series
//! - `synth` — write a seeded synthetic pair to CSV

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use spreadlab_core::synthetic::{generate_pair, SyntheticPairConfig};
use spreadlab_core::StrategyConfig;
use spreadlab_runner::{
    export_bars_csv, export_batch_csv, leaderboard, load_pair, run_batch, run_from_config,
    save_artifacts, BacktestConfig, BacktestReport, ParamGrid,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "spreadlab", about = "SpreadLab CLI — pairs-trading backtest engine")]
struct Cli {
    /// Log filter (e.g. info, debug, spreadlab_core=trace). RUST_LOG wins if set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for report.json and series.csv.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only, write no artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Run a parameter grid in parallel over the config's series.
    Batch {
        /// Path to a TOML config file (data section and base engine).
        #[arg(long)]
        config: PathBuf,

        /// Lookbacks to sweep, comma separated.
        #[arg(long, value_delimiter = ',')]
        lookbacks: Vec<usize>,

        /// Rebalance periods to sweep, comma separated.
        #[arg(long, value_delimiter = ',')]
        rebalance: Vec<usize>,

        /// Strategies to sweep at their default options.
        #[arg(long, value_enum, value_delimiter = ',')]
        strategies: Vec<StrategyName>,

        /// Write the full summary table to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Rows of the leaderboard to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Write a seeded synthetic pair to CSV.
    Synth {
        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value_t = 5_000)]
        bars: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Leg A tracks this multiple of leg B; must be positive.
        #[arg(long, default_value_t = 1.0)]
        hedge_ratio: f64,

        /// AR(1) coefficient of the spread, in [0, 1).
        #[arg(long, default_value_t = 0.95)]
        persistence: f64,

        #[arg(long, default_value = "A")]
        leg_a: String,

        #[arg(long, default_value = "B")]
        leg_b: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyName {
    ZScore,
    Ecm,
    RotatedBand,
}

impl StrategyName {
    fn defaults(self) -> StrategyConfig {
        match self {
            StrategyName::ZScore => StrategyConfig::zscore_default(),
            StrategyName::Ecm => StrategyConfig::ecm_default(),
            StrategyName::RotatedBand => StrategyConfig::rotated_band_default(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            no_save,
        } => run_cmd(config, output_dir, no_save),
        Commands::Batch {
            config,
            lookbacks,
            rebalance,
            strategies,
            output,
            top,
        } => {
            let grid = ParamGrid {
                lookbacks,
                rebalance_periods: rebalance,
                strategies: strategies.into_iter().map(StrategyName::defaults).collect(),
            };
            batch_cmd(config, grid, output, top)
        }
        Commands::Synth {
            output,
            bars,
            seed,
            hedge_ratio,
            persistence,
            leg_a,
            leg_b,
        } => synth_cmd(
            output,
            SyntheticPairConfig {
                bars,
                seed,
                hedge_ratio,
                persistence,
                ..Default::default()
            },
            &leg_a,
            &leg_b,
        ),
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_cmd(config_path: PathBuf, output_dir: PathBuf, no_save: bool) -> Result<()> {
    let config = BacktestConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let report = run_from_config(&config)?;

    print_summary(&report);

    if !no_save {
        let run_dir = save_artifacts(&report, &output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn batch_cmd(
    config_path: PathBuf,
    grid: ParamGrid,
    output: Option<PathBuf>,
    top: usize,
) -> Result<()> {
    let config = BacktestConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let pair = load_pair(&config.data)
        .with_context(|| format!("loading {}", config.data.path.display()))?;

    let grid = if grid.lookbacks.is_empty()
        && grid.rebalance_periods.is_empty()
        && grid.strategies.is_empty()
    {
        ParamGrid::default_sweep()
    } else {
        grid
    };
    let engines = grid.generate_configs(&config.engine);
    let results = run_batch(&config, &pair, &engines);

    for (engine, result) in engines.iter().zip(&results) {
        if let Err(e) = result {
            eprintln!(
                "skipped {} lookback={} rebalance={}: {e}",
                engine.strategy.name(),
                engine.lookback,
                engine.rebalance_period
            );
        }
    }

    let rows = leaderboard(&results);
    if rows.is_empty() {
        bail!("every batch run failed");
    }

    println!();
    println!(
        "{:<14} {:>8} {:>9} {:>14} {:>10} {:>14} {:>8}",
        "Strategy", "Lookback", "Rebalance", "Final PnL", "Sharpe", "Max DD", "Trades"
    );
    println!("{}", "-".repeat(83));
    for row in rows.iter().take(top) {
        println!(
            "{:<14} {:>8} {:>9} {:>14.2} {:>10.3} {:>14.2} {:>8}",
            row.strategy,
            row.lookback,
            row.rebalance_period,
            row.final_pnl,
            row.sharpe,
            row.max_drawdown,
            row.trade_count
        );
    }

    if let Some(path) = output {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        export_batch_csv(&rows, std::io::BufWriter::new(file))?;
        println!("Summary written to: {}", path.display());
    }
    Ok(())
}

fn synth_cmd(output: PathBuf, config: SyntheticPairConfig, leg_a: &str, leg_b: &str) -> Result<()> {
    config.validate().context("invalid synthetic pair settings")?;
    if leg_a == leg_b {
        bail!("leg names must differ");
    }
    let bars = generate_pair(&config);
    let file = std::fs::File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    export_bars_csv(&bars, leg_a, leg_b, std::io::BufWriter::new(file))?;
    info!(bars = bars.len(), seed = config.seed, path = %output.display(), "wrote synthetic pair");
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let m = &report.metrics;
    println!();
    println!("=== Backtest Result ===");
    println!("Pair:           {} / {}", report.leg_a, report.leg_b);
    println!("Strategy:       {}", report.result.strategy);
    println!(
        "Period:         {} to {}",
        report.start.as_deref().unwrap_or("-"),
        report.end.as_deref().unwrap_or("-")
    );
    println!(
        "Bars:           {} ({} active)",
        report.bar_count, m.active_bars
    );
    println!("Run id:         {}", report.run_id);
    println!();
    println!("--- Performance ---");
    println!("Final PnL:      {:.2}", m.final_pnl);
    println!("Max Drawdown:   {:.2}", m.max_drawdown);
    println!("Sharpe:         {:.3}", m.sharpe);
    println!("Trades:         {}", m.trade_count);
    println!("Direction Chg:  {}", m.direction_changes);
    println!("Rejected:       {}", m.rejected_trades);
    println!("Half-life:      {:.1} bars", m.spread_half_life);
    println!("Spread Vol:     {:.4}", m.spread_volatility);
    if report.result.insufficient_data {
        println!();
        println!("WARNING: fewer bars than the lookback, nothing traded");
    }
    println!();
}
