// Trade suggester entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout carries the report)
// 2. Load config
// 3. Load the league asset pool
// 4. Resolve the outgoing assets from the command line
// 5. Run the suggestion pipeline and print the report

use std::path::PathBuf;
use std::sync::Mutex;

use trade_suggest::config;
use trade_suggest::league::asset::Asset;
use trade_suggest::league::ingest;
use trade_suggest::league::pool::AssetPool;
use trade_suggest::trade::suggest::{suggest_trades, TradeRequest, TradeSuggestions};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use tracing::info;

/// Find trades of comparable value for one or more of your assets.
#[derive(Parser, Debug)]
#[command(name = "trade-suggest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Asset ids or player names to trade away (all from one roster)
    #[arg(required = true)]
    assets: Vec<String>,

    /// Only show combinations with a member whose name contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Pool JSON file (overrides data.pool from config)
    #[arg(long)]
    pool: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Initialize tracing
    let log_path = init_tracing()?;
    info!("Trade suggester starting up, logging to {}", log_path.display());

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: tolerance {}%, combo sizes {:?}, QB premium {} for top {}",
        config.matching.tolerance_pct,
        config.matching.combo_sizes,
        config.qb_premium.amount,
        config.qb_premium.top_n
    );

    // 3. Load the pool
    let pool_path = cli
        .pool
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data_paths.pool));
    let pool = ingest::load_pool(&pool_path)
        .with_context(|| format!("failed to load asset pool from {}", pool_path.display()))?;

    // 4. Resolve outgoing assets
    let outgoing = resolve_args(&pool, &cli.assets)?;
    let mut request = TradeRequest::new(outgoing.iter().map(|a| a.id.clone()));
    if let Some(filter) = &cli.filter {
        request = request.with_name_filter(filter.as_str());
    }

    // 5. Suggest and report
    let settings = config.match_settings();
    let suggestions =
        suggest_trades(&pool, &request, &settings).context("failed to compute suggestions")?;
    print_report(&suggestions);

    info!("Trade suggester finished");
    Ok(())
}

/// Resolve each argument as an asset id first, then as a case-insensitive
/// display name.
fn resolve_args<'a>(pool: &'a AssetPool, args: &[String]) -> anyhow::Result<Vec<&'a Asset>> {
    let mut resolved = Vec::with_capacity(args.len());
    for arg in args {
        let asset = pool.get(arg.trim()).or_else(|| pool.find_by_name(arg));
        match asset {
            Some(asset) => resolved.push(asset),
            None => bail!("no asset with id or name '{}' in the pool", arg),
        }
    }
    Ok(resolved)
}

fn print_report(s: &TradeSuggestions<'_>) {
    let names: Vec<&str> = s.outgoing.iter().map(|a| a.display_name.as_str()).collect();
    println!("Trading away: {} ({})", names.join(" + "), s.package.owner);
    println!(
        "  raw {}  premium {:+}  curve bonus {:+}  adjusted {}",
        s.package.raw_total, s.package.premium_total, s.package.curve_bonus, s.package.adjusted_total
    );

    println!();
    println!(
        "1-for-1 offers (target {}, band {}..={}):",
        s.single_target, s.single_band.low, s.single_band.high
    );
    if s.singles.is_empty() {
        println!("  none");
    }
    for m in &s.singles {
        println!(
            "  {:<28} {:<4} {:<20} {:>6}",
            m.asset.display_name,
            m.asset.position.display_str(),
            m.asset.owning_team,
            m.value
        );
    }

    for group in &s.combos {
        println!();
        println!(
            "{}-for-1 offers (band {}..={}):",
            group.combo_size, s.combo_band.low, s.combo_band.high
        );
        if group.matches.is_empty() {
            println!("  none");
        }
        for m in &group.matches {
            let members: Vec<String> = m
                .assets
                .iter()
                .map(|a| format!("{} ({})", a.display_name, a.valuation))
                .collect();
            println!("  {:<20} {:>6}  {}", m.owner, m.total_value, members.join(" + "));
        }
    }
}

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "trade_suggest=info,warn";

/// Send tracing output to `logs/trade-suggest.log` so stdout stays a clean
/// report. Returns the log file path.
fn init_tracing() -> anyhow::Result<PathBuf> {
    use tracing_subscriber::EnvFilter;

    let log_path = std::env::current_dir()?
        .join("logs")
        .join("trade-suggest.log");
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create {}", log_path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow!("failed to set tracing subscriber: {e}"))?;

    Ok(log_path)
}
