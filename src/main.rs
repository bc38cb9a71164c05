use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::settings::Config;
use decider::{Decider, MomentumDecider};
use executor::{Portfolio, execute_order};
use market_data::{MarketDataProvider, ReplayProvider, synthetic_klines};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use store::SnapshotStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian position tracker.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = configuration::load_config()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => handle_run(args, config).await,
        Commands::Report => handle_report(config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A signal-driven leveraged position tracker with a simulated market feed.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated trading session over a deterministic market feed.
    Run(RunArgs),
    /// Print the portfolio report from the saved snapshot.
    Report,
}

#[derive(Parser)]
struct RunArgs {
    /// Stop after this many loop iterations (default: run until the feed
    /// is exhausted).
    #[arg(long)]
    iterations: Option<usize>,

    /// How many bars of market history to generate per symbol.
    #[arg(long, default_value_t = 240)]
    bars: usize,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Drives the tracker loop: collect market context, mark the ledger, ask the
/// decider for proposals, execute each one, persist, repeat.
async fn handle_run(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let store = SnapshotStore::new(&config.portfolio.snapshot_path);
    let mut portfolio = Portfolio::new(config.portfolio.initial_cash);

    match store.load() {
        Ok(snapshot) => {
            portfolio.restore(snapshot);
            info!(
                positions = portfolio.positions.len(),
                available_cash = %portfolio.available_cash,
                "restored portfolio from snapshot"
            );
        }
        Err(error) if error.is_not_found() => {
            info!(initial_cash = %portfolio.initial_cash, "no snapshot found, starting fresh");
        }
        Err(error) => return Err(error.into()),
    }

    let interval_secs = interval_secs(&config.tracker.interval);
    let warmup = config.tracker.candle_history.max(50);
    let series: HashMap<_, _> = config
        .tracker
        .symbols
        .iter()
        .map(|symbol| {
            let klines = synthetic_klines(symbol, base_price(symbol), args.bars, interval_secs);
            (symbol.clone(), klines)
        })
        .collect();
    let provider = ReplayProvider::new(series, warmup);
    let mut decider = MomentumDecider::new(config.decision.clone())?;

    let mut iteration = 0usize;
    loop {
        iteration += 1;
        info!(iteration, "fetching market data");

        let mut market = HashMap::new();
        let mut prices = HashMap::new();
        for symbol in &config.tracker.symbols {
            let snapshot = provider
                .market_snapshot(symbol, &config.tracker.interval, config.tracker.candle_history)
                .await?;
            match snapshot {
                Some(snapshot) => {
                    prices.insert(symbol.clone(), snapshot.current_price);
                    market.insert(symbol.clone(), snapshot);
                }
                None => info!(%symbol, "no kline data this tick, skipping"),
            }
        }

        portfolio.update_prices(&prices);

        let proposals = decider.decide(&market, &portfolio.report())?;
        for proposal in proposals {
            let order = proposal.into_order();
            match execute_order(&mut portfolio, &order) {
                Ok(execution) => info!(
                    symbol = %execution.symbol,
                    action = ?execution.action,
                    quantity = %execution.quantity,
                    price = %execution.price,
                    "order executed"
                ),
                // A rejection only concerns this one proposal; the rest of
                // the batch still runs.
                Err(rejection) => warn!(symbol = %order.symbol, %rejection, "proposal rejected"),
            }
        }

        store.save(&portfolio.snapshot())?;
        print_positions(&portfolio);

        if args.iterations.is_some_and(|max| iteration >= max) {
            break;
        }
        if !provider.step() {
            info!("market replay exhausted");
            break;
        }
        if config.tracker.loop_pause_secs > 0 {
            tokio::time::sleep(Duration::from_secs(config.tracker.loop_pause_secs)).await;
        }
    }

    info!(
        total_pnl = %portfolio.total_pnl(),
        available_cash = %portfolio.available_cash,
        total_asset = %portfolio.total_asset,
        "session complete"
    );
    Ok(())
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

fn handle_report(config: Config) -> anyhow::Result<()> {
    let store = SnapshotStore::new(&config.portfolio.snapshot_path);
    let mut portfolio = Portfolio::new(config.portfolio.initial_cash);

    match store.load() {
        Ok(snapshot) => portfolio.restore(snapshot),
        Err(error) if error.is_not_found() => {
            println!("No snapshot found at {}", store.path().display());
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    }

    let report = portfolio.report();
    println!("{}", serde_json::to_string_pretty(&report)?);
    print_positions(&portfolio);
    Ok(())
}

// ==============================================================================
// Helpers
// ==============================================================================

fn print_positions(portfolio: &Portfolio) {
    if portfolio.positions.is_empty() {
        println!("No positions");
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            "Symbol", "Qty", "Entry", "Current", "PnL", "Leverage",
        ]);
        let mut positions: Vec<_> = portfolio.positions.values().collect();
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        for position in positions {
            table.add_row(vec![
                position.symbol.clone(),
                format!("{:.4}", position.quantity),
                format!("${:.2}", position.entry_price),
                format!("${:.2}", position.current_price),
                format!("${:.4}", position.unrealized_pnl()),
                format!("{}x", position.leverage),
            ]);
        }
        println!("{table}");
    }

    println!("Total PnL: ${:.4}", portfolio.total_pnl());
    println!("Available Cash: ${:.4}", portfolio.available_cash);
    println!("Total Asset: ${:.4}\n", portfolio.total_asset);
}

/// Deterministic per-symbol base price for the synthetic feed.
fn base_price(symbol: &str) -> Decimal {
    let seed: u32 = symbol.bytes().map(u32::from).sum();
    Decimal::from(100 + (seed % 200) * 25)
}

fn interval_secs(interval: &str) -> i64 {
    match interval {
        "1m" => 60,
        "3m" => 180,
        "5m" => 300,
        "15m" => 900,
        "30m" => 1800,
        "1h" => 3600,
        "4h" => 14400,
        "1d" => 86400,
        _ => 180,
    }
}
