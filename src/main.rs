use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::time::Duration;

use breakout_sniper::{
    BreakoutEngine, Cli, JsonSnapshotFetcher, LogNotifier, TickScheduler, default_series_specs,
    dispatch_report,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Load the snapshot and decide what to monitor
    let mut fetcher = JsonSnapshotFetcher::open(&args.snapshot)?;
    let specs = if args.default_catalogue || fetcher.specs().is_empty() {
        default_series_specs()
    } else {
        fetcher.specs().to_vec()
    };

    let config = args.engine_config(specs);
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    // Configuration errors are fatal
    let engine = BreakoutEngine::new(config).context("Invalid engine configuration")?;
    let scheduler = TickScheduler::new(engine);
    let mut notifier = LogNotifier::default();

    // D. Tick loop. A slow tick makes the next one skip rather than pile up.
    let mut interval = tokio::time::interval(Duration::from_secs(args.interval_secs.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut ticks_done = 0u64;
    loop {
        interval.tick().await;

        if let Err(e) = fetcher.reload() {
            log::error!("Snapshot reload failed, using previous data: {:#}", e);
        }

        if let Some(report) = scheduler.try_tick(&fetcher, Utc::now()) {
            for note in report.diagnostic_notes() {
                log::info!("{}", note);
            }
            dispatch_report(&report, &mut notifier);
        }

        ticks_done += 1;
        if args.ticks != 0 && ticks_done >= args.ticks {
            break;
        }
    }

    log::info!(
        "Done: {} ticks, {} alerts sent, {} ticks dropped",
        ticks_done,
        notifier.sent,
        scheduler.dropped_ticks()
    );
    Ok(())
}
