use anyhow::Result;
use breakout_sniper::config::{SNAPSHOT_PATH, default_series_specs};
use breakout_sniper::data::{SeriesSnapshot, SnapshotEntry};
use breakout_sniper::domain::{SeriesKind, TimeSeries};
use breakout_sniper::utils::synthetic::trending_values;
use breakout_sniper::utils::TimeUtils;
use chrono::{Duration, DurationRound, Utc};
use clap::Parser;
use std::path::{Path, PathBuf};

// Points per series: one week of hourly data
const POINTS: usize = 168;

/// Writes a synthetic series snapshot for the monitor to read.
///
/// Run once without `--spike` while the monitor is running, then again with
/// it: the second snapshot pushes every fourth series out of its envelope.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct DemoArgs {
    /// Add a 6σ jump to the last point of every fourth series
    #[arg(long, default_value_t = false)]
    spike: bool,

    /// Where to write the snapshot
    #[arg(long, default_value = SNAPSHOT_PATH)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = DemoArgs::parse();
    build_demo_snapshot(args.spike, &args.output)
}

fn build_demo_snapshot(spike: bool, output_path: &Path) -> Result<()> {
    let specs = default_series_specs();
    let now = Utc::now().duration_trunc(Duration::hours(1))?;

    let mut entries = Vec::with_capacity(specs.len());
    for (seed, spec) in specs.iter().enumerate() {
        let (base, slope, noise) = match spec.kind {
            SeriesKind::Trends => (50.0, 0.05, 3.0),
            SeriesKind::Prices => (1_000.0, 0.5, 8.0),
            SeriesKind::FuturesPremiums => (1.5, 0.0, 0.1),
            SeriesKind::Volume => (20_000.0, 10.0, 900.0),
            SeriesKind::HfVolatility => (0.8, 0.0, 0.05),
        };
        let mut values = trending_values(POINTS, base, slope, noise, seed as u64);

        if spike && seed % 4 == 0 {
            if let Some(last) = values.last_mut() {
                *last += 6.0 * noise;
            }
        }

        let step = TimeUtils::duration_from_ms(spec.kind.cadence_ms());
        let start = now - step * (POINTS as i32 - 1);
        let series = TimeSeries::from_uniform(&spec.id, start, step, values)?;
        entries.push(SnapshotEntry::from_series(spec, &series));
    }

    let snapshot = SeriesSnapshot::new(entries);
    snapshot.write(output_path)?;

    println!(
        "✅ Demo snapshot written to {:?} with {} series ({} points each, {} cadence for most).",
        output_path,
        snapshot.series.len(),
        POINTS,
        TimeUtils::interval_to_string(TimeUtils::MS_IN_H)
    );
    Ok(())
}
