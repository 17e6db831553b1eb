use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fuel_core::{DestinationOutcome, Environment, Event, MetricsFileWriter};
use fuel_world::{build_environment, load_world_config};
use serde::Serialize;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "fuel_cli", about = "Fuel logistics simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation for a fixed number of ticks.
    Run {
        #[arg(long)]
        ticks: u64,
        #[arg(long, default_value = "./content/world.json")]
        config: String,
        #[arg(long, default_value_t = 100)]
        print_every: u64,
        /// Sample metrics every N ticks (default 10).
        #[arg(long, default_value_t = 10)]
        metrics_every: u64,
        /// Disable automatic metrics collection to runs/ directory.
        #[arg(long)]
        no_metrics: bool,
        /// Redirect the tanker to X,Y before tick TICK runs. Repeatable.
        #[arg(long = "destination", value_name = "X,Y@TICK", value_parser = parse_destination)]
        destinations: Vec<ScheduledDestination>,
    },
}

/// A manual override applied just before the given tick is simulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct ScheduledDestination {
    x: f64,
    y: f64,
    tick: u64,
}

fn parse_destination(raw: &str) -> Result<ScheduledDestination> {
    let Some((coords, tick)) = raw.split_once('@') else {
        bail!("expected X,Y@TICK, got '{raw}'");
    };
    let Some((x, y)) = coords.split_once(',') else {
        bail!("expected X,Y before '@', got '{coords}'");
    };
    Ok(ScheduledDestination {
        x: x.trim().parse().with_context(|| format!("parsing x in '{raw}'"))?,
        y: y.trim().parse().with_context(|| format!("parsing y in '{raw}'"))?,
        tick: tick.trim().parse().with_context(|| format!("parsing tick in '{raw}'"))?,
    })
}

// ---------------------------------------------------------------------------
// Run directory
// ---------------------------------------------------------------------------

fn generate_run_id(ticks: u64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let (year, month, day) = epoch_days_to_date(days);

    format!("{year:04}{month:02}{day:02}_{hours:02}{minutes:02}{seconds:02}_ticks{ticks}")
}

fn epoch_days_to_date(mut days: u64) -> (u64, u64, u64) {
    // Algorithm from http://howardhinnant.github.io/date_algorithms.html
    days += 719_468;
    let era = days / 146_097;
    let day_of_era = days % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146_096) / 365;
    let year = year_of_era + era * 400;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    (year, month, day)
}

fn create_run_dir(run_id: &str) -> Result<std::path::PathBuf> {
    let dir = std::path::PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

#[derive(Serialize)]
struct RunInfo<'a> {
    run_id: &'a str,
    start_time: String,
    config_path: &'a str,
    config_version: &'a str,
    ticks: u64,
    print_every: u64,
    metrics_every: u64,
    destinations: &'a [ScheduledDestination],
    runner: &'static str,
}

fn write_run_info(dir: &std::path::Path, info: &RunInfo<'_>) -> Result<()> {
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct RunOptions {
    ticks: u64,
    config: String,
    print_every: u64,
    metrics_every: u64,
    no_metrics: bool,
    destinations: Vec<ScheduledDestination>,
}

fn run(options: RunOptions) -> Result<()> {
    let RunOptions {
        ticks,
        config,
        print_every,
        metrics_every,
        no_metrics,
        mut destinations,
    } = options;
    if print_every == 0 || metrics_every == 0 {
        bail!("--print-every and --metrics-every must be at least 1");
    }

    let world = load_world_config(&config)?;
    let mut env = build_environment(&world);
    destinations.sort_by_key(|d| d.tick);

    let mut metrics_writer: Option<MetricsFileWriter> = None;
    if !no_metrics {
        let run_id = generate_run_id(ticks);
        let run_dir = create_run_dir(&run_id)?;
        write_run_info(
            &run_dir,
            &RunInfo {
                run_id: &run_id,
                start_time: run_id.split('_').take(2).collect::<Vec<_>>().join("_"),
                config_path: &config,
                config_version: &world.config_version,
                ticks,
                print_every,
                metrics_every,
                destinations: &destinations,
                runner: "fuel_cli",
            },
        )?;
        let writer = MetricsFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        metrics_writer = Some(writer);
        println!("Run directory: {}", run_dir.display());
    }

    println!(
        "Starting simulation: ticks={ticks} stations={} config_version={}",
        env.stations.len(),
        world.config_version,
    );
    println!("{}", "-".repeat(80));

    let mut pending = destinations.into_iter().peekable();
    for _ in 0..ticks {
        while let Some(scheduled) = pending.next_if(|d| d.tick <= env.meta.tick) {
            apply_destination(&mut env, scheduled);
        }

        env.update();

        // Notable events are printed regardless of print_every.
        for envelope in env.drain_events() {
            if let Event::StationEmptied { station_id } = &envelope.event {
                println!(
                    "*** STATION EMPTY: {station_id} at tick={:04} ***",
                    envelope.tick
                );
            }
        }

        if env.meta.tick % print_every == 0 {
            print_status(&env);
        }

        if let Some(ref mut writer) = metrics_writer {
            if env.meta.tick % metrics_every == 0 {
                let snapshot = fuel_core::compute_metrics(&env);
                writer.write_row(&snapshot).context("writing metrics row")?;
            }
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", env.meta.tick);
    print_status(&env);
    println!(
        "consumed={:.1}  delivered={:.1}  loaded={:.1}  lost={:.1}",
        env.counters.fuel_consumed_total,
        env.counters.fuel_delivered_total,
        env.counters.fuel_loaded_total,
        env.counters.fuel_lost_total,
    );

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to runs/ directory.");
    }

    Ok(())
}

fn apply_destination(env: &mut Environment, scheduled: ScheduledDestination) {
    let outcome = env.set_tanker_destination_at(scheduled.x, scheduled.y);
    let marker = match outcome {
        DestinationOutcome::NotFound => "IGNORED",
        DestinationOutcome::Station(_) | DestinationOutcome::Depot => "OVERRIDE",
    };
    println!(
        "*** {marker} at tick={:04}: {} ***",
        env.meta.tick,
        outcome.message()
    );
}

fn print_status(env: &Environment) {
    let metrics = fuel_core::compute_metrics(env);
    let target = env
        .tanker
        .target
        .as_ref()
        .map_or_else(|| "-".to_string(), fuel_core::Target::label);

    println!(
        "[tick={tick:05}]  fuel={fuel:9.1}/{capacity:.0}  min_ratio={min:.3}  \
         low={low}  empty={empty}  tanker={phase:<20} target={target:<13} payload={payload:.1}",
        tick = metrics.tick,
        fuel = metrics.total_station_fuel,
        capacity = metrics.total_station_capacity,
        min = metrics.min_fuel_ratio,
        low = metrics.stations_low,
        empty = metrics.stations_empty,
        phase = metrics.tanker_phase,
        payload = metrics.tanker_payload,
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            config,
            print_every,
            metrics_every,
            no_metrics,
            destinations,
        } => {
            run(RunOptions {
                ticks,
                config,
                print_every,
                metrics_every,
                no_metrics,
                destinations,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_destination_with_tick() {
        let parsed = parse_destination("-15,10@120").unwrap();
        assert_eq!(parsed.tick, 120);
        assert!((parsed.x + 15.0).abs() < 1e-12);
        assert!((parsed.y - 10.0).abs() < 1e-12);
    }

    #[test]
    fn parses_destination_with_spaces_and_decimals() {
        let parsed = parse_destination(" 0.5 , -2.25 @ 7").unwrap();
        assert_eq!(parsed.tick, 7);
        assert!((parsed.x - 0.5).abs() < 1e-12);
        assert!((parsed.y + 2.25).abs() < 1e-12);
    }

    #[test]
    fn rejects_destination_without_tick() {
        assert!(parse_destination("10,10").is_err());
    }

    #[test]
    fn rejects_destination_without_comma() {
        assert!(parse_destination("10@5").is_err());
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        let err = parse_destination("ten,10@5").unwrap_err();
        assert!(format!("{err:#}").contains("parsing x"));
    }

    #[test]
    fn cli_accepts_repeated_destinations() {
        let cli = Cli::try_parse_from([
            "fuel_cli",
            "run",
            "--ticks",
            "50",
            "--destination",
            "10,10@5",
            "--destination",
            "0,0@20",
        ])
        .unwrap();
        let Commands::Run { destinations, .. } = cli.command;
        assert_eq!(destinations.len(), 2);
        assert_eq!(destinations[1].tick, 20);
    }

    #[test]
    fn epoch_day_zero_is_1970_01_01() {
        assert_eq!(epoch_days_to_date(0), (1970, 1, 1));
        assert_eq!(epoch_days_to_date(19_723), (2024, 1, 1));
    }

    #[test]
    fn run_id_carries_tick_count() {
        assert!(generate_run_id(500).ends_with("_ticks500"));
    }

    #[test]
    fn apply_destination_overrides_tanker() {
        let mut env = fuel_core::test_fixtures::two_station_env();
        apply_destination(
            &mut env,
            ScheduledDestination {
                x: 0.0,
                y: 20.0,
                tick: 0,
            },
        );
        assert!(env.tanker.target.is_some());
    }
}
