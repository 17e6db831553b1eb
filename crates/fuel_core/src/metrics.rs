//! Snapshot metrics computed from an `Environment`.
//!
//! `compute_metrics(&Environment) -> MetricsSnapshot` samples the current
//! world for time-series analysis. No state mutation. The CSV helpers below
//! are the only IO in this crate and are never called by the tick itself.

use crate::Environment;
use serde::Serialize;
use std::io::Write;

/// Current schema version. Bump when fields are added/removed/reordered.
const METRICS_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    pub metrics_version: u32,

    // Station reservoirs
    pub total_station_fuel: f64,
    pub total_station_capacity: f64,
    pub min_fuel_ratio: f64,
    pub avg_fuel_ratio: f64,
    pub stations_low: u32,
    pub stations_empty: u32,

    // Tanker
    pub tanker_payload: f64,
    pub tanker_phase: &'static str,

    // Cumulative accounting
    pub fuel_consumed_total: f64,
    pub fuel_delivered_total: f64,
    pub fuel_loaded_total: f64,
    pub fuel_lost_total: f64,
}

pub fn compute_metrics(env: &Environment) -> MetricsSnapshot {
    let threshold = env.constants.low_fuel_threshold;
    let mut total_station_fuel = 0.0;
    let mut total_station_capacity = 0.0;
    let mut ratio_sum = 0.0;
    let mut min_fuel_ratio = f64::INFINITY;
    let mut stations_low = 0u32;
    let mut stations_empty = 0u32;

    for station in &env.stations {
        let ratio = station.fuel_ratio();
        total_station_fuel += station.fuel_level;
        total_station_capacity += station.fuel_capacity;
        ratio_sum += ratio;
        min_fuel_ratio = min_fuel_ratio.min(ratio);
        if ratio < threshold {
            stations_low += 1;
        }
        if station.is_empty() {
            stations_empty += 1;
        }
    }

    let (min_fuel_ratio, avg_fuel_ratio) = if env.stations.is_empty() {
        (0.0, 0.0)
    } else {
        (min_fuel_ratio, ratio_sum / env.stations.len() as f64)
    };

    MetricsSnapshot {
        tick: env.meta.tick,
        metrics_version: METRICS_VERSION,
        total_station_fuel,
        total_station_capacity,
        min_fuel_ratio,
        avg_fuel_ratio,
        stations_low,
        stations_empty,
        tanker_payload: env.tanker.fuel_payload,
        tanker_phase: env.tanker.phase.as_str(),
        fuel_consumed_total: env.counters.fuel_consumed_total,
        fuel_delivered_total: env.counters.fuel_delivered_total,
        fuel_loaded_total: env.counters.fuel_loaded_total,
        fuel_lost_total: env.counters.fuel_lost_total,
    }
}

/// Write the CSV header row for metrics.
pub fn write_metrics_header(writer: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "tick,metrics_version,\
         total_station_fuel,total_station_capacity,min_fuel_ratio,avg_fuel_ratio,\
         stations_low,stations_empty,\
         tanker_payload,tanker_phase,\
         fuel_consumed_total,fuel_delivered_total,fuel_loaded_total,fuel_lost_total"
    )
}

/// Append a single metrics snapshot as a CSV row.
pub fn append_metrics_row(
    writer: &mut impl std::io::Write,
    snapshot: &MetricsSnapshot,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        snapshot.tick,
        snapshot.metrics_version,
        snapshot.total_station_fuel,
        snapshot.total_station_capacity,
        snapshot.min_fuel_ratio,
        snapshot.avg_fuel_ratio,
        snapshot.stations_low,
        snapshot.stations_empty,
        snapshot.tanker_payload,
        snapshot.tanker_phase,
        snapshot.fuel_consumed_total,
        snapshot.fuel_delivered_total,
        snapshot.fuel_loaded_total,
        snapshot.fuel_lost_total,
    )
}

/// Maximum data rows per CSV file before rotating to a new file.
const MAX_ROWS_PER_FILE: usize = 50_000;

/// Rotating metrics CSV writer. Splits into numbered files
/// (`metrics_000.csv`, `metrics_001.csv`, ...) after [`MAX_ROWS_PER_FILE`] rows each.
pub struct MetricsFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    pub fn new(run_dir: std::path::PathBuf) -> std::io::Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            writer,
        })
    }

    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        if self.rows_in_current_file >= MAX_ROWS_PER_FILE {
            self.writer.flush()?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        append_metrics_row(&mut self.writer, snapshot)?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(
    run_dir: &std::path::Path,
    index: u32,
) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    let path = run_dir.join(format!("metrics_{index:03}.csv"));
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_metrics_header(&mut writer)?;
    Ok(writer)
}
