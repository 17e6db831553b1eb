//! Automatic dispatch: pick the most fuel-critical station.

use crate::Station;

/// Index of the station with the lowest fuel ratio strictly below `threshold`.
///
/// Ties keep the earliest registered station. Returns `None` when every
/// station is at or above the threshold.
pub fn select_dispatch_target(stations: &[Station], threshold: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, station) in stations.iter().enumerate() {
        let ratio = station.fuel_ratio();
        if ratio >= threshold {
            continue;
        }
        if best.is_none_or(|(_, best_ratio)| ratio < best_ratio) {
            best = Some((index, ratio));
        }
    }
    best.map(|(index, _)| index)
}
