//! A structured log record describing one packing run, persisted by an
//! outer harness this crate doesn't own. This module only builds the
//! record and emits it through `log::info!`; it never writes to a file.

use crate::problem::solution::Solution;

/// One run's worth of telemetry: the instance shape, which algorithm ran,
/// and the outcome.
#[derive(Clone, Debug)]
pub struct LogRecord {
    pub timestamp_unix_secs: u64,
    pub bin_side: u32,
    pub min_dim: u32,
    pub max_dim: u32,
    pub algorithm_name: String,
    pub strategy_or_neighbourhood: String,
    pub num_rectangles: usize,
    pub num_bins: usize,
    pub runtime_seconds: f64,
    pub per_bin_free_area: Vec<i64>,
}

impl LogRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp_unix_secs: u64,
        bin_side: u32,
        min_dim: u32,
        max_dim: u32,
        algorithm_name: impl Into<String>,
        strategy_or_neighbourhood: impl Into<String>,
        num_rectangles: usize,
        solution: &Solution,
        runtime_seconds: f64,
    ) -> Self {
        Self {
            timestamp_unix_secs,
            bin_side,
            min_dim,
            max_dim,
            algorithm_name: algorithm_name.into(),
            strategy_or_neighbourhood: strategy_or_neighbourhood.into(),
            num_rectangles,
            num_bins: solution.num_bins(),
            runtime_seconds,
            per_bin_free_area: solution.bins.iter().map(|b| b.free_area()).collect(),
        }
    }

    pub fn emit(&self) {
        log::info!(
            "pack_run timestamp={} bin_side={} min_dim={} max_dim={} algorithm={} strategy={} \
             num_rectangles={} num_bins={} runtime_s={:.3} per_bin_free_area={:?}",
            self.timestamp_unix_secs,
            self.bin_side,
            self.min_dim,
            self.max_dim,
            self.algorithm_name,
            self.strategy_or_neighbourhood,
            self.num_rectangles,
            self.num_bins,
            self.runtime_seconds,
            self.per_bin_free_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::bin::Bin;

    #[test]
    fn captures_per_bin_free_area() {
        let bin = Bin::new(10);
        let solution = Solution::new(vec![bin]);
        let record = LogRecord::new(0, 10, 1, 10, "greedy_area", "area", 0, &solution, 0.01);
        assert_eq!(record.per_bin_free_area, vec![100]);
        assert_eq!(record.num_bins, 1);
    }
}
