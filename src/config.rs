/// Weights for the composite fitness function used to rank candidate
/// solutions during local search. Defaults match the constants the search
/// was tuned against; tuning guidance beyond these defaults is not given
/// anywhere upstream (an open question, not an oversight on our part).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringWeights {
    pub w_num_bins: f64,
    pub w_min_util: f64,
    pub w_compactness: f64,
    pub w_irregular_gap: f64,
    pub w_contiguity: f64,
    /// Multiplier applied to the per-pair overlap-ratio excess during the
    /// partial-overlap neighbourhood's annealing phase.
    pub overlap_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            w_num_bins: 1000.0,
            w_min_util: 150.0,
            w_compactness: 100.0,
            w_irregular_gap: 100.0,
            w_contiguity: 50.0,
            overlap_penalty: 1_000_000.0,
        }
    }
}

/// Tunable defaults for the search algorithms, collected in one place so
/// they can be overridden by a caller instead of hardcoded per algorithm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackConfig {
    pub scoring: ScoringWeightsConfig,
    pub sim_anneal_initial_temp: f64,
    pub sim_anneal_cooling_rate: f64,
    pub backtracking_deadline_secs: f64,
    pub overlap_neighbourhood_max_iter: u32,
}

/// Re-exported under its own name so config construction reads naturally as
/// `PackConfig { scoring: ScoringWeights::default(), .. }` at call sites.
pub type ScoringWeightsConfig = ScoringWeights;

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringWeights::default(),
            sim_anneal_initial_temp: 1000.0,
            sim_anneal_cooling_rate: 0.99,
            backtracking_deadline_secs: 240.0,
            overlap_neighbourhood_max_iter: 10,
        }
    }
}
