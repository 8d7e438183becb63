//! Two-dimensional rectangle bin packing: partition integer-dimensioned,
//! axis-aligned, optionally 90°-rotatable rectangles across the minimum
//! number of fixed `L x L` bins such that no two rectangles overlap and
//! every rectangle lies wholly inside its bin.
//!
//! The crate exposes three entry points to an outer harness: [`pack`] runs
//! an [`AlgorithmSpec`] against an [`Instance`], [`score`] ranks a
//! [`Solution`] by the composite fitness function, and [`validate`] checks
//! a solution against the packing invariants.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod generator;
pub mod log_record;
pub mod problem;

use rand::rngs::StdRng;

use algorithms::{backtracking, greedy, local_search, GeometryNeighbourhood, OverlapNeighbourhood, RuleNeighbourhood};
use config::PackConfig;
use error::Result;
use problem::instance::Instance;
use problem::solution::Solution;

pub use error::PackError;
pub use problem::solution::{validate, Violation};

/// Which search algorithm to run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlgorithmSpec {
    GreedyArea,
    GreedyPerimeter,
    SimAnneal { initial_temp: f64, cooling_rate: f64 },
    Backtracking { max_time_s: f64 },
    LocalSearch(NeighbourhoodSpec),
}

impl AlgorithmSpec {
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmSpec::GreedyArea => "greedy_area",
            AlgorithmSpec::GreedyPerimeter => "greedy_perimeter",
            AlgorithmSpec::SimAnneal { .. } => "sim_anneal",
            AlgorithmSpec::Backtracking { .. } => "backtracking",
            AlgorithmSpec::LocalSearch(n) => n.algorithm_name(),
        }
    }

    pub fn strategy_or_neighbourhood(&self) -> String {
        match self {
            AlgorithmSpec::GreedyArea => "area".to_string(),
            AlgorithmSpec::GreedyPerimeter => "perimeter".to_string(),
            AlgorithmSpec::SimAnneal { initial_temp, cooling_rate } => {
                format!("t0={initial_temp},alpha={cooling_rate}")
            }
            AlgorithmSpec::Backtracking { max_time_s } => format!("max_time_s={max_time_s}"),
            AlgorithmSpec::LocalSearch(n) => n.label(),
        }
    }
}

/// Which neighbourhood `LocalSearch` should explore.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NeighbourhoodSpec {
    Geometry,
    Rule,
    Overlap { max_iter: u32 },
}

impl NeighbourhoodSpec {
    fn algorithm_name(&self) -> &'static str {
        "local_search"
    }

    fn label(&self) -> String {
        match self {
            NeighbourhoodSpec::Geometry => "geometry".to_string(),
            NeighbourhoodSpec::Rule => "rule".to_string(),
            NeighbourhoodSpec::Overlap { max_iter } => format!("overlap(max_iter={max_iter})"),
        }
    }
}

/// Runs `algorithm` against `instance` and returns a packed [`Solution`].
///
/// `instance` is re-validated defensively (it should already have passed
/// `Instance::new`'s validation at construction): an invalid instance is
/// the only failure mode `pack` has. Every other outcome (a placement
/// attempt failing, a backtracking deadline expiring, an annealing
/// iteration cap exhausting) is a successful termination yielding a valid
/// solution, never an `Err`.
pub fn pack(instance: &Instance, algorithm: AlgorithmSpec, config: &PackConfig, rng: &mut StdRng) -> Result<Solution> {
    instance.validate()?;

    let solution = match algorithm {
        AlgorithmSpec::GreedyArea => greedy::solve(instance, greedy::GreedyStrategy::Area),
        AlgorithmSpec::GreedyPerimeter => greedy::solve(instance, greedy::GreedyStrategy::Perimeter),
        AlgorithmSpec::SimAnneal { initial_temp, cooling_rate } => {
            let mut cfg = *config;
            cfg.sim_anneal_initial_temp = initial_temp;
            cfg.sim_anneal_cooling_rate = cooling_rate;
            algorithms::sim_anneal::solve(instance, &cfg, rng)
        }
        AlgorithmSpec::Backtracking { max_time_s } => backtracking::solve(instance, max_time_s, rng),
        AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Geometry) => {
            let mut neighbourhood = GeometryNeighbourhood::new(config.scoring);
            local_search::solve(instance, &mut neighbourhood, &config.scoring, rng)
        }
        AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Rule) => {
            let mut neighbourhood = RuleNeighbourhood::new(config.scoring);
            local_search::solve(instance, &mut neighbourhood, &config.scoring, rng)
        }
        AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Overlap { max_iter }) => {
            let mut neighbourhood = OverlapNeighbourhood::new(config.scoring, config.scoring.overlap_penalty, max_iter);
            local_search::solve(instance, &mut neighbourhood, &config.scoring, rng)
        }
    };

    Ok(solution)
}

/// Ranks a solution by the composite fitness function: higher is better.
pub fn score(solution: &Solution, weights: &config::ScoringWeights) -> f64 {
    problem::scoring::fitness(&solution.bins, weights)
}
