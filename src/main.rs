use std::fs;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use rectpack::config::PackConfig;
use rectpack::log_record::LogRecord;
use rectpack::problem::instance::Instance;
use rectpack::problem::solution::Solution;
use rectpack::{generator, pack, score, validate, AlgorithmSpec, NeighbourhoodSpec};

#[derive(Parser)]
#[command(name = "rectpack", version, about = "Rectangle bin packing: greedy, simulated annealing, backtracking and local search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a random instance and print it as JSON.
    Generate(GenerateArgs),
    /// Generate (or load) an instance and pack it with one algorithm.
    Run(RunArgs),
    /// Check a solution file against an instance file for invariant violations.
    Validate(ValidateArgs),
    /// Run every algorithm across a few preset instance sizes and print a stats table.
    Bench(BenchArgs),
}

#[derive(clap::Args, Clone)]
struct InstanceShape {
    /// Number of rectangles to generate.
    #[arg(long, default_value_t = 30)]
    num_rects: usize,
    /// Minimum rectangle width.
    #[arg(long, default_value_t = 2)]
    width_min: u32,
    /// Maximum rectangle width.
    #[arg(long, default_value_t = 10)]
    width_max: u32,
    /// Minimum rectangle height.
    #[arg(long, default_value_t = 2)]
    height_min: u32,
    /// Maximum rectangle height.
    #[arg(long, default_value_t = 10)]
    height_max: u32,
    /// Bin side length L.
    #[arg(long, default_value_t = 40)]
    bin_side: u32,
    /// PRNG seed; the single shared generator all randomness is drawn from.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(clap::Args)]
struct GenerateArgs {
    #[command(flatten)]
    shape: InstanceShape,
    /// Write the generated instance as JSON to this path instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AlgorithmArg {
    GreedyArea,
    GreedyPerimeter,
    SimAnneal,
    Backtracking,
    LocalSearchGeometry,
    LocalSearchRule,
    LocalSearchOverlap,
}

#[derive(clap::Args)]
struct RunArgs {
    #[command(flatten)]
    shape: InstanceShape,
    /// Load the instance from this JSON file instead of generating one.
    #[arg(long)]
    instance: Option<PathBuf>,
    /// Which algorithm to run.
    #[arg(long, value_enum, default_value_t = AlgorithmArg::GreedyArea)]
    algorithm: AlgorithmArg,
    /// Initial temperature, for --algorithm sim-anneal.
    #[arg(long, default_value_t = 1000.0)]
    initial_temp: f64,
    /// Cooling rate, for --algorithm sim-anneal.
    #[arg(long, default_value_t = 0.99)]
    cooling_rate: f64,
    /// Wall-clock deadline in seconds, for --algorithm backtracking.
    #[arg(long, default_value_t = 240.0)]
    max_time_s: f64,
    /// Iteration cap, for --algorithm local-search-overlap.
    #[arg(long, default_value_t = 10)]
    overlap_max_iter: u32,
    /// Write the resulting solution as JSON to this path instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Instance JSON file (as produced by `generate --out`).
    #[arg(long)]
    instance: PathBuf,
    /// Solution JSON file (as produced by `run --out`).
    #[arg(long)]
    solution: PathBuf,
}

#[derive(clap::Args)]
struct BenchArgs {
    /// Number of instances averaged per configuration.
    #[arg(long, default_value_t = 5)]
    num_instances: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Run(args) => run_run(args),
        Command::Validate(args) => run_validate(args),
        Command::Bench(args) => run_bench(args),
    }
}

fn build_instance(shape: &InstanceShape) -> Instance {
    let mut rng = StdRng::seed_from_u64(shape.seed);
    generator::generate_instance(
        &mut rng,
        shape.num_rects,
        (shape.width_min, shape.width_max),
        (shape.height_min, shape.height_max),
        shape.bin_side,
    )
    .unwrap_or_else(|err| {
        eprintln!("invalid instance: {err}");
        std::process::exit(1);
    })
}

fn run_generate(args: GenerateArgs) {
    let instance = build_instance(&args.shape);
    let json = serde_json::to_string_pretty(&instance).expect("Instance serializes");
    match args.out {
        Some(path) => fs::write(&path, json).unwrap_or_else(|e| fail(&format!("writing {}: {e}", path.display()))),
        None => println!("{json}"),
    }
}

fn run_run(args: RunArgs) {
    let instance = match &args.instance {
        Some(path) => load_instance(path),
        None => build_instance(&args.shape),
    };

    let algorithm = match args.algorithm {
        AlgorithmArg::GreedyArea => AlgorithmSpec::GreedyArea,
        AlgorithmArg::GreedyPerimeter => AlgorithmSpec::GreedyPerimeter,
        AlgorithmArg::SimAnneal => {
            AlgorithmSpec::SimAnneal { initial_temp: args.initial_temp, cooling_rate: args.cooling_rate }
        }
        AlgorithmArg::Backtracking => AlgorithmSpec::Backtracking { max_time_s: args.max_time_s },
        AlgorithmArg::LocalSearchGeometry => AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Geometry),
        AlgorithmArg::LocalSearchRule => AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Rule),
        AlgorithmArg::LocalSearchOverlap => {
            AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Overlap { max_iter: args.overlap_max_iter })
        }
    };

    let config = PackConfig::default();
    let mut rng = StdRng::seed_from_u64(args.shape.seed);

    let start = Instant::now();
    let solution = pack(&instance, algorithm, &config, &mut rng).unwrap_or_else(|err| {
        eprintln!("invalid instance: {err}");
        std::process::exit(1);
    });
    let runtime = start.elapsed().as_secs_f64();

    let fitness = score(&solution, &config.scoring);
    let violations = validate(&instance, &solution);

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let record = LogRecord::new(
        timestamp,
        instance.bin_side,
        instance.min_dim,
        instance.max_dim,
        algorithm.name(),
        algorithm.strategy_or_neighbourhood(),
        instance.num_rectangles(),
        &solution,
        runtime,
    );
    record.emit();

    println!("algorithm: {} ({})", algorithm.name(), algorithm.strategy_or_neighbourhood());
    println!("bins: {}", solution.num_bins());
    println!("fitness: {fitness:.2}");
    println!("runtime: {runtime:.3}s");
    if violations.is_empty() {
        println!("validation: ok");
    } else {
        println!("validation: {} violation(s)", violations.len());
        for v in &violations {
            println!("  - {v}");
        }
    }

    let json = serde_json::to_string_pretty(&solution.to_wire()).expect("Solution serializes");
    match args.out {
        Some(path) => fs::write(&path, json).unwrap_or_else(|e| fail(&format!("writing {}: {e}", path.display()))),
        None => println!("{json}"),
    }
}

fn run_validate(args: ValidateArgs) {
    let instance = load_instance(&args.instance);
    let wire: rectpack::problem::solution::WireSolution = serde_json::from_str(
        &fs::read_to_string(&args.solution).unwrap_or_else(|e| fail(&format!("reading {}: {e}", args.solution.display()))),
    )
    .unwrap_or_else(|e| fail(&format!("parsing {}: {e}", args.solution.display())));

    let solution = Solution::from_wire(&wire);
    let violations = validate(&instance, &solution);
    if violations.is_empty() {
        println!("ok");
    } else {
        println!("{} violation(s):", violations.len());
        for v in &violations {
            println!("  - {v}");
        }
        std::process::exit(1);
    }
}

fn run_bench(args: BenchArgs) {
    let configs = [
        (30, (5u32, 20u32), (5u32, 20u32), 40u32),
        (100, (10, 30), (10, 30), 100),
        (500, (10, 50), (10, 50), 150),
    ];

    let config = PackConfig::default();
    println!("Start Bench Suite");

    for (num_rects, width_range, height_range, bin_side) in configs {
        println!(
            "\nConfiguration: {num_rects} rectangles, bin side L={bin_side}, width {width_range:?}, height {height_range:?}"
        );
        println!("Instances averaged: {}", args.num_instances);
        println!("\n{:<28} | {:<10} | {:<12}", "Algorithm", "avg bins", "avg ms");
        println!("{:-<56}", "-");

        let algorithms = [
            ("Greedy (area)", AlgorithmSpec::GreedyArea),
            ("Greedy (perimeter)", AlgorithmSpec::GreedyPerimeter),
            ("Local search (geometry)", AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Geometry)),
            ("Local search (rule)", AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Rule)),
            (
                "Local search (overlap)",
                AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Overlap { max_iter: 10 }),
            ),
        ];

        for (label, algorithm) in algorithms {
            let mut total_bins = 0usize;
            let mut total_ms = 0.0f64;
            for seed in 0..args.num_instances as u64 {
                let mut rng = StdRng::seed_from_u64(seed);
                let instance = generator::generate_instance(&mut rng, num_rects, width_range, height_range, bin_side)
                    .expect("bench configurations are always well-formed");
                let start = Instant::now();
                let solution = pack(&instance, algorithm, &config, &mut rng).expect("validated instance");
                total_bins += solution.num_bins();
                total_ms += start.elapsed().as_secs_f64() * 1000.0;
            }
            let n = args.num_instances.max(1) as f64;
            println!("{:<28} | {:<10.2} | {:<12.2}", label, total_bins as f64 / n, total_ms / n);
        }
    }
}

fn load_instance(path: &PathBuf) -> Instance {
    let text = fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("reading {}: {e}", path.display())));
    serde_json::from_str(&text).unwrap_or_else(|e| fail(&format!("parsing {}: {e}", path.display())))
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}
