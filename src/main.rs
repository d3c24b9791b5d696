//! Batch evaluation CLI - Run a demo evaluation from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};

use pareto_eval::{
    compute::{EvaluationError, ParallelEvaluator, Problem},
    schema::{Candidate, FitnessScheme},
};

/// Demo driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineConfig {
    /// Number of candidates in the batch.
    candidates: usize,
    /// Dimensionality of the parameter space.
    dimensions: usize,
    /// Worker slots in the pool.
    workers: usize,
    /// Sampling range for candidate parameters, per axis.
    param_range: (f64, f64),
    /// Fitness scheme for comparison and reporting.
    scheme: FitnessScheme,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candidates: 64,
            dimensions: 8,
            workers: 4,
            param_range: (-5.0, 5.0),
            scheme: FitnessScheme::pareto(2).expect("default scheme is valid"),
        }
    }
}

/// Sphere objectives, shifted by one per objective index.
#[derive(Clone)]
struct ShiftedSphere {
    num_objectives: usize,
}

impl Problem for ShiftedSphere {
    fn fitness(&mut self, params: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        Ok((0..self.num_objectives)
            .map(|j| params.iter().map(|x| (x - j as f64).powi(2)).sum())
            .collect())
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Evaluate a random candidate batch over a sphere objective.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to engine configuration file");
        eprintln!();
        eprintln!("An example configuration is printed with --example.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });
    let config: EngineConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });
    if let Err(e) = config.scheme.validate() {
        eprintln!("Invalid scheme: {}", e);
        std::process::exit(1);
    }

    let scheme = config.scheme.clone();
    let problem = ShiftedSphere {
        num_objectives: scheme.num_objectives,
    };

    println!("Batch Fitness Evaluation");
    println!("========================");
    println!(
        "Candidates: {} ({} parameters each)",
        config.candidates, config.dimensions
    );
    println!("Objectives: {}", scheme.num_objectives);
    println!("Workers: {}", config.workers);
    println!();

    let mut rng = rand::thread_rng();
    let (low, high) = config.param_range;
    let mut batch: Vec<Candidate> = (0..config.candidates)
        .map(|_| {
            let params = (0..config.dimensions)
                .map(|_| rng.gen_range(low..high))
                .collect();
            Candidate::new(params, &scheme)
        })
        .collect();

    let mut evaluator = ParallelEvaluator::new(scheme.clone(), &problem, config.workers, ())
        .unwrap_or_else(|e| {
            eprintln!("Error building worker pool: {}", e);
            std::process::exit(1);
        });

    println!("Evaluating...");
    let start = Instant::now();
    if let Err(e) = evaluator.evaluate_batch(&mut batch) {
        eprintln!("Batch evaluation failed: {}", e);
        std::process::exit(1);
    }
    let elapsed = start.elapsed();

    let aggregates = batch.iter().map(|c| scheme.aggregate(&c.fitness));
    let best = if scheme.is_minimizing() {
        aggregates.fold(f64::INFINITY, f64::min)
    } else {
        aggregates.fold(f64::NEG_INFINITY, f64::max)
    };
    let non_dominated = batch
        .iter()
        .filter(|c| {
            !batch
                .iter()
                .any(|other| scheme.is_better(&other.fitness, &c.fitness))
        })
        .count();

    let stats = evaluator.stats();
    println!();
    println!("Results:");
    println!("  Evaluations: {}", stats.num_evaluations);
    println!("  Best aggregate: {:.6}", best);
    println!("  Non-dominated candidates: {}", non_dominated);
    println!(
        "Time: {:.2}s ({:.1} evaluations/s)",
        elapsed.as_secs_f32(),
        stats.num_evaluations as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = EngineConfig::default();
    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
