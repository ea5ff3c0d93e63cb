//! CAMBRIAN - CLI Entry Point
//!
//! NEAT-style neuroevolution engine with two built-in demonstration tasks.

use cambrian::checkpoint::Checkpoint;
use cambrian::phenotype::Network;
use cambrian::{Evaluator, Evolution, Genome, NeatConfig};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "cambrian")]
#[command(version)]
#[command(about = "NEAT-style neuroevolution engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Built-in fitness tasks.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Task {
    /// Evolve a network computing exclusive-or of two boolean inputs
    Xor,
    /// Evolve genomes whose summed absolute enabled weight approaches 100
    WeightSum,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new evolutionary optimisation
    Run {
        /// Fitness task to optimise
        #[arg(value_enum)]
        task: Task,

        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations
        #[arg(short, long, default_value = "100")]
        generations: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Save a checkpoint here when finished
        #[arg(short = 'o', long)]
        checkpoint: Option<PathBuf>,
    },

    /// Resume an optimisation from a checkpoint
    Resume {
        /// Checkpoint file to resume from
        #[arg(short, long)]
        checkpoint: PathBuf,

        /// Fitness task the run was started with
        #[arg(value_enum)]
        task: Task,

        /// Number of additional generations
        #[arg(short, long, default_value = "100")]
        generations: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Save a checkpoint here when finished
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Analyze a checkpoint file
    Analyze {
        /// Checkpoint file
        checkpoint: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            task,
            config,
            generations,
            seed,
            checkpoint,
        } => run_optimisation(task, config, generations, seed, checkpoint),

        Commands::Resume {
            checkpoint,
            task,
            generations,
            seed,
            output,
        } => resume_optimisation(checkpoint, task, generations, seed, output),

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { checkpoint } => analyze_checkpoint(checkpoint),
    }
}

/// XOR fitness: 20 random boolean trials, one point per correct answer.
/// The sigmoid output is read as true above 0.5.
fn xor_evaluator() -> Evaluator {
    const TRIALS: u32 = 20;

    Evaluator::single(|genome: &Genome| {
        let network = Network::sigmoid_output(genome);
        let mut rng = rand::thread_rng();

        let mut correct = 0;
        for _ in 0..TRIALS {
            let a = rng.gen::<bool>();
            let b = rng.gen::<bool>();
            let inputs = [if a { 1.0 } else { 0.0 }, if b { 1.0 } else { 0.0 }];
            match network.activate(&inputs) {
                Ok(outputs) => {
                    if (outputs[0] > 0.5) == (a ^ b) {
                        correct += 1;
                    }
                }
                Err(_) => return 0.0,
            }
        }
        correct as f64
    })
}

/// Weight-sum fitness: reciprocal distance of the summed absolute enabled
/// weight from 100. Peaks sharply at the target.
fn weight_sum_evaluator() -> Evaluator {
    Evaluator::single(|genome: &Genome| {
        1000.0 / (genome.enabled_weight_sum() - 100.0).abs().max(1e-9)
    })
}

fn task_setup(task: Task) -> (usize, usize, Evaluator) {
    match task {
        Task::Xor => (2, 1, xor_evaluator()),
        Task::WeightSum => (2, 1, weight_sum_evaluator()),
    }
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => {
            println!("Using seed: {}", seed);
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    }
}

fn run_optimisation(
    task: Task,
    config_path: PathBuf,
    generations: u64,
    seed: Option<u64>,
    checkpoint_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        NeatConfig::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        NeatConfig::default()
    };

    let (num_inputs, num_outputs, evaluator) = task_setup(task);
    let mut evolution = Evolution::create_optimisation(num_inputs, num_outputs, config, evaluator)?;
    let mut rng = make_rng(seed);

    println!("Starting optimisation: {:?}", task);
    println!("  Population: {}", evolution.config().population_size);
    println!("  Generations: {}", generations);
    println!();

    let start = Instant::now();
    drive(&mut evolution, &mut rng, generations)?;
    report(&evolution, start.elapsed().as_secs_f64());

    if let Some(path) = checkpoint_path {
        evolution.checkpoint().save(&path)?;
        println!("Checkpoint saved: {:?}", path);
    }

    Ok(())
}

fn resume_optimisation(
    checkpoint_path: PathBuf,
    task: Task,
    generations: u64,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading checkpoint: {:?}", checkpoint_path);

    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let (_, _, evaluator) = task_setup(task);
    let mut evolution = Evolution::from_checkpoint(checkpoint, evaluator)?;
    let mut rng = make_rng(seed);

    println!("Resumed at generation {}", evolution.generation_number());
    println!("Running {} additional generations", generations);
    println!();

    let start = Instant::now();
    drive(&mut evolution, &mut rng, generations)?;
    report(&evolution, start.elapsed().as_secs_f64());

    if let Some(path) = output {
        evolution.checkpoint().save(&path)?;
        println!("Checkpoint saved: {:?}", path);
    }

    Ok(())
}

fn drive(
    evolution: &mut Evolution,
    rng: &mut ChaCha8Rng,
    generations: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..generations {
        let stats = evolution.evolve(rng)?;
        println!(
            "gen {:>5}  best {:>12.4}  species {:>3}  threshold {:>8.3}",
            stats.generation, stats.best_fitness, stats.num_species, stats.compatibility_threshold
        );
    }
    Ok(())
}

fn report(evolution: &Evolution, elapsed_secs: f64) {
    println!();
    println!("=== Optimisation Complete ===");
    println!("Time: {:.2}s", elapsed_secs);
    println!("Generations: {}", evolution.generation_number());
    println!("Species: {}", evolution.num_species());
    if let Some(best) = evolution.best_fitness() {
        println!("Best fitness: {:.4}", best);
    }
    if let Some(genome) = evolution.fittest() {
        println!(
            "Champion: {} neurons, {} enabled connections",
            genome.neurons().len(),
            genome.enabled_connection_count()
        );
    }
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = NeatConfig::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn analyze_checkpoint(checkpoint_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Checkpoint Analysis ===");
    println!("File: {:?}", checkpoint_path);
    println!();

    let checkpoint = Checkpoint::load(&checkpoint_path)?;

    println!("Generation: {}", checkpoint.generation_number);
    println!("Population: {}", checkpoint.population.len());
    println!("Compatibility threshold: {:.3}", checkpoint.compatibility_threshold);
    println!("Next innovation marker: {}", checkpoint.innovation_next);
    println!("Next neuron uid: {}", checkpoint.neuron_uid_next);
    println!("Size: {} bytes", checkpoint.size_bytes());

    let mut neuron_counts: Vec<usize> =
        checkpoint.population.iter().map(|g| g.neurons().len()).collect();
    neuron_counts.sort_unstable();
    if !neuron_counts.is_empty() {
        println!(
            "Neurons per genome: min {}, median {}, max {}",
            neuron_counts[0],
            neuron_counts[neuron_counts.len() / 2],
            neuron_counts[neuron_counts.len() - 1]
        );
    }

    Ok(())
}
