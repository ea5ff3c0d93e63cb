//! Performance benchmarks for CAMBRIAN

use cambrian::phenotype::Network;
use cambrian::{Evaluator, Evolution, Genome, InnovationGenerator, NeatConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn weight_sum_evaluator() -> Evaluator {
    Evaluator::single(|genome: &Genome| {
        1000.0 / (genome.enabled_weight_sum() - 100.0).abs().max(1e-9)
    })
}

/// A genome grown through a few hundred mutation steps, for distance and
/// phenotype benchmarks on realistic topologies.
fn grown_genome(steps: usize) -> Genome {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let neuron_uids = InnovationGenerator::new();
    let innovation = InnovationGenerator::new();
    let mut genome = Genome::fully_connected(3, 2, &neuron_uids, &innovation);

    for step in 0..steps {
        match step % 3 {
            0 => {
                genome.add_connection_mutation(&mut rng, &innovation, 10);
            }
            1 => genome.add_neuron_mutation(&mut rng, &neuron_uids, &innovation),
            _ => genome.weight_mutation(&mut rng),
        }
    }
    genome
}

fn benchmark_generation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_step");
    group.sample_size(20);

    for population in [50, 200].iter() {
        let config = NeatConfig {
            population_size: *population,
            target_species: 5,
            num_threads: 4,
            ..NeatConfig::default()
        };

        let mut evolution =
            Evolution::create_optimisation(3, 2, config, weight_sum_evaluator()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        // Warm up past the identical seed generations
        for _ in 0..10 {
            evolution.evolve(&mut rng).unwrap();
        }

        group.bench_with_input(
            BenchmarkId::new("population", population),
            population,
            |b, _| {
                b.iter(|| {
                    evolution.evolve(&mut rng).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn benchmark_compatibility_distance(c: &mut Criterion) {
    let a = grown_genome(300);
    let b = grown_genome(299);

    c.bench_function("compatibility_distance", |bench| {
        bench.iter(|| cambrian::genome::compatibility_distance(black_box(&a), black_box(&b)));
    });
}

fn benchmark_network_activation(c: &mut Criterion) {
    let genome = grown_genome(300);
    let network = Network::regression(&genome);
    let inputs = [0.5, -1.0, 2.0];

    c.bench_function("network_activate", |b| {
        b.iter(|| network.activate(black_box(&inputs)).unwrap());
    });
}

fn benchmark_mutation(c: &mut Criterion) {
    let neuron_uids = InnovationGenerator::starting_at(1_000);
    let innovation = InnovationGenerator::starting_at(1_000);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut genome = grown_genome(100);

    c.bench_function("add_connection_mutation", |b| {
        b.iter(|| {
            genome.add_connection_mutation(&mut rng, &innovation, 10);
        });
    });

    let mut genome = grown_genome(100);
    c.bench_function("weight_mutation", |b| {
        b.iter(|| {
            genome.weight_mutation(&mut rng);
        });
    });

    c.bench_function("add_neuron_mutation", |b| {
        let mut genome = grown_genome(100);
        b.iter(|| {
            genome.add_neuron_mutation(&mut rng, &neuron_uids, &innovation);
        });
    });
}

fn benchmark_checkpoint(c: &mut Criterion) {
    let config = NeatConfig {
        population_size: 200,
        ..NeatConfig::default()
    };
    let mut evolution =
        Evolution::create_optimisation(3, 2, config, weight_sum_evaluator()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..20 {
        evolution.evolve(&mut rng).unwrap();
    }

    let checkpoint = evolution.checkpoint();

    c.bench_function("checkpoint_serialize", |b| {
        b.iter(|| bincode::serialize(black_box(&checkpoint)).unwrap());
    });

    let serialized = bincode::serialize(&checkpoint).unwrap();

    c.bench_function("checkpoint_deserialize", |b| {
        b.iter(|| {
            let _: cambrian::checkpoint::Checkpoint =
                bincode::deserialize(black_box(&serialized)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    benchmark_generation_step,
    benchmark_compatibility_distance,
    benchmark_network_activation,
    benchmark_mutation,
    benchmark_checkpoint,
);

criterion_main!(benches);
