//! Generation-loop orchestrator: speciation, evaluation, selection, breeding.

use crate::checkpoint::Checkpoint;
use crate::config::NeatConfig;
use crate::genome::{compatibility_distance, crossover, Genome};
use crate::innovation::InnovationGenerator;
use crate::species::Species;
use rand::Rng;
use rayon::prelude::*;

/// The fitness collaborator. Exactly one of the two evaluation modes exists
/// per run; representing them as one tagged value makes "no evaluator
/// configured" unrepresentable instead of a runtime check.
pub enum Evaluator {
    /// Per-genome function, dispatched across a worker pool, one task per
    /// genome. Must be safe to call concurrently and should return a
    /// consistent fitness for the same genome. Strictly greater is strictly
    /// better.
    Single(Box<dyn Fn(&Genome) -> f64 + Send + Sync>),
    /// Whole-population function, called synchronously once per generation.
    /// The returned fitnesses must align positionally with the input slice.
    Bulk(Box<dyn Fn(&[Genome]) -> Vec<f64> + Send + Sync>),
}

impl Evaluator {
    pub fn single<F>(evaluate: F) -> Self
    where
        F: Fn(&Genome) -> f64 + Send + Sync + 'static,
    {
        Self::Single(Box::new(evaluate))
    }

    pub fn bulk<F>(evaluate: F) -> Self
    where
        F: Fn(&[Genome]) -> Vec<f64> + Send + Sync + 'static,
    {
        Self::Bulk(Box::new(evaluate))
    }
}

/// Errors surfaced by the orchestrator.
#[derive(Debug)]
pub enum EvolutionError {
    /// The supplied configuration failed validation
    InvalidConfig(String),
    /// The evaluation worker pool could not be built
    ThreadPool(rayon::ThreadPoolBuildError),
    /// A bulk evaluator returned a fitness list of the wrong length
    FitnessCountMismatch { expected: usize, found: usize },
    /// An evaluator produced a NaN or infinite fitness
    NonFiniteFitness { genome_index: usize, fitness: f64 },
}

impl std::fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Self::ThreadPool(e) => write!(f, "failed to build evaluation pool: {}", e),
            Self::FitnessCountMismatch { expected, found } => write!(
                f,
                "bulk evaluator returned {} fitnesses for {} genomes",
                found, expected
            ),
            Self::NonFiniteFitness {
                genome_index,
                fitness,
            } => write!(
                f,
                "evaluator returned non-finite fitness {} for genome {}",
                fitness, genome_index
            ),
        }
    }
}

impl std::error::Error for EvolutionError {}

impl From<rayon::ThreadPoolBuildError> for EvolutionError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}

/// Per-generation summary returned by [`Evolution::evolve`].
#[derive(Clone, Copy, Debug)]
pub struct GenerationStats {
    pub generation: u64,
    pub best_fitness: f64,
    pub num_species: usize,
    pub compatibility_threshold: f64,
}

/// Orchestrator for one evolutionary run.
///
/// Owns the population, the species list, the adaptive compatibility
/// threshold and the run's id generators. Each call to [`evolve`] executes
/// the full generation transition, strictly in order: reset, speciate,
/// re-threshold, evaluate, rank, reproduce, commit. Only evaluation fans out
/// across threads; every other phase runs on the calling thread.
///
/// [`evolve`]: Self::evolve
pub struct Evolution {
    config: NeatConfig,
    evaluator: Evaluator,
    innovation: InnovationGenerator,
    neuron_uids: InnovationGenerator,
    pool: Option<rayon::ThreadPool>,

    species: Vec<Species>,
    current_generation: Vec<Genome>,
    /// Outgoing generation, retained so species can re-pick their mascots
    /// from their previous membership at the next reset.
    retired_generation: Vec<Genome>,

    compatibility_threshold: f64,
    generation_number: u64,
    best: Option<(f64, Genome)>,
}

impl Evolution {
    /// Create a run whose initial population is `population_size` copies of
    /// `seed_genome`. The generators must be the ones the seed genome's uids
    /// and markers were drawn from; the run takes them over.
    pub fn new(
        config: NeatConfig,
        seed_genome: Genome,
        neuron_uids: InnovationGenerator,
        innovation: InnovationGenerator,
        evaluator: Evaluator,
    ) -> Result<Self, EvolutionError> {
        config.validate().map_err(EvolutionError::InvalidConfig)?;

        let pool = Self::build_pool(&config, &evaluator)?;
        let current_generation = vec![seed_genome; config.population_size];
        let compatibility_threshold = config.initial_compatibility_threshold;

        Ok(Self {
            config,
            evaluator,
            innovation,
            neuron_uids,
            pool,
            species: Vec::new(),
            current_generation,
            retired_generation: Vec::new(),
            compatibility_threshold,
            generation_number: 0,
            best: None,
        })
    }

    /// Create a run seeded with the customary fully connected
    /// input-to-output topology, generating the id sources internally.
    pub fn create_optimisation(
        num_inputs: usize,
        num_outputs: usize,
        config: NeatConfig,
        evaluator: Evaluator,
    ) -> Result<Self, EvolutionError> {
        let neuron_uids = InnovationGenerator::new();
        let innovation = InnovationGenerator::new();
        let seed = Genome::fully_connected(num_inputs, num_outputs, &neuron_uids, &innovation);
        Self::new(config, seed, neuron_uids, innovation, evaluator)
    }

    /// Resume a run from a checkpoint. Given the same evaluator and RNG
    /// stream, the restored run behaves identically to one that never
    /// stopped.
    pub fn from_checkpoint(
        checkpoint: Checkpoint,
        evaluator: Evaluator,
    ) -> Result<Self, EvolutionError> {
        checkpoint
            .config
            .validate()
            .map_err(EvolutionError::InvalidConfig)?;
        if checkpoint.population.len() != checkpoint.config.population_size {
            return Err(EvolutionError::InvalidConfig(format!(
                "checkpoint population ({}) does not match population_size ({})",
                checkpoint.population.len(),
                checkpoint.config.population_size
            )));
        }

        let pool = Self::build_pool(&checkpoint.config, &evaluator)?;

        Ok(Self {
            config: checkpoint.config,
            evaluator,
            innovation: InnovationGenerator::starting_at(checkpoint.innovation_next),
            neuron_uids: InnovationGenerator::starting_at(checkpoint.neuron_uid_next),
            pool,
            species: Vec::new(),
            current_generation: checkpoint.population,
            retired_generation: Vec::new(),
            compatibility_threshold: checkpoint.compatibility_threshold,
            generation_number: checkpoint.generation_number,
            best: None,
        })
    }

    fn build_pool(
        config: &NeatConfig,
        evaluator: &Evaluator,
    ) -> Result<Option<rayon::ThreadPool>, EvolutionError> {
        match (evaluator, config.num_threads) {
            (Evaluator::Single(_), n) if n > 0 => Ok(Some(
                rayon::ThreadPoolBuilder::new().num_threads(n).build()?,
            )),
            _ => Ok(None),
        }
    }

    /// Capture the full resumable state of the run.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(
            self.generation_number,
            self.current_generation.clone(),
            self.innovation.current(),
            self.neuron_uids.current(),
            self.compatibility_threshold,
            self.config.clone(),
        )
    }

    /// Run one full generation transition.
    ///
    /// On an evaluation error the population is left untouched: species keep
    /// their mascots but drop their members (member indices would otherwise
    /// outlive the speciation pass that produced them), the threshold keeps
    /// its adjusted value and the generation counter does not advance. The
    /// same population is re-speciated by the next call.
    ///
    /// For seeded runs, do not share `rng` with a concurrently invoked
    /// evaluator; completion order across worker threads is not
    /// deterministic.
    pub fn evolve<R: Rng>(&mut self, rng: &mut R) -> Result<GenerationStats, EvolutionError> {
        // Reset: re-mascot every species from its outgoing membership and
        // drop all per-generation state
        for species in &mut self.species {
            species.reset(rng, &self.retired_generation);
        }
        self.best = None;

        let species_of = self.speciate();
        self.adjust_threshold();

        let adjusted = match self
            .evaluate()
            .and_then(|raw| self.share_fitness(&species_of, &raw))
        {
            Ok(adjusted) => adjusted,
            Err(e) => {
                // Members index into the generation speciated above, but the
                // next reset re-mascots from retired_generation; stale
                // indices must not survive into that lookup
                for species in &mut self.species {
                    species.clear_members();
                }
                return Err(e);
            }
        };

        // Rank: members within each species, then species against each other
        for species in &mut self.species {
            species.rank_members(&adjusted);
        }
        let order = self.species_order(&adjusted);

        let next_generation = self.reproduce(rng, &order, &adjusted);

        // Commit
        self.retired_generation = std::mem::replace(&mut self.current_generation, next_generation);
        self.generation_number += 1;

        let stats = GenerationStats {
            generation: self.generation_number,
            best_fitness: self.best.as_ref().map(|(f, _)| *f).unwrap_or(f64::MIN),
            num_species: self.species.len(),
            compatibility_threshold: self.compatibility_threshold,
        };
        log::info!(
            "generation {}: best fitness {:.4}, {} species, threshold {:.3}",
            stats.generation,
            stats.best_fitness,
            stats.num_species,
            stats.compatibility_threshold
        );
        Ok(stats)
    }

    /// Assign every genome to the first species (in creation order) whose
    /// mascot lies within the current threshold; an unmatched genome founds a
    /// new species with itself as mascot. Species left empty are purged.
    /// Returns the genome-index to species-index assignment.
    fn speciate(&mut self) -> Vec<usize> {
        let mut species_of = vec![0usize; self.current_generation.len()];

        for (index, genome) in self.current_generation.iter().enumerate() {
            let matched = self.species.iter().position(|species| {
                compatibility_distance(genome, species.mascot()) < self.compatibility_threshold
            });
            match matched {
                Some(species_index) => {
                    self.species[species_index].add_member(index);
                    species_of[index] = species_index;
                }
                None => {
                    species_of[index] = self.species.len();
                    self.species.push(Species::new(genome.clone(), index));
                }
            }
        }

        // Purge species that attracted no members, remapping assignments
        let old_species = std::mem::take(&mut self.species);
        let mut remap = vec![usize::MAX; old_species.len()];
        for (old_index, species) in old_species.into_iter().enumerate() {
            if species.size() > 0 {
                remap[old_index] = self.species.len();
                self.species.push(species);
            }
        }
        for assignment in &mut species_of {
            *assignment = remap[*assignment];
        }

        species_of
    }

    /// Exponential control of the compatibility threshold towards the target
    /// species count, floored at the modifier itself. No upper clamp.
    fn adjust_threshold(&mut self) {
        let modifier = self.config.compatibility_modifier;
        if self.species.len() < self.config.target_species {
            self.compatibility_threshold /= modifier;
        } else if self.species.len() > self.config.target_species {
            self.compatibility_threshold *= modifier;
        }
        self.compatibility_threshold = self.compatibility_threshold.max(modifier);
    }

    /// Obtain one raw fitness per genome. The single-evaluator mode fans out
    /// one task per genome over the worker pool and joins completely; genomes
    /// are read-only for the duration, and all shared-state writes happen in
    /// the sequential reduction that follows.
    fn evaluate(&self) -> Result<Vec<f64>, EvolutionError> {
        match &self.evaluator {
            Evaluator::Single(evaluate) => {
                let generation = &self.current_generation;
                let map = || {
                    generation
                        .par_iter()
                        .map(|genome| evaluate(genome))
                        .collect()
                };
                Ok(match &self.pool {
                    Some(pool) => pool.install(map),
                    None => map(),
                })
            }
            Evaluator::Bulk(evaluate) => {
                let fitnesses = evaluate(&self.current_generation);
                if fitnesses.len() != self.current_generation.len() {
                    return Err(EvolutionError::FitnessCountMismatch {
                        expected: self.current_generation.len(),
                        found: fitnesses.len(),
                    });
                }
                Ok(fitnesses)
            }
        }
    }

    /// Sequential reduction over the raw fitness array: validate, divide by
    /// species size (fitness sharing) and track the generation's best genome
    /// (strictly greatest raw fitness, first found on ties).
    fn share_fitness(
        &mut self,
        species_of: &[usize],
        raw_fitness: &[f64],
    ) -> Result<Vec<f64>, EvolutionError> {
        let mut adjusted = vec![0.0; raw_fitness.len()];
        let mut best_index: Option<usize> = None;

        for (index, &fitness) in raw_fitness.iter().enumerate() {
            if !fitness.is_finite() {
                return Err(EvolutionError::NonFiniteFitness {
                    genome_index: index,
                    fitness,
                });
            }
            adjusted[index] = fitness / self.species[species_of[index]].size() as f64;
            if best_index.map_or(true, |best| fitness > raw_fitness[best]) {
                best_index = Some(index);
            }
        }

        self.best =
            best_index.map(|index| (raw_fitness[index], self.current_generation[index].clone()));
        Ok(adjusted)
    }

    /// Species indices sorted descending by summed member adjusted fitness.
    fn species_order(&self, adjusted: &[f64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.species.len()).collect();
        order.sort_by(|&a, &b| {
            self.species[b]
                .total_fitness(adjusted)
                .partial_cmp(&self.species[a].total_fitness(adjusted))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }

    /// Build the next generation: each species' top-ranked member survives
    /// unchanged (elitism), then fitness-proportionate breeding fills the
    /// remainder with mutated crossover children.
    fn reproduce<R: Rng>(&self, rng: &mut R, order: &[usize], adjusted: &[f64]) -> Vec<Genome> {
        let population_size = self.config.population_size;
        let mut next_generation = Vec::with_capacity(population_size);

        // Elites, in species creation order
        for species in &self.species {
            if next_generation.len() == population_size {
                break;
            }
            next_generation.push(self.current_generation[species.members()[0]].clone());
        }

        let totals: Vec<f64> = order
            .iter()
            .map(|&index| self.species[index].total_fitness(adjusted))
            .collect();
        let grand_total: f64 = totals.iter().sum();

        while next_generation.len() < population_size {
            let species = &self.species[pick_weighted(rng, order, &totals, grand_total)];

            let parent1 = pick_member(rng, species.members(), adjusted);
            let parent2 = pick_member(rng, species.members(), adjusted);
            let (fitter, other) = if adjusted[parent1] > adjusted[parent2] {
                (parent1, parent2)
            } else {
                (parent2, parent1)
            };

            let mut child = crossover(
                &self.current_generation[fitter],
                &self.current_generation[other],
                rng,
            );

            if rng.gen::<f64>() < self.config.weight_mutation_rate {
                child.weight_mutation(rng);
            }
            if rng.gen::<f64>() < self.config.add_connection_rate {
                child.add_connection_mutation(
                    rng,
                    &self.innovation,
                    self.config.add_connection_attempts,
                );
            }
            if rng.gen::<f64>() < self.config.add_neuron_rate {
                child.add_neuron_mutation(rng, &self.neuron_uids, &self.innovation);
            }

            next_generation.push(child);
        }

        next_generation
    }

    /// The number of generation transitions completed.
    pub fn generation_number(&self) -> u64 {
        self.generation_number
    }

    /// Current number of species in the population.
    pub fn num_species(&self) -> usize {
        self.species.len()
    }

    /// Species of the most recently evaluated generation.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Greatest raw fitness seen in the most recently evaluated generation.
    pub fn best_fitness(&self) -> Option<f64> {
        self.best.as_ref().map(|(fitness, _)| *fitness)
    }

    /// The genome that achieved [`best_fitness`](Self::best_fitness).
    pub fn fittest(&self) -> Option<&Genome> {
        self.best.as_ref().map(|(_, genome)| genome)
    }

    /// The generation that will be speciated and evaluated next.
    pub fn population(&self) -> &[Genome] {
        &self.current_generation
    }

    pub fn compatibility_threshold(&self) -> f64 {
        self.compatibility_threshold
    }

    pub fn config(&self) -> &NeatConfig {
        &self.config
    }
}

/// Fitness-proportionate choice over a descending-sorted index list:
/// cumulative normalized sums, first entry strictly exceeding a [0, 1) draw.
/// A non-positive (or non-finite) total degenerates to a uniform choice.
fn pick_weighted<R: Rng>(rng: &mut R, order: &[usize], totals: &[f64], grand_total: f64) -> usize {
    if grand_total <= 0.0 || !grand_total.is_finite() {
        return order[rng.gen_range(0..order.len())];
    }

    let target = rng.gen::<f64>();
    let mut acc = 0.0;
    for (slot, &index) in order.iter().enumerate() {
        acc += totals[slot] / grand_total;
        if acc > target {
            return index;
        }
    }
    order[order.len() - 1]
}

/// Fitness-proportionate parent choice within a species, with replacement.
fn pick_member<R: Rng>(rng: &mut R, members: &[usize], adjusted: &[f64]) -> usize {
    let total: f64 = members.iter().map(|&index| adjusted[index]).sum();
    if total <= 0.0 || !total.is_finite() {
        return members[rng.gen_range(0..members.len())];
    }

    let target = rng.gen::<f64>();
    let mut acc = 0.0;
    for &member in members {
        acc += adjusted[member] / total;
        if acc > target {
            return member;
        }
    }
    members[members.len() - 1]
}
