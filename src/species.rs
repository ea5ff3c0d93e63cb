//! Species: a cluster of genomes within a compatibility threshold of a mascot.

use crate::genome::Genome;
use rand::Rng;

/// One species of the population. The mascot is the representative the
/// compatibility threshold is measured against; it is a genome in its own
/// right and not necessarily a current member. Members are stored as indices
/// into the generation being speciated, so the per-genome fitness and species
/// assignments can stay flat index-keyed vectors.
#[derive(Clone, Debug)]
pub struct Species {
    mascot: Genome,
    members: Vec<usize>,
}

impl Species {
    /// Found a new species around the genome at `founder_index`. As in the
    /// founding of any species, the founder is both mascot and first member.
    pub fn new(mascot: Genome, founder_index: usize) -> Self {
        Self {
            mascot,
            members: vec![founder_index],
        }
    }

    pub fn mascot(&self) -> &Genome {
        &self.mascot
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn add_member(&mut self, index: usize) {
        self.members.push(index);
    }

    /// Number of members in the species.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Sort members descending by their adjusted fitness.
    pub fn rank_members(&mut self, adjusted_fitness: &[f64]) {
        self.members.sort_by(|&a, &b| {
            adjusted_fitness[b]
                .partial_cmp(&adjusted_fitness[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Sum of the members' adjusted fitness.
    pub fn total_fitness(&self, adjusted_fitness: &[f64]) -> f64 {
        self.members.iter().map(|&i| adjusted_fitness[i]).sum()
    }

    /// Drop the member list without touching the mascot. Used when member
    /// indices are about to lose the generation they point into.
    pub fn clear_members(&mut self) {
        self.members.clear();
    }

    /// Clear the member list and promote one member, chosen uniformly at
    /// random from `generation` (the outgoing membership), to mascot. The new
    /// mascot is not re-added as a member; it only rejoins if the next
    /// speciation pass places it here again.
    pub fn reset<R: Rng>(&mut self, rng: &mut R, generation: &[Genome]) {
        if !self.members.is_empty() {
            let chosen = self.members[rng.gen_range(0..self.members.len())];
            self.mascot = generation[chosen].clone();
        }
        self.members.clear();
    }
}
