//! Recombination and compatibility distance between genomes.

use super::Genome;
use crate::alignment::align;
use rand::Rng;

const DISTANCE_EXCESS_COEFFICIENT: f64 = 1.0;
const DISTANCE_DISJOINT_COEFFICIENT: f64 = 1.0;
const DISTANCE_WEIGHT_COEFFICIENT: f64 = 0.4;

/// Cross two parents into a child, aligned by innovation markers.
///
/// `fitter` must be the parent with the higher (adjusted) fitness. The child
/// receives all of the fitter parent's neurons. Each of the fitter parent's
/// connection genes is inherited from either parent with equal probability
/// when `other` carries a gene with the same innovation marker (a matching
/// gene), and from the fitter parent otherwise. Disjoint and excess genes of
/// the weaker parent are never inherited, so the child contains no structure
/// absent from the fitter parent.
pub fn crossover<R: Rng>(fitter: &Genome, other: &Genome, rng: &mut R) -> Genome {
    let mut child = Genome::new();

    for &neuron in fitter.neurons() {
        child.push_neuron(neuron);
    }

    for connection in fitter.connections() {
        let inherited = match other.connection_by_innovation(connection.innovation) {
            Some(matching) if rng.gen::<bool>() => *matching,
            _ => *connection,
        };
        child.push_connection(inherited);
    }

    child
}

/// Compatibility distance used for speciation:
/// `c1 * E / N + c2 * D / N + c3 * W` with `c1 = c2 = 1.0` and `c3 = 0.4`,
/// where `E` and `D` are the excess and disjoint gene counts, `N` is the
/// larger connection count of the two genomes and `W` is the mean absolute
/// weight difference over matching genes.
///
/// Defined fallbacks for the degenerate cases: with no matching genes the
/// weight term is 0, and two connectionless genomes are at distance 0.
/// Symmetric, and 0 for identical genomes.
pub fn compatibility_distance(a: &Genome, b: &Genome) -> f64 {
    let n = a.connections().len().max(b.connections().len());
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;

    let alignment = align(&a.innovation_markers(), &b.innovation_markers());

    let mut weight_difference = 0.0;
    let mut matching = 0usize;
    for connection in a.connections() {
        if let Some(counterpart) = b.connection_by_innovation(connection.innovation) {
            weight_difference += (connection.weight - counterpart.weight).abs();
            matching += 1;
        }
    }
    let mean_weight_difference = if matching > 0 {
        weight_difference / matching as f64
    } else {
        0.0
    };

    DISTANCE_EXCESS_COEFFICIENT * alignment.excess as f64 / n
        + DISTANCE_DISJOINT_COEFFICIENT * alignment.disjoint as f64 / n
        + DISTANCE_WEIGHT_COEFFICIENT * mean_weight_difference
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{ConnectionGene, NeuronGene, NeuronLayer};
    use crate::innovation::InnovationGenerator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(99)
    }

    fn seed_genome() -> Genome {
        Genome::fully_connected(2, 1, &InnovationGenerator::new(), &InnovationGenerator::new())
    }

    /// Two genomes diverged from a common seed, sharing uid and innovation
    /// generators so markers stay globally unique across the pair.
    fn diverged_pair() -> (Genome, Genome) {
        let mut rng_a = ChaCha8Rng::seed_from_u64(5);
        let mut rng_b = ChaCha8Rng::seed_from_u64(6);
        let neuron_uids = InnovationGenerator::starting_at(3);
        let innovation = InnovationGenerator::starting_at(2);

        let mut a = seed_genome();
        let mut b = a.clone();
        for _ in 0..6 {
            a.weight_mutation(&mut rng_a);
            a.add_neuron_mutation(&mut rng_a, &neuron_uids, &innovation);
            a.add_connection_mutation(&mut rng_a, &innovation, 10);
            b.weight_mutation(&mut rng_b);
            b.add_neuron_mutation(&mut rng_b, &neuron_uids, &innovation);
            b.add_connection_mutation(&mut rng_b, &innovation, 10);
        }
        (a, b)
    }

    #[test]
    fn test_self_crossover_is_identity() {
        let (genome, _) = diverged_pair();
        let child = crossover(&genome, &genome, &mut rng());

        assert_eq!(child.neurons().len(), genome.neurons().len());
        assert_eq!(child.connections(), genome.connections());
    }

    #[test]
    fn test_child_has_no_structure_absent_from_fitter() {
        let mut rng = rng();
        let (fitter, other) = diverged_pair();

        for _ in 0..20 {
            let child = crossover(&fitter, &other, &mut rng);
            assert_eq!(child.connections().len(), fitter.connections().len());
            for connection in child.connections() {
                let original = fitter
                    .connection_by_innovation(connection.innovation)
                    .expect("marker must come from the fitter parent");
                assert_eq!(connection.from, original.from);
                assert_eq!(connection.to, original.to);
            }
        }
    }

    #[test]
    fn test_matching_genes_inherited_from_both_parents() {
        let mut rng = rng();
        let mut fitter = Genome::new();
        let mut other = Genome::new();
        for genome in [&mut fitter, &mut other] {
            genome.push_neuron(NeuronGene::new(0, NeuronLayer::Input));
            genome.push_neuron(NeuronGene::new(1, NeuronLayer::Output));
        }
        fitter.push_connection(ConnectionGene::new(0, 1, 0, 1.0, true));
        other.push_connection(ConnectionGene::new(0, 1, 0, -1.0, true));

        let mut saw_fitter = false;
        let mut saw_other = false;
        for _ in 0..100 {
            let child = crossover(&fitter, &other, &mut rng);
            match child.connections()[0].weight {
                w if w > 0.0 => saw_fitter = true,
                _ => saw_other = true,
            }
        }
        assert!(saw_fitter && saw_other, "both parents must contribute");
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let (genome, _) = diverged_pair();
        assert_eq!(compatibility_distance(&genome, &genome), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let (a, b) = diverged_pair();
        let forward = compatibility_distance(&a, &b);
        let backward = compatibility_distance(&b, &a);
        assert!((forward - backward).abs() < 1e-12);
        assert!(forward > 0.0);
    }

    #[test]
    fn test_distance_of_empty_genomes_is_zero() {
        assert_eq!(compatibility_distance(&Genome::new(), &Genome::new()), 0.0);
    }

    #[test]
    fn test_distance_without_matching_genes() {
        let mut a = Genome::new();
        let mut b = Genome::new();
        for genome in [&mut a, &mut b] {
            genome.push_neuron(NeuronGene::new(0, NeuronLayer::Input));
            genome.push_neuron(NeuronGene::new(1, NeuronLayer::Output));
        }
        a.push_connection(ConnectionGene::new(0, 1, 0, 1.0, true));
        b.push_connection(ConnectionGene::new(0, 1, 1, 1.0, true));

        // One disjoint, one excess, N = 1, weight term falls back to 0
        let distance = compatibility_distance(&a, &b);
        assert!((distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_term() {
        let mut a = Genome::new();
        let mut b = Genome::new();
        for genome in [&mut a, &mut b] {
            genome.push_neuron(NeuronGene::new(0, NeuronLayer::Input));
            genome.push_neuron(NeuronGene::new(1, NeuronLayer::Output));
        }
        a.push_connection(ConnectionGene::new(0, 1, 0, 1.5, true));
        b.push_connection(ConnectionGene::new(0, 1, 0, -0.5, true));

        // No disjoint or excess genes; distance is 0.4 * |1.5 - (-0.5)|
        let distance = compatibility_distance(&a, &b);
        assert!((distance - 0.8).abs() < 1e-12);
    }
}
