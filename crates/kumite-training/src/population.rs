//! Population management: selection, reproduction, elitism.
//!
//! A [`Population`] owns one generation's genomes. Evaluation happens
//! elsewhere (workers return fitness deltas that the trainer merges in);
//! this module is only concerned with turning a scored generation into the
//! next one:
//!
//! 1. Sort descending by fitness (stable: ties keep their input order)
//! 2. **Elitism** - carbon copies of the top two genomes take slots 0 and 1,
//!    with fresh ids and zeroed scores
//! 3. **Selection pool** - the top quarter of the sorted population
//! 4. **Reproduction** - pairs drawn uniformly from the pool (with
//!    replacement; self-pairing permitted) produce children by uniform
//!    crossover plus mutation at the current rate
//!
//! The reproduction loop pushes exactly one genome per iteration, so it
//! terminates after `N - 2` iterations by construction.

use rand::Rng;

use kumite_brain::{Genome, Network};
use kumite_stats::FitnessSummary;

/// Default population size.
pub const DEFAULT_POPULATION_SIZE: usize = 48;
/// Genomes carried over unchanged each generation.
pub const ELITE_COUNT: usize = 2;

/// One generation's worth of genomes.
///
/// Exclusively owned by the evolution side: workers only ever see deep
/// copies of the networks they evaluate.
#[derive(Debug, Clone)]
pub struct Population {
    genomes: Vec<Genome>,
    generation: u32,
}

impl Population {
    /// A fresh generation-1 population of randomly initialized networks.
    pub fn random<R>(size: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let generation = 1;
        let genomes = (0..size)
            .map(|index| Genome::new(Genome::lineage_id(generation, index), Network::random(rng)))
            .collect();
        Self {
            genomes,
            generation,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.genomes.len()
    }

    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Looks up a live genome by id.
    #[must_use]
    pub fn genome_mut(&mut self, id: &str) -> Option<&mut Genome> {
        self.genomes.iter_mut().find(|genome| genome.id() == id)
    }

    /// Sorts descending by fitness. Stable: a tied group keeps input order.
    pub fn sort_by_fitness(&mut self) {
        self.genomes
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
    }

    /// The current best genome (after [`Self::sort_by_fitness`], slot 0).
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    /// Replaces the lowest-fitness member with `genome` (import support).
    pub fn replace_worst(&mut self, genome: Genome) {
        let worst = self
            .genomes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.fitness().total_cmp(&b.fitness()))
            .map(|(index, _)| index);
        match worst {
            Some(index) => self.genomes[index] = genome,
            None => self.genomes.push(genome),
        }
    }

    /// Fitness distribution of the current generation.
    #[must_use]
    pub fn fitness_summary(&self) -> Option<FitnessSummary> {
        FitnessSummary::from_scores(self.genomes.iter().map(Genome::fitness))
    }

    /// Produces the next generation from this (scored) one.
    #[must_use]
    pub fn evolve<R>(&mut self, mutation_rate: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        self.sort_by_fitness();
        let next_generation = self.generation + 1;
        let mut next = Vec::with_capacity(self.genomes.len());

        // elite carry-over
        for elite in self.genomes.iter().take(ELITE_COUNT) {
            next.push(elite.reborn_as(Genome::lineage_id(next_generation, next.len())));
        }

        // reproduce from the top quarter
        let pool = &self.genomes[..self.genomes.len().div_ceil(4)];
        while next.len() < self.genomes.len() {
            let p1 = &pool[rng.random_range(0..pool.len())];
            let p2 = &pool[rng.random_range(0..pool.len())];
            let mut network = Network::crossover(p1.network(), p2.network(), rng);
            network.mutate(mutation_rate, rng);
            next.push(Genome::new(
                Genome::lineage_id(next_generation, next.len()),
                network,
            ));
        }

        Self {
            genomes: next,
            generation: next_generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    fn scored_population(size: usize) -> Population {
        let mut rng = rng();
        let mut population = Population::random(size, &mut rng);
        #[expect(clippy::cast_precision_loss)]
        for (index, genome) in population.genomes.iter_mut().enumerate() {
            genome.add_fitness(100.0 - index as f32);
        }
        population
    }

    #[test]
    fn test_random_population_ids_and_generation() {
        let mut rng = rng();
        let population = Population::random(4, &mut rng);
        assert_eq!(population.generation(), 1);
        let ids: Vec<_> = population.genomes().iter().map(Genome::id).collect();
        assert_eq!(ids, ["gen1-0", "gen1-1", "gen1-2", "gen1-3"]);
    }

    #[test]
    fn test_elites_are_bit_identical_with_zeroed_scores() {
        let mut population = scored_population(48);
        let best_networks: Vec<Network> = population.genomes()[..2]
            .iter()
            .map(|g| g.network().clone())
            .collect();

        let next = population.evolve(0.3, &mut rng());
        assert_eq!(next.generation(), 2);
        assert_eq!(next.size(), 48);
        for (slot, expected) in best_networks.iter().enumerate() {
            let elite = &next.genomes()[slot];
            assert_eq!(elite.network(), expected);
            assert_eq!(elite.fitness(), 0.0);
            assert_eq!(elite.matches_won(), 0);
            assert_eq!(elite.id(), Genome::lineage_id(2, slot));
        }
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut rng = rng();
        let mut population = Population::random(4, &mut rng);
        population.genomes[0].add_fitness(10.0);
        population.genomes[1].add_fitness(50.0);
        population.genomes[2].add_fitness(50.0);
        population.genomes[3].add_fitness(50.0);
        population.sort_by_fitness();
        let ids: Vec<_> = population.genomes().iter().map(Genome::id).collect();
        assert_eq!(ids, ["gen1-1", "gen1-2", "gen1-3", "gen1-0"]);
    }

    #[test]
    fn test_children_get_next_generation_ids() {
        let mut population = scored_population(9);
        let next = population.evolve(0.1, &mut rng());
        for (index, genome) in next.genomes().iter().enumerate() {
            assert_eq!(genome.id(), Genome::lineage_id(2, index));
        }
    }

    #[test]
    fn test_replace_worst_targets_lowest_fitness() {
        let mut population = scored_population(4);
        let incoming = Genome::new("imported".to_owned(), Network::zeroed());
        population.replace_worst(incoming);
        assert!(population.genome_mut("imported").is_some());
        // The previous worst (gen1-3, fitness 97) is gone.
        assert!(population.genome_mut("gen1-3").is_none());
    }

    #[test]
    fn test_fitness_summary_covers_the_population() {
        let population = scored_population(4);
        let summary = population.fitness_summary().unwrap();
        assert_eq!(summary.best, 100.0);
        assert_eq!(summary.worst, 97.0);
        assert_eq!(summary.spread(), 3.0);
    }
}
