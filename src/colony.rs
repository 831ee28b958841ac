//! Colony management for the evolutionary loop.

use crate::ant::{Ant, AntSettings, Stop};
use crate::config::{Config, FitnessWeights};
use crate::environment::{Environment, PathRecord};
use crate::error::{Error, Result};
use crate::genetic::{Genetic, Genome};
use crate::policy::{weighted_index, DecisionPolicy};
use log::debug;
use rand::prelude::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Summary of one finished generation of a colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub ants: usize,
    pub mean_visited: f64,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    /// Itinerary of the fittest ant of the generation
    pub best_itinerary: Vec<Stop>,
}

/// A fixed-size set of ants sharing one start location.
pub struct Colony {
    start_location: String,
    start_minute: u32,
    generation: u32,
    size: usize,
    survival_rate: f64,
    policy: DecisionPolicy,
    initial_genome: Genome,
    settings: AntSettings,
    fitness_weights: FitnessWeights,
    ants: Vec<Ant>,
    last_stats: Option<GenerationStats>,
    rng: ChaCha8Rng,
}

impl Colony {
    /// Create a colony at `start_location` and spawn its first generation.
    pub fn new(
        start_location: impl Into<String>,
        start_minute: u32,
        config: &Config,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        if config.ants_per_colony < 2 {
            return Err(Error::Configuration(format!(
                "a colony needs at least 2 ants to breed, got {}",
                config.ants_per_colony
            )));
        }
        if !(config.survival_rate > 0.0 && config.survival_rate <= 1.0) {
            return Err(Error::Configuration(format!(
                "survival_rate must lie in (0, 1], got {}",
                config.survival_rate
            )));
        }

        let mut colony = Colony {
            start_location: start_location.into(),
            start_minute,
            generation: 0,
            size: config.ants_per_colony,
            survival_rate: config.survival_rate,
            policy: config.policy,
            initial_genome: Genome::new(config.initial_genome.clone()),
            settings: AntSettings::from(config),
            fitness_weights: config.fitness,
            ants: Vec::new(),
            last_stats: None,
            rng,
        };
        colony.spawn(colony.size);

        Ok(colony)
    }

    /// Replace the live ants with `n` fresh ants carrying the initial genome.
    pub fn spawn(&mut self, n: usize) {
        let genome = self.initial_genome.clone();
        let generation = self.generation;
        let ants: Vec<Ant> = (0..n)
            .map(|_| self.new_ant(genome.clone(), generation))
            .collect();
        self.ants = ants;
    }

    /// Score an ant: coverage reward minus a penalty per elapsed hour.
    pub fn fitness(&self, ant: &Ant) -> f64 {
        ant.visited_count() as f64 * self.fitness_weights.per_location
            - ant.elapsed_minutes() as f64 / 60.0 * self.fitness_weights.per_hour
    }

    /// Fitness-proportionate selection with replacement.
    ///
    /// Returns indices into the live ants; always at least 2 of them. Falls
    /// back to a uniform draw when the fitness values cannot form weights.
    pub fn select(&mut self, survival_rate: f64) -> Vec<usize> {
        let mut weights: Vec<f64> = self.ants.iter().map(|ant| self.fitness(ant)).collect();

        let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
        if min < 0.0 {
            for weight in weights.iter_mut() {
                *weight = *weight - min + 1.0;
            }
        }

        let count = ((self.ants.len() as f64 * survival_rate).round() as usize).max(2);

        match weighted_index(&weights) {
            Some(distribution) => (0..count)
                .map(|_| distribution.sample(&mut self.rng))
                .collect(),
            None => (0..count)
                .map(|_| self.rng.gen_range(0..self.ants.len()))
                .collect(),
        }
    }

    /// Create one offspring from the itineraries of two live ants.
    pub fn breed(&mut self, parent1: usize, parent2: usize) -> Ant {
        let genome1 = self.ants[parent1].genome_from_itinerary();
        let genome2 = self.ants[parent2].genome_from_itinerary();
        let generation = self.ants[parent1].generation() + 1;

        let child = Genetic.crossover(&genome1, &genome2, &mut self.rng);
        self.new_ant(child, generation)
    }

    /// Select survivors, breed a full new population from them and replace
    /// the live ants.
    pub fn advance_generation(&mut self) {
        let survivors = self.select(self.survival_rate);
        let mut offspring = Vec::with_capacity(self.size);

        while offspring.len() < self.size {
            let parent1 = survivors[self.rng.gen_range(0..survivors.len())];
            let parent2 = survivors[self.rng.gen_range(0..survivors.len())];
            offspring.push(self.breed(parent1, parent2));
        }

        self.ants = offspring;
        self.generation += 1;
    }

    /// Run every ant to completion, record its path and fitness, then
    /// advance to the next generation.
    ///
    /// The returned records belong to the generation that just finished.
    pub fn move_all(&mut self, environment: &Environment) -> Result<Vec<PathRecord>> {
        self.ants
            .par_iter_mut()
            .try_for_each(|ant| ant.run_to_completion(environment))?;

        let records: Vec<PathRecord> = self
            .ants
            .iter()
            .map(|ant| ant.to_record(self.fitness(ant)))
            .collect();

        self.last_stats = Some(self.summarize(&records));
        if let Some(stats) = &self.last_stats {
            debug!(
                "Colony {} generation {}: best fitness {:.2}, mean visited {:.2}",
                self.start_location, stats.generation, stats.best_fitness, stats.mean_visited
            );
        }

        self.advance_generation();

        Ok(records)
    }

    /// Override the day limit for the live ants and all future offspring.
    pub fn set_max_days(&mut self, days: u32) {
        self.settings.max_days = days;
        for ant in self.ants.iter_mut() {
            ant.set_max_days(days);
        }
    }

    pub fn start_location(&self) -> &str {
        &self.start_location
    }

    pub fn start_minute(&self) -> u32 {
        self.start_minute
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Configured population size.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    /// Number of live ants.
    pub fn ant_count(&self) -> usize {
        self.ants.len()
    }

    /// Statistics of the most recently finished generation.
    pub fn last_stats(&self) -> Option<&GenerationStats> {
        self.last_stats.as_ref()
    }

    fn new_ant(&mut self, genome: Genome, generation: u32) -> Ant {
        let rng = ChaCha8Rng::seed_from_u64(self.rng.gen());
        Ant::new(
            &self.start_location,
            self.start_minute,
            genome,
            self.policy,
            generation,
            self.settings,
            rng,
        )
    }

    fn summarize(&self, records: &[PathRecord]) -> GenerationStats {
        let ants = self.ants.len();
        let total_visited: usize = self.ants.iter().map(Ant::visited_count).sum();
        let (best_index, best_fitness) = records
            .iter()
            .map(|record| record.fitness)
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (index, fitness)| {
                if fitness > best.1 {
                    (index, fitness)
                } else {
                    best
                }
            });
        let mean_fitness = records.iter().map(|record| record.fitness).sum::<f64>() / ants as f64;

        GenerationStats {
            generation: self.generation,
            ants,
            mean_visited: total_visited as f64 / ants as f64,
            best_fitness,
            mean_fitness,
            best_itinerary: self.ants[best_index].itinerary().to_vec(),
        }
    }
}
