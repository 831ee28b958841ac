//! # ACO Itinerary
//!
//! Searches for high-coverage, time-feasible visiting itineraries over
//! locations with opening windows: an Orienteering Problem with Time Windows
//! solved by a hybrid of Ant Colony Optimization and a genetic algorithm.
//!
//! Ants build itineraries guided by pheromone, travel time and an inherited
//! genome. Each colony breeds its fittest ants every generation, and all
//! colonies reinforce one shared pheromone field.

pub mod ant;
pub mod colony;
pub mod config;
pub mod environment;
pub mod error;
pub mod genetic;
pub mod policy;
pub mod utils;

use crate::ant::Stop;
use crate::colony::Colony;
use crate::config::Config;
use crate::environment::{Environment, PathRecord};
use crate::error::{Error, Result};
use crate::utils::SearchStatistics;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

/// The fittest itinerary seen during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BestItinerary {
    pub start_location: String,
    pub generation: u32,
    pub fitness: f64,
    pub itinerary: Vec<Stop>,
}

/// Runs many colonies per generation over one shared pheromone field.
pub struct Optimizer {
    environment: Environment,
    colonies: Vec<Colony>,
    config: Config,
    rng: ChaCha8Rng,
    generation: u32,
    best: Option<BestItinerary>,
    last_mean_fitness: f64,
    run_time: Duration,
}

impl Optimizer {
    /// Create an optimizer without colonies.
    pub fn new(environment: Environment, config: Config) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Optimizer {
            environment,
            colonies: Vec::new(),
            config,
            rng,
            generation: 0,
            best: None,
            last_mean_fitness: 0.0,
            run_time: Duration::from_secs(0),
        })
    }

    /// Start `config.num_colonies` colonies over every location of the graph.
    pub fn initialize(&mut self) -> Result<()> {
        let (locations, opening_minutes) = self.environment.locations(&HashSet::new());
        self.initialize_colonies(&locations, &opening_minutes, self.config.num_colonies)
    }

    /// Create one colony per assigned start location.
    ///
    /// Start locations are dealt in shuffled blocks covering every location,
    /// so no location starts a second colony before all have started one.
    /// The last block is truncated, which samples it without replacement.
    pub fn initialize_colonies(
        &mut self,
        locations: &[String],
        opening_minutes: &[u32],
        num_colonies: usize,
    ) -> Result<()> {
        if locations.is_empty() {
            return Err(Error::Configuration("no start locations available".into()));
        }
        if locations.len() != opening_minutes.len() {
            return Err(Error::Configuration(format!(
                "{} locations but {} opening minutes",
                locations.len(),
                opening_minutes.len()
            )));
        }
        for location in locations {
            self.environment.location(location)?;
        }

        let mut indices = Vec::with_capacity(num_colonies + locations.len());
        while indices.len() < num_colonies {
            let mut block: Vec<usize> = (0..locations.len()).collect();
            block.shuffle(&mut self.rng);
            indices.extend(block);
        }
        indices.truncate(num_colonies);

        for index in indices {
            let rng = ChaCha8Rng::seed_from_u64(self.rng.gen());
            let colony = Colony::new(
                locations[index].clone(),
                opening_minutes[index],
                &self.config,
                rng,
            )?;
            self.colonies.push(colony);
        }

        info!(
            "Initialized {} colonies over {} start locations",
            self.colonies.len(),
            locations.len()
        );
        Ok(())
    }

    /// Move every colony through one generation, then apply one combined
    /// pheromone update.
    ///
    /// Returns the path records of all ants, in colony order.
    pub fn run_one_generation(&mut self) -> Result<Vec<PathRecord>> {
        if self.colonies.is_empty() {
            return Err(Error::Configuration("optimizer has no colonies".into()));
        }

        let environment = &self.environment;
        let per_colony: Vec<Vec<PathRecord>> = self
            .colonies
            .par_iter_mut()
            .map(|colony| colony.move_all(environment))
            .collect::<Result<_>>()?;

        let paths: Vec<PathRecord> = per_colony.into_iter().flatten().collect();
        self.environment.deposit(&paths);

        self.generation += 1;
        self.update_best();
        self.last_mean_fitness = if paths.is_empty() {
            0.0
        } else {
            paths.iter().map(|path| path.fitness).sum::<f64>() / paths.len() as f64
        };

        info!(
            "Generation {} finished: {} ants, mean fitness {:.2}, best fitness {:.2}",
            self.generation,
            paths.len(),
            self.last_mean_fitness,
            self.best.as_ref().map_or(f64::NAN, |best| best.fitness)
        );

        Ok(paths)
    }

    /// Run `generations` generations, initializing colonies first if needed.
    pub fn run(&mut self, generations: u32) -> Result<SearchStatistics> {
        let start_time = Instant::now();

        if self.colonies.is_empty() {
            self.initialize()?;
        }
        for _ in 0..generations {
            self.run_one_generation()?;
        }

        self.run_time += start_time.elapsed();
        Ok(self.statistics())
    }

    /// Drop every colony whose start location is not in `keep`.
    ///
    /// Returns the number of removed colonies.
    pub fn cull(&mut self, keep: &HashSet<String>) -> Result<usize> {
        if !self
            .colonies
            .iter()
            .any(|colony| keep.contains(colony.start_location()))
        {
            return Err(Error::Configuration("culling would remove every colony".into()));
        }

        let before = self.colonies.len();
        self.colonies.retain(|colony| keep.contains(colony.start_location()));
        let removed = before - self.colonies.len();

        debug!("Culled {} colonies, {} remain", removed, self.colonies.len());
        Ok(removed)
    }

    /// Allow itineraries of up to `max_days` days from now on.
    pub fn enable_multi_day(&mut self, max_days: u32) -> Result<()> {
        if max_days == 0 {
            return Err(Error::Configuration("max_days must be at least 1".into()));
        }

        self.config.max_days = max_days;
        for colony in self.colonies.iter_mut() {
            colony.set_max_days(max_days);
        }

        info!("Multi-day itineraries enabled for up to {} days", max_days);
        Ok(())
    }

    /// Distinct start locations ranked by mean visited locations, best first.
    ///
    /// A location started by several colonies scores the average over them.
    /// Each colony contributes the mean of its last finished generation, or 0
    /// if it has not run yet. Ties keep name order.
    pub fn ranking(&self) -> Vec<(String, f64)> {
        let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for colony in &self.colonies {
            let mean_visited = colony.last_stats().map_or(0.0, |stats| stats.mean_visited);
            let entry = totals.entry(colony.start_location()).or_insert((0.0, 0));
            entry.0 += mean_visited;
            entry.1 += 1;
        }

        let mut ranking: Vec<(String, f64)> = totals
            .into_iter()
            .map(|(location, (sum, count))| (location.to_string(), sum / count as f64))
            .collect();

        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranking
    }

    /// The best `max(1, floor(n * cut_off))` of the `n` distinct start
    /// locations in the ranking.
    pub fn top_start_locations(&self, cut_off: f64) -> HashSet<String> {
        let ranking = self.ranking();
        let count = ((ranking.len() as f64 * cut_off).floor() as usize).max(1);

        ranking
            .into_iter()
            .take(count)
            .map(|(location, _)| location)
            .collect()
    }

    /// Summarize the run so far.
    pub fn statistics(&self) -> SearchStatistics {
        SearchStatistics {
            generations: self.generation,
            runtime: self.run_time,
            colonies: self.colonies.len(),
            best_fitness: self.best.as_ref().map_or(0.0, |best| best.fitness),
            best_visited: self.best.as_ref().map_or(0, |best| {
                best.itinerary
                    .iter()
                    .map(|stop| stop.location.as_str())
                    .collect::<HashSet<_>>()
                    .len()
            }),
            best_start_location: self.best.as_ref().map(|best| best.start_location.clone()),
            last_mean_fitness: self.last_mean_fitness,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn colonies(&self) -> &[Colony] {
        &self.colonies
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of finished generations.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn best(&self) -> Option<&BestItinerary> {
        self.best.as_ref()
    }

    fn update_best(&mut self) {
        for colony in &self.colonies {
            let Some(stats) = colony.last_stats() else {
                continue;
            };
            let improved = self
                .best
                .as_ref()
                .map_or(true, |best| stats.best_fitness > best.fitness);

            if improved {
                self.best = Some(BestItinerary {
                    start_location: colony.start_location().to_string(),
                    generation: stats.generation,
                    fitness: stats.best_fitness,
                    itinerary: stats.best_itinerary.clone(),
                });
            }
        }
    }
}
