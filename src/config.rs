//! Configuration parameters for the itinerary search.

use crate::error::{Error, Result};
use crate::policy::DecisionPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Minutes in one simulated day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Evaporation and deposit settings of the pheromone field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PheromoneParams {
    /// Multiplier applied to every edge once per update
    pub decay_factor: f64,
    /// Deposit constant Q; a path of cost L adds Q / L to each of its edges
    pub deposit_constant: f64,
    /// Pheromone seeded on every edge when the graph is built
    pub initial: f64,
    /// Lower clamp bound
    pub min: f64,
    /// Upper clamp bound
    pub max: f64,
}

impl Default for PheromoneParams {
    fn default() -> Self {
        PheromoneParams {
            decay_factor: 0.9,
            deposit_constant: 1.0,
            initial: 1.0,
            min: 1.0,
            max: 100.0,
        }
    }
}

/// Exponents and boosts used by the weighted decision policies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionParams {
    /// Pheromone influence (α)
    pub alpha: f64,
    /// Travel time influence (β)
    pub beta: f64,
    /// Genome influence (γ)
    pub gamma: f64,
    /// Weight multiplier for destinations contained in the genome
    pub genome_boost: f64,
}

impl Default for DecisionParams {
    fn default() -> Self {
        DecisionParams {
            alpha: 1.0,
            beta: 2.0,
            gamma: 1.5,
            genome_boost: 2.0,
        }
    }
}

/// Coefficients of the ant fitness function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    /// Reward per distinct visited location
    pub per_location: f64,
    /// Penalty per elapsed hour
    pub per_hour: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        FitnessWeights {
            per_location: 100.0,
            per_hour: 1.0,
        }
    }
}

/// Configuration settings for the optimizer and its colonies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of colonies started per run
    pub num_colonies: usize,
    /// Number of ants living in each colony
    pub ants_per_colony: usize,
    /// Minutes spent at every visited location
    pub stay_minutes: u32,
    /// Minute of day after which no ant may depart
    pub day_end_minute: u32,
    /// Number of days an itinerary may span
    pub max_days: u32,
    /// Share of a colony drawn as breeding survivors
    pub survival_rate: f64,
    /// Decision policy of freshly spawned ants
    pub policy: DecisionPolicy,
    /// Genome handed to the first generation
    pub initial_genome: Vec<String>,
    /// Seed of the master random generator
    pub seed: u64,
    pub decision: DecisionParams,
    pub pheromone: PheromoneParams,
    pub fitness: FitnessWeights,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_colonies: 10,
            ants_per_colony: 20,
            stay_minutes: 30,
            day_end_minute: 23 * 60,
            max_days: 1,
            survival_rate: 0.2,
            policy: DecisionPolicy::Uniform,
            initial_genome: Vec::new(),
            seed: 42,
            decision: DecisionParams::default(),
            pheromone: PheromoneParams::default(),
            fitness: FitnessWeights::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the number of colonies.
    pub fn with_num_colonies(mut self, n: usize) -> Self {
        self.num_colonies = n;
        self
    }

    /// Set the number of ants per colony.
    pub fn with_ants_per_colony(mut self, n: usize) -> Self {
        self.ants_per_colony = n;
        self
    }

    /// Set the stay duration at each location.
    pub fn with_stay_minutes(mut self, minutes: u32) -> Self {
        self.stay_minutes = minutes;
        self
    }

    /// Set the latest departure minute of a day.
    pub fn with_day_end_minute(mut self, minute: u32) -> Self {
        self.day_end_minute = minute;
        self
    }

    /// Set the day limit of each itinerary.
    pub fn with_max_days(mut self, days: u32) -> Self {
        self.max_days = days;
        self
    }

    /// Set the survival rate used by selection.
    pub fn with_survival_rate(mut self, rate: f64) -> Self {
        self.survival_rate = rate;
        self
    }

    /// Set the decision policy.
    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the initial genome.
    pub fn with_initial_genome(mut self, genome: Vec<String>) -> Self {
        self.initial_genome = genome;
        self
    }

    /// Set the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the decision policy parameters.
    pub fn with_decision(mut self, decision: DecisionParams) -> Self {
        self.decision = decision;
        self
    }

    /// Set the pheromone parameters.
    pub fn with_pheromone(mut self, pheromone: PheromoneParams) -> Self {
        self.pheromone = pheromone;
        self
    }

    /// Set the fitness weights.
    pub fn with_fitness(mut self, fitness: FitnessWeights) -> Self {
        self.fitness = fitness;
        self
    }

    /// Reject settings the search cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.num_colonies == 0 {
            return Err(Error::Configuration("num_colonies must be at least 1".into()));
        }
        if self.ants_per_colony < 2 {
            return Err(Error::Configuration(format!(
                "ants_per_colony must be at least 2, got {}",
                self.ants_per_colony
            )));
        }
        if !(self.survival_rate > 0.0 && self.survival_rate <= 1.0) {
            return Err(Error::Configuration(format!(
                "survival_rate must lie in (0, 1], got {}",
                self.survival_rate
            )));
        }
        if self.max_days == 0 {
            return Err(Error::Configuration("max_days must be at least 1".into()));
        }
        if self.stay_minutes >= MINUTES_PER_DAY || self.day_end_minute >= MINUTES_PER_DAY {
            return Err(Error::Configuration(
                "stay_minutes and day_end_minute must be below 1440".into(),
            ));
        }
        self.decision.validate()?;
        self.pheromone.validate()
    }
}

impl DecisionParams {
    /// Reject exponents and boosts that are negative or not finite.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("genome_boost", self.genome_boost),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Configuration(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl PheromoneParams {
    /// Reject decay factors and clamp bounds that break the field invariant.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.decay_factor) {
            return Err(Error::Configuration(format!(
                "decay_factor must lie in [0, 1], got {}",
                self.decay_factor
            )));
        }
        if self.min <= 0.0 || self.min > self.max {
            return Err(Error::Configuration(format!(
                "pheromone bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}
