//! A single ant building one itinerary through the travel graph.

use crate::config::{Config, DecisionParams, MINUTES_PER_DAY};
use crate::environment::{Environment, PathRecord};
use crate::error::Result;
use crate::genetic::Genome;
use crate::policy::{Candidate, DecisionPolicy};
use itertools::Itertools;
use log::trace;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where an ant is in its walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntState {
    /// Looking for the next feasible move
    Evaluating,
    /// Just travelled to a new location
    Moving,
    /// Restarted at a fresh location on a later day
    NewDay,
    /// No further move is possible; the itinerary is final
    Done,
}

/// One visited location of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub location: String,
    /// Minute of day the ant arrived
    pub arrival_minute: u32,
    /// Day of the itinerary, starting at 1
    pub day: u32,
}

impl Stop {
    /// Arrival measured from the start of day 1.
    pub fn absolute_minute(&self) -> u32 {
        (self.day - 1) * MINUTES_PER_DAY + self.arrival_minute
    }
}

/// Per-ant settings copied out of the run configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntSettings {
    pub stay_minutes: u32,
    pub day_end_minute: u32,
    pub max_days: u32,
    pub decision: DecisionParams,
}

impl From<&Config> for AntSettings {
    fn from(config: &Config) -> Self {
        AntSettings {
            stay_minutes: config.stay_minutes,
            day_end_minute: config.day_end_minute,
            max_days: config.max_days,
            decision: config.decision,
        }
    }
}

impl Default for AntSettings {
    fn default() -> Self {
        AntSettings::from(&Config::default())
    }
}

/// A traversal cursor that builds one itinerary.
#[derive(Debug, Clone)]
pub struct Ant {
    current_location: String,
    current_minute: u32,
    day: u32,
    elapsed_minutes: u32,
    visited: HashSet<String>,
    itinerary: Vec<Stop>,
    genome: Genome,
    policy: DecisionPolicy,
    generation: u32,
    state: AntState,
    settings: AntSettings,
    rng: ChaCha8Rng,
}

impl Ant {
    /// Place a new ant at `start_location` at `start_minute` on day 1.
    pub fn new(
        start_location: &str,
        start_minute: u32,
        genome: Genome,
        policy: DecisionPolicy,
        generation: u32,
        settings: AntSettings,
        rng: ChaCha8Rng,
    ) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start_location.to_string());

        Ant {
            current_location: start_location.to_string(),
            current_minute: start_minute,
            day: 1,
            elapsed_minutes: 0,
            visited,
            itinerary: vec![Stop {
                location: start_location.to_string(),
                arrival_minute: start_minute,
                day: 1,
            }],
            genome,
            policy,
            generation,
            state: AntState::Evaluating,
            settings,
            rng,
        }
    }

    /// Spend the stay at the current location.
    ///
    /// Returns `false` if the resulting departure lies past the end of the day.
    pub fn advance_to_departure(&mut self) -> bool {
        self.current_minute = self.current_minute.saturating_add(self.settings.stay_minutes);
        self.current_minute <= self.settings.day_end_minute
    }

    /// Feasible moves when departing at the current minute.
    ///
    /// Visited destinations, arrivals before opening and stays that would run
    /// past closing are filtered out. A move whose arrival or end of stay
    /// does not fit in a `u32` minute is infeasible.
    pub fn candidate_moves(&self, environment: &Environment) -> Result<Vec<Candidate>> {
        let departure = self.current_minute;
        let stay = self.settings.stay_minutes;

        Ok(environment
            .neighbors(&self.current_location)?
            .into_iter()
            .filter(|neighbor| !self.visited.contains(neighbor.destination))
            .filter(|neighbor| {
                departure
                    .checked_add(neighbor.travel_minutes)
                    .filter(|&arrival| arrival >= neighbor.open_minute)
                    .and_then(|arrival| arrival.checked_add(stay))
                    .map_or(false, |end| end <= neighbor.close_minute)
            })
            .map(|neighbor| Candidate {
                destination: neighbor.destination.to_string(),
                travel_minutes: neighbor.travel_minutes,
                pheromone: neighbor.pheromone,
            })
            .collect())
    }

    /// Pick one of `candidates` with this ant's policy.
    pub fn choose_next(&mut self, candidates: &[Candidate]) -> Option<usize> {
        self.policy.choose(
            candidates,
            &self.genome,
            &self.settings.decision,
            &mut self.rng,
        )
    }

    /// Take one step. Returns `false` once the ant is done.
    pub fn move_next(&mut self, environment: &Environment) -> Result<bool> {
        if self.state == AntState::Done {
            return Ok(false);
        }

        self.state = AntState::Evaluating;
        let mut candidates = self.evaluate(environment)?;

        while candidates.is_empty() {
            if !self.start_new_day(environment) {
                self.state = AntState::Done;
                return Ok(false);
            }
            candidates = self.evaluate(environment)?;
        }

        let chosen = match self.choose_next(&candidates) {
            Some(index) => candidates.swap_remove(index),
            None => {
                self.state = AntState::Done;
                return Ok(false);
            }
        };

        self.current_minute = self.current_minute.saturating_add(chosen.travel_minutes);
        self.elapsed_minutes = self
            .elapsed_minutes
            .saturating_add(self.settings.stay_minutes)
            .saturating_add(chosen.travel_minutes);
        trace!(
            "Ant moved {} -> {} arriving at minute {} on day {}",
            self.current_location,
            chosen.destination,
            self.current_minute,
            self.day
        );
        self.current_location = chosen.destination;
        self.visited.insert(self.current_location.clone());
        self.itinerary.push(Stop {
            location: self.current_location.clone(),
            arrival_minute: self.current_minute,
            day: self.day,
        });
        self.state = AntState::Moving;

        Ok(true)
    }

    /// Move until no further move is possible.
    pub fn run_to_completion(&mut self, environment: &Environment) -> Result<()> {
        while self.move_next(environment)? {}
        Ok(())
    }

    /// Override the day limit of this ant.
    pub fn set_max_days(&mut self, days: u32) {
        self.settings.max_days = days;
    }

    /// Consecutive `(origin, destination)` pairs walked within each day.
    pub fn traversed_edges(&self) -> Vec<(String, String)> {
        self.itinerary
            .iter()
            .tuple_windows()
            .filter(|(from, to)| from.day == to.day)
            .map(|(from, to)| (from.location.clone(), to.location.clone()))
            .collect()
    }

    /// The itinerary stripped of timestamps.
    pub fn genome_from_itinerary(&self) -> Genome {
        Genome::new(
            self.itinerary
                .iter()
                .map(|stop| stop.location.clone())
                .collect(),
        )
    }

    /// Pair the traversed edges with a fitness value.
    pub fn to_record(&self, fitness: f64) -> PathRecord {
        PathRecord {
            edges: self.traversed_edges(),
            fitness,
        }
    }

    pub fn itinerary(&self) -> &[Stop] {
        &self.itinerary
    }

    /// Number of distinct locations visited across all days.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn has_visited(&self, location: &str) -> bool {
        self.visited.contains(location)
    }

    /// Minutes spent staying and travelling, summed over all days.
    pub fn elapsed_minutes(&self) -> u32 {
        self.elapsed_minutes
    }

    pub fn current_location(&self) -> &str {
        &self.current_location
    }

    pub fn current_minute(&self) -> u32 {
        self.current_minute
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn max_days(&self) -> u32 {
        self.settings.max_days
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn state(&self) -> AntState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == AntState::Done
    }

    fn evaluate(&mut self, environment: &Environment) -> Result<Vec<Candidate>> {
        if !self.advance_to_departure() {
            return Ok(Vec::new());
        }
        self.candidate_moves(environment)
    }

    /// Restart at a random unvisited location at its opening minute.
    fn start_new_day(&mut self, environment: &Environment) -> bool {
        if self.day >= self.settings.max_days {
            return false;
        }

        let (names, opening_minutes) = environment.locations(&self.visited);
        if names.is_empty() {
            return false;
        }

        let index = self.rng.gen_range(0..names.len());
        let location = names[index].clone();

        self.day += 1;
        self.current_minute = opening_minutes[index];
        self.policy = DecisionPolicy::PheromoneBiased;
        self.visited.insert(location.clone());
        self.itinerary.push(Stop {
            location: location.clone(),
            arrival_minute: self.current_minute,
            day: self.day,
        });
        self.current_location = location;
        self.state = AntState::NewDay;

        trace!(
            "Ant restarted at {} on day {}",
            self.current_location,
            self.day
        );
        true
    }
}
