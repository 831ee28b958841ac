//! Genomes and the crossover operator used to breed ants.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ordered sequence of location names taken from a parent's itinerary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    sequence: Vec<String>,
}

impl Genome {
    /// Create a genome from a sequence of location names.
    pub fn new(sequence: Vec<String>) -> Self {
        Genome { sequence }
    }

    /// Check whether `location` occurs anywhere in the genome.
    pub fn contains(&self, location: &str) -> bool {
        self.sequence.iter().any(|name| name == location)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.sequence
    }
}

impl From<Vec<String>> for Genome {
    fn from(sequence: Vec<String>) -> Self {
        Genome::new(sequence)
    }
}

/// Implements the genetic operators for the colonies.
pub struct Genetic;

impl Genetic {
    /// One-point crossover: `a[..point] ++ b[point..]` with `point` drawn
    /// uniformly from `0..min(len(a), len(b))`.
    ///
    /// An empty parent yields a copy of the other one; two empty parents yield
    /// an empty genome.
    pub fn crossover<R: Rng>(&self, a: &Genome, b: &Genome, rng: &mut R) -> Genome {
        if a.is_empty() {
            return b.clone();
        }
        if b.is_empty() {
            return a.clone();
        }

        let point = rng.gen_range(0..a.len().min(b.len()));

        let mut sequence = Vec::with_capacity(b.len());
        sequence.extend_from_slice(&a.sequence[..point]);
        sequence.extend_from_slice(&b.sequence[point..]);

        Genome { sequence }
    }
}
