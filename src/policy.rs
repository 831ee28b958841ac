//! Decision policies an ant uses to pick its next location.

use crate::config::DecisionParams;
use crate::genetic::Genome;
use clap::ValueEnum;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A feasible next move.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub destination: String,
    pub travel_minutes: u32,
    pub pheromone: f64,
}

/// The closed set of transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPolicy {
    /// Every candidate is equally likely
    Uniform,
    /// Destinations in the genome weigh `genome_boost`, others 1
    GenomeBiased,
    /// Classic ACO rule `τ^α · (1/t)^β`
    PheromoneBiased,
    /// ACO rule scaled by `genome_boost^γ` for genome destinations
    PheromoneGenomeBiased,
}

impl DecisionPolicy {
    /// Unnormalized selection weight of `candidate`.
    ///
    /// Zero travel time is scored as one minute so the heuristic stays finite.
    pub fn score(&self, candidate: &Candidate, genome: &Genome, params: &DecisionParams) -> f64 {
        let boost = if genome.contains(&candidate.destination) {
            params.genome_boost
        } else {
            1.0
        };
        let attractiveness = || {
            let minutes = candidate.travel_minutes.max(1) as f64;
            candidate.pheromone.powf(params.alpha) * (1.0 / minutes).powf(params.beta)
        };

        match self {
            DecisionPolicy::Uniform => 1.0,
            DecisionPolicy::GenomeBiased => boost,
            DecisionPolicy::PheromoneBiased => attractiveness(),
            DecisionPolicy::PheromoneGenomeBiased => attractiveness() * boost.powf(params.gamma),
        }
    }

    /// Draw one candidate index proportionally to its score.
    ///
    /// Falls back to a uniform draw if the weights cannot form a distribution:
    /// all zero, or a weight or their sum not finite. Returns `None` only for
    /// an empty slice.
    pub fn choose<R: Rng>(
        &self,
        candidates: &[Candidate],
        genome: &Genome,
        params: &DecisionParams,
        rng: &mut R,
    ) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        if *self == DecisionPolicy::Uniform {
            return Some(rng.gen_range(0..candidates.len()));
        }

        let weights: Vec<f64> = candidates
            .iter()
            .map(|candidate| self.score(candidate, genome, params))
            .collect();

        match weighted_index(&weights) {
            Some(distribution) => Some(distribution.sample(rng)),
            None => {
                let indices: Vec<usize> = (0..candidates.len()).collect();
                indices.choose(rng).copied()
            }
        }
    }
}

/// Build a weighted distribution, or `None` if the weights cannot form one.
///
/// `WeightedIndex::new` panics on an infinite total, so weights and their sum
/// are checked first.
pub(crate) fn weighted_index(weights: &[f64]) -> Option<WeightedIndex<f64>> {
    if !weights.iter().all(|weight| weight.is_finite()) {
        return None;
    }
    if !weights.iter().sum::<f64>().is_finite() {
        return None;
    }
    WeightedIndex::new(weights).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn candidate(destination: &str, travel_minutes: u32, pheromone: f64) -> Candidate {
        Candidate {
            destination: destination.to_string(),
            travel_minutes,
            pheromone,
        }
    }

    #[test]
    fn pheromone_rule_matches_formula() {
        let params = DecisionParams::default();
        let c = candidate("B", 2, 3.0);
        let w = DecisionPolicy::PheromoneBiased.score(&c, &Genome::default(), &params);
        assert!((w - 3.0 * 0.25).abs() < 1e-12);
    }

    #[test]
    fn genome_boost_applies_only_to_members() {
        let params = DecisionParams::default();
        let genome = Genome::from(vec!["B".to_string()]);
        let member = candidate("B", 1, 1.0);
        let other = candidate("C", 1, 1.0);

        assert_eq!(DecisionPolicy::GenomeBiased.score(&member, &genome, &params), 2.0);
        assert_eq!(DecisionPolicy::GenomeBiased.score(&other, &genome, &params), 1.0);

        let boosted = DecisionPolicy::PheromoneGenomeBiased.score(&member, &genome, &params);
        assert!((boosted - 2f64.powf(1.5)).abs() < 1e-12);
    }

    #[test]
    fn zero_travel_time_stays_finite() {
        let params = DecisionParams::default();
        let c = candidate("B", 0, 1.0);
        let w = DecisionPolicy::PheromoneBiased.score(&c, &Genome::default(), &params);
        assert!(w.is_finite());
    }

    #[test]
    fn choose_on_single_candidate_is_that_candidate() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let candidates = vec![candidate("B", 5, 1.0)];
        for policy in DecisionPolicy::value_variants() {
            let params = DecisionParams::default();
            let pick = policy.choose(&candidates, &Genome::default(), &params, &mut rng);
            assert_eq!(pick, Some(0));
        }
    }

    #[test]
    fn overflowing_weights_fall_back_to_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let params = DecisionParams {
            alpha: 400.0,
            ..DecisionParams::default()
        };
        let candidates = vec![candidate("B", 1, 100.0), candidate("C", 1, 100.0)];

        let mut seen = [false; 2];
        for _ in 0..100 {
            let pick = DecisionPolicy::PheromoneBiased.choose(
                &candidates,
                &Genome::default(),
                &params,
                &mut rng,
            );
            seen[pick.unwrap()] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn genome_member_is_drawn_in_proportion_to_boost() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let params = DecisionParams::default();
        let genome = Genome::from(vec!["B".to_string()]);
        let candidates = vec![candidate("B", 10, 1.0), candidate("C", 10, 1.0)];

        let draws = 3000;
        let members = (0..draws)
            .filter(|_| {
                DecisionPolicy::GenomeBiased.choose(&candidates, &genome, &params, &mut rng)
                    == Some(0)
            })
            .count();

        let share = members as f64 / draws as f64;
        assert!((share - 2.0 / 3.0).abs() < 0.05, "member share {}", share);
    }

    #[test]
    fn pheromone_draws_favor_short_trips() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let params = DecisionParams::default();
        // Weights 1/1 and 1/4 under beta = 2
        let candidates = vec![candidate("B", 1, 1.0), candidate("C", 2, 1.0)];

        let draws = 3000;
        let short = (0..draws)
            .filter(|_| {
                DecisionPolicy::PheromoneBiased.choose(
                    &candidates,
                    &Genome::default(),
                    &params,
                    &mut rng,
                ) == Some(0)
            })
            .count();

        let share = short as f64 / draws as f64;
        assert!((share - 0.8).abs() < 0.05, "short trip share {}", share);
    }
}
