//! Tests for the itinerary-building walk of a single ant.

use aco_itinerary::ant::{Ant, AntSettings, AntState, Stop};
use aco_itinerary::config::PheromoneParams;
use aco_itinerary::environment::{Environment, Location};
use aco_itinerary::genetic::Genome;
use aco_itinerary::policy::DecisionPolicy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// Creates the three-location scenario graph, plus an isolated location `D`
/// when `with_isolated` is set.
fn create_scenario_environment(with_isolated: bool) -> Environment {
    let mut locations = vec![
        Location::new("A", 540, 600),
        Location::new("B", 570, 1200),
        Location::new("C", 585, 1200),
    ];
    if with_isolated {
        locations.push(Location::new("D", 700, 1000));
    }

    Environment::new(
        locations,
        vec![
            ("A".to_string(), "B".to_string(), 10),
            ("B".to_string(), "C".to_string(), 10),
            ("A".to_string(), "C".to_string(), 5),
        ],
        PheromoneParams::default(),
    )
    .unwrap()
}

/// Creates a complete graph over eight locations with staggered windows.
fn create_dense_environment() -> Environment {
    let locations: Vec<Location> = (0..8)
        .map(|i| Location::new(format!("L{}", i), 480 + 30 * i, 900 + 30 * i))
        .collect();

    let mut edges = Vec::new();
    for i in 0..8u32 {
        for j in 0..8u32 {
            if i != j {
                let minutes = 5 + 7 * i.abs_diff(j);
                edges.push((format!("L{}", i), format!("L{}", j), minutes));
            }
        }
    }

    Environment::new(locations, edges, PheromoneParams::default()).unwrap()
}

fn create_ant(
    start: &str,
    minute: u32,
    policy: DecisionPolicy,
    settings: AntSettings,
    seed: u64,
) -> Ant {
    Ant::new(
        start,
        minute,
        Genome::default(),
        policy,
        0,
        settings,
        ChaCha8Rng::seed_from_u64(seed),
    )
}

fn stop(location: &str, arrival_minute: u32, day: u32) -> Stop {
    Stop {
        location: location.to_string(),
        arrival_minute,
        day,
    }
}

#[test]
fn test_scenario_itinerary() {
    let env = create_scenario_environment(false);
    let mut ant = create_ant("A", 540, DecisionPolicy::Uniform, AntSettings::default(), 1);

    assert!(ant.move_next(&env).unwrap());
    assert_eq!(ant.current_location(), "B");
    assert_eq!(ant.current_minute(), 580);

    assert!(ant.move_next(&env).unwrap());
    assert_eq!(ant.current_location(), "C");
    assert_eq!(ant.current_minute(), 620);

    assert!(!ant.move_next(&env).unwrap());
    assert_eq!(ant.state(), AntState::Done);
    assert_eq!(
        ant.itinerary(),
        &[stop("A", 540, 1), stop("B", 580, 1), stop("C", 620, 1)]
    );
    assert_eq!(ant.visited_count(), 3);
    assert_eq!(ant.elapsed_minutes(), 80);
    assert_eq!(
        ant.traversed_edges(),
        vec![
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "C".to_string())
        ]
    );
}

#[test]
fn test_same_seed_gives_identical_itineraries() {
    let env = create_dense_environment();

    let mut first = create_ant("L0", 480, DecisionPolicy::Uniform, AntSettings::default(), 77);
    let mut second = create_ant("L0", 480, DecisionPolicy::Uniform, AntSettings::default(), 77);
    first.run_to_completion(&env).unwrap();
    second.run_to_completion(&env).unwrap();

    assert_eq!(first.itinerary(), second.itinerary());
    assert!(first.itinerary().len() > 1);
}

#[test]
fn test_itineraries_respect_time_windows() {
    let env = create_dense_environment();
    let settings = AntSettings {
        max_days: 3,
        ..AntSettings::default()
    };
    let policies = [
        DecisionPolicy::Uniform,
        DecisionPolicy::GenomeBiased,
        DecisionPolicy::PheromoneBiased,
        DecisionPolicy::PheromoneGenomeBiased,
    ];

    for seed in 0..20 {
        for policy in policies {
            let mut ant = create_ant("L0", 480, policy, settings, seed);
            ant.run_to_completion(&env).unwrap();
            let itinerary = ant.itinerary();

            for pair in itinerary.windows(2) {
                let (from, to) = (&pair[0], &pair[1]);
                if from.day != to.day {
                    continue;
                }
                let location = env.location(&to.location).unwrap();
                assert!(to.arrival_minute >= location.open_minute);
                assert!(to.arrival_minute + settings.stay_minutes <= location.close_minute);
                assert!(to.arrival_minute >= from.arrival_minute);
            }

            for day in 1..=ant.day() {
                let names: Vec<&str> = itinerary
                    .iter()
                    .filter(|stop| stop.day == day)
                    .map(|stop| stop.location.as_str())
                    .collect();
                let unique: HashSet<&str> = names.iter().copied().collect();
                assert_eq!(names.len(), unique.len(), "duplicate within day {}", day);
            }

            let absolute: Vec<u32> = itinerary.iter().map(Stop::absolute_minute).collect();
            assert!(absolute.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}

#[test]
fn test_departure_after_day_end_finishes_the_ant() {
    let env = create_scenario_environment(false);
    let settings = AntSettings {
        day_end_minute: 560,
        ..AntSettings::default()
    };
    let mut ant = create_ant("A", 540, DecisionPolicy::Uniform, settings, 1);

    assert!(!ant.move_next(&env).unwrap());
    assert!(ant.is_done());
    assert_eq!(ant.itinerary().len(), 1);
}

#[test]
fn test_multi_day_restart_at_unvisited_location() {
    let env = create_scenario_environment(true);
    let settings = AntSettings {
        max_days: 2,
        ..AntSettings::default()
    };
    let mut ant = create_ant("A", 540, DecisionPolicy::Uniform, settings, 5);

    ant.run_to_completion(&env).unwrap();

    assert_eq!(ant.day(), 2);
    assert_eq!(ant.policy(), DecisionPolicy::PheromoneBiased);
    assert_eq!(
        ant.itinerary(),
        &[
            stop("A", 540, 1),
            stop("B", 580, 1),
            stop("C", 620, 1),
            stop("D", 700, 2)
        ]
    );
    assert_eq!(ant.visited_count(), 4);
    // The restart is not a travelled edge
    assert_eq!(ant.traversed_edges().len(), 2);
    assert_eq!(ant.itinerary()[3].absolute_minute(), 1440 + 700);
}

#[test]
fn test_single_day_ant_does_not_restart() {
    let env = create_scenario_environment(true);
    let mut ant = create_ant("A", 540, DecisionPolicy::Uniform, AntSettings::default(), 5);

    ant.run_to_completion(&env).unwrap();

    assert_eq!(ant.day(), 1);
    assert!(!ant.has_visited("D"));
    assert_eq!(ant.policy(), DecisionPolicy::Uniform);
}

#[test]
fn test_raised_day_limit_applies_to_live_ant() {
    let env = create_scenario_environment(true);
    let mut ant = create_ant("A", 540, DecisionPolicy::Uniform, AntSettings::default(), 5);
    ant.set_max_days(2);

    ant.run_to_completion(&env).unwrap();

    assert_eq!(ant.max_days(), 2);
    assert!(ant.has_visited("D"));
}

#[test]
fn test_genome_from_itinerary_drops_timestamps() {
    let env = create_scenario_environment(false);
    let mut ant = create_ant("A", 540, DecisionPolicy::GenomeBiased, AntSettings::default(), 2);
    ant.run_to_completion(&env).unwrap();

    let genome = ant.genome_from_itinerary();
    assert_eq!(genome.as_slice(), &["A".to_string(), "B".to_string(), "C".to_string()]);
}

#[test]
fn test_unreachable_travel_time_is_never_a_candidate() {
    let env = Environment::new(
        vec![
            Location::new("A", 540, 600),
            Location::new("B", 570, 1200),
            Location::new("C", 560, 1200),
        ],
        vec![
            ("A".to_string(), "B".to_string(), u32::MAX),
            ("A".to_string(), "C".to_string(), 5),
        ],
        PheromoneParams::default(),
    )
    .unwrap();

    for policy in [DecisionPolicy::Uniform, DecisionPolicy::PheromoneBiased] {
        let mut ant = create_ant("A", 540, policy, AntSettings::default(), 3);
        assert!(ant.move_next(&env).unwrap());
        assert_eq!(ant.current_location(), "C");
        assert_eq!(ant.current_minute(), 575);

        assert!(!ant.move_next(&env).unwrap());
        assert!(!ant.has_visited("B"));
        assert_eq!(ant.elapsed_minutes(), 35);
    }
}
