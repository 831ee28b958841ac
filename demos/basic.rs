//! Basic example of using the itinerary search library.

use aco_itinerary::config::Config;
use aco_itinerary::environment::{Environment, Location};
use aco_itinerary::policy::DecisionPolicy;
use aco_itinerary::utils::{format_duration, format_itinerary, format_ranking};
use aco_itinerary::Optimizer;
use std::time::Instant;

/// Build a small district of markets with midday and evening windows.
fn build_environment(config: &Config) -> aco_itinerary::error::Result<Environment> {
    let markets = [
        ("Harbour", 480, 840),
        ("Old Town", 540, 1080),
        ("Station", 420, 1260),
        ("Cathedral", 600, 1020),
        ("Riverside", 720, 1320),
        ("University", 510, 960),
        ("Park", 660, 1200),
    ];

    let locations = markets
        .iter()
        .map(|&(name, open, close)| Location::new(name, open, close))
        .collect();

    let mut edges = Vec::new();
    for (i, &(from, _, _)) in markets.iter().enumerate() {
        for (j, &(to, _, _)) in markets.iter().enumerate() {
            if i != j {
                let minutes = 6 + ((i * 11 + j * 5) % 23) as u32;
                edges.push((from.to_string(), to.to_string(), minutes));
            }
        }
    }

    Environment::new(locations, edges, config.pheromone)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Configure algorithm
    let config = Config::new()
        .with_num_colonies(14)
        .with_ants_per_colony(16)
        .with_stay_minutes(30)
        .with_policy(DecisionPolicy::PheromoneGenomeBiased)
        .with_seed(7);

    let environment = build_environment(&config)?;
    println!(
        "Loaded {} locations with {} connections",
        environment.location_count(),
        environment.edge_count()
    );

    println!("Starting search");
    let start_time = Instant::now();
    let mut optimizer = Optimizer::new(environment, config)?;
    optimizer.run(15)?;

    println!("Start location ranking:\n{}", format_ranking(&optimizer.ranking()));

    // Keep the best half of the start locations and allow a second day
    let keep = optimizer.top_start_locations(0.5);
    optimizer.cull(&keep)?;
    optimizer.enable_multi_day(2)?;
    let statistics = optimizer.run(10)?;

    println!("Search completed in {}", format_duration(start_time.elapsed()));
    if let Some(best) = optimizer.best() {
        println!("Best itinerary: {}", format_itinerary(&best.itinerary));
    }
    println!("{}", statistics.format());

    Ok(())
}
