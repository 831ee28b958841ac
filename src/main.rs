//! Command line entry point for the itinerary search.

use aco_itinerary::config::Config;
use aco_itinerary::environment::Environment;
use aco_itinerary::error::{Error, Result};
use aco_itinerary::policy::DecisionPolicy;
use aco_itinerary::utils::{format_itinerary, format_ranking, parse_minute};
use aco_itinerary::Optimizer;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "aco-itinerary", version, about = "Search time-feasible visiting itineraries")]
struct Args {
    /// JSON travel table: an array of
    /// {origin, destination, travel_minutes, open_minute, close_minute}
    #[arg(long)]
    graph: PathBuf,

    /// Optional JSON configuration; command line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generations to run before ranking the start locations
    #[arg(long, default_value_t = 10)]
    generations: u32,

    #[arg(long)]
    colonies: Option<usize>,

    #[arg(long)]
    ants: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    policy: Option<DecisionPolicy>,

    /// Latest departure as HH:MM
    #[arg(long)]
    day_end: Option<String>,

    /// Keep only the best share of start locations after the first run
    #[arg(long)]
    cut_off: Option<f64>,

    /// Allow itineraries over this many days after the first run
    #[arg(long)]
    multi_day: Option<u32>,

    /// Generations to run after culling or enabling multi-day itineraries
    #[arg(long, default_value_t = 0)]
    extra_generations: u32,
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::new(),
    };

    if let Some(colonies) = args.colonies {
        config = config.with_num_colonies(colonies);
    }
    if let Some(ants) = args.ants {
        config = config.with_ants_per_colony(ants);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(policy) = args.policy {
        config = config.with_policy(policy);
    }
    if let Some(day_end) = &args.day_end {
        let minute = parse_minute(day_end)
            .ok_or_else(|| Error::Configuration(format!("invalid day end {:?}", day_end)))?;
        config = config.with_day_end_minute(minute);
    }

    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    info!("Loading travel table from {}", args.graph.display());
    let environment = Environment::from_json_file(&args.graph, config.pheromone)?;
    info!(
        "Loaded {} locations and {} edges",
        environment.location_count(),
        environment.edge_count()
    );

    let mut optimizer = Optimizer::new(environment, config)?;
    let mut statistics = optimizer.run(args.generations)?;

    println!("=== Start location ranking by mean visited locations ===");
    println!("{}", format_ranking(&optimizer.ranking()));

    let mut continue_run = false;
    if let Some(cut_off) = args.cut_off {
        let keep = optimizer.top_start_locations(cut_off);
        let removed = optimizer.cull(&keep)?;
        println!("\nKept {} start locations, removed {} colonies", keep.len(), removed);
        continue_run = true;
    }
    if let Some(days) = args.multi_day {
        optimizer.enable_multi_day(days)?;
        continue_run = true;
    }
    if continue_run && args.extra_generations > 0 {
        statistics = optimizer.run(args.extra_generations)?;
    }

    if let Some(best) = optimizer.best() {
        println!(
            "\nBest itinerary (generation {}, fitness {:.2}):\n{}",
            best.generation,
            best.fitness,
            format_itinerary(&best.itinerary)
        );
    }
    println!("\n{}", statistics.format());

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
