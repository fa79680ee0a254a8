use std::process::ExitCode;

use chrono::NaiveDate;
use tracing::info;
use tracing_subscriber::EnvFilter;

use interchange_planner::cache::CachedCosts;
use interchange_planner::config::{ConfigError, PlannerConfig};
use interchange_planner::domain::{DomainError, LocationSet, ServiceTime, StationId, TimeWindow};
use interchange_planner::routes::{BetweenRoutesCostRepository, CostError, RouteToRouteCosts};
use interchange_planner::snapshot::{NetworkSnapshot, SnapshotError};
use interchange_planner::traverse::{JourneyRequest, TransitionTable, TraversalError, Traverser};

const USAGE: &str =
    "usage: interchange-planner <config.json> <snapshot.json> <from> <to> <YYYY-MM-DD> <HH:MM>";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Cost(#[from] CostError),

    #[error(transparent)]
    Traversal(#[from] TraversalError),
}

struct Args {
    config: String,
    snapshot: String,
    from: StationId,
    to: StationId,
    date: NaiveDate,
    time: ServiceTime,
}

fn parse_args() -> Result<Args, CliError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [config, snapshot, from, to, date, time] = args.as_slice() else {
        return Err(CliError::Usage(USAGE.to_string()));
    };
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| CliError::Usage(format!("invalid date {date}: {e}")))?;
    Ok(Args {
        config: config.clone(),
        snapshot: snapshot.clone(),
        from: StationId::new(from.as_str()).map_err(DomainError::from)?,
        to: StationId::new(to.as_str()).map_err(DomainError::from)?,
        date,
        time: ServiceTime::parse_hhmm(time).map_err(DomainError::from)?,
    })
}

fn run() -> Result<(), CliError> {
    let args = parse_args()?;
    let config = PlannerConfig::load(&args.config)?;
    let network = NetworkSnapshot::load(&args.snapshot)?.into_network();

    let costs = RouteToRouteCosts::build(
        &network.transport,
        network.availability,
        network.neighbours,
        &config.costs,
    )?;
    let costs = CachedCosts::new(costs, &config.cache);

    let start = LocationSet::singleton(args.from.clone());
    let destination = LocationSet::singleton(args.to.clone());
    let window = TimeWindow::starting_at(args.time, config.search.max_journey_mins);
    let changes = costs.changes_between(&start, &destination, args.date, &window)?;
    println!("{} -> {}: changes {}", args.from, args.to, changes);

    let Some(graph) = network.graph else {
        info!("Snapshot has no network graph, skipping journey search");
        return Ok(());
    };

    let table = TransitionTable::standard();
    let traverser = Traverser::new(&graph, &costs, &table, &config.search);
    let request = JourneyRequest::between_stations(&graph, &args.from, &destination, args.date, args.time)?;
    let result = traverser.search(&request)?;

    if result.journeys.is_empty() {
        println!("No journeys found ({} states explored)", result.states_explored);
    }
    for (i, journey) in result.journeys.iter().enumerate() {
        println!("{}. {}", i + 1, journey);
    }
    if result.truncated {
        println!("Search stopped after {} states", result.states_explored);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(message)) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
