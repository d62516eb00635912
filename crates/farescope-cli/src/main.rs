// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FareScope

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

use farescope_core::amadeus::{AmadeusClient, AmadeusConfig};
use farescope_core::cache::{SessionStore, DEFAULT_HISTORY_KEEP};
use farescope_core::flight_gen;
use farescope_core::format;
use farescope_core::search::chart::stops_label;
use farescope_core::search::filters::{preset_by_id, DurationRange, TimeSlot};
use farescope_core::search::sorter::{SortField, SortOrder, SortSpec, SORT_OPTIONS};
use farescope_core::search::{
    FlightRecord, SearchQuery, SearchResults, SearchSession, TripType, UpdateOp,
};
use farescope_core::{export, stats};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory for session state and search history
    #[arg(short, long, env = "FARESCOPE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for flights on a route
    Search(SearchArgs),
    /// Show the current results with filters and sort applied
    List {
        /// Maximum number of rows to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Adjust filter criteria for the current results
    Filter(FilterArgs),
    /// Set the sort order (price, duration, departure, arrival, stops)
    Sort {
        field: String,
        /// asc or desc
        #[arg(default_value = "asc")]
        order: String,
    },
    /// Price comparison by stop count
    Chart {
        /// Show the daily fare trend for this many days instead
        #[arg(long)]
        trend: Option<u32>,
    },
    /// Summary statistics for the current results
    Stats,
    /// Highlight the cheapest, fastest and best-value offers
    Recommend,
    /// List archived searches
    History {
        /// Drop all but the newest archived searches
        #[arg(long)]
        prune: bool,
    },
    /// Export the visible flights to CSV
    Export {
        /// Output file path
        output: PathBuf,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Origin airport code (e.g. JFK)
    origin: String,
    /// Destination airport code (e.g. LHR)
    destination: String,
    /// Departure date (YYYY-MM-DD)
    date: String,
    /// Return date for a round trip (YYYY-MM-DD)
    #[arg(long)]
    return_date: Option<String>,
    /// Number of passengers
    #[arg(short, long, default_value_t = 1)]
    passengers: u32,
    /// Cabin class: economy, premium_economy, business or first
    #[arg(short, long, default_value = "economy")]
    cabin: String,
    /// Query the live offers API instead of the mock generator
    #[arg(long)]
    live: bool,
    /// API key for the live offers endpoint
    #[arg(long, env = "AMADEUS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// API secret for the live offers endpoint
    #[arg(long, env = "AMADEUS_API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,
}

#[derive(Args)]
struct FilterArgs {
    /// Maximum price in the result currency
    #[arg(long)]
    max_price: Option<f64>,
    /// Toggle a stop count (0, 1 or 2); repeatable
    #[arg(long)]
    stop: Vec<u32>,
    /// Toggle an airline by name; repeatable
    #[arg(long)]
    airline: Vec<String>,
    /// Toggle a departure window (morning, afternoon, evening, night); repeatable
    #[arg(long)]
    departure: Vec<String>,
    /// Toggle an arrival window; repeatable
    #[arg(long)]
    arrival: Vec<String>,
    /// Minimum duration in minutes
    #[arg(long)]
    min_duration: Option<u32>,
    /// Maximum duration in minutes
    #[arg(long)]
    max_duration: Option<u32>,
    /// Apply a named preset: cheapest, fastest or best-value
    #[arg(long)]
    preset: Option<String>,
    /// Reset every filter to its default
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    let store = match cli.data_dir {
        Some(path) => SessionStore::new(path),
        None => SessionStore::default_root(),
    };

    match cli.command {
        Commands::Search(args) => run_search(&store, args),
        Commands::List { limit } => run_list(&store, limit),
        Commands::Filter(args) => run_filter(&store, args),
        Commands::Sort { field, order } => run_sort(&store, &field, &order),
        Commands::Chart { trend } => run_chart(&store, trend),
        Commands::Stats => run_stats(&store),
        Commands::Recommend => run_recommend(&store),
        Commands::History { prune } => run_history(&store, prune),
        Commands::Export { output } => run_export(&store, &output),
    }
}

fn run_search(store: &SessionStore, args: SearchArgs) -> Result<()> {
    let trip_type = if args.return_date.is_some() {
        TripType::RoundTrip
    } else {
        TripType::OneWay
    };
    let query = SearchQuery {
        origin: args.origin.trim().to_uppercase(),
        destination: args.destination.trim().to_uppercase(),
        departure_date: args.date,
        return_date: args.return_date,
        passengers: args.passengers,
        cabin_class: args.cabin.trim().to_lowercase(),
        trip_type,
    };
    query.validate()?;

    let results = if args.live {
        live_search_with_fallback(&query, args.api_key, args.api_secret)
    } else {
        flight_gen::generate_search_results(&query)
    };

    println!(
        "Found {} flights from {} to {} on {}",
        results.total_results,
        format::format_airport(&results.query.origin),
        format::format_airport(&results.query.destination),
        results.query.departure_date
    );
    if let (Some(cheapest), Some(average)) = (results.cheapest_price, results.average_price) {
        println!(
            "Cheapest {}, average {}, {} airlines",
            format::format_price(cheapest, &results.currency),
            format::format_price(average, &results.currency),
            results.airlines.len()
        );
    }

    store.archive_results(&results)?;
    let mut session = store.load_session();
    session.install_results(results);
    store.save_session(&session)?;

    println!();
    print_flights(&session.filtered(), 10);
    Ok(())
}

/// Try the live API; any failure, missing credential or empty answer
/// falls back to generated offers so a search always produces results.
fn live_search_with_fallback(
    query: &SearchQuery,
    api_key: Option<String>,
    api_secret: Option<String>,
) -> SearchResults {
    let (Some(key), Some(secret)) = (api_key, api_secret) else {
        warn!("Live search requested without credentials; using generated data");
        return flight_gen::generate_search_results(query);
    };

    let config = AmadeusConfig::with_credentials(&key, &secret);
    match AmadeusClient::new(config).and_then(|mut client| client.search_flights(query)) {
        Ok(flights) if !flights.is_empty() => SearchResults::new(query.clone(), flights, "amadeus"),
        Ok(_) => {
            warn!("Live search returned no offers; using generated data");
            flight_gen::generate_search_results(query)
        }
        Err(e) => {
            warn!("Live search failed; using generated data — error={}", e);
            flight_gen::generate_search_results(query)
        }
    }
}

fn load_session_with_results(store: &SessionStore) -> Result<SearchSession> {
    let session = store.load_session();
    if session.results().is_none() {
        bail!("No search results yet. Run 'farescope search <origin> <destination> <date>' first.");
    }
    Ok(session)
}

fn run_list(store: &SessionStore, limit: usize) -> Result<()> {
    let session = load_session_with_results(store)?;
    let visible = session.filtered();

    if let Some(results) = session.results() {
        println!(
            "{} to {} on {}: {} of {} flights match ({} active filters)",
            results.query.origin,
            results.query.destination,
            results.query.departure_date,
            visible.len(),
            results.total_results,
            session.active_filter_count()
        );
    }
    println!();
    print_flights(&visible, limit);
    Ok(())
}

fn run_filter(store: &SessionStore, args: FilterArgs) -> Result<()> {
    let mut session = load_session_with_results(store)?;
    let mut changed = false;

    if args.clear {
        changed |= session.apply(UpdateOp::Clear);
        println!("Filters cleared");
    }

    if let Some(id) = &args.preset {
        let Some(preset) = preset_by_id(id) else {
            bail!("Unknown preset '{}'. Available: cheapest, fastest, best-value", id);
        };
        // A preset replaces the stops dimension: drop what is selected,
        // then toggle in the preset's values.
        for value in session.criteria().stops.clone() {
            changed |= session.apply(UpdateOp::ToggleStop(value));
        }
        for value in preset.stops {
            changed |= session.apply(UpdateOp::ToggleStop(*value));
        }
        println!("Applied preset: {}", preset.name);
    }

    if let Some(price) = args.max_price {
        changed |= session.apply(UpdateOp::SetMaxPrice(price));
    }
    for stops in args.stop {
        changed |= session.apply(UpdateOp::ToggleStop(stops));
    }
    for airline in args.airline {
        changed |= session.apply(UpdateOp::ToggleAirline(airline));
    }
    for raw in args.departure {
        let slot: TimeSlot = raw.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        changed |= session.apply(UpdateOp::ToggleDepartureSlot(slot));
    }
    for raw in args.arrival {
        let slot: TimeSlot = raw.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        changed |= session.apply(UpdateOp::ToggleArrivalSlot(slot));
    }
    if args.min_duration.is_some() || args.max_duration.is_some() {
        changed |= session.apply(UpdateOp::SetDurationRange(Some(DurationRange {
            min: args.min_duration,
            max: args.max_duration,
        })));
    }

    if changed {
        store.save_session(&session)?;
    }
    println!(
        "{} active filters, {} flights match",
        session.active_filter_count(),
        session.filtered().len()
    );
    Ok(())
}

fn run_sort(store: &SessionStore, field: &str, order: &str) -> Result<()> {
    let mut session = load_session_with_results(store)?;

    let field: SortField = field.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let order: SortOrder = order.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let spec = SortSpec { field, order };

    if session.set_sort(spec) {
        store.save_session(&session)?;
    }

    let label = SORT_OPTIONS
        .iter()
        .find(|o| o.field == field && o.order == order)
        .map(|o| o.label.to_string())
        .unwrap_or_else(|| format!("{:?} {:?}", field, order));
    println!("Sorting by: {}", label);
    println!();
    print_flights(&session.filtered(), 10);
    Ok(())
}

fn run_chart(store: &SessionStore, trend: Option<u32>) -> Result<()> {
    let session = load_session_with_results(store)?;

    if let Some(days) = trend {
        let Some(results) = session.results() else {
            bail!("No search results to chart.");
        };
        let points = flight_gen::generate_price_history(
            &results.query.origin,
            &results.query.destination,
            days,
        );
        if points.is_empty() {
            println!("No price history to show.");
            return Ok(());
        }
        let max_price = points.iter().map(|p| p.price).fold(f64::MIN, f64::max);
        println!(
            "Daily fares {} to {}, last {} days:",
            results.query.origin, results.query.destination, days
        );
        for point in &points {
            let width = ((point.price / max_price) * 40.0).round() as usize;
            println!(
                "{}  {:>8}  {}",
                point.date,
                format::format_price(point.price, &results.currency),
                "#".repeat(width)
            );
        }
        return Ok(());
    }

    let buckets = session.chart_data();
    if buckets.is_empty() {
        println!("No flights match the current filters.");
        return Ok(());
    }
    let currency = session
        .results()
        .map(|r| r.currency.clone())
        .unwrap_or_else(|| "USD".to_string());
    let max_avg = buckets.iter().map(|b| b.avg_price).fold(f64::MIN, f64::max);

    println!("Average price by stops:");
    for bucket in &buckets {
        let width = ((bucket.avg_price / max_avg) * 40.0).round() as usize;
        println!(
            "{:<9} {:>8}  {} ({} flights, {} to {})",
            bucket.stops_label,
            format::format_price(bucket.avg_price, &currency),
            "#".repeat(width),
            bucket.count,
            format::format_price(bucket.min_price, &currency),
            format::format_price(bucket.max_price, &currency),
        );
    }
    Ok(())
}

fn run_stats(store: &SessionStore) -> Result<()> {
    let session = load_session_with_results(store)?;
    let Some(stats) = stats::compute_statistics(session.flights()) else {
        println!("No flights to analyze.");
        return Ok(());
    };
    let currency = session
        .results()
        .map(|r| r.currency.clone())
        .unwrap_or_else(|| "USD".to_string());

    println!("Flights: {}", stats.total_flights);
    println!(
        "Price: {} min, {} median, {} avg, {} max",
        format::format_price(stats.price_stats.min, &currency),
        format::format_price(stats.price_stats.median, &currency),
        format::format_price(stats.price_stats.avg, &currency),
        format::format_price(stats.price_stats.max, &currency),
    );
    println!(
        "Duration: {} min, {} avg, {} max",
        format::format_duration(stats.duration_stats.min),
        format::format_duration(stats.duration_stats.avg),
        format::format_duration(stats.duration_stats.max),
    );

    println!("By stops:");
    for (stops, count) in &stats.by_stops {
        println!("  {:<9} {}", stops_label(*stops), count);
    }

    println!("Top airlines:");
    for entry in &stats.popular_airlines {
        println!("  {:<22} {}", entry.airline, entry.count);
    }

    if let Some(slot) = stats.best_time_to_fly {
        println!(
            "Cheapest departure window: {} ({})",
            slot.label(),
            slot.hours_label()
        );
    }
    Ok(())
}

fn run_recommend(store: &SessionStore) -> Result<()> {
    let session = load_session_with_results(store)?;
    let picks = flight_gen::recommend_flights(session.flights());
    if picks.is_empty() {
        println!("Nothing to recommend yet.");
        return Ok(());
    }
    println!("Recommended flights:");
    print_flights(&picks, picks.len());
    Ok(())
}

fn run_history(store: &SessionStore, prune: bool) -> Result<()> {
    if prune {
        let removed = store.prune_history(DEFAULT_HISTORY_KEEP)?;
        println!("Pruned {} archived searches", removed);
    }

    let entries = store.list_history();
    if entries.is_empty() {
        println!("No archived searches.");
        return Ok(());
    }
    println!("Archived searches (newest first):");
    for results in &entries {
        let cheapest = results
            .cheapest_price
            .map(|p| format::format_price(p, &results.currency))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<28} {} {} to {} on {}: {} flights, from {}",
            results.search_id,
            results.timestamp,
            results.query.origin,
            results.query.destination,
            results.query.departure_date,
            results.total_results,
            cheapest,
        );
    }
    Ok(())
}

fn run_export(store: &SessionStore, output: &std::path::Path) -> Result<()> {
    let session = load_session_with_results(store)?;
    let visible = session.filtered();
    export::export_csv(output, &visible)
        .with_context(|| format!("Failed to export to {}", output.display()))?;
    println!("Exported {} flights to {}", visible.len(), output.display());
    Ok(())
}

fn print_flights(flights: &[FlightRecord], limit: usize) {
    if flights.is_empty() {
        println!("No flights match the current filters.");
        return;
    }
    for flight in flights.iter().take(limit) {
        println!(
            "{:>9}  {:<7} {:<20} {:>8} - {:<8} {:>8}  {}",
            format::format_price(flight.price, &flight.currency),
            flight.flight_number,
            flight.airline,
            format::format_time(&flight.departure),
            format::format_time(&flight.arrival),
            flight.duration,
            format::format_stops(flight.stops),
        );
    }
    if flights.len() > limit {
        println!("... and {} more (use --limit to see them)", flights.len() - limit);
    }
}
