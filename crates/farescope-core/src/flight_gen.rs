//! Mock flight generation for offline use and demos.
//!
//! Prices and durations are anchored to a per-route hash so the same city
//! pair always lands in the same band, with per-offer jitter on top. The
//! shape of each record matches what the live client produces, so
//! everything downstream is source-agnostic.

use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use chrono::Datelike;

use crate::airports;
use crate::search::sorter::{self, SortSpec};
use crate::search::{BaggageInfo, FlightRecord, SearchQuery, SearchResults};

/// Airlines whose fares carry the premium allowance and amenity set.
const PREMIUM_AIRLINES: [&str; 4] = ["EK", "QR", "BA", "AF"];

/// Connection airports offers route through, major hubs only.
const STOPOVER_HUBS: [&str; 10] = [
    "DXB", "LHR", "CDG", "FRA", "AMS", "DOH", "IST", "ORD", "DFW", "ATL",
];

const AIRCRAFT: [&str; 7] = [
    "Boeing 737",
    "Boeing 777",
    "Boeing 787 Dreamliner",
    "Airbus A320",
    "Airbus A330",
    "Airbus A350",
    "Airbus A380",
];

/// Amenity catalog, ordered from baseline to premium extras. Offers get a
/// prefix of this list sized by fare tier.
const AMENITIES: [&str; 8] = [
    "WiFi",
    "In-flight Entertainment",
    "USB Power",
    "Meals Included",
    "Extra Legroom",
    "Priority Boarding",
    "Lounge Access",
    "Complimentary Drinks",
];

/// How many generator airlines serve each route.
const ROSTER_SIZE: usize = 8;

/// Stable per-route anchor: byte sum of the concatenated codes.
fn route_hash(origin: &str, destination: &str) -> u32 {
    origin
        .bytes()
        .chain(destination.bytes())
        .map(u32::from)
        .sum()
}

/// Produce a plausible result set for one route and date. The list comes
/// back sorted cheapest-first. Degenerate routes (a missing endpoint, or
/// origin equal to destination) yield an empty set.
pub fn generate_flights(origin: &str, destination: &str, departure_date: &str) -> Vec<FlightRecord> {
    let origin = origin.trim().to_uppercase();
    let destination = destination.trim().to_uppercase();
    if origin.is_empty() || destination.is_empty() || origin == destination {
        warn!(
            "Refusing to generate flights for degenerate route — origin={} destination={}",
            origin, destination
        );
        return Vec::new();
    }

    let hash = route_hash(&origin, &destination);
    let base_price = 200.0 + (hash % 800) as f64;
    let base_duration = (2 + hash % 10) * 60;

    let airlines = airports::get_all_airlines();
    let roster = &airlines[..ROSTER_SIZE.min(airlines.len())];

    let hub_pool: Vec<&str> = STOPOVER_HUBS
        .iter()
        .copied()
        .filter(|h| *h != origin && *h != destination)
        .collect();

    let mut rng = rand::thread_rng();
    let millis = chrono::Utc::now().timestamp_millis();
    let mut flights = Vec::new();

    for airline in roster {
        let premium = PREMIUM_AIRLINES.contains(&airline.code.as_str());
        for stops in 0u32..=2 {
            // Direct flights are the headline product, so routes carry one
            // more of them than each connecting tier.
            let offers = if stops == 0 { 3 } else { 2 };
            for i in 0..offers {
                let tier_multiplier = match stops {
                    0 => 1.4,
                    1 => 1.0,
                    _ => 0.7,
                };
                let price = (base_price
                    * rng.gen_range(0.8..1.2)
                    * tier_multiplier
                    * (1.0 + i as f64 * 0.1))
                    .round();

                let dep_hour: u32 = rng.gen_range(6..22);
                let dep_minute: u32 = rng.gen_range(0..60);
                let duration_minutes = base_duration + stops * 90 + rng.gen_range(0..60);
                let arrival_total = dep_hour * 60 + dep_minute + duration_minutes;
                let departure = format!("{:02}:{:02}", dep_hour, dep_minute);
                let arrival = format!(
                    "{:02}:{:02}",
                    (arrival_total / 60) % 24,
                    arrival_total % 60
                );

                let stop_locations: Vec<String> = hub_pool
                    .choose_multiple(&mut rng, stops as usize)
                    .map(|h| h.to_string())
                    .collect();

                let amenity_count = if premium {
                    5
                } else if stops == 0 {
                    4
                } else {
                    3
                };

                let suffix: String = (&mut rng)
                    .sample_iter(Alphanumeric)
                    .take(6)
                    .map(char::from)
                    .collect::<String>()
                    .to_lowercase();

                flights.push(FlightRecord {
                    id: format!("{}-{}-{}-{}-{}", airline.code, stops, i, millis, suffix),
                    airline: airline.name.clone(),
                    airline_code: airline.code.clone(),
                    flight_number: format!("{}{}", airline.code, rng.gen_range(1000..10000)),
                    origin: origin.clone(),
                    destination: destination.clone(),
                    departure: departure.clone(),
                    arrival: arrival.clone(),
                    departure_date: format!("{}T{}:00", departure_date, departure),
                    arrival_date: format!("{}T{}:00", departure_date, arrival),
                    duration: crate::format::format_duration(duration_minutes),
                    duration_minutes,
                    price,
                    currency: "USD".to_string(),
                    stops,
                    stop_locations,
                    aircraft: AIRCRAFT
                        .choose(&mut rng)
                        .copied()
                        .unwrap_or(AIRCRAFT[0])
                        .to_string(),
                    available_seats: rng.gen_range(10..60),
                    cabin_class: "economy".to_string(),
                    baggage: Some(BaggageInfo {
                        checked_bags: if premium { 2 } else { 1 },
                        carry_on: true,
                        weight: Some("23kg".to_string()),
                    }),
                    amenities: AMENITIES[..amenity_count]
                        .iter()
                        .map(|a| a.to_string())
                        .collect(),
                });
            }
        }
    }

    info!(
        "Generated {} mock flights — route={}-{} base_price={}",
        flights.len(),
        origin,
        destination,
        base_price
    );
    sorter::sort_flights(&flights, SortSpec::default())
}

/// Run a full mock search: generate offers for the query's route and wrap
/// them with their summary.
pub fn generate_search_results(query: &SearchQuery) -> SearchResults {
    let flights = generate_flights(&query.origin, &query.destination, &query.departure_date);
    SearchResults::new(query.clone(), flights, "mock")
}

/// One day of fare history for a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

/// Daily fares for the trailing window, oldest first and ending today.
/// Weekends run about 20% dearer, with day-to-day jitter on top.
pub fn generate_price_history(origin: &str, destination: &str, days: u32) -> Vec<PricePoint> {
    let base_price = 200.0 + (route_hash(&origin.to_uppercase(), &destination.to_uppercase())
        % 800) as f64;
    let today = chrono::Local::now().date_naive();
    let mut rng = rand::thread_rng();

    (0..days)
        .rev()
        .map(|offset| {
            let date = today - chrono::Duration::days(i64::from(offset));
            let weekend = matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun);
            let weekend_multiplier = if weekend { 1.2 } else { 1.0 };
            PricePoint {
                date: date.format("%Y-%m-%d").to_string(),
                price: (base_price * weekend_multiplier * rng.gen_range(0.9..1.1)).round(),
            }
        })
        .collect()
}

/// Pick up to three headline offers: the cheapest overall, the cheapest
/// non-stop (or shortest flight when nothing is direct), and the cheapest
/// one-stop. Duplicates collapse, so fewer can come back.
pub fn recommend_flights(flights: &[FlightRecord]) -> Vec<FlightRecord> {
    if flights.is_empty() {
        return Vec::new();
    }
    let by_price = sorter::sort_flights(flights, SortSpec::default());

    let cheapest = by_price.first();
    let fastest = by_price
        .iter()
        .find(|f| f.stops == 0)
        .or_else(|| by_price.iter().min_by_key(|f| f.duration_minutes));
    let best_value = by_price.iter().find(|f| f.stops == 1);

    let mut picks: Vec<FlightRecord> = Vec::new();
    for candidate in [cheapest, fastest, best_value].into_iter().flatten() {
        if !picks.iter().any(|p| p.id == candidate.id) {
            picks.push(candidate.clone());
        }
    }
    picks
}
