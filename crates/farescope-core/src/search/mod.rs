//! Flight search domain: the record model, query validation, and the
//! session that owns one result set with its filter and sort state.

pub mod chart;
pub mod filters;
pub mod sorter;

use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::airports;
use crate::search::chart::ChartBucket;
use crate::search::filters::{DurationRange, FilterCriteria, PriceRange, TimeSlot};
use crate::search::sorter::SortSpec;

/// Checked/carry-on allowance attached to an offer when the source
/// reports one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaggageInfo {
    pub checked_bags: u32,
    pub carry_on: bool,
    #[serde(default)]
    pub weight: Option<String>,
}

/// One bookable flight offer, normalized across sources. Clock fields
/// (`departure`, `arrival`) are zero-padded 24h "HH:MM" strings so their
/// lexicographic order is their chronological order; `duration` is the
/// human display form and `duration_minutes` the value arithmetic runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub id: String,
    pub airline: String,
    pub airline_code: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub departure_date: String,
    pub arrival_date: String,
    pub duration: String,
    pub duration_minutes: u32,
    pub price: f64,
    pub currency: String,
    pub stops: u32,
    #[serde(default)]
    pub stop_locations: Vec<String>,
    pub aircraft: String,
    pub available_seats: u32,
    pub cabin_class: String,
    #[serde(default)]
    pub baggage: Option<BaggageInfo>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

impl FromStr for TripType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "one-way" | "oneway" => Ok(TripType::OneWay),
            "round-trip" | "roundtrip" => Ok(TripType::RoundTrip),
            other => Err(format!(
                "unknown trip type '{}' (expected one-way or round-trip)",
                other
            )),
        }
    }
}

pub const CABIN_CLASSES: [&str; 4] = ["economy", "premium_economy", "business", "first"];

/// Longest booking horizon accepted for a departure date, in days.
pub const MAX_BOOKING_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("invalid origin airport code: {0}")]
    InvalidOrigin(String),
    #[error("invalid destination airport code: {0}")]
    InvalidDestination(String),
    #[error("origin and destination must differ")]
    SameEndpoints,
    #[error("invalid departure date: {0}")]
    InvalidDepartureDate(String),
    #[error("departure date must fall within the next {MAX_BOOKING_WINDOW_DAYS} days")]
    DepartureOutOfWindow,
    #[error("round-trip searches need a return date")]
    MissingReturnDate,
    #[error("invalid return date: {0}")]
    InvalidReturnDate(String),
    #[error("return date must be after the departure date")]
    ReturnBeforeDeparture,
    #[error("passenger count must be between 1 and 9, got {0}")]
    InvalidPassengers(u32),
    #[error("unknown cabin class: {0}")]
    InvalidCabinClass(String),
}

/// What the user asked for, before any source is consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub passengers: u32,
    pub cabin_class: String,
    pub trip_type: TripType,
}

impl SearchQuery {
    /// Reject a query before it reaches any flight source. Checks run in
    /// field order and the first failure wins.
    pub fn validate(&self) -> Result<(), QueryError> {
        if !airports::is_valid_airport_code(&self.origin) {
            return Err(QueryError::InvalidOrigin(self.origin.clone()));
        }
        if !airports::is_valid_airport_code(&self.destination) {
            return Err(QueryError::InvalidDestination(self.destination.clone()));
        }
        if self.origin.eq_ignore_ascii_case(&self.destination) {
            return Err(QueryError::SameEndpoints);
        }

        let departure = chrono::NaiveDate::parse_from_str(&self.departure_date, "%Y-%m-%d")
            .map_err(|_| QueryError::InvalidDepartureDate(self.departure_date.clone()))?;
        let today = chrono::Local::now().date_naive();
        if departure < today || departure > today + chrono::Duration::days(MAX_BOOKING_WINDOW_DAYS)
        {
            return Err(QueryError::DepartureOutOfWindow);
        }

        if self.trip_type == TripType::RoundTrip {
            let raw = self
                .return_date
                .as_deref()
                .ok_or(QueryError::MissingReturnDate)?;
            let ret = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| QueryError::InvalidReturnDate(raw.to_string()))?;
            if ret <= departure {
                return Err(QueryError::ReturnBeforeDeparture);
            }
        }

        if self.passengers < 1 || self.passengers > 9 {
            return Err(QueryError::InvalidPassengers(self.passengers));
        }
        if !CABIN_CLASSES.contains(&self.cabin_class.as_str()) {
            return Err(QueryError::InvalidCabinClass(self.cabin_class.clone()));
        }

        Ok(())
    }
}

/// A resolved search: the query, its offers and summary figures derived
/// from them once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub search_id: String,
    pub timestamp: String,
    pub query: SearchQuery,
    pub flights: Vec<FlightRecord>,
    pub total_results: usize,
    pub currency: String,
    pub cheapest_price: Option<f64>,
    pub average_price: Option<f64>,
    pub airlines: Vec<String>,
}

impl SearchResults {
    /// Wrap raw offers with their summary. `source` tags the search id so
    /// later inspection can tell mock data from live data.
    pub fn new(query: SearchQuery, flights: Vec<FlightRecord>, source: &str) -> Self {
        let cheapest_price = flights
            .iter()
            .map(|f| f.price)
            .fold(None, |best: Option<f64>, p| {
                Some(best.map_or(p, |b| b.min(p)))
            });
        let average_price = if flights.is_empty() {
            None
        } else {
            let sum: f64 = flights.iter().map(|f| f.price).sum();
            Some((sum / flights.len() as f64).round())
        };
        let currency = flights
            .first()
            .map(|f| f.currency.clone())
            .unwrap_or_else(|| "USD".to_string());
        let airlines = crate::stats::unique_airlines(&flights);

        SearchResults {
            search_id: crate::new_search_id(source),
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_results: flights.len(),
            currency,
            cheapest_price,
            average_price,
            airlines,
            query,
            flights,
        }
    }
}

/// One user action against the session's filter state. The set of
/// possible updates is closed: adding a dimension means adding a variant
/// here, not threading ad-hoc mutations through callers.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    SetMaxPrice(f64),
    ToggleStop(u32),
    ToggleAirline(String),
    ToggleDepartureSlot(TimeSlot),
    ToggleArrivalSlot(TimeSlot),
    SetDurationRange(Option<DurationRange>),
    Clear,
}

/// Holds one search's results together with the criteria and sort spec
/// applied to them. Mutations go through [`SearchSession::apply`] and
/// [`SearchSession::set_sort`], which report whether anything actually
/// changed so callers know when a recomputation is due.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSession {
    results: Option<SearchResults>,
    criteria: FilterCriteria,
    sort: SortSpec,
}

impl Default for SearchSession {
    fn default() -> Self {
        SearchSession {
            results: None,
            criteria: FilterCriteria::default_for(&[]),
            sort: SortSpec::default(),
        }
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a fresh result set. Criteria are re-derived from the new
    /// flights (stale constraints never leak across searches); the sort
    /// spec is a user preference and survives.
    pub fn install_results(&mut self, results: SearchResults) {
        info!(
            "Search results installed — route={}-{} flights={}",
            results.query.origin, results.query.destination, results.total_results
        );
        self.criteria = FilterCriteria::default_for(&results.flights);
        self.results = Some(results);
    }

    pub fn results(&self) -> Option<&SearchResults> {
        self.results.as_ref()
    }

    pub fn flights(&self) -> &[FlightRecord] {
        self.results.as_ref().map_or(&[], |r| &r.flights)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// Apply one update. Returns true when the criteria changed, which is
    /// the signal to re-run the filter pass. A toggle of an
    /// already-absent-then-added value twice, or clearing pristine
    /// criteria, reports false.
    pub fn apply(&mut self, op: UpdateOp) -> bool {
        let before = self.criteria.clone();
        match op {
            UpdateOp::SetMaxPrice(price) => self.criteria.max_price = price,
            UpdateOp::ToggleStop(stops) => self.criteria.toggle_stop(stops),
            UpdateOp::ToggleAirline(airline) => self.criteria.toggle_airline(airline),
            UpdateOp::ToggleDepartureSlot(slot) => self.criteria.toggle_departure_slot(slot),
            UpdateOp::ToggleArrivalSlot(slot) => self.criteria.toggle_arrival_slot(slot),
            UpdateOp::SetDurationRange(range) => self.criteria.duration = range,
            UpdateOp::Clear => {
                let fresh = FilterCriteria::default_for(self.flights());
                self.criteria = fresh;
            }
        }
        let changed = self.criteria != before;
        if changed {
            debug!(
                "Filter criteria updated — active={} visible={}",
                self.active_filter_count(),
                self.filtered().len()
            );
        }
        changed
    }

    /// Replace the sort spec. Returns true when it differs from the
    /// current one.
    pub fn set_sort(&mut self, spec: SortSpec) -> bool {
        let changed = spec != self.sort;
        self.sort = spec;
        changed
    }

    /// The visible list: filter pass then sort pass, both pure.
    pub fn filtered(&self) -> Vec<FlightRecord> {
        let kept = filters::filter_flights(self.flights(), &self.criteria);
        sorter::sort_flights(&kept, self.sort)
    }

    /// Chart buckets over the currently visible flights.
    pub fn chart_data(&self) -> Vec<ChartBucket> {
        chart::aggregate_by_stops(&filters::filter_flights(self.flights(), &self.criteria))
    }

    pub fn price_range(&self) -> PriceRange {
        filters::price_range(self.flights())
    }

    pub fn active_filter_count(&self) -> usize {
        filters::active_filter_count(&self.criteria, &self.price_range())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal plausible offer for engine tests. Fields the test cares
    /// about get overwritten after construction.
    pub(crate) fn make_test_flight(id: &str, price: f64, stops: u32) -> FlightRecord {
        FlightRecord {
            id: id.to_string(),
            airline: "Delta".to_string(),
            airline_code: "DL".to_string(),
            flight_number: "DL1234".to_string(),
            origin: "JFK".to_string(),
            destination: "LAX".to_string(),
            departure: "08:00".to_string(),
            arrival: "11:30".to_string(),
            departure_date: "2026-09-01T08:00:00".to_string(),
            arrival_date: "2026-09-01T11:30:00".to_string(),
            duration: "5h 30m".to_string(),
            duration_minutes: 330,
            price,
            currency: "USD".to_string(),
            stops,
            stop_locations: Vec::new(),
            aircraft: "Boeing 737".to_string(),
            available_seats: 42,
            cabin_class: "economy".to_string(),
            baggage: Some(BaggageInfo {
                checked_bags: 1,
                carry_on: true,
                weight: Some("23kg".to_string()),
            }),
            amenities: vec!["WiFi".to_string()],
        }
    }

    pub(crate) fn make_test_query() -> SearchQuery {
        let departure = chrono::Local::now().date_naive() + chrono::Duration::days(30);
        SearchQuery {
            origin: "JFK".to_string(),
            destination: "LAX".to_string(),
            departure_date: departure.format("%Y-%m-%d").to_string(),
            return_date: None,
            passengers: 1,
            cabin_class: "economy".to_string(),
            trip_type: TripType::OneWay,
        }
    }

    #[test]
    fn test_valid_query_passes() {
        assert_eq!(make_test_query().validate(), Ok(()));
    }

    #[test]
    fn test_query_rejects_bad_endpoints() {
        let mut query = make_test_query();
        query.origin = "NEWYORK".to_string();
        assert_eq!(
            query.validate(),
            Err(QueryError::InvalidOrigin("NEWYORK".to_string()))
        );

        let mut query = make_test_query();
        query.destination = "l4x".to_string();
        assert_eq!(
            query.validate(),
            Err(QueryError::InvalidDestination("l4x".to_string()))
        );

        let mut query = make_test_query();
        query.destination = "jfk".to_string();
        assert_eq!(query.validate(), Err(QueryError::SameEndpoints));
    }

    #[test]
    fn test_query_rejects_bad_dates() {
        let mut query = make_test_query();
        query.departure_date = "tomorrow".to_string();
        assert!(matches!(
            query.validate(),
            Err(QueryError::InvalidDepartureDate(_))
        ));

        let mut query = make_test_query();
        query.departure_date = "2020-01-01".to_string();
        assert_eq!(query.validate(), Err(QueryError::DepartureOutOfWindow));

        let mut query = make_test_query();
        let far = chrono::Local::now().date_naive() + chrono::Duration::days(400);
        query.departure_date = far.format("%Y-%m-%d").to_string();
        assert_eq!(query.validate(), Err(QueryError::DepartureOutOfWindow));
    }

    #[test]
    fn test_round_trip_needs_later_return() {
        let mut query = make_test_query();
        query.trip_type = TripType::RoundTrip;
        assert_eq!(query.validate(), Err(QueryError::MissingReturnDate));

        query.return_date = Some(query.departure_date.clone());
        assert_eq!(query.validate(), Err(QueryError::ReturnBeforeDeparture));

        let later = chrono::Local::now().date_naive() + chrono::Duration::days(37);
        query.return_date = Some(later.format("%Y-%m-%d").to_string());
        assert_eq!(query.validate(), Ok(()));
    }

    #[test]
    fn test_query_rejects_bad_passengers_and_cabin() {
        let mut query = make_test_query();
        query.passengers = 0;
        assert_eq!(query.validate(), Err(QueryError::InvalidPassengers(0)));

        let mut query = make_test_query();
        query.passengers = 10;
        assert_eq!(query.validate(), Err(QueryError::InvalidPassengers(10)));

        let mut query = make_test_query();
        query.cabin_class = "steerage".to_string();
        assert_eq!(
            query.validate(),
            Err(QueryError::InvalidCabinClass("steerage".to_string()))
        );
    }

    #[test]
    fn test_results_summary() {
        let flights = vec![
            make_test_flight("a", 300.0, 0),
            make_test_flight("b", 100.0, 1),
            make_test_flight("c", 201.0, 2),
        ];
        let results = SearchResults::new(make_test_query(), flights, "mock");
        assert!(results.search_id.starts_with("mock_"));
        assert_eq!(results.total_results, 3);
        assert_eq!(results.cheapest_price, Some(100.0));
        // 601 / 3 = 200.33... rounds down.
        assert_eq!(results.average_price, Some(200.0));
        assert_eq!(results.currency, "USD");

        let empty = SearchResults::new(make_test_query(), Vec::new(), "mock");
        assert_eq!(empty.cheapest_price, None);
        assert_eq!(empty.average_price, None);
        assert_eq!(empty.total_results, 0);
    }

    #[test]
    fn test_session_reports_real_changes_only() {
        let mut session = SearchSession::new();
        session.install_results(SearchResults::new(
            make_test_query(),
            vec![
                make_test_flight("a", 100.0, 0),
                make_test_flight("b", 900.0, 1),
            ],
            "mock",
        ));

        assert!(session.apply(UpdateOp::ToggleStop(0)));
        assert_eq!(session.filtered().len(), 1);

        // Setting the max price to its current value is a no-op.
        let current = session.criteria().max_price;
        assert!(!session.apply(UpdateOp::SetMaxPrice(current)));

        assert!(session.apply(UpdateOp::Clear));
        assert!(!session.apply(UpdateOp::Clear), "clear is idempotent");
        assert_eq!(session.filtered().len(), 2);
    }

    #[test]
    fn test_new_results_reset_criteria_but_keep_sort() {
        use crate::search::sorter::{SortField, SortOrder};

        let mut session = SearchSession::new();
        session.install_results(SearchResults::new(
            make_test_query(),
            vec![make_test_flight("a", 500.0, 0)],
            "mock",
        ));
        session.apply(UpdateOp::ToggleStop(0));
        session.set_sort(SortSpec {
            field: SortField::Duration,
            order: SortOrder::Desc,
        });

        session.install_results(SearchResults::new(
            make_test_query(),
            vec![make_test_flight("b", 800.0, 1)],
            "mock",
        ));
        assert!(session.criteria().stops.is_empty());
        assert_eq!(session.criteria().max_price, 800.0);
        assert_eq!(session.sort().field, SortField::Duration);
    }

    #[test]
    fn test_empty_session_is_inert() {
        let session = SearchSession::new();
        assert!(session.flights().is_empty());
        assert!(session.filtered().is_empty());
        assert!(session.chart_data().is_empty());
        assert_eq!(session.active_filter_count(), 0);
        assert_eq!(session.price_range().max, filters::FALLBACK_MAX_PRICE);
    }
}
