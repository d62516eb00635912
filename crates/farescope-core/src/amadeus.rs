// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FareScope

//! Client for the Amadeus flight-offers API.
//!
//! Handles the OAuth client-credentials dance with token caching, retries
//! transient request failures, and flattens the deeply nested offer payload
//! into [`FlightRecord`]s. Offers the payload mangles beyond use are skipped
//! with a warning rather than failing the whole search.

use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::airports;
use crate::search::{BaggageInfo, FlightRecord, SearchQuery, TripType};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const OFFERS_PATH: &str = "/v2/shopping/flight-offers";

/// Carriers whose live fares include the extended amenity set.
const PREMIUM_CARRIERS: [&str; 4] = ["EK", "QR", "SQ", "EY"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("API credentials are not configured")]
    MissingCredentials,
    #[error("malformed API response: {0}")]
    Malformed(String),
}

/// Connection settings for the offers API. The default points at the
/// sandbox host with no credentials; callers fill those in.
#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        AmadeusConfig {
            base_url: "https://test.api.amadeus.com".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl AmadeusConfig {
    pub fn with_credentials(api_key: &str, api_secret: &str) -> Self {
        AmadeusConfig {
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: chrono::DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

pub struct AmadeusClient {
    config: AmadeusConfig,
    http: reqwest::blocking::Client,
    token: Option<CachedToken>,
}

impl AmadeusClient {
    pub fn new(config: AmadeusConfig) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(AmadeusClient {
            config,
            http,
            token: None,
        })
    }

    /// Current bearer token, reusing the cached one while it is fresh.
    fn bearer_token(&mut self) -> Result<String, ApiError> {
        if let Some(token) = &self.token {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }
        let token = self.authenticate()?;
        let value = token.value.clone();
        self.token = Some(token);
        Ok(value)
    }

    fn authenticate(&self) -> Result<CachedToken, ApiError> {
        if self.config.api_key.is_empty() || self.config.api_secret.is_empty() {
            return Err(ApiError::MissingCredentials);
        }

        let url = format!("{}{}", self.config.base_url, TOKEN_PATH);
        info!("Requesting API access token — url={}", url);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.api_key.as_str()),
                ("client_secret", self.config.api_secret.as_str()),
            ])
            .send()?
            .error_for_status()
            .map_err(|e| ApiError::Auth(e.to_string()))?;

        let token: TokenResponse = response.json()?;
        // Refresh a minute early so a request never straddles expiry.
        let expires_at = Utc::now() + chrono::Duration::seconds((token.expires_in - 60).max(0));
        debug!("Access token cached — expires_in_secs={}", token.expires_in);
        Ok(CachedToken {
            value: token.access_token,
            expires_at,
        })
    }

    /// Fetch and normalize live offers for a validated query.
    pub fn search_flights(&mut self, query: &SearchQuery) -> Result<Vec<FlightRecord>, ApiError> {
        let token = self.bearer_token()?;
        let url = format!("{}{}", self.config.base_url, OFFERS_PATH);
        let params = search_params(query);
        info!(
            "Searching flight offers — route={}-{} date={}",
            query.origin, query.destination, query.departure_date
        );

        let http = &self.http;
        let payload: OffersResponse = with_retry(
            self.config.max_retries,
            Duration::from_millis(self.config.retry_delay_ms),
            || {
                let response = http
                    .get(&url)
                    .bearer_auth(&token)
                    .query(&params)
                    .send()?
                    .error_for_status()?;
                Ok(response.json::<OffersResponse>()?)
            },
        )?;

        let flights = transform_offers(&payload.data);
        info!(
            "Flight offers received — total={} usable={}",
            payload.data.len(),
            flights.len()
        );
        Ok(flights)
    }
}

/// Run `op` up to `attempts` times, backing off linearly between tries.
/// The final attempt's error is the one returned.
pub fn with_retry<T, F>(attempts: u32, base_delay: Duration, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Result<T, ApiError>,
{
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(err);
                }
                warn!(
                    "Request failed; retrying — attempt={} of={} error={}",
                    attempt, attempts, err
                );
                std::thread::sleep(base_delay * attempt);
            }
        }
    }
}

/// Query-string parameters for the offers endpoint.
fn search_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("originLocationCode", query.origin.to_uppercase()),
        ("destinationLocationCode", query.destination.to_uppercase()),
        ("departureDate", query.departure_date.clone()),
        ("adults", query.passengers.to_string()),
    ];
    if query.trip_type == TripType::RoundTrip {
        if let Some(return_date) = &query.return_date {
            params.push(("returnDate", return_date.clone()));
        }
    }
    params.push(("travelClass", query.cabin_class.to_uppercase()));
    params.push(("currencyCode", "USD".to_string()));
    params.push(("max", "50".to_string()));
    params
}

fn airline_full_name(code: &str) -> String {
    if let Some(info) = airports::airline_by_code(code) {
        return info.name.clone();
    }
    // Carriers the offers feed returns that the bundled directory does
    // not cover.
    match code {
        "KL" => "KLM".to_string(),
        "VS" => "Virgin Atlantic".to_string(),
        _ => code.to_string(),
    }
}

fn aircraft_name(code: Option<&str>) -> String {
    let Some(code) = code else {
        return "Aircraft".to_string();
    };
    match code {
        "320" => "Airbus A320".to_string(),
        "321" => "Airbus A321".to_string(),
        "330" => "Airbus A330".to_string(),
        "350" => "Airbus A350".to_string(),
        "380" => "Airbus A380".to_string(),
        "737" => "Boeing 737".to_string(),
        "777" => "Boeing 777".to_string(),
        "787" => "Boeing 787 Dreamliner".to_string(),
        other => format!("Aircraft {}", other),
    }
}

fn parse_offer_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok()
}

/// Flatten raw offers into records. One bad offer never spoils the batch:
/// anything missing an itinerary, carrying garbage datetimes or an
/// unparsable price is dropped with a warning.
fn transform_offers(offers: &[FlightOffer]) -> Vec<FlightRecord> {
    let mut flights = Vec::with_capacity(offers.len());

    for offer in offers {
        let Some(itinerary) = offer.itineraries.first() else {
            warn!("Skipping offer without itinerary — id={}", offer.id);
            continue;
        };
        let (Some(first), Some(last)) = (itinerary.segments.first(), itinerary.segments.last())
        else {
            warn!("Skipping offer without segments — id={}", offer.id);
            continue;
        };

        let (Some(departure_dt), Some(arrival_dt)) = (
            parse_offer_datetime(&first.departure.at),
            parse_offer_datetime(&last.arrival.at),
        ) else {
            warn!("Skipping offer with malformed datetimes — id={}", offer.id);
            continue;
        };
        let minutes = (arrival_dt - departure_dt).num_minutes();
        if minutes < 0 {
            warn!("Skipping offer arriving before departure — id={}", offer.id);
            continue;
        }
        let duration_minutes = minutes as u32;

        let Ok(price) = offer.price.total.parse::<f64>() else {
            warn!(
                "Skipping offer with unparsable price — id={} total={}",
                offer.id, offer.price.total
            );
            continue;
        };

        let stops = (itinerary.segments.len() - 1) as u32;
        let stop_locations: Vec<String> = itinerary.segments
            [..itinerary.segments.len() - 1]
            .iter()
            .map(|s| s.arrival.iata_code.clone())
            .collect();

        let airline_code = first.carrier_code.clone().unwrap_or_default();
        let cabin_class = offer
            .traveler_pricings
            .first()
            .and_then(|tp| tp.fare_details_by_segment.first())
            .and_then(|fd| fd.cabin.as_deref())
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| "economy".to_string());
        let checked_bags = offer
            .traveler_pricings
            .first()
            .and_then(|tp| tp.fare_details_by_segment.first())
            .and_then(|fd| fd.included_checked_bags.as_ref())
            .and_then(|b| b.quantity)
            .unwrap_or(1);

        let amenities: Vec<String> = if PREMIUM_CARRIERS.contains(&airline_code.as_str()) {
            vec![
                "WiFi",
                "In-flight Entertainment",
                "USB Power",
                "Meals Included",
                "Extra Legroom",
            ]
        } else {
            vec!["In-flight Entertainment", "USB Power", "Meals Included"]
        }
        .into_iter()
        .map(String::from)
        .collect();

        flights.push(FlightRecord {
            id: offer.id.clone(),
            airline: airline_full_name(&airline_code),
            flight_number: format!(
                "{}{}",
                airline_code,
                first.number.clone().unwrap_or_default()
            ),
            airline_code,
            origin: first.departure.iata_code.clone(),
            destination: last.arrival.iata_code.clone(),
            departure: departure_dt.format("%H:%M").to_string(),
            arrival: arrival_dt.format("%H:%M").to_string(),
            departure_date: first.departure.at.clone(),
            arrival_date: last.arrival.at.clone(),
            duration: crate::format::format_duration(duration_minutes),
            duration_minutes,
            price,
            currency: offer
                .price
                .currency
                .clone()
                .unwrap_or_else(|| "USD".to_string()),
            stops,
            stop_locations,
            aircraft: aircraft_name(
                first.aircraft.as_ref().and_then(|a| a.code.as_deref()),
            ),
            available_seats: offer.number_of_bookable_seats.unwrap_or(0),
            cabin_class,
            baggage: Some(BaggageInfo {
                checked_bags,
                carry_on: true,
                weight: Some("23kg".to_string()),
            }),
            amenities,
        });
    }

    flights
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<FlightOffer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlightOffer {
    id: String,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
    price: OfferPrice,
    #[serde(default)]
    number_of_bookable_seats: Option<u32>,
    #[serde(default)]
    traveler_pricings: Vec<TravelerPricing>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    departure: SegmentPoint,
    arrival: SegmentPoint,
    #[serde(default)]
    carrier_code: Option<String>,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    aircraft: Option<AircraftCode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentPoint {
    iata_code: String,
    at: String,
}

#[derive(Debug, Deserialize)]
struct AircraftCode {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OfferPrice {
    total: String,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TravelerPricing {
    #[serde(default)]
    fare_details_by_segment: Vec<FareDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FareDetails {
    #[serde(default)]
    cabin: Option<String>,
    #[serde(default)]
    included_checked_bags: Option<CheckedBags>,
}

#[derive(Debug, Deserialize)]
struct CheckedBags {
    #[serde(default)]
    quantity: Option<u32>,
}
