// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FareScope

//! Ordering of a result set by a single key and direction.
//!
//! CRITICAL: sorting must be stable and deterministic. Equal-key flights
//! keep their incoming relative order, so repeated application with the
//! same spec never reshuffles a list.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::search::FlightRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Price,
    Duration,
    Departure,
    Arrival,
    Stops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A sort key plus direction. The default matches what a fresh search
/// shows: cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            field: SortField::Price,
            order: SortOrder::Asc,
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(SortField::Price),
            "duration" => Ok(SortField::Duration),
            "departure" => Ok(SortField::Departure),
            "arrival" => Ok(SortField::Arrival),
            "stops" => Ok(SortField::Stops),
            other => Err(format!(
                "unknown sort field '{}' (expected price, duration, departure, arrival or stops)",
                other
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}' (expected asc or desc)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortOption {
    pub field: SortField,
    pub order: SortOrder,
    pub label: &'static str,
}

/// The orderings offered to users, in menu order.
pub const SORT_OPTIONS: [SortOption; 9] = [
    SortOption {
        field: SortField::Price,
        order: SortOrder::Asc,
        label: "Lowest Price",
    },
    SortOption {
        field: SortField::Price,
        order: SortOrder::Desc,
        label: "Highest Price",
    },
    SortOption {
        field: SortField::Duration,
        order: SortOrder::Asc,
        label: "Shortest Duration",
    },
    SortOption {
        field: SortField::Duration,
        order: SortOrder::Desc,
        label: "Longest Duration",
    },
    SortOption {
        field: SortField::Departure,
        order: SortOrder::Asc,
        label: "Earliest Departure",
    },
    SortOption {
        field: SortField::Departure,
        order: SortOrder::Desc,
        label: "Latest Departure",
    },
    SortOption {
        field: SortField::Arrival,
        order: SortOrder::Asc,
        label: "Earliest Arrival",
    },
    SortOption {
        field: SortField::Arrival,
        order: SortOrder::Desc,
        label: "Latest Arrival",
    },
    SortOption {
        field: SortField::Stops,
        order: SortOrder::Asc,
        label: "Fewest Stops",
    },
];

/// Ascending comparison on one key. Incomparable values (NaN prices)
/// compare equal rather than poisoning the pass; descending order is
/// this same comparison reversed.
fn compare(a: &FlightRecord, b: &FlightRecord, field: SortField) -> Ordering {
    match field {
        SortField::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
        SortField::Duration => a.duration_minutes.cmp(&b.duration_minutes),
        SortField::Departure => a.departure.cmp(&b.departure),
        SortField::Arrival => a.arrival.cmp(&b.arrival),
        SortField::Stops => a.stops.cmp(&b.stops),
    }
}

/// The sort pass. Pure: the input slice is left untouched and the ordered
/// flights come back as a fresh vector.
pub fn sort_flights(flights: &[FlightRecord], spec: SortSpec) -> Vec<FlightRecord> {
    let mut sorted: Vec<FlightRecord> = flights.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare(a, b, spec.field);
        match spec.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}
