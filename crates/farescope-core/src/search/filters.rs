// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FareScope

//! Filter criteria and the filter pass over a result set.
//!
//! Matching is a logical AND across dimensions and a logical OR within a
//! dimension's set. An empty set for any dimension means "unconstrained",
//! never "match nothing".

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::search::FlightRecord;

/// Coarse bucket of the day used for departure/arrival filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    /// Night [0,6), morning [6,12), afternoon [12,18), evening [18,24).
    /// Boundary hours belong to the slot they open. Hours outside the day
    /// classify as no slot at all.
    pub fn from_hour(hour: u32) -> Option<TimeSlot> {
        match hour {
            0..=5 => Some(TimeSlot::Night),
            6..=11 => Some(TimeSlot::Morning),
            12..=17 => Some(TimeSlot::Afternoon),
            18..=23 => Some(TimeSlot::Evening),
            _ => None,
        }
    }

    /// Lenient hour extraction from a wall-clock string: leading digits of
    /// the part before the first ':'. Returns None for anything without a
    /// parsable in-range hour, so malformed times fail closed instead of
    /// aborting a filter pass.
    pub fn from_clock(time: &str) -> Option<TimeSlot> {
        let head = time.split(':').next().unwrap_or("").trim_start();
        let digits: String = head.chars().take_while(|c| c.is_ascii_digit()).collect();
        let hour: u32 = digits.parse().ok()?;
        TimeSlot::from_hour(hour)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::Night => "Night",
            TimeSlot::Morning => "Morning",
            TimeSlot::Afternoon => "Afternoon",
            TimeSlot::Evening => "Evening",
        }
    }

    pub fn hours_label(&self) -> &'static str {
        match self {
            TimeSlot::Night => "12AM - 6AM",
            TimeSlot::Morning => "6AM - 12PM",
            TimeSlot::Afternoon => "12PM - 6PM",
            TimeSlot::Evening => "6PM - 12AM",
        }
    }

    /// Canonical presentation order for pickers.
    pub fn all() -> [TimeSlot; 4] {
        [
            TimeSlot::Morning,
            TimeSlot::Afternoon,
            TimeSlot::Evening,
            TimeSlot::Night,
        ]
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "night" => Ok(TimeSlot::Night),
            "morning" => Ok(TimeSlot::Morning),
            "afternoon" => Ok(TimeSlot::Afternoon),
            "evening" => Ok(TimeSlot::Evening),
            other => Err(format!(
                "unknown time slot '{}' (expected morning, afternoon, evening or night)",
                other
            )),
        }
    }
}

/// Inclusive duration window in minutes. A missing bound is open on that
/// side: no min means 0, no max means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DurationRange {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

impl DurationRange {
    pub fn contains(&self, minutes: u32) -> bool {
        minutes >= self.min.unwrap_or(0) && minutes <= self.max.unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// The complete set of user-selected constraints for one search session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub max_price: f64,
    pub stops: Vec<u32>,
    pub airlines: Vec<String>,
    pub departure_slots: Vec<TimeSlot>,
    pub arrival_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub duration: Option<DurationRange>,
}

/// Max price used when no result set is available to derive bounds from.
pub const FALLBACK_MAX_PRICE: f64 = 2000.0;

impl FilterCriteria {
    /// Fresh defaults for a result set: max price pinned to the most
    /// expensive offer (fallback for an empty set), every other dimension
    /// unconstrained.
    pub fn default_for(flights: &[FlightRecord]) -> Self {
        let max_price = if flights.is_empty() {
            FALLBACK_MAX_PRICE
        } else {
            flights.iter().map(|f| f.price).fold(f64::MIN, f64::max)
        };

        FilterCriteria {
            max_price,
            stops: Vec::new(),
            airlines: Vec::new(),
            departure_slots: Vec::new(),
            arrival_slots: Vec::new(),
            duration: None,
        }
    }

    pub fn toggle_stop(&mut self, stops: u32) {
        toggle_value(&mut self.stops, stops);
    }

    pub fn toggle_airline(&mut self, airline: String) {
        toggle_value(&mut self.airlines, airline);
    }

    pub fn toggle_departure_slot(&mut self, slot: TimeSlot) {
        toggle_value(&mut self.departure_slots, slot);
    }

    pub fn toggle_arrival_slot(&mut self, slot: TimeSlot) {
        toggle_value(&mut self.arrival_slots, slot);
    }

    pub fn apply_preset(&mut self, preset: &FilterPreset) {
        self.stops = preset.stops.to_vec();
    }

    pub fn matches(&self, flight: &FlightRecord) -> bool {
        if flight.price > self.max_price {
            return false;
        }

        if !self.stops.is_empty() && !self.stops.contains(&flight.stops) {
            return false;
        }

        if !self.airlines.is_empty() && !self.airlines.contains(&flight.airline) {
            return false;
        }

        if !self.departure_slots.is_empty() {
            match TimeSlot::from_clock(&flight.departure) {
                Some(slot) if self.departure_slots.contains(&slot) => {}
                _ => return false,
            }
        }

        if !self.arrival_slots.is_empty() {
            match TimeSlot::from_clock(&flight.arrival) {
                Some(slot) if self.arrival_slots.contains(&slot) => {}
                _ => return false,
            }
        }

        if let Some(range) = &self.duration {
            if !range.contains(flight.duration_minutes) {
                return false;
            }
        }

        true
    }
}

/// Toggle membership: present values are removed, absent values appended.
/// Insertion order is preserved so criteria round-trip stably through
/// serialization.
fn toggle_value<T: PartialEq>(set: &mut Vec<T>, value: T) {
    if let Some(pos) = set.iter().position(|v| *v == value) {
        set.remove(pos);
    } else {
        set.push(value);
    }
}

/// The filter pass. Pure: the input slice is left untouched and survivors
/// are returned as a fresh vector in input order.
pub fn filter_flights(flights: &[FlightRecord], criteria: &FilterCriteria) -> Vec<FlightRecord> {
    flights
        .iter()
        .filter(|f| criteria.matches(f))
        .cloned()
        .collect()
}

/// Price bounds of a result set; `{0, 2000}` for an empty one so default
/// criteria stay consistent before the first search resolves.
pub fn price_range(flights: &[FlightRecord]) -> PriceRange {
    if flights.is_empty() {
        return PriceRange {
            min: 0.0,
            max: FALLBACK_MAX_PRICE,
        };
    }
    PriceRange {
        min: flights.iter().map(|f| f.price).fold(f64::MAX, f64::min),
        max: flights.iter().map(|f| f.price).fold(f64::MIN, f64::max),
    }
}

/// How many dimensions deviate from "unconstrained", for badge display.
/// Six independent booleans, so the result is 0..=6.
pub fn active_filter_count(criteria: &FilterCriteria, price_range: &PriceRange) -> usize {
    let mut count = 0;

    if criteria.max_price < price_range.max {
        count += 1;
    }
    if !criteria.stops.is_empty() {
        count += 1;
    }
    if !criteria.airlines.is_empty() {
        count += 1;
    }
    if !criteria.departure_slots.is_empty() {
        count += 1;
    }
    if !criteria.arrival_slots.is_empty() {
        count += 1;
    }
    if criteria.duration.is_some() {
        count += 1;
    }

    count
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub stops: &'static [u32],
}

pub const FILTER_PRESETS: [FilterPreset; 3] = [
    FilterPreset {
        id: "cheapest",
        name: "Cheapest",
        stops: &[1, 2],
    },
    FilterPreset {
        id: "fastest",
        name: "Fastest",
        stops: &[0],
    },
    FilterPreset {
        id: "best-value",
        name: "Best Value",
        stops: &[0, 1],
    },
];

pub fn preset_by_id(id: &str) -> Option<&'static FilterPreset> {
    FILTER_PRESETS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_slot_boundaries() {
        // Boundary hours belong to the slot they open.
        assert_eq!(TimeSlot::from_hour(0), Some(TimeSlot::Night));
        assert_eq!(TimeSlot::from_hour(5), Some(TimeSlot::Night));
        assert_eq!(TimeSlot::from_hour(6), Some(TimeSlot::Morning));
        assert_eq!(TimeSlot::from_hour(11), Some(TimeSlot::Morning));
        assert_eq!(TimeSlot::from_hour(12), Some(TimeSlot::Afternoon));
        assert_eq!(TimeSlot::from_hour(17), Some(TimeSlot::Afternoon));
        assert_eq!(TimeSlot::from_hour(18), Some(TimeSlot::Evening));
        assert_eq!(TimeSlot::from_hour(23), Some(TimeSlot::Evening));
        assert_eq!(TimeSlot::from_hour(24), None);
        assert_eq!(TimeSlot::from_hour(99), None);
    }

    #[test]
    fn test_clock_parsing_is_lenient_but_fails_closed() {
        assert_eq!(TimeSlot::from_clock("06:00"), Some(TimeSlot::Morning));
        assert_eq!(TimeSlot::from_clock("6:30"), Some(TimeSlot::Morning));
        assert_eq!(TimeSlot::from_clock("18:59"), Some(TimeSlot::Evening));
        assert_eq!(TimeSlot::from_clock(" 7:00"), Some(TimeSlot::Morning));
        // Trailing junk after the digits is tolerated, like a lenient
        // integer parse would.
        assert_eq!(TimeSlot::from_clock("7a:00"), Some(TimeSlot::Morning));

        assert_eq!(TimeSlot::from_clock(""), None);
        assert_eq!(TimeSlot::from_clock("noon"), None);
        assert_eq!(TimeSlot::from_clock(":30"), None);
        assert_eq!(TimeSlot::from_clock("25:00"), None);
        assert_eq!(TimeSlot::from_clock("-5:00"), None);
    }

    #[test]
    fn test_time_slot_from_str() {
        assert_eq!("morning".parse::<TimeSlot>(), Ok(TimeSlot::Morning));
        assert_eq!(" Evening ".parse::<TimeSlot>(), Ok(TimeSlot::Evening));
        assert!("midnightish".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn test_duration_range_bounds() {
        let closed = DurationRange {
            min: Some(120),
            max: Some(300),
        };
        assert!(closed.contains(120));
        assert!(closed.contains(300));
        assert!(!closed.contains(119));
        assert!(!closed.contains(301));

        let open_top = DurationRange {
            min: Some(60),
            max: None,
        };
        assert!(open_top.contains(u32::MAX));
        assert!(!open_top.contains(59));

        assert!(DurationRange::default().contains(0));
    }

    #[test]
    fn test_toggle_preserves_other_entries() {
        let mut criteria = FilterCriteria::default_for(&[]);
        criteria.toggle_stop(0);
        criteria.toggle_stop(2);
        assert_eq!(criteria.stops, vec![0, 2]);

        criteria.toggle_stop(0);
        assert_eq!(criteria.stops, vec![2]);

        criteria.toggle_airline("Delta".to_string());
        criteria.toggle_departure_slot(TimeSlot::Morning);
        assert_eq!(criteria.stops, vec![2], "other dimensions untouched");
        assert_eq!(criteria.airlines, vec!["Delta".to_string()]);
    }

    #[test]
    fn test_default_criteria_fallback_price() {
        let criteria = FilterCriteria::default_for(&[]);
        assert_eq!(criteria.max_price, FALLBACK_MAX_PRICE);
        assert!(criteria.stops.is_empty());
        assert!(criteria.duration.is_none());
    }

    #[test]
    fn test_presets() {
        let cheapest = preset_by_id("cheapest").unwrap();
        let mut criteria = FilterCriteria::default_for(&[]);
        criteria.toggle_airline("Delta".to_string());
        criteria.apply_preset(cheapest);
        assert_eq!(criteria.stops, vec![1, 2]);
        assert_eq!(
            criteria.airlines,
            vec!["Delta".to_string()],
            "presets replace the stops dimension only"
        );
        assert!(preset_by_id("luxury").is_none());
    }
}
