//! Summary statistics over a result set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::search::filters::TimeSlot;
use crate::search::FlightRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub min: u32,
    pub max: u32,
    pub avg: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineCount {
    pub airline: String,
    pub count: usize,
}

/// Everything the stats view needs, computed in one pass over the set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightStatistics {
    pub total_flights: usize,
    pub by_airline: BTreeMap<String, usize>,
    pub by_stops: BTreeMap<u32, usize>,
    pub price_stats: PriceStats,
    pub duration_stats: DurationStats,
    pub popular_airlines: Vec<AirlineCount>,
    pub best_time_to_fly: Option<TimeSlot>,
}

/// Airlines in first-occurrence order, deduplicated.
pub fn unique_airlines(flights: &[FlightRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for flight in flights {
        if !seen.contains(&flight.airline) {
            seen.push(flight.airline.clone());
        }
    }
    seen
}

/// Midpoint of a sorted sample: the middle value for odd counts, the mean
/// of the two middles for even counts.
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Departure slot with the lowest average price. Flights whose departure
/// clock does not parse are left out; ties resolve to the earlier entry
/// in the canonical slot order.
fn best_time_to_fly(flights: &[FlightRecord]) -> Option<TimeSlot> {
    let mut best: Option<(TimeSlot, f64)> = None;
    for slot in TimeSlot::all() {
        let prices: Vec<f64> = flights
            .iter()
            .filter(|f| TimeSlot::from_clock(&f.departure) == Some(slot))
            .map(|f| f.price)
            .collect();
        if prices.is_empty() {
            continue;
        }
        let avg = prices.iter().sum::<f64>() / prices.len() as f64;
        match best {
            Some((_, current)) if avg >= current => {}
            _ => best = Some((slot, avg)),
        }
    }
    best.map(|(slot, _)| slot)
}

/// Compute the full statistics block. An empty set has no statistics.
pub fn compute_statistics(flights: &[FlightRecord]) -> Option<FlightStatistics> {
    if flights.is_empty() {
        return None;
    }

    let mut by_airline: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_stops: BTreeMap<u32, usize> = BTreeMap::new();
    for flight in flights {
        *by_airline.entry(flight.airline.clone()).or_insert(0) += 1;
        *by_stops.entry(flight.stops).or_insert(0) += 1;
    }

    let mut prices: Vec<f64> = flights.iter().map(|f| f.price).collect();
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let price_stats = PriceStats {
        min: prices[0],
        max: prices[prices.len() - 1],
        avg: (prices.iter().sum::<f64>() / prices.len() as f64).round(),
        median: median(&prices),
    };

    let durations: Vec<u32> = flights.iter().map(|f| f.duration_minutes).collect();
    let duration_stats = DurationStats {
        min: *durations.iter().min().unwrap_or(&0),
        max: *durations.iter().max().unwrap_or(&0),
        avg: (durations.iter().map(|d| *d as f64).sum::<f64>() / durations.len() as f64).round()
            as u32,
    };

    // Most-seen airlines first; equal counts fall back to name order so
    // the ranking is deterministic.
    let mut popular: Vec<AirlineCount> = by_airline
        .iter()
        .map(|(airline, count)| AirlineCount {
            airline: airline.clone(),
            count: *count,
        })
        .collect();
    popular.sort_by(|a, b| b.count.cmp(&a.count).then(a.airline.cmp(&b.airline)));
    popular.truncate(3);

    Some(FlightStatistics {
        total_flights: flights.len(),
        by_airline,
        by_stops,
        price_stats,
        duration_stats,
        popular_airlines: popular,
        best_time_to_fly: best_time_to_fly(flights),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::make_test_flight;

    #[test]
    fn test_empty_set_has_no_statistics() {
        assert!(compute_statistics(&[]).is_none());
    }

    #[test]
    fn test_price_and_duration_stats() {
        let mut flights = vec![
            make_test_flight("a", 100.0, 0),
            make_test_flight("b", 200.0, 1),
            make_test_flight("c", 450.0, 1),
            make_test_flight("d", 250.0, 2),
        ];
        flights[0].duration_minutes = 120;
        flights[1].duration_minutes = 240;
        flights[2].duration_minutes = 240;
        flights[3].duration_minutes = 400;

        let stats = compute_statistics(&flights).unwrap();
        assert_eq!(stats.total_flights, 4);
        assert_eq!(stats.price_stats.min, 100.0);
        assert_eq!(stats.price_stats.max, 450.0);
        assert_eq!(stats.price_stats.avg, 250.0);
        // Even count: mean of the two middles, 200 and 250.
        assert_eq!(stats.price_stats.median, 225.0);
        assert_eq!(stats.duration_stats.min, 120);
        assert_eq!(stats.duration_stats.max, 400);
        assert_eq!(stats.duration_stats.avg, 250);
        assert_eq!(stats.by_stops.get(&1), Some(&2));
    }

    #[test]
    fn test_odd_count_median_is_middle_value() {
        let flights = vec![
            make_test_flight("a", 900.0, 0),
            make_test_flight("b", 100.0, 0),
            make_test_flight("c", 300.0, 0),
        ];
        let stats = compute_statistics(&flights).unwrap();
        assert_eq!(stats.price_stats.median, 300.0);
    }

    #[test]
    fn test_popular_airlines_top_three_with_name_tiebreak() {
        let mut flights: Vec<_> = (0..7)
            .map(|i| make_test_flight(&format!("f{}", i), 100.0, 0))
            .collect();
        flights[0].airline = "United".to_string();
        flights[1].airline = "United".to_string();
        flights[2].airline = "United".to_string();
        flights[3].airline = "Emirates".to_string();
        flights[4].airline = "Delta".to_string();
        flights[5].airline = "Delta".to_string();
        flights[6].airline = "American Airlines".to_string();

        let stats = compute_statistics(&flights).unwrap();
        let ranked: Vec<(&str, usize)> = stats
            .popular_airlines
            .iter()
            .map(|a| (a.airline.as_str(), a.count))
            .collect();
        // Emirates and American tie at 1; the name decides, and only
        // three entries survive.
        assert_eq!(
            ranked,
            vec![("United", 3), ("Delta", 2), ("American Airlines", 1)]
        );
    }

    #[test]
    fn test_best_time_to_fly_picks_cheapest_slot() {
        let mut morning = make_test_flight("m", 400.0, 0);
        morning.departure = "08:00".to_string();
        let mut evening_cheap = make_test_flight("e1", 120.0, 0);
        evening_cheap.departure = "19:00".to_string();
        let mut evening_dear = make_test_flight("e2", 180.0, 0);
        evening_dear.departure = "21:30".to_string();
        let mut broken = make_test_flight("x", 1.0, 0);
        broken.departure = "??".to_string();

        let stats =
            compute_statistics(&[morning, evening_cheap, evening_dear, broken]).unwrap();
        assert_eq!(stats.best_time_to_fly, Some(TimeSlot::Evening));
    }

    #[test]
    fn test_unique_airlines_keeps_first_occurrence_order() {
        let mut flights: Vec<_> = (0..4)
            .map(|i| make_test_flight(&format!("f{}", i), 100.0, 0))
            .collect();
        flights[0].airline = "Emirates".to_string();
        flights[1].airline = "Delta".to_string();
        flights[2].airline = "Emirates".to_string();
        flights[3].airline = "American Airlines".to_string();

        assert_eq!(
            unique_airlines(&flights),
            vec![
                "Emirates".to_string(),
                "Delta".to_string(),
                "American Airlines".to_string()
            ]
        );
    }
}
