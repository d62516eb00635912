//! Price aggregation by stop count for comparison charts.

use serde::{Deserialize, Serialize};

use crate::search::FlightRecord;

/// One bar of the price-by-stops comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBucket {
    pub stops_label: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub count: usize,
}

/// Bucket label for a stop count. Everything beyond one stop merges into
/// a single tail category.
pub fn stops_label(stops: u32) -> &'static str {
    match stops {
        0 => "Non-stop",
        1 => "1 Stop",
        _ => "2+ Stops",
    }
}

/// Display order of the buckets, fewest stops first.
const BUCKET_ORDER: [&str; 3] = ["Non-stop", "1 Stop", "2+ Stops"];

/// Aggregate prices per stop bucket. Buckets with no flights are omitted
/// rather than reported as zeros; present buckets always come out in
/// `BUCKET_ORDER`, independent of input order. The average is rounded to
/// a whole amount, min and max stay exact.
pub fn aggregate_by_stops(flights: &[FlightRecord]) -> Vec<ChartBucket> {
    struct Accumulator {
        sum: f64,
        min: f64,
        max: f64,
        count: usize,
    }

    let mut buckets: Vec<(&str, Accumulator)> = BUCKET_ORDER
        .iter()
        .map(|label| {
            (
                *label,
                Accumulator {
                    sum: 0.0,
                    min: f64::MAX,
                    max: f64::MIN,
                    count: 0,
                },
            )
        })
        .collect();

    for flight in flights {
        let label = stops_label(flight.stops);
        for (name, acc) in buckets.iter_mut() {
            if *name == label {
                acc.sum += flight.price;
                acc.min = acc.min.min(flight.price);
                acc.max = acc.max.max(flight.price);
                acc.count += 1;
            }
        }
    }

    buckets
        .into_iter()
        .filter(|(_, acc)| acc.count > 0)
        .map(|(label, acc)| ChartBucket {
            stops_label: label.to_string(),
            avg_price: (acc.sum / acc.count as f64).round(),
            min_price: acc.min,
            max_price: acc.max,
            count: acc.count,
        })
        .collect()
}
