//! CSV export of a result set.

use std::fs::File;
use std::io;
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::search::FlightRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

const HEADER: [&str; 11] = [
    "id",
    "airline",
    "flight_number",
    "origin",
    "destination",
    "departure",
    "arrival",
    "duration_minutes",
    "stops",
    "price",
    "currency",
];

/// Write flights as CSV to any writer, header first. An empty set still
/// produces the header row.
pub fn write_csv<W: io::Write>(writer: W, flights: &[FlightRecord]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for flight in flights {
        wtr.write_record(&[
            flight.id.as_str(),
            flight.airline.as_str(),
            flight.flight_number.as_str(),
            flight.origin.as_str(),
            flight.destination.as_str(),
            flight.departure.as_str(),
            flight.arrival.as_str(),
            &flight.duration_minutes.to_string(),
            &flight.stops.to_string(),
            &flight.price.to_string(),
            flight.currency.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export to a file path.
pub fn export_csv(path: &Path, flights: &[FlightRecord]) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(file, flights)?;
    info!(
        "Exported flights to CSV — path={} rows={}",
        path.display(),
        flights.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::make_test_flight;

    #[test]
    fn test_csv_layout() {
        let mut flight = make_test_flight("f1", 642.8, 1);
        flight.stop_locations = vec!["DOH".to_string()];

        let mut out = Vec::new();
        write_csv(&mut out, &[flight]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,airline,flight_number"));
        assert!(lines[1].contains("f1,Delta,DL1234,JFK,LAX"));
        assert!(lines[1].contains("642.8"));
    }

    #[test]
    fn test_empty_set_writes_header_only() {
        let mut out = Vec::new();
        write_csv(&mut out, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let mut flight = make_test_flight("f1", 100.0, 0);
        flight.airline = "Air France, KLM Group".to_string();

        let mut out = Vec::new();
        write_csv(&mut out, &[flight]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"Air France, KLM Group\""));
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.csv");
        export_csv(&path, &[make_test_flight("f1", 100.0, 0)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
