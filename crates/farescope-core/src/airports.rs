//! Embedded airport and airline directories plus input-syntax validators.

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportInfo {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineInfo {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub alliance: Option<String>,
}

pub fn get_all_airports() -> Vec<AirportInfo> {
    serde_json::from_str(include_str!("airports.json")).expect("Failed to parse airports.json")
}

pub fn get_all_airlines() -> Vec<AirlineInfo> {
    serde_json::from_str(include_str!("airlines.json")).expect("Failed to parse airlines.json")
}

pub fn airport_by_code(code: &str) -> Option<AirportInfo> {
    let wanted = code.trim().to_uppercase();
    get_all_airports().into_iter().find(|a| a.code == wanted)
}

pub fn airline_by_code(code: &str) -> Option<AirlineInfo> {
    let wanted = code.trim().to_uppercase();
    get_all_airlines().into_iter().find(|a| a.code == wanted)
}

/// IATA airport codes are exactly three letters. Lowercase input is
/// accepted and uppercased before the check.
pub fn is_valid_airport_code(code: &str) -> bool {
    let re = Regex::new(r"^[A-Z]{3}$").unwrap();
    re.is_match(&code.trim().to_uppercase())
}

pub fn is_valid_airline_code(code: &str) -> bool {
    let re = Regex::new(r"^[A-Z]{2}$").unwrap();
    re.is_match(&code.trim().to_uppercase())
}

pub fn is_valid_flight_number(flight_number: &str) -> bool {
    let re = Regex::new(r"^[A-Z]{2}\d{1,4}[A-Z]?$").unwrap();
    re.is_match(&flight_number.trim().to_uppercase())
}

/// Wall-clock `HH:MM`, 24-hour. Single-digit hours are allowed ("7:05").
pub fn is_valid_time_string(time: &str) -> bool {
    let re = Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").unwrap();
    re.is_match(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_loading() {
        let airports = get_all_airports();
        assert!(!airports.is_empty(), "Airport list should not be empty");

        // specific checks
        let jfk = airports
            .iter()
            .find(|a| a.code == "JFK")
            .expect("JFK missing");
        assert_eq!(jfk.city, "New York");

        let lhr = airports
            .iter()
            .find(|a| a.code == "LHR")
            .expect("Heathrow missing");
        assert_eq!(lhr.country, "UK");

        let unk = airports.iter().find(|a| a.code == "ZZZ");
        assert!(unk.is_none());

        let airlines = get_all_airlines();
        assert_eq!(airlines.len(), 12);
        let qr = airlines
            .iter()
            .find(|a| a.code == "QR")
            .expect("Qatar Airways missing");
        assert_eq!(qr.alliance.as_deref(), Some("Oneworld"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(airport_by_code("jfk").unwrap().code, "JFK");
        assert_eq!(airline_by_code(" ek ").unwrap().name, "Emirates");
        assert!(airport_by_code("XXX").is_none());
    }

    #[test]
    fn test_airport_code_validation() {
        assert!(is_valid_airport_code("JFK"));
        assert!(is_valid_airport_code("lax"));
        assert!(!is_valid_airport_code(""));
        assert!(!is_valid_airport_code("JF"));
        assert!(!is_valid_airport_code("JFKX"));
        assert!(!is_valid_airport_code("J1K"));
    }

    #[test]
    fn test_flight_number_validation() {
        assert!(is_valid_flight_number("QR3412"));
        assert!(is_valid_flight_number("BA1"));
        assert!(is_valid_flight_number("ua9999a"));
        assert!(!is_valid_flight_number("Q3412"));
        assert!(!is_valid_flight_number("QRX412"));
        assert!(!is_valid_flight_number("QR34125"));
    }

    #[test]
    fn test_time_string_validation() {
        assert!(is_valid_time_string("07:05"));
        assert!(is_valid_time_string("7:05"));
        assert!(is_valid_time_string("23:59"));
        assert!(!is_valid_time_string("24:00"));
        assert!(!is_valid_time_string("12:60"));
        assert!(!is_valid_time_string("noonish"));
        assert!(!is_valid_time_string(""));
    }
}
