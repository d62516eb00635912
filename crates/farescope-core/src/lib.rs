pub mod airports;
pub mod amadeus;
pub mod cache;
pub mod export;
pub mod flight_gen;
pub mod format;
pub mod search;
pub mod stats;

use std::path::PathBuf;

/// Platform data directory for persisted sessions and search history.
/// Falls back to the working directory when the platform dirs are
/// unavailable (e.g. stripped-down containers).
pub fn get_data_root() -> PathBuf {
    directories::ProjectDirs::from("org", "farescope", "FareScope")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Mints a result-set identifier like `mock_1755763200123`. The prefix
/// records which source produced the set.
pub fn new_search_id(source: &str) -> String {
    format!("{}_{}", source, chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_id_carries_source_prefix() {
        let id = new_search_id("mock");
        assert!(id.starts_with("mock_"));
        let millis: i64 = id["mock_".len()..].parse().unwrap();
        assert!(millis > 0);
    }

    #[test]
    fn test_data_root_is_not_empty() {
        let root = get_data_root();
        assert!(!root.as_os_str().is_empty());
    }
}
