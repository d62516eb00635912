//! Regression coverage for state persistence across process restarts.
//!
//! The store must round-trip an active session byte-faithfully, shrug off
//! corruption, and keep the history archive bounded.

#[cfg(test)]
mod tests {
    use farescope_core::cache::{SessionStore, DEFAULT_HISTORY_KEEP};
    use farescope_core::flight_gen::generate_search_results;
    use farescope_core::search::filters::TimeSlot;
    use farescope_core::search::sorter::{SortField, SortOrder, SortSpec};
    use farescope_core::search::{SearchQuery, SearchSession, TripType, UpdateOp};

    fn make_query(origin: &str, destination: &str) -> SearchQuery {
        let departure = chrono::Local::now().date_naive() + chrono::Duration::days(45);
        SearchQuery {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: departure.format("%Y-%m-%d").to_string(),
            return_date: None,
            passengers: 1,
            cabin_class: "economy".to_string(),
            trip_type: TripType::OneWay,
        }
    }

    #[test]
    fn test_full_session_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();

        // First run: search, filter, sort, save.
        let filtered_before;
        {
            let store = SessionStore::new(dir.path().to_path_buf());
            let mut session = SearchSession::new();
            session.install_results(generate_search_results(&make_query("JFK", "LHR")));
            session.apply(UpdateOp::ToggleStop(0));
            session.apply(UpdateOp::ToggleDepartureSlot(TimeSlot::Morning));
            session.set_sort(SortSpec {
                field: SortField::Duration,
                order: SortOrder::Asc,
            });
            filtered_before = session.filtered();
            store.save_session(&session).unwrap();
        }

        // Second run: everything comes back and recomputes identically.
        let store = SessionStore::new(dir.path().to_path_buf());
        let session = store.load_session();
        assert_eq!(session.flights().len(), 56);
        assert_eq!(session.criteria().stops, vec![0]);
        assert_eq!(session.criteria().departure_slots, vec![TimeSlot::Morning]);
        assert_eq!(session.sort().field, SortField::Duration);
        assert_eq!(session.filtered(), filtered_before);
    }

    #[test]
    fn test_corrupt_session_recovers_and_can_be_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        std::fs::write(dir.path().join("session.json"), "��� definitely not json").unwrap();
        let mut session = store.load_session();
        assert!(session.flights().is_empty());

        session.install_results(generate_search_results(&make_query("BOS", "SFO")));
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session().flights().len(), 56);
    }

    #[test]
    fn test_history_stays_bounded_at_the_default_keep() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        for i in 0..(DEFAULT_HISTORY_KEEP + 4) {
            let mut results = generate_search_results(&make_query("JFK", "LAX"));
            // Distinct ids and strictly increasing timestamps so the
            // newest-first order is unambiguous.
            results.search_id = format!("mock_{:03}", i);
            results.timestamp = format!("2026-07-{:02}T12:00:00+00:00", i + 1);
            store.archive_results(&results).unwrap();
        }

        assert_eq!(store.list_history().len(), DEFAULT_HISTORY_KEEP + 4);
        let removed = store.prune_history(DEFAULT_HISTORY_KEEP).unwrap();
        assert_eq!(removed, 4);

        let remaining = store.list_history();
        assert_eq!(remaining.len(), DEFAULT_HISTORY_KEEP);
        // The newest entries are the ones that survive.
        assert_eq!(remaining[0].search_id, "mock_013");
        assert_eq!(
            remaining[DEFAULT_HISTORY_KEEP - 1].search_id,
            "mock_004"
        );
    }

    #[test]
    fn test_saving_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = SessionStore::new(nested.clone());

        let mut session = SearchSession::new();
        session.install_results(generate_search_results(&make_query("SEA", "MIA")));
        store.save_session(&session).unwrap();
        assert!(nested.join("session.json").exists());
    }
}
