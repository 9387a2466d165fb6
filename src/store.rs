// 🗄️ Enrollment History Store - One append-only chain per athlete
// Owns the authoritative ordered record list for every athlete. The only
// mutating primitive is append; update-in-place and delete do not exist,
// so immutability of past records holds by construction.
//
// "Current" enrollment state is a pure derivation from the head of the
// chain. No other component retains its own copy of authority.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::EnrollmentError;
use crate::record::{CategoryTier, EnrollmentRecord, EnrollmentState, RecordDraft};

// ============================================================================
// ENROLLMENT HISTORY STORE
// ============================================================================

/// Per-athlete append-only enrollment histories, most-recent-first.
pub struct EnrollmentHistoryStore {
    /// athlete id → ordered records (head = current).
    /// Prepend-on-append keeps recorded_at descending; for equal timestamps
    /// the most recently appended record sits first, which is exactly the
    /// tie-break rule.
    histories: Arc<RwLock<HashMap<String, Vec<EnrollmentRecord>>>>,
}

impl EnrollmentHistoryStore {
    pub fn new() -> Self {
        EnrollmentHistoryStore {
            histories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Mint the one Initial record at athlete registration.
    ///
    /// Fails if the athlete already has a history: only one chain of
    /// records exists per athlete, and Initial happens exactly once.
    pub fn open_enrollment(
        &self,
        athlete_id: &str,
        category: CategoryTier,
    ) -> Result<EnrollmentRecord, EnrollmentError> {
        {
            let histories = self.histories.read().unwrap();
            if histories.contains_key(athlete_id) {
                return Err(EnrollmentError::AlreadyEnrolled {
                    athlete_id: athlete_id.to_string(),
                });
            }
        }

        let draft = RecordDraft::initial(category, Utc::now().date_naive());
        Ok(self.append(athlete_id, draft))
    }

    /// Finalize a draft without touching any history.
    ///
    /// Assigns the opaque id and `recorded_at = now`. Used by callers that
    /// must get persistence confirmation before committing (the staged
    /// record is simply dropped on failure, leaving the history at its
    /// last confirmed state).
    pub fn stage(&self, draft: RecordDraft) -> EnrollmentRecord {
        EnrollmentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            state: draft.state,
            previous_state: draft.previous_state,
            category: draft.category,
            reason: draft.reason,
            enrolled_at: draft.enrolled_at,
            recorded_at: Utc::now(),
            record_type: draft.record_type,
        }
    }

    /// Commit an already-staged record to the head of the athlete's chain.
    pub fn commit(&self, athlete_id: &str, record: EnrollmentRecord) {
        let mut histories = self.histories.write().unwrap();
        histories
            .entry(athlete_id.to_string())
            .or_default()
            .insert(0, record);
    }

    /// Finalize and append in one step (in-memory operation).
    ///
    /// Assigns id and recorded_at, prepends to the athlete's history and
    /// returns the finalized record.
    pub fn append(&self, athlete_id: &str, draft: RecordDraft) -> EnrollmentRecord {
        let record = self.stage(draft);
        self.commit(athlete_id, record.clone());
        record
    }

    /// Head of the athlete's history (the record with the latest
    /// recorded_at; ties go to the most recently appended).
    pub fn current(&self, athlete_id: &str) -> Result<EnrollmentRecord, EnrollmentError> {
        let histories = self.histories.read().unwrap();
        histories
            .get(athlete_id)
            .and_then(|records| records.first())
            .cloned()
            .ok_or_else(|| EnrollmentError::athlete_not_found(athlete_id))
    }

    /// Derived enrollment status: state of the current record.
    /// Never cached anywhere else.
    pub fn current_state(&self, athlete_id: &str) -> Result<EnrollmentState, EnrollmentError> {
        self.current(athlete_id).map(|record| record.state)
    }

    /// Full ordered history, recorded_at descending.
    ///
    /// The sort is stable, so records sharing a timestamp keep insertion
    /// recency order (most recently appended first). Unknown athletes get
    /// an empty sequence.
    pub fn history(&self, athlete_id: &str) -> Vec<EnrollmentRecord> {
        let histories = self.histories.read().unwrap();
        let mut records = histories.get(athlete_id).cloned().unwrap_or_default();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records
    }

    /// Replace an athlete's chain with records loaded from persistence.
    ///
    /// Hydration only: used when reading a saved athlete back in, never to
    /// rewrite live history.
    pub fn hydrate(&self, athlete_id: &str, mut records: Vec<EnrollmentRecord>) {
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        let mut histories = self.histories.write().unwrap();
        histories.insert(athlete_id.to_string(), records);
    }

    /// Number of records in the athlete's history.
    pub fn record_count(&self, athlete_id: &str) -> usize {
        let histories = self.histories.read().unwrap();
        histories.get(athlete_id).map_or(0, |records| records.len())
    }

    /// Whether the athlete has any history at all.
    pub fn has_history(&self, athlete_id: &str) -> bool {
        self.record_count(athlete_id) > 0
    }
}

impl Default for EnrollmentHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;
    use crate::transitions::validate_state_change;

    fn store_with_initial(athlete_id: &str) -> EnrollmentHistoryStore {
        let store = EnrollmentHistoryStore::new();
        store
            .open_enrollment(athlete_id, CategoryTier::Infantil)
            .unwrap();
        store
    }

    #[test]
    fn test_open_enrollment_creates_initial_record() {
        let store = EnrollmentHistoryStore::new();
        let record = store
            .open_enrollment("ath-1", CategoryTier::Infantil)
            .unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.state, EnrollmentState::Active);
        assert_eq!(record.record_type, RecordType::Initial);
        assert_eq!(record.previous_state, None);
        assert_eq!(store.record_count("ath-1"), 1);
    }

    #[test]
    fn test_open_enrollment_happens_exactly_once() {
        let store = store_with_initial("ath-1");

        let second = store.open_enrollment("ath-1", CategoryTier::Sub15);
        assert!(second.is_err());
        assert_eq!(store.record_count("ath-1"), 1);
    }

    #[test]
    fn test_current_is_head_of_history() {
        let store = store_with_initial("ath-1");
        let initial = store.current("ath-1").unwrap();

        let draft =
            validate_state_change(&initial, EnrollmentState::Suspended, "Viaje familiar")
                .unwrap();
        let appended = store.append("ath-1", draft);

        let current = store.current("ath-1").unwrap();
        assert_eq!(current.id, appended.id);
        assert_eq!(current.state, EnrollmentState::Suspended);
        assert_eq!(
            store.current_state("ath-1").unwrap(),
            EnrollmentState::Suspended
        );
    }

    #[test]
    fn test_current_matches_max_recorded_at() {
        let store = store_with_initial("ath-1");
        let initial = store.current("ath-1").unwrap();

        let draft =
            validate_state_change(&initial, EnrollmentState::Suspended, "Suspensión").unwrap();
        store.append("ath-1", draft);

        let history = store.history("ath-1");
        let max = history
            .iter()
            .max_by_key(|record| record.recorded_at)
            .unwrap();

        // Appends within the same instant resolve to the most recent append,
        // which history() puts first
        let current = store.current("ath-1").unwrap();
        assert_eq!(current.recorded_at, max.recorded_at);
        assert_eq!(history[0].id, current.id);
    }

    #[test]
    fn test_history_is_recorded_at_descending() {
        let store = store_with_initial("ath-1");

        for reason in ["Primera suspensión", "Reactivación"] {
            let current = store.current("ath-1").unwrap();
            let target = match current.state {
                EnrollmentState::Active => EnrollmentState::Suspended,
                _ => EnrollmentState::Active,
            };
            let draft = validate_state_change(&current, target, reason).unwrap();
            store.append("ath-1", draft);
        }

        let history = store.history("ath-1");
        assert_eq!(history.len(), 3);
        for pair in history.windows(2) {
            assert!(pair[0].recorded_at >= pair[1].recorded_at);
        }
        assert_eq!(history[2].record_type, RecordType::Initial);
    }

    #[test]
    fn test_records_are_never_mutated() {
        let store = store_with_initial("ath-1");
        let initial = store.current("ath-1").unwrap();
        let fingerprint_before = initial.fingerprint();

        let draft =
            validate_state_change(&initial, EnrollmentState::Suspended, "Suspensión").unwrap();
        store.append("ath-1", draft);

        // Re-read the initial record by id; every field must be identical
        let history = store.history("ath-1");
        let reread = history.iter().find(|r| r.id == initial.id).unwrap();

        assert_eq!(reread, &initial);
        assert_eq!(reread.fingerprint(), fingerprint_before);
    }

    #[test]
    fn test_stage_does_not_mutate_history() {
        let store = store_with_initial("ath-1");
        let initial = store.current("ath-1").unwrap();

        let draft =
            validate_state_change(&initial, EnrollmentState::Suspended, "Suspensión").unwrap();
        let staged = store.stage(draft);

        // Staged but not committed: history unchanged
        assert_eq!(store.record_count("ath-1"), 1);
        assert_eq!(
            store.current_state("ath-1").unwrap(),
            EnrollmentState::Active
        );

        store.commit("ath-1", staged.clone());
        assert_eq!(store.record_count("ath-1"), 2);
        assert_eq!(store.current("ath-1").unwrap().id, staged.id);
    }

    #[test]
    fn test_unknown_athlete() {
        let store = EnrollmentHistoryStore::new();

        assert_eq!(
            store.current("ghost"),
            Err(EnrollmentError::athlete_not_found("ghost"))
        );
        assert!(store.history("ghost").is_empty());
        assert!(!store.has_history("ghost"));
    }

    #[test]
    fn test_hydrate_restores_ordering() {
        let store = store_with_initial("ath-1");
        let initial = store.current("ath-1").unwrap();
        let draft =
            validate_state_change(&initial, EnrollmentState::Suspended, "Suspensión").unwrap();
        store.append("ath-1", draft);

        // Persist-shaped round trip: hand the records back oldest-first
        let mut records = store.history("ath-1");
        records.reverse();

        let fresh = EnrollmentHistoryStore::new();
        fresh.hydrate("ath-1", records);

        assert_eq!(fresh.record_count("ath-1"), 2);
        assert_eq!(
            fresh.current_state("ath-1").unwrap(),
            EnrollmentState::Suspended
        );
    }
}
