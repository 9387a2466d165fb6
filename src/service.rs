// 🎛️ Enrollment Service - Operator-facing operation pipeline
// Wires validator + store + cascade + persistence + notifications into the
// operations the dashboard calls. Every mutation follows the same shape:
//
//   confirm gate → validate → stage → persist (full athlete replace)
//     → commit to store → audit event → notify
//
// A mutation is not committed to the in-memory store until the
// persistence collaborator confirms the save. On failure the staged
// record is dropped and the history stays at its last confirmed state;
// the operator sees the specific rule or failure that blocked them.

use rusqlite::Connection;

use crate::cascade::CascadeController;
use crate::db::{self, AuditEvent};
use crate::entities::athlete::{Athlete, LifecycleStatus};
use crate::entities::guardian::Guardian;
use crate::error::EnrollmentError;
use crate::notify::Notifier;
use crate::record::{CategoryTier, EnrollmentRecord, EnrollmentState, RecordDraft};
use crate::store::EnrollmentHistoryStore;
use crate::transitions::{validate_renewal, validate_state_change};

/// Actor stamped on audit events for operator-driven mutations.
const OPERATOR: &str = "operator";

// ============================================================================
// PERSISTENCE GATEWAY
// ============================================================================

/// Seam to the external persistence collaborator (full read/replace only).
pub trait PersistenceGateway {
    fn save_athlete(
        &self,
        athlete: &Athlete,
        history: &[EnrollmentRecord],
    ) -> anyhow::Result<()>;

    fn load_athlete(&self, id: &str) -> anyhow::Result<Option<(Athlete, Vec<EnrollmentRecord>)>>;

    fn find_guardian(&self, id: &str) -> anyhow::Result<Option<Guardian>>;

    fn record_event(&self, event: &AuditEvent) -> anyhow::Result<()>;
}

/// SQLite-backed gateway over the db module.
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    pub fn new(conn: Connection) -> Self {
        SqliteGateway { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl PersistenceGateway for SqliteGateway {
    fn save_athlete(
        &self,
        athlete: &Athlete,
        history: &[EnrollmentRecord],
    ) -> anyhow::Result<()> {
        db::save_athlete(&self.conn, athlete, history)
    }

    fn load_athlete(&self, id: &str) -> anyhow::Result<Option<(Athlete, Vec<EnrollmentRecord>)>> {
        db::load_athlete(&self.conn, id)
    }

    fn find_guardian(&self, id: &str) -> anyhow::Result<Option<Guardian>> {
        db::find_guardian_by_id(&self.conn, id)
    }

    fn record_event(&self, event: &AuditEvent) -> anyhow::Result<()> {
        db::insert_event(&self.conn, event)
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// Result of a confirm-gated enrollment mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceOutcome {
    /// The record was appended and persisted
    Applied(EnrollmentRecord),

    /// Operator declined the confirmation gate; nothing was touched
    Cancelled,
}

/// Result of an athlete lifecycle edit.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleOutcome {
    /// Athlete saved; `cascade` holds the auto-suspension record if one fired
    Updated { cascade: Option<EnrollmentRecord> },

    /// Operator declined the confirmation gate; nothing was touched
    Cancelled,
}

// ============================================================================
// ENROLLMENT SERVICE
// ============================================================================

pub struct EnrollmentService<P: PersistenceGateway, N: Notifier> {
    store: EnrollmentHistoryStore,
    gateway: P,
    notifier: N,
}

impl<P: PersistenceGateway, N: Notifier> EnrollmentService<P, N> {
    pub fn new(gateway: P, notifier: N) -> Self {
        EnrollmentService {
            store: EnrollmentHistoryStore::new(),
            gateway,
            notifier,
        }
    }

    pub fn store(&self) -> &EnrollmentHistoryStore {
        &self.store
    }

    pub fn gateway(&self) -> &P {
        &self.gateway
    }

    /// Load an athlete through the gateway and hydrate its history into
    /// the store, so derivations run against the confirmed state.
    fn load(&self, athlete_id: &str) -> Result<Athlete, EnrollmentError> {
        let (athlete, history) = self
            .gateway
            .load_athlete(athlete_id)
            .map_err(EnrollmentError::persistence)?
            .ok_or_else(|| EnrollmentError::athlete_not_found(athlete_id))?;

        self.store.hydrate(athlete_id, history);
        Ok(athlete)
    }

    fn report(&self, error: EnrollmentError) -> EnrollmentError {
        self.notifier
            .notify_error("Operación rechazada", &error.to_string());
        error
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a new athlete with its one Initial enrollment record.
    ///
    /// A guardian reference, when present, must exist in the directory
    /// before the save commits.
    pub fn register_athlete(
        &self,
        name: &str,
        category: CategoryTier,
        guardian_id: Option<&str>,
    ) -> Result<Athlete, EnrollmentError> {
        if let Some(gid) = guardian_id {
            let found = self
                .gateway
                .find_guardian(gid)
                .map_err(EnrollmentError::persistence)?;
            if found.is_none() {
                return Err(self.report(EnrollmentError::guardian_not_found(gid)));
            }
        }

        let athlete = Athlete::new(
            name.to_string(),
            category,
            guardian_id.map(str::to_string),
        );

        if self.store.has_history(&athlete.id) {
            return Err(self.report(EnrollmentError::AlreadyEnrolled {
                athlete_id: athlete.id.clone(),
            }));
        }

        let draft = RecordDraft::initial(category, chrono::Utc::now().date_naive());
        let staged = self.store.stage(draft);

        self.gateway
            .save_athlete(&athlete, &[staged.clone()])
            .map_err(|e| self.report(EnrollmentError::persistence(e)))?;

        self.store.commit(&athlete.id, staged.clone());

        let _ = self.gateway.record_event(&AuditEvent::new(
            "enrollment_opened",
            "athlete",
            &athlete.id,
            serde_json::json!({
                "category": category.as_str(),
                "record_id": staged.id,
            }),
            OPERATOR,
        ));

        self.notifier.notify_success(
            "Deportista registrado",
            &format!("{} ({})", athlete.name, category),
        );

        Ok(athlete)
    }

    // ------------------------------------------------------------------
    // Manual state change
    // ------------------------------------------------------------------

    /// Operator-driven enrollment state change with mandatory
    /// justification for real transitions.
    pub fn change_state(
        &self,
        athlete_id: &str,
        target: EnrollmentState,
        reason: &str,
    ) -> Result<ServiceOutcome, EnrollmentError> {
        let athlete = self.load(athlete_id)?;
        let current = self.store.current(athlete_id)?;

        // Validate before asking: a blocked operation should name its rule
        // without bothering the operator with a dialog first
        let draft = validate_state_change(&current, target, reason)
            .map_err(|e| self.report(e))?;

        let confirmed = self.notifier.confirm(
            "Confirmar cambio de estado",
            &format!(
                "{}: {} → {}",
                athlete.name,
                current.state.display_label(),
                target.display_label()
            ),
        );
        if !confirmed {
            return Ok(ServiceOutcome::Cancelled);
        }

        let staged = self.store.stage(draft);
        let mut new_history = vec![staged.clone()];
        new_history.extend(self.store.history(athlete_id));

        self.gateway
            .save_athlete(&athlete, &new_history)
            .map_err(|e| self.report(EnrollmentError::persistence(e)))?;

        self.store.commit(athlete_id, staged.clone());

        let _ = self.gateway.record_event(&AuditEvent::new(
            "state_changed",
            "athlete",
            athlete_id,
            serde_json::json!({
                "from": current.state.as_str(),
                "to": target.as_str(),
                "reason": staged.reason,
                "record_id": staged.id,
            }),
            OPERATOR,
        ));

        self.notifier.notify_success(
            "Estado actualizado",
            &format!("{} ahora está {}", athlete.name, target.display_label()),
        );

        Ok(ServiceOutcome::Applied(staged))
    }

    // ------------------------------------------------------------------
    // Renewal
    // ------------------------------------------------------------------

    /// Renew an Expired enrollment into a new Active period. The athlete's
    /// category follows the renewed one (hold or advance, never regress).
    pub fn renew(
        &self,
        athlete_id: &str,
        proposed_category: CategoryTier,
    ) -> Result<ServiceOutcome, EnrollmentError> {
        let mut athlete = self.load(athlete_id)?;
        let current = self.store.current(athlete_id)?;

        let draft = validate_renewal(
            &current,
            athlete.category,
            proposed_category,
            chrono::Utc::now().date_naive(),
        )
        .map_err(|e| self.report(e))?;

        let confirmed = self.notifier.confirm(
            "Confirmar renovación",
            &format!("{} en categoría {}", athlete.name, proposed_category),
        );
        if !confirmed {
            return Ok(ServiceOutcome::Cancelled);
        }

        let staged = self.store.stage(draft);
        let mut new_history = vec![staged.clone()];
        new_history.extend(self.store.history(athlete_id));

        athlete.category = proposed_category;

        self.gateway
            .save_athlete(&athlete, &new_history)
            .map_err(|e| self.report(EnrollmentError::persistence(e)))?;

        self.store.commit(athlete_id, staged.clone());

        let _ = self.gateway.record_event(&AuditEvent::new(
            "renewed",
            "athlete",
            athlete_id,
            serde_json::json!({
                "category": proposed_category.as_str(),
                "record_id": staged.id,
            }),
            OPERATOR,
        ));

        self.notifier.notify_success(
            "Inscripción renovada",
            &format!("{} ({})", athlete.name, proposed_category),
        );

        Ok(ServiceOutcome::Applied(staged))
    }

    // ------------------------------------------------------------------
    // Lifecycle edit with cascade
    // ------------------------------------------------------------------

    /// Change the athlete's Active/Inactive status and run the cascade.
    ///
    /// Both the athlete edit and any cascade record go through one save:
    /// either both commit or neither does, so the two are never left
    /// inconsistent silently.
    pub fn set_lifecycle_status(
        &self,
        athlete_id: &str,
        new_status: LifecycleStatus,
    ) -> Result<LifecycleOutcome, EnrollmentError> {
        let mut athlete = self.load(athlete_id)?;
        let old_status = athlete.lifecycle_status;

        if old_status == new_status {
            return Ok(LifecycleOutcome::Updated { cascade: None });
        }

        let staged_cascade = CascadeController::stage_lifecycle_change(
            &self.store,
            athlete_id,
            old_status,
            new_status,
        )
        .map_err(|e| self.report(e))?;

        if staged_cascade.is_some() {
            // Auto-suspension is the irreversible part; gate on it
            let confirmed = self.notifier.confirm(
                "Confirmar cambio de estado del deportista",
                &format!(
                    "{} pasará a {} y su inscripción será suspendida automáticamente",
                    athlete.name,
                    new_status.display_label()
                ),
            );
            if !confirmed {
                return Ok(LifecycleOutcome::Cancelled);
            }
        }

        athlete.lifecycle_status = new_status;

        let mut new_history: Vec<EnrollmentRecord> = Vec::new();
        if let Some(record) = &staged_cascade {
            new_history.push(record.clone());
        }
        new_history.extend(self.store.history(athlete_id));

        self.gateway
            .save_athlete(&athlete, &new_history)
            .map_err(|e| self.report(EnrollmentError::persistence(e)))?;

        if let Some(record) = &staged_cascade {
            self.store.commit(athlete_id, record.clone());
        }

        let _ = self.gateway.record_event(&AuditEvent::new(
            "lifecycle_changed",
            "athlete",
            athlete_id,
            serde_json::json!({
                "from": old_status.as_str(),
                "to": new_status.as_str(),
                "cascade_record_id": staged_cascade.as_ref().map(|r| r.id.clone()),
            }),
            OPERATOR,
        ));

        self.notifier.notify_success(
            "Deportista actualizado",
            &format!("{} ahora está {}", athlete.name, new_status.display_label()),
        );

        Ok(LifecycleOutcome::Updated {
            cascade: staged_cascade,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Ordered history for the audit review screen.
    pub fn history(&self, athlete_id: &str) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        self.load(athlete_id)?;
        Ok(self.store.history(athlete_id))
    }

    /// Derived enrollment status for display.
    pub fn enrollment_status(
        &self,
        athlete_id: &str,
    ) -> Result<EnrollmentState, EnrollmentError> {
        self.load(athlete_id)?;
        self.store.current_state(athlete_id)
    }
}

// ============================================================================
// TESTS
// ============================================================================
