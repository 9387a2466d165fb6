// ⚡ Cascade Controller - Enrollment reacts to athlete lifecycle edits
// The single place where "Inactive auto-suspends an Active enrollment, but
// Active never auto-restores" is enforced. Call sites report athlete
// lifecycle changes here instead of re-implementing the rule.
//
// Safety rule: reactivating a person must never silently reactivate
// billing/enrollment, so Inactive → Active produces no cascade at all.

use crate::entities::athlete::LifecycleStatus;
use crate::error::EnrollmentError;
use crate::record::{EnrollmentRecord, EnrollmentState};
use crate::store::EnrollmentHistoryStore;
use crate::transitions::validate_state_change;

/// Justification stamped on automatic suspension records.
pub const AUTO_SUSPEND_REASON: &str = "Suspensión automática — deportista marcado como Inactivo";

// ============================================================================
// CASCADE OUTCOME
// ============================================================================

/// What the cascade did, reported explicitly to the caller.
///
/// The athlete edit and the cascade must never be left inconsistent
/// silently: either the cascade applied, it had nothing to do, or the
/// caller receives the error and decides whether to roll the edit back.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeOutcome {
    /// A suspension record was appended
    Applied(EnrollmentRecord),

    /// No rule fires for this edit (idempotent re-marks land here too)
    NotApplicable,
}

impl CascadeOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, CascadeOutcome::Applied(_))
    }
}

// ============================================================================
// CASCADE CONTROLLER
// ============================================================================

/// Observes athlete lifecycle transitions and keeps enrollment consistent.
pub struct CascadeController;

impl CascadeController {
    /// React to an athlete lifecycle edit.
    ///
    /// - Active → Inactive with a currently Active enrollment: append one
    ///   automatic Suspended StateChange. Already Suspended or Expired:
    ///   nothing fires, so re-marking Inactive never double-suspends.
    /// - Inactive → Active: never cascades; the enrollment stays where it
    ///   is until the operator explicitly renews or changes state.
    ///
    /// Category edits are not handled here; renewal validation owns those.
    pub fn on_lifecycle_change(
        store: &EnrollmentHistoryStore,
        athlete_id: &str,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) -> Result<CascadeOutcome, EnrollmentError> {
        match (from, to) {
            (LifecycleStatus::Active, LifecycleStatus::Inactive) => {
                let current = store.current(athlete_id)?;

                if current.state != EnrollmentState::Active {
                    return Ok(CascadeOutcome::NotApplicable);
                }

                let draft =
                    validate_state_change(&current, EnrollmentState::Suspended, AUTO_SUSPEND_REASON)?;
                Ok(CascadeOutcome::Applied(store.append(athlete_id, draft)))
            }
            // Inactive → Active and no-op re-marks: hands off
            _ => Ok(CascadeOutcome::NotApplicable),
        }
    }

    /// Two-phase variant: build and stage the cascade record without
    /// committing, so the caller can get persistence confirmation first.
    ///
    /// Returns `None` when no cascade fires. The caller commits the staged
    /// record via `EnrollmentHistoryStore::commit` only after the save
    /// succeeds; on failure it simply drops the record and the history is
    /// unchanged from the last confirmed state.
    pub fn stage_lifecycle_change(
        store: &EnrollmentHistoryStore,
        athlete_id: &str,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        match (from, to) {
            (LifecycleStatus::Active, LifecycleStatus::Inactive) => {
                let current = store.current(athlete_id)?;

                if current.state != EnrollmentState::Active {
                    return Ok(None);
                }

                let draft =
                    validate_state_change(&current, EnrollmentState::Suspended, AUTO_SUSPEND_REASON)?;
                Ok(Some(store.stage(draft)))
            }
            _ => Ok(None),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
