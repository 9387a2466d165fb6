// 🔀 Transition Validator - The enrollment state machine as pure functions
// Centralizes every rule about which enrollment transitions are legal.
// No UI, no store, no clock ownership: callers pass in the current record
// and get back either a validated RecordDraft or the specific rule that
// blocked them.
//
// State machine:
//   Active    → {Active, Suspended}
//   Suspended → {Suspended, Active}
//   Expired   → {Expired}   (terminal for manual edits; only Renewal escapes)

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::HashSet;

use crate::error::EnrollmentError;
use crate::record::{CategoryTier, EnrollmentRecord, EnrollmentState, RecordDraft, RecordType};

// ============================================================================
// TRANSITION RULE
// ============================================================================

/// Answer to "where can this state go, and does it need a justification?"
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRule {
    /// States reachable from the current one via a manual state change
    pub targets: HashSet<EnrollmentState>,

    /// True when moving to a target different from the current state
    /// requires a free-text reason
    pub reason_required: bool,
}

impl TransitionRule {
    pub fn allows(&self, target: EnrollmentState) -> bool {
        self.targets.contains(&target)
    }
}

/// Allowed manual transitions from `current`.
///
/// A same-state "transition" is always allowed and never needs a reason;
/// `reason_required` applies only when the target actually differs.
pub fn allowed_transitions(current: EnrollmentState) -> TransitionRule {
    let targets: HashSet<EnrollmentState> = match current {
        EnrollmentState::Active => {
            [EnrollmentState::Active, EnrollmentState::Suspended].into()
        }
        EnrollmentState::Suspended => {
            [EnrollmentState::Suspended, EnrollmentState::Active].into()
        }
        // The only way out of Expired is the distinct Renewal operation
        EnrollmentState::Expired => [EnrollmentState::Expired].into(),
    };

    TransitionRule {
        targets,
        reason_required: true,
    }
}

// ============================================================================
// STATE CHANGE VALIDATION
// ============================================================================

/// Validate a manual state change against the current record.
///
/// Returns a StateChange draft with `previous_state = current.state`.
/// A change to the *same* state is accepted as a redundant no-op append
/// (it still lands in the audit trail) and never requires a reason.
pub fn validate_state_change(
    current: &EnrollmentRecord,
    target: EnrollmentState,
    reason: &str,
) -> Result<RecordDraft, EnrollmentError> {
    let rule = allowed_transitions(current.state);

    if !rule.allows(target) {
        return Err(EnrollmentError::TransitionNotAllowed {
            from: current.state,
            to: target,
        });
    }

    let is_real_change = target != current.state;

    if is_real_change && rule.reason_required && reason.trim().is_empty() {
        return Err(EnrollmentError::ReasonRequired {
            from: current.state,
            to: target,
        });
    }

    Ok(RecordDraft {
        state: target,
        previous_state: Some(current.state),
        category: current.category,
        reason: if reason.trim().is_empty() {
            None
        } else {
            Some(reason.trim().to_string())
        },
        // Enrollment period start carries through a state change unchanged
        enrolled_at: current.enrolled_at,
        record_type: RecordType::StateChange,
    })
}

// ============================================================================
// RENEWAL VALIDATION
// ============================================================================

/// Validate a renewal against the current record and the athlete's tier.
///
/// Renewal is the only exit from Expired. The proposed category must hold
/// steady or advance in the tier hierarchy relative to the athlete's
/// current category, never regress.
pub fn validate_renewal(
    current: &EnrollmentRecord,
    athlete_category: CategoryTier,
    proposed_category: CategoryTier,
    enrolled_at: NaiveDate,
) -> Result<RecordDraft, EnrollmentError> {
    if current.state != EnrollmentState::Expired {
        return Err(EnrollmentError::InvalidTransition {
            current: current.state,
        });
    }

    if proposed_category < athlete_category {
        return Err(EnrollmentError::CategoryTierViolation {
            proposed: proposed_category,
            minimum: athlete_category,
        });
    }

    Ok(RecordDraft {
        state: EnrollmentState::Active,
        previous_state: Some(EnrollmentState::Expired),
        category: proposed_category,
        reason: None,
        // Renewal starts a fresh enrollment period
        enrolled_at,
        record_type: RecordType::Renewal,
    })
}

// ============================================================================
// EXPIRY QUERY
// ============================================================================

/// Pure query: is this record due for expiry at `now`?
///
/// An Active or Suspended enrollment lasts one year from `enrolled_at`.
/// The engine never applies this transition on its own; an external
/// scheduler (or a query-time projection) decides when and whether to act.
pub fn check_expiry(record: &EnrollmentRecord, now: DateTime<Utc>) -> bool {
    if record.state == EnrollmentState::Expired {
        return false;
    }

    let anniversary = record
        .enrolled_at
        .with_year(record.enrolled_at.year() + 1)
        // 29 Feb start rolls to 1 Mar in non-leap years
        .unwrap_or_else(|| {
            NaiveDate::from_ymd_opt(record.enrolled_at.year() + 1, 3, 1)
                .expect("1 March always exists")
        });

    now.date_naive() >= anniversary
}

// ============================================================================
// TESTS
// ============================================================================
