// 🚫 Error Taxonomy - Every rejected operation names the rule that blocked it
// Validator errors are surfaced to the operator before any mutation is
// attempted; they never reach the store.

use crate::record::{CategoryTier, EnrollmentState};

#[derive(Debug, Clone, PartialEq)]
pub enum EnrollmentError {
    /// Renewal attempted while the current record is not Expired
    InvalidTransition { current: EnrollmentState },

    /// Renewal proposed a category below the athlete's current tier
    CategoryTierViolation {
        proposed: CategoryTier,
        minimum: CategoryTier,
    },

    /// State-change target is not reachable from the current state
    TransitionNotAllowed {
        from: EnrollmentState,
        to: EnrollmentState,
    },

    /// Justification missing for a real (state-altering) transition
    ReasonRequired {
        from: EnrollmentState,
        to: EnrollmentState,
    },

    /// Athlete or guardian reference does not exist
    NotFound { entity: &'static str, id: String },

    /// Initial enrollment happens exactly once per athlete
    AlreadyEnrolled { athlete_id: String },

    /// External save/load collaborator failed; the operation is not committed
    PersistenceFailure { detail: String },
}

impl std::fmt::Display for EnrollmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentError::InvalidTransition { current } => {
                write!(
                    f,
                    "Renewal is only possible from an Expired enrollment (current state: {})",
                    current
                )
            }
            EnrollmentError::CategoryTierViolation { proposed, minimum } => {
                write!(
                    f,
                    "A renewal may hold or advance the category tier, never regress: \
                     proposed {} is below {}",
                    proposed, minimum
                )
            }
            EnrollmentError::TransitionNotAllowed { from, to } => {
                write!(f, "Enrollment state cannot change from {} to {}", from, to)
            }
            EnrollmentError::ReasonRequired { from, to } => {
                write!(
                    f,
                    "Changing enrollment state from {} to {} requires a justification",
                    from, to
                )
            }
            EnrollmentError::NotFound { entity, id } => {
                write!(f, "{} not found: {}", entity, id)
            }
            EnrollmentError::AlreadyEnrolled { athlete_id } => {
                write!(
                    f,
                    "Athlete {} already has an enrollment history; only renewals \
                     and state changes may follow",
                    athlete_id
                )
            }
            EnrollmentError::PersistenceFailure { detail } => {
                write!(f, "Persistence failure, operation not committed: {}", detail)
            }
        }
    }
}

impl std::error::Error for EnrollmentError {}

impl EnrollmentError {
    pub fn athlete_not_found(id: &str) -> Self {
        EnrollmentError::NotFound {
            entity: "Athlete",
            id: id.to_string(),
        }
    }

    pub fn guardian_not_found(id: &str) -> Self {
        EnrollmentError::NotFound {
            entity: "Guardian",
            id: id.to_string(),
        }
    }

    pub fn persistence(detail: impl std::fmt::Display) -> Self {
        EnrollmentError::PersistenceFailure {
            detail: detail.to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_blocking_rule() {
        let err = EnrollmentError::InvalidTransition {
            current: EnrollmentState::Active,
        };
        assert!(err.to_string().contains("Expired"));
        assert!(err.to_string().contains("Active"));

        let err = EnrollmentError::CategoryTierViolation {
            proposed: CategoryTier::Infantil,
            minimum: CategoryTier::Sub15,
        };
        assert!(err.to_string().contains("Infantil"));
        assert!(err.to_string().contains("Sub15"));

        let err = EnrollmentError::ReasonRequired {
            from: EnrollmentState::Active,
            to: EnrollmentState::Suspended,
        };
        assert!(err.to_string().contains("justification"));
    }

    #[test]
    fn test_not_found_helpers() {
        let err = EnrollmentError::athlete_not_found("ath-1");
        assert_eq!(err.to_string(), "Athlete not found: ath-1");

        let err = EnrollmentError::guardian_not_found("g-9");
        assert_eq!(err.to_string(), "Guardian not found: g-9");
    }
}
