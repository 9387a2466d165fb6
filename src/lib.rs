// Enrollment Ledger - Core Library
// Athlete enrollment lifecycle engine: append-only history, transition
// validation, lifecycle cascades and a searchable audit trail.
// Exposes all modules for use in the CLI and tests.

pub mod cascade;
pub mod db;
pub mod entities;
pub mod error;
pub mod notify;
pub mod query;
pub mod record;
pub mod service;
pub mod store;
pub mod transitions;

// Re-export commonly used types
pub use cascade::{CascadeController, CascadeOutcome, AUTO_SUSPEND_REASON};
pub use db::{
    find_guardian_by_id, get_events_for_entity, insert_event, insert_guardian, load_all_athletes,
    load_athlete, load_roster_csv, save_athlete, setup_database, AuditEvent,
};
pub use entities::{Athlete, Guardian, GuardianDirectory, InMemoryGuardianDirectory, LifecycleStatus};
pub use error::EnrollmentError;
pub use notify::{ConsoleNotifier, Notifier};
pub use query::{paginate, search, AuditTrailView, Page};
pub use record::{CategoryTier, EnrollmentRecord, EnrollmentState, RecordDraft, RecordType};
pub use service::{
    EnrollmentService, LifecycleOutcome, PersistenceGateway, ServiceOutcome, SqliteGateway,
};
pub use store::EnrollmentHistoryStore;
pub use transitions::{
    allowed_transitions, check_expiry, validate_renewal, validate_state_change, TransitionRule,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
