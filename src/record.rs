// 📋 Enrollment Record Model - Immutable values in an append-only history
// One athlete owns an ordered chain of records; each record is created once
// and never edited. "Current" enrollment state is always derived from the
// most recent record, never stored separately.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// ENROLLMENT STATE
// ============================================================================

/// State of an enrollment ("inscripción") at a point in time.
///
/// Independent from the athlete's own Active/Inactive lifecycle status:
/// an Active athlete can hold a Suspended enrollment and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnrollmentState {
    /// Enrollment is in force ("Vigente")
    Active,

    /// Enrollment is paused with justification ("Suspendida")
    Suspended,

    /// Enrollment period ended; terminal for manual edits ("Vencida")
    Expired,
}

impl EnrollmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentState::Active => "Active",
            EnrollmentState::Suspended => "Suspended",
            EnrollmentState::Expired => "Expired",
        }
    }

    /// Human-facing label shown to operators (the foundation runs in Spanish)
    pub fn display_label(&self) -> &'static str {
        match self {
            EnrollmentState::Active => "Vigente",
            EnrollmentState::Suspended => "Suspendida",
            EnrollmentState::Expired => "Vencida",
        }
    }
}

impl std::fmt::Display for EnrollmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RECORD TYPE
// ============================================================================

/// Why a record was appended to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// First enrollment, created exactly once when the athlete is registered
    Initial,

    /// New Active period after an Expired one (replaces `enrolled_at`)
    Renewal,

    /// Active ↔ Suspended transition with mandatory justification
    StateChange,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Initial => "Initial",
            RecordType::Renewal => "Renewal",
            RecordType::StateChange => "StateChange",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            RecordType::Initial => "Inscripción inicial",
            RecordType::Renewal => "Renovación",
            RecordType::StateChange => "Cambio de estado",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CATEGORY TIER
// ============================================================================

/// Ordered category hierarchy: Infantil < Sub15 < Juvenil.
///
/// A renewal may hold steady or advance a tier, never regress, so the
/// ordering derived here is load-bearing for renewal validation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CategoryTier {
    Infantil,
    Sub15,
    Juvenil,
}

impl CategoryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryTier::Infantil => "Infantil",
            CategoryTier::Sub15 => "Sub15",
            CategoryTier::Juvenil => "Juvenil",
        }
    }

    /// Numeric rank in the hierarchy (Infantil = 0)
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Parse a category name as written in roster files (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "infantil" => Some(CategoryTier::Infantil),
            "sub15" | "sub-15" | "sub 15" => Some(CategoryTier::Sub15),
            "juvenil" => Some(CategoryTier::Juvenil),
            _ => None,
        }
    }
}

impl std::fmt::Display for CategoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RECORD DRAFT
// ============================================================================

/// Validated record skeleton, produced only by the Transition Validator.
///
/// A draft carries everything except `id` and `recorded_at`, which the
/// store assigns at append time. Keeping draft construction inside the
/// validator makes illegal combinations (e.g. a Renewal whose previous
/// state is not Expired) unrepresentable in practice.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub state: EnrollmentState,
    pub previous_state: Option<EnrollmentState>,
    pub category: CategoryTier,
    pub reason: Option<String>,
    pub enrolled_at: NaiveDate,
    pub record_type: RecordType,
}

impl RecordDraft {
    /// Draft for the one Initial record minted at athlete registration
    pub fn initial(category: CategoryTier, enrolled_at: NaiveDate) -> Self {
        RecordDraft {
            state: EnrollmentState::Active,
            previous_state: None,
            category,
            reason: None,
            enrolled_at,
            record_type: RecordType::Initial,
        }
    }
}

// ============================================================================
// ENROLLMENT RECORD
// ============================================================================

/// One immutable point in an athlete's enrollment history.
///
/// Serialized field names match the persistence collaborator's JSON shape
/// (one JSON object per record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// Opaque unique token (UUID) - never reused
    pub id: String,

    /// Enrollment state this record establishes
    pub state: EnrollmentState,

    /// State before this record; set only for StateChange and Renewal
    #[serde(rename = "previousState")]
    pub previous_state: Option<EnrollmentState>,

    /// Category in effect at record time
    pub category: CategoryTier,

    /// Free-text justification; mandatory whenever `previous_state` is set
    pub reason: Option<String>,

    /// Date the underlying enrollment period began.
    /// Inherited unchanged across StateChange records, replaced on Renewal.
    #[serde(rename = "enrolledAt")]
    pub enrolled_at: NaiveDate,

    /// Timestamp the record itself was created
    #[serde(rename = "recordedAt")]
    pub recorded_at: DateTime<Utc>,

    /// Initial | Renewal | StateChange
    #[serde(rename = "recordType")]
    pub record_type: RecordType,
}

impl EnrollmentRecord {
    /// Human date format used on screen and in audit search (dd/mm/yyyy)
    pub fn enrolled_at_display(&self) -> String {
        self.enrolled_at.format("%d/%m/%Y").to_string()
    }

    /// Human timestamp format used on screen and in audit search
    pub fn recorded_at_display(&self) -> String {
        self.recorded_at.format("%d/%m/%Y %H:%M").to_string()
    }

    /// Content fingerprint (SHA-256 over every field).
    ///
    /// Records are never edited after creation, so the same id must always
    /// yield the same fingerprint across repeated reads. Audit checks rely
    /// on this.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.as_bytes());
        hasher.update(self.state.as_str().as_bytes());
        hasher.update(
            self.previous_state
                .map(|s| s.as_str())
                .unwrap_or("-")
                .as_bytes(),
        );
        hasher.update(self.category.as_str().as_bytes());
        hasher.update(self.reason.as_deref().unwrap_or("-").as_bytes());
        hasher.update(self.enrolled_at.to_string().as_bytes());
        hasher.update(self.recorded_at.to_rfc3339().as_bytes());
        hasher.update(self.record_type.as_str().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> EnrollmentRecord {
        EnrollmentRecord {
            id: "rec-123".to_string(),
            state: EnrollmentState::Active,
            previous_state: None,
            category: CategoryTier::Infantil,
            reason: None,
            enrolled_at: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap(),
            record_type: RecordType::Initial,
        }
    }

    #[test]
    fn test_category_tier_ordering() {
        assert!(CategoryTier::Infantil < CategoryTier::Sub15);
        assert!(CategoryTier::Sub15 < CategoryTier::Juvenil);
        assert_eq!(CategoryTier::Infantil.rank(), 0);
        assert_eq!(CategoryTier::Juvenil.rank(), 2);
    }

    #[test]
    fn test_category_tier_parse() {
        assert_eq!(CategoryTier::parse("Infantil"), Some(CategoryTier::Infantil));
        assert_eq!(CategoryTier::parse("sub-15"), Some(CategoryTier::Sub15));
        assert_eq!(CategoryTier::parse("SUB 15"), Some(CategoryTier::Sub15));
        assert_eq!(CategoryTier::parse("juvenil"), Some(CategoryTier::Juvenil));
        assert_eq!(CategoryTier::parse("senior"), None);
    }

    #[test]
    fn test_state_display_labels() {
        assert_eq!(EnrollmentState::Active.display_label(), "Vigente");
        assert_eq!(EnrollmentState::Suspended.display_label(), "Suspendida");
        assert_eq!(EnrollmentState::Expired.display_label(), "Vencida");
    }

    #[test]
    fn test_initial_draft_shape() {
        let enrolled = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let draft = RecordDraft::initial(CategoryTier::Infantil, enrolled);

        assert_eq!(draft.state, EnrollmentState::Active);
        assert_eq!(draft.previous_state, None);
        assert_eq!(draft.record_type, RecordType::Initial);
        assert!(draft.reason.is_none());
    }

    #[test]
    fn test_human_date_formats() {
        let record = sample_record();

        assert_eq!(record.enrolled_at_display(), "01/03/2025");
        assert_eq!(record.recorded_at_display(), "01/03/2025 10:30");
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let record = sample_record();

        let f1 = record.fingerprint();
        let f2 = record.fingerprint();

        assert_eq!(f1, f2, "Same record must always produce the same fingerprint");
        assert_eq!(f1.len(), 64, "SHA-256 hash should be 64 hex characters");
    }

    #[test]
    fn test_fingerprint_detects_field_change() {
        let record = sample_record();
        let mut tampered = record.clone();
        tampered.reason = Some("edited".to_string());

        assert_ne!(record.fingerprint(), tampered.fingerprint());
    }

    #[test]
    fn test_record_serde_field_names() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("previousState").is_some());
        assert!(json.get("enrolledAt").is_some());
        assert!(json.get("recordedAt").is_some());
        assert_eq!(json["recordType"], "Initial");
        assert_eq!(json["state"], "Active");
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: EnrollmentRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, back);
    }
}
