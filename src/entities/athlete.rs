// 🏃 Athlete Entity - Stable identity, changing values
// The athlete is owned by the surrounding dashboard; the engine references
// it for category/tier checks and lifecycle cascades. Its displayed
// enrollment status is ALWAYS derived from the most recent enrollment
// record in the store, never stored here as authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::CategoryTier;

// ============================================================================
// LIFECYCLE STATUS
// ============================================================================

/// The athlete's own Active/Inactive status, independent from enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleStatus {
    Active,
    Inactive,
}

impl LifecycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Active => "Active",
            LifecycleStatus::Inactive => "Inactive",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            LifecycleStatus::Active => "Activo",
            LifecycleStatus::Inactive => "Inactivo",
        }
    }

    /// Parse a status as written in roster files (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" | "activo" | "activa" => Some(LifecycleStatus::Active),
            "inactive" | "inactivo" | "inactiva" => Some(LifecycleStatus::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ATHLETE ENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    /// Stable identity (UUID) - NEVER changes
    pub id: String,

    /// Full name as registered with the foundation
    pub name: String,

    /// Current category in the ordered tier hierarchy
    pub category: CategoryTier,

    /// Active | Inactive; edits here trigger the Cascade Controller
    pub lifecycle_status: LifecycleStatus,

    /// Weak reference to the guardian directory, lookup-only
    pub guardian_id: Option<String>,

    /// When this athlete was registered in the system
    pub registered_at: DateTime<Utc>,
}

impl Athlete {
    pub fn new(name: String, category: CategoryTier, guardian_id: Option<String>) -> Self {
        Athlete {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            category,
            lifecycle_status: LifecycleStatus::Active,
            guardian_id,
            registered_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle_status == LifecycleStatus::Active
    }
}

// ============================================================================
// TESTS
// ============================================================================
