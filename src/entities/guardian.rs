// 👪 Guardian Directory - Read-only references for athletes
// The engine never owns or mutates guardian data. It only confirms a
// referenced guardian id exists before a save commits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    /// Stable identity (UUID) - NEVER changes
    pub id: String,

    pub name: String,

    /// Contact phone as entered by the operator
    pub phone: Option<String>,
}

impl Guardian {
    pub fn new(name: String, phone: Option<String>) -> Self {
        Guardian {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            phone,
        }
    }
}

// ============================================================================
// GUARDIAN DIRECTORY
// ============================================================================

/// Lookup boundary to the external guardian directory.
pub trait GuardianDirectory {
    fn find_guardian_by_id(&self, id: &str) -> Option<Guardian>;
}

/// In-memory directory used by the CLI and by tests.
#[derive(Default)]
pub struct InMemoryGuardianDirectory {
    guardians: HashMap<String, Guardian>,
}

impl InMemoryGuardianDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, guardian: Guardian) -> String {
        let id = guardian.id.clone();
        self.guardians.insert(id.clone(), guardian);
        id
    }

    pub fn len(&self) -> usize {
        self.guardians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guardians.is_empty()
    }
}

impl GuardianDirectory for InMemoryGuardianDirectory {
    fn find_guardian_by_id(&self, id: &str) -> Option<Guardian> {
        self.guardians.get(id).cloned()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_lookup() {
        let mut directory = InMemoryGuardianDirectory::new();
        let guardian = Guardian::new("Carmen López".to_string(), Some("555-0101".to_string()));
        let id = directory.insert(guardian.clone());

        assert_eq!(directory.find_guardian_by_id(&id), Some(guardian));
        assert_eq!(directory.find_guardian_by_id("missing"), None);
        assert_eq!(directory.len(), 1);
    }
}
