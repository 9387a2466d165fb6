// Entity Models - Athletes and guardians referenced by the engine
// "Identity persists, values change": every entity has a stable UUID that
// never changes while its values move over time.
//
// The engine owns enrollment history only. Athletes are edited by the
// surrounding dashboard; guardians are a read-only directory.

pub mod athlete;
pub mod guardian;

pub use athlete::{Athlete, LifecycleStatus};
pub use guardian::{Guardian, GuardianDirectory, InMemoryGuardianDirectory};
