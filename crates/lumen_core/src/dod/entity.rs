//! Owner identity handed in by the entity system.

use std::fmt;

/// Entity handle (opaque ID)
///
/// Component managers store it next to each slot and give it back on
/// lookup; they never interpret the value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef(u64);

impl EntityRef {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}
