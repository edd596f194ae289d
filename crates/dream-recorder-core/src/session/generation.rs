use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonically increasing identifier assigned at each recording start.
///
/// Every dispatch carries the generation it was captured in; results for
/// any other generation are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SessionGeneration(u64);

impl SessionGeneration {
    /// The generation that follows this one.
    pub fn next(self) -> Self {
        SessionGeneration(self.0.wrapping_add(1))
    }

    /// Raw counter value, for logging.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
