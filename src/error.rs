//! Ambient error handling surface.
//!
//! The scheduling engine itself is total: `enable`, `waitFor`, `addTask`,
//! `deleteTask` and friends report conditions through return values and the
//! log (see [`crate::log`]), never through `Result`. Introducing a `Result`
//! for operations the engine defines as total would invent a failure mode
//! that cannot occur. The one place a `Result` is warranted is validating
//! configuration input that has an existing, different meaning the caller
//! would otherwise silently get instead of what they asked for.

use core::fmt;

/// Rejected configuration input at the ambient (non-engine) boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A timeout of zero ticks was requested. Zero is indistinguishable
    /// from "no timeout" per the Status Request contract, so it is
    /// rejected outright rather than silently reinterpreted.
    ZeroTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTimeout => {
                write!(f, "a timeout of 0 ticks is indistinguishable from \"no timeout\"")
            }
        }
    }
}
