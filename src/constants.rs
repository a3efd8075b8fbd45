//! Recognized constants (§6), scaled to the selected tick resolution.

/// Execute a task as soon as possible.
pub const IMMEDIATE: u32 = 0;
/// Iteration count meaning "never stop".
pub const FOREVER: i32 = -1;
/// Iteration count meaning "fire exactly once".
pub const ONCE: i32 = 1;

#[cfg(not(feature = "micro-resolution"))]
mod resolution {
    pub const SECOND: u32 = 1_000;
}

#[cfg(feature = "micro-resolution")]
mod resolution {
    pub const SECOND: u32 = 1_000_000;
}

pub const SECOND: u32 = resolution::SECOND;
pub const MINUTE: u32 = SECOND * 60;
pub const HOUR: u32 = MINUTE * 60;

/// Negative sentinel status injected by the engine when a wait target's
/// timeout elapses while a task is still waiting on it.
#[cfg(feature = "timeout")]
pub const SR_TIMEOUT: i32 = -1;
