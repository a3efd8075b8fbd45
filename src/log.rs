//! Leveled diagnostics.
//!
//! Grounded in the corpus's own atomic-gated logger: a small integer level,
//! a `Relaxed` `AtomicU8` gate checked before any formatting happens, and a
//! pluggable sink. Unlike the corpus's C-variadic `printf` implementation
//! (which exists to serve a C ABI and needs a nightly-only language
//! feature), the sink here takes `core::fmt::Arguments` directly, which
//! every `no_std` caller already produces via `format_args!`.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use spin::Once;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// A destination for log lines. Installed once by the embedder via
/// [`set_sink`]; with no sink installed, logging is a no-op rather than a
/// panic or a buffered backlog.
pub trait Sink: Sync {
    fn write_line(&self, level: Level, args: fmt::Arguments<'_>);
}

static SINK: Once<&'static dyn Sink> = Once::new();

/// Install the embedder's log sink. Only the first call takes effect.
pub fn set_sink(sink: &'static dyn Sink) {
    SINK.call_once(|| sink);
}

/// Set the minimum level that will be forwarded to the sink.
pub fn set_level(level: Level) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Current minimum level.
pub fn level() -> Level {
    match CURRENT_LEVEL.load(Ordering::Relaxed) {
        0 => Level::Error,
        1 => Level::Warn,
        2 => Level::Info,
        3 => Level::Debug,
        _ => Level::Trace,
    }
}

#[inline(always)]
pub fn is_enabled(level: Level) -> bool {
    (level as u8) <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub fn dispatch(level: Level, args: fmt::Arguments<'_>) {
    if !is_enabled(level) {
        return;
    }
    if let Some(sink) = SINK.get() {
        sink.write_line(level, args);
    }
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::log::dispatch($crate::log::Level::Error, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::log::dispatch($crate::log::Level::Warn, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::log::dispatch($crate::log::Level::Info, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::log::dispatch($crate::log::Level::Debug, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::log::dispatch($crate::log::Level::Trace, core::format_args!($($arg)*))
    };
}
