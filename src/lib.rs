//! A cooperative, single-threaded task scheduler for resource-constrained
//! execution environments: microcontrollers and embedded runtimes where
//! preemption and dynamic allocation are undesirable.
//!
//! The scheduler multiplexes many logical activities onto a single thread
//! of control by polling an intrusive list of [`task::Task`] descriptors
//! and invoking each task's callback when its scheduling predicate
//! (time-based, and optionally event-based via [`status_request::StatusRequest`])
//! is satisfied. The embedder owns every [`task::Task`]; the
//! [`scheduler::Scheduler`] only borrows them through an intrusive
//! doubly-linked chain — there is no dynamic allocation anywhere in this
//! crate.
//!
//! The clock and the optional idle-sleep callback are external
//! collaborators supplied by the embedder (see [`scheduler::ClockFn`] and
//! [`scheduler::SleepFn`]); this crate never reads a hardware timer
//! itself.
#![no_std]

pub mod constants;
pub mod error;
pub mod log;
pub mod scheduler;
pub mod status_request;
pub mod task;

pub use constants::*;
pub use scheduler::{ClockFn, Scheduler};
pub use task::Task;

#[cfg(feature = "status-request")]
pub use status_request::StatusRequest;

#[cfg(feature = "oo-callbacks")]
pub use task::TaskHooks;

#[cfg(not(feature = "oo-callbacks"))]
pub use task::{TaskCallback, TaskOnDisable, TaskOnEnable};

#[cfg(test)]
extern crate std;
