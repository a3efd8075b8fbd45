//! Task descriptor: scheduling parameters, lifecycle state, callback hooks,
//! and the intrusive doubly-linked list links that tie it into a [`crate::scheduler::Scheduler`].

use core::ptr;

#[cfg(feature = "lts-pointer")]
use core::ffi::c_void;
#[cfg(feature = "task-ids")]
use core::sync::atomic::{AtomicU32, Ordering};

use crate::scheduler::Scheduler;

#[cfg(feature = "status-request")]
use crate::status_request::StatusRequest;

#[cfg(not(feature = "oo-callbacks"))]
pub type TaskCallback = fn(&mut Task);
#[cfg(not(feature = "oo-callbacks"))]
pub type TaskOnEnable = fn(&mut Task) -> bool;
#[cfg(not(feature = "oo-callbacks"))]
pub type TaskOnDisable = fn(&mut Task);

/// Object-oriented callback capability (mutually exclusive with the
/// function-pointer fields above; see the `oo-callbacks` feature).
///
/// A task that wants this mode owns one of these separately and attaches
/// it with [`Task::set_hooks`]; the scheduler dispatches through the
/// trait object instead of through `callback`/`on_enable`/`on_disable`
/// fields.
#[cfg(feature = "oo-callbacks")]
pub trait TaskHooks {
    /// Periodic callback. Return `true` if the task did real work (used
    /// to drive `idleRun`); `false` counts this pass as idle.
    fn callback(&mut self, task: &mut Task) -> bool;
    /// Veto hook: return `false` to refuse enabling.
    fn on_enable(&mut self, _task: &mut Task) -> bool {
        true
    }
    fn on_disable(&mut self, _task: &mut Task) {}
}

#[cfg(feature = "scheduling-options")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulingOption {
    /// Preserve cadence; lateness accumulates (`previousTick += delay`).
    Schedule,
    /// Like `Schedule`, but catch up to the present in whole intervals
    /// instead of letting lateness compound indefinitely.
    ScheduleNoCatchUp,
    /// Intervals measured end-to-start (`previousTick = now`); drifts
    /// with callback runtime.
    Interval,
}

#[cfg(feature = "scheduling-options")]
impl Default for SchedulingOption {
    fn default() -> Self {
        SchedulingOption::Schedule
    }
}

#[cfg(feature = "status-request")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WaitMode {
    NotWaiting,
    NoDelay,
    Delayed,
}

/// A scheduled unit of work. Externally owned: the embedder is responsible
/// for the storage (typically `static` or a long-lived stack local) and
/// must not move a `Task` once it has been linked into a scheduler's
/// chain, since neighboring tasks hold raw pointers to it.
pub struct Task {
    interval: u32,
    delay: u32,
    previous_tick: u32,
    iterations_left: i32,
    set_iterations: i32,
    run_counter: u32,

    enabled: bool,
    in_on_enable: bool,
    canceled: bool,
    #[cfg(feature = "timeout")]
    timed_out: bool,
    #[cfg(feature = "status-request")]
    pub(crate) waiting: WaitMode,

    #[cfg(not(feature = "oo-callbacks"))]
    callback: Option<TaskCallback>,
    #[cfg(not(feature = "oo-callbacks"))]
    on_enable: Option<TaskOnEnable>,
    #[cfg(not(feature = "oo-callbacks"))]
    on_disable: Option<TaskOnDisable>,
    #[cfg(feature = "oo-callbacks")]
    hooks: Option<*mut dyn TaskHooks>,

    pub(crate) prev: *mut Task,
    pub(crate) next: *mut Task,
    pub(crate) scheduler: *mut Scheduler,

    #[cfg(feature = "time-critical")]
    overrun: i32,
    #[cfg(feature = "time-critical")]
    start_delay: i32,

    #[cfg(feature = "task-ids")]
    task_id: u32,
    #[cfg(feature = "task-ids")]
    pub(crate) control_point: u32,

    #[cfg(feature = "lts-pointer")]
    lts: *mut c_void,

    #[cfg(feature = "timeout")]
    timeout: u32,
    #[cfg(feature = "timeout")]
    start_time: u32,

    #[cfg(feature = "status-request")]
    pub(crate) status_request_ref: *mut StatusRequest,
    #[cfg(feature = "status-request")]
    internal_status_request: StatusRequest,

    #[cfg(feature = "scheduling-options")]
    pub(crate) option: SchedulingOption,
}

#[cfg(feature = "task-ids")]
static NEXT_TASK_ID: AtomicU32 = AtomicU32::new(1);

impl Task {
    /// A freshly constructed, detached, disabled task. Mirrors the
    /// original's `reset()`: out of any chain, not enabled.
    pub const fn new() -> Self {
        Self {
            interval: 0,
            delay: 0,
            previous_tick: 0,
            iterations_left: 0,
            set_iterations: 0,
            run_counter: 0,
            enabled: false,
            in_on_enable: false,
            canceled: false,
            #[cfg(feature = "timeout")]
            timed_out: false,
            #[cfg(feature = "status-request")]
            waiting: WaitMode::NotWaiting,
            #[cfg(not(feature = "oo-callbacks"))]
            callback: None,
            #[cfg(not(feature = "oo-callbacks"))]
            on_enable: None,
            #[cfg(not(feature = "oo-callbacks"))]
            on_disable: None,
            #[cfg(feature = "oo-callbacks")]
            hooks: None,
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
            scheduler: ptr::null_mut(),
            #[cfg(feature = "time-critical")]
            overrun: 0,
            #[cfg(feature = "time-critical")]
            start_delay: 0,
            #[cfg(feature = "task-ids")]
            task_id: 0,
            #[cfg(feature = "task-ids")]
            control_point: 0,
            #[cfg(feature = "lts-pointer")]
            lts: ptr::null_mut(),
            #[cfg(feature = "timeout")]
            timeout: 0,
            #[cfg(feature = "timeout")]
            start_time: 0,
            #[cfg(feature = "status-request")]
            status_request_ref: ptr::null_mut(),
            #[cfg(feature = "status-request")]
            internal_status_request: StatusRequest::new(),
            #[cfg(feature = "scheduling-options")]
            option: SchedulingOption::Schedule,
        }
    }

    /// Build a task with explicit scheduling parameters and (in
    /// function-pointer mode) its callbacks.
    #[cfg(not(feature = "oo-callbacks"))]
    pub fn with_callback(
        interval: u32,
        iterations: i32,
        callback: Option<TaskCallback>,
        on_enable: Option<TaskOnEnable>,
        on_disable: Option<TaskOnDisable>,
    ) -> Self {
        let mut t = Self::new();
        // `now` is irrelevant here: `enable()` unconditionally restamps
        // `previousTick`/`delay` from the caller's clock before this task
        // can ever be polled by a scheduler.
        t.set(interval, iterations, callback, on_enable, on_disable, 0);
        #[cfg(feature = "task-ids")]
        {
            t.task_id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        }
        t
    }

    #[cfg(feature = "oo-callbacks")]
    pub fn with_interval(interval: u32, iterations: i32) -> Self {
        let mut t = Self::new();
        t.set_interval_raw(interval);
        t.set_iterations(iterations);
        #[cfg(feature = "task-ids")]
        {
            t.task_id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        }
        t
    }

    #[cfg(feature = "oo-callbacks")]
    pub fn set_hooks(&mut self, hooks: *mut dyn TaskHooks) {
        self.hooks = Some(hooks);
    }

    /// Assign scheduling parameters (and, in function-pointer mode,
    /// callbacks). Internally delegates the interval bookkeeping to
    /// [`Task::set_interval`], so reconfiguring an already-enabled task
    /// through `set` reschedules it against `now` rather than leaving its
    /// old `previousTick`/`delay` in place.
    #[cfg(not(feature = "oo-callbacks"))]
    pub fn set(
        &mut self,
        interval: u32,
        iterations: i32,
        callback: Option<TaskCallback>,
        on_enable: Option<TaskOnEnable>,
        on_disable: Option<TaskOnDisable>,
        now: u32,
    ) {
        self.callback = callback;
        self.on_enable = on_enable;
        self.on_disable = on_disable;
        self.set_interval(interval, now);
        self.set_iterations(iterations);
    }

    fn set_interval_raw(&mut self, interval: u32) {
        self.interval = interval;
    }

    /// Record a new interval and refresh `delay` to this value, stamping
    /// `previousTick = now` so the next fire is one interval from now.
    pub fn set_interval(&mut self, interval: u32, now: u32) {
        self.interval = interval;
        self.delay_raw(0, now);
    }

    pub fn set_iterations(&mut self, iterations: i32) {
        self.set_iterations = iterations;
        self.iterations_left = iterations;
    }

    /// Attach to a scheduler, enable, and return whether enabling
    /// succeeded. Equivalent to constructing with `aScheduler` non-null in
    /// the original API.
    pub fn attach(&mut self, scheduler: &mut Scheduler) {
        scheduler.add_task(self);
    }

    /// Enables the task: resets `runCounter`, clears `canceled`, runs the
    /// on-enable hook (guarded against re-entrancy), primes the task to
    /// fire on the very next visit, and (re)arms the internal status
    /// request. Returns the resulting enabled state. A task without an
    /// attached scheduler cannot be enabled and this silently returns
    /// `false` (see the engine's error handling design).
    pub fn enable(&mut self, now: u32) -> bool {
        if self.scheduler.is_null() {
            crate::log_warn!("enable() on task with no attached scheduler; ignored");
            return false;
        }
        self.run_counter = 0;
        self.canceled = false;

        if !self.in_on_enable {
            self.in_on_enable = true;
            self.enabled = self.invoke_on_enable();
            self.in_on_enable = false;
        }
        // else: re-entrant enable from within our own on-enable hook —
        // the latch keeps `enabled` whatever it already was.

        self.delay = self.interval;
        self.previous_tick = now.wrapping_sub(self.interval);

        #[cfg(feature = "timeout")]
        {
            self.reset_timeout(now);
        }

        if self.enabled {
            #[cfg(feature = "status-request")]
            {
                self.internal_status_request.set_waiting(1, now);
            }
        }
        self.enabled
    }

    #[cfg(not(feature = "oo-callbacks"))]
    fn invoke_on_enable(&mut self) -> bool {
        match self.on_enable {
            Some(hook) => with_current_task(self, |t| hook(t)),
            None => true,
        }
    }

    #[cfg(feature = "oo-callbacks")]
    fn invoke_on_enable(&mut self) -> bool {
        match self.hooks {
            Some(hooks) => with_current_task(self, |t| {
                // SAFETY: `hooks` was registered by the embedder and is
                // required to outlive the task (see `set_hooks`).
                let hooks = unsafe { &mut *hooks };
                hooks.on_enable(t)
            }),
            None => true,
        }
    }

    /// Enable only if currently disabled. Returns the prior state.
    pub fn enable_if_not(&mut self, now: u32) -> bool {
        let previous = self.enabled;
        if !previous {
            self.enable(now);
        }
        previous
    }

    /// Enable, then delay the first fire by `d` ticks.
    pub fn enable_delayed(&mut self, d: u32, now: u32) -> bool {
        self.enable(now);
        self.delay_raw(d, now);
        self.enabled
    }

    /// Postpone the next fire: `delay = d` (or `interval` if `d == 0`),
    /// stamping `previousTick = now`.
    pub fn delay(&mut self, d: u32, now: u32) {
        self.delay_raw(d, now);
    }

    fn delay_raw(&mut self, d: u32, now: u32) {
        self.delay = if d != 0 { d } else { self.interval };
        self.previous_tick = now;
    }

    /// Make the next `execute` pass fire this task immediately,
    /// regardless of remaining delay.
    pub fn force_next_iteration(&mut self, now: u32) {
        self.delay = self.interval;
        self.previous_tick = now.wrapping_sub(self.interval);
    }

    /// Disable the task. Runs the on-disable hook (if it was previously
    /// enabled) and signals the internal status request complete. Returns
    /// whether the task was enabled before this call.
    pub fn disable(&mut self) -> bool {
        let previously_enabled = self.enabled;
        self.enabled = false;
        self.in_on_enable = false;

        if previously_enabled {
            self.invoke_on_disable();
        }

        #[cfg(feature = "status-request")]
        {
            self.internal_status_request.signal_complete(0);
        }
        previously_enabled
    }

    #[cfg(not(feature = "oo-callbacks"))]
    fn invoke_on_disable(&mut self) {
        if let Some(hook) = self.on_disable {
            with_current_task(self, |t| hook(t));
        }
    }

    #[cfg(feature = "oo-callbacks")]
    fn invoke_on_disable(&mut self) {
        if let Some(hooks) = self.hooks {
            with_current_task(self, |t| {
                // SAFETY: see `invoke_on_enable`.
                let hooks = unsafe { &mut *hooks };
                hooks.on_disable(t);
            });
        }
    }

    /// Disable without running the on-disable hook, setting `canceled`.
    pub fn abort(&mut self) {
        self.enabled = false;
        self.in_on_enable = false;
        self.canceled = true;
    }

    /// Set `canceled`, then disable (so the hook observes `canceled ==
    /// true`).
    pub fn cancel(&mut self) {
        self.canceled = true;
        self.disable();
    }

    pub fn canceled(&self) -> bool {
        self.canceled
    }

    /// Reset `iterationsLeft` to the originally configured count, then
    /// enable.
    pub fn restart(&mut self, now: u32) -> bool {
        self.iterations_left = self.set_iterations;
        self.enable(now)
    }

    pub fn restart_delayed(&mut self, d: u32, now: u32) -> bool {
        self.iterations_left = self.set_iterations;
        self.enable_delayed(d, now)
    }

    /// Wait for `sr` to complete before resuming time-based scheduling,
    /// firing immediately once it does. Returns `false` (and leaves the
    /// task unchanged) if `sr` is null.
    #[cfg(feature = "status-request")]
    pub fn wait_for(
        &mut self,
        sr: *mut StatusRequest,
        interval: u32,
        iterations: i32,
        now: u32,
    ) -> bool {
        self.status_request_ref = sr;
        if sr.is_null() {
            crate::log_warn!("waitFor(null) ignored");
            return false;
        }
        self.set_iterations(iterations);
        self.set_interval(interval, now);
        self.waiting = WaitMode::NoDelay;
        self.enable(now)
    }

    /// Like [`Task::wait_for`], but only updates the interval if `interval
    /// != 0`, and resumes on a delayed schedule (waits a full `delay`
    /// after completion rather than firing immediately).
    #[cfg(feature = "status-request")]
    pub fn wait_for_delayed(
        &mut self,
        sr: *mut StatusRequest,
        interval: u32,
        iterations: i32,
        now: u32,
    ) -> bool {
        self.status_request_ref = sr;
        if sr.is_null() {
            crate::log_warn!("waitForDelayed(null) ignored");
            return false;
        }
        self.set_iterations(iterations);
        if interval != 0 {
            self.set_interval(interval, now);
        }
        self.waiting = WaitMode::Delayed;
        self.enable(now)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn iterations(&self) -> i32 {
        self.iterations_left
    }

    pub fn run_counter(&self) -> u32 {
        self.run_counter
    }

    pub fn is_first_iteration(&self) -> bool {
        self.run_counter <= 1
    }

    pub fn is_last_iteration(&self) -> bool {
        self.iterations_left == 0
    }

    #[cfg(feature = "time-critical")]
    pub fn overrun(&self) -> i32 {
        self.overrun
    }

    #[cfg(feature = "time-critical")]
    pub fn start_delay(&self) -> i32 {
        self.start_delay
    }

    #[cfg(feature = "timeout")]
    pub fn set_timeout(&mut self, timeout: u32, reset: bool, now: u32) {
        self.timeout = timeout;
        if reset {
            self.reset_timeout(now);
        }
    }

    #[cfg(feature = "timeout")]
    pub fn reset_timeout(&mut self, now: u32) {
        self.start_time = now;
        self.timed_out = false;
    }

    #[cfg(feature = "timeout")]
    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    #[cfg(feature = "timeout")]
    pub fn until_timeout(&self, now: u32) -> i32 {
        if self.timeout == 0 {
            return -1;
        }
        (self.start_time.wrapping_add(self.timeout) as i32).wrapping_sub(now as i32)
    }

    #[cfg(feature = "timeout")]
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    #[cfg(feature = "task-ids")]
    pub fn id(&self) -> u32 {
        self.task_id
    }

    #[cfg(feature = "task-ids")]
    pub fn set_id(&mut self, id: u32) {
        self.task_id = id;
    }

    #[cfg(feature = "task-ids")]
    pub fn control_point(&self) -> u32 {
        self.control_point
    }

    #[cfg(feature = "task-ids")]
    pub fn set_control_point(&mut self, point: u32) {
        self.control_point = point;
    }

    #[cfg(feature = "lts-pointer")]
    pub fn lts_pointer(&self) -> *mut c_void {
        self.lts
    }

    #[cfg(feature = "lts-pointer")]
    pub fn set_lts_pointer(&mut self, ptr: *mut c_void) {
        self.lts = ptr;
    }

    #[cfg(feature = "status-request")]
    pub fn status_request(&self) -> *mut StatusRequest {
        self.status_request_ref
    }

    #[cfg(feature = "status-request")]
    pub fn internal_status_request(&mut self) -> &mut StatusRequest {
        &mut self.internal_status_request
    }

    #[cfg(feature = "scheduling-options")]
    pub fn set_scheduling_option(&mut self, option: SchedulingOption) {
        self.option = option;
    }

    /// Swap in a new callback for the next pass without consuming an
    /// iteration: adjusts `runCounter` and `iterationsLeft` to compensate
    /// and forces the next pass to fire immediately. Function-pointer
    /// mode only — there is no sensible equivalent when the callback is a
    /// virtual method.
    #[cfg(not(feature = "oo-callbacks"))]
    pub fn yield_to(&mut self, callback: TaskCallback, now: u32) {
        self.callback = Some(callback);
        self.force_next_iteration(now);
        self.run_counter = self.run_counter.saturating_sub(1);
        if self.iterations_left >= 0 {
            self.iterations_left += 1;
        }
    }

    /// Like [`Task::yield_to`], but also forces this to be the task's
    /// final iteration.
    #[cfg(not(feature = "oo-callbacks"))]
    pub fn yield_once(&mut self, callback: TaskCallback, now: u32) {
        self.yield_to(callback, now);
        self.iterations_left = 1;
    }

    // --- internals used by the scheduler's execute pass ---

    pub(crate) fn previous_tick(&self) -> u32 {
        self.previous_tick
    }

    pub(crate) fn delay_ticks(&self) -> u32 {
        self.delay
    }

    #[cfg(feature = "timeout")]
    pub(crate) fn start_time(&self) -> u32 {
        self.start_time
    }

    #[cfg(feature = "timeout")]
    pub(crate) fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }

    pub(crate) fn decrement_iterations_if_finite(&mut self) {
        if self.iterations_left > 0 {
            self.iterations_left -= 1;
        }
    }

    pub(crate) fn bump_run_counter(&mut self) {
        self.run_counter = self.run_counter.wrapping_add(1);
    }

    pub(crate) fn set_previous_tick(&mut self, tick: u32) {
        self.previous_tick = tick;
    }

    pub(crate) fn set_delay_ticks(&mut self, delay: u32) {
        self.delay = delay;
    }

    #[cfg(feature = "time-critical")]
    pub(crate) fn record_diagnostics(&mut self, overrun: i32, start_delay: i32) {
        self.overrun = overrun;
        self.start_delay = start_delay;
    }

    /// Invoke the periodic callback. Returns whether the pass should be
    /// considered non-idle (`true` = work was done). Called by the
    /// scheduler's execute pass, which has already pointed
    /// `current_task` at this task for the duration of the visit — unlike
    /// `enable`/`disable`, which can be called outside of a pass and must
    /// swap it in themselves.
    pub(crate) fn fire(&mut self) -> bool {
        #[cfg(not(feature = "oo-callbacks"))]
        {
            if let Some(cb) = self.callback {
                cb(self);
                true
            } else {
                false
            }
        }
        #[cfg(feature = "oo-callbacks")]
        {
            match self.hooks {
                Some(hooks) => {
                    // SAFETY: see `invoke_on_enable`.
                    let hooks = unsafe { &mut *hooks };
                    hooks.callback(self)
                }
                None => false,
            }
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `body` with `this.scheduler`'s `current_task` pointing at `this`
/// for the duration of the call, restoring the previous value afterwards.
/// This is how on-enable/on-disable hooks and the periodic callback
/// observe [`Scheduler::current_task`] without a process-wide global.
fn with_current_task<R>(this: &mut Task, body: impl FnOnce(&mut Task) -> R) -> R {
    if this.scheduler.is_null() {
        return body(this);
    }
    // SAFETY: `scheduler` is only ever set by `Scheduler::add_task` to a
    // scheduler that outlives this task while linked, per the ownership
    // invariant documented on `Task`.
    let scheduler = unsafe { &mut *this.scheduler };
    let previous = scheduler.swap_current_task(this as *mut Task);
    let result = body(this);
    scheduler.restore_current_task(previous);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use core::cell::Cell;

    fn zero_clock() -> u32 {
        0
    }

    #[cfg(not(feature = "oo-callbacks"))]
    fn noop_cb(_t: &mut Task) {}

    #[cfg(not(feature = "oo-callbacks"))]
    fn veto(_t: &mut Task) -> bool {
        false
    }

    // Thread-local rather than a shared static: `cargo test` runs each
    // `#[test]` on its own thread, so this keeps the callback-invocation
    // counters below isolated between tests without serializing them.
    std::thread_local! {
        static DISABLE_CALLS: Cell<u32> = Cell::new(0);
    }

    fn disable_calls() -> u32 {
        DISABLE_CALLS.with(|c| c.get())
    }

    fn reset_disable_calls() {
        DISABLE_CALLS.with(|c| c.set(0));
    }

    #[cfg(not(feature = "oo-callbacks"))]
    fn mark_disabled(_t: &mut Task) {
        DISABLE_CALLS.with(|c| c.set(c.get() + 1));
    }

    #[test]
    fn enable_without_scheduler_fails() {
        let mut t = Task::new();
        assert!(!t.enable(0));
        assert!(!t.is_enabled());
    }

    #[cfg(not(feature = "oo-callbacks"))]
    #[test]
    fn enable_disable_roundtrip() {
        let mut sched = Scheduler::new(zero_clock);
        let mut t = Task::with_callback(10, -1, Some(noop_cb), None, None);
        sched.add_task(&mut t);

        assert!(t.enable(0));
        assert!(t.is_enabled());
        assert_eq!(t.run_counter(), 0);

        let was_enabled = t.disable();
        assert!(was_enabled);
        assert!(!t.is_enabled());
    }

    #[cfg(not(feature = "oo-callbacks"))]
    #[test]
    fn on_enable_veto_keeps_task_disabled() {
        let mut sched = Scheduler::new(zero_clock);
        let mut t = Task::with_callback(10, -1, Some(noop_cb), Some(veto), None);
        sched.add_task(&mut t);

        assert!(!t.enable(0));
        assert!(!t.is_enabled());
    }

    #[cfg(not(feature = "oo-callbacks"))]
    #[test]
    fn cancel_runs_on_disable_hook_and_marks_canceled() {
        reset_disable_calls();
        let mut sched = Scheduler::new(zero_clock);
        let mut t = Task::with_callback(10, -1, Some(noop_cb), None, Some(mark_disabled));
        sched.add_task(&mut t);
        t.enable(0);

        t.cancel();
        assert!(t.canceled());
        assert!(!t.is_enabled());
        assert_eq!(disable_calls(), 1);
    }

    #[cfg(not(feature = "oo-callbacks"))]
    #[test]
    fn abort_skips_on_disable_hook() {
        reset_disable_calls();
        let mut sched = Scheduler::new(zero_clock);
        let mut t = Task::with_callback(10, -1, Some(noop_cb), None, Some(mark_disabled));
        sched.add_task(&mut t);
        t.enable(0);

        t.abort();
        assert!(t.canceled());
        assert!(!t.is_enabled());
        assert_eq!(disable_calls(), 0);
    }

    #[cfg(not(feature = "oo-callbacks"))]
    #[test]
    fn restart_resets_iteration_budget() {
        let mut sched = Scheduler::new(zero_clock);
        let mut t = Task::with_callback(5, 3, Some(noop_cb), None, None);
        sched.add_task(&mut t);
        t.enable(0);
        t.decrement_iterations_if_finite();
        t.decrement_iterations_if_finite();
        assert_eq!(t.iterations(), 1);

        t.restart(0);
        assert_eq!(t.iterations(), 3);
        assert!(t.is_enabled());
    }

    #[cfg(feature = "status-request")]
    #[test]
    fn wait_for_null_status_request_is_rejected() {
        let mut sched = Scheduler::new(zero_clock);
        let mut t = Task::new();
        sched.add_task(&mut t);
        assert!(!t.wait_for(ptr::null_mut(), 10, -1, 0));
    }

    #[cfg(feature = "timeout")]
    #[test]
    fn until_timeout_counts_down() {
        let mut t = Task::new();
        t.set_timeout(100, true, 0);
        assert_eq!(t.until_timeout(40), 60);
        assert_eq!(t.until_timeout(150), -50);
    }
}
