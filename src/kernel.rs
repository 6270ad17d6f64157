//! Kernel — the task table shared between interrupt and main loop
//!
//! Wraps a [`Scheduler`] in a critical-section mutex so one `static` table
//! can be ticked from the timer interrupt and dispatched from `main()`:
//!
//! ```ignore
//! static KERNEL: Kernel = Kernel::new();
//!
//! #[exception]
//! fn SysTick() {
//!     KERNEL.tick();
//! }
//!
//! #[entry]
//! fn main() -> ! {
//!     KERNEL.register(blink, PERIOD_100MS, TaskState::Blocked, None, 0).ok();
//!     loop {
//!         KERNEL.dispatch();
//!     }
//! }
//! ```
//!
//! Task functions run outside the critical section, so they may call back
//! into the kernel and ticks keep arriving while they run.
//!
//! Author: Moroya Sakamoto

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;

use crate::config::MAX_TASKS;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::task::{TaskData, TaskFn, TaskState};
use crate::timer::Tick;

/// Interrupt-safe task table
///
/// Memory footprint: `N` slots of `Option<Task>`, plus the `RefCell` borrow
/// flag, the tail index, the tick counter and the `running` flag.
pub struct Kernel<const N: usize = MAX_TASKS> {
    /// Task table, only touched inside a critical section
    table: Mutex<RefCell<Scheduler<N>>>,
    /// Simulation state for `run_for`
    running: AtomicBool,
}

impl<const N: usize> Default for Kernel<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Kernel<N> {
    /// Create kernel with an empty table
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(RefCell::new(Scheduler::new())),
            running: AtomicBool::new(false),
        }
    }

    /// Run `f` on the table inside a critical section
    pub fn with<R>(&self, f: impl FnOnce(&mut Scheduler<N>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.table.borrow_ref_mut(cs)))
    }

    /// Register or update a task, see [`Scheduler::register`]
    pub fn register(
        &self,
        func: TaskFn,
        period: u32,
        state: TaskState,
        data: Option<TaskData>,
        defer: u32,
    ) -> Result<()> {
        self.with(|s| s.register(func, period, state, data, defer))
    }

    /// Register a Blocked 1-tick task without data, see [`Scheduler::register_simple`]
    pub fn register_simple(&self, func: TaskFn) -> Result<()> {
        self.with(|s| s.register_simple(func))
    }

    /// Register a Blocked 1-tick task first due after `defer`
    pub fn schedule_simple(&self, func: TaskFn, defer: u32) -> Result<()> {
        self.with(|s| s.schedule_simple(func, defer))
    }

    /// Is `func` registered?
    pub fn is_registered(&self, func: TaskFn) -> bool {
        self.with(|s| s.is_registered(func))
    }

    /// State of `func`, `Suspended` if not registered
    pub fn state_of(&self, func: TaskFn) -> TaskState {
        self.with(|s| s.state_of(func))
    }

    /// Period of `func`, 0 if not registered
    pub fn period_of(&self, func: TaskFn) -> u32 {
        self.with(|s| s.period_of(func))
    }

    /// Next due tick of `func`, 0 if not registered
    pub fn due_time_of(&self, func: TaskFn) -> Tick {
        self.with(|s| s.due_time_of(func))
    }

    /// Force the state of `func`
    pub fn set_state(&self, func: TaskFn, state: TaskState) -> Result<()> {
        self.with(|s| s.set_state(func, state))
    }

    /// Overwrite the period of `func`
    pub fn set_period(&self, func: TaskFn, period: u32) -> Result<()> {
        self.with(|s| s.set_period(func, period))
    }

    /// Overwrite the next due tick of `func`
    pub fn set_due_time(&self, func: TaskFn, due: Tick) -> Result<()> {
        self.with(|s| s.set_due_time(func, due))
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        self.with(|s| s.now())
    }

    /// Number of registered tasks
    pub fn task_count(&self) -> usize {
        self.with(|s| s.len())
    }

    /// Advance one tick — call from the timer interrupt
    pub fn tick(&self) -> Tick {
        self.with(|s| s.tick())
    }

    /// Run every Ready task once — call from the main loop
    ///
    /// The table is locked only to pick the next Ready task and to store its
    /// result, never while the task function runs.
    pub fn dispatch(&self) -> usize {
        let mut executed = 0;
        let mut from = 0;
        while let Some(ready) = self.with(|s| s.take_ready(from)) {
            let returned = ready.run();
            self.with(|s| s.complete(ready, returned));
            executed += 1;
            from = ready.slot + 1;
        }
        executed
    }

    /// Simulate `ticks` timer interrupts, dispatching after each (testing)
    ///
    /// Ends early if a task calls [`stop`](Kernel::stop).
    pub fn run_for(&self, ticks: u64) -> KernelStats {
        self.running.store(true, Ordering::Relaxed);
        let start = self.now();
        let mut tasks_executed = 0u64;

        while self.with(|s| s.elapsed_since(start)) < ticks && self.is_running() {
            self.tick();
            tasks_executed += self.dispatch() as u64;
        }

        self.running.store(false, Ordering::Relaxed);
        KernelStats {
            total_ticks: self.with(|s| s.elapsed_since(start)),
            tasks_executed,
            tasks_registered: self.task_count(),
            now: self.now(),
        }
    }

    /// Stop a running simulation
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Is a simulation running?
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Memory footprint estimate
    pub fn memory_footprint(&self) -> usize {
        core::mem::size_of::<Self>()
    }
}

/// Kernel execution statistics
#[derive(Debug, Clone)]
pub struct KernelStats {
    /// Ticks simulated
    pub total_ticks: u64,
    /// Task function calls
    pub tasks_executed: u64,
    /// Tasks still in the table at the end
    pub tasks_registered: usize,
    /// Kernel clock at the end
    pub now: Tick,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PERIOD_10MS, PERIOD_END};
    use crate::task::data_as;
    use core::sync::atomic::AtomicU32;

    fn bump(data: Option<TaskData>) {
        if let Some(counter) = data_as::<AtomicU32>(data) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn every_10(data: Option<TaskData>) -> u32 {
        bump(data);
        PERIOD_10MS
    }

    #[test]
    fn test_kernel_creation() {
        let kernel: Kernel = Kernel::new();
        assert_eq!(kernel.task_count(), 0);
        assert_eq!(kernel.now(), 0);
        assert!(!kernel.is_running());
    }

    #[test]
    fn test_kernel_periodic() {
        static RUNS: AtomicU32 = AtomicU32::new(0);
        let kernel: Kernel = Kernel::new();
        kernel
            .register(every_10, PERIOD_10MS, TaskState::Blocked, Some(&RUNS), PERIOD_10MS)
            .unwrap();

        let stats = kernel.run_for(100);
        assert_eq!(stats.total_ticks, 100);
        assert_eq!(stats.now, 100);
        assert_eq!(stats.tasks_executed, 10);
        assert_eq!(stats.tasks_registered, 1);
        assert_eq!(RUNS.load(Ordering::Relaxed), 10);
        assert_eq!(kernel.due_time_of(every_10), 110);
    }

    fn countdown(data: Option<TaskData>) -> u32 {
        let Some(left) = data_as::<AtomicU32>(data) else {
            return PERIOD_END;
        };
        if left.fetch_sub(1, Ordering::Relaxed) <= 1 {
            PERIOD_END
        } else {
            5
        }
    }

    #[test]
    fn test_kernel_task_ends_itself() {
        static LEFT: AtomicU32 = AtomicU32::new(3);
        let kernel: Kernel = Kernel::new();
        kernel.register(countdown, 5, TaskState::Blocked, Some(&LEFT), 0).unwrap();

        let stats = kernel.run_for(50);
        assert_eq!(stats.tasks_executed, 3);
        assert_eq!(stats.tasks_registered, 0);
        assert!(!kernel.is_registered(countdown));
    }

    static SPAWN_KERNEL: Kernel<4> = Kernel::new();
    static CHILD_RUNS: AtomicU32 = AtomicU32::new(0);

    fn child(_: Option<TaskData>) -> u32 {
        CHILD_RUNS.fetch_add(1, Ordering::Relaxed);
        PERIOD_END
    }

    fn spawner(_: Option<TaskData>) -> u32 {
        // Runs outside the critical section, so re-entering the kernel is fine
        SPAWN_KERNEL.register_simple(child).ok();
        PERIOD_END
    }

    #[test]
    fn test_task_registers_task() {
        SPAWN_KERNEL.register_simple(spawner).unwrap();

        SPAWN_KERNEL.tick();
        assert_eq!(SPAWN_KERNEL.dispatch(), 1);
        assert!(SPAWN_KERNEL.is_registered(child));
        assert_eq!(SPAWN_KERNEL.state_of(child), TaskState::Blocked);

        // spawner is swept, child becomes Ready
        SPAWN_KERNEL.tick();
        assert!(!SPAWN_KERNEL.is_registered(spawner));
        assert_eq!(SPAWN_KERNEL.dispatch(), 1);
        assert_eq!(CHILD_RUNS.load(Ordering::Relaxed), 1);

        SPAWN_KERNEL.tick();
        assert_eq!(SPAWN_KERNEL.task_count(), 0);
    }

    static PAUSE_KERNEL: Kernel<4> = Kernel::new();

    fn sibling(data: Option<TaskData>) -> u32 {
        bump(data);
        1
    }

    fn pauser(_: Option<TaskData>) -> u32 {
        PAUSE_KERNEL.set_state(sibling, TaskState::Suspended).ok();
        2
    }

    #[test]
    fn test_task_suspends_sibling() {
        static SIBLING_RUNS: AtomicU32 = AtomicU32::new(0);
        PAUSE_KERNEL.register(pauser, 2, TaskState::Blocked, None, 0).unwrap();
        PAUSE_KERNEL.register(sibling, 1, TaskState::Blocked, Some(&SIBLING_RUNS), 0).unwrap();

        // pauser sits in slot 0 and suspends sibling before its turn
        PAUSE_KERNEL.run_for(10);
        assert_eq!(SIBLING_RUNS.load(Ordering::Relaxed), 0);
        assert_eq!(PAUSE_KERNEL.state_of(sibling), TaskState::Suspended);
    }

    static STOP_KERNEL: Kernel<2> = Kernel::new();

    fn stopper(_: Option<TaskData>) -> u32 {
        if STOP_KERNEL.now() >= 20 {
            STOP_KERNEL.stop();
        }
        1
    }

    #[test]
    fn test_task_stops_simulation() {
        STOP_KERNEL.register_simple(stopper).unwrap();
        let stats = STOP_KERNEL.run_for(1000);
        assert_eq!(stats.total_ticks, 20);
        assert_eq!(stats.tasks_executed, 20);
    }

    #[test]
    fn test_run_for_counts_from_current_tick() {
        let kernel: Kernel<2> = Kernel::new();
        for _ in 0..5 {
            kernel.tick();
        }
        let stats = kernel.run_for(10);
        assert_eq!(stats.total_ticks, 10);
        assert_eq!(stats.now, 15);
        assert_eq!(stats.tasks_executed, 0);
    }

    #[test]
    fn test_memory_footprint() {
        let kernel: Kernel = Kernel::new();
        let size = kernel.memory_footprint();
        // 25 slots should stay under 2KB
        assert!(size < 2048, "kernel size should be < 2KB, got {size}");
    }
}
