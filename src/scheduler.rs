//! Cooperative task table
//!
//! Non-preemptive scheduling driven from two places:
//! - `tick()` from the 1 ms timer interrupt promotes due tasks to Ready and
//!   frees Stopped ones
//! - `dispatch()` from the main loop calls every Ready task once
//!
//! A task's return value is its next period. Returning a different period
//! retimes the task from *now*; returning `PERIOD_END` stops it.
//!
//! Author: Moroya Sakamoto

use crate::config::{period_in_range, MAX_TASKS, PERIOD_1MS};
use crate::error::{Error, Result};
use crate::task::{is_end, Task, TaskData, TaskFn, TaskState};
use crate::timer::{Tick, TickCounter};
use crate::trace;

/// A Ready task lifted out of the table for a split-phase dispatch
///
/// Produced by [`Scheduler::take_ready`], handed back through
/// [`Scheduler::complete`] with the callback's return value.
#[derive(Debug, Clone, Copy)]
pub struct ReadyTask {
    /// Slot the task lives in
    pub slot: usize,
    task: Task,
}

impl ReadyTask {
    /// Call the task function with its data
    pub fn run(&self) -> u32 {
        self.task.run()
    }
}

/// Fixed-capacity task table
///
/// Static slot array, no dynamic allocation. Slots `[0, tail)` have been
/// used at least once; only those are ever scanned. A freed slot stays below
/// the tail and is handed to the next new task. Once the tail reaches `N`
/// the table is full and only present tasks can be updated.
pub struct Scheduler<const N: usize = MAX_TASKS> {
    /// Static slot array, `None` = free
    slots: [Option<Task>; N],
    /// High-water mark of used slots
    tail: usize,
    /// Scheduler clock
    clock: TickCounter,
}

impl<const N: usize> Default for Scheduler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Scheduler<N> {
    /// Create empty task table at tick zero
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            tail: 0,
            clock: TickCounter::new(),
        }
    }

    /// Register a task, or update it if `func` is already registered
    ///
    /// The task first becomes due `defer` ticks from now. Re-registering
    /// overwrites period, state, due time and data of the existing slot.
    /// On error the table is left untouched.
    pub fn register(
        &mut self,
        func: TaskFn,
        period: u32,
        state: TaskState,
        data: Option<TaskData>,
        defer: u32,
    ) -> Result<()> {
        if !period_in_range(period) {
            trace::register_rejected(Error::TimeLimitExceeded);
            return Err(Error::TimeLimitExceeded);
        }

        let due = self.clock.now() + Tick::from(defer);
        let task = Task::new(func, period, state, data, due);

        if let Some(idx) = self.find(func) {
            self.slots[idx] = Some(task);
            trace::task_updated(idx, period, state, due);
            return Ok(());
        }

        if self.tail >= N {
            trace::register_rejected(Error::CapacityExceeded);
            return Err(Error::CapacityExceeded);
        }

        let idx = self.free_slot();
        self.slots[idx] = Some(task);
        if idx == self.tail {
            self.tail += 1;
        }
        trace::task_registered(idx, period, state, due);
        Ok(())
    }

    /// Register a Blocked 1-tick task without data, due on the next tick
    pub fn register_simple(&mut self, func: TaskFn) -> Result<()> {
        self.register(func, PERIOD_1MS, TaskState::Blocked, None, 0)
    }

    /// Register a Blocked 1-tick task without data, first due after `defer`
    pub fn schedule_simple(&mut self, func: TaskFn, defer: u32) -> Result<()> {
        self.register(func, PERIOD_1MS, TaskState::Blocked, None, defer)
    }

    /// Is `func` registered?
    pub fn is_registered(&self, func: TaskFn) -> bool {
        self.find(func).is_some()
    }

    /// State of `func`, `Suspended` if not registered
    pub fn state_of(&self, func: TaskFn) -> TaskState {
        self.get(func).map_or(TaskState::Suspended, |t| t.state)
    }

    /// Period of `func`, 0 if not registered
    pub fn period_of(&self, func: TaskFn) -> u32 {
        self.get(func).map_or(0, |t| t.period)
    }

    /// Next due tick of `func`, 0 if not registered
    pub fn due_time_of(&self, func: TaskFn) -> Tick {
        self.get(func).map_or(0, |t| t.due)
    }

    /// Force the state of `func`
    ///
    /// `Suspended` pauses the task, `Stopped` has the next tick remove it.
    pub fn set_state(&mut self, func: TaskFn, state: TaskState) -> Result<()> {
        self.get_mut(func)?.state = state;
        Ok(())
    }

    /// Overwrite the period of `func`
    ///
    /// Takes effect at the next promotion; the current due time is kept.
    pub fn set_period(&mut self, func: TaskFn, period: u32) -> Result<()> {
        self.get_mut(func)?.period = period;
        Ok(())
    }

    /// Overwrite the next due tick of `func`
    pub fn set_due_time(&mut self, func: TaskFn, due: Tick) -> Result<()> {
        self.get_mut(func)?.due = due;
        Ok(())
    }

    /// Advance the clock one tick and update task states
    ///
    /// Blocked tasks that are due move to Ready with their due time pushed
    /// one period past the old one. Stopped tasks are freed. Call once per
    /// base time unit.
    pub fn tick(&mut self) -> Tick {
        let now = self.clock.advance();

        for idx in 0..self.tail {
            let Some(task) = self.slots[idx].as_mut() else {
                continue;
            };
            if task.is_stopped() {
                self.slots[idx] = None;
                trace::task_removed(idx, now);
            } else if task.state == TaskState::Blocked && task.due <= now {
                task.due += Tick::from(task.period);
                task.state = TaskState::Ready;
                trace::task_promoted(idx, now, task.due);
            }
        }
        now
    }

    /// Run every Ready task once
    ///
    /// Returns how many task functions were called.
    pub fn dispatch(&mut self) -> usize {
        let mut executed = 0;
        let mut from = 0;
        while let Some(ready) = self.take_ready(from) {
            let returned = ready.run();
            self.complete(ready, returned);
            executed += 1;
            from = ready.slot + 1;
        }
        executed
    }

    /// First Ready task at slot `from` or later
    ///
    /// The task stays in its slot; this only copies out what is needed to
    /// call it.
    pub fn take_ready(&self, from: usize) -> Option<ReadyTask> {
        (from..self.tail).find_map(|slot| match self.slots[slot] {
            Some(task) if task.state == TaskState::Ready => Some(ReadyTask { slot, task }),
            _ => None,
        })
    }

    /// Apply the return value of a task run started with [`take_ready`]
    ///
    /// A changed period retimes the task from the current tick. The end
    /// value stops it, anything else blocks it until due. Discarded if the
    /// slot no longer holds the same task.
    ///
    /// [`take_ready`]: Scheduler::take_ready
    pub fn complete(&mut self, ready: ReadyTask, returned: u32) {
        let now = self.clock.now();
        let task = match self.slots.get_mut(ready.slot) {
            Some(Some(task)) if task.is(ready.task.func) => task,
            _ => {
                trace::completion_discarded(ready.slot);
                return;
            }
        };

        if returned != task.period {
            task.period = returned;
            task.due = now + Tick::from(returned);
            trace::task_retimed(ready.slot, returned, task.due);
        }

        if is_end(returned) {
            task.state = TaskState::Stopped;
            trace::task_finished(ready.slot, now);
        } else {
            task.state = TaskState::Blocked;
        }
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    /// Ticks elapsed since `reference`
    pub fn elapsed_since(&self, reference: Tick) -> Tick {
        self.clock.elapsed_since(reference)
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.slots[..self.tail].iter().filter(|s| s.is_some()).count()
    }

    /// No task registered?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// High-water mark of used slots
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Total slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Slot index holding `func`
    fn find(&self, func: TaskFn) -> Option<usize> {
        self.slots[..self.tail]
            .iter()
            .position(|s| s.as_ref().is_some_and(|t| t.is(func)))
    }

    /// First free slot in `[0, tail]`; the caller has checked `tail < N`
    fn free_slot(&self) -> usize {
        self.slots[..self.tail]
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.tail)
    }

    fn get(&self, func: TaskFn) -> Option<&Task> {
        self.find(func).and_then(|idx| self.slots[idx].as_ref())
    }

    fn get_mut(&mut self, func: TaskFn) -> Result<&mut Task> {
        let idx = self.find(func).ok_or(Error::NotFound)?;
        self.slots[idx].as_mut().ok_or(Error::NotFound)
    }
}
