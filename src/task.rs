//! Task definition — static, no-alloc task descriptors
//!
//! A task is a callback plus the bookkeeping the task table needs to decide
//! when to call it. The callback is the task's identity: there is no task ID,
//! and two registrations of the same function address the same task.
//!
//! Author: Moroya Sakamoto

use core::any::Any;

use crate::config::PERIOD_END;
use crate::timer::Tick;

/// Opaque per-task data, owned by whoever registered the task
///
/// The table stores and forwards the reference, nothing else. Use
/// [`data_as`] inside the callback to recover the concrete type.
pub type TaskData = &'static (dyn Any + Send + Sync);

/// Task callback — returns the period until its next run
///
/// Returning [`PERIOD_END`] asks the table to drop the task.
pub type TaskFn = fn(Option<TaskData>) -> u32;

/// Task run state
///
/// Whether a slot is occupied at all is tracked separately by the table;
/// these states only ever describe a live task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Ignored by both tick and dispatch until changed by hand
    Suspended,
    /// Waiting for the tick counter to reach its due time
    Blocked,
    /// Due; will be called by the next dispatch pass
    Ready,
    /// Finished; the next tick frees its slot
    Stopped,
}

/// Static task descriptor — plain `Copy` data, no heap
#[derive(Debug, Clone, Copy)]
pub struct Task {
    /// Task function, also the task's identity
    pub func: TaskFn,
    /// Ticks between runs
    pub period: u32,
    /// Tick at or after which a Blocked task becomes Ready
    pub due: Tick,
    /// Current state
    pub state: TaskState,
    /// Forwarded unchanged to `func`
    pub data: Option<TaskData>,
}

impl Task {
    pub fn new(func: TaskFn, period: u32, state: TaskState, data: Option<TaskData>, due: Tick) -> Self {
        Self { func, period, due, state, data }
    }

    /// Does this task run `func`?
    #[inline]
    pub fn is(&self, func: TaskFn) -> bool {
        core::ptr::fn_addr_eq(self.func, func)
    }

    /// Call the task function with its data
    #[inline]
    pub fn run(&self) -> u32 {
        (self.func)(self.data)
    }

    /// Has the task asked to be dropped?
    pub fn is_stopped(&self) -> bool {
        self.state == TaskState::Stopped
    }
}

/// Recover typed task data inside a callback
///
/// `None` if no data was registered or it is not a `T`.
pub fn data_as<T: Any>(data: Option<TaskData>) -> Option<&'static T> {
    data.and_then(|d| d.downcast_ref::<T>())
}

/// Is `period` the end-of-life value?
#[inline]
pub const fn is_end(period: u32) -> bool {
    period == PERIOD_END
}
