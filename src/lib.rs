//! tickwork — cooperative tick-driven task table
//!
//! Don't preempt, just keep time.
//!
//! Minimal non-preemptive scheduler for bare-metal control loops:
//! - Static task table (no heap, no allocation)
//! - Timer interrupt promotes due tasks, the main loop runs them
//! - A task's return value is its next period, `PERIOD_END` retires it
//! - Interrupt-safe shared table over `critical-section`
//!
//! Author: Moroya Sakamoto

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod config;
pub mod error;
pub mod task;
pub mod timer;
pub mod scheduler;
pub mod kernel;
mod trace;

pub use config::{MAX_PERIOD, MAX_TASKS, MIN_PERIOD, PERIOD_END};
pub use error::{Error, Result};
pub use task::{data_as, Task, TaskData, TaskFn, TaskState};
pub use timer::{Tick, TickCounter};
pub use scheduler::{ReadyTask, Scheduler};
pub use kernel::{Kernel, KernelStats};
