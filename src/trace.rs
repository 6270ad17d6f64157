//! Trace hooks — scheduler events over defmt
//!
//! Called from the task table at its state transitions. With the `defmt`
//! feature each hook emits one log frame; without it every hook is an empty
//! inline function and vanishes from the binary.
//!
//! Callbacks have no printable identity, so events name tasks by slot index.
//!
//! Author: Moroya Sakamoto

#![allow(unused_variables)]

use crate::error::Error;
use crate::task::TaskState;
use crate::timer::Tick;

#[inline(always)]
pub fn task_registered(slot: usize, period: u32, state: TaskState, due: Tick) {
    #[cfg(feature = "defmt")]
    defmt::debug!("task[{}] registered: period={} state={} due={}", slot, period, state, due);
}

#[inline(always)]
pub fn task_updated(slot: usize, period: u32, state: TaskState, due: Tick) {
    #[cfg(feature = "defmt")]
    defmt::debug!("task[{}] updated: period={} state={} due={}", slot, period, state, due);
}

#[inline(always)]
pub fn register_rejected(err: Error) {
    #[cfg(feature = "defmt")]
    defmt::warn!("task registration rejected: {}", err);
}

#[inline(always)]
pub fn task_promoted(slot: usize, now: Tick, next_due: Tick) {
    #[cfg(feature = "defmt")]
    defmt::trace!("task[{}] ready at {} (next due {})", slot, now, next_due);
}

#[inline(always)]
pub fn task_removed(slot: usize, now: Tick) {
    #[cfg(feature = "defmt")]
    defmt::debug!("task[{}] removed at {}", slot, now);
}

#[inline(always)]
pub fn task_retimed(slot: usize, period: u32, due: Tick) {
    #[cfg(feature = "defmt")]
    defmt::trace!("task[{}] period -> {} (due {})", slot, period, due);
}

#[inline(always)]
pub fn task_finished(slot: usize, now: Tick) {
    #[cfg(feature = "defmt")]
    defmt::debug!("task[{}] returned end at {}", slot, now);
}

#[inline(always)]
pub fn completion_discarded(slot: usize) {
    #[cfg(feature = "defmt")]
    defmt::warn!("task[{}] replaced while running, result discarded", slot);
}
