//! Round-robin scheduler: a single ready queue, a fixed quantum, and a
//! cooperative-or-preemptive yield through the same [`schedule`] path.

use alloc::collections::VecDeque;

use crate::arch::x86::context::{build_initial_stack, context_switch};
use crate::arch::x86::gdt;
use crate::config::DEFAULT_QUANTUM_TICKS;
use crate::process::{self, Pid, ProcessState, IDLE_PID};
use crate::sync::once_lock::GlobalState;

struct Scheduler {
    ready: VecDeque<Pid>,
}

impl Scheduler {
    const fn new() -> Self {
        Scheduler {
            ready: VecDeque::new(),
        }
    }
}

static SCHEDULER: GlobalState<Scheduler> = GlobalState::new();

/// Gives the idle PCB (PID 0) somewhere to actually run: a trivial
/// `hlt` loop on its own kernel stack, built the same way any other
/// process's initial stack is, so the switch path never special-cases
/// "this process has never run" for PID 0 either.
pub fn init() {
    SCHEDULER
        .init(Scheduler::new())
        .unwrap_or_else(|_| panic!("scheduler already initialized"));

    let stack_top =
        process::kernel_stack_top(IDLE_PID).expect("idle PCB exists by process::init");
    // SAFETY: the idle PCB's kernel stack was just constructed and
    // nothing has run on it yet.
    let esp = unsafe { build_initial_stack(stack_top, idle_loop as usize as u32) };
    process::set_kernel_esp(IDLE_PID, esp);
}

extern "C" fn idle_loop() -> ! {
    loop {
        crate::arch::hlt();
    }
}

/// Adds `pid` to the back of the ready queue.
pub fn enqueue(pid: Pid) {
    process::set_state(pid, ProcessState::Ready);
    SCHEDULER.with_mut(|s| s.ready.push_back(pid));
}

/// Unlinks `pid` from the ready queue if it is present there, leaving
/// its state untouched. For callers that need to pull a specific,
/// still-READY process out of the queue before e.g. destroying it.
pub fn remove(pid: Pid) {
    SCHEDULER.with_mut(|s| {
        if let Some(pos) = s.ready.iter().position(|&p| p == pid) {
            s.ready.remove(pos);
        }
    });
}

fn pick_next() -> Option<Pid> {
    SCHEDULER.with_mut(|s| s.ready.pop_front())?
}

/// Called on every timer tick. Accumulates running time on the current
/// process and switches away once its quantum hits zero.
pub fn on_tick() {
    let Some(pid) = process::current() else {
        return;
    };
    process::table::tick_running(pid);
    if process::table::quantum_tick(pid).unwrap_or(false) {
        schedule();
    }
}

/// Voluntarily gives up the remainder of the current quantum.
pub fn yield_now() {
    schedule();
}

/// Picks the next process to run and switches to it.
///
/// If the ready queue has a candidate, it becomes current; the
/// outgoing process, if still runnable, is requeued with its quantum
/// reset to the default (spec.md §4.8's `yield()` contract, which this
/// path always follows). If the queue is empty but the outgoing process
/// can keep running, its quantum is simply refreshed and nothing else
/// happens. If the queue is empty and nothing can keep running, the
/// idle PCB (PID 0) is switched to — it is never itself enqueued.
pub fn schedule() {
    let outgoing = process::current();
    let outgoing_runnable = outgoing
        .and_then(process::state)
        .is_some_and(|s| s == ProcessState::Running);

    let next = match pick_next() {
        Some(pid) => pid,
        None if outgoing_runnable => {
            if let Some(pid) = outgoing {
                process::table::reset_quantum(pid, DEFAULT_QUANTUM_TICKS);
            }
            return;
        }
        None => IDLE_PID,
    };

    if outgoing_runnable {
        if let Some(outgoing_pid) = outgoing {
            if outgoing_pid == IDLE_PID {
                // Idle never sits in the ready queue; park it instead.
                process::set_state(outgoing_pid, ProcessState::Blocked);
            } else {
                process::table::reset_quantum(outgoing_pid, DEFAULT_QUANTUM_TICKS);
                enqueue(outgoing_pid);
            }
        }
    }

    if let Some(outgoing_pid) = outgoing {
        process::table::increment_context_switches(outgoing_pid);
    }
    process::table::increment_context_switches(next);

    process::set_state(next, ProcessState::Running);
    process::table::reset_quantum(next, DEFAULT_QUANTUM_TICKS);
    process::set_current(Some(next));

    if let Some(stack_top) = process::kernel_stack_top(next) {
        gdt::set_kernel_stack(stack_top);
    }

    let new_esp = process::kernel_esp(next).unwrap_or(0);
    let mut old_esp: u32 = 0;
    let old_esp_slot: *mut u32 = match outgoing {
        Some(pid) => process::table::esp_slot(pid),
        None => &mut old_esp as *mut u32,
    };

    // SAFETY: `new_esp` was either produced by a prior `context_switch`
    // call for `next` or built by `build_initial_stack` at process
    // creation; `old_esp_slot` is a valid PCB field or a local.
    unsafe { context_switch(old_esp_slot, new_esp) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case]
    fn ready_queue_is_fifo() {
        let s = GlobalState::new();
        s.init(Scheduler::new()).ok();
        s.with_mut(|s| {
            s.ready.push_back(1);
            s.ready.push_back(2);
            s.ready.push_back(3);
        });
        assert_eq!(s.with_mut(|s| s.ready.pop_front()).flatten(), Some(1));
        assert_eq!(s.with_mut(|s| s.ready.pop_front()).flatten(), Some(2));
        assert_eq!(s.with_mut(|s| s.ready.pop_front()).flatten(), Some(3));
    }
}
