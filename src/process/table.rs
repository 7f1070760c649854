//! Fixed-capacity, PID-indexed process table.

use alloc::boxed::Box;

use crate::config::MAX_PROCESSES;
use crate::error::{KernelError, KernelResult};
use crate::sync::once_lock::GlobalState;

use super::pcb::{Pid, Priority, ProcessControlBlock, ProcessState, IDLE_PID};

pub struct ProcessTable {
    slots: [Option<Box<ProcessControlBlock>>; MAX_PROCESSES],
    next_pid: Pid,
    current: Option<Pid>,
}

impl ProcessTable {
    /// Builds a fresh table with the PID-0 idle PCB already installed
    /// and running: spec.md §3/§4.7 require it to exist for the entire
    /// uptime and to be "current" until real scheduling begins.
    fn new() -> Self {
        let mut table = ProcessTable {
            slots: [const { None }; MAX_PROCESSES],
            next_pid: 1,
            current: Some(IDLE_PID),
        };
        let tick = crate::arch::x86::pit::ticks();
        let mut idle = Box::new(ProcessControlBlock::new(
            IDLE_PID,
            None,
            "idle",
            Priority::Idle,
            tick,
        ));
        idle.state = ProcessState::Running;
        table.slots[IDLE_PID as usize] = Some(idle);
        table
    }

    fn slot(&self, pid: Pid) -> Option<&ProcessControlBlock> {
        self.slots
            .get(pid as usize % MAX_PROCESSES)
            .and_then(|s| s.as_deref())
            .filter(|p| p.pid == pid)
    }

    fn slot_mut(&mut self, pid: Pid) -> Option<&mut ProcessControlBlock> {
        self.slots
            .get_mut(pid as usize % MAX_PROCESSES)
            .and_then(|s| s.as_deref_mut())
            .filter(|p| p.pid == pid)
    }

    /// Allocates a PID by linear scan from `next_pid`, wrapping around
    /// once the counter overflows the table's index space. Returns
    /// `None` once every slot is occupied.
    fn allocate_pid(&mut self) -> Option<Pid> {
        for _ in 0..MAX_PROCESSES {
            let candidate = self.next_pid;
            self.next_pid = self.next_pid.wrapping_add(1);
            if self.next_pid == 0 {
                self.next_pid = 1;
            }
            if self.slots[candidate as usize % MAX_PROCESSES].is_none() {
                return Some(candidate);
            }
        }
        None
    }

    fn create_named(
        &mut self,
        parent: Option<Pid>,
        name: &str,
        priority: Priority,
    ) -> KernelResult<Pid> {
        let pid = self.allocate_pid().ok_or(KernelError::ResourceExhausted {
            resource: "process table",
        })?;
        let tick = crate::arch::x86::pit::ticks();
        let pcb = Box::new(ProcessControlBlock::new(pid, parent, name, priority, tick));
        self.slots[pid as usize % MAX_PROCESSES] = Some(pcb);
        if let Some(parent) = parent {
            if let Some(p) = self.slot_mut(parent) {
                p.add_child(pid);
            }
        }
        Ok(pid)
    }

    fn create(&mut self, parent: Option<Pid>) -> KernelResult<Pid> {
        self.create_named(parent, "proc", Priority::Normal)
    }

    /// Removes `pid`, scrubbing it from its parent's child list and
    /// reparenting any of its own children to PID 1 if that process
    /// exists, else to the idle PCB (PID 0), per spec.md §4.7. PID 0
    /// itself may never be destroyed.
    fn destroy(&mut self, pid: Pid) {
        if pid == IDLE_PID {
            log::warn!("refusing to destroy the idle process");
            return;
        }
        let Some(target) = self.slot(pid) else {
            return;
        };
        let parent = target.parent;
        let children = target.children;

        if let Some(parent_pid) = parent {
            if let Some(p) = self.slot_mut(parent_pid) {
                p.remove_child(pid);
            }
        }

        let new_parent = if pid != 1 && self.slot(1).is_some() {
            1
        } else {
            IDLE_PID
        };
        for child in children.into_iter().flatten() {
            if let Some(c) = self.slot_mut(child) {
                c.parent = Some(new_parent);
            }
            if let Some(p) = self.slot_mut(new_parent) {
                p.add_child(child);
            }
        }

        self.slots[pid as usize % MAX_PROCESSES] = None;
        if self.current == Some(pid) {
            self.current = None;
        }
    }
}

static TABLE: GlobalState<ProcessTable> = GlobalState::new();

pub fn init() {
    TABLE
        .init(ProcessTable::new())
        .unwrap_or_else(|_| panic!("process table already initialized"));
}

/// Creates a new process with no parent, returning its PID.
pub fn create(parent: Option<Pid>) -> KernelResult<Pid> {
    TABLE
        .with_mut(|t| t.create(parent))
        .ok_or(KernelError::NotInitialized {
            subsystem: "process table",
        })?
}

/// Creates a new process with the given name and priority, returning
/// its PID. See spec.md §4.7 `process_create`.
pub fn create_named(parent: Option<Pid>, name: &str, priority: Priority) -> KernelResult<Pid> {
    TABLE
        .with_mut(|t| t.create_named(parent, name, priority))
        .ok_or(KernelError::NotInitialized {
            subsystem: "process table",
        })?
}

/// Marks `pid` a zombie with the given exit code. The slot (and its
/// kernel stack) is kept until a later [`destroy`] call, since the exit
/// syscall runs on that very stack and freeing it out from under the
/// current execution would be a use-after-free; reaping is a distinct
/// step a parent (or bring-up code, for orphans) performs afterward.
pub fn exit(pid: Pid, code: i32) {
    TABLE.with_mut(|t| {
        if let Some(p) = t.slot_mut(pid) {
            p.state = ProcessState::Zombie;
            p.exit_code = code;
        }
    });
}

pub fn destroy(pid: Pid) {
    TABLE.with_mut(|t| t.destroy(pid));
}

pub fn state(pid: Pid) -> Option<ProcessState> {
    TABLE.with(|t| t.slot(pid).map(|p| p.state)).flatten()
}

pub fn set_state(pid: Pid, state: ProcessState) {
    TABLE.with_mut(|t| {
        if let Some(p) = t.slot_mut(pid) {
            p.state = state;
        }
    });
}

pub fn kernel_stack_top(pid: Pid) -> Option<u32> {
    TABLE
        .with(|t| t.slot(pid).map(|p| p.kernel_stack_top()))
        .flatten()
}

pub fn kernel_esp(pid: Pid) -> Option<u32> {
    TABLE.with(|t| t.slot(pid).map(|p| p.kernel_esp)).flatten()
}

pub fn set_kernel_esp(pid: Pid, esp: u32) {
    TABLE.with_mut(|t| {
        if let Some(p) = t.slot_mut(pid) {
            p.kernel_esp = esp;
        }
    });
}

/// Decrements `pid`'s remaining quantum, returning whether it just hit
/// zero. `None` if `pid` does not exist.
pub fn quantum_tick(pid: Pid) -> Option<bool> {
    TABLE
        .with_mut(|t| {
            t.slot_mut(pid).map(|p| {
                p.quantum_remaining = p.quantum_remaining.saturating_sub(1);
                p.quantum_remaining == 0
            })
        })
        .flatten()
}

pub fn reset_quantum(pid: Pid, ticks: u32) {
    TABLE.with_mut(|t| {
        if let Some(p) = t.slot_mut(pid) {
            p.quantum_remaining = ticks;
        }
    });
}

/// Accumulates one tick of running time onto `pid`. Called once per
/// timer tick for whichever PCB is current.
pub fn tick_running(pid: Pid) {
    TABLE.with_mut(|t| {
        if let Some(p) = t.slot_mut(pid) {
            p.running_ticks += 1;
        }
    });
}

/// Increments `pid`'s context-switch counter.
pub fn increment_context_switches(pid: Pid) {
    TABLE.with_mut(|t| {
        if let Some(p) = t.slot_mut(pid) {
            p.context_switches += 1;
        }
    });
}

/// Raw pointer to `pid`'s saved-ESP slot, for handing to
/// [`crate::arch::x86::context::context_switch`]. Null if `pid` does not
/// exist.
///
/// The pointer is valid for as long as `pid`'s slot is not destroyed:
/// the PCB is heap-allocated once at process creation and never moved.
pub fn esp_slot(pid: Pid) -> *mut u32 {
    TABLE
        .with_mut(|t| {
            t.slot_mut(pid)
                .map(|p| core::ptr::addr_of_mut!(p.kernel_esp))
        })
        .flatten()
        .unwrap_or(core::ptr::null_mut())
}

pub fn current() -> Option<Pid> {
    TABLE.with(|t| t.current).flatten()
}

pub fn set_current(pid: Option<Pid>) {
    TABLE.with_mut(|t| t.current = pid);
}

/// Diagnostic listing of every live PID and its state.
pub fn process_list() -> alloc::vec::Vec<(Pid, ProcessState)> {
    TABLE
        .with(|t| {
            t.slots
                .iter()
                .filter_map(|s| s.as_ref().map(|p| (p.pid, p.state)))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_table() -> GlobalState<ProcessTable> {
        let table = GlobalState::new();
        table.init(ProcessTable::new()).ok();
        table
    }

    #[test_case]
    fn pid_allocation_scans_linearly_and_skips_occupied() {
        let table = fresh_table();
        let a = table.with_mut(|t| t.create(None)).unwrap().unwrap();
        let b = table.with_mut(|t| t.create(None)).unwrap().unwrap();
        assert_ne!(a, b);
        table.with_mut(|t| t.destroy(a));
        let c = table.with_mut(|t| t.create(None)).unwrap().unwrap();
        assert_eq!(c, a, "freed slot should be reused by the next scan");
    }

    #[test_case]
    fn exhausting_the_table_reports_resource_exhausted() {
        let table = fresh_table();
        // PID 0 is permanently reserved for idle, so only MAX_PROCESSES-1
        // slots are actually allocatable.
        let mut last = Ok(0);
        for _ in 0..MAX_PROCESSES - 1 {
            last = table.with_mut(|t| t.create(None)).unwrap();
        }
        assert!(last.is_ok());
        let overflow = table.with_mut(|t| t.create(None)).unwrap();
        assert!(matches!(
            overflow,
            Err(KernelError::ResourceExhausted { .. })
        ));
    }

    #[test_case]
    fn parent_records_child_pid() {
        let table = fresh_table();
        let parent = table.with_mut(|t| t.create(None)).unwrap().unwrap();
        let child = table.with_mut(|t| t.create(Some(parent))).unwrap().unwrap();
        let recorded = table
            .with(|t| t.slot(parent).map(|p| p.children[0]))
            .flatten()
            .flatten();
        assert_eq!(recorded, Some(child));
    }
}
