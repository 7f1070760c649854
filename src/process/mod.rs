//! Process table and control block.

pub mod pcb;
pub mod table;

pub use pcb::{Pid, Priority, ProcessControlBlock, ProcessState, RegisterSnapshot, IDLE_PID};
pub use table::{
    create, create_named, current, destroy, exit, init, kernel_esp, kernel_stack_top,
    process_list, set_current, set_kernel_esp, set_state, state,
};
