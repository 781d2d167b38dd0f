//! Process-wide kernel state and the per-call context devices operate on.

use v6_abi::kmem::{tty_address, NPROC, NTTY};
use v6_abi::Errno;

use crate::error::SystemError;
use crate::proc::Proc;
use crate::tty::Tty;

/// What a device may see and touch of the calling process and the kernel tables.
///
/// Devices report failure only through [`DeviceContext::set_last_error`]; the byte counts they
/// return stay meaningful either way.
pub trait DeviceContext {
    /// Record `err` in the caller's error slot.
    fn set_last_error(&mut self, err: Errno);

    /// The process table, in slot order.
    fn processes(&self) -> &[Proc];

    /// Memory image of process `index`.
    fn process_memory(&self, index: usize) -> Option<&[u8]> {
        self.processes().get(index).map(Proc::mem)
    }

    /// The terminal table, indexed by minor number.
    fn terminals(&self) -> &[Tty];

    fn terminal_mut(&mut self, index: usize) -> Option<&mut Tty>;
}

/// The in-core process and terminal tables.
///
/// Built once at startup and handed to every device call by reference. Nothing here is
/// synchronized; callers running devices from several threads must serialize access.
#[derive(Debug, Default, Clone)]
pub struct System {
    procs: Vec<Proc>,
    ttys: Vec<Tty>,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a process to the table, returning its slot index.
    pub fn add_proc(&mut self, proc: Proc) -> Result<usize, SystemError> {
        if self.procs.len() >= NPROC {
            return Err(SystemError::ProcTableFull { max: NPROC });
        }
        self.procs.push(proc);
        Ok(self.procs.len() - 1)
    }

    /// Append a terminal, returning its minor number.
    pub fn add_tty(&mut self, tty: Tty) -> Result<usize, SystemError> {
        if self.ttys.len() >= NTTY {
            return Err(SystemError::TtyTableFull { max: NTTY });
        }
        self.ttys.push(tty);
        Ok(self.ttys.len() - 1)
    }

    /// Make terminal `tty` the controlling terminal of process `proc`.
    ///
    /// `p_ttyp` holds the kernel-memory address of the terminal header so readers of the
    /// kernel-memory device can follow it.
    pub fn attach_tty(&mut self, proc: usize, tty: usize) -> Result<(), SystemError> {
        if tty >= self.ttys.len() {
            return Err(SystemError::NoSuchTty(tty));
        }
        let p = self.procs.get_mut(proc).ok_or(SystemError::NoSuchProc(proc))?;
        p.state.ttyp = tty_address(tty) as u16;
        Ok(())
    }

    pub fn procs(&self) -> &[Proc] {
        &self.procs
    }

    pub fn proc_mut(&mut self, index: usize) -> Option<&mut Proc> {
        self.procs.get_mut(index)
    }

    pub fn ttys(&self) -> &[Tty] {
        &self.ttys
    }

    pub fn tty_mut(&mut self, index: usize) -> Option<&mut Tty> {
        self.ttys.get_mut(index)
    }

    /// Borrow the tables for one device call.
    pub fn caller(&mut self) -> Caller<'_> {
        Caller::new(self)
    }
}

/// The calling process's view for one device operation: the shared tables plus its error slot.
#[derive(Debug)]
pub struct Caller<'a> {
    system: &'a mut System,
    error: Option<Errno>,
}

impl<'a> Caller<'a> {
    pub fn new(system: &'a mut System) -> Self {
        Self {
            system,
            error: None,
        }
    }

    pub fn last_error(&self) -> Option<Errno> {
        self.error
    }

    /// Return and clear the error slot, as the syscall return path does.
    pub fn take_error(&mut self) -> Option<Errno> {
        self.error.take()
    }

    pub fn system(&self) -> &System {
        &*self.system
    }
}

impl DeviceContext for Caller<'_> {
    fn set_last_error(&mut self, err: Errno) {
        self.error = Some(err);
    }

    fn processes(&self) -> &[Proc] {
        &self.system.procs
    }

    fn terminals(&self) -> &[Tty] {
        &self.system.ttys
    }

    fn terminal_mut(&mut self, index: usize) -> Option<&mut Tty> {
        self.system.ttys.get_mut(index)
    }
}
