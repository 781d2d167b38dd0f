#![forbid(unsafe_code)]

//! In-core process and terminal tables of the emulated kernel.
//!
//! The device layer only ever sees this state through [`DeviceContext`]; records that leave the
//! kernel through the kernel-memory device are serialized field by field with the exact layout
//! of the historical `proc` and `tty` structures.

mod codec;
pub mod error;
pub mod proc;
pub mod system;
pub mod tty;

pub use error::{RecordError, SystemError};
pub use proc::{Proc, ProcFlags, ProcStat, ProcState};
pub use system::{Caller, DeviceContext, System};
pub use tty::{Clist, Tty, TtyFlags, TtyHeader, TtyState};
