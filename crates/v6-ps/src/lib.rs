#![forbid(unsafe_code)]

//! A process lister that knows the kernel only through its kernel-memory device.
//!
//! [`Kmem`] opens the device through a [`DevSw`](v6_devices::DevSw), probes the swap device,
//! pulls the process table and each loaded process's top-of-stack page, and resolves
//! controlling terminals from their headers. [`listing`] renders the result; [`config`] builds
//! the [`System`](v6_proc::System) being inspected.

pub mod cmdline;
pub mod config;
pub mod error;
pub mod kmem;
pub mod listing;

pub use cmdline::recover_command;
pub use config::{ConfigError, ProcConfig, StatConfig, SystemConfig, TerminalConfig};
pub use error::PsError;
pub use kmem::{Kmem, PsEntry};
