#![forbid(unsafe_code)]

//! Character-device switch and the pseudo-devices behind it.
//!
//! Every device implements [`Device`]; [`DevSw`] maps a major number to one of them and falls
//! back to [`ErrDev`] for anything it does not know. Failures never unwind: a device returns a
//! byte count and leaves an [`Errno`](v6_abi::Errno) in the caller's context.

pub mod device;
pub mod errdev;
pub mod memdev;
pub mod nulldev;
pub mod switch;
pub mod ttydev;

pub use device::Device;
pub use errdev::ErrDev;
pub use memdev::MemDev;
pub use nulldev::NullDev;
pub use switch::{DevSw, DevSwBuilder, DevSwError};
pub use ttydev::TtyDev;
