#![forbid(unsafe_code)]

//! Values shared between the emulated kernel state and its device layer.
//!
//! This crate exists so the process/terminal tables (`v6-proc`), the device switch
//! (`v6-devices`) and userspace-side readers (`v6-ps`) agree on numbers that must match
//! exactly at runtime: error codes, device numbers and the kernel-memory address map.

pub mod dev;
pub mod errno;
pub mod kmem;

pub use dev::{DevNum, OpenMode};
pub use errno::Errno;
