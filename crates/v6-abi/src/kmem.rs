//! Kernel-memory address map.
//!
//! Readers of the kernel-memory device locate kernel structures by fixed addresses, the way the
//! original tools used the kernel's namelist. Every window below must stay disjoint from the
//! others; new regions need their own window.
//!
//! Layout (octal, as in the kernel listings):
//! - `0o1414`: swap device number (2 bytes)
//! - `0o2000..0o2440`: terminal headers, [`TTY_RECORD_SIZE`] bytes each
//! - `0o5206..0o7322`: process table, [`PROC_RECORD_SIZE`] bytes per slot
//! - `0o10000..`: process images, one [`PROC_IMAGE_STRIDE`] step per process

use crate::dev::DevNum;

/// Address of the swap device number, as listed in the kernel.
pub const SWAP_DEV: u64 = 0o1414;

/// Device number reported by the swap probe: the null-backed swap slot.
pub const SWAP_DEVNUM: DevNum = DevNum::new(3, 1);

/// Address of the process table, as listed in the kernel.
pub const PROC_TABLE: u64 = 0o5206;

/// Maximum number of process slots.
pub const NPROC: usize = 50;

/// Size of one serialized `proc` record.
pub const PROC_RECORD_SIZE: usize = 22;

/// Base of the terminal header window.
pub const TTY_TABLE: u64 = 0o2000;

/// Size of one serialized `tty` header.
pub const TTY_RECORD_SIZE: usize = 16 * 2;

/// Number of terminal headers the window can hold.
pub const NTTY: usize = 9;

/// Base of the synthetic process-image window.
pub const PROC_IMAGE_BASE: u64 = 0o10000;

/// Distance between consecutive process images (one memory click).
pub const PROC_IMAGE_STRIDE: u64 = 64;

/// The only length accepted for a process-image read.
pub const PROC_IMAGE_READ_LEN: usize = 512;

/// Image size written into every snapshot record, in clicks.
///
/// `ps` reads from `(p_addr + p_size - 8) << 6`; a size of 8 leaves just `p_addr << 6`.
pub const SYNTHETIC_IMAGE_SIZE: u16 = 8;

/// Kernel-memory address of terminal `index`'s header.
pub const fn tty_address(index: usize) -> u64 {
    TTY_TABLE + (index * TTY_RECORD_SIZE) as u64
}

/// Kernel-memory address of process `index`'s image.
pub const fn proc_image_address(index: usize) -> u64 {
    PROC_IMAGE_BASE + PROC_IMAGE_STRIDE * index as u64
}

/// Synthetic `p_addr` (in clicks) for process `index`.
pub const fn synthetic_proc_addr(index: usize) -> u16 {
    (PROC_IMAGE_BASE / PROC_IMAGE_STRIDE) as u16 + index as u16
}
