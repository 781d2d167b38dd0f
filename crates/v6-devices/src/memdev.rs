//! Kernel memory (`/dev/mem`).
//!
//! Tools such as `ps` read kernel structures at the addresses the kernel listing gives them.
//! The emulated kernel has no such memory, so this device decodes the requested
//! `(offset, length)` pair against a handful of disjoint windows (see [`v6_abi::kmem`]) and
//! serializes the matching structure on the fly:
//!
//! | offset | length | contents |
//! |---|---|---|
//! | `SWAP_DEV` | 2 | swap device number |
//! | `PROC_TABLE` | any | process table snapshot with synthetic image addresses |
//! | `PROC_IMAGE_BASE + 64 * i` | 512 | last 512 bytes of process `i`'s image |
//! | `TTY_TABLE + 32 * i` | 32 | header of terminal `i` |
//!
//! Anything else reads as zero bytes. The device is read-only.

use v6_abi::kmem::{
    synthetic_proc_addr, PROC_IMAGE_BASE, PROC_IMAGE_READ_LEN, PROC_IMAGE_STRIDE, PROC_TABLE,
    SWAP_DEV, SWAP_DEVNUM, SYNTHETIC_IMAGE_SIZE, TTY_RECORD_SIZE, TTY_TABLE,
};
use v6_abi::{Errno, OpenMode};
use v6_proc::{DeviceContext, ProcFlags, ProcState};

use crate::device::Device;

#[derive(Debug, Default, Clone, Copy)]
pub struct MemDev;

impl MemDev {
    /// Serialize the process table the way `ps` expects to find it.
    ///
    /// Each record is a copy with `SLOAD` set and the image moved to a synthetic address:
    /// `ps` reads from `(p_addr + p_size - 8) << 6`, so `p_size = 8` and
    /// `p_addr = PROC_IMAGE_BASE / 64 + i` point it at [`PROC_IMAGE_BASE`]` + 64 * i`. The live
    /// table is not modified.
    pub fn proc_snapshot(ctx: &dyn DeviceContext) -> Vec<u8> {
        let procs = ctx.processes();
        let mut out = Vec::with_capacity(procs.len() * ProcState::SIZE);
        for (i, p) in procs.iter().enumerate() {
            let mut state = p.state;
            state.flag |= ProcFlags::SLOAD;
            state.addr = synthetic_proc_addr(i);
            state.size = SYNTHETIC_IMAGE_SIZE;
            state.encode_into(&mut out);
        }
        out
    }

    fn read_swap_dev(buf: &mut [u8]) -> usize {
        buf.copy_from_slice(&SWAP_DEVNUM.to_le_bytes());
        buf.len()
    }

    /// Copies as much of the snapshot as fits, but always reports the full serialized length.
    fn read_proc_table(ctx: &dyn DeviceContext, buf: &mut [u8]) -> usize {
        let snapshot = Self::proc_snapshot(ctx);
        buf.fill(0);
        let n = snapshot.len().min(buf.len());
        buf[..n].copy_from_slice(&snapshot[..n]);
        tracing::debug!(
            procs = ctx.processes().len(),
            bytes = snapshot.len(),
            copied = n,
            "kmem: process table snapshot"
        );
        snapshot.len()
    }

    /// Index of the process whose image window starts at `offset`, if the read is a valid
    /// image read.
    fn proc_image_index(ctx: &dyn DeviceContext, offset: u64, len: usize) -> Option<usize> {
        if len != PROC_IMAGE_READ_LEN || offset < PROC_IMAGE_BASE {
            return None;
        }
        let rel = offset - PROC_IMAGE_BASE;
        if rel % PROC_IMAGE_STRIDE != 0 {
            return None;
        }
        let index = usize::try_from(rel / PROC_IMAGE_STRIDE).ok()?;
        (index < ctx.processes().len()).then_some(index)
    }

    /// Copy the top of a process image. Images shorter than a read are zero-padded.
    fn read_proc_image(ctx: &dyn DeviceContext, index: usize, buf: &mut [u8]) -> usize {
        let mem = ctx.process_memory(index).unwrap_or_default();
        let tail = &mem[mem.len().saturating_sub(buf.len())..];
        buf.fill(0);
        buf[..tail.len()].copy_from_slice(tail);
        buf.len()
    }

    fn tty_index(ctx: &dyn DeviceContext, offset: u64, len: usize) -> Option<usize> {
        if len != TTY_RECORD_SIZE || offset < TTY_TABLE {
            return None;
        }
        let rel = offset - TTY_TABLE;
        if rel % TTY_RECORD_SIZE as u64 != 0 {
            return None;
        }
        let index = usize::try_from(rel / TTY_RECORD_SIZE as u64).ok()?;
        (index < ctx.terminals().len()).then_some(index)
    }

    fn read_tty(ctx: &dyn DeviceContext, index: usize, buf: &mut [u8]) -> usize {
        let header = ctx.terminals()[index].header().to_bytes();
        buf.fill(0);
        buf[..header.len()].copy_from_slice(&header);
        header.len()
    }
}

impl Device for MemDev {
    fn name(&self) -> &'static str {
        "mem"
    }

    fn open(&self, _ctx: &mut dyn DeviceContext, _minor: u8, _mode: OpenMode) {}

    fn read(&self, ctx: &mut dyn DeviceContext, _minor: u8, buf: &mut [u8], offset: u64) -> usize {
        let ctx = &*ctx;
        if offset == SWAP_DEV && buf.len() == 2 {
            return Self::read_swap_dev(buf);
        }
        if offset == PROC_TABLE {
            return Self::read_proc_table(ctx, buf);
        }
        if let Some(index) = Self::proc_image_index(ctx, offset, buf.len()) {
            return Self::read_proc_image(ctx, index, buf);
        }
        if let Some(index) = Self::tty_index(ctx, offset, buf.len()) {
            return Self::read_tty(ctx, index, buf);
        }
        tracing::trace!(offset, len = buf.len(), "kmem: read outside mapped windows");
        0
    }

    fn write(&self, ctx: &mut dyn DeviceContext, _minor: u8, _buf: &[u8], _offset: u64) -> usize {
        ctx.set_last_error(Errno::EPERM);
        0
    }

    fn close(&self, _ctx: &mut dyn DeviceContext, _minor: u8) {}

    fn sgtty(
        &self,
        ctx: &mut dyn DeviceContext,
        _minor: u8,
        _set: Option<&[u16; 3]>,
        _get: Option<&mut [u16; 3]>,
    ) {
        ctx.set_last_error(Errno::ENOTTY);
    }
}
