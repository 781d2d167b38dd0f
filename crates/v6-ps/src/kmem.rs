//! Reading the process table through the kernel-memory device.

use v6_abi::kmem::{
    tty_address, NPROC, NTTY, PROC_IMAGE_READ_LEN, PROC_RECORD_SIZE, PROC_TABLE, SWAP_DEV,
    TTY_RECORD_SIZE, TTY_TABLE,
};
use v6_abi::{DevNum, OpenMode};
use v6_devices::switch::major;
use v6_devices::DevSw;
use v6_proc::{Caller, ProcFlags, ProcStat, ProcState, TtyHeader};

use crate::cmdline::recover_command;
use crate::error::PsError;

/// `/dev/mem`.
pub const MEM: DevNum = DevNum::new(major::MEM, 0);

/// One line of `ps` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsEntry {
    /// The record as read from kernel memory.
    pub state: ProcState,
    /// Controlling terminal, when `p_ttyp` leads to a readable header.
    pub tty: Option<DevNum>,
    /// `None` when the image page could not be read or held no arguments.
    pub command: Option<String>,
}

/// An open handle on the kernel-memory device.
///
/// Every read checks the caller's error slot, so a device failure surfaces as
/// [`PsError::Device`] instead of a silent zero count.
#[derive(Debug)]
pub struct Kmem<'a, 'sys> {
    devsw: &'a DevSw,
    ctx: &'a mut Caller<'sys>,
    swap: Option<DevNum>,
}

impl<'a, 'sys> Kmem<'a, 'sys> {
    pub fn open(devsw: &'a DevSw, ctx: &'a mut Caller<'sys>) -> Result<Self, PsError> {
        devsw.open(&mut *ctx, MEM, OpenMode::READ);
        let mut kmem = Self {
            devsw,
            ctx,
            swap: None,
        };
        kmem.check("open")?;
        Ok(kmem)
    }

    pub fn close(mut self) -> Result<(), PsError> {
        self.devsw.close(&mut *self.ctx, MEM);
        self.check("close")
    }

    fn check(&mut self, op: &'static str) -> Result<(), PsError> {
        match self.ctx.take_error() {
            Some(errno) => Err(PsError::Device { op, errno }),
            None => Ok(()),
        }
    }

    /// Read `buf.len()` bytes at `offset`, returning what the device transferred.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, PsError> {
        let n = self.devsw.read(&mut *self.ctx, MEM, buf, offset);
        self.check("read")?;
        Ok(n)
    }

    /// Up to `len` bytes at `offset`, truncated to what the device returned.
    pub fn peek(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, PsError> {
        let mut buf = vec![0; len];
        let n = self.read_at(offset, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// The swap device number stored at `SWAP_DEV`.
    pub fn swap_device(&mut self) -> Result<DevNum, PsError> {
        let mut word = [0u8; 2];
        let found = self.read_at(SWAP_DEV, &mut word)?;
        if found != word.len() {
            return Err(PsError::SwapProbe { found });
        }
        let dev = DevNum::from_word(u16::from_le_bytes(word));
        self.swap = Some(dev);
        Ok(dev)
    }

    /// All occupied process-table slots.
    pub fn proc_table(&mut self) -> Result<Vec<ProcState>, PsError> {
        let mut table = vec![0u8; NPROC * PROC_RECORD_SIZE];
        self.read_at(PROC_TABLE, &mut table)?;
        let mut procs = Vec::new();
        for rec in table.chunks_exact(PROC_RECORD_SIZE) {
            let p = ProcState::from_bytes(rec)?;
            if p.stat != 0 {
                procs.push(p);
            }
        }
        Ok(procs)
    }

    /// The top page of a process image: from core when loaded, otherwise from swap.
    ///
    /// Returns `None` (after logging) when the read comes back short.
    pub fn image_page(&mut self, p: &ProcState) -> Result<Option<Vec<u8>>, PsError> {
        let Some(clicks) = (u64::from(p.addr) + u64::from(p.size)).checked_sub(8) else {
            tracing::warn!(pid = p.pid, size = p.size, "ps: image smaller than one page");
            return Ok(None);
        };
        let offset = clicks << 6;
        let mut page = vec![0u8; PROC_IMAGE_READ_LEN];

        let n = if p.flag.contains(ProcFlags::SLOAD) {
            self.read_at(offset, &mut page)?
        } else {
            let Some(swap) = self.swap else {
                tracing::warn!(pid = p.pid, "ps: process swapped out and no swap device");
                return Ok(None);
            };
            let n = self.devsw.read(&mut *self.ctx, swap, &mut page, offset);
            self.check("swap read")?;
            n
        };

        if n != page.len() {
            tracing::warn!(pid = p.pid, offset, got = n, "ps: short read of process image");
            return Ok(None);
        }
        Ok(Some(page))
    }

    /// Follow `p_ttyp` to a terminal header and return its device number.
    ///
    /// Addresses outside the terminal window, and headers the device does not return, give
    /// `None`.
    pub fn terminal(&mut self, ttyp: u16) -> Result<Option<DevNum>, PsError> {
        let addr = u64::from(ttyp);
        let in_window = addr >= TTY_TABLE
            && addr < tty_address(NTTY)
            && (addr - TTY_TABLE) % TTY_RECORD_SIZE as u64 == 0;
        if !in_window {
            return Ok(None);
        }
        let mut hdr = [0u8; TTY_RECORD_SIZE];
        if self.read_at(addr, &mut hdr)? != hdr.len() {
            return Ok(None);
        }
        Ok(Some(TtyHeader::from_bytes(&hdr)?.dev()))
    }

    /// Everything `ps` prints: probe swap, read the table, then each process's command and
    /// terminal.
    pub fn processes(&mut self) -> Result<Vec<PsEntry>, PsError> {
        self.swap_device()?;
        let table = self.proc_table()?;
        let mut entries = Vec::with_capacity(table.len());
        for state in table {
            let command = match state.stat() {
                Some(ProcStat::Zombie) => Some("<defunct>".to_owned()),
                _ if state.pid == 0 => Some("swapper".to_owned()),
                _ => self.image_page(&state)?.as_deref().and_then(recover_command),
            };
            let tty = self.terminal(state.ttyp)?;
            entries.push(PsEntry {
                state,
                tty,
                command,
            });
        }
        Ok(entries)
    }
}
