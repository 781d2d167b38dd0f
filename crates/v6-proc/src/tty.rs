//! Terminal state: the `tty` header that leaves the kernel through the kernel-memory device,
//! plus the character queues behind it.
//!
//! Input goes through the classic line discipline: `CRMOD` maps CR to NL, `LCASE` folds
//! upper case, `ECHO` copies input to the output queue, and canonical reads deliver one line at
//! a time after applying the erase and kill characters. `RAW` bypasses all of it.

use std::collections::VecDeque;

use bitflags::bitflags;
use v6_abi::kmem::TTY_RECORD_SIZE;
use v6_abi::DevNum;

use crate::codec::{RecordReader, RecordWriter};
use crate::error::RecordError;

/// Default erase character.
pub const CERASE: u8 = b'#';
/// Default kill character.
pub const CKILL: u8 = b'@';
/// End of transmission: delimits a line without being delivered.
pub const CEOT: u8 = 0o004;

bitflags! {
    /// `t_flags`: modes settable by `stty`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TtyFlags: u16 {
        const HUPCL = 0o1;
        const XTABS = 0o2;
        const LCASE = 0o4;
        const ECHO = 0o10;
        const CRMOD = 0o20;
        const RAW = 0o40;
        const ODDP = 0o100;
        const EVENP = 0o200;
    }
}

bitflags! {
    /// `t_state`: internal state, not settable by `stty`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TtyState: u8 {
        const TIMEOUT = 0o1;
        const WOPEN = 0o2;
        const ISOPEN = 0o4;
        const SSTART = 0o10;
        const CARR_ON = 0o20;
        const BUSY = 0o40;
        const ASLEEP = 0o100;
    }
}

/// Character-list header: count plus first/last block pointers.
///
/// Only the count is meaningful in the emulation; the pointers stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clist {
    pub cc: i16,
    pub cf: u16,
    pub cl: u16,
}

/// The 32-byte `struct tty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtyHeader {
    pub rawq: Clist,
    pub canq: Clist,
    pub outq: Clist,
    pub flags: TtyFlags,
    pub addr: u16,
    pub delct: u8,
    pub col: u8,
    pub erase: u8,
    pub kill: u8,
    pub state: TtyState,
    pub ch: u8,
    pub speeds: u16,
    pub dev: u16,
}

impl TtyHeader {
    pub const SIZE: usize = TTY_RECORD_SIZE;

    pub fn new(dev: DevNum) -> Self {
        Self {
            rawq: Clist::default(),
            canq: Clist::default(),
            outq: Clist::default(),
            flags: TtyFlags::ECHO | TtyFlags::CRMOD,
            addr: 0,
            delct: 0,
            col: 0,
            erase: CERASE,
            kill: CKILL,
            state: TtyState::empty(),
            ch: 0,
            speeds: 0,
            dev: dev.to_word(),
        }
    }

    pub fn dev(&self) -> DevNum {
        DevNum::from_word(self.dev)
    }

    pub fn to_bytes(&self) -> [u8; TTY_RECORD_SIZE] {
        let mut w = RecordWriter::<TTY_RECORD_SIZE>::new();
        for q in [&self.rawq, &self.canq, &self.outq] {
            w.i16_le(q.cc).u16_le(q.cf).u16_le(q.cl);
        }
        w.u16_le(self.flags.bits())
            .u16_le(self.addr)
            .u8(self.delct)
            .u8(self.col)
            .u8(self.erase)
            .u8(self.kill)
            .u8(self.state.bits())
            .u8(self.ch)
            .u16_le(self.speeds)
            .u16_le(self.dev);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let mut r = RecordReader::new("tty", bytes, Self::SIZE)?;
        let mut clist = || Clist {
            cc: r.i16_le(),
            cf: r.u16_le(),
            cl: r.u16_le(),
        };
        let rawq = clist();
        let canq = clist();
        let outq = clist();
        Ok(Self {
            rawq,
            canq,
            outq,
            flags: TtyFlags::from_bits_retain(r.u16_le()),
            addr: r.u16_le(),
            delct: r.u8(),
            col: r.u8(),
            erase: r.u8(),
            kill: r.u8(),
            state: TtyState::from_bits_retain(r.u8()),
            ch: r.u8(),
            speeds: r.u16_le(),
            dev: r.u16_le(),
        })
    }
}

/// A terminal: its header plus raw input, canonical input and output queues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tty {
    header: TtyHeader,
    rawq: VecDeque<u8>,
    canq: VecDeque<u8>,
    outq: Vec<u8>,
}

impl Tty {
    pub fn new(dev: DevNum) -> Self {
        Self {
            header: TtyHeader::new(dev),
            rawq: VecDeque::new(),
            canq: VecDeque::new(),
            outq: Vec::new(),
        }
    }

    pub fn header(&self) -> &TtyHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut TtyHeader {
        &mut self.header
    }

    pub fn is_open(&self) -> bool {
        self.header.state.contains(TtyState::ISOPEN)
    }

    /// Mark the line open. The first open installs the default erase and kill characters.
    pub fn open(&mut self) {
        if !self.is_open() {
            self.header.erase = CERASE;
            self.header.kill = CKILL;
        }
        self.header.state |= TtyState::ISOPEN | TtyState::CARR_ON;
    }

    pub fn close(&mut self) {
        self.header.state.remove(TtyState::ISOPEN);
    }

    /// Characters arriving from the terminal side.
    pub fn push_input(&mut self, bytes: &[u8]) {
        let flags = self.header.flags;
        for &b in bytes {
            let mut c = b & 0o177;
            if c == b'\r' && flags.contains(TtyFlags::CRMOD) {
                c = b'\n';
            }
            if flags.contains(TtyFlags::LCASE) {
                c = c.to_ascii_lowercase();
            }
            self.rawq.push_back(c);
            if !flags.contains(TtyFlags::RAW) && (c == b'\n' || c == CEOT) {
                self.header.delct = self.header.delct.saturating_add(1);
            }
            if flags.contains(TtyFlags::ECHO) {
                self.output(c);
            }
        }
        self.sync_counts();
    }

    /// Deliver input into `buf`; returns the byte count.
    ///
    /// Canonical mode hands out at most one line per call and returns 0 while no complete line
    /// is buffered.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        if self.header.flags.contains(TtyFlags::RAW) {
            let n = buf.len().min(self.rawq.len());
            for (dst, src) in buf.iter_mut().zip(self.rawq.drain(..n)) {
                *dst = src;
            }
            self.sync_counts();
            return n;
        }

        if self.canq.is_empty() {
            self.canonicalize();
        }
        let n = buf.len().min(self.canq.len());
        for (dst, src) in buf.iter_mut().zip(self.canq.drain(..n)) {
            *dst = src;
        }
        self.sync_counts();
        n
    }

    /// Move one delimited line from the raw queue to the canonical queue.
    fn canonicalize(&mut self) {
        let Some(end) = self.rawq.iter().position(|&c| c == b'\n' || c == CEOT) else {
            return;
        };
        let (erase, kill) = (self.header.erase, self.header.kill);
        for c in self.rawq.drain(..=end) {
            match c {
                CEOT => {}
                c if c == erase => {
                    self.canq.pop_back();
                }
                c if c == kill => self.canq.clear(),
                c => self.canq.push_back(c),
            }
        }
        self.header.delct = self.header.delct.saturating_sub(1);
    }

    /// Characters written by a process. Returns the number of bytes consumed.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        for &b in bytes {
            self.output(b);
        }
        self.sync_counts();
        bytes.len()
    }

    fn output(&mut self, c: u8) {
        let flags = self.header.flags;
        let mut c = c & 0o177;
        if flags.contains(TtyFlags::RAW) {
            self.outq.push(c);
            return;
        }
        if flags.contains(TtyFlags::LCASE) {
            c = c.to_ascii_uppercase();
        }
        match c {
            b'\t' if flags.contains(TtyFlags::XTABS) => {
                let spaces = 8 - (self.header.col % 8);
                for _ in 0..spaces {
                    self.output(b' ');
                }
                return;
            }
            b'\n' if flags.contains(TtyFlags::CRMOD) => {
                self.outq.push(b'\r');
                self.outq.push(b'\n');
                self.header.col = 0;
                return;
            }
            _ => {}
        }
        self.outq.push(c);
        self.header.col = match c {
            b'\n' | b'\r' => 0,
            0o010 => self.header.col.saturating_sub(1),
            b'\t' => (self.header.col | 7).wrapping_add(1),
            c if c >= b' ' => self.header.col.wrapping_add(1),
            _ => self.header.col,
        };
    }

    /// Output bytes not yet consumed by the host.
    pub fn pending_output(&self) -> &[u8] {
        &self.outq
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        let out = std::mem::take(&mut self.outq);
        self.sync_counts();
        out
    }

    /// `gtty`: `[speeds, erase | kill << 8, flags]`.
    pub fn gtty(&self) -> [u16; 3] {
        [
            self.header.speeds,
            u16::from(self.header.erase) | (u16::from(self.header.kill) << 8),
            self.header.flags.bits(),
        ]
    }

    /// `stty`: the inverse of [`Tty::gtty`]. Pending input is flushed first.
    pub fn stty(&mut self, v: &[u16; 3]) {
        self.rawq.clear();
        self.canq.clear();
        self.header.delct = 0;
        self.header.speeds = v[0];
        self.header.erase = v[1] as u8;
        self.header.kill = (v[1] >> 8) as u8;
        self.header.flags = TtyFlags::from_bits_retain(v[2]);
        self.sync_counts();
    }

    fn sync_counts(&mut self) {
        let cc = |len: usize| i16::try_from(len).unwrap_or(i16::MAX);
        self.header.rawq.cc = cc(self.rawq.len());
        self.header.canq.cc = cc(self.canq.len());
        self.header.outq.cc = cc(self.outq.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Tty {
        Tty::new(DevNum::new(4, 0))
    }

    #[test]
    fn header_serializes_to_thirty_two_bytes() {
        let mut h = TtyHeader::new(DevNum::new(4, 2));
        h.rawq.cc = 3;
        h.outq.cc = -1;
        h.speeds = 0x0F0F;
        h.state = TtyState::ISOPEN | TtyState::CARR_ON;
        let bytes = h.to_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[0..2], &[3, 0]);
        assert_eq!(&bytes[12..14], &[0xFF, 0xFF]);
        assert_eq!(&bytes[18..20], &[0o30, 0]);
        assert_eq!(bytes[24], b'#');
        assert_eq!(bytes[25], b'@');
        assert_eq!(bytes[26], 0o24);
        assert_eq!(&bytes[28..30], &[0x0F, 0x0F]);
        assert_eq!(&bytes[30..32], &[2, 4]);
        assert_eq!(TtyHeader::from_bytes(&bytes), Ok(h));
    }

    #[test]
    fn canonical_read_applies_erase_and_kill() {
        let mut t = console();
        t.push_input(b"lx#s\n");
        let mut buf = [0u8; 16];
        assert_eq!(t.read(&mut buf), 3);
        assert_eq!(&buf[..3], b"ls\n");

        t.push_input(b"rm -rf /@date\n");
        let n = t.read(&mut buf);
        assert_eq!(&buf[..n], b"date\n");
    }

    #[test]
    fn canonical_read_waits_for_a_delimiter() {
        let mut t = console();
        t.push_input(b"partial");
        let mut buf = [0u8; 16];
        assert_eq!(t.read(&mut buf), 0);
        assert_eq!(t.header().rawq.cc, 7);
        t.push_input(b"\r");
        assert_eq!(t.read(&mut buf), 8);
        assert_eq!(&buf[..8], b"partial\n");
        assert_eq!(t.header().delct, 0);
    }

    #[test]
    fn short_buffer_leaves_rest_of_line_for_next_read() {
        let mut t = console();
        t.push_input(b"hello\n");
        let mut buf = [0u8; 2];
        assert_eq!(t.read(&mut buf), 2);
        assert_eq!(&buf, b"he");
        assert_eq!(t.header().canq.cc, 4);
        let mut rest = [0u8; 8];
        assert_eq!(t.read(&mut rest), 4);
        assert_eq!(&rest[..4], b"llo\n");
    }

    #[test]
    fn eot_delimits_without_being_delivered() {
        let mut t = console();
        t.push_input(&[CEOT]);
        let mut buf = [0u8; 4];
        assert_eq!(t.read(&mut buf), 0);
        assert_eq!(t.header().rawq.cc, 0);
    }

    #[test]
    fn echo_and_crmod_on_output() {
        let mut t = console();
        t.push_input(b"a\r");
        assert_eq!(t.pending_output(), b"a\r\n");
        t.take_output();
        assert_eq!(t.write(b"hi\n"), 3);
        assert_eq!(t.take_output(), b"hi\r\n");
        assert_eq!(t.header().outq.cc, 0);
    }

    #[test]
    fn raw_mode_passes_bytes_through() {
        let mut t = console();
        t.stty(&[0, u16::from(CERASE) | (u16::from(CKILL) << 8), TtyFlags::RAW.bits()]);
        t.push_input(b"a#\r");
        let mut buf = [0u8; 2];
        assert_eq!(t.read(&mut buf), 2);
        assert_eq!(&buf, b"a#");
        t.write(b"\n");
        assert_eq!(t.pending_output(), b"\n");
    }

    #[test]
    fn lcase_folds_input_and_output() {
        let mut t = console();
        t.header_mut().flags = TtyFlags::LCASE;
        t.push_input(b"LS\n");
        let mut buf = [0u8; 4];
        assert_eq!(t.read(&mut buf), 3);
        assert_eq!(&buf[..3], b"ls\n");
        t.write(b"ok");
        assert_eq!(t.pending_output(), b"OK");
    }

    #[test]
    fn xtabs_expands_to_next_stop() {
        let mut t = console();
        t.header_mut().flags = TtyFlags::XTABS;
        t.write(b"ab\tc");
        assert_eq!(t.pending_output(), b"ab      c");
        assert_eq!(t.header().col, 9);
    }

    #[test]
    fn gtty_stty_round_trip() {
        let mut t = console();
        let v = [0o1111, u16::from(b'\x08') | (u16::from(b'\x15') << 8), 0o30];
        t.stty(&v);
        assert_eq!(t.gtty(), v);
        assert_eq!(t.header().erase, 0x08);
        assert_eq!(t.header().kill, 0x15);
    }

    #[test]
    fn open_installs_defaults_once() {
        let mut t = console();
        t.header_mut().erase = 0x08;
        t.open();
        assert_eq!(t.header().erase, CERASE);
        t.header_mut().erase = 0x08;
        t.open();
        assert_eq!(t.header().erase, 0x08);
        assert!(t.header().state.contains(TtyState::CARR_ON));
        t.close();
        assert!(!t.is_open());
    }
}
