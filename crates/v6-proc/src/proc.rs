//! The `proc` table entry and the process image behind it.

use bitflags::bitflags;
use v6_abi::kmem::PROC_RECORD_SIZE;

use crate::codec::{RecordReader, RecordWriter};
use crate::error::{RecordError, SystemError};

/// Scheduling state (`p_stat`). Zero marks an unused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProcStat {
    Sleep = 1,
    Wait = 2,
    Run = 3,
    Idle = 4,
    Zombie = 5,
    Stopped = 6,
}

impl ProcStat {
    pub const fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            1 => Self::Sleep,
            2 => Self::Wait,
            3 => Self::Run,
            4 => Self::Idle,
            5 => Self::Zombie,
            6 => Self::Stopped,
            _ => return None,
        })
    }

    /// Single-letter code used by `ps -l`.
    pub const fn letter(self) -> char {
        match self {
            Self::Sleep => 'S',
            Self::Wait => 'W',
            Self::Run => 'R',
            Self::Idle => 'I',
            Self::Zombie => 'Z',
            Self::Stopped => 'T',
        }
    }
}

bitflags! {
    /// `p_flag` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProcFlags: u8 {
        /// In core.
        const SLOAD = 0o1;
        /// Scheduling process.
        const SSYS = 0o2;
        /// Process cannot be swapped.
        const SLOCK = 0o4;
        /// Process is being swapped out.
        const SSWAP = 0o10;
        /// Process is being traced.
        const STRC = 0o20;
        /// Another tracing flag.
        const SWTED = 0o40;
    }
}

/// One process-table slot, laid out exactly as the kernel's `struct proc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcState {
    pub stat: u8,
    pub flag: ProcFlags,
    pub pri: i8,
    pub sig: u8,
    pub uid: u8,
    pub time: u8,
    pub cpu: u8,
    pub nice: i8,
    /// Kernel-memory address of the controlling terminal's header, 0 if none.
    pub ttyp: u16,
    pub pid: u16,
    pub ppid: u16,
    /// Image address in 64-byte clicks.
    pub addr: u16,
    /// Image size in 64-byte clicks.
    pub size: u16,
    pub wchan: u16,
    pub textp: u16,
}

impl Default for ProcState {
    fn default() -> Self {
        Self {
            stat: 0,
            flag: ProcFlags::empty(),
            pri: 0,
            sig: 0,
            uid: 0,
            time: 0,
            cpu: 0,
            nice: 0,
            ttyp: 0,
            pid: 0,
            ppid: 0,
            addr: 0,
            size: 0,
            wchan: 0,
            textp: 0,
        }
    }
}

impl ProcState {
    pub const SIZE: usize = PROC_RECORD_SIZE;

    pub fn stat(&self) -> Option<ProcStat> {
        ProcStat::from_raw(self.stat)
    }

    pub fn to_bytes(&self) -> [u8; PROC_RECORD_SIZE] {
        RecordWriter::<PROC_RECORD_SIZE>::new()
            .u8(self.stat)
            .u8(self.flag.bits())
            .i8(self.pri)
            .u8(self.sig)
            .u8(self.uid)
            .u8(self.time)
            .u8(self.cpu)
            .i8(self.nice)
            .u16_le(self.ttyp)
            .u16_le(self.pid)
            .u16_le(self.ppid)
            .u16_le(self.addr)
            .u16_le(self.size)
            .u16_le(self.wchan)
            .u16_le(self.textp)
            .finish()
    }

    /// Append the serialized record to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let mut r = RecordReader::new("proc", bytes, Self::SIZE)?;
        Ok(Self {
            stat: r.u8(),
            flag: ProcFlags::from_bits_retain(r.u8()),
            pri: r.i8(),
            sig: r.u8(),
            uid: r.u8(),
            time: r.u8(),
            cpu: r.u8(),
            nice: r.i8(),
            ttyp: r.u16_le(),
            pid: r.u16_le(),
            ppid: r.u16_le(),
            addr: r.u16_le(),
            size: r.u16_le(),
            wchan: r.u16_le(),
            textp: r.u16_le(),
        })
    }
}

/// A process: its table entry plus its memory image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proc {
    pub state: ProcState,
    mem: Vec<u8>,
}

impl Proc {
    /// A process with a zeroed image of `mem_size` bytes.
    pub fn new(state: ProcState, mem_size: usize) -> Self {
        Self::from_image(state, vec![0; mem_size])
    }

    pub fn from_image(state: ProcState, mem: Vec<u8>) -> Self {
        Self { state, mem }
    }

    pub fn mem(&self) -> &[u8] {
        &self.mem
    }

    pub fn mem_mut(&mut self) -> &mut [u8] {
        &mut self.mem
    }

    /// Lay out an argument vector at the top of the image, as `exec` leaves it:
    ///
    /// ```text
    /// argc, argv[0] .. argv[n-1], -1, "arg0\0arg1\0..." (padded to a word)
    /// ```
    ///
    /// Pointers are image offsets truncated to the 16-bit address space.
    pub fn with_args<S: AsRef<str>>(mut self, args: &[S]) -> Result<Self, SystemError> {
        let mut strings = Vec::new();
        let mut offsets = Vec::with_capacity(args.len());
        for arg in args {
            offsets.push(strings.len());
            strings.extend_from_slice(arg.as_ref().as_bytes());
            strings.push(0);
        }
        if strings.len() % 2 != 0 {
            strings.push(0);
        }

        let header_len = 2 * (args.len() + 2);
        let needed = header_len + strings.len();
        let available = self.mem.len();
        if needed > available {
            return Err(SystemError::ArgsTooLarge { needed, available });
        }

        let strings_start = available - strings.len();
        let mut words = Vec::with_capacity(args.len() + 2);
        words.push(args.len() as u16);
        words.extend(offsets.iter().map(|off| (strings_start + off) as u16));
        words.push(0xFFFF);

        let header_start = strings_start - header_len;
        for (i, w) in words.iter().enumerate() {
            let at = header_start + 2 * i;
            self.mem[at..at + 2].copy_from_slice(&w.to_le_bytes());
        }
        self.mem[strings_start..].copy_from_slice(&strings);
        Ok(self)
    }
}
