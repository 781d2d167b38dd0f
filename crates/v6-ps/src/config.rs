//! JSON description of the system `v6-ps` inspects.
//!
//! ```json
//! {
//!   "terminals": [{}],
//!   "procs": [
//!     { "pid": 0, "stat": "sleep", "flags": 3, "pri": -100, "args": ["swapper"] },
//!     { "pid": 14, "ppid": 1, "tty": 0, "args": ["-sh"] }
//!   ]
//! }
//! ```
//!
//! Terminal `i` becomes minor `i` of the terminal major. Process slots are filled in order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use v6_abi::kmem::{NPROC, NTTY};
use v6_abi::DevNum;
use v6_devices::switch::major;
use v6_proc::{Proc, ProcFlags, ProcStat, ProcState, System, SystemError, Tty, TtyFlags};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid system description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{count} terminals configured, at most {max} supported")]
    TooManyTerminals { count: usize, max: usize },

    #[error("{count} processes configured, at most {max} supported")]
    TooManyProcs { count: usize, max: usize },

    #[error("process {pid}: image of {mem_size} bytes exceeds the {max}-byte limit")]
    ImageTooLarge {
        pid: u16,
        mem_size: usize,
        max: usize,
    },

    #[error("process {pid}: image does not fit below the top of core")]
    CoreExhausted { pid: u16 },

    #[error("process {pid}: terminal {tty} is not configured")]
    UnknownTty { pid: u16, tty: usize },

    #[error("process {pid}: {source}")]
    Proc {
        pid: u16,
        #[source]
        source: SystemError,
    },

    #[error(transparent)]
    System(#[from] SystemError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatConfig {
    #[default]
    Sleep,
    Wait,
    Run,
    Idle,
    Zombie,
    Stopped,
}

impl From<StatConfig> for ProcStat {
    fn from(s: StatConfig) -> Self {
        match s {
            StatConfig::Sleep => ProcStat::Sleep,
            StatConfig::Wait => ProcStat::Wait,
            StatConfig::Run => ProcStat::Run,
            StatConfig::Idle => ProcStat::Idle,
            StatConfig::Zombie => ProcStat::Zombie,
            StatConfig::Stopped => ProcStat::Stopped,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerminalConfig {
    /// `t_flags`; `ECHO | CRMOD` when absent.
    #[serde(default)]
    pub flags: Option<u16>,
    #[serde(default)]
    pub speeds: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcConfig {
    pub pid: u16,
    #[serde(default)]
    pub ppid: u16,
    #[serde(default)]
    pub uid: u8,
    #[serde(default)]
    pub stat: StatConfig,
    /// Raw `p_flag` bits.
    #[serde(default)]
    pub flags: u8,
    #[serde(default)]
    pub pri: i8,
    #[serde(default)]
    pub nice: i8,
    /// Index into `terminals`.
    #[serde(default)]
    pub tty: Option<usize>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_mem_size")]
    pub mem_size: usize,
    #[serde(default)]
    pub wchan: u16,
}

fn default_mem_size() -> usize {
    4096
}

/// Largest image `p_size` can describe: 64 K clicks of 64 bytes.
pub const MAX_MEM_SIZE: usize = u16::MAX as usize * 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemConfig {
    #[serde(default)]
    pub terminals: Vec<TerminalConfig>,
    #[serde(default)]
    pub procs: Vec<ProcConfig>,
}

impl SystemConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// A freshly booted system: the swapper, `init`, a login shell on the console and the
    /// `ps` it is running.
    pub fn demo() -> Self {
        let entry = |pid, ppid, stat, args: &[&str]| ProcConfig {
            pid,
            ppid,
            uid: 0,
            stat,
            flags: 0,
            pri: 0,
            nice: 0,
            tty: None,
            args: args.iter().map(|s| (*s).to_owned()).collect(),
            mem_size: default_mem_size(),
            wchan: 0,
        };
        Self {
            terminals: vec![TerminalConfig::default()],
            procs: vec![
                ProcConfig {
                    flags: ProcFlags::SSYS.bits(),
                    pri: -100,
                    wchan: 0o5206,
                    ..entry(0, 0, StatConfig::Sleep, &["swapper"])
                },
                ProcConfig {
                    pri: 40,
                    wchan: 0o5234,
                    ..entry(1, 0, StatConfig::Wait, &["/etc/init"])
                },
                ProcConfig {
                    pri: 40,
                    tty: Some(0),
                    wchan: 0o5262,
                    ..entry(14, 1, StatConfig::Wait, &["-sh"])
                },
                ProcConfig {
                    pri: 90,
                    tty: Some(0),
                    ..entry(15, 14, StatConfig::Run, &["ps"])
                },
            ],
        }
    }

    /// Build the in-core tables. Image addresses are assigned in slot order.
    pub fn build(&self) -> Result<System, ConfigError> {
        if self.terminals.len() > NTTY {
            return Err(ConfigError::TooManyTerminals {
                count: self.terminals.len(),
                max: NTTY,
            });
        }
        if self.procs.len() > NPROC {
            return Err(ConfigError::TooManyProcs {
                count: self.procs.len(),
                max: NPROC,
            });
        }

        let mut sys = System::new();
        for (minor, t) in self.terminals.iter().enumerate() {
            let mut tty = Tty::new(DevNum::new(major::TTY, minor as u8));
            if let Some(flags) = t.flags {
                tty.header_mut().flags = TtyFlags::from_bits_retain(flags);
            }
            tty.header_mut().speeds = t.speeds;
            sys.add_tty(tty)?;
        }

        let mut next_addr: u16 = 0o1000;
        for pc in &self.procs {
            let clicks = u16::try_from(pc.mem_size.div_ceil(64)).map_err(|_| {
                ConfigError::ImageTooLarge {
                    pid: pc.pid,
                    mem_size: pc.mem_size,
                    max: MAX_MEM_SIZE,
                }
            })?;
            let state = ProcState {
                stat: ProcStat::from(pc.stat) as u8,
                flag: ProcFlags::from_bits_retain(pc.flags) | ProcFlags::SLOAD,
                pri: pc.pri,
                uid: pc.uid,
                nice: pc.nice,
                pid: pc.pid,
                ppid: pc.ppid,
                addr: next_addr,
                size: clicks,
                wchan: pc.wchan,
                ..ProcState::default()
            };
            next_addr = next_addr
                .checked_add(clicks)
                .ok_or(ConfigError::CoreExhausted { pid: pc.pid })?;

            let proc_err = |source| ConfigError::Proc {
                pid: pc.pid,
                source,
            };
            let p = Proc::new(state, pc.mem_size)
                .with_args(pc.args.as_slice())
                .map_err(proc_err)?;
            let idx = sys.add_proc(p).map_err(proc_err)?;
            if let Some(tty) = pc.tty {
                if tty >= self.terminals.len() {
                    return Err(ConfigError::UnknownTty { pid: pc.pid, tty });
                }
                sys.attach_tty(idx, tty).map_err(proc_err)?;
            }
        }
        Ok(sys)
    }
}
