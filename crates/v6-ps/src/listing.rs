//! Text rendering of `ps` output and kernel-memory dumps.

use std::fmt::{self, Write as _};

use crate::kmem::PsEntry;

/// Terminal column: `tty<minor>`, or `?` for none.
struct TtyName<'a>(&'a PsEntry);

impl fmt::Display for TtyName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.tty {
            Some(dev) => f.pad(&format!("tty{}", dev.minor)),
            None => f.pad("?"),
        }
    }
}

fn command(e: &PsEntry) -> &str {
    e.command.as_deref().unwrap_or("?")
}

/// `PID TTY CMD`.
pub fn short(entries: &[PsEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>5} {:<5} CMD", "PID", "TTY");
    for e in entries {
        let _ = writeln!(out, "{:>5} {:<5} {}", e.state.pid, TtyName(e), command(e));
    }
    out
}

/// `F S UID PID PPID PRI NI ADDR SZ WCHAN TTY CMD`, numeric kernel fields in octal.
pub fn long(entries: &[PsEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3} S {:>3} {:>5} {:>5} {:>4} {:>3} {:>6} {:>4} {:>6} {:<5} CMD",
        "F", "UID", "PID", "PPID", "PRI", "NI", "ADDR", "SZ", "WCHAN", "TTY"
    );
    for e in entries {
        let p = &e.state;
        let stat = p.stat().map_or('?', |s| s.letter());
        let wchan = if p.wchan == 0 {
            String::new()
        } else {
            format!("{:o}", p.wchan)
        };
        let _ = writeln!(
            out,
            "{:>3o} {} {:>3} {:>5} {:>5} {:>4} {:>3} {:>6o} {:>4} {:>6} {:<5} {}",
            p.flag.bits(),
            stat,
            p.uid,
            p.pid,
            p.ppid,
            p.pri,
            p.nice,
            p.addr,
            p.size,
            wchan,
            TtyName(e),
            command(e)
        );
    }
    out
}

/// Sixteen bytes per line: octal address, hex bytes, printable ASCII.
pub fn hexdump(offset: u64, bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, row) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:07o} ", offset + 16 * i as u64);
        for b in row {
            let _ = write!(out, " {b:02x}");
        }
        for _ in row.len()..16 {
            out.push_str("   ");
        }
        out.push_str("  |");
        out.extend(row.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}
