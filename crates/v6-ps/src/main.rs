#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use v6_devices::DevSw;
use v6_ps::{listing, Kmem, SystemConfig};

#[derive(Debug, Parser)]
#[command(
    name = "v6-ps",
    version,
    about = "List the processes of an emulated V6 system through its kernel-memory device"
)]
struct Args {
    /// JSON system description. A small demo system is used when absent.
    ///
    /// Environment variable: `V6_PS_CONFIG`.
    #[arg(long, global = true, env = "V6_PS_CONFIG")]
    config: Option<PathBuf>,

    /// Long listing: flags, state, uid, parent, priority, nice, address, size and wait channel.
    #[arg(short = 'l', long = "long")]
    long: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dump an arbitrary read of kernel memory.
    Peek {
        /// Kernel address: decimal, `0x` hex, or `0o`/leading-zero octal.
        #[arg(long, value_parser = parse_address)]
        offset: u64,

        /// Bytes to request.
        #[arg(long, default_value_t = 16)]
        len: usize,
    },
}

fn parse_address(s: &str) -> Result<u64, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else if let Some(oct) = s.strip_prefix("0o") {
        u64::from_str_radix(oct, 8)
    } else if s.len() > 1 && s.starts_with('0') {
        u64::from_str_radix(&s[1..], 8)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SystemConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SystemConfig::demo(),
    };
    let mut system = config.build().context("invalid system description")?;
    tracing::debug!(
        procs = system.procs().len(),
        ttys = system.ttys().len(),
        "system built"
    );

    let devsw = DevSw::standard();
    let mut caller = system.caller();
    let mut kmem = Kmem::open(&devsw, &mut caller).context("cannot open kernel memory")?;

    let out = match args.command {
        Some(Command::Peek { offset, len }) => {
            let bytes = kmem.peek(offset, len).context("kernel memory read failed")?;
            listing::hexdump(offset, &bytes)
        }
        None => {
            let entries = kmem.processes().context("cannot read process table")?;
            if args.long {
                listing::long(&entries)
            } else {
                listing::short(&entries)
            }
        }
    };
    kmem.close().context("cannot close kernel memory")?;

    io::stdout()
        .lock()
        .write_all(out.as_bytes())
        .context("failed to write listing")?;
    Ok(())
}
