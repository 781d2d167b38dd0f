//! Terminals. The minor number indexes the terminal table.

use v6_abi::{Errno, OpenMode};
use v6_proc::{DeviceContext, Tty};

use crate::device::Device;

#[derive(Debug, Default, Clone, Copy)]
pub struct TtyDev;

impl TtyDev {
    fn tty<'a>(ctx: &'a mut dyn DeviceContext, minor: u8) -> Option<&'a mut Tty> {
        if usize::from(minor) >= ctx.terminals().len() {
            ctx.set_last_error(Errno::ENXIO);
            return None;
        }
        ctx.terminal_mut(usize::from(minor))
    }
}

impl Device for TtyDev {
    fn name(&self) -> &'static str {
        "tty"
    }

    fn open(&self, ctx: &mut dyn DeviceContext, minor: u8, _mode: OpenMode) {
        if let Some(tty) = Self::tty(ctx, minor) {
            tty.open();
        }
    }

    fn read(&self, ctx: &mut dyn DeviceContext, minor: u8, buf: &mut [u8], _offset: u64) -> usize {
        Self::tty(ctx, minor).map_or(0, |tty| tty.read(buf))
    }

    fn write(&self, ctx: &mut dyn DeviceContext, minor: u8, buf: &[u8], _offset: u64) -> usize {
        Self::tty(ctx, minor).map_or(0, |tty| tty.write(buf))
    }

    fn close(&self, ctx: &mut dyn DeviceContext, minor: u8) {
        if let Some(tty) = Self::tty(ctx, minor) {
            tty.close();
        }
    }

    fn sgtty(
        &self,
        ctx: &mut dyn DeviceContext,
        minor: u8,
        set: Option<&[u16; 3]>,
        get: Option<&mut [u16; 3]>,
    ) {
        let Some(tty) = Self::tty(ctx, minor) else {
            return;
        };
        if let Some(v) = set {
            tty.stty(v);
        }
        if let Some(out) = get {
            *out = tty.gtty();
        }
    }
}
