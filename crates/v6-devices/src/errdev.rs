//! The device behind every unassigned major number.

use v6_abi::{Errno, OpenMode};
use v6_proc::DeviceContext;

use crate::device::Device;

/// Fails everything: `ENXIO` for I/O, `ENOTTY` for terminal control.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrDev;

impl Device for ErrDev {
    fn name(&self) -> &'static str {
        "err"
    }

    fn open(&self, ctx: &mut dyn DeviceContext, _minor: u8, _mode: OpenMode) {
        ctx.set_last_error(Errno::ENXIO);
    }

    fn read(
        &self,
        ctx: &mut dyn DeviceContext,
        _minor: u8,
        _buf: &mut [u8],
        _offset: u64,
    ) -> usize {
        ctx.set_last_error(Errno::ENXIO);
        0
    }

    fn write(&self, ctx: &mut dyn DeviceContext, _minor: u8, _buf: &[u8], _offset: u64) -> usize {
        ctx.set_last_error(Errno::ENXIO);
        0
    }

    fn close(&self, ctx: &mut dyn DeviceContext, _minor: u8) {
        ctx.set_last_error(Errno::ENXIO);
    }

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
