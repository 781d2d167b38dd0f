//! `/dev/null`, also used as the placeholder swap device.

use v6_abi::{Errno, OpenMode};
use v6_proc::DeviceContext;

use crate::device::Device;

/// Reads hit end-of-file immediately; writes are accepted and discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDev;

impl Device for NullDev {
    fn name(&self) -> &'static str {
        "null"
    }

    fn open(&self, _ctx: &mut dyn DeviceContext, _minor: u8, _mode: OpenMode) {}

    fn read(
        &self,
        _ctx: &mut dyn DeviceContext,
        _minor: u8,
        _buf: &mut [u8],
        _offset: u64,
    ) -> usize {
        0
    }

    fn write(&self, _ctx: &mut dyn DeviceContext, _minor: u8, buf: &[u8], _offset: u64) -> usize {
        buf.len()
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

#[cfg(test)]
mod tests {
    use super::*;
    use v6_proc::System;

    #[test]
    fn reads_are_eof_and_writes_are_swallowed() {
        let mut sys = System::new();
        let mut ctx = sys.caller();

        NullDev.open(&mut ctx, 0, OpenMode::READ | OpenMode::WRITE);
        let mut buf = [1u8; 512];
        assert_eq!(NullDev.read(&mut ctx, 0, &mut buf, 0), 0);
        assert_eq!(buf, [1u8; 512]);
        assert_eq!(NullDev.write(&mut ctx, 0, b"discard me", 1234), 10);
        assert_eq!(NullDev.write(&mut ctx, 0, &[], 0), 0);
        NullDev.close(&mut ctx, 0);
        assert_eq!(ctx.last_error(), None);
    }

    #[test]
    fn sgtty_is_not_a_terminal() {
        let mut sys = System::new();
        let mut ctx = sys.caller();
        NullDev.sgtty(&mut ctx, 0, Some(&[0; 3]), None);
        assert_eq!(ctx.last_error(), Some(Errno::ENOTTY));
    }
}
