use std::fmt;

use v6_abi::OpenMode;
use v6_proc::DeviceContext;

/// A character device as seen through the device switch.
///
/// Devices hold no per-caller state; anything they change lives behind `ctx`. Errors are
/// reported with [`DeviceContext::set_last_error`] and never stop the call from returning a
/// byte count.
pub trait Device: fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn open(&self, ctx: &mut dyn DeviceContext, minor: u8, mode: OpenMode);

    /// Fill `buf` from device offset `offset`; returns the number of bytes transferred.
    fn read(&self, ctx: &mut dyn DeviceContext, minor: u8, buf: &mut [u8], offset: u64) -> usize;

    /// Consume `buf` at device offset `offset`; returns the number of bytes transferred.
    fn write(&self, ctx: &mut dyn DeviceContext, minor: u8, buf: &[u8], offset: u64) -> usize;

    fn close(&self, ctx: &mut dyn DeviceContext, minor: u8);

    /// Terminal control (`stty`/`gtty`). `set` is applied before `get` is filled.
    fn sgtty(
        &self,
        ctx: &mut dyn DeviceContext,
        minor: u8,
        set: Option<&[u16; 3]>,
        get: Option<&mut [u16; 3]>,
    );
}
