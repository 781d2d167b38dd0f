use proptest::prelude::*;
use v6_abi::kmem::{PROC_IMAGE_BASE, PROC_IMAGE_READ_LEN, PROC_TABLE, SWAP_DEV, TTY_TABLE};
use v6_abi::{DevNum, Errno, OpenMode};
use v6_devices::{DevSw, Device, ErrDev, MemDev, NullDev};
use v6_proc::{Proc, ProcState, System, Tty};

fn small_system(nprocs: usize) -> System {
    let mut sys = System::new();
    for pid in 0..nprocs {
        let state = ProcState {
            stat: 1,
            pid: pid as u16,
            ..ProcState::default()
        };
        sys.add_proc(Proc::new(state, 1024)).unwrap();
    }
    sys.add_tty(Tty::new(DevNum::new(4, 0))).unwrap();
    sys
}

proptest! {
    #[test]
    fn resolve_never_fails_and_falls_back_to_slot_zero(major in any::<u8>()) {
        let sw = DevSw::standard();
        let dev = sw.resolve(major);
        if usize::from(major) >= sw.len() {
            prop_assert_eq!(dev.name(), sw.resolve(0).name());
        }
    }

    #[test]
    fn err_dev_fails_every_operation(
        minor in any::<u8>(),
        data in prop::collection::vec(any::<u8>(), 0..64),
        offset in any::<u64>()
    ) {
        let mut sys = System::new();
        let mut ctx = sys.caller();
        let mut buf = data.clone();

        ErrDev.open(&mut ctx, minor, OpenMode::READ);
        prop_assert_eq!(ctx.take_error(), Some(Errno::ENXIO));
        prop_assert_eq!(ErrDev.read(&mut ctx, minor, &mut buf, offset), 0);
        prop_assert_eq!(ctx.take_error(), Some(Errno::ENXIO));
        prop_assert_eq!(ErrDev.write(&mut ctx, minor, &data, offset), 0);
        prop_assert_eq!(ctx.take_error(), Some(Errno::ENXIO));
        ErrDev.close(&mut ctx, minor);
        prop_assert_eq!(ctx.take_error(), Some(Errno::ENXIO));
        ErrDev.sgtty(&mut ctx, minor, None, None);
        prop_assert_eq!(ctx.take_error(), Some(Errno::ENOTTY));
        prop_assert_eq!(buf, data);
    }

    #[test]
    fn null_dev_swallows_writes_and_reads_eof(
        minor in any::<u8>(),
        data in prop::collection::vec(any::<u8>(), 0..2048),
        offset in any::<u64>()
    ) {
        let mut sys = System::new();
        let mut ctx = sys.caller();
        let mut buf = data.clone();
        NullDev.open(&mut ctx, minor, OpenMode::WRITE);
        prop_assert_eq!(NullDev.write(&mut ctx, minor, &data, offset), data.len());
        prop_assert_eq!(NullDev.read(&mut ctx, minor, &mut buf, offset), 0);
        NullDev.close(&mut ctx, minor);
        prop_assert_eq!(ctx.last_error(), None);
    }

    #[test]
    fn mem_dev_refuses_all_writes(
        data in prop::collection::vec(any::<u8>(), 0..256),
        offset in any::<u64>()
    ) {
        let mut sys = small_system(2);
        let mut ctx = sys.caller();
        prop_assert_eq!(MemDev.write(&mut ctx, 0, &data, offset), 0);
        prop_assert_eq!(ctx.last_error(), Some(Errno::EPERM));
    }

    #[test]
    fn mem_dev_image_reads_need_alignment_and_exact_length(
        index in 0usize..4,
        misalign in 1u64..64,
        len in 0usize..1024
    ) {
        let mut sys = small_system(4);
        let mut ctx = sys.caller();
        let base = PROC_IMAGE_BASE + 64 * index as u64;

        let mut buf = vec![0u8; PROC_IMAGE_READ_LEN];
        prop_assert_eq!(MemDev.read(&mut ctx, 0, &mut buf, base), PROC_IMAGE_READ_LEN);
        prop_assert_eq!(MemDev.read(&mut ctx, 0, &mut buf, base + misalign), 0);

        prop_assume!(len != PROC_IMAGE_READ_LEN);
        let mut other = vec![0u8; len];
        prop_assert_eq!(MemDev.read(&mut ctx, 0, &mut other, base), 0);
    }

    #[test]
    fn mem_dev_swap_probe_needs_two_bytes(len in 0usize..64) {
        let mut sys = small_system(1);
        let mut ctx = sys.caller();
        let mut buf = vec![0u8; len];
        let n = MemDev.read(&mut ctx, 0, &mut buf, SWAP_DEV);
        if len == 2 {
            prop_assert_eq!(n, 2);
            prop_assert_eq!(buf, vec![1u8, 3]);
        } else {
            prop_assert_eq!(n, 0);
        }
    }

    #[test]
    fn mem_dev_snapshot_reports_serialized_length_for_any_buffer(
        nprocs in 0usize..8,
        len in 0usize..400
    ) {
        let mut sys = small_system(nprocs);
        let mut ctx = sys.caller();
        let full = MemDev::proc_snapshot(&ctx);
        let mut buf = vec![0xA5u8; len];
        let n = MemDev.read(&mut ctx, 0, &mut buf, PROC_TABLE);
        prop_assert_eq!(n, nprocs * ProcState::SIZE);
        let copied = n.min(len);
        prop_assert_eq!(&buf[..copied], &full[..copied]);
        prop_assert!(buf[copied..].iter().all(|&b| b == 0));
    }

    #[test]
    fn mem_dev_reads_are_pure_functions_of_offset_and_length(
        offset in prop_oneof![
            Just(SWAP_DEV),
            Just(PROC_TABLE),
            Just(TTY_TABLE),
            Just(PROC_IMAGE_BASE),
            any::<u64>()
        ],
        len in prop_oneof![Just(2usize), Just(32), Just(512), 0usize..1200]
    ) {
        let mut sys = small_system(3);
        let mut ctx = sys.caller();
        let mut a = vec![0u8; len];
        let mut b = vec![0xFFu8; len];
        let na = MemDev.read(&mut ctx, 0, &mut a, offset);
        let nb = MemDev.read(&mut ctx, 0, &mut b, offset);
        prop_assert_eq!(na, nb);
        // The snapshot reports its full length even when only a prefix fits.
        let filled = na.min(len);
        prop_assert_eq!(&a[..filled], &b[..filled]);
        prop_assert_eq!(ctx.last_error(), None);
    }
}
