//! Stream adapter behavior over the loopback provider.

use bytes::Bytes;
use proptest::prelude::*;
use serialhub::{LoopbackProvider, SerialIo, SerialIoProvider};
use std::rc::Rc;

fn setup() -> (Rc<LoopbackProvider>, SerialIo<LoopbackProvider>) {
    let siop = Rc::new(LoopbackProvider::new());
    let sio = SerialIo::new(Rc::clone(&siop));
    (siop, sio)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_short_read_per_chunk() {
    let (siop, sio) = setup();
    for chunk in [&b"BUF1\n"[..], b"BUF2\n", b"BUF3\n", b"BUF4\n"] {
        siop.do_recv(Bytes::copy_from_slice(chunk));
    }

    let mut waiting = sio.in_waiting();
    let plan: [(usize, &[u8]); 6] = [
        (5, b"BUF1\n"),
        (2, b"BU"),
        (3, b"F2\n"),
        (3, b"BUF"),
        (20, b"3\n"),
        (20, b"BUF4\n"),
    ];
    for (capacity, want) in plan {
        let mut buf = vec![0u8; capacity];
        let n = sio.read_into(&mut buf).unwrap().unwrap();
        assert_eq!(&buf[..n], want);
        assert_eq!(sio.in_waiting(), waiting - n);
        waiting -= n;
    }
    assert_eq!(waiting, 0);
}

#[test]
fn test_empty_chunks_contribute_nothing() {
    let (siop, sio) = setup();
    siop.do_recv(Bytes::new());
    siop.do_recv(Bytes::from_static(b"DATA VAL"));
    siop.do_recv(Bytes::new());

    let mut buf = [0u8; 5];
    assert_eq!(sio.read_into(&mut buf).unwrap(), Some(5));
    assert_eq!(&buf, b"DATA ");
    assert_eq!(sio.read_into(&mut buf).unwrap(), Some(3));
    assert_eq!(&buf[..3], b"VAL");
    assert_eq!(sio.read_into(&mut buf).unwrap(), Some(0));
    assert_eq!(sio.queued_chunks(), 0);
}

#[test]
fn test_closed_toggle() {
    let (siop, sio) = setup();
    siop.set_closed(true);
    assert!(sio.write(b"x").unwrap_err().is_closed());
    assert!(sio.read_into(&mut [0u8; 4]).unwrap_err().is_closed());

    siop.set_closed(false);
    assert_eq!(sio.write(b"x").unwrap(), Some(1));
    assert_eq!(sio.read(Some(4)).unwrap().unwrap(), &b"x"[..]);
}

#[test]
fn test_callback_none() {
    let siop = Rc::new(LoopbackProvider::new());
    assert!(!siop.has_callback());
    siop.do_recv(Bytes::from_static(b"Some lost data"));

    let sio = SerialIo::new(Rc::clone(&siop));
    assert!(siop.has_callback());
    siop.do_recv(Bytes::from_static(b"OK"));
    assert_eq!(sio.in_waiting(), 2);

    siop.on_recv(None);
    assert!(!siop.has_callback());
    siop.do_recv(Bytes::from_static(b"LOST"));
    assert_eq!(sio.in_waiting(), 2);
    assert_eq!(sio.out_waiting(), 0);
}

#[test]
fn test_second_stream_replaces_first() {
    let siop = Rc::new(LoopbackProvider::new());
    let first = SerialIo::new(Rc::clone(&siop));
    let second = SerialIo::new(Rc::clone(&siop));

    siop.do_recv(Bytes::from_static(b"abc"));
    assert_eq!(first.in_waiting(), 0);
    assert_eq!(second.in_waiting(), 3);
}

#[test]
fn test_dyn_provider() {
    let siop: Rc<dyn SerialIoProvider> = Rc::new(LoopbackProvider::new());
    let sio = SerialIo::new(siop);
    assert_eq!(sio.write(b"dyn").unwrap(), Some(3));
    assert_eq!(sio.readall().unwrap().unwrap(), &b"dyn"[..]);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_in_waiting_and_order(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..32),
        capacity in 1usize..96,
    ) {
        let (siop, sio) = setup();
        let mut expected = Vec::new();
        for chunk in &chunks {
            siop.do_recv(Bytes::copy_from_slice(chunk));
            expected.extend_from_slice(chunk);
            prop_assert_eq!(sio.in_waiting(), expected.len());
        }

        let mut drained = Vec::new();
        let mut buf = vec![0u8; capacity];
        loop {
            let before = sio.in_waiting();
            let n = sio.read_into(&mut buf).unwrap().unwrap();
            if n == 0 {
                break;
            }
            prop_assert!(n <= capacity);
            prop_assert_eq!(sio.in_waiting(), before - n);
            drained.extend_from_slice(&buf[..n]);
        }

        prop_assert_eq!(drained, expected);
        prop_assert_eq!(sio.in_waiting(), 0);
    }

    #[test]
    fn prop_loopback_roundtrip(data in prop::collection::vec(any::<u8>(), 1..512)) {
        let (_siop, sio) = setup();
        prop_assert_eq!(sio.write(&data).unwrap(), Some(data.len()));
        let back = sio.readall().unwrap().unwrap();
        prop_assert_eq!(back.as_ref(), data.as_slice());
    }

    #[test]
    fn prop_reset_empties(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..8)) {
        let (siop, sio) = setup();
        for chunk in chunks {
            siop.do_recv(Bytes::from(chunk));
        }
        sio.reset_input_buffer();
        prop_assert_eq!(sio.in_waiting(), 0);
        sio.reset_input_buffer();
        prop_assert_eq!(sio.in_waiting(), 0);
    }
}
