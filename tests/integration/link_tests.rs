//! Board-link framing over the pipe transport.

use std::thread;

use keyfob::error::LinkError;
use keyfob::link::{Framer, MsgKind, Transport};

use crate::mock_hw::duplex;

#[test]
fn frames_cross_the_pipe_intact() {
    let (a, b) = duplex();
    let mut sender = Framer::new(a);
    let mut receiver = Framer::new(b);

    sender.send(MsgKind::Unlock, b"unlock").unwrap();
    sender.send(MsgKind::Start, &[0u8; 12]).unwrap();

    let msg = receiver.receive().unwrap();
    assert_eq!(msg.kind, MsgKind::Unlock);
    assert_eq!(msg.payload.as_slice(), b"unlock");

    let msg = receiver.receive().unwrap();
    assert_eq!(msg.kind, MsgKind::Start);
    assert_eq!(msg.payload.len(), 12);
}

#[test]
fn receive_blocks_until_peer_sends() {
    let (a, b) = duplex();
    let mut receiver = Framer::new(a);

    let peer = thread::spawn(move || {
        let mut sender = Framer::new(b);
        sender.send(MsgKind::Ack, &[1]).unwrap();
        sender // keep the pipe open until the receiver is done
    });

    let msg = receiver.receive().unwrap();
    assert_eq!(msg.kind, MsgKind::Ack);
    drop(peer.join().unwrap());
}

#[test]
fn silent_peer_is_a_transport_error_not_a_hang() {
    let (a, _b) = duplex();
    let mut receiver = Framer::new(a);
    assert_eq!(receiver.receive(), Err(LinkError::Transport));
}

#[test]
fn garbage_between_frames_is_skipped() {
    let (a, b) = duplex();
    let mut sender = Framer::new(a);
    let mut receiver = Framer::new(b);

    // Junk with no valid message tag, then a real frame.
    sender.transport_mut().write(&[0x00, 0x13, 0x37]).unwrap();
    sender.send(MsgKind::Pair, &[0xAB; 24]).unwrap();

    let msg = receiver.receive().unwrap();
    assert_eq!(msg.kind, MsgKind::Pair);
    assert_eq!(msg.payload.as_slice(), &[0xAB; 24]);
}
