//! Pairing between two fobs over the board link.

use std::thread;

use keyfob::adapters::nvs::NvsStorage;
use keyfob::fob::{Fob, InitiateOutcome, PairOutcome};
use keyfob::link::Framer;
use keyfob::proto::PairingInfo;

use crate::mock_hw::{duplex, id};

fn provisioning() -> PairingInfo {
    PairingInfo {
        car_id: id(b"CAR0001"),
        password: id(b"PASSW0RD"),
        pin: id(b"123456"),
    }
}

#[test]
fn paired_fob_provisions_a_fresh_one() {
    let (initiator_pipe, responder_pipe) = duplex();

    let initiator = thread::spawn(move || {
        let mut storage = NvsStorage::new().unwrap();
        let fob = Fob::boot(&mut storage, Some(&provisioning())).unwrap();
        let mut link = Framer::new(initiator_pipe);
        fob.pair_as_initiator(&mut link, b"123456").unwrap()
    });

    let mut storage = NvsStorage::new().unwrap();
    let mut fresh = Fob::boot(&mut storage, None).unwrap();
    assert!(!fresh.is_paired());

    let mut link = Framer::new(responder_pipe);
    let outcome = fresh.pair_as_responder(&mut link, &mut storage).unwrap();

    assert_eq!(outcome, PairOutcome::Paired);
    assert_eq!(initiator.join().unwrap(), InitiateOutcome::Sent);
    assert_eq!(fresh.record().pairing, provisioning());
    assert_eq!(fresh.record().features.car_id, id(b"CAR0001"));
    // The feature list does not transfer; a newly paired fob starts empty.
    assert!(fresh.record().features.features.is_empty());

    // And the new state survives a reboot.
    let rebooted = Fob::boot(&mut storage, None).unwrap();
    assert!(rebooted.is_paired());
}

#[test]
fn wrong_pin_leaves_responder_waiting() {
    let (initiator_pipe, responder_pipe) = duplex();

    let initiator = thread::spawn(move || {
        let mut storage = NvsStorage::new().unwrap();
        let fob = Fob::boot(&mut storage, Some(&provisioning())).unwrap();
        let mut link = Framer::new(initiator_pipe);
        let outcome = fob.pair_as_initiator(&mut link, b"654321").unwrap();
        (outcome, link) // hold the pipe open past the responder's wait
    });

    let mut storage = NvsStorage::new().unwrap();
    let mut fresh = Fob::boot(&mut storage, None).unwrap();
    let mut link = Framer::new(responder_pipe);

    // Nothing was sent, so the responder's bounded wait expires unpaired.
    assert!(fresh.pair_as_responder(&mut link, &mut storage).is_err());
    assert!(!fresh.is_paired());

    let (outcome, _pipe) = initiator.join().unwrap();
    assert_eq!(outcome, InitiateOutcome::WrongPin);
}

#[test]
fn second_pairing_attempt_is_refused_locally() {
    let (initiator_pipe, responder_pipe) = duplex();

    let mut storage = NvsStorage::new().unwrap();
    let mut fob = Fob::boot(&mut storage, Some(&provisioning())).unwrap();

    let mut link = Framer::new(responder_pipe);
    let outcome = fob.pair_as_responder(&mut link, &mut storage).unwrap();
    assert_eq!(outcome, PairOutcome::AlreadyPaired);

    // The refusal never touched the wire.
    drop(link);
    let mut other = Framer::new(initiator_pipe);
    assert!(other.receive().is_err());
}
