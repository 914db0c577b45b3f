//! The full unlock/start exchange between a car and a paired fob.

use std::thread;

use keyfob::adapters::nvs::NvsStorage;
use keyfob::car::{Car, CarSecrets, UnlockOutcome};
use keyfob::fob::{EnableOutcome, Fob};
use keyfob::link::Framer;
use keyfob::ports::SECRET_LEN;
use keyfob::proto::{Ack, EnableRequest, PairingInfo};

use crate::mock_hw::{CaptureHost, duplex, id, provisioned_vault};

fn car() -> Car {
    Car::new(CarSecrets {
        car_id: id(b"CAR0001"),
        password: id(b"unlock"),
    })
}

fn provisioning() -> PairingInfo {
    PairingInfo {
        car_id: id(b"CAR0001"),
        password: id(b"unlock"),
        pin: id(b"123456"),
    }
}

fn paired_fob(storage: &mut NvsStorage) -> Fob {
    Fob::boot(storage, Some(&provisioning())).unwrap()
}

fn enable(fob: &mut Fob, storage: &mut NvsStorage, feature_id: u8) -> EnableOutcome {
    let request = EnableRequest {
        car_id: id(b"CAR0001"),
        feature_id,
    };
    fob.enable_feature(storage, &request).unwrap()
}

/// The exchange is strictly ping-pong, so both halves can run on one
/// thread: each send completes before the peer's matching receive.
#[test]
fn unlock_then_start_discloses_in_order() {
    let (fob_pipe, car_pipe) = duplex();
    let mut fob_link = Framer::new(fob_pipe);
    let mut car_link = Framer::new(car_pipe);
    let vault = provisioned_vault();
    let mut host = CaptureHost::default();

    let mut storage = NvsStorage::new().unwrap();
    let mut fob = paired_fob(&mut storage);
    assert_eq!(enable(&mut fob, &mut storage, 3), EnableOutcome::Enabled);
    assert_eq!(enable(&mut fob, &mut storage, 1), EnableOutcome::Enabled);

    let car = car();
    assert!(fob.request_unlock(&mut fob_link).unwrap());
    assert_eq!(
        car.handle_unlock(&mut car_link, &vault, &mut host).unwrap(),
        UnlockOutcome::Granted
    );
    assert_eq!(fob.receive_ack(&mut fob_link).unwrap(), Ack::Success);
    assert!(fob.request_start(&mut fob_link).unwrap());
    car.handle_start(&mut car_link, &vault, &mut host).unwrap();

    // Unlock secret first, then the feature secrets in enablement order.
    assert_eq!(
        host.disclosures,
        vec![
            vec![b'U'; SECRET_LEN],
            vec![3u8; SECRET_LEN],
            vec![1u8; SECRET_LEN],
        ]
    );
}

#[test]
fn end_to_end_button_press_against_live_responder() {
    let (fob_pipe, car_pipe) = duplex();

    let car_side = thread::spawn(move || {
        let mut link = Framer::new(car_pipe);
        let vault = provisioned_vault();
        let mut host = CaptureHost::default();
        car().step(&mut link, &vault, &mut host).unwrap();
        host.disclosures
    });

    let mut storage = NvsStorage::new().unwrap();
    let mut fob = paired_fob(&mut storage);
    enable(&mut fob, &mut storage, 2);

    let mut link = Framer::new(fob_pipe);
    let ack = fob.unlock_and_start(&mut link).unwrap();
    assert_eq!(ack, Some(Ack::Success));

    let disclosures = car_side.join().unwrap();
    assert_eq!(
        disclosures,
        vec![vec![b'U'; SECRET_LEN], vec![2u8; SECRET_LEN]]
    );
}

#[test]
fn wrong_password_is_refused_with_no_disclosure() {
    let (fob_pipe, car_pipe) = duplex();
    let mut fob_link = Framer::new(fob_pipe);
    let mut car_link = Framer::new(car_pipe);
    let vault = provisioned_vault();
    let mut host = CaptureHost::default();

    // A fob paired with a different password than this car's.
    let mut storage = NvsStorage::new().unwrap();
    let mut wrong = provisioning();
    wrong.password = id(b"unloc");
    let fob = Fob::boot(&mut storage, Some(&wrong)).unwrap();

    assert!(fob.request_unlock(&mut fob_link).unwrap());
    assert_eq!(
        car().handle_unlock(&mut car_link, &vault, &mut host).unwrap(),
        UnlockOutcome::Denied
    );
    assert_eq!(fob.receive_ack(&mut fob_link).unwrap(), Ack::Failure);
    assert!(host.disclosures.is_empty());
}

#[test]
fn start_for_another_car_discloses_nothing() {
    let (fob_pipe, car_pipe) = duplex();
    let mut fob_link = Framer::new(fob_pipe);
    let mut car_link = Framer::new(car_pipe);
    let vault = provisioned_vault();
    let mut host = CaptureHost::default();

    let mut storage = NvsStorage::new().unwrap();
    let mut other = provisioning();
    other.car_id = id(b"CAR0002");
    let mut fob = Fob::boot(&mut storage, Some(&other)).unwrap();
    let request = EnableRequest {
        car_id: id(b"CAR0002"),
        feature_id: 1,
    };
    fob.enable_feature(&mut storage, &request).unwrap();

    assert!(fob.request_start(&mut fob_link).unwrap());
    car().handle_start(&mut car_link, &vault, &mut host).unwrap();

    assert!(host.disclosures.is_empty());
    // No reply of any kind came back.
    drop(car_link);
    assert!(fob_link.receive().is_err());
}

#[test]
fn unlock_without_enabled_features_starts_bare() {
    let (fob_pipe, car_pipe) = duplex();

    let car_side = thread::spawn(move || {
        let mut link = Framer::new(car_pipe);
        let vault = provisioned_vault();
        let mut host = CaptureHost::default();
        car().step(&mut link, &vault, &mut host).unwrap();
        host.disclosures
    });

    let mut storage = NvsStorage::new().unwrap();
    let fob = paired_fob(&mut storage);
    let mut link = Framer::new(fob_pipe);
    assert_eq!(fob.unlock_and_start(&mut link).unwrap(), Some(Ack::Success));

    // Only the unlock secret comes out; the START carried zero features.
    assert_eq!(car_side.join().unwrap(), vec![vec![b'U'; SECRET_LEN]]);
}
