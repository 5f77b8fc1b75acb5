// Licensed under the Apache-2.0 license

use crate::common::{build_model, device_entropy, host_entropy, reset_msg, walk_to_success};
use vaultkey_api::{
    ConfirmPurpose, DeviceMsg, FailureKind, HostMsg, PinEntryReq, ResetFlags,
};
use vaultkey_hw_model::{HwModel, ModelError};

fn pin_entry(digits: &[u8]) -> HostMsg {
    HostMsg::PinEntry(PinEntryReq::new(digits).unwrap())
}

#[test]
fn test_reset_device_pin() {
    // PIN, passphrase, display random.
    let flags =
        ResetFlags::PIN_PROTECTION | ResetFlags::PASSPHRASE_PROTECTION | ResetFlags::DISPLAY_RANDOM;
    let mut model = build_model(&device_entropy(128), Some(&[4, 9]));

    let resp = model.send(&reset_msg(128, flags));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PinFirst));

    let words = walk_to_success(&mut model, resp, Some(b"654"), &host_entropy(128));
    assert_eq!(words.len(), 12);

    let features = model.initialize().unwrap();
    assert!(features.initialized());
    assert!(features.pin_protection());
    assert!(features.passphrase_protection());
    assert!(!features.needs_backup());
}

#[test]
fn test_pin_requested_twice_before_entropy() {
    let mut model = build_model(&device_entropy(128), Some(&[0, 1]));

    let resp = model.send(&reset_msg(128, ResetFlags::PIN_PROTECTION));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PinFirst));
    // No entropy exists yet: the PIN gates run first.
    assert_eq!(
        model.debug_read_reset_entropy(),
        Err(ModelError::NoSessionEntropy)
    );

    let resp = model.send(&pin_entry(b"654"));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PinConfirm));
    assert_eq!(
        model.debug_read_reset_entropy(),
        Err(ModelError::NoSessionEntropy)
    );

    let resp = model.send(&pin_entry(b"654"));
    let DeviceMsg::EntropyRequest(req) = resp else {
        panic!("expected entropy request after the PIN gates, got {resp:?}");
    };
    assert_eq!(req.byte_length, 16);
    assert!(model.debug_read_reset_entropy().is_ok());
}

#[test]
fn test_failed_pin() {
    let mut model = build_model(&device_entropy(128), Some(&[0, 1]));

    let resp = model.send(&reset_msg(128, ResetFlags::PIN_PROTECTION));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PinFirst));

    let resp = model.send(&pin_entry(b"654"));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PinConfirm));

    // Second entry differs: the whole session dies, and the entropy phase
    // was never reached.
    let resp = model.send(&pin_entry(b"456"));
    assert_eq!(resp.failure_kind(), Some(FailureKind::PinMismatch));
    assert_eq!(
        model.debug_read_reset_entropy(),
        Err(ModelError::NoSessionEntropy)
    );
    assert!(!model.initialize().unwrap().initialized());

    // No partial state survives; a fresh attempt starts from the top.
    let resp = model.send(&reset_msg(128, ResetFlags::PIN_PROTECTION));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PinFirst));
}

#[test]
fn test_pin_length_mismatch_is_a_mismatch() {
    let mut model = build_model(&device_entropy(128), Some(&[0, 1]));

    model.send(&reset_msg(128, ResetFlags::PIN_PROTECTION));
    model.send(&pin_entry(b"654"));
    let resp = model.send(&pin_entry(b"6544"));
    assert_eq!(resp.failure_kind(), Some(FailureKind::PinMismatch));
}
