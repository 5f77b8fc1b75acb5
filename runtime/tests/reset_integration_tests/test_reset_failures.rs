// Licensed under the Apache-2.0 license

use crate::common::{
    build_model, device_entropy, expected_phrase, host_entropy, reset_msg, walk_to_success,
};
use vaultkey_api::{
    ConfirmPurpose, DeviceMsg, EntropyAckReq, FailureKind, HostMsg, ResetFlags, WordAnswerReq,
    WORDS_PER_PAGE,
};
use vaultkey_hw_model::{HwModel, ModelError};

#[test]
fn test_quiz_failure_leaves_device_uninitialized() {
    let device = device_entropy(128);
    let host = host_entropy(128);
    let mut model = build_model(&device, Some(&[3, 8]));

    let resp = model.send(&reset_msg(128, ResetFlags::empty()));
    assert!(matches!(resp, DeviceMsg::EntropyRequest(_)));
    let phrase = expected_phrase(&device, &host);
    let resp = model.send(&HostMsg::EntropyAck(EntropyAckReq::new(&host).unwrap()));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::SafetyWarning));

    // Ack the warning and every page, then the review confirmation.
    let mut resp = model.send(&HostMsg::ButtonAck);
    while matches!(resp, DeviceMsg::WordPage(_)) {
        resp = model.send(&HostMsg::ButtonAck);
    }
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PhraseReviewed));
    let resp = model.send(&HostMsg::ButtonAck);

    // First answer is right, second is deliberately wrong.
    let DeviceMsg::WordQuizPrompt(prompt) = resp else {
        panic!("expected quiz prompt, got {resp:?}");
    };
    let word = phrase.word(prompt.position as usize).unwrap().as_str().to_string();
    let resp = model.send(&HostMsg::WordAnswer(WordAnswerReq::new(&word).unwrap()));
    assert!(matches!(resp, DeviceMsg::WordQuizPrompt(_)));

    let resp = model.send(&HostMsg::WordAnswer(WordAnswerReq::new("badcat").unwrap()));
    assert_eq!(
        resp.failure_kind(),
        Some(FailureKind::MnemonicVerificationFailed)
    );

    // No second chance and nothing committed.
    assert!(!model.initialize().unwrap().initialized());
}

#[test]
fn test_wrong_host_entropy_length() {
    let mut model = build_model(&device_entropy(128), Some(&[0, 1]));

    let resp = model.send(&reset_msg(128, ResetFlags::empty()));
    assert!(matches!(resp, DeviceMsg::EntropyRequest(_)));

    // 15 bytes where 16 were requested.
    let resp = model.send(&HostMsg::EntropyAck(
        EntropyAckReq::new(&[0xEE; 15]).unwrap(),
    ));
    assert_eq!(resp.failure_kind(), Some(FailureKind::InvalidParameter));
    assert!(!model.initialize().unwrap().initialized());
}

#[test]
fn test_already_initialized() {
    let mut model = build_model(&device_entropy(128), Some(&[1, 5]));
    let resp = model.send(&reset_msg(128, ResetFlags::empty()));
    walk_to_success(&mut model, resp, None, &host_entropy(128));
    assert!(model.initialize().unwrap().initialized());

    // A second reset is rejected outright: no PIN prompt, no entropy.
    let resp = model.send(&reset_msg(128, ResetFlags::PIN_PROTECTION));
    assert_eq!(resp.failure_kind(), Some(FailureKind::AlreadyInitialized));
    assert_eq!(
        model.debug_read_reset_entropy(),
        Err(ModelError::NoSessionEntropy)
    );
    assert!(model.initialize().unwrap().initialized());
}

#[test]
fn test_cancel_at_safety_warning() {
    let mut model = build_model(&device_entropy(128), Some(&[0, 1]));

    let resp = model.send(&reset_msg(128, ResetFlags::empty()));
    assert!(matches!(resp, DeviceMsg::EntropyRequest(_)));
    let resp = model.send(&HostMsg::EntropyAck(
        EntropyAckReq::new(&host_entropy(128)).unwrap(),
    ));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::SafetyWarning));

    let resp = model.send(&HostMsg::Cancel);
    assert_eq!(resp.failure_kind(), Some(FailureKind::UserCancelled));
    assert!(!model.initialize().unwrap().initialized());
}

#[test]
fn test_strength_192_review_pages() {
    let device = device_entropy(192);
    let host = host_entropy(192);
    let mut model = build_model(&device, Some(&[0, 17]));

    let resp = model.send(&reset_msg(192, ResetFlags::empty()));
    let DeviceMsg::EntropyRequest(req) = resp else {
        panic!("expected entropy request, got {resp:?}");
    };
    assert_eq!(req.byte_length, 24);
    let resp = model.send(&HostMsg::EntropyAck(EntropyAckReq::new(&host).unwrap()));
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::SafetyWarning));

    // An 18-word phrase pages as 4+4+4+4+2.
    let mut resp = model.send(&HostMsg::ButtonAck);
    let mut counts: Vec<u32> = Vec::new();
    while let DeviceMsg::WordPage(page) = resp {
        assert_eq!(page.page_count, 5);
        assert_eq!(page.word_start as usize, counts.len() * WORDS_PER_PAGE);
        counts.push(page.word_count);
        resp = model.send(&HostMsg::ButtonAck);
    }
    assert_eq!(counts, [4, 4, 4, 4, 2]);
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PhraseReviewed));
}

#[test]
fn test_out_of_order_word_answer() {
    let mut model = build_model(&device_entropy(128), Some(&[0, 1]));

    let resp = model.send(&reset_msg(128, ResetFlags::empty()));
    assert!(matches!(resp, DeviceMsg::EntropyRequest(_)));

    // A quiz answer does not belong to the entropy wait; the session dies
    // rather than being reinterpreted.
    let resp = model.send(&HostMsg::WordAnswer(WordAnswerReq::new("balcat").unwrap()));
    assert_eq!(resp.failure_kind(), Some(FailureKind::UnexpectedMessage));
    assert!(!model.initialize().unwrap().initialized());
}
