// Licensed under the Apache-2.0 license

use crate::common::{
    build_model, device_entropy, expected_phrase, host_entropy, reset_msg, walk_to_success,
};
use vaultkey_api::{
    ConfirmPurpose, DeviceMsg, EntropyAckReq, HostMsg, ResetFlags, WordAnswerReq, WORDS_PER_PAGE,
};
use vaultkey_hw_model::HwModel;

#[test]
fn test_reset_device() {
    // No PIN, no passphrase, don't display random.
    let device = device_entropy(128);
    let host = host_entropy(128);
    let mut model = build_model(&device, Some(&[2, 7]));

    let resp = model.send(&reset_msg(128, ResetFlags::empty()));
    let DeviceMsg::EntropyRequest(req) = resp else {
        panic!("expected entropy request, got {resp:?}");
    };
    assert_eq!(req.byte_length, 16);

    // The device half is visible over the debug channel only.
    assert_eq!(model.debug_read_reset_entropy().unwrap(), device);

    // Generate the expected mnemonic locally, then provide our entropy.
    let expected = expected_phrase(&device, &host);
    let resp = model.send(&HostMsg::EntropyAck(EntropyAckReq::new(&host).unwrap()));

    // Safety warning.
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::SafetyWarning));
    let mut resp = model.send(&HostMsg::ButtonAck);

    // Page through the phrase: 12 words as three pages of four.
    let mut words: Vec<String> = Vec::new();
    for page_index in 0..3u32 {
        let DeviceMsg::WordPage(page) = resp else {
            panic!("expected word page, got {resp:?}");
        };
        assert_eq!(page.page_index, page_index);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.word_count, WORDS_PER_PAGE as u32);
        assert_eq!(page.word_start, page_index * WORDS_PER_PAGE as u32);
        for slot in 0..page.word_count as usize {
            words.push(String::from_utf8(page.word(slot).to_vec()).unwrap());
        }
        resp = model.send(&HostMsg::ButtonAck);
    }

    // The device derived exactly the mnemonic the entropy halves demand.
    let expected_words: Vec<String> = expected.iter().map(|w| w.as_str().to_string()).collect();
    assert_eq!(words, expected_words);

    // Confirm the review, then answer the two quiz positions.
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::PhraseReviewed));
    let resp = model.send(&HostMsg::ButtonAck);

    let DeviceMsg::WordQuizPrompt(prompt) = resp else {
        panic!("expected quiz prompt, got {resp:?}");
    };
    assert_eq!(prompt.position, 2);
    let resp = model.send(&HostMsg::WordAnswer(
        WordAnswerReq::new(&words[2]).unwrap(),
    ));

    let DeviceMsg::WordQuizPrompt(prompt) = resp else {
        panic!("expected second quiz prompt, got {resp:?}");
    };
    assert_eq!(prompt.position, 7);
    let resp = model.send(&HostMsg::WordAnswer(
        WordAnswerReq::new(&words[7]).unwrap(),
    ));

    // Final gate, then commit.
    assert_eq!(resp.confirm_purpose(), Some(ConfirmPurpose::FinalConfirm));
    let resp = model.send(&HostMsg::ButtonAck);
    assert_eq!(resp, DeviceMsg::Success);

    // Check the device is properly initialized.
    let features = model.initialize().unwrap();
    assert!(features.initialized());
    assert!(!features.needs_backup());
    assert!(!features.pin_protection());
    assert!(!features.passphrase_protection());
    assert_eq!(features.label(), b"test");
}

#[test]
fn test_reset_device_all_strengths() {
    for strength in [128u32, 192, 256] {
        let device = device_entropy(strength);
        let host = host_entropy(strength);
        let mut model = build_model(&device, Some(&[0, 1]));

        let resp = model.send(&reset_msg(strength, ResetFlags::empty()));
        let words = walk_to_success(&mut model, resp, None, &host);
        assert_eq!(words.len() as u32, strength * 3 / 32);
        assert!(model.initialize().unwrap().initialized());
    }
}
