// Licensed under the Apache-2.0 license

use vaultkey_api::{
    ConfirmPurpose, DeviceMsg, EntropyAckReq, HostMsg, PinEntryReq, ResetDeviceReq, ResetFlags,
    WordAnswerReq,
};
use vaultkey_drivers::{mix_entropy, MnemonicCodec, Phrase, SwCodec, Trng};
use vaultkey_hw_model::{DefaultHwModel, HwModel, InitParams};
use vaultkey_runtime::{FixedQuizPolicy, QuizPolicy, RandomQuizPolicy};

/// 16 bytes of host entropy, the way the host driver would supply them.
pub const HOST_ENTROPY_16: [u8; 16] = *b"zlutoucky kun up";

pub const TEST_LABEL: &str = "test";

/// Device entropy the fixed TRNG will hand out, per strength.
pub fn device_entropy(strength: u32) -> Vec<u8> {
    let stream = "a1b2c3d4e5f60718".repeat(4);
    hex::decode(&stream[..(strength as usize / 4)]).unwrap()
}

pub fn host_entropy(strength: u32) -> Vec<u8> {
    HOST_ENTROPY_16
        .iter()
        .cycle()
        .take(strength as usize / 8)
        .copied()
        .collect()
}

/// Builds a debug-unlocked model around a fixed TRNG. `quiz_positions`
/// pins the quiz; `None` leaves the production random policy in place.
pub fn build_model(trng_bytes: &[u8], quiz_positions: Option<&[usize]>) -> DefaultHwModel {
    let quiz_policy: Box<dyn QuizPolicy + Send> = match quiz_positions {
        Some(positions) => Box::new(FixedQuizPolicy::new(positions)),
        None => Box::new(RandomQuizPolicy::default()),
    };
    DefaultHwModel::init(InitParams {
        trng: Trng::fixed(trng_bytes),
        codec: Box::new(SwCodec),
        quiz_policy,
        debug_unlocked: true,
    })
    .unwrap()
}

pub fn reset_msg(strength: u32, flags: ResetFlags) -> HostMsg {
    HostMsg::ResetDevice(ResetDeviceReq::new(strength, flags, TEST_LABEL).unwrap())
}

/// What the device must derive for the given entropy halves: the host can
/// predict the phrase because the mixing function is public.
pub fn expected_phrase(device: &[u8], host: &[u8]) -> Phrase {
    let mut seed = vec![0u8; device.len()];
    mix_entropy(device, host, &mut seed).unwrap();
    SwCodec.mnemonic_from_entropy(&seed).unwrap()
}

/// Drives a just-started session all the way to `Success`, answering every
/// prompt the way a correct user would. Returns the words collected from
/// the review pages.
pub fn walk_to_success(
    model: &mut DefaultHwModel,
    mut resp: DeviceMsg,
    pin: Option<&[u8]>,
    host: &[u8],
) -> Vec<String> {
    let mut phrase: Option<Phrase> = None;
    let mut reviewed: Vec<String> = Vec::new();

    loop {
        resp = match resp {
            DeviceMsg::ConfirmRequest(req) => match req.purpose().unwrap() {
                ConfirmPurpose::PinFirst | ConfirmPurpose::PinConfirm => {
                    let pin = pin.expect("device asked for a PIN the test did not provide");
                    model.send(&HostMsg::PinEntry(PinEntryReq::new(pin).unwrap()))
                }
                _ => model.send(&HostMsg::ButtonAck),
            },
            DeviceMsg::EntropyRequest(req) => {
                assert_eq!(req.byte_length as usize, host.len());
                // Predict the phrase from the debug read-back.
                let device = model.debug_read_reset_entropy().unwrap();
                phrase = Some(expected_phrase(&device, host));
                model.send(&HostMsg::EntropyAck(EntropyAckReq::new(host).unwrap()))
            }
            DeviceMsg::WordPage(page) => {
                for slot in 0..page.word_count as usize {
                    reviewed.push(String::from_utf8(page.word(slot).to_vec()).unwrap());
                }
                model.send(&HostMsg::ButtonAck)
            }
            DeviceMsg::WordQuizPrompt(prompt) => {
                let phrase = phrase.as_ref().expect("quiz before entropy phase");
                let word = phrase.word(prompt.position as usize).unwrap();
                model.send(&HostMsg::WordAnswer(WordAnswerReq::new(word.as_str()).unwrap()))
            }
            DeviceMsg::Success => {
                let phrase = phrase.expect("success without entropy phase");
                let expected: Vec<String> =
                    phrase.iter().map(|w| w.as_str().to_string()).collect();
                assert_eq!(reviewed, expected);
                return reviewed;
            }
            DeviceMsg::Failure(failure) => {
                panic!("device failed the session: {:?}", failure.kind())
            }
            DeviceMsg::Features(_) => panic!("unsolicited feature report"),
        };
    }
}
