// Licensed under the Apache-2.0 license

//! The reset session state machine: sequences entropy collection,
//! confirmation gates, phrase review, the recorded-phrase quiz, and the
//! final seed commit. One session per initialization attempt.

use crate::pin::PinBuffer;
use crate::quiz::MnemonicQuiz;
use crate::Drivers;
use vaultkey_api::{
    ConfirmPurpose, ConfirmRequestResp, DeviceMsg, EntropyAckReq, EntropyRequestResp, HostMsg,
    PinEntryReq, ResetDeviceReq, ResetFlags, WordAnswerReq, WordPageResp, WordQuizPromptResp,
    MAX_ENTROPY_SIZE, MAX_LABEL_SIZE, SUPPORTED_STRENGTHS, WORDS_PER_PAGE,
};
use vaultkey_drivers::{mix_entropy, Phrase};
use vaultkey_error::{VaultkeyError, VaultkeyResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Which host message the session will accept next. Transitions are
/// forward-only; the PIN pair is the only two-step sub-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResetState {
    AwaitPinFirst,
    AwaitPinConfirm,
    AwaitEntropyConfirm,
    AwaitHostEntropy,
    AwaitSafetyAck,
    PhraseReview { page: usize },
    AwaitReviewAck,
    Quiz,
    AwaitFinalConfirm,
}

/// One device-initialization attempt. Secret material lives in fixed
/// buffers and is zeroized when the session is dropped, on any outcome.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct ResetSession {
    #[zeroize(skip)]
    state: ResetState,
    #[zeroize(skip)]
    strength: u32,
    #[zeroize(skip)]
    flags: ResetFlags,
    label: [u8; MAX_LABEL_SIZE],
    label_size: u32,
    first_pin: Option<PinBuffer>,
    device_entropy: [u8; MAX_ENTROPY_SIZE],
    has_device_entropy: bool,
    seed_entropy: [u8; MAX_ENTROPY_SIZE],
    phrase: Option<Phrase>,
    #[zeroize(skip)]
    quiz: Option<MnemonicQuiz>,
}

impl ResetSession {
    /// Validates a reset request and opens the session. All parameter
    /// checks happen before any entropy is generated or PIN is touched.
    pub fn start(
        drivers: &mut Drivers,
        req: &ResetDeviceReq,
    ) -> VaultkeyResult<(Self, DeviceMsg)> {
        if drivers.vault.is_initialized() {
            return Err(VaultkeyError::RUNTIME_ALREADY_INITIALIZED);
        }
        if !SUPPORTED_STRENGTHS.contains(&req.strength) {
            return Err(VaultkeyError::RUNTIME_INVALID_STRENGTH);
        }
        if req.label_size as usize > MAX_LABEL_SIZE {
            return Err(VaultkeyError::RUNTIME_LABEL_TOO_LONG);
        }

        let flags = req.flags();
        let mut session = Self {
            state: ResetState::AwaitPinFirst,
            strength: req.strength,
            flags,
            label: [0; MAX_LABEL_SIZE],
            label_size: 0,
            first_pin: None,
            device_entropy: [0; MAX_ENTROPY_SIZE],
            has_device_entropy: false,
            seed_entropy: [0; MAX_ENTROPY_SIZE],
            phrase: None,
            quiz: None,
        };
        let label = req.label();
        session.label[..label.len()].copy_from_slice(label);
        session.label_size = label.len() as u32;

        let resp = if flags.contains(ResetFlags::PIN_PROTECTION) {
            session.state = ResetState::AwaitPinFirst;
            confirm(ConfirmPurpose::PinFirst)
        } else if flags.contains(ResetFlags::DISPLAY_RANDOM) {
            session.state = ResetState::AwaitEntropyConfirm;
            confirm(ConfirmPurpose::EntropyDisplay)
        } else {
            session.begin_entropy(drivers)?
        };
        Ok((session, resp))
    }

    /// Advances the session by one host message. A message that does not
    /// belong to the current state is never reinterpreted; it fails the
    /// session.
    pub fn handle(&mut self, drivers: &mut Drivers, msg: &HostMsg) -> VaultkeyResult<DeviceMsg> {
        if matches!(msg, HostMsg::Cancel) {
            return Err(VaultkeyError::RUNTIME_USER_CANCELLED);
        }
        match (self.state, *msg) {
            (ResetState::AwaitPinFirst, HostMsg::PinEntry(entry)) => self.on_pin_first(&entry),
            (ResetState::AwaitPinConfirm, HostMsg::PinEntry(entry)) => {
                self.on_pin_confirm(drivers, &entry)
            }
            (ResetState::AwaitEntropyConfirm, HostMsg::ButtonAck) => self.begin_entropy(drivers),
            (ResetState::AwaitHostEntropy, HostMsg::EntropyAck(ack)) => {
                self.on_entropy_ack(drivers, &ack)
            }
            (ResetState::AwaitSafetyAck, HostMsg::ButtonAck) => self.on_safety_ack(),
            (ResetState::PhraseReview { page }, HostMsg::ButtonAck) => self.on_review_advance(page),
            (ResetState::AwaitReviewAck, HostMsg::ButtonAck) => self.begin_quiz(drivers),
            (ResetState::Quiz, HostMsg::WordAnswer(answer)) => self.on_word_answer(&answer),
            (ResetState::AwaitFinalConfirm, HostMsg::ButtonAck) => self.finalize(drivers),
            _ => Err(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE),
        }
    }

    /// Device entropy for the debug read-back channel. Present only once
    /// the session has reached the entropy phase.
    pub fn debug_entropy(&self) -> Option<&[u8]> {
        self.has_device_entropy
            .then(|| &self.device_entropy[..self.entropy_len()])
    }

    fn entropy_len(&self) -> usize {
        (self.strength / 8) as usize
    }

    fn on_pin_first(&mut self, entry: &PinEntryReq) -> VaultkeyResult<DeviceMsg> {
        self.first_pin = Some(PinBuffer::capture(entry)?);
        self.state = ResetState::AwaitPinConfirm;
        Ok(confirm(ConfirmPurpose::PinConfirm))
    }

    fn on_pin_confirm(
        &mut self,
        drivers: &mut Drivers,
        entry: &PinEntryReq,
    ) -> VaultkeyResult<DeviceMsg> {
        let second = PinBuffer::capture(entry)?;
        let first = self
            .first_pin
            .take()
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
        // Both buffers drop (and zeroize) here whatever the outcome; a
        // mismatched first entry is never carried into a retry.
        if !first.matches(&second) {
            return Err(VaultkeyError::RUNTIME_PIN_MISMATCH);
        }
        if self.flags.contains(ResetFlags::DISPLAY_RANDOM) {
            self.state = ResetState::AwaitEntropyConfirm;
            Ok(confirm(ConfirmPurpose::EntropyDisplay))
        } else {
            self.begin_entropy(drivers)
        }
    }

    /// Generates the device half of the seed entropy and asks the host for
    /// its half. The device bytes never leave the session except through
    /// the debug read-back channel.
    fn begin_entropy(&mut self, drivers: &mut Drivers) -> VaultkeyResult<DeviceMsg> {
        let len = self.entropy_len();
        drivers.trng.generate(&mut self.device_entropy[..len])?;
        self.has_device_entropy = true;
        self.state = ResetState::AwaitHostEntropy;
        Ok(DeviceMsg::EntropyRequest(EntropyRequestResp {
            byte_length: len as u32,
        }))
    }

    fn on_entropy_ack(
        &mut self,
        drivers: &mut Drivers,
        ack: &EntropyAckReq,
    ) -> VaultkeyResult<DeviceMsg> {
        let len = self.entropy_len();
        if ack.bytes().len() != len {
            return Err(VaultkeyError::RUNTIME_HOST_ENTROPY_LEN_MISMATCH);
        }
        // Device bytes first, host bytes second; the order is part of the
        // protocol contract.
        mix_entropy(
            &self.device_entropy[..len],
            ack.bytes(),
            &mut self.seed_entropy[..len],
        )?;
        self.phrase = Some(drivers.codec.mnemonic_from_entropy(&self.seed_entropy[..len])?);
        self.state = ResetState::AwaitSafetyAck;
        Ok(confirm(ConfirmPurpose::SafetyWarning))
    }

    fn on_safety_ack(&mut self) -> VaultkeyResult<DeviceMsg> {
        let resp = self.word_page(0)?;
        self.state = ResetState::PhraseReview { page: 0 };
        Ok(DeviceMsg::WordPage(resp))
    }

    fn on_review_advance(&mut self, page: usize) -> VaultkeyResult<DeviceMsg> {
        let phrase = self
            .phrase
            .as_ref()
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
        if page + 1 < phrase.page_count(WORDS_PER_PAGE) {
            let resp = self.word_page(page + 1)?;
            self.state = ResetState::PhraseReview { page: page + 1 };
            Ok(DeviceMsg::WordPage(resp))
        } else {
            self.state = ResetState::AwaitReviewAck;
            Ok(confirm(ConfirmPurpose::PhraseReviewed))
        }
    }

    fn begin_quiz(&mut self, drivers: &mut Drivers) -> VaultkeyResult<DeviceMsg> {
        let phrase_len = self
            .phrase
            .as_ref()
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?
            .len();
        let quiz = MnemonicQuiz::new(
            drivers.quiz_policy.as_mut(),
            &mut drivers.trng,
            phrase_len,
        )?;
        let position = quiz
            .current()
            .ok_or(VaultkeyError::RUNTIME_QUIZ_POLICY_RANGE)?;
        self.quiz = Some(quiz);
        self.state = ResetState::Quiz;
        Ok(DeviceMsg::WordQuizPrompt(WordQuizPromptResp {
            position: position as u32,
        }))
    }

    fn on_word_answer(&mut self, answer: &WordAnswerReq) -> VaultkeyResult<DeviceMsg> {
        let quiz = self
            .quiz
            .as_mut()
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
        let position = quiz
            .current()
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
        let phrase = self
            .phrase
            .as_ref()
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
        let expected = phrase
            .word(position)
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
        // Exact, case-sensitive match; one wrong answer ends the session.
        if answer.word() != expected.as_bytes() {
            return Err(VaultkeyError::RUNTIME_MNEMONIC_VERIFICATION_FAILED);
        }
        quiz.advance();
        match quiz.current() {
            Some(next) => Ok(DeviceMsg::WordQuizPrompt(WordQuizPromptResp {
                position: next as u32,
            })),
            None => {
                self.state = ResetState::AwaitFinalConfirm;
                Ok(confirm(ConfirmPurpose::FinalConfirm))
            }
        }
    }

    /// Commits the mixed seed and the protection flags. The raw session
    /// buffers are zeroized when the coordinator drops the session.
    fn finalize(&mut self, drivers: &mut Drivers) -> VaultkeyResult<DeviceMsg> {
        let len = self.entropy_len();
        let mut entry = vaultkey_drivers::SeedEntry {
            entropy: [0; MAX_ENTROPY_SIZE],
            entropy_size: len as u32,
            strength: self.strength,
            flags: self.flags.bits(),
            label: self.label,
            label_size: self.label_size,
        };
        entry.entropy[..len].copy_from_slice(&self.seed_entropy[..len]);
        drivers.vault.commit(entry)?;
        Ok(DeviceMsg::Success)
    }

    fn word_page(&self, page: usize) -> VaultkeyResult<WordPageResp> {
        let phrase = self
            .phrase
            .as_ref()
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
        let words = phrase
            .page(page, WORDS_PER_PAGE)
            .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
        let mut resp = WordPageResp {
            page_index: page as u32,
            page_count: phrase.page_count(WORDS_PER_PAGE) as u32,
            word_start: (page * WORDS_PER_PAGE) as u32,
            word_count: words.len() as u32,
            ..Default::default()
        };
        for (slot, word) in words.iter().enumerate() {
            resp.set_word(slot, word.as_bytes())?;
        }
        Ok(resp)
    }
}

fn confirm(purpose: ConfirmPurpose) -> DeviceMsg {
    DeviceMsg::ConfirmRequest(ConfirmRequestResp::new(purpose))
}
