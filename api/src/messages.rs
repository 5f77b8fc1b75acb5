// Licensed under the Apache-2.0 license

//! Protocol messages exchanged between the host driver and the reset
//! coordinator. The exact wire encoding is the transport layer's concern;
//! these types fix the payload layout the way the device sees it.

use vaultkey_error::VaultkeyError;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Maximum device label size in bytes.
pub const MAX_LABEL_SIZE: usize = 32;
/// Maximum host/device entropy size in bytes (256-bit strength).
pub const MAX_ENTROPY_SIZE: usize = 32;
/// Maximum PIN size in digits.
pub const MAX_PIN_SIZE: usize = 16;
/// Maximum mnemonic word size in bytes.
pub const MAX_WORD_SIZE: usize = 12;
/// Words shown per review page.
pub const WORDS_PER_PAGE: usize = 4;
/// Entropy strengths the coordinator accepts, in bits.
pub const SUPPORTED_STRENGTHS: [u32; 3] = [128, 192, 256];

bitflags::bitflags! {
    /// Option flags carried by a reset request.
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ResetFlags : u32 {
        const DISPLAY_RANDOM = 0b0001;
        const PIN_PROTECTION = 0b0010;
        const PASSPHRASE_PROTECTION = 0b0100;
    }
}

/// Starts a device-initialization session.
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct ResetDeviceReq {
    pub strength: u32,
    pub flags: u32,
    pub label: [u8; MAX_LABEL_SIZE],
    pub label_size: u32,
}

impl ResetDeviceReq {
    pub fn new(strength: u32, flags: ResetFlags, label: &str) -> Result<Self, VaultkeyError> {
        let label = label.as_bytes();
        if label.len() > MAX_LABEL_SIZE {
            return Err(VaultkeyError::RUNTIME_LABEL_TOO_LONG);
        }
        let mut req = Self {
            strength,
            flags: flags.bits(),
            ..Default::default()
        };
        req.label[..label.len()].copy_from_slice(label);
        req.label_size = label.len() as u32;
        Ok(req)
    }

    pub fn flags(&self) -> ResetFlags {
        ResetFlags::from_bits_truncate(self.flags)
    }

    pub fn label(&self) -> &[u8] {
        let len = usize::min(self.label_size as usize, MAX_LABEL_SIZE);
        &self.label[..len]
    }
}

/// Host-supplied entropy, answering an `EntropyRequest`.
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct EntropyAckReq {
    pub entropy: [u8; MAX_ENTROPY_SIZE],
    pub entropy_size: u32,
}

impl EntropyAckReq {
    pub fn new(entropy: &[u8]) -> Result<Self, VaultkeyError> {
        if entropy.len() > MAX_ENTROPY_SIZE {
            return Err(VaultkeyError::RUNTIME_HOST_ENTROPY_LEN_MISMATCH);
        }
        let mut req = Self::default();
        req.entropy[..entropy.len()].copy_from_slice(entropy);
        req.entropy_size = entropy.len() as u32;
        Ok(req)
    }

    pub fn bytes(&self) -> &[u8] {
        let len = usize::min(self.entropy_size as usize, MAX_ENTROPY_SIZE);
        &self.entropy[..len]
    }
}

/// One PIN entry (first or confirming).
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct PinEntryReq {
    pub digits: [u8; MAX_PIN_SIZE],
    pub digits_size: u32,
}

impl PinEntryReq {
    pub fn new(digits: &[u8]) -> Result<Self, VaultkeyError> {
        if digits.is_empty() || digits.len() > MAX_PIN_SIZE {
            return Err(VaultkeyError::RUNTIME_PIN_MALFORMED);
        }
        let mut req = Self::default();
        req.digits[..digits.len()].copy_from_slice(digits);
        req.digits_size = digits.len() as u32;
        Ok(req)
    }

    pub fn digits(&self) -> &[u8] {
        let len = usize::min(self.digits_size as usize, MAX_PIN_SIZE);
        &self.digits[..len]
    }
}

/// The user's claimed word for one quiz position.
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct WordAnswerReq {
    pub word: [u8; MAX_WORD_SIZE],
    pub word_size: u32,
}

impl WordAnswerReq {
    pub fn new(word: &str) -> Result<Self, VaultkeyError> {
        let word = word.as_bytes();
        if word.is_empty() || word.len() > MAX_WORD_SIZE {
            return Err(VaultkeyError::RUNTIME_WORD_MALFORMED);
        }
        let mut req = Self::default();
        req.word[..word.len()].copy_from_slice(word);
        req.word_size = word.len() as u32;
        Ok(req)
    }

    pub fn word(&self) -> &[u8] {
        let len = usize::min(self.word_size as usize, MAX_WORD_SIZE);
        &self.word[..len]
    }
}

/// What a `ConfirmRequest` is asking the user to acknowledge.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPurpose {
    /// Enter the PIN for the first time.
    PinFirst = 1,
    /// Enter the PIN again to confirm it.
    PinConfirm = 2,
    /// Consent to the upcoming entropy-mixing disclosure.
    EntropyDisplay = 3,
    /// "You must record the phrase" warning, shown before any word.
    SafetyWarning = 4,
    /// Acknowledge having recorded the full phrase.
    PhraseReviewed = 5,
    /// Last gate before the seed is committed.
    FinalConfirm = 6,
}

impl TryFrom<u32> for ConfirmPurpose {
    type Error = VaultkeyError;
    fn try_from(val: u32) -> Result<Self, VaultkeyError> {
        match val {
            1 => Ok(Self::PinFirst),
            2 => Ok(Self::PinConfirm),
            3 => Ok(Self::EntropyDisplay),
            4 => Ok(Self::SafetyWarning),
            5 => Ok(Self::PhraseReviewed),
            6 => Ok(Self::FinalConfirm),
            _ => Err(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE),
        }
    }
}

/// Asks the host to acknowledge or decline a gate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct ConfirmRequestResp {
    pub purpose: u32,
}

impl ConfirmRequestResp {
    pub fn new(purpose: ConfirmPurpose) -> Self {
        Self {
            purpose: purpose as u32,
        }
    }

    pub fn purpose(&self) -> Result<ConfirmPurpose, VaultkeyError> {
        ConfirmPurpose::try_from(self.purpose)
    }
}

/// Asks the host for `byte_length` bytes of entropy.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct EntropyRequestResp {
    pub byte_length: u32,
}

/// One page of the derived phrase, shown during review.
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct WordPageResp {
    pub page_index: u32,
    pub page_count: u32,
    /// Phrase position of the first word on this page.
    pub word_start: u32,
    pub word_count: u32,
    /// Zero-padded words; only the first `word_count` entries are valid.
    pub words: [[u8; MAX_WORD_SIZE]; WORDS_PER_PAGE],
}

impl WordPageResp {
    pub fn set_word(&mut self, slot: usize, word: &[u8]) -> Result<(), VaultkeyError> {
        if slot >= WORDS_PER_PAGE || word.len() > MAX_WORD_SIZE {
            return Err(VaultkeyError::RUNTIME_WORD_MALFORMED);
        }
        self.words[slot] = [0; MAX_WORD_SIZE];
        self.words[slot][..word.len()].copy_from_slice(word);
        Ok(())
    }

    /// The word in `slot`, trimmed of its zero padding.
    pub fn word(&self, slot: usize) -> &[u8] {
        let word = &self.words[slot];
        let len = word.iter().position(|&b| b == 0).unwrap_or(MAX_WORD_SIZE);
        &word[..len]
    }
}

/// Asks the host for the word at `position` (0-based) of the phrase.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct WordQuizPromptResp {
    pub position: u32,
}

/// Device feature report, answering `Initialize`.
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct FeaturesResp {
    pub initialized: u32,
    pub pin_protection: u32,
    pub passphrase_protection: u32,
    pub needs_backup: u32,
    pub label: [u8; MAX_LABEL_SIZE],
    pub label_size: u32,
}

impl FeaturesResp {
    pub fn initialized(&self) -> bool {
        self.initialized != 0
    }

    pub fn pin_protection(&self) -> bool {
        self.pin_protection != 0
    }

    pub fn passphrase_protection(&self) -> bool {
        self.passphrase_protection != 0
    }

    pub fn needs_backup(&self) -> bool {
        self.needs_backup != 0
    }

    pub fn label(&self) -> &[u8] {
        let len = usize::min(self.label_size as usize, MAX_LABEL_SIZE);
        &self.label[..len]
    }
}

/// Why a session ended without committing.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidParameter = 1,
    AlreadyInitialized = 2,
    PinMismatch = 3,
    UserCancelled = 4,
    MnemonicVerificationFailed = 5,
    UnexpectedMessage = 6,
    ProcessError = 7,
}

impl FailureKind {
    /// Collapses an internal error code onto the kind surfaced to the host.
    pub fn from_error(err: VaultkeyError) -> Self {
        use VaultkeyError as E;
        match err {
            e if e == E::RUNTIME_INVALID_STRENGTH
                || e == E::RUNTIME_LABEL_TOO_LONG
                || e == E::RUNTIME_PIN_MALFORMED
                || e == E::RUNTIME_WORD_MALFORMED
                || e == E::RUNTIME_HOST_ENTROPY_LEN_MISMATCH =>
            {
                Self::InvalidParameter
            }
            e if e == E::RUNTIME_ALREADY_INITIALIZED
                || e == E::RUNTIME_SESSION_ALREADY_ACTIVE =>
            {
                Self::AlreadyInitialized
            }
            e if e == E::RUNTIME_PIN_MISMATCH => Self::PinMismatch,
            e if e == E::RUNTIME_USER_CANCELLED => Self::UserCancelled,
            e if e == E::RUNTIME_MNEMONIC_VERIFICATION_FAILED => Self::MnemonicVerificationFailed,
            e if e == E::RUNTIME_UNEXPECTED_MESSAGE => Self::UnexpectedMessage,
            _ => Self::ProcessError,
        }
    }
}

impl TryFrom<u32> for FailureKind {
    type Error = VaultkeyError;
    fn try_from(val: u32) -> Result<Self, VaultkeyError> {
        match val {
            1 => Ok(Self::InvalidParameter),
            2 => Ok(Self::AlreadyInitialized),
            3 => Ok(Self::PinMismatch),
            4 => Ok(Self::UserCancelled),
            5 => Ok(Self::MnemonicVerificationFailed),
            6 => Ok(Self::UnexpectedMessage),
            7 => Ok(Self::ProcessError),
            _ => Err(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE),
        }
    }
}

/// Terminal failure report.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct FailureResp {
    pub kind: u32,
}

impl FailureResp {
    pub fn new(kind: FailureKind) -> Self {
        Self { kind: kind as u32 }
    }

    pub fn kind(&self) -> Result<FailureKind, VaultkeyError> {
        FailureKind::try_from(self.kind)
    }
}

/// Messages the coordinator accepts from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMsg {
    ResetDevice(ResetDeviceReq),
    EntropyAck(EntropyAckReq),
    ButtonAck,
    PinEntry(PinEntryReq),
    WordAnswer(WordAnswerReq),
    Cancel,
    Initialize,
}

/// Messages the coordinator emits to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMsg {
    ConfirmRequest(ConfirmRequestResp),
    EntropyRequest(EntropyRequestResp),
    WordPage(WordPageResp),
    WordQuizPrompt(WordQuizPromptResp),
    Features(FeaturesResp),
    Success,
    Failure(FailureResp),
}

impl DeviceMsg {
    pub fn failure(kind: FailureKind) -> Self {
        Self::Failure(FailureResp::new(kind))
    }

    /// The failure kind, if this is a failure message.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failure(resp) => resp.kind().ok(),
            _ => None,
        }
    }

    /// The confirmation purpose, if this is a confirm request.
    pub fn confirm_purpose(&self) -> Option<ConfirmPurpose> {
        match self {
            Self::ConfirmRequest(resp) => resp.purpose().ok(),
            _ => None,
        }
    }
}
