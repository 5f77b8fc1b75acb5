// Licensed under the Apache-2.0 license

#![cfg_attr(not(test), no_std)]

pub mod messages;

pub use vaultkey_error as error;

pub use messages::{
    ConfirmPurpose, ConfirmRequestResp, DeviceMsg, EntropyAckReq, EntropyRequestResp, FailureKind,
    FailureResp, FeaturesResp, HostMsg, PinEntryReq, ResetDeviceReq, ResetFlags, WordAnswerReq,
    WordPageResp, WordQuizPromptResp, MAX_ENTROPY_SIZE, MAX_LABEL_SIZE, MAX_PIN_SIZE,
    MAX_WORD_SIZE, SUPPORTED_STRENGTHS, WORDS_PER_PAGE,
};
