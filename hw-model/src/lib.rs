// Licensed under the Apache-2.0 license

//! Host-side model of a Vaultkey device, to be called from tests and
//! verification tooling. The emulated model drives the coordinator
//! in-process; the same trait is the seam for driving real hardware over a
//! transport.

use std::error::Error;

use vaultkey_api::{DeviceMsg, FeaturesResp, HostMsg};
use vaultkey_drivers::{MnemonicCodec, SwCodec, Trng};
use vaultkey_error::VaultkeyError;
use vaultkey_runtime::{Coordinator, Drivers, QuizPolicy, RandomQuizPolicy};

mod model_emulated;

pub use model_emulated::ModelEmulated;

pub type DefaultHwModel = ModelEmulated;

/// Device construction parameters.
pub struct InitParams {
    pub trng: Trng,
    pub codec: Box<dyn MnemonicCodec + Send>,
    pub quiz_policy: Box<dyn QuizPolicy + Send>,
    /// Unlocks the debug entropy read-back channel. Production devices
    /// are locked.
    pub debug_unlocked: bool,
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            trng: Trng::os(),
            codec: Box::new(SwCodec),
            quiz_policy: Box::new(RandomQuizPolicy::default()),
            debug_unlocked: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ModelError {
    DebugLocked,
    NoSessionEntropy,
    UnexpectedResponse,
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DebugLocked => write!(f, "debug read-back is locked on this device"),
            Self::NoSessionEntropy => write!(f, "no session entropy to read back"),
            Self::UnexpectedResponse => write!(f, "device sent a response of the wrong type"),
        }
    }
}

impl Error for ModelError {}

/// A device model: an emulated coordinator or real hardware behind a
/// transport.
pub trait HwModel {
    fn init(params: InitParams) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;

    /// Sends one protocol message and returns the device's response.
    fn send(&mut self, msg: &HostMsg) -> DeviceMsg;

    /// Debug-only read-back of the device-internal reset entropy.
    fn debug_read_reset_entropy(&mut self) -> Result<Vec<u8>, ModelError>;

    /// Queries the device feature report.
    fn initialize(&mut self) -> Result<FeaturesResp, ModelError> {
        match self.send(&HostMsg::Initialize) {
            DeviceMsg::Features(features) => Ok(features),
            _ => Err(ModelError::UnexpectedResponse),
        }
    }
}

pub(crate) fn build_coordinator(params: InitParams) -> Coordinator {
    Coordinator::with_debug(
        Drivers::new(params.trng, params.codec, params.quiz_policy),
        params.debug_unlocked,
    )
}

pub(crate) fn map_debug_error(err: VaultkeyError) -> ModelError {
    if err == VaultkeyError::RUNTIME_DEBUG_LOCKED {
        ModelError::DebugLocked
    } else {
        ModelError::NoSessionEntropy
    }
}
