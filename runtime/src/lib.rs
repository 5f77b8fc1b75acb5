/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Vaultkey runtime and the coordinator's
    message handling logic.

--*/

mod drivers;
mod initialize;
mod pin;
pub mod quiz;
mod reset;

pub use drivers::Drivers;
pub use initialize::InitializeCmd;
pub use quiz::{
    FixedQuizPolicy, QuizPolicy, RandomQuizPolicy, DEFAULT_QUIZ_WORDS, MIN_QUIZ_WORDS,
};

use reset::ResetSession;
use vaultkey_api::{DeviceMsg, FailureKind, HostMsg};
use vaultkey_drivers::cprintln;
use vaultkey_error::{VaultkeyError, VaultkeyResult};

/// Device-side protocol endpoint. Owns the drivers and at most one live
/// reset session; every host message produces exactly one device message.
pub struct Coordinator {
    drivers: Drivers,
    session: Option<ResetSession>,
    debug_unlocked: bool,
}

impl Coordinator {
    pub fn new(drivers: Drivers) -> Self {
        Self::with_debug(drivers, false)
    }

    /// A coordinator with the debug read-back channel unlocked. Production
    /// parts ship locked; verification tooling unlocks it at init.
    pub fn with_debug(drivers: Drivers, debug_unlocked: bool) -> Self {
        Self {
            drivers,
            session: None,
            debug_unlocked,
        }
    }

    /// Handles one host message. Errors tear down the live session and are
    /// surfaced verbatim as a failure report; they never corrupt the
    /// vault's prior state.
    pub fn handle_message(&mut self, msg: &HostMsg) -> DeviceMsg {
        match self.dispatch(msg) {
            Ok(resp) => resp,
            Err(err) => {
                self.session = None;
                cprintln!("[vk-rt] session failed: err={}", u32::from(err));
                DeviceMsg::failure(FailureKind::from_error(err))
            }
        }
    }

    fn dispatch(&mut self, msg: &HostMsg) -> VaultkeyResult<DeviceMsg> {
        match msg {
            HostMsg::Initialize => {
                // Initialize cancels any in-flight workflow before reporting.
                if self.session.take().is_some() {
                    cprintln!("[vk-rt] initialize aborted a live session");
                }
                Ok(DeviceMsg::Features(InitializeCmd::execute(&self.drivers)?))
            }
            HostMsg::ResetDevice(req) => {
                if self.session.take().is_some() {
                    return Err(VaultkeyError::RUNTIME_SESSION_ALREADY_ACTIVE);
                }
                let (session, resp) = ResetSession::start(&mut self.drivers, req)?;
                cprintln!("[vk-rt] reset session started: strength={}", req.strength);
                self.session = Some(session);
                Ok(resp)
            }
            other => {
                let session = self
                    .session
                    .as_mut()
                    .ok_or(VaultkeyError::RUNTIME_UNEXPECTED_MESSAGE)?;
                let resp = session.handle(&mut self.drivers, other)?;
                if matches!(resp, DeviceMsg::Success) {
                    cprintln!("[vk-rt] seed committed; device initialized");
                    self.session = None;
                }
                Ok(resp)
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.drivers.vault.is_initialized()
    }

    /// Debug read-back of the device-internal entropy. Separate from the
    /// message dispatch and gated by the debug unlock; this is the only
    /// path the device bytes may leave the session on.
    pub fn debug_reset_entropy(&self) -> VaultkeyResult<&[u8]> {
        if !self.debug_unlocked {
            return Err(VaultkeyError::RUNTIME_DEBUG_LOCKED);
        }
        self.session
            .as_ref()
            .and_then(|session| session.debug_entropy())
            .ok_or(VaultkeyError::RUNTIME_ENTROPY_UNAVAILABLE)
    }
}
