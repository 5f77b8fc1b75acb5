// Licensed under the Apache-2.0 license

use std::error::Error;

use vaultkey_api::{DeviceMsg, HostMsg};
use vaultkey_runtime::Coordinator;

use crate::{build_coordinator, map_debug_error, HwModel, InitParams, ModelError};

/// In-process model wrapping the coordinator directly.
pub struct ModelEmulated {
    coordinator: Coordinator,
}

impl HwModel for ModelEmulated {
    fn init(params: InitParams) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            coordinator: build_coordinator(params),
        })
    }

    fn send(&mut self, msg: &HostMsg) -> DeviceMsg {
        self.coordinator.handle_message(msg)
    }

    fn debug_read_reset_entropy(&mut self) -> Result<Vec<u8>, ModelError> {
        self.coordinator
            .debug_reset_entropy()
            .map(<[u8]>::to_vec)
            .map_err(map_debug_error)
    }
}
