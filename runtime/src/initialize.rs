// Licensed under the Apache-2.0 license

use crate::Drivers;
use vaultkey_api::{FeaturesResp, ResetFlags};
use vaultkey_error::VaultkeyResult;

pub struct InitializeCmd;
impl InitializeCmd {
    pub(crate) fn execute(drivers: &Drivers) -> VaultkeyResult<FeaturesResp> {
        let mut resp = FeaturesResp::default();
        if let Some(entry) = drivers.vault.entry() {
            let flags = ResetFlags::from_bits_truncate(entry.flags);
            resp.initialized = 1;
            resp.pin_protection = u32::from(flags.contains(ResetFlags::PIN_PROTECTION));
            resp.passphrase_protection =
                u32::from(flags.contains(ResetFlags::PASSPHRASE_PROTECTION));
            // The phrase was reviewed and quizzed on-device before commit.
            resp.needs_backup = 0;
            let label = entry.label();
            resp.label[..label.len()].copy_from_slice(label);
            resp.label_size = label.len() as u32;
        }
        Ok(resp)
    }
}
