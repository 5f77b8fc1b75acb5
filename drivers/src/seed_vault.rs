/*++

Licensed under the Apache-2.0 license.

File Name:

    seed_vault.rs

Abstract:

    File contains the seed vault: the durable store for the committed seed
    entry and the device initialized flag. The vault accepts exactly one
    commit per device lifetime.

--*/

use vaultkey_error::{VaultkeyError, VaultkeyResult};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
use zeroize::Zeroize;

/// Maximum committed seed entropy size in bytes.
pub const MAX_SEED_BYTES: usize = 32;
/// Maximum label size stored alongside the seed.
pub const MAX_VAULT_LABEL_SIZE: usize = 32;

/// The record committed to durable storage at finalization.
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout, Zeroize)]
pub struct SeedEntry {
    pub entropy: [u8; MAX_SEED_BYTES],
    pub entropy_size: u32,
    pub strength: u32,
    pub flags: u32,
    pub label: [u8; MAX_VAULT_LABEL_SIZE],
    pub label_size: u32,
}

impl SeedEntry {
    pub fn entropy(&self) -> &[u8] {
        let len = usize::min(self.entropy_size as usize, MAX_SEED_BYTES);
        &self.entropy[..len]
    }

    pub fn label(&self) -> &[u8] {
        let len = usize::min(self.label_size as usize, MAX_VAULT_LABEL_SIZE);
        &self.label[..len]
    }
}

/// Durable seed store. Holds at most one entry; `commit` flips the device
/// to initialized and further commits fail.
#[derive(Default)]
pub struct SeedVault {
    entry: SeedEntry,
    initialized: bool,
}

impl SeedVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn commit(&mut self, entry: SeedEntry) -> VaultkeyResult<()> {
        if self.initialized {
            return Err(VaultkeyError::DRIVER_SEED_VAULT_ALREADY_COMMITTED);
        }
        if !matches!(entry.entropy_size, 16 | 24 | 32)
            || entry.entropy_size * 8 != entry.strength
            || entry.label_size as usize > MAX_VAULT_LABEL_SIZE
        {
            return Err(VaultkeyError::DRIVER_SEED_VAULT_INVALID_ENTRY);
        }
        self.entry = entry;
        self.initialized = true;
        Ok(())
    }

    pub fn entry(&self) -> Option<&SeedEntry> {
        self.initialized.then_some(&self.entry)
    }
}
