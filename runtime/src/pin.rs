// Licensed under the Apache-2.0 license

use vaultkey_api::{PinEntryReq, MAX_PIN_SIZE};
use vaultkey_error::{VaultkeyError, VaultkeyResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Transient PIN entry buffer. Lives only between the two entry prompts and
/// is zeroized when dropped.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub(crate) struct PinBuffer {
    digits: [u8; MAX_PIN_SIZE],
    len: u8,
}

impl PinBuffer {
    /// Validates and captures one PIN entry: 1..=16 ASCII decimal digits.
    pub fn capture(entry: &PinEntryReq) -> VaultkeyResult<Self> {
        let digits = entry.digits();
        if digits.is_empty() || digits.len() > MAX_PIN_SIZE {
            return Err(VaultkeyError::RUNTIME_PIN_MALFORMED);
        }
        if !digits.iter().all(|d| d.is_ascii_digit()) {
            return Err(VaultkeyError::RUNTIME_PIN_MALFORMED);
        }
        let mut buffer = Self::default();
        buffer.digits[..digits.len()].copy_from_slice(digits);
        buffer.len = digits.len() as u8;
        Ok(buffer)
    }

    /// Byte-for-byte comparison, including length. The fixed buffers are
    /// compared whole so the work done does not depend on where a mismatch
    /// occurs.
    pub fn matches(&self, other: &PinBuffer) -> bool {
        let mut diff = u32::from(self.len ^ other.len);
        for (a, b) in self.digits.iter().zip(other.digits.iter()) {
            diff |= u32::from(a ^ b);
        }
        diff == 0
    }
}
