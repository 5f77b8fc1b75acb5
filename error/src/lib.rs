/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the error type and error constants used across the Vaultkey
    library and runtime.

--*/
#![cfg_attr(not(test), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Vaultkey Error Type
///
/// Wraps a non-zero 32-bit code. The upper 16 bits identify the component
/// that raised the error, the lower 16 bits the condition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VaultkeyError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// Takes a list of (name, value, doc) tuples and generates a constant
/// definition for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: VaultkeyError = VaultkeyError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl VaultkeyError {
    /// Create a vaultkey error; intended to only be used from const contexts, as
    /// we don't want runtime panics if val is zero. The preferred way to get a
    /// VaultkeyError from a u32 is `VaultkeyError::try_from()`.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("VaultkeyError cannot be 0"),
        }
    }

    define_error_constants![
        // TRNG driver errors
        (
            DRIVER_TRNG_GENERATE_FAILED,
            0x00010001,
            "TRNG failed to produce entropy"
        ),
        (
            DRIVER_TRNG_EXHAUSTED,
            0x00010002,
            "Programmed TRNG ran out of bytes"
        ),
        // Mnemonic codec errors
        (
            DRIVER_MNEMONIC_INVALID_ENTROPY_LEN,
            0x00020001,
            "Entropy length not encodable as a mnemonic"
        ),
        (
            DRIVER_MNEMONIC_WORD_TOO_LONG,
            0x00020002,
            "Word exceeds the fixed word buffer"
        ),
        (
            DRIVER_MNEMONIC_PHRASE_FULL,
            0x00020003,
            "Phrase already holds the maximum word count"
        ),
        (
            DRIVER_MNEMONIC_UNKNOWN_WORD,
            0x00020004,
            "Word is not in the wordlist"
        ),
        (
            DRIVER_MNEMONIC_CHECKSUM_MISMATCH,
            0x00020005,
            "Phrase checksum bits do not match the entropy"
        ),
        (
            DRIVER_MNEMONIC_INVALID_PHRASE_LEN,
            0x00020006,
            "Phrase length not decodable to entropy"
        ),
        // Seed vault errors
        (
            DRIVER_SEED_VAULT_ALREADY_COMMITTED,
            0x00030001,
            "Seed vault already holds a committed entry"
        ),
        (
            DRIVER_SEED_VAULT_INVALID_ENTRY,
            0x00030002,
            "Seed entry is malformed"
        ),
        // Entropy mixing errors
        (
            DRIVER_ENTROPY_MIX_INVALID_LEN,
            0x00040001,
            "Entropy mixing operand or output length invalid"
        ),
        // Runtime (reset coordinator) errors
        (
            RUNTIME_INVALID_STRENGTH,
            0x000E0001,
            "Requested entropy strength is unsupported"
        ),
        (
            RUNTIME_LABEL_TOO_LONG,
            0x000E0002,
            "Device label exceeds the maximum size"
        ),
        (
            RUNTIME_ALREADY_INITIALIZED,
            0x000E0003,
            "Device already holds a committed seed"
        ),
        (
            RUNTIME_SESSION_ALREADY_ACTIVE,
            0x000E0004,
            "A reset session is already in progress"
        ),
        (
            RUNTIME_PIN_MALFORMED,
            0x000E0005,
            "PIN entry is empty, oversized, or not decimal digits"
        ),
        (
            RUNTIME_PIN_MISMATCH,
            0x000E0006,
            "Second PIN entry did not match the first"
        ),
        (
            RUNTIME_USER_CANCELLED,
            0x000E0007,
            "User declined a confirmation gate"
        ),
        (
            RUNTIME_HOST_ENTROPY_LEN_MISMATCH,
            0x000E0008,
            "Host entropy length differs from the requested length"
        ),
        (
            RUNTIME_MNEMONIC_VERIFICATION_FAILED,
            0x000E0009,
            "Quiz answer did not match the derived mnemonic"
        ),
        (
            RUNTIME_UNEXPECTED_MESSAGE,
            0x000E000A,
            "Host message does not belong to the current protocol state"
        ),
        (
            RUNTIME_QUIZ_POLICY_RANGE,
            0x000E000B,
            "Quiz policy produced an out-of-range or repeated position"
        ),
        (
            RUNTIME_DEBUG_LOCKED,
            0x000E000C,
            "Debug read-back requested on a debug-locked device"
        ),
        (
            RUNTIME_WORD_MALFORMED,
            0x000E000D,
            "Quiz answer is empty or exceeds the word buffer"
        ),
        (
            RUNTIME_ENTROPY_UNAVAILABLE,
            0x000E000E,
            "No session entropy available to read back"
        ),
    ];
}

impl From<core::num::NonZeroU32> for VaultkeyError {
    fn from(val: NonZeroU32) -> Self {
        VaultkeyError(val)
    }
}

impl From<VaultkeyError> for core::num::NonZeroU32 {
    fn from(val: VaultkeyError) -> Self {
        val.0
    }
}

impl From<VaultkeyError> for u32 {
    fn from(val: VaultkeyError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for VaultkeyError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(VaultkeyError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type VaultkeyResult<T> = Result<T, VaultkeyError>;
