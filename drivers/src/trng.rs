/*++

Licensed under the Apache-2.0 license.

File Name:

    trng.rs

Abstract:

    Software interface to the device's true random number generator. Real
    hardware feeds this from a physical entropy source; the OS-backed variant
    stands in for it here, and the fixed variant replays programmed bytes for
    deterministic tests.

--*/

use rand::rngs::OsRng;
use rand::RngCore;
use vaultkey_error::{VaultkeyError, VaultkeyResult};

pub enum Trng {
    Os(OsTrng),
    Fixed(FixedTrng),
}

impl Trng {
    /// A TRNG backed by the operating system's CSPRNG.
    pub fn os() -> Self {
        Self::Os(OsTrng::default())
    }

    /// A TRNG that replays `bytes` and fails once they are consumed.
    pub fn fixed(bytes: &[u8]) -> Self {
        Self::Fixed(FixedTrng::new(bytes))
    }

    /// Fills `dest` with random bytes.
    pub fn generate(&mut self, dest: &mut [u8]) -> VaultkeyResult<()> {
        match self {
            Self::Os(trng) => trng.generate(dest),
            Self::Fixed(trng) => trng.generate(dest),
        }
    }

    /// Returns one random 32-bit value.
    pub fn generate_u32(&mut self) -> VaultkeyResult<u32> {
        let mut bytes = [0u8; 4];
        self.generate(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }
}

#[derive(Default)]
pub struct OsTrng;

impl OsTrng {
    pub fn generate(&mut self, dest: &mut [u8]) -> VaultkeyResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|_| VaultkeyError::DRIVER_TRNG_GENERATE_FAILED)
    }
}

/// Deterministic TRNG double; hands out its programmed bytes in order.
pub struct FixedTrng {
    bytes: Vec<u8>,
    pos: usize,
}

impl FixedTrng {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            pos: 0,
        }
    }

    pub fn generate(&mut self, dest: &mut [u8]) -> VaultkeyResult<()> {
        let remaining = self.bytes.len() - self.pos;
        if dest.len() > remaining {
            return Err(VaultkeyError::DRIVER_TRNG_EXHAUSTED);
        }
        dest.copy_from_slice(&self.bytes[self.pos..self.pos + dest.len()]);
        self.pos += dest.len();
        Ok(())
    }
}
