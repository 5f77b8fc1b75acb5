/*++

Licensed under the Apache-2.0 license.

File Name:

    entropy.rs

Abstract:

    File contains the entropy-mixing primitive used during device
    initialization.

--*/

use sha2::{Digest, Sha256};
use vaultkey_error::{VaultkeyError, VaultkeyResult};

/// Mixes device-internal and host-supplied entropy into the seed entropy.
///
/// The mix is SHA-256 over the device bytes followed by the host bytes,
/// truncated to `out.len()`. Operand order is fixed: device first, host
/// second, so neither party alone determines the result and swapping the
/// operands changes the seed.
pub fn mix_entropy(device: &[u8], host: &[u8], out: &mut [u8]) -> VaultkeyResult<()> {
    if device.is_empty() || host.is_empty() {
        return Err(VaultkeyError::DRIVER_ENTROPY_MIX_INVALID_LEN);
    }
    if out.is_empty() || out.len() > Sha256::output_size() {
        return Err(VaultkeyError::DRIVER_ENTROPY_MIX_INVALID_LEN);
    }

    let mut hasher = Sha256::new();
    hasher.update(device);
    hasher.update(host);
    let digest = hasher.finalize();

    out.copy_from_slice(&digest[..out.len()]);
    Ok(())
}
