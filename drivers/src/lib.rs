/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Vaultkey driver library: entropy source,
    entropy mixing, mnemonic codec boundary, and the seed vault.

--*/

mod entropy;
mod mnemonic;
pub mod printer;
mod seed_vault;
mod trng;

pub use entropy::mix_entropy;
pub use mnemonic::{
    MnemonicCodec, Phrase, SwCodec, Word, MAX_PHRASE_WORDS, MAX_WORD_LEN, WORDLIST_SIZE,
};
pub use seed_vault::{SeedEntry, SeedVault, MAX_SEED_BYTES, MAX_VAULT_LABEL_SIZE};
pub use trng::{FixedTrng, OsTrng, Trng};
