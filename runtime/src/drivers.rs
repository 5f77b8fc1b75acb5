// Licensed under the Apache-2.0 license

use crate::quiz::{QuizPolicy, RandomQuizPolicy};
use vaultkey_drivers::{MnemonicCodec, SeedVault, SwCodec, Trng};

/// Driver handles the coordinator operates on. Owned for the lifetime of
/// the device, not per session.
pub struct Drivers {
    pub trng: Trng,
    pub vault: SeedVault,
    pub codec: Box<dyn MnemonicCodec + Send>,
    pub quiz_policy: Box<dyn QuizPolicy + Send>,
}

impl Drivers {
    pub fn new(
        trng: Trng,
        codec: Box<dyn MnemonicCodec + Send>,
        quiz_policy: Box<dyn QuizPolicy + Send>,
    ) -> Self {
        Self {
            trng,
            vault: SeedVault::new(),
            codec,
            quiz_policy,
        }
    }

    /// Production-shaped defaults: OS-backed TRNG, software codec, random
    /// two-position quiz.
    pub fn sw() -> Self {
        Self::new(
            Trng::os(),
            Box::new(SwCodec),
            Box::new(RandomQuizPolicy::default()),
        )
    }
}
