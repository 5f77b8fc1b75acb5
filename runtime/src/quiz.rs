// Licensed under the Apache-2.0 license

use vaultkey_drivers::Trng;
use vaultkey_error::{VaultkeyError, VaultkeyResult};

/// Fewest positions a quiz round may check.
pub const MIN_QUIZ_WORDS: usize = 2;
/// Positions checked by the default policy.
pub const DEFAULT_QUIZ_WORDS: usize = 2;

/// Position-selection strategy for the recorded-phrase quiz. Injectable so
/// tests can pin the asked positions.
pub trait QuizPolicy {
    /// Selects the phrase positions to quiz. Implementations must return
    /// unique in-range positions: at least [`MIN_QUIZ_WORDS`], strictly
    /// fewer than `phrase_len`.
    fn select(&mut self, trng: &mut Trng, phrase_len: usize) -> VaultkeyResult<Vec<usize>>;
}

/// Draws uniformly random distinct positions from the TRNG.
pub struct RandomQuizPolicy {
    count: usize,
}

impl RandomQuizPolicy {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Default for RandomQuizPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_QUIZ_WORDS)
    }
}

impl QuizPolicy for RandomQuizPolicy {
    fn select(&mut self, trng: &mut Trng, phrase_len: usize) -> VaultkeyResult<Vec<usize>> {
        if phrase_len <= MIN_QUIZ_WORDS {
            return Err(VaultkeyError::RUNTIME_QUIZ_POLICY_RANGE);
        }
        let count = self.count.clamp(MIN_QUIZ_WORDS, phrase_len - 1);

        // Rejection-sampled uniform draw without repeats.
        let len = phrase_len as u32;
        let zone = u32::MAX - (u32::MAX % len);
        let mut positions: Vec<usize> = Vec::with_capacity(count);
        while positions.len() < count {
            let raw = trng.generate_u32()?;
            if raw >= zone {
                continue;
            }
            let position = (raw % len) as usize;
            if !positions.contains(&position) {
                positions.push(position);
            }
        }
        Ok(positions)
    }
}

/// Replays a fixed position list; test double.
pub struct FixedQuizPolicy {
    positions: Vec<usize>,
}

impl FixedQuizPolicy {
    pub fn new(positions: &[usize]) -> Self {
        Self {
            positions: positions.to_vec(),
        }
    }
}

impl QuizPolicy for FixedQuizPolicy {
    fn select(&mut self, _trng: &mut Trng, _phrase_len: usize) -> VaultkeyResult<Vec<usize>> {
        Ok(self.positions.clone())
    }
}

/// One quiz round over the derived phrase: the selected positions and a
/// forward-only cursor.
pub(crate) struct MnemonicQuiz {
    positions: Vec<usize>,
    cursor: usize,
}

impl MnemonicQuiz {
    /// Runs the policy and validates its output before trusting it.
    pub fn new(
        policy: &mut dyn QuizPolicy,
        trng: &mut Trng,
        phrase_len: usize,
    ) -> VaultkeyResult<Self> {
        let positions = policy.select(trng, phrase_len)?;
        if positions.len() < MIN_QUIZ_WORDS || positions.len() >= phrase_len {
            return Err(VaultkeyError::RUNTIME_QUIZ_POLICY_RANGE);
        }
        for (i, position) in positions.iter().enumerate() {
            if *position >= phrase_len || positions[..i].contains(position) {
                return Err(VaultkeyError::RUNTIME_QUIZ_POLICY_RANGE);
            }
        }
        Ok(Self {
            positions,
            cursor: 0,
        })
    }

    /// The position currently being asked, if the round is not over.
    pub fn current(&self) -> Option<usize> {
        self.positions.get(self.cursor).copied()
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }
}
