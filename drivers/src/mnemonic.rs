/*++

Licensed under the Apache-2.0 license.

File Name:

    mnemonic.rs

Abstract:

    File contains the mnemonic codec boundary: fixed-capacity word and phrase
    types and the codec trait the coordinator consumes. Production devices
    link the standardized wordlist codec behind this trait; SwCodec is the
    software stand-in used by the emulated model and the test suites.

--*/

use sha2::{Digest, Sha256};
use vaultkey_error::{VaultkeyError, VaultkeyResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Longest word the phrase buffers accept.
pub const MAX_WORD_LEN: usize = 8;
/// Longest phrase (256-bit strength).
pub const MAX_PHRASE_WORDS: usize = 24;
/// Number of entries in the codec wordlist.
pub const WORDLIST_SIZE: usize = 2048;

/// One mnemonic word in a fixed, zeroizable buffer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Zeroize)]
pub struct Word {
    bytes: [u8; MAX_WORD_LEN],
    len: u8,
}

impl Word {
    pub fn from_str(word: &str) -> VaultkeyResult<Self> {
        Self::from_bytes(word.as_bytes())
    }

    pub fn from_bytes(word: &[u8]) -> VaultkeyResult<Self> {
        if word.is_empty() || word.len() > MAX_WORD_LEN {
            return Err(VaultkeyError::DRIVER_MNEMONIC_WORD_TOO_LONG);
        }
        let mut bytes = [0u8; MAX_WORD_LEN];
        bytes[..word.len()].copy_from_slice(word);
        Ok(Self {
            bytes,
            len: word.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }
}

impl core::fmt::Debug for Word {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered mnemonic phrase; zeroized when dropped.
#[derive(Clone, PartialEq, Eq, Debug, Zeroize, ZeroizeOnDrop)]
pub struct Phrase {
    words: [Word; MAX_PHRASE_WORDS],
    len: u8,
}

impl Default for Phrase {
    fn default() -> Self {
        Self {
            words: [Word::default(); MAX_PHRASE_WORDS],
            len: 0,
        }
    }
}

impl Phrase {
    pub fn push(&mut self, word: Word) -> VaultkeyResult<()> {
        if usize::from(self.len) >= MAX_PHRASE_WORDS {
            return Err(VaultkeyError::DRIVER_MNEMONIC_PHRASE_FULL);
        }
        self.words[usize::from(self.len)] = word;
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn word(&self, position: usize) -> Option<&Word> {
        self.words[..self.len()].get(position)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Word> {
        self.words[..self.len()].iter()
    }

    /// Number of review pages when shown `page_size` words at a time.
    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        (self.len() + page_size - 1) / page_size
    }

    /// The words on review page `page`; the last page may be short.
    pub fn page(&self, page: usize, page_size: usize) -> Option<&[Word]> {
        if page_size == 0 || page >= self.page_count(page_size) {
            return None;
        }
        let start = page * page_size;
        let end = usize::min(start + page_size, self.len());
        Some(&self.words[start..end])
    }
}

/// The wordlist codec the coordinator consumes as an external collaborator.
pub trait MnemonicCodec {
    /// Encodes entropy bytes as an ordered word phrase.
    fn mnemonic_from_entropy(&self, entropy: &[u8]) -> VaultkeyResult<Phrase>;

    /// Recovers the entropy bytes from a phrase; returns the entropy length.
    fn entropy_from_mnemonic(&self, phrase: &Phrase, out: &mut [u8]) -> VaultkeyResult<usize>;
}

// 32 onsets x 64 rimes = 2048 distinct five-letter words. The split is
// fixed at two letters, so a word maps back to its index by table lookup.
const ONSETS: [&str; 32] = [
    "ba", "be", "bi", "bo", "bu", "da", "de", "di", "do", "du", "fa", "fe", "fi", "fo", "fu",
    "ga", "ge", "gi", "go", "gu", "ka", "ke", "ki", "ko", "ku", "la", "le", "li", "lo", "lu",
    "ma", "me",
];

const RIMES: [&str; 64] = [
    "cat", "cen", "cil", "con", "cup", "dar", "del", "din", "dor", "dun", "fan", "fen", "fir",
    "fox", "fur", "gam", "gel", "gin", "gon", "gut", "hat", "hen", "him", "hop", "hut", "jar",
    "jet", "jig", "jot", "jun", "kal", "ken", "kin", "kon", "kur", "lab", "led", "lim", "lot",
    "lux", "mar", "med", "mix", "mon", "mud", "nap", "net", "nib", "nod", "nut", "pad", "peg",
    "pin", "pod", "pug", "rag", "rem", "rid", "rot", "rub", "sag", "sen", "sip", "son",
];

const WORD_BITS: usize = 11;

/// Software wordlist codec: entropy plus a leading-checksum-bit suffix,
/// packed into 11-bit word indices. Entropy of 16/24/32 bytes yields
/// 12/18/24 words.
#[derive(Default)]
pub struct SwCodec;

impl SwCodec {
    fn word_at(index: u16) -> VaultkeyResult<Word> {
        let onset = ONSETS[usize::from(index >> 6) % ONSETS.len()];
        let rime = RIMES[usize::from(index) & (RIMES.len() - 1)];
        let mut bytes = [0u8; MAX_WORD_LEN];
        bytes[..2].copy_from_slice(onset.as_bytes());
        bytes[2..5].copy_from_slice(rime.as_bytes());
        Word::from_bytes(&bytes[..5])
    }

    fn index_of(word: &Word) -> VaultkeyResult<u16> {
        let bytes = word.as_bytes();
        if bytes.len() != 5 {
            return Err(VaultkeyError::DRIVER_MNEMONIC_UNKNOWN_WORD);
        }
        let onset = ONSETS
            .iter()
            .position(|o| o.as_bytes() == &bytes[..2])
            .ok_or(VaultkeyError::DRIVER_MNEMONIC_UNKNOWN_WORD)?;
        let rime = RIMES
            .iter()
            .position(|r| r.as_bytes() == &bytes[2..])
            .ok_or(VaultkeyError::DRIVER_MNEMONIC_UNKNOWN_WORD)?;
        Ok(((onset as u16) << 6) | rime as u16)
    }

    fn entropy_len_for(word_count: usize) -> VaultkeyResult<usize> {
        match word_count {
            12 => Ok(16),
            18 => Ok(24),
            24 => Ok(32),
            _ => Err(VaultkeyError::DRIVER_MNEMONIC_INVALID_PHRASE_LEN),
        }
    }
}

impl MnemonicCodec for SwCodec {
    fn mnemonic_from_entropy(&self, entropy: &[u8]) -> VaultkeyResult<Phrase> {
        let ent_len = entropy.len();
        if !matches!(ent_len, 16 | 24 | 32) {
            return Err(VaultkeyError::DRIVER_MNEMONIC_INVALID_ENTROPY_LEN);
        }
        let ent_bits = ent_len * 8;
        let cs_bits = ent_len / 4;
        let word_count = (ent_bits + cs_bits) / WORD_BITS;
        let cs_byte = Sha256::digest(entropy)[0];

        let mut phrase = Phrase::default();
        for w in 0..word_count {
            let mut index: u16 = 0;
            for k in 0..WORD_BITS {
                let bit_pos = w * WORD_BITS + k;
                let bit = if bit_pos < ent_bits {
                    (entropy[bit_pos / 8] >> (7 - (bit_pos % 8))) & 1
                } else {
                    (cs_byte >> (7 - (bit_pos - ent_bits))) & 1
                };
                index = (index << 1) | u16::from(bit);
            }
            phrase.push(Self::word_at(index)?)?;
        }
        Ok(phrase)
    }

    fn entropy_from_mnemonic(&self, phrase: &Phrase, out: &mut [u8]) -> VaultkeyResult<usize> {
        let ent_len = Self::entropy_len_for(phrase.len())?;
        if out.len() < ent_len {
            return Err(VaultkeyError::DRIVER_MNEMONIC_INVALID_ENTROPY_LEN);
        }
        let ent_bits = ent_len * 8;

        let mut entropy = [0u8; 32];
        let mut cs_byte: u8 = 0;
        for (w, word) in phrase.iter().enumerate() {
            let index = Self::index_of(word)?;
            for k in 0..WORD_BITS {
                let bit = ((index >> (WORD_BITS - 1 - k)) & 1) as u8;
                let bit_pos = w * WORD_BITS + k;
                if bit_pos < ent_bits {
                    entropy[bit_pos / 8] |= bit << (7 - (bit_pos % 8));
                } else {
                    cs_byte |= bit << (7 - (bit_pos - ent_bits));
                }
            }
        }

        let cs_bits = ent_len / 4;
        let mask = 0xFFu8 << (8 - cs_bits);
        let expected = Sha256::digest(&entropy[..ent_len])[0] & mask;
        if expected != cs_byte {
            entropy.zeroize();
            return Err(VaultkeyError::DRIVER_MNEMONIC_CHECKSUM_MISMATCH);
        }

        out[..ent_len].copy_from_slice(&entropy[..ent_len]);
        entropy.zeroize();
        Ok(ent_len)
    }
}
