//! Record identifier generation.

use rand::Rng;
use tracing::warn;

use crate::model::RecordId;

/// Characters used in identifiers (lowercase base36).
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Default identifier length.
pub const DEFAULT_ID_LENGTH: usize = 9;

/// Generates short random base36 identifiers.
///
/// A candidate that is already taken in the target collection is redrawn,
/// so identifiers are unique within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdGenerator {
    length: usize,
}

impl IdGenerator {
    /// Create a generator producing identifiers of `length` characters.
    ///
    /// A zero length is bumped to one.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }

    /// Identifier length.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Draw one random token, without any uniqueness check.
    #[must_use]
    pub fn token(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect()
    }

    /// Draw a token for which `taken` returns `false`.
    pub fn generate(&self, taken: impl Fn(&str) -> bool) -> RecordId {
        loop {
            let candidate = self.token();
            if taken(&candidate) {
                warn!("Identifier {} already in use, drawing another", candidate);
                continue;
            }
            return RecordId::new(candidate);
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_default_length() {
        let ids = IdGenerator::default();
        assert_eq!(ids.length(), DEFAULT_ID_LENGTH);
        assert_eq!(ids.token().len(), DEFAULT_ID_LENGTH);
    }

    #[test]
    fn test_token_alphabet() {
        let token = IdGenerator::new(64).token();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_zero_length_bumped() {
        assert_eq!(IdGenerator::new(0).length(), 1);
    }

    #[test]
    fn test_generate_redraws_taken_candidates() {
        let ids = IdGenerator::new(4);
        let calls = Cell::new(0);

        // Reject the first two candidates.
        let id = ids.generate(|_| {
            calls.set(calls.get() + 1);
            calls.get() <= 2
        });

        assert_eq!(calls.get(), 3);
        assert_eq!(id.as_str().len(), 4);
    }
}
