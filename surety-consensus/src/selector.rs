//! Pseudo-random oracle index selection

use blake3::Hasher;
use surety_core::{Address, BlockContext};

/// Attempts before falling back to the lowest free index
const MAX_DRAW_ATTEMPTS: u64 = 64;

/// Derives small oracle indexes from an account, a monotonic nonce and
/// the current block.
///
/// The output is predictable to anyone who knows the inputs; it spreads
/// oracles across indexes, it is not a source of secrecy.
#[derive(Debug, Clone, Copy)]
pub struct IndexSelector {
    range: u8,
}

impl IndexSelector {
    /// Create a selector drawing from `0..range`; ranges below 3 are raised to 3
    pub fn new(range: u8) -> Self {
        Self { range: range.max(3) }
    }

    /// Draw a single index
    pub fn draw(&self, account: &Address, nonce: u64, block: &BlockContext, salt: &[u8]) -> u8 {
        self.draw_attempt(account, nonce, block, salt, 0)
    }

    /// Draw three pairwise distinct indexes
    pub fn draw_indexes(&self, account: &Address, nonce: u64, block: &BlockContext) -> [u8; 3] {
        let mut indexes: Vec<u8> = Vec::with_capacity(3);
        let mut attempt = 0u64;

        while indexes.len() < 3 {
            let index = if attempt < MAX_DRAW_ATTEMPTS {
                self.draw_attempt(account, nonce, block, b"oracle", attempt)
            } else {
                // Range is at least 3, so a free index exists
                (0..self.range).find(|i| !indexes.contains(i)).unwrap_or(0)
            };
            attempt += 1;

            if !indexes.contains(&index) {
                indexes.push(index);
            }
        }

        [indexes[0], indexes[1], indexes[2]]
    }

    fn draw_attempt(
        &self,
        account: &Address,
        nonce: u64,
        block: &BlockContext,
        salt: &[u8],
        attempt: u64,
    ) -> u8 {
        let mut hasher = Hasher::new();
        hasher.update(block.parent_hash.as_bytes());
        hasher.update(&block.number.to_le_bytes());
        hasher.update(account.as_bytes());
        hasher.update(&nonce.to_le_bytes());
        hasher.update(salt);
        hasher.update(&attempt.to_le_bytes());
        let hash = hasher.finalize();

        let mut value_bytes = [0u8; 8];
        value_bytes.copy_from_slice(&hash.as_bytes()[..8]);
        let value = u64::from_le_bytes(value_bytes);

        (value % self.range as u64) as u8
    }
}
