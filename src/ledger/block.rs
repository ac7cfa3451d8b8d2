use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// A single block in the ledger. Immutable once appended: the stored
/// `hash` must always equal the recomputation over the other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // Unix timestamp (UTC)
    pub previous_hash: String,
    /// Proof-of-Work nonce; stays 0 on the stake path.
    pub nonce: u64,
    /// Staker identity when the block was produced via proof-of-stake.
    pub producer: Option<String>,
    /// Opaque reference to an auxiliary payload. Never executed.
    pub contract_ref: Option<String>,
    /// Opaque transaction records; only equality-scanned for confirmations.
    pub transactions: Vec<String>,
    /// Cached hash of the block.
    pub hash: String,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        Self::new(
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            Utc::now().timestamp(),
            vec!["genesis".to_string()],
            None,
            None,
        )
    }

    /// Build a block and stamp its hash. Proof-of-Work candidates come out
    /// of here unsealed (nonce 0) and go through the consensus search.
    pub fn new(
        index: u64,
        previous_hash: String,
        timestamp: i64,
        transactions: Vec<String>,
        producer: Option<String>,
        contract_ref: Option<String>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            previous_hash,
            nonce: 0,
            producer,
            contract_ref,
            transactions,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Compute the SHA-256 hash over the canonical encoding of every field
    /// except `hash` itself. The encoding is a fixed-order `:`-joined
    /// sequence — integers in decimal, absent optionals as the empty
    /// string, transactions as their JSON array form — so the digest is
    /// reproducible across implementations.
    pub fn compute_hash(&self) -> String {
        let txs_json = serde_json::to_string(&self.transactions).expect("serialize txs");
        let preimage = format!(
            "{}:{}:{}:{}:{}:{}:{}",
            self.index,
            self.timestamp,
            self.previous_hash,
            self.nonce,
            self.producer.as_deref().unwrap_or(""),
            self.contract_ref.as_deref().unwrap_or(""),
            txs_json
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether the cached `hash` still matches the block's content.
    /// (Does NOT validate chain linkage or proof-of-work.)
    pub fn is_valid(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Whether the hash carries `difficulty` leading zeros (in hex).
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        self.hash
            .chars()
            .take(difficulty as usize)
            .all(|c| c == '0')
    }
}

#[cfg(test)]
mod tests {
    use super::Block;

    #[test]
    fn genesis_has_valid_hash() {
        let b = Block::genesis();
        assert_eq!(b.index, 0);
        assert_eq!(b.previous_hash, "0");
        assert_eq!(b.hash, b.compute_hash());
        assert!(!b.hash.is_empty());
    }

    #[test]
    fn hash_is_deterministic() {
        let a = Block::new(
            1,
            "prev".into(),
            1_700_000_000,
            vec!["alice->bob:5".into()],
            None,
            None,
        );
        let b = Block::new(
            1,
            "prev".into(),
            1_700_000_000,
            vec!["alice->bob:5".into()],
            None,
            None,
        );
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn optional_fields_are_part_of_the_digest() {
        let plain = Block::new(1, "prev".into(), 0, vec![], None, None);
        let staked = Block::new(1, "prev".into(), 0, vec![], Some("validator-1".into()), None);
        let with_ref = Block::new(1, "prev".into(), 0, vec![], None, Some("escrow-v2".into()));
        assert_ne!(plain.hash, staked.hash);
        assert_ne!(plain.hash, with_ref.hash);
        assert_ne!(staked.hash, with_ref.hash);
    }

    #[test]
    fn invalid_when_mutated() {
        let mut b = Block::new(
            2,
            "prev".into(),
            1_700_000_000,
            vec!["carol->dan:1".into()],
            None,
            None,
        );
        assert!(b.is_valid());

        // Tampering: append a record without recomputing the hash.
        b.transactions.push("eve->eve:999".into());
        assert!(!b.is_valid());
    }
}
