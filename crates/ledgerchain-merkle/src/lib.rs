//! A thin wrapper around a binary Merkle trie giving `build`/`prove`/
//! `verify` over 32-byte transaction-id leaves, matching the shape
//! `TxRollup` needs: a root to commit to, and inclusion proofs that stay
//! valid after the underlying rows are trimmed.

use partial_binary_merkle::{PartialMerkleTrie, Proof};
use thiserror::Error;

pub type Leaf = [u8; 32];

#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("leaf not found in trie")]
    LeafNotFound,
    #[error("malformed proof bytes")]
    MalformedProof,
}

/// Builds a trie over the given leaves (each leaf is used as both its own
/// key and its own value, since transaction IDs are already content
/// digests) and returns the trie plus its root.
pub fn build(leaves: &[Leaf]) -> (PartialMerkleTrie, Leaf) {
    let mut trie = PartialMerkleTrie::new();
    let changes: Vec<(Leaf, Leaf)> = leaves.iter().map(|leaf| (*leaf, *leaf)).collect();
    trie.insert_or_replace_batch(changes);
    let root = trie.root;
    (trie, root)
}

/// Produces an inclusion proof for `leaf`, serialized so it can be stored
/// or transmitted independently of the trie.
pub fn prove(trie: &PartialMerkleTrie, leaf: &Leaf) -> Result<Vec<u8>, MerkleError> {
    let proof = trie.get_proof(leaf).ok_or(MerkleError::LeafNotFound)?;
    bincode::serialize(&proof).map_err(|_| MerkleError::MalformedProof)
}

/// Verifies a previously-produced proof against a root, independent of
/// the trie that produced it — this is what `TxRollup::verify_inclusion`
/// calls after `trim` has deleted the live rows.
pub fn verify(root: &Leaf, proof_bytes: &[u8]) -> Result<bool, MerkleError> {
    let proof: Proof = bincode::deserialize(proof_bytes).map_err(|_| MerkleError::MalformedProof)?;
    Ok(proof.verify(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Leaf {
        [byte; 32]
    }

    #[test]
    fn prove_and_verify_round_trip() {
        let leaves = vec![leaf(1), leaf(2), leaf(3)];
        let (trie, root) = build(&leaves);
        for l in &leaves {
            let proof = prove(&trie, l).unwrap();
            assert!(verify(&root, &proof).unwrap());
        }
    }

    #[test]
    fn unknown_leaf_has_no_proof() {
        let leaves = vec![leaf(1), leaf(2)];
        let (trie, _root) = build(&leaves);
        assert!(matches!(prove(&trie, &leaf(9)), Err(MerkleError::LeafNotFound)));
    }
}
