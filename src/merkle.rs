//! Merkle tree construction and proof verification with sorted-pair hashing.

use sha3::{Digest, Keccak256};

use crate::error::{Error, Result};

/// 32-byte Keccak-256 output.
pub type Hash = [u8; 32];

/// Combines two sibling hashes into their parent.
///
/// The smaller hash is always fed to the hasher first, so the result does not
/// depend on which side a sibling sat on. The verifier contract re-sorts at
/// each level the same way, which is what lets proofs omit left/right flags.
pub fn hash_pair(a: Hash, b: Hash) -> Hash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new().chain_update(lo).chain_update(hi).finalize().into()
}

/// Binary Merkle tree over a set of leaves.
///
/// Immutable once built. All intermediate levels are stored, so `root` and
/// `proof` are lookups rather than recomputation. Leaves are sorted before
/// pairing, which together with sorted-pair combination makes the root a pure
/// function of the leaf set: any permutation of the same addresses commits to
/// the same root.
pub struct MerkleTree {
    /// levels[0] holds the sorted leaves, the last level the single root.
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Builds the tree bottom-up.
    ///
    /// An unpaired node at the end of an odd level is promoted unchanged to
    /// the next level. Duplicating it instead would change the root and break
    /// compatibility with the on-chain verifier.
    pub fn build(mut leaves: Vec<Hash>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(Error::EmptyTree);
        }
        leaves.sort_unstable();

        let mut levels = vec![leaves];
        while levels[levels.len() - 1].len() > 1 {
            let current = &levels[levels.len() - 1];
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                match pair {
                    [left, right] => next.push(hash_pair(*left, *right)),
                    [odd] => next.push(*odd),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                }
            }
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// The single hash committing to the whole leaf set.
    pub fn root(&self) -> Hash {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Ordered sibling path for `leaf`, bottom to top.
    ///
    /// Levels where the node was promoted without a sibling contribute
    /// nothing, so proofs in a tree with odd levels can be shorter than the
    /// tree height.
    pub fn proof(&self, leaf: &Hash) -> Result<Vec<Hash>> {
        let mut index = self.levels[0]
            .iter()
            .position(|candidate| candidate == leaf)
            .ok_or(Error::LeafNotFound)?;

        let mut proof = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            index /= 2;
        }
        Ok(proof)
    }
}

/// Re-derives a root from (leaf, proof) and compares it to `root`.
///
/// Pure function, deliberately independent of any [`MerkleTree`] instance:
/// the service uses it to double-check its own proof generation before
/// answering, and external verifiers run the same fold.
pub fn verify_proof(leaf: Hash, proof: &[Hash], root: Hash) -> bool {
    let mut current = leaf;
    for sibling in proof {
        current = hash_pair(current, *sibling);
    }
    current == root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u8) -> Hash {
        let mut h = [0u8; 32];
        h[31] = n;
        h
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(MerkleTree::build(Vec::new()), Err(Error::EmptyTree)));
    }

    #[test]
    fn single_leaf_root_is_the_leaf() {
        let tree = MerkleTree::build(vec![leaf(7)]).unwrap();
        assert_eq!(tree.root(), leaf(7));
        assert!(tree.proof(&leaf(7)).unwrap().is_empty());
    }

    #[test]
    fn hash_pair_is_symmetric() {
        assert_eq!(hash_pair(leaf(1), leaf(2)), hash_pair(leaf(2), leaf(1)));
    }

    #[test]
    fn root_is_order_independent() {
        let a = MerkleTree::build(vec![leaf(1), leaf(2), leaf(3), leaf(4), leaf(5)]).unwrap();
        let b = MerkleTree::build(vec![leaf(4), leaf(1), leaf(5), leaf(3), leaf(2)]).unwrap();
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn every_leaf_verifies_against_the_root() {
        let leaves: Vec<Hash> = (1..=11).map(leaf).collect();
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        for l in &leaves {
            let proof = tree.proof(l).unwrap();
            assert!(verify_proof(*l, &proof, tree.root()));
        }
    }

    #[test]
    fn missing_leaf_is_an_error() {
        let tree = MerkleTree::build(vec![leaf(1), leaf(2)]).unwrap();
        assert!(matches!(tree.proof(&leaf(9)), Err(Error::LeafNotFound)));
    }

    #[test]
    fn odd_node_is_promoted_not_duplicated() {
        // Three leaves: one pair plus a promoted node, so the root must be
        // hash(hash(l1, l2), l3) and the promoted leaf has a 1-element proof.
        let tree = MerkleTree::build(vec![leaf(1), leaf(2), leaf(3)]).unwrap();
        let expected = hash_pair(hash_pair(leaf(1), leaf(2)), leaf(3));
        assert_eq!(tree.root(), expected);

        let promoted = tree.proof(&leaf(3)).unwrap();
        assert_eq!(promoted, vec![hash_pair(leaf(1), leaf(2))]);

        let paired = tree.proof(&leaf(2)).unwrap();
        assert_eq!(paired.len(), 2);
    }

    #[test]
    fn bit_flip_anywhere_in_the_proof_fails() {
        let leaves: Vec<Hash> = (1..=8).map(leaf).collect();
        let tree = MerkleTree::build(leaves).unwrap();
        let target = leaf(5);
        let proof = tree.proof(&target).unwrap();
        assert!(verify_proof(target, &proof, tree.root()));

        for element in 0..proof.len() {
            for bit in [0, 7, 255] {
                let mut tampered = proof.clone();
                tampered[element][bit / 8] ^= 1 << (bit % 8);
                assert!(!verify_proof(target, &tampered, tree.root()));
            }
        }
    }

    #[test]
    fn reordered_proof_fails() {
        let leaves: Vec<Hash> = (1..=8).map(leaf).collect();
        let tree = MerkleTree::build(leaves).unwrap();
        let target = leaf(2);
        let mut proof = tree.proof(&target).unwrap();
        assert_eq!(proof.len(), 3);

        proof.reverse();
        assert!(!verify_proof(target, &proof, tree.root()));
    }

    #[test]
    fn duplicate_leaves_self_pair() {
        // Sorted adjacency puts duplicates next to each other; they combine
        // into hash(x, x) with no special casing.
        let tree = MerkleTree::build(vec![leaf(1), leaf(1)]).unwrap();
        assert_eq!(tree.root(), hash_pair(leaf(1), leaf(1)));
        let proof = tree.proof(&leaf(1)).unwrap();
        assert!(verify_proof(leaf(1), &proof, tree.root()));
    }

    #[test]
    fn wrong_root_fails() {
        let tree = MerkleTree::build(vec![leaf(1), leaf(2), leaf(3)]).unwrap();
        let proof = tree.proof(&leaf(1)).unwrap();
        assert!(!verify_proof(leaf(1), &proof, leaf(42)));
    }
}
