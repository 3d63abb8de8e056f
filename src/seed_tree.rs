//! Tree-PRG for per-party seeds.
//!
//! Each execution expands the signing master seed into a binary tree whose
//! leaves are the N party seeds. Nodes split by one SHAKE call producing
//! both children, so the whole derivation is deterministic in
//! (master_seed, execution index). Leaf seeds are secret until revealed in
//! an opening and are zeroized when the holder is dropped.

use sha3::digest::XofReader;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::hashing::{self, TAG_TREE};
use crate::params::ParamSet;

/// The N leaf seeds of one execution, in party order.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct LeafSeeds(Vec<Vec<u8>>);

impl LeafSeeds {
    pub fn seed(&self, party: usize) -> &[u8] {
        &self.0[party]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Expand `master_seed` into the N leaf seeds of execution `exec_idx`.
pub fn derive_leaf_seeds(params: &ParamSet, master_seed: &[u8], exec_idx: u16) -> LeafSeeds {
    let lambda = params.lambda_bytes;
    let root = hashing::expand_bytes(TAG_TREE, &[master_seed, &exec_idx.to_le_bytes()], lambda);
    let mut level = vec![root];
    while level.len() < params.n_parties {
        let mut next = Vec::with_capacity(level.len() * 2);
        for node in &level {
            let mut children = vec![0u8; 2 * lambda];
            hashing::expander(TAG_TREE, &[node]).read(&mut children);
            let right = children.split_off(lambda);
            next.push(children);
            next.push(right);
        }
        for node in &mut level {
            node.zeroize();
        }
        level = next;
    }
    LeafSeeds(level)
}
