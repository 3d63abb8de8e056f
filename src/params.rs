//! Parameter sets for the signature scheme.
//!
//! Every wire object starts with a 1-byte tag that selects a row of the
//! registry below. All sizes elsewhere in the crate derive from the chosen
//! `ParamSet`; nothing is negotiated at runtime.

use crate::error::MirathError;

/// One recognized parameter set. Immutable read-only data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSet {
    /// Registry tag; first byte of every key and signature.
    pub tag: u8,
    /// Field degree: elements live in GF(2^m).
    pub m: u32,
    /// Irreducible polynomial of degree m, bit i = coefficient of x^i.
    pub field_poly: u16,
    /// Public matrices are n x n.
    pub n: usize,
    /// Number of matrices M_1..M_k in the public family.
    pub k: usize,
    /// Rank bound on the secret matrix E = S * C.
    pub r: usize,
    /// Simulated parties per execution. Must be a power of two (tree-PRG).
    pub n_parties: usize,
    /// Parallel executions (Fiat-Shamir repetitions).
    pub tau: usize,
    /// Seed length in bytes (lambda bits).
    pub lambda_bytes: usize,
    /// Digest length in bytes (2 * lambda bits): salt, commitments, h_1, h_2, y.
    pub digest_bytes: usize,
}

/// Registry of shipped parameter sets. Tags other than these are rejected
/// everywhere with `MirathError::InvalidParams`.
pub const PARAM_SETS: &[ParamSet] = &[ParamSet {
    tag: 0x01,
    m: 4,
    field_poly: 0b1_0011, // x^4 + x + 1
    n: 15,
    k: 78,
    r: 6,
    n_parties: 32,
    tau: 39,
    lambda_bytes: 16,
    digest_bytes: 32,
}];

impl ParamSet {
    /// Look up a parameter set by wire tag.
    pub fn from_tag(tag: u8) -> Result<&'static ParamSet, MirathError> {
        PARAM_SETS
            .iter()
            .find(|p| p.tag == tag)
            .ok_or(MirathError::InvalidParams(tag))
    }

    /// Packed width of `count` field elements (m bits each, zero-padded).
    pub fn packed_len(&self, count: usize) -> usize {
        (count * self.m as usize + 7) / 8
    }

    /// Packed width of one n x n matrix.
    pub fn matrix_bytes(&self) -> usize {
        self.packed_len(self.n * self.n)
    }

    /// Elements in the witness vector alpha.
    pub fn alpha_len(&self) -> usize {
        self.k
    }

    /// Elements in the witness factor S (n x r).
    pub fn s_len(&self) -> usize {
        self.n * self.r
    }

    /// Elements in the witness factor C (r x n).
    pub fn c_len(&self) -> usize {
        self.r * self.n
    }

    /// Packed width of the per-execution aux record: corrections for
    /// alpha, S, C and the product mask B, each packed separately.
    pub fn aux_bytes(&self) -> usize {
        self.packed_len(self.alpha_len())
            + self.packed_len(self.s_len())
            + self.packed_len(self.c_len())
            + self.packed_len(self.n)
    }

    /// Packed width of one party's outbound message (T in F^r, V in F^n).
    pub fn msg_bytes(&self) -> usize {
        self.packed_len(self.r) + self.packed_len(self.n)
    }

    /// Per-execution opening record width inside a signature blob.
    pub fn opening_bytes(&self) -> usize {
        (self.n_parties - 1) * self.lambda_bytes
            + self.digest_bytes
            + self.aux_bytes()
            + self.msg_bytes()
    }

    /// Total signature blob length: tag, salt, h_1, h_2, tau openings.
    pub fn signature_len(&self) -> usize {
        1 + 3 * self.digest_bytes + self.tau * self.opening_bytes()
    }

    /// Public key length: tag, seed_pub, packed M_0, y.
    pub fn public_key_len(&self) -> usize {
        1 + self.lambda_bytes + self.matrix_bytes() + self.digest_bytes
    }

    /// Secret key length: tag, seed_sec.
    pub fn secret_key_len(&self) -> usize {
        1 + self.lambda_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_shipped_tag() {
        let p = ParamSet::from_tag(0x01).unwrap();
        assert_eq!(p.n, 15);
        assert_eq!(p.k, 78);
        assert_eq!(p.r, 6);
        assert_eq!(p.n_parties, 32);
        assert_eq!(p.tau, 39);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(ParamSet::from_tag(0x00), Err(MirathError::InvalidParams(0x00)));
        assert_eq!(ParamSet::from_tag(0xff), Err(MirathError::InvalidParams(0xff)));
    }

    #[test]
    fn party_counts_are_powers_of_two() {
        for p in PARAM_SETS {
            assert!(p.n_parties.is_power_of_two(), "tag {:#04x}", p.tag);
            assert!(p.n_parties <= 256);
        }
    }

    #[test]
    fn derived_sizes_for_tag_01() {
        let p = ParamSet::from_tag(0x01).unwrap();
        assert_eq!(p.matrix_bytes(), 113);
        assert_eq!(p.packed_len(p.alpha_len()), 39);
        assert_eq!(p.packed_len(p.s_len()), 45);
        assert_eq!(p.packed_len(p.c_len()), 45);
        assert_eq!(p.aux_bytes(), 137);
        assert_eq!(p.msg_bytes(), 11);
        assert_eq!(p.opening_bytes(), 31 * 16 + 32 + 137 + 11);
        assert_eq!(p.signature_len(), 97 + 39 * 676);
        assert_eq!(p.public_key_len(), 162);
        assert_eq!(p.secret_key_len(), 17);
    }
}
