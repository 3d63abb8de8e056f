//! Symmetric primitives: one Keccak sponge family, three named uses.
//!
//! Seed and stream expansion use SHAKE-128; fixed 2-lambda-bit digests
//! (commitments, Fiat-Shamir hashes, the instance fingerprint) use
//! SHAKE-256. Every absorb starts with a one-byte domain tag and frames
//! each input part with a big-endian u32 length, so no two uses can collide
//! on concatenation boundaries.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};

use crate::field::Gf2m;
use crate::params::ParamSet;

pub const TAG_PUBLIC_MATRICES: u8 = 0x01;
pub const TAG_WITNESS: u8 = 0x02;
pub const TAG_PUBLIC_SEED: u8 = 0x03;
pub const TAG_MASTER_SEED: u8 = 0x04;
pub const TAG_TREE: u8 = 0x05;
pub const TAG_SHARE: u8 = 0x06;
pub const TAG_COMMIT: u8 = 0x07;
pub const TAG_HASH1: u8 = 0x08;
pub const TAG_HASH2: u8 = 0x09;
pub const TAG_CHALLENGE1: u8 = 0x0a;
pub const TAG_CHALLENGE2: u8 = 0x0b;
pub const TAG_INSTANCE: u8 = 0x0c;

fn absorb<H: Update>(hasher: &mut H, tag: u8, parts: &[&[u8]]) {
    hasher.update(&[tag]);
    for part in parts {
        hasher.update(&(part.len() as u32).to_be_bytes());
        hasher.update(part);
    }
}

/// Deterministic stream expansion under a domain tag.
pub fn expander(tag: u8, parts: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake128::default();
    absorb(&mut hasher, tag, parts);
    hasher.finalize_xof()
}

/// Read `len` bytes from a fresh expander.
pub fn expand_bytes(tag: u8, parts: &[&[u8]], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    expander(tag, parts).read(&mut out);
    out
}

/// Fixed-width digest (2 * lambda bits) under a domain tag.
pub fn digest(params: &ParamSet, tag: u8, parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Shake256::default();
    absorb(&mut hasher, tag, parts);
    let mut out = vec![0u8; params.digest_bytes];
    hasher.finalize_xof().read(&mut out);
    out
}

/// Commitment to one party's state within one execution.
pub fn commit(
    params: &ParamSet,
    salt: &[u8],
    exec_idx: u16,
    party_idx: u16,
    payload: &[u8],
) -> Vec<u8> {
    digest(
        params,
        TAG_COMMIT,
        &[
            salt,
            &exec_idx.to_le_bytes(),
            &party_idx.to_le_bytes(),
            payload,
        ],
    )
}

/// First Fiat-Shamir hash: binds salt, public key, message, and every
/// party commitment of every execution (in order).
pub fn hash1(params: &ParamSet, salt: &[u8], pk_bytes: &[u8], message: &[u8], commits: &[u8]) -> Vec<u8> {
    digest(params, TAG_HASH1, &[salt, pk_bytes, message, commits])
}

/// Second Fiat-Shamir hash: binds h_1 and every outbound message.
pub fn hash2(params: &ParamSet, salt: &[u8], h1: &[u8], msgs: &[u8]) -> Vec<u8> {
    digest(params, TAG_HASH2, &[salt, h1, msgs])
}

/// Parse h_1 into per-execution first-round challenges: tau row vectors of
/// n field elements each, the coefficients of the product check's random
/// linear combination.
///
/// One stream byte is masked to m bits per element. Over GF(2^m) the mask
/// is exact, so the nominal rejection-sampling loop never rejects and the
/// parse is constant-time.
pub fn first_challenges(params: &ParamSet, gf: &Gf2m, h1: &[u8]) -> Vec<Vec<u8>> {
    let mut stream = vec![0u8; params.tau * params.n];
    expander(TAG_CHALLENGE1, &[h1]).read(&mut stream);
    stream
        .chunks_exact(params.n)
        .map(|chunk| chunk.iter().map(|&b| gf.element_from_byte(b)).collect())
        .collect()
}

/// Parse h_2 into per-execution hidden-party indices, each uniform in
/// 0..N. Bytes above the largest multiple of N are rejected and redrawn;
/// for the shipped power-of-two N the rejection branch is dead.
pub fn hidden_party_indices(params: &ParamSet, h2: &[u8]) -> Vec<usize> {
    let n_parties = params.n_parties;
    let limit = (256 / n_parties) * n_parties;
    let mut reader = expander(TAG_CHALLENGE2, &[h2]);
    let mut out = Vec::with_capacity(params.tau);
    let mut byte = [0u8; 1];
    while out.len() < params.tau {
        reader.read(&mut byte);
        if (byte[0] as usize) < limit {
            out.push(byte[0] as usize % n_parties);
        }
    }
    out
}
