//! The signature protocol: key generation, signing, verification.
//!
//! Everything here is synchronous and CPU-bound; the caller owns
//! threading and timeouts. The tau executions inside a signature share no
//! mutable state, so a parallel caller could fan them out, but the crate
//! itself stays single-threaded.

pub mod mpc;
pub mod share;
mod sign;
mod verify;

use rand::{CryptoRng, RngCore};

use crate::error::MirathError;
use crate::field::Gf2m;
use crate::hashing::{self, TAG_PUBLIC_SEED};
use crate::keys::{PublicKey, SecretKey, Signature};
use crate::minrank::{
    compute_m0, expand_public_matrices, instance_fingerprint, relation_holds, Witness,
};
use crate::params::ParamSet;

pub use sign::sign_with_salt;
pub use verify::verify;

/// Generate a key pair from fresh entropy.
pub fn keygen<R: RngCore + CryptoRng>(params: &ParamSet, rng: &mut R) -> (PublicKey, SecretKey) {
    let mut seed_sec = vec![0u8; params.lambda_bytes];
    rng.fill_bytes(&mut seed_sec);
    keygen_unchecked(params, seed_sec)
}

/// Deterministic key generation from an explicit secret seed. Everything
/// else (witness, seed_pub, M_0, y) is derived, so storing the seed alone
/// bounds secret exposure. A seed of the wrong length is `InvalidKey`.
pub fn keygen_from_seed(
    params: &ParamSet,
    seed_sec: Vec<u8>,
) -> Result<(PublicKey, SecretKey), MirathError> {
    if seed_sec.len() != params.lambda_bytes {
        return Err(MirathError::InvalidKey("secret seed length"));
    }
    Ok(keygen_unchecked(params, seed_sec))
}

fn keygen_unchecked(params: &ParamSet, seed_sec: Vec<u8>) -> (PublicKey, SecretKey) {
    let gf = Gf2m::new(params);
    let sk = SecretKey::new(params.tag, seed_sec);

    let seed_pub = hashing::expand_bytes(TAG_PUBLIC_SEED, &[sk.seed()], params.lambda_bytes);
    let witness = Witness::derive(params, &gf, sk.seed());
    let matrices = expand_public_matrices(params, &gf, &seed_pub);
    let m0 = compute_m0(&gf, &witness, &matrices);
    // True by construction; failing here means broken arithmetic, not a
    // runtime condition, so it is an assertion rather than an error.
    assert!(relation_holds(&gf, &witness, &m0, &matrices));
    let y = instance_fingerprint(params, &gf, &m0, &matrices);
    (PublicKey::new(params.tag, seed_pub, m0, y), sk)
}

/// Sign a canonical message, drawing the salt from the caller's RNG.
pub fn sign<R: RngCore + CryptoRng>(
    params: &ParamSet,
    sk: &SecretKey,
    message: &[u8],
    rng: &mut R,
) -> Result<Signature, MirathError> {
    let mut salt = vec![0u8; params.digest_bytes];
    rng.fill_bytes(&mut salt);
    sign_with_salt(params, sk, message, salt)
}
