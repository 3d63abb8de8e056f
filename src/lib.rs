//! Post-quantum prescription authentication.
//!
//! A Mirath-family MinRank signature scheme (MPC-in-the-Head with the
//! Fiat-Shamir transform) over GF(2^m), plus the deterministic
//! canonicalization that turns a structured prescription into the bytes
//! that get signed. The core is synchronous, does no I/O, and keeps all
//! secret material zeroized-on-drop; file handling and workflow live in
//! the demo binary.

pub mod canonical;
pub mod envelope;
pub mod error;
pub mod field;
pub mod hashing;
pub mod keys;
pub mod matrix;
pub mod minrank;
pub mod params;
pub mod protocol;
pub mod seed_tree;

use rand::{CryptoRng, RngCore};

pub use canonical::{canonicalize, FieldId, Prescription, CANONICAL_HEADER};
pub use envelope::SignedPrescription;
pub use error::{CanonicalError, EnvelopeError, MirathError};
pub use keys::{PublicKey, SecretKey, Signature};
pub use params::{ParamSet, PARAM_SETS};

/// Generate a key pair, returning `(PK_bytes, SK_bytes)`.
pub fn keygen<R: RngCore + CryptoRng>(params: &ParamSet, rng: &mut R) -> (Vec<u8>, Vec<u8>) {
    let (pk, sk) = protocol::keygen(params, rng);
    (pk.to_bytes(params), sk.to_bytes())
}

/// Sign canonical message bytes with a secret key, drawing the salt from
/// the caller's RNG.
pub fn sign<R: RngCore + CryptoRng>(
    params: &ParamSet,
    sk_bytes: &[u8],
    message: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>, MirathError> {
    let sk = SecretKey::from_bytes(params, sk_bytes)?;
    Ok(protocol::sign(params, &sk, message, rng)?.to_bytes(params))
}

/// Deterministic signing with an explicit salt; the reproducible path
/// behind known-answer vectors. `salt` must be `2 * lambda` bits.
pub fn sign_with_salt(
    params: &ParamSet,
    sk_bytes: &[u8],
    message: &[u8],
    salt: Vec<u8>,
) -> Result<Vec<u8>, MirathError> {
    let sk = SecretKey::from_bytes(params, sk_bytes)?;
    Ok(protocol::sign_with_salt(params, &sk, message, salt)?.to_bytes(params))
}

/// Verify a signature blob. Malformed input of any kind returns `false`;
/// this function never errors and never reports which check rejected.
pub fn verify(params: &ParamSet, pk_bytes: &[u8], message: &[u8], blob: &[u8]) -> bool {
    protocol::verify(params, pk_bytes, message, blob)
}
