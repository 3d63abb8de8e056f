//! Key and signature wire formats.
//!
//! All layouts are fixed-width for a given parameter tag, which is always
//! the first byte. Secret keys hold only the seed (everything else is
//! rederived) and are zeroized on drop.
//!
//! ```text
//! SK   = tag(1) | seed_sec(lambda)
//! PK   = tag(1) | seed_pub(lambda) | M_0 packed | y(2*lambda)
//! blob = tag(1) | salt(2*lambda) | h_1(2*lambda) | h_2(2*lambda)
//!        | tau * [ (N-1) seeds | com(2*lambda) | aux | msg ]
//! ```

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::MirathError;
use crate::field::Gf2m;
use crate::matrix::Matrix;
use crate::params::ParamSet;

/// Signing key: the parameter tag and the secret seed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    tag: u8,
    seed_sec: Vec<u8>,
}

impl SecretKey {
    pub(crate) fn new(tag: u8, seed_sec: Vec<u8>) -> Self {
        SecretKey { tag, seed_sec }
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn seed(&self) -> &[u8] {
        &self.seed_sec
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.seed_sec.len());
        out.push(self.tag);
        out.extend_from_slice(&self.seed_sec);
        out
    }

    pub fn from_bytes(params: &ParamSet, bytes: &[u8]) -> Result<SecretKey, MirathError> {
        if bytes.len() != params.secret_key_len() {
            return Err(MirathError::InvalidKey("secret key length"));
        }
        if bytes[0] != params.tag {
            return Err(MirathError::InvalidKey("secret key parameter tag"));
        }
        Ok(SecretKey::new(params.tag, bytes[1..].to_vec()))
    }
}

/// Verification key: seed for M_1..M_k, the explicit M_0, and the
/// instance fingerprint y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    tag: u8,
    seed_pub: Vec<u8>,
    m0: Matrix,
    y: Vec<u8>,
}

impl PublicKey {
    pub(crate) fn new(tag: u8, seed_pub: Vec<u8>, m0: Matrix, y: Vec<u8>) -> Self {
        PublicKey {
            tag,
            seed_pub,
            m0,
            y,
        }
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn seed_pub(&self) -> &[u8] {
        &self.seed_pub
    }

    pub fn m0(&self) -> &Matrix {
        &self.m0
    }

    pub fn y(&self) -> &[u8] {
        &self.y
    }

    pub fn to_bytes(&self, params: &ParamSet) -> Vec<u8> {
        let gf = Gf2m::new(params);
        let mut out = Vec::with_capacity(params.public_key_len());
        out.push(self.tag);
        out.extend_from_slice(&self.seed_pub);
        out.extend_from_slice(&self.m0.pack(&gf));
        out.extend_from_slice(&self.y);
        out
    }

    pub fn from_bytes(params: &ParamSet, bytes: &[u8]) -> Result<PublicKey, MirathError> {
        if bytes.len() != params.public_key_len() {
            return Err(MirathError::InvalidKey("public key length"));
        }
        if bytes[0] != params.tag {
            return Err(MirathError::InvalidKey("public key parameter tag"));
        }
        let gf = Gf2m::new(params);
        let mut offset = 1;
        let seed_pub = bytes[offset..offset + params.lambda_bytes].to_vec();
        offset += params.lambda_bytes;
        let m0_bytes = &bytes[offset..offset + params.matrix_bytes()];
        offset += params.matrix_bytes();
        let m0 = Matrix::unpack(&gf, m0_bytes, params.n, params.n)
            .ok_or(MirathError::InvalidKey("public key matrix encoding"))?;
        let y = bytes[offset..].to_vec();
        Ok(PublicKey::new(params.tag, seed_pub, m0, y))
    }
}

/// Per-execution opening: the N-1 revealed seeds in party order (skipping
/// the hidden index), the hidden party's commitment and outbound message,
/// and the last party's aux corrections (all zero when the last party is
/// the hidden one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening {
    pub seeds: Vec<Vec<u8>>,
    pub com: Vec<u8>,
    pub aux: Vec<u8>,
    pub msg: Vec<u8>,
}

/// Parsed signature blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub tag: u8,
    pub salt: Vec<u8>,
    pub h1: Vec<u8>,
    pub h2: Vec<u8>,
    pub openings: Vec<Opening>,
}

impl Signature {
    pub fn to_bytes(&self, params: &ParamSet) -> Vec<u8> {
        let mut out = Vec::with_capacity(params.signature_len());
        out.push(self.tag);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.h1);
        out.extend_from_slice(&self.h2);
        for opening in &self.openings {
            for seed in &opening.seeds {
                out.extend_from_slice(seed);
            }
            out.extend_from_slice(&opening.com);
            out.extend_from_slice(&opening.aux);
            out.extend_from_slice(&opening.msg);
        }
        debug_assert_eq!(out.len(), params.signature_len());
        out
    }

    /// Strict structural parse. Returns `None` on any length or tag
    /// mismatch; semantic checks happen during verification.
    pub fn from_bytes(params: &ParamSet, bytes: &[u8]) -> Option<Signature> {
        if bytes.len() != params.signature_len() || bytes[0] != params.tag {
            return None;
        }
        let d = params.digest_bytes;
        let mut offset = 1;
        let salt = bytes[offset..offset + d].to_vec();
        offset += d;
        let h1 = bytes[offset..offset + d].to_vec();
        offset += d;
        let h2 = bytes[offset..offset + d].to_vec();
        offset += d;

        let mut openings = Vec::with_capacity(params.tau);
        for _ in 0..params.tau {
            let mut seeds = Vec::with_capacity(params.n_parties - 1);
            for _ in 0..params.n_parties - 1 {
                seeds.push(bytes[offset..offset + params.lambda_bytes].to_vec());
                offset += params.lambda_bytes;
            }
            let com = bytes[offset..offset + d].to_vec();
            offset += d;
            let aux = bytes[offset..offset + params.aux_bytes()].to_vec();
            offset += params.aux_bytes();
            let msg = bytes[offset..offset + params.msg_bytes()].to_vec();
            offset += params.msg_bytes();
            openings.push(Opening {
                seeds,
                com,
                aux,
                msg,
            });
        }
        debug_assert_eq!(offset, bytes.len());
        Some(Signature {
            tag: params.tag,
            salt,
            h1,
            h2,
            openings,
        })
    }
}
