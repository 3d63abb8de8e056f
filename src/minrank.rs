//! MinRank instance generation and the secret witness.
//!
//! A public instance is the matrix family (M_0, M_1..M_k) over GF(2^m)
//! together with a fingerprint y binding the family. M_1..M_k expand
//! deterministically from seed_pub; M_0 is computed at keygen so that
//! M_0 + sum(alpha_i * M_i) = S * C for the secret (alpha, S, C), which
//! gives the summed matrix rank at most r. M_0 therefore travels inside
//! the public key rather than being re-expandable from the seed.

use sha3::digest::XofReader;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::field::Gf2m;
use crate::hashing::{self, TAG_INSTANCE, TAG_PUBLIC_MATRICES, TAG_WITNESS};
use crate::matrix::Matrix;
use crate::params::ParamSet;

/// Secret MinRank witness: alpha in F^k, S (n x r), C (r x n).
/// Rederivable from seed_sec; zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Witness {
    pub alpha: Vec<u8>,
    pub s: Matrix,
    pub c: Matrix,
}

impl Witness {
    /// Derive the witness from the secret seed.
    pub fn derive(params: &ParamSet, gf: &Gf2m, seed_sec: &[u8]) -> Witness {
        let total = params.alpha_len() + params.s_len() + params.c_len();
        let mut stream = vec![0u8; total];
        hashing::expander(TAG_WITNESS, &[seed_sec]).read(&mut stream);
        let elems: Vec<u8> = stream.iter().map(|&b| gf.element_from_byte(b)).collect();
        stream.zeroize();

        let (alpha, rest) = elems.split_at(params.alpha_len());
        let (s, c) = rest.split_at(params.s_len());
        Witness {
            alpha: alpha.to_vec(),
            s: Matrix::from_elements(params.n, params.r, s.to_vec()),
            c: Matrix::from_elements(params.r, params.n, c.to_vec()),
        }
    }
}

/// Expand seed_pub into the public family M_1..M_k.
pub fn expand_public_matrices(params: &ParamSet, gf: &Gf2m, seed_pub: &[u8]) -> Vec<Matrix> {
    let per_matrix = params.n * params.n;
    let mut stream = vec![0u8; params.k * per_matrix];
    hashing::expander(TAG_PUBLIC_MATRICES, &[seed_pub]).read(&mut stream);
    stream
        .chunks_exact(per_matrix)
        .map(|chunk| {
            let elems = chunk.iter().map(|&b| gf.element_from_byte(b)).collect();
            Matrix::from_elements(params.n, params.n, elems)
        })
        .collect()
}

/// M_0 = S * C - sum(alpha_i * M_i). Subtraction is addition in char 2.
pub fn compute_m0(gf: &Gf2m, witness: &Witness, matrices: &[Matrix]) -> Matrix {
    let mut m0 = witness.s.mul(gf, &witness.c);
    for (alpha_i, m_i) in witness.alpha.iter().zip(matrices.iter()) {
        m0.scaled_add_assign(gf, *alpha_i, m_i);
    }
    m0
}

/// 2-lambda-bit fingerprint binding the whole family (M_0, M_1..M_k).
pub fn instance_fingerprint(params: &ParamSet, gf: &Gf2m, m0: &Matrix, matrices: &[Matrix]) -> Vec<u8> {
    let mut family = m0.pack(gf);
    for m in matrices {
        family.extend_from_slice(&m.pack(gf));
    }
    hashing::digest(params, TAG_INSTANCE, &[&family])
}

/// Constant-time check of M_0 + sum(alpha_i * M_i) == S * C.
///
/// Keygen re-checks this before returning; a failure there is an
/// implementation bug, not a runtime condition.
pub fn relation_holds(gf: &Gf2m, witness: &Witness, m0: &Matrix, matrices: &[Matrix]) -> bool {
    let mut lhs = m0.clone();
    for (alpha_i, m_i) in witness.alpha.iter().zip(matrices.iter()) {
        lhs.scaled_add_assign(gf, *alpha_i, m_i);
    }
    let mut rhs = witness.s.mul(gf, &witness.c);
    let equal = bool::from(lhs.elements().ct_eq(rhs.elements()));
    lhs.zeroize();
    rhs.zeroize();
    equal
}
