//! Party-local computation of one execution, shared verbatim between the
//! signer (all N parties in the head) and the verifier (the N-1 revealed
//! parties).
//!
//! Under the first challenge gamma in F^n, each party computes
//!
//! ```text
//! u_i = gamma * E_i            E_i = [i = 0] * M_0 + sum(alpha_i,t * M_t)
//! T_i = gamma * S_i + A_i
//! ```
//!
//! and, once T = sum(T_i) is public,
//!
//! ```text
//! V_i = T * C_i - u_i - B_i
//! ```
//!
//! For an honest witness sum(V_i) = gamma * (S*C - E) = 0. The pair
//! (T_i, V_i) is the party's outbound message.

use crate::field::Gf2m;
use crate::matrix::Matrix;
use crate::params::ParamSet;
use crate::protocol::share::PartyShare;

/// gamma premultiplied against the public family: one row per matrix.
/// Computed once per execution and shared by every party.
pub struct GammaRows {
    g0: Vec<u8>,
    gt: Vec<Vec<u8>>,
}

impl GammaRows {
    pub fn new(gf: &Gf2m, gamma: &[u8], m0: &Matrix, matrices: &[Matrix]) -> GammaRows {
        GammaRows {
            g0: m0.row_vec_mul(gf, gamma),
            gt: matrices.iter().map(|m| m.row_vec_mul(gf, gamma)).collect(),
        }
    }
}

/// First response phase: the party's E-share row u_i and its T-share.
/// M_0 is charged to party 0.
pub fn response_share(
    params: &ParamSet,
    gf: &Gf2m,
    share: &PartyShare,
    first_party: bool,
    gamma: &[u8],
    rows: &GammaRows,
) -> (Vec<u8>, Vec<u8>) {
    let mut u = if first_party {
        rows.g0.clone()
    } else {
        vec![0u8; params.n]
    };
    for (alpha_t, g_row) in share.alpha.iter().zip(rows.gt.iter()) {
        for (u_j, &g_j) in u.iter_mut().zip(g_row.iter()) {
            *u_j ^= gf.mul(*alpha_t, g_j);
        }
    }

    // T_i = gamma * S_i + A_i, with S_i row-major n x r.
    let mut t = share.a.clone();
    for (i, &gamma_i) in gamma.iter().enumerate() {
        for j in 0..params.r {
            t[j] ^= gf.mul(gamma_i, share.s[i * params.r + j]);
        }
    }
    (u, t)
}

/// Second response phase, after T = sum(T_i) is public:
/// V_i = T * C_i - u_i - B_i, with C_i row-major r x n.
pub fn final_share(
    params: &ParamSet,
    gf: &Gf2m,
    share: &PartyShare,
    t_total: &[u8],
    u: &[u8],
) -> Vec<u8> {
    let mut v = vec![0u8; params.n];
    for (t_idx, &t_val) in t_total.iter().enumerate() {
        for j in 0..params.n {
            v[j] ^= gf.mul(t_val, share.c[t_idx * params.n + j]);
        }
    }
    for (v_j, (&u_j, &b_j)) in v.iter_mut().zip(u.iter().zip(share.b.iter())) {
        *v_j ^= u_j ^ b_j;
    }
    v
}

/// Pack one outbound message (T_i, V_i) for the wire.
pub fn pack_msg(gf: &Gf2m, t: &[u8], v: &[u8]) -> Vec<u8> {
    let mut out = gf.pack_elements(t);
    out.extend_from_slice(&gf.pack_elements(v));
    out
}

/// Strict unpack of an outbound message.
pub fn unpack_msg(params: &ParamSet, gf: &Gf2m, bytes: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    if bytes.len() != params.msg_bytes() {
        return None;
    }
    let t_width = params.packed_len(params.r);
    let t = gf.unpack_elements(&bytes[..t_width], params.r)?;
    let v = gf.unpack_elements(&bytes[t_width..], params.n)?;
    Some((t, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minrank::{compute_m0, expand_public_matrices, Witness};
    use crate::params::ParamSet;
    use crate::protocol::share::PartyShare;
    use crate::seed_tree::derive_leaf_seeds;

    fn setup() -> (&'static ParamSet, Gf2m) {
        let p = ParamSet::from_tag(0x01).unwrap();
        (p, Gf2m::new(p))
    }

    #[test]
    fn honest_execution_sums_to_zero() {
        let (p, gf) = setup();
        let witness = Witness::derive(p, &gf, &[0x66; 16]);
        let matrices = expand_public_matrices(p, &gf, &[0x77; 16]);
        let m0 = compute_m0(&gf, &witness, &matrices);

        let leaves = derive_leaf_seeds(p, &[0x88; 16], 0);
        let mut shares: Vec<PartyShare> = (0..p.n_parties - 1)
            .map(|i| PartyShare::expand_regular(p, &gf, leaves.seed(i)))
            .collect();
        let mut last = PartyShare::expand_last(p, &gf, leaves.seed(p.n_parties - 1));
        PartyShare::fill_last_corrections(p, &gf, &witness, &shares, &mut last);
        shares.push(last);

        let gamma: Vec<u8> = (0..p.n).map(|i| (i % 16) as u8).collect();
        let rows = GammaRows::new(&gf, &gamma, &m0, &matrices);

        let mut us = Vec::new();
        let mut t_total = vec![0u8; p.r];
        let mut ts = Vec::new();
        for (i, share) in shares.iter().enumerate() {
            let (u, t) = response_share(p, &gf, share, i == 0, &gamma, &rows);
            for (acc, &x) in t_total.iter_mut().zip(t.iter()) {
                *acc ^= x;
            }
            us.push(u);
            ts.push(t);
        }

        let mut v_sum = vec![0u8; p.n];
        for (i, share) in shares.iter().enumerate() {
            let v = final_share(p, &gf, share, &t_total, &us[i]);
            for (acc, &x) in v_sum.iter_mut().zip(v.iter()) {
                *acc ^= x;
            }
        }
        assert!(v_sum.iter().all(|&x| x == 0), "v_sum = {v_sum:?}");
    }

    #[test]
    fn corrupted_witness_share_breaks_the_check() {
        let (p, gf) = setup();
        let witness = Witness::derive(p, &gf, &[0x66; 16]);
        let matrices = expand_public_matrices(p, &gf, &[0x77; 16]);
        let m0 = compute_m0(&gf, &witness, &matrices);

        let leaves = derive_leaf_seeds(p, &[0x99; 16], 1);
        let mut shares: Vec<PartyShare> = (0..p.n_parties - 1)
            .map(|i| PartyShare::expand_regular(p, &gf, leaves.seed(i)))
            .collect();
        let mut last = PartyShare::expand_last(p, &gf, leaves.seed(p.n_parties - 1));
        PartyShare::fill_last_corrections(p, &gf, &witness, &shares, &mut last);
        shares.push(last);
        // Corrupt one alpha share after the corrections were fixed.
        shares[3].alpha[0] ^= 1;

        let gamma: Vec<u8> = (0..p.n).map(|i| ((i * 7 + 3) % 16) as u8).collect();
        let rows = GammaRows::new(&gf, &gamma, &m0, &matrices);

        let mut us = Vec::new();
        let mut t_total = vec![0u8; p.r];
        for (i, share) in shares.iter().enumerate() {
            let (u, t) = response_share(p, &gf, share, i == 0, &gamma, &rows);
            for (acc, &x) in t_total.iter_mut().zip(t.iter()) {
                *acc ^= x;
            }
            us.push(u);
        }
        let mut v_sum = vec![0u8; p.n];
        for (i, share) in shares.iter().enumerate() {
            let v = final_share(p, &gf, share, &t_total, &us[i]);
            for (acc, &x) in v_sum.iter_mut().zip(v.iter()) {
                *acc ^= x;
            }
        }
        assert!(v_sum.iter().any(|&x| x != 0));
    }

    #[test]
    fn msg_pack_round_trips_strictly() {
        let (p, gf) = setup();
        let t: Vec<u8> = (0..p.r).map(|i| (i + 1) as u8).collect();
        let v: Vec<u8> = (0..p.n).map(|i| (i % 16) as u8).collect();
        let packed = pack_msg(&gf, &t, &v);
        assert_eq!(packed.len(), p.msg_bytes());
        let (t2, v2) = unpack_msg(p, &gf, &packed).unwrap();
        assert_eq!(t2, t);
        assert_eq!(v2, v);
        assert!(unpack_msg(p, &gf, &packed[..packed.len() - 1]).is_none());
        // V occupies 60 of the final 64 bits; its top nibble is padding.
        let mut dirty = packed;
        let last = dirty.len() - 1;
        dirty[last] |= 0xf0;
        assert!(unpack_msg(p, &gf, &dirty).is_none());
    }
}
