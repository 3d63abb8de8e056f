//! Additive secret sharing of the witness across the simulated parties.
//!
//! Parties 0..N-2 derive their whole state from their leaf seed. The last
//! party's mask share A comes from its seed, while its witness components
//! are corrections forcing the share sums to the true witness values; the
//! corrections are the aux record carried in the signature. Share sums:
//!
//! ```text
//! sum(alpha) = alpha   sum(S) = S   sum(C) = C
//! sum(A) = A (uniform) sum(B) = A * C
//! ```
//!
//! A in F^r and B in F^n are the one-time masks of the product check.

use sha3::digest::XofReader;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::field::Gf2m;
use crate::hashing::{self, TAG_SHARE};
use crate::minrank::Witness;
use crate::params::ParamSet;

/// One party's additive share of the witness and the product-check masks.
/// Row-major layouts: `s` is n x r, `c` is r x n.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PartyShare {
    pub alpha: Vec<u8>,
    pub s: Vec<u8>,
    pub c: Vec<u8>,
    pub a: Vec<u8>,
    pub b: Vec<u8>,
}

impl PartyShare {
    /// Expand a non-final party's full state from its leaf seed.
    pub fn expand_regular(params: &ParamSet, gf: &Gf2m, seed: &[u8]) -> PartyShare {
        let counts = [
            params.alpha_len(),
            params.s_len(),
            params.c_len(),
            params.r,
            params.n,
        ];
        let total: usize = counts.iter().sum();
        let mut stream = vec![0u8; total];
        hashing::expander(TAG_SHARE, &[seed]).read(&mut stream);
        for byte in stream.iter_mut() {
            *byte = gf.element_from_byte(*byte);
        }
        let (alpha, rest) = stream.split_at(counts[0]);
        let (s, rest) = rest.split_at(counts[1]);
        let (c, rest) = rest.split_at(counts[2]);
        let (a, b) = rest.split_at(counts[3]);
        let share = PartyShare {
            alpha: alpha.to_vec(),
            s: s.to_vec(),
            c: c.to_vec(),
            a: a.to_vec(),
            b: b.to_vec(),
        };
        stream.zeroize();
        share
    }

    /// Expand the last party's seed-derived state: only the mask share A.
    /// The remaining components are corrections filled in later.
    pub fn expand_last(params: &ParamSet, gf: &Gf2m, seed: &[u8]) -> PartyShare {
        let mut stream = vec![0u8; params.r];
        hashing::expander(TAG_SHARE, &[seed]).read(&mut stream);
        for byte in stream.iter_mut() {
            *byte = gf.element_from_byte(*byte);
        }
        PartyShare {
            alpha: vec![0u8; params.alpha_len()],
            s: vec![0u8; params.s_len()],
            c: vec![0u8; params.c_len()],
            a: stream,
            b: vec![0u8; params.n],
        }
    }

    /// Fill the last party's correction components so that the shares of
    /// all N parties sum to the witness, and B sums to A * C.
    pub fn fill_last_corrections(
        params: &ParamSet,
        gf: &Gf2m,
        witness: &Witness,
        regular: &[PartyShare],
        last: &mut PartyShare,
    ) {
        debug_assert_eq!(regular.len(), params.n_parties - 1);

        last.alpha.copy_from_slice(&witness.alpha);
        last.s.copy_from_slice(witness.s.elements());
        last.c.copy_from_slice(witness.c.elements());
        for share in regular {
            xor_into(&mut last.alpha, &share.alpha);
            xor_into(&mut last.s, &share.s);
            xor_into(&mut last.c, &share.c);
        }

        // A = sum of every party's mask share, including the last.
        let mut a_total = last.a.clone();
        for share in regular {
            xor_into(&mut a_total, &share.a);
        }
        // B must sum to A * C with the true C.
        let c = witness.c.elements();
        for j in 0..params.n {
            let mut acc = 0u8;
            for t in 0..params.r {
                acc ^= gf.mul(a_total[t], c[t * params.n + j]);
            }
            last.b[j] = acc;
        }
        for share in regular {
            xor_into(&mut last.b, &share.b);
        }
        a_total.zeroize();
    }

    /// Pack the correction components into the wire aux record:
    /// alpha, S, C, B, each bit-packed separately.
    pub fn pack_aux(&self, params: &ParamSet, gf: &Gf2m) -> Vec<u8> {
        let mut out = Vec::with_capacity(params.aux_bytes());
        out.extend_from_slice(&gf.pack_elements(&self.alpha));
        out.extend_from_slice(&gf.pack_elements(&self.s));
        out.extend_from_slice(&gf.pack_elements(&self.c));
        out.extend_from_slice(&gf.pack_elements(&self.b));
        out
    }

    /// Rebuild the last party's share from its revealed seed and the aux
    /// record. Strict: any length or padding defect rejects.
    pub fn last_from_aux(
        params: &ParamSet,
        gf: &Gf2m,
        seed: &[u8],
        aux: &[u8],
    ) -> Option<PartyShare> {
        if aux.len() != params.aux_bytes() {
            return None;
        }
        let mut share = PartyShare::expand_last(params, gf, seed);
        let mut offset = 0;
        let mut take = |count: usize| -> Option<Vec<u8>> {
            let width = params.packed_len(count);
            let elems = gf.unpack_elements(&aux[offset..offset + width], count)?;
            offset += width;
            Some(elems)
        };
        share.alpha = take(params.alpha_len())?;
        share.s = take(params.s_len())?;
        share.c = take(params.c_len())?;
        share.b = take(params.n)?;
        Some(share)
    }
}

fn xor_into(acc: &mut [u8], other: &[u8]) {
    debug_assert_eq!(acc.len(), other.len());
    for (a, b) in acc.iter_mut().zip(other.iter()) {
        *a ^= b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minrank::Witness;
    use crate::params::ParamSet;
    use crate::seed_tree::derive_leaf_seeds;

    fn setup() -> (&'static ParamSet, Gf2m) {
        let p = ParamSet::from_tag(0x01).unwrap();
        (p, Gf2m::new(p))
    }

    fn build_shares(p: &ParamSet, gf: &Gf2m, witness: &Witness) -> (Vec<PartyShare>, Vec<u8>) {
        let leaves = derive_leaf_seeds(p, &[0x11; 16], 0);
        let mut shares: Vec<PartyShare> = (0..p.n_parties - 1)
            .map(|i| PartyShare::expand_regular(p, gf, leaves.seed(i)))
            .collect();
        let mut last = PartyShare::expand_last(p, gf, leaves.seed(p.n_parties - 1));
        PartyShare::fill_last_corrections(p, gf, witness, &shares, &mut last);
        let aux = last.pack_aux(p, gf);
        shares.push(last);
        (shares, aux)
    }

    #[test]
    fn shares_sum_to_the_witness() {
        let (p, gf) = setup();
        let witness = Witness::derive(p, &gf, &[0x22; 16]);
        let (shares, _) = build_shares(p, &gf, &witness);

        let mut alpha = vec![0u8; p.alpha_len()];
        let mut s = vec![0u8; p.s_len()];
        let mut c = vec![0u8; p.c_len()];
        for share in &shares {
            xor_into(&mut alpha, &share.alpha);
            xor_into(&mut s, &share.s);
            xor_into(&mut c, &share.c);
        }
        assert_eq!(alpha, witness.alpha);
        assert_eq!(s, witness.s.elements());
        assert_eq!(c, witness.c.elements());
    }

    #[test]
    fn mask_shares_sum_to_a_times_c() {
        let (p, gf) = setup();
        let witness = Witness::derive(p, &gf, &[0x33; 16]);
        let (shares, _) = build_shares(p, &gf, &witness);

        let mut a = vec![0u8; p.r];
        let mut b = vec![0u8; p.n];
        for share in &shares {
            xor_into(&mut a, &share.a);
            xor_into(&mut b, &share.b);
        }
        let c = witness.c.elements();
        for j in 0..p.n {
            let mut expect = 0u8;
            for t in 0..p.r {
                expect ^= gf.mul(a[t], c[t * p.n + j]);
            }
            assert_eq!(b[j], expect, "column {j}");
        }
    }

    #[test]
    fn aux_round_trips_through_the_wire_form() {
        let (p, gf) = setup();
        let witness = Witness::derive(p, &gf, &[0x44; 16]);
        let leaves = derive_leaf_seeds(p, &[0x55; 16], 3);
        let regular: Vec<PartyShare> = (0..p.n_parties - 1)
            .map(|i| PartyShare::expand_regular(p, &gf, leaves.seed(i)))
            .collect();
        let mut last = PartyShare::expand_last(p, &gf, leaves.seed(p.n_parties - 1));
        PartyShare::fill_last_corrections(p, &gf, &witness, &regular, &mut last);
        let aux = last.pack_aux(p, &gf);
        assert_eq!(aux.len(), p.aux_bytes());

        let rebuilt =
            PartyShare::last_from_aux(p, &gf, leaves.seed(p.n_parties - 1), &aux).unwrap();
        assert_eq!(rebuilt.alpha, last.alpha);
        assert_eq!(rebuilt.s, last.s);
        assert_eq!(rebuilt.c, last.c);
        assert_eq!(rebuilt.a, last.a);
        assert_eq!(rebuilt.b, last.b);

        // Strictness: truncation and dirty padding reject.
        assert!(PartyShare::last_from_aux(p, &gf, leaves.seed(p.n_parties - 1), &aux[..aux.len() - 1]).is_none());
        // The B component ends on a half-byte: its final nibble is padding.
        let mut dirty = aux.clone();
        let last = dirty.len() - 1;
        dirty[last] |= 0xf0;
        assert!(PartyShare::last_from_aux(p, &gf, leaves.seed(p.n_parties - 1), &dirty).is_none());
    }
}
