//! Signing.
//!
//! Each of the tau executions walks INIT -> SHARED -> COMMITTED ->
//! CHALLENGED -> RESPONDED -> OPENED in straight line: leaf seeds are
//! drawn from the tree-PRG, shares and commitments are formed, h_1 fixes
//! the product-check coefficients, the parties' outbound messages are
//! simulated, h_2 fixes the hidden party, and the opening records are
//! assembled. Signing performs no I/O and, given valid inputs, cannot
//! fail; all secret scratch is zeroized before returning.

use zeroize::{Zeroize, Zeroizing};

use crate::error::MirathError;
use crate::field::Gf2m;
use crate::hashing::{self, TAG_MASTER_SEED};
use crate::keys::{Opening, PublicKey, SecretKey, Signature};
use crate::minrank::{compute_m0, expand_public_matrices, Witness};
use crate::params::ParamSet;
use crate::protocol::mpc::{self, GammaRows};
use crate::protocol::share::PartyShare;
use crate::seed_tree::{derive_leaf_seeds, LeafSeeds};

struct ExecState {
    leaves: LeafSeeds,
    shares: Vec<PartyShare>,
    aux: Vec<u8>,
    coms: Vec<Vec<u8>>,
}

/// Produce a signature with a caller-supplied salt.
///
/// Deterministic: fixed (seed_sec, salt, message, params) yields a
/// bit-identical blob, which is what makes known-answer vectors possible.
/// Normal callers go through [`sign`], which draws the salt from the RNG.
/// A key from another parameter set or a salt that is not `2 * lambda`
/// bits is `InvalidKey`.
pub fn sign_with_salt(
    params: &ParamSet,
    sk: &SecretKey,
    message: &[u8],
    salt: Vec<u8>,
) -> Result<Signature, MirathError> {
    if sk.tag() != params.tag {
        return Err(MirathError::InvalidKey("secret key parameter tag"));
    }
    if salt.len() != params.digest_bytes {
        return Err(MirathError::InvalidKey("salt length"));
    }
    let gf = Gf2m::new(params);
    let n_parties = params.n_parties;

    // Rederive the full key material from the secret seed.
    let seed_pub = hashing::expand_bytes(
        hashing::TAG_PUBLIC_SEED,
        &[sk.seed()],
        params.lambda_bytes,
    );
    let witness = Witness::derive(params, &gf, sk.seed());
    let matrices = expand_public_matrices(params, &gf, &seed_pub);
    let m0 = compute_m0(&gf, &witness, &matrices);
    let y = crate::minrank::instance_fingerprint(params, &gf, &m0, &matrices);
    let pk_bytes = PublicKey::new(params.tag, seed_pub, m0.clone(), y).to_bytes(params);

    let master_seed = Zeroizing::new(hashing::expand_bytes(
        TAG_MASTER_SEED,
        &[sk.seed(), &salt, message],
        params.lambda_bytes,
    ));

    // Phase 1: shares and commitments for every execution.
    let mut execs = Vec::with_capacity(params.tau);
    let mut all_coms = Vec::with_capacity(params.tau * n_parties * params.digest_bytes);
    for exec_idx in 0..params.tau {
        let leaves = derive_leaf_seeds(params, &master_seed, exec_idx as u16);
        let mut shares: Vec<PartyShare> = (0..n_parties - 1)
            .map(|i| PartyShare::expand_regular(params, &gf, leaves.seed(i)))
            .collect();
        let mut last = PartyShare::expand_last(params, &gf, leaves.seed(n_parties - 1));
        PartyShare::fill_last_corrections(params, &gf, &witness, &shares, &mut last);
        let aux = last.pack_aux(params, &gf);
        shares.push(last);

        let mut coms = Vec::with_capacity(n_parties);
        for party in 0..n_parties {
            let com = if party == n_parties - 1 {
                let mut payload = leaves.seed(party).to_vec();
                payload.extend_from_slice(&aux);
                let com = hashing::commit(params, &salt, exec_idx as u16, party as u16, &payload);
                payload.zeroize();
                com
            } else {
                hashing::commit(params, &salt, exec_idx as u16, party as u16, leaves.seed(party))
            };
            all_coms.extend_from_slice(&com);
            coms.push(com);
        }
        execs.push(ExecState {
            leaves,
            shares,
            aux,
            coms,
        });
    }

    // First challenge: product-check coefficients per execution.
    let h1 = hashing::hash1(params, &salt, &pk_bytes, message, &all_coms);
    let gammas = hashing::first_challenges(params, &gf, &h1);

    // Phase 2: simulate the parties' outbound messages.
    let mut all_msgs = Vec::with_capacity(params.tau * n_parties * params.msg_bytes());
    let mut exec_msgs: Vec<Vec<Vec<u8>>> = Vec::with_capacity(params.tau);
    for (exec, gamma) in execs.iter().zip(gammas.iter()) {
        let rows = GammaRows::new(&gf, gamma, &m0, &matrices);
        let mut us = Vec::with_capacity(n_parties);
        let mut ts = Vec::with_capacity(n_parties);
        let mut t_total = vec![0u8; params.r];
        for (party, share) in exec.shares.iter().enumerate() {
            let (u, t) = mpc::response_share(params, &gf, share, party == 0, gamma, &rows);
            for (acc, &x) in t_total.iter_mut().zip(t.iter()) {
                *acc ^= x;
            }
            us.push(u);
            ts.push(t);
        }
        let mut msgs = Vec::with_capacity(n_parties);
        let mut v_sum = vec![0u8; params.n];
        for (party, share) in exec.shares.iter().enumerate() {
            let v = mpc::final_share(params, &gf, share, &t_total, &us[party]);
            for (acc, &x) in v_sum.iter_mut().zip(v.iter()) {
                *acc ^= x;
            }
            let msg = mpc::pack_msg(&gf, &ts[party], &v);
            all_msgs.extend_from_slice(&msg);
            msgs.push(msg);
        }
        debug_assert!(v_sum.iter().all(|&x| x == 0));
        exec_msgs.push(msgs);
    }

    // Second challenge: the hidden party of each execution.
    let h2 = hashing::hash2(params, &salt, &h1, &all_msgs);
    let hidden = hashing::hidden_party_indices(params, &h2);

    let mut openings = Vec::with_capacity(params.tau);
    for (exec_idx, exec) in execs.iter().enumerate() {
        let hidden_party = hidden[exec_idx];
        let seeds: Vec<Vec<u8>> = (0..n_parties)
            .filter(|&party| party != hidden_party)
            .map(|party| exec.leaves.seed(party).to_vec())
            .collect();
        // The aux field stays fixed-width; it is zeroed when the last
        // party is the hidden one, because aux is then unopened state.
        let aux = if hidden_party == n_parties - 1 {
            vec![0u8; params.aux_bytes()]
        } else {
            exec.aux.clone()
        };
        openings.push(Opening {
            seeds,
            com: exec.coms[hidden_party].clone(),
            aux,
            msg: exec_msgs[exec_idx][hidden_party].clone(),
        });
    }

    // Shares, leaf seeds and the witness zeroize on drop; scrub what is left.
    drop(execs);
    Ok(Signature {
        tag: params.tag,
        salt,
        h1,
        h2,
        openings,
    })
}
