//! Verification.
//!
//! Walks the opened transcript backwards: rebuilds the revealed parties'
//! states from their seeds (and aux), replays their local computation
//! under the transmitted challenges, splices in the hidden party's
//! commitment and message, and accepts only if both Fiat-Shamir hashes
//! reproduce and every execution's V-shares sum to zero. Every failure
//! mode, including structural parse failures, collapses to a bare
//! `false`; the verifier never reports which check fired.

use crate::field::Gf2m;
use crate::hashing;
use crate::keys::{PublicKey, Signature};
use crate::minrank::{expand_public_matrices, instance_fingerprint};
use crate::params::ParamSet;
use crate::protocol::mpc::{self, GammaRows};
use crate::protocol::share::PartyShare;

const LOG_TARGET: &str = "mirath_rx::protocol::verify";

/// Verify a signature blob against a public key and canonical message.
pub fn verify(params: &ParamSet, pk_bytes: &[u8], message: &[u8], blob: &[u8]) -> bool {
    let accepted = verify_inner(params, pk_bytes, message, blob).is_some();
    tracing::debug!(
        target: LOG_TARGET,
        tag = params.tag,
        blob_len = blob.len(),
        accepted,
        "verification complete"
    );
    accepted
}

/// `None` means reject. The reason is deliberately not surfaced.
fn verify_inner(params: &ParamSet, pk_bytes: &[u8], message: &[u8], blob: &[u8]) -> Option<()> {
    let pk = PublicKey::from_bytes(params, pk_bytes).ok()?;
    let sig = Signature::from_bytes(params, blob)?;
    let gf = Gf2m::new(params);
    let n_parties = params.n_parties;

    // Re-expand the instance and check the fingerprint before trusting
    // any matrix in the public key.
    let matrices = expand_public_matrices(params, &gf, pk.seed_pub());
    if instance_fingerprint(params, &gf, pk.m0(), &matrices) != pk.y() {
        return None;
    }

    let gammas = hashing::first_challenges(params, &gf, &sig.h1);
    let hidden = hashing::hidden_party_indices(params, &sig.h2);

    let mut all_coms = Vec::with_capacity(params.tau * n_parties * params.digest_bytes);
    let mut all_msgs = Vec::with_capacity(params.tau * n_parties * params.msg_bytes());
    for (exec_idx, opening) in sig.openings.iter().enumerate() {
        let hidden_party = hidden[exec_idx];
        let gamma = &gammas[exec_idx];
        let last_is_hidden = hidden_party == n_parties - 1;
        // Aux is unopened state when the last party is hidden; its wire
        // slot must then be zero so every blob bit stays significant.
        if last_is_hidden && opening.aux.iter().any(|&b| b != 0) {
            return None;
        }
        let (t_star, v_star) = mpc::unpack_msg(params, &gf, &opening.msg)?;

        let rows = GammaRows::new(&gf, gamma, pk.m0(), &matrices);
        let mut seed_iter = opening.seeds.iter();
        let mut coms: Vec<Vec<u8>> = Vec::with_capacity(n_parties);
        let mut revealed: Vec<(usize, PartyShare, Vec<u8>, Vec<u8>)> =
            Vec::with_capacity(n_parties - 1);
        let mut t_total = t_star;
        for party in 0..n_parties {
            if party == hidden_party {
                coms.push(opening.com.clone());
                continue;
            }
            let seed = seed_iter.next()?;
            let (share, com) = if party == n_parties - 1 {
                let share = PartyShare::last_from_aux(params, &gf, seed, &opening.aux)?;
                let mut payload = seed.clone();
                payload.extend_from_slice(&opening.aux);
                let com =
                    hashing::commit(params, &sig.salt, exec_idx as u16, party as u16, &payload);
                (share, com)
            } else {
                let share = PartyShare::expand_regular(params, &gf, seed);
                let com = hashing::commit(params, &sig.salt, exec_idx as u16, party as u16, seed);
                (share, com)
            };
            coms.push(com);
            let (u, t) = mpc::response_share(params, &gf, &share, party == 0, gamma, &rows);
            for (acc, &x) in t_total.iter_mut().zip(t.iter()) {
                *acc ^= x;
            }
            revealed.push((party, share, u, t));
        }

        // Replay the second round and fold the global relation check:
        // the hidden party's V plus the recomputed ones must cancel.
        let mut v_sum = v_star;
        let mut msgs: Vec<Option<Vec<u8>>> = vec![None; n_parties];
        for (party, share, u, t) in &revealed {
            let v = mpc::final_share(params, &gf, share, &t_total, u);
            for (acc, &x) in v_sum.iter_mut().zip(v.iter()) {
                *acc ^= x;
            }
            msgs[*party] = Some(mpc::pack_msg(&gf, t, &v));
        }
        if v_sum.iter().any(|&x| x != 0) {
            return None;
        }
        msgs[hidden_party] = Some(opening.msg.clone());

        for com in &coms {
            all_coms.extend_from_slice(com);
        }
        for msg in msgs {
            all_msgs.extend_from_slice(&msg?);
        }
    }

    let h1 = hashing::hash1(params, &sig.salt, pk_bytes, message, &all_coms);
    if h1 != sig.h1 {
        return None;
    }
    let h2 = hashing::hash2(params, &sig.salt, &h1, &all_msgs);
    if h2 != sig.h2 {
        return None;
    }
    Some(())
}
