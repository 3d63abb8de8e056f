//! End-to-end scenarios: round trips, tamper sweeps, cross-key rejection,
//! and the deterministic known-answer path for parameter tag 0x01.

use mirath_rx::{FieldId, ParamSet, Prescription, CANONICAL_HEADER};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn params() -> &'static ParamSet {
    ParamSet::from_tag(0x01).unwrap()
}

/// Canonical-form message with a single raw field record appended.
fn hello_message() -> Vec<u8> {
    let mut msg = CANONICAL_HEADER.to_vec();
    msg.push(0x01);
    msg.extend_from_slice(&5u32.to_le_bytes());
    msg.extend_from_slice(b"HELLO");
    msg
}

fn zero_seed_keys(p: &ParamSet) -> (Vec<u8>, Vec<u8>) {
    let (pk, sk) = mirath_rx::protocol::keygen_from_seed(p, vec![0u8; p.lambda_bytes]).unwrap();
    (pk.to_bytes(p), sk.to_bytes())
}

#[test]
fn known_answer_vector_is_deterministic_and_verifies() {
    let p = params();
    let (pk_bytes, sk_bytes) = zero_seed_keys(p);
    let message = hello_message();
    let salt = vec![0u8; p.digest_bytes];

    let blob = mirath_rx::sign_with_salt(p, &sk_bytes, &message, salt.clone()).unwrap();
    let again = mirath_rx::sign_with_salt(p, &sk_bytes, &message, salt).unwrap();
    assert_eq!(blob, again, "signing must be a pure function of its inputs");
    assert_eq!(blob.len(), p.signature_len());
    assert!(mirath_rx::verify(p, &pk_bytes, &message, &blob));
}

#[test]
fn flipping_one_message_bit_rejects() {
    let p = params();
    let (pk_bytes, sk_bytes) = zero_seed_keys(p);
    let message = hello_message();
    let blob =
        mirath_rx::sign_with_salt(p, &sk_bytes, &message, vec![0u8; p.digest_bytes]).unwrap();

    let mut tampered = message.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    assert!(!mirath_rx::verify(p, &pk_bytes, &tampered, &blob));
}

#[test]
fn flipping_blob_bits_rejects_in_every_region() {
    let p = params();
    let (pk_bytes, sk_bytes) = zero_seed_keys(p);
    let message = hello_message();
    let blob =
        mirath_rx::sign_with_salt(p, &sk_bytes, &message, vec![0u8; p.digest_bytes]).unwrap();

    let d = p.digest_bytes;
    let openings_start = 1 + 3 * d;
    // One probe per structural region: tag, salt, h_1, h_2, then a
    // revealed seed, the hidden commitment, the aux record, and the
    // outbound message of the first opening.
    let probes = [
        0,
        1,
        1 + d,
        1 + 2 * d,
        openings_start,
        openings_start + (p.n_parties - 1) * p.lambda_bytes,
        openings_start + (p.n_parties - 1) * p.lambda_bytes + d,
        openings_start + (p.n_parties - 1) * p.lambda_bytes + d + p.aux_bytes(),
        // And one deep inside a later opening's seed block.
        openings_start + 17 * p.opening_bytes() + 3,
    ];
    for &offset in &probes {
        let mut tampered = blob.clone();
        tampered[offset] ^= 0x01;
        assert!(
            !mirath_rx::verify(p, &pk_bytes, &message, &tampered),
            "flip at byte {offset} was accepted"
        );
    }
    // Truncation and tag swap are structural rejects.
    assert!(!mirath_rx::verify(p, &pk_bytes, &message, &blob[..blob.len() - 1]));
    assert!(!mirath_rx::verify(p, &pk_bytes, &message, b""));
}

#[test]
fn header_only_message_round_trips_with_constant_length() {
    let p = params();
    let mut seed = vec![0u8; p.lambda_bytes];
    seed[0] = 0x01;
    let (pk, sk) = mirath_rx::protocol::keygen_from_seed(p, seed).unwrap();
    let message = CANONICAL_HEADER.to_vec();
    let mut rng = StdRng::seed_from_u64(1000);
    let blob = mirath_rx::sign(p, &sk.to_bytes(), &message, &mut rng).unwrap();
    assert_eq!(blob.len(), p.signature_len());
    assert!(mirath_rx::verify(p, &pk.to_bytes(p), &message, &blob));
}

#[test]
fn cross_key_signatures_are_rejected() {
    let p = params();
    let (pk_a, _) = zero_seed_keys(p);
    let mut seed_b = vec![0u8; p.lambda_bytes];
    seed_b[0] = 0x02;
    let (_, sk_b) = mirath_rx::protocol::keygen_from_seed(p, seed_b).unwrap();
    let message = hello_message();
    let blob =
        mirath_rx::sign_with_salt(p, &sk_b.to_bytes(), &message, vec![0u8; p.digest_bytes])
            .unwrap();
    assert!(!mirath_rx::verify(p, &pk_a, &message, &blob));
}

#[test]
fn tampered_instance_fingerprint_rejects_valid_blobs() {
    let p = params();
    let (pk_bytes, sk_bytes) = zero_seed_keys(p);
    let message = hello_message();
    let blob =
        mirath_rx::sign_with_salt(p, &sk_bytes, &message, vec![0u8; p.digest_bytes]).unwrap();

    let y_offset = 1 + p.lambda_bytes + p.matrix_bytes();
    let mut tampered_pk = pk_bytes.clone();
    tampered_pk[y_offset] ^= 0x01;
    assert!(!mirath_rx::verify(p, &tampered_pk, &message, &blob));
    // The untampered key still accepts, so the fingerprint was the cause.
    assert!(mirath_rx::verify(p, &pk_bytes, &message, &blob));
}

#[test]
fn equal_prescriptions_sign_and_verify_interchangeably() {
    let p = params();
    let (pk_bytes, sk_bytes) = zero_seed_keys(p);

    let mut first = Prescription::new();
    first
        .set(FieldId::PatientName, "Ada Lovelace")
        .set(FieldId::PatientId, "P-1815")
        .set(FieldId::PhysicianName, "Dr. Mary Walker")
        .set(FieldId::PhysicianLicense, "OH-55812")
        .set(FieldId::Medication, "Warfarin")
        .set(FieldId::Dosage, "5 mg")
        .set(FieldId::Quantity, "30")
        .set(FieldId::IssueDate, "2026-08-01");
    let mut second = Prescription::new();
    second
        .set(FieldId::IssueDate, "2026-08-01")
        .set(FieldId::Quantity, "030")
        .set(FieldId::Medication, "Warfarin")
        .set(FieldId::Dosage, "5 mg")
        .set(FieldId::PhysicianLicense, "OH-55812")
        .set(FieldId::PhysicianName, "Dr. Mary Walker")
        .set(FieldId::PatientId, "P-1815")
        .set(FieldId::PatientName, "Ada Lovelace");

    let msg_first = mirath_rx::canonicalize(&first).unwrap();
    let msg_second = mirath_rx::canonicalize(&second).unwrap();
    assert_eq!(msg_first, msg_second);

    let blob_first =
        mirath_rx::sign_with_salt(p, &sk_bytes, &msg_first, vec![0x11; p.digest_bytes]).unwrap();
    let blob_second =
        mirath_rx::sign_with_salt(p, &sk_bytes, &msg_second, vec![0x22; p.digest_bytes]).unwrap();
    // Each signature verifies against the other's canonical message,
    // because the messages are byte-identical.
    assert!(mirath_rx::verify(p, &pk_bytes, &msg_second, &blob_first));
    assert!(mirath_rx::verify(p, &pk_bytes, &msg_first, &blob_second));
}

#[test]
fn different_salts_change_the_blob_but_not_the_verdict() {
    let p = params();
    let (pk_bytes, sk_bytes) = zero_seed_keys(p);
    let message = hello_message();
    let blob_a =
        mirath_rx::sign_with_salt(p, &sk_bytes, &message, vec![0xaa; p.digest_bytes]).unwrap();
    let blob_b =
        mirath_rx::sign_with_salt(p, &sk_bytes, &message, vec![0xbb; p.digest_bytes]).unwrap();
    assert_ne!(blob_a, blob_b);
    assert!(mirath_rx::verify(p, &pk_bytes, &message, &blob_a));
    assert!(mirath_rx::verify(p, &pk_bytes, &message, &blob_b));
}

#[test]
fn unknown_parameter_tags_fail_closed() {
    assert!(ParamSet::from_tag(0x02).is_err());
    let p = params();
    let (pk_bytes, sk_bytes) = zero_seed_keys(p);
    let message = hello_message();
    let mut blob =
        mirath_rx::sign_with_salt(p, &sk_bytes, &message, vec![0u8; p.digest_bytes]).unwrap();
    blob[0] = 0x02;
    assert!(!mirath_rx::verify(p, &pk_bytes, &message, &blob));
}
