//! Signed-prescription envelope.
//!
//! A `SignedPrescription` carries the structured prescription, the
//! signer's public key, the signature blob, and the exact canonical bytes
//! that were signed. The canonical bytes are never read off the wire: both
//! construction and deserialization recompute them from the prescription,
//! so a tampered prescription cannot ride under an old signature.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::canonical::Prescription;
use crate::error::EnvelopeError;
use crate::keys::SecretKey;
use crate::params::ParamSet;
use crate::protocol;

#[derive(Debug, Clone)]
pub struct SignedPrescription {
    pub prescription: Prescription,
    public_key: Vec<u8>,
    signature: Vec<u8>,
    /// Canonical bytes used for signing/verification; recomputed, never
    /// deserialized.
    canonical: Vec<u8>,
}

impl SignedPrescription {
    /// Canonicalize and sign a prescription, deriving the public key from
    /// the secret seed so the envelope is self-contained.
    pub fn create<R: rand::RngCore + rand::CryptoRng>(
        params: &ParamSet,
        prescription: Prescription,
        sk_bytes: &[u8],
        rng: &mut R,
    ) -> Result<SignedPrescription, EnvelopeError> {
        let canonical = prescription.canonical_bytes()?;
        let sk = SecretKey::from_bytes(params, sk_bytes)?;
        let (pk, sk) = protocol::keygen_from_seed(params, sk.seed().to_vec())?;
        let signature = protocol::sign(params, &sk, &canonical, rng)?.to_bytes(params);
        Ok(SignedPrescription {
            prescription,
            public_key: pk.to_bytes(params),
            signature,
            canonical,
        })
    }

    /// Re-canonicalize and run core verification against the embedded key.
    pub fn verify(&self, params: &ParamSet) -> bool {
        protocol::verify(params, &self.public_key, &self.canonical, &self.signature)
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn canonical_bytes(&self) -> &[u8] {
        &self.canonical
    }
}

impl Serialize for SignedPrescription {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("SignedPrescription", 3)?;
        state.serialize_field("prescription", &self.prescription)?;
        state.serialize_field("public_key", &format!("0x{}", hex::encode(&self.public_key)))?;
        state.serialize_field("signature", &format!("0x{}", hex::encode(&self.signature)))?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for SignedPrescription {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct EnvelopeVisitor;

        impl<'de> Visitor<'de> for EnvelopeVisitor {
            type Value = SignedPrescription;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("struct SignedPrescription")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut prescription: Option<Prescription> = None;
                let mut public_key_hex: Option<String> = None;
                let mut signature_hex: Option<String> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "prescription" => {
                            if prescription.is_some() {
                                return Err(serde::de::Error::duplicate_field("prescription"));
                            }
                            prescription = Some(map.next_value()?);
                        }
                        "public_key" => {
                            if public_key_hex.is_some() {
                                return Err(serde::de::Error::duplicate_field("public_key"));
                            }
                            public_key_hex = Some(map.next_value()?);
                        }
                        "signature" => {
                            if signature_hex.is_some() {
                                return Err(serde::de::Error::duplicate_field("signature"));
                            }
                            signature_hex = Some(map.next_value()?);
                        }
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                let prescription = prescription
                    .ok_or_else(|| serde::de::Error::missing_field("prescription"))?;
                let public_key_hex =
                    public_key_hex.ok_or_else(|| serde::de::Error::missing_field("public_key"))?;
                let signature_hex =
                    signature_hex.ok_or_else(|| serde::de::Error::missing_field("signature"))?;
                let public_key =
                    decode_hex_field(&public_key_hex).map_err(serde::de::Error::custom)?;
                let signature =
                    decode_hex_field(&signature_hex).map_err(serde::de::Error::custom)?;

                // Recompute the transcript from the deserialized value.
                let canonical = prescription
                    .canonical_bytes()
                    .map_err(serde::de::Error::custom)?;

                Ok(SignedPrescription {
                    prescription,
                    public_key,
                    signature,
                    canonical,
                })
            }
        }

        fn decode_hex_field(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
            let stripped = value.strip_prefix("0x").unwrap_or(value);
            hex::decode(stripped)
        }

        deserializer.deserialize_struct(
            "SignedPrescription",
            &["prescription", "public_key", "signature"],
            EnvelopeVisitor,
        )
    }
}
