//! Public keys carried by certificates, ready for signature verification

use crate::oids;
use certstatus_asn1::{Element, UniversalTag};
use certstatus_asn1_der::Asn1DecodingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    /// ASN1 decoding error
    #[error("(ASN1) couldn't decode {element}: {source}")]
    Asn1Decoding {
        element: &'static str,
        source: Asn1DecodingError,
    },

    /// RSA error
    #[error("RSA error: {context}")]
    Rsa { context: String },

    /// EC error
    #[error("EC error: {context}")]
    Ec { context: String },

    /// unsupported algorithm
    #[error("unsupported key algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },
}

impl From<rsa::errors::Error> for KeyError {
    fn from(e: rsa::errors::Error) -> Self {
        Self::Rsa { context: e.to_string() }
    }
}

/// A verification key extracted from a `SubjectPublicKeyInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(rsa::RsaPublicKey),
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// ```text
    /// SubjectPublicKeyInfo  ::=  SEQUENCE  {
    ///      algorithm            AlgorithmIdentifier,
    ///      subjectPublicKey     BIT STRING  }
    /// ```
    pub fn from_subject_public_key_info(spki: &Element) -> Result<Self, KeyError> {
        let algorithm = spki
            .first_untagged_child(UniversalTag::SEQUENCE)
            .ok_or_else(|| missing("SubjectPublicKeyInfo algorithm"))?;
        let algorithm_oid = algorithm
            .first_untagged_child(UniversalTag::OID)
            .and_then(Element::as_oid)
            .ok_or_else(|| missing("public key algorithm identifier"))?;
        let key_bits = spki
            .first_untagged_child(UniversalTag::BIT_STRING)
            .and_then(Element::as_bit_string)
            .ok_or_else(|| missing("subjectPublicKey"))?;

        match algorithm_oid.as_str() {
            oids::RSA_ENCRYPTION => Self::from_rsa_public_key_der(key_bits.data()),
            oids::EC_PUBLIC_KEY => {
                let curve = algorithm
                    .nth_untagged_child(1, UniversalTag::OID)
                    .and_then(Element::as_oid)
                    .ok_or_else(|| KeyError::Ec {
                        context: "named curve parameter is missing".to_owned(),
                    })?;

                match curve.as_str() {
                    oids::SECP256R1 => p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bits.data())
                        .map(Self::P256)
                        .map_err(|e| KeyError::Ec {
                            context: format!("invalid P-256 point: {e}"),
                        }),
                    oids::SECP384R1 => p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bits.data())
                        .map(Self::P384)
                        .map_err(|e| KeyError::Ec {
                            context: format!("invalid P-384 point: {e}"),
                        }),
                    _ => Err(KeyError::UnsupportedAlgorithm {
                        algorithm: format!("EC curve {}", oids::name_or_dotted(curve)),
                    }),
                }
            }
            _ => Err(KeyError::UnsupportedAlgorithm {
                algorithm: oids::name_or_dotted(algorithm_oid),
            }),
        }
    }

    pub fn from_subject_public_key_info_der(der: &[u8]) -> Result<Self, KeyError> {
        let spki = certstatus_asn1_der::from_bytes(der).map_err(|source| KeyError::Asn1Decoding {
            element: "SubjectPublicKeyInfo",
            source,
        })?;
        Self::from_subject_public_key_info(&spki)
    }

    /// ```text
    /// RSAPublicKey ::= SEQUENCE {
    ///     modulus           INTEGER,  -- n
    ///     publicExponent    INTEGER   -- e
    /// }
    /// ```
    pub fn from_rsa_public_key_der(der: &[u8]) -> Result<Self, KeyError> {
        let key = certstatus_asn1_der::from_bytes(der).map_err(|source| KeyError::Asn1Decoding {
            element: "RSAPublicKey",
            source,
        })?;

        let component = |position: usize, name: &'static str| {
            key.nth_untagged_child(position, UniversalTag::INTEGER)
                .and_then(Element::as_integer)
                .and_then(|value| value.to_unsigned_bytes_be())
                .map(|bytes| rsa::BigUint::from_bytes_be(&bytes))
                .ok_or_else(|| KeyError::Rsa {
                    context: format!("{name} is missing or negative"),
                })
        };

        let modulus = component(0, "modulus")?;
        let public_exponent = component(1, "public exponent")?;

        Ok(Self::Rsa(rsa::RsaPublicKey::new(modulus, public_exponent)?))
    }

    pub fn algorithm_name(&self) -> &'static str {
        match self {
            Self::Rsa(_) => "RSA",
            Self::P256(_) => "ECDSA P-256",
            Self::P384(_) => "ECDSA P-384",
        }
    }
}

fn missing(element: &'static str) -> KeyError {
    KeyError::Asn1Decoding {
        element,
        source: Asn1DecodingError::missing(element),
    }
}
