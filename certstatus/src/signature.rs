use crate::hash::HashAlgorithm;
use crate::key::PublicKey;
use crate::oids;
use crate::x509::Certificate;
use certstatus_asn1::ObjectIdentifier;
use p256::ecdsa::signature::hazmat::PrehashVerifier as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    /// invalid signature
    #[error("invalid signature")]
    BadSignature,

    /// unsupported algorithm
    #[error("unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    /// key doesn't match the signature algorithm
    #[error("{key} key can't verify a {algorithm} signature")]
    KeyAlgorithmMismatch { key: &'static str, algorithm: SignatureAlgorithm },
}

/// Signature schemes certstatus can verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    RsaPkcs1v15(HashAlgorithm),
    Ecdsa(HashAlgorithm),
}

impl SignatureAlgorithm {
    /// Scheme named by a combined signature algorithm OID such as `sha256WithRSAEncryption`.
    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self, SignatureError> {
        let algorithm = match oid.as_str() {
            oids::SHA1_WITH_RSA_ENCRYPTION => Self::RsaPkcs1v15(HashAlgorithm::SHA1),
            oids::SHA224_WITH_RSA_ENCRYPTION => Self::RsaPkcs1v15(HashAlgorithm::SHA2_224),
            oids::SHA256_WITH_RSA_ENCRYPTION => Self::RsaPkcs1v15(HashAlgorithm::SHA2_256),
            oids::SHA384_WITH_RSA_ENCRYPTION => Self::RsaPkcs1v15(HashAlgorithm::SHA2_384),
            oids::SHA512_WITH_RSA_ENCRYPTION => Self::RsaPkcs1v15(HashAlgorithm::SHA2_512),
            oids::ID_RSASSA_PKCS1_V1_5_WITH_SHA3_256 => Self::RsaPkcs1v15(HashAlgorithm::SHA3_256),
            oids::ID_RSASSA_PKCS1_V1_5_WITH_SHA3_384 => Self::RsaPkcs1v15(HashAlgorithm::SHA3_384),
            oids::ID_RSASSA_PKCS1_V1_5_WITH_SHA3_512 => Self::RsaPkcs1v15(HashAlgorithm::SHA3_512),
            oids::ECDSA_WITH_SHA1 => Self::Ecdsa(HashAlgorithm::SHA1),
            oids::ECDSA_WITH_SHA224 => Self::Ecdsa(HashAlgorithm::SHA2_224),
            oids::ECDSA_WITH_SHA256 => Self::Ecdsa(HashAlgorithm::SHA2_256),
            oids::ECDSA_WITH_SHA384 => Self::Ecdsa(HashAlgorithm::SHA2_384),
            oids::ECDSA_WITH_SHA512 => Self::Ecdsa(HashAlgorithm::SHA2_512),
            _ => return Err(unsupported(oid)),
        };

        Ok(algorithm)
    }

    /// Scheme of a CMS `SignerInfo`.
    ///
    /// CMS producers may name only the key algorithm (`rsaEncryption`, `id-ecPublicKey`) in
    /// `signatureAlgorithm`, in which case the hash comes from `digestAlgorithm`.
    pub fn from_cms(signature_oid: &ObjectIdentifier, digest_oid: &ObjectIdentifier) -> Result<Self, SignatureError> {
        let digest = || HashAlgorithm::from_oid(digest_oid).ok_or_else(|| unsupported(digest_oid));

        match signature_oid.as_str() {
            oids::RSA_ENCRYPTION => Ok(Self::RsaPkcs1v15(digest()?)),
            oids::EC_PUBLIC_KEY => Ok(Self::Ecdsa(digest()?)),
            _ => Self::from_oid(signature_oid),
        }
    }

    pub fn hash_algorithm(self) -> HashAlgorithm {
        match self {
            Self::RsaPkcs1v15(hash) | Self::Ecdsa(hash) => hash,
        }
    }

    pub fn verify(self, public_key: &PublicKey, msg: &[u8], signature: &[u8]) -> Result<(), SignatureError> {
        let digest = self.hash_algorithm().digest(msg);

        match (self, public_key) {
            (Self::RsaPkcs1v15(hash), PublicKey::Rsa(key)) => {
                let scheme = match hash {
                    HashAlgorithm::SHA1 => rsa::Pkcs1v15Sign::new::<sha1::Sha1>(),
                    HashAlgorithm::SHA2_224 => rsa::Pkcs1v15Sign::new::<sha2::Sha224>(),
                    HashAlgorithm::SHA2_256 => rsa::Pkcs1v15Sign::new::<sha2::Sha256>(),
                    HashAlgorithm::SHA2_384 => rsa::Pkcs1v15Sign::new::<sha2::Sha384>(),
                    HashAlgorithm::SHA2_512 => rsa::Pkcs1v15Sign::new::<sha2::Sha512>(),
                    HashAlgorithm::SHA3_256 => rsa::Pkcs1v15Sign::new::<sha3::Sha3_256>(),
                    HashAlgorithm::SHA3_384 => rsa::Pkcs1v15Sign::new::<sha3::Sha3_384>(),
                    HashAlgorithm::SHA3_512 => rsa::Pkcs1v15Sign::new::<sha3::Sha3_512>(),
                };

                key.verify(scheme, &digest, signature)
                    .map_err(|_| SignatureError::BadSignature)
            }
            (Self::Ecdsa(_), PublicKey::P256(key)) => {
                let signature = p256::ecdsa::Signature::from_der(signature).map_err(|_| SignatureError::BadSignature)?;
                key.verify_prehash(&digest, &signature)
                    .map_err(|_| SignatureError::BadSignature)
            }
            // a SHA-1 digest is shorter than half of the P-384 field
            (Self::Ecdsa(HashAlgorithm::SHA1), PublicKey::P384(_)) => Err(SignatureError::UnsupportedAlgorithm {
                algorithm: format!("{} on {}", self, public_key.algorithm_name()),
            }),
            (Self::Ecdsa(_), PublicKey::P384(key)) => {
                let signature = p384::ecdsa::Signature::from_der(signature).map_err(|_| SignatureError::BadSignature)?;
                key.verify_prehash(&digest, &signature)
                    .map_err(|_| SignatureError::BadSignature)
            }
            (algorithm, key) => Err(SignatureError::KeyAlgorithmMismatch {
                key: key.algorithm_name(),
                algorithm,
            }),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RsaPkcs1v15(hash) => write!(f, "RSA PKCS#1 v1.5 with {}", hash),
            Self::Ecdsa(hash) => write!(f, "ECDSA with {}", hash),
        }
    }
}

/// Candidate certificates whose public key verifies `signature` over `signed`.
///
/// Fails only when `algorithm` itself isn't supported. Certificates whose key can't be used are skipped.
pub fn verify<'a, I>(
    signed: &[u8],
    signature: &[u8],
    candidates: I,
    algorithm: &ObjectIdentifier,
) -> Result<Vec<&'a Certificate>, SignatureError>
where
    I: IntoIterator<Item = &'a Certificate>,
{
    let algorithm = SignatureAlgorithm::from_oid(algorithm)?;
    Ok(verifying_certificates(signed, signature, candidates, algorithm))
}

pub(crate) fn verifying_certificates<'a, I>(
    signed: &[u8],
    signature: &[u8],
    candidates: I,
    algorithm: SignatureAlgorithm,
) -> Vec<&'a Certificate>
where
    I: IntoIterator<Item = &'a Certificate>,
{
    candidates
        .into_iter()
        .filter(|certificate| {
            let public_key = match certificate.public_key() {
                Ok(public_key) => public_key,
                Err(e) => {
                    log::warn!("skipping certificate {}: {}", certificate.subject_name(), e);
                    return false;
                }
            };

            match algorithm.verify(&public_key, signed, signature) {
                Ok(()) => true,
                Err(e) => {
                    log::debug!("{} didn't verify: {}", certificate.subject_name(), e);
                    false
                }
            }
        })
        .collect()
}

fn unsupported(oid: &ObjectIdentifier) -> SignatureError {
    SignatureError::UnsupportedAlgorithm {
        algorithm: oids::name_or_dotted(oid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand_chacha::rand_core::SeedableRng;
    use rstest::rstest;

    const MSG: &[u8] = b"certificate status";

    fn oid(value: &str) -> ObjectIdentifier {
        ObjectIdentifier::new(value).unwrap()
    }

    #[rstest]
    #[case(oids::SHA256_WITH_RSA_ENCRYPTION, SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::SHA2_256))]
    #[case(oids::ID_RSASSA_PKCS1_V1_5_WITH_SHA3_512, SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::SHA3_512))]
    #[case(oids::ECDSA_WITH_SHA384, SignatureAlgorithm::Ecdsa(HashAlgorithm::SHA2_384))]
    fn algorithm_from_oid(#[case] value: &str, #[case] expected: SignatureAlgorithm) {
        assert_eq!(SignatureAlgorithm::from_oid(&oid(value)).unwrap(), expected);
    }

    #[test]
    fn cms_pairing() {
        let rsa = SignatureAlgorithm::from_cms(&oid(oids::RSA_ENCRYPTION), &oid(oids::SHA384)).unwrap();
        assert_eq!(rsa, SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::SHA2_384));

        let ec = SignatureAlgorithm::from_cms(&oid(oids::EC_PUBLIC_KEY), &oid(oids::SHA256)).unwrap();
        assert_eq!(ec, SignatureAlgorithm::Ecdsa(HashAlgorithm::SHA2_256));

        // combined OIDs win over the digest algorithm
        let combined = SignatureAlgorithm::from_cms(&oid(oids::SHA1_WITH_RSA_ENCRYPTION), &oid(oids::SHA512)).unwrap();
        assert_eq!(combined, SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::SHA1));

        assert!(matches!(
            SignatureAlgorithm::from_cms(&oid(oids::RSA_ENCRYPTION), &oid(oids::MD5)),
            Err(SignatureError::UnsupportedAlgorithm { algorithm }) if algorithm == "md5"
        ));
    }

    #[test]
    fn dsa_is_unsupported() {
        assert!(matches!(
            SignatureAlgorithm::from_oid(&oid(oids::DSA_WITH_SHA256)),
            Err(SignatureError::UnsupportedAlgorithm { algorithm }) if algorithm == "dsaWithSHA256"
        ));
    }

    #[test]
    fn rsa_signature() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let private_key = rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let public_key = PublicKey::Rsa(private_key.to_public_key());

        let digest = HashAlgorithm::SHA2_256.digest(MSG);
        let signature = private_key
            .sign(rsa::Pkcs1v15Sign::new::<sha2::Sha256>(), &digest)
            .unwrap();

        let algorithm = SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::SHA2_256);
        algorithm.verify(&public_key, MSG, &signature).unwrap();

        assert!(matches!(
            algorithm.verify(&public_key, b"something else", &signature),
            Err(SignatureError::BadSignature)
        ));
        assert!(matches!(
            SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::SHA2_512).verify(&public_key, MSG, &signature),
            Err(SignatureError::BadSignature)
        ));
    }

    #[test]
    fn ecdsa_signature() {
        use p256::ecdsa::signature::Signer as _;

        let signing_key = p256::ecdsa::SigningKey::from_slice(&[0x17; 32]).unwrap();
        let public_key = PublicKey::P256(p256::ecdsa::VerifyingKey::from(&signing_key));
        let signature: p256::ecdsa::Signature = signing_key.sign(MSG);
        let der = signature.to_der();

        let algorithm = SignatureAlgorithm::Ecdsa(HashAlgorithm::SHA2_256);
        algorithm.verify(&public_key, MSG, der.as_bytes()).unwrap();

        assert!(matches!(
            algorithm.verify(&public_key, MSG, &[0x30, 0x00]),
            Err(SignatureError::BadSignature)
        ));
        assert!(matches!(
            SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::SHA2_256).verify(&public_key, MSG, der.as_bytes()),
            Err(SignatureError::KeyAlgorithmMismatch { key: "ECDSA P-256", .. })
        ));
    }

    #[test]
    fn p384_signature() {
        use p384::ecdsa::signature::Signer as _;

        let signing_key = p384::ecdsa::SigningKey::from_slice(&[0x2a; 48]).unwrap();
        let public_key = PublicKey::P384(p384::ecdsa::VerifyingKey::from(&signing_key));
        let signature: p384::ecdsa::Signature = signing_key.sign(MSG);
        let der = signature.to_der();

        SignatureAlgorithm::Ecdsa(HashAlgorithm::SHA2_384)
            .verify(&public_key, MSG, der.as_bytes())
            .unwrap();
        assert!(matches!(
            SignatureAlgorithm::Ecdsa(HashAlgorithm::SHA2_256).verify(&public_key, MSG, der.as_bytes()),
            Err(SignatureError::BadSignature)
        ));
        assert!(matches!(
            SignatureAlgorithm::Ecdsa(HashAlgorithm::SHA1).verify(&public_key, MSG, der.as_bytes()),
            Err(SignatureError::UnsupportedAlgorithm { algorithm }) if algorithm.ends_with("on ECDSA P-384")
        ));
    }
}
