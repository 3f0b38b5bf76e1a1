//! Hash algorithms supported by certstatus

use crate::oids;
use certstatus_asn1::ObjectIdentifier;
use digest::Digest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported hash algorithms
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HashAlgorithm {
    SHA1,
    SHA2_224,
    SHA2_256,
    SHA2_384,
    SHA2_512,
    SHA3_256,
    SHA3_384,
    SHA3_512,
}

impl HashAlgorithm {
    pub fn digest(self, msg: &[u8]) -> Vec<u8> {
        match self {
            Self::SHA1 => sha1::Sha1::digest(msg).to_vec(),
            Self::SHA2_224 => sha2::Sha224::digest(msg).to_vec(),
            Self::SHA2_256 => sha2::Sha256::digest(msg).to_vec(),
            Self::SHA2_384 => sha2::Sha384::digest(msg).to_vec(),
            Self::SHA2_512 => sha2::Sha512::digest(msg).to_vec(),
            Self::SHA3_256 => sha3::Sha3_256::digest(msg).to_vec(),
            Self::SHA3_384 => sha3::Sha3_384::digest(msg).to_vec(),
            Self::SHA3_512 => sha3::Sha3_512::digest(msg).to_vec(),
        }
    }

    /// Digest length in bytes.
    pub fn output_size(self) -> usize {
        match self {
            Self::SHA1 => 20,
            Self::SHA2_224 => 28,
            Self::SHA2_256 | Self::SHA3_256 => 32,
            Self::SHA2_384 | Self::SHA3_384 => 48,
            Self::SHA2_512 | Self::SHA3_512 => 64,
        }
    }

    pub fn oid(self) -> &'static str {
        match self {
            Self::SHA1 => oids::SHA1,
            Self::SHA2_224 => oids::SHA224,
            Self::SHA2_256 => oids::SHA256,
            Self::SHA2_384 => oids::SHA384,
            Self::SHA2_512 => oids::SHA512,
            Self::SHA3_256 => oids::SHA3_256,
            Self::SHA3_384 => oids::SHA3_384,
            Self::SHA3_512 => oids::SHA3_512,
        }
    }

    /// Hash algorithm registered under a digest algorithm OID.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        match oid.as_str() {
            oids::SHA1 => Some(Self::SHA1),
            oids::SHA224 => Some(Self::SHA2_224),
            oids::SHA256 => Some(Self::SHA2_256),
            oids::SHA384 => Some(Self::SHA2_384),
            oids::SHA512 => Some(Self::SHA2_512),
            oids::SHA3_256 => Some(Self::SHA3_256),
            oids::SHA3_384 => Some(Self::SHA3_384),
            oids::SHA3_512 => Some(Self::SHA3_512),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SHA1 => "SHA-1",
            Self::SHA2_224 => "SHA-224",
            Self::SHA2_256 => "SHA-256",
            Self::SHA2_384 => "SHA-384",
            Self::SHA2_512 => "SHA-512",
            Self::SHA3_256 => "SHA3-256",
            Self::SHA3_384 => "SHA3-384",
            Self::SHA3_512 => "SHA3-512",
        };
        f.write_str(name)
    }
}
