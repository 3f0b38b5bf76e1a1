//! Object identifiers used across certstatus, and a static table of their names.

use certstatus_asn1::ObjectIdentifier;

macro_rules! define_oid {
    ( $( $uppercase:ident => $name:literal => $str_value:literal, )+ ) => {
        $( pub const $uppercase: &str = $str_value; )+

        static OID_NAMES: &[(&str, &str)] = &[ $( ($str_value, $name), )+ ];
    };
}

define_oid! {
    // OIW
    SHA1 => "sha1" => "1.3.14.3.2.26",

    // NIST
    SHA256 => "sha256" => "2.16.840.1.101.3.4.2.1",
    SHA384 => "sha384" => "2.16.840.1.101.3.4.2.2",
    SHA512 => "sha512" => "2.16.840.1.101.3.4.2.3",
    SHA224 => "sha224" => "2.16.840.1.101.3.4.2.4",
    SHA3_256 => "sha3-256" => "2.16.840.1.101.3.4.2.8",
    SHA3_384 => "sha3-384" => "2.16.840.1.101.3.4.2.9",
    SHA3_512 => "sha3-512" => "2.16.840.1.101.3.4.2.10",
    DSA_WITH_SHA256 => "dsaWithSHA256" => "2.16.840.1.101.3.4.3.2",
    ID_RSASSA_PKCS1_V1_5_WITH_SHA3_256 => "id-rsassa-pkcs1-v1_5-with-sha3-256" => "2.16.840.1.101.3.4.3.14",
    ID_RSASSA_PKCS1_V1_5_WITH_SHA3_384 => "id-rsassa-pkcs1-v1_5-with-sha3-384" => "2.16.840.1.101.3.4.3.15",
    ID_RSASSA_PKCS1_V1_5_WITH_SHA3_512 => "id-rsassa-pkcs1-v1_5-with-sha3-512" => "2.16.840.1.101.3.4.3.16",

    // RSADSI
    RSA_ENCRYPTION => "rsaEncryption" => "1.2.840.113549.1.1.1",
    SHA1_WITH_RSA_ENCRYPTION => "sha1WithRSAEncryption" => "1.2.840.113549.1.1.5",
    SHA256_WITH_RSA_ENCRYPTION => "sha256WithRSAEncryption" => "1.2.840.113549.1.1.11",
    SHA384_WITH_RSA_ENCRYPTION => "sha384WithRSAEncryption" => "1.2.840.113549.1.1.12",
    SHA512_WITH_RSA_ENCRYPTION => "sha512WithRSAEncryption" => "1.2.840.113549.1.1.13",
    SHA224_WITH_RSA_ENCRYPTION => "sha224WithRSAEncryption" => "1.2.840.113549.1.1.14",
    MD5 => "md5" => "1.2.840.113549.2.5",

    // ANSI-X9
    DSA => "dsaEncryption" => "1.2.840.10040.4.1",
    DSA_WITH_SHA1 => "dsaWithSHA1" => "1.2.840.10040.4.3",
    EC_PUBLIC_KEY => "ecPublicKey" => "1.2.840.10045.2.1",
    SECP256R1 => "prime256v1" => "1.2.840.10045.3.1.7",
    ECDSA_WITH_SHA1 => "ecdsa-with-SHA1" => "1.2.840.10045.4.1",
    ECDSA_WITH_SHA224 => "ecdsa-with-SHA224" => "1.2.840.10045.4.3.1",
    ECDSA_WITH_SHA256 => "ecdsa-with-SHA256" => "1.2.840.10045.4.3.2",
    ECDSA_WITH_SHA384 => "ecdsa-with-SHA384" => "1.2.840.10045.4.3.3",
    ECDSA_WITH_SHA512 => "ecdsa-with-SHA512" => "1.2.840.10045.4.3.4",

    // Certicom
    SECP384R1 => "secp384r1" => "1.3.132.0.34",

    // X.520 attribute types
    AT_COMMON_NAME => "commonName" => "2.5.4.3",
    AT_SURNAME => "surname" => "2.5.4.4",
    AT_SERIAL_NUMBER => "serialNumber" => "2.5.4.5",
    AT_COUNTRY_NAME => "countryName" => "2.5.4.6",
    AT_LOCALITY_NAME => "localityName" => "2.5.4.7",
    AT_STATE_OR_PROVINCE_NAME => "stateOrProvinceName" => "2.5.4.8",
    AT_STREET_NAME => "streetAddress" => "2.5.4.9",
    AT_ORGANIZATION_NAME => "organizationName" => "2.5.4.10",
    AT_ORGANIZATIONAL_UNIT_NAME => "organizationalUnitName" => "2.5.4.11",
    AT_TITLE => "title" => "2.5.4.12",
    AT_GIVEN_NAME => "givenName" => "2.5.4.42",
    EMAIL_ADDRESS => "emailAddress" => "1.2.840.113549.1.9.1", // deprecated

    // certificate extensions
    SUBJECT_KEY_IDENTIFIER => "subjectKeyIdentifier" => "2.5.29.14",
    KEY_USAGE => "keyUsage" => "2.5.29.15",
    SUBJECT_ALTERNATIVE_NAME => "subjectAltName" => "2.5.29.17",
    BASIC_CONSTRAINTS => "basicConstraints" => "2.5.29.19",
    CRL_REASON => "cRLReason" => "2.5.29.21",
    CRL_DISTRIBUTION_POINTS => "cRLDistributionPoints" => "2.5.29.31",
    AUTHORITY_KEY_IDENTIFIER => "authorityKeyIdentifier" => "2.5.29.35",
    EXTENDED_KEY_USAGE => "extKeyUsage" => "2.5.29.37",
    AUTHORITY_INFO_ACCESS => "authorityInfoAccess" => "1.3.6.1.5.5.7.1.1",

    // extended key purposes
    KP_SERVER_AUTH => "serverAuth" => "1.3.6.1.5.5.7.3.1",
    KP_CLIENT_AUTH => "clientAuth" => "1.3.6.1.5.5.7.3.2",
    KP_CODE_SIGNING => "codeSigning" => "1.3.6.1.5.5.7.3.3",
    KP_TIME_STAMPING => "timeStamping" => "1.3.6.1.5.5.7.3.8",
    KP_OCSP_SIGNING => "OCSPSigning" => "1.3.6.1.5.5.7.3.9",

    // access descriptors
    AD_OCSP => "ocsp" => "1.3.6.1.5.5.7.48.1",
    AD_CA_ISSUERS => "caIssuers" => "1.3.6.1.5.5.7.48.2",
    OCSP_BASIC_RESPONSE => "id-pkix-ocsp-basic" => "1.3.6.1.5.5.7.48.1.1",
    OCSP_NONCE => "id-pkix-ocsp-nonce" => "1.3.6.1.5.5.7.48.1.2",

    // CMS (RFC 5652) and time-stamp protocol (RFC 3161)
    PKCS7_DATA => "id-data" => "1.2.840.113549.1.7.1",
    SIGNED_DATA => "id-signedData" => "1.2.840.113549.1.7.2",
    CONTENT_TYPE => "id-contentType" => "1.2.840.113549.1.9.3",
    MESSAGE_DIGEST => "id-messageDigest" => "1.2.840.113549.1.9.4",
    SIGNING_TIME => "id-signingTime" => "1.2.840.113549.1.9.5",
    TST_INFO => "id-ct-TSTInfo" => "1.2.840.113549.1.9.16.1.4",
    SIGNING_CERTIFICATE => "id-aa-signingCertificate" => "1.2.840.113549.1.9.16.2.12",
    SIGNING_CERTIFICATE_V2 => "id-aa-signingCertificateV2" => "1.2.840.113549.1.9.16.2.47",
}

/// Human readable name registered for a dotted OID, if any.
pub fn oid_name(oid: &str) -> Option<&'static str> {
    OID_NAMES
        .iter()
        .find(|(value, _)| *value == oid)
        .map(|(_, name)| *name)
}

/// Parsed form of one of the constants of this module.
pub fn object_identifier(value: &'static str) -> ObjectIdentifier {
    match ObjectIdentifier::new(value) {
        Ok(oid) => oid,
        Err(e) => unreachable!("static OID table entry: {}", e),
    }
}

/// Name of `oid`, falling back to its dotted form.
pub fn name_or_dotted(oid: &ObjectIdentifier) -> String {
    oid_name(oid.as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| oid.to_string())
}

/// Source of names for OIDs missing from the static table.
///
/// Plug in a registry lookup here; certstatus itself never resolves names over the network.
pub trait OidResolver {
    fn resolve(&self, oid: &ObjectIdentifier) -> Option<String>;
}

/// Resolver backed by the static table only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticOidResolver;

impl OidResolver for StaticOidResolver {
    fn resolve(&self, oid: &ObjectIdentifier) -> Option<String> {
        oid_name(oid.as_str()).map(str::to_owned)
    }
}
