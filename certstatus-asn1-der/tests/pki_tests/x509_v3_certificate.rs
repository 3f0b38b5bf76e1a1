/****************************************************************************
 * https://tools.ietf.org/html/rfc5280#section-4.1
 *
 *  Certificate  ::=  SEQUENCE  {
 *       tbsCertificate       TBSCertificate,
 *       signatureAlgorithm   AlgorithmIdentifier,
 *       signatureValue       BIT STRING  }
 *
 *  TBSCertificate  ::=  SEQUENCE  {
 *       version         [0]  EXPLICIT Version DEFAULT v1,
 *       serialNumber         CertificateSerialNumber,
 *       signature            AlgorithmIdentifier,
 *       issuer               Name,
 *       validity             Validity,
 *       subject              Name,
 *       subjectPublicKeyInfo SubjectPublicKeyInfo,
 *       issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
 *                            -- If present, version MUST be v2 or v3
 *       subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
 *                            -- If present, version MUST be v2 or v3
 *       extensions      [3]  EXPLICIT Extensions OPTIONAL
 *                            -- If present, version MUST be v3
 *       }
 *
 *  Version  ::=  INTEGER  {  v1(0), v2(1), v3(2)  }
 *
 *  CertificateSerialNumber  ::=  INTEGER
 *
 *  Validity ::= SEQUENCE {
 *       notBefore      Time,
 *       notAfter       Time }
 *
 *  Time ::= CHOICE {
 *       utcTime        UTCTime,
 *       generalTime    GeneralizedTime }
 *
 *  UniqueIdentifier  ::=  BIT STRING
 *
 *  SubjectPublicKeyInfo  ::=  SEQUENCE  {
 *       algorithm            AlgorithmIdentifier,
 *       subjectPublicKey     BIT STRING  }
 *
 *  Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension
 *
 *  Extension  ::=  SEQUENCE  {
 *       extnID      OBJECT IDENTIFIER,
 *       critical    BOOLEAN DEFAULT FALSE,
 *       extnValue   OCTET STRING
 *                   -- contains the DER encoding of an ASN.1 value
 *                   -- corresponding to the extension type identified
 *                   -- by extnID
 *       }
 *
 ****************************************************************************/
// https://lapo.it/asn1js/#MIIEGjCCAgKgAwIBAgIEN8NXxDANBgkqhkiG9w0BAQsFADAiMSAwHgYDVQQDDBdjb250b3NvLmxvY2FsIEF1dGhvcml0eTAeFw0xOTEwMTcxNzQxMjhaFw0yMjEwMTYxNzQxMjhaMB0xGzAZBgNVBAMMEnRlc3QuY29udG9zby5sb2NhbDCCASIwDQYJKoZIhvcNAQEBBQADggEPADCCAQoCggEBAMptALdk7xKj9JmFSycxlaTV47oLv5Aabir17f1WseAcZ492Mx0wqcJMmT8rVAusyfqvrhodHu4GELGBySo4KChLEuoEOGTNw_wEMtM6j1E9K7kig1iiuH9nf9oow7OUdix4-w7TWQWpwl1NekKdTtvLLtEGSjmG187CUqR6fNHYag-iVMV5Umc5VQadvAgva8qxOsPpDkN_E2df5gST7H5g3igaZtxUa3x7VreN3qJP0-hYQiyM7KsgmdFAkKpHC6_k36H7SXtpzh0NbH5OJHifYsAP34WL-a6lAd0VM7UiIRMcLWA8HfmKL3p4bC-LFv5I0dvUUy1BTz1wHpRvVz8CAwEAAaNdMFswCQYDVR0TBAIwADAOBgNVHQ8BAf8EBAMCAaAwHQYDVR0OBBYEFCMimIgHf5c00sI9jZzeWoMLsR60MB8GA1UdIwQYMBaAFBbHC24DEnsUFLz_zmqB5cMCHo9OMA0GCSqGSIb3DQEBCwUAA4ICAQA1ehZTTBbes2DgGXwQugoV9PdOGMFEVT4dzrrluo_4exSfqLrNuY2NXVuNBKW4nDA5aD71Q_KUZ8Y8cV9qa8OBJQvQ0dd0qeHmeEYdDsj5YD4ECycKx9U1ZX5fi6tpSIX6DsietpCnrw4aTgbEOvMeQcuYCTP30Vpt-mYEKBlR_E2Vcl2zUD-67gqppSaC1RceL_8Cy6ZXlPqwmS2zqK9UhYVRKlEww8xSh_9CR9MmIDc4pHtCpMawcn6Dmo-A-LcKi5v_NIwvSJTei-h1gvRhvEOPcf4VZJMHXquNrxkMsKpuu7g_AYH7wl2MBaNaxyNlXY5e5OjxslrbRCfDab11YaJEONcBnapl_-Ajr70uVFN09tDXyk0EHYf75NiRztgVKclna26zP5qRb0JSYNQJW2kIIBX6DhU7kt6RcauF2hJ-jLWOF2vsAS8PdEr7vnR1EGOrrcQ3VUgMscNsDqf50YMi2Inu1Kt2t-QSvYs61ON39aVpqR67nskdUWzFCVgWQVezM1ZagoOyNp7WjRYl8hJ0YVZ7TRtP8nJOkZ6s046YHVWxMuGdqZfd_AUFb9xzzXjGRuuZ1JmSf-VBOFEe2MaPMyMQBeIs3Othz6Fcy6Am5F6c3It31WYJwiCa_NdbMIvGy1xvAN5kzR_Y6hkoQljoSr1rVuszJ9dtvuTccA

use base64::engine::general_purpose;
use base64::Engine as _;
use certstatus_asn1::{BigInteger, BitString, Element, ObjectIdentifier, Tag, TagClass, TagEnvironment, UniversalTag};
use time::macros::datetime;

fn oid(value: &str) -> ObjectIdentifier {
    ObjectIdentifier::new(value).unwrap()
}

fn encoded_certificate() -> Vec<u8> {
    general_purpose::STANDARD
        .decode(
            "MIIEGjCCAgKgAwIBAgIEN8NXxDANBgkqhkiG9w0BAQsFADAiMSAwHgYDVQQ\
             DDBdjb250b3NvLmxvY2FsIEF1dGhvcml0eTAeFw0xOTEwMTcxNzQxMjhaFw0yMjEwM\
             TYxNzQxMjhaMB0xGzAZBgNVBAMMEnRlc3QuY29udG9zby5sb2NhbDCCASIwDQYJKoZ\
             IhvcNAQEBBQADggEPADCCAQoCggEBAMptALdk7xKj9JmFSycxlaTV47oLv5Aabir17\
             f1WseAcZ492Mx0wqcJMmT8rVAusyfqvrhodHu4GELGBySo4KChLEuoEOGTNw/wEMtM\
             6j1E9K7kig1iiuH9nf9oow7OUdix4+w7TWQWpwl1NekKdTtvLLtEGSjmG187CUqR6f\
             NHYag+iVMV5Umc5VQadvAgva8qxOsPpDkN/E2df5gST7H5g3igaZtxUa3x7VreN3qJ\
             P0+hYQiyM7KsgmdFAkKpHC6/k36H7SXtpzh0NbH5OJHifYsAP34WL+a6lAd0VM7UiI\
             RMcLWA8HfmKL3p4bC+LFv5I0dvUUy1BTz1wHpRvVz8CAwEAAaNdMFswCQYDVR0TBAI\
             wADAOBgNVHQ8BAf8EBAMCAaAwHQYDVR0OBBYEFCMimIgHf5c00sI9jZzeWoMLsR60M\
             B8GA1UdIwQYMBaAFBbHC24DEnsUFLz/zmqB5cMCHo9OMA0GCSqGSIb3DQEBCwUAA4I\
             CAQA1ehZTTBbes2DgGXwQugoV9PdOGMFEVT4dzrrluo/4exSfqLrNuY2NXVuNBKW4n\
             DA5aD71Q/KUZ8Y8cV9qa8OBJQvQ0dd0qeHmeEYdDsj5YD4ECycKx9U1ZX5fi6tpSIX\
             6DsietpCnrw4aTgbEOvMeQcuYCTP30Vpt+mYEKBlR/E2Vcl2zUD+67gqppSaC1RceL\
             /8Cy6ZXlPqwmS2zqK9UhYVRKlEww8xSh/9CR9MmIDc4pHtCpMawcn6Dmo+A+LcKi5v\
             /NIwvSJTei+h1gvRhvEOPcf4VZJMHXquNrxkMsKpuu7g/AYH7wl2MBaNaxyNlXY5e5\
             OjxslrbRCfDab11YaJEONcBnapl/+Ajr70uVFN09tDXyk0EHYf75NiRztgVKclna26\
             zP5qRb0JSYNQJW2kIIBX6DhU7kt6RcauF2hJ+jLWOF2vsAS8PdEr7vnR1EGOrrcQ3V\
             UgMscNsDqf50YMi2Inu1Kt2t+QSvYs61ON39aVpqR67nskdUWzFCVgWQVezM1ZagoO\
             yNp7WjRYl8hJ0YVZ7TRtP8nJOkZ6s046YHVWxMuGdqZfd/AUFb9xzzXjGRuuZ1JmSf\
             +VBOFEe2MaPMyMQBeIs3Othz6Fcy6Am5F6c3It31WYJwiCa/NdbMIvGy1xvAN5kzR/\
             Y6hkoQljoSr1rVuszJ9dtvuTccA==",
        )
        .expect("invalid base64")
}

fn common_name(value: &str) -> Element {
    Element::sequence(vec![Element::set(vec![Element::sequence(vec![
        Element::oid(oid("2.5.4.3")),
        Element::utf8_string(value),
    ])])])
}

#[test]
fn x509_v3_certificate() {
    let encoded = encoded_certificate();

    let issuer = common_name("contoso.local Authority");
    check!(issuer in encoded[34..70]);

    let validity = Element::sequence(vec![
        Element::utc_time(datetime!(2019-10-17 17:41:28 UTC)),
        Element::utc_time(datetime!(2022-10-16 17:41:28 UTC)),
    ]);
    check!(validity in encoded[70..102]);

    let subject = common_name("test.contoso.local");
    check!(subject in encoded[102..133]);

    let subject_key_identifier = Element::octet_string(vec![
        0x23, 0x22, 0x98, 0x88, 0x07, 0x7F, 0x97, 0x34, 0xD2, 0xC2, 0x3D, 0x8D, 0x9C, 0xDE, 0x5A, 0x83, 0x0B, 0xB1,
        0x1E, 0xB4,
    ]);
    check!(subject_key_identifier in encoded[467..489]);
}

#[test]
fn x509_v3_certificate_round_trip() {
    let encoded = encoded_certificate();

    let certificate = certstatus_asn1_der::from_bytes(&encoded).expect("certificate decoding");
    let reencoded = certstatus_asn1_der::to_vec(&certificate).expect("certificate encoding");
    pretty_assertions::assert_eq!(reencoded, encoded);

    let tbs_certificate = certificate
        .first_untagged_child(UniversalTag::SEQUENCE)
        .expect("tbsCertificate");

    let version = tbs_certificate
        .first_child_of_type(0, TagClass::ContextSpecific, Some(TagEnvironment::Explicit))
        .and_then(Element::as_integer);
    assert_eq!(version, Some(&BigInteger::from(2)));

    let serial_number = tbs_certificate
        .first_untagged_child(UniversalTag::INTEGER)
        .and_then(Element::as_integer);
    assert_eq!(serial_number, Some(&BigInteger::from(935548868)));

    let signature_algorithm = certificate
        .nth_untagged_child(1, UniversalTag::SEQUENCE)
        .and_then(|algorithm| algorithm.first_untagged_child(UniversalTag::OID))
        .and_then(Element::as_oid);
    assert_eq!(signature_algorithm, Some(&oid("1.2.840.113549.1.1.11")));

    let extensions = tbs_certificate.context_child(3).expect("extensions");
    assert_eq!(extensions.tag(), Some(&Tag::explicit(3)));
    assert_eq!(extensions.children().len(), 4);

    let signature = certificate
        .first_untagged_child(UniversalTag::BIT_STRING)
        .and_then(Element::as_bit_string)
        .map(BitString::bit_len);
    assert_eq!(signature, Some(4096));
}
