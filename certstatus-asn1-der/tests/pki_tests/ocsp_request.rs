/****************************************************************************
 * https://tools.ietf.org/html/rfc6960#section-4.1.1
 *
 * OCSPRequest     ::=     SEQUENCE {
 *     tbsRequest                  TBSRequest,
 *     optionalSignature   [0]     EXPLICIT Signature OPTIONAL }
 *
 * TBSRequest      ::=     SEQUENCE {
 *     version             [0]     EXPLICIT Version DEFAULT v1,
 *     requestorName       [1]     EXPLICIT GeneralName OPTIONAL,
 *     requestList                 SEQUENCE OF Request,
 *     requestExtensions   [2]     EXPLICIT Extensions OPTIONAL }
 *
 * Request         ::=     SEQUENCE {
 *     reqCert                     CertID,
 *     singleRequestExtensions     [0] EXPLICIT Extensions OPTIONAL }
 *
 * CertID          ::=     SEQUENCE {
 *     hashAlgorithm       AlgorithmIdentifier,
 *     issuerNameHash      OCTET STRING, -- Hash of Issuer's DN
 *     issuerKeyHash       OCTET STRING, -- Hash of Issuers public key
 *     serialNumber        CertificateSerialNumber }
 ****************************************************************************/
// https://lapo.it/asn1js/#MEIwQDA-MDwwOjAJBgUrDgMCGgUABBT4cyABkyiCIhU4JpmIBewdDnn8ZgQUbyBZ44kgy35o7xW5BMzM8FTvyTwCAQE

use base64::engine::general_purpose;
use base64::Engine as _;
use certstatus_asn1::{Element, ObjectIdentifier, UniversalTag};

fn cert_id() -> Element {
    Element::sequence(vec![
        Element::sequence(vec![
            Element::oid(ObjectIdentifier::new("1.3.14.3.2.26").unwrap()),
            Element::null(),
        ]),
        Element::octet_string(vec![
            0xf8, 0x73, 0x20, 0x01, 0x93, 0x28, 0x82, 0x22, 0x15, 0x38, 0x26, 0x99, 0x88, 0x05, 0xec, 0x1d, 0x0e, 0x79,
            0xfc, 0x66,
        ]),
        Element::octet_string(vec![
            0x6f, 0x20, 0x59, 0xe3, 0x89, 0x20, 0xcb, 0x7e, 0x68, 0xef, 0x15, 0xb9, 0x04, 0xcc, 0xcc, 0xf0, 0x54, 0xef,
            0xc9, 0x3c,
        ]),
        Element::integer(1),
    ])
}

#[test]
fn ocsp_request() {
    let encoded_ocsp_request = general_purpose::STANDARD
        .decode(
            "MEIwQDA+MDwwOjAJBgUrDgMCGgUABBT4cyABkyiCIhU4J\
         pmIBewdDnn8ZgQUbyBZ44kgy35o7xW5BMzM8FTvyTwCAQE=",
        )
        .expect("invalid base64");

    let ocsp_request = Element::sequence(vec![Element::sequence(vec![Element::sequence(vec![
        Element::sequence(vec![cert_id()]),
    ])])]);

    check!(ocsp_request in encoded_ocsp_request);

    let cert_id = cert_id();
    check!(cert_id in encoded_ocsp_request[8..68]);
}

#[test]
fn ocsp_request_navigation() {
    let encoded_ocsp_request = general_purpose::STANDARD
        .decode("MEIwQDA+MDwwOjAJBgUrDgMCGgUABBT4cyABkyiCIhU4JpmIBewdDnn8ZgQUbyBZ44kgy35o7xW5BMzM8FTvyTwCAQE=")
        .expect("invalid base64");

    let decoded = certstatus_asn1_der::from_bytes(&encoded_ocsp_request).unwrap();

    let request_list = decoded
        .first_untagged_child(UniversalTag::SEQUENCE)
        .and_then(|tbs_request| tbs_request.first_untagged_child(UniversalTag::SEQUENCE))
        .expect("request list");
    assert_eq!(request_list.children().len(), 1);

    let serial_number = request_list.children()[0]
        .first_untagged_child(UniversalTag::SEQUENCE)
        .and_then(|cert_id| cert_id.first_untagged_child(UniversalTag::INTEGER))
        .and_then(Element::as_integer)
        .expect("serial number");
    assert_eq!(serial_number.to_u64(), Some(1));
}
