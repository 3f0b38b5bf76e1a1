use crate::ocsp::OcspError;
use certstatus_asn1::{BigInteger, Element, UniversalTag};
use certstatus_asn1_der::Asn1DecodingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// ```text
/// CRLReason ::= ENUMERATED {
///      unspecified             (0),
///      keyCompromise           (1),
///      cACompromise            (2),
///      affiliationChanged      (3),
///      superseded              (4),
///      cessationOfOperation    (5),
///      certificateHold         (6),
///           -- value 7 is not used
///      removeFromCRL           (8),
///      privilegeWithdrawn      (9),
///      aACompromise           (10) }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

impl RevocationReason {
    pub fn from_code(code: u64) -> Option<Self> {
        let reason = match code {
            0 => Self::Unspecified,
            1 => Self::KeyCompromise,
            2 => Self::CaCompromise,
            3 => Self::AffiliationChanged,
            4 => Self::Superseded,
            5 => Self::CessationOfOperation,
            6 => Self::CertificateHold,
            8 => Self::RemoveFromCrl,
            9 => Self::PrivilegeWithdrawn,
            10 => Self::AaCompromise,
            _ => return None,
        };

        Some(reason)
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::KeyCompromise => 1,
            Self::CaCompromise => 2,
            Self::AffiliationChanged => 3,
            Self::Superseded => 4,
            Self::CessationOfOperation => 5,
            Self::CertificateHold => 6,
            Self::RemoveFromCrl => 8,
            Self::PrivilegeWithdrawn => 9,
            Self::AaCompromise => 10,
        }
    }
}

impl Default for RevocationReason {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "unspecified",
            Self::KeyCompromise => "keyCompromise",
            Self::CaCompromise => "cACompromise",
            Self::AffiliationChanged => "affiliationChanged",
            Self::Superseded => "superseded",
            Self::CessationOfOperation => "cessationOfOperation",
            Self::CertificateHold => "certificateHold",
            Self::RemoveFromCrl => "removeFromCRL",
            Self::PrivilegeWithdrawn => "privilegeWithdrawn",
            Self::AaCompromise => "aACompromise",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStatus {
    Good,
    Revoked {
        revoked_on: OffsetDateTime,
        reason: RevocationReason,
    },
    Unknown,
}

/// Status of one certificate, as reported by a `SingleResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    serial_number: BigInteger,
    status: CertStatus,
    this_update: OffsetDateTime,
    next_update: Option<OffsetDateTime>,
}

impl Response {
    pub fn serial_number(&self) -> &BigInteger {
        &self.serial_number
    }

    pub fn status(&self) -> CertStatus {
        self.status
    }

    /// `None` when the responder doesn't know the certificate.
    pub fn is_revoked(&self) -> Option<bool> {
        match self.status {
            CertStatus::Good => Some(false),
            CertStatus::Revoked { .. } => Some(true),
            CertStatus::Unknown => None,
        }
    }

    pub fn revoked_on(&self) -> Option<OffsetDateTime> {
        match self.status {
            CertStatus::Revoked { revoked_on, .. } => Some(revoked_on),
            _ => None,
        }
    }

    pub fn revocation_reason(&self) -> Option<RevocationReason> {
        match self.status {
            CertStatus::Revoked { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn this_update(&self) -> OffsetDateTime {
        self.this_update
    }

    pub fn next_update(&self) -> Option<OffsetDateTime> {
        self.next_update
    }
}

/// Single responses carried by one `BasicOCSPResponse`, or gathered from several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseList {
    responses: Vec<Response>,
}

impl ResponseList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, response: Response) -> &mut Self {
        self.responses.push(response);
        self
    }

    /// Moves the responses of `other` after the ones of this list.
    pub fn append(&mut self, other: ResponseList) -> &mut Self {
        self.responses.extend(other.responses);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Response> {
        self.responses.iter()
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// The only response of the list.
    pub fn into_single(self) -> Result<Response, OcspError> {
        let mut responses = self.responses.into_iter();
        match (responses.next(), responses.next()) {
            (Some(response), None) => Ok(response),
            (None, _) => Err(OcspError::MissingResponseBytes),
            (Some(_), Some(_)) => Err(OcspError::MultipleResponses),
        }
    }

    pub(crate) fn from_responses(responses: Vec<Response>) -> Result<Self, OcspError> {
        if responses.is_empty() {
            return Err(OcspError::MissingResponseBytes);
        }

        Ok(Self { responses })
    }
}

impl FromIterator<Response> for ResponseList {
    fn from_iter<I: IntoIterator<Item = Response>>(responses: I) -> Self {
        Self {
            responses: responses.into_iter().collect(),
        }
    }
}

impl Extend<Response> for ResponseList {
    fn extend<I: IntoIterator<Item = Response>>(&mut self, responses: I) {
        self.responses.extend(responses);
    }
}

impl IntoIterator for ResponseList {
    type Item = Response;
    type IntoIter = std::vec::IntoIter<Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResponseList {
    type Item = &'a Response;
    type IntoIter = std::slice::Iter<'a, Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}

/// ```text
/// SingleResponse ::= SEQUENCE {
///    certID                       CertID,
///    certStatus                   CertStatus,
///    thisUpdate                   GeneralizedTime,
///    nextUpdate         [0]       EXPLICIT GeneralizedTime OPTIONAL,
///    singleExtensions   [1]       EXPLICIT Extensions OPTIONAL }
///
/// CertStatus ::= CHOICE {
///     good        [0]     IMPLICIT NULL,
///     revoked     [1]     IMPLICIT RevokedInfo,
///     unknown     [2]     IMPLICIT UnknownInfo }
///
/// RevokedInfo ::= SEQUENCE {
///     revocationTime              GeneralizedTime,
///     revocationReason    [0]     EXPLICIT CRLReason OPTIONAL }
/// ```
pub(crate) fn decode_single_response(single_response: &Element) -> Result<Response, OcspError> {
    let fields = single_response.children();

    let serial_number = fields
        .first()
        .and_then(|cert_id| cert_id.first_untagged_child(UniversalTag::INTEGER))
        .and_then(Element::as_integer)
        .ok_or_else(|| missing("CertID serial number"))?
        .clone();

    let cert_status = fields.get(1).ok_or_else(|| missing("certStatus"))?;

    let this_update = single_response
        .first_untagged_child(UniversalTag::GENERALIZED_TIME)
        .and_then(Element::as_generalized_time)
        .ok_or_else(|| missing("thisUpdate"))?;

    // certStatus `good` is context-specific 0 too
    let next_update = fields
        .iter()
        .skip(2)
        .find(|field| field.context_number() == Some(0))
        .and_then(Element::as_generalized_time);

    let status = match cert_status.context_number() {
        Some(0) => CertStatus::Good,
        Some(1) => decode_revoked_info(cert_status)?,
        _ => CertStatus::Unknown,
    };

    log::debug!("certificate {} status: {:?}", serial_number, status);

    Ok(Response {
        serial_number,
        status,
        this_update,
        next_update,
    })
}

fn decode_revoked_info(revoked_info: &Element) -> Result<CertStatus, OcspError> {
    // a RevokedInfo without reason is collapsed into its revocation time
    if let Some(revoked_on) = revoked_info.as_generalized_time() {
        return Ok(CertStatus::Revoked {
            revoked_on,
            reason: RevocationReason::Unspecified,
        });
    }

    let revoked_on = revoked_info
        .children()
        .first()
        .and_then(Element::as_generalized_time)
        .ok_or_else(|| OcspError::InvalidResponse {
            context: "revoked certificate status without revocation time".to_owned(),
        })?;

    let reason = revoked_info
        .children()
        .get(1)
        .map(decode_revocation_reason)
        .unwrap_or_default();

    Ok(CertStatus::Revoked { revoked_on, reason })
}

fn decode_revocation_reason(reason: &Element) -> RevocationReason {
    let code = match reason.as_enumerated() {
        Some(code) => code.to_u64(),
        None => match reason.as_raw_primitive() {
            Some([code]) => Some(u64::from(*code)),
            _ => None,
        },
    };

    match code.and_then(RevocationReason::from_code) {
        Some(reason) => reason,
        None => {
            log::warn!("unknown revocation reason {:?}, using unspecified", code);
            RevocationReason::Unspecified
        }
    }
}

fn missing(element: &'static str) -> OcspError {
    OcspError::Decoding(Asn1DecodingError::missing(element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use certstatus_asn1::{Tag, TagClass};
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    const THIS_UPDATE: OffsetDateTime = datetime!(2024-03-01 12:00 UTC);
    const NEXT_UPDATE: OffsetDateTime = datetime!(2024-03-08 12:00 UTC);
    const REVOKED_ON: OffsetDateTime = datetime!(2024-02-14 9:30 UTC);

    fn single_response(cert_status: Element) -> Element {
        Element::sequence(vec![
            Element::sequence(vec![
                Element::sequence(vec![Element::null()]),
                Element::octet_string(vec![0; 20]),
                Element::octet_string(vec![0; 20]),
                Element::integer(4097),
            ]),
            cert_status,
            Element::generalized_time(THIS_UPDATE),
            Element::generalized_time(NEXT_UPDATE).with_tag(Tag::explicit(0)),
        ])
    }

    fn decode(cert_status: Element) -> Response {
        let encoded = certstatus_asn1_der::to_vec(&single_response(cert_status)).unwrap();
        let decoded = certstatus_asn1_der::from_bytes(&encoded).unwrap();
        decode_single_response(&decoded).unwrap()
    }

    #[test]
    fn good() {
        let response = decode(Element::null().with_tag(Tag::implicit(0)));
        assert_eq!(response.status(), CertStatus::Good);
        assert_eq!(response.is_revoked(), Some(false));
        assert_eq!(response.serial_number(), &BigInteger::from(4097));
        assert_eq!(response.this_update(), THIS_UPDATE);
        assert_eq!(response.next_update(), Some(NEXT_UPDATE));
    }

    #[test]
    fn good_regardless_of_content() {
        let response = decode(Element::raw_primitive(TagClass::ContextSpecific, 0, vec![0xDE, 0xAD]));
        assert_eq!(response.status(), CertStatus::Good);
    }

    #[test]
    fn revoked_without_reason() {
        let response = decode(Element::raw_constructed(
            TagClass::ContextSpecific,
            1,
            vec![Element::generalized_time(REVOKED_ON)],
        ));
        assert_eq!(
            response.status(),
            CertStatus::Revoked {
                revoked_on: REVOKED_ON,
                reason: RevocationReason::Unspecified,
            }
        );
    }

    #[test]
    fn revoked_with_reason() {
        let explicit_reason = decode(Element::raw_constructed(
            TagClass::ContextSpecific,
            1,
            vec![
                Element::generalized_time(REVOKED_ON),
                Element::enumerated(1).with_tag(Tag::explicit(0)),
            ],
        ));
        assert_eq!(explicit_reason.revocation_reason(), Some(RevocationReason::KeyCompromise));
        assert_eq!(explicit_reason.revoked_on(), Some(REVOKED_ON));

        let raw_reason = decode(Element::raw_constructed(
            TagClass::ContextSpecific,
            1,
            vec![
                Element::generalized_time(REVOKED_ON),
                Element::raw_primitive(TagClass::ContextSpecific, 0, vec![0x05]),
            ],
        ));
        assert_eq!(raw_reason.revocation_reason(), Some(RevocationReason::CessationOfOperation));
    }

    #[test]
    fn unknown_reason_code() {
        let response = decode(Element::raw_constructed(
            TagClass::ContextSpecific,
            1,
            vec![
                Element::generalized_time(REVOKED_ON),
                Element::enumerated(7).with_tag(Tag::explicit(0)),
            ],
        ));
        assert_eq!(response.revocation_reason(), Some(RevocationReason::Unspecified));
    }

    #[test]
    fn revoked_without_time() {
        let encoded = certstatus_asn1_der::to_vec(&single_response(Element::raw_constructed(
            TagClass::ContextSpecific,
            1,
            vec![Element::integer(1), Element::integer(2)],
        )))
        .unwrap();
        let decoded = certstatus_asn1_der::from_bytes(&encoded).unwrap();

        assert!(matches!(
            decode_single_response(&decoded),
            Err(OcspError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn unknown() {
        let response = decode(Element::null().with_tag(Tag::implicit(2)));
        assert_eq!(response.status(), CertStatus::Unknown);
        assert_eq!(response.is_revoked(), None);
        assert_eq!(response.revoked_on(), None);

        let response = decode(Element::null().with_tag(Tag::implicit(3)));
        assert_eq!(response.status(), CertStatus::Unknown);
    }

    #[test]
    fn reason_codes() {
        for code in (0..=10).filter(|code| *code != 7) {
            let reason = RevocationReason::from_code(code).unwrap();
            assert_eq!(u64::from(reason.code()), code);
        }
        assert_eq!(RevocationReason::from_code(7), None);
        assert_eq!(RevocationReason::KeyCompromise.to_string(), "keyCompromise");
    }

    #[test]
    fn single_and_multiple() {
        let response = decode(Element::null().with_tag(Tag::implicit(0)));

        let single = ResponseList::from_responses(vec![response.clone()]).unwrap();
        assert_eq!(single.into_single().unwrap(), response);

        let multiple = ResponseList::from_responses(vec![response.clone(), response]).unwrap();
        assert_eq!(multiple.len(), 2);
        assert!(matches!(multiple.into_single(), Err(OcspError::MultipleResponses)));

        assert!(matches!(
            ResponseList::from_responses(Vec::new()),
            Err(OcspError::MissingResponseBytes)
        ));
    }

    #[test]
    fn gathered_responses() {
        let good = decode(Element::null().with_tag(Tag::implicit(0)));
        let unknown = decode(Element::null().with_tag(Tag::implicit(2)));

        let mut list = ResponseList::new();
        assert!(list.is_empty());
        assert!(matches!(list.clone().into_single(), Err(OcspError::MissingResponseBytes)));

        list.add(good.clone());
        assert_eq!(list.clone().into_single().unwrap(), good);

        list.append([unknown.clone(), good.clone()].into_iter().collect());
        list.extend(Some(unknown.clone()));
        let statuses: Vec<CertStatus> = list.iter().map(Response::status).collect();
        assert_eq!(
            statuses,
            [CertStatus::Good, CertStatus::Unknown, CertStatus::Good, CertStatus::Unknown]
        );
    }
}
