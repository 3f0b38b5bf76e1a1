//! Distinguished name formatting.

use crate::oids::{self, OidResolver};
use certstatus_asn1::{Element, UniversalTag};

/// Short name used when printing an attribute type.
fn short_name(oid: &str) -> Option<&'static str> {
    let name = match oid {
        oids::AT_COMMON_NAME => "CN",
        oids::AT_SURNAME => "SN",
        oids::AT_SERIAL_NUMBER => "SERIALNUMBER",
        oids::AT_COUNTRY_NAME => "C",
        oids::AT_LOCALITY_NAME => "L",
        oids::AT_STATE_OR_PROVINCE_NAME => "S",
        oids::AT_ORGANIZATION_NAME => "O",
        oids::AT_ORGANIZATIONAL_UNIT_NAME => "OU",
        oids::AT_TITLE => "T",
        oids::AT_GIVEN_NAME => "G",
        oids::EMAIL_ADDRESS => "E",
        _ => return None,
    };

    Some(name)
}

/// Formats an X.501 `Name` the way Windows displays it: most specific RDN first, `, ` separated.
///
/// Only the first attribute of each RDN is printed. Attribute types without a short name are left out unless
/// `resolver` knows them.
///
/// ```text
/// Name ::= SEQUENCE OF RelativeDistinguishedName
/// RelativeDistinguishedName ::= SET SIZE (1..MAX) OF AttributeTypeAndValue
/// AttributeTypeAndValue ::= SEQUENCE { type OBJECT IDENTIFIER, value ANY }
/// ```
pub fn format_name(name: &Element, resolver: Option<&dyn OidResolver>) -> String {
    let mut components = Vec::new();

    for rdn in name.children() {
        let attribute = match rdn.children().first() {
            Some(attribute) => attribute,
            None => continue,
        };

        let ty = match attribute.first_untagged_child(UniversalTag::OID).and_then(Element::as_oid) {
            Some(ty) => ty,
            None => continue,
        };

        let label = match short_name(ty.as_str()) {
            Some(label) => label.to_owned(),
            None => match resolver.and_then(|resolver| resolver.resolve(ty)) {
                Some(label) => label,
                None => continue,
            },
        };

        if let Some(value) = attribute.children().get(1) {
            components.push(format!("{}={}", label, attribute_value(value)));
        }
    }

    components.reverse();
    components.join(", ")
}

fn attribute_value(value: &Element) -> String {
    if let Some(value) = value.as_str() {
        return value.to_owned();
    }

    match value.as_raw_primitive().or_else(|| value.as_octet_string()) {
        Some(content) => String::from_utf8_lossy(content).into_owned(),
        None => String::new(),
    }
}
