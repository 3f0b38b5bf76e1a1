use crate::Asn1EncodingError;
use certstatus_asn1::date;
use certstatus_asn1::{BigInteger, Element, TagClass, TagEnvironment, Value};
use num_bigint_dig::BigUint;
use num_traits::{ToPrimitive, Zero};
use time::OffsetDateTime;

type Result<T> = std::result::Result<T, Asn1EncodingError>;

/// DER encoder, the mirror of [`crate::Decoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder;

impl Encoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, element: &Element) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        write_element(element, &mut output)?;
        Ok(output)
    }
}

fn write_element(element: &Element, output: &mut Vec<u8>) -> Result<()> {
    let content = encode_content(element.value())?;

    match element.tag() {
        None => {
            let (class, number) = element.intrinsic_identifier();
            write_header(class, &number, element.is_constructed(), content.len(), output)?;
        }
        Some(tag) if tag.environment() == TagEnvironment::Implicit => {
            write_header(tag.class(), tag.number(), element.is_constructed(), content.len(), output)?;
        }
        Some(tag) => {
            let (class, number) = element.intrinsic_identifier();
            let mut inner = Vec::with_capacity(content.len() + 8);
            write_header(class, &number, element.is_constructed(), content.len(), &mut inner)?;
            inner.extend_from_slice(&content);

            write_header(tag.class(), tag.number(), true, inner.len(), output)?;
            output.extend_from_slice(&inner);
            return Ok(());
        }
    }

    output.extend_from_slice(&content);
    Ok(())
}

fn encode_content(value: &Value) -> Result<Vec<u8>> {
    let content = match value {
        Value::Boolean(value) => vec![if *value { 0xFF } else { 0x00 }],
        Value::Integer(value) | Value::Enumerated(value) => value.to_signed_bytes_be(),
        Value::BitString(bits) => {
            let mut content = Vec::with_capacity(bits.data().len() + 1);
            content.push(bits.unused_bits());
            content.extend_from_slice(bits.data());
            content
        }
        Value::OctetString(bytes) => bytes.clone(),
        Value::Null => Vec::new(),
        Value::ObjectIdentifier(oid) => {
            let mut content = Vec::new();
            for subidentifier in oid.subidentifiers() {
                write_base128(&subidentifier, &mut content);
            }
            content
        }
        Value::Utf8String(value) => value.as_bytes().to_vec(),
        Value::PrintableString(value) => value.as_str().as_bytes().to_vec(),
        Value::Ia5String(value) => value.as_str().as_bytes().to_vec(),
        Value::UtcTime(instant) => date::format_utc_time(instant)
            .ok_or(Asn1EncodingError::UtcTimeOutOfRange { year: year(instant) })?
            .into_bytes(),
        Value::GeneralizedTime(instant) => date::format_generalized_time(instant)
            .ok_or(Asn1EncodingError::GeneralizedTimeOutOfRange { year: year(instant) })?
            .into_bytes(),
        Value::Sequence(children) | Value::Set(children) | Value::RawConstructed { children, .. } => {
            let mut content = Vec::new();
            for child in children {
                write_element(child, &mut content)?;
            }
            content
        }
        Value::RawPrimitive { content, .. } => content.clone(),
    };

    Ok(content)
}

fn year(instant: &OffsetDateTime) -> i32 {
    instant.to_offset(time::UtcOffset::UTC).year()
}

fn write_header(
    class: TagClass,
    number: &BigInteger,
    constructed: bool,
    length: usize,
    output: &mut Vec<u8>,
) -> Result<()> {
    let mut identifier = class.identifier_bits();
    if constructed {
        identifier |= 0x20;
    }

    let number = number.to_biguint().ok_or_else(|| Asn1EncodingError::InvalidTagNumber {
        number: number.to_string(),
    })?;

    match number.to_u8() {
        Some(low) if low <= 30 => output.push(identifier | low),
        _ => {
            output.push(identifier | 0x1F);
            write_base128(&number, output);
        }
    }

    write_length(length, output);
    Ok(())
}

fn write_length(length: usize, output: &mut Vec<u8>) {
    if length < 0x80 {
        output.push(length as u8);
        return;
    }

    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|byte| **byte == 0).count();
    let significant = &bytes[skip..];

    output.push(0x80 | significant.len() as u8);
    output.extend_from_slice(significant);
}

fn write_base128(value: &BigUint, output: &mut Vec<u8>) {
    let mask = BigUint::from(0x7Fu8);
    let mut remaining = value.clone();
    let mut groups = Vec::new();

    loop {
        let group = (&remaining & &mask).to_u8().unwrap_or_default();
        groups.push(group);
        remaining = remaining >> 7usize;
        if remaining.is_zero() {
            break;
        }
    }

    let last = groups.len() - 1;
    for (idx, group) in groups.iter().rev().enumerate() {
        output.push(if idx == last { *group } else { group | 0x80 });
    }
}
