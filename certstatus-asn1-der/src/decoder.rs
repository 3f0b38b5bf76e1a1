use crate::Asn1DecodingError;
use certstatus_asn1::date;
use certstatus_asn1::{
    BigInteger, BitString, Element, Ia5String, ObjectIdentifier, PrintableString, Tag, TagClass, TagEnvironment,
    UniversalTag,
};
use num_bigint_dig::BigUint;

/// Nesting limit applied by [`Decoder::new`]. Real certificates and protocol messages stay well below 20.
pub const DEFAULT_MAX_DEPTH: usize = 64;

type Result<T> = std::result::Result<T, Asn1DecodingError>;

/// Recursive-descent DER decoder producing an [`Element`] tree.
///
/// Definite lengths are the norm; the indefinite form is tolerated on constructed elements.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decodes exactly one element. Bytes left after it are an error.
    pub fn decode(&self, bytes: &[u8]) -> Result<Element> {
        let mut reader = Reader::new(bytes, 0);
        let element = self.decode_element(&mut reader, 0)?;

        if !reader.is_empty() {
            return Err(Asn1DecodingError::TrailingData {
                remaining: reader.remaining(),
            });
        }

        Ok(element)
    }

    /// Encodings of the elements nested in the content of the constructed element `bytes`, sliced from the
    /// input as received. A primitive element has none.
    pub fn nested_encodings<'a>(&self, bytes: &'a [u8]) -> Result<Vec<&'a [u8]>> {
        Ok(self.split(bytes)?.into_iter().map(|(encoding, _)| encoding).collect())
    }

    /// Encodings lining up with [`Element::children`] of the element `bytes` decodes to, sliced from the input
    /// as received.
    ///
    /// An explicitly tagged element is decoded into its single child, whose own children are returned then.
    pub fn child_encodings<'a>(&self, bytes: &'a [u8]) -> Result<Vec<&'a [u8]>> {
        let mut reader = Reader::new(bytes, 0);
        let class = read_header(&mut reader)?.class;

        let mut nested = self.split(bytes)?;
        if class != TagClass::Universal && nested.len() == 1 && nested[0].1.is_untagged() {
            if let Some((encoding, _)) = nested.pop() {
                return self.child_encodings(encoding);
            }
        }

        Ok(nested.into_iter().map(|(encoding, _)| encoding).collect())
    }

    fn split<'a>(&self, bytes: &'a [u8]) -> Result<Vec<(&'a [u8], Element)>> {
        let mut reader = Reader::new(bytes, 0);
        let header = read_header(&mut reader)?;
        if !header.constructed {
            return Ok(Vec::new());
        }

        let offset = reader.position();
        let (data, indefinite) = match header.length {
            Length::Definite(length) => (reader.read_slice(length)?, false),
            Length::Indefinite => (reader.rest(), true),
        };

        let mut content = Reader::new(data, offset);
        let mut nested = Vec::new();
        loop {
            if indefinite && content.at_end_of_contents() {
                break;
            }
            if content.is_empty() {
                if indefinite {
                    return Err(Asn1DecodingError::MissingEndOfContents { offset: header.offset });
                }
                break;
            }

            let start = content.consumed();
            let element = self.decode_element(&mut content, 1)?;
            nested.push((&data[start..content.consumed()], element));
        }

        Ok(nested)
    }

    fn decode_element(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Element> {
        if depth > self.max_depth {
            return Err(Asn1DecodingError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let header = read_header(reader)?;
        debug_log!(
            depth,
            "{} {} {} at offset {}",
            header.class,
            header.number,
            if header.constructed { "constructed" } else { "primitive" },
            header.offset
        );

        if header.constructed {
            let children = match header.length {
                Length::Definite(length) => {
                    let offset = reader.position();
                    let mut content = Reader::new(reader.read_slice(length)?, offset);
                    let mut children = Vec::new();
                    while !content.is_empty() {
                        children.push(self.decode_element(&mut content, depth + 1)?);
                    }
                    children
                }
                Length::Indefinite => {
                    let mut content = Reader::new(reader.rest(), reader.position());
                    let mut children = Vec::new();
                    loop {
                        if content.at_end_of_contents() {
                            break;
                        }
                        if content.is_empty() {
                            return Err(Asn1DecodingError::MissingEndOfContents { offset: header.offset });
                        }
                        children.push(self.decode_element(&mut content, depth + 1)?);
                    }
                    reader.skip(content.consumed() + 2)?;
                    children
                }
            };

            Ok(build_constructed(header.class, header.number, children))
        } else {
            let length = match header.length {
                Length::Definite(length) => length,
                Length::Indefinite => return Err(Asn1DecodingError::IndefinitePrimitive { offset: header.offset }),
            };

            let offset = reader.position();
            let content = reader.read_slice(length)?;
            decode_primitive(header.class, header.number, content, offset)
        }
    }
}

fn build_constructed(class: TagClass, number: BigInteger, mut children: Vec<Element>) -> Element {
    if class != TagClass::Universal && children.len() == 1 && children[0].is_untagged() {
        if let Some(child) = children.pop() {
            return child.with_tag(Tag::new(TagEnvironment::Explicit, class, number));
        }
    }

    match (class, UniversalTag::from_number(&number)) {
        (TagClass::Universal, Some(UniversalTag::SEQUENCE)) => Element::sequence(children),
        (TagClass::Universal, Some(UniversalTag::SET)) => Element::set(children),
        _ => Element::raw_constructed(class, number, children),
    }
}

fn decode_primitive(class: TagClass, number: BigInteger, content: &[u8], offset: usize) -> Result<Element> {
    let universal = match class {
        TagClass::Universal => UniversalTag::from_number(&number),
        _ => None,
    };

    let raw = || Element::raw_primitive(class, number.clone(), content.to_vec());

    let element = match universal {
        Some(UniversalTag::BOOLEAN) => match content {
            [value] => Element::boolean(*value != 0),
            _ => return Err(invalid_value(offset, "BOOLEAN")),
        },
        Some(UniversalTag::INTEGER) if !content.is_empty() => {
            Element::integer(BigInteger::from_signed_bytes_be(content))
        }
        Some(UniversalTag::INTEGER) => return Err(invalid_value(offset, "INTEGER")),
        Some(UniversalTag::ENUMERATED) if !content.is_empty() => {
            Element::enumerated(BigInteger::from_signed_bytes_be(content))
        }
        Some(UniversalTag::ENUMERATED) => return Err(invalid_value(offset, "ENUMERATED")),
        Some(UniversalTag::BIT_STRING) => Element::bit_string(decode_bit_string(content, offset)?),
        Some(UniversalTag::OCTET_STRING) => Element::octet_string(content),
        Some(UniversalTag::NULL) if content.is_empty() => Element::null(),
        Some(UniversalTag::NULL) => return Err(invalid_value(offset, "NULL")),
        Some(UniversalTag::OID) => Element::oid(decode_oid(content, offset)?),
        Some(UniversalTag::UTF8_STRING) => match std::str::from_utf8(content) {
            Ok(value) => Element::utf8_string(value),
            Err(_) => raw(),
        },
        Some(UniversalTag::PRINTABLE_STRING) => {
            match std::str::from_utf8(content).ok().and_then(|s| PrintableString::new(s).ok()) {
                Some(value) => Element::printable_string(value),
                None => raw(),
            }
        }
        Some(UniversalTag::IA5_STRING) => match std::str::from_utf8(content).ok().and_then(|s| Ia5String::new(s).ok()) {
            Some(value) => Element::ia5_string(value),
            None => raw(),
        },
        Some(UniversalTag::UTC_TIME) => {
            let instant = date::parse_utc_time(content).ok_or_else(|| invalid_time(offset, "UTCTime", content))?;
            Element::utc_time(instant)
        }
        Some(UniversalTag::GENERALIZED_TIME) => {
            let instant =
                date::parse_generalized_time(content).ok_or_else(|| invalid_time(offset, "GeneralizedTime", content))?;
            Element::generalized_time(instant)
        }
        _ => raw(),
    };

    Ok(element)
}

fn invalid_value(offset: usize, value_type: &'static str) -> Asn1DecodingError {
    Asn1DecodingError::InvalidValue { offset, value_type }
}

fn invalid_time(offset: usize, time_type: &'static str, content: &[u8]) -> Asn1DecodingError {
    Asn1DecodingError::InvalidTime {
        offset,
        time_type,
        value: String::from_utf8_lossy(content).into_owned(),
    }
}

fn decode_bit_string(content: &[u8], offset: usize) -> Result<BitString> {
    let (unused_bits, data) = content.split_first().ok_or(Asn1DecodingError::InvalidBitString {
        offset,
        context: "missing unused bits octet",
    })?;

    BitString::new(data.to_vec(), *unused_bits).map_err(|_| Asn1DecodingError::InvalidBitString {
        offset,
        context: "unused bits count out of range",
    })
}

fn decode_oid(content: &[u8], offset: usize) -> Result<ObjectIdentifier> {
    if content.is_empty() {
        return Err(Asn1DecodingError::InvalidObjectIdentifier {
            offset,
            context: "empty content",
        });
    }

    let mut reader = Reader::new(content, offset);
    let mut subidentifiers = Vec::new();
    while !reader.is_empty() {
        let subidentifier = reader
            .read_base128()
            .ok_or(Asn1DecodingError::InvalidObjectIdentifier {
                offset,
                context: "last subidentifier has its continuation bit set",
            })?;
        subidentifiers.push(subidentifier);
    }

    ObjectIdentifier::from_subidentifiers(&subidentifiers).map_err(|_| Asn1DecodingError::InvalidObjectIdentifier {
        offset,
        context: "no subidentifier",
    })
}

enum Length {
    Definite(usize),
    Indefinite,
}

struct Header {
    offset: usize,
    class: TagClass,
    constructed: bool,
    number: BigInteger,
    length: Length,
}

fn read_header(reader: &mut Reader<'_>) -> Result<Header> {
    let offset = reader.position();
    let identifier = reader.read_u8()?;

    let class = TagClass::from_identifier(identifier);
    let constructed = identifier & 0x20 != 0;
    let number = match identifier & 0x1F {
        0x1F => reader
            .read_base128()
            .map(BigInteger::from)
            .ok_or(Asn1DecodingError::MalformedHeader {
                offset,
                context: "high tag number",
            })?,
        low => BigInteger::from(low),
    };

    let length = read_length(reader)?;

    Ok(Header {
        offset,
        class,
        constructed,
        number,
        length,
    })
}

fn read_length(reader: &mut Reader<'_>) -> Result<Length> {
    let offset = reader.position();
    let first = reader.read_u8().map_err(|_| Asn1DecodingError::MalformedHeader {
        offset,
        context: "length",
    })?;

    match first {
        0x00..=0x7F => Ok(Length::Definite(usize::from(first))),
        0x80 => Ok(Length::Indefinite),
        0xFF => Err(Asn1DecodingError::InvalidLength { offset }),
        _ => {
            let count = usize::from(first & 0x7F);
            let bytes = reader.read_slice(count).map_err(|_| Asn1DecodingError::MalformedHeader {
                offset,
                context: "long-form length",
            })?;

            let mut length = 0usize;
            for byte in bytes {
                length = length
                    .checked_mul(256)
                    .and_then(|length| length.checked_add(usize::from(*byte)))
                    .ok_or(Asn1DecodingError::LengthTooLong { offset })?;
            }

            Ok(Length::Definite(length))
        }
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    /// `base` is the absolute offset of `data[0]` in the top-level input, used in error reports.
    fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    fn position(&self) -> usize {
        self.base + self.pos
    }

    fn consumed(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn at_end_of_contents(&self) -> bool {
        self.rest().starts_with(&[0x00, 0x00])
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.pos).ok_or(Asn1DecodingError::TruncatedData {
            offset: self.position(),
            needed: 1,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_slice(&mut self, length: usize) -> Result<&'a [u8]> {
        if length > self.remaining() {
            return Err(Asn1DecodingError::TruncatedData {
                offset: self.position(),
                needed: length - self.remaining(),
            });
        }

        let slice = &self.data[self.pos..self.pos + length];
        self.pos += length;
        Ok(slice)
    }

    fn skip(&mut self, length: usize) -> Result<()> {
        self.read_slice(length).map(|_| ())
    }

    /// One base-128 group sequence, most significant group first, bit 8 set on all groups but the last.
    ///
    /// Accumulates in a machine word and switches to a big integer once the value no longer fits. `None` when
    /// the input ends before a group with a clear continuation bit.
    fn read_base128(&mut self) -> Option<BigUint> {
        let mut small = 0u64;
        let mut big: Option<BigUint> = None;

        loop {
            let byte = *self.data.get(self.pos)?;
            self.pos += 1;

            let group = u64::from(byte & 0x7F);
            big = match big.take() {
                Some(value) => Some((value << 7usize) + BigUint::from(group)),
                None if small > u64::MAX >> 7 => Some((BigUint::from(small) << 7usize) + BigUint::from(group)),
                None => {
                    small = (small << 7) | group;
                    None
                }
            };

            if byte & 0x80 == 0 {
                return Some(big.unwrap_or_else(|| BigUint::from(small)));
            }
        }
    }
}
