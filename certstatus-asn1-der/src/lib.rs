//! # certstatus-asn1-der
//!
//! DER decoder and encoder over the [`certstatus_asn1::Element`] tree.
//!
//! ```
//! use certstatus_asn1::{Element, ObjectIdentifier};
//!
//! let oid = ObjectIdentifier::new("1.3.6.1.5.5.7.48.1").unwrap();
//! let encoded = certstatus_asn1_der::to_vec(&Element::oid(oid.clone())).unwrap();
//! assert_eq!(encoded, [0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01]);
//!
//! let decoded = certstatus_asn1_der::from_bytes(&encoded).unwrap();
//! assert_eq!(decoded.as_oid(), Some(&oid));
//! ```

#[macro_use]
mod debug_log;

mod decoder;
mod encoder;
mod error;

pub use decoder::{Decoder, DEFAULT_MAX_DEPTH};
pub use encoder::Encoder;
pub use error::{Asn1DecodingError, Asn1EncodingError};

use certstatus_asn1::Element;

/// Decodes a single DER element spanning the whole input, using the default nesting limit.
pub fn from_bytes(bytes: &[u8]) -> Result<Element, Asn1DecodingError> {
    Decoder::new().decode(bytes)
}

/// Encodes an element tree as DER.
pub fn to_vec(element: &Element) -> Result<Vec<u8>, Asn1EncodingError> {
    Encoder::new().encode(element)
}

/// Encoding of `child`, one of `parent`'s children, sliced from `parent_der`, the input `parent` was decoded
/// from.
///
/// Unlike a [`to_vec`] of `child`, keeps a non-canonical input byte for byte. `None` when `child` isn't one of `parent`'s children or `parent_der` doesn't decode.
pub fn child_encoding<'a>(parent_der: &'a [u8], parent: &Element, child: &Element) -> Option<&'a [u8]> {
    let index = parent.children().iter().position(|candidate| std::ptr::eq(candidate, child))?;
    Decoder::new().child_encodings(parent_der).ok()?.get(index).copied()
}
