//! # certstatus-asn1
//!
//! Typed ASN.1 element tree shared by the certstatus DER codec and the OCSP / TSA engines.
//!
//! An [`Element`] is a [`Value`] plus an optional [`Tag`]. Values decoded from a universal type the codec
//! knows about carry a native representation; everything else is kept as raw content so that it can be
//! re-encoded unchanged.

pub mod bit_string;
pub mod date;
pub mod element;
pub mod integer;
pub mod oid;
pub mod restricted_string;
pub mod tag;

pub use bit_string::BitString;
pub use element::{Element, Value};
pub use integer::BigInteger;
pub use oid::ObjectIdentifier;
pub use restricted_string::{Ia5String, PrintableString};
pub use tag::{Tag, TagClass, TagEnvironment, UniversalTag};

use thiserror::Error;

/// A value that can't be represented by the ASN.1 type it was assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAsn1Value {
    #[error("invalid object identifier `{value}`")]
    ObjectIdentifier { value: String },

    #[error("character {character:?} is not allowed in a {string_type}")]
    CharacterSet { string_type: &'static str, character: char },

    #[error("invalid bit string: {context}")]
    BitString { context: &'static str },

    #[error("invalid integer literal `{value}`")]
    Integer { value: String },
}
