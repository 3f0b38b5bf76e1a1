use crate::{BigInteger, BitString, Ia5String, ObjectIdentifier, PrintableString, Tag, TagClass, TagEnvironment, UniversalTag};
use time::{OffsetDateTime, UtcOffset};

/// Intrinsic content of an [`Element`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Boolean(bool),
    Integer(BigInteger),
    BitString(BitString),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    Enumerated(BigInteger),
    Utf8String(String),
    PrintableString(PrintableString),
    Ia5String(Ia5String),
    UtcTime(OffsetDateTime),
    GeneralizedTime(OffsetDateTime),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    /// Primitive of a type the codec has no native representation for, content kept verbatim.
    RawPrimitive {
        class: TagClass,
        number: BigInteger,
        content: Vec<u8>,
    },
    /// Constructed value of a type the codec has no native representation for.
    RawConstructed {
        class: TagClass,
        number: BigInteger,
        children: Vec<Element>,
    },
}

/// A node of a decoded (or to be encoded) ASN.1 value tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    value: Value,
    tag: Option<Tag>,
}

impl Element {
    pub fn new(value: Value) -> Self {
        Self { value, tag: None }
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(Value::Boolean(value))
    }

    pub fn integer(value: impl Into<BigInteger>) -> Self {
        Self::new(Value::Integer(value.into()))
    }

    pub fn enumerated(value: impl Into<BigInteger>) -> Self {
        Self::new(Value::Enumerated(value.into()))
    }

    pub fn bit_string(value: BitString) -> Self {
        Self::new(Value::BitString(value))
    }

    pub fn octet_string(value: impl Into<Vec<u8>>) -> Self {
        Self::new(Value::OctetString(value.into()))
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn oid(value: ObjectIdentifier) -> Self {
        Self::new(Value::ObjectIdentifier(value))
    }

    pub fn utf8_string(value: impl Into<String>) -> Self {
        Self::new(Value::Utf8String(value.into()))
    }

    pub fn printable_string(value: PrintableString) -> Self {
        Self::new(Value::PrintableString(value))
    }

    pub fn ia5_string(value: Ia5String) -> Self {
        Self::new(Value::Ia5String(value))
    }

    /// Instants are stored in UTC.
    pub fn utc_time(value: OffsetDateTime) -> Self {
        Self::new(Value::UtcTime(value.to_offset(UtcOffset::UTC)))
    }

    /// Instants are stored in UTC.
    pub fn generalized_time(value: OffsetDateTime) -> Self {
        Self::new(Value::GeneralizedTime(value.to_offset(UtcOffset::UTC)))
    }

    pub fn sequence(children: Vec<Element>) -> Self {
        Self::new(Value::Sequence(children))
    }

    pub fn set(children: Vec<Element>) -> Self {
        Self::new(Value::Set(children))
    }

    pub fn raw_primitive(class: TagClass, number: impl Into<BigInteger>, content: Vec<u8>) -> Self {
        Self::new(Value::RawPrimitive {
            class,
            number: number.into(),
            content,
        })
    }

    pub fn raw_constructed(class: TagClass, number: impl Into<BigInteger>, children: Vec<Element>) -> Self {
        Self::new(Value::RawConstructed {
            class,
            number: number.into(),
            children,
        })
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn without_tag(mut self) -> Self {
        self.tag = None;
        self
    }

    #[inline]
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    #[inline]
    pub fn is_untagged(&self) -> bool {
        self.tag.is_none()
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Class and number of the element's own type, ignoring any applied tag.
    pub fn intrinsic_identifier(&self) -> (TagClass, BigInteger) {
        let universal = |tag: UniversalTag| (TagClass::Universal, BigInteger::from(tag));

        match &self.value {
            Value::Boolean(_) => universal(UniversalTag::BOOLEAN),
            Value::Integer(_) => universal(UniversalTag::INTEGER),
            Value::BitString(_) => universal(UniversalTag::BIT_STRING),
            Value::OctetString(_) => universal(UniversalTag::OCTET_STRING),
            Value::Null => universal(UniversalTag::NULL),
            Value::ObjectIdentifier(_) => universal(UniversalTag::OID),
            Value::Enumerated(_) => universal(UniversalTag::ENUMERATED),
            Value::Utf8String(_) => universal(UniversalTag::UTF8_STRING),
            Value::PrintableString(_) => universal(UniversalTag::PRINTABLE_STRING),
            Value::Ia5String(_) => universal(UniversalTag::IA5_STRING),
            Value::UtcTime(_) => universal(UniversalTag::UTC_TIME),
            Value::GeneralizedTime(_) => universal(UniversalTag::GENERALIZED_TIME),
            Value::Sequence(_) => universal(UniversalTag::SEQUENCE),
            Value::Set(_) => universal(UniversalTag::SET),
            Value::RawPrimitive { class, number, .. } | Value::RawConstructed { class, number, .. } => {
                (*class, number.clone())
            }
        }
    }

    pub fn is_constructed(&self) -> bool {
        matches!(
            self.value,
            Value::Sequence(_) | Value::Set(_) | Value::RawConstructed { .. }
        )
    }

    /// Children of a constructed value, empty for primitives.
    pub fn children(&self) -> &[Element] {
        match &self.value {
            Value::Sequence(children) | Value::Set(children) | Value::RawConstructed { children, .. } => children,
            _ => &[],
        }
    }

    /// Whether this element is identified by `number` / `class` in the given tagging environment.
    ///
    /// Without an environment only untagged elements match, on their intrinsic type. With an environment the
    /// element must carry a tag of that environment whose class and number match.
    pub fn is_of_type(&self, number: u64, class: TagClass, environment: Option<TagEnvironment>) -> bool {
        match (&self.tag, environment) {
            (None, None) => {
                let (own_class, own_number) = self.intrinsic_identifier();
                own_class == class && own_number == number
            }
            (Some(tag), Some(environment)) => {
                tag.environment() == environment && tag.class() == class && *tag.number() == number
            }
            _ => false,
        }
    }

    /// Zero-based lookup of the `position`-th child of the given type.
    pub fn nth_child_of_type(
        &self,
        position: usize,
        number: u64,
        class: TagClass,
        environment: Option<TagEnvironment>,
    ) -> Option<&Element> {
        self.children()
            .iter()
            .filter(|child| child.is_of_type(number, class, environment))
            .nth(position)
    }

    pub fn first_child_of_type(
        &self,
        number: u64,
        class: TagClass,
        environment: Option<TagEnvironment>,
    ) -> Option<&Element> {
        self.nth_child_of_type(0, number, class, environment)
    }

    /// Zero-based lookup among untagged children of a universal type.
    pub fn nth_untagged_child(&self, position: usize, ty: UniversalTag) -> Option<&Element> {
        self.nth_child_of_type(position, u64::from(ty.number()), TagClass::Universal, None)
    }

    pub fn first_untagged_child(&self, ty: UniversalTag) -> Option<&Element> {
        self.nth_untagged_child(0, ty)
    }

    /// First child carrying context-specific number `number`, either through an applied tag or because the
    /// decoder had to keep it raw (implicit tagging).
    pub fn context_child(&self, number: u64) -> Option<&Element> {
        self.children().iter().find(|child| child.is_context_specific(number))
    }

    fn is_context_specific(&self, number: u64) -> bool {
        self.context_number() == Some(number)
    }

    /// Context-specific number identifying this element on the wire, from its applied tag or, for raw values,
    /// from its own identifier.
    pub fn context_number(&self) -> Option<u64> {
        let (class, number) = match &self.tag {
            Some(tag) => (tag.class(), tag.number().clone()),
            None => self.intrinsic_identifier(),
        };

        match class {
            TagClass::ContextSpecific => number.to_u64(),
            _ => None,
        }
    }

    /// Elements carried by an implicitly tagged `SET OF` / `SEQUENCE OF`.
    ///
    /// The decoder leaves such a value raw when it has several entries but collapses a single entry into a
    /// tagged element; both shapes yield the entries here, untagged.
    pub fn implicit_list_entries(&self) -> Vec<Element> {
        match (&self.tag, &self.value) {
            (None, Value::RawConstructed { children, .. }) => children.clone(),
            (Some(_), _) => vec![self.clone().without_tag()],
            _ => Vec::new(),
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self.value {
            Value::Boolean(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInteger> {
        match &self.value {
            Value::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_enumerated(&self) -> Option<&BigInteger> {
        match &self.value {
            Value::Enumerated(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bit_string(&self) -> Option<&BitString> {
        match &self.value {
            Value::BitString(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_octet_string(&self) -> Option<&[u8]> {
        match &self.value {
            Value::OctetString(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&ObjectIdentifier> {
        match &self.value {
            Value::ObjectIdentifier(value) => Some(value),
            _ => None,
        }
    }

    /// Any of the character string types with a native representation.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::Utf8String(value) => Some(value),
            Value::PrintableString(value) => Some(value.as_str()),
            Value::Ia5String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_generalized_time(&self) -> Option<OffsetDateTime> {
        match self.value {
            Value::GeneralizedTime(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_utc_time(&self) -> Option<OffsetDateTime> {
        match self.value {
            Value::UtcTime(value) => Some(value),
            _ => None,
        }
    }

    /// X.509 `Time`: either UTCTime or GeneralizedTime.
    pub fn as_time(&self) -> Option<OffsetDateTime> {
        self.as_utc_time().or_else(|| self.as_generalized_time())
    }

    pub fn as_sequence(&self) -> Option<&[Element]> {
        match &self.value {
            Value::Sequence(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&[Element]> {
        match &self.value {
            Value::Set(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_raw_primitive(&self) -> Option<&[u8]> {
        match &self.value {
            Value::RawPrimitive { content, .. } => Some(content),
            _ => None,
        }
    }
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
