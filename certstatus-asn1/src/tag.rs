use crate::BigInteger;
use std::fmt;

/// The two high bits of an identifier octet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    #[inline]
    pub const fn from_identifier(identifier: u8) -> Self {
        match identifier >> 6 {
            0 => Self::Universal,
            1 => Self::Application,
            2 => Self::ContextSpecific,
            _ => Self::Private,
        }
    }

    #[inline]
    pub const fn identifier_bits(self) -> u8 {
        match self {
            Self::Universal => 0x00,
            Self::Application => 0x40,
            Self::ContextSpecific => 0x80,
            Self::Private => 0xC0,
        }
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal => write!(f, "UNIVERSAL"),
            Self::Application => write!(f, "APPLICATION"),
            Self::ContextSpecific => write!(f, "CONTEXT"),
            Self::Private => write!(f, "PRIVATE"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagEnvironment {
    /// The tag replaces the identifier of the tagged element.
    Implicit,
    /// The tag wraps the complete encoding of the tagged element.
    Explicit,
}

/// A tag applied on top of an element's intrinsic type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    environment: TagEnvironment,
    class: TagClass,
    number: BigInteger,
}

impl Tag {
    pub fn new(environment: TagEnvironment, class: TagClass, number: impl Into<BigInteger>) -> Self {
        Self {
            environment,
            class,
            number: number.into(),
        }
    }

    /// Context-specific explicit tag, the usual `[n] EXPLICIT`.
    pub fn explicit(number: impl Into<BigInteger>) -> Self {
        Self::new(TagEnvironment::Explicit, TagClass::ContextSpecific, number)
    }

    /// Context-specific implicit tag, the usual `[n] IMPLICIT`.
    pub fn implicit(number: impl Into<BigInteger>) -> Self {
        Self::new(TagEnvironment::Implicit, TagClass::ContextSpecific, number)
    }

    pub fn with_class(mut self, class: TagClass) -> Self {
        self.class = class;
        self
    }

    #[inline]
    pub fn environment(&self) -> TagEnvironment {
        self.environment
    }

    #[inline]
    pub fn class(&self) -> TagClass {
        self.class
    }

    #[inline]
    pub fn number(&self) -> &BigInteger {
        &self.number
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let environment = match self.environment {
            TagEnvironment::Implicit => "IMPLICIT",
            TagEnvironment::Explicit => "EXPLICIT",
        };

        match self.class {
            TagClass::ContextSpecific => write!(f, "[{}] {}", self.number, environment),
            class => write!(f, "[{} {}] {}", class, self.number, environment),
        }
    }
}

/// Universal tag numbers of the types the codec knows about.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct UniversalTag(u32);

impl UniversalTag {
    pub const BOOLEAN: Self = UniversalTag(0x01);
    pub const INTEGER: Self = UniversalTag(0x02);
    pub const BIT_STRING: Self = UniversalTag(0x03);
    pub const OCTET_STRING: Self = UniversalTag(0x04);
    pub const NULL: Self = UniversalTag(0x05);
    pub const OID: Self = UniversalTag(0x06);
    pub const ENUMERATED: Self = UniversalTag(0x0A);
    pub const UTF8_STRING: Self = UniversalTag(0x0C);
    pub const SEQUENCE: Self = UniversalTag(0x10);
    pub const SET: Self = UniversalTag(0x11);
    pub const PRINTABLE_STRING: Self = UniversalTag(0x13);
    pub const IA5_STRING: Self = UniversalTag(0x16);
    pub const UTC_TIME: Self = UniversalTag(0x17);
    pub const GENERALIZED_TIME: Self = UniversalTag(0x18);

    #[inline]
    pub const fn number(self) -> u32 {
        self.0
    }

    /// Matches a decoded tag number against the universal types that have a native [`crate::Value`].
    pub fn from_number(number: &BigInteger) -> Option<Self> {
        let number = u32::try_from(number.to_u64()?).ok()?;
        match number {
            0x01..=0x06 | 0x0A | 0x0C | 0x10 | 0x11 | 0x13 | 0x16..=0x18 => Some(Self(number)),
            _ => None,
        }
    }
}

impl From<UniversalTag> for BigInteger {
    fn from(tag: UniversalTag) -> Self {
        BigInteger::from(tag.0)
    }
}

impl fmt::Display for UniversalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            UniversalTag::BOOLEAN => write!(f, "BOOLEAN"),
            UniversalTag::INTEGER => write!(f, "INTEGER"),
            UniversalTag::BIT_STRING => write!(f, "BIT STRING"),
            UniversalTag::OCTET_STRING => write!(f, "OCTET STRING"),
            UniversalTag::NULL => write!(f, "NULL"),
            UniversalTag::OID => write!(f, "OBJECT IDENTIFIER"),
            UniversalTag::ENUMERATED => write!(f, "ENUMERATED"),
            UniversalTag::UTF8_STRING => write!(f, "UTF8String"),
            UniversalTag::SEQUENCE => write!(f, "SEQUENCE"),
            UniversalTag::SET => write!(f, "SET"),
            UniversalTag::PRINTABLE_STRING => write!(f, "PrintableString"),
            UniversalTag::IA5_STRING => write!(f, "IA5String"),
            UniversalTag::UTC_TIME => write!(f, "UTCTime"),
            UniversalTag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            unknown => write!(f, "UNIVERSAL {}", unknown.0),
        }
    }
}
