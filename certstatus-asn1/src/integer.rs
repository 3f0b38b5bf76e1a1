use crate::InvalidAsn1Value;
use num_bigint_dig::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;

/// Arbitrary-precision signed integer.
///
/// Used for INTEGER and ENUMERATED values as well as tag numbers, so that callers never need to branch on
/// whether a value happens to fit a machine word. [`BigInteger::to_i64`] and [`BigInteger::to_u64`] are the
/// cheap "fits in a machine word" checks.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigInteger(BigInt);

impl BigInteger {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// Builds an integer from its big-endian two's complement representation.
    pub fn from_signed_bytes_be(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::zero();
        }

        Self(BigInt::from_signed_bytes_be(bytes))
    }

    /// Builds a non-negative integer from unsigned big-endian bytes.
    pub fn from_unsigned_bytes_be(bytes: &[u8]) -> Self {
        Self(BigInt::from_bytes_be(Sign::Plus, bytes))
    }

    /// Minimal big-endian two's complement representation. Zero is a single `0x00` byte.
    pub fn to_signed_bytes_be(&self) -> Vec<u8> {
        if self.0.is_zero() {
            return vec![0];
        }

        self.0.to_signed_bytes_be()
    }

    /// Unsigned big-endian magnitude, `None` for negative values.
    pub fn to_unsigned_bytes_be(&self) -> Option<Vec<u8>> {
        if self.0.is_negative() {
            return None;
        }

        let (_, bytes) = self.0.to_bytes_be();
        if bytes.is_empty() {
            Some(vec![0])
        } else {
            Some(bytes)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    /// Magnitude of a non-negative value.
    pub fn to_biguint(&self) -> Option<BigUint> {
        match self.0.to_bytes_be() {
            (Sign::Minus, _) => None,
            (_, bytes) => Some(BigUint::from_bytes_be(&bytes)),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for BigInteger {
                fn from(value: $ty) -> Self {
                    Self(BigInt::from(value))
                }
            }
        )*
    };
}

impl_from_primitive!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl From<BigInt> for BigInteger {
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl From<BigUint> for BigInteger {
    fn from(value: BigUint) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<BigInteger> for BigInt {
    fn from(value: BigInteger) -> Self {
        value.0
    }
}

impl PartialEq<u64> for BigInteger {
    fn eq(&self, other: &u64) -> bool {
        self.to_u64() == Some(*other)
    }
}

impl FromStr for BigInteger {
    type Err = InvalidAsn1Value;

    /// Parses a decimal literal with an optional leading `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidAsn1Value::Integer { value: s.to_owned() });
        }

        BigInt::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| InvalidAsn1Value::Integer { value: s.to_owned() })
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
