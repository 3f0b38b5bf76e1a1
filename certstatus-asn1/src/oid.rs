use crate::InvalidAsn1Value;
use num_bigint_dig::BigUint;
use num_traits::{ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;

/// Dotted-decimal object identifier.
///
/// Arcs are not limited to a machine word. The textual form is canonical (no leading zeros), so two
/// identifiers compare equal exactly when their encodings do.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectIdentifier(String);

impl ObjectIdentifier {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidAsn1Value> {
        let value = value.into();
        if is_valid_dotted(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidAsn1Value::ObjectIdentifier { value })
        }
    }

    /// Builds an identifier from the subidentifiers found in an encoding: the first one packs the first two
    /// arcs as `40 * arc1 + arc2`.
    pub fn from_subidentifiers(subidentifiers: &[BigUint]) -> Result<Self, InvalidAsn1Value> {
        let (first, rest) = subidentifiers
            .split_first()
            .ok_or_else(|| InvalidAsn1Value::ObjectIdentifier { value: String::new() })?;

        let (arc1, arc2) = match first.to_u64() {
            Some(x) if x < 40 => (0u8, BigUint::from(x)),
            Some(x) if x < 80 => (1u8, BigUint::from(x - 40)),
            _ => (2u8, first - BigUint::from(80u8)),
        };

        let mut value = format!("{}.{}", arc1, arc2);
        for arc in rest {
            value.push('.');
            value.push_str(&arc.to_string());
        }

        Ok(Self(value))
    }

    /// Inverse of [`ObjectIdentifier::from_subidentifiers`].
    pub fn subidentifiers(&self) -> Vec<BigUint> {
        let mut arcs = self.0.split('.').map(parse_arc);
        let arc1 = arcs.next().unwrap_or_else(BigUint::zero);
        let arc2 = arcs.next().unwrap_or_else(BigUint::zero);

        let mut subidentifiers = vec![arc1 * BigUint::from(40u8) + arc2];
        subidentifiers.extend(arcs);
        subidentifiers
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn parse_arc(arc: &str) -> BigUint {
    BigUint::parse_bytes(arc.as_bytes(), 10).unwrap_or_else(BigUint::zero)
}

fn is_valid_dotted(value: &str) -> bool {
    let arcs: Vec<&str> = value.split('.').collect();
    if arcs.len() < 2 {
        return false;
    }

    let canonical = |arc: &&str| {
        !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()) && (arc.len() == 1 || !arc.starts_with('0'))
    };
    if !arcs.iter().all(canonical) {
        return false;
    }

    match arcs[0] {
        "0" | "1" => arcs[1].len() < 3 && arcs[1].parse::<u8>().map(|arc2| arc2 < 40).unwrap_or(false),
        "2" => true,
        _ => false,
    }
}

impl FromStr for ObjectIdentifier {
    type Err = InvalidAsn1Value;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ObjectIdentifier {
    type Error = InvalidAsn1Value;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectIdentifier> for String {
    fn from(oid: ObjectIdentifier) -> Self {
        oid.0
    }
}

impl PartialEq<str> for ObjectIdentifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
