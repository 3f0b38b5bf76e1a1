use crate::InvalidAsn1Value;
use std::fmt;
use std::str::FromStr;

macro_rules! restricted_string {
    ($name:ident, $display_name:literal, $allowed:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, InvalidAsn1Value> {
                let value = value.into();
                if let Some(character) = value.chars().find(|c| !$allowed(*c)) {
                    return Err(InvalidAsn1Value::CharacterSet {
                        string_type: $display_name,
                        character,
                    });
                }

                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = InvalidAsn1Value;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

fn is_printable(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '&' | '\'' | '(' | ')' | '+' | ',' | '-' | '.' | '/' | ':' | '=' | '?')
}

fn is_ia5(c: char) -> bool {
    c.is_ascii()
}

restricted_string!(PrintableString, "PrintableString", is_printable);
restricted_string!(Ia5String, "IA5String", is_ia5);
