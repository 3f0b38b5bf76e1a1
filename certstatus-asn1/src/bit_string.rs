use crate::InvalidAsn1Value;
use std::fmt;

/// BIT STRING content: payload bytes plus the count of unused trailing bits in the last byte.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitString {
    data: Vec<u8>,
    unused_bits: u8,
}

impl BitString {
    pub fn new(data: Vec<u8>, unused_bits: u8) -> Result<Self, InvalidAsn1Value> {
        if unused_bits > 7 {
            return Err(InvalidAsn1Value::BitString {
                context: "more than 7 unused bits",
            });
        }

        if data.is_empty() && unused_bits != 0 {
            return Err(InvalidAsn1Value::BitString {
                context: "unused bits declared on an empty payload",
            });
        }

        Ok(Self { data, unused_bits })
    }

    /// A bit string made of whole bytes, such as a subject public key.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            unused_bits: 0,
        }
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn unused_bits(&self) -> u8 {
        self.unused_bits
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - usize::from(self.unused_bits)
    }

    /// Named-bit lookup: bit 0 is the most significant bit of the first byte.
    pub fn is_set(&self, bit: usize) -> bool {
        if bit >= self.bit_len() {
            return false;
        }

        self.data[bit / 8] & (0x80 >> (bit % 8)) != 0
    }
}

impl fmt::Display for BitString {
    /// Bytes as groups of eight bits, unused trailing bits shown as `-`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit_len = self.bit_len();
        for (idx, byte) in self.data.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }

            for shift in 0..8 {
                if idx * 8 + shift < bit_len {
                    let bit = (byte >> (7 - shift)) & 1;
                    write!(f, "{}", bit)?;
                } else {
                    f.write_str("-")?;
                }
            }
        }

        Ok(())
    }
}
