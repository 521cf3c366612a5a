use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

pub const ADDRESS_BYTE_COUNT: usize = 32;

/// The owner of a transaction output: the raw bytes of an ed25519 public key.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Address([u8; ADDRESS_BYTE_COUNT]);

impl Address {
    pub const fn new(public_key: [u8; ADDRESS_BYTE_COUNT]) -> Self {
        Self(public_key)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        <[u8; ADDRESS_BYTE_COUNT]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| {
                format!(
                    "Invalid address length. Expected: {} bytes but got: {} in: {}",
                    ADDRESS_BYTE_COUNT,
                    bytes.len(),
                    s
                )
            })
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(D::Error::custom)
    }
}
