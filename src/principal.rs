// Caller identity. Authentication happens in the host; the core only compares ids.

use hex::FromHex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Principal([u8; 32]);

impl Principal {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Principal(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Deterministic id derived from a human label (fixtures, sims).
    pub fn derive(label: &str) -> Self {
        let mut h = Sha256::new();
        h.update(b"codepulse/principal/");
        h.update(label.as_bytes());
        Principal(h.finalize().into())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, String> {
        let bytes = <[u8; 32]>::from_hex(hex_str.trim())
            .map_err(|_| "invalid principal hex (expected 32 bytes)".to_string())?;
        Ok(Principal(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Short form keeps log lines readable.
impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", &self.to_hex()[..12])
    }
}

impl FromStr for Principal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Principal::from_hex(s)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Principal::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
