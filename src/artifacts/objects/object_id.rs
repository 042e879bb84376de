//! Object identifier (SHA-1 digest, hex-encoded)
//!
//! Ids are 40 lowercase hex characters. On disk an object lives at
//! `objects/<first-2-chars>/<remaining-38-chars>`; inside tree payloads the
//! id appears as 20 raw digest bytes.

use crate::artifacts::objects::{OBJECT_ID_LENGTH, OBJECT_ID_RAW_LENGTH};
use std::io;
use std::path::PathBuf;

/// Content address of an object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Validate a 40-hex string as an object id
    pub fn try_parse(id: impl Into<String>) -> anyhow::Result<Self> {
        let id = id.into();
        if id.len() != OBJECT_ID_LENGTH {
            anyhow::bail!("invalid object id length: {}", id.len());
        }
        if !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            anyhow::bail!("invalid object id characters: {}", id);
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Convert 20 raw digest bytes into an id
    pub fn from_raw(raw: &[u8]) -> anyhow::Result<Self> {
        if raw.len() != OBJECT_ID_RAW_LENGTH {
            anyhow::bail!("invalid raw digest length: {}", raw.len());
        }
        let mut hex = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in raw {
            hex.push_str(&format!("{byte:02x}"));
        }
        Ok(Self(hex))
    }

    /// Write the id as 20 raw digest bytes
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&self.0[i..i + 2], 16)?;
            writer.write_all(&[byte])?;
        }
        Ok(())
    }

    /// Read an id from 20 raw digest bytes
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        reader.read_exact(&mut raw)?;
        Self::from_raw(&raw)
    }

    /// Relative storage path, `xx/yyyy...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First seven characters, for display
    pub fn short(&self) -> &str {
        &self.0[..7]
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
