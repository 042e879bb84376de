//! Core object traits
//!
//! - `Packable`: serialize to the framed binary form
//! - `Unpackable`: deserialize from the payload (header already consumed)
//! - `Object`: shared operations (id computation, storage path)
//!
//! All objects share the frame `<type> <size>\0<payload>`; identity is the
//! SHA-1 of the whole frame.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Serialize an object to its framed binary form
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Deserialize an object from its payload bytes
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Compute the object id by hashing the framed bytes
    fn object_id(&self) -> Result<ObjectId> {
        Ok(hash_bytes(&self.serialize()?))
    }

    /// Relative path of this object under the objects directory
    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// SHA-1 over already-framed bytes
pub fn hash_bytes(framed: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(framed);
    let digest = hasher.finalize();
    ObjectId::try_parse(format!("{digest:x}")).expect("sha1 digest is always 40 hex chars")
}

/// Wrap a payload in the `<type> <size>\0` frame
pub fn frame(object_type: ObjectType, payload: &[u8]) -> Result<Bytes> {
    let mut framed = Vec::with_capacity(payload.len() + 16);
    write!(framed, "{} {}\0", object_type.as_str(), payload.len())?;
    framed.write_all(payload)?;
    Ok(Bytes::from(framed))
}

/// Type-erased object, produced when the kind is only known at runtime
/// (reading from the store, receiving from a peer).
pub enum ObjectBox {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl ObjectBox {
    /// Parse a full framed object, checking the declared payload length
    pub fn parse_framed(framed: &[u8]) -> Result<Self> {
        let nul = framed
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(|| anyhow::anyhow!("object frame has no header terminator"))?;
        let header = std::str::from_utf8(&framed[..nul])?;
        let (type_str, size_str) = header
            .split_once(' ')
            .ok_or_else(|| anyhow::anyhow!("malformed object header: {header:?}"))?;

        let object_type = ObjectType::try_from(type_str)?;
        let size: usize = size_str.parse()?;

        let payload = &framed[nul + 1..];
        if payload.len() != size {
            anyhow::bail!(
                "object declares {} payload bytes but carries {}",
                size,
                payload.len()
            );
        }

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Blob::deserialize(payload)?)),
            ObjectType::Tree => Ok(ObjectBox::Tree(Tree::deserialize(payload)?)),
            ObjectType::Commit => Ok(ObjectBox::Commit(Commit::deserialize(payload)?)),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
        }
    }
}
