//! Commit object: a snapshot plus its history edge
//!
//! ## Format
//!
//! ```text
//! tree <hex>
//! parent <hex>          (absent on the initial commit)
//! author <name> <email> <unix-seconds> <tz-offset>
//! committer <name> <email> <unix-seconds> <tz-offset>
//!
//! <message>
//! ```
//!
//! The message is carried verbatim; no newline normalization happens anywhere
//! between `commit -m` and the stored bytes.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::PygitError;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Environment variable naming the committer
pub const AUTHOR_NAME_VAR: &str = "PYGIT_AUTHOR_NAME";
/// Environment variable naming the committer's email
pub const AUTHOR_EMAIL_VAR: &str = "PYGIT_AUTHOR_EMAIL";
/// Optional timestamp override, `<unix-seconds> <tz-offset>`
pub const AUTHOR_DATE_VAR: &str = "PYGIT_AUTHOR_DATE";

/// Author or committer signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    pub fn new(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Read the committer identity from the environment.
    ///
    /// Missing name or email fails with `IdentityMissing`; the timestamp is
    /// captured now unless `PYGIT_AUTHOR_DATE` pins it.
    pub fn from_env() -> anyhow::Result<Self> {
        let name = std::env::var(AUTHOR_NAME_VAR).map_err(|_| PygitError::IdentityMissing)?;
        let email = std::env::var(AUTHOR_EMAIL_VAR).map_err(|_| PygitError::IdentityMissing)?;

        let timestamp = match std::env::var(AUTHOR_DATE_VAR) {
            Ok(date) => Self::parse_timestamp(&date)
                .ok_or_else(|| anyhow::anyhow!("invalid {}: {:?}", AUTHOR_DATE_VAR, date))?,
            Err(_) => chrono::Local::now().fixed_offset(),
        };

        Ok(Author::new(name, email, timestamp))
    }

    fn parse_timestamp(value: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        let (seconds, offset) = value.split_once(' ')?;
        let seconds: i64 = seconds.parse().ok()?;
        let offset = Self::parse_offset(offset)?;
        Some(chrono::DateTime::from_timestamp(seconds, 0)?.with_timezone(&offset))
    }

    fn parse_offset(value: &str) -> Option<chrono::FixedOffset> {
        let (sign, digits) = value.split_at_checked(1)?;
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hours: i32 = digits[..2].parse().ok()?;
        let minutes: i32 = digits[2..].parse().ok()?;
        let seconds = (hours * 60 + minutes) * 60;
        match sign {
            "+" => chrono::FixedOffset::east_opt(seconds),
            "-" => chrono::FixedOffset::west_opt(seconds),
            _ => None,
        }
    }

    /// `Name <email> <unix-seconds> <tz-offset>`
    pub fn signature(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// `Name <email>`
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// `Mon Nov 13 ... 2023 +0000`, for log output
    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    /// Parse `name <email> timestamp tz`
    fn try_from(value: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() != 3 {
            anyhow::bail!("invalid signature: {:?}", value);
        }
        let (offset_str, seconds_str, name_email) = (parts[0], parts[1], parts[2]);

        let seconds: i64 = seconds_str.parse()?;
        let offset = Self::parse_offset(offset_str)
            .ok_or_else(|| anyhow::anyhow!("invalid timezone offset: {:?}", offset_str))?;
        let timestamp = chrono::DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| anyhow::anyhow!("invalid timestamp: {}", seconds))?
            .with_timezone(&offset);

        let open = name_email
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("signature missing '<'"))?;
        let close = name_email
            .find('>')
            .ok_or_else(|| anyhow::anyhow!("signature missing '>'"))?;
        let name = name_email[..open].trim().to_string();
        let email = name_email[open + 1..close].to_string();

        Ok(Author::new(name, email, timestamp))
    }
}

/// Snapshot plus history edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Previous tip, absent on the initial commit
    parent: Option<ObjectId>,
    /// Root tree of the snapshot
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First message line, for one-line displays
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut payload = Vec::new();

        writeln!(payload, "tree {}", self.tree_oid)?;
        if let Some(parent) = &self.parent {
            writeln!(payload, "parent {}", parent)?;
        }
        writeln!(payload, "author {}", self.author.signature())?;
        writeln!(payload, "committer {}", self.committer.signature())?;
        writeln!(payload)?;
        payload.write_all(self.message.as_bytes())?;

        frame(ObjectType::Commit, &payload)
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        let content = String::from_utf8(content)?;

        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| anyhow::anyhow!("commit missing header separator"))?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| anyhow::anyhow!("malformed commit header: {:?}", line))?;
            match key {
                "tree" => tree_oid = Some(ObjectId::try_parse(value)?),
                "parent" => parents.push(ObjectId::try_parse(value)?),
                "author" => author = Some(Author::try_from(value)?),
                "committer" => committer = Some(Author::try_from(value)?),
                _ => anyhow::bail!("unknown commit header: {:?}", key),
            }
        }

        if parents.len() > 1 {
            anyhow::bail!("merge commits are not supported");
        }

        let tree_oid = tree_oid.ok_or_else(|| anyhow::anyhow!("commit missing tree header"))?;
        let author = author.ok_or_else(|| anyhow::anyhow!("commit missing author header"))?;
        let committer =
            committer.ok_or_else(|| anyhow::anyhow!("commit missing committer header"))?;

        Ok(Commit {
            parent: parents.pop(),
            tree_oid,
            author,
            committer,
            message: message.to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
