//! Sync wire protocol
//!
//! Line-oriented ASCII commands, one request per connection:
//!
//! ```text
//! HAVE <repo>              -> <count> \n <40-hex>... \n END
//! TIP <repo> <branch>      -> TIP <40-hex|NIL>
//! PUSH <repo> <branch>     -> READY ; then OBJ records, DONE,
//!                             UPDATE <old|NIL> <new> -> OK | ERR <reason>
//! PULL <repo> <branch>     -> TIP <40-hex|NIL> ; then OBJ records, DONE
//! CLONE <repo>             -> REF lines, REFS-END, OBJ records, DONE,
//!                             HEAD <branch>
//! ```
//!
//! Objects travel framed as `OBJ <id> <length>\n<length raw bytes>\n`; the
//! length prefix lets both sides stream without buffering whole objects.

pub mod client;
pub mod server;

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::PygitError;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

/// Default TCP port of the sync server
pub const DEFAULT_PORT: u16 = 8471;

/// Placeholder for "no commit" in TIP and UPDATE lines
pub const NIL: &str = "NIL";

/// A parsed request header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Have { repo: String },
    Tip { repo: String, branch: String },
    Push { repo: String, branch: String },
    Pull { repo: String, branch: String },
    Clone { repo: String },
}

impl Request {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split(' ');
        let command = words.next().unwrap_or_default();
        let rest: Vec<&str> = words.collect();

        let request = match (command, rest.as_slice()) {
            ("HAVE", [repo]) => Request::Have {
                repo: repo.to_string(),
            },
            ("TIP", [repo, branch]) => Request::Tip {
                repo: repo.to_string(),
                branch: branch.to_string(),
            },
            ("PUSH", [repo, branch]) => Request::Push {
                repo: repo.to_string(),
                branch: branch.to_string(),
            },
            ("PULL", [repo, branch]) => Request::Pull {
                repo: repo.to_string(),
                branch: branch.to_string(),
            },
            ("CLONE", [repo]) => Request::Clone {
                repo: repo.to_string(),
            },
            _ => {
                return Err(
                    PygitError::ProtocolViolation(format!("bad request: {line:?}")).into(),
                );
            }
        };

        request.validate()?;
        Ok(request)
    }

    pub fn repo(&self) -> &str {
        match self {
            Request::Have { repo }
            | Request::Tip { repo, .. }
            | Request::Push { repo, .. }
            | Request::Pull { repo, .. }
            | Request::Clone { repo } => repo,
        }
    }

    /// Repository names address directories under the served root; keep them
    /// to a single flat component.
    fn validate(&self) -> anyhow::Result<()> {
        let repo = self.repo();
        let clean = !repo.is_empty()
            && repo != "."
            && repo != ".."
            && !repo.contains('/')
            && !repo.contains('\\');
        if clean {
            Ok(())
        } else {
            Err(PygitError::ProtocolViolation(format!("bad repository name: {repo:?}")).into())
        }
    }
}

/// One record of an object stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    Object { oid: ObjectId, framed: Bytes },
    Done,
}

/// Read one `\n`-terminated line; EOF mid-request is a protocol violation
pub async fn read_line<R>(reader: &mut BufReader<R>) -> anyhow::Result<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(PygitError::ProtocolViolation("unexpected end of stream".to_string()).into());
    }
    Ok(line.trim_end_matches('\n').to_string())
}

pub async fn write_line<W>(writer: &mut W, line: &str) -> anyhow::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    Ok(())
}

/// Send one object record
pub async fn write_object<W>(writer: &mut W, oid: &ObjectId, framed: &[u8]) -> anyhow::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    write_line(writer, &format!("OBJ {} {}", oid, framed.len())).await?;
    writer.write_all(framed).await?;
    writer.write_all(b"\n").await?;
    Ok(())
}

/// Read the next object record or the `DONE` terminator
pub async fn read_stream_item<R>(reader: &mut BufReader<R>) -> anyhow::Result<StreamItem>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let line = read_line(reader).await?;
    if line == "DONE" {
        return Ok(StreamItem::Done);
    }

    let Some(rest) = line.strip_prefix("OBJ ") else {
        return Err(
            PygitError::ProtocolViolation(format!("expected object record, got {line:?}")).into(),
        );
    };
    let (oid, length) = rest
        .split_once(' ')
        .ok_or_else(|| PygitError::ProtocolViolation(format!("bad object record: {line:?}")))?;
    let oid = ObjectId::try_parse(oid)
        .map_err(|e| PygitError::ProtocolViolation(format!("bad object id: {e}")))?;
    let length: usize = length
        .parse()
        .map_err(|_| PygitError::ProtocolViolation(format!("bad object length: {line:?}")))?;

    let mut framed = vec![0u8; length];
    reader.read_exact(&mut framed).await.map_err(|_| {
        PygitError::ProtocolViolation("object record shorter than declared".to_string())
    })?;

    let mut newline = [0u8; 1];
    reader.read_exact(&mut newline).await.map_err(|_| {
        PygitError::ProtocolViolation("object record missing terminator".to_string())
    })?;
    if newline != *b"\n" {
        return Err(
            PygitError::ProtocolViolation("object record missing terminator".to_string()).into(),
        );
    }

    Ok(StreamItem::Object {
        oid,
        framed: Bytes::from(framed),
    })
}

/// Render a tip as `<hex>` or `NIL`
pub fn tip_field(tip: Option<&ObjectId>) -> String {
    match tip {
        Some(oid) => oid.to_string(),
        None => NIL.to_string(),
    }
}

/// Parse a `<hex>|NIL` field
pub fn parse_tip_field(field: &str) -> anyhow::Result<Option<ObjectId>> {
    if field == NIL {
        Ok(None)
    } else {
        Ok(Some(ObjectId::try_parse(field).map_err(|e| {
            PygitError::ProtocolViolation(format!("bad tip field: {e}"))
        })?))
    }
}
