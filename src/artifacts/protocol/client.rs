//! Sync client
//!
//! One connection per request, every request under a wall-clock deadline.
//! A timed-out or failed request has observed no ref update on either side,
//! so retrying is always safe.

use crate::areas::database::Database;
use crate::areas::remotes::RemoteUrl;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::protocol::{
    StreamItem, parse_tip_field, read_line, read_stream_item, tip_field, write_line, write_object,
};
use crate::errors::PygitError;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// Default per-request deadline, seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

type Reader = BufReader<OwnedReadHalf>;
type Writer = BufWriter<OwnedWriteHalf>;

/// Everything a clone receives
pub struct CloneBundle {
    /// Branch name to tip
    pub refs: Vec<(String, ObjectId)>,
    /// Ids written into the local store, in arrival order
    pub received: Vec<ObjectId>,
    /// The server's default branch
    pub head: String,
}

pub struct Client {
    url: RemoteUrl,
    timeout: Duration,
}

impl Client {
    pub fn new(url: RemoteUrl, timeout_secs: u64) -> Self {
        Client {
            url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn with_deadline<T, F>(&self, request: F) -> anyhow::Result<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(PygitError::Timeout(self.timeout.as_secs()).into()),
        }
    }

    async fn connect(&self) -> anyhow::Result<(Reader, Writer)> {
        let stream = TcpStream::connect(self.url.address())
            .await
            .map_err(|e| PygitError::Network(format!("{}: {e}", self.url.address())))?;
        let (read_half, write_half) = stream.into_split();
        Ok((BufReader::new(read_half), BufWriter::new(write_half)))
    }

    /// `TIP` request: the server's tip for a branch
    pub async fn fetch_tip(&self, branch: &str) -> anyhow::Result<Option<ObjectId>> {
        self.with_deadline(async {
            let (mut reader, mut writer) = self.connect().await?;
            write_line(&mut writer, &format!("TIP {} {}", self.url.repo, branch)).await?;
            writer.flush().await?;

            let line = read_line(&mut reader).await?;
            match line.strip_prefix("TIP ") {
                Some(field) => parse_tip_field(field),
                None => Err(PygitError::ProtocolViolation(format!(
                    "expected TIP, got {line:?}"
                ))
                .into()),
            }
        })
        .await
    }

    /// `HAVE` request: every id the server holds
    pub async fn fetch_have(&self) -> anyhow::Result<BTreeSet<ObjectId>> {
        self.with_deadline(async {
            let (mut reader, mut writer) = self.connect().await?;
            write_line(&mut writer, &format!("HAVE {}", self.url.repo)).await?;
            writer.flush().await?;

            let count: usize = read_line(&mut reader).await?.parse().map_err(|_| {
                PygitError::ProtocolViolation("bad HAVE count".to_string())
            })?;

            let mut ids = BTreeSet::new();
            for _ in 0..count {
                let line = read_line(&mut reader).await?;
                ids.insert(ObjectId::try_parse(line).map_err(|e| {
                    PygitError::ProtocolViolation(format!("bad id in HAVE: {e}"))
                })?);
            }

            let end = read_line(&mut reader).await?;
            if end != "END" {
                return Err(PygitError::ProtocolViolation(format!(
                    "expected END, got {end:?}"
                ))
                .into());
            }
            Ok(ids)
        })
        .await
    }

    /// `PUSH` request: stream objects, then ask for the ref update
    pub async fn push(
        &self,
        branch: &str,
        old_tip: Option<&ObjectId>,
        new_tip: &ObjectId,
        objects: &[(ObjectId, Bytes)],
    ) -> anyhow::Result<()> {
        self.with_deadline(async {
            let (mut reader, mut writer) = self.connect().await?;
            write_line(&mut writer, &format!("PUSH {} {}", self.url.repo, branch)).await?;
            writer.flush().await?;

            let ready = read_line(&mut reader).await?;
            if ready != "READY" {
                return Err(PygitError::ProtocolViolation(format!(
                    "expected READY, got {ready:?}"
                ))
                .into());
            }

            for (oid, framed) in objects {
                write_object(&mut writer, oid, framed).await?;
            }
            write_line(&mut writer, "DONE").await?;
            write_line(
                &mut writer,
                &format!("UPDATE {} {}", tip_field(old_tip), new_tip),
            )
            .await?;
            writer.flush().await?;

            let verdict = read_line(&mut reader).await?;
            Self::parse_verdict(branch, &verdict)
        })
        .await
    }

    /// `PULL` request: receive the branch tip and its closure, writing every
    /// object the local store lacks (each verified against its id).
    pub async fn pull(
        &self,
        branch: &str,
        database: &Database,
    ) -> anyhow::Result<Option<ObjectId>> {
        self.with_deadline(async {
            let (mut reader, mut writer) = self.connect().await?;
            write_line(&mut writer, &format!("PULL {} {}", self.url.repo, branch)).await?;
            writer.flush().await?;

            let line = read_line(&mut reader).await?;
            let tip = match line.strip_prefix("TIP ") {
                Some(field) => parse_tip_field(field)?,
                None => {
                    return Err(PygitError::ProtocolViolation(format!(
                        "expected TIP, got {line:?}"
                    ))
                    .into());
                }
            };

            if tip.is_some() {
                Self::receive_objects(&mut reader, database).await?;
            }
            Ok(tip)
        })
        .await
    }

    /// `CLONE` request: refs, full closure, default branch
    pub async fn clone_into(&self, database: &Database) -> anyhow::Result<CloneBundle> {
        self.with_deadline(async {
            let (mut reader, mut writer) = self.connect().await?;
            write_line(&mut writer, &format!("CLONE {}", self.url.repo)).await?;
            writer.flush().await?;

            let mut refs = Vec::new();
            loop {
                let line = read_line(&mut reader).await?;
                if line == "REFS-END" {
                    break;
                }
                let Some(rest) = line.strip_prefix("REF ") else {
                    return Err(PygitError::ProtocolViolation(format!(
                        "expected REF, got {line:?}"
                    ))
                    .into());
                };
                let (name, hex) = rest.split_once(' ').ok_or_else(|| {
                    PygitError::ProtocolViolation(format!("bad REF line: {line:?}"))
                })?;
                refs.push((name.to_string(), ObjectId::try_parse(hex)?));
            }

            let received = Self::receive_objects(&mut reader, database).await?;

            let head_line = read_line(&mut reader).await?;
            let head = head_line
                .strip_prefix("HEAD ")
                .ok_or_else(|| {
                    PygitError::ProtocolViolation(format!("expected HEAD, got {head_line:?}"))
                })?
                .to_string();

            Ok(CloneBundle {
                refs,
                received,
                head,
            })
        })
        .await
    }

    async fn receive_objects(
        reader: &mut Reader,
        database: &Database,
    ) -> anyhow::Result<Vec<ObjectId>> {
        let mut received = Vec::new();
        loop {
            match read_stream_item(reader).await? {
                StreamItem::Done => return Ok(received),
                StreamItem::Object { oid, framed } => {
                    if !database.exists(&oid) {
                        database.put_framed(&oid, &framed)?;
                    }
                    received.push(oid);
                }
            }
        }
    }

    fn parse_verdict(branch: &str, verdict: &str) -> anyhow::Result<()> {
        if verdict == "OK" {
            return Ok(());
        }

        let Some(reason) = verdict.strip_prefix("ERR ") else {
            return Err(PygitError::ProtocolViolation(format!(
                "expected OK or ERR, got {verdict:?}"
            ))
            .into());
        };

        let mut words = reason.split(' ');
        match words.next() {
            Some("non-fast-forward") => Err(PygitError::NonFastForward(branch.to_string()).into()),
            Some("ref-race") => Err(PygitError::RefRaceLost(branch.to_string()).into()),
            Some("corrupt") => {
                let expected = words.next().unwrap_or("?").to_string();
                let actual = words.next().unwrap_or("?").to_string();
                Err(PygitError::Corrupt { expected, actual }.into())
            }
            _ => Err(PygitError::Network(format!("server rejected push: {reason}")).into()),
        }
    }
}
