//! Sync server
//!
//! Serves every repository directory found directly under a root directory,
//! one request per connection, connections handled sequentially. A push never
//! leaves a half-updated ref: received objects are content-addressed (safe to
//! land immediately), validation happens before the single ref rename, and a
//! rejected update changes nothing.

use crate::areas::repository::{DEFAULT_BRANCH, Repository};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::protocol::{
    NIL, Request, StreamItem, parse_tip_field, read_line, read_stream_item, tip_field, write_line,
    write_object,
};
use crate::errors::PygitError;
use anyhow::Context;
use std::path::PathBuf;
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

type Reader = BufReader<OwnedReadHalf>;
type Writer = BufWriter<OwnedWriteHalf>;

pub struct Server {
    root: PathBuf,
}

impl Server {
    pub fn new(root: PathBuf) -> Self {
        Server { root }
    }

    /// Accept and serve connections until the process is stopped
    pub async fn run(&self, listener: TcpListener) -> anyhow::Result<()> {
        info!(root = %self.root.display(), addr = %listener.local_addr()?, "serving");

        loop {
            let (stream, peer) = listener.accept().await?;
            match self.handle(stream).await {
                Ok(()) => info!(%peer, "request served"),
                Err(e) => warn!(%peer, error = %e, "request failed"),
            }
        }
    }

    async fn handle(&self, stream: TcpStream) -> anyhow::Result<()> {
        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut writer = BufWriter::new(write_half);

        let header = read_line(&mut reader).await?;
        let request = Request::parse(&header)?;
        info!(request = %header, "handling");

        let repository = self.open_repository(request.repo())?;
        match &request {
            Request::Have { .. } => self.serve_have(&repository, &mut writer).await?,
            Request::Tip { branch, .. } => {
                self.serve_tip(&repository, branch, &mut writer).await?;
            }
            Request::Pull { branch, .. } => {
                self.serve_pull(&repository, branch, &mut writer).await?;
            }
            Request::Clone { .. } => self.serve_clone(&repository, &mut writer).await?,
            Request::Push { branch, .. } => {
                self.serve_push(&repository, branch, &mut reader, &mut writer)
                    .await?;
            }
        }

        writer.flush().await?;
        Ok(())
    }

    fn open_repository(&self, name: &str) -> anyhow::Result<Repository> {
        Repository::open(&self.root.join(name), Box::new(std::io::sink()))
            .with_context(|| format!("repository '{name}' is not served here"))
    }

    /// Every object reachable from any branch tip
    fn reachable(&self, repository: &Repository) -> anyhow::Result<Vec<ObjectId>> {
        let tips: Vec<ObjectId> = repository
            .refs()
            .list_branches()?
            .into_iter()
            .map(|(_, oid)| oid)
            .collect();
        Ok(repository
            .database()
            .closure(&tips)?
            .into_iter()
            .collect())
    }

    async fn serve_have(&self, repository: &Repository, writer: &mut Writer) -> anyhow::Result<()> {
        let ids = self.reachable(repository)?;
        write_line(writer, &ids.len().to_string()).await?;
        for oid in &ids {
            write_line(writer, oid.as_ref()).await?;
        }
        write_line(writer, "END").await?;
        Ok(())
    }

    async fn serve_tip(
        &self,
        repository: &Repository,
        branch: &str,
        writer: &mut Writer,
    ) -> anyhow::Result<()> {
        let tip = repository.refs().read_ref(branch)?;
        write_line(writer, &format!("TIP {}", tip_field(tip.as_ref()))).await?;
        Ok(())
    }

    async fn serve_pull(
        &self,
        repository: &Repository,
        branch: &str,
        writer: &mut Writer,
    ) -> anyhow::Result<()> {
        let tip = repository.refs().read_ref(branch)?;
        write_line(writer, &format!("TIP {}", tip_field(tip.as_ref()))).await?;

        if let Some(tip) = tip {
            self.stream_closure(repository, &[tip], writer).await?;
        }
        Ok(())
    }

    async fn serve_clone(
        &self,
        repository: &Repository,
        writer: &mut Writer,
    ) -> anyhow::Result<()> {
        let branches = repository.refs().list_branches()?;
        for (name, oid) in &branches {
            write_line(writer, &format!("REF {name} {oid}")).await?;
        }
        write_line(writer, "REFS-END").await?;

        let tips: Vec<ObjectId> = branches.into_iter().map(|(_, oid)| oid).collect();
        self.stream_closure(repository, &tips, writer).await?;

        let head = repository
            .refs()
            .current_branch()?
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        write_line(writer, &format!("HEAD {head}")).await?;
        Ok(())
    }

    async fn stream_closure(
        &self,
        repository: &Repository,
        roots: &[ObjectId],
        writer: &mut Writer,
    ) -> anyhow::Result<()> {
        for oid in repository.database().closure(roots)? {
            let framed = repository.database().load_raw(&oid)?;
            write_object(writer, &oid, &framed).await?;
        }
        write_line(writer, "DONE").await?;
        Ok(())
    }

    async fn serve_push(
        &self,
        repository: &Repository,
        branch: &str,
        reader: &mut Reader,
        writer: &mut Writer,
    ) -> anyhow::Result<()> {
        write_line(writer, "READY").await?;
        writer.flush().await?;

        // land objects as they arrive; content addressing makes orphans from
        // a failed push harmless
        let mut rejection: Option<String> = None;
        loop {
            match read_stream_item(reader).await? {
                StreamItem::Done => break,
                StreamItem::Object { oid, framed } => {
                    if let Err(e) = repository.database().put_framed(&oid, &framed) {
                        rejection.get_or_insert(match e.downcast_ref::<PygitError>() {
                            Some(PygitError::Corrupt { expected, actual }) => {
                                format!("corrupt {expected} {actual}")
                            }
                            _ => format!("unusable object {oid}"),
                        });
                    }
                }
            }
        }

        let update = read_line(reader).await?;
        let verdict = match rejection {
            Some(reason) => Err(reason),
            None => self.validate_update(repository, branch, &update),
        };

        match verdict {
            Ok(new_tip) => {
                repository.refs().write_ref(branch, &new_tip)?;
                info!(branch, tip = %new_tip, "ref updated");
                write_line(writer, "OK").await?;
            }
            Err(reason) => {
                warn!(branch, %reason, "update rejected");
                write_line(writer, &format!("ERR {reason}")).await?;
            }
        }
        Ok(())
    }

    /// Check an `UPDATE <old|NIL> <new>` line against the current state.
    /// Returns the new tip to write, or the rejection reason.
    fn validate_update(
        &self,
        repository: &Repository,
        branch: &str,
        update: &str,
    ) -> Result<ObjectId, String> {
        let fields: Vec<&str> = update.split(' ').collect();
        let (old, new) = match fields.as_slice() {
            ["UPDATE", old, new] => (*old, *new),
            _ => return Err(format!("bad update line: {update:?}")),
        };

        let old = parse_tip_field(old).map_err(|e| e.to_string())?;
        let Some(new) = parse_tip_field(new).map_err(|e| e.to_string())? else {
            return Err(format!("new tip may not be {NIL}"));
        };

        let current = repository
            .refs()
            .read_ref(branch)
            .map_err(|e| e.to_string())?;
        if current != old {
            return Err("ref-race".to_string());
        }

        // the full closure must have landed before the ref moves
        if let Err(e) = repository.database().closure(std::slice::from_ref(&new)) {
            return Err(format!("incomplete push: {e}"));
        }

        if let Some(current) = &current {
            match repository.database().is_ancestor(current, &new) {
                Ok(true) => {}
                Ok(false) => return Err("non-fast-forward".to_string()),
                Err(e) => return Err(e.to_string()),
            }
        }

        Ok(new)
    }
}
