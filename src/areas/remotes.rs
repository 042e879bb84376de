//! Named remotes
//!
//! A flat `name -> url` table persisted as `<name> <url>` lines, plus the
//! `pygit://host:port/repo` URL shape used by the sync protocol.

use crate::artifacts::protocol::DEFAULT_PORT;
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// A parsed `pygit://host:port/repo` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    pub host: String,
    pub port: u16,
    pub repo: String,
}

impl RemoteUrl {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let url = url::Url::parse(raw).with_context(|| format!("invalid remote url: {raw}"))?;

        if url.scheme() != "pygit" {
            anyhow::bail!("unsupported url scheme: {}", url.scheme());
        }
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("remote url has no host: {}", raw))?
            .to_string();
        let repo = url.path().trim_matches('/').to_string();
        if repo.is_empty() || repo.contains('/') {
            anyhow::bail!("remote url must name a single repository: {}", raw);
        }

        Ok(RemoteUrl {
            host,
            port: url.port().unwrap_or(DEFAULT_PORT),
            repo,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pygit://{}:{}/{}", self.host, self.port, self.repo)
    }
}

pub struct Remotes {
    path: Box<Path>,
}

impl Remotes {
    pub fn new(path: Box<Path>) -> Self {
        Remotes { path }
    }

    fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e).context("unable to read remotes"),
        };

        let mut remotes = BTreeMap::new();
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            let (name, url) = line
                .split_once(' ')
                .ok_or_else(|| anyhow::anyhow!("malformed remotes line: {:?}", line))?;
            remotes.insert(name.to_string(), url.to_string());
        }
        Ok(remotes)
    }

    fn save(&self, remotes: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .context("remotes path has no parent directory")?;
        let temp_path = parent.join(format!("tmp-remotes-{}", std::process::id()));

        let mut temp_file = std::fs::File::create(&temp_path)?;
        for (name, url) in remotes {
            writeln!(temp_file, "{name} {url}")?;
        }
        temp_file.sync_all()?;

        std::fs::rename(&temp_path, &self.path).context("unable to move remotes into place")?;
        Ok(())
    }

    /// Add or replace a remote; the url must parse
    pub fn add(&self, name: &str, url: &str) -> anyhow::Result<()> {
        RemoteUrl::parse(url)?;
        let mut remotes = self.load()?;
        remotes.insert(name.to_string(), url.to_string());
        self.save(&remotes)
    }

    pub fn remove(&self, name: &str) -> anyhow::Result<()> {
        let mut remotes = self.load()?;
        if remotes.remove(name).is_none() {
            anyhow::bail!("remote '{}' not found", name);
        }
        self.save(&remotes)
    }

    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        Ok(self.load()?.into_iter().collect())
    }

    /// Resolve a remote name to its parsed url
    pub fn url(&self, name: &str) -> anyhow::Result<RemoteUrl> {
        let remotes = self.load()?;
        let raw = remotes
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("remote '{}' not found", name))?;
        RemoteUrl::parse(raw)
    }
}
