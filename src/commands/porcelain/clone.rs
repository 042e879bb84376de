use crate::areas::remotes::RemoteUrl;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::protocol::client::Client;
use std::io::Write;
use std::path::Path;

/// Clone a remote repository into a fresh directory: init, receive refs and
/// the full object closure, point HEAD at the server's default branch, then
/// materialize the working tree.
pub async fn clone(
    url: &str,
    target: &Path,
    timeout_secs: u64,
    writer: Box<dyn std::io::Write>,
) -> anyhow::Result<()> {
    let url = RemoteUrl::parse(url)?;
    let repository = Repository::new(target, writer)?;
    repository.create_skeleton()?;

    let client = Client::new(url.clone(), timeout_secs);
    let bundle = client.clone_into(repository.database()).await?;

    for (name, oid) in &bundle.refs {
        // refuse to point a ref at an incomplete closure
        repository.database().closure(std::slice::from_ref(oid))?;
        repository.refs().write_ref(name, oid)?;
    }
    repository.refs().set_head_symbolic(&bundle.head)?;
    repository.remotes().add("origin", &url.to_string())?;

    if let Some(tip) = repository.refs().resolve_head()? {
        let index = repository.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        Migration::rooted(&repository, tip).apply(&mut index)?;
    }

    writeln!(
        repository.writer(),
        "cloned {} into {} ({} objects, {} refs)",
        url,
        target.display(),
        bundle.received.len(),
        bundle.refs.len()
    )?;
    Ok(())
}
