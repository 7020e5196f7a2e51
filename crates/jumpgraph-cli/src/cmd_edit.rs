//! One-shot edits: each opens the graph file, applies one command through
//! the router, and flushes before exiting.

use anyhow::{Result, bail};
use jumpgraph::v1::query;
use jumpgraph_session::{FromPresentation, SyncConfig};
use std::path::{Path, PathBuf};

use crate::host::CliHost;
use crate::session::{self, Opened};

pub struct PushArgs {
    pub session: PathBuf,
    pub uri: String,
    pub line: u32,
    pub character: u32,
    pub note: Option<String>,
}

fn open(path: &Path, root: Option<&Path>) -> Result<Opened> {
    session::open(path, root, SyncConfig::default(), CliHost::new())
}

pub fn push(args: PushArgs, root: Option<&Path>) -> Result<()> {
    let Opened { mut router, id } = open(&args.session, root)?;
    let focus = session::focus_at(&args.uri, args.line, args.character, args.note)?;
    router.host().queue_focus(focus);
    router.push();

    let head = router
        .graph(&id)
        .and_then(query::head)
        .map(|n| n.id.clone());
    Opened { router, id }.finish()?;
    if let Some(head) = head {
        println!("{head}");
    }
    Ok(())
}

/// Prints the navigation request for the node popped back to, if any.
pub fn pop(path: PathBuf, root: Option<&Path>) -> Result<()> {
    let Opened { mut router, id } = open(&path, root)?;
    if router.graph(&id).and_then(query::head).is_none() {
        eprintln!("nothing to pop");
        return Ok(());
    }
    router.pop();
    let router = Opened { router, id }.finish()?;
    if let Some(request) = router.host().navigations.last() {
        println!("{}", serde_json::to_string(request)?);
    }
    Ok(())
}

pub fn head(path: PathBuf, node_id: String) -> Result<()> {
    edit_node(&path, &node_id, FromPresentation::SetHead {
        node_id: node_id.clone(),
    })
}

pub fn note(path: PathBuf, node_id: String, text: String) -> Result<()> {
    edit_node(&path, &node_id, FromPresentation::Note {
        node_id: node_id.clone(),
        note: text,
    })
}

fn edit_node(path: &Path, node_id: &str, message: FromPresentation) -> Result<()> {
    let Opened { mut router, id } = open(path, None)?;
    if router.graph(&id).and_then(|g| query::node(g, node_id)).is_none() {
        bail!("no node {node_id} in {}", path.display());
    }
    router.on_presentation_message(&id, message);
    Opened { router, id }.finish()?;
    Ok(())
}
