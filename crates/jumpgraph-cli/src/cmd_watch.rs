//! Long-running host: stdin plays the editor and the canvas, the graph file
//! is watched for outside edits, and navigation requests print as JSON lines.

use anyhow::{Context, Result, anyhow, bail};
use jumpgraph_session::{
    Command, CommandRouter, DocumentWatcher, Event, FromPresentation, SessionId, SyncConfig, WatcherConfig,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::cmd_show::format_graph;
use crate::host::{self, CliHost, SharedMirror};
use crate::session::{self, Opened};

pub struct WatchArgs {
    pub session: PathBuf,
    pub root: Option<PathBuf>,
    pub debounce_ms: u64,
    pub poll_ms: u64,
}

/// One line of stdin.
#[derive(Debug, PartialEq)]
enum Input {
    Push {
        uri: String,
        line: u32,
        character: u32,
    },
    Pop,
    Head(String),
    Jump(String),
    Show,
    Quit,
    Blank,
}

fn parse_line(line: &str) -> Result<Input> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Input::Blank);
    };
    let mut arg = |name: &str| {
        words
            .next()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("{verb}: missing {name}"))
    };
    let input = match verb {
        "push" => {
            let uri = arg("uri")?;
            let line = arg("line")?.parse().context("push: line must be a number")?;
            let character = match arg("character") {
                Ok(c) => c.parse().context("push: character must be a number")?,
                Err(_) => 0,
            };
            Input::Push {
                uri,
                line,
                character,
            }
        }
        "pop" => Input::Pop,
        "head" => Input::Head(arg("node id")?),
        "jump" => Input::Jump(arg("node id")?),
        "show" => Input::Show,
        "quit" | "exit" => Input::Quit,
        other => bail!("unknown command: {other}"),
    };
    Ok(input)
}

pub fn run(args: WatchArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(watch(args))
}

async fn watch(args: WatchArgs) -> Result<()> {
    let mirror = SharedMirror::default();
    let config = SyncConfig {
        debounce: Duration::from_millis(args.debounce_ms),
    };
    let Opened { mut router, id } = session::open(
        &args.session,
        args.root.as_deref(),
        config,
        CliHost::echoing(mirror.clone()),
    )?;
    router.on_presentation_message(&id, FromPresentation::Init);

    let (tx, rx) = mpsc::channel(64);
    let watcher = DocumentWatcher::new(
        id.clone(),
        args.session.clone(),
        Some(WatcherConfig {
            poll_interval: Duration::from_millis(args.poll_ms),
            ..Default::default()
        }),
    )
    .start(tx.clone())
    .await?;
    let event_loop = tokio::spawn(jumpgraph_session::run(router, rx));
    info!(session = %id, "watching");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let input = match parse_line(&line) {
            Ok(Input::Quit) => break,
            Ok(input) => input,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };
        match dispatch(input, &id, &mirror, &tx).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("error: {e:#}"),
        }
    }

    let _ = tx.send(Event::Shutdown).await;
    let router = event_loop.await.context("Event loop failed")?;
    watcher.stop().await;
    exit_status(&router, &id)
}

/// Fails only when the last write of the session failed. Problems reported
/// earlier in the run and since recovered from do not count.
fn exit_status(router: &CommandRouter<CliHost>, id: &SessionId) -> Result<()> {
    if router.save_failed(id) {
        match router.host().errors.last() {
            Some(error) => bail!("{error}"),
            None => bail!("failed to save {id}"),
        }
    }
    Ok(())
}

/// Returns false once the event loop is gone.
async fn dispatch(
    input: Input,
    id: &SessionId,
    mirror: &SharedMirror,
    tx: &mpsc::Sender<Event>,
) -> Result<bool> {
    let event = match input {
        Input::Push {
            uri,
            line,
            character,
        } => {
            let focus = session::focus_at(&uri, line, character, None)?;
            host::lock(mirror).focus.push_back(focus);
            Event::Command(Command::Push)
        }
        Input::Pop => Event::Command(Command::Pop),
        Input::Head(node_id) => Event::Presentation {
            session: id.clone(),
            message: FromPresentation::SetHead { node_id },
        },
        Input::Jump(node_id) => {
            let source_location = {
                let mirror = host::lock(mirror);
                match jumpgraph::v1::query::node(&mirror.graph, &node_id) {
                    Some(node) => node.source_location().clone(),
                    None => bail!("no node {node_id}"),
                }
            };
            Event::Presentation {
                session: id.clone(),
                message: FromPresentation::Jump { source_location },
            }
        }
        Input::Show => {
            // Let the event loop apply what was already sent.
            tokio::task::yield_now().await;
            print!("{}", format_graph(&host::lock(mirror).graph));
            return Ok(true);
        }
        Input::Quit | Input::Blank => return Ok(true),
    };
    Ok(tx.send(event).await.is_ok())
}
