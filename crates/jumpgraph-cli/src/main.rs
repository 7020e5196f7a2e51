mod cmd_edit;
mod cmd_new;
mod cmd_render;
mod cmd_show;
mod cmd_watch;
mod host;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jg")]
#[command(about = "Build, navigate, and render jump graphs of source locations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace root for portable URIs (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty graph file
    New {
        /// Graph file to create
        file: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Push a location onto the graph
    Push {
        /// Graph file
        #[arg(long)]
        session: PathBuf,

        /// Location URI, or a path to a local file
        #[arg(long)]
        uri: String,

        /// Line (0-based)
        #[arg(long)]
        line: u32,

        /// Character (0-based)
        #[arg(long, default_value_t = 0)]
        character: u32,

        /// Note for the node (default: the trimmed text of the line)
        #[arg(long)]
        note: Option<String>,
    },
    /// Pop the head and print where to jump back to
    Pop {
        /// Graph file
        #[arg(long)]
        session: PathBuf,
    },
    /// Make a node the head
    Head {
        /// Graph file
        #[arg(long)]
        session: PathBuf,

        /// Node id
        #[arg(long)]
        node: String,
    },
    /// Set a node's note
    Note {
        /// Graph file
        #[arg(long)]
        session: PathBuf,

        /// Node id
        #[arg(long)]
        node: String,

        /// Note text
        #[arg(long)]
        text: String,
    },
    /// Print the graph
    Show {
        /// Graph file
        #[arg(long)]
        session: PathBuf,

        /// Print the document JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the graph to other formats
    Render {
        #[command(subcommand)]
        format: cmd_render::RenderFormat,
    },
    /// Run a session that reads commands from stdin and follows file edits
    Watch {
        /// Graph file
        #[arg(long)]
        session: PathBuf,

        /// Quiet period before changes are written, in milliseconds
        #[arg(long, default_value_t = 300)]
        debounce_ms: u64,

        /// Fallback poll interval for outside edits, in milliseconds
        #[arg(long, default_value_t = 2000)]
        poll_ms: u64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let root = cli.root.as_deref();

    match cli.command {
        Commands::New { file, force } => cmd_new::run(file, force),
        Commands::Push {
            session,
            uri,
            line,
            character,
            note,
        } => cmd_edit::push(
            cmd_edit::PushArgs {
                session,
                uri,
                line,
                character,
                note,
            },
            root,
        ),
        Commands::Pop { session } => cmd_edit::pop(session, root),
        Commands::Head { session, node } => cmd_edit::head(session, node),
        Commands::Note {
            session,
            node,
            text,
        } => cmd_edit::note(session, node, text),
        Commands::Show { session, json } => cmd_show::run(session, json),
        Commands::Render { format } => cmd_render::run(format),
        Commands::Watch {
            session,
            debounce_ms,
            poll_ms,
        } => cmd_watch::run(cmd_watch::WatchArgs {
            session,
            root: cli.root.clone(),
            debounce_ms,
            poll_ms,
        }),
    }
}
