use anyhow::{Context, Result};
use clap::Subcommand;
use jumpgraph::v1::Graph;
use jumpgraph_dot::RenderOptions;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum RenderFormat {
    /// Render a jump graph as Graphviz DOT
    Dot {
        /// Graph file
        #[arg(long)]
        session: PathBuf,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Graph title
        #[arg(long)]
        title: Option<String>,

        /// Leave out file:line under each note
        #[arg(long)]
        no_locations: bool,

        /// Pin nodes at their canvas positions (render with `neato -n`)
        #[arg(long)]
        pin_positions: bool,
    },
}

pub fn run(format: RenderFormat) -> Result<()> {
    match format {
        RenderFormat::Dot {
            session,
            output,
            title,
            no_locations,
            pin_positions,
        } => {
            let text = std::fs::read_to_string(&session)
                .with_context(|| format!("Failed to read {}", session.display()))?;
            let graph = Graph::from_json(&text)
                .with_context(|| format!("Failed to parse {}", session.display()))?;
            let options = RenderOptions {
                show_locations: !no_locations,
                pin_positions,
                title,
            };
            let dot = jumpgraph_dot::render(&graph, &options);
            match output {
                Some(path) => std::fs::write(&path, dot)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{dot}"),
            }
            Ok(())
        }
    }
}
