use anyhow::{Context, Result, bail};
use jumpgraph::v1::Graph;
use jumpgraph_session::{Document, FileDocument};
use std::path::PathBuf;

pub fn run(file: PathBuf, force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!(
            "{} already exists (use --force to replace it)",
            file.display()
        );
    }
    let text = Graph::new().to_json_pretty()?;
    FileDocument::new(&file)
        .replace(&text)
        .with_context(|| format!("Failed to create {}", file.display()))?;
    println!("{}", file.display());
    Ok(())
}
