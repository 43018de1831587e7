use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "codegraph",
    version,
    about = "Source dependency graph builder",
    after_help = r#"Examples:
  codegraph build --repo .
  codegraph build --repo . --no-ignore --quiet
  codegraph merge --out merged.json py/.codegraph/graph.json js/.codegraph/graph.json
  codegraph instances --repo . --file pkg/mod.py
  codegraph d3 --repo .
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan the repository, build the dependency graph, write the artifact.
    Build {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Write an extra copy of the artifact to this path.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
        /// Suppress per-file progress output on stderr.
        #[arg(long)]
        quiet: bool,
    },
    /// Merge serialized graph artifacts; later inputs win on key collisions.
    Merge {
        /// Graph artifacts to merge, in order.
        inputs: Vec<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print placeholder instances for question templates.
    Instances {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Restrict extraction to a single file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
    },
    /// Print the D3 visualization projection of a graph artifact.
    D3 {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Graph artifact path; defaults to the repository's artifact.
        #[arg(long)]
        graph: Option<PathBuf>,
    },
}
