use anyhow::{Result, bail};
use clap::Parser;
use codegraph::analyzer::{Analyzer, scan};
use codegraph::graph::Graph;
use codegraph::{cli, instances};
use serde_json::json;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    match args.command {
        cli::Command::Build {
            repo,
            out,
            no_ignore,
            quiet,
        } => {
            let mut analyzer = Analyzer::with_options(repo, scan::ScanOptions::new(no_ignore))?;
            let outcome = if quiet {
                analyzer.build_graph()?
            } else {
                analyzer.build_graph_with_progress(&mut |event| {
                    eprintln!("codegraph: [{:>3}%] {}", event.percent(), event.rel_path);
                })?
            };
            if let Some(path) = out {
                outcome.graph.write_to(&path)?;
            }
            println!("{}", serde_json::to_string_pretty(&outcome.stats)?);
            Ok(())
        }
        cli::Command::Merge { inputs, out } => {
            if inputs.is_empty() {
                bail!("merge needs at least one input graph");
            }
            let mut graphs = Vec::new();
            for path in &inputs {
                graphs.push(Graph::from_file(path)?);
            }
            let merged = Graph::merge(graphs);
            merged.write_to(&out)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "inputs": inputs.len(),
                    "nodes": merged.declaration_count(),
                    "files": merged.file_nodes.len(),
                    "edges": merged.edge_count(),
                    "out": out,
                }))?
            );
            Ok(())
        }
        cli::Command::Instances {
            repo,
            file,
            no_ignore,
        } => {
            let mut analyzer = Analyzer::with_options(repo, scan::ScanOptions::new(no_ignore))?;
            let files = match file {
                Some(path) => {
                    let root = analyzer.root().clone();
                    let abs = if path.is_absolute() {
                        path
                    } else {
                        root.join(&path)
                    };
                    match scan::scan_path(&root, &abs)? {
                        Some(found) => vec![found],
                        None => bail!("not a supported source file: {}", abs.display()),
                    }
                }
                None => analyzer.scan_files()?,
            };
            let mut entities = Vec::new();
            for scanned in &files {
                match analyzer.extract_file_declarations(scanned) {
                    Ok(mut list) => entities.append(&mut list),
                    Err(err) => eprintln!("extract error {}: {err}", scanned.rel_path),
                }
            }
            let mut out = instances::workspace_instances(&files);
            out.extend(instances::declaration_instances(&entities));
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
        cli::Command::D3 { repo, graph } => {
            let path = graph.unwrap_or_else(|| Graph::artifact_path(&repo));
            let graph = Graph::from_file(&path)?;
            println!("{}", serde_json::to_string_pretty(&graph.to_d3())?);
            Ok(())
        }
    }
}
