use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect ship stories and export camera tracks")]
struct Args {
    /// Story catalog JSON (default: the built-in story)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate the catalog, then print a summary
    Validate,

    /// List the annotations reachable on one ship, in stepping order
    List {
        #[arg(long)]
        ship: String,
    },

    /// Build a keyframe track and print it as JSON
    Track {
        /// Script JSON (default: the built-in tour)
        #[arg(long)]
        script: Option<PathBuf>,

        /// Story config JSON; only its `script` section is used
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let catalog = tools::load_catalog(args.catalog.as_deref())?;

    match args.command {
        Command::Validate => {
            let summary = tools::summarize(&catalog);
            println!("{} annotations", summary.annotations);
            for ship in &summary.ships {
                println!("  {}: {} placed ({})", ship.name, ship.annotations, ship.asset_path);
            }
            if !summary.unplaced.is_empty() {
                println!("not placed on any ship: {}", summary.unplaced.join(", "));
            }
            for (from, to) in &summary.dangling_links {
                println!("warning: {from:?} links to unknown annotation {to:?}");
            }
        }
        Command::List { ship } => {
            for name in tools::list_annotations(&catalog, &ship)? {
                println!("{name}");
            }
        }
        Command::Track { script, config } => {
            let script = tools::load_script(script.as_deref())?;
            let config = tools::load_script_config(config.as_deref())?;
            let track = tools::flat_track(&catalog, &script, &config)?;
            println!("{}", serde_json::to_string_pretty(&track)?);
        }
    }

    Ok(())
}
