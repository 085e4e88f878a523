use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod mcp;
mod settings;

use crate::cli::{FindOptions, init_tracing_cli, init_tracing_server, run_find, run_find_file, run_tracked};
use crate::mcp::run_server;

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve references by filename or by keyword in tracked file contents
    Find {
        /// Root directory of the project tree
        #[arg(long)]
        root: Option<PathBuf>,
        /// The requirement item's own file, excluded from the search
        #[arg(long)]
        item: Option<PathBuf>,
        /// Additional extension to skip for content search (repeatable)
        #[arg(long = "skip-ext")]
        skip_ext: Vec<String>,
        /// Do not apply the configured skip extensions
        #[arg(long)]
        no_default_skip: bool,
        /// Print one JSON object per result
        #[arg(long)]
        json: bool,
        /// References to resolve, in order
        #[arg(required = true)]
        references: Vec<String>,
    },
    /// Confirm a tracked file by relative path, optionally locating a keyword in it
    FindFile {
        /// Root directory of the project tree
        #[arg(long)]
        root: Option<PathBuf>,
        /// The requirement item's own file, excluded from the search
        #[arg(long)]
        item: Option<PathBuf>,
        /// Keyword to locate inside the file
        #[arg(long)]
        keyword: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Path relative to the root
        path: String,
    },
    /// List the tracked files in search order
    Tracked {
        /// Root directory of the project tree
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Run MCP server over stdio
    Server {
        /// Root directory of the project tree
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "rf",
    about = "reffind: resolve requirement references to tracked project files",
    version,
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Command::Find {
            root,
            item,
            skip_ext,
            no_default_skip,
            json,
            references,
        } => {
            init_tracing_cli();
            let opts = FindOptions {
                root,
                item,
                skip_ext,
                no_default_skip,
                json,
            };
            run_find(opts, references)?;
        }
        Command::FindFile {
            root,
            item,
            keyword,
            json,
            path,
        } => {
            init_tracing_cli();
            run_find_file(root, item, keyword, json, path)?;
        }
        Command::Tracked { root } => {
            init_tracing_cli();
            run_tracked(root)?;
        }
        Command::Server { root } => {
            // For MCP server, never log to stdout; optionally log to a file
            // if REFFIND_LOG_PATH is set.
            init_tracing_server();
            run_server(root).await?;
        }
    }

    Ok(())
}
