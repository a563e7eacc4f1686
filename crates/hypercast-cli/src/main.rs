mod app;
mod cmd_binary;
mod cmd_error;
mod cmd_render;
mod cmd_resources;
mod sample;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hypercast::v1::PROBLEM_JSON;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hypercast")]
#[command(about = "Render a sample blog API as JSON, JSON-LD, and Problem+JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered resources
    Resources {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a resource or a page of a collection
    Render {
        #[command(subcommand)]
        target: cmd_render::RenderTarget,
    },
    /// Copy a binary resource to stdout
    Binary {
        /// Resource path, e.g. "blogs/7"
        #[arg(long)]
        path: String,

        /// Binary resource key, e.g. "articleBody"
        #[arg(long)]
        key: String,
    },
    /// Render an error document
    Error {
        #[arg(long)]
        title: String,

        /// HTTP status code
        #[arg(long)]
        status: u16,

        /// Human-readable explanation
        #[arg(long)]
        detail: Option<String>,

        /// Error type identifier
        #[arg(long = "type", default_value = "about:blank")]
        error_type: String,

        /// Accept header choosing the format
        #[arg(long, default_value = PROBLEM_JSON)]
        accept: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = app::load_config(cli.config.as_deref(), cli.pretty)?;
    let pretty = config.output.pretty;
    let app = app::App::new(config)?;

    match cli.command {
        Commands::Resources { json } => cmd_resources::run(&app, json, pretty),
        Commands::Render { target } => cmd_render::run(&app, target),
        Commands::Binary { path, key } => cmd_binary::run(&app, &path, &key),
        Commands::Error {
            title,
            status,
            detail,
            error_type,
            accept,
        } => cmd_error::run(&app, title, status, detail, error_type, &accept),
    }
}
