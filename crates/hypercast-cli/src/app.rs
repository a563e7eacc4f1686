use anyhow::{Context, Result};
use clap::Args;
use hypercast::v1::{Config, Rendered, Renderer, RequestContext, ServerUrl};
use hypercast_jsonld::JsonLdOptions;
use hypercast_problem::ProblemJsonMapper;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::sample::{self, Library, RatingIdMapper};

/// The sample library and a renderer wired with every format.
pub struct App {
    pub library: Arc<Library>,
    pub renderer: Renderer,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let library = Arc::new(Library::sample());
        let registry = sample::registry(&library, config.registry.on_duplicate)
            .context("Failed to register sample resources")?;

        let builder = Renderer::builder(Arc::new(registry))
            .with_path_mapper(RatingIdMapper)
            .with_error_mapper(ProblemJsonMapper)
            .with_config(config);
        let builder = hypercast_json::install(builder);
        let renderer = hypercast_jsonld::install(builder, &JsonLdOptions::default()).build();

        tracing::debug!(?renderer, "renderer ready");
        Ok(Self { library, renderer })
    }
}

/// Load `path` when given, then apply the `--pretty` override.
pub fn load_config(path: Option<&Path>, pretty: bool) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => Config::default(),
    };
    config.output.pretty |= pretty;
    Ok(config)
}

/// Request options shared by the render commands.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Media type to render (defaults to the configured one)
    #[arg(long)]
    pub media_type: Option<String>,

    /// Field selector, e.g. "BlogPosting:headline,Person:*"
    #[arg(long)]
    pub fields: Option<String>,

    /// Relations to embed, e.g. "author,aggregateRating"
    #[arg(long)]
    pub embedded: Option<String>,

    /// Base URL the rendered links point at
    #[arg(long, default_value = "http://localhost:8080")]
    pub server_url: String,

    /// X-Forwarded-Host value, which replaces the server host
    #[arg(long)]
    pub forwarded_host: Option<String>,

    /// Accept header used if the render fails
    #[arg(long)]
    pub accept: Option<String>,
}

impl RequestArgs {
    pub fn context(&self) -> Result<RequestContext> {
        let mut server = ServerUrl::parse(&self.server_url)
            .with_context(|| format!("Invalid --server-url {:?}", self.server_url))?;
        if let Some(host) = &self.forwarded_host {
            server = server.with_forwarded_host(host);
        }

        let mut ctx = RequestContext::new(server);
        if let Some(media_type) = &self.media_type {
            ctx = ctx.with_media_type(media_type);
        }
        if let Some(fields) = &self.fields {
            ctx = ctx.with_fields(fields);
        }
        if let Some(embedded) = &self.embedded {
            ctx = ctx.with_embedded(embedded);
        }
        if let Some(accept) = &self.accept {
            ctx = ctx.with_accept_header(accept);
        }
        Ok(ctx)
    }
}

pub fn print(rendered: &Rendered) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&rendered.body)?;
    writeln!(stdout)?;
    Ok(())
}

/// Print the error document for `err`, then fail with it.
pub fn fail(app: &App, err: hypercast::v1::Error, ctx: &RequestContext) -> Result<()> {
    let rendered = app
        .renderer
        .render_failure(&err, ctx)
        .context("Failed to render error document")?;
    print(&rendered)?;
    Err(err.into())
}
