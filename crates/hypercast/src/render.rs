use crate::api_error::ApiError;
use crate::config::Config;
use crate::document::JsonObjectBuilder;
use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::mapper::{ErrorMessageMapper, PageMessageMapper, SingleModelMessageMapper};
use crate::model::{Page, SingleModel};
use crate::path::{Path, PathIdentifierMapper, PathResolver};
use crate::registry::ResourceRegistry;
use crate::request::{RequestContext, is_wildcard, same_media_type};
use crate::uri::{UriTransformer, UrlResolver};
use crate::writer::Writer;
use serde_json::Value;
use std::any::Any;
use std::io::Read;
use std::sync::Arc;

pub const PROBLEM_JSON: &str = "application/problem+json";

/// A rendered response body and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: Vec<u8>,
    pub content_type: String,
}

impl Rendered {
    /// Parse the body back into a JSON value.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Renders models, pages and errors into negotiated media types.
///
/// Holds everything a render needs: the registry, the path resolver, the
/// mappers of every format and the optional URI transformer. Build one per
/// process with [`RendererBuilder`] and share it; it is `Send + Sync`.
pub struct Renderer {
    registry: Arc<ResourceRegistry>,
    paths: PathResolver,
    single_mappers: Vec<Box<dyn SingleModelMessageMapper>>,
    page_mappers: Vec<Box<dyn PageMessageMapper>>,
    error_mappers: Vec<Box<dyn ErrorMessageMapper>>,
    transformer: Option<Box<dyn UriTransformer>>,
    config: Config,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let media_types = |types: Vec<&str>| types.join(", ");
        f.debug_struct("Renderer")
            .field("registry", &self.registry)
            .field(
                "single_mappers",
                &media_types(self.single_mappers.iter().map(|m| m.media_type()).collect()),
            )
            .field(
                "page_mappers",
                &media_types(self.page_mappers.iter().map(|m| m.media_type()).collect()),
            )
            .field(
                "error_mappers",
                &media_types(self.error_mappers.iter().map(|m| m.media_type()).collect()),
            )
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn builder(registry: Arc<ResourceRegistry>) -> RendererBuilder {
        RendererBuilder::new(registry)
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Media type a success response is rendered in.
    pub fn negotiated_media_type<'a>(&'a self, ctx: &'a RequestContext) -> &'a str {
        match ctx.media_type.as_deref() {
            Some(media_type) if !is_wildcard(media_type) => media_type,
            _ => &self.config.output.default_media_type,
        }
    }

    /// Identifier addressed by `path`.
    pub fn identifier_of(&self, path: &Path) -> Result<Box<dyn Identifier>> {
        self.paths.from_path(path, &self.registry)
    }

    pub fn render_single(&self, model: &SingleModel, ctx: &RequestContext) -> Result<Rendered> {
        let media_type = self.negotiated_media_type(ctx);
        let mapper = self
            .single_mappers
            .iter()
            .find(|m| same_media_type(m.media_type(), media_type) && m.supports(model, ctx))
            .ok_or_else(|| Error::MustHaveMessageMapper {
                media_type: media_type.to_string(),
                model_type: model.model_type().name().to_string(),
            })?;
        let doc = self.writer(ctx).write_single(model, mapper.as_ref(), ctx)?;
        self.finish(doc, mapper.media_type())
    }

    pub fn render_page<T: Any + Clone>(&self, page: &Page<T>, ctx: &RequestContext) -> Result<Rendered> {
        let media_type = self.negotiated_media_type(ctx);
        let info = page.info();
        let mapper = self
            .page_mappers
            .iter()
            .find(|m| same_media_type(m.media_type(), media_type) && m.supports(&info, ctx))
            .ok_or_else(|| Error::MustHaveMessageMapper {
                media_type: media_type.to_string(),
                model_type: info.model_type.name().to_string(),
            })?;
        let doc = self.writer(ctx).write_page(page, mapper.as_ref(), ctx)?;
        self.finish(doc, mapper.media_type())
    }

    /// Render `error` in the first media type the client accepts, falling
    /// back to Problem+JSON.
    pub fn render_error(&self, error: &ApiError, ctx: &RequestContext) -> Result<Rendered> {
        let requested = ctx
            .accept
            .first()
            .map(String::as_str)
            .filter(|m| !is_wildcard(m))
            .unwrap_or(PROBLEM_JSON);
        tracing::debug!(
            status = error.status_code,
            title = %error.title,
            media_type = requested,
            "rendering error"
        );

        let find = |media_type: &str| {
            self.error_mappers
                .iter()
                .find(|m| same_media_type(m.media_type(), media_type) && m.supports(error, ctx))
        };
        let mapper = find(requested)
            .or_else(|| find(PROBLEM_JSON))
            .ok_or(Error::MustHaveProblemJsonMapper)?;

        let mut doc = JsonObjectBuilder::new();
        mapper.on_start(&mut doc, error, ctx);
        if let Some(description) = &error.description {
            mapper.map_description(&mut doc, description);
        }
        mapper.map_status_code(&mut doc, error.status_code);
        mapper.map_title(&mut doc, &error.title);
        mapper.map_type(&mut doc, &error.error_type);
        mapper.on_finish(&mut doc, error, ctx);
        self.finish(doc, mapper.media_type())
    }

    /// Render a failure from any of the other operations as an error body.
    pub fn render_failure(&self, err: &Error, ctx: &RequestContext) -> Result<Rendered> {
        tracing::debug!(error = %err, kind = ?err.kind(), "converting failure to an error response");
        self.render_error(&ApiError::from(err), ctx)
    }

    /// Open the binary resource `key` of `model`, if its representor has one.
    pub fn binary(&self, model: &SingleModel, key: &str) -> Result<Option<Box<dyn Read + Send>>> {
        let Some(representor) = self.registry.representor_of(model.model_type()) else {
            return Ok(None);
        };
        representor
            .binary(key)
            .map(|binary| binary.open(model.model()))
            .transpose()
    }

    fn writer<'a>(&'a self, ctx: &'a RequestContext) -> Writer<'a> {
        Writer {
            registry: &self.registry,
            urls: UrlResolver {
                registry: &self.registry,
                paths: &self.paths,
                transformer: self.transformer.as_deref(),
                server: &ctx.server,
            },
            fields: ctx.field_selector(),
            embedded: ctx.embedded_selector(),
        }
    }

    fn finish(&self, doc: JsonObjectBuilder, media_type: &str) -> Result<Rendered> {
        let value = doc.build();
        let body = if self.config.output.pretty {
            serde_json::to_vec_pretty(&value)?
        } else {
            serde_json::to_vec(&value)?
        };
        Ok(Rendered {
            body,
            content_type: media_type.to_string(),
        })
    }
}

/// Assembles a [`Renderer`].
///
/// ```
/// use hypercast::v1::{Config, Renderer, ResourceRegistry};
/// use std::sync::Arc;
///
/// let renderer = Renderer::builder(Arc::new(ResourceRegistry::new()))
///     .with_config(Config::default())
///     .build();
/// assert_eq!(renderer.config().output.default_media_type, "application/json");
/// ```
pub struct RendererBuilder {
    renderer: Renderer,
}

impl RendererBuilder {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self {
            renderer: Renderer {
                registry,
                paths: PathResolver::new(),
                single_mappers: Vec::new(),
                page_mappers: Vec::new(),
                error_mappers: Vec::new(),
                transformer: None,
                config: Config::default(),
            },
        }
    }

    pub fn with_path_resolver(mut self, paths: PathResolver) -> Self {
        self.renderer.paths = paths;
        self
    }

    pub fn with_path_mapper<M: PathIdentifierMapper>(mut self, mapper: M) -> Self {
        self.renderer.paths.register(mapper);
        self
    }

    pub fn with_single_mapper(mut self, mapper: impl SingleModelMessageMapper + 'static) -> Self {
        self.renderer.single_mappers.push(Box::new(mapper));
        self
    }

    pub fn with_page_mapper(mut self, mapper: impl PageMessageMapper + 'static) -> Self {
        self.renderer.page_mappers.push(Box::new(mapper));
        self
    }

    pub fn with_error_mapper(mut self, mapper: impl ErrorMessageMapper + 'static) -> Self {
        self.renderer.error_mappers.push(Box::new(mapper));
        self
    }

    pub fn with_uri_transformer(mut self, transformer: impl UriTransformer + 'static) -> Self {
        self.renderer.transformer = Some(Box::new(transformer));
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.renderer.config = config;
        self
    }

    pub fn build(self) -> Renderer {
        self.renderer
    }
}
