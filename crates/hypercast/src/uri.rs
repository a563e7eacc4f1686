use crate::error::{Error, Result};
use crate::model::ModelType;
use crate::path::{Path, PathResolver};
use crate::registry::ResourceRegistry;
use std::any::Any;
use std::fmt;

/// Server part of every absolute URL, taken from the inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    /// Value of the `X-Forwarded-Host` header, which wins over `host:port`.
    pub forwarded_host: Option<String>,
    pub context_path: String,
}

impl Default for ServerUrl {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: Some(8080),
            forwarded_host: None,
            context_path: String::new(),
        }
    }
}

impl ServerUrl {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port: None,
            forwarded_host: None,
            context_path: String::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_forwarded_host(mut self, host: impl Into<String>) -> Self {
        self.forwarded_host = Some(host.into());
        self
    }

    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// Parse a base URL such as `https://example.com:8443/api`.
    pub fn parse(s: &str) -> Result<Self> {
        let parsed =
            url::Url::parse(s).map_err(|e| Error::Config(format!("invalid server URL {s:?}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::Config(format!("server URL {s:?} has no host")))?;
        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host: host.to_string(),
            port: parsed.port(),
            forwarded_host: None,
            context_path: parsed.path().trim_end_matches('/').to_string(),
        })
    }

    /// `{scheme}://{forwarded host, or host[:port]}{context path}`.
    pub fn base(&self) -> String {
        let authority = match (&self.forwarded_host, self.port) {
            (Some(forwarded), _) => forwarded.clone(),
            (None, Some(port)) => format!("{}:{}", self.host, port),
            (None, None) => self.host.clone(),
        };
        format!("{}://{}{}", self.scheme, authority, self.context_path)
    }

    /// Join a relative URI onto the base with exactly one `/` between them.
    pub fn absolute(&self, uri: &str) -> String {
        format!(
            "{}/{}",
            self.base().trim_end_matches('/'),
            uri.trim_start_matches('/')
        )
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base())
    }
}

/// What a relative URI addresses, passed to a [`UriTransformer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriCategory {
    CollectionPage,
    SingleItem,
    Binary,
}

/// Hook that may rewrite relative URIs before they are made absolute.
pub trait UriTransformer: Send + Sync {
    fn transform(&self, uri: &str, category: UriCategory) -> String;
}

impl<F> UriTransformer for F
where
    F: Fn(&str, UriCategory) -> String + Send + Sync,
{
    fn transform(&self, uri: &str, category: UriCategory) -> String {
        self(uri, category)
    }
}

/// Builds the absolute URLs of one render.
pub(crate) struct UrlResolver<'a> {
    pub(crate) registry: &'a ResourceRegistry,
    pub(crate) paths: &'a PathResolver,
    pub(crate) transformer: Option<&'a dyn UriTransformer>,
    pub(crate) server: &'a ServerUrl,
}

impl UrlResolver<'_> {
    fn finish(&self, uri: String, category: UriCategory) -> String {
        let uri = match self.transformer {
            Some(transformer) => transformer.transform(&uri, category),
            None => uri,
        };
        self.server.absolute(&uri)
    }

    /// Path of a model, or `None` when its type has no representor or no
    /// external name.
    pub(crate) fn path_of(&self, model: &dyn Any, model_type: ModelType) -> Result<Option<Path>> {
        let Some(representor) = self.registry.representor_of(model_type) else {
            return Ok(None);
        };
        let identifier = representor.identifier(model)?;
        match self.paths.to_path(identifier.as_ref(), model_type, self.registry) {
            Ok(path) => Ok(Some(path)),
            Err(Error::UnresolvableUri(name)) => {
                tracing::trace!(model_type = %name, "no self URL for unregistered model type");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub(crate) fn single_url(&self, model: &dyn Any, model_type: ModelType) -> Result<Option<String>> {
        Ok(self
            .path_of(model, model_type)?
            .map(|path| self.single_item_url(&path)))
    }

    pub(crate) fn single_item_url(&self, path: &Path) -> String {
        self.finish(format!("/p/{}", path.as_uri()), UriCategory::SingleItem)
    }

    pub(crate) fn binary_url(&self, path: &Path, key: &str) -> String {
        self.finish(format!("/b/{}/{}", path.as_uri(), key), UriCategory::Binary)
    }

    /// URL of the collection of `item_type`, hanging from `parent` when given.
    pub(crate) fn collection_url(&self, parent: Option<&Path>, item_type: ModelType) -> Result<String> {
        let name = self
            .registry
            .external_name_of(item_type)
            .ok_or_else(|| Error::UnresolvableUri(item_type.name().to_string()))?;
        let uri = match parent {
            Some(parent) => format!("/p/{}/{}", parent.as_uri(), name),
            None => format!("/p/{name}"),
        };
        Ok(self.finish(uri, UriCategory::CollectionPage))
    }
}

pub(crate) fn page_url(collection_url: &str, page: usize, items_per_page: usize) -> String {
    format!("{collection_url}?page={page}&per_page={items_per_page}")
}
