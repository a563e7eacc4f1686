#![doc = include_str!("../README.md")]

mod api_error;
mod config;
mod document;
mod embedded;
mod embedded_path;
mod error;
mod fields;
mod identifier;
mod mapper;
mod model;
mod path;
mod registry;
mod render;
mod representor;
mod request;
mod uri;
mod writer;

pub mod v1 {
    //! Versioned public API for hypercast.
    //!
    //! Types fall into four groups:
    //!
    //! # Declaring resources
    //!
    //! - [`Representor`] / [`RepresentorBuilder`]: how a model type is rendered
    //! - [`ResourceRegistry`]: model types, their representors and external names
    //! - [`Identifier`], [`LongIdentifier`], [`RootIdentifier`]: resource ids
    //! - [`PathIdentifierMapper`], [`PathResolver`]: ids to and from [`Path`]s
    //!
    //! # Rendering
    //!
    //! - [`Renderer`] / [`RendererBuilder`]: the integration surface
    //! - [`SingleModel`], [`Page`]: what gets rendered
    //! - [`ApiError`]: error record rendered through error mappers
    //! - [`RequestContext`], [`ServerUrl`]: per-request inputs
    //!
    //! # Writing a format
    //!
    //! - [`SingleModelMessageMapper`], [`PageMessageMapper`], [`ErrorMessageMapper`]
    //! - [`JsonObjectBuilder`]: the document the callbacks write into
    //! - [`EmbeddedPath`]: nesting position of a related model
    //!
    //! # Errors and configuration
    //!
    //! - [`Error`], [`ErrorKind`], [`Result`]
    //! - [`Config`]
    //!
    //! # Example: render a blog posting
    //!
    //! ```
    //! use hypercast::v1::*;
    //! use serde_json::Value;
    //! use std::sync::Arc;
    //!
    //! struct BlogPosting {
    //!     id: i64,
    //!     title: String,
    //!     subtitle: Option<String>,
    //! }
    //!
    //! // A tiny format that only writes top-level fields.
    //! struct FieldsOnly;
    //!
    //! impl SingleModelMessageMapper for FieldsOnly {
    //!     fn media_type(&self) -> &str { "application/json" }
    //!     fn map_field(&self, doc: &mut JsonObjectBuilder, name: &str, value: &Value) {
    //!         doc.field(name).value(value.clone());
    //!     }
    //!     fn map_link(&self, _: &mut JsonObjectBuilder, _: &str, _: &str) {}
    //!     fn map_types(&self, _: &mut JsonObjectBuilder, _: &[String]) {}
    //!     fn map_self_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
    //!         doc.field("self").value(url);
    //!     }
    //!     fn map_embedded_resource_field(&self, _: &mut JsonObjectBuilder, _: &EmbeddedPath, _: &str, _: &Value) {}
    //!     fn map_embedded_resource_link(&self, _: &mut JsonObjectBuilder, _: &EmbeddedPath, _: &str, _: &str) {}
    //!     fn map_embedded_resource_types(&self, _: &mut JsonObjectBuilder, _: &EmbeddedPath, _: &[String]) {}
    //!     fn map_embedded_resource_url(&self, _: &mut JsonObjectBuilder, _: &EmbeddedPath, _: &str) {}
    //!     fn map_linked_resource_url(&self, _: &mut JsonObjectBuilder, _: &EmbeddedPath, _: &str) {}
    //! }
    //!
    //! let registry = Arc::new(ResourceRegistry::new());
    //! registry
    //!     .register_resource::<BlogPosting>("blogs", |b| {
    //!         b.identifier(|p| LongIdentifier(p.id))
    //!             .add_type("BlogPosting")
    //!             .add_field("headline", |p| p.title.clone())
    //!             .add_field("alternativeHeadline", |p| p.subtitle.clone())
    //!     })
    //!     .unwrap();
    //!
    //! let renderer = Renderer::builder(registry).with_single_mapper(FieldsOnly).build();
    //! let post = BlogPosting { id: 7, title: "Hi".into(), subtitle: None };
    //! let ctx = RequestContext::new(ServerUrl::new("https", "example.com"));
    //!
    //! let rendered = renderer.render_single(&SingleModel::new(post), &ctx).unwrap();
    //! let body = rendered.text();
    //! assert!(body.contains(r#""headline":"Hi""#));
    //! assert!(body.contains(r#""self":"https://example.com/p/blogs/7""#));
    //! assert!(!body.contains("alternativeHeadline"));
    //! ```

    pub use crate::api_error::ApiError;
    pub use crate::config::{Config, OutputConfig, RegistryConfig};
    pub use crate::document::{ArrayStep, FieldStep, JsonObjectBuilder};
    pub use crate::embedded::Embedded;
    pub use crate::embedded_path::EmbeddedPath;
    pub use crate::error::{AccessorError, Error, ErrorKind, Result};
    pub use crate::fields::{FieldPredicate, Fields};
    pub use crate::identifier::{Identifier, IdentifierType, LongIdentifier, RootIdentifier};
    pub use crate::mapper::{ErrorMessageMapper, PageMessageMapper, SingleModelMessageMapper};
    pub use crate::model::{ModelType, Page, PageInfo, SingleModel};
    pub use crate::path::{
        LongIdentifierMapper, Path, PathIdentifierMapper, PathResolver, RootIdentifierMapper,
    };
    pub use crate::registry::{RegistrationPolicy, ResourceInfo, ResourceRegistry};
    pub use crate::render::{PROBLEM_JSON, Renderer, RendererBuilder, Rendered};
    pub use crate::representor::{
        BinaryAccessor, FieldAccessor, RelatedCollection, RelatedModel, Representor,
        RepresentorBuilder, ReverseCollection,
    };
    pub use crate::request::{RequestContext, is_wildcard, parse_accept, same_media_type};
    pub use crate::uri::{ServerUrl, UriCategory, UriTransformer};
}
