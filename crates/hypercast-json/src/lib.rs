//! Plain hypermedia JSON for clients that do not speak JSON-LD.
//!
//! Fields and links share the top level with a `type` array and the `self`
//! URL. Embedded relations become sub-objects under their relation key,
//! each with its own `self`; link-only relations are plain URL strings at
//! the same position.
//!
//! ```
//! use hypercast::v1::{
//!     LongIdentifier, Renderer, RequestContext, ResourceRegistry, ServerUrl, SingleModel,
//! };
//! use std::sync::Arc;
//!
//! struct Person {
//!     id: i64,
//!     name: String,
//! }
//!
//! let registry = Arc::new(ResourceRegistry::new());
//! registry
//!     .register_resource::<Person>("people", |b| {
//!         b.identifier(|p| LongIdentifier(p.id))
//!             .add_type("Person")
//!             .add_field("name", |p| p.name.clone())
//!     })
//!     .unwrap();
//!
//! let renderer = hypercast_json::install(Renderer::builder(registry)).build();
//! let ctx = RequestContext::new(ServerUrl::new("https", "example.com"));
//! let person = SingleModel::new(Person { id: 1, name: "Ada".into() });
//!
//! let json = renderer.render_single(&person, &ctx).unwrap().json().unwrap();
//! assert_eq!(json["self"], "https://example.com/p/people/1");
//! assert_eq!(json["type"][0], "Person");
//! assert_eq!(json["name"], "Ada");
//! ```

use hypercast::v1::{
    EmbeddedPath, ErrorMessageMapper, JsonObjectBuilder, PageMessageMapper, RendererBuilder,
    RequestContext, SingleModel, SingleModelMessageMapper,
};
use serde_json::Value;

pub const MEDIA_TYPE: &str = "application/json";

/// Register the single, page and error mappers of this format on `builder`.
pub fn install(builder: RendererBuilder) -> RendererBuilder {
    builder
        .with_single_mapper(JsonSingleModelMapper)
        .with_page_mapper(JsonPageMapper)
        .with_error_mapper(JsonErrorMapper)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSingleModelMapper;

impl SingleModelMessageMapper for JsonSingleModelMapper {
    fn media_type(&self) -> &str {
        MEDIA_TYPE
    }

    fn map_field(&self, doc: &mut JsonObjectBuilder, name: &str, value: &Value) {
        doc.field(name).value(value.clone());
    }

    fn map_link(&self, doc: &mut JsonObjectBuilder, name: &str, url: &str) {
        doc.field(name).value(url);
    }

    fn map_types(&self, doc: &mut JsonObjectBuilder, types: &[String]) {
        doc.field("type").array_value().add_all(types.iter().cloned());
    }

    fn map_self_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.field("self").value(url);
    }

    fn map_embedded_resource_field(
        &self,
        doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        value: &Value,
    ) {
        doc.nested_field(path.head(), path.tail())
            .field(name)
            .value(value.clone());
    }

    fn map_embedded_resource_link(
        &self,
        doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        url: &str,
    ) {
        doc.nested_field(path.head(), path.tail()).field(name).value(url);
    }

    fn map_embedded_resource_types(
        &self,
        doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        types: &[String],
    ) {
        doc.nested_field(path.head(), path.tail())
            .field("type")
            .array_value()
            .add_all(types.iter().cloned());
    }

    fn map_embedded_resource_url(&self, doc: &mut JsonObjectBuilder, path: &EmbeddedPath, url: &str) {
        doc.nested_field(path.head(), path.tail()).field("self").value(url);
    }

    fn map_linked_resource_url(&self, doc: &mut JsonObjectBuilder, path: &EmbeddedPath, url: &str) {
        doc.nested_field(path.head(), path.tail()).value(url);
    }
}

/// Pages list their items under `items`, each rendered like a single
/// resource, next to the paging links.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPageMapper;

impl PageMessageMapper for JsonPageMapper {
    fn media_type(&self) -> &str {
        MEDIA_TYPE
    }

    fn map_item_field(&self, item_doc: &mut JsonObjectBuilder, name: &str, value: &Value) {
        JsonSingleModelMapper.map_field(item_doc, name, value);
    }

    fn map_item_link(&self, item_doc: &mut JsonObjectBuilder, name: &str, url: &str) {
        JsonSingleModelMapper.map_link(item_doc, name, url);
    }

    fn map_item_types(&self, item_doc: &mut JsonObjectBuilder, types: &[String]) {
        JsonSingleModelMapper.map_types(item_doc, types);
    }

    fn map_item_self_url(&self, item_doc: &mut JsonObjectBuilder, url: &str) {
        JsonSingleModelMapper.map_self_url(item_doc, url);
    }

    fn map_item_embedded_resource_field(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        value: &Value,
    ) {
        JsonSingleModelMapper.map_embedded_resource_field(item_doc, path, name, value);
    }

    fn map_item_embedded_resource_link(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        url: &str,
    ) {
        JsonSingleModelMapper.map_embedded_resource_link(item_doc, path, name, url);
    }

    fn map_item_embedded_resource_types(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        types: &[String],
    ) {
        JsonSingleModelMapper.map_embedded_resource_types(item_doc, path, types);
    }

    fn map_item_embedded_resource_url(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        url: &str,
    ) {
        JsonSingleModelMapper.map_embedded_resource_url(item_doc, path, url);
    }

    fn map_item_linked_resource_url(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        url: &str,
    ) {
        JsonSingleModelMapper.map_linked_resource_url(item_doc, path, url);
    }

    fn on_finish_item(
        &self,
        doc: &mut JsonObjectBuilder,
        item_doc: JsonObjectBuilder,
        _item: &SingleModel,
        _ctx: &RequestContext,
    ) {
        doc.field("items").array_value().add(item_doc.build());
    }

    fn map_item_total_count(&self, doc: &mut JsonObjectBuilder, total_count: usize) {
        doc.field("totalCount").value(total_count);
    }

    fn map_page_count(&self, doc: &mut JsonObjectBuilder, count: usize) {
        doc.field("pageCount").value(count);
    }

    fn map_current_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.field("currentURL").value(url);
    }

    fn map_first_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.field("firstURL").value(url);
    }

    fn map_previous_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.field("prevURL").value(url);
    }

    fn map_next_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.field("nextURL").value(url);
    }

    fn map_last_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.field("lastURL").value(url);
    }

    fn map_collection_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.field("self").value(url);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorMapper;

impl ErrorMessageMapper for JsonErrorMapper {
    fn media_type(&self) -> &str {
        MEDIA_TYPE
    }

    fn map_description(&self, doc: &mut JsonObjectBuilder, description: &str) {
        doc.field("description").value(description);
    }

    fn map_status_code(&self, doc: &mut JsonObjectBuilder, status_code: u16) {
        doc.field("statusCode").value(status_code);
    }

    fn map_title(&self, doc: &mut JsonObjectBuilder, title: &str) {
        doc.field("title").value(title);
    }

    fn map_type(&self, doc: &mut JsonObjectBuilder, error_type: &str) {
        doc.field("type").value(error_type);
    }
}
