//! JSON-LD message mappers, with Hydra pagination for collection pages.
//!
//! Resources render as JSON-LD nodes: `@id` is the self URL, `@type` the
//! representor's type names and every field sits at the top level under a
//! `schema.org` vocabulary. Embedded relations nest as sub-nodes with their
//! own `@id`; link-only relations become plain URLs, and a local `@context`
//! entry marks them as `"@type": "@id"` so JSON-LD processors read them as
//! references instead of strings.
//!
//! Pages render as a Hydra `Collection` whose `view` is a
//! `PartialCollectionView` carrying the first, previous, next and last page
//! links.
//!
//! # Example
//!
//! ```
//! use hypercast::v1::{
//!     LongIdentifier, Renderer, RequestContext, ResourceRegistry, ServerUrl, SingleModel,
//! };
//! use hypercast_jsonld::{JsonLdOptions, MEDIA_TYPE};
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
//! let renderer = hypercast_jsonld::install(Renderer::builder(registry), &JsonLdOptions::default())
//!     .build();
//! let ctx = RequestContext::new(ServerUrl::new("https", "example.com")).with_media_type(MEDIA_TYPE);
//! let person = SingleModel::new(Person { id: 1, name: "Ada".into() });
//!
//! let json = renderer.render_single(&person, &ctx).unwrap().json().unwrap();
//! assert_eq!(json["@id"], "https://example.com/p/people/1");
//! assert_eq!(json["@type"][0], "Person");
//! assert_eq!(json["@context"]["@vocab"], "http://schema.org");
//! ```

use hypercast::v1::{
    EmbeddedPath, ErrorMessageMapper, JsonObjectBuilder, PageInfo, PageMessageMapper,
    RendererBuilder, RequestContext, SingleModel, SingleModelMessageMapper,
};
use serde_json::Value;

pub const MEDIA_TYPE: &str = "application/ld+json";

pub const SCHEMA_ORG: &str = "http://schema.org";

pub const HYDRA_PAGINATION: &str = "http://www.w3.org/ns/hydra/pagination.jsonld";

/// Options shared by the JSON-LD mappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonLdOptions {
    /// Default vocabulary written to `@context.@vocab`.
    pub vocab: String,
    /// Context document bound to the `Collection` term on pages.
    pub collection_context: String,
}

impl Default for JsonLdOptions {
    fn default() -> Self {
        Self {
            vocab: SCHEMA_ORG.to_string(),
            collection_context: HYDRA_PAGINATION.to_string(),
        }
    }
}

/// Register the single, page and error JSON-LD mappers on `builder`.
pub fn install(builder: RendererBuilder, options: &JsonLdOptions) -> RendererBuilder {
    builder
        .with_single_mapper(JsonLdSingleModelMapper::new(options.clone()))
        .with_page_mapper(JsonLdPageMapper::new(options.clone()))
        .with_error_mapper(JsonLdErrorMapper)
}

// ── Single resources ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct JsonLdSingleModelMapper {
    options: JsonLdOptions,
}

impl JsonLdSingleModelMapper {
    pub fn new(options: JsonLdOptions) -> Self {
        Self { options }
    }
}

impl SingleModelMessageMapper for JsonLdSingleModelMapper {
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
        doc.field("@type").array_value().add_all(types.iter().cloned());
    }

    fn map_self_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.field("@id").value(url);
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
            .field("@type")
            .array_value()
            .add_all(types.iter().cloned());
    }

    fn map_embedded_resource_url(&self, doc: &mut JsonObjectBuilder, path: &EmbeddedPath, url: &str) {
        doc.nested_field(path.head(), path.tail()).field("@id").value(url);
    }

    fn map_linked_resource_url(&self, doc: &mut JsonObjectBuilder, path: &EmbeddedPath, url: &str) {
        doc.nested_field(path.head(), path.tail()).value(url);
        // The reference hint lives in the @context of the node holding the link.
        match path.last() {
            Some(last) => doc
                .nested_field(path.head(), path.middle())
                .nested_field("@context", &[last])
                .field("@type")
                .value("@id"),
            None => doc
                .nested_field("@context", &[path.head()])
                .field("@type")
                .value("@id"),
        }
    }

    fn on_finish(&self, doc: &mut JsonObjectBuilder, _model: &SingleModel, _ctx: &RequestContext) {
        doc.nested_field("@context", &["@vocab"])
            .value(self.options.vocab.as_str());
    }
}

// ── Collection pages ───────────────────────────────────────────────────

/// Hydra collection pages. Items are written by a [`JsonLdSingleModelMapper`]
/// and collected under `members`.
#[derive(Debug, Clone, Default)]
pub struct JsonLdPageMapper {
    options: JsonLdOptions,
    items: JsonLdSingleModelMapper,
}

impl JsonLdPageMapper {
    pub fn new(options: JsonLdOptions) -> Self {
        Self {
            items: JsonLdSingleModelMapper::new(options.clone()),
            options,
        }
    }
}

impl PageMessageMapper for JsonLdPageMapper {
    fn media_type(&self) -> &str {
        MEDIA_TYPE
    }

    fn map_item_field(&self, item_doc: &mut JsonObjectBuilder, name: &str, value: &Value) {
        self.items.map_field(item_doc, name, value);
    }

    fn map_item_link(&self, item_doc: &mut JsonObjectBuilder, name: &str, url: &str) {
        self.items.map_link(item_doc, name, url);
    }

    fn map_item_types(&self, item_doc: &mut JsonObjectBuilder, types: &[String]) {
        self.items.map_types(item_doc, types);
    }

    fn map_item_self_url(&self, item_doc: &mut JsonObjectBuilder, url: &str) {
        self.items.map_self_url(item_doc, url);
    }

    fn map_item_embedded_resource_field(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        value: &Value,
    ) {
        self.items.map_embedded_resource_field(item_doc, path, name, value);
    }

    fn map_item_embedded_resource_link(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        url: &str,
    ) {
        self.items.map_embedded_resource_link(item_doc, path, name, url);
    }

    fn map_item_embedded_resource_types(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        types: &[String],
    ) {
        self.items.map_embedded_resource_types(item_doc, path, types);
    }

    fn map_item_embedded_resource_url(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        url: &str,
    ) {
        self.items.map_embedded_resource_url(item_doc, path, url);
    }

    fn map_item_linked_resource_url(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        url: &str,
    ) {
        self.items.map_linked_resource_url(item_doc, path, url);
    }

    fn on_finish_item(
        &self,
        doc: &mut JsonObjectBuilder,
        item_doc: JsonObjectBuilder,
        _item: &SingleModel,
        _ctx: &RequestContext,
    ) {
        doc.field("members").array_value().add(item_doc.build());
    }

    fn map_item_total_count(&self, doc: &mut JsonObjectBuilder, total_count: usize) {
        doc.field("totalItems").value(total_count);
    }

    fn map_page_count(&self, doc: &mut JsonObjectBuilder, count: usize) {
        doc.field("numberOfItems").value(count);
    }

    fn map_current_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.nested_field("view", &["@id"]).value(url);
    }

    fn map_first_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.nested_field("view", &["first"]).value(url);
    }

    fn map_previous_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.nested_field("view", &["previous"]).value(url);
    }

    fn map_next_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.nested_field("view", &["next"]).value(url);
    }

    fn map_last_page_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        doc.nested_field("view", &["last"]).value(url);
    }

    fn map_collection_url(&self, doc: &mut JsonObjectBuilder, url: &str) {
        self.items.map_self_url(doc, url);
    }

    fn on_finish(&self, doc: &mut JsonObjectBuilder, _page: &PageInfo, _ctx: &RequestContext) {
        doc.nested_field("@context", &["Collection"])
            .value(self.options.collection_context.as_str());
        doc.nested_field("@context", &["@vocab"])
            .value(self.options.vocab.as_str());
        doc.nested_field("view", &["@type"])
            .array_value()
            .add("PartialCollectionView");
        doc.field("@type").array_value().add("Collection");
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Error bodies for clients that asked for JSON-LD. The error type is not
/// part of this format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdErrorMapper;

impl ErrorMessageMapper for JsonLdErrorMapper {
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

    fn map_type(&self, _doc: &mut JsonObjectBuilder, _error_type: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypercast::v1::{ApiError, LongIdentifier, Page, Path, Renderer, ResourceRegistry, ServerUrl};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Clone)]
    struct Person {
        id: i64,
        name: String,
    }

    #[derive(Clone)]
    struct Review {
        id: i64,
        body: String,
        author: Person,
    }

    #[derive(Clone)]
    struct BlogPosting {
        id: i64,
        headline: String,
        alternative_headline: Option<String>,
        author: Person,
        review: Option<Review>,
    }

    fn ada() -> Person {
        Person {
            id: 3,
            name: "Ada".into(),
        }
    }

    fn post(id: i64) -> BlogPosting {
        BlogPosting {
            id,
            headline: format!("Post {id}"),
            alternative_headline: None,
            author: ada(),
            review: Some(Review {
                id: 9,
                body: "Great".into(),
                author: ada(),
            }),
        }
    }

    fn renderer() -> Renderer {
        let registry = Arc::new(ResourceRegistry::new());
        registry
            .register_resource::<Person>("people", |b| {
                b.identifier(|p| LongIdentifier(p.id))
                    .add_type("Person")
                    .add_field("name", |p| p.name.clone())
            })
            .unwrap();
        registry
            .register_resource::<Review>("reviews", |b| {
                b.identifier(|r| LongIdentifier(r.id))
                    .add_type("Review")
                    .add_field("reviewBody", |r| r.body.clone())
                    .add_linked_model("author", |r| Some(r.author.clone()))
            })
            .unwrap();
        registry
            .register_resource::<BlogPosting>("blogs", |b| {
                b.identifier(|p| LongIdentifier(p.id))
                    .add_type("BlogPosting")
                    .add_field("headline", |p| p.headline.clone())
                    .add_field("alternativeHeadline", |p| p.alternative_headline.clone())
                    .add_link("license", "https://creativecommons.org/licenses/by/4.0/")
                    .add_linked_model("author", |p| Some(p.author.clone()))
                    .add_embedded_model("review", |p| p.review.clone())
            })
            .unwrap();
        install(Renderer::builder(registry), &JsonLdOptions::default()).build()
    }

    fn ctx() -> RequestContext {
        RequestContext::new(ServerUrl::new("http", "localhost").with_port(8080)).with_media_type(MEDIA_TYPE)
    }

    #[test]
    fn test_blog_posting_document() {
        let single = SingleModel::new(post(7));
        let ctx = ctx().with_fields("BlogPosting:headline,BlogPosting:author");
        let json = renderer().render_single(&single, &ctx).unwrap().json().unwrap();

        assert_eq!(
            json,
            json!({
                "@id": "http://localhost:8080/p/blogs/7",
                "@type": ["BlogPosting"],
                "headline": "Post 7",
                "author": "http://localhost:8080/p/people/3",
                "@context": {
                    "@vocab": "http://schema.org",
                    "author": {"@type": "@id"}
                }
            })
        );
    }

    #[test]
    fn test_linked_relation_gets_context_hint() {
        let json = renderer()
            .render_single(&SingleModel::new(post(7)), &ctx())
            .unwrap()
            .json()
            .unwrap();
        assert_eq!(json["author"], "http://localhost:8080/p/people/3");
        assert_eq!(json["@context"]["author"]["@type"], "@id");
        assert_eq!(json["review"], "http://localhost:8080/p/reviews/9");
        assert_eq!(json["@context"]["review"]["@type"], "@id");
        assert_eq!(json["license"], "https://creativecommons.org/licenses/by/4.0/");
        assert!(json.get("alternativeHeadline").is_none());
    }

    #[test]
    fn test_embedded_node_has_id_and_type() {
        let ctx = ctx().with_embedded("review");
        let json = renderer()
            .render_single(&SingleModel::new(post(7)), &ctx)
            .unwrap()
            .json()
            .unwrap();

        let review = &json["review"];
        assert_eq!(review["@id"], "http://localhost:8080/p/reviews/9");
        assert_eq!(review["@type"], json!(["Review"]));
        assert_eq!(review["reviewBody"], "Great");
        // A link inside the embedded node is hinted in that node's context.
        assert_eq!(review["author"], "http://localhost:8080/p/people/3");
        assert_eq!(review["@context"]["author"]["@type"], "@id");
        assert!(json["@context"].get("review").is_none());
    }

    #[test]
    fn test_nested_embedding_requires_exact_path() {
        let ctx = ctx().with_embedded("review.author");
        let json = renderer()
            .render_single(&SingleModel::new(post(7)), &ctx)
            .unwrap()
            .json()
            .unwrap();
        // "review" itself is not embedded, so nothing below it is either.
        assert_eq!(json["review"], "http://localhost:8080/p/reviews/9");

        let ctx = ctx.with_embedded("review,review.author");
        let json = renderer()
            .render_single(&SingleModel::new(post(7)), &ctx)
            .unwrap()
            .json()
            .unwrap();
        assert_eq!(json["review"]["author"]["@id"], "http://localhost:8080/p/people/3");
        assert_eq!(json["review"]["author"]["name"], "Ada");
    }

    #[test]
    fn test_custom_vocab() {
        let registry = Arc::new(ResourceRegistry::new());
        registry
            .register_resource::<Person>("people", |b| b.identifier(|p| LongIdentifier(p.id)))
            .unwrap();
        let options = JsonLdOptions {
            vocab: "https://example.org/vocab#".into(),
            ..JsonLdOptions::default()
        };
        let renderer = install(Renderer::builder(registry), &options).build();
        let json = renderer
            .render_single(&SingleModel::new(ada()), &ctx())
            .unwrap()
            .json()
            .unwrap();
        assert_eq!(json["@context"]["@vocab"], "https://example.org/vocab#");
    }

    #[test]
    fn test_hydra_page() {
        let items: Vec<BlogPosting> = (11..=20).map(post).collect();
        let page = Page::new(items, 25, 2, 10, None).unwrap();
        let json = renderer().render_page(&page, &ctx()).unwrap().json().unwrap();

        assert_eq!(json["@id"], "http://localhost:8080/p/blogs");
        assert_eq!(json["@type"], json!(["Collection"]));
        assert_eq!(json["totalItems"], 25);
        assert_eq!(json["numberOfItems"], 10);
        assert_eq!(json["@context"]["Collection"], HYDRA_PAGINATION);
        assert_eq!(json["@context"]["@vocab"], SCHEMA_ORG);
        assert_eq!(
            json["view"],
            json!({
                "@id": "http://localhost:8080/p/blogs?page=2&per_page=10",
                "@type": ["PartialCollectionView"],
                "first": "http://localhost:8080/p/blogs?page=1&per_page=10",
                "previous": "http://localhost:8080/p/blogs?page=1&per_page=10",
                "next": "http://localhost:8080/p/blogs?page=3&per_page=10",
                "last": "http://localhost:8080/p/blogs?page=3&per_page=10"
            })
        );

        let members = json["members"].as_array().unwrap();
        assert_eq!(members.len(), 10);
        assert_eq!(members[0]["@id"], "http://localhost:8080/p/blogs/11");
        assert_eq!(members[0]["@context"]["author"]["@type"], "@id");
        assert!(members[0]["@context"].get("@vocab").is_none());
    }

    #[test]
    fn test_nested_collection_page() {
        let page = Page::new(vec![post(1)], 1, 1, 5, Some(Path::new("people", "3"))).unwrap();
        let json = renderer().render_page(&page, &ctx()).unwrap().json().unwrap();
        assert_eq!(json["@id"], "http://localhost:8080/p/people/3/blogs");
        assert!(json["view"].get("previous").is_none());
        assert!(json["view"].get("next").is_none());
    }

    #[test]
    fn test_error_document() {
        let ctx = ctx().with_accept_header(MEDIA_TYPE);
        let error = ApiError::new("Bad request", "bad-request", 400).with_description("page 0");
        let rendered = renderer().render_error(&error, &ctx).unwrap();
        assert_eq!(rendered.content_type, MEDIA_TYPE);
        assert_eq!(
            rendered.json().unwrap(),
            json!({"title": "Bad request", "description": "page 0", "statusCode": 400})
        );
    }
}
