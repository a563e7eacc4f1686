//! Wire-format strategy contracts.
//!
//! The writer walks a model and calls these callbacks in a fixed order; a
//! format only decides where each piece lands in the document builder it is
//! handed. Callbacks must not keep state between calls, so one mapper
//! instance can serve concurrent renders.

use crate::api_error::ApiError;
use crate::document::JsonObjectBuilder;
use crate::embedded_path::EmbeddedPath;
use crate::model::{PageInfo, SingleModel};
use crate::request::RequestContext;
use serde_json::Value;

/// Renders a single resource.
pub trait SingleModelMessageMapper: Send + Sync {
    fn media_type(&self) -> &str;

    /// Whether this mapper handles `model`. Defaults to every model.
    fn supports(&self, _model: &SingleModel, _ctx: &RequestContext) -> bool {
        true
    }

    fn on_start(&self, _doc: &mut JsonObjectBuilder, _model: &SingleModel, _ctx: &RequestContext) {}

    fn map_field(&self, doc: &mut JsonObjectBuilder, name: &str, value: &Value);

    fn map_link(&self, doc: &mut JsonObjectBuilder, name: &str, url: &str);

    fn map_types(&self, doc: &mut JsonObjectBuilder, types: &[String]);

    fn map_self_url(&self, doc: &mut JsonObjectBuilder, url: &str);

    fn map_embedded_resource_field(
        &self,
        doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        value: &Value,
    );

    fn map_embedded_resource_link(
        &self,
        doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        url: &str,
    );

    fn map_embedded_resource_types(
        &self,
        doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        types: &[String],
    );

    fn map_embedded_resource_url(&self, doc: &mut JsonObjectBuilder, path: &EmbeddedPath, url: &str);

    fn map_linked_resource_url(&self, doc: &mut JsonObjectBuilder, path: &EmbeddedPath, url: &str);

    fn on_finish(&self, _doc: &mut JsonObjectBuilder, _model: &SingleModel, _ctx: &RequestContext) {}
}

/// Renders one page of a collection.
///
/// Item callbacks receive a fresh builder per item; [`on_finish_item`]
/// hands it back together with the page builder so the format can place
/// the finished item.
///
/// [`on_finish_item`]: PageMessageMapper::on_finish_item
pub trait PageMessageMapper: Send + Sync {
    fn media_type(&self) -> &str;

    fn supports(&self, _page: &PageInfo, _ctx: &RequestContext) -> bool {
        true
    }

    fn on_start(&self, _doc: &mut JsonObjectBuilder, _page: &PageInfo, _ctx: &RequestContext) {}

    fn on_start_item(
        &self,
        _doc: &mut JsonObjectBuilder,
        _item_doc: &mut JsonObjectBuilder,
        _item: &SingleModel,
        _ctx: &RequestContext,
    ) {
    }

    fn map_item_field(&self, item_doc: &mut JsonObjectBuilder, name: &str, value: &Value);

    fn map_item_link(&self, item_doc: &mut JsonObjectBuilder, name: &str, url: &str);

    fn map_item_types(&self, item_doc: &mut JsonObjectBuilder, types: &[String]);

    fn map_item_self_url(&self, item_doc: &mut JsonObjectBuilder, url: &str);

    fn map_item_embedded_resource_field(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        value: &Value,
    );

    fn map_item_embedded_resource_link(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        name: &str,
        url: &str,
    );

    fn map_item_embedded_resource_types(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        types: &[String],
    );

    fn map_item_embedded_resource_url(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        url: &str,
    );

    fn map_item_linked_resource_url(
        &self,
        item_doc: &mut JsonObjectBuilder,
        path: &EmbeddedPath,
        url: &str,
    );

    fn on_finish_item(
        &self,
        doc: &mut JsonObjectBuilder,
        item_doc: JsonObjectBuilder,
        item: &SingleModel,
        ctx: &RequestContext,
    );

    fn map_item_total_count(&self, doc: &mut JsonObjectBuilder, total_count: usize);

    fn map_page_count(&self, doc: &mut JsonObjectBuilder, count: usize);

    fn map_current_page_url(&self, doc: &mut JsonObjectBuilder, url: &str);

    fn map_first_page_url(&self, doc: &mut JsonObjectBuilder, url: &str);

    fn map_previous_page_url(&self, doc: &mut JsonObjectBuilder, url: &str);

    fn map_next_page_url(&self, doc: &mut JsonObjectBuilder, url: &str);

    fn map_last_page_url(&self, doc: &mut JsonObjectBuilder, url: &str);

    fn map_collection_url(&self, doc: &mut JsonObjectBuilder, url: &str);

    fn on_finish(&self, _doc: &mut JsonObjectBuilder, _page: &PageInfo, _ctx: &RequestContext) {}
}

/// Renders an [`ApiError`].
pub trait ErrorMessageMapper: Send + Sync {
    fn media_type(&self) -> &str;

    fn supports(&self, _error: &ApiError, _ctx: &RequestContext) -> bool {
        true
    }

    fn on_start(&self, _doc: &mut JsonObjectBuilder, _error: &ApiError, _ctx: &RequestContext) {}

    fn map_description(&self, doc: &mut JsonObjectBuilder, description: &str);

    fn map_status_code(&self, doc: &mut JsonObjectBuilder, status_code: u16);

    fn map_title(&self, doc: &mut JsonObjectBuilder, title: &str);

    fn map_type(&self, doc: &mut JsonObjectBuilder, error_type: &str);

    fn on_finish(&self, _doc: &mut JsonObjectBuilder, _error: &ApiError, _ctx: &RequestContext) {}
}
