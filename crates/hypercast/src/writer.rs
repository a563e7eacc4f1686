//! The representation writer.
//!
//! Walks a model through its registered representor and feeds every piece to
//! a [`ModelSink`], which forwards to a single-resource mapper or to the item
//! callbacks of a page mapper. Recursion into related models is bounded by
//! the request's embed paths: a relation is only descended into when its
//! exact dotted path was asked for.

use crate::document::JsonObjectBuilder;
use crate::embedded::Embedded;
use crate::embedded_path::EmbeddedPath;
use crate::error::Result;
use crate::fields::{FieldPredicate, Fields};
use crate::mapper::{PageMessageMapper, SingleModelMessageMapper};
use crate::model::{ModelType, Page, SingleModel};
use crate::registry::ResourceRegistry;
use crate::representor::{RelatedModel, Representor};
use crate::request::RequestContext;
use crate::uri::{UrlResolver, page_url};
use serde_json::Value;
use std::any::Any;

// ── Sinks ──────────────────────────────────────────────────────────────

trait ModelSink {
    fn field(&mut self, name: &str, value: &Value);
    fn link(&mut self, name: &str, url: &str);
    fn types(&mut self, types: &[String]);
    fn self_url(&mut self, url: &str);
    fn embedded_field(&mut self, path: &EmbeddedPath, name: &str, value: &Value);
    fn embedded_link(&mut self, path: &EmbeddedPath, name: &str, url: &str);
    fn embedded_types(&mut self, path: &EmbeddedPath, types: &[String]);
    fn embedded_url(&mut self, path: &EmbeddedPath, url: &str);
    fn linked_url(&mut self, path: &EmbeddedPath, url: &str);
}

struct SingleSink<'a> {
    mapper: &'a dyn SingleModelMessageMapper,
    doc: &'a mut JsonObjectBuilder,
}

impl ModelSink for SingleSink<'_> {
    fn field(&mut self, name: &str, value: &Value) {
        self.mapper.map_field(self.doc, name, value);
    }

    fn link(&mut self, name: &str, url: &str) {
        self.mapper.map_link(self.doc, name, url);
    }

    fn types(&mut self, types: &[String]) {
        self.mapper.map_types(self.doc, types);
    }

    fn self_url(&mut self, url: &str) {
        self.mapper.map_self_url(self.doc, url);
    }

    fn embedded_field(&mut self, path: &EmbeddedPath, name: &str, value: &Value) {
        self.mapper.map_embedded_resource_field(self.doc, path, name, value);
    }

    fn embedded_link(&mut self, path: &EmbeddedPath, name: &str, url: &str) {
        self.mapper.map_embedded_resource_link(self.doc, path, name, url);
    }

    fn embedded_types(&mut self, path: &EmbeddedPath, types: &[String]) {
        self.mapper.map_embedded_resource_types(self.doc, path, types);
    }

    fn embedded_url(&mut self, path: &EmbeddedPath, url: &str) {
        self.mapper.map_embedded_resource_url(self.doc, path, url);
    }

    fn linked_url(&mut self, path: &EmbeddedPath, url: &str) {
        self.mapper.map_linked_resource_url(self.doc, path, url);
    }
}

struct ItemSink<'a> {
    mapper: &'a dyn PageMessageMapper,
    doc: &'a mut JsonObjectBuilder,
}

impl ModelSink for ItemSink<'_> {
    fn field(&mut self, name: &str, value: &Value) {
        self.mapper.map_item_field(self.doc, name, value);
    }

    fn link(&mut self, name: &str, url: &str) {
        self.mapper.map_item_link(self.doc, name, url);
    }

    fn types(&mut self, types: &[String]) {
        self.mapper.map_item_types(self.doc, types);
    }

    fn self_url(&mut self, url: &str) {
        self.mapper.map_item_self_url(self.doc, url);
    }

    fn embedded_field(&mut self, path: &EmbeddedPath, name: &str, value: &Value) {
        self.mapper
            .map_item_embedded_resource_field(self.doc, path, name, value);
    }

    fn embedded_link(&mut self, path: &EmbeddedPath, name: &str, url: &str) {
        self.mapper
            .map_item_embedded_resource_link(self.doc, path, name, url);
    }

    fn embedded_types(&mut self, path: &EmbeddedPath, types: &[String]) {
        self.mapper
            .map_item_embedded_resource_types(self.doc, path, types);
    }

    fn embedded_url(&mut self, path: &EmbeddedPath, url: &str) {
        self.mapper.map_item_embedded_resource_url(self.doc, path, url);
    }

    fn linked_url(&mut self, path: &EmbeddedPath, url: &str) {
        self.mapper.map_item_linked_resource_url(self.doc, path, url);
    }
}

// ── Writer ─────────────────────────────────────────────────────────────

/// Location a model's pieces are written to: the document root, or the
/// nested position of an embedded relation.
#[derive(Clone, Copy)]
enum Target<'p> {
    Root,
    Embedded(&'p EmbeddedPath),
}

impl<'p> Target<'p> {
    fn path(self) -> Option<&'p EmbeddedPath> {
        match self {
            Target::Root => None,
            Target::Embedded(path) => Some(path),
        }
    }
}

pub(crate) struct Writer<'a> {
    pub(crate) registry: &'a ResourceRegistry,
    pub(crate) urls: UrlResolver<'a>,
    pub(crate) fields: Fields,
    pub(crate) embedded: Embedded,
}

impl Writer<'_> {
    pub(crate) fn write_single(
        &self,
        model: &SingleModel,
        mapper: &dyn SingleModelMessageMapper,
        ctx: &RequestContext,
    ) -> Result<JsonObjectBuilder> {
        let mut doc = JsonObjectBuilder::new();
        mapper.on_start(&mut doc, model, ctx);
        {
            let mut sink = SingleSink {
                mapper,
                doc: &mut doc,
            };
            self.write_model(model.model(), model.model_type(), Target::Root, &mut sink)?;
        }
        mapper.on_finish(&mut doc, model, ctx);
        Ok(doc)
    }

    pub(crate) fn write_page<T: Any + Clone>(
        &self,
        page: &Page<T>,
        mapper: &dyn PageMessageMapper,
        ctx: &RequestContext,
    ) -> Result<JsonObjectBuilder> {
        let info = page.info();
        let collection_url = self.urls.collection_url(page.path(), info.model_type)?;

        let mut doc = JsonObjectBuilder::new();
        mapper.on_start(&mut doc, &info, ctx);

        for item in page.items() {
            let item = SingleModel::new(item.clone());
            let mut item_doc = JsonObjectBuilder::new();
            mapper.on_start_item(&mut doc, &mut item_doc, &item, ctx);
            {
                let mut sink = ItemSink {
                    mapper,
                    doc: &mut item_doc,
                };
                self.write_model(item.model(), item.model_type(), Target::Root, &mut sink)?;
            }
            mapper.on_finish_item(&mut doc, item_doc, &item, ctx);
        }

        let per_page = info.items_per_page;
        mapper.map_item_total_count(&mut doc, info.total_count);
        mapper.map_page_count(&mut doc, info.item_count);
        mapper.map_current_page_url(&mut doc, &page_url(&collection_url, info.page_number, per_page));
        mapper.map_first_page_url(&mut doc, &page_url(&collection_url, 1, per_page));
        if page.has_previous() {
            let previous = page_url(&collection_url, info.page_number - 1, per_page);
            mapper.map_previous_page_url(&mut doc, &previous);
        }
        if page.has_next() {
            let next = page_url(&collection_url, info.page_number + 1, per_page);
            mapper.map_next_page_url(&mut doc, &next);
        }
        mapper.map_last_page_url(&mut doc, &page_url(&collection_url, info.last_page_number, per_page));
        mapper.map_collection_url(&mut doc, &collection_url);
        mapper.on_finish(&mut doc, &info, ctx);
        Ok(doc)
    }

    fn write_model(
        &self,
        model: &dyn Any,
        model_type: ModelType,
        target: Target<'_>,
        sink: &mut dyn ModelSink,
    ) -> Result<()> {
        let Some(representor) = self.registry.representor_of(model_type) else {
            tracing::debug!(model_type = model_type.name(), "no representor registered");
            return Ok(());
        };
        let predicate = self.fields.predicate(representor.types());

        for (name, accessor) in representor.fields() {
            if !predicate.includes(name) {
                continue;
            }
            if let Some(value) = accessor.get(model)? {
                match target {
                    Target::Root => sink.field(name, &value),
                    Target::Embedded(path) => sink.embedded_field(path, name, &value),
                }
            }
        }

        for (name, url) in representor.links() {
            if !predicate.includes(name) {
                continue;
            }
            match target {
                Target::Root => sink.link(name, url),
                Target::Embedded(path) => sink.embedded_link(path, name, url),
            }
        }

        match target {
            Target::Root => sink.types(representor.types()),
            Target::Embedded(path) => sink.embedded_types(path, representor.types()),
        }

        let path = self.urls.path_of(model, model_type)?;
        let self_url = path.as_ref().map(|p| self.urls.single_item_url(p));
        if let (Target::Root, Some(url)) = (target, &self_url) {
            sink.self_url(url);
        }

        if let Some(path) = &path {
            for (key, _) in representor.binaries() {
                let url = Value::String(self.urls.binary_url(path, key));
                match target {
                    Target::Root => sink.field(key, &url),
                    Target::Embedded(embedded) => sink.embedded_field(embedded, key, &url),
                }
            }
        }

        let related = representor
            .embedded_related_models()
            .iter()
            .chain(representor.linked_related_models());
        for relation in related {
            self.write_relation(relation, model, target.path(), &predicate, sink)?;
        }

        self.write_collections(&representor, self_url.as_deref(), target.path(), &predicate, sink);
        Ok(())
    }

    fn write_relation(
        &self,
        relation: &RelatedModel,
        parent: &dyn Any,
        parent_path: Option<&EmbeddedPath>,
        predicate: &FieldPredicate,
        sink: &mut dyn ModelSink,
    ) -> Result<()> {
        if !predicate.includes(relation.key()) {
            return Ok(());
        }
        let Some(related) = relation.resolve(parent)? else {
            return Ok(());
        };
        let path = EmbeddedPath::append(parent_path, relation.key());
        let is_embedded = self.embedded.is_embedded(&path.joined());

        let Some(url) = self.urls.single_url(related.model(), related.model_type())? else {
            tracing::debug!(path = %path, "skipping relation without a resolvable URL");
            return Ok(());
        };

        if is_embedded {
            sink.embedded_url(&path, &url);
            self.write_model(
                related.model(),
                related.model_type(),
                Target::Embedded(&path),
                sink,
            )
        } else {
            sink.linked_url(&path, &url);
            Ok(())
        }
    }

    fn write_collections(
        &self,
        representor: &Representor,
        self_url: Option<&str>,
        parent_path: Option<&EmbeddedPath>,
        predicate: &FieldPredicate,
        sink: &mut dyn ModelSink,
    ) {
        let Some(self_url) = self_url else {
            return;
        };
        for collection in representor.related_collections() {
            if !predicate.includes(collection.key()) {
                continue;
            }
            let Some(name) = self.registry.external_name_of(collection.model_type()) else {
                tracing::debug!(
                    key = collection.key(),
                    model_type = collection.model_type().name(),
                    "skipping related collection of unregistered type"
                );
                continue;
            };
            let path = EmbeddedPath::append(parent_path, collection.key());
            sink.linked_url(&path, &format!("{self_url}/{name}"));
        }
    }
}
