//! Declarative resource descriptions.
//!
//! A [`Representor`] says how a model type maps to fields, links, binaries,
//! relations and type names. It is declared once through the typed
//! [`RepresentorBuilder`] and then stored type-erased, so the writer can walk
//! models whose concrete type it never sees.

use crate::error::{AccessorError, Error, Result};
use crate::identifier::{Identifier, IdentifierType, RootIdentifier};
use crate::model::{ModelType, SingleModel};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::marker::PhantomData;
use std::sync::Arc;

type FieldFn = dyn Fn(&dyn Any) -> Result<Option<Value>> + Send + Sync;
type IdentifierFn = dyn Fn(&dyn Any) -> Result<Box<dyn Identifier>> + Send + Sync;
type RelatedFn = dyn Fn(&dyn Any) -> Result<Option<SingleModel>> + Send + Sync;
type BinaryFn = dyn Fn(&dyn Any) -> Result<Box<dyn Read + Send>> + Send + Sync;

fn downcast<T: Any>(model: &dyn Any) -> Result<&T> {
    model
        .downcast_ref::<T>()
        .ok_or_else(|| Error::MustHaveValidModelType {
            declared: std::any::type_name::<T>().to_string(),
            registered: "a model of another type".to_string(),
        })
}

fn to_field_value<V: Serialize>(value: V) -> Result<Option<Value>> {
    match serde_json::to_value(value)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

fn erase_identifier<T, I, F>(f: F) -> Arc<IdentifierFn>
where
    T: Any,
    I: Identifier,
    F: Fn(&T) -> I + Send + Sync + 'static,
{
    Arc::new(move |model: &dyn Any| -> Result<Box<dyn Identifier>> {
        let id: Box<dyn Identifier> = Box::new(f(downcast::<T>(model)?));
        Ok(id)
    })
}

/// Reads one field of a model. Null values come back as `None`.
#[derive(Clone)]
pub struct FieldAccessor(Arc<FieldFn>);

impl FieldAccessor {
    pub fn get(&self, model: &dyn Any) -> Result<Option<Value>> {
        (self.0)(model)
    }
}

/// Opens the byte stream behind a binary resource.
#[derive(Clone)]
pub struct BinaryAccessor(Arc<BinaryFn>);

impl BinaryAccessor {
    pub fn open(&self, model: &dyn Any) -> Result<Box<dyn Read + Send>> {
        (self.0)(model)
    }
}

/// A to-one relation from a parent model to another model.
#[derive(Clone)]
pub struct RelatedModel {
    key: String,
    model_type: ModelType,
    resolver: Arc<RelatedFn>,
}

impl RelatedModel {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Type of the related model.
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    /// Resolve the related model from its parent; `None` when absent.
    pub fn resolve(&self, parent: &dyn Any) -> Result<Option<SingleModel>> {
        (self.resolver)(parent)
    }
}

impl fmt::Debug for RelatedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedModel")
            .field("key", &self.key)
            .field("model_type", &self.model_type)
            .finish_non_exhaustive()
    }
}

/// A to-many relation, rendered only as a sub-collection URL.
#[derive(Clone)]
pub struct RelatedCollection {
    key: String,
    model_type: ModelType,
    identifier: Arc<IdentifierFn>,
}

impl RelatedCollection {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Type of the collection items.
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    /// Identifier the collection is filtered by, computed from the parent.
    pub fn collection_identifier(&self, parent: &dyn Any) -> Result<Box<dyn Identifier>> {
        (self.identifier)(parent)
    }
}

impl fmt::Debug for RelatedCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedCollection")
            .field("key", &self.key)
            .field("model_type", &self.model_type)
            .finish_non_exhaustive()
    }
}

/// A related collection one representor contributes to another model
/// type's representor. Produced by
/// [`RepresentorBuilder::add_bidirectional_model`].
#[derive(Clone, Debug)]
pub struct ReverseCollection {
    pub(crate) target: ModelType,
    pub(crate) collection: RelatedCollection,
}

impl ReverseCollection {
    pub fn target(&self) -> ModelType {
        self.target
    }

    pub fn collection(&self) -> &RelatedCollection {
        &self.collection
    }
}

/// How a model type is rendered.
#[derive(Clone)]
pub struct Representor {
    model_type: ModelType,
    identifier_type: IdentifierType,
    identifier: Arc<IdentifierFn>,
    types: Vec<String>,
    fields: BTreeMap<String, FieldAccessor>,
    links: BTreeMap<String, String>,
    binaries: BTreeMap<String, BinaryAccessor>,
    embedded: Vec<RelatedModel>,
    linked: Vec<RelatedModel>,
    collections: Vec<RelatedCollection>,
    reverse_collections: Vec<ReverseCollection>,
}

impl Representor {
    pub fn builder<T: Any>() -> RepresentorBuilder<T> {
        RepresentorBuilder::new()
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn identifier_type(&self) -> IdentifierType {
        self.identifier_type
    }

    pub fn identifier(&self, model: &dyn Any) -> Result<Box<dyn Identifier>> {
        (self.identifier)(model)
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldAccessor)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn binaries(&self) -> impl Iterator<Item = (&str, &BinaryAccessor)> {
        self.binaries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn binary(&self, key: &str) -> Option<&BinaryAccessor> {
        self.binaries.get(key)
    }

    pub fn embedded_related_models(&self) -> &[RelatedModel] {
        &self.embedded
    }

    pub fn linked_related_models(&self) -> &[RelatedModel] {
        &self.linked
    }

    pub fn related_collections(&self) -> &[RelatedCollection] {
        &self.collections
    }

    pub fn reverse_collections(&self) -> &[ReverseCollection] {
        &self.reverse_collections
    }

    /// Copy of this representor with extra related collections appended.
    pub(crate) fn with_collections<'a>(
        &self,
        extra: impl IntoIterator<Item = &'a RelatedCollection>,
    ) -> Representor {
        let mut representor = self.clone();
        representor.collections.extend(extra.into_iter().cloned());
        representor
    }
}

impl fmt::Debug for Representor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representor")
            .field("model_type", &self.model_type)
            .field("identifier_type", &self.identifier_type.name())
            .field("types", &self.types)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("links", &self.links)
            .field("binaries", &self.binaries.keys().collect::<Vec<_>>())
            .field("embedded", &self.embedded)
            .field("linked", &self.linked)
            .field("collections", &self.collections)
            .finish()
    }
}

/// Typed builder for a [`Representor`].
///
/// ```
/// use hypercast::v1::{LongIdentifier, Representor};
///
/// struct BlogPosting {
///     id: i64,
///     title: String,
///     subtitle: Option<String>,
/// }
///
/// let representor = Representor::builder::<BlogPosting>()
///     .identifier(|b| LongIdentifier(b.id))
///     .add_type("BlogPosting")
///     .add_field("headline", |b| b.title.clone())
///     .add_field("alternativeHeadline", |b| b.subtitle.clone())
///     .build();
///
/// assert_eq!(representor.types(), &["BlogPosting".to_string()]);
/// assert_eq!(representor.fields().count(), 2);
/// ```
pub struct RepresentorBuilder<T> {
    representor: Representor,
    _model: PhantomData<fn(&T)>,
}

impl<T: Any> Default for RepresentorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Any> RepresentorBuilder<T> {
    /// Start a builder. Until [`identifier`](Self::identifier) is called the
    /// resource is addressed with a [`RootIdentifier`].
    pub fn new() -> Self {
        Self {
            representor: Representor {
                model_type: ModelType::of::<T>(),
                identifier_type: IdentifierType::of::<RootIdentifier>(),
                identifier: erase_identifier::<T, _, _>(|_| RootIdentifier),
                types: Vec::new(),
                fields: BTreeMap::new(),
                links: BTreeMap::new(),
                binaries: BTreeMap::new(),
                embedded: Vec::new(),
                linked: Vec::new(),
                collections: Vec::new(),
                reverse_collections: Vec::new(),
            },
            _model: PhantomData,
        }
    }

    pub fn identifier<I, F>(mut self, f: F) -> Self
    where
        I: Identifier,
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        self.representor.identifier_type = IdentifierType::of::<I>();
        self.representor.identifier = erase_identifier::<T, I, F>(f);
        self
    }

    pub fn add_type(mut self, type_name: impl Into<String>) -> Self {
        self.representor.types.push(type_name.into());
        self
    }

    /// Add a field. Values serializing to `null` (e.g. `None`) are omitted
    /// from rendered documents.
    pub fn add_field<V, F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        V: Serialize,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        let accessor = FieldAccessor(Arc::new(move |model: &dyn Any| {
            to_field_value(f(downcast::<T>(model)?))
        }));
        self.representor.fields.insert(key.into(), accessor);
        self
    }

    /// Add a field whose accessor can fail. The failure halts the render
    /// and is reported as [`Error::Accessor`].
    pub fn try_add_field<V, E, F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        V: Serialize,
        E: Into<AccessorError>,
        F: Fn(&T) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        let accessor = FieldAccessor(Arc::new(move |model: &dyn Any| {
            let value = f(downcast::<T>(model)?).map_err(Error::accessor)?;
            to_field_value(value)
        }));
        self.representor.fields.insert(key.into(), accessor);
        self
    }

    pub fn add_link(mut self, key: impl Into<String>, url: impl Into<String>) -> Self {
        self.representor.links.insert(key.into(), url.into());
        self
    }

    pub fn add_binary<R, F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        R: Read + Send + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        let accessor = BinaryAccessor(Arc::new(move |model: &dyn Any| -> Result<Box<dyn Read + Send>> {
            let stream: Box<dyn Read + Send> = Box::new(f(downcast::<T>(model)?));
            Ok(stream)
        }));
        self.representor.binaries.insert(key.into(), accessor);
        self
    }

    /// Related model that is embedded when the request asks for its path.
    pub fn add_embedded_model<U, F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        U: Any,
        F: Fn(&T) -> Option<U> + Send + Sync + 'static,
    {
        let related = related_model::<T, U, _>(key.into(), move |t: &T| Ok(f(t)));
        self.representor.embedded.push(related);
        self
    }

    /// [`add_embedded_model`](Self::add_embedded_model) with a resolver that
    /// can fail. The failure halts the render as [`Error::Accessor`].
    pub fn try_add_embedded_model<U, E, F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        U: Any,
        E: Into<AccessorError>,
        F: Fn(&T) -> std::result::Result<Option<U>, E> + Send + Sync + 'static,
    {
        let related = related_model::<T, U, _>(key.into(), move |t: &T| {
            f(t).map_err(Error::accessor)
        });
        self.representor.embedded.push(related);
        self
    }

    /// Related model rendered as a link unless its exact path is embedded.
    pub fn add_linked_model<U, F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        U: Any,
        F: Fn(&T) -> Option<U> + Send + Sync + 'static,
    {
        let related = related_model::<T, U, _>(key.into(), move |t: &T| Ok(f(t)));
        self.representor.linked.push(related);
        self
    }

    /// [`add_linked_model`](Self::add_linked_model) with a resolver that can
    /// fail. The failure halts the render as [`Error::Accessor`].
    pub fn try_add_linked_model<U, E, F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        U: Any,
        E: Into<AccessorError>,
        F: Fn(&T) -> std::result::Result<Option<U>, E> + Send + Sync + 'static,
    {
        let related = related_model::<T, U, _>(key.into(), move |t: &T| {
            f(t).map_err(Error::accessor)
        });
        self.representor.linked.push(related);
        self
    }

    /// Collection of `U` hanging from this resource, e.g. a blog's comments.
    pub fn add_related_collection<U, I, F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        U: Any,
        I: Identifier,
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        self.representor.collections.push(RelatedCollection {
            key: key.into(),
            model_type: ModelType::of::<U>(),
            identifier: erase_identifier::<T, I, F>(f),
        });
        self
    }

    /// Link this model to a `U` under `key`, and give `U`'s representor a
    /// collection of `T` under `related_key`.
    ///
    /// The reverse collection is attached by the registry, whichever of the
    /// two types is registered first.
    pub fn add_bidirectional_model<U, I, F, G>(
        mut self,
        key: impl Into<String>,
        related_key: impl Into<String>,
        model_fn: F,
        identifier_fn: G,
    ) -> Self
    where
        U: Any,
        I: Identifier,
        F: Fn(&T) -> Option<U> + Send + Sync + 'static,
        G: Fn(&U) -> I + Send + Sync + 'static,
    {
        let related = related_model::<T, U, _>(key.into(), move |t: &T| Ok(model_fn(t)));
        self.representor.linked.push(related);
        self.representor.reverse_collections.push(ReverseCollection {
            target: ModelType::of::<U>(),
            collection: RelatedCollection {
                key: related_key.into(),
                model_type: ModelType::of::<T>(),
                identifier: erase_identifier::<U, I, G>(identifier_fn),
            },
        });
        self
    }

    pub fn build(self) -> Representor {
        self.representor
    }
}

fn related_model<T, U, F>(key: String, f: F) -> RelatedModel
where
    T: Any,
    U: Any,
    F: Fn(&T) -> Result<Option<U>> + Send + Sync + 'static,
{
    RelatedModel {
        key,
        model_type: ModelType::of::<U>(),
        resolver: Arc::new(move |parent: &dyn Any| -> Result<Option<SingleModel>> {
            Ok(f(downcast::<T>(parent)?)?.map(SingleModel::new))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::LongIdentifier;
    use serde_json::json;

    struct Person {
        id: i64,
        name: String,
    }

    struct Post {
        id: i64,
        title: String,
        subtitle: Option<String>,
        author: Option<i64>,
    }

    fn post() -> Post {
        Post {
            id: 7,
            title: "Hi".into(),
            subtitle: None,
            author: Some(3),
        }
    }

    fn person_of(author: Option<i64>) -> Option<Person> {
        author.map(|id| Person {
            id,
            name: format!("person-{id}"),
        })
    }

    #[test]
    fn test_null_fields_come_back_as_none() {
        let representor = Representor::builder::<Post>()
            .add_field("headline", |p| p.title.clone())
            .add_field("alternativeHeadline", |p| p.subtitle.clone())
            .build();

        let model = post();
        let fields: BTreeMap<_, _> = representor
            .fields()
            .map(|(k, f)| (k.to_string(), f.get(&model).unwrap()))
            .collect();
        assert_eq!(fields["headline"], Some(json!("Hi")));
        assert_eq!(fields["alternativeHeadline"], None);
    }

    #[test]
    fn test_identifier_defaults_to_root() {
        let representor = Representor::builder::<Post>().build();
        assert_eq!(
            representor.identifier_type(),
            IdentifierType::of::<RootIdentifier>()
        );
        let id = representor.identifier(&post()).unwrap();
        assert!(id.is::<RootIdentifier>());
    }

    #[test]
    fn test_identifier_is_typed() {
        let representor = Representor::builder::<Post>()
            .identifier(|p| LongIdentifier(p.id))
            .build();
        assert_eq!(
            representor.identifier_type(),
            IdentifierType::of::<LongIdentifier>()
        );
        let id = representor.identifier(&post()).unwrap();
        assert_eq!(id.downcast_ref::<LongIdentifier>(), Some(&LongIdentifier(7)));
    }

    #[test]
    fn test_wrong_model_type_is_rejected_not_panicking() {
        let representor = Representor::builder::<Post>()
            .add_field("headline", |p| p.title.clone())
            .build();
        let (_, accessor) = representor.fields().next().unwrap();
        let err = accessor.get(&42_i32).unwrap_err();
        assert!(matches!(err, Error::MustHaveValidModelType { .. }));
    }

    #[test]
    fn test_try_add_field_propagates_accessor_error() {
        let representor = Representor::builder::<Post>()
            .try_add_field("wordCount", |_p| -> std::result::Result<u32, std::io::Error> {
                Err(std::io::Error::other("search index offline"))
            })
            .build();
        let (_, accessor) = representor.fields().next().unwrap();
        let err = accessor.get(&post()).unwrap_err();
        assert!(matches!(err, Error::Accessor(_)));
        assert!(err.to_string().contains("search index offline"));
    }

    #[test]
    fn test_related_models_keep_declaration_order() {
        let representor = Representor::builder::<Post>()
            .add_embedded_model("creator", |p| person_of(p.author))
            .add_embedded_model("editor", |_p| None::<Person>)
            .add_linked_model("author", |p| person_of(p.author))
            .build();

        let keys: Vec<_> = representor
            .embedded_related_models()
            .iter()
            .map(RelatedModel::key)
            .collect();
        assert_eq!(keys, vec!["creator", "editor"]);

        let linked = &representor.linked_related_models()[0];
        assert_eq!(linked.model_type(), ModelType::of::<Person>());
        let resolved = linked.resolve(&post()).unwrap().unwrap();
        assert_eq!(resolved.downcast_ref::<Person>().unwrap().name, "person-3");
        assert_eq!(resolved.downcast_ref::<Person>().unwrap().id, 3);
    }

    #[test]
    fn test_bidirectional_model_adds_reverse_collection() {
        let representor = Representor::builder::<Post>()
            .add_bidirectional_model(
                "author",
                "posts",
                |p| person_of(p.author),
                |person: &Person| LongIdentifier(person.id),
            )
            .build();

        assert_eq!(representor.linked_related_models()[0].key(), "author");
        let reverse = &representor.reverse_collections()[0];
        assert_eq!(reverse.target(), ModelType::of::<Person>());
        assert_eq!(reverse.collection().key(), "posts");
        assert_eq!(reverse.collection().model_type(), ModelType::of::<Post>());

        let person = Person {
            id: 3,
            name: "Ada".into(),
        };
        let id = reverse.collection().collection_identifier(&person).unwrap();
        assert_eq!(id.downcast_ref::<LongIdentifier>(), Some(&LongIdentifier(3)));
    }

    #[test]
    fn test_binary_stream() {
        let representor = Representor::builder::<Post>()
            .add_binary("cover", |p| std::io::Cursor::new(p.title.clone().into_bytes()))
            .build();
        let mut out = String::new();
        representor
            .binary("cover")
            .unwrap()
            .open(&post())
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "Hi");
        assert!(representor.binary("missing").is_none());
    }
}
