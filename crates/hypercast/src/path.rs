use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierType, LongIdentifier, RootIdentifier};
use crate::model::ModelType;
use crate::registry::ResourceRegistry;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Routable address of a resource: its external name plus an opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    pub name: String,
    pub id: String,
}

impl Path {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Parse `name/id`; a bare `name` yields an empty id.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim_matches('/');
        let (name, id) = s.split_once('/').unwrap_or((s, ""));
        if name.is_empty() {
            return Err(Error::BadRequest(format!("{s:?} is not a resource path")));
        }
        Ok(Self::new(name, id))
    }

    pub fn as_uri(&self) -> String {
        if self.id.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.name, self.id)
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_uri())
    }
}

/// Converts one identifier type to and from the id segment of a [`Path`].
///
/// Parse failures in [`from_id`](Self::from_id) must be reported as
/// [`Error::BadRequest`]: they come from client input.
pub trait PathIdentifierMapper: Send + Sync + 'static {
    type Id: Identifier;

    fn to_id(&self, identifier: &Self::Id, registry: &ResourceRegistry) -> Result<String>;

    fn from_id(&self, id: &str, registry: &ResourceRegistry) -> Result<Self::Id>;
}

trait ErasedMapper: Send + Sync {
    fn to_id(&self, identifier: &dyn Identifier, registry: &ResourceRegistry) -> Result<String>;

    fn from_id(&self, id: &str, registry: &ResourceRegistry) -> Result<Box<dyn Identifier>>;
}

impl<M: PathIdentifierMapper> ErasedMapper for M {
    fn to_id(&self, identifier: &dyn Identifier, registry: &ResourceRegistry) -> Result<String> {
        let identifier = identifier.downcast_ref::<M::Id>().ok_or_else(|| {
            Error::MustHavePathIdentifierMapper(format!("{identifier:?}"))
        })?;
        PathIdentifierMapper::to_id(self, identifier, registry)
    }

    fn from_id(&self, id: &str, registry: &ResourceRegistry) -> Result<Box<dyn Identifier>> {
        let identifier = PathIdentifierMapper::from_id(self, id, registry)?;
        Ok(Box::new(identifier))
    }
}

/// Decimal `i64` ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongIdentifierMapper;

impl PathIdentifierMapper for LongIdentifierMapper {
    type Id = LongIdentifier;

    fn to_id(&self, identifier: &LongIdentifier, _registry: &ResourceRegistry) -> Result<String> {
        Ok(identifier.id().to_string())
    }

    fn from_id(&self, id: &str, _registry: &ResourceRegistry) -> Result<LongIdentifier> {
        id.parse::<i64>()
            .map(LongIdentifier)
            .map_err(|_| Error::BadRequest(format!("{id:?} is not a numeric identifier")))
    }
}

/// Root resources carry an empty id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootIdentifierMapper;

impl PathIdentifierMapper for RootIdentifierMapper {
    type Id = RootIdentifier;

    fn to_id(&self, _identifier: &RootIdentifier, _registry: &ResourceRegistry) -> Result<String> {
        Ok(String::new())
    }

    fn from_id(&self, id: &str, _registry: &ResourceRegistry) -> Result<RootIdentifier> {
        if id.is_empty() {
            Ok(RootIdentifier)
        } else {
            Err(Error::BadRequest(format!("root resources take no id, got {id:?}")))
        }
    }
}

/// Bidirectional identifier/path conversion, dispatched on the concrete
/// identifier type.
///
/// ```
/// use hypercast::v1::{LongIdentifier, ModelType, PathResolver, ResourceRegistry};
///
/// struct Product {
///     id: i64,
/// }
///
/// let registry = ResourceRegistry::new();
/// registry
///     .register_resource::<Product>("products", |b| b.identifier(|p| LongIdentifier(p.id)))
///     .unwrap();
///
/// let resolver = PathResolver::new();
/// let path = resolver
///     .to_path(&LongIdentifier(100), ModelType::of::<Product>(), &registry)
///     .unwrap();
/// assert_eq!(path.as_uri(), "products/100");
///
/// let id = resolver.from_path_as::<LongIdentifier>(&path, &registry).unwrap();
/// assert_eq!(id, LongIdentifier(100));
/// ```
#[derive(Clone)]
pub struct PathResolver {
    mappers: HashMap<TypeId, Arc<dyn ErasedMapper>>,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathResolver")
            .field("mappers", &self.mappers.len())
            .finish()
    }
}

impl PathResolver {
    /// Resolver with the [`LongIdentifierMapper`] and [`RootIdentifierMapper`].
    pub fn new() -> Self {
        Self::empty()
            .with_mapper(LongIdentifierMapper)
            .with_mapper(RootIdentifierMapper)
    }

    pub fn empty() -> Self {
        Self {
            mappers: HashMap::new(),
        }
    }

    pub fn with_mapper<M: PathIdentifierMapper>(mut self, mapper: M) -> Self {
        self.register(mapper);
        self
    }

    /// Register `mapper` for its identifier type, replacing any previous one.
    pub fn register<M: PathIdentifierMapper>(&mut self, mapper: M) {
        let identifier_type = IdentifierType::of::<M::Id>();
        tracing::debug!(identifier = identifier_type.name(), "registered path mapper");
        self.mappers.insert(identifier_type.type_id(), Arc::new(mapper));
    }

    pub fn to_path(
        &self,
        identifier: &dyn Identifier,
        owner: ModelType,
        registry: &ResourceRegistry,
    ) -> Result<Path> {
        let name = registry
            .external_name_of(owner)
            .ok_or_else(|| Error::UnresolvableUri(owner.name().to_string()))?;
        let mapper = self
            .mappers
            .get(&IdentifierType::of_value(identifier))
            .ok_or_else(|| Error::MustHavePathIdentifierMapper(format!("{identifier:?}")))?;
        Ok(Path::new(name, mapper.to_id(identifier, registry)?))
    }

    pub fn from_path(&self, path: &Path, registry: &ResourceRegistry) -> Result<Box<dyn Identifier>> {
        let representor = registry
            .model_type_of(&path.name)
            .and_then(|model_type| registry.representor_of(model_type))
            .ok_or_else(|| Error::NotFound(format!("no resource named {}", path.name)))?;
        let identifier_type = representor.identifier_type();
        let mapper = self
            .mappers
            .get(&identifier_type.type_id())
            .ok_or_else(|| Error::MustHavePathIdentifierMapper(identifier_type.name().to_string()))?;
        mapper.from_id(&path.id, registry)
    }

    /// Typed [`from_path`](Self::from_path).
    pub fn from_path_as<I: Identifier + Clone>(
        &self,
        path: &Path,
        registry: &ResourceRegistry,
    ) -> Result<I> {
        let identifier = self.from_path(path, registry)?;
        identifier
            .downcast_ref::<I>()
            .cloned()
            .ok_or_else(|| Error::BadRequest(format!("{path} does not address a {}", std::any::type_name::<I>())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Product {
        id: i64,
    }

    struct Catalog;

    struct Unregistered;

    #[derive(Debug, Clone, PartialEq)]
    struct SkuIdentifier(String);

    impl Identifier for SkuIdentifier {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn registry() -> ResourceRegistry {
        let registry = ResourceRegistry::new();
        registry
            .register_resource::<Product>("products", |b| b.identifier(|p| LongIdentifier(p.id)))
            .unwrap();
        registry.register_resource::<Catalog>("catalog", |b| b).unwrap();
        registry
    }

    #[test]
    fn test_path_as_uri() {
        assert_eq!(Path::new("blogs", "7").as_uri(), "blogs/7");
        assert_eq!(Path::new("catalog", "").as_uri(), "catalog");
    }

    #[test]
    fn test_path_parse() {
        assert_eq!(Path::parse("blogs/7").unwrap(), Path::new("blogs", "7"));
        assert_eq!(Path::parse("/catalog/").unwrap(), Path::new("catalog", ""));
        assert!(Path::parse("").unwrap_err().is_client_error());
    }

    #[test]
    fn test_long_identifier_round_trip() {
        let registry = registry();
        let resolver = PathResolver::new();
        for id in [0, 1, 42, -5, i64::MAX] {
            let path = resolver
                .to_path(&LongIdentifier(id), ModelType::of::<Product>(), &registry)
                .unwrap();
            let back = resolver.from_path_as::<LongIdentifier>(&path, &registry).unwrap();
            assert_eq!(back, LongIdentifier(id));
        }
    }

    #[test]
    fn test_root_identifier_round_trip() {
        let registry = registry();
        let resolver = PathResolver::new();
        let path = resolver
            .to_path(&RootIdentifier, ModelType::of::<Catalog>(), &registry)
            .unwrap();
        assert_eq!(path.as_uri(), "catalog");
        let back = resolver.from_path(&path, &registry).unwrap();
        assert!(back.is::<RootIdentifier>());
    }

    #[test]
    fn test_unregistered_owner_is_unresolvable() {
        let err = PathResolver::new()
            .to_path(&LongIdentifier(1), ModelType::of::<Unregistered>(), &registry())
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvableUri(_)));
        assert_eq!(err.kind(), ErrorKind::Developer);
    }

    #[test]
    fn test_missing_mapper_is_developer_error() {
        let err = PathResolver::new()
            .to_path(
                &SkuIdentifier("A-1".into()),
                ModelType::of::<Product>(),
                &registry(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::MustHavePathIdentifierMapper(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_malformed_id_is_bad_request() {
        let err = PathResolver::new()
            .from_path(&Path::new("products", "abc"), &registry())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let err = PathResolver::new()
            .from_path(&Path::new("nope", "1"), &registry())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_empty_resolver_lacks_builtin_mappers() {
        let err = PathResolver::empty()
            .from_path(&Path::new("products", "1"), &registry())
            .unwrap_err();
        assert!(matches!(err, Error::MustHavePathIdentifierMapper(_)));
    }
}
