use std::any::{Any, TypeId};
use std::fmt;

/// An opaque resource identifier.
///
/// Identifiers are polymorphic: each concrete identifier type is converted
/// to and from a routable [`Path`](crate::v1::Path) by the
/// [`PathIdentifierMapper`](crate::v1::PathIdentifierMapper) registered for it. Implementations only
/// need to expose themselves as [`Any`] so the resolver can dispatch on the
/// concrete type.
///
/// ```
/// use hypercast::v1::Identifier;
/// use std::any::Any;
///
/// #[derive(Debug, PartialEq)]
/// struct IsbnIdentifier(String);
///
/// impl Identifier for IsbnIdentifier {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Identifier: Any + fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl dyn Identifier {
    /// Downcast to a concrete identifier type.
    pub fn downcast_ref<I: Identifier>(&self) -> Option<&I> {
        self.as_any().downcast_ref::<I>()
    }

    pub fn is<I: Identifier>(&self) -> bool {
        self.as_any().is::<I>()
    }
}

/// Runtime token for a concrete identifier type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentifierType {
    id: TypeId,
    name: &'static str,
}

impl IdentifierType {
    pub fn of<I: Identifier>() -> Self {
        Self {
            id: TypeId::of::<I>(),
            name: std::any::type_name::<I>(),
        }
    }

    pub fn of_value(identifier: &dyn Identifier) -> TypeId {
        identifier.as_any().type_id()
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A simple numeric identifier, e.g. the `100` in `/p/products/100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LongIdentifier(pub i64);

impl LongIdentifier {
    pub fn id(&self) -> i64 {
        self.0
    }
}

impl Identifier for LongIdentifier {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<i64> for LongIdentifier {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Marker for resources hanging directly off the API root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RootIdentifier;

impl Identifier for RootIdentifier {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_identifier() {
        let id: Box<dyn Identifier> = Box::new(LongIdentifier(42));
        assert!(id.is::<LongIdentifier>());
        assert!(!id.is::<RootIdentifier>());
        assert_eq!(id.downcast_ref::<LongIdentifier>(), Some(&LongIdentifier(42)));
    }

    #[test]
    fn test_identifier_type_of_value_matches_static() {
        let id: Box<dyn Identifier> = Box::new(RootIdentifier);
        assert_eq!(
            IdentifierType::of_value(id.as_ref()),
            IdentifierType::of::<RootIdentifier>().type_id()
        );
    }
}
