use crate::error::{Error, Result};
use crate::model::ModelType;
use crate::representor::{Representor, RepresentorBuilder};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What to do when a model type is registered a second time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// The newer registration wins.
    #[default]
    Replace,
    /// The second registration fails with [`Error::AlreadyRegistered`].
    Reject,
}

/// A registered resource, as listed by [`ResourceRegistry::resources`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub name: String,
    pub model_type: ModelType,
}

struct Entry {
    name: String,
    declared: Arc<Representor>,
    published: Arc<Representor>,
}

#[derive(Default)]
struct Tables {
    entries: HashMap<TypeId, Entry>,
    names: HashMap<String, ModelType>,
    // Registration order, so reverse collections attach deterministically.
    order: Vec<ModelType>,
}

impl Tables {
    /// Rebuild the published representor of every entry from its declared
    /// one plus the reverse collections other entries contribute to it.
    fn republish(&mut self) {
        let mut contributions: HashMap<TypeId, Vec<_>> = HashMap::new();
        for model_type in &self.order {
            if let Some(entry) = self.entries.get(&model_type.type_id()) {
                for reverse in entry.declared.reverse_collections() {
                    contributions
                        .entry(reverse.target().type_id())
                        .or_default()
                        .push(reverse.collection().clone());
                }
            }
        }
        for (type_id, entry) in self.entries.iter_mut() {
            let published = match contributions.get(type_id) {
                Some(extra) => Arc::new(entry.declared.with_collections(extra)),
                None => Arc::clone(&entry.declared),
            };
            entry.published = published;
        }
    }
}

/// Maps model types to their representors and external resource names.
///
/// Reads clone `Arc`s out of an `RwLock`; writes build the new entries
/// completely before swapping them in, so readers never see a partially
/// registered resource.
pub struct ResourceRegistry {
    policy: RegistrationPolicy,
    tables: RwLock<Tables>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("policy", &self.policy)
            .field("resources", &self.resources())
            .finish()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::with_policy(RegistrationPolicy::default())
    }

    pub fn with_policy(policy: RegistrationPolicy) -> Self {
        Self {
            policy,
            tables: RwLock::new(Tables::default()),
        }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `representor` for `model_type` under `name`.
    pub fn register(
        &self,
        model_type: ModelType,
        name: impl Into<String>,
        representor: Representor,
    ) -> Result<()> {
        let name = name.into();
        if representor.model_type() != model_type {
            return Err(Error::MustHaveValidModelType {
                declared: representor.model_type().name().to_string(),
                registered: model_type.name().to_string(),
            });
        }

        let mut tables = self.write();
        if let Some(owner) = tables.names.get(&name)
            && *owner != model_type
        {
            return Err(Error::NameTaken {
                name,
                model_type: owner.name().to_string(),
            });
        }

        let representor = Arc::new(representor);
        let previous = tables
            .entries
            .get(&model_type.type_id())
            .map(|entry| entry.name.clone());
        match previous {
            Some(_) if self.policy == RegistrationPolicy::Reject => {
                return Err(Error::AlreadyRegistered(model_type.name().to_string()));
            }
            Some(previous) => {
                tracing::warn!(
                    model_type = model_type.name(),
                    previous = %previous,
                    name = %name,
                    "replacing registered representor"
                );
                tables.names.remove(&previous);
            }
            None => tables.order.push(model_type),
        }

        tables.names.insert(name.clone(), model_type);
        tables.entries.insert(
            model_type.type_id(),
            Entry {
                name: name.clone(),
                declared: Arc::clone(&representor),
                published: representor,
            },
        );
        tables.republish();
        tracing::debug!(model_type = model_type.name(), name = %name, "registered resource");
        Ok(())
    }

    /// Build and register a representor for `T` in one step.
    pub fn register_resource<T: Any>(
        &self,
        name: impl Into<String>,
        build: impl FnOnce(RepresentorBuilder<T>) -> RepresentorBuilder<T>,
    ) -> Result<()> {
        let representor = build(RepresentorBuilder::new()).build();
        self.register(ModelType::of::<T>(), name, representor)
    }

    pub fn representor_of(&self, model_type: ModelType) -> Option<Arc<Representor>> {
        self.read()
            .entries
            .get(&model_type.type_id())
            .map(|entry| Arc::clone(&entry.published))
    }

    pub fn external_name_of(&self, model_type: ModelType) -> Option<String> {
        self.read()
            .entries
            .get(&model_type.type_id())
            .map(|entry| entry.name.clone())
    }

    /// Look a resource up by Rust type name, either fully qualified or
    /// without its module path.
    pub fn external_name_of_type_name(&self, type_name: &str) -> Option<String> {
        let tables = self.read();
        tables
            .order
            .iter()
            .find(|t| t.name() == type_name || t.short_name() == type_name)
            .and_then(|t| tables.entries.get(&t.type_id()))
            .map(|entry| entry.name.clone())
    }

    pub fn model_type_of(&self, name: &str) -> Option<ModelType> {
        self.read().names.get(name).copied()
    }

    /// Every registered resource, in registration order.
    pub fn resources(&self) -> Vec<ResourceInfo> {
        let tables = self.read();
        tables
            .order
            .iter()
            .filter_map(|model_type| {
                tables.entries.get(&model_type.type_id()).map(|entry| ResourceInfo {
                    name: entry.name.clone(),
                    model_type: *model_type,
                })
            })
            .collect()
    }
}
