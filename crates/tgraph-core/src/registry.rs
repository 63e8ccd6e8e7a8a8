use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tgraph_types::Uri;
use tracing::debug;

use crate::entity::Entity;
use crate::error::{RegistryError, RegistryResult};

type Constructor = Box<dyn Fn() -> Entity + Send + Sync>;

/// Maps type URIs to constructors for entity variants.
///
/// Built once through [`TypeRegistryBuilder`] and read-only afterwards. A
/// document borrows the registry for the duration of a read, so several
/// independent registries can coexist in one process.
#[derive(Default)]
pub struct TypeRegistry {
    constructors: BTreeMap<Uri, Constructor>,
    owned_properties: BTreeSet<Uri>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Construct a default-initialized entity of `type_uri`, without an
    /// identity.
    pub fn create(&self, type_uri: &str) -> RegistryResult<Entity> {
        match self.constructors.get(type_uri) {
            Some(constructor) => Ok(constructor()),
            None => Err(RegistryError::UnknownType {
                type_uri: Uri::from(type_uri),
            }),
        }
    }

    /// Returns `true` if a constructor is registered for `type_uri`.
    pub fn contains(&self, type_uri: &str) -> bool {
        self.constructors.contains_key(type_uri)
    }

    /// Returns `true` if some registered variant declares an owned slot for
    /// `property`. Such URIs appear as the object of ownership markers.
    pub fn is_owned_property(&self, property: &str) -> bool {
        self.owned_properties.contains(property)
    }

    /// Registered type URIs, sorted.
    pub fn types(&self) -> impl Iterator<Item = &Uri> {
        self.constructors.keys()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.constructors.keys().collect::<Vec<_>>())
            .field("owned_properties", &self.owned_properties)
            .finish()
    }
}

/// Collects constructors before freezing them into a [`TypeRegistry`].
#[derive(Default)]
pub struct TypeRegistryBuilder {
    registry: TypeRegistry,
}

impl TypeRegistryBuilder {
    /// Register a zero-argument constructor for `type_uri`.
    ///
    /// The constructor is called once to check that it produces entities
    /// tagged `type_uri` and to learn its owned-slot properties.
    pub fn register<F>(&mut self, type_uri: impl Into<Uri>, constructor: F) -> RegistryResult<&mut Self>
    where
        F: Fn() -> Entity + Send + Sync + 'static,
    {
        let type_uri = type_uri.into();
        if self.registry.constructors.contains_key(&type_uri) {
            return Err(RegistryError::AlreadyRegistered { type_uri });
        }
        let prototype = constructor();
        if *prototype.type_tag() != type_uri {
            return Err(RegistryError::TagMismatch {
                registered: type_uri,
                produced: prototype.type_tag().clone(),
            });
        }
        self.registry
            .owned_properties
            .extend(prototype.owned_properties().cloned());
        debug!(%type_uri, "registered entity type");
        self.registry.constructors.insert(type_uri, Box::new(constructor));
        Ok(self)
    }

    pub fn build(self) -> TypeRegistry {
        self.registry
    }
}
