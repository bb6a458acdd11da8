//! Runtime registry of typed resource records.
//!
//! The catalog maps a resource type name to a factory that turns a generic
//! property mapping into a typed record. It is filled once (the builtin
//! snapshot lives in a `lazy_static`) and only read afterwards, so concurrent
//! lookups need no locking. Types missing from the catalog are not an error:
//! their resources keep generic properties.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use tracing::trace;

use crate::errors::{Error, Result, StructureErrorKind};
use crate::value::{Value, ValueMap};

/// A resource type with a fixed property schema.
///
/// Every field still holds a [`Value`], so any property may carry a function
/// call instead of a literal.
pub trait CloudFormationResource: fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    /// Build the record, rejecting properties outside the schema.
    fn from_properties(properties: ValueMap) -> Result<Self>;

    /// Properties in schema order; unset fields are omitted.
    fn to_properties(&self) -> ValueMap;

    fn values(&self) -> Vec<&Value>;

    fn values_mut(&mut self) -> Vec<&mut Value>;
}

/// Object-safe view of a typed record, as stored inside a resource envelope.
pub trait DynResource: fmt::Debug + Send + Sync {
    fn resource_type(&self) -> &'static str;

    fn properties(&self) -> ValueMap;

    fn property_values(&self) -> Vec<&Value>;

    fn property_values_mut(&mut self) -> Vec<&mut Value>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn clone_boxed(&self) -> Box<dyn DynResource>;

    fn eq_boxed(&self, other: &dyn DynResource) -> bool;
}

impl<T: CloudFormationResource> DynResource for T {
    fn resource_type(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn properties(&self) -> ValueMap {
        self.to_properties()
    }

    fn property_values(&self) -> Vec<&Value> {
        self.values()
    }

    fn property_values_mut(&mut self) -> Vec<&mut Value> {
        self.values_mut()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn DynResource> {
        Box::new(self.clone())
    }

    fn eq_boxed(&self, other: &dyn DynResource) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| other == self)
    }
}

impl Clone for Box<dyn DynResource> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

impl PartialEq for dyn DynResource {
    fn eq(&self, other: &Self) -> bool {
        self.eq_boxed(other)
    }
}

/// Fail on the first property left over after a typed record took its fields.
pub fn reject_unknown_properties(resource_type: &str, remaining: ValueMap) -> Result<()> {
    match remaining.into_iter().next() {
        Some((property, _)) => Err(Error::structure(StructureErrorKind::UnknownProperty {
            resource_type: resource_type.to_string(),
            property: property.clone(),
        })
        .within(property)),
        None => Ok(()),
    }
}

pub type Factory = fn(ValueMap) -> Result<Box<dyn DynResource>>;

fn specialize<T: CloudFormationResource>(properties: ValueMap) -> Result<Box<dyn DynResource>> {
    Ok(Box::new(T::from_properties(properties)?))
}

#[derive(Clone, Default)]
pub struct Catalog {
    factories: HashMap<&'static str, Factory>,
}

lazy_static! {
    static ref BUILTIN: Catalog = Catalog::builtin();
}

/// The process-wide builtin catalog.
pub fn builtin() -> &'static Catalog {
    &BUILTIN
}

impl Catalog {
    /// An empty catalog: every resource stays generic.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh catalog holding the builtin resource snapshot.
    pub fn builtin() -> Self {
        let mut catalog = Catalog::new();
        crate::resources::register_builtin(&mut catalog);
        catalog
    }

    pub fn register<T: CloudFormationResource>(&mut self) -> &mut Self {
        trace!(resource_type = T::TYPE_NAME, "registering resource type");
        self.factories.insert(T::TYPE_NAME, specialize::<T>);
        self
    }

    pub fn lookup(&self, type_name: &str) -> Option<Factory> {
        self.factories.get(type_name).copied()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("types", &self.type_names())
            .finish()
    }
}
