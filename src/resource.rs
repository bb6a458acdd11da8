//! The resource envelope: type name, properties and the attributes every
//! resource shares, plus the one-shot specialization of properties into a
//! typed record.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::catalog::{Catalog, CloudFormationResource, DynResource};
use crate::codec::{self, Fields, FieldsBuilder, Scope};
use crate::errors::{Error, Result, StructureErrorKind};
use crate::node::Node;
use crate::value::{Value, ValueMap};

const TYPE: &str = "Type";
const PROPERTIES: &str = "Properties";
const DEPENDS_ON: &str = "DependsOn";
const CONDITION: &str = "Condition";
const METADATA: &str = "Metadata";
const DELETION_POLICY: &str = "DeletionPolicy";
const UPDATE_REPLACE_POLICY: &str = "UpdateReplacePolicy";
const CREATION_POLICY: &str = "CreationPolicy";
const UPDATE_POLICY: &str = "UpdatePolicy";

pub const CUSTOM_RESOURCE_TYPE: &str = "AWS::CloudFormation::CustomResource";
const CUSTOM_TYPE_PREFIX: &str = "Custom::";

/// What happens to the physical resource when it is deleted or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetentionPolicy {
    Delete,
    Retain,
    RetainExceptOnCreate,
    Snapshot,
}

impl RetentionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RetentionPolicy::Delete => "Delete",
            RetentionPolicy::Retain => "Retain",
            RetentionPolicy::RetainExceptOnCreate => "RetainExceptOnCreate",
            RetentionPolicy::Snapshot => "Snapshot",
        }
    }
}

impl FromStr for RetentionPolicy {
    type Err = StructureErrorKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Delete" => Ok(RetentionPolicy::Delete),
            "Retain" => Ok(RetentionPolicy::Retain),
            "RetainExceptOnCreate" => Ok(RetentionPolicy::RetainExceptOnCreate),
            "Snapshot" => Ok(RetentionPolicy::Snapshot),
            other => Err(StructureErrorKind::InvalidPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two terminal states of a resource's properties.
#[derive(Debug, Clone)]
pub enum Specialization {
    /// The type is not in the catalog; properties stay an untyped mapping.
    Generic(ValueMap),
    Typed(Box<dyn DynResource>),
}

impl PartialEq for Specialization {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Specialization::Generic(a), Specialization::Generic(b)) => a == b,
            (Specialization::Typed(a), Specialization::Typed(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    resource_type: String,
    properties: Specialization,
    /// Always a list, whichever spelling the source used.
    pub depends_on: Vec<String>,
    pub condition: Option<String>,
    pub metadata: Option<Value>,
    pub deletion_policy: Option<RetentionPolicy>,
    pub update_replace_policy: Option<RetentionPolicy>,
    pub creation_policy: Option<Value>,
    pub update_policy: Option<Value>,
}

impl Resource {
    /// A generic resource with no properties.
    pub fn new(resource_type: impl Into<String>) -> Resource {
        Resource {
            resource_type: resource_type.into(),
            properties: Specialization::Generic(ValueMap::new()),
            depends_on: Vec::new(),
            condition: None,
            metadata: None,
            deletion_policy: None,
            update_replace_policy: None,
            creation_policy: None,
            update_policy: None,
        }
    }

    /// A resource already specialized as `T`.
    pub fn typed<T: CloudFormationResource>(record: T) -> Resource {
        let mut resource = Resource::new(T::TYPE_NAME);
        resource.properties = Specialization::Typed(Box::new(record));
        resource
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Resource {
        if let Specialization::Generic(properties) = &mut self.properties {
            properties.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_depends_on(mut self, logical_id: impl Into<String>) -> Resource {
        self.depends_on.push(logical_id.into());
        self
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Custom resources are backed by user code and never have a schema.
    pub fn is_custom(&self) -> bool {
        self.resource_type == CUSTOM_RESOURCE_TYPE
            || self.resource_type.starts_with(CUSTOM_TYPE_PREFIX)
    }

    pub fn is_specialized(&self) -> bool {
        matches!(self.properties, Specialization::Typed(_))
    }

    pub fn specialization(&self) -> &Specialization {
        &self.properties
    }

    /// Properties as a mapping; typed records yield them in schema order.
    pub fn properties(&self) -> ValueMap {
        match &self.properties {
            Specialization::Generic(properties) => properties.clone(),
            Specialization::Typed(typed) => typed.properties(),
        }
    }

    pub fn generic_properties(&self) -> Option<&ValueMap> {
        match &self.properties {
            Specialization::Generic(properties) => Some(properties),
            Specialization::Typed(_) => None,
        }
    }

    pub fn generic_properties_mut(&mut self) -> Option<&mut ValueMap> {
        match &mut self.properties {
            Specialization::Generic(properties) => Some(properties),
            Specialization::Typed(_) => None,
        }
    }

    pub fn as_typed<T: CloudFormationResource>(&self) -> Option<&T> {
        match &self.properties {
            Specialization::Typed(typed) => typed.as_any().downcast_ref::<T>(),
            Specialization::Generic(_) => None,
        }
    }

    pub fn as_typed_mut<T: CloudFormationResource>(&mut self) -> Option<&mut T> {
        match &mut self.properties {
            Specialization::Typed(typed) => typed.as_any_mut().downcast_mut::<T>(),
            Specialization::Generic(_) => None,
        }
    }

    /// Top-level property values, whatever the specialization.
    pub fn property_values(&self) -> Vec<&Value> {
        match &self.properties {
            Specialization::Generic(properties) => properties.values().collect(),
            Specialization::Typed(typed) => typed.property_values(),
        }
    }

    pub fn property_values_mut(&mut self) -> Vec<&mut Value> {
        match &mut self.properties {
            Specialization::Generic(properties) => properties.values_mut().collect(),
            Specialization::Typed(typed) => typed.property_values_mut(),
        }
    }

    /// Resolve the type against `catalog` and, if it is known, replace the
    /// generic properties with a typed record. Returns whether the resource
    /// is specialized afterwards. A failed specialization leaves the resource
    /// untouched.
    pub fn specialize(&mut self, catalog: &Catalog) -> Result<bool> {
        let properties = match &self.properties {
            Specialization::Typed(_) => return Ok(true),
            Specialization::Generic(properties) => properties,
        };
        let Some(factory) = catalog.lookup(&self.resource_type) else {
            return Ok(false);
        };
        let typed = factory(properties.clone()).map_err(|err| err.within(PROPERTIES))?;
        trace!(resource_type = %self.resource_type, "specialized resource properties");
        self.properties = Specialization::Typed(typed);
        Ok(true)
    }

    /// Decode one entry of the Resources section. Errors are located relative
    /// to the section, starting with `logical_id`.
    pub fn decode(logical_id: &str, node: Node, catalog: &Catalog) -> Result<Resource> {
        Resource::decode_entry(logical_id, node, catalog).map_err(|err| err.within(logical_id))
    }

    fn decode_entry(logical_id: &str, node: Node, catalog: &Catalog) -> Result<Resource> {
        let mut fields = Fields::new(node)?;
        let mut resource = Resource::new(fields.required_string(TYPE)?);

        if let Some(properties) = fields.mapping(PROPERTIES)? {
            let properties = codec::decode_entries(properties, Scope::Template).map_err(|err| err.within(PROPERTIES))?;
            resource.properties = Specialization::Generic(properties);
        }
        if let Some(node) = fields.take(DEPENDS_ON) {
            resource.depends_on = decode_depends_on(node).map_err(|err| err.within(DEPENDS_ON))?;
        }
        resource.condition = fields.string(CONDITION)?;
        resource.metadata = fields.value_in(METADATA, Scope::Opaque)?;
        resource.deletion_policy = decode_policy(&mut fields, DELETION_POLICY)?;
        resource.update_replace_policy = decode_policy(&mut fields, UPDATE_REPLACE_POLICY)?;
        resource.creation_policy = fields.value(CREATION_POLICY)?;
        resource.update_policy = fields.value(UPDATE_POLICY)?;
        fields.finish()?;

        if !resource.specialize(catalog)? {
            debug!(
                logical_id,
                resource_type = %resource.resource_type,
                "resource type not in catalog, keeping generic properties"
            );
        }
        Ok(resource)
    }

    /// Encode the envelope. Empty properties and an empty DependsOn are
    /// omitted.
    pub fn encode(&self) -> Result<Node> {
        let mut builder = FieldsBuilder::new();
        builder.string(TYPE, Some(self.resource_type.as_str()));

        let properties = self.properties();
        if !properties.is_empty() {
            let node = codec::encode(&Value::from(properties)).map_err(|err| err.within(PROPERTIES))?;
            builder.node(PROPERTIES, node);
        }
        if !self.depends_on.is_empty() {
            let ids = self.depends_on.iter().cloned().map(Node::String).collect();
            builder.node(DEPENDS_ON, Node::Sequence(ids));
        }
        builder
            .value_in(METADATA, self.metadata.as_ref(), Scope::Opaque)?
            .string(DELETION_POLICY, self.deletion_policy.map(RetentionPolicy::as_str))
            .string(
                UPDATE_REPLACE_POLICY,
                self.update_replace_policy.map(RetentionPolicy::as_str),
            )
            .string(CONDITION, self.condition.as_deref())
            .value(CREATION_POLICY, self.creation_policy.as_ref())?
            .value(UPDATE_POLICY, self.update_policy.as_ref())?;
        Ok(builder.build())
    }
}

fn decode_depends_on(node: Node) -> Result<Vec<String>> {
    match node {
        Node::String(logical_id) => Ok(vec![logical_id]),
        Node::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Node::String(logical_id) => Ok(logical_id),
                other => Err(Error::type_mismatch("string", other.kind()).at_index(i)),
            })
            .collect(),
        other => Err(Error::type_mismatch("string or list of strings", other.kind())),
    }
}

fn decode_policy(fields: &mut Fields, key: &'static str) -> Result<Option<RetentionPolicy>> {
    fields
        .string(key)?
        .map(|policy| {
            policy
                .parse::<RetentionPolicy>()
                .map_err(|kind| Error::structure(kind).within(key))
        })
        .transpose()
}
