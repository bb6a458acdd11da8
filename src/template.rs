//! The template aggregate and its load/dump entry points.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::{self, Catalog, CloudFormationResource};
use crate::codec::{self, Fields, FieldsBuilder, Scope};
use crate::errors::{Error, LookupError, Result, StructureErrorKind};
use crate::node::{Format, Node};
use crate::references;
use crate::resource::Resource;
use crate::value::Value;

pub const DEFAULT_FORMAT_VERSION: &str = "2010-09-09";

const FORMAT_VERSION: &str = "AWSTemplateFormatVersion";
const DESCRIPTION: &str = "Description";
const METADATA: &str = "Metadata";
const PARAMETERS: &str = "Parameters";
const MAPPINGS: &str = "Mappings";
const CONDITIONS: &str = "Conditions";
const RULES: &str = "Rules";
const TRANSFORM: &str = "Transform";
const GLOBALS: &str = "Globals";
const HOOKS: &str = "Hooks";
const RESOURCES: &str = "Resources";
const OUTPUTS: &str = "Outputs";

/// `Mappings` entry: top-level key to second-level key to value.
pub type Mapping = IndexMap<String, IndexMap<String, Value>>;

/// Macros applied to the whole template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    Single(String),
    Multiple(Vec<String>),
}

impl Transform {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Transform::Single(name) => vec![name.as_str()],
            Transform::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    pub parameter_type: String,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub allowed_values: Option<Value>,
    pub allowed_pattern: Option<String>,
    pub constraint_description: Option<String>,
    pub min_length: Option<Value>,
    pub max_length: Option<Value>,
    pub min_value: Option<Value>,
    pub max_value: Option<Value>,
    pub no_echo: Option<Value>,
}

impl Parameter {
    pub fn new(parameter_type: impl Into<String>) -> Parameter {
        Parameter {
            parameter_type: parameter_type.into(),
            ..Default::default()
        }
    }

    fn decode(node: Node) -> Result<Parameter> {
        let mut fields = Fields::new(node)?;
        let parameter = Parameter {
            parameter_type: fields.required_string("Type")?,
            description: fields.string("Description")?,
            default: fields.value("Default")?,
            allowed_values: fields.value("AllowedValues")?,
            allowed_pattern: fields.string("AllowedPattern")?,
            constraint_description: fields.string("ConstraintDescription")?,
            min_length: fields.value("MinLength")?,
            max_length: fields.value("MaxLength")?,
            min_value: fields.value("MinValue")?,
            max_value: fields.value("MaxValue")?,
            no_echo: fields.value("NoEcho")?,
        };
        fields.finish()?;
        Ok(parameter)
    }

    fn encode(&self) -> Result<Node> {
        Ok(FieldsBuilder::new()
            .string("Type", Some(self.parameter_type.as_str()))
            .string("Description", self.description.as_deref())
            .value("Default", self.default.as_ref())?
            .value("AllowedValues", self.allowed_values.as_ref())?
            .string("AllowedPattern", self.allowed_pattern.as_deref())
            .string("ConstraintDescription", self.constraint_description.as_deref())
            .value("MinLength", self.min_length.as_ref())?
            .value("MaxLength", self.max_length.as_ref())?
            .value("MinValue", self.min_value.as_ref())?
            .value("MaxValue", self.max_value.as_ref())?
            .value("NoEcho", self.no_echo.as_ref())?
            .build())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub value: Value,
    pub description: Option<String>,
    /// `Export.Name`
    pub export_name: Option<Value>,
    pub condition: Option<String>,
}

impl Output {
    pub fn new(value: impl Into<Value>) -> Output {
        Output {
            value: value.into(),
            description: None,
            export_name: None,
            condition: None,
        }
    }

    fn decode(node: Node) -> Result<Output> {
        let mut fields = Fields::new(node)?;
        let description = fields.string("Description")?;
        let value = fields.required_value("Value")?;
        let export_name = match fields.take("Export") {
            Some(export) => {
                let mut export = Fields::new(export).map_err(|err| err.within("Export"))?;
                let name = export.required_value("Name");
                let name = name.and_then(|name| export.finish().map(|_| name));
                Some(name.map_err(|err| err.within("Export"))?)
            }
            None => None,
        };
        let condition = fields.string("Condition")?;
        fields.finish()?;
        Ok(Output {
            value,
            description,
            export_name,
            condition,
        })
    }

    fn encode(&self) -> Result<Node> {
        let mut builder = FieldsBuilder::new();
        builder
            .string("Description", self.description.as_deref())
            .value("Value", Some(&self.value))?;
        if let Some(name) = &self.export_name {
            let export = FieldsBuilder::new()
                .value("Name", Some(name))
                .map_err(|err| err.within("Export"))?
                .build();
            builder.node("Export", export);
        }
        builder.string("Condition", self.condition.as_deref());
        Ok(builder.build())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub format_version: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Value>,
    pub parameters: IndexMap<String, Parameter>,
    pub mappings: IndexMap<String, Mapping>,
    pub conditions: IndexMap<String, Value>,
    pub rules: IndexMap<String, Value>,
    pub transform: Option<Transform>,
    /// SAM `Globals`, kept for the transform to expand.
    pub globals: Option<Value>,
    /// CodeDeploy blue/green `Hooks`.
    pub hooks: Option<Value>,
    pub resources: IndexMap<String, Resource>,
    pub outputs: IndexMap<String, Output>,
}

impl Template {
    /// An empty template carrying the current format version.
    pub fn new() -> Template {
        Template {
            format_version: Some(DEFAULT_FORMAT_VERSION.to_string()),
            ..Default::default()
        }
    }

    /// Load with the builtin catalog, sniffing the format.
    pub fn load(bytes: &[u8]) -> Result<Template> {
        Loader::new().load(bytes)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Template> {
        Loader::new().open(path)
    }

    pub fn from_reader(reader: impl Read) -> Result<Template> {
        Loader::new().read(reader)
    }

    pub fn from_json(text: &str) -> Result<Template> {
        Loader::new().format(Format::Json).load_str(text)
    }

    pub fn from_yaml(text: &str) -> Result<Template> {
        Loader::new().format(Format::Yaml).load_str(text)
    }

    /// Decode a parsed document. Any error aborts the whole template.
    pub fn decode(node: Node, catalog: &Catalog) -> Result<Template> {
        // An empty YAML document is an empty template.
        let node = match node {
            Node::Null => Node::Mapping(IndexMap::new()),
            node => node,
        };
        let mut sections = Fields::new(node)?;
        let mut template = Template {
            format_version: sections.string(FORMAT_VERSION)?,
            description: sections.string(DESCRIPTION)?,
            metadata: sections.value_in(METADATA, Scope::Opaque)?,
            ..Default::default()
        };

        for (name, node) in section(&mut sections, PARAMETERS)? {
            let parameter = Parameter::decode(node)
                .map_err(|err| err.within(name.as_str()).within(PARAMETERS))?;
            template.parameters.insert(name, parameter);
        }
        for (name, node) in section(&mut sections, MAPPINGS)? {
            let mapping = decode_mapping(node)
                .map_err(|err| err.within(name.as_str()).within(MAPPINGS))?;
            template.mappings.insert(name, mapping);
        }
        template.conditions =
            codec::decode_entries(section(&mut sections, CONDITIONS)?, Scope::Template)
                .map_err(|err| err.within(CONDITIONS))?;
        template.rules = codec::decode_entries(section(&mut sections, RULES)?, Scope::Rules)
            .map_err(|err| err.within(RULES))?;
        if let Some(node) = sections.take(TRANSFORM) {
            template.transform = Some(decode_transform(node).map_err(|err| err.within(TRANSFORM))?);
        }
        template.globals = sections.value_in(GLOBALS, Scope::Opaque)?;
        template.hooks = sections.value_in(HOOKS, Scope::Opaque)?;
        for (logical_id, node) in section(&mut sections, RESOURCES)? {
            let resource = Resource::decode(&logical_id, node, catalog)
                .map_err(|err| err.within(RESOURCES))?;
            template.resources.insert(logical_id, resource);
        }
        for (name, node) in section(&mut sections, OUTPUTS)? {
            let output =
                Output::decode(node).map_err(|err| err.within(name.as_str()).within(OUTPUTS))?;
            template.outputs.insert(name, output);
        }

        if let Some((name, _)) = sections.into_remaining().into_iter().next() {
            return Err(Error::structure(StructureErrorKind::UnknownSection(name.clone())).within(name));
        }
        Ok(template)
    }

    /// Encode in canonical form. Empty sections are omitted.
    pub fn encode(&self) -> Result<Node> {
        let mut builder = FieldsBuilder::new();
        builder
            .string(FORMAT_VERSION, self.format_version.as_deref())
            .string(DESCRIPTION, self.description.as_deref())
            .value_in(METADATA, self.metadata.as_ref(), Scope::Opaque)?;

        if !self.parameters.is_empty() {
            let mut parameters = IndexMap::with_capacity(self.parameters.len());
            for (name, parameter) in &self.parameters {
                let node = parameter
                    .encode()
                    .map_err(|err| err.within(name.as_str()).within(PARAMETERS))?;
                parameters.insert(name.clone(), node);
            }
            builder.node(PARAMETERS, Node::Mapping(parameters));
        }
        if !self.mappings.is_empty() {
            let mappings: IndexMap<String, Value> = self
                .mappings
                .iter()
                .map(|(name, mapping)| (name.clone(), mapping_value(mapping)))
                .collect();
            builder.value(MAPPINGS, Some(&Value::from(mappings)))?;
        }
        if !self.conditions.is_empty() {
            builder.value(CONDITIONS, Some(&Value::from(self.conditions.clone())))?;
        }
        if !self.rules.is_empty() {
            builder.value_in(RULES, Some(&Value::from(self.rules.clone())), Scope::Rules)?;
        }
        match &self.transform {
            Some(Transform::Single(name)) => {
                builder.string(TRANSFORM, Some(name.as_str()));
            }
            Some(Transform::Multiple(names)) => {
                let names = names.iter().cloned().map(Node::String).collect();
                builder.node(TRANSFORM, Node::Sequence(names));
            }
            None => {}
        }
        builder
            .value_in(GLOBALS, self.globals.as_ref(), Scope::Opaque)?
            .value_in(HOOKS, self.hooks.as_ref(), Scope::Opaque)?;
        if !self.resources.is_empty() {
            let mut resources = IndexMap::with_capacity(self.resources.len());
            for (logical_id, resource) in &self.resources {
                let node = resource
                    .encode()
                    .map_err(|err| err.within(logical_id.as_str()).within(RESOURCES))?;
                resources.insert(logical_id.clone(), node);
            }
            builder.node(RESOURCES, Node::Mapping(resources));
        }
        if !self.outputs.is_empty() {
            let mut outputs = IndexMap::with_capacity(self.outputs.len());
            for (name, output) in &self.outputs {
                let node = output
                    .encode()
                    .map_err(|err| err.within(name.as_str()).within(OUTPUTS))?;
                outputs.insert(name.clone(), node);
            }
            builder.node(OUTPUTS, Node::Mapping(outputs));
        }
        Ok(builder.build())
    }

    /// Pretty JSON or block YAML.
    pub fn dump(&self, format: Format) -> Result<Vec<u8>> {
        Ok(self.encode()?.emit(format)?.into_bytes())
    }

    pub fn to_json(&self) -> Result<String> {
        self.encode()?.to_json_pretty()
    }

    pub fn to_json_compact(&self) -> Result<String> {
        self.encode()?.to_json()
    }

    pub fn to_yaml(&self) -> Result<String> {
        self.encode()?.to_yaml()
    }

    /// Every resource specialized as `T`, in template order.
    pub fn resources_of<T: CloudFormationResource>(&self) -> IndexMap<&str, &T> {
        self.resources
            .iter()
            .filter_map(|(logical_id, resource)| {
                resource
                    .as_typed::<T>()
                    .map(|typed| (logical_id.as_str(), typed))
            })
            .collect()
    }

    /// The resource `logical_id`, provided it is specialized as `T`.
    ///
    /// A resource left generic (its type was missing from the catalog used
    /// to load it) reports a type mismatch even when the type names agree.
    pub fn resource_with_name<T: CloudFormationResource>(
        &self,
        logical_id: &str,
    ) -> std::result::Result<&T, LookupError> {
        let resource = self
            .resources
            .get(logical_id)
            .ok_or_else(|| LookupError::NotFound(logical_id.to_string()))?;
        resource
            .as_typed::<T>()
            .ok_or_else(|| LookupError::TypeMismatch {
                logical_id: logical_id.to_string(),
                expected: T::TYPE_NAME,
                found: resource.resource_type().to_string(),
            })
    }

    pub fn resource_with_name_mut<T: CloudFormationResource>(
        &mut self,
        logical_id: &str,
    ) -> std::result::Result<&mut T, LookupError> {
        let resource = self
            .resources
            .get_mut(logical_id)
            .ok_or_else(|| LookupError::NotFound(logical_id.to_string()))?;
        let found = resource.resource_type().to_string();
        resource
            .as_typed_mut::<T>()
            .ok_or_else(|| LookupError::TypeMismatch {
                logical_id: logical_id.to_string(),
                expected: T::TYPE_NAME,
                found,
            })
    }

    /// Resources typed `AWS::CloudFormation::CustomResource` or `Custom::*`.
    pub fn custom_resources(&self) -> IndexMap<&str, &Resource> {
        self.resources
            .iter()
            .filter(|(_, resource)| resource.is_custom())
            .map(|(logical_id, resource)| (logical_id.as_str(), resource))
            .collect()
    }

    /// Append a resource, refusing to overwrite an existing logical id.
    pub fn add_resource(
        &mut self,
        logical_id: impl Into<String>,
        resource: Resource,
    ) -> std::result::Result<(), LookupError> {
        let logical_id = logical_id.into();
        if self.resources.contains_key(&logical_id) {
            return Err(LookupError::AlreadyExists(logical_id));
        }
        self.resources.insert(logical_id, resource);
        Ok(())
    }

    /// Rename a resource in place and rewrite every reference to it.
    pub fn rename_resource(
        &mut self,
        old_id: &str,
        new_id: &str,
    ) -> std::result::Result<(), LookupError> {
        if !self.resources.contains_key(old_id) {
            return Err(LookupError::NotFound(old_id.to_string()));
        }
        if old_id == new_id {
            return Ok(());
        }
        if self.resources.contains_key(new_id) {
            return Err(LookupError::AlreadyExists(new_id.to_string()));
        }
        let (index, _, resource) = self
            .resources
            .shift_remove_full(old_id)
            .ok_or_else(|| LookupError::NotFound(old_id.to_string()))?;
        self.resources.shift_insert(index, new_id.to_string(), resource);

        let renames = [(old_id.to_string(), new_id.to_string())].into_iter().collect();
        references::update_template_references(self, &renames);
        Ok(())
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(text: &str) -> Result<Template> {
        Loader::new().load_str(text)
    }
}

/// Load options: the catalog used for specialization and an optional
/// forced format.
#[derive(Debug, Clone, Copy)]
pub struct Loader<'a> {
    catalog: &'a Catalog,
    format: Option<Format>,
}

impl Loader<'static> {
    /// Builtin catalog, format sniffed from content.
    pub fn new() -> Loader<'static> {
        Loader {
            catalog: catalog::builtin(),
            format: None,
        }
    }
}

impl Default for Loader<'static> {
    fn default() -> Self {
        Loader::new()
    }
}

impl<'a> Loader<'a> {
    pub fn with_catalog(catalog: &'a Catalog) -> Loader<'a> {
        Loader {
            catalog,
            format: None,
        }
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn load(&self, bytes: &[u8]) -> Result<Template> {
        let format = self.format.unwrap_or_else(|| Format::detect(bytes));
        self.load_as(bytes, format)
    }

    pub fn load_str(&self, text: &str) -> Result<Template> {
        self.load(text.as_bytes())
    }

    pub fn read(&self, mut reader: impl Read) -> Result<Template> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.load(&bytes)
    }

    /// Load a file. A forced format wins over the extension, which wins over
    /// sniffing.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Template> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let format = self
            .format
            .or_else(|| Format::from_path(path))
            .unwrap_or_else(|| Format::detect(&bytes));
        debug!(path = %path.display(), %format, "reading template");
        self.load_as(&bytes, format)
    }

    fn load_as(&self, bytes: &[u8], format: Format) -> Result<Template> {
        let node = Node::parse(bytes, format)?;
        let template = Template::decode(node, self.catalog)?;
        debug!(
            %format,
            parameters = template.parameters.len(),
            conditions = template.conditions.len(),
            resources = template.resources.len(),
            specialized = template.resources.values().filter(|r| r.is_specialized()).count(),
            outputs = template.outputs.len(),
            "loaded template"
        );
        Ok(template)
    }
}

/// Entries of a top-level section; a missing or null section is empty.
fn section(sections: &mut Fields, key: &'static str) -> Result<IndexMap<String, Node>> {
    Ok(sections.mapping(key)?.unwrap_or_default())
}

fn decode_mapping(node: Node) -> Result<Mapping> {
    let entries = match node {
        Node::Mapping(entries) => entries,
        other => return Err(Error::type_mismatch("mapping", other.kind())),
    };
    let mut mapping = Mapping::with_capacity(entries.len());
    for (key, node) in entries {
        let values = match node {
            Node::Mapping(values) => codec::decode_entries(values, Scope::Template),
            other => Err(Error::type_mismatch("mapping", other.kind())),
        };
        mapping.insert(key.clone(), values.map_err(|err| err.within(key))?);
    }
    Ok(mapping)
}

fn mapping_value(mapping: &Mapping) -> Value {
    let entries: IndexMap<String, Value> = mapping
        .iter()
        .map(|(key, values)| (key.clone(), Value::from(values.clone())))
        .collect();
    Value::from(entries)
}

fn decode_transform(node: Node) -> Result<Transform> {
    match node {
        Node::String(name) => Ok(Transform::Single(name)),
        Node::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Node::String(name) => Ok(name),
                other => Err(Error::type_mismatch("string", other.kind()).at_index(i)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Transform::Multiple),
        other => Err(Error::type_mismatch("string or list of strings", other.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{s3, sqs};
    use serde_json::json;

    fn load_json(value: serde_json::Value) -> Result<Template> {
        Template::from_json(&value.to_string())
    }

    fn dump_json(template: &Template) -> serde_json::Value {
        serde_json::from_str(&template.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_new_template_has_format_version() {
        let template = Template::new();
        assert_eq!(template.format_version.as_deref(), Some("2010-09-09"));
        assert_eq!(dump_json(&template), json!({"AWSTemplateFormatVersion": "2010-09-09"}));
        assert_eq!(Template::default().format_version, None);
    }

    #[test]
    fn test_sections_are_emitted_in_canonical_order() {
        let template = load_json(json!({
            "Outputs": {"Out": {"Value": "x"}},
            "Resources": {"Thing": {"Type": "AWS::Foo::Bar"}},
            "Conditions": {"IsProd": {"Fn::Equals": [{"Ref": "Env"}, "prod"]}},
            "Parameters": {"Env": {"Type": "String"}},
            "Description": "demo",
            "AWSTemplateFormatVersion": "2010-09-09"
        }))
        .unwrap();
        let dumped = dump_json(&template);
        let keys: Vec<&String> = dumped.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec![
                "AWSTemplateFormatVersion",
                "Description",
                "Parameters",
                "Conditions",
                "Resources",
                "Outputs"
            ]
        );
    }

    #[test]
    fn test_resource_order_is_preserved() {
        let template = load_json(json!({
            "Resources": {
                "Zeta": {"Type": "AWS::Foo::Bar"},
                "Alpha": {"Type": "AWS::Foo::Bar"},
                "Mid": {"Type": "AWS::Foo::Bar"}
            }
        }))
        .unwrap();
        let ids: Vec<&String> = template.resources.keys().collect();
        assert_eq!(ids, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_unknown_section() {
        let err = load_json(json!({"Resourcez": {}})).unwrap_err();
        assert!(matches!(
            err,
            Error::Structure { kind: StructureErrorKind::UnknownSection(ref name), .. } if name == "Resourcez"
        ));
    }

    #[test]
    fn test_rules_round_trip() {
        let template = Template::from_yaml(
            r#"
Parameters:
  Env:
    Type: String
Rules:
  ProdInstanceType:
    RuleCondition: !Equals [!Ref Env, prod]
    Assertions:
      - Assert:
          Fn::Contains: [[a1.large], !Ref Env]
        AssertDescription: prod runs on a1.large
  SubnetsInVpc:
    Assertions:
      - Assert: !EachMemberIn [!ValueOfAll ['AWS::EC2::Subnet::Id', VpcId], !RefAll 'AWS::EC2::VPC::Id']
Resources:
  Queue:
    Type: AWS::SQS::Queue
"#,
        )
        .unwrap();
        assert_eq!(template.rules.len(), 2);

        let json = dump_json(&template);
        assert_eq!(
            json["Rules"]["ProdInstanceType"],
            json!({
                "RuleCondition": {"Fn::Equals": [{"Ref": "Env"}, "prod"]},
                "Assertions": [{
                    "Assert": {"Fn::Contains": [["a1.large"], {"Ref": "Env"}]},
                    "AssertDescription": "prod runs on a1.large"
                }]
            })
        );
        assert_eq!(
            json["Rules"]["SubnetsInVpc"]["Assertions"][0]["Assert"],
            json!({"Fn::EachMemberIn": [
                {"Fn::ValueOfAll": ["AWS::EC2::Subnet::Id", "VpcId"]},
                {"Fn::RefAll": "AWS::EC2::VPC::Id"}
            ]})
        );

        for format in [Format::Json, Format::Yaml] {
            let reloaded = Loader::new().format(format).load(&template.dump(format).unwrap()).unwrap();
            assert_eq!(reloaded, template);
        }
    }

    #[test]
    fn test_rule_functions_outside_rules_fail() {
        let err = load_json(json!({
            "Conditions": {"Odd": {"Fn::Contains": [["a"], "a"]}}
        }))
        .unwrap_err();
        assert!(err.is_unknown_intrinsic());
        assert_eq!(err.path().unwrap().to_string(), "Conditions.Odd.Fn::Contains");
    }

    #[test]
    fn test_globals_and_hooks_are_kept() {
        let template = load_json(json!({
            "Transform": ["AWS::Serverless-2016-10-31", "AWS::CodeDeployBlueGreen"],
            "Globals": {"Function": {"Timeout": 30, "Environment": {"Variables": {"STAGE": {"Ref": "Env"}}}}},
            "Hooks": {"CodeDeployBlueGreenHook": {"Type": "AWS::CodeDeploy::BlueGreen", "Properties": {}}},
            "Resources": {"Thing": {"Type": "AWS::Foo::Bar"}}
        }))
        .unwrap();
        assert!(template.globals.is_some());
        assert!(template.hooks.is_some());

        let json = dump_json(&template);
        assert_eq!(
            json["Globals"]["Function"]["Environment"]["Variables"]["STAGE"],
            json!({"Ref": "Env"})
        );
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Transform", "Globals", "Hooks", "Resources"]);
    }

    #[test]
    fn test_template_metadata_is_passed_through() {
        let metadata = json!({
            "AWS::CloudFormation::Interface": {"ParameterGroups": []},
            "Tool": {"Fn::Nope": {"Condition": "x"}}
        });
        let template = load_json(json!({"Metadata": metadata.clone()})).unwrap();
        assert_eq!(dump_json(&template)["Metadata"], metadata);
    }

    #[test]
    fn test_output_named_resources_has_no_logical_id() {
        let err = load_json(json!({
            "Outputs": {"Resources": {"Value": {"Fn::Nope": 1}}}
        }))
        .unwrap_err();
        assert!(err.is_unknown_intrinsic());
        assert_eq!(
            err.path().unwrap().to_string(),
            "Outputs.Resources.Value.Fn::Nope"
        );
        assert_eq!(err.logical_id(), None);
    }

    #[test]
    fn test_nesting_up_to_parser_limit() {
        fn nested(depth: usize) -> serde_json::Value {
            (0..depth).fold(json!("leaf"), |inner, _| json!([inner]))
        }
        let document = |depth| {
            json!({"Resources": {"Deep": {"Type": "AWS::Foo::Bar", "Properties": {"Tree": nested(depth)}}}})
        };

        let template = load_json(document(100)).unwrap();
        let reloaded = Template::from_yaml(&template.to_yaml().unwrap()).unwrap();
        assert_eq!(reloaded, template);

        assert!(load_json(document(200)).unwrap_err().is_syntax());
    }

    #[test]
    fn test_null_sections_are_empty() {
        let template = Template::from_yaml("Parameters:\nResources:\n").unwrap();
        assert!(template.parameters.is_empty());
        assert!(template.resources.is_empty());
    }

    #[test]
    fn test_mappings_three_levels() {
        let template = load_json(json!({
            "Mappings": {
                "RegionMap": {
                    "us-east-1": {"Ami": "ami-1", "Size": 2},
                    "eu-west-1": {"Ami": "ami-2", "Size": 3}
                }
            }
        }))
        .unwrap();
        assert_eq!(
            template.mappings["RegionMap"]["eu-west-1"]["Ami"],
            Value::string("ami-2")
        );
        assert_eq!(
            dump_json(&template)["Mappings"]["RegionMap"]["us-east-1"],
            json!({"Ami": "ami-1", "Size": 2})
        );
    }

    #[test]
    fn test_mapping_second_level_must_be_mapping() {
        let err = load_json(json!({"Mappings": {"RegionMap": {"us-east-1": "ami-1"}}})).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "Mappings.RegionMap.us-east-1");
    }

    #[test]
    fn test_transform_forms() {
        let single = load_json(json!({"Transform": "AWS::Serverless-2016-10-31"})).unwrap();
        assert_eq!(
            single.transform,
            Some(Transform::Single("AWS::Serverless-2016-10-31".into()))
        );
        let multiple = load_json(json!({"Transform": ["A", "B"]})).unwrap();
        assert_eq!(multiple.transform.as_ref().unwrap().names(), vec!["A", "B"]);
        assert_eq!(dump_json(&multiple)["Transform"], json!(["A", "B"]));

        let err = load_json(json!({"Transform": {"Name": "A"}})).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "Transform");
    }

    #[test]
    fn test_parameter_fields() {
        let template = load_json(json!({
            "Parameters": {
                "Size": {
                    "Type": "Number",
                    "Default": 3,
                    "MinValue": 1,
                    "AllowedValues": [1, 3, 5],
                    "NoEcho": true
                }
            }
        }))
        .unwrap();
        let size = &template.parameters["Size"];
        assert_eq!(size.parameter_type, "Number");
        assert_eq!(size.default, Some(Value::from(3)));
        assert_eq!(size.no_echo, Some(Value::from(true)));

        let err = load_json(json!({"Parameters": {"Size": {"Default": 3}}})).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "Parameters.Size");

        let err = load_json(json!({"Parameters": {"Size": {"Type": "Number", "Deflaut": 3}}}))
            .unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "Parameters.Size.Deflaut");
    }

    #[test]
    fn test_output_export() {
        let template = load_json(json!({
            "Outputs": {
                "QueueArn": {
                    "Description": "queue",
                    "Value": {"Fn::GetAtt": ["Q", "Arn"]},
                    "Export": {"Name": {"Fn::Sub": "${AWS::StackName}-QueueArn"}}
                }
            }
        }))
        .unwrap();
        let output = &template.outputs["QueueArn"];
        assert_eq!(output.value, Value::get_att("Q", "Arn"));
        assert_eq!(
            output.export_name,
            Some(Value::sub("${AWS::StackName}-QueueArn"))
        );
        assert_eq!(
            dump_json(&template)["Outputs"]["QueueArn"]["Export"],
            json!({"Name": {"Fn::Sub": "${AWS::StackName}-QueueArn"}})
        );

        let err = load_json(json!({"Outputs": {"X": {"Value": 1, "Export": {}}}})).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "Outputs.X.Export");
    }

    #[test]
    fn test_malformed_resource_aborts_load_with_logical_id() {
        let err = load_json(json!({
            "Resources": {
                "Good": {"Type": "AWS::Foo::Bar"},
                "Bad": {"Type": "AWS::Foo::Bar", "Properties": {"X": {"Fn::Nope": 1}}}
            }
        }))
        .unwrap_err();
        assert!(err.is_unknown_intrinsic());
        assert_eq!(err.logical_id(), Some("Bad"));
        assert_eq!(err.path().unwrap().to_string(), "Resources.Bad.Properties.X.Fn::Nope");
    }

    #[test]
    fn test_lookup_primitives() {
        let template = load_json(json!({
            "Resources": {
                "Bucket1": {"Type": "AWS::S3::Bucket"},
                "Queue1": {"Type": "AWS::SQS::Queue"},
                "Queue2": {"Type": "AWS::SQS::Queue"}
            }
        }))
        .unwrap();

        let queues = template.resources_of::<sqs::Queue>();
        assert_eq!(queues.keys().copied().collect::<Vec<_>>(), vec!["Queue1", "Queue2"]);

        assert!(template.resource_with_name::<s3::Bucket>("Bucket1").is_ok());
        let err = template.resource_with_name::<sqs::Queue>("Bucket1").unwrap_err();
        assert_eq!(
            err,
            LookupError::TypeMismatch {
                logical_id: "Bucket1".into(),
                expected: "AWS::SQS::Queue",
                found: "AWS::S3::Bucket".into(),
            }
        );
        assert!(template
            .resource_with_name::<sqs::Queue>("Missing")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_resource_with_name_mut() {
        let mut template = Template::new();
        template
            .add_resource("Q", Resource::typed(sqs::Queue::default()))
            .unwrap();
        template
            .resource_with_name_mut::<sqs::Queue>("Q")
            .unwrap()
            .visibility_timeout = Some(Value::from(60));
        assert_eq!(
            dump_json(&template)["Resources"]["Q"]["Properties"],
            json!({"VisibilityTimeout": 60})
        );
    }

    #[test]
    fn test_custom_resources() {
        let template = load_json(json!({
            "Resources": {
                "Seed": {"Type": "Custom::Seeder"},
                "Bucket": {"Type": "AWS::S3::Bucket"},
                "Hook": {"Type": "AWS::CloudFormation::CustomResource"}
            }
        }))
        .unwrap();
        let custom = template.custom_resources();
        assert_eq!(custom.keys().copied().collect::<Vec<_>>(), vec!["Seed", "Hook"]);
    }

    #[test]
    fn test_add_resource_refuses_duplicates() {
        let mut template = Template::new();
        template.add_resource("A", Resource::new("AWS::Foo::Bar")).unwrap();
        let err = template
            .add_resource("A", Resource::new("AWS::Foo::Bar"))
            .unwrap_err();
        assert_eq!(err, LookupError::AlreadyExists("A".into()));
    }

    #[test]
    fn test_rename_resource_keeps_position_and_rewrites_references() {
        let mut template = load_json(json!({
            "Resources": {
                "First": {"Type": "AWS::Foo::Bar"},
                "OldQueue": {"Type": "AWS::SQS::Queue"},
                "Last": {
                    "Type": "AWS::Foo::Bar",
                    "DependsOn": "OldQueue",
                    "Properties": {"Url": {"Ref": "OldQueue"}}
                }
            },
            "Outputs": {"Arn": {"Value": {"Fn::GetAtt": ["OldQueue", "Arn"]}}}
        }))
        .unwrap();

        template.rename_resource("OldQueue", "NewQueue").unwrap();

        let ids: Vec<&String> = template.resources.keys().collect();
        assert_eq!(ids, vec!["First", "NewQueue", "Last"]);
        let last = &template.resources["Last"];
        assert_eq!(last.depends_on, vec!["NewQueue"]);
        assert_eq!(last.properties()["Url"], Value::reference("NewQueue"));
        assert_eq!(template.outputs["Arn"].value, Value::get_att("NewQueue", "Arn"));
    }

    #[test]
    fn test_rename_resource_errors() {
        let mut template = Template::new();
        template.add_resource("A", Resource::new("AWS::Foo::Bar")).unwrap();
        template.add_resource("B", Resource::new("AWS::Foo::Bar")).unwrap();
        assert!(template.rename_resource("Nope", "C").unwrap_err().is_not_found());
        assert_eq!(
            template.rename_resource("A", "B").unwrap_err(),
            LookupError::AlreadyExists("B".into())
        );
    }

    #[test]
    fn test_custom_catalog_leaves_everything_generic() {
        let catalog = Catalog::new();
        let template = Loader::with_catalog(&catalog)
            .load_str(r#"{"Resources": {"Q": {"Type": "AWS::SQS::Queue", "Properties": {"QueueName": "q"}}}}"#)
            .unwrap();
        assert!(!template.resources["Q"].is_specialized());
        assert!(template
            .resource_with_name::<sqs::Queue>("Q")
            .unwrap_err()
            .is_type_mismatch());
    }

    #[test]
    fn test_syntax_errors_surface_unchanged() {
        assert!(Template::from_json("{\"Resources\": ").unwrap_err().is_syntax());
        assert!(Template::from_yaml("Resources: [").unwrap_err().is_syntax());
    }

    #[test]
    fn test_compact_json_is_single_line() {
        let mut template = Template::new();
        template.add_resource("A", Resource::new("AWS::Foo::Bar")).unwrap();
        let compact = template.to_json_compact().unwrap();
        assert!(!compact.contains('\n'));
        assert_eq!(
            compact,
            r#"{"AWSTemplateFormatVersion":"2010-09-09","Resources":{"A":{"Type":"AWS::Foo::Bar"}}}"#
        );
    }
}
