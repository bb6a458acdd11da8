//! Format-agnostic document tree.
//!
//! JSON and YAML both parse into [`Node`]; the intrinsic codec only ever sees
//! this shape. YAML short-form tags (`!Ref`, `!Sub`, ...) survive as
//! [`Node::Tagged`] so the codec can fold them into their long form.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::{Error, Result, StructureErrorKind};

/// Wire format of a template document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Guess the format from content: a document whose first meaningful byte
    /// is `{` is JSON, anything else is treated as YAML.
    pub fn detect(bytes: &[u8]) -> Format {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Format::Json,
            _ => Format::Yaml,
        }
    }

    /// Format implied by a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Format> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "JSON"),
            Format::Yaml => write!(f, "YAML"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<Node>),
    Mapping(IndexMap<String, Node>),
    /// A YAML tagged node. The tag is stored without its leading `!`.
    Tagged(String, Box<Node>),
}

impl Node {
    /// Short name of the node shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
            Node::Tagged(..) => "tagged value",
        }
    }

    pub fn parse(bytes: &[u8], format: Format) -> Result<Node> {
        match format {
            Format::Json => Node::parse_json(bytes),
            Format::Yaml => Node::parse_yaml(bytes),
        }
    }

    pub fn parse_json(bytes: &[u8]) -> Result<Node> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Ok(Node::from_json(value))
    }

    pub fn parse_yaml(bytes: &[u8]) -> Result<Node> {
        let value: serde_yml::Value = serde_yml::from_slice(bytes)?;
        Node::from_yaml(value)
    }

    pub fn from_json(value: serde_json::Value) -> Node {
        match value {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(b) => Node::Bool(b),
            serde_json::Value::Number(n) => Node::Number(n),
            serde_json::Value::String(s) => Node::String(s),
            serde_json::Value::Array(items) => {
                Node::Sequence(items.into_iter().map(Node::from_json).collect())
            }
            serde_json::Value::Object(map) => Node::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from_json(value)))
                    .collect(),
            ),
        }
    }

    pub fn from_yaml(value: serde_yml::Value) -> Result<Node> {
        Ok(match value {
            serde_yml::Value::Null => Node::Null,
            serde_yml::Value::Bool(b) => Node::Bool(b),
            serde_yml::Value::Number(n) => Node::Number(yaml_number(&n)?),
            serde_yml::Value::String(s) => Node::String(s),
            serde_yml::Value::Sequence(items) => Node::Sequence(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Node::from_yaml(item).map_err(|err| err.at_index(i)))
                    .collect::<Result<_>>()?,
            ),
            serde_yml::Value::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let key = yaml_key(key)?;
                    let value = Node::from_yaml(value).map_err(|err| err.within(key.as_str()))?;
                    map.insert(key, value);
                }
                Node::Mapping(map)
            }
            serde_yml::Value::Tagged(tagged) => {
                let tag = tagged.tag.to_string();
                let tag = tag.strip_prefix('!').unwrap_or(&tag).to_string();
                Node::Tagged(tag, Box::new(Node::from_yaml(tagged.value)?))
            }
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yml::to_string(self)?)
    }

    pub fn emit(&self, format: Format) -> Result<String> {
        match format {
            Format::Json => self.to_json_pretty(),
            Format::Yaml => self.to_yaml(),
        }
    }
}

fn yaml_number(n: &serde_yml::Number) -> Result<serde_json::Number> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| Error::structure(StructureErrorKind::NonFiniteNumber(n.to_string())))
}

fn yaml_key(key: serde_yml::Value) -> Result<String> {
    match key {
        serde_yml::Value::String(s) => Ok(s),
        serde_yml::Value::Number(n) => Ok(n.to_string()),
        serde_yml::Value::Bool(b) => Ok(b.to_string()),
        serde_yml::Value::Null => Err(Error::structure(StructureErrorKind::InvalidKey("null"))),
        serde_yml::Value::Sequence(_) => {
            Err(Error::structure(StructureErrorKind::InvalidKey("sequence")))
        }
        serde_yml::Value::Mapping(_) => {
            Err(Error::structure(StructureErrorKind::InvalidKey("mapping")))
        }
        serde_yml::Value::Tagged(_) => {
            Err(Error::structure(StructureErrorKind::InvalidKey("tagged value")))
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Sequence(items) => serializer.collect_seq(items),
            Node::Mapping(map) => serializer.collect_map(map),
            Node::Tagged(tag, inner) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(&format!("!{}", tag), inner)?;
                map.end()
            }
        }
    }
}
