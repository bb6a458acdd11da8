//! The intrinsic-aware value model.
//!
//! Every property value in a template is either a literal (which may nest
//! further values) or a call to one of the built-in functions.

use indexmap::IndexMap;

use crate::intrinsics::{pseudo, FunctionName};

/// Ordered name to value mapping.
pub type ValueMap = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal(Literal),
    Call(FunctionName, Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
    Sequence(Vec<Value>),
    Mapping(ValueMap),
}

impl Value {
    pub fn null() -> Value {
        Value::Literal(Literal::Null)
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::Literal(Literal::String(s.into()))
    }

    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Literal(Literal::Sequence(items.into_iter().collect()))
    }

    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Literal(Literal::Mapping(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn call(function: FunctionName, args: Vec<Value>) -> Value {
        Value::Call(function, args)
    }

    /// `{"Ref": name}`
    pub fn reference(name: impl Into<String>) -> Value {
        Value::Call(FunctionName::Ref, vec![Value::string(name)])
    }

    /// `{"Fn::GetAtt": [logical_id, attribute]}`
    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<Value>) -> Value {
        Value::Call(
            FunctionName::GetAtt,
            vec![Value::string(logical_id), attribute.into()],
        )
    }

    /// `{"Fn::Join": [delimiter, [values...]]}`
    pub fn join(delimiter: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Value {
        Value::Call(
            FunctionName::Join,
            vec![Value::string(delimiter), Value::sequence(values)],
        )
    }

    /// `{"Fn::Sub": template}`
    pub fn sub(template: impl Into<String>) -> Value {
        Value::Call(FunctionName::Sub, vec![Value::string(template)])
    }

    /// `{"Fn::Sub": [template, {name: value, ...}]}`
    pub fn sub_with<K: Into<String>>(
        template: impl Into<String>,
        variables: impl IntoIterator<Item = (K, Value)>,
    ) -> Value {
        Value::Call(
            FunctionName::Sub,
            vec![Value::string(template), Value::mapping(variables)],
        )
    }

    pub fn select(index: impl Into<Value>, list: impl Into<Value>) -> Value {
        Value::Call(FunctionName::Select, vec![index.into(), list.into()])
    }

    pub fn split(delimiter: impl Into<String>, source: impl Into<Value>) -> Value {
        Value::Call(
            FunctionName::Split,
            vec![Value::string(delimiter), source.into()],
        )
    }

    pub fn find_in_map(
        map_name: impl Into<Value>,
        top_level_key: impl Into<Value>,
        second_level_key: impl Into<Value>,
    ) -> Value {
        Value::Call(
            FunctionName::FindInMap,
            vec![
                map_name.into(),
                top_level_key.into(),
                second_level_key.into(),
            ],
        )
    }

    pub fn import_value(name: impl Into<Value>) -> Value {
        Value::Call(FunctionName::ImportValue, vec![name.into()])
    }

    /// `{"Fn::If": [condition, value_if_true, value_if_false]}`
    pub fn if_(
        condition: impl Into<String>,
        value_if_true: impl Into<Value>,
        value_if_false: impl Into<Value>,
    ) -> Value {
        Value::Call(
            FunctionName::If,
            vec![
                Value::string(condition),
                value_if_true.into(),
                value_if_false.into(),
            ],
        )
    }

    pub fn not(condition: Value) -> Value {
        Value::Call(FunctionName::Not, vec![condition])
    }

    pub fn and(conditions: impl IntoIterator<Item = Value>) -> Value {
        Value::Call(FunctionName::And, conditions.into_iter().collect())
    }

    pub fn or(conditions: impl IntoIterator<Item = Value>) -> Value {
        Value::Call(FunctionName::Or, conditions.into_iter().collect())
    }

    pub fn equals(left: impl Into<Value>, right: impl Into<Value>) -> Value {
        Value::Call(FunctionName::Equals, vec![left.into(), right.into()])
    }

    pub fn base64(value: impl Into<Value>) -> Value {
        Value::Call(FunctionName::Base64, vec![value.into()])
    }

    pub fn cidr(
        ip_block: impl Into<Value>,
        count: impl Into<Value>,
        cidr_bits: impl Into<Value>,
    ) -> Value {
        Value::Call(
            FunctionName::Cidr,
            vec![ip_block.into(), count.into(), cidr_bits.into()],
        )
    }

    pub fn get_azs(region: impl Into<Value>) -> Value {
        Value::Call(FunctionName::GetAZs, vec![region.into()])
    }

    /// `{"Condition": name}`, a reference to a named condition.
    pub fn condition(name: impl Into<String>) -> Value {
        Value::Call(FunctionName::Condition, vec![Value::string(name)])
    }

    /// `{"Fn::Transform": {"Name": name, "Parameters": {...}}}`
    pub fn transform<K: Into<String>>(
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = (K, Value)>,
    ) -> Value {
        Value::Call(
            FunctionName::Transform,
            vec![Value::mapping([
                ("Name", Value::string(name)),
                ("Parameters", Value::mapping(parameters)),
            ])],
        )
    }

    // Rule functions, valid only inside the Rules section.

    pub fn contains(list: impl Into<Value>, value: impl Into<Value>) -> Value {
        Value::Call(FunctionName::Contains, vec![list.into(), value.into()])
    }

    pub fn each_member_equals(list: impl Into<Value>, value: impl Into<Value>) -> Value {
        Value::Call(FunctionName::EachMemberEquals, vec![list.into(), value.into()])
    }

    pub fn each_member_in(list: impl Into<Value>, allowed: impl Into<Value>) -> Value {
        Value::Call(FunctionName::EachMemberIn, vec![list.into(), allowed.into()])
    }

    pub fn ref_all(parameter_type: impl Into<String>) -> Value {
        Value::Call(FunctionName::RefAll, vec![Value::string(parameter_type)])
    }

    pub fn value_of(parameter: impl Into<Value>, attribute: impl Into<Value>) -> Value {
        Value::Call(FunctionName::ValueOf, vec![parameter.into(), attribute.into()])
    }

    pub fn value_of_all(parameter_type: impl Into<String>, attribute: impl Into<String>) -> Value {
        Value::Call(
            FunctionName::ValueOfAll,
            vec![Value::string(parameter_type), Value::string(attribute)],
        )
    }

    pub fn account_id() -> Value {
        Value::reference(pseudo::ACCOUNT_ID)
    }

    pub fn notification_arns() -> Value {
        Value::reference(pseudo::NOTIFICATION_ARNS)
    }

    /// `{"Ref": "AWS::NoValue"}`, removes the property it is assigned to.
    pub fn no_value() -> Value {
        Value::reference(pseudo::NO_VALUE)
    }

    pub fn partition() -> Value {
        Value::reference(pseudo::PARTITION)
    }

    pub fn region() -> Value {
        Value::reference(pseudo::REGION)
    }

    pub fn stack_id() -> Value {
        Value::reference(pseudo::STACK_ID)
    }

    pub fn stack_name() -> Value {
        Value::reference(pseudo::STACK_NAME)
    }

    pub fn url_suffix() -> Value {
        Value::reference(pseudo::URL_SUFFIX)
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Value::Call(..))
    }

    pub fn function(&self) -> Option<FunctionName> {
        match self {
            Value::Call(function, _) => Some(*function),
            Value::Literal(_) => None,
        }
    }

    pub fn as_call(&self) -> Option<(FunctionName, &[Value])> {
        match self {
            Value::Call(function, args) => Some((*function, args.as_slice())),
            Value::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal(literal) => Some(literal),
            Value::Call(..) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Literal(Literal::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&serde_json::Number> {
        match self {
            Value::Literal(Literal::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Literal(Literal::Sequence(items)) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&ValueMap> {
        match self {
            Value::Literal(Literal::Mapping(map)) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            Value::Literal(Literal::Mapping(map)) => Some(map),
            _ => None,
        }
    }

    /// Entry of a literal mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Short description of the value shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Call(..) => "intrinsic function",
            Value::Literal(Literal::String(_)) => "string",
            Value::Literal(Literal::Number(_)) => "number",
            Value::Literal(Literal::Bool(_)) => "boolean",
            Value::Literal(Literal::Null) => "null",
            Value::Literal(Literal::Sequence(_)) => "sequence",
            Value::Literal(Literal::Mapping(_)) => "mapping",
        }
    }

    /// Immediate child values: call arguments, sequence items or mapping values.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Value::Call(_, args) => Box::new(args.iter()),
            Value::Literal(Literal::Sequence(items)) => Box::new(items.iter()),
            Value::Literal(Literal::Mapping(map)) => Box::new(map.values()),
            Value::Literal(_) => Box::new(std::iter::empty()),
        }
    }

    /// Visit this value and every value nested inside it, parents first.
    pub fn walk<F: FnMut(&Value)>(&self, f: &mut F) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Mutable counterpart of [`Value::walk`]. Children are visited after
    /// `f` has run on their parent, so replacements are descended into.
    pub fn walk_mut<F: FnMut(&mut Value)>(&mut self, f: &mut F) {
        f(self);
        match self {
            Value::Call(_, items) | Value::Literal(Literal::Sequence(items)) => {
                for item in items {
                    item.walk_mut(f);
                }
            }
            Value::Literal(Literal::Mapping(map)) => {
                for value in map.values_mut() {
                    value.walk_mut(f);
                }
            }
            Value::Literal(_) => {}
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        Value::Literal(literal)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Literal(Literal::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Literal(Literal::Number(n.into()))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Literal(Literal::Number(n.into()))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Literal(Literal::Number(n.into()))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Literal(Literal::Number(n.into()))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Literal(Literal::Sequence(items))
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Literal(Literal::Mapping(map))
    }
}
