//! Transcoding between [`Node`] and [`Value`].
//!
//! Decoding folds both spellings of a function call, the single-key long form
//! and the YAML short tag, into one [`Value::Call`]. Encoding always emits the
//! long form. Argument contracts are checked in both directions by
//! [`check_args`].

use indexmap::IndexMap;

use crate::errors::{Error, Result, StructureErrorKind};
use crate::intrinsics::{FunctionName, FN_PREFIX};
use crate::node::Node;
use crate::value::{Literal, Value, ValueMap};

/// Where in a template a value sits, which decides the functions it may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Properties, conditions, outputs: rule functions are unknown here.
    #[default]
    Template,
    /// Rule conditions and assertions, which add `Fn::Contains` and friends.
    Rules,
    /// Metadata and tool-specific sections. Well-formed calls are recognised,
    /// anything else is kept as a literal.
    Opaque,
}

impl Scope {
    fn allows(self, function: FunctionName) -> bool {
        self != Scope::Template || !function.is_rule_function()
    }

    fn function_for_key(self, key: &str) -> Result<Option<FunctionName>> {
        match FunctionName::from_key(key) {
            Ok(Some(function)) if !self.allows(function) => Err(Error::unknown_intrinsic(key)),
            Err(_) if self == Scope::Opaque => Ok(None),
            resolved => resolved,
        }
    }

    fn function_for_tag(self, tag: &str) -> Result<FunctionName> {
        match FunctionName::from_tag(tag) {
            Ok(function) if !self.allows(function) => {
                Err(Error::unknown_intrinsic(format!("!{}", tag)))
            }
            resolved => resolved,
        }
    }
}

/// Decode a node, recognising intrinsic functions at any depth.
pub fn decode(node: Node) -> Result<Value> {
    decode_in(node, Scope::Template)
}

pub fn decode_in(node: Node, scope: Scope) -> Result<Value> {
    match node {
        Node::Null => Ok(Value::Literal(Literal::Null)),
        Node::Bool(b) => Ok(Value::Literal(Literal::Bool(b))),
        Node::Number(n) => Ok(Value::Literal(Literal::Number(n))),
        Node::String(s) => Ok(Value::Literal(Literal::String(s))),
        Node::Sequence(items) => Ok(Value::Literal(Literal::Sequence(decode_items(items, scope)?))),
        Node::Mapping(map) => decode_mapping(map, scope),
        Node::Tagged(tag, inner) => decode_tagged(&tag, *inner, scope),
    }
}

fn decode_items(items: Vec<Node>, scope: Scope) -> Result<Vec<Value>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| decode_in(item, scope).map_err(|err| err.at_index(i)))
        .collect()
}

fn decode_mapping(mut map: IndexMap<String, Node>, scope: Scope) -> Result<Value> {
    // Only a mapping with exactly one key can be a call; `{"Ref": x, "Other": 1}`
    // is an ordinary mapping that happens to have a `Ref` property.
    if map.len() == 1 {
        if let Some((key, arg)) = map.pop() {
            let function = scope
                .function_for_key(&key)
                .map_err(|err| err.within(key.as_str()))?;
            match function {
                Some(function) if scope == Scope::Opaque => {
                    if let Ok(call) = decode_call(function, arg.clone(), scope) {
                        return Ok(call);
                    }
                    map.insert(key, arg);
                }
                Some(function) => {
                    return decode_call(function, arg, scope).map_err(|err| err.within(key))
                }
                None => {
                    map.insert(key, arg);
                }
            }
        }
    }

    Ok(Value::Literal(Literal::Mapping(decode_entries(map, scope)?)))
}

fn decode_tagged(tag: &str, inner: Node, scope: Scope) -> Result<Value> {
    // YAML core tags (`!!str`, `tag:yaml.org,2002:int`) carry no function.
    if tag.starts_with('!') || tag.starts_with("tag:") {
        return decode_in(inner, scope);
    }
    if scope == Scope::Opaque {
        // Keep what cannot be a call as its long-form spelling.
        let key = match FunctionName::from_tag(tag) {
            Ok(function) => match decode_call(function, inner.clone(), scope) {
                Ok(call) => return Ok(call),
                Err(_) => function.key().to_string(),
            },
            Err(_) => format!("{}{}", FN_PREFIX, tag),
        };
        let value = decode_in(inner, scope)?;
        return Ok(Value::Literal(Literal::Mapping(ValueMap::from([(key, value)]))));
    }
    let function = scope.function_for_tag(tag)?;
    decode_call(function, inner, scope).map_err(|err| err.within(format!("!{}", tag)))
}

/// Decode the argument of a recognised function into its argument list.
fn decode_call(function: FunctionName, arg: Node, scope: Scope) -> Result<Value> {
    let args = match (function, arg) {
        // `Resource.Attribute` shorthand, split at the first dot so nested
        // attributes such as `Endpoint.Address` stay whole.
        (FunctionName::GetAtt, Node::String(dotted)) => match dotted.split_once('.') {
            Some((logical_id, attribute)) if !logical_id.is_empty() && !attribute.is_empty() => {
                vec![Value::string(logical_id), Value::string(attribute)]
            }
            _ => {
                return Err(Error::arity(
                    function,
                    format!("expects `LogicalId.Attribute`, found `{}`", dotted),
                ))
            }
        },
        (function, Node::Sequence(items)) if !function.takes_scalar() => decode_items(items, scope)?,
        (FunctionName::Sub, arg @ Node::String(_)) => vec![decode_in(arg, scope)?],
        (function, arg) if function.takes_scalar() => vec![decode_in(arg, scope)?],
        (function, arg) => {
            return Err(Error::arity(
                function,
                format!("expects a list of arguments, found {}", arg.kind()),
            ))
        }
    };
    check_args(function, &args)?;
    Ok(Value::Call(function, args))
}

/// Validate argument count and argument shapes against a function's contract.
pub fn check_args(function: FunctionName, args: &[Value]) -> Result<()> {
    use FunctionName::*;

    match function {
        Ref | Condition => {
            expect_count(function, args, 1, 1)?;
            expect_string(function, args, 0)
        }
        Base64 | ImportValue | GetAZs => {
            expect_count(function, args, 1, 1)?;
            expect_scalar_or_call(function, args, 0)
        }
        Transform => {
            expect_count(function, args, 1, 1)?;
            match &args[0] {
                Value::Literal(Literal::Mapping(_)) => Ok(()),
                other => Err(arg_error(function, 0, "a mapping", other)),
            }
        }
        Sub => {
            expect_count(function, args, 1, 2)?;
            expect_string(function, args, 0)?;
            match args.get(1) {
                None | Some(Value::Literal(Literal::Mapping(_))) => Ok(()),
                Some(other) => Err(arg_error(function, 1, "a mapping of variables", other)),
            }
        }
        GetAtt => {
            expect_count(function, args, 2, 2)?;
            expect_string(function, args, 0)?;
            match &args[1] {
                Value::Literal(Literal::String(_)) | Value::Call(..) => Ok(()),
                other => Err(arg_error(function, 1, "a string or function", other)),
            }
        }
        Join => {
            expect_count(function, args, 2, 2)?;
            expect_string(function, args, 0)?;
            expect_list_or_call(function, args, 1)
        }
        Split => {
            expect_count(function, args, 2, 2)?;
            expect_string(function, args, 0)?;
            expect_scalar_or_call(function, args, 1)
        }
        Select => {
            expect_count(function, args, 2, 2)?;
            expect_scalar_or_call(function, args, 0)?;
            expect_list_or_call(function, args, 1)
        }
        FindInMap => {
            expect_count(function, args, 3, 3)?;
            (0..3).try_for_each(|i| expect_scalar_or_call(function, args, i))
        }
        If => {
            expect_count(function, args, 3, 3)?;
            expect_string(function, args, 0)
        }
        Not => expect_count(function, args, 1, 1),
        And | Or => expect_count(function, args, 2, 10),
        Equals => expect_count(function, args, 2, 2),
        Cidr => {
            expect_count(function, args, 3, 3)?;
            (0..3).try_for_each(|i| expect_scalar_or_call(function, args, i))
        }
        RefAll => {
            expect_count(function, args, 1, 1)?;
            expect_string(function, args, 0)
        }
        Contains | EachMemberEquals => {
            expect_count(function, args, 2, 2)?;
            expect_list_or_call(function, args, 0)?;
            expect_scalar_or_call(function, args, 1)
        }
        EachMemberIn => {
            expect_count(function, args, 2, 2)?;
            expect_list_or_call(function, args, 0)?;
            expect_list_or_call(function, args, 1)
        }
        ValueOf => {
            expect_count(function, args, 2, 2)?;
            (0..2).try_for_each(|i| expect_scalar_or_call(function, args, i))
        }
        ValueOfAll => {
            expect_count(function, args, 2, 2)?;
            expect_string(function, args, 0)?;
            expect_string(function, args, 1)
        }
    }
}

fn expect_count(function: FunctionName, args: &[Value], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = match (min, max) {
        (1, 1) => "exactly 1 argument".to_string(),
        (min, max) if min == max => format!("exactly {} arguments", min),
        (min, max) => format!("between {} and {} arguments", min, max),
    };
    Err(Error::arity(
        function,
        format!("expects {}, found {}", expected, args.len()),
    ))
}

fn expect_string(function: FunctionName, args: &[Value], index: usize) -> Result<()> {
    match &args[index] {
        Value::Literal(Literal::String(_)) => Ok(()),
        other => Err(arg_error(function, index, "a string", other)),
    }
}

fn expect_scalar_or_call(function: FunctionName, args: &[Value], index: usize) -> Result<()> {
    match &args[index] {
        Value::Literal(Literal::Sequence(_) | Literal::Mapping(_)) => Err(arg_error(
            function,
            index,
            "a scalar or function",
            &args[index],
        )),
        _ => Ok(()),
    }
}

fn expect_list_or_call(function: FunctionName, args: &[Value], index: usize) -> Result<()> {
    match &args[index] {
        Value::Literal(Literal::Sequence(_)) | Value::Call(..) => Ok(()),
        other => Err(arg_error(function, index, "a list or function", other)),
    }
}

fn arg_error(function: FunctionName, index: usize, expected: &str, found: &Value) -> Error {
    Error::arity(
        function,
        format!(
            "argument {} must be {}, found {}",
            index + 1,
            expected,
            found.kind()
        ),
    )
}

/// Encode a value in canonical long form.
pub fn encode(value: &Value) -> Result<Node> {
    encode_in(value, Scope::Template)
}

pub fn encode_in(value: &Value, scope: Scope) -> Result<Node> {
    match value {
        Value::Literal(Literal::Null) => Ok(Node::Null),
        Value::Literal(Literal::Bool(b)) => Ok(Node::Bool(*b)),
        Value::Literal(Literal::Number(n)) => Ok(Node::Number(n.clone())),
        Value::Literal(Literal::String(s)) => Ok(Node::String(s.clone())),
        Value::Literal(Literal::Sequence(items)) => {
            Ok(Node::Sequence(encode_items(items, scope)?))
        }
        Value::Literal(Literal::Mapping(map)) => {
            let mut nodes = IndexMap::with_capacity(map.len());
            for (key, value) in map {
                nodes.insert(
                    key.clone(),
                    encode_in(value, scope).map_err(|err| err.within(key.as_str()))?,
                );
            }
            Ok(Node::Mapping(nodes))
        }
        Value::Call(function, args) => {
            let key = function.key();
            if !scope.allows(*function) {
                return Err(Error::unknown_intrinsic(key));
            }
            check_args(*function, args).map_err(|err| err.within(key))?;
            let arg = match (function, args.as_slice()) {
                (FunctionName::Sub, [template]) => encode_in(template, scope)?,
                (function, [arg]) if function.takes_scalar() => encode_in(arg, scope)?,
                (_, args) => Node::Sequence(encode_items(args, scope)?),
            };
            Ok(Node::Mapping(IndexMap::from([(key.to_string(), arg)])))
        }
    }
}

fn encode_items(items: &[Value], scope: Scope) -> Result<Vec<Node>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| encode_in(item, scope).map_err(|err| err.at_index(i)))
        .collect()
}

/// Decode every entry of a literal mapping. Unlike [`decode`], a single
/// `Ref` key is kept as an ordinary entry, but an `Fn::` key this crate does
/// not know still fails unless `scope` is [`Scope::Opaque`].
pub(crate) fn decode_entries(map: IndexMap<String, Node>, scope: Scope) -> Result<ValueMap> {
    let mut values = ValueMap::with_capacity(map.len());
    for (key, node) in map {
        scope
            .function_for_key(&key)
            .map_err(|err| err.within(key.as_str()))?;
        let value = decode_in(node, scope).map_err(|err| err.within(key.as_str()))?;
        values.insert(key, value);
    }
    Ok(values)
}

/// Keyed access to a fixed-shape mapping (a resource, a parameter, an
/// output) that tracks which keys were consumed.
pub(crate) struct Fields {
    map: IndexMap<String, Node>,
}

impl Fields {
    pub(crate) fn new(node: Node) -> Result<Fields> {
        match node {
            Node::Mapping(map) => Ok(Fields { map }),
            other => Err(Error::type_mismatch("mapping", other.kind())),
        }
    }

    pub(crate) fn take(&mut self, key: &str) -> Option<Node> {
        self.map.shift_remove(key)
    }

    pub(crate) fn string(&mut self, key: &'static str) -> Result<Option<String>> {
        match self.take(key) {
            None => Ok(None),
            Some(Node::String(s)) => Ok(Some(s)),
            Some(other) => Err(Error::type_mismatch("string", other.kind()).within(key)),
        }
    }

    pub(crate) fn required_string(&mut self, key: &'static str) -> Result<String> {
        self.string(key)?
            .ok_or_else(|| Error::structure(StructureErrorKind::MissingKey(key)))
    }

    pub(crate) fn value(&mut self, key: &'static str) -> Result<Option<Value>> {
        self.value_in(key, Scope::Template)
    }

    pub(crate) fn value_in(&mut self, key: &'static str, scope: Scope) -> Result<Option<Value>> {
        self.take(key)
            .map(|node| decode_in(node, scope).map_err(|err| err.within(key)))
            .transpose()
    }

    pub(crate) fn required_value(&mut self, key: &'static str) -> Result<Value> {
        self.value(key)?
            .ok_or_else(|| Error::structure(StructureErrorKind::MissingKey(key)))
    }

    /// A nested mapping; an explicit null counts as absent.
    pub(crate) fn mapping(&mut self, key: &'static str) -> Result<Option<IndexMap<String, Node>>> {
        match self.take(key) {
            None | Some(Node::Null) => Ok(None),
            Some(Node::Mapping(map)) => Ok(Some(map)),
            Some(other) => Err(Error::type_mismatch("mapping", other.kind()).within(key)),
        }
    }

    /// Keys nobody asked for.
    pub(crate) fn into_remaining(self) -> IndexMap<String, Node> {
        self.map
    }

    /// Fail on the first unconsumed key.
    pub(crate) fn finish(self) -> Result<()> {
        match self.map.into_iter().next() {
            Some((key, _)) => {
                Err(Error::structure(StructureErrorKind::UnknownKey(key.clone())).within(key))
            }
            None => Ok(()),
        }
    }
}

/// Builds the mapping counterpart of [`Fields`] on encode, skipping unset
/// entries.
#[derive(Default)]
pub(crate) struct FieldsBuilder {
    map: IndexMap<String, Node>,
}

impl FieldsBuilder {
    pub(crate) fn new() -> FieldsBuilder {
        FieldsBuilder::default()
    }

    pub(crate) fn node(&mut self, key: &str, node: Node) -> &mut Self {
        self.map.insert(key.to_string(), node);
        self
    }

    pub(crate) fn string(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.node(key, Node::String(value.to_string()));
        }
        self
    }

    pub(crate) fn value(&mut self, key: &str, value: Option<&Value>) -> Result<&mut Self> {
        self.value_in(key, value, Scope::Template)
    }

    pub(crate) fn value_in(
        &mut self,
        key: &str,
        value: Option<&Value>,
        scope: Scope,
    ) -> Result<&mut Self> {
        if let Some(value) = value {
            let node = encode_in(value, scope).map_err(|err| err.within(key))?;
            self.node(key, node);
        }
        Ok(self)
    }

    pub(crate) fn build(&mut self) -> Node {
        Node::Mapping(std::mem::take(&mut self.map))
    }
}
