//! Property tests: encoding then decoding any well-formed value tree gives
//! the same tree back, in both wire formats.

use cfn_model::codec::{decode, encode};
use cfn_model::{Format, Node, Template, Value};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::null()),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z][a-zA-Z0-9 _-]{0,11}".prop_map(Value::string),
    ]
}

fn logical_id() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9]{0,10}"
}

// Literal mapping keys start lowercase so they never spell a function name.
fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::sequence),
            prop::collection::vec(("[a-z][a-zA-Z0-9]{0,6}", inner.clone()), 0..4)
                .prop_map(Value::mapping),
            logical_id().prop_map(Value::reference),
            (logical_id(), "[A-Z][a-zA-Z.]{0,8}")
                .prop_map(|(id, attribute)| Value::get_att(id, attribute)),
            ("[,-]?", prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(delimiter, items)| Value::join(delimiter, items)),
            "[a-zA-Z${}.-]{0,16}".prop_map(Value::sub),
            (0u32..5, prop::collection::vec(inner.clone(), 1..3))
                .prop_map(|(index, items)| Value::select(index, Value::sequence(items))),
            (inner.clone(), inner.clone()).prop_map(|(left, right)| Value::equals(left, right)),
            (logical_id(), inner.clone(), inner.clone())
                .prop_map(|(condition, a, b)| Value::if_(condition, a, b)),
            inner.clone().prop_map(Value::not),
        ]
    })
}

fn round_trip(value: &Value, format: Format) -> Value {
    let text = encode(value).unwrap().emit(format).unwrap();
    decode(Node::parse(text.as_bytes(), format).unwrap()).unwrap()
}

proptest! {
    #[test]
    fn test_json_round_trip(tree in value()) {
        prop_assert_eq!(round_trip(&tree, Format::Json), tree);
    }

    #[test]
    fn test_yaml_round_trip(tree in value()) {
        prop_assert_eq!(round_trip(&tree, Format::Yaml), tree);
    }

    #[test]
    fn test_template_dump_is_idempotent(properties in prop::collection::vec(value(), 0..4)) {
        let mut template = Template::new();
        for (i, property) in properties.into_iter().enumerate() {
            let resource = cfn_model::Resource::new("AWS::Foo::Bar").with_property("Value", property);
            template.add_resource(format!("Thing{}", i), resource).unwrap();
        }

        let first = template.dump(Format::Json).unwrap();
        let reloaded = Template::load(&first).unwrap();
        prop_assert_eq!(&reloaded, &template);
        prop_assert_eq!(reloaded.dump(Format::Json).unwrap(), first);
    }
}
