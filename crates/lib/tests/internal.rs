use pretty_assertions::assert_eq;
use serde_json::json;
use tagwire::{
    CodecError, DeclarationError, EncodeError, PayloadType, RecordType, Tagging, Typespace, UnionType, UnionValue,
    Value,
};

fn ty(expr: &str) -> PayloadType {
    PayloadType::parse(expr).unwrap()
}

fn typespace() -> Typespace {
    let mut ts = Typespace::new();
    ts.declare_record(RecordType::new("TModel2").with_field("b", ty("str")))
        .unwrap();
    ts.declare_record(RecordType::new("Foo").with_field("x", ty("int")))
        .unwrap();
    ts.declare_union(
        UnionType::builder("OtherEnum5")
            .variant("D", ty("TModel2"))
            .variant("Int", ty("int"))
            .build()
            .unwrap(),
    )
    .unwrap();
    ts.declare_union(
        UnionType::builder("MyEnumInternal")
            .tagging(Tagging::internal("tag"))
            .variant("Foo", ty("Foo"))
            .variant("Other", ty("OtherEnum5"))
            .unit("NoValue")
            .variant("Model", ty("TModel2"))
            .variant("Dict", ty("dict[str, int]"))
            .variant_renamed("Renamed", ty("TModel2"), "just_str_tuple")
            .build()
            .unwrap(),
    )
    .unwrap();
    ts
}

fn make(ts: &Typespace, variant: &str, payload: impl Into<Value>) -> UnionValue {
    ts.variant("MyEnumInternal", variant).unwrap().of(payload).unwrap()
}

#[track_caller]
fn check(ts: &Typespace, value: &UnionValue, wire: serde_json::Value) {
    let encoded = ts.encode(value).unwrap();
    assert_eq!(encoded, wire);
    assert_eq!(&ts.decode("MyEnumInternal", &encoded).unwrap(), value);
}

#[test]
fn tag_is_merged_into_the_payload() {
    let ts = typespace();
    let foo = make(&ts, "Foo", Value::record([("x", Value::I64(1))]));
    check(&ts, &foo, json!({"tag": "Foo", "x": 1}));
    assert_eq!(ts.decode("MyEnumInternal", &json!({"x": 1, "tag": "Foo"})).unwrap(), foo);

    check(
        &ts,
        &make(&ts, "Model", Value::record([("b", "test_model".into())])),
        json!({"tag": "Model", "b": "test_model"}),
    );
    check(
        &ts,
        &make(&ts, "Dict", Value::map([("n", Value::I64(2))])),
        json!({"tag": "Dict", "n": 2}),
    );
    check(
        &ts,
        &make(&ts, "Renamed", Value::record([("b", "x".into())])),
        json!({"tag": "just_str_tuple", "b": "x"}),
    );
}

#[test]
fn empty_variant_ignores_other_fields() {
    let ts = typespace();
    let no_value = ts.variant("MyEnumInternal", "NoValue").unwrap().unit().unwrap();
    check(&ts, &no_value, json!({"tag": "NoValue"}));
    assert_eq!(
        ts.decode("MyEnumInternal", &json!({"tag": "NoValue", "payload": null}))
            .unwrap(),
        no_value
    );
    let from_fields = ts
        .parse_fields("MyEnumInternal", [("tag", json!("NoValue")), ("payload", json!(null))])
        .unwrap();
    assert_eq!(from_fields, no_value);
}

#[test]
fn nested_externally_tagged_union() {
    let ts = typespace();
    let inner = ts
        .variant("OtherEnum5", "D")
        .unwrap()
        .of(Value::record([("b", "123".into())]))
        .unwrap();
    check(&ts, &make(&ts, "Other", inner), json!({"tag": "Other", "D": {"b": "123"}}));
}

#[test]
fn missing_tag_field() {
    let ts = typespace();
    let err = ts.decode("MyEnumInternal", &json!({"x": 1})).unwrap_err();
    assert_eq!(err.to_string(), "missing tag field `tag` for union `MyEnumInternal` at `$`");
    let err = ts.decode("MyEnumInternal", &json!({"tag": "Nope"})).unwrap_err();
    assert_eq!(err.to_string(), "unknown tag `Nope` for union `MyEnumInternal` at `$.tag`");
    let err = ts.decode("MyEnumInternal", &json!({"tag": "Foo", "x": "1"})).unwrap_err();
    assert_eq!(err.to_string(), "expected an integer, found a string at `$.x`");
}

#[test]
fn non_object_payloads_are_rejected_when_declared() {
    let err = UnionType::builder("Bad")
        .tagging(Tagging::internal("type"))
        .variant("List", ty("list[str]"))
        .build()
        .unwrap_err();
    assert!(matches!(err, DeclarationError::NonRecordPayload { .. }));
}

#[test]
fn payload_that_does_not_encode_to_an_object() {
    let ts = typespace();
    let int = ts.variant("OtherEnum5", "Int").unwrap().of(1).unwrap();
    // `{"Int": 1}` is an object and merges.
    check(&ts, &make(&ts, "Other", int), json!({"tag": "Other", "Int": 1}));

    let mut ts = Typespace::new();
    ts.declare_union(UnionType::builder("Flag").unit("On").unit("Off").build().unwrap())
        .unwrap();
    ts.declare_union(
        UnionType::builder("Wrapper")
            .tagging(Tagging::internal("type"))
            .variant("Flag", ty("Flag"))
            .build()
            .unwrap(),
    )
    .unwrap();
    let on = ts.variant("Flag", "On").unwrap().unit().unwrap();
    let value = ts.variant("Wrapper", "Flag").unwrap().of(on).unwrap();
    let err = ts
        .encode_with(&value, tagwire::EncodeOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Encode(EncodeError::PayloadNotAnObject { .. })
    ));
}

#[test]
fn late_declared_payload_is_checked_on_first_use() {
    let mut ts = Typespace::new();
    ts.declare_union(
        UnionType::builder("Event")
            .tagging(Tagging::internal("type"))
            .variant("Msg", ty("Msg"))
            .build()
            .unwrap(),
    )
    .unwrap();
    ts.declare_record(RecordType::new("Msg").with_field("type", ty("str")))
        .unwrap();
    let err = ts.codec_of("Event").unwrap_err();
    assert_eq!(
        err,
        CodecError::Declaration(DeclarationError::TagFieldCollision {
            union: "Event".into(),
            variant: "Msg".into(),
            field: "type".into(),
        })
    );
}

#[test]
fn self_nesting_shares_the_tag_field() {
    let mut ts = Typespace::new();
    ts.declare_union(
        UnionType::builder("Tree")
            .tagging(Tagging::internal("tag"))
            .variant("Node", ty("Tree"))
            .unit("Leaf")
            .build()
            .unwrap(),
    )
    .unwrap();
    assert!(matches!(
        ts.codec_of("Tree"),
        Err(CodecError::Declaration(DeclarationError::TagFieldCollision { .. }))
    ));
}
