use pretty_assertions::assert_eq;
use serde_json::json;
use std::thread;
use tagwire::{CodecError, DeferredTypeError, PayloadType, RecordType, Typespace, UnionCodec, UnionType, Value};

fn ty(expr: &str) -> PayloadType {
    PayloadType::parse(expr).unwrap()
}

/// `ExampleFeed` is declared before every type it mentions.
fn typespace() -> Typespace {
    let mut ts = Typespace::new();
    ts.declare_union(
        UnionType::builder("ExampleFeed")
            .variant("DM", ty("DeferModel"))
            .variant("DE", ty("DeferEnum"))
            .variant("DRM", ty("DeferRecModel"))
            .variant("DRE", ty("DeferRecEnum"))
            .build()
            .unwrap(),
    )
    .unwrap();
    ts.declare_record(RecordType::new("DeferModel").with_field("a", ty("str")))
        .unwrap();
    ts.declare_union(UnionType::builder("DeferEnum").variant("Var", ty("str")).build().unwrap())
        .unwrap();
    ts.declare_record(RecordType::new("DeferRecModel").with_field("a", ty("ExampleFeed")))
        .unwrap();
    ts.declare_union(
        UnionType::builder("DeferRecEnum")
            .variant("Var", ty("ExampleFeed"))
            .build()
            .unwrap(),
    )
    .unwrap();
    ts
}

fn dm(ts: &Typespace) -> Value {
    let model = Value::record([("a", "test".into())]);
    ts.variant("ExampleFeed", "DM").unwrap().of(model).unwrap().into()
}

#[test]
fn forward_references_resolve_on_first_use() {
    let ts = typespace();
    let feed = |variant: &str, payload: Value| ts.variant("ExampleFeed", variant).unwrap().of(payload).unwrap();
    let cases = [
        (feed("DM", Value::record([("a", "test".into())])), json!({"DM": {"a": "test"}})),
        (
            feed("DE", ts.variant("DeferEnum", "Var").unwrap().of("test").unwrap().into()),
            json!({"DE": {"Var": "test"}}),
        ),
        (
            feed("DRM", Value::record([("a", dm(&ts))])),
            json!({"DRM": {"a": {"DM": {"a": "test"}}}}),
        ),
        (
            feed("DRE", ts.variant("DeferRecEnum", "Var").unwrap().of(dm(&ts)).unwrap().into()),
            json!({"DRE": {"Var": {"DM": {"a": "test"}}}}),
        ),
    ];
    for (value, wire) in cases {
        let encoded = ts.encode(&value).unwrap();
        assert_eq!(encoded, wire);
        assert_eq!(ts.decode("ExampleFeed", &encoded).unwrap(), value);
    }
}

#[test]
fn missing_type_is_reported_and_not_cached() {
    let mut ts = Typespace::new();
    ts.declare_union(UnionType::builder("Feed").variant("Post", ty("Post")).build().unwrap())
        .unwrap();
    let value = ts
        .variant("Feed", "Post")
        .unwrap()
        .of(Value::record([("title", "hi".into())]))
        .unwrap();

    let err = ts.codec_of("Feed").unwrap_err();
    assert_eq!(
        err,
        CodecError::Deferred(DeferredTypeError {
            name: "Post".into(),
            referenced_from: "Feed".into(),
        })
    );
    assert!(matches!(ts.encode(&value), Err(CodecError::Deferred(_))));

    ts.declare_record(RecordType::new("Post").with_field("title", ty("str")))
        .unwrap();
    assert_eq!(ts.encode(&value).unwrap(), json!({"Post": {"title": "hi"}}));
}

#[test]
fn missing_type_behind_a_nested_union() {
    let mut ts = Typespace::new();
    ts.declare_union(UnionType::builder("Outer").variant("In", ty("Inner")).build().unwrap())
        .unwrap();
    ts.declare_union(UnionType::builder("Inner").variant("Gone", ty("list[Gone]")).build().unwrap())
        .unwrap();
    let expected = CodecError::Deferred(DeferredTypeError {
        name: "Gone".into(),
        referenced_from: "Inner".into(),
    });
    assert_eq!(ts.codec_of("Outer").unwrap_err(), expected);
    assert_eq!(ts.decode("Outer", &json!({"In": {"Gone": []}})).unwrap_err(), expected);
    assert_eq!(ts.codec_of("Inner").unwrap_err(), expected);
}

#[test]
fn concurrent_first_use_builds_one_codec() {
    let ts = typespace();
    let wire = json!({"DRE": {"Var": {"DM": {"a": "test"}}}});
    let codecs: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let codec = ts.codec_of("ExampleFeed").unwrap();
                    let value = codec.decode(&wire).unwrap();
                    assert_eq!(ts.encode(&value).unwrap(), wire);
                    codec.ty() as *const UnionCodec as usize
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(codecs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(codecs[0], ts.codec_of("ExampleFeed").unwrap().ty() as *const UnionCodec as usize);
}
