use rstest::rstest;
use sb3graph::{Error, Input, Prim, PrimKind, Resolver, ShadowStatus, Slot};
use serde_json::{json, Value};
use smol_str::SmolStr;

#[rstest]
#[case(1, ShadowStatus::HasShadow, "has shadow")]
#[case(2, ShadowStatus::NoShadow, "no shadow")]
#[case(3, ShadowStatus::Obscured, "obscured")]
fn registry_returns_the_canonical_status(
    #[case] code: i64,
    #[case] expected: ShadowStatus,
    #[case] name: &str,
) {
    let status = ShadowStatus::from_code(code).unwrap();
    assert_eq!(status, expected);
    assert_eq!(status.name(), name);
    assert_eq!(i64::from(status.code()), code);
    // Repeated lookups always yield the same instance.
    assert_eq!(ShadowStatus::from_code(code).unwrap(), status);
}

#[rstest]
#[case(0)]
#[case(4)]
#[case(-2)]
fn registry_rejects_unknown_codes(#[case] code: i64) {
    assert!(matches!(
        ShadowStatus::from_code(code),
        Err(Error::UnknownShadowCode { .. })
    ));
}

#[rstest]
fn decodes_a_shadowed_literal() {
    let input = Input::from_encoded(&json!([1, [10, "hello"]])).unwrap();
    assert_eq!(input.shadow, Some(ShadowStatus::HasShadow));
    let prim = input.value.prim().expect("value should be a primitive");
    assert_eq!(prim.kind, PrimKind::String);
    assert_eq!(prim.value, Some(json!("hello")));
    assert!(input.obscurer.is_absent());
}

#[rstest]
fn decodes_a_deferred_block_identifier() {
    let input = Input::from_encoded(&json!([2, "blockid"])).unwrap();
    assert_eq!(input.value, Slot::Pending(SmolStr::new("blockid")));
    assert!(!input.is_linked());
}

#[rstest]
fn decodes_an_obscured_slot_with_the_obscurer_first() {
    let input = Input::from_encoded(&json!([3, "obsc", [10, "50"]])).unwrap();
    assert_eq!(input.shadow, Some(ShadowStatus::Obscured));
    assert_eq!(input.obscurer, Slot::Pending(SmolStr::new("obsc")));
    let prim = input.value.prim().expect("obscured shadow should remain the value");
    assert_eq!(prim.value, Some(json!("50")));
}

#[rstest]
fn decodes_an_inline_reporter_obscurer() {
    let input = Input::from_encoded(&json!([3, [12, "score", "vid"], [10, "0"]])).unwrap();
    let reporter = input.obscurer.prim().expect("obscurer should be a primitive");
    assert_eq!(reporter.kind, PrimKind::Variable);
    assert_eq!(reporter.name.as_deref(), Some("score"));
}

#[rstest]
fn null_and_missing_slots_are_absent() {
    let input = Input::from_encoded(&json!([1, null])).unwrap();
    assert!(input.value.is_absent());
    assert!(input.obscurer.is_absent());

    let input = Input::from_encoded(&json!([3, "obsc"])).unwrap();
    assert_eq!(input.obscurer, Slot::Pending(SmolStr::new("obsc")));
    assert!(input.value.is_absent());
}

#[rstest]
fn rejects_malformed_tuples() {
    assert!(Input::from_encoded(&json!("not an array")).is_err());
    assert!(Input::from_encoded(&json!([])).is_err());
    assert!(Input::from_encoded(&json!(["one", null])).is_err());
    assert!(matches!(
        Input::from_encoded(&json!([7, null])),
        Err(Error::UnknownShadowCode { code: 7 })
    ));
}

#[rstest]
fn unexpected_scalars_decode_raw_and_are_skipped_on_encode() {
    let input = Input::from_encoded(&json!([1, 5])).unwrap();
    assert_eq!(input.value, Slot::Raw(json!(5)));
    // The malformed slot is omitted; the shadow code survives.
    assert_eq!(input.to_encoded(), json!([1]));
}

#[rstest]
#[case(json!([1, [10, "hello"]]))]
#[case(json!([2, "blockid"]))]
#[case(json!([3, "obsc", [10, "50"]]))]
#[case(json!([3, [12, "score", "vid"], [10, "0"]]))]
#[case(json!([3, "obsc"]))]
#[case(json!([1, [11, "message1", "bid"]]))]
fn wire_tuples_round_trip(#[case] encoded: Value) {
    let input = Input::from_encoded(&encoded).unwrap();
    assert_eq!(input.to_encoded(), encoded);
    // And the entity round-trips through its own encoding.
    assert_eq!(Input::from_encoded(&input.to_encoded()).unwrap(), input);
}

#[rstest]
fn the_obscurer_encodes_strictly_before_the_value() {
    let mut input = Input::with_prim(Prim::number(50.0));
    input.set_obscurer(Slot::Pending(SmolStr::new("obsc")));
    let encoded = input.to_encoded();
    assert_eq!(encoded, json!([3, "obsc", [4, "50"]]));
}

#[rstest]
fn an_unset_status_falls_back_on_encode() {
    let mut input = Input::of("edge");
    input.shadow = None;
    assert_eq!(input.to_encoded()[0], json!(1));

    input.obscurer = Slot::Pending(SmolStr::new("obsc"));
    assert_eq!(input.to_encoded()[0], json!(3));
}

fn resolver() -> Resolver {
    let mut resolver = Resolver::new();
    resolver.add_block("target");
    resolver.add_variable("score", "vid-score");
    resolver.add_broadcast("go", "bid-go");
    resolver
}

#[rstest]
fn linking_resolves_known_identifiers() {
    let mut input = Input::from_encoded(&json!([2, "target"])).unwrap();
    input.link(&resolver());
    let id = input.value.block_id().expect("identifier should resolve");
    assert_eq!(id.as_str(), "target");
    assert!(input.is_linked());
    // A resolved reference still encodes as the bare id.
    assert_eq!(input.to_encoded(), json!([2, "target"]));
}

#[rstest]
fn linking_leaves_unknown_identifiers_pending() {
    let mut input = Input::from_encoded(&json!([2, "ghost"])).unwrap();
    input.link(&resolver());
    assert_eq!(input.value, Slot::Pending(SmolStr::new("ghost")));
    assert!(!input.is_linked());
}

#[rstest]
fn linking_is_idempotent() {
    let mut once = Input::from_encoded(&json!([3, "target", [12, "score", "stale"]])).unwrap();
    once.link(&resolver());
    let mut twice = once.clone();
    twice.link(&resolver());
    assert_eq!(once, twice);
}

#[rstest]
fn linking_refreshes_named_primitive_targets() {
    let mut input = Input::from_encoded(&json!([1, [12, "score", "stale"]])).unwrap();
    input.link(&resolver());
    let prim = input.value.prim().unwrap();
    assert_eq!(prim.id.as_deref(), Some("vid-score"));

    // Unknown names keep whatever the encoding carried.
    let mut input = Input::from_encoded(&json!([1, [12, "unknown", "kept"]])).unwrap();
    input.link(&resolver());
    assert_eq!(input.value.prim().unwrap().id.as_deref(), Some("kept"));
}

#[rstest]
fn linking_reaches_a_primitive_obscurer() {
    let mut input = Input::from_encoded(&json!([3, [12, "score"], [10, "0"]])).unwrap();
    input.link(&resolver());
    assert_eq!(
        input.obscurer.prim().unwrap().id.as_deref(),
        Some("vid-score")
    );
}

#[rstest]
fn plugging_an_obscurer_forces_the_obscured_status() {
    let mut input = Input::of("10");
    assert_eq!(input.shadow, Some(ShadowStatus::HasShadow));
    input.set_obscurer(Slot::Pending(SmolStr::new("obsc")));
    assert_eq!(input.shadow, Some(ShadowStatus::Obscured));
}
