//! End-to-end tests of schema inference and evolution over sequences
//! of records.

use quiver::types::PendingKind;
use quiver::{Change, ErrorKind, Options, Unifier, Value};

fn added(path: &str, data_type: &str) -> Change {
    Change::Added {
        path: path.to_string(),
        data_type: data_type.to_string(),
    }
}

fn promoted(path: &str, from: &str, to: &str) -> Change {
    Change::Promoted {
        path: path.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    }
}

const FIRST_RECORD: &str = r#"{
    "count": 89,
    "next": "https://x/y?p=3",
    "previous": null,
    "results": [{"id": 7594}],
    "arrayscalar": [],
    "datefield": "1979-01-01",
    "timefield": "01:02:03"
}"#;

const SECOND_RECORD: &str = r#"{
    "count": 89.5,
    "previous": "https://x/y?p=2",
    "results": [{
        "id": 7594,
        "scalar": 241.5,
        "nested": {"strscalar": "s1", "nestedarray": [123, 456]}
    }],
    "arrayscalar": ["str"],
    "datetime": "2024-10-24 19:03:09",
    "event_time": "2024-10-24T19:03:09+00:00",
    "datefield": "2024-10-24T19:03:09+00:00",
    "timefield": "1970-01-01"
}"#;

fn evolved_unifier() -> Unifier {
    Unifier::new(
        Options::default()
            .with_infer_time_units()
            .with_type_conversion(),
    )
}

#[test]
fn test_first_record_inference() {
    let mut u = evolved_unifier();
    u.unify_json(FIRST_RECORD).unwrap();

    assert_eq!(
        u.schema().to_string(),
        "count: int64, next: string, \
         results: list<item: struct<id: int64>, nullable>, \
         datefield: date32, timefield: time64[ns]"
    );

    let pending = u.pending();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].dot_path, "$previous");
    assert_eq!(pending[0].reason, PendingKind::UnknownLeaf);
    assert_eq!(pending[1].dot_path, "$arrayscalar");
    assert_eq!(pending[1].reason, PendingKind::EmptyList);

    assert!(u.changes().is_empty());
}

#[test]
fn test_second_record_evolution() {
    let mut u = evolved_unifier();
    u.unify_json(FIRST_RECORD).unwrap();
    u.unify_json(SECOND_RECORD).unwrap();

    assert_eq!(
        u.changes(),
        &[
            promoted("$count", "int64", "float64"),
            added("$previous", "string"),
            added("$results.elem.scalar", "float64"),
            added(
                "$results.elem.nested",
                "struct<strscalar: string, nestedarray: list<item: int64, nullable>>"
            ),
            added("$arrayscalar", "list<item: string, nullable>"),
            added("$datetime", "timestamp[us]"),
            added("$event_time", "timestamp[us]"),
            promoted("$datefield", "date32", "timestamp[us]"),
            promoted("$timefield", "time64[ns]", "string"),
        ]
    );

    assert_eq!(
        u.schema().to_string(),
        "count: float64, next: string, previous: string, \
         results: list<item: struct<id: int64, scalar: float64, \
         nested: struct<strscalar: string, nestedarray: list<item: int64, nullable>>>, nullable>, \
         arrayscalar: list<item: string, nullable>, \
         datefield: timestamp[us], timefield: string, \
         datetime: timestamp[us], event_time: timestamp[us]"
    );

    // Everything resolved.
    assert!(u.pending().is_empty());
    assert_eq!(u.count(), 2);

    // The frozen first-record schema is unaffected by the evolution.
    assert_eq!(
        u.origin_schema().to_string(),
        "count: int64, next: string, \
         results: list<item: struct<id: int64>, nullable>, \
         datefield: date32, timefield: time64[ns]"
    );
}

#[test]
fn test_scalar_promotion_to_float() {
    let mut u = Unifier::new(Options::default().with_type_conversion());
    u.unify_json(r#"{"a": 1}"#).unwrap();
    u.unify_json(r#"{"a": 1.5}"#).unwrap();
    assert_eq!(u.schema().to_string(), "a: float64");
    assert_eq!(u.changes(), &[promoted("$a", "int64", "float64")]);
}

#[test]
fn test_scalar_promotion_to_string() {
    let mut u = Unifier::new(Options::default().with_type_conversion());
    u.unify_json(r#"{"a": 1}"#).unwrap();
    u.unify_json(r#"{"a": "x"}"#).unwrap();
    assert_eq!(u.schema().to_string(), "a: string");
    assert_eq!(u.changes(), &[promoted("$a", "int64", "string")]);
}

#[test]
fn test_unify_at_path_grafts_under_mount() {
    let mut u = Unifier::default();
    u.unify_json(r#"{"a": {"b": 1}}"#).unwrap();

    let record = Value::from_json_str(r#"{"c": "y"}"#).unwrap();
    u.unify_at_path(&record, "$a").unwrap();

    assert_eq!(u.schema().to_string(), "a: struct<b: int64, c: string>");
    assert_eq!(u.changes(), &[added("$a.c", "string")]);
}

#[test]
fn test_unify_at_missing_path_changes_nothing() {
    let mut u = Unifier::default();
    u.unify_json(r#"{"a": 1}"#).unwrap();

    let record = Value::from_json_str(r#"{"c": "y"}"#).unwrap();
    let err = u.unify_at_path(&record, "$missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathNotFound);

    assert_eq!(u.schema().to_string(), "a: int64");
    assert!(u.changes().is_empty());
    assert_eq!(u.count(), 1);
}

#[test]
fn test_unify_is_stable_under_repeated_records() {
    let mut u = evolved_unifier();
    u.unify_json(FIRST_RECORD).unwrap();
    let schema = u.schema();
    let paths = u.paths();
    let pending = u.pending();

    u.unify_json(FIRST_RECORD).unwrap();
    assert!(u.changes().is_empty());
    assert_eq!(u.schema(), schema);
    assert_eq!(u.paths(), paths);
    assert_eq!(u.pending(), pending);
    assert_eq!(u.count(), 2);
}

#[test]
fn test_disjoint_records_commute() {
    let r1 = r#"{"a": 1, "x": {"y": "z"}}"#;
    let r2 = r#"{"b": true, "xs": [4]}"#;

    let mut forward = Unifier::default();
    forward.unify_json(r1).unwrap();
    forward.unify_json(r2).unwrap();

    let mut backward = Unifier::default();
    backward.unify_json(r2).unwrap();
    backward.unify_json(r1).unwrap();

    // Same fields and types either way; order follows first appearance.
    let forward_schema = forward.schema();
    let backward_schema = backward.schema();
    assert_eq!(forward_schema.len(), backward_schema.len());
    for field in forward_schema.fields() {
        let other = backward_schema.field_by_name(&field.name).unwrap();
        assert_eq!(field.data_type, other.data_type);
    }
}

#[test]
fn test_types_only_move_up_the_lattice() {
    let mut u = Unifier::new(Options::default().with_type_conversion());
    u.unify_json(r#"{"a": 1}"#).unwrap();
    u.unify_json(r#"{"a": 1.5}"#).unwrap();
    u.unify_json(r#"{"a": 2}"#).unwrap();
    // An integer observed after the float promotion does not demote.
    assert_eq!(u.schema().to_string(), "a: float64");
    u.unify_json(r#"{"a": "x"}"#).unwrap();
    u.unify_json(r#"{"a": 3}"#).unwrap();
    assert_eq!(u.schema().to_string(), "a: string");
    assert_eq!(
        u.changes(),
        &[
            promoted("$a", "int64", "float64"),
            promoted("$a", "float64", "string"),
        ]
    );
}

#[test]
fn test_pending_leaf_resolves_to_known() {
    let mut u = Unifier::default();
    u.unify_json(r#"{"p": null}"#).unwrap();
    assert!(u.schema().is_empty());
    assert_eq!(u.pending()[0].dot_path, "$p");
    assert_eq!(u.count_pending(), 1);

    u.unify_json(r#"{"p": 42}"#).unwrap();
    assert_eq!(u.schema().to_string(), "p: int64");
    assert!(u.pending().is_empty());
    assert_eq!(u.count_paths(), 1);
    assert_eq!(u.changes(), &[added("$p", "int64")]);
}

#[test]
fn test_empty_containers_resolve_from_later_evidence() {
    let mut u = Unifier::default();
    u.unify_json(r#"{"xs": [], "obj": {}}"#).unwrap();
    assert_eq!(u.count_pending(), 2);

    // Still no evidence: an empty list again leaves the field pending.
    u.unify_json(r#"{"xs": []}"#).unwrap();
    assert_eq!(u.count_pending(), 2);

    u.unify_json(r#"{"xs": [1], "obj": {"k": "v"}}"#).unwrap();
    assert_eq!(
        u.schema().to_string(),
        "xs: list<item: int64, nullable>, obj: struct<k: string>"
    );
    assert!(u.pending().is_empty());
    assert_eq!(
        u.changes(),
        &[
            added("$xs", "list<item: int64, nullable>"),
            added("$obj", "struct<k: string>"),
        ]
    );
}

#[test]
fn test_empty_list_element_follows_scalar_conflict_rules() {
    // With type conversion, later element types promote.
    let mut u = Unifier::new(Options::default().with_type_conversion());
    u.unify_json(r#"{"xs": []}"#).unwrap();
    u.unify_json(r#"{"xs": [1]}"#).unwrap();
    u.unify_json(r#"{"xs": [1.5]}"#).unwrap();
    assert_eq!(u.schema().to_string(), "xs: list<item: float64, nullable>");

    // Without it, the first resolved element type wins.
    let mut u = Unifier::default();
    u.unify_json(r#"{"xs": []}"#).unwrap();
    u.unify_json(r#"{"xs": [1]}"#).unwrap();
    u.unify_json(r#"{"xs": [1.5]}"#).unwrap();
    assert_eq!(u.schema().to_string(), "xs: list<item: int64, nullable>");
}

#[test]
fn test_deep_graft_logs_once_and_is_reachable() {
    let mut u = Unifier::default();
    u.unify_json(r#"{"a": {"b": 1}}"#).unwrap();
    u.unify_json(r#"{"a": {"c": {"d": {"e": "x"}}}}"#).unwrap();

    assert_eq!(
        u.changes(),
        &[added("$a.c", "struct<d: struct<e: string>>")]
    );
    let paths: Vec<String> = u.paths().into_iter().map(|p| p.dot_path).collect();
    for p in ["$a", "$a.b", "$a.c", "$a.c.d", "$a.c.d.e"] {
        assert!(paths.contains(&p.to_string()), "{p} missing from {paths:?}");
    }
}

#[test]
fn test_null_observation_of_known_field_changes_nothing() {
    let mut u = Unifier::new(Options::default().with_type_conversion());
    u.unify_json(r#"{"a": 1}"#).unwrap();
    u.unify_json(r#"{"a": null}"#).unwrap();
    assert_eq!(u.schema().to_string(), "a: int64");
    assert!(u.changes().is_empty());
    assert!(u.pending().is_empty());
}

#[test]
fn test_quoted_scalars_and_time_inference_together() {
    let mut u = Unifier::new(
        Options::default()
            .with_infer_time_units()
            .with_quoted_values_are_strings(),
    );
    u.unify_json(r#"{"n": "42", "b": "true", "d": "2025-07-25", "t": "12:34:56.789"}"#)
        .unwrap();
    assert_eq!(
        u.schema().to_string(),
        "n: string, b: string, d: date32, t: time64[ns]"
    );
}

#[test]
fn test_mixed_list_becomes_variant() {
    let mut u = Unifier::new(
        Options::default()
            .with_check_for_union()
            .with_use_variant_for_unions(),
    );
    u.unify_json(r#"{"union_field": [true, 42, "string", null, {"inner": "thing"}]}"#)
        .unwrap();
    assert_eq!(
        u.schema().to_string(),
        "union_field: list<item: variant, nullable>"
    );
}

#[test]
fn test_arrow_schema_export() {
    use arrow_schema::DataType as ArrowDataType;
    use arrow_schema::Schema as ArrowSchema;

    let mut u = evolved_unifier();
    u.unify_json(FIRST_RECORD).unwrap();
    let arrow = ArrowSchema::try_from(&u.schema()).unwrap();

    assert_eq!(arrow.fields().len(), 5);
    assert_eq!(arrow.field_with_name("count").unwrap().data_type(), &ArrowDataType::Int64);
    assert_eq!(arrow.field_with_name("datefield").unwrap().data_type(), &ArrowDataType::Date32);
    match arrow.field_with_name("results").unwrap().data_type() {
        ArrowDataType::List(item) => {
            assert!(matches!(item.data_type(), ArrowDataType::Struct(_)))
        }
        other => panic!("expected list, got {other:?}"),
    }

    // Two successive exports of the same tree are equal.
    assert_eq!(arrow, ArrowSchema::try_from(&u.schema()).unwrap());
}
