use super::*;
use crate::db::TypeDatabase;
use crate::test_fixtures::Fixture;
use crate::types::*;
use crate::utils::convert_to_instantiable;

#[test]
fn test_identity_fast_path() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    assert!(is_type_same(db, fixture.int, fixture.int, TypeSameOptions::default()));
    assert!(is_type_same(db, TypeId::ANY, TypeId::ANY, TypeSameOptions::default()));
}

#[test]
fn test_different_classes_are_not_same() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    assert!(!is_type_same(db, fixture.int, fixture.bool_, TypeSameOptions::default()));
    assert!(!is_type_same(db, fixture.int, TypeId::ANY, TypeSameOptions::default()));
}

#[test]
fn test_flags_respect_options() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let instantiable = convert_to_instantiable(db, fixture.int);
    assert!(!is_type_same(db, fixture.int, instantiable, TypeSameOptions::default()));
    assert!(is_type_same(
        db,
        fixture.int,
        instantiable,
        TypeSameOptions {
            ignore_type_flags: true,
            ..Default::default()
        }
    ));
}

#[test]
fn test_union_comparison_is_order_insensitive() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let a = db.union(vec![fixture.int, fixture.str_, TypeId::NONE]);
    let b = db.union(vec![TypeId::NONE, fixture.int, fixture.str_]);
    assert_ne!(a, b);
    assert!(is_type_same(db, a, b, TypeSameOptions::default()));

    let c = db.union(vec![fixture.int, fixture.bool_]);
    assert!(!is_type_same(db, a, c, TypeSameOptions::default()));
}

#[test]
fn test_positional_parameter_names_ignored() {
    let fixture = Fixture::new();
    let db = &fixture.db;

    let make = |name: &str| {
        let params = vec![
            FunctionParam::simple(fixture.atom(name), fixture.int),
            FunctionParam::position_only_separator(),
        ];
        db.function(FunctionShape::new(fixture.atom("f"), params, Some(fixture.str_)))
    };
    let a = make("left");
    let b = make("right");
    assert_ne!(a, b);
    assert!(is_type_same(db, a, b, TypeSameOptions::default()));
}

#[test]
fn test_keyword_capable_parameter_names_matter() {
    let fixture = Fixture::new();
    let db = &fixture.db;

    let make = |name: &str| {
        let params = vec![FunctionParam::simple(fixture.atom(name), fixture.int)];
        db.function(FunctionShape::new(fixture.atom("f"), params, Some(fixture.str_)))
    };
    assert!(!is_type_same(db, make("a"), make("b"), TypeSameOptions::default()));
}

#[test]
fn test_param_spec_tails_compare_by_identity() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let scope = fixture.new_scope();
    let p = fixture.param_spec_var("P", scope);
    let q = fixture.param_spec_var("Q", scope);

    let make = |tail: TypeId| {
        let mut shape = FunctionShape::new(fixture.atom("f"), Vec::new(), Some(fixture.int));
        shape.param_spec = Some(tail);
        db.function(shape)
    };
    assert!(is_type_same(db, make(p), make(p), TypeSameOptions::default()));
    assert!(!is_type_same(db, make(p), make(q), TypeSameOptions::default()));
}

#[test]
fn test_kind_predicates() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let scope = fixture.new_scope();

    assert!(is_any_or_unknown(db, TypeId::ANY));
    assert!(is_any_or_unknown(db, TypeId::UNKNOWN));
    assert!(!is_any_or_unknown(db, fixture.int));
    assert!(is_never(db, TypeId::NEVER));
    assert!(is_none_type(db, TypeId::NONE));

    assert!(is_class_instance(db, fixture.int));
    assert!(!is_instantiable_class(db, fixture.int));
    assert!(is_instantiable_class(db, fixture.object));

    let t = fixture.plain_var("T", scope);
    let p = fixture.param_spec_var("P", scope);
    let ts = fixture.variadic_var("Ts", scope);
    assert!(is_plain_type_var(db, t));
    assert!(is_param_spec(db, p));
    assert!(is_variadic_type_var(db, ts));
    assert!(!is_param_spec(db, t));

    let pair = fixture.tuple_of(&[fixture.int, fixture.str_]);
    assert!(is_tuple_class(db, pair));
    assert!(!is_unpacked_tuple(db, pair));
    assert!(!is_tuple_class(db, fixture.list_of(fixture.int)));
}

#[test]
fn test_literal_detection() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let three = db.literal_instance(fixture.int_def, LiteralValue::Int(3));
    assert!(is_literal_type(db, three));
    assert!(!is_literal_type(db, fixture.int));
    assert!(contains_literal_type(db, db.union(vec![fixture.str_, three])));
    assert!(!contains_literal_type(db, db.union(vec![fixture.str_, fixture.int])));
}
