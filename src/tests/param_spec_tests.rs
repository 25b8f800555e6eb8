use super::*;
use crate::db::TypeDatabase;
use crate::test_fixtures::Fixture;
use crate::types::*;

fn function_shape(db: &dyn TypeDatabase, ty: TypeId) -> std::sync::Arc<FunctionShape> {
    match db.type_data(ty).kind {
        TypeKind::Function(fn_id) => db.function_shape(fn_id),
        other => panic!("expected a function, got {other:?}"),
    }
}

#[test]
fn test_round_trip_is_identity() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let func = fixture.callable(&[fixture.int, fixture.str_], fixture.bool_);
    let value = convert_type_to_param_spec_value(db, func);
    assert_ne!(value, func);
    assert_eq!(convert_param_spec_value_to_type(db, value), func);
}

#[test]
fn test_free_param_spec_round_trip() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let p = fixture.param_spec_var("P", fixture.new_scope());
    let value = convert_type_to_param_spec_value(db, p);

    let shape = function_shape(db, value);
    assert!(shape.params.is_empty());
    assert_eq!(shape.param_spec, Some(p));
    assert!(shape.flags.contains(FunctionFlags::PARAM_SPEC_VALUE));

    assert_eq!(convert_param_spec_value_to_type(db, value), p);
}

#[test]
fn test_single_unnamed_separator_means_no_parameters() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let func = db.function(FunctionShape::new(
        fixture.atom("f"),
        vec![FunctionParam::position_only_separator()],
        Some(TypeId::NONE),
    ));
    let value = convert_type_to_param_spec_value(db, func);
    assert!(function_shape(db, value).params.is_empty());
}

#[test]
fn test_non_callable_degrades_to_gradual_form() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let value = convert_type_to_param_spec_value(db, fixture.int);
    let shape = function_shape(db, value);
    assert_eq!(shape.params.len(), 2);
    assert_eq!(shape.params[0].category, ParamCategory::ArgsList);
    assert_eq!(shape.params[1].category, ParamCategory::KwargsDict);
    assert!(shape.flags.contains(FunctionFlags::SKIP_ARGS_KWARGS_CHECK));
}

fn args_kwargs_function(fixture: &Fixture, p: TypeId) -> TypeId {
    let db = &fixture.db;
    db.function(FunctionShape::new(
        fixture.atom("f"),
        vec![
            FunctionParam::simple(fixture.atom("x"), fixture.int),
            FunctionParam::args_list(
                fixture.atom("args"),
                fixture.param_spec_access(p, ParamSpecAccess::Args),
            ),
            FunctionParam::kwargs_dict(
                fixture.atom("kwargs"),
                fixture.param_spec_access(p, ParamSpecAccess::Kwargs),
            ),
        ],
        Some(fixture.str_),
    ))
}

#[test]
fn test_detect_args_kwargs_tail() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let p = fixture.param_spec_var("P", fixture.new_scope());
    let func = args_kwargs_function(&fixture, p);

    let shape = function_shape(db, func);
    let detected = get_param_spec_from_args_kwargs(db, &shape).expect("tail should be detected");
    assert_eq!(detected, p);
}

#[test]
fn test_mismatched_tail_is_not_detected() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let p = fixture.param_spec_var("P", fixture.new_scope());
    let q = fixture.param_spec_var("Q", fixture.new_scope());

    let func = db.function(FunctionShape::new(
        fixture.atom("f"),
        vec![
            FunctionParam::args_list(
                fixture.atom("args"),
                fixture.param_spec_access(p, ParamSpecAccess::Args),
            ),
            FunctionParam::kwargs_dict(
                fixture.atom("kwargs"),
                fixture.param_spec_access(q, ParamSpecAccess::Kwargs),
            ),
        ],
        Some(fixture.str_),
    ));
    let shape = function_shape(db, func);
    assert!(get_param_spec_from_args_kwargs(db, &shape).is_none());

    // A plain *args/**kwargs pair is not a parameter specification.
    let plain = db.function(FunctionShape::new(
        fixture.atom("g"),
        vec![
            FunctionParam::args_list(fixture.atom("args"), fixture.int),
            FunctionParam::kwargs_dict(fixture.atom("kwargs"), fixture.str_),
        ],
        Some(fixture.str_),
    ));
    let plain_shape = function_shape(db, plain);
    assert!(get_param_spec_from_args_kwargs(db, &plain_shape).is_none());
}

#[test]
fn test_remove_param_spec_variadics() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let p = fixture.param_spec_var("P", fixture.new_scope());
    let func = args_kwargs_function(&fixture, p);

    let stripped = remove_param_spec_variadics_from_signature(db, func);
    assert_ne!(stripped, func);
    let shape = function_shape(db, stripped);
    assert_eq!(shape.params.len(), 1);
    assert_eq!(&*db.resolve_atom(shape.params[0].name.unwrap()), "x");
    assert_eq!(shape.param_spec, Some(p));

    // Signatures without the pair pass through.
    let plain = fixture.callable(&[fixture.int], fixture.str_);
    assert_eq!(remove_param_spec_variadics_from_signature(db, plain), plain);
}
