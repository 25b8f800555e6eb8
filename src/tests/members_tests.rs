use super::*;
use crate::db::TypeDatabase;
use crate::def::ClassDefFlags;
use crate::test_fixtures::Fixture;
use crate::types::*;

#[test]
fn test_inherited_member_seen_through_subclass_arguments() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let scope = fixture.new_scope();
    let t = fixture.plain_var("T", scope);

    // dict declares __iter__: () -> _KT
    fixture.set_fields(
        fixture.dict_def,
        vec![(
            "__iter__",
            Symbol::class_member(Some(fixture.callable(&[], fixture.dict_k))),
        )],
    );

    // class B[T](dict[T, int]); class A(B[str])
    let (b_def, _) = fixture.register_class(
        "B",
        vec![t],
        vec![db.instantiable_class(fixture.dict_def, Some(vec![t, fixture.int]))],
        scope,
    );
    let b_of_str = db.instantiable_class(b_def, Some(vec![fixture.str_]));
    let (_, a_class) = fixture.register_class("A", vec![], vec![b_of_str], fixture.new_scope());

    let member = lookup_class_member(
        db,
        a_class,
        fixture.atom("__iter__"),
        ClassMemberLookupFlags::default(),
    )
    .expect("__iter__ should be inherited");

    assert_eq!(
        member.class_type,
        db.instantiable_class(fixture.dict_def, Some(vec![fixture.str_, fixture.int]))
    );
    assert!(member.is_type_declared);

    let member_type = get_type_of_member(db, &member);
    let shape = match db.type_data(member_type).kind {
        TypeKind::Function(fn_id) => db.function_shape(fn_id),
        other => panic!("expected a function, got {other:?}"),
    };
    assert_eq!(shape.effective_return_type(), Some(fixture.str_));
}

#[test]
fn test_lookup_precedence_follows_mro() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let (base_def, base_class) =
        fixture.register_class("Base", vec![], vec![fixture.object], fixture.new_scope());
    fixture.set_fields(
        base_def,
        vec![("value", Symbol::instance_member(Some(fixture.int)))],
    );
    let (child_def, child_class) =
        fixture.register_class("Child", vec![], vec![base_class], fixture.new_scope());
    fixture.set_fields(
        child_def,
        vec![("value", Symbol::instance_member(Some(fixture.str_)))],
    );

    let member = lookup_class_member(
        db,
        child_class,
        fixture.atom("value"),
        ClassMemberLookupFlags::default(),
    )
    .unwrap();
    assert_eq!(member.symbol.declared_type, Some(fixture.str_));

    let skipped = lookup_class_member(
        db,
        child_class,
        fixture.atom("value"),
        ClassMemberLookupFlags::SKIP_ORIGINAL_CLASS,
    )
    .unwrap();
    assert_eq!(skipped.symbol.declared_type, Some(fixture.int));

    assert!(lookup_class_member(
        db,
        child_class,
        fixture.atom("value"),
        ClassMemberLookupFlags::SKIP_ORIGINAL_CLASS | ClassMemberLookupFlags::SKIP_BASE_CLASSES,
    )
    .is_none());
}

#[test]
fn test_declared_types_only_records_skips() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let (base_def, base_class) =
        fixture.register_class("Base", vec![], vec![fixture.object], fixture.new_scope());
    fixture.set_fields(
        base_def,
        vec![("value", Symbol::instance_member(Some(fixture.int)))],
    );
    let (child_def, child_class) =
        fixture.register_class("Child", vec![], vec![base_class], fixture.new_scope());
    // The child shadows the name without a declared type.
    fixture.set_fields(child_def, vec![("value", Symbol::instance_member(None))]);

    let default = lookup_class_member(
        db,
        child_class,
        fixture.atom("value"),
        ClassMemberLookupFlags::default(),
    )
    .unwrap();
    assert!(!default.is_type_declared);

    let declared = lookup_class_member(
        db,
        child_class,
        fixture.atom("value"),
        ClassMemberLookupFlags::DECLARED_TYPES_ONLY,
    )
    .unwrap();
    assert!(declared.is_type_declared);
    assert_eq!(declared.symbol.declared_type, Some(fixture.int));
    assert!(declared.skipped_undeclared_type);
}

#[test]
fn test_skip_object_base_class() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    fixture.set_fields(
        fixture.object_def,
        vec![(
            "__init__",
            Symbol::class_member(Some(fixture.callable(&[], TypeId::NONE))),
        )],
    );
    let (_, c_class) =
        fixture.register_class("C", vec![], vec![fixture.object], fixture.new_scope());

    assert!(lookup_class_member(
        db,
        c_class,
        fixture.atom("__init__"),
        ClassMemberLookupFlags::default()
    )
    .is_some());
    assert!(lookup_class_member(
        db,
        c_class,
        fixture.atom("__init__"),
        ClassMemberLookupFlags::SKIP_OBJECT_BASE_CLASS
    )
    .is_none());
}

#[test]
fn test_skip_instance_variables() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let (c_def, c_class) =
        fixture.register_class("C", vec![], vec![fixture.object], fixture.new_scope());
    fixture.set_fields(
        c_def,
        vec![
            ("field", Symbol::instance_member(Some(fixture.int))),
            ("shared", Symbol::class_var(Some(fixture.str_))),
        ],
    );

    assert!(lookup_class_member(
        db,
        c_class,
        fixture.atom("field"),
        ClassMemberLookupFlags::SKIP_INSTANCE_VARIABLES
    )
    .is_none());
    let shared = lookup_class_member(
        db,
        c_class,
        fixture.atom("shared"),
        ClassMemberLookupFlags::SKIP_INSTANCE_VARIABLES,
    )
    .unwrap();
    assert!(shared.is_class_var);
}

#[test]
fn test_data_class_fields_bind_per_instance() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let scope = fixture.new_scope();
    let data_def = db.register_class({
        let mut def = crate::def::ClassDef::new(
            fixture.atom("test"),
            fixture.atom("Point"),
            fixture.atom("test.Point"),
            scope,
        );
        def.flags |= ClassDefFlags::DATA_CLASS;
        def.base_classes = vec![fixture.object];
        def
    });
    fixture.set_fields(data_def, vec![("x", Symbol::class_member(Some(fixture.int)))]);
    let data_class = db.instantiable_class(data_def, None);

    let member = lookup_class_member(
        db,
        data_class,
        fixture.atom("x"),
        ClassMemberLookupFlags::default(),
    )
    .unwrap();
    // A declared class-body variable of a data class is an instance
    // member for binding purposes.
    assert!(member.is_instance_member);
    assert!(member.is_class_member);
}

#[test]
fn test_unknown_ancestor_yields_synthetic_member() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let (_, c_class) =
        fixture.register_class("C", vec![], vec![TypeId::ANY], fixture.new_scope());

    let member = lookup_class_member(
        db,
        c_class,
        fixture.atom("whatever"),
        ClassMemberLookupFlags::default(),
    )
    .unwrap();
    assert_eq!(member.symbol.declared_type, Some(TypeId::UNKNOWN));
    assert!(!member.is_type_declared);
    assert!(matches!(db.type_data(member.class_type).kind, TypeKind::Any));
}

#[test]
fn test_get_class_fields_recursive_overrides() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let (base_def, base_class) =
        fixture.register_class("Base", vec![], vec![fixture.object], fixture.new_scope());
    fixture.set_fields(
        base_def,
        vec![
            ("value", Symbol::instance_member(Some(fixture.int))),
            ("base_only", Symbol::instance_member(Some(fixture.bool_))),
            ("untyped", Symbol::instance_member(None)),
        ],
    );
    let (child_def, child_class) =
        fixture.register_class("Child", vec![], vec![base_class], fixture.new_scope());
    fixture.set_fields(
        child_def,
        vec![("value", Symbol::instance_member(Some(fixture.str_)))],
    );

    let fields = get_class_fields_recursive(db, child_class);
    assert_eq!(
        fields.get(&fixture.atom("value")).unwrap().symbol.declared_type,
        Some(fixture.str_)
    );
    assert!(fields.contains_key(&fixture.atom("base_only")));
    // Untyped declarations are not collected.
    assert!(!fields.contains_key(&fixture.atom("untyped")));
}
