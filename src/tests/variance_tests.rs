use super::*;
use crate::db::TypeDatabase;
use crate::test_fixtures::Fixture;
use crate::types::*;

#[test]
fn test_unknown_and_auto_accept_anything() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let list_of_int = fixture.list_of(fixture.int);
    assert!(is_variance_of_type_argument_compatible(db, list_of_int, Variance::Unknown));
    assert!(is_variance_of_type_argument_compatible(db, list_of_int, Variance::Auto));
}

#[test]
fn test_concrete_argument_positions() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let list_of_int = fixture.list_of(fixture.int);

    assert!(is_variance_of_type_argument_compatible(db, list_of_int, Variance::Covariant));
    assert!(is_variance_of_type_argument_compatible(db, list_of_int, Variance::Invariant));
    assert!(!is_variance_of_type_argument_compatible(
        db,
        list_of_int,
        Variance::Contravariant
    ));
}

#[test]
fn test_type_var_argument_matches_declared_variance() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let scope = fixture.new_scope();

    let covariant = {
        let mut shape = TypeVarShape::plain(fixture.atom("T_co"), Some(scope));
        shape.variance = Variance::Covariant;
        db.type_var(shape)
    };
    let contravariant = {
        let mut shape = TypeVarShape::plain(fixture.atom("T_contra"), Some(scope));
        shape.variance = Variance::Contravariant;
        db.type_var(shape)
    };
    let invariant = fixture.plain_var("T", scope);

    assert!(is_variance_of_type_argument_compatible(db, covariant, Variance::Covariant));
    assert!(!is_variance_of_type_argument_compatible(
        db,
        covariant,
        Variance::Contravariant
    ));
    assert!(is_variance_of_type_argument_compatible(
        db,
        contravariant,
        Variance::Contravariant
    ));
    assert!(!is_variance_of_type_argument_compatible(db, contravariant, Variance::Covariant));
    // A variable without declared co/contra variance fits anywhere.
    assert!(is_variance_of_type_argument_compatible(db, invariant, Variance::Covariant));
    assert!(is_variance_of_type_argument_compatible(
        db,
        invariant,
        Variance::Contravariant
    ));
}

#[test]
fn test_composition_flips_through_contravariant_parameter() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let scope = fixture.new_scope();

    // class Sink[T_contra]
    let t_contra = {
        let mut shape = TypeVarShape::plain(fixture.atom("T_contra"), Some(scope));
        shape.variance = Variance::Contravariant;
        db.type_var(shape)
    };
    let (sink_def, _) =
        fixture.register_class("Sink", vec![t_contra], vec![fixture.object], scope);

    let other_scope = fixture.new_scope();
    let u_co = {
        let mut shape = TypeVarShape::plain(fixture.atom("U_co"), Some(other_scope));
        shape.variance = Variance::Covariant;
        db.type_var(shape)
    };

    // Sink[U_co] in a covariant position: U_co lands in an effective
    // contravariant position and is rejected.
    let sink_of_u = db.class_instance(sink_def, Some(vec![u_co]));
    assert!(!is_variance_of_type_argument_compatible(db, sink_of_u, Variance::Covariant));

    // In a contravariant position the composition flips back.
    // The class itself is concrete, so the position still rejects it.
    assert!(!is_variance_of_type_argument_compatible(
        db,
        sink_of_u,
        Variance::Contravariant
    ));
}

#[test]
fn test_union_argument_checks_all_members() {
    let fixture = Fixture::new();
    let db = &fixture.db;
    let union = db.union(vec![fixture.int, fixture.str_]);
    assert!(is_variance_of_type_argument_compatible(db, union, Variance::Covariant));
    assert!(!is_variance_of_type_argument_compatible(
        db,
        union,
        Variance::Contravariant
    ));
}
