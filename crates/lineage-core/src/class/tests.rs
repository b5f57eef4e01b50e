use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use super::*;
use crate::Members;

fn named(name: &str, parent: Option<&Class>, members: Members) -> Class {
    Class::builder()
        .name(name)
        .maybe_parent(parent)
        .members(members)
        .build()
}

#[test]
fn test_define_defaults_to_root_parent() {
    let class = Class::define(None, Members::new());
    let parent = class.parent().expect("has a parent");
    assert!(parent.is_root());
    assert_eq!(parent.id(), ClassId::root());
}

#[test]
fn test_root_identity_is_well_known() {
    assert_eq!(Class::root(), Class::root());
    assert!(Class::root().parent().is_none());
    assert!(Class::root().is_root());
    assert!(matches!(Class::root().ancestry_link(), Ancestry::Root));
    assert!(matches!(
        Class::define(None, Members::new()).ancestry_link(),
        Ancestry::Child(_)
    ));
}

#[test]
fn test_ancestry_iterator_walks_to_root() {
    let a = named("A", None, Members::new());
    let b = named("B", Some(&a), Members::new());
    let c = named("C", Some(&b), Members::new());

    let chain: Vec<String> = c.ancestry().map(ToString::to_string).collect();
    assert_eq!(chain, ["C", "B", "A", "root"]);
}

#[test]
fn test_derives_from_self_and_ancestors_only() {
    let a = named("A", None, Members::new());
    let b = named("B", Some(&a), Members::new());
    let unrelated = named("U", None, Members::new());

    assert!(b.derives_from(&b));
    assert!(b.derives_from(&a));
    assert!(b.derives_from(&Class::root()));
    assert!(!b.derives_from(&unrelated));
    // not the reverse query
    assert!(!a.derives_from(&b));
}

#[test]
fn test_compose_members_runs_no_constructor() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let class = Class::define(
        None,
        Members::new().with_method(CONSTRUCTOR, move |_call| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Null)
        }),
    );

    let table = class.compose_members().unwrap();
    assert!(table.contains(CONSTRUCTOR));
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    class.instantiate(&[]).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_composition_nearest_level_wins() {
    let a = named(
        "A",
        None,
        Members::new().with_data("kind", "a").with_data("base", 1i64),
    );
    let b = named("B", Some(&a), Members::new().with_data("kind", "b"));

    let table = b.compose_members().unwrap();
    assert_eq!(table.get("kind"), Some(&Value::from("b")));
    assert_eq!(table.get("base"), Some(&Value::Integer(1)));
}

#[test]
fn test_producer_runs_once_per_instantiation_per_level() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let base = Class::builder()
        .name("Counted")
        .producer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Blueprint::new(Members::new().with_data("n", 1i64)))
        })
        .build();

    base.instantiate(&[]).unwrap();
    base.instantiate(&[]).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    // The ancestor's producer also runs for every child instantiation
    let child = Class::define(Some(&base), Members::new());
    child.instantiate(&[]).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

#[test]
fn test_producer_failure_propagates_without_an_instance() {
    let broken = Class::builder()
        .name("Broken")
        .producer(|| anyhow::bail!("no structure today"))
        .build();

    let err = broken.instantiate(&[]).unwrap_err();
    assert!(matches!(err, ClassError::Structure(_)));

    // A child of a broken level fails the same way
    let child = Class::define(Some(&broken), Members::new().with_data("ok", true));
    let err = child.instantiate(&[]).unwrap_err();
    assert!(matches!(err, ClassError::Structure(_)));
}

#[test]
fn test_omitted_constructor_uses_nearest_ancestor() {
    let base = named(
        "Base",
        None,
        Members::new().with_method(CONSTRUCTOR, |mut call| {
            let who = call.arg(0);
            call.this().set("who", who);
            Ok(Value::Null)
        }),
    );
    let child = named("Child", Some(&base), Members::new().with_data("extra", true));

    let instance = child.instantiate(&[Value::from("ada")]).unwrap();
    assert_eq!(instance.get("who"), Some(&Value::from("ada")));
    assert_eq!(instance.get("extra"), Some(&Value::Boolean(true)));
}

#[test]
fn test_instantiation_without_any_constructor() {
    let class = Class::define(None, Members::new().with_data("n", 7i64));
    let instance = class.instantiate(&[Value::Integer(99)]).unwrap();
    assert_eq!(instance.get("n"), Some(&Value::Integer(7)));
}

#[test]
fn test_empty_builder_yields_bare_class() {
    let class = Class::builder().build();
    let instance = class.instantiate(&[]).unwrap();
    assert_eq!(instance.member_names().count(), 0);
    assert!(instance.instance_of(&class));
    assert!(instance.instance_of(&Class::root()));
    assert!(!instance.instance_of(&Class::builder().build()));
}

#[test]
fn test_class_display_prefers_name() {
    let anonymous = Class::define(None, Members::new());
    let named_class = named("Shape", None, Members::new());
    assert_eq!(named_class.to_string(), "Shape");
    assert!(anonymous.to_string().starts_with('#'));
}

#[test]
fn test_template_instances_copy_independent_values() {
    let class = named(
        "Bag",
        None,
        Members::new().with_data("items", vec![Value::Integer(1)]),
    );
    let mut x = class.instantiate(&[]).unwrap();
    let y = class.instantiate(&[]).unwrap();

    // mutate one instance's copy; the template itself must stay untouched
    let mut items = match x.get("items") {
        Some(Value::List(items)) => items.clone(),
        other => panic!("expected list, got {other:?}"),
    };
    items.push(Value::Integer(2));
    x.set("items", Value::List(items));
    assert_eq!(
        x.get("items"),
        Some(&Value::List(vec![Value::Integer(1), Value::Integer(2)]))
    );
    assert_eq!(y.get("items"), Some(&Value::List(vec![Value::Integer(1)])));
    // later instances still see the original template
    let z = class.instantiate(&[]).unwrap();
    assert_eq!(z.get("items"), Some(&Value::List(vec![Value::Integer(1)])));
}
