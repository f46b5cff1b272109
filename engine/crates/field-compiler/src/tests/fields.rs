//! End-to-end checks of the declaration pipeline: declare a query, build the
//! field, invoke the compiled query and run the resulting tree against the
//! in-memory provider.

use std::sync::{Arc, Mutex};

use crate::{BuildError, FieldBuilder};
use field_registry::{Registry, RegistryError, Resolution};
use query_ir::{eval::eval_query, methods, Expr, Parameter, QueryLambda, TypeRef};
use serde_json::{json, Value};

fn sample_context() -> Value {
    json!({
        "owner": "ada",
        "items": [
            { "id": 1, "name": "one" },
            { "id": 2, "name": "two" },
            { "id": 3, "name": "three" },
        ]
    })
}

/// `(ctx, args) -> ctx.items.first((x) -> x.id == args.id)`
fn item_by_id() -> QueryLambda {
    let ctx = Parameter::fresh("ctx", TypeRef::Context);
    let args = Parameter::fresh("args", TypeRef::named("ItemArgs"));
    let item = Parameter::fresh("x", TypeRef::named("Item"));

    QueryLambda::new(
        vec![ctx.clone(), args.clone()],
        Expr::param(&ctx).property("items").queryable_call(
            methods::FIRST,
            vec![Expr::lambda(
                vec![item.clone()],
                Expr::param(&item)
                    .property("id")
                    .eq(Expr::param(&args).property("id")),
                TypeRef::named("Boolean"),
            )],
        ),
        TypeRef::named("Item"),
    )
}

#[test]
fn predicated_first_becomes_a_deferred_filter() {
    let mut registry = Registry::new();
    FieldBuilder::new(&mut registry)
        .field_with_args("item", item_by_id(), None)
        .unwrap();

    let field = registry.field("item").unwrap();
    assert_eq!(field.resolution, Resolution::First);

    let tree = field.query.invoke(&json!({ "id": 2 })).unwrap();
    insta::assert_snapshot!(
        tree.to_string(),
        @"(ctx, root) -> ctx.items.where((x) -> x.id == 2)"
    );

    // The compiled query fetches the filtered sequence; the reduction is the
    // engine's to apply afterwards.
    let ctx = sample_context();
    let fetched = eval_query(&tree, &[ctx.clone(), ctx]).unwrap();
    assert_eq!(fetched, json!([{ "id": 2, "name": "two" }]));
}

#[test]
fn bare_first_passes_the_source_through() {
    let ctx = Parameter::fresh("ctx", TypeRef::Context);
    let declared = QueryLambda::new(
        vec![ctx.clone()],
        Expr::param(&ctx)
            .property("items")
            .queryable_call(methods::FIRST, vec![]),
        TypeRef::named("Item"),
    );

    let mut registry = Registry::new();
    FieldBuilder::new(&mut registry)
        .field("first_item", declared, None)
        .unwrap();

    let field = registry.field("first_item").unwrap();
    assert_eq!(field.resolution, Resolution::First);

    let tree = field.query.invoke(&Value::Null).unwrap();
    insta::assert_snapshot!(tree.to_string(), @"(ctx, root) -> ctx.items");
}

#[test]
fn unmodified_fields_evaluate_identically_to_their_declaration() {
    let ctx = Parameter::fresh("ctx", TypeRef::Context);
    let declared = QueryLambda::new(
        vec![ctx.clone()],
        Expr::param(&ctx).property("owner"),
        TypeRef::named("String"),
    );

    let direct = eval_query(&declared, &[sample_context()]).unwrap();

    let mut registry = Registry::new();
    FieldBuilder::new(&mut registry)
        .field("owner", declared, None)
        .unwrap();

    let field = registry.field("owner").unwrap();
    assert_eq!(field.resolution, Resolution::Unmodified);

    let tree = field.query.invoke(&Value::Null).unwrap();
    let context = sample_context();
    let through_field = eval_query(&tree, &[context.clone(), context]).unwrap();

    assert_eq!(through_field, direct);
}

#[test]
fn list_fields_bypass_classification() {
    let ctx = Parameter::fresh("ctx", TypeRef::Context);
    let item = Parameter::fresh("x", TypeRef::named("Item"));

    // Even a body whose root is a recognized reduction-shaped call is tagged
    // `to_list`; list declarations never go through the classifier.
    let declared = QueryLambda::new(
        vec![ctx.clone()],
        Expr::param(&ctx).property("items").queryable_call(
            methods::WHERE,
            vec![Expr::lambda(
                vec![item.clone()],
                Expr::param(&item).property("id").eq(Expr::constant(2)).not(),
                TypeRef::named("Boolean"),
            )],
        ),
        TypeRef::sequence(TypeRef::named("Item")),
    );

    let mut registry = Registry::new();
    FieldBuilder::new(&mut registry)
        .list_field("items", declared, None)
        .unwrap();

    let field = registry.field("items").unwrap();
    assert_eq!(field.resolution, Resolution::ToList);

    let tree = field.query.invoke(&Value::Null).unwrap();
    let context = sample_context();
    let fetched = eval_query(&tree, &[context.clone(), context]).unwrap();
    assert_eq!(
        fetched,
        json!([{ "id": 1, "name": "one" }, { "id": 3, "name": "three" }])
    );
}

#[test]
fn specializations_are_independent_trees() {
    let mut registry = Registry::new();
    FieldBuilder::new(&mut registry)
        .field_with_args("item", item_by_id(), None)
        .unwrap();

    let field = registry.field("item").unwrap();
    let one = field.query.invoke(&json!({ "id": 1 })).unwrap();
    let three = field.query.invoke(&json!({ "id": 3 })).unwrap();

    assert_ne!(one, three);

    let context = sample_context();
    assert_eq!(
        eval_query(&one, &[context.clone(), context.clone()]).unwrap(),
        json!([{ "id": 1, "name": "one" }])
    );
    assert_eq!(
        eval_query(&three, &[context.clone(), context]).unwrap(),
        json!([{ "id": 3, "name": "three" }])
    );
}

#[test]
fn specialized_trees_survive_serialization() {
    let mut registry = Registry::new();
    FieldBuilder::new(&mut registry)
        .field_with_args("item", item_by_id(), None)
        .unwrap();

    let tree = registry
        .field("item")
        .unwrap()
        .query
        .invoke(&json!({ "id": 2 }))
        .unwrap();

    // Nothing in the tree depends on the invocation environment: it crosses a
    // serialization boundary untouched and still evaluates.
    let serialized = serde_json::to_string(&tree).unwrap();
    let restored: QueryLambda = serde_json::from_str(&serialized).unwrap();
    assert_eq!(restored, tree);

    let context = sample_context();
    assert_eq!(
        eval_query(&restored, &[context.clone(), context]).unwrap(),
        json!([{ "id": 2, "name": "two" }])
    );
}

#[test]
fn mutation_callbacks_ride_along() {
    let touched = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&touched);

    let mut registry = Registry::new();
    FieldBuilder::new(&mut registry)
        .field_with_args(
            "item",
            item_by_id(),
            Some(Arc::new(move |_ctx: &mut Value, args: &Value| {
                if let Ok(mut seen) = recorder.lock() {
                    seen.push(args.clone());
                }
            })),
        )
        .unwrap();

    let field = registry.field("item").unwrap();
    let mutation = field.mutation.as_deref().expect("callback is stored");

    // The engine, not the builder, decides when to run it.
    let mut context = sample_context();
    mutation(&mut context, &json!({ "id": 2 }));
    assert_eq!(*touched.lock().unwrap(), vec![json!({ "id": 2 })]);
}

#[test]
fn parameter_count_is_validated_per_entry_point() {
    let mut registry = Registry::new();
    let mut builder = FieldBuilder::new(&mut registry);

    assert_eq!(
        builder.field("item", item_by_id(), None).unwrap_err(),
        BuildError::ParameterCount {
            name: "item".into(),
            expected: 1,
            found: 2,
        }
    );

    let ctx = Parameter::fresh("ctx", TypeRef::Context);
    let scalar = QueryLambda::new(
        vec![ctx.clone()],
        Expr::param(&ctx).property("owner"),
        TypeRef::named("String"),
    );
    assert_eq!(
        builder.list_field("owners", scalar, None).unwrap_err(),
        BuildError::NotASequence {
            name: "owners".into(),
            found: "String".into(),
        }
    );

    assert!(registry.is_empty(), "failed declarations register nothing");
}

#[test]
fn duplicate_declarations_surface_the_registry_error() {
    let mut registry = Registry::new();
    let mut builder = FieldBuilder::new(&mut registry);

    builder.field_with_args("item", item_by_id(), None).unwrap();
    assert_eq!(
        builder.field_with_args("item", item_by_id(), None).unwrap_err(),
        BuildError::Registry(RegistryError::DuplicateField { name: "item".into() })
    );
}
