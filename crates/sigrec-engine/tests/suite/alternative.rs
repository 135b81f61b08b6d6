use pretty_assertions::assert_eq;
use sigrec_config::ReconcileConfig;
use sigrec_engine::syntax::{
    AltFunction, AltParameter, AltProperty, AltTypeParameter, ArgNode, FunctionTypeNode, TypeNode,
};
use sigrec_engine::{codes, HostField};
use sigrec_types::{
    array_type, names, render_type, Severity, Signature, Type, TypeEnv, TypeParamSlot,
    ValueParameter, Variance,
};

use super::fixtures::{method, signature, World};

fn function(name: &str, params: Vec<AltParameter>, return_type: Option<TypeNode>) -> AltFunction {
    AltFunction {
        name: name.to_string(),
        type_params: vec![],
        receiver: None,
        params,
        return_type,
    }
}

#[test]
fn argument_count_mismatch_falls_back_to_computed_signature() {
    let mut world = World::new();
    let holder = world.class("test.Holder", vec![]);
    let string = world.ty(names::STRING).make_nullable();
    let int = world.ty(names::INT).make_nullable();
    let auto = signature(vec![], world.generic(names::MAP, vec![string, int]).make_nullable());
    let alt = function(
        "entries",
        vec![],
        Some(TypeNode::named(
            "Map",
            vec![ArgNode::invariant(TypeNode::simple("String"))],
        )),
    );

    let reconciled = world.reconcile(
        holder,
        &method("entries", "()Ljava/util/Map;"),
        &auto,
        Some(&alt),
    );

    assert_eq!(reconciled.signature, auto);
    assert!(reconciled.annotated);
    assert!(reconciled.has_errors());
    assert_eq!(reconciled.diagnostics.len(), 1);
    let diagnostic = &reconciled.diagnostics[0];
    assert_eq!(diagnostic.code, codes::ALT_SIGNATURE_MISMATCH);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(
        diagnostic.context.as_deref(),
        Some("method entries in class test.Holder")
    );
    assert!(diagnostic.message.contains("has 2 type arguments"), "{}", diagnostic.message);
    assert!(diagnostic.message.contains("has 1 of them"), "{}", diagnostic.message);
}

#[test]
fn vararg_alternative_gives_covariant_array_of_matched_element() {
    let mut world = World::new();
    let holder = world.class("test.Joiner", vec![]);
    let string = world.ty(names::STRING);
    let unit = world.store.well_known().unit_type();
    let strings =
        array_type(&world.store, Variance::Invariant, string.clone().make_nullable()).make_nullable();
    let mut auto = signature(vec![("p0", strings)], unit.clone());
    auto.value_params[0].is_vararg = true;
    let alt = function(
        "join",
        vec![AltParameter::vararg("parts", TypeNode::simple("String"))],
        None,
    );

    let reconciled = world.reconcile(
        holder,
        &method("join", "([Ljava/lang/String;)V").with_varargs(true),
        &auto,
        Some(&alt),
    );

    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    assert_eq!(
        reconciled.signature.value_params,
        vec![ValueParameter::new(0, "parts", array_type(&world.store, Variance::Out, string))
            .with_vararg(true)]
    );
    assert_eq!(reconciled.signature.return_type, unit);
}

#[test]
fn primitive_vararg_keeps_the_primitive_array() {
    let mut world = World::new();
    let holder = world.class("test.Summer", vec![]);
    let int_array = world.ty("kotlin.IntArray");
    let mut auto = signature(
        vec![("p0", int_array.clone().make_nullable())],
        world.ty(names::INT),
    );
    auto.value_params[0].is_vararg = true;
    let alt = function(
        "sum",
        vec![AltParameter::vararg("values", TypeNode::simple("Int"))],
        Some(TypeNode::simple("Int")),
    );

    let reconciled = world.reconcile(holder, &method("sum", "([I)I"), &auto, Some(&alt));

    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    let param = &reconciled.signature.value_params[0];
    assert_eq!(param.ty, int_array);
    assert!(param.is_vararg);
    assert_eq!(param.name, "values");
}

#[test]
fn vararg_flag_must_agree() {
    let mut world = World::new();
    let holder = world.class("test.Joiner", vec![]);
    let strings = array_type(&world.store, Variance::Invariant, world.ty(names::STRING)).make_nullable();
    let auto = signature(vec![("p0", strings)], world.store.well_known().unit_type());
    let alt = function(
        "join",
        vec![AltParameter::vararg("parts", TypeNode::simple("String"))],
        None,
    );

    let reconciled = world.reconcile(holder, &method("join", "([Ljava/lang/String;)V"), &auto, Some(&alt));

    assert_eq!(reconciled.signature, auto);
    assert_eq!(
        reconciled.diagnostics[0].message,
        "Parameter in method signature is not vararg, but in alternative signature it is vararg"
    );
}

#[test]
fn redundant_projection_strictness_comes_from_config() {
    let mut world = World::new();
    let holder = world.class("test.Source", vec![]);
    let strings = world
        .generic(names::LIST, vec![world.ty(names::STRING).make_nullable()])
        .make_nullable();
    let auto = signature(vec![], strings);
    let alt = function(
        "items",
        vec![],
        Some(TypeNode::named(
            "List",
            vec![ArgNode::out(TypeNode::simple("String"))],
        )),
    );
    let host = method("items", "()Ljava/util/List;");

    let lenient = world.reconcile(holder, &host, &auto, Some(&alt));
    assert!(!lenient.has_errors());
    assert_eq!(lenient.diagnostics.len(), 1);
    assert_eq!(lenient.diagnostics[0].code, codes::ALT_REDUNDANT_PROJECTION);
    assert_eq!(
        render_type(&world.store, &lenient.signature.return_type),
        "List<String>"
    );

    let config = ReconcileConfig::load_from_str("[matcher]\nstrict_projections = true\n")
        .expect("valid config");
    let strict = world
        .reconciler(config)
        .reconcile_method(holder, &host, &auto, Some(&alt));
    assert!(strict.has_errors());
    assert_eq!(strict.signature, auto);
    assert_eq!(strict.diagnostics[0].message, "Projection kind 'out' is redundant");
}

#[test]
fn alternative_is_applied_on_top_of_propagated_signature() {
    let mut world = World::new();
    let string = world.ty(names::STRING);
    let items = signature(vec![], world.generic(names::LIST, vec![string.clone()]));
    let base = world.class("test.Source", vec![]);
    world.table.insert(base, "items", items);
    let base_ty = world.ty("test.Source");
    let sub = world.class("test.Impl", vec![base_ty]);

    let auto = signature(
        vec![],
        world
            .generic(names::MUTABLE_LIST, vec![string.clone().make_nullable()])
            .make_nullable(),
    );
    let alt = function(
        "items",
        vec![],
        Some(TypeNode::named(
            "MutableList",
            vec![ArgNode::invariant(TypeNode::simple("String"))],
        )),
    );

    let reconciled = world.reconcile(sub, &method("items", "()Ljava/util/List;"), &auto, Some(&alt));

    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    assert_eq!(
        reconciled.signature.return_type,
        world.generic(names::MUTABLE_LIST, vec![string])
    );
}

#[test]
fn changed_parameter_type_breaks_the_override() {
    let mut world = World::new();
    let string = world.ty(names::STRING);
    let unit = world.store.well_known().unit_type();
    let accept = signature(
        vec![("items", world.generic(names::LIST, vec![string.clone()]))],
        unit.clone(),
    );
    let base = world.class("test.Sink", vec![]);
    world.table.insert(base, "accept", accept);
    let base_ty = world.ty("test.Sink");
    let sub = world.class("test.Impl", vec![base_ty]);

    let auto = signature(
        vec![(
            "p0",
            world
                .generic(names::MUTABLE_LIST, vec![string.clone().make_nullable()])
                .make_nullable(),
        )],
        unit,
    );
    let alt = function(
        "accept",
        vec![AltParameter::new(
            "items",
            TypeNode::named(
                "MutableList",
                vec![ArgNode::invariant(TypeNode::simple("String"))],
            ),
        )],
        None,
    );

    let reconciled = world.reconcile(
        sub,
        &method("accept", "(Ljava/util/List;)V"),
        &auto,
        Some(&alt),
    );

    assert_eq!(reconciled.diagnostics.len(), 1);
    assert_eq!(reconciled.diagnostics[0].code, codes::ALT_SIGNATURE_OVERRIDE);
    assert_eq!(
        reconciled.diagnostics[0].message,
        "Parameter type changed for method which overrides another: MutableList<String>, was: List<String>"
    );
    assert_eq!(
        reconciled.signature.value_params[0].ty,
        world.generic(names::LIST, vec![string])
    );
}

#[test]
fn extension_alternatives_are_unsupported() {
    let mut world = World::new();
    let holder = world.class("test.Holder", vec![]);
    let auto = signature(
        vec![("p0", world.ty(names::STRING).make_nullable())],
        world.store.well_known().unit_type(),
    );
    let alt = AltFunction {
        receiver: Some(TypeNode::simple("String")),
        ..function("print", vec![], None)
    };

    let reconciled = world.reconcile(
        holder,
        &method("print", "(Ljava/lang/String;)V"),
        &auto,
        Some(&alt),
    );

    assert_eq!(reconciled.signature, auto);
    assert_eq!(reconciled.diagnostics[0].code, codes::ALT_SIGNATURE_UNSUPPORTED);
    assert_eq!(
        reconciled.diagnostics[0].message,
        "Extension functions are not supported yet"
    );
}

#[test]
fn field_alternatives_check_mutability() {
    let mut world = World::new();
    let holder = world.class("test.Counter", vec![]);
    let int = world.ty(names::INT);
    let field = HostField {
        name: "count".to_string(),
        is_final: true,
    };
    let reconciler = world.reconciler(ReconcileConfig::default());

    let accepted = reconciler.reconcile_field(
        holder,
        &field,
        &int,
        Some(&AltProperty {
            name: "count".to_string(),
            is_var: false,
            ty: Some(TypeNode::simple("Int")),
        }),
    );
    assert!(accepted.diagnostics.is_empty(), "{:?}", accepted.diagnostics);
    assert_eq!(accepted.signature, int);

    let rejected = reconciler.reconcile_field(
        holder,
        &field,
        &int,
        Some(&AltProperty {
            name: "count".to_string(),
            is_var: true,
            ty: Some(TypeNode::simple("Int")),
        }),
    );
    assert!(rejected.annotated);
    assert_eq!(rejected.signature, int);
    assert_eq!(
        rejected.diagnostics[0].message,
        "Wrong mutability in annotation for field"
    );
    assert_eq!(
        rejected.diagnostics[0].context.as_deref(),
        Some("field count in class test.Counter")
    );
}

#[test]
fn warnings_from_rejected_alternative_are_dropped() {
    let mut world = World::new();
    let string = world.ty(names::STRING);
    let unit = world.store.well_known().unit_type();
    let strings = world.generic(names::LIST, vec![string.clone()]);
    let accept = signature(vec![("a", strings.clone()), ("b", strings)], unit.clone());
    let base = world.class("test.Sink", vec![]);
    world.table.insert(base, "accept", accept);
    let base_ty = world.ty("test.Sink");
    let sub = world.class("test.Impl", vec![base_ty]);

    let mutable = world
        .generic(names::MUTABLE_LIST, vec![string.make_nullable()])
        .make_nullable();
    let auto = signature(vec![("p0", mutable.clone()), ("p1", mutable)], unit);
    let alt = function(
        "accept",
        vec![
            AltParameter::new(
                "a",
                TypeNode::named(
                    "MutableList",
                    vec![ArgNode::invariant(TypeNode::simple("String"))],
                ),
            ),
            AltParameter::new(
                "b",
                TypeNode::named("List", vec![ArgNode::out(TypeNode::simple("String"))]),
            ),
        ],
        None,
    );

    let reconciled = world.reconcile(
        sub,
        &method("accept", "(Ljava/util/List;Ljava/util/List;)V"),
        &auto,
        Some(&alt),
    );

    assert_eq!(reconciled.diagnostics.len(), 1, "{:?}", reconciled.diagnostics);
    assert_eq!(reconciled.diagnostics[0].code, codes::ALT_SIGNATURE_OVERRIDE);
    assert!(reconciled.has_errors());
}

#[test]
fn function_type_sugar_matches_function_classifier() {
    let mut world = World::new();
    let holder = world.class("test.Events", vec![]);
    let string = world.ty(names::STRING);
    let unit = world.store.well_known().unit_type();
    let callback = world
        .generic(
            &names::function(1),
            vec![string.make_nullable(), unit.clone().make_nullable()],
        )
        .make_nullable();
    let auto = signature(vec![], callback);
    let alt = function(
        "listener",
        vec![],
        Some(TypeNode::Function(FunctionTypeNode {
            receiver: None,
            params: vec![TypeNode::simple("String")],
            ret: Box::new(TypeNode::simple("Unit")),
        })),
    );

    let reconciled = world.reconcile(
        holder,
        &method("listener", "()Lkotlin/jvm/functions/Function1;"),
        &auto,
        Some(&alt),
    );

    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    assert!(reconciled.annotated);
    assert!(!reconciled.signature.return_type.nullable);
    assert_eq!(
        render_type(&world.store, &reconciled.signature.return_type),
        "Function1<String, Unit>"
    );
}

fn bounded_signature(world: &mut World) -> (Signature, Type) {
    let bound = world.ty(names::CHAR_SEQUENCE).make_nullable();
    let t = world.store.add_member_type_param("T", vec![bound.clone()]);
    let auto = Signature {
        type_params: vec![TypeParamSlot::new(t, "T", vec![bound])],
        ..signature(
            vec![("p0", Type::param(t).make_nullable())],
            world.store.well_known().unit_type(),
        )
    };
    (auto, Type::param(t.refined()))
}

#[test]
fn type_parameter_bounds_are_matched_against_alternative() {
    let mut world = World::new();
    let holder = world.class("test.Printer", vec![]);
    let (auto, refined) = bounded_signature(&mut world);
    let alt = AltFunction {
        type_params: vec![AltTypeParameter {
            name: "T".to_string(),
            bounds: vec![TypeNode::simple("CharSequence")],
        }],
        ..function(
            "print",
            vec![AltParameter::new("text", TypeNode::simple("T"))],
            None,
        )
    };

    let reconciled = world.reconcile(
        holder,
        &method("print", "(Ljava/lang/CharSequence;)V"),
        &auto,
        Some(&alt),
    );

    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    let slot = &reconciled.signature.type_params[0];
    assert_eq!(slot.name(), "T");
    assert_eq!(slot.upper_bounds(), &[world.ty(names::CHAR_SEQUENCE)][..]);
    assert_eq!(reconciled.signature.value_params[0].name, "text");
    assert_eq!(reconciled.signature.value_params[0].ty, refined);
}

#[test]
fn missing_alternative_bound_is_a_mismatch() {
    let mut world = World::new();
    let holder = world.class("test.Printer", vec![]);
    let (auto, _) = bounded_signature(&mut world);
    let alt = AltFunction {
        type_params: vec![AltTypeParameter {
            name: "T".to_string(),
            bounds: vec![],
        }],
        ..function(
            "print",
            vec![AltParameter::new("text", TypeNode::simple("T"))],
            None,
        )
    };

    let reconciled = world.reconcile(
        holder,
        &method("print", "(Ljava/lang/CharSequence;)V"),
        &auto,
        Some(&alt),
    );

    assert_eq!(reconciled.signature, auto);
    assert_eq!(reconciled.diagnostics.len(), 1);
    assert_eq!(reconciled.diagnostics[0].code, codes::ALT_SIGNATURE_MISMATCH);
    assert_eq!(
        reconciled.diagnostics[0].message,
        "Upper bound number mismatch for T. Expected 1, but found 0"
    );
}
