use pretty_assertions::assert_eq;
use sigrec_config::PropagationConfig;
use sigrec_engine::{codes, MergeEngine, SignaturePropagator};
use sigrec_types::{
    array_element_type, array_type, names, DiagnosticSink, Signature, Type, TypeArg, TypeEnv,
    TypeParamSlot, TypeUsage, ValueParameter, Variance,
};

use super::fixtures::{method, signature, World};

#[test]
fn vararg_in_supers_turns_array_parameter_into_vararg() {
    let mut world = World::new();
    let unit = world.store.well_known().unit_type();
    let string = world.ty(names::STRING);
    let base = world.class("test.Formatter", vec![]);
    let super_param = ValueParameter::new(
        0,
        "args",
        array_type(&world.store, Variance::Out, string.clone()),
    )
    .with_vararg(true);
    world
        .table
        .insert(base, "format", Signature::new(vec![super_param], unit.clone()));
    let base_ty = world.ty("test.Formatter");
    let sub = world.class("test.Impl", vec![base_ty]);

    let auto = signature(
        vec![(
            "p0",
            array_type(&world.store, Variance::Out, string.clone().make_nullable()).make_nullable(),
        )],
        unit,
    );
    let reconciled = world.reconcile(sub, &method("format", "([Ljava/lang/String;)V"), &auto, None);

    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    assert!(!reconciled.annotated);
    let param = &reconciled.signature.value_params[0];
    assert!(param.is_vararg);
    assert!(!param.ty.nullable);
    assert_eq!(array_element_type(&world.store, &param.ty), Some(string));
}

#[test]
fn mixed_extension_supers_keep_the_plain_shape() {
    let mut world = World::new();
    let unit = world.store.well_known().unit_type();
    let string = world.ty(names::STRING);

    let extension = world.class("test.AsExtension", vec![]);
    world.table.insert(
        extension,
        "apply",
        Signature {
            receiver_type: Some(string.clone()),
            ..signature(vec![], unit.clone())
        },
    );
    let plain = world.class("test.AsParameter", vec![]);
    world
        .table
        .insert(plain, "apply", signature(vec![("s", string.clone())], unit.clone()));
    let supertypes = vec![world.ty("test.AsExtension"), world.ty("test.AsParameter")];
    let sub = world.class("test.Both", supertypes);

    let auto = signature(vec![("p0", string.clone().make_nullable())], unit);
    let reconciled = world.reconcile(sub, &method("apply", "(Ljava/lang/String;)V"), &auto, None);

    let messages: Vec<&str> = reconciled
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec!["Incompatible super methods: some are extension functions, some are not"]
    );
    assert_eq!(reconciled.diagnostics[0].code, codes::PROPAGATION_CONFLICT);
    assert_eq!(
        reconciled.diagnostics[0].context.as_deref(),
        Some("method apply in class test.Both")
    );
    assert_eq!(reconciled.signature.receiver_type, None);
    assert_eq!(reconciled.signature.value_params.len(), 1);
    assert_eq!(reconciled.signature.value_params[0].ty, string);
}

#[test]
fn extension_supers_promote_first_parameter_to_receiver() {
    let mut world = World::new();
    let unit = world.store.well_known().unit_type();
    let string = world.ty(names::STRING);
    let int = world.ty(names::INT);

    let base = world.class("test.Repeater", vec![]);
    world.table.insert(
        base,
        "repeat",
        Signature {
            receiver_type: Some(string.clone()),
            ..signature(vec![("times", int.clone())], unit.clone())
        },
    );
    let base_ty = world.ty("test.Repeater");
    let sub = world.class("test.Impl", vec![base_ty]);

    let auto = signature(
        vec![("p0", string.clone().make_nullable()), ("p1", int.clone())],
        unit,
    );
    let reconciled = world.reconcile(sub, &method("repeat", "(Ljava/lang/String;I)V"), &auto, None);

    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    assert_eq!(reconciled.signature.receiver_type, Some(string));
    assert_eq!(
        reconciled.signature.value_params,
        vec![ValueParameter::new(0, "p1", int)]
    );
}

#[test]
fn read_only_super_bound_conflicts_with_mutable_auto_bound() {
    let world = World::new();
    let string = world.ty(names::STRING);
    let mutable = world.generic(names::MUTABLE_LIST, vec![string.clone()]);
    let read_only = world.generic(names::LIST, vec![string]);
    let mut sink = DiagnosticSink::new();

    let merged = MergeEngine::new(
        &world.store,
        &world.mutability,
        PropagationConfig::default(),
        world.store.well_known().any,
    )
    .merge(&mutable, &[read_only], TypeUsage::UpperBound, &mut sink);

    assert_eq!(merged, mutable);
    assert_eq!(sink.len(), 1);
    assert_eq!(
        sink.diagnostics()[0].message,
        "Incompatible types in superclasses: [List<String>]"
    );
}

#[test]
fn not_null_supers_always_give_not_null_results() {
    let world = World::new();
    let engine = MergeEngine::new(
        &world.store,
        &world.mutability,
        PropagationConfig::default(),
        world.store.well_known().any,
    );
    let string = world.ty(names::STRING);
    let strings = world.generic(names::LIST, vec![string.clone()]);

    for auto in [
        string.clone(),
        string.clone().make_nullable(),
        strings.clone().make_nullable(),
    ] {
        let supers: Vec<Type> = if auto.args.is_empty() {
            vec![string.clone(), string.clone()]
        } else {
            vec![strings.clone()]
        };
        for usage in [TypeUsage::Return, TypeUsage::Parameter, TypeUsage::UpperBound] {
            let mut sink = DiagnosticSink::new();
            let merged = engine.merge(&auto, &supers, usage, &mut sink);
            assert!(!merged.nullable, "{auto:?} at {usage:?}");
            assert!(merged.same_shape(&auto));
        }
    }
}

#[test]
fn merged_types_keep_the_auto_shape() {
    let world = World::new();
    let engine = MergeEngine::new(
        &world.store,
        &world.mutability,
        PropagationConfig::default(),
        world.store.well_known().any,
    );
    let string = world.ty(names::STRING);
    let int = world.ty(names::INT);
    let map_of = |name: &str, key: &Type, value: Type| world.generic(name, vec![key.clone(), value]);

    let auto = map_of(
        names::MUTABLE_MAP,
        &string.clone().make_nullable(),
        world.generic(names::MUTABLE_LIST, vec![int.clone().make_nullable()]).make_nullable(),
    )
    .make_nullable();
    let sup = world.store.class_type(
        names::MAP,
        vec![
            TypeArg::invariant(string.clone()),
            TypeArg::out(world.generic(names::LIST, vec![int.clone()])),
        ],
    );
    let mut sink = DiagnosticSink::new();

    let merged = engine.merge(&auto, &[sup], TypeUsage::Parameter, &mut sink);

    assert!(merged.same_shape(&auto));
    assert_eq!(
        sigrec_types::render_type(&world.store, &merged),
        "Map<String, out List<Int>>"
    );
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
}

#[test]
fn super_type_parameters_are_mapped_onto_refined_parameters() {
    let mut world = World::new();
    let t = world.store.add_member_type_param("T", vec![]);
    let e = world.store.add_member_type_param("E", vec![]);
    let default_bound = world.store.well_known().default_bound();
    let list_of = |world: &World, ty: Type| world.generic(names::LIST, vec![ty]);

    let base = world.class("test.Picker", vec![]);
    let super_signature = Signature {
        type_params: vec![TypeParamSlot::new(e, "E", vec![default_bound.clone()])],
        ..signature(vec![("items", list_of(&world, Type::param(e)))], Type::param(e))
    };
    world.table.insert(base, "first", super_signature);
    let base_ty = world.ty("test.Picker");
    let sub = world.class("test.Impl", vec![base_ty]);

    let auto = Signature {
        type_params: vec![TypeParamSlot::new(t, "T", vec![default_bound.clone()])],
        ..signature(
            vec![("p0", list_of(&world, Type::param(t)).make_nullable())],
            Type::param(t).make_nullable(),
        )
    };
    let reconciled = world.reconcile(
        sub,
        &method("first", "(Ljava/util/List;)Ljava/lang/Object;"),
        &auto,
        None,
    );

    let refined = t.refined();
    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    assert_eq!(
        reconciled.signature.type_params,
        vec![TypeParamSlot::new(refined, "T", vec![default_bound])]
    );
    assert_eq!(
        reconciled.signature.value_params[0].ty,
        list_of(&world, Type::param(refined))
    );
    assert_eq!(reconciled.signature.return_type, Type::param(refined));
}

#[test]
fn reconciling_twice_gives_equal_signatures() {
    let mut world = World::new();
    let string = world.ty(names::STRING);
    let names_signature = signature(vec![], world.generic(names::LIST, vec![string.clone()]));
    let base = world.class("test.Source", vec![]);
    world.table.insert(base, "names", names_signature);
    let base_ty = world.ty("test.Source");
    let sub = world.class("test.Impl", vec![base_ty]);

    let auto = signature(
        vec![],
        world
            .generic(names::MUTABLE_LIST, vec![string.make_nullable()])
            .make_nullable(),
    );
    let host = method("names", "()Ljava/util/List;");

    let first = world.reconcile(sub, &host, &auto, None);
    let second = world.reconcile(sub, &host, &auto, None);
    assert_eq!(first, second);
    assert_eq!(
        sigrec_types::render_type(&world.store, &first.signature.return_type),
        "List<String>"
    );
}

#[test]
fn propagator_without_overridden_members_returns_auto_signature() {
    let mut world = World::new();
    let sub = world.class("test.Lonely", vec![]);
    let auto = signature(
        vec![("p0", world.ty(names::STRING).make_nullable())],
        world.store.well_known().unit_type(),
    );
    let mut sink = DiagnosticSink::new();

    let propagated = SignaturePropagator::new(
        &world.store,
        &world.table,
        &world.analogs,
        &world.mutability,
        PropagationConfig::default(),
    )
    .propagate(&method("go", "(Ljava/lang/String;)V"), sub, &auto, &mut sink);

    assert_eq!(propagated, auto);
    assert!(sink.is_empty());
}

fn merge_engine(world: &World, config: PropagationConfig) -> MergeEngine<'_> {
    MergeEngine::new(
        &world.store,
        &world.mutability,
        config,
        world.store.well_known().any,
    )
}

#[test]
fn read_only_super_in_invariant_array_slot_keeps_mutable_return() {
    let world = World::new();
    let string = world.ty(names::STRING);
    let auto = array_type(
        &world.store,
        Variance::Invariant,
        world.generic(names::MUTABLE_LIST, vec![string.clone()]),
    );
    let sup = array_type(
        &world.store,
        Variance::Invariant,
        world.generic(names::LIST, vec![string]),
    );
    let mut sink = DiagnosticSink::new();

    let merged = merge_engine(&world, PropagationConfig { report_array_return: false })
        .merge(&auto, &[sup], TypeUsage::Return, &mut sink);

    assert_eq!(merged, auto);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.diagnostics()[0].code, codes::PROPAGATION_CONFLICT);
    assert_eq!(
        sink.diagnostics()[0].message,
        "Incompatible types in superclasses: [List<String>]"
    );
}

#[test]
fn read_only_map_value_conflicts_with_mutable_return_value() {
    let world = World::new();
    let string = world.ty(names::STRING);
    let map_of = |value: Type| world.generic(names::MUTABLE_MAP, vec![string.clone(), value]);
    let auto = map_of(world.generic(names::MUTABLE_LIST, vec![string.clone()]));
    let sup = map_of(world.generic(names::LIST, vec![string.clone()]));
    let mut sink = DiagnosticSink::new();

    let merged = merge_engine(&world, PropagationConfig::default()).merge(
        &auto,
        &[sup],
        TypeUsage::Return,
        &mut sink,
    );

    assert_eq!(merged, auto);
    let messages: Vec<&str> = sink
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec!["Incompatible types in superclasses: [List<String>]"]
    );
}

#[test]
fn supers_disagreeing_on_vararg_keep_the_parameter_as_is() {
    let mut world = World::new();
    let unit = world.store.well_known().unit_type();
    let string = world.ty(names::STRING);
    let strings = array_type(&world.store, Variance::Out, string.clone());

    let vararg = world.class("test.VarargFormatter", vec![]);
    world.table.insert(
        vararg,
        "format",
        Signature::new(
            vec![ValueParameter::new(0, "args", strings.clone()).with_vararg(true)],
            unit.clone(),
        ),
    );
    let plain = world.class("test.ArrayFormatter", vec![]);
    world
        .table
        .insert(plain, "format", signature(vec![("args", strings.clone())], unit.clone()));
    let supertypes = vec![world.ty("test.VarargFormatter"), world.ty("test.ArrayFormatter")];
    let sub = world.class("test.Both", supertypes);

    let auto = signature(
        vec![(
            "p0",
            array_type(&world.store, Variance::Out, string.make_nullable()).make_nullable(),
        )],
        unit,
    );
    let reconciled = world.reconcile(sub, &method("format", "([Ljava/lang/String;)V"), &auto, None);

    let messages: Vec<&str> = reconciled
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec!["Incompatible super methods: some have vararg parameter, some have not"]
    );
    assert_eq!(reconciled.diagnostics[0].code, codes::PROPAGATION_CONFLICT);
    let param = &reconciled.signature.value_params[0];
    assert!(!param.is_vararg);
    assert_eq!(param.ty, strings);
}

#[test]
fn plain_array_supers_turn_vararg_parameter_into_array() {
    let mut world = World::new();
    let unit = world.store.well_known().unit_type();
    let string = world.ty(names::STRING);
    let strings = array_type(&world.store, Variance::Out, string.clone());

    let base = world.class("test.ArrayFormatter", vec![]);
    world
        .table
        .insert(base, "format", signature(vec![("args", strings.clone())], unit.clone()));
    let base_ty = world.ty("test.ArrayFormatter");
    let sub = world.class("test.Impl", vec![base_ty]);

    let mut auto = signature(
        vec![(
            "p0",
            array_type(&world.store, Variance::Invariant, string.make_nullable()).make_nullable(),
        )],
        unit,
    );
    auto.value_params[0].is_vararg = true;
    let reconciled = world.reconcile(
        sub,
        &method("format", "([Ljava/lang/String;)V").with_varargs(true),
        &auto,
        None,
    );

    assert!(reconciled.diagnostics.is_empty(), "{:?}", reconciled.diagnostics);
    let param = &reconciled.signature.value_params[0];
    assert!(!param.is_vararg);
    assert_eq!(param.ty, strings);
}

#[test]
fn raw_type_becomes_the_containing_class_type_parameter() {
    let mut world = World::new();
    let (boxed, t) = world.generic_class("test.Box");
    let raw = world.ty(names::ANY).make_nullable();
    let mut sink = DiagnosticSink::new();

    let merged = MergeEngine::new(
        &world.store,
        &world.mutability,
        PropagationConfig::default(),
        boxed,
    )
    .merge(&raw, &[t.clone()], TypeUsage::Parameter, &mut sink);

    assert_eq!(merged, t);
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());

    let elsewhere = merge_engine(&world, PropagationConfig::default()).merge(
        &raw,
        &[t],
        TypeUsage::Parameter,
        &mut sink,
    );
    assert_eq!(elsewhere, world.ty(names::ANY));
}

#[test]
fn conflicting_projection_kinds_keep_the_computed_projection() {
    let world = World::new();
    let string = world.ty(names::STRING);
    let auto = array_type(&world.store, Variance::Invariant, string.clone().make_nullable())
        .make_nullable();
    let supers = vec![
        array_type(&world.store, Variance::Out, string.clone()),
        array_type(&world.store, Variance::In, string.clone()),
    ];
    let mut sink = DiagnosticSink::new();

    let merged = merge_engine(&world, PropagationConfig::default()).merge(
        &auto,
        &supers,
        TypeUsage::Return,
        &mut sink,
    );

    assert_eq!(merged, array_type(&world.store, Variance::Invariant, string));
    assert_eq!(sink.len(), 1);
    assert_eq!(
        sink.diagnostics()[0].message,
        "Incompatible projection kinds in type arguments of super methods' return types: [out String, in String], defined in current: String?"
    );
}

#[test]
fn covariant_nullable_super_does_not_widen_a_not_null_return() {
    let world = World::new();
    let string = world.ty(names::STRING);
    let mut sink = DiagnosticSink::new();

    let merged = merge_engine(&world, PropagationConfig::default()).merge(
        &string.clone().make_nullable(),
        &[string.clone(), string.clone().make_nullable()],
        TypeUsage::Return,
        &mut sink,
    );

    assert_eq!(merged, string);
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
}
