use crate::{
    ClassDef, ClassId, ClassKind, Type, TypeArg, TypeEnv, TypeParamDef, TypeParamOwner, TypeStore,
    Variance,
};

/// Fully-qualified names of the builtin classifiers.
pub mod names {
    pub const ANY: &str = "kotlin.Any";
    pub const UNIT: &str = "kotlin.Unit";
    pub const NOTHING: &str = "kotlin.Nothing";
    pub const STRING: &str = "kotlin.String";
    pub const CHAR_SEQUENCE: &str = "kotlin.CharSequence";
    pub const NUMBER: &str = "kotlin.Number";
    pub const COMPARABLE: &str = "kotlin.Comparable";
    pub const ARRAY: &str = "kotlin.Array";

    pub const BOOLEAN: &str = "kotlin.Boolean";
    pub const BYTE: &str = "kotlin.Byte";
    pub const CHAR: &str = "kotlin.Char";
    pub const SHORT: &str = "kotlin.Short";
    pub const INT: &str = "kotlin.Int";
    pub const LONG: &str = "kotlin.Long";
    pub const FLOAT: &str = "kotlin.Float";
    pub const DOUBLE: &str = "kotlin.Double";

    pub const ITERABLE: &str = "kotlin.collections.Iterable";
    pub const MUTABLE_ITERABLE: &str = "kotlin.collections.MutableIterable";
    pub const COLLECTION: &str = "kotlin.collections.Collection";
    pub const MUTABLE_COLLECTION: &str = "kotlin.collections.MutableCollection";
    pub const LIST: &str = "kotlin.collections.List";
    pub const MUTABLE_LIST: &str = "kotlin.collections.MutableList";
    pub const SET: &str = "kotlin.collections.Set";
    pub const MUTABLE_SET: &str = "kotlin.collections.MutableSet";
    pub const MAP: &str = "kotlin.collections.Map";
    pub const MUTABLE_MAP: &str = "kotlin.collections.MutableMap";
    pub const MAP_ENTRY: &str = "kotlin.collections.Map.Entry";
    pub const MUTABLE_MAP_ENTRY: &str = "kotlin.collections.MutableMap.MutableEntry";
    pub const ITERATOR: &str = "kotlin.collections.Iterator";
    pub const MUTABLE_ITERATOR: &str = "kotlin.collections.MutableIterator";
    pub const LIST_ITERATOR: &str = "kotlin.collections.ListIterator";
    pub const MUTABLE_LIST_ITERATOR: &str = "kotlin.collections.MutableListIterator";

    /// Primitive classes paired with their specialized array classes.
    pub const PRIMITIVES: &[(&str, &str)] = &[
        (BOOLEAN, "kotlin.BooleanArray"),
        (BYTE, "kotlin.ByteArray"),
        (CHAR, "kotlin.CharArray"),
        (SHORT, "kotlin.ShortArray"),
        (INT, "kotlin.IntArray"),
        (LONG, "kotlin.LongArray"),
        (FLOAT, "kotlin.FloatArray"),
        (DOUBLE, "kotlin.DoubleArray"),
    ];

    /// Highest arity for which `FunctionN`/`ExtensionFunctionN` are registered.
    pub const MAX_FUNCTION_ARITY: usize = 3;

    pub fn function(arity: usize) -> String {
        format!("kotlin.Function{arity}")
    }

    pub fn extension_function(arity: usize) -> String {
        format!("kotlin.ExtensionFunction{arity}")
    }
}

/// A specialized primitive array class and its element class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimitiveArray {
    pub array: ClassId,
    pub element: ClassId,
}

/// Ids of the classifiers the engine needs to recognize directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub any: ClassId,
    pub unit: ClassId,
    pub nothing: ClassId,
    pub string: ClassId,
    pub array: ClassId,
    pub comparable: ClassId,
    pub primitive_arrays: Vec<PrimitiveArray>,
}

impl WellKnownTypes {
    pub(crate) fn placeholder() -> Self {
        let zero = ClassId::from_index(0);
        Self {
            any: zero,
            unit: zero,
            nothing: zero,
            string: zero,
            array: zero,
            comparable: zero,
            primitive_arrays: Vec::new(),
        }
    }

    /// `Any?`, the implicit upper bound of an unbounded type parameter.
    pub fn default_bound(&self) -> Type {
        Type::class(self.any, vec![]).make_nullable()
    }

    /// Non-null `Unit`.
    pub fn unit_type(&self) -> Type {
        Type::class(self.unit, vec![])
    }

    pub fn is_default_bound(&self, ty: &Type) -> bool {
        *ty == self.default_bound()
    }
}

impl TypeStore {
    /// A store populated with the builtin classifier universe: `Any`, `Unit`, `Nothing`,
    /// `String`, primitives and their arrays, `Array<T>`, the read-only/mutable collection
    /// hierarchy and `Function0..3`/`ExtensionFunction0..3`.
    pub fn with_builtins() -> Self {
        use names::*;
        use ClassKind::{Class, Interface};
        use Variance::{In, Invariant, Out};

        let mut store = TypeStore::empty();
        let any = store.intern_class_id(ANY);

        declare(&mut store, ANY, Class, &[], |_, _| vec![]);
        let any_ty = Type::class(any, vec![]);
        let unit = declare(&mut store, UNIT, Class, &[], |_, _| vec![any_ty.clone()]);
        let nothing = declare(&mut store, NOTHING, Class, &[], |_, _| vec![]);
        declare(&mut store, NUMBER, Class, &[], |_, _| vec![any_ty.clone()]);
        declare(&mut store, CHAR_SEQUENCE, Interface, &[], |_, _| {
            vec![any_ty.clone()]
        });
        let comparable = declare(&mut store, COMPARABLE, Interface, &[("T", In)], |_, _| {
            vec![any_ty.clone()]
        });
        let string = declare(&mut store, STRING, Class, &[], |s, _| {
            vec![
                s.class_type(CHAR_SEQUENCE, vec![]),
                s.class_type(COMPARABLE, vec![TypeArg::invariant(s.class_type(STRING, vec![]))]),
            ]
        });
        let array = declare(&mut store, ARRAY, Class, &[("T", Invariant)], |_, _| {
            vec![any_ty.clone()]
        });

        let mut primitive_arrays = Vec::new();
        for (primitive, array_name) in PRIMITIVES {
            let numeric = !matches!(*primitive, BOOLEAN | CHAR);
            let element = declare(&mut store, primitive, Class, &[], |s, _| {
                let mut supertypes = vec![s.class_type(
                    COMPARABLE,
                    vec![TypeArg::invariant(s.class_type(primitive, vec![]))],
                )];
                if numeric {
                    supertypes.insert(0, s.class_type(NUMBER, vec![]));
                }
                supertypes
            });
            let array_class = declare(&mut store, array_name, Class, &[], |_, _| {
                vec![any_ty.clone()]
            });
            primitive_arrays.push(PrimitiveArray {
                array: array_class,
                element,
            });
        }

        let inv = |p: &Type| TypeArg::invariant(p.clone());

        declare(&mut store, ITERATOR, Interface, &[("T", Out)], |_, _| vec![any_ty.clone()]);
        declare(&mut store, MUTABLE_ITERATOR, Interface, &[("T", Invariant)], |s, p| {
            vec![s.class_type(ITERATOR, vec![inv(&p[0])])]
        });
        declare(&mut store, LIST_ITERATOR, Interface, &[("T", Out)], |s, p| {
            vec![s.class_type(ITERATOR, vec![inv(&p[0])])]
        });
        declare(&mut store, MUTABLE_LIST_ITERATOR, Interface, &[("T", Invariant)], |s, p| {
            vec![
                s.class_type(LIST_ITERATOR, vec![inv(&p[0])]),
                s.class_type(MUTABLE_ITERATOR, vec![inv(&p[0])]),
            ]
        });
        declare(&mut store, ITERABLE, Interface, &[("T", Out)], |_, _| vec![any_ty.clone()]);
        declare(&mut store, MUTABLE_ITERABLE, Interface, &[("T", Invariant)], |s, p| {
            vec![s.class_type(ITERABLE, vec![inv(&p[0])])]
        });
        declare(&mut store, COLLECTION, Interface, &[("E", Out)], |s, p| {
            vec![s.class_type(ITERABLE, vec![inv(&p[0])])]
        });
        declare(&mut store, MUTABLE_COLLECTION, Interface, &[("E", Invariant)], |s, p| {
            vec![
                s.class_type(COLLECTION, vec![inv(&p[0])]),
                s.class_type(MUTABLE_ITERABLE, vec![inv(&p[0])]),
            ]
        });
        declare(&mut store, LIST, Interface, &[("E", Out)], |s, p| {
            vec![s.class_type(COLLECTION, vec![inv(&p[0])])]
        });
        declare(&mut store, MUTABLE_LIST, Interface, &[("E", Invariant)], |s, p| {
            vec![
                s.class_type(LIST, vec![inv(&p[0])]),
                s.class_type(MUTABLE_COLLECTION, vec![inv(&p[0])]),
            ]
        });
        declare(&mut store, SET, Interface, &[("E", Out)], |s, p| {
            vec![s.class_type(COLLECTION, vec![inv(&p[0])])]
        });
        declare(&mut store, MUTABLE_SET, Interface, &[("E", Invariant)], |s, p| {
            vec![
                s.class_type(SET, vec![inv(&p[0])]),
                s.class_type(MUTABLE_COLLECTION, vec![inv(&p[0])]),
            ]
        });
        declare(&mut store, MAP, Interface, &[("K", Invariant), ("V", Out)], |_, _| {
            vec![any_ty.clone()]
        });
        declare(&mut store, MUTABLE_MAP, Interface, &[("K", Invariant), ("V", Invariant)], |s, p| {
            vec![s.class_type(MAP, vec![inv(&p[0]), inv(&p[1])])]
        });
        declare(&mut store, MAP_ENTRY, Interface, &[("K", Out), ("V", Out)], |_, _| {
            vec![any_ty.clone()]
        });
        declare(
            &mut store,
            MUTABLE_MAP_ENTRY,
            Interface,
            &[("K", Invariant), ("V", Invariant)],
            |s, p| vec![s.class_type(MAP_ENTRY, vec![inv(&p[0]), inv(&p[1])])],
        );

        for arity in 0..=MAX_FUNCTION_ARITY {
            let mut params: Vec<(String, Variance)> =
                (1..=arity).map(|i| (format!("P{i}"), In)).collect();
            params.push(("R".to_string(), Out));
            let function_params: Vec<(&str, Variance)> =
                params.iter().map(|(n, v)| (n.as_str(), *v)).collect();
            declare(&mut store, &function(arity), Interface, &function_params, |_, _| {
                vec![any_ty.clone()]
            });

            let mut extension_params = vec![("T", In)];
            extension_params.extend(function_params.iter().copied());
            declare(
                &mut store,
                &extension_function(arity),
                Interface,
                &extension_params,
                |_, _| vec![any_ty.clone()],
            );
        }

        store.set_well_known(WellKnownTypes {
            any,
            unit,
            nothing,
            string,
            array,
            comparable,
            primitive_arrays,
        });
        store
    }
}

fn declare(
    store: &mut TypeStore,
    name: &str,
    kind: ClassKind,
    params: &[(&str, Variance)],
    supertypes: impl FnOnce(&TypeStore, &[Type]) -> Vec<Type>,
) -> ClassId {
    let id = store.intern_class_id(name);
    let any = store.intern_class_id(names::ANY);
    let default_bound = Type::class(any, vec![]).make_nullable();

    let type_params: Vec<_> = params
        .iter()
        .map(|(param, variance)| {
            store.add_type_param(TypeParamDef {
                name: (*param).to_string(),
                variance: *variance,
                upper_bounds: vec![default_bound.clone()],
                owner: TypeParamOwner::Class(id),
            })
        })
        .collect();
    let param_types: Vec<Type> = type_params.iter().map(|tp| Type::param(*tp)).collect();
    let supertypes = supertypes(store, &param_types);

    store.define_class(
        id,
        ClassDef {
            name: name.to_string(),
            kind,
            type_params,
            supertypes,
        },
    );
    id
}

pub fn is_primitive_array(env: &dyn TypeEnv, ty: &Type) -> bool {
    let Some(class) = ty.class_id() else {
        return false;
    };
    env.well_known()
        .primitive_arrays
        .iter()
        .any(|p| p.array == class)
}

pub fn is_array(env: &dyn TypeEnv, ty: &Type) -> bool {
    ty.class_id() == Some(env.well_known().array) || is_primitive_array(env, ty)
}

/// Element type of `Array<T>` or of a primitive array; `None` for anything else.
pub fn array_element_type(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    let class = ty.class_id()?;
    let wk = env.well_known();
    if class == wk.array {
        return Some(match ty.args.first() {
            Some(TypeArg::Projected { ty, .. }) => ty.clone(),
            Some(TypeArg::Star) | None => wk.default_bound(),
        });
    }
    wk.primitive_arrays
        .iter()
        .find(|p| p.array == class)
        .map(|p| Type::class(p.element, vec![]))
}

/// Non-null `Array<variance element>`.
pub fn array_type(env: &dyn TypeEnv, variance: Variance, element: Type) -> Type {
    Type::class(
        env.well_known().array,
        vec![TypeArg::Projected {
            variance,
            ty: element,
        }],
    )
}
