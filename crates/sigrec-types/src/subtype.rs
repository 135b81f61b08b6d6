use std::collections::{HashMap, HashSet, VecDeque};

use crate::{Classifier, ClassId, Substitutor, Type, TypeArg, TypeEnv, TypeParamId, Variance};

/// The view of `ty` as an instance of `target`, walking supertypes breadth-first.
///
/// Arguments are substituted along the way, so `MutableList<String>` seen as `Collection`
/// becomes `Collection<String>`. Nullability is carried over from `ty`.
pub fn supertype_as(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    let mut queue = VecDeque::from([ty.clone()]);
    let mut seen = HashSet::new();

    while let Some(current) = queue.pop_front() {
        let Some(class) = current.class_id() else {
            continue;
        };
        if class == target {
            return Some(current.with_nullable(ty.nullable));
        }
        if !seen.insert(class) {
            continue;
        }
        let Some(def) = env.class(class) else {
            continue;
        };
        let subst = Substitutor::from_pairs(&def.type_params, &current.args);
        queue.extend(def.supertypes.iter().map(|sup| subst.substitute(sup)));
    }
    None
}

/// Every type parameter reachable through the supertypes of `class`, mapped to the arguments it
/// receives when seen from `class` itself.
///
/// The class's own parameters map to themselves. A parameter reached along several paths keeps
/// each distinct argument once.
pub fn deep_substitution(env: &dyn TypeEnv, class: ClassId) -> HashMap<TypeParamId, Vec<TypeArg>> {
    let mut result: HashMap<TypeParamId, Vec<TypeArg>> = HashMap::new();
    let Some(def) = env.class(class) else {
        return result;
    };

    let own_args = def
        .type_params
        .iter()
        .map(|param| TypeArg::invariant(Type::param(*param)))
        .collect();
    let mut queue = VecDeque::from([Type::class(class, own_args)]);
    let mut seen = HashSet::new();

    while let Some(current) = queue.pop_front() {
        let Some(current_class) = current.class_id() else {
            continue;
        };
        let Some(def) = env.class(current_class) else {
            continue;
        };
        if !seen.insert(current.clone()) {
            continue;
        }

        for (param, arg) in def.type_params.iter().zip(&current.args) {
            let args = result.entry(*param).or_default();
            if !args.contains(arg) {
                args.push(arg.clone());
            }
        }
        let subst = Substitutor::from_pairs(&def.type_params, &current.args);
        queue.extend(def.supertypes.iter().map(|sup| subst.substitute(sup)));
    }
    result
}

pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let wk = env.well_known();
    if sub.nullable && !sup.nullable {
        return false;
    }
    if sub.class_id() == Some(wk.nothing) {
        return true;
    }

    match (sub.classifier, sup.classifier) {
        (Classifier::TypeParam(a), Classifier::TypeParam(b)) if a == b => true,
        (Classifier::TypeParam(param), _) => {
            let Some(def) = env.type_param(param) else {
                return false;
            };
            def.upper_bounds.iter().any(|bound| {
                let bound = bound.clone().with_nullable(bound.nullable || sub.nullable);
                is_subtype(env, &bound, sup)
            })
        }
        (Classifier::Class(_), Classifier::TypeParam(_)) => false,
        (Classifier::Class(_), Classifier::Class(target)) => {
            if target == wk.any {
                return true;
            }
            let Some(view) = supertype_as(env, sub, target) else {
                return false;
            };
            if view.args.len() != sup.args.len() {
                return false;
            }
            view.args
                .iter()
                .zip(&sup.args)
                .enumerate()
                .all(|(index, (sub_arg, sup_arg))| {
                    arg_contained(env, target, index, sub_arg, sup_arg)
                })
        }
    }
}

/// Whether `sub_arg` fits inside `sup_arg` for the `index`-th parameter of `class`.
fn arg_contained(
    env: &dyn TypeEnv,
    class: ClassId,
    index: usize,
    sub_arg: &TypeArg,
    sup_arg: &TypeArg,
) -> bool {
    let TypeArg::Projected {
        variance: sup_projection,
        ty: sup_ty,
    } = sup_arg
    else {
        return true;
    };
    let TypeArg::Projected {
        variance: sub_projection,
        ty: sub_ty,
    } = sub_arg
    else {
        return false;
    };

    let declared = env.declared_variance(class, index);
    let effective = |projection: Variance| {
        if projection == Variance::Invariant {
            declared
        } else {
            projection
        }
    };

    match effective(*sup_projection) {
        Variance::Out => {
            effective(*sub_projection) != Variance::In && is_subtype(env, sub_ty, sup_ty)
        }
        Variance::In => {
            effective(*sub_projection) != Variance::Out && is_subtype(env, sup_ty, sub_ty)
        }
        Variance::Invariant => {
            effective(*sub_projection) == Variance::Invariant && equal_types(env, sub_ty, sup_ty)
        }
    }
}

/// Structural equality; a projection that repeats the declared variance counts as invariant.
pub fn equal_types(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    if a.nullable != b.nullable || a.classifier != b.classifier || a.args.len() != b.args.len() {
        return false;
    }
    let Some(class) = a.class_id() else {
        return true;
    };

    a.args.iter().zip(&b.args).enumerate().all(|(index, pair)| match pair {
        (TypeArg::Star, TypeArg::Star) => true,
        (
            TypeArg::Projected {
                variance: va,
                ty: ta,
            },
            TypeArg::Projected {
                variance: vb,
                ty: tb,
            },
        ) => {
            let declared = env.declared_variance(class, index);
            let normalize = |v: Variance| if v == declared { Variance::Invariant } else { v };
            normalize(*va) == normalize(*vb) && equal_types(env, ta, tb)
        }
        _ => false,
    })
}
