//! Merging a computed type with the corresponding types of overridden members.
//!
//! Unlike the matcher this never fails: conflicts between supertypes are reported to the sink
//! and the computed type is kept where the supertypes cannot agree.

use std::collections::HashMap;
use std::fmt;

use sigrec_config::PropagationConfig;
use sigrec_types::{
    array_element_type, array_type, deep_substitution, is_subtype, render_type, ClassId,
    Classifier, DiagnosticSink, Type, TypeArg, TypeEnv, TypeParamId, TypeParamOwner, TypeUsage,
    Variance,
};

use crate::error::codes;
use crate::mapping::CollectionMutability;

/// A type taken from an overridden member together with the variance of the position it
/// occupies there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAndVariance {
    pub ty: Type,
    pub variance: Variance,
}

impl TypeAndVariance {
    pub fn new(ty: Type, variance: Variance) -> Self {
        Self { ty, variance }
    }
}

pub struct MergeEngine<'a> {
    env: &'a dyn TypeEnv,
    mutability: &'a CollectionMutability,
    config: PropagationConfig,
    containing_class: ClassId,
    refined: HashMap<TypeParamId, TypeParamId>,
}

impl<'a> MergeEngine<'a> {
    pub fn new(
        env: &'a dyn TypeEnv,
        mutability: &'a CollectionMutability,
        config: PropagationConfig,
        containing_class: ClassId,
    ) -> Self {
        Self {
            env,
            mutability,
            config,
            containing_class,
            refined: HashMap::new(),
        }
    }

    /// Occurrences of the original type parameters are replaced by their refined ids.
    #[must_use]
    pub fn with_refined(mut self, refined: HashMap<TypeParamId, TypeParamId>) -> Self {
        self.refined = refined;
        self
    }

    /// Merges `auto` with `supers`, all of which sit at a position described by `usage`.
    pub fn merge(
        &self,
        auto: &Type,
        supers: &[Type],
        usage: TypeUsage,
        sink: &mut DiagnosticSink,
    ) -> Type {
        let variance = usage.position_variance();
        let supers: Vec<TypeAndVariance> = supers
            .iter()
            .map(|ty| TypeAndVariance::new(ty.clone(), variance))
            .collect();
        self.merge_with_variance(auto, &supers, usage, sink)
    }

    pub fn merge_with_variance(
        &self,
        auto: &Type,
        supers: &[TypeAndVariance],
        usage: TypeUsage,
        sink: &mut DiagnosticSink,
    ) -> Type {
        let nullable = self.merged_nullability(auto, supers, usage, sink);
        let classifier = self.merged_classifier(auto, supers, sink);
        let args = match classifier {
            Classifier::Class(class) => self.merged_args(auto, class, supers, sink),
            Classifier::TypeParam(_) => Vec::new(),
        };

        let result = Type {
            classifier,
            nullable,
            args,
        };
        debug_assert!(
            classifier != auto.classifier || result.same_shape(auto),
            "merge changed the shape of {auto:?}"
        );
        if usage == TypeUsage::Return && self.config.report_array_return {
            self.check_array_return(&result, supers, sink);
        }
        result
    }

    fn merged_nullability(
        &self,
        auto: &Type,
        supers: &[TypeAndVariance],
        usage: TypeUsage,
        sink: &mut DiagnosticSink,
    ) -> bool {
        let mut some_not_null = false;
        let mut some_covariant_nullable = false;
        let mut some_not_covariant_nullable = false;
        for sup in supers {
            if !sup.ty.nullable {
                some_not_null = true;
            } else if sup.variance == Variance::Out {
                some_covariant_nullable = true;
            } else {
                some_not_covariant_nullable = true;
            }
        }

        if some_not_null && some_not_covariant_nullable {
            self.incompatible_supers(supers, sink);
            return true;
        }
        if some_not_null {
            return false;
        }
        if some_covariant_nullable || some_not_covariant_nullable {
            let annotated_not_null = usage != TypeUsage::TypeArgument && !auto.nullable;
            if annotated_not_null && some_not_covariant_nullable {
                self.conflict(
                    sink,
                    format!(
                        "In superclass type is nullable: {}, in subclass it is not: {}",
                        self.list(supers),
                        render_type(self.env, auto)
                    ),
                );
                return true;
            }
            return !annotated_not_null;
        }
        auto.nullable
    }

    fn merged_classifier(
        &self,
        auto: &Type,
        supers: &[TypeAndVariance],
        sink: &mut DiagnosticSink,
    ) -> Classifier {
        let class = match auto.classifier {
            Classifier::TypeParam(param) => {
                let param = self.refined.get(&param).copied().unwrap_or(param);
                return Classifier::TypeParam(param);
            }
            Classifier::Class(class) => class,
        };

        let mut some_mutable = false;
        let mut some_covariant_read_only = false;
        let mut some_invariant_read_only = false;
        let mut some_not_covariant_read_only = false;
        for sup in supers {
            let Some(super_class) = sup.ty.class_id() else {
                continue;
            };
            if self.mutability.is_mutable(super_class) {
                some_mutable = true;
            } else if self.mutability.is_read_only(super_class) {
                match sup.variance {
                    Variance::Out => some_covariant_read_only = true,
                    Variance::Invariant => {
                        some_invariant_read_only = true;
                        some_not_covariant_read_only = true;
                    }
                    Variance::In => some_not_covariant_read_only = true,
                }
            }
        }

        if some_mutable && some_not_covariant_read_only {
            self.incompatible_supers(supers, sink);
            return Classifier::Class(class);
        }
        if some_mutable {
            if let Some(mutable) = self.mutability.to_mutable(class) {
                return Classifier::Class(mutable);
            }
        } else if some_invariant_read_only && self.mutability.is_mutable(class) {
            self.incompatible_supers(supers, sink);
            return Classifier::Class(class);
        } else if some_covariant_read_only || some_not_covariant_read_only {
            if let Some(read_only) = self.mutability.to_read_only(class) {
                return Classifier::Class(read_only);
            }
        }

        self.raw_type_param(auto, supers)
            .map(Classifier::TypeParam)
            .unwrap_or(Classifier::Class(class))
    }

    /// A raw host type whose overridden positions all use the same type parameter of the
    /// containing class becomes that parameter.
    fn raw_type_param(&self, auto: &Type, supers: &[TypeAndVariance]) -> Option<TypeParamId> {
        if !auto.args.is_empty() {
            return None;
        }
        let first = supers.first()?.ty.type_param()?;
        if supers.iter().any(|sup| sup.ty.type_param() != Some(first)) {
            return None;
        }
        let owner = self.env.type_param(first)?.owner;
        (owner == TypeParamOwner::Class(self.containing_class)).then_some(first)
    }

    fn merged_args(
        &self,
        auto: &Type,
        class: ClassId,
        supers: &[TypeAndVariance],
        sink: &mut DiagnosticSink,
    ) -> Vec<TypeArg> {
        let param_count = self
            .env
            .class(class)
            .map(|def| def.type_params.len())
            .unwrap_or(0);
        if auto.args.len() != param_count {
            return auto.args.clone();
        }

        let from_supers = self.args_from_supers(class, supers);
        auto.args
            .iter()
            .zip(from_supers)
            .map(|(auto_arg, projections)| {
                let TypeArg::Projected {
                    variance: auto_projection,
                    ty: auto_ty,
                } = auto_arg
                else {
                    return TypeArg::Star;
                };
                let types: Vec<TypeAndVariance> = projections
                    .iter()
                    .filter_map(|(arg, variance)| {
                        arg.ty()
                            .map(|ty| TypeAndVariance::new(ty.clone(), *variance))
                    })
                    .collect();
                let ty = self.merge_with_variance(auto_ty, &types, TypeUsage::TypeArgument, sink);
                let variance =
                    self.projection_from_supers(*auto_projection, auto_arg, &projections, sink);
                TypeArg::Projected { variance, ty }
            })
            .collect()
    }

    /// For each type parameter of `class`, the arguments the supertypes pass to it, paired with
    /// the effective variance of the position each sits in.
    fn args_from_supers(
        &self,
        class: ClassId,
        supers: &[TypeAndVariance],
    ) -> Vec<Vec<(TypeArg, Variance)>> {
        let Some(def) = self.env.class(class) else {
            return Vec::new();
        };
        let mut slots: Vec<Vec<(TypeArg, Variance)>> = vec![Vec::new(); def.type_params.len()];
        let substitution = deep_substitution(self.env, class);

        for sup in supers {
            let Some(super_class) = sup.ty.class_id() else {
                continue;
            };
            let Some(super_def) = self.env.class(super_class) else {
                continue;
            };
            for (param, arg) in super_def.type_params.iter().zip(&sup.ty.args) {
                if arg.is_star() {
                    continue;
                }
                let declared = self
                    .env
                    .type_param(*param)
                    .map(|def| def.variance)
                    .unwrap_or(Variance::Invariant);
                let effective = declared.superpose(sup.variance);

                for mapped in substitution.get(param).into_iter().flatten() {
                    let Some(target) = mapped.ty().and_then(Type::type_param) else {
                        continue;
                    };
                    if let Some(index) = def.type_params.iter().position(|p| *p == target) {
                        slots[index].push((arg.clone(), effective));
                    }
                }
            }
        }
        slots
    }

    fn projection_from_supers(
        &self,
        auto_projection: Variance,
        auto_arg: &TypeArg,
        projections: &[(TypeArg, Variance)],
        sink: &mut DiagnosticSink,
    ) -> Variance {
        let mut kinds: Vec<Variance> = Vec::new();
        for (arg, _) in projections {
            let kind = arg.projection_kind();
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        match kinds.as_slice() {
            [] => auto_projection,
            [kind] if auto_projection == Variance::Invariant || auto_projection == *kind => *kind,
            _ => {
                let supers: Vec<String> = projections
                    .iter()
                    .map(|(arg, _)| ArgDisplay(self.env, arg).to_string())
                    .collect();
                self.conflict(
                    sink,
                    format!(
                        "Incompatible projection kinds in type arguments of super methods' return types: [{}], defined in current: {}",
                        supers.join(", "),
                        ArgDisplay(self.env, auto_arg)
                    ),
                );
                auto_projection
            }
        }
    }

    fn check_array_return(
        &self,
        result: &Type,
        supers: &[TypeAndVariance],
        sink: &mut DiagnosticSink,
    ) {
        let wk = self.env.well_known();
        if result.class_id() != Some(wk.array) {
            return;
        }
        let Some(TypeArg::Projected {
            variance: Variance::Invariant,
            ty: element,
        }) = result.args.first()
        else {
            return;
        };

        for sup in supers {
            if sup.ty.class_id() != Some(wk.array) {
                continue;
            }
            let Some(super_element) = array_element_type(self.env, &sup.ty) else {
                continue;
            };
            if *element == super_element || !is_subtype(self.env, element, &super_element) {
                continue;
            }
            let replacement =
                array_type(self.env, Variance::Out, super_element).with_nullable(sup.ty.nullable);
            let message = format!(
                "Return type is not a subtype of overridden method. To fix it, add annotation with Kotlin signature to super method with type {} replaced with {} in return type",
                render_type(self.env, &sup.ty),
                render_type(self.env, &replacement)
            );
            tracing::debug!(target: "sigrec.engine", %message, "array return advisory");
            sink.warning(codes::PROPAGATION_ARRAY_RETURN, message);
        }
    }

    fn incompatible_supers(&self, supers: &[TypeAndVariance], sink: &mut DiagnosticSink) {
        let message = format!("Incompatible types in superclasses: {}", self.list(supers));
        self.conflict(sink, message);
    }

    fn conflict(&self, sink: &mut DiagnosticSink, message: String) {
        tracing::debug!(target: "sigrec.engine", %message, "supertype conflict");
        sink.warning(codes::PROPAGATION_CONFLICT, message);
    }

    fn list(&self, supers: &[TypeAndVariance]) -> String {
        let rendered: Vec<String> = supers
            .iter()
            .map(|sup| render_type(self.env, &sup.ty))
            .collect();
        format!("[{}]", rendered.join(", "))
    }
}

struct ArgDisplay<'a>(&'a dyn TypeEnv, &'a TypeArg);

impl fmt::Display for ArgDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            TypeArg::Star => f.write_str("*"),
            TypeArg::Projected { variance, ty } => {
                if *variance != Variance::Invariant {
                    write!(f, "{} ", variance.keyword())?;
                }
                f.write_str(&render_type(self.0, ty))
            }
        }
    }
}
