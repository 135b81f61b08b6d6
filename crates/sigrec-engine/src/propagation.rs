//! Deriving a member's signature from the members it overrides.

use std::collections::HashMap;

use sigrec_config::PropagationConfig;
use sigrec_types::{
    array_element_type, array_type, is_array, is_primitive_array, ClassId, DiagnosticSink,
    Signature, Type, TypeEnv, TypeParamBuilder, TypeParamId, TypeParamSlot, TypeUsage,
    ValueParameter, Variance,
};

use crate::error::codes;
use crate::host::{DescriptorTable, HostMethod};
use crate::locator::{align_type_params, SuperMemberLocator};
use crate::mapping::{CollectionMutability, PlatformAnalogs};
use crate::merge::{MergeEngine, TypeAndVariance};

pub struct SignaturePropagator<'a> {
    env: &'a dyn TypeEnv,
    table: &'a dyn DescriptorTable,
    analogs: &'a PlatformAnalogs,
    mutability: &'a CollectionMutability,
    config: PropagationConfig,
}

impl<'a> SignaturePropagator<'a> {
    pub fn new(
        env: &'a dyn TypeEnv,
        table: &'a dyn DescriptorTable,
        analogs: &'a PlatformAnalogs,
        mutability: &'a CollectionMutability,
        config: PropagationConfig,
    ) -> Self {
        Self {
            env,
            table,
            analogs,
            mutability,
            config,
        }
    }

    /// Locates the members `method` overrides in `containing` and merges their signatures into
    /// `auto`.
    pub fn propagate(
        &self,
        method: &HostMethod,
        containing: ClassId,
        auto: &Signature,
        sink: &mut DiagnosticSink,
    ) -> Signature {
        let supers: Vec<Signature> = SuperMemberLocator::new(self.env, self.table, self.analogs)
            .find_overridden(method, containing)
            .into_iter()
            .map(|overridden| overridden.signature)
            .collect();
        self.propagate_with_supers(containing, auto, &supers, sink)
    }

    /// Merges already located super signatures into `auto`.
    ///
    /// `auto` is host-shaped: a receiver, if the supers declare one, is still its first value
    /// parameter. With no supers `auto` is returned as is.
    pub fn propagate_with_supers(
        &self,
        containing: ClassId,
        auto: &Signature,
        supers: &[Signature],
        sink: &mut DiagnosticSink,
    ) -> Signature {
        if supers.is_empty() {
            return auto.clone();
        }
        let _span = tracing::debug_span!(
            target: "sigrec.engine",
            "propagate",
            supers = supers.len()
        )
        .entered();

        let refined_ids: Vec<TypeParamId> = auto
            .type_params
            .iter()
            .map(|slot| slot.id().refined())
            .collect();
        let refined: HashMap<TypeParamId, TypeParamId> = auto
            .type_param_ids()
            .into_iter()
            .zip(refined_ids.iter().copied())
            .collect();
        let supers: Vec<Signature> = supers
            .iter()
            .map(|sup| align_type_params(sup, &refined_ids))
            .collect();

        let engine = MergeEngine::new(self.env, self.mutability, self.config, containing)
            .with_refined(refined);
        let merge = SignatureMerge {
            env: self.env,
            engine,
            supers: &supers,
        };

        let type_params = merge.type_params(auto, &refined_ids, sink);
        let (receiver_type, value_params, adopted_names) = merge.value_params(auto, sink);
        let return_type = merge.engine.merge(
            &auto.return_type,
            &supers.iter().map(|sup| sup.return_type.clone()).collect::<Vec<_>>(),
            TypeUsage::Return,
            sink,
        );

        tracing::trace!(
            target: "sigrec.engine",
            diagnostics = sink.len(),
            "propagated signature from supers"
        );
        Signature {
            receiver_type,
            type_params,
            value_params,
            return_type,
            stable_parameter_names: auto.stable_parameter_names || adopted_names,
        }
    }
}

struct SignatureMerge<'s, 'a> {
    env: &'a dyn TypeEnv,
    engine: MergeEngine<'a>,
    supers: &'s [Signature],
}

impl SignatureMerge<'_, '_> {
    fn type_params(
        &self,
        auto: &Signature,
        refined_ids: &[TypeParamId],
        sink: &mut DiagnosticSink,
    ) -> Vec<TypeParamSlot> {
        auto.type_params
            .iter()
            .zip(refined_ids)
            .enumerate()
            .map(|(index, (slot, refined))| {
                let mut builder = TypeParamBuilder::new(*refined, slot.name());
                for (bound_index, bound) in slot.upper_bounds().iter().enumerate() {
                    let from_supers: Vec<Type> = self
                        .supers
                        .iter()
                        .filter_map(|sup| sup.type_params.get(index))
                        .filter_map(|sup_slot| sup_slot.upper_bounds().get(bound_index).cloned())
                        .collect();
                    builder.add_upper_bound(self.engine.merge(
                        bound,
                        &from_supers,
                        TypeUsage::UpperBound,
                        sink,
                    ));
                }
                builder.seal()
            })
            .collect()
    }

    /// Merged receiver and value parameters, and whether parameter names were adopted from a
    /// super with stable names.
    fn value_params(
        &self,
        auto: &Signature,
        sink: &mut DiagnosticSink,
    ) -> (Option<Type>, Vec<ValueParameter>, bool) {
        let promote = self.should_be_extension(sink);
        let stable_super = self.supers.iter().position(|sup| sup.stable_parameter_names);

        let mut receiver_type = auto.receiver_type.clone();
        let mut value_params = Vec::with_capacity(auto.value_params.len());
        let mut adopted_names = false;

        for param in &auto.value_params {
            let from_supers: Vec<Option<(&Type, &str)>> = self
                .supers
                .iter()
                .map(|sup| super_parameter(sup, param))
                .collect();
            let (ty, is_vararg) = self.vararg(param, sink);
            let types: Vec<TypeAndVariance> = from_supers
                .iter()
                .flatten()
                .map(|(ty, _)| TypeAndVariance::new((*ty).clone(), Variance::In))
                .collect();
            let ty = self
                .engine
                .merge_with_variance(&ty, &types, TypeUsage::Parameter, sink);

            if promote && param.index == 0 {
                receiver_type = Some(ty);
                continue;
            }

            let name = stable_super
                .and_then(|index| from_supers.get(index).copied().flatten())
                .map(|(_, name)| name.to_string());
            adopted_names |= name.is_some();
            let index = if promote { param.index - 1 } else { param.index };
            value_params.push(ValueParameter {
                name: name.unwrap_or_else(|| param.name.clone()),
                ty,
                is_vararg,
                has_default: param.has_default,
                index,
            });
        }

        (receiver_type, value_params, adopted_names)
    }

    fn should_be_extension(&self, sink: &mut DiagnosticSink) -> bool {
        let some_extension = self.supers.iter().any(Signature::is_extension);
        let some_not_extension = self.supers.iter().any(|sup| !sup.is_extension());
        if some_extension && some_not_extension {
            sink.warning(
                codes::PROPAGATION_CONFLICT,
                "Incompatible super methods: some are extension functions, some are not",
            );
            return false;
        }
        some_extension
    }

    /// The parameter's type adjusted to the vararg-ness the supers agree on.
    fn vararg(&self, param: &ValueParameter, sink: &mut DiagnosticSink) -> (Type, bool) {
        let mut some_vararg = false;
        let mut some_not_vararg = false;
        for sup in self.supers {
            let is_vararg = super_index(sup, param)
                .and_then(|index| sup.value_params.get(index))
                .is_some_and(|sup_param| sup_param.is_vararg);
            if is_vararg {
                some_vararg = true;
            } else {
                some_not_vararg = true;
            }
        }

        let original = (param.ty.clone(), param.is_vararg);
        if some_vararg && some_not_vararg {
            sink.warning(
                codes::PROPAGATION_CONFLICT,
                "Incompatible super methods: some have vararg parameter, some have not",
            );
            return original;
        }
        if !is_array(self.env, &param.ty) {
            return original;
        }
        let primitive = is_primitive_array(self.env, &param.ty);
        let element = array_element_type(self.env, &param.ty);

        match element {
            Some(element) if some_vararg && !param.is_vararg => {
                if primitive {
                    (param.ty.clone().make_not_null(), true)
                } else {
                    (array_type(self.env, Variance::Invariant, element), true)
                }
            }
            Some(element) if some_not_vararg && param.is_vararg => {
                if primitive {
                    (param.ty.clone().make_nullable(), false)
                } else {
                    (array_type(self.env, Variance::Out, element).make_nullable(), false)
                }
            }
            _ => original,
        }
    }
}

/// Index into a super's value parameters for `param`; a super with a receiver shifts every
/// parameter by one and `None` stands for its receiver.
fn super_index(sup: &Signature, param: &ValueParameter) -> Option<usize> {
    if sup.is_extension() {
        param.index.checked_sub(1)
    } else {
        Some(param.index)
    }
}

fn super_parameter<'s>(
    sup: &'s Signature,
    param: &'s ValueParameter,
) -> Option<(&'s Type, &'s str)> {
    match super_index(sup, param) {
        None => sup
            .receiver_type
            .as_ref()
            .map(|receiver| (receiver, param.name.as_str())),
        Some(index) => sup
            .value_params
            .get(index)
            .map(|sup_param| (&sup_param.ty, sup_param.name.as_str())),
    }
}
