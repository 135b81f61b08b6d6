//! Applying explicit alternative signatures to fields and methods.

use std::collections::HashMap;

use sigrec_config::MatcherConfig;
use sigrec_types::{
    array_element_type, array_type, equal_types, is_primitive_array, is_subtype, render_type,
    DiagnosticSink, Signature, Type, TypeEnv, TypeParamBuilder, TypeParamId, TypeParamSlot,
    TypeUsage, ValueParameter, Variance,
};

use crate::error::{ReconcileError, Result};
use crate::host::{HostField, HostMethod};
use crate::locator::align_type_params;
use crate::mapping::PlatformAnalogs;
use crate::matcher::Matcher;
use crate::syntax::{AltFunction, AltParameter, AltProperty, AltTypeParameter};

/// Outcome of applying an alternative signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AltResolution<T> {
    /// The member carries no alternative signature.
    NotAnnotated,
    Resolved(T),
    /// The alternative signature was present but could not be applied.
    Rejected(ReconcileError),
}

impl<T> AltResolution<T> {
    pub fn is_annotated(&self) -> bool {
        !matches!(self, AltResolution::NotAnnotated)
    }

    fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => AltResolution::Resolved(value),
            Err(err) => AltResolution::Rejected(err),
        }
    }
}

pub struct AlternativeSignatureResolver<'a> {
    env: &'a dyn TypeEnv,
    analogs: &'a PlatformAnalogs,
    config: MatcherConfig,
}

impl<'a> AlternativeSignatureResolver<'a> {
    pub fn new(env: &'a dyn TypeEnv, analogs: &'a PlatformAnalogs, config: MatcherConfig) -> Self {
        Self {
            env,
            analogs,
            config,
        }
    }

    pub fn resolve_field(
        &self,
        field: &HostField,
        auto: &Type,
        alt: Option<&AltProperty>,
        sink: &mut DiagnosticSink,
    ) -> AltResolution<Type> {
        let Some(alt) = alt else {
            return AltResolution::NotAnnotated;
        };
        let mut matcher = Matcher::new(self.env, self.analogs, self.config);
        let result = self.field_type(field, auto, alt, &mut matcher);
        if result.is_ok() {
            sink.extend(matcher.take_warnings());
        }
        AltResolution::from_result(result)
    }

    fn field_type(
        &self,
        field: &HostField,
        auto: &Type,
        alt: &AltProperty,
        matcher: &mut Matcher<'_>,
    ) -> Result<Type> {
        if field.name != alt.name {
            return Err(ReconcileError::mismatch(format!(
                "Field name mismatch, original: {}, alternative: {}",
                field.name, alt.name
            )));
        }
        if field.is_final == alt.is_var {
            return Err(ReconcileError::mismatch(
                "Wrong mutability in annotation for field",
            ));
        }
        let Some(ty) = &alt.ty else {
            return Err(ReconcileError::mismatch(format!(
                "Field type in alternative signature is missing, while in real signature it is '{}'",
                render_type(self.env, auto)
            )));
        };
        matcher.match_type(ty, auto, TypeUsage::Return)
    }

    /// Applies `alt` to `auto` and checks the result against the `supers` it overrides.
    ///
    /// Super signatures are expressed over the containing class; their own type parameters are
    /// aligned with the refined parameters of the result before comparing.
    pub fn resolve_method(
        &self,
        method: &HostMethod,
        auto: &Signature,
        alt: Option<&AltFunction>,
        supers: &[Signature],
        sink: &mut DiagnosticSink,
    ) -> AltResolution<Signature> {
        let Some(alt) = alt else {
            return AltResolution::NotAnnotated;
        };
        let _span =
            tracing::debug_span!(target: "sigrec.engine", "alternative", method = %method.name)
                .entered();

        let refined_ids: Vec<TypeParamId> = auto
            .type_params
            .iter()
            .map(|slot| slot.id().refined())
            .collect();
        let mut matcher = Matcher::new(self.env, self.analogs, self.config).with_type_params(
            auto.type_param_ids()
                .into_iter()
                .zip(refined_ids.iter().copied())
                .collect(),
            alt.type_params
                .iter()
                .map(|param| param.name.clone())
                .zip(refined_ids.iter().copied())
                .collect::<HashMap<_, _>>(),
        );

        let result = self
            .method_signature(method, auto, alt, &refined_ids, &mut matcher)
            .and_then(|signature| {
                self.check_overrides(&signature, supers, &refined_ids)?;
                Ok(signature)
            });
        match &result {
            Ok(_) => sink.extend(matcher.take_warnings()),
            Err(err) => tracing::debug!(
                target: "sigrec.engine",
                error = %err,
                "alternative signature rejected"
            ),
        }
        AltResolution::from_result(result)
    }

    fn method_signature(
        &self,
        method: &HostMethod,
        auto: &Signature,
        alt: &AltFunction,
        refined_ids: &[TypeParamId],
        matcher: &mut Matcher<'_>,
    ) -> Result<Signature> {
        if alt.receiver.is_some() {
            return Err(ReconcileError::Unsupported(
                "Extension functions are not supported yet".to_string(),
            ));
        }
        if method.name != alt.name {
            return Err(ReconcileError::mismatch(format!(
                "Function names mismatch, original: {}, alternative: {}",
                method.name, alt.name
            )));
        }

        let expected = auto.value_params.len() + usize::from(auto.is_extension());
        if alt.params.len() != expected {
            return Err(ReconcileError::mismatch(format!(
                "Method signature has {expected} value parameters, but alternative signature has {}",
                alt.params.len()
            )));
        }
        if alt.type_params.len() != auto.type_params.len() {
            return Err(ReconcileError::mismatch(format!(
                "Method signature has {} type parameters, but alternative signature has {}",
                auto.type_params.len(),
                alt.type_params.len()
            )));
        }

        let type_params = auto
            .type_params
            .iter()
            .zip(&alt.type_params)
            .zip(refined_ids)
            .map(|((slot, alt_param), refined)| self.type_param(slot, alt_param, *refined, matcher))
            .collect::<Result<Vec<_>>>()?;

        let mut alt_params = alt.params.iter();
        let receiver_type = match &auto.receiver_type {
            Some(receiver) => match alt_params.next() {
                Some(alt_param) if !alt_param.is_vararg => {
                    Some(matcher.match_type(&alt_param.ty, receiver, TypeUsage::Parameter)?)
                }
                _ => {
                    return Err(ReconcileError::mismatch(
                        "Parameter in method signature is not vararg, but in alternative signature it is vararg",
                    ))
                }
            },
            None => None,
        };

        let value_params = auto
            .value_params
            .iter()
            .zip(alt_params)
            .map(|(param, alt_param)| self.value_param(param, alt_param, matcher))
            .collect::<Result<Vec<_>>>()?;

        let return_type = matcher.match_return(alt.return_type.as_ref(), &auto.return_type)?;

        Ok(Signature {
            receiver_type,
            type_params,
            value_params,
            return_type,
            stable_parameter_names: auto.stable_parameter_names,
        })
    }

    fn type_param(
        &self,
        slot: &TypeParamSlot,
        alt: &AltTypeParameter,
        refined: TypeParamId,
        matcher: &mut Matcher<'_>,
    ) -> Result<TypeParamSlot> {
        let auto_bounds = slot.upper_bounds();
        let mut builder = TypeParamBuilder::new(refined, alt.name.clone());

        let implicit = alt.bounds.is_empty()
            && auto_bounds.len() == 1
            && self.env.well_known().is_default_bound(&auto_bounds[0]);
        if implicit {
            builder.add_upper_bound(self.env.well_known().default_bound());
            return Ok(builder.seal());
        }
        if alt.bounds.len() != auto_bounds.len() {
            return Err(ReconcileError::mismatch(format!(
                "Upper bound number mismatch for {}. Expected {}, but found {}",
                slot.name(),
                auto_bounds.len(),
                alt.bounds.len()
            )));
        }

        for (alt_bound, auto_bound) in alt.bounds.iter().zip(auto_bounds) {
            let bound = matcher.match_type(alt_bound, auto_bound, TypeUsage::UpperBound)?;
            builder.add_upper_bound(bound);
        }
        Ok(builder.seal())
    }

    fn value_param(
        &self,
        param: &ValueParameter,
        alt: &AltParameter,
        matcher: &mut Matcher<'_>,
    ) -> Result<ValueParameter> {
        if param.is_vararg != alt.is_vararg {
            let not = |vararg: bool| if vararg { "" } else { "not " };
            return Err(ReconcileError::mismatch(format!(
                "Parameter in method signature is {}vararg, but in alternative signature it is {}vararg",
                not(param.is_vararg),
                not(alt.is_vararg)
            )));
        }

        let ty = if alt.is_vararg {
            let Some(element) = array_element_type(self.env, &param.ty) else {
                return Err(ReconcileError::mismatch(format!(
                    "Alternative signature type mismatch, expected: vararg {}, actual: {}",
                    alt.ty,
                    render_type(self.env, &param.ty)
                )));
            };
            let element = matcher.match_type(&alt.ty, &element, TypeUsage::Parameter)?;
            if is_primitive_array(self.env, &param.ty) {
                param.ty.clone().make_not_null()
            } else {
                array_type(self.env, Variance::Out, element)
            }
        } else {
            matcher.match_type(&alt.ty, &param.ty, TypeUsage::Parameter)?
        };

        Ok(ValueParameter {
            name: alt.name.clone().unwrap_or_else(|| param.name.clone()),
            ty,
            ..param.clone()
        })
    }

    /// An explicit signature must stay a valid override of every super member.
    fn check_overrides(
        &self,
        signature: &Signature,
        supers: &[Signature],
        refined_ids: &[TypeParamId],
    ) -> Result<()> {
        let render = |ty: &Type| render_type(self.env, ty);

        for sup in supers {
            let sup = align_type_params(sup, refined_ids);

            let params: Vec<&Type> = signature.host_parameter_types().collect();
            let super_params: Vec<&Type> = sup.host_parameter_types().collect();
            if params.len() != super_params.len() {
                return Err(ReconcileError::OverrideIncompatibility(format!(
                    "Method which overrides another has {} parameters, but overridden one has {}",
                    params.len(),
                    super_params.len()
                )));
            }
            for (param, super_param) in params.iter().zip(&super_params) {
                if !equal_types(self.env, param, super_param) {
                    return Err(ReconcileError::OverrideIncompatibility(format!(
                        "Parameter type changed for method which overrides another: {}, was: {}",
                        render(*param),
                        render(*super_param)
                    )));
                }
            }

            if !is_subtype(self.env, &signature.return_type, &sup.return_type) {
                return Err(ReconcileError::OverrideIncompatibility(format!(
                    "Return type is changed to not subtype for method which overrides another: {}, was: {}",
                    render(&signature.return_type),
                    render(&sup.return_type)
                )));
            }

            for (slot, super_slot) in signature.type_params.iter().zip(&sup.type_params) {
                let same = slot.upper_bounds().len() == super_slot.upper_bounds().len()
                    && slot
                        .upper_bounds()
                        .iter()
                        .zip(super_slot.upper_bounds())
                        .all(|(bound, super_bound)| equal_types(self.env, bound, super_bound));
                if !same {
                    let bounds = |slot: &TypeParamSlot| {
                        slot.upper_bounds()
                            .iter()
                            .map(|bound| render(bound))
                            .collect::<Vec<_>>()
                            .join(" & ")
                    };
                    return Err(ReconcileError::OverrideIncompatibility(format!(
                        "Upper bound changed for type parameter which overrides another: {}, was: {}",
                        bounds(slot),
                        bounds(super_slot)
                    )));
                }
            }
        }
        Ok(())
    }
}
