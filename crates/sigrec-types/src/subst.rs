use std::collections::HashMap;

use crate::{Signature, Type, TypeArg, TypeParamId, TypeParamSlot, ValueParameter, Variance};

/// Replaces type-parameter references by type arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitutor {
    map: HashMap<TypeParamId, TypeArg>,
}

impl Substitutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `params` with `args` positionally; extra entries on either side are ignored.
    pub fn from_pairs(params: &[TypeParamId], args: &[TypeArg]) -> Self {
        Self {
            map: params.iter().copied().zip(args.iter().cloned()).collect(),
        }
    }

    pub fn insert(&mut self, param: TypeParamId, arg: TypeArg) {
        self.map.insert(param, arg);
    }

    pub fn get(&self, param: TypeParamId) -> Option<&TypeArg> {
        self.map.get(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Substitute a type in a top-level position.
    ///
    /// A parameter mapped to `*` is left unchanged; the projection cannot be expressed there.
    pub fn substitute(&self, ty: &Type) -> Type {
        if let Some(param) = ty.type_param() {
            return match self.map.get(&param) {
                Some(TypeArg::Projected { ty: replacement, .. }) => replacement
                    .clone()
                    .with_nullable(replacement.nullable || ty.nullable),
                Some(TypeArg::Star) | None => ty.clone(),
            };
        }

        Type {
            classifier: ty.classifier,
            nullable: ty.nullable,
            args: ty.args.iter().map(|arg| self.substitute_arg(arg)).collect(),
        }
    }

    /// Substitute a type argument, combining the use-site projection with the one it maps to.
    ///
    /// Opposite projections (`in` over `out`) collapse to `*`.
    pub fn substitute_arg(&self, arg: &TypeArg) -> TypeArg {
        let TypeArg::Projected { variance, ty } = arg else {
            return TypeArg::Star;
        };

        let mapped = ty.type_param().and_then(|param| self.map.get(&param));
        match mapped {
            None => TypeArg::Projected {
                variance: *variance,
                ty: self.substitute(ty),
            },
            Some(TypeArg::Star) => TypeArg::Star,
            Some(TypeArg::Projected {
                variance: inner,
                ty: replacement,
            }) => {
                let replacement = replacement
                    .clone()
                    .with_nullable(replacement.nullable || ty.nullable);
                match combine_projections(*variance, *inner) {
                    Some(variance) => TypeArg::Projected {
                        variance,
                        ty: replacement,
                    },
                    None => TypeArg::Star,
                }
            }
        }
    }

    pub fn substitute_signature(&self, signature: &Signature) -> Signature {
        Signature {
            receiver_type: signature.receiver_type.as_ref().map(|ty| self.substitute(ty)),
            type_params: signature
                .type_params
                .iter()
                .map(|slot| {
                    TypeParamSlot::new(
                        slot.id(),
                        slot.name(),
                        slot.upper_bounds()
                            .iter()
                            .map(|bound| self.substitute(bound))
                            .collect(),
                    )
                })
                .collect(),
            value_params: signature
                .value_params
                .iter()
                .map(|param| ValueParameter {
                    ty: self.substitute(&param.ty),
                    ..param.clone()
                })
                .collect(),
            return_type: self.substitute(&signature.return_type),
            stable_parameter_names: signature.stable_parameter_names,
        }
    }
}

fn combine_projections(outer: Variance, inner: Variance) -> Option<Variance> {
    match (outer, inner) {
        (Variance::Invariant, other) | (other, Variance::Invariant) => Some(other),
        (a, b) if a == b => Some(a),
        _ => None,
    }
}
