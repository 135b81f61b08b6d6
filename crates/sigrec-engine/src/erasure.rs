use sigrec_types::{
    Classifier, FieldType, MethodDescriptor, ReturnType, Signature, Type, TypeArg, TypeEnv,
    TypeParamSlot,
};

use crate::mapping::PlatformAnalogs;

/// Type parameters whose bounds reference each other are cut off at this depth.
const MAX_BOUND_DEPTH: usize = 16;

/// Maps types onto the JVM types the host sees after erasure.
pub struct Erasure<'a> {
    env: &'a dyn TypeEnv,
    analogs: &'a PlatformAnalogs,
}

impl<'a> Erasure<'a> {
    pub fn new(env: &'a dyn TypeEnv, analogs: &'a PlatformAnalogs) -> Self {
        Self { env, analogs }
    }

    /// Erasure of `ty`; type parameters declared in `scope` erase to their first bound.
    pub fn erase(&self, ty: &Type, scope: &[TypeParamSlot]) -> FieldType {
        self.erase_at_depth(ty, scope, 0)
    }

    fn erase_at_depth(&self, ty: &Type, scope: &[TypeParamSlot], depth: usize) -> FieldType {
        let wk = self.env.well_known();
        let object = || FieldType::object("java.lang.Object");

        let class = match ty.classifier {
            Classifier::TypeParam(param) => {
                if depth >= MAX_BOUND_DEPTH {
                    return object();
                }
                let bound = scope
                    .iter()
                    .find(|slot| slot.id() == param)
                    .and_then(|slot| slot.upper_bounds().first())
                    .or_else(|| {
                        self.env
                            .type_param(param)
                            .and_then(|def| def.upper_bounds.first())
                    });
                return match bound {
                    // Generic values are always references: `T : Int` erases to `Integer`.
                    Some(bound) => {
                        let bound = bound.clone().make_nullable();
                        self.erase_at_depth(&bound, scope, depth + 1)
                    }
                    None => object(),
                };
            }
            Classifier::Class(class) => class,
        };

        if class == wk.array {
            let element = match ty.args.first() {
                Some(TypeArg::Projected { ty, .. }) => {
                    self.erase_at_depth(&ty.clone().make_nullable(), scope, depth)
                }
                Some(TypeArg::Star) | None => object(),
            };
            return FieldType::array_of(element);
        }

        let Some(def) = self.env.class(class) else {
            return object();
        };

        if let Some(primitive) = wk.primitive_arrays.iter().find(|p| p.array == class) {
            let element = self
                .env
                .class(primitive.element)
                .and_then(|element| self.analogs.primitive(&element.name));
            if let Some(base) = element {
                return FieldType::array_of(FieldType::Base(base));
            }
        }

        if !ty.nullable {
            if let Some(base) = self.analogs.primitive(&def.name) {
                return FieldType::Base(base);
            }
        }

        let host = self.analogs.host_name(&def.name).unwrap_or(&def.name);
        FieldType::object(host)
    }

    /// `Unit` erases to `void`.
    pub fn erase_return(&self, ty: &Type, scope: &[TypeParamSlot]) -> ReturnType {
        let wk = self.env.well_known();
        if !ty.nullable && ty.class_id() == Some(wk.unit) {
            ReturnType::Void
        } else {
            ReturnType::Type(self.erase(ty, scope))
        }
    }

    /// Erased parameter list with the receiver (if any) first.
    pub fn erase_parameters(&self, signature: &Signature) -> Vec<FieldType> {
        signature
            .host_parameter_types()
            .map(|ty| self.erase(ty, &signature.type_params))
            .collect()
    }

    pub fn erase_signature(&self, signature: &Signature) -> MethodDescriptor {
        MethodDescriptor {
            params: self.erase_parameters(signature),
            return_type: self.erase_return(&signature.return_type, &signature.type_params),
        }
    }
}
