//! Lock-step walk of an alternative signature tree against the computed type.

use std::collections::HashMap;

use sigrec_config::MatcherConfig;
use sigrec_types::{
    render_type, ClassId, Classifier, Diagnostic, Type, TypeArg, TypeEnv, TypeParamId, TypeUsage,
    Variance,
};

use crate::error::{codes, ReconcileError, Result};
use crate::mapping::PlatformAnalogs;
use crate::syntax::{ArgNode, NamedType, TypeNode};

/// Refines computed types with an alternative signature.
///
/// Every structural disagreement is an error; the only tolerated problem is a redundant
/// projection in lenient mode, collected as a warning.
pub struct Matcher<'a> {
    env: &'a dyn TypeEnv,
    analogs: &'a PlatformAnalogs,
    config: MatcherConfig,
    refined: HashMap<TypeParamId, TypeParamId>,
    params_by_name: HashMap<String, TypeParamId>,
    warnings: Vec<Diagnostic>,
}

impl<'a> Matcher<'a> {
    pub fn new(env: &'a dyn TypeEnv, analogs: &'a PlatformAnalogs, config: MatcherConfig) -> Self {
        Self {
            env,
            analogs,
            config,
            refined: HashMap::new(),
            params_by_name: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Type parameters of the member: original id to refined id, and the names the alternative
    /// signature gives the refined parameters.
    #[must_use]
    pub fn with_type_params(
        mut self,
        refined: HashMap<TypeParamId, TypeParamId>,
        params_by_name: HashMap<String, TypeParamId>,
    ) -> Self {
        self.refined = refined;
        self.params_by_name = params_by_name;
        self
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    /// A return type may only be omitted when the computed one is `Unit`.
    pub fn match_return(&mut self, node: Option<&TypeNode>, auto: &Type) -> Result<Type> {
        match node {
            Some(node) => self.match_type(node, auto, TypeUsage::Return),
            None => {
                let unit = self.env.well_known().unit_type();
                if *auto == unit {
                    Ok(unit)
                } else {
                    Err(ReconcileError::mismatch(format!(
                        "Return type in alternative signature is missing, while in real signature it is '{}'",
                        render_type(self.env, auto)
                    )))
                }
            }
        }
    }

    pub fn match_type(&mut self, node: &TypeNode, auto: &Type, usage: TypeUsage) -> Result<Type> {
        match node {
            TypeNode::Nullable(inner) => {
                if !auto.nullable && usage != TypeUsage::TypeArgument {
                    return Err(ReconcileError::mismatch(format!(
                        "Auto type '{}' is not-null, while type in alternative signature is nullable: '{}'",
                        render_type(self.env, auto),
                        node
                    )));
                }
                Ok(self.match_type(inner, auto, usage)?.make_nullable())
            }
            TypeNode::Named(named) => self.match_named(node, named, auto),
            TypeNode::Function(function) => {
                let named = function.desugar();
                self.match_named(node, &named, auto)
            }
            TypeNode::SelfType => Err(ReconcileError::Unsupported(
                "Self-types are not supported yet".to_string(),
            )),
        }
    }

    fn match_named(&mut self, node: &TypeNode, named: &NamedType, auto: &Type) -> Result<Type> {
        match auto.classifier {
            Classifier::TypeParam(param) => self.match_type_param(node, named, param),
            Classifier::Class(class) => {
                let Some(resolved) = self.resolve_class(&named.name, class) else {
                    return Err(self.type_mismatch(node, auto));
                };
                let args = self.match_args(node, named, auto, resolved)?;
                Ok(Type::class(resolved, args))
            }
        }
    }

    fn match_type_param(
        &mut self,
        node: &TypeNode,
        named: &NamedType,
        param: TypeParamId,
    ) -> Result<Type> {
        let target = self.refined.get(&param).copied().unwrap_or(param);
        let declared = self.params_by_name.get(&named.name).copied().or_else(|| {
            self.env
                .type_param(param)
                .filter(|def| def.name == named.name)
                .map(|_| target)
        });

        if declared != Some(target) {
            return Err(self.type_mismatch(node, &Type::param(param)));
        }
        if !named.args.is_empty() {
            return Err(ReconcileError::mismatch(format!(
                "'{}' type in method signature has 0 type arguments, while '{}' in alternative signature has {} of them",
                render_type(self.env, &Type::param(param)),
                node,
                named.args.len()
            )));
        }
        Ok(Type::param(target))
    }

    /// The class `name` refers to, if it is the computed classifier or one of its analogs.
    fn resolve_class(&self, name: &str, auto_class: ClassId) -> Option<ClassId> {
        let def = self.env.class(auto_class)?;
        let names_match = |candidate: &str| {
            candidate == name
                || candidate
                    .strip_suffix(name)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        };

        if names_match(&def.name) {
            return Some(auto_class);
        }
        self.analogs
            .analogs_of(&def.name)
            .find(|candidate| names_match(candidate))
            .and_then(|candidate| self.env.lookup_class(candidate))
    }

    fn match_args(
        &mut self,
        node: &TypeNode,
        named: &NamedType,
        auto: &Type,
        class: ClassId,
    ) -> Result<Vec<TypeArg>> {
        if named.args.len() != auto.args.len() {
            return Err(ReconcileError::mismatch(format!(
                "'{}' type in method signature has {} type arguments, while '{}' in alternative signature has {} of them",
                render_type(self.env, auto),
                auto.args.len(),
                node,
                named.args.len()
            )));
        }

        let mut args = Vec::with_capacity(auto.args.len());
        for (index, (alt_arg, auto_arg)) in named.args.iter().zip(&auto.args).enumerate() {
            let (projection, alt_ty) = match alt_arg {
                ArgNode::Star => {
                    args.push(auto_arg.clone());
                    continue;
                }
                ArgNode::Projected { projection, ty } => (*projection, ty),
            };
            let TypeArg::Projected {
                variance: auto_projection,
                ty: auto_ty,
            } = auto_arg
            else {
                return Err(ReconcileError::mismatch(format!(
                    "Projection kind mismatch, actual: *, in alternative signature: {}",
                    alt_arg_display(projection, alt_ty)
                )));
            };

            let variance = self.projection(class, index, projection, *auto_projection)?;
            let ty = self.match_type(alt_ty, auto_ty, TypeUsage::TypeArgument)?;
            args.push(TypeArg::Projected { variance, ty });
        }
        Ok(args)
    }

    fn projection(
        &mut self,
        class: ClassId,
        index: usize,
        alt: Variance,
        auto: Variance,
    ) -> Result<Variance> {
        if auto != Variance::Invariant {
            if alt != auto {
                return Err(ReconcileError::mismatch(format!(
                    "Projection kind mismatch, actual: {auto}, in alternative signature: {alt}"
                )));
            }
            return Ok(auto);
        }
        if alt == Variance::Invariant {
            return Ok(alt);
        }

        let declared = self.env.declared_variance(class, index);
        if declared == alt {
            let message = format!("Projection kind '{}' is redundant", alt.keyword());
            if self.config.strict_projections {
                return Err(ReconcileError::mismatch(message));
            }
            tracing::debug!(target: "sigrec.engine", %message, "tolerating redundant projection");
            self.warnings
                .push(Diagnostic::warning(codes::ALT_REDUNDANT_PROJECTION, message));
            return Ok(Variance::Invariant);
        }
        if declared != Variance::Invariant {
            let class_name = self
                .env
                .class(class)
                .map(|def| def.simple_name().to_string())
                .unwrap_or_default();
            return Err(ReconcileError::mismatch(format!(
                "Projection kind '{}' is conflicting with variance of {class_name}",
                alt.keyword()
            )));
        }
        Ok(alt)
    }

    fn type_mismatch(&self, node: &TypeNode, auto: &Type) -> ReconcileError {
        ReconcileError::mismatch(format!(
            "Alternative signature type mismatch, expected: {}, actual: {}",
            node,
            render_type(self.env, auto)
        ))
    }
}

fn alt_arg_display(projection: Variance, ty: &TypeNode) -> String {
    if projection == Variance::Invariant {
        ty.to_string()
    } else {
        format!("{} {ty}", projection.keyword())
    }
}
