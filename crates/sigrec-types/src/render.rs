use std::fmt;

use crate::{Classifier, Signature, Type, TypeArg, TypeEnv, Variance};

/// Renders a [`Type`] with simple names, e.g. `MutableList<out String?>`.
pub struct TypeDisplay<'a> {
    env: &'a dyn TypeEnv,
    ty: &'a Type,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(env: &'a dyn TypeEnv, ty: &'a Type) -> Self {
        Self { env, ty }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(self.env, self.ty, f)
    }
}

fn write_type(env: &dyn TypeEnv, ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match ty.classifier {
        Classifier::Class(id) => match env.class(id) {
            Some(def) => f.write_str(def.simple_name())?,
            None => write!(f, "<class {}>", id.index())?,
        },
        Classifier::TypeParam(id) => match env.type_param(id) {
            Some(def) => f.write_str(&def.name)?,
            None => write!(f, "<T{}>", id.index())?,
        },
    }

    if !ty.args.is_empty() {
        f.write_str("<")?;
        for (i, arg) in ty.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg {
                TypeArg::Star => f.write_str("*")?,
                TypeArg::Projected { variance, ty } => {
                    if *variance != Variance::Invariant {
                        write!(f, "{} ", variance.keyword())?;
                    }
                    write_type(env, ty, f)?;
                }
            }
        }
        f.write_str(">")?;
    }

    if ty.nullable {
        f.write_str("?")?;
    }
    Ok(())
}

pub fn render_type(env: &dyn TypeEnv, ty: &Type) -> String {
    TypeDisplay::new(env, ty).to_string()
}

/// Renders a signature as a declaration header: `fun <T> Recv.(name: T, vararg rest: Int): Unit`.
pub fn render_signature(env: &dyn TypeEnv, signature: &Signature) -> String {
    let mut out = String::from("fun ");

    if !signature.type_params.is_empty() {
        let params: Vec<String> = signature
            .type_params
            .iter()
            .map(|slot| {
                let bounds: Vec<String> = slot
                    .upper_bounds()
                    .iter()
                    .filter(|bound| !env.well_known().is_default_bound(bound))
                    .map(|bound| render_type(env, bound))
                    .collect();
                if bounds.is_empty() {
                    slot.name().to_string()
                } else {
                    format!("{} : {}", slot.name(), bounds.join(" & "))
                }
            })
            .collect();
        out.push_str(&format!("<{}> ", params.join(", ")));
    }

    if let Some(receiver) = &signature.receiver_type {
        out.push_str(&format!("{}.", render_type(env, receiver)));
    }

    let params: Vec<String> = signature
        .value_params
        .iter()
        .map(|param| {
            if param.is_vararg {
                let element = crate::array_element_type(env, &param.ty)
                    .unwrap_or_else(|| param.ty.clone());
                format!("vararg {}: {}", param.name, render_type(env, &element))
            } else {
                format!("{}: {}", param.name, render_type(env, &param.ty))
            }
        })
        .collect();
    out.push_str(&format!(
        "({}): {}",
        params.join(", "),
        render_type(env, &signature.return_type)
    ));
    out
}
