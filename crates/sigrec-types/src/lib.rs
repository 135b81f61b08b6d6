//! Type-tree model shared by the signature reconciliation crates.
//!
//! Types here are plain immutable values: a [`Type`] is a classifier plus nullability plus an
//! argument list, and a [`Signature`] bundles the types of one member. Class metadata (names,
//! declared variance, supertypes) lives in a [`TypeStore`] and is reached through the
//! [`TypeEnv`] trait so callers can substitute their own symbol tables.

#![forbid(unsafe_code)]

mod builtins;
mod descriptor;
mod diagnostics;
mod ids;
mod render;
mod signature;
mod store;
mod subst;
mod subtype;
mod ty;
mod variance;

pub use crate::builtins::{
    array_element_type, array_type, is_array, is_primitive_array, names, PrimitiveArray,
    WellKnownTypes,
};
pub use crate::descriptor::{
    parse_field_descriptor, parse_method_descriptor, BaseType, DescriptorError, FieldType,
    MethodDescriptor, ReturnType,
};
pub use crate::diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use crate::ids::{ClassId, MemberId, TypeParamId};
pub use crate::render::{render_signature, render_type, TypeDisplay};
pub use crate::signature::{Signature, TypeParamBuilder, TypeParamSlot, ValueParameter};
pub use crate::store::{ClassDef, ClassKind, TypeEnv, TypeParamDef, TypeParamOwner, TypeStore};
pub use crate::subst::Substitutor;
pub use crate::subtype::{deep_substitution, equal_types, is_subtype, supertype_as};
pub use crate::ty::{Classifier, Type, TypeArg};
pub use crate::variance::{TypeUsage, Variance};
