//! Reconciliation of host member signatures.
//!
//! A member's computed signature is refined in two ways: by merging the signatures of the
//! members it overrides ([`SignaturePropagator`]), and by an explicit alternative signature
//! checked against the computed one ([`AlternativeSignatureResolver`]). [`MemberReconciler`]
//! runs both for one member and always yields a usable signature.

#![forbid(unsafe_code)]

mod alternative;
mod cache;
mod erasure;
mod error;
mod host;
mod locator;
mod mapping;
mod matcher;
mod merge;
mod propagation;
mod reconcile;
pub mod syntax;

pub use crate::alternative::{AltResolution, AlternativeSignatureResolver};
pub use crate::cache::SignatureCache;
pub use crate::erasure::Erasure;
pub use crate::error::{codes, ReconcileError, Result};
pub use crate::host::{DescriptorTable, HostField, HostMethod, MemberTable, ResolvedMember};
pub use crate::locator::{align_type_params, OverriddenMember, SuperMemberLocator};
pub use crate::mapping::{CollectionMutability, PlatformAnalogs};
pub use crate::matcher::Matcher;
pub use crate::merge::{MergeEngine, TypeAndVariance};
pub use crate::propagation::SignaturePropagator;
pub use crate::reconcile::{MemberReconciler, Reconciled};
