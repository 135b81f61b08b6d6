//! End-to-end reconciliation of one member: locate overridden members, propagate their
//! signatures, then apply the alternative signature if there is one.
//!
//! Nothing here fails. A rejected alternative signature is reported and the propagated
//! signature is used instead.

use sigrec_config::ReconcileConfig;
use sigrec_types::{ClassId, Diagnostic, DiagnosticSink, Signature, Type, TypeEnv};

use crate::alternative::{AltResolution, AlternativeSignatureResolver};
use crate::host::{DescriptorTable, HostField, HostMethod};
use crate::locator::SuperMemberLocator;
use crate::mapping::{CollectionMutability, PlatformAnalogs};
use crate::propagation::SignaturePropagator;
use crate::syntax::{AltFunction, AltProperty};

/// Result of reconciling one member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciled<T> {
    pub signature: T,
    /// Whether an alternative signature was present, accepted or not.
    pub annotated: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Reconciled<T> {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub struct MemberReconciler<'a> {
    env: &'a dyn TypeEnv,
    table: &'a dyn DescriptorTable,
    analogs: &'a PlatformAnalogs,
    mutability: &'a CollectionMutability,
    config: ReconcileConfig,
}

impl<'a> MemberReconciler<'a> {
    pub fn new(
        env: &'a dyn TypeEnv,
        table: &'a dyn DescriptorTable,
        analogs: &'a PlatformAnalogs,
        mutability: &'a CollectionMutability,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            env,
            table,
            analogs,
            mutability,
            config,
        }
    }

    pub fn reconcile_method(
        &self,
        containing: ClassId,
        method: &HostMethod,
        auto: &Signature,
        alt: Option<&AltFunction>,
    ) -> Reconciled<Signature> {
        let context = format!("method {} in class {}", method.name, self.class_name(containing));
        let _span = tracing::debug_span!(target: "sigrec.engine", "reconcile", member = %context)
            .entered();
        let mut sink = DiagnosticSink::with_context(context);

        let supers: Vec<Signature> = SuperMemberLocator::new(self.env, self.table, self.analogs)
            .find_overridden(method, containing)
            .into_iter()
            .map(|overridden| overridden.signature)
            .collect();
        tracing::debug!(
            target: "sigrec.engine",
            supers = supers.len(),
            "located overridden members"
        );

        let propagated = SignaturePropagator::new(
            self.env,
            self.table,
            self.analogs,
            self.mutability,
            self.config.propagation,
        )
        .propagate_with_supers(containing, auto, &supers, &mut sink);

        let resolution = self
            .resolver()
            .resolve_method(method, &propagated, alt, &supers, &mut sink);
        self.finish(resolution, propagated, sink)
    }

    pub fn reconcile_field(
        &self,
        containing: ClassId,
        field: &HostField,
        auto: &Type,
        alt: Option<&AltProperty>,
    ) -> Reconciled<Type> {
        let context = format!("field {} in class {}", field.name, self.class_name(containing));
        let _span = tracing::debug_span!(target: "sigrec.engine", "reconcile", member = %context)
            .entered();
        let mut sink = DiagnosticSink::with_context(context);

        let resolution = self
            .resolver()
            .resolve_field(field, auto, alt, &mut sink);
        self.finish(resolution, auto.clone(), sink)
    }

    fn finish<T>(
        &self,
        resolution: AltResolution<T>,
        fallback: T,
        mut sink: DiagnosticSink,
    ) -> Reconciled<T> {
        let annotated = resolution.is_annotated();
        let signature = match resolution {
            AltResolution::NotAnnotated => fallback,
            AltResolution::Resolved(signature) => signature,
            AltResolution::Rejected(err) => {
                tracing::debug!(
                    target: "sigrec.engine",
                    code = err.code(),
                    "falling back after rejected alternative signature"
                );
                sink.push(err.to_diagnostic());
                fallback
            }
        };
        Reconciled {
            signature,
            annotated,
            diagnostics: sink.into_diagnostics(),
        }
    }

    fn resolver(&self) -> AlternativeSignatureResolver<'a> {
        AlternativeSignatureResolver::new(self.env, self.analogs, self.config.matcher)
    }

    fn class_name(&self, class: ClassId) -> &str {
        self.env.class(class).map(|def| def.name.as_str()).unwrap_or("<unknown>")
    }
}
