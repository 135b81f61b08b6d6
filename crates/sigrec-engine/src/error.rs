use sigrec_types::Diagnostic;
use thiserror::Error;

/// Stable diagnostic codes raised by the engine.
pub mod codes {
    pub const ALT_SIGNATURE_MISMATCH: &str = "ALT_SIGNATURE_MISMATCH";
    pub const ALT_SIGNATURE_OVERRIDE: &str = "ALT_SIGNATURE_OVERRIDE";
    pub const ALT_SIGNATURE_UNSUPPORTED: &str = "ALT_SIGNATURE_UNSUPPORTED";
    pub const ALT_REDUNDANT_PROJECTION: &str = "ALT_REDUNDANT_PROJECTION";
    pub const PROPAGATION_CONFLICT: &str = "PROPAGATION_CONFLICT";
    pub const PROPAGATION_ARRAY_RETURN: &str = "PROPAGATION_ARRAY_RETURN";
}

/// Why an alternative signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The alternative signature does not have the shape of the computed one.
    #[error("{0}")]
    StructuralMismatch(String),
    /// The alternative signature is well-formed but breaks an overridden member's contract.
    #[error("{0}")]
    OverrideIncompatibility(String),
    #[error("{0}")]
    Unsupported(String),
}

impl ReconcileError {
    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        ReconcileError::StructuralMismatch(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ReconcileError::StructuralMismatch(_) => codes::ALT_SIGNATURE_MISMATCH,
            ReconcileError::OverrideIncompatibility(_) => codes::ALT_SIGNATURE_OVERRIDE,
            ReconcileError::Unsupported(_) => codes::ALT_SIGNATURE_UNSUPPORTED,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string())
    }
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
