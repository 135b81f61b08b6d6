use std::fmt;

use serde::{Deserialize, Serialize};

/// Declaration-site variance of a type parameter, or use-site projection of a type argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variance {
    Invariant,
    In,
    Out,
}

impl Variance {
    /// Effective variance of a position nested inside a position of variance `position`.
    ///
    /// `Invariant` absorbs everything, `Out` is the identity, and `In` flips the inner variance
    /// (a contravariant position inside a contravariant position is covariant).
    #[must_use]
    pub fn superpose(self, position: Variance) -> Variance {
        match (self, position) {
            (Variance::Invariant, _) | (_, Variance::Invariant) => Variance::Invariant,
            (Variance::Out, other) | (other, Variance::Out) => other,
            (Variance::In, Variance::In) => Variance::Out,
        }
    }

    /// Keyword used in source (`in`, `out`), empty for invariant.
    pub fn keyword(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in",
            Variance::Out => "out",
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Invariant => f.write_str("invariant"),
            other => f.write_str(other.keyword()),
        }
    }
}

/// How a type is used in the member being reconciled.
///
/// Threaded through the recursion; it decides which merge and match rules apply at a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeUsage {
    /// Return type or field type.
    Return,
    /// Value parameter or receiver type.
    Parameter,
    /// Upper bound of a type parameter.
    UpperBound,
    /// Argument of an enclosing type; inherits the enclosing variance.
    TypeArgument,
}

impl TypeUsage {
    /// Variance of the top-level position this usage describes.
    pub fn position_variance(self) -> Variance {
        match self {
            TypeUsage::Return => Variance::Out,
            TypeUsage::Parameter => Variance::In,
            TypeUsage::UpperBound | TypeUsage::TypeArgument => Variance::Invariant,
        }
    }
}
