use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a class or interface registered in a [`crate::TypeStore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Identity of a type parameter.
///
/// Type parameters are compared by identity, never by name. A reconciliation call creates a
/// parallel set of parameters for the member it resolves; those share the declaration index of
/// the parameter they refine but carry a higher generation, so the refined parameter is distinct
/// from its original while repeated reconciliations of the same input yield the same ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeParamId {
    index: u32,
    generation: u32,
}

impl TypeParamId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self {
            index: u32::try_from(index).unwrap_or(u32::MAX),
            generation: 0,
        }
    }

    /// Index of the declaration in the owning store (shared by all generations).
    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    /// The id of the parameter that refines this one.
    #[must_use]
    pub fn refined(self) -> Self {
        Self {
            index: self.index,
            generation: self.generation.saturating_add(1),
        }
    }

    /// The generation-0 declaration this id was derived from.
    #[must_use]
    pub fn declaration(self) -> Self {
        Self {
            index: self.index,
            generation: 0,
        }
    }
}

impl fmt::Debug for TypeParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "TypeParamId({})", self.index)
        } else {
            write!(f, "TypeParamId({}#{})", self.index, self.generation)
        }
    }
}

/// Identity of a member (field or method) in the descriptor table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u32);
