//! Host members as reflection sees them, and the table of already-resolved members.

use std::collections::HashMap;

use sigrec_types::{
    parse_method_descriptor, ClassId, DescriptorError, MemberId, MethodDescriptor, Signature,
};

/// A host method: name plus erased JVM descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostMethod {
    pub name: String,
    pub descriptor: MethodDescriptor,
    pub is_static: bool,
    /// The last parameter is declared `T...`.
    pub is_varargs: bool,
}

impl HostMethod {
    pub fn parse(name: impl Into<String>, descriptor: &str) -> Result<Self, DescriptorError> {
        Ok(Self {
            name: name.into(),
            descriptor: parse_method_descriptor(descriptor)?,
            is_static: false,
            is_varargs: false,
        })
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    #[must_use]
    pub fn with_varargs(mut self, is_varargs: bool) -> Self {
        self.is_varargs = is_varargs;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostField {
    pub name: String,
    pub is_final: bool,
}

/// A member whose signature has already been reconciled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMember {
    pub id: MemberId,
    pub owner: ClassId,
    pub name: String,
    /// Expressed over the owner's own type parameters.
    pub signature: Signature,
}

/// Lookup of resolved members, owned by the caller.
pub trait DescriptorTable {
    /// Members named `name` declared in `class`, in declaration order.
    fn members_named(&self, class: ClassId, name: &str) -> Vec<&ResolvedMember>;
}

/// In-memory [`DescriptorTable`].
#[derive(Clone, Debug, Default)]
pub struct MemberTable {
    members: Vec<ResolvedMember>,
    by_owner_and_name: HashMap<(ClassId, String), Vec<usize>>,
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, owner: ClassId, name: &str, signature: Signature) -> MemberId {
        let index = self.members.len();
        let id = MemberId(u32::try_from(index).unwrap_or(u32::MAX));
        self.members.push(ResolvedMember {
            id,
            owner,
            name: name.to_owned(),
            signature,
        });
        self.by_owner_and_name
            .entry((owner, name.to_owned()))
            .or_default()
            .push(index);
        id
    }

    pub fn get(&self, id: MemberId) -> Option<&ResolvedMember> {
        self.members.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl DescriptorTable for MemberTable {
    fn members_named(&self, class: ClassId, name: &str) -> Vec<&ResolvedMember> {
        self.by_owner_and_name
            .get(&(class, name.to_owned()))
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|index| self.members.get(*index))
                    .collect()
            })
            .unwrap_or_default()
    }
}
