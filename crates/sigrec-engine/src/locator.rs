use std::collections::{HashSet, VecDeque};

use sigrec_types::{
    ClassId, MemberId, Signature, Substitutor, Type, TypeArg, TypeEnv, TypeParamId, TypeParamSlot,
};

use crate::erasure::Erasure;
use crate::host::{DescriptorTable, HostMethod, ResolvedMember};
use crate::mapping::PlatformAnalogs;

/// A super member overridden by the member being reconciled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverriddenMember {
    pub member: MemberId,
    pub owner: ClassId,
    /// The direct supertype of the containing class it was found through.
    pub supertype: Type,
    /// The member's signature with the supertype's arguments substituted in.
    pub signature: Signature,
}

/// Finds the supertype members that a host method overrides.
pub struct SuperMemberLocator<'a> {
    env: &'a dyn TypeEnv,
    table: &'a dyn DescriptorTable,
    analogs: &'a PlatformAnalogs,
}

impl<'a> SuperMemberLocator<'a> {
    pub fn new(
        env: &'a dyn TypeEnv,
        table: &'a dyn DescriptorTable,
        analogs: &'a PlatformAnalogs,
    ) -> Self {
        Self {
            env,
            table,
            analogs,
        }
    }

    /// Overridden members, ordered by the fully-qualified name of their owner.
    ///
    /// Each direct supertype is searched upwards until a class declares matching members; those
    /// hide anything further up that path. Candidates match when their erased parameter list
    /// equals the method's descriptor. Return types are ignored since overrides may narrow them.
    pub fn find_overridden(
        &self,
        method: &HostMethod,
        containing: ClassId,
    ) -> Vec<OverriddenMember> {
        if method.is_static {
            return Vec::new();
        }
        let Some(def) = self.env.class(containing) else {
            return Vec::new();
        };

        let mut found: Vec<OverriddenMember> = Vec::new();
        for supertype in &def.supertypes {
            let mut queue = VecDeque::from([supertype.clone()]);
            let mut seen = HashSet::new();

            while let Some(current) = queue.pop_front() {
                let Some(class) = current.class_id() else {
                    continue;
                };
                if !seen.insert(class) {
                    continue;
                }
                let Some(class_def) = self.env.class(class) else {
                    continue;
                };
                let subst = Substitutor::from_pairs(&class_def.type_params, &current.args);

                let matches = self.matching_members(method, class, &subst);
                if matches.is_empty() {
                    queue.extend(class_def.supertypes.iter().map(|sup| subst.substitute(sup)));
                    continue;
                }
                for (candidate, signature) in matches {
                    if found.iter().any(|existing| existing.member == candidate.id) {
                        continue;
                    }
                    tracing::trace!(
                        target: "sigrec.engine",
                        method = %method.name,
                        owner = %class_def.name,
                        "found overridden member"
                    );
                    found.push(OverriddenMember {
                        member: candidate.id,
                        owner: candidate.owner,
                        supertype: supertype.clone(),
                        signature,
                    });
                }
            }
        }

        found.sort_by(|a, b| self.owner_name(a.owner).cmp(self.owner_name(b.owner)));
        found
    }

    /// Members of `class` that `method` overrides, with `subst` applied to their signatures.
    fn matching_members(
        &self,
        method: &HostMethod,
        class: ClassId,
        subst: &Substitutor,
    ) -> Vec<(&'a ResolvedMember, Signature)> {
        let erasure = Erasure::new(self.env, self.analogs);
        self.table
            .members_named(class, &method.name)
            .into_iter()
            .filter_map(|candidate| {
                let substituted = subst.substitute_signature(&candidate.signature);
                // A raw or bridged override matches the unsubstituted erasure instead.
                let matches = erasure.erase_parameters(&substituted) == method.descriptor.params
                    || erasure.erase_parameters(&candidate.signature) == method.descriptor.params;
                matches.then_some((candidate, substituted))
            })
            .collect()
    }

    fn owner_name(&self, owner: ClassId) -> &str {
        self.env.class(owner).map(|def| def.name.as_str()).unwrap_or("")
    }
}

/// Rewrites `signature` so its method type parameters become `targets`, index-wise.
///
/// Lets super signatures be compared against the member's own type parameters. Extra
/// parameters on either side are left untouched.
pub fn align_type_params(signature: &Signature, targets: &[TypeParamId]) -> Signature {
    let replacements: Vec<TypeArg> = targets
        .iter()
        .map(|target| TypeArg::invariant(Type::param(*target)))
        .collect();
    let subst = Substitutor::from_pairs(&signature.type_param_ids(), &replacements);

    let mut aligned = subst.substitute_signature(signature);
    aligned.type_params = aligned
        .type_params
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let id = targets.get(index).copied().unwrap_or(slot.id());
            TypeParamSlot::new(id, slot.name(), slot.upper_bounds().to_vec())
        })
        .collect();
    aligned
}
