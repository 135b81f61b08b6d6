use std::collections::HashMap;

use crate::{ClassId, Type, TypeParamId, Variance, WellKnownTypes};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

/// Declaration that owns a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeParamOwner {
    Class(ClassId),
    Member,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub variance: Variance,
    pub upper_bounds: Vec<Type>,
    pub owner: TypeParamOwner,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// Fully-qualified name, e.g. `kotlin.collections.MutableList`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeParamId>,
    /// Direct supertypes, expressed over `type_params`.
    pub supertypes: Vec<Type>,
}

impl ClassDef {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Read-only access to class and type-parameter metadata.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    /// Metadata of a type parameter. Refined parameters resolve to their declaration.
    fn type_param(&self, id: TypeParamId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;

    /// Declared variance of the `index`-th type parameter of `class`.
    fn declared_variance(&self, class: ClassId, index: usize) -> Variance {
        self.class(class)
            .and_then(|def| def.type_params.get(index).copied())
            .and_then(|tp| self.type_param(tp))
            .map(|tp| tp.variance)
            .unwrap_or(Variance::Invariant)
    }
}

/// In-memory class and type-parameter table.
#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    class_by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl TypeStore {
    pub(crate) fn empty() -> Self {
        Self {
            classes: Vec::new(),
            class_by_name: HashMap::new(),
            type_params: Vec::new(),
            well_known: WellKnownTypes::placeholder(),
        }
    }

    pub(crate) fn set_well_known(&mut self, well_known: WellKnownTypes) {
        self.well_known = well_known;
    }

    /// Look up a class by name, reserving a placeholder id when it is not defined yet.
    ///
    /// Placeholders allow self-referential supertypes (`Comparable<Foo>` on `Foo`) to be built
    /// before the class itself is defined.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_by_name.get(name) {
            return *id;
        }
        let id = ClassId::from_index(self.classes.len());
        self.classes.push(ClassDef {
            name: name.to_string(),
            kind: ClassKind::Class,
            type_params: Vec::new(),
            supertypes: Vec::new(),
        });
        self.class_by_name.insert(name.to_string(), id);
        id
    }

    /// Replace the definition of an interned class.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        let Some(slot) = self.classes.get_mut(id.index()) else {
            return;
        };
        if slot.name != def.name {
            self.class_by_name.remove(&slot.name);
            self.class_by_name.insert(def.name.clone(), id);
        }
        *slot = def;
    }

    /// Insert a class, overwriting any existing definition with the same name.
    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn add_type_param(&mut self, def: TypeParamDef) -> TypeParamId {
        let id = TypeParamId::from_index(self.type_params.len());
        self.type_params.push(def);
        id
    }

    /// Register a member (method) type parameter bounded by `bounds`, or `Any?` when empty.
    pub fn add_member_type_param(&mut self, name: &str, bounds: Vec<Type>) -> TypeParamId {
        let upper_bounds = if bounds.is_empty() {
            vec![self.well_known.default_bound()]
        } else {
            bounds
        };
        self.add_type_param(TypeParamDef {
            name: name.to_string(),
            variance: Variance::Invariant,
            upper_bounds,
            owner: crate::TypeParamOwner::Member,
        })
    }

    pub fn define_type_param(&mut self, id: TypeParamId, def: TypeParamDef) {
        if let Some(slot) = self.type_params.get_mut(id.index()) {
            *slot = def;
        }
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_by_name.get(name).copied()
    }

    /// Non-null type of the class `name`; unknown names resolve to `Any`.
    pub fn class_type(&self, name: &str, args: Vec<crate::TypeArg>) -> Type {
        let id = self.class_id(name).unwrap_or(self.well_known.any);
        Type::class(id, args)
    }

    /// The class type parameters of `class`, as types.
    pub fn class_params(&self, class: ClassId) -> Vec<Type> {
        self.class(class)
            .map(|def| def.type_params.iter().map(|tp| Type::param(*tp)).collect())
            .unwrap_or_default()
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.index())
    }

    fn type_param(&self, id: TypeParamId) -> Option<&TypeParamDef> {
        self.type_params.get(id.index())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}
