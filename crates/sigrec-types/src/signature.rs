use crate::{Type, TypeParamId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueParameter {
    pub name: String,
    /// Declared type; for a vararg parameter this is the array type.
    pub ty: Type,
    pub is_vararg: bool,
    pub has_default: bool,
    pub index: usize,
}

impl ValueParameter {
    pub fn new(index: usize, name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_vararg: false,
            has_default: false,
            index,
        }
    }

    #[must_use]
    pub fn with_vararg(mut self, is_vararg: bool) -> Self {
        self.is_vararg = is_vararg;
        self
    }

    #[must_use]
    pub fn with_default(mut self, has_default: bool) -> Self {
        self.has_default = has_default;
        self
    }
}

/// A type parameter whose upper bounds are still being collected.
///
/// Bounds may reference the parameter itself (`T : Comparable<T>`), so the identity exists
/// before the bounds do. Calling [`TypeParamBuilder::seal`] ends the building phase.
#[derive(Clone, Debug)]
pub struct TypeParamBuilder {
    id: TypeParamId,
    name: String,
    upper_bounds: Vec<Type>,
}

impl TypeParamBuilder {
    pub fn new(id: TypeParamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            upper_bounds: Vec::new(),
        }
    }

    pub fn id(&self) -> TypeParamId {
        self.id
    }

    pub fn add_upper_bound(&mut self, bound: Type) {
        self.upper_bounds.push(bound);
    }

    pub fn seal(self) -> TypeParamSlot {
        TypeParamSlot {
            id: self.id,
            name: self.name,
            upper_bounds: self.upper_bounds,
        }
    }
}

/// A sealed type parameter of a [`Signature`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamSlot {
    id: TypeParamId,
    name: String,
    upper_bounds: Vec<Type>,
}

impl TypeParamSlot {
    pub fn new(id: TypeParamId, name: impl Into<String>, upper_bounds: Vec<Type>) -> Self {
        Self {
            id,
            name: name.into(),
            upper_bounds,
        }
    }

    pub fn id(&self) -> TypeParamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn upper_bounds(&self) -> &[Type] {
        &self.upper_bounds
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub receiver_type: Option<Type>,
    pub type_params: Vec<TypeParamSlot>,
    pub value_params: Vec<ValueParameter>,
    pub return_type: Type,
    /// Whether call sites may rely on the parameter names.
    pub stable_parameter_names: bool,
}

impl Signature {
    pub fn new(value_params: Vec<ValueParameter>, return_type: Type) -> Self {
        Self {
            receiver_type: None,
            type_params: Vec::new(),
            value_params,
            return_type,
            stable_parameter_names: false,
        }
    }

    pub fn type_param_ids(&self) -> Vec<TypeParamId> {
        self.type_params.iter().map(TypeParamSlot::id).collect()
    }

    pub fn is_extension(&self) -> bool {
        self.receiver_type.is_some()
    }

    /// Parameter types with the receiver (if any) first, as the host sees them.
    pub fn host_parameter_types(&self) -> impl Iterator<Item = &Type> + '_ {
        self.receiver_type
            .iter()
            .chain(self.value_params.iter().map(|p| &p.ty))
    }
}
