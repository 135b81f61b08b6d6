use crate::{ClassId, TypeParamId, Variance};

/// What a [`Type`] refers to: a named class/interface or a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classifier {
    Class(ClassId),
    TypeParam(TypeParamId),
}

/// A type: classifier, nullability and type arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Type {
    pub classifier: Classifier,
    pub nullable: bool,
    pub args: Vec<TypeArg>,
}

/// One argument of a parameterized type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeArg {
    /// `*`
    Star,
    Projected { variance: Variance, ty: Type },
}

impl Type {
    pub fn class(id: ClassId, args: Vec<TypeArg>) -> Self {
        Self {
            classifier: Classifier::Class(id),
            nullable: false,
            args,
        }
    }

    pub fn param(id: TypeParamId) -> Self {
        Self {
            classifier: Classifier::TypeParam(id),
            nullable: false,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn make_nullable(self) -> Self {
        self.with_nullable(true)
    }

    #[must_use]
    pub fn make_not_null(self) -> Self {
        self.with_nullable(false)
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self.classifier {
            Classifier::Class(id) => Some(id),
            Classifier::TypeParam(_) => None,
        }
    }

    pub fn type_param(&self) -> Option<TypeParamId> {
        match self.classifier {
            Classifier::TypeParam(id) => Some(id),
            Classifier::Class(_) => None,
        }
    }

    /// Whether both trees have the same argument arity at every nesting depth.
    ///
    /// A star matches only a star; nullability, classifiers and projections are ignored.
    pub fn same_shape(&self, other: &Type) -> bool {
        self.args.len() == other.args.len()
            && self
                .args
                .iter()
                .zip(&other.args)
                .all(|(a, b)| match (a, b) {
                    (TypeArg::Star, TypeArg::Star) => true,
                    (TypeArg::Projected { ty: a, .. }, TypeArg::Projected { ty: b, .. }) => {
                        a.same_shape(b)
                    }
                    _ => false,
                })
    }
}

impl TypeArg {
    pub fn invariant(ty: Type) -> Self {
        Self::Projected {
            variance: Variance::Invariant,
            ty,
        }
    }

    pub fn out(ty: Type) -> Self {
        Self::Projected {
            variance: Variance::Out,
            ty,
        }
    }

    pub fn contra(ty: Type) -> Self {
        Self::Projected {
            variance: Variance::In,
            ty,
        }
    }

    pub fn ty(&self) -> Option<&Type> {
        match self {
            TypeArg::Star => None,
            TypeArg::Projected { ty, .. } => Some(ty),
        }
    }

    /// Projection kind of this argument; a star behaves as `out`.
    pub fn projection_kind(&self) -> Variance {
        match self {
            TypeArg::Star => Variance::Out,
            TypeArg::Projected { variance, .. } => *variance,
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self, TypeArg::Star)
    }
}
