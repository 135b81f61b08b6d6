//! Parsed form of alternative signatures.
//!
//! The text parser lives outside this crate; it hands over these trees.

use std::fmt;

use sigrec_types::{names, Variance};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeNode {
    /// `T?`
    Nullable(Box<TypeNode>),
    Named(NamedType),
    /// `(A, B) -> R` or `R.(A) -> R`
    Function(FunctionTypeNode),
    /// `This`
    SelfType,
}

/// A possibly qualified type name with arguments, e.g. `java.util.List<out T>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    pub args: Vec<ArgNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgNode {
    Star,
    Projected { projection: Variance, ty: TypeNode },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionTypeNode {
    pub receiver: Option<Box<TypeNode>>,
    pub params: Vec<TypeNode>,
    pub ret: Box<TypeNode>,
}

impl TypeNode {
    pub fn named(name: impl Into<String>, args: Vec<ArgNode>) -> Self {
        TypeNode::Named(NamedType {
            name: name.into(),
            args,
        })
    }

    /// A named type without arguments.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::named(name, Vec::new())
    }

    #[must_use]
    pub fn nullable(self) -> Self {
        TypeNode::Nullable(Box::new(self))
    }
}

impl ArgNode {
    pub fn invariant(ty: TypeNode) -> Self {
        ArgNode::Projected {
            projection: Variance::Invariant,
            ty,
        }
    }

    pub fn out(ty: TypeNode) -> Self {
        ArgNode::Projected {
            projection: Variance::Out,
            ty,
        }
    }

    pub fn contra(ty: TypeNode) -> Self {
        ArgNode::Projected {
            projection: Variance::In,
            ty,
        }
    }
}

impl FunctionTypeNode {
    /// The equivalent `FunctionN`/`ExtensionFunctionN` type; the receiver comes first and the
    /// return type last.
    pub fn desugar(&self) -> NamedType {
        let arity = self.params.len();
        let name = if self.receiver.is_some() {
            names::extension_function(arity)
        } else {
            names::function(arity)
        };

        let args = self
            .receiver
            .iter()
            .map(|receiver| &**receiver)
            .chain(&self.params)
            .chain(std::iter::once(&*self.ret))
            .map(|ty| ArgNode::invariant(ty.clone()))
            .collect();

        NamedType { name, args }
    }
}

/// `fun <T : Bound> name(p: T, vararg rest: String): R`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AltFunction {
    pub name: String,
    pub type_params: Vec<AltTypeParameter>,
    pub receiver: Option<TypeNode>,
    pub params: Vec<AltParameter>,
    /// `None` when the signature omits `: R`.
    pub return_type: Option<TypeNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AltTypeParameter {
    pub name: String,
    pub bounds: Vec<TypeNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AltParameter {
    pub name: Option<String>,
    /// For a vararg parameter, the element type.
    pub ty: TypeNode,
    pub is_vararg: bool,
}

impl AltParameter {
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            is_vararg: false,
        }
    }

    pub fn vararg(name: impl Into<String>, element: TypeNode) -> Self {
        Self {
            is_vararg: true,
            ..Self::new(name, element)
        }
    }
}

/// `val name: T` or `var name: T`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AltProperty {
    pub name: String,
    pub is_var: bool,
    pub ty: Option<TypeNode>,
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Nullable(inner) => write!(f, "{inner}?"),
            TypeNode::Named(named) => write!(f, "{named}"),
            TypeNode::Function(function) => {
                if let Some(receiver) = &function.receiver {
                    write!(f, "{receiver}.")?;
                }
                f.write_str("(")?;
                for (i, param) in function.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {}", function.ret)
            }
            TypeNode::SelfType => f.write_str("This"),
        }
    }
}

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg {
                ArgNode::Star => f.write_str("*")?,
                ArgNode::Projected { projection, ty } => {
                    if *projection != Variance::Invariant {
                        write!(f, "{} ", projection.keyword())?;
                    }
                    write!(f, "{ty}")?;
                }
            }
        }
        f.write_str(">")
    }
}
