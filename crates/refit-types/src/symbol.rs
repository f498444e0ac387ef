//! Class, member and name symbols as seen by attribution and the rewriter.

use crate::types::Type;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
    pub is_static: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSig {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

/// A class known to the class path.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSymbol {
    pub qualified_name: String,
    /// Qualified name of the top-level class enclosing this one (itself when top-level).
    pub outermost: String,
    pub kind: ClassKind,
    pub type_params: Vec<String>,
    pub superclass: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldSig>,
    pub methods: Vec<MethodSig>,
}

impl ClassSymbol {
    /// Creates a top-level or nested class. The top-level class is the
    /// prefix of `qualified_name` up to the first capitalized component.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let outermost = top_level_of(&qualified_name);
        Self {
            qualified_name,
            outermost,
            kind: ClassKind::Class,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn interface(mut self) -> Self {
        self.kind = ClassKind::Interface;
        self
    }

    pub fn type_params(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn extends(mut self, sup: Type) -> Self {
        self.superclass = Some(sup);
        self
    }

    pub fn implements(mut self, iface: Type) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn method(mut self, name: &str, params: Vec<Type>, ret: Type) -> Self {
        self.methods.push(MethodSig {
            name: name.to_string(),
            params,
            ret,
            is_static: false,
        });
        self
    }

    pub fn static_method(mut self, name: &str, params: Vec<Type>, ret: Type) -> Self {
        self.methods.push(MethodSig {
            name: name.to_string(),
            params,
            ret,
            is_static: true,
        });
        self
    }

    pub fn field(mut self, name: &str, ty: Type) -> Self {
        self.fields.push(FieldSig {
            name: name.to_string(),
            ty,
            is_static: false,
        });
        self
    }

    pub fn static_field(mut self, name: &str, ty: Type) -> Self {
        self.fields.push(FieldSig {
            name: name.to_string(),
            ty,
            is_static: true,
        });
        self
    }

    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Package of the top-level class; empty for the unnamed package.
    pub fn package(&self) -> &str {
        match self.outermost.rfind('.') {
            Some(i) => &self.outermost[..i],
            None => "",
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.outermost == self.qualified_name
    }

    /// The type this class declares, instantiated with its own type variables.
    pub fn declared_type(&self) -> Type {
        Type::generic(
            self.qualified_name.clone(),
            self.type_params.iter().map(Type::var).collect(),
        )
    }
}

/// Splits a qualified name at its first capitalized component.
pub fn top_level_of(qualified_name: &str) -> String {
    let mut path = Vec::new();
    for component in qualified_name.split('.') {
        path.push(component);
        if component.chars().next().is_some_and(char::is_uppercase) {
            break;
        }
    }
    path.join(".")
}

/// What a name in the target tree resolved to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Local { name: String, ty: Type },
    Field {
        owner: String,
        name: String,
        ty: Type,
        is_static: bool,
    },
    Method {
        owner: String,
        name: String,
        is_static: bool,
    },
    Class(String),
    Package(String),
}

impl Symbol {
    /// Qualified name for class symbols, `owner.name` for members.
    pub fn qualified_name(&self) -> String {
        match self {
            Symbol::Local { name, .. } => name.clone(),
            Symbol::Field { owner, name, .. } | Symbol::Method { owner, name, .. } => {
                format!("{owner}.{name}")
            }
            Symbol::Class(name) | Symbol::Package(name) => name.clone(),
        }
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            Symbol::Class(name) => Some(name),
            _ => None,
        }
    }
}
