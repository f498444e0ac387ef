//! Core `Type` definitions for the host language.

use std::fmt;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimKind {
    pub const ALL: [PrimKind; 9] = [
        PrimKind::Boolean,
        PrimKind::Byte,
        PrimKind::Short,
        PrimKind::Char,
        PrimKind::Int,
        PrimKind::Long,
        PrimKind::Float,
        PrimKind::Double,
        PrimKind::Void,
    ];

    /// Source keyword for this primitive.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimKind::Boolean => "boolean",
            PrimKind::Byte => "byte",
            PrimKind::Short => "short",
            PrimKind::Char => "char",
            PrimKind::Int => "int",
            PrimKind::Long => "long",
            PrimKind::Float => "float",
            PrimKind::Double => "double",
            PrimKind::Void => "void",
        }
    }

    pub fn from_keyword(kw: &str) -> Option<Self> {
        PrimKind::ALL.into_iter().find(|k| k.keyword() == kw)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimKind::Boolean | PrimKind::Void)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimKind::Byte | PrimKind::Short | PrimKind::Char | PrimKind::Int | PrimKind::Long
        )
    }

    /// Fully-qualified name of the wrapper class used for boxing.
    pub fn box_class(self) -> Option<&'static str> {
        Some(match self {
            PrimKind::Boolean => "java.lang.Boolean",
            PrimKind::Byte => "java.lang.Byte",
            PrimKind::Short => "java.lang.Short",
            PrimKind::Char => "java.lang.Character",
            PrimKind::Int => "java.lang.Integer",
            PrimKind::Long => "java.lang.Long",
            PrimKind::Float => "java.lang.Float",
            PrimKind::Double => "java.lang.Double",
            PrimKind::Void => return None,
        })
    }

    /// Inverse of [`PrimKind::box_class`].
    pub fn unboxed(class: &str) -> Option<Self> {
        PrimKind::ALL
            .into_iter()
            .find(|k| k.box_class() == Some(class))
    }

    /// Widening primitive conversion (identity excluded).
    pub fn widens_to(self, to: PrimKind) -> bool {
        use PrimKind::*;
        match self {
            Byte => matches!(to, Short | Int | Long | Float | Double),
            Short | Char => matches!(to, Int | Long | Float | Double),
            Int => matches!(to, Long | Float | Double),
            Long => matches!(to, Float | Double),
            Float => matches!(to, Double),
            Boolean | Double | Void => false,
        }
    }

    /// Result kind of binary numeric promotion.
    pub fn promote(a: PrimKind, b: PrimKind) -> PrimKind {
        use PrimKind::*;
        if a == Double || b == Double {
            Double
        } else if a == Float || b == Float {
            Float
        } else if a == Long || b == Long {
            Long
        } else {
            Int
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Primitive types, `void` included.
    Prim(PrimKind),

    /// Class or interface type; empty `args` is the raw/non-generic form.
    Class { name: String, args: Vec<Type> },

    Array(Box<Type>),

    /// Type variable, either of a generic class or a template inference variable.
    Var(String),

    /// Type of the `null` literal.
    Null,
}

impl Type {
    pub fn prim(kind: PrimKind) -> Self {
        Type::Prim(kind)
    }
    pub fn boolean() -> Self {
        Type::Prim(PrimKind::Boolean)
    }
    pub fn int() -> Self {
        Type::Prim(PrimKind::Int)
    }
    pub fn long() -> Self {
        Type::Prim(PrimKind::Long)
    }
    pub fn double() -> Self {
        Type::Prim(PrimKind::Double)
    }
    pub fn char_() -> Self {
        Type::Prim(PrimKind::Char)
    }
    pub fn void() -> Self {
        Type::Prim(PrimKind::Void)
    }
    pub fn class(name: impl Into<String>) -> Self {
        Type::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }
    pub fn generic(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Class {
            name: name.into(),
            args,
        }
    }
    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }
    pub fn var(name: impl Into<String>) -> Self {
        Type::Var(name.into())
    }
    pub fn object() -> Self {
        Type::class("java.lang.Object")
    }
    pub fn string() -> Self {
        Type::class("java.lang.String")
    }

    pub fn is_reference(&self) -> bool {
        !matches!(self, Type::Prim(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Prim(PrimKind::Boolean))
            || matches!(self, Type::Class { name, .. } if name == "java.lang.Boolean")
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Primitive kind after unboxing, if any.
    pub fn unboxed_kind(&self) -> Option<PrimKind> {
        match self {
            Type::Prim(k) => Some(*k),
            Type::Class { name, .. } => PrimKind::unboxed(name),
            _ => None,
        }
    }

    /// Boxes a primitive; reference types are returned unchanged.
    pub fn boxed(&self) -> Type {
        match self {
            Type::Prim(k) => match k.box_class() {
                Some(name) => Type::class(name),
                None => self.clone(),
            },
            other => other.clone(),
        }
    }

    pub fn mentions_var(&self) -> bool {
        match self {
            Type::Var(_) => true,
            Type::Class { args, .. } => args.iter().any(Type::mentions_var),
            Type::Array(elem) => elem.mentions_var(),
            Type::Prim(_) | Type::Null => false,
        }
    }

    /// Replaces type variables named in `params` by the matching `args`.
    /// A raw instantiation (no args) erases them to `Object`.
    pub fn subst(&self, params: &[String], args: &[Type]) -> Type {
        match self {
            Type::Var(v) => match params.iter().position(|p| p == v) {
                Some(i) => args.get(i).cloned().unwrap_or_else(Type::object),
                None => self.clone(),
            },
            Type::Class { name, args: inner } => Type::Class {
                name: name.clone(),
                args: inner.iter().map(|a| a.subst(params, args)).collect(),
            },
            Type::Array(elem) => Type::array(elem.subst(params, args)),
            Type::Prim(_) | Type::Null => self.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Prim(k) => write!(f, "{}", k.keyword()),
            Type::Class { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Var(v) => write!(f, "{}", v),
            Type::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_follows_primitive_lattice() {
        assert!(PrimKind::Int.widens_to(PrimKind::Long));
        assert!(PrimKind::Char.widens_to(PrimKind::Int));
        assert!(!PrimKind::Char.widens_to(PrimKind::Short));
        assert!(!PrimKind::Long.widens_to(PrimKind::Int));
        assert!(!PrimKind::Boolean.widens_to(PrimKind::Int));
    }

    #[test]
    fn boxing_round_trips_through_wrapper_names() {
        for kind in PrimKind::ALL {
            if let Some(class) = kind.box_class() {
                assert_eq!(PrimKind::unboxed(class), Some(kind));
            }
        }
        assert_eq!(Type::int().boxed(), Type::class("java.lang.Integer"));
    }

    #[test]
    fn raw_substitution_erases_to_object() {
        let elem = Type::var("E");
        assert_eq!(elem.subst(&["E".into()], &[]), Type::object());
        assert_eq!(
            Type::generic("java.util.List", vec![elem]).subst(&["E".into()], &[Type::string()]),
            Type::generic("java.util.List", vec![Type::string()])
        );
    }

    #[test]
    fn display_is_source_like() {
        let t = Type::generic("java.util.Map", vec![Type::string(), Type::array(Type::int())]);
        assert_eq!(t.to_string(), "java.util.Map<java.lang.String, int[]>");
    }
}
