//! Class identifiers, semantic types and type trees of templates.

use refit_ast::ast::{Expr, ExprKind, TypeExpr, TypeExprKind};
use refit_types::{top_level_of, PrimKind, Symbol, Type};
use serde::{Deserialize, Serialize};

use crate::inliner::{CouldNotResolveImport, Inlineable, Inliner};
use crate::unifier::{require, unify_list, Mismatch, Unifiable, Unifier, Unify};

/// A reference to a class by qualified name; matches semantically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UClassIdent {
    top_level: String,
    name: String,
}

impl UClassIdent {
    pub fn create(qualified_name: &str) -> Self {
        Self {
            top_level: top_level_of(qualified_name),
            name: qualified_name.to_string(),
        }
    }

    pub fn qualified_name(&self) -> &str {
        &self.name
    }

    pub fn top_level(&self) -> &str {
        &self.top_level
    }

    fn inline_path(&self, inliner: &mut Inliner<'_>) -> Result<Vec<String>, CouldNotResolveImport> {
        inliner.class_reference(&self.top_level, &self.name)
    }

    pub fn inline_type(&self, inliner: &mut Inliner<'_>) -> Result<TypeExpr, CouldNotResolveImport> {
        Ok(TypeExpr::new(TypeExprKind::Named {
            path: self.inline_path(inliner)?,
            args: Vec::new(),
            class: Some(self.name.clone()),
        }))
    }
}

impl From<String> for UClassIdent {
    fn from(name: String) -> Self {
        UClassIdent::create(&name)
    }
}

impl From<UClassIdent> for String {
    fn from(ident: UClassIdent) -> Self {
        ident.name
    }
}

impl Unifiable<Expr> for UClassIdent {
    fn unify<'a>(&self, target: &'a Expr, unifier: Unifier<'a>) -> Unify<'a> {
        let is_class = matches!(
            &target.kind,
            ExprKind::Ident { sym: Some(Symbol::Class(name)), .. }
                | ExprKind::Field { sym: Some(Symbol::Class(name)), .. }
                if *name == self.name
        );
        require(is_class, unifier)
    }
}

impl Inlineable for UClassIdent {
    type Output = Expr;

    fn inline(&self, inliner: &mut Inliner<'_>) -> Result<Expr, CouldNotResolveImport> {
        let mut path = self.inline_path(inliner)?.into_iter();
        let first = path.next().unwrap_or_default();
        let mut expr = Expr::ident(first);
        for segment in path {
            expr = Expr::field(expr, segment);
        }
        if let ExprKind::Ident { sym, .. } | ExprKind::Field { sym, .. } = &mut expr.kind {
            *sym = Some(Symbol::Class(self.name.clone()));
        }
        expr.ty = Some(Type::class(self.name.clone()));
        Ok(expr)
    }
}

// ======= semantic types =======

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UClassType {
    pub name: String,
    #[serde(default)]
    pub args: Vec<UType>,
}

impl UClassType {
    /// Same class, then the type arguments position by position. A raw
    /// pattern only matches a raw type.
    pub fn unify<'a>(&self, target: &Type, unifier: Unifier<'a>) -> Unify<'a> {
        let Type::Class { name, args } = target else {
            return Err(Mismatch);
        };
        if *name != self.name {
            return Err(Mismatch);
        }
        if self.args.len() != args.len() {
            return Err(Mismatch);
        }
        let mut unifier = unifier;
        for (pattern, actual) in self.args.iter().zip(args) {
            unifier = pattern.unify(actual, unifier)?;
        }
        Ok(unifier)
    }
}

impl Inlineable for UClassType {
    type Output = Type;

    fn inline(&self, inliner: &mut Inliner<'_>) -> Result<Type, CouldNotResolveImport> {
        let class = inliner.resolve(&self.name)?;
        let args = self
            .args
            .iter()
            .map(|a| a.inline(inliner))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Type::generic(class.qualified_name.clone(), args))
    }
}

/// Types declared for placeholders and template results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UType {
    Primitive {
        prim: PrimKind,
    },
    Class(UClassType),
    /// A template type variable, optionally bounded above.
    TypeVar {
        name: String,
        #[serde(default)]
        bound: Option<Box<UType>>,
    },
    Array {
        elem: Box<UType>,
    },
}

impl UType {
    pub fn prim(prim: PrimKind) -> Self {
        UType::Primitive { prim }
    }

    pub fn boolean() -> Self {
        UType::prim(PrimKind::Boolean)
    }

    pub fn class(name: &str) -> Self {
        UType::Class(UClassType {
            name: name.to_string(),
            args: Vec::new(),
        })
    }

    pub fn generic(name: &str, args: Vec<UType>) -> Self {
        UType::Class(UClassType {
            name: name.to_string(),
            args,
        })
    }

    pub fn var(name: &str) -> Self {
        UType::TypeVar {
            name: name.to_string(),
            bound: None,
        }
    }

    pub fn array(elem: UType) -> Self {
        UType::Array {
            elem: Box::new(elem),
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            UType::Primitive {
                prim: PrimKind::Boolean
            }
        )
    }

    /// The first type variable here, bounds included, not named in `declared`.
    pub fn undeclared_type_var(&self, declared: &[String]) -> Option<&str> {
        match self {
            UType::TypeVar { name, bound } => {
                if !declared.contains(name) {
                    return Some(name);
                }
                bound.as_deref()?.undeclared_type_var(declared)
            }
            UType::Class(class) => class
                .args
                .iter()
                .find_map(|arg| arg.undeclared_type_var(declared)),
            UType::Array { elem } => elem.undeclared_type_var(declared),
            UType::Primitive { .. } => None,
        }
    }

    pub fn mentions_type_var(&self) -> bool {
        match self {
            UType::TypeVar { .. } => true,
            UType::Class(class) => class.args.iter().any(UType::mentions_type_var),
            UType::Array { elem } => elem.mentions_type_var(),
            UType::Primitive { .. } => false,
        }
    }

    /// Matches `target` exactly, binding type variables on the way.
    pub fn unify<'a>(&self, target: &Type, unifier: Unifier<'a>) -> Unify<'a> {
        match self {
            UType::Primitive { prim } => require(*target == Type::Prim(*prim), unifier),
            UType::Class(class) => class.unify(target, unifier),
            UType::TypeVar { name, bound } => {
                if let Some(bound) = bound.as_deref().and_then(UType::erasure) {
                    let cp = unifier.ctx().classpath();
                    if !cp.is_method_convertible(target, &bound) {
                        return Err(Mismatch);
                    }
                }
                unifier.bind_type(name, target)
            }
            UType::Array { elem } => match target {
                Type::Array(actual) => elem.unify(actual, unifier),
                _ => Err(Mismatch),
            },
        }
    }

    /// The type without variables, when it has none.
    fn erasure(&self) -> Option<Type> {
        match self {
            UType::Primitive { prim } => Some(Type::Prim(*prim)),
            UType::Class(class) if !self.mentions_type_var() => Some(Type::class(class.name.clone())),
            UType::Array { elem } => elem.erasure().map(Type::array),
            _ => None,
        }
    }
}

impl Inlineable for UType {
    type Output = Type;

    fn inline(&self, inliner: &mut Inliner<'_>) -> Result<Type, CouldNotResolveImport> {
        Ok(match self {
            UType::Primitive { prim } => Type::Prim(*prim),
            UType::Class(class) => class.inline(inliner)?,
            UType::TypeVar { name, .. } => inliner
                .type_binding(name)
                .cloned()
                .unwrap_or_else(|| Type::var(name.clone())),
            UType::Array { elem } => Type::array(elem.inline(inliner)?),
        })
    }
}

// ======= type trees =======

/// A type as written inside a template expression or declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UTypeTree {
    Class { class: UClassIdent },
    Primitive { prim: PrimKind },
    Parameterized { class: UClassIdent, args: Vec<UTypeTree> },
    Array { elem: Box<UTypeTree> },
}

impl UTypeTree {
    pub fn class(name: &str) -> Self {
        UTypeTree::Class {
            class: UClassIdent::create(name),
        }
    }
}

impl Unifiable<TypeExpr> for UTypeTree {
    fn unify<'a>(&self, target: &'a TypeExpr, unifier: Unifier<'a>) -> Unify<'a> {
        match (self, &target.kind) {
            (UTypeTree::Primitive { prim }, TypeExprKind::Primitive(kind)) => {
                require(prim == kind, unifier)
            }
            (
                UTypeTree::Class { class },
                TypeExprKind::Named {
                    args,
                    class: Some(name),
                    ..
                },
            ) => require(args.is_empty() && name == class.qualified_name(), unifier),
            (
                UTypeTree::Parameterized { class, args },
                TypeExprKind::Named {
                    args: target_args,
                    class: Some(name),
                    ..
                },
            ) => {
                let unifier = require(name == class.qualified_name(), unifier)?;
                unify_list(args, target_args, unifier)
            }
            (UTypeTree::Array { elem }, TypeExprKind::Array(target_elem)) => {
                elem.unify(&**target_elem, unifier)
            }
            _ => Err(Mismatch),
        }
    }
}

impl Inlineable for UTypeTree {
    type Output = TypeExpr;

    fn inline(&self, inliner: &mut Inliner<'_>) -> Result<TypeExpr, CouldNotResolveImport> {
        Ok(match self {
            UTypeTree::Class { class } => class.inline_type(inliner)?,
            UTypeTree::Primitive { prim } => TypeExpr::primitive(*prim),
            UTypeTree::Parameterized { class, args } => {
                let mut ty = class.inline_type(inliner)?;
                let inlined = args
                    .iter()
                    .map(|a| a.inline(inliner))
                    .collect::<Result<Vec<_>, _>>()?;
                if let TypeExprKind::Named { args, .. } = &mut ty.kind {
                    *args = inlined;
                }
                ty
            }
            UTypeTree::Array { elem } => TypeExpr::array(elem.inline(inliner)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HostContext;
    use refit_ast::ast::CompilationUnit;
    use refit_ast::span::Span;
    use refit_types::ClassPath;

    fn unifies(pattern: &UType, target: &Type) -> bool {
        let unit = CompilationUnit {
            package: None,
            imports: vec![],
            classes: vec![],
            span: Span::DUMMY,
        };
        let cp = ClassPath::with_builtins();
        let ctx = HostContext::new("", &unit, &cp);
        pattern.unify(target, Unifier::new(&ctx)).is_ok()
    }

    #[test]
    fn raw_class_patterns_match_only_raw_types() {
        let list = UType::class("java.util.List");
        assert!(unifies(&list, &Type::class("java.util.List")));
        assert!(!unifies(
            &list,
            &Type::generic("java.util.List", vec![Type::string()])
        ));

        let map = UType::generic(
            "java.util.Map",
            vec![UType::var("K"), UType::class("java.util.List")],
        );
        let integers = Type::generic("java.util.List", vec![Type::class("java.lang.Integer")]);
        assert!(!unifies(
            &map,
            &Type::generic("java.util.Map", vec![Type::string(), integers])
        ));
        assert!(unifies(
            &map,
            &Type::generic(
                "java.util.Map",
                vec![Type::string(), Type::class("java.util.List")]
            )
        ));
    }

    #[test]
    fn class_ident_splits_top_level() {
        let entry = UClassIdent::create("java.util.Map.Entry");
        assert_eq!(entry.top_level(), "java.util.Map");
        assert_eq!(entry.qualified_name(), "java.util.Map.Entry");
    }

    #[test]
    fn utypes_deserialize_from_tagged_json() {
        let ty: UType = serde_json::from_str(
            r#"{"kind":"class","name":"java.util.List","args":[{"kind":"type_var","name":"T"}]}"#,
        )
        .unwrap();
        assert_eq!(ty, UType::generic("java.util.List", vec![UType::var("T")]));
        assert!(ty.mentions_type_var());

        let tree: UTypeTree =
            serde_json::from_str(r#"{"kind":"class","class":"java.lang.String"}"#).unwrap();
        assert_eq!(tree, UTypeTree::class("java.lang.String"));
    }
}
