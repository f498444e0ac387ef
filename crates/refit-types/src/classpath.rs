//! The set of classes visible to a compilation, and the queries the
//! attribution pass and the rewriter make against it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::symbol::{ClassSymbol, FieldSig, MethodSig};
use crate::types::{PrimKind, Type};

/// Errors from class path lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassPathError {
    /// No class with this qualified name is known.
    NotFound(String),
}

impl fmt::Display for ClassPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassPathError::NotFound(name) => write!(f, "class not found: {}", name),
        }
    }
}

impl std::error::Error for ClassPathError {}

#[derive(Debug, Clone)]
pub struct ClassPath {
    classes: HashMap<String, ClassSymbol>,
}

impl Default for ClassPath {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ClassPath {
    /// A class path with no classes at all.
    pub fn empty() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// A class path preloaded with the `java.lang` / `java.util` subset.
    pub fn with_builtins() -> Self {
        let mut cp = Self::empty();
        for class in crate::builtins::classes() {
            cp.register(class);
        }
        cp
    }

    pub fn register(&mut self, class: ClassSymbol) {
        self.classes.insert(class.qualified_name.clone(), class);
    }

    pub fn get(&self, qualified_name: &str) -> Option<&ClassSymbol> {
        self.classes.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.classes.contains_key(qualified_name)
    }

    pub fn resolve(&self, qualified_name: &str) -> Result<&ClassSymbol, ClassPathError> {
        self.get(qualified_name)
            .ok_or_else(|| ClassPathError::NotFound(qualified_name.to_string()))
    }

    /// Top-level class `simple` declared in `package`.
    pub fn lookup_in_package(&self, package: &str, simple: &str) -> Option<&ClassSymbol> {
        let name = if package.is_empty() {
            simple.to_string()
        } else {
            format!("{package}.{simple}")
        };
        self.get(&name).filter(|c| c.is_top_level())
    }

    /// Whether some known class lives in, or below, `package`.
    pub fn has_package(&self, package: &str) -> bool {
        let prefix = format!("{package}.");
        self.classes.keys().any(|name| name.starts_with(&prefix))
    }

    /// Direct supertypes of `ty`, instantiated with its type arguments.
    pub fn direct_supertypes(&self, ty: &Type) -> Vec<Type> {
        let Type::Class { name, args } = ty else {
            return Vec::new();
        };
        let Some(class) = self.get(name) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if let Some(sup) = &class.superclass {
            out.push(sup.subst(&class.type_params, args));
        }
        for iface in &class.interfaces {
            out.push(iface.subst(&class.type_params, args));
        }
        out
    }

    /// Whether following `extends` from class `name` leads back to it.
    pub fn has_inheritance_cycle(&self, name: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.get(name);
        while let Some(class) = current {
            if !seen.insert(class.qualified_name.as_str()) {
                return false;
            }
            let Some(next) = class.superclass.as_ref().and_then(Type::class_name) else {
                return false;
            };
            if next == name {
                return true;
            }
            current = self.get(next);
        }
        false
    }

    /// The instantiation of class `target` among the supertypes of `ty`.
    pub fn as_super(&self, ty: &Type, target: &str) -> Option<Type> {
        self.as_super_in(ty, target, &mut HashSet::new())
    }

    fn as_super_in(&self, ty: &Type, target: &str, seen: &mut HashSet<String>) -> Option<Type> {
        if ty.class_name() == Some(target) {
            return Some(ty.clone());
        }
        if !visit(ty, seen) {
            return None;
        }
        self.direct_supertypes(ty)
            .iter()
            .find_map(|sup| self.as_super_in(sup, target, seen))
    }

    /// Field `name` of `owner` or one of its supertypes.
    pub fn find_field(&self, owner: &Type, name: &str) -> Option<(String, FieldSig)> {
        self.find_field_in(owner, name, &mut HashSet::new())
    }

    fn find_field_in(
        &self,
        owner: &Type,
        name: &str,
        seen: &mut HashSet<String>,
    ) -> Option<(String, FieldSig)> {
        let Type::Class {
            name: class_name,
            args,
        } = owner
        else {
            return None;
        };
        if !visit(owner, seen) {
            return None;
        }
        let class = self.get(class_name)?;
        if let Some(field) = class.fields.iter().find(|f| f.name == name) {
            let mut field = field.clone();
            field.ty = field.ty.subst(&class.type_params, args);
            return Some((class.qualified_name.clone(), field));
        }
        self.direct_supertypes(owner)
            .iter()
            .find_map(|sup| self.find_field_in(sup, name, seen))
    }

    /// First method of `owner` (searching supertypes) named `name` whose
    /// parameters accept `arg_types`. Overloads are tried in declaration order.
    pub fn find_method(
        &self,
        owner: &Type,
        name: &str,
        arg_types: &[Type],
    ) -> Option<(String, MethodSig)> {
        self.find_method_in(owner, name, arg_types, &mut HashSet::new())
    }

    fn find_method_in(
        &self,
        owner: &Type,
        name: &str,
        arg_types: &[Type],
        seen: &mut HashSet<String>,
    ) -> Option<(String, MethodSig)> {
        let object = Type::object();
        let owner = match owner {
            Type::Class { .. } => owner,
            // Interfaces, arrays and variables still inherit from Object.
            _ => &object,
        };
        let Type::Class {
            name: class_name,
            args,
        } = owner
        else {
            return None;
        };
        if !visit(owner, seen) {
            return None;
        }
        let class = self.get(class_name)?;
        for method in class.methods.iter().filter(|m| m.name == name) {
            let params: Vec<Type> = method
                .params
                .iter()
                .map(|p| p.subst(&class.type_params, args))
                .collect();
            if self.is_applicable(&params, arg_types) {
                let mut method = method.clone();
                method.ret = method.ret.subst(&class.type_params, args);
                method.params = params;
                return Some((class.qualified_name.clone(), method));
            }
        }
        let mut supers = self.direct_supertypes(owner);
        if supers.is_empty() && class_name != "java.lang.Object" {
            supers.push(Type::object());
        }
        supers
            .iter()
            .find_map(|sup| self.find_method_in(sup, name, arg_types, seen))
    }

    /// Subtyping with invariant type arguments; raw types on either side
    /// are compatible with any instantiation.
    pub fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        if sub == sup {
            return true;
        }
        match (sub, sup) {
            (Type::Null, t) => t.is_reference(),
            (Type::Prim(_), _) | (_, Type::Prim(_)) => false,
            (_, Type::Var(_)) => true,
            (_, Type::Class { name, .. }) if name == "java.lang.Object" => true,
            (Type::Var(_), _) => false,
            (Type::Array(a), Type::Array(b)) => {
                if a.is_reference() && b.is_reference() {
                    self.is_subtype(a, b)
                } else {
                    a == b
                }
            }
            (Type::Array(_), Type::Class { name, .. }) => {
                name == "java.lang.Cloneable" || name == "java.io.Serializable"
            }
            (Type::Class { .. }, Type::Class { name, args }) => {
                match self.as_super(sub, name) {
                    Some(Type::Class {
                        args: found_args, ..
                    }) => args.is_empty() || found_args.is_empty() || found_args == *args,
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Method invocation conversion of an argument of type `actual` to a
    /// parameter of type `expected`: identity, widening primitive, widening
    /// reference, boxing then widening reference, unboxing then widening
    /// primitive.
    pub fn is_method_convertible(&self, actual: &Type, expected: &Type) -> bool {
        match (actual, expected) {
            (Type::Prim(PrimKind::Void), _) | (_, Type::Prim(PrimKind::Void)) => false,
            (Type::Prim(a), Type::Prim(e)) => a == e || a.widens_to(*e),
            (Type::Prim(_), _) => self.is_subtype(&actual.boxed(), expected),
            (_, Type::Prim(e)) => match actual.unboxed_kind() {
                Some(a) => a == *e || a.widens_to(*e),
                None => false,
            },
            _ => self.is_subtype(actual, expected),
        }
    }

    /// Pairwise applicability of `actual` argument types to `expected`
    /// parameter types.
    pub fn is_applicable(&self, expected: &[Type], actual: &[Type]) -> bool {
        expected.len() == actual.len()
            && expected
                .iter()
                .zip(actual)
                .all(|(e, a)| self.is_method_convertible(a, e))
    }
}

/// Marks the class of `ty` visited; false when it already was.
fn visit(ty: &Type, seen: &mut HashSet<String>) -> bool {
    match ty.class_name() {
        Some(name) => seen.insert(name.to_string()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(t: Type) -> Type {
        Type::generic("java.util.List", vec![t])
    }

    #[test]
    fn resolve_reports_missing_class() {
        let cp = ClassPath::with_builtins();
        assert!(cp.resolve("java.lang.String").is_ok());
        assert_eq!(
            cp.resolve("com.example.Missing").unwrap_err(),
            ClassPathError::NotFound("com.example.Missing".into())
        );
    }

    #[test]
    fn cyclic_superclasses_terminate() {
        let mut cp = ClassPath::with_builtins();
        cp.register(ClassSymbol::new("A").extends(Type::class("B")));
        cp.register(ClassSymbol::new("B").extends(Type::class("A")));
        cp.register(ClassSymbol::new("C").extends(Type::class("A")));
        assert!(cp.has_inheritance_cycle("A"));
        assert!(!cp.has_inheritance_cycle("C"));
        assert!(!cp.has_inheritance_cycle("java.util.ArrayList"));

        let a = Type::class("A");
        assert_eq!(cp.as_super(&a, "java.lang.String"), None);
        assert!(cp.find_field(&a, "missing").is_none());
        assert!(cp.find_method(&a, "q", &[]).is_none());
        assert!(!cp.is_subtype(&a, &Type::string()));
    }

    #[test]
    fn subtyping_walks_generic_supertypes() {
        let cp = ClassPath::with_builtins();
        let array_list = Type::generic("java.util.ArrayList", vec![Type::string()]);
        assert!(cp.is_subtype(&array_list, &list_of(Type::string())));
        assert!(cp.is_subtype(
            &array_list,
            &Type::generic("java.util.Collection", vec![Type::string()])
        ));
        assert!(!cp.is_subtype(&array_list, &list_of(Type::object())));
        assert!(cp.is_subtype(&array_list, &Type::class("java.util.List")));
        assert!(cp.is_subtype(&Type::string(), &Type::class("java.lang.CharSequence")));
    }

    #[test]
    fn method_conversion_allows_boxing_and_widening() {
        let cp = ClassPath::with_builtins();
        assert!(cp.is_method_convertible(&Type::int(), &Type::long()));
        assert!(cp.is_method_convertible(&Type::int(), &Type::object()));
        assert!(cp.is_method_convertible(&Type::int(), &Type::class("java.lang.Number")));
        assert!(cp.is_method_convertible(&Type::class("java.lang.Integer"), &Type::long()));
        assert!(cp.is_method_convertible(&Type::Null, &Type::string()));
        assert!(!cp.is_method_convertible(&Type::Null, &Type::int()));
        assert!(!cp.is_method_convertible(&Type::long(), &Type::int()));
        assert!(!cp.is_method_convertible(&Type::string(), &Type::boolean()));
        assert!(!cp.is_method_convertible(&Type::int(), &Type::class("java.lang.Long")));
    }

    #[test]
    fn applicability_requires_matching_arity() {
        let cp = ClassPath::with_builtins();
        assert!(cp.is_applicable(&[Type::boolean()], &[Type::boolean()]));
        assert!(!cp.is_applicable(&[Type::boolean()], &[]));
        assert!(!cp.is_applicable(&[Type::boolean()], &[Type::int()]));
    }

    #[test]
    fn find_method_substitutes_receiver_arguments() {
        let cp = ClassPath::with_builtins();
        let (owner, get) = cp
            .find_method(&list_of(Type::string()), "get", &[Type::int()])
            .unwrap();
        assert_eq!(owner, "java.util.List");
        assert_eq!(get.ret, Type::string());

        let (owner, equals) = cp
            .find_method(&Type::string(), "equals", &[Type::string()])
            .unwrap();
        assert_eq!(owner, "java.lang.Object");
        assert_eq!(equals.ret, Type::boolean());
    }

    #[test]
    fn overloads_pick_first_applicable() {
        let cp = ClassPath::with_builtins();
        let math = Type::class("java.lang.Math");
        let (_, abs) = cp.find_method(&math, "abs", &[Type::long()]).unwrap();
        assert_eq!(abs.ret, Type::long());
        let (_, abs) = cp.find_method(&math, "abs", &[Type::int()]).unwrap();
        assert_eq!(abs.ret, Type::int());
    }
}
