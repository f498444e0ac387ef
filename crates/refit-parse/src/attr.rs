//! Attribution: resolves names to symbols and gives every expression a type.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use refit_ast::ast::{
    BinOp, Block, ClassDecl, CompilationUnit, Expr, ExprKind, Lit, Member, Stmt, TypeExpr,
    TypeExprKind, UnOp,
};
use refit_ast::scope::ImportScope;
use refit_types::{ClassPath, ClassSymbol, PrimKind, Symbol, Type};

/// Registers the unit's classes on `classpath`, then attributes every
/// member body.
pub fn attribute(unit: &mut CompilationUnit, classpath: &mut ClassPath) -> Result<()> {
    let names = ImportScope::of(unit);

    let mut declared = Vec::new();
    for class in &mut unit.classes {
        declared.push(declare_class(class, &names, classpath)?);
    }
    let declared_names: Vec<String> = declared.iter().map(|c| c.qualified_name.clone()).collect();
    for class in declared {
        classpath.register(class);
    }
    if let Some(name) = declared_names
        .iter()
        .find(|name| classpath.has_inheritance_cycle(name))
    {
        bail!("cyclic inheritance involving `{}`", name);
    }

    let classpath: &ClassPath = classpath;
    for class in &mut unit.classes {
        let this_class = names.qualify(&class.name.text);
        for member in &mut class.members {
            let mut attr = Attr {
                cp: classpath,
                names: &names,
                this_type: Type::class(this_class.clone()),
                scopes: vec![HashMap::new()],
            };
            match member {
                Member::Field(field) => {
                    if let Some(init) = &mut field.init {
                        attr.expr(init)?;
                    }
                }
                Member::Method(method) => {
                    for param in &mut method.params {
                        let ty = resolve_type(&names, classpath, &mut param.ty)?;
                        attr.declare(&param.name.text, ty);
                    }
                    attr.block(&mut method.body)?;
                }
            }
        }
    }
    Ok(())
}

/// Resolves a written type and records the class on the tree.
fn resolve_type(names: &ImportScope, cp: &ClassPath, te: &mut TypeExpr) -> Result<Type> {
    match &mut te.kind {
        TypeExprKind::Primitive(kind) => Ok(Type::Prim(*kind)),
        TypeExprKind::Named { path, args, class } => {
            let qn = names
                .resolve_path(cp, path)
                .ok_or_else(|| anyhow!("cannot resolve type `{}`", path.join(".")))?;
            *class = Some(qn.clone());
            let args = args
                .iter_mut()
                .map(|a| resolve_type(names, cp, a))
                .collect::<Result<Vec<_>>>()?;
            Ok(Type::generic(qn, args))
        }
        TypeExprKind::Array(elem) => Ok(Type::array(resolve_type(names, cp, elem)?)),
    }
}

fn declare_class(class: &mut ClassDecl, names: &ImportScope, cp: &ClassPath) -> Result<ClassSymbol> {
    let mut sym = ClassSymbol::new(names.qualify(&class.name.text));
    if let Some(sup) = &mut class.superclass {
        sym = sym.extends(resolve_type(names, cp, sup)?);
    }
    for member in &mut class.members {
        match member {
            Member::Field(field) => {
                let ty = resolve_type(names, cp, &mut field.ty)?;
                sym = if field.is_static {
                    sym.static_field(&field.name.text, ty)
                } else {
                    sym.field(&field.name.text, ty)
                };
            }
            Member::Method(method) => {
                let ret = resolve_type(names, cp, &mut method.ret_ty)?;
                let params = method
                    .params
                    .iter_mut()
                    .map(|p| resolve_type(names, cp, &mut p.ty))
                    .collect::<Result<Vec<_>>>()?;
                sym = if method.is_static {
                    sym.static_method(&method.name.text, params, ret)
                } else {
                    sym.method(&method.name.text, params, ret)
                };
            }
        }
    }
    Ok(sym)
}

// ======= bodies =======

/// What a (possibly qualified) name denotes.
enum Named {
    Value(Type),
    Class(String),
    Package(String),
}

struct Attr<'a> {
    cp: &'a ClassPath,
    names: &'a ImportScope,
    this_type: Type,
    scopes: Vec<HashMap<String, Type>>,
}

impl<'a> Attr<'a> {
    fn declare(&mut self, name: &str, ty: Type) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    fn local(&self, name: &str) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.push(HashMap::new());
        let out = f(self);
        self.scopes.pop();
        out
    }

    fn block(&mut self, block: &mut Block) -> Result<()> {
        self.scoped(|this| {
            for stmt in &mut block.stmts {
                this.stmt(stmt)?;
            }
            Ok(())
        })
    }

    fn stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            Stmt::Local { ty, name, init, .. } => {
                let ty = resolve_type(self.names, self.cp, ty)?;
                if let Some(init) = init {
                    self.expr(init)?;
                }
                self.declare(&name.text, ty);
            }
            Stmt::Expr { expr, .. } => {
                self.expr(expr)?;
            }
            Stmt::If {
                cond, then_, else_, ..
            } => {
                self.expr(cond)?;
                self.scoped(|this| this.stmt(then_))?;
                if let Some(else_) = else_ {
                    self.scoped(|this| this.stmt(else_))?;
                }
            }
            Stmt::While { cond, body, .. } => {
                self.expr(cond)?;
                self.scoped(|this| this.stmt(body))?;
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.expr(value)?;
                }
            }
            Stmt::Block(block) => self.block(block)?,
        }
        Ok(())
    }

    /// Resolves an identifier or field-access chain.
    fn name(&mut self, e: &mut Expr) -> Result<Named> {
        if !matches!(e.kind, ExprKind::Ident { .. } | ExprKind::Field { .. }) {
            return Ok(Named::Value(self.expr(e)?));
        }
        let (named, sym) = match &mut e.kind {
            ExprKind::Ident { name, .. } => {
                if let Some(ty) = self.local(name) {
                    let ty = ty.clone();
                    let sym = Symbol::Local {
                        name: name.clone(),
                        ty: ty.clone(),
                    };
                    (Named::Value(ty), sym)
                } else if let Some((owner, field)) = self.cp.find_field(&self.this_type, name) {
                    let sym = Symbol::Field {
                        owner,
                        name: name.clone(),
                        ty: field.ty.clone(),
                        is_static: field.is_static,
                    };
                    (Named::Value(field.ty), sym)
                } else if let Some(qn) = self.names.resolve_simple(self.cp, name) {
                    (Named::Class(qn.clone()), Symbol::Class(qn))
                } else if self.cp.has_package(name) {
                    (Named::Package(name.clone()), Symbol::Package(name.clone()))
                } else {
                    bail!("cannot find symbol `{}`", name)
                }
            }
            ExprKind::Field { target, name, .. } => {
                let outer = match target.kind {
                    ExprKind::Ident { .. } | ExprKind::Field { .. } => self.name(target)?,
                    _ => Named::Value(self.expr(target)?),
                };
                match outer {
                    Named::Package(pkg) => {
                        let qn = format!("{pkg}.{name}");
                        if self.cp.contains(&qn) {
                            (Named::Class(qn.clone()), Symbol::Class(qn))
                        } else if self.cp.has_package(&qn) {
                            (Named::Package(qn.clone()), Symbol::Package(qn))
                        } else {
                            bail!("cannot find symbol `{}`", qn)
                        }
                    }
                    Named::Class(class) => {
                        let nested = format!("{class}.{name}");
                        if let Some((owner, field)) =
                            self.cp.find_field(&Type::class(class.clone()), name)
                        {
                            let sym = Symbol::Field {
                                owner,
                                name: name.clone(),
                                ty: field.ty.clone(),
                                is_static: field.is_static,
                            };
                            (Named::Value(field.ty), sym)
                        } else if self.cp.contains(&nested) {
                            (Named::Class(nested.clone()), Symbol::Class(nested))
                        } else {
                            bail!("cannot find symbol `{}` in `{}`", name, class)
                        }
                    }
                    Named::Value(Type::Array(_)) if name == "length" => {
                        let sym = Symbol::Field {
                            owner: "array".into(),
                            name: name.clone(),
                            ty: Type::int(),
                            is_static: false,
                        };
                        (Named::Value(Type::int()), sym)
                    }
                    Named::Value(ty) => match self.cp.find_field(&ty, name) {
                        Some((owner, field)) => {
                            let sym = Symbol::Field {
                                owner,
                                name: name.clone(),
                                ty: field.ty.clone(),
                                is_static: field.is_static,
                            };
                            (Named::Value(field.ty), sym)
                        }
                        None => bail!("cannot find field `{}` in `{}`", name, ty),
                    },
                }
            }
            _ => bail!("expected a name"),
        };

        if let ExprKind::Ident { sym: slot, .. } | ExprKind::Field { sym: slot, .. } = &mut e.kind
        {
            *slot = Some(sym);
        }
        e.ty = match &named {
            Named::Value(ty) => Some(ty.clone()),
            Named::Class(qn) => Some(Type::class(qn.clone())),
            Named::Package(_) => None,
        };
        Ok(named)
    }

    fn expr(&mut self, e: &mut Expr) -> Result<Type> {
        if matches!(e.kind, ExprKind::Ident { .. } | ExprKind::Field { .. }) {
            return match self.name(e)? {
                Named::Value(ty) => Ok(ty),
                Named::Class(qn) => Ok(Type::class(qn)),
                Named::Package(pkg) => bail!("package `{}` used as a value", pkg),
            };
        }
        let ty = match &mut e.kind {
            ExprKind::Ident { .. } | ExprKind::Field { .. } => bail!("expected an expression"),
            ExprKind::Lit(lit) => match lit {
                Lit::Int(_) => Type::int(),
                Lit::Long(_) => Type::long(),
                Lit::Double(_) => Type::double(),
                Lit::Bool(_) => Type::boolean(),
                Lit::Char(_) => Type::char_(),
                Lit::Str(_) => Type::string(),
                Lit::Null => Type::Null,
            },
            ExprKind::Call { callee, args } => {
                let arg_types = args
                    .iter_mut()
                    .map(|a| self.expr(a))
                    .collect::<Result<Vec<_>>>()?;
                self.call(callee, &arg_types)?
            }
            ExprKind::Unary { op, expr } => {
                let operand = self.expr(expr)?;
                match op {
                    UnOp::Not => Type::boolean(),
                    UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => operand,
                    UnOp::Neg | UnOp::Pos | UnOp::BitNot => match operand.unboxed_kind() {
                        Some(k) if k.is_numeric() => {
                            Type::Prim(PrimKind::promote(k, PrimKind::Int))
                        }
                        _ => bail!("bad operand type `{}` for `{}`", operand, op.symbol()),
                    },
                }
            }
            ExprKind::Binary { lhs, op, rhs } => {
                let l = self.expr(lhs)?;
                let r = self.expr(rhs)?;
                binary_type(*op, &l, &r)?
            }
            ExprKind::Cond { cond, then_, else_ } => {
                self.expr(cond)?;
                let t = self.expr(then_)?;
                let f = self.expr(else_)?;
                self.cond_type(t, f)
            }
            ExprKind::Assign { lhs, rhs } | ExprKind::AssignOp { lhs, rhs, .. } => {
                let ty = self.expr(lhs)?;
                self.expr(rhs)?;
                ty
            }
            ExprKind::Cast { ty, expr } => {
                self.expr(expr)?;
                resolve_type(self.names, self.cp, ty)?
            }
            ExprKind::InstanceOf { expr, ty } => {
                self.expr(expr)?;
                resolve_type(self.names, self.cp, ty)?;
                Type::boolean()
            }
            ExprKind::Index { target, index } => {
                let target = self.expr(target)?;
                self.expr(index)?;
                match target {
                    Type::Array(elem) => *elem,
                    other => bail!("array required, but `{}` found", other),
                }
            }
            ExprKind::Paren(inner) => self.expr(inner)?,
        };
        e.ty = Some(ty.clone());
        Ok(ty)
    }

    fn call(&mut self, callee: &mut Expr, arg_types: &[Type]) -> Result<Type> {
        let (receiver, name) = match &mut callee.kind {
            ExprKind::Ident { name, .. } => (self.this_type.clone(), name.clone()),
            ExprKind::Field { target, name, .. } => {
                let receiver = match target.kind {
                    ExprKind::Ident { .. } | ExprKind::Field { .. } => match self.name(target)? {
                        Named::Value(ty) => ty,
                        Named::Class(qn) => Type::class(qn),
                        Named::Package(pkg) => bail!("package `{}` has no methods", pkg),
                    },
                    _ => self.expr(target)?,
                };
                (receiver, name.clone())
            }
            _ => bail!("expression is not callable"),
        };

        let Some((owner, method)) = self.cp.find_method(&receiver, &name, arg_types) else {
            let args: Vec<String> = arg_types.iter().map(Type::to_string).collect();
            bail!(
                "cannot resolve method `{}({})` in `{}`",
                name,
                args.join(", "),
                receiver
            )
        };
        if let ExprKind::Ident { sym, .. } | ExprKind::Field { sym, .. } = &mut callee.kind {
            *sym = Some(Symbol::Method {
                owner,
                name,
                is_static: method.is_static,
            });
        }
        Ok(method.ret)
    }

    fn cond_type(&self, t: Type, f: Type) -> Type {
        if t == f {
            return t;
        }
        match (&t, &f) {
            (Type::Null, other) | (other, Type::Null) => return other.boxed(),
            _ => {}
        }
        if let (Some(a), Some(b)) = (t.unboxed_kind(), f.unboxed_kind()) {
            if a.is_numeric() && b.is_numeric() {
                return Type::Prim(PrimKind::promote(a, b));
            }
        }
        if self.cp.is_subtype(&t, &f) {
            f
        } else if self.cp.is_subtype(&f, &t) {
            t
        } else {
            Type::object()
        }
    }
}

fn binary_type(op: BinOp, l: &Type, r: &Type) -> Result<Type> {
    use BinOp::*;
    let numeric = || match (l.unboxed_kind(), r.unboxed_kind()) {
        (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => {
            Ok(Type::Prim(PrimKind::promote(a, b)))
        }
        _ => Err(anyhow!(
            "bad operand types `{}` and `{}` for `{}`",
            l,
            r,
            op.symbol()
        )),
    };
    Ok(match op {
        Or | And | Eq | Ne | Lt | Gt | Le | Ge => Type::boolean(),
        Add if *l == Type::string() || *r == Type::string() => Type::string(),
        BitAnd | BitOr | BitXor if l.is_boolean() && r.is_boolean() => Type::boolean(),
        Shl | Shr | UShr => match l.unboxed_kind() {
            Some(k) if k.is_integral() => Type::Prim(PrimKind::promote(k, PrimKind::Int)),
            _ => bail!("bad operand type `{}` for `{}`", l, op.symbol()),
        },
        Add | Sub | Mul | Div | Rem | BitAnd | BitOr | BitXor => numeric()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    fn attributed(src: &str) -> CompilationUnit {
        let mut unit = parse_str("<test>", src).expect("parse failed");
        let mut cp = ClassPath::with_builtins();
        attribute(&mut unit, &mut cp).expect("attribution failed");
        unit
    }

    fn first_stmt(unit: &CompilationUnit) -> &Stmt {
        let Member::Method(m) = &unit.classes[0].members[0] else {
            panic!("expected method");
        };
        &m.body.stmts[0]
    }

    #[test]
    fn imported_class_resolves_to_qualified_symbol() {
        let unit = attributed(
            "import java.util.Objects;\n\
             class A { boolean m(String x, String y) { return Objects.equals(x, y); } }",
        );
        let Stmt::Return { value: Some(e), .. } = first_stmt(&unit) else {
            panic!("expected return");
        };
        assert_eq!(e.ty, Some(Type::boolean()));
        let ExprKind::Call { callee, .. } = &e.kind else {
            panic!("expected call");
        };
        let ExprKind::Field { target, .. } = &callee.kind else {
            panic!("expected select");
        };
        assert_eq!(
            target.sym(),
            Some(&Symbol::Class("java.util.Objects".into()))
        );
        assert!(matches!(
            callee.sym(),
            Some(Symbol::Method { owner, is_static: true, .. }) if owner == "java.util.Objects"
        ));
    }

    #[test]
    fn fully_qualified_reference_walks_packages() {
        let unit = attributed(
            "class A { int m(Object o) { return java.util.Objects.hashCode(o); } }",
        );
        let Stmt::Return { value: Some(e), .. } = first_stmt(&unit) else {
            panic!("expected return");
        };
        assert_eq!(e.ty, Some(Type::int()));
    }

    #[test]
    fn binary_numeric_promotion() {
        let unit = attributed("class A { void m(int i, long l) { double d = i + l * 2.0; } }");
        let Stmt::Local { init: Some(e), .. } = first_stmt(&unit) else {
            panic!("expected local");
        };
        assert_eq!(e.ty, Some(Type::double()));
    }

    #[test]
    fn string_concatenation_is_string() {
        let unit = attributed("class A { void m(int i) { String s = \"n=\" + i; } }");
        let Stmt::Local { init: Some(e), .. } = first_stmt(&unit) else {
            panic!("expected local");
        };
        assert_eq!(e.ty, Some(Type::string()));
    }

    #[test]
    fn generic_receiver_substitutes_return_type() {
        let unit = attributed(
            "import java.util.List;\n\
             class A { int m(List<String> xs) { return xs.get(0).length(); } }",
        );
        let Stmt::Return { value: Some(e), .. } = first_stmt(&unit) else {
            panic!("expected return");
        };
        assert_eq!(e.ty, Some(Type::int()));
    }

    #[test]
    fn own_fields_and_methods_resolve() {
        let unit = attributed(
            "package p; class A { int count; int next() { return count + 1; } \
             int twice() { return next() * 2; } }",
        );
        let Member::Method(m) = &unit.classes[0].members[2] else {
            panic!("expected method");
        };
        let Stmt::Return { value: Some(e), .. } = &m.body.stmts[0] else {
            panic!("expected return");
        };
        assert_eq!(e.ty, Some(Type::int()));
    }

    #[test]
    fn unknown_names_are_errors() {
        let mut unit = parse_str("<test>", "class A { void m() { x = 1; } }").unwrap();
        let err = attribute(&mut unit, &mut ClassPath::with_builtins()).unwrap_err();
        assert!(err.to_string().contains("cannot find symbol `x`"));

        let mut unit = parse_str("<test>", "import a.B; class A { B b; }").unwrap();
        let err = attribute(&mut unit, &mut ClassPath::with_builtins()).unwrap_err();
        assert!(err.to_string().contains("cannot resolve type `B`"));
    }
}
