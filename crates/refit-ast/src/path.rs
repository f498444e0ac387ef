//! Borrowed views of tree nodes and root-to-leaf paths.

use crate::ast::{Block, ClassDecl, CompilationUnit, Expr, ExprKind, Member, Stmt};

/// A borrowed reference to any node a path can pass through.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Unit(&'a CompilationUnit),
    Class(&'a ClassDecl),
    Member(&'a Member),
    Block(&'a Block),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

impl<'a> NodeRef<'a> {
    /// Identity comparison; two structurally equal nodes are still distinct.
    pub fn is(&self, other: &NodeRef<'_>) -> bool {
        match (self, other) {
            (NodeRef::Unit(a), NodeRef::Unit(b)) => std::ptr::eq(*a, *b),
            (NodeRef::Class(a), NodeRef::Class(b)) => std::ptr::eq(*a, *b),
            (NodeRef::Member(a), NodeRef::Member(b)) => std::ptr::eq(*a, *b),
            (NodeRef::Block(a), NodeRef::Block(b)) => std::ptr::eq(*a, *b),
            (NodeRef::Stmt(a), NodeRef::Stmt(b)) => std::ptr::eq(*a, *b),
            (NodeRef::Expr(a), NodeRef::Expr(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }

    pub fn as_expr(&self) -> Option<&'a Expr> {
        match self {
            NodeRef::Expr(e) => Some(e),
            _ => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match *self {
            NodeRef::Unit(unit) => unit.classes.iter().map(NodeRef::Class).collect(),
            NodeRef::Class(class) => class.members.iter().map(NodeRef::Member).collect(),
            NodeRef::Member(Member::Field(field)) => {
                field.init.iter().map(NodeRef::Expr).collect()
            }
            NodeRef::Member(Member::Method(method)) => vec![NodeRef::Block(&method.body)],
            NodeRef::Block(block) => block.stmts.iter().map(NodeRef::Stmt).collect(),
            NodeRef::Stmt(stmt) => match stmt {
                Stmt::Local { init, .. } => init.iter().map(NodeRef::Expr).collect(),
                Stmt::Expr { expr, .. } => vec![NodeRef::Expr(expr)],
                Stmt::If {
                    cond, then_, else_, ..
                } => {
                    let mut out = vec![NodeRef::Expr(cond), NodeRef::Stmt(then_)];
                    out.extend(else_.iter().map(|s| NodeRef::Stmt(s)));
                    out
                }
                Stmt::While { cond, body, .. } => vec![NodeRef::Expr(cond), NodeRef::Stmt(body)],
                Stmt::Return { value, .. } => value.iter().map(NodeRef::Expr).collect(),
                Stmt::Block(block) => vec![NodeRef::Block(block)],
            },
            NodeRef::Expr(expr) => match &expr.kind {
                ExprKind::Lit(_) | ExprKind::Ident { .. } => Vec::new(),
                ExprKind::Field { target, .. } => vec![NodeRef::Expr(target)],
                ExprKind::Call { callee, args } => {
                    let mut out = vec![NodeRef::Expr(callee)];
                    out.extend(args.iter().map(NodeRef::Expr));
                    out
                }
                ExprKind::Unary { expr, .. }
                | ExprKind::Cast { expr, .. }
                | ExprKind::InstanceOf { expr, .. }
                | ExprKind::Paren(expr) => vec![NodeRef::Expr(expr)],
                ExprKind::Binary { lhs, rhs, .. }
                | ExprKind::Assign { lhs, rhs }
                | ExprKind::AssignOp { lhs, rhs, .. } => {
                    vec![NodeRef::Expr(lhs), NodeRef::Expr(rhs)]
                }
                ExprKind::Cond { cond, then_, else_ } => vec![
                    NodeRef::Expr(cond),
                    NodeRef::Expr(then_),
                    NodeRef::Expr(else_),
                ],
                ExprKind::Index { target, index } => {
                    vec![NodeRef::Expr(target), NodeRef::Expr(index)]
                }
            },
        }
    }
}

/// Path from a node up to the compilation unit; `nodes[0]` is the leaf.
#[derive(Debug, Clone)]
pub struct TreePath<'a> {
    nodes: Vec<NodeRef<'a>>,
}

impl<'a> TreePath<'a> {
    pub fn leaf(&self) -> NodeRef<'a> {
        self.nodes[0]
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.nodes.get(1).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeRef<'a>> {
        self.nodes.iter()
    }
}

/// Finds `target` in `unit` by identity and returns its path, leaf first.
pub fn path_for<'a>(unit: &'a CompilationUnit, target: NodeRef<'_>) -> Option<TreePath<'a>> {
    fn search<'a>(node: NodeRef<'a>, target: &NodeRef<'_>, out: &mut Vec<NodeRef<'a>>) -> bool {
        if node.is(target) || node.children().into_iter().any(|c| search(c, target, out)) {
            out.push(node);
            true
        } else {
            false
        }
    }

    let mut nodes = Vec::new();
    search(NodeRef::Unit(unit), &target, &mut nodes).then_some(TreePath { nodes })
}
