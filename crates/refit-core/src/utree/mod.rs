//! Pattern trees ("U-trees"): the structure of a template, each node able
//! to unify against a concrete node and to inline back into one.

mod expr;
mod stmt;
mod types;

pub use expr::{ULiteral, UExpr};
pub use stmt::UStatement;
pub use types::{UClassIdent, UClassType, UType, UTypeTree};

pub(crate) use stmt::inline_all;
